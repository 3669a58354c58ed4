use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "croprota", version, about = "Field records and crop rotation planner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override SQLite data directory
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Re-run interactive setup
    Init,
    /// Print a rotation starting from CROP
    Suggest {
        crop: String,
        /// Number of years, including the starting crop
        #[arg(short, long, allow_negative_numbers = true)]
        years: Option<i32>,
        /// Emit JSON instead of one line per year
        #[arg(long)]
        json: bool,
    },
    /// Show the crop groups CROP belongs to
    Classify { crop: String },
}

impl Cli {
    /// Subcommands always log to stderr. The TUI only does when `-v` is given,
    /// since log lines would draw over the alternate screen.
    pub fn logs_to_stderr(&self) -> bool {
        self.command.is_some() || self.verbose > 0
    }

    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}
