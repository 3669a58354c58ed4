mod app;
mod cli;
mod config;
mod db;
mod error;
mod logic;
mod models;
mod ui;

use app::{App, FormField, Screen};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use db::Database;
use error::Result;
use logic::{CropTable, RotationGenerator};
use models::RotationYear;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use ui::screens::{CropsScreen, FieldFormScreen, FieldsScreen, PlansScreen};

fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging. RUST_LOG counts as asking for logs.
    if cli.logs_to_stderr() || std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
            )
            .init();
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Some(Commands::Init) => {
            Config::setup_interactive(cli.config.as_ref())?;
            Ok(())
        }
        Some(Commands::Suggest { crop, years, json }) => {
            let config = load_or_default(&cli)?;
            suggest(&config, crop, years.unwrap_or(config.rotation.years), *json)
        }
        Some(Commands::Classify { crop }) => {
            let config = load_or_default(&cli)?;
            classify(&config, crop)
        }
        None => run_tui(&cli),
    }
}

/// Subcommands work without a config file; the TUI asks for one instead.
fn load_or_default(cli: &Cli) -> Result<Config> {
    if Config::exists(cli.config.as_ref()) {
        Config::load(cli.config.as_ref())
    } else {
        tracing::debug!("No config file found, using defaults");
        Ok(Config::default())
    }
}

fn suggest(config: &Config, crop: &str, years: i32, json: bool) -> Result<()> {
    let table = CropTable::with_extra_crops(&config.rotation.extra_crops)?;
    let generator = RotationGenerator::new(&table);
    let rotation = generator.generate(crop, years, &mut rand::thread_rng())?;

    if json {
        let years: Vec<RotationYear> = rotation
            .into_iter()
            .zip(1u32..)
            .map(|(crop, year)| RotationYear { year, crop })
            .collect();
        println!("{}", serde_json::to_string_pretty(&years)?);
    } else {
        for (i, crop) in rotation.iter().enumerate() {
            println!("Year {}: {}", i + 1, crop);
        }
    }
    Ok(())
}

fn classify(config: &Config, crop: &str) -> Result<()> {
    let table = CropTable::with_extra_crops(&config.rotation.extra_crops)?;
    let groups = table.groups_containing(crop);

    if groups.is_empty() {
        println!("{}: unclassified", crop);
    } else {
        let names: Vec<&str> = groups.iter().map(|g| g.as_str()).collect();
        println!("{}: {}", crop, names.join(", "));
    }
    Ok(())
}

fn run_tui(cli: &Cli) -> Result<()> {
    let config = if Config::exists(cli.config.as_ref()) {
        match Config::load(cli.config.as_ref()) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                eprintln!("Run `croprota init` to write a fresh config.yaml");
                std::process::exit(1);
            }
        }
    } else {
        Config::setup_interactive(cli.config.as_ref())?.0
    };

    let db = Database::open(&Config::db_path(cli.data_dir.as_ref())?)?;
    tracing::info!(path = %db.path().display(), "Opened database");

    let mut app = App::new(config, db)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        let view: &App = app;
        terminal.draw(|f| {
            let area = f.area();

            match view.screen {
                Screen::Fields => {
                    let plan = view
                        .selected_field()
                        .and_then(|field| field.id)
                        .and_then(|id| view.latest_plan_for(id));
                    let screen =
                        FieldsScreen::new(&view.config.farm.name, &view.fields, &view.table)
                            .with_selection(view.fields_state.selected_index)
                            .with_plan(plan)
                            .with_status(view.status_message.as_deref());
                    f.render_widget(screen, area);
                }
                Screen::Plans => {
                    let screen =
                        PlansScreen::new(view).with_selection(view.plans_state.selected_index);
                    f.render_widget(screen, area);
                }
                Screen::Crops => {
                    let screen = CropsScreen::new(view.generator())
                        .with_field(view.selected_field())
                        .with_selection(view.crops_state.selected_index);
                    f.render_widget(screen, area);
                }
                Screen::AddField => {
                    f.render_widget(FieldFormScreen::new(&view.form), area);
                }
            }
        })?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                let in_form = app.screen == Screen::AddField;
                match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        app.quit();
                    }
                    KeyCode::Char('q') if !in_form => {
                        app.quit();
                    }
                    KeyCode::Esc => {
                        app.switch_screen(Screen::Fields);
                    }
                    KeyCode::Char(c) if !in_form => {
                        if let Some(screen) = Screen::from_key(c) {
                            app.switch_screen(screen);
                        } else {
                            handle_screen_input(app, key.code);
                        }
                    }
                    _ => {
                        handle_screen_input(app, key.code);
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_screen_input(app: &mut App, code: KeyCode) {
    let result = match app.screen {
        Screen::Fields => handle_fields_input(app, code),
        Screen::Plans => handle_plans_input(app, code),
        Screen::Crops => {
            handle_crops_input(app, code);
            Ok(())
        }
        Screen::AddField => handle_form_input(app, code),
    };

    if let Err(e) = result {
        tracing::warn!("Action failed: {}", e);
        app.set_status(&format!("Action failed: {}", e));
    }
}

fn handle_fields_input(app: &mut App, code: KeyCode) -> Result<()> {
    let count = app.fields.len();
    match code {
        KeyCode::Up => app.fields_state.prev(),
        KeyCode::Down => app.fields_state.next(count),
        KeyCode::Char('a') => app.switch_screen(Screen::AddField),
        KeyCode::Char('g') => {
            if let Some(plan) = app.regenerate_selected()? {
                app.set_status(&format!("New plan: {}", plan.summary()));
            }
        }
        KeyCode::Char('d') => {
            app.delete_selected_field()?;
            app.set_status("Field deleted");
        }
        _ => {}
    }
    Ok(())
}

fn handle_plans_input(app: &mut App, code: KeyCode) -> Result<()> {
    let count = app.plans.len();
    match code {
        KeyCode::Up => app.plans_state.prev(),
        KeyCode::Down => app.plans_state.next(count),
        KeyCode::Char('d') => {
            app.delete_selected_plan()?;
            app.set_status("Plan deleted");
        }
        _ => {}
    }
    Ok(())
}

fn handle_crops_input(app: &mut App, code: KeyCode) {
    let count = app.table.groups().count();
    match code {
        KeyCode::Up => app.crops_state.prev(),
        KeyCode::Down => app.crops_state.next(count),
        _ => {}
    }
}

fn handle_form_input(app: &mut App, code: KeyCode) -> Result<()> {
    match code {
        KeyCode::Tab | KeyCode::Down => app.form.next_field(),
        KeyCode::BackTab | KeyCode::Up => app.form.prev_field(),
        KeyCode::Left => app.form.cycle(false),
        KeyCode::Right => app.form.cycle(true),
        KeyCode::Backspace => app.form.backspace(),
        KeyCode::Enter => {
            if !app.submit_form()? {
                // Jump to the first invalid input
                if let Some(field) = FormField::all()
                    .iter()
                    .find(|f| app.form.error_for(**f).is_some())
                {
                    app.form.focused = *field;
                }
            }
        }
        KeyCode::Char(c) => app.form.push_char(c),
        _ => {}
    }
    Ok(())
}
