use crate::error::{CropRotaError, Result};
use crate::logic::DEFAULT_YEAR_COUNT;
use dialoguer::Input;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub farm: FarmConfig,
    #[serde(default)]
    pub rotation: RotationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FarmConfig {
    pub name: String,
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            name: "Home Farm".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RotationConfig {
    #[serde(default = "default_years")]
    pub years: i32,
    /// Crops added to the standard classification table, keyed by group name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_crops: BTreeMap<String, Vec<String>>,
}

fn default_years() -> i32 {
    DEFAULT_YEAR_COUNT
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            years: DEFAULT_YEAR_COUNT,
            extra_crops: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn load(config_override: Option<&PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p.clone(),
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(CropRotaError::Config(format!(
                "Config file not found at {:?}. Run `croprota init` to set up.",
                config_path
            )));
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| CropRotaError::Config(format!("Failed to read config: {}", e)))?;
        Self::parse(&config_str)
    }

    pub fn parse(content: &str) -> Result<Self> {
        // Substitute environment variables
        let content = Self::substitute_env_vars(content);

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| CropRotaError::Config(format!("Failed to parse config: {}", e)))?;

        if config.rotation.years < 1 {
            return Err(CropRotaError::InvalidConfiguration(format!(
                "rotation.years must be at least 1, got {}",
                config.rotation.years
            )));
        }

        Ok(config)
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        Self::default_config_path()
    }

    pub fn exists(config_override: Option<&PathBuf>) -> bool {
        match config_override {
            Some(p) => p.exists(),
            None => Self::find_config_path()
                .map(|p| p.exists())
                .unwrap_or(false),
        }
    }

    /// Default path for writing new config files (~/.config/croprota/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CropRotaError::Config("Cannot determine config directory".into()))?
            .join("croprota");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the loaded Config and the path it was written to.
    pub fn setup_interactive(config_override: Option<&PathBuf>) -> Result<(Self, PathBuf)> {
        println!();
        println!("{}", Self::setup_banner(Self::exists(config_override)));
        println!();

        let farm_name: String = Input::new()
            .with_prompt("  Farm name")
            .default(FarmConfig::default().name)
            .interact_text()
            .map_err(|e| CropRotaError::Config(format!("Input error: {}", e)))?;

        let years: i32 = Input::new()
            .with_prompt("  Rotation length (years)")
            .default(DEFAULT_YEAR_COUNT)
            .validate_with(|y: &i32| {
                if *y >= 1 {
                    Ok(())
                } else {
                    Err("must be at least 1")
                }
            })
            .interact_text()
            .map_err(|e| CropRotaError::Config(format!("Input error: {}", e)))?;

        println!();

        let config = Config {
            farm: FarmConfig { name: farm_name },
            rotation: RotationConfig {
                years,
                extra_crops: BTreeMap::new(),
            },
        };

        let config_path = match config_override {
            Some(p) => p.clone(),
            None => Self::default_config_path()?,
        };
        config.write(&config_path)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn setup_banner(existing: bool) -> &'static str {
        if existing {
            "Updating croprota configuration. Saving will replace the current config.yaml."
        } else {
            "No configuration found. Let's set up croprota!"
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(self)
            .map_err(|e| CropRotaError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# croprota configuration\n# Generated by `croprota init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(path, content)?;
        Ok(())
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        // Find all ${VAR_NAME} patterns and substitute
        let re = match regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") {
            Ok(re) => re,
            Err(_) => return result,
        };

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }

    pub fn data_dir(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        // CLI override takes priority
        if let Some(dir) = data_dir_override {
            std::fs::create_dir_all(dir)?;
            return Ok(dir.clone());
        }

        if let Ok(dir) = std::env::var("CROPROTA_DATA_DIR") {
            let p = PathBuf::from(dir);
            std::fs::create_dir_all(&p)?;
            return Ok(p);
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| CropRotaError::Config("Cannot determine data directory".into()))?
            .join("croprota");

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn db_path(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        Ok(Self::data_dir(data_dir_override)?.join("croprota.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let config = Config::parse(
            r#"
farm:
  name: "Riverside"
rotation:
  years: 5
  extra_crops:
    grains: [maize]
    legumes: [pulses, lentils]
"#,
        )
        .unwrap();

        assert_eq!(config.farm.name, "Riverside");
        assert_eq!(config.rotation.years, 5);
        assert_eq!(config.rotation.extra_crops["legumes"], vec!["pulses", "lentils"]);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config = Config::parse("farm:\n  name: North\n").unwrap();
        assert_eq!(config.rotation.years, DEFAULT_YEAR_COUNT);
        assert!(config.rotation.extra_crops.is_empty());

        let config = Config::parse("{}").unwrap();
        assert_eq!(config.farm.name, "Home Farm");
    }

    #[test]
    fn zero_years_rejected() {
        let err = Config::parse("rotation:\n  years: 0\n").unwrap_err();
        assert!(matches!(err, CropRotaError::InvalidConfiguration(_)));
        assert!(Config::parse("rotation:\n  years: -2\n").is_err());
    }

    #[test]
    fn env_vars_are_substituted() {
        std::env::set_var("CROPROTA_TEST_FARM_NAME", "Valley View");
        let config = Config::parse("farm:\n  name: \"${CROPROTA_TEST_FARM_NAME}\"\n").unwrap();
        assert_eq!(config.farm.name, "Valley View");
    }

    #[test]
    fn unset_env_vars_are_left_alone() {
        let out = Config::substitute_env_vars("name: ${CROPROTA_TEST_UNSET_VAR}");
        assert_eq!(out, "name: ${CROPROTA_TEST_UNSET_VAR}");
    }

    #[test]
    fn write_then_load() {
        let dir = std::env::temp_dir().join(format!("croprota-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.yaml");

        let mut config = Config::default();
        config.rotation.years = 6;
        config.write(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.rotation.years, 6);
        assert_eq!(loaded.farm.name, config.farm.name);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn setup_banner_depends_on_existing_config() {
        assert!(Config::setup_banner(false).starts_with("No configuration found"));
        assert!(!Config::setup_banner(true).contains("No configuration found"));
    }

    #[test]
    fn load_missing_file_errors() {
        let path = PathBuf::from("/nonexistent/croprota/config.yaml");
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, CropRotaError::Config(_)));
    }
}
