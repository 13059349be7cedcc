//! TOML configuration: form defaults, ledger targets and logging.
//!
//! Loading never fails. Anything wrong with the file is returned as a
//! warning and the built-in defaults are used instead.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use directories::ProjectDirs;
use dilution_core::{FormInput, SheetsConfig};
use log::LevelFilter;
use serde::Deserialize;

use crate::error::ConfigError;

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Initial form values.
    pub defaults: FormInput,
    pub sheet: SheetsConfig,
    pub csv: CsvConfig,
    pub log: LogConfig,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CsvConfig {
    /// Local ledger file. Nothing is written when unset.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub file: Option<PathBuf>,
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            file: None,
            level: "info".to_string(),
        }
    }
}

impl LogConfig {
    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(self.level.trim())
            .map_err(|_| ConfigError::LogLevel(self.level.clone()))
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "dilution")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

/// Load the config from `explicit`, or from the user config dir.
///
/// A missing user config is not an error; a missing explicit one is.
pub fn load_config(explicit: Option<&Path>) -> (Config, Vec<String>) {
    let mut warnings = Vec::new();
    let path = explicit.map(Path::to_path_buf).or_else(user_config_path);

    let Some(path) = path else {
        return (Config::default(), warnings);
    };
    if !path.exists() {
        if explicit.is_some() {
            warnings.push(
                ConfigError::NotFound {
                    path: path.display().to_string(),
                }
                .to_string(),
            );
        }
        return (Config::default(), warnings);
    }

    match read_config_file(&path) {
        Ok(config) => {
            if let Err(e) = config.log.level_filter() {
                warnings.push(e.to_string());
            }
            (config, warnings)
        }
        Err(e) => {
            warnings.push(e.to_string());
            (Config::default(), warnings)
        }
    }
}

pub fn read_config_file(path: &Path) -> Result<Config, ConfigError> {
    let display = path.display().to_string();
    let meta = std::fs::metadata(path).map_err(|source| ConfigError::Read {
        path: display.clone(),
        source,
    })?;
    if meta.len() > MAX_CONFIG_FILE_BYTES {
        return Err(ConfigError::TooLarge {
            path: display,
            size: meta.len(),
            max: MAX_CONFIG_FILE_BYTES,
        });
    }
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: display.clone(),
        source,
    })?;
    parse_config(&content).map_err(|source| ConfigError::Parse {
        path: display,
        source,
    })
}

pub fn parse_config(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.defaults.fund_size, 2_000_000.0);
        assert_eq!(config.sheet.worksheet, "Sheet1");
        assert_eq!(config.log.level_filter().unwrap(), LevelFilter::Info);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = parse_config(
            r#"
            [defaults]
            fund_size = 50000000
            include_round_two = false

            [sheet]
            target = "https://docs.google.com/spreadsheets/d/abc/edit"
            worksheet = "Deals"

            [csv]
            path = "ledger.csv"

            [log]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.defaults.fund_size, 50_000_000.0);
        assert!(!config.defaults.include_round_two);
        assert_eq!(config.defaults.your_investment, 50_000.0);
        assert_eq!(config.sheet.worksheet, "Deals");
        assert_eq!(config.sheet.token_env, "DILUTION_SHEETS_TOKEN");
        assert_eq!(config.csv.path, Some(PathBuf::from("ledger.csv")));
        assert_eq!(config.log.level_filter().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(parse_config("[defaults]\nfund = 1\n").is_err());
        assert!(parse_config("[server]\nport = 1\n").is_err());
    }

    #[test]
    fn test_bad_log_level() {
        let config = parse_config("[log]\nlevel = \"loud\"\n").unwrap();
        assert!(matches!(
            config.log.level_filter(),
            Err(ConfigError::LogLevel(_))
        ));
    }

    #[test]
    fn test_missing_explicit_config_warns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let (config, warnings) = load_config(Some(&path));
        assert_eq!(config, Config::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Config file not found"));
    }

    #[test]
    fn test_invalid_config_falls_back_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[defaults]\nfund_size = \"lots\"\n").unwrap();
        let (config, warnings) = load_config(Some(&path));
        assert_eq!(config, Config::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Failed to parse"));
    }

    #[test]
    fn test_valid_config_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[defaults]\nnew_raise = 1000\n").unwrap();
        let (config, warnings) = load_config(Some(&path));
        assert!(warnings.is_empty());
        assert_eq!(config.defaults.new_raise, 1_000.0);
    }
}
