//! Error types for the dilution binary.

use thiserror::Error;

/// Problems reading the config file. These are reported as warnings and
/// never stop the program.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: String },

    #[error("Refusing to read {path}: file too large ({size} bytes, max {max})")]
    TooLarge { path: String, size: u64, max: u64 },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid log level '{0}' (expected off, error, warn, info, debug or trace)")]
    LogLevel(String),
}

/// Problems setting up the log file.
#[derive(Error, Debug)]
pub enum LogError {
    #[error("Failed to open log file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Logger already initialised")]
    AlreadySet(#[from] log::SetLoggerError),
}
