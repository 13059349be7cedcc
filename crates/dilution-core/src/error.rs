//! Error types for the dilution core.

use dilution_engine::error::EngineError;
use thiserror::Error;

/// Errors that can occur while calculating or recording a submission.
#[derive(Error, Debug)]
pub enum DilutionError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Failed to write to {sink}: {message}")]
    PersistenceFailure { sink: String, message: String },

    #[error("Cannot access {resource}: {message}")]
    ResourceAccessFailure { resource: String, message: String },

    #[error("Invalid value for {field}: '{input}'")]
    InvalidField { field: &'static str, input: String },

    #[error("Config error: {0}")]
    Config(String),
}

impl DilutionError {
    pub(crate) fn persistence(sink: impl Into<String>, message: impl ToString) -> Self {
        DilutionError::PersistenceFailure {
            sink: sink.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn resource_access(resource: impl Into<String>, message: impl ToString) -> Self {
        DilutionError::ResourceAccessFailure {
            resource: resource.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DilutionError>;
