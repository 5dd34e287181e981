use crate::domain::model::Stage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required config field: {field}")]
    MissingConfigError { field: String },

    #[error("Precondition failed: {message}")]
    PreconditionError { message: String },

    #[error("Dependency unavailable at stage {stage}: {cause}")]
    DependencyUnavailable { stage: Stage, cause: String },

    #[error("Cancelled at stage {stage}")]
    Cancelled { stage: Stage },

    #[error("Command `{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Runtime rejected request: {message}")]
    RuntimeError { message: String },
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
