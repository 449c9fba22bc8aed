use thiserror::Error;

pub type SpoorResult<T> = Result<T, SpoorError>;

#[derive(Error, Debug)]
pub enum SpoorError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Incomplete parameters: {0}")]
    IncompleteParameters(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration loading error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
