use checkhbond::engine::config::{ConfigError, ConfigLoadError};
use checkhbond::engine::error::EngineError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Configuration file error: {0}")]
    ConfigFile(#[from] ConfigLoadError),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
