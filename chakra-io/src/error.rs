//! Error types for ChakraIO

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// ChakraIO error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error from the drive core
    #[error(transparent)]
    Drive(#[from] chakra_drive::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config parse error
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Background task could not be started or failed
    #[error("Task error: {0}")]
    Task(String),
}
