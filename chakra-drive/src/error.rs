//! Error types for the drive core.
//!
//! Only conditions a caller cannot recover from locally become an `Error`.
//! Rejected vision, unknown alliance and desaturation are ordinary values.

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Drive core error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error (config file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config parse error
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Wheel offsets do not describe a rigid body that can be solved
    #[error("Invalid wheel geometry: {0}")]
    InvalidGeometry(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Position feedback from a wheel module is gone
    #[error("Feedback lost on module {module}: {reason}")]
    FeedbackLost {
        /// Module index in kinematics order
        module: usize,
        /// Reason reported by the actuator
        reason: String,
    },

    /// Actuator command could not be delivered
    #[error("Actuator error: {0}")]
    Actuator(String),

    /// Gyro read or reset failed
    #[error("Gyro error: {0}")]
    Gyro(String),
}
