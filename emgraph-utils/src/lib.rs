//! Shared plumbing for the emgraph workspace: logging setup and experiment
//! configuration files.

pub mod config;
pub mod logging;

pub use config::ExperimentConfig;
pub use logging::{basic_config, init_logging, LogLevel, LoggerConfig};

/// Result type used throughout emgraph utilities
pub type Result<T> = std::result::Result<T, UtilError>;

/// Error types for utility operations
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
