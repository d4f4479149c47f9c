//! Graph model and data plumbing for embedding experiments.
//!
//! Provides the directed weighted graph the embedding methods train on, the
//! on-disk formats (including migration from the legacy adjacency-map format),
//! node-label loading with an encoding fallback, and stochastic-block-model
//! benchmark synthesis.

pub mod formats;
pub mod graph;
pub mod labels;
pub mod sbm;

pub use formats::{load_graph, migrate_legacy, save_graph, GraphFormat, LegacyGraph};
pub use graph::{Graph, GraphStats};
pub use labels::{load_labels, save_labels, NodeLabels};
pub use sbm::{SbmConfig, SbmSample};

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Error types for graph loading, migration and synthesis
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Graph file contents are structurally invalid
    #[error("Malformed graph: {0}")]
    MalformedGraph(String),

    /// Label file contents are structurally invalid
    #[error("Malformed labels: {0}")]
    MalformedLabels(String),

    /// Configuration is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
