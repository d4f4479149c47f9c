//! Visualization export for embedding experiments.
//!
//! Embeddings are projected to 2-D, plotted as terminal scatter charts and
//! written to text files; graphs can also be exported as Graphviz DOT with
//! community coloring. No interactive windows are opened.

pub mod dot;
pub mod project;
pub mod scatter;

pub use dot::{export_dot, graph_to_dot};
pub use project::project_2d;
pub use scatter::{export_scatter, VizConfig};

/// Result type for visualization operations
pub type Result<T> = std::result::Result<T, VizError>;

/// Errors surfaced during projection or export
#[derive(Debug, thiserror::Error)]
pub enum VizError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Projection could not be computed
    #[error("Projection error: {0}")]
    Projection(String),

    /// Inputs are inconsistent
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
