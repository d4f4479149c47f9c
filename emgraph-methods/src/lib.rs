//! Graph embedding methods.
//!
//! Every method implements [`EmbeddingMethod`]: train on a graph, expose the
//! learned node-by-dimension matrix, and score node pairs for reconstruction
//! evaluation. The driver holds the methods as trait objects and runs them
//! uniformly.

use emgraph_core::Graph;
use nalgebra::DMatrix;
use rand::Rng;
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;

pub mod gf;
pub mod hope;
pub mod lap;
pub mod lle;
pub mod node2vec;
pub mod sdne;
mod spectral;

pub use gf::{GraphFactorization, GraphFactorizationConfig};
pub use hope::{Hope, HopeConfig};
pub use lap::{LaplacianEigenmaps, LaplacianEigenmapsConfig};
pub use lle::{LocallyLinearEmbedding, LocallyLinearEmbeddingConfig};
pub use node2vec::{Node2Vec, Node2VecConfig};
pub use sdne::{Sdne, SdneConfig};

/// Result type for method training
pub type Result<T> = std::result::Result<T, MethodError>;

/// Errors surfaced by embedding methods
#[derive(Debug, thiserror::Error)]
pub enum MethodError {
    /// The graph has no nodes
    #[error("graph is empty")]
    EmptyGraph,

    /// Requested more dimensions than the graph supports
    #[error("embedding dimension {d} too large for {n} nodes")]
    DimensionTooLarge { d: usize, n: usize },

    /// Dimension constraint specific to a method
    #[error("invalid embedding dimension {d}: {reason}")]
    InvalidDimension { d: usize, reason: String },

    /// A numerical routine failed to produce a usable factorization
    #[error("numerical failure: {0}")]
    Numerical(String),
}

/// Uniform training interface shared by all embedding methods.
pub trait EmbeddingMethod {
    /// Human-readable method name used in reports and file names.
    fn method_name(&self) -> &'static str;

    /// Embedding dimensionality.
    fn d(&self) -> usize;

    /// Train on the graph and return the n-by-d embedding matrix.
    fn learn_embedding(&mut self, graph: &Graph) -> Result<&DMatrix<f64>>;

    /// The learned embedding, `None` before training.
    fn embedding(&self) -> Option<&DMatrix<f64>>;

    /// Estimated edge weight between nodes `i` and `j`.
    ///
    /// Defaults to the dot product of embedding rows; asymmetric methods
    /// override this.
    fn similarity(&self, i: usize, j: usize) -> f64 {
        match self.embedding() {
            Some(y) => y.row(i).dot(&y.row(j)),
            None => 0.0,
        }
    }
}

/// Shared validation: non-empty graph, d within range.
pub(crate) fn check_dimensions(graph: &Graph, d: usize) -> Result<usize> {
    let n = graph.node_count();
    if n == 0 {
        return Err(MethodError::EmptyGraph);
    }
    if d == 0 || d > n {
        return Err(MethodError::DimensionTooLarge { d, n });
    }
    Ok(n)
}

/// Seeded uniform init in `[-scale, scale]`, one row per node.
pub(crate) fn uniform_init(n: usize, d: usize, scale: f64, seed: u64) -> DMatrix<f64> {
    let mut rng = XorShiftRng::seed_from_u64(seed);
    DMatrix::from_fn(n, d, |_, _| rng.gen_range(-scale..scale))
}
