//! Locally linear embedding.
//!
//! Treats the row-normalized adjacency as reconstruction weights W and embeds
//! with the bottom non-trivial eigenvectors of `(I - W)^T (I - W)`.
//!
//! Roweis & Saul, "Nonlinear Dimensionality Reduction by Locally Linear
//! Embedding" (Science 2000).

use crate::spectral::bottom_eigenvectors;
use crate::{check_dimensions, EmbeddingMethod, Result};
use emgraph_core::Graph;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Hyper-parameters for locally linear embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocallyLinearEmbeddingConfig {
    /// Embedding dimension.
    pub d: usize,
}

impl Default for LocallyLinearEmbeddingConfig {
    fn default() -> Self {
        Self { d: 128 }
    }
}

/// LLE with graph-neighborhood reconstruction weights.
#[derive(Debug)]
pub struct LocallyLinearEmbedding {
    config: LocallyLinearEmbeddingConfig,
    embedding: Option<DMatrix<f64>>,
}

impl LocallyLinearEmbedding {
    pub fn new(config: LocallyLinearEmbeddingConfig) -> Self {
        Self {
            config,
            embedding: None,
        }
    }
}

/// Row-normalize so each node's reconstruction weights sum to 1.
/// Zero-degree rows stay zero.
fn row_normalize(w: &DMatrix<f64>) -> DMatrix<f64> {
    let mut out = w.clone();
    for i in 0..out.nrows() {
        let total: f64 = out.row(i).sum();
        if total > 0.0 {
            for j in 0..out.ncols() {
                out[(i, j)] /= total;
            }
        }
    }
    out
}

impl EmbeddingMethod for LocallyLinearEmbedding {
    fn method_name(&self) -> &'static str {
        "lle"
    }

    fn d(&self) -> usize {
        self.config.d
    }

    fn learn_embedding(&mut self, graph: &Graph) -> Result<&DMatrix<f64>> {
        let n = check_dimensions(graph, self.config.d)?;

        let w = row_normalize(&graph.symmetric_adjacency());
        let i_minus_w = DMatrix::identity(n, n) - &w;
        let m = i_minus_w.transpose() * &i_minus_w;
        // Skip the bottom eigenvector (constant when weights sum to 1).
        let y = bottom_eigenvectors(m, 1, self.config.d)?;

        Ok(self.embedding.insert(y))
    }

    fn embedding(&self) -> Option<&DMatrix<f64>> {
        self.embedding.as_ref()
    }
}
