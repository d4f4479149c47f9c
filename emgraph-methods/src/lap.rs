//! Laplacian eigenmaps.
//!
//! Embeds the undirected view of the graph with the bottom non-trivial
//! eigenvectors of the symmetric-normalized Laplacian
//! `L = I - D^-1/2 W D^-1/2`.
//!
//! Belkin & Niyogi, "Laplacian Eigenmaps and Spectral Techniques for
//! Embedding and Clustering" (NIPS 2001).

use crate::spectral::bottom_eigenvectors;
use crate::{check_dimensions, EmbeddingMethod, Result};
use emgraph_core::Graph;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Hyper-parameters for Laplacian eigenmaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaplacianEigenmapsConfig {
    /// Embedding dimension.
    pub d: usize,
}

impl Default for LaplacianEigenmapsConfig {
    fn default() -> Self {
        Self { d: 128 }
    }
}

/// Laplacian eigenmaps on the symmetrized adjacency.
#[derive(Debug)]
pub struct LaplacianEigenmaps {
    config: LaplacianEigenmapsConfig,
    embedding: Option<DMatrix<f64>>,
}

impl LaplacianEigenmaps {
    pub fn new(config: LaplacianEigenmapsConfig) -> Self {
        Self {
            config,
            embedding: None,
        }
    }
}

/// `I - D^-1/2 W D^-1/2`, with zero-degree rows left untouched.
pub(crate) fn normalized_laplacian(w: &DMatrix<f64>) -> DMatrix<f64> {
    let n = w.nrows();
    let inv_sqrt_deg: Vec<f64> = (0..n)
        .map(|i| {
            let deg: f64 = w.row(i).sum();
            if deg > 0.0 {
                1.0 / deg.sqrt()
            } else {
                0.0
            }
        })
        .collect();

    let mut l = DMatrix::identity(n, n);
    for i in 0..n {
        for j in 0..n {
            if w[(i, j)] != 0.0 {
                l[(i, j)] -= inv_sqrt_deg[i] * w[(i, j)] * inv_sqrt_deg[j];
            }
        }
    }
    l
}

impl EmbeddingMethod for LaplacianEigenmaps {
    fn method_name(&self) -> &'static str {
        "laplacian_eigenmaps"
    }

    fn d(&self) -> usize {
        self.config.d
    }

    fn learn_embedding(&mut self, graph: &Graph) -> Result<&DMatrix<f64>> {
        check_dimensions(graph, self.config.d)?;

        let w = graph.symmetric_adjacency();
        let l = normalized_laplacian(&w);
        // Skip the trivial constant eigenvector.
        let y = bottom_eigenvectors(l, 1, self.config.d)?;

        Ok(self.embedding.insert(y))
    }

    fn embedding(&self) -> Option<&DMatrix<f64>> {
        self.embedding.as_ref()
    }
}
