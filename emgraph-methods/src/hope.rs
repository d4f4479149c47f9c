//! HOPE: higher-order proximity preserved embedding.
//!
//! Factorizes the Katz proximity matrix `S = (I - beta*A)^-1 * beta*A` with an
//! SVD and keeps separate source and target embeddings, preserving asymmetric
//! transitivity in directed graphs.
//!
//! Ou et al., "Asymmetric Transitivity Preserving Graph Embedding" (KDD 2016).

use crate::{check_dimensions, EmbeddingMethod, MethodError, Result};
use emgraph_core::Graph;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Hyper-parameters for HOPE.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HopeConfig {
    /// Embedding dimension; must be even (source and target halves).
    pub d: usize,
    /// Katz decay factor; must stay below the reciprocal spectral radius of
    /// the adjacency matrix for the proximity series to converge.
    pub beta: f64,
}

impl Default for HopeConfig {
    fn default() -> Self {
        Self { d: 256, beta: 0.01 }
    }
}

/// HOPE with Katz-index proximity.
#[derive(Debug)]
pub struct Hope {
    config: HopeConfig,
    embedding: Option<DMatrix<f64>>,
}

impl Hope {
    pub fn new(config: HopeConfig) -> Self {
        Self {
            config,
            embedding: None,
        }
    }

    fn half(&self) -> usize {
        self.config.d / 2
    }
}

/// Largest singular direction growth rate of `a`, by power iteration on the
/// unit sphere.
pub(crate) fn estimate_spectral_radius(a: &DMatrix<f64>) -> f64 {
    let n = a.nrows();
    if n == 0 {
        return 0.0;
    }
    let mut v = nalgebra::DVector::from_element(n, 1.0 / (n as f64).sqrt());
    let mut radius = 0.0;
    for _ in 0..100 {
        let next = a * &v;
        let norm = next.norm();
        if norm < f64::EPSILON {
            return 0.0;
        }
        let scaled = next / norm;
        if (norm - radius).abs() < 1e-5 {
            return norm;
        }
        radius = norm;
        v = scaled;
    }
    radius
}

impl EmbeddingMethod for Hope {
    fn method_name(&self) -> &'static str {
        "hope"
    }

    fn d(&self) -> usize {
        self.config.d
    }

    fn learn_embedding(&mut self, graph: &Graph) -> Result<&DMatrix<f64>> {
        if self.config.d % 2 != 0 {
            return Err(MethodError::InvalidDimension {
                d: self.config.d,
                reason: "HOPE splits the embedding into source and target halves".into(),
            });
        }
        let n = check_dimensions(graph, self.config.d)?;
        let k = self.half();

        let a = graph.adjacency_matrix();
        let radius = estimate_spectral_radius(&a);
        if radius > 0.0 && self.config.beta >= 1.0 / radius {
            tracing::warn!(
                "beta {} is at or above the reciprocal spectral radius {:.6}; Katz series may diverge",
                self.config.beta,
                1.0 / radius
            );
        }

        // S = (I - beta*A)^-1 * beta*A, via an LU solve instead of an
        // explicit inverse.
        let beta_a = &a * self.config.beta;
        let m_g = DMatrix::identity(n, n) - &beta_a;
        let s = m_g
            .lu()
            .solve(&beta_a)
            .ok_or_else(|| MethodError::Numerical("(I - beta*A) is singular".into()))?;

        let svd = s.svd(true, true);
        let u = svd
            .u
            .ok_or_else(|| MethodError::Numerical("SVD produced no left vectors".into()))?;
        let v_t = svd
            .v_t
            .ok_or_else(|| MethodError::Numerical("SVD produced no right vectors".into()))?;

        // Source half from U, target half from V, both scaled by sqrt(sigma).
        let mut y = DMatrix::zeros(n, self.config.d);
        for j in 0..k {
            let scale = svd.singular_values[j].max(0.0).sqrt();
            for i in 0..n {
                y[(i, j)] = u[(i, j)] * scale;
                y[(i, k + j)] = v_t[(j, i)] * scale;
            }
        }

        Ok(self.embedding.insert(y))
    }

    fn embedding(&self) -> Option<&DMatrix<f64>> {
        self.embedding.as_ref()
    }

    /// Katz estimate: source half of `i` against target half of `j`.
    fn similarity(&self, i: usize, j: usize) -> f64 {
        let Some(y) = self.embedding() else {
            return 0.0;
        };
        let k = self.half();
        (0..k).map(|c| y[(i, c)] * y[(j, k + c)]).sum()
    }
}
