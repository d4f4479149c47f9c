//! Graph factorization.
//!
//! Learns one vector per node by stochastic gradient descent on observed
//! edges, minimizing
//!
//! ```text
//! sum_(u,v) (w_uv - <y_u, y_v>)^2 + regu/2 * ||Y||^2
//! ```
//!
//! Ahmed et al., "Distributed Large-scale Natural Graph Factorization"
//! (WWW 2013).

use crate::{check_dimensions, uniform_init, EmbeddingMethod, Result};
use emgraph_core::Graph;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Hyper-parameters for graph factorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphFactorizationConfig {
    /// Embedding dimension.
    pub d: usize,
    /// SGD sweeps over the edge list.
    pub max_iter: usize,
    /// Learning rate.
    pub eta: f64,
    /// L2 regularization strength.
    pub regu: f64,
    /// RNG seed for the initial factors.
    pub seed: u64,
}

impl Default for GraphFactorizationConfig {
    fn default() -> Self {
        Self {
            d: 128,
            max_iter: 1000,
            eta: 1e-4,
            regu: 1.0,
            seed: 42,
        }
    }
}

/// Graph factorization via edge-wise SGD.
#[derive(Debug)]
pub struct GraphFactorization {
    config: GraphFactorizationConfig,
    embedding: Option<DMatrix<f64>>,
}

impl GraphFactorization {
    pub fn new(config: GraphFactorizationConfig) -> Self {
        Self {
            config,
            embedding: None,
        }
    }

    fn loss(y: &DMatrix<f64>, edges: &[(u32, u32, f64)], regu: f64) -> f64 {
        let data_term: f64 = edges
            .iter()
            .map(|&(u, v, w)| {
                let est = y.row(u as usize).dot(&y.row(v as usize));
                (w - est) * (w - est)
            })
            .sum();
        data_term + regu / 2.0 * y.norm_squared()
    }
}

impl EmbeddingMethod for GraphFactorization {
    fn method_name(&self) -> &'static str {
        "graph_factorization"
    }

    fn d(&self) -> usize {
        self.config.d
    }

    fn learn_embedding(&mut self, graph: &Graph) -> Result<&DMatrix<f64>> {
        let n = check_dimensions(graph, self.config.d)?;
        let d = self.config.d;
        let edges = graph.edges();

        let mut y = uniform_init(n, d, 0.1, self.config.seed);
        let mut grad_u = vec![0.0; d];

        for iter in 0..self.config.max_iter {
            for &(u, v, w) in &edges {
                let (u, v) = (u as usize, v as usize);
                let est = y.row(u).dot(&y.row(v));
                let err = w - est;

                // d/dy_u [(w - <y_u,y_v>)^2 + regu/2 ||y_u||^2]
                for k in 0..d {
                    grad_u[k] = -2.0 * err * y[(v, k)] + self.config.regu * y[(u, k)];
                }
                for k in 0..d {
                    let grad_v = -2.0 * err * y[(u, k)] + self.config.regu * y[(v, k)];
                    y[(u, k)] -= self.config.eta * grad_u[k];
                    y[(v, k)] -= self.config.eta * grad_v;
                }
            }

            if (iter + 1) % 100 == 0 {
                tracing::debug!(
                    "graph_factorization iter {}: loss {:.6}",
                    iter + 1,
                    Self::loss(&y, &edges, self.config.regu)
                );
            }
        }

        Ok(self.embedding.insert(y))
    }

    fn embedding(&self) -> Option<&DMatrix<f64>> {
        self.embedding.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::two_block_graph;

    fn quick_config() -> GraphFactorizationConfig {
        GraphFactorizationConfig {
            d: 4,
            max_iter: 50,
            eta: 1e-2,
            regu: 0.1,
            seed: 3,
        }
    }

    #[test]
    fn test_embedding_shape() {
        let graph = two_block_graph();
        let mut model = GraphFactorization::new(quick_config());
        assert!(model.embedding().is_none());

        let y = model.learn_embedding(&graph).unwrap();
        assert_eq!(y.nrows(), graph.node_count());
        assert_eq!(y.ncols(), 4);
        assert!(model.embedding().is_some());
    }

    #[test]
    fn test_training_reduces_loss() {
        let graph = two_block_graph();
        let edges = graph.edges();
        let init = crate::uniform_init(graph.node_count(), 4, 0.1, 3);
        let initial = GraphFactorization::loss(&init, &edges, 0.1);

        let mut model = GraphFactorization::new(quick_config());
        let y = model.learn_embedding(&graph).unwrap();
        let trained = GraphFactorization::loss(y, &edges, 0.1);
        assert!(trained < initial);
    }

    #[test]
    fn test_deterministic_under_seed() {
        let graph = two_block_graph();
        let mut a = GraphFactorization::new(quick_config());
        let mut b = GraphFactorization::new(quick_config());
        assert_eq!(
            a.learn_embedding(&graph).unwrap(),
            b.learn_embedding(&graph).unwrap()
        );
    }

    #[test]
    fn test_dimension_too_large() {
        let graph = two_block_graph();
        let mut config = quick_config();
        config.d = graph.node_count() + 1;
        let mut model = GraphFactorization::new(config);
        assert!(model.learn_embedding(&graph).is_err());
    }
}
