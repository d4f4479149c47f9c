//! Stochastic-block-model benchmark synthesis.
//!
//! Generates the directed benchmark graph and its one-hot label matrix from a
//! seeded RNG, so a full experiment is reproducible from the config alone.

use crate::graph::Graph;
use crate::labels::NodeLabels;
use crate::{CoreError, Result};
use rand::Rng;
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use serde::{Deserialize, Serialize};

/// Block-model parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SbmConfig {
    /// Nodes per block.
    pub block_sizes: Vec<usize>,
    /// Edge probability within a block.
    pub p_in: f64,
    /// Edge probability across blocks.
    pub p_out: f64,
    /// RNG seed.
    pub seed: u64,
}

impl Default for SbmConfig {
    fn default() -> Self {
        Self {
            block_sizes: vec![128, 128, 128, 128, 128, 128, 128, 128],
            p_in: 0.1,
            p_out: 0.01,
            seed: 42,
        }
    }
}

impl SbmConfig {
    fn validate(&self) -> Result<()> {
        if self.block_sizes.is_empty() || self.block_sizes.iter().any(|&s| s == 0) {
            return Err(CoreError::InvalidConfig(
                "block sizes must be non-empty and positive".into(),
            ));
        }
        for (name, p) in [("p_in", self.p_in), ("p_out", self.p_out)] {
            if !(0.0..=1.0).contains(&p) {
                return Err(CoreError::InvalidConfig(format!(
                    "{} must be in [0, 1], got {}",
                    name, p
                )));
            }
        }
        Ok(())
    }
}

/// A synthesized benchmark: the graph plus its labels.
#[derive(Debug, Clone)]
pub struct SbmSample {
    pub graph: Graph,
    pub labels: NodeLabels,
}

/// Draw a directed SBM graph.
///
/// Every ordered pair (u, v), u != v, gets an edge with probability `p_in`
/// when both endpoints share a block and `p_out` otherwise. Node ids are dense
/// and blocks are contiguous id ranges.
pub fn generate(config: &SbmConfig) -> Result<SbmSample> {
    config.validate()?;

    let n: usize = config.block_sizes.iter().sum();
    let mut block_of = Vec::with_capacity(n);
    for (block, &size) in config.block_sizes.iter().enumerate() {
        block_of.extend(std::iter::repeat(block as u32).take(size));
    }

    let mut rng = XorShiftRng::seed_from_u64(config.seed);
    let mut graph = Graph::new();
    for id in 0..n as u32 {
        graph.add_node(id);
        graph.set_community(id, block_of[id as usize]);
    }

    for u in 0..n {
        for v in 0..n {
            if u == v {
                continue;
            }
            let p = if block_of[u] == block_of[v] {
                config.p_in
            } else {
                config.p_out
            };
            if rng.gen::<f64>() < p {
                graph.add_edge(u as u32, v as u32, 1.0);
            }
        }
    }

    tracing::debug!(
        "generated SBM graph: {} nodes, {} edges, {} blocks",
        graph.node_count(),
        graph.edge_count(),
        config.block_sizes.len()
    );

    Ok(SbmSample {
        graph,
        labels: NodeLabels(block_of),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SbmConfig {
        SbmConfig {
            block_sizes: vec![10, 10],
            p_in: 0.5,
            p_out: 0.05,
            seed: 7,
        }
    }

    #[test]
    fn test_generate_shapes() {
        let sample = generate(&small_config()).unwrap();
        assert_eq!(sample.graph.node_count(), 20);
        assert_eq!(sample.labels.len(), 20);
        assert_eq!(sample.labels.community_count(), 2);
        assert!(sample.graph.has_dense_ids());
    }

    #[test]
    fn test_generate_is_deterministic() {
        let a = generate(&small_config()).unwrap();
        let b = generate(&small_config()).unwrap();
        assert_eq!(a.graph.edges(), b.graph.edges());
    }

    #[test]
    fn test_block_structure_dominates() {
        let sample = generate(&small_config()).unwrap();
        let (mut within, mut across) = (0usize, 0usize);
        for (u, v, _) in sample.graph.edges() {
            if sample.labels.community(u) == sample.labels.community(v) {
                within += 1;
            } else {
                across += 1;
            }
        }
        assert!(within > across);
    }

    #[test]
    fn test_invalid_probability_rejected() {
        let mut config = small_config();
        config.p_in = 1.5;
        assert!(generate(&config).is_err());
    }

    #[test]
    fn test_empty_blocks_rejected() {
        let mut config = small_config();
        config.block_sizes.clear();
        assert!(generate(&config).is_err());
    }
}
