//! node2vec: biased random walks plus skip-gram training.
//!
//! Walks are second-order with return parameter `p` and in-out parameter `q`,
//! sampled by rejection so each step is O(1) expected instead of O(d^2).
//! The skip-gram uses negative sampling with the unigram^0.75 distribution.
//!
//! Grover & Leskovec, "node2vec: Scalable Feature Learning for Networks"
//! (KDD 2016).

use crate::{check_dimensions, EmbeddingMethod, Result};
use emgraph_core::Graph;
use nalgebra::DMatrix;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Hyper-parameters for node2vec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node2VecConfig {
    /// Embedding dimension.
    pub d: usize,
    /// Length of each walk.
    pub walk_len: usize,
    /// Walks started from every node.
    pub num_walks: usize,
    /// Skip-gram context window (each side).
    pub context_size: usize,
    /// Return parameter p: high values discourage backtracking.
    pub ret_p: f64,
    /// In-out parameter q: low values push walks outward.
    pub inout_p: f64,
    /// Skip-gram epochs over the walk corpus.
    pub max_iter: usize,
    /// Negative samples per positive pair.
    pub negative_samples: usize,
    /// Initial learning rate, decayed linearly to a tenth.
    pub learning_rate: f64,
    /// RNG seed.
    pub seed: u64,
}

impl Default for Node2VecConfig {
    fn default() -> Self {
        Self {
            d: 128,
            walk_len: 80,
            num_walks: 10,
            context_size: 10,
            ret_p: 1.0,
            inout_p: 1.0,
            max_iter: 1,
            negative_samples: 5,
            learning_rate: 0.025,
            seed: 42,
        }
    }
}

/// node2vec trainer: walk corpus generation followed by SGNS.
#[derive(Debug)]
pub struct Node2Vec {
    config: Node2VecConfig,
    embedding: Option<DMatrix<f64>>,
}

impl Node2Vec {
    pub fn new(config: Node2VecConfig) -> Self {
        Self {
            config,
            embedding: None,
        }
    }

    /// Generate the walk corpus, one parallel batch per walk iteration.
    fn generate_walks(&self, neighbors: &[Vec<u32>]) -> Vec<Vec<u32>> {
        let n = neighbors.len();
        let unbiased = (self.config.ret_p - 1.0).abs() < f64::EPSILON
            && (self.config.inout_p - 1.0).abs() < f64::EPSILON;

        (0..self.config.num_walks)
            .into_par_iter()
            .flat_map(|iter_idx| {
                let mut rng = XorShiftRng::seed_from_u64(self.config.seed + iter_idx as u64);
                let mut starts: Vec<u32> = (0..n as u32).collect();
                starts.shuffle(&mut rng);

                let mut walks = Vec::with_capacity(n);
                for &start in &starts {
                    let walk = if unbiased {
                        self.unbiased_walk(start, neighbors, &mut rng)
                    } else {
                        self.biased_walk(start, neighbors, &mut rng)
                    };
                    walks.push(walk);
                }
                walks
            })
            .collect()
    }

    fn unbiased_walk<R: Rng>(&self, start: u32, neighbors: &[Vec<u32>], rng: &mut R) -> Vec<u32> {
        let mut walk = Vec::with_capacity(self.config.walk_len);
        walk.push(start);
        let mut curr = start;
        for _ in 1..self.config.walk_len {
            let outs = &neighbors[curr as usize];
            let Some(&next) = outs.choose(rng) else {
                break;
            };
            walk.push(next);
            curr = next;
        }
        walk
    }

    fn biased_walk<R: Rng>(&self, start: u32, neighbors: &[Vec<u32>], rng: &mut R) -> Vec<u32> {
        let mut walk = Vec::with_capacity(self.config.walk_len);
        walk.push(start);

        let mut curr = start;
        let mut prev: Option<u32> = None;
        let mut prev_neighbors: HashSet<u32> = HashSet::new();

        for _ in 1..self.config.walk_len {
            let outs = &neighbors[curr as usize];
            if outs.is_empty() {
                break;
            }
            let next = if let Some(prev_node) = prev {
                self.sample_biased_rejection(rng, prev_node, &prev_neighbors, outs)
            } else {
                *outs.choose(rng).unwrap_or(&curr)
            };

            walk.push(next);
            prev = Some(curr);
            prev_neighbors.clear();
            prev_neighbors.extend(neighbors[curr as usize].iter().copied());
            curr = next;
        }
        walk
    }

    /// Rejection sampling over the current node's out-neighbors.
    ///
    /// Unnormalized acceptance: 1/p for returning to the previous node, 1 for
    /// a neighbor of the previous node, 1/q for moving outward.
    fn sample_biased_rejection<R: Rng>(
        &self,
        rng: &mut R,
        prev_node: u32,
        prev_neighbors: &HashSet<u32>,
        outs: &[u32],
    ) -> u32 {
        let p = self.config.ret_p;
        let q = self.config.inout_p;
        let max_prob = (1.0 / p).max(1.0).max(1.0 / q);

        // Expected a couple of trials; the cap only matters for extreme p/q.
        for _ in 0..128 {
            let candidate = outs[rng.gen_range(0..outs.len())];
            let accept = if candidate == prev_node {
                (1.0 / p) / max_prob
            } else if prev_neighbors.contains(&candidate) {
                1.0 / max_prob
            } else {
                (1.0 / q) / max_prob
            };
            if rng.gen::<f64>() < accept {
                return candidate;
            }
        }
        outs[rng.gen_range(0..outs.len())]
    }
}

/// Skip-gram with negative sampling over a walk corpus.
struct SkipGram {
    /// Target embeddings, row-major n-by-d.
    embeddings: Vec<f64>,
    /// Context embeddings, discarded after training.
    context: Vec<f64>,
    d: usize,
    neg_table: Vec<u32>,
    learning_rate: f64,
    current_lr: f64,
    words_processed: usize,
    total_words: usize,
}

const NEG_TABLE_SIZE: usize = 1_000_000;

impl SkipGram {
    fn new(n: usize, d: usize, learning_rate: f64, frequencies: &[u32], seed: u64) -> Self {
        let mut rng = XorShiftRng::seed_from_u64(seed);
        let scale = 0.5 / d as f64;
        let embeddings: Vec<f64> = (0..n * d).map(|_| rng.gen_range(-scale..scale)).collect();

        Self {
            embeddings,
            context: vec![0.0; n * d],
            d,
            neg_table: Self::build_neg_table(n, frequencies),
            learning_rate,
            current_lr: learning_rate,
            words_processed: 0,
            total_words: 0,
        }
    }

    /// Unigram^0.75 sampling table, as in the original Word2Vec.
    fn build_neg_table(n: usize, frequencies: &[u32]) -> Vec<u32> {
        let total: f64 = frequencies.iter().map(|&f| (f as f64).powf(0.75)).sum();
        if total <= 0.0 {
            return (0..n as u32).collect();
        }

        let mut table = Vec::with_capacity(NEG_TABLE_SIZE);
        let mut cumulative = 0.0;
        for (node, &freq) in frequencies.iter().enumerate() {
            cumulative += (freq as f64).powf(0.75) / total;
            let fill_to = (cumulative * NEG_TABLE_SIZE as f64) as usize;
            while table.len() < fill_to.min(NEG_TABLE_SIZE) {
                table.push(node as u32);
            }
        }
        while table.len() < NEG_TABLE_SIZE {
            table.push((n - 1) as u32);
        }
        table
    }

    fn train_walk<R: Rng>(&mut self, walk: &[u32], window: usize, neg_samples: usize, rng: &mut R) {
        for (pos, &target) in walk.iter().enumerate() {
            let actual_window = rng.gen_range(1..=window);
            let start = pos.saturating_sub(actual_window);
            let end = (pos + actual_window + 1).min(walk.len());

            for ctx_pos in start..end {
                if ctx_pos == pos {
                    continue;
                }
                let context_node = walk[ctx_pos] as usize;
                self.train_pair(target as usize, context_node, true);

                for _ in 0..neg_samples {
                    let neg = self.neg_table[rng.gen_range(0..self.neg_table.len())] as usize;
                    if neg != context_node {
                        self.train_pair(target as usize, neg, false);
                    }
                }
            }

            self.words_processed += 1;
            self.update_lr();
        }
    }

    fn train_pair(&mut self, target: usize, context: usize, positive: bool) {
        let d = self.d;
        let (t_off, c_off) = (target * d, context * d);

        let mut dot = 0.0;
        for i in 0..d {
            dot += self.embeddings[t_off + i] * self.context[c_off + i];
        }

        let label = if positive { 1.0 } else { 0.0 };
        let sigmoid = 1.0 / (1.0 + (-dot).exp());
        let grad = (label - sigmoid) * self.current_lr;

        for i in 0..d {
            let t_grad = grad * self.context[c_off + i];
            let c_grad = grad * self.embeddings[t_off + i];
            self.embeddings[t_off + i] += t_grad;
            self.context[c_off + i] += c_grad;
        }
    }

    fn update_lr(&mut self) {
        if self.total_words == 0 {
            return;
        }
        let progress = self.words_processed as f64 / self.total_words as f64;
        let floor = self.learning_rate * 0.1;
        self.current_lr = (self.learning_rate * (1.0 - progress)).max(floor);
    }
}

impl EmbeddingMethod for Node2Vec {
    fn method_name(&self) -> &'static str {
        "node2vec"
    }

    fn d(&self) -> usize {
        self.config.d
    }

    fn learn_embedding(&mut self, graph: &Graph) -> Result<&DMatrix<f64>> {
        let n = check_dimensions(graph, self.config.d)?;

        let neighbors: Vec<Vec<u32>> = (0..n as u32)
            .map(|id| {
                graph
                    .out_neighbors(id)
                    .into_iter()
                    .map(|(target, _)| target)
                    .collect()
            })
            .collect();

        let walks = self.generate_walks(&neighbors);
        tracing::debug!(
            "node2vec: {} walks, average length {:.1}",
            walks.len(),
            walks.iter().map(|w| w.len()).sum::<usize>() as f64 / walks.len().max(1) as f64
        );

        let mut frequencies = vec![0u32; n];
        for walk in &walks {
            for &node in walk {
                frequencies[node as usize] += 1;
            }
        }

        let mut model = SkipGram::new(
            n,
            self.config.d,
            self.config.learning_rate,
            &frequencies,
            self.config.seed,
        );
        let corpus_words: usize = walks.iter().map(|w| w.len()).sum();
        model.total_words = corpus_words * self.config.max_iter;

        let mut rng = XorShiftRng::seed_from_u64(self.config.seed.wrapping_add(0x5eed));
        for _ in 0..self.config.max_iter {
            for walk in &walks {
                model.train_walk(
                    walk,
                    self.config.context_size,
                    self.config.negative_samples,
                    &mut rng,
                );
            }
        }

        let y = DMatrix::from_row_slice(n, self.config.d, &model.embeddings);
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

    fn quick_config() -> Node2VecConfig {
        Node2VecConfig {
            d: 8,
            walk_len: 10,
            num_walks: 3,
            context_size: 3,
            negative_samples: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_embedding_shape() {
        let graph = two_block_graph();
        let mut model = Node2Vec::new(quick_config());
        let y = model.learn_embedding(&graph).unwrap();
        assert_eq!(y.nrows(), graph.node_count());
        assert_eq!(y.ncols(), 8);
        assert!(y.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_walks_respect_length_and_start() {
        let graph = two_block_graph();
        let config = quick_config();
        let n = graph.node_count();
        let neighbors: Vec<Vec<u32>> = (0..n as u32)
            .map(|id| graph.out_neighbors(id).into_iter().map(|(t, _)| t).collect())
            .collect();

        let model = Node2Vec::new(config.clone());
        let walks = model.generate_walks(&neighbors);
        assert_eq!(walks.len(), n * config.num_walks);
        for walk in &walks {
            assert!(!walk.is_empty());
            assert!(walk.len() <= config.walk_len);
            for window in walk.windows(2) {
                assert!(neighbors[window[0] as usize].contains(&window[1]));
            }
        }
    }

    #[test]
    fn test_walk_stops_at_dead_end() {
        // 0 -> 1, 1 has no out-edges.
        let neighbors = vec![vec![1u32], vec![]];
        let model = Node2Vec::new(quick_config());
        let walks = model.generate_walks(&neighbors);
        for walk in &walks {
            assert!(walk.len() <= 2);
        }
    }

    #[test]
    fn test_biased_walk_prefers_backtracking_with_low_p() {
        let graph = two_block_graph();
        let n = graph.node_count();
        let neighbors: Vec<Vec<u32>> = (0..n as u32)
            .map(|id| graph.out_neighbors(id).into_iter().map(|(t, _)| t).collect())
            .collect();

        let mut config = quick_config();
        config.ret_p = 0.05;
        config.inout_p = 4.0;
        config.walk_len = 40;
        let model = Node2Vec::new(config);
        let walks = model.generate_walks(&neighbors);

        // With a tiny return parameter, immediate backtracks (w[i] == w[i-2])
        // should be common.
        let mut backtracks = 0usize;
        let mut steps = 0usize;
        for walk in &walks {
            for w in walk.windows(3) {
                steps += 1;
                if w[0] == w[2] {
                    backtracks += 1;
                }
            }
        }
        assert!(steps > 0);
        assert!(backtracks as f64 / steps as f64 > 0.2);
    }

    #[test]
    fn test_deterministic_under_seed() {
        let graph = two_block_graph();
        let mut a = Node2Vec::new(quick_config());
        let mut b = Node2Vec::new(quick_config());
        assert_eq!(
            a.learn_embedding(&graph).unwrap(),
            b.learn_embedding(&graph).unwrap()
        );
    }
}
