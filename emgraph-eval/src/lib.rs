//! Graph reconstruction evaluation.
//!
//! Measures how well pairwise similarities in a learned embedding predict the
//! original edges: mean average precision over per-node rankings, a global
//! precision@k curve, and the Frobenius reconstruction error against the
//! baseline norm of the true adjacency.

use emgraph_core::Graph;
use emgraph_methods::EmbeddingMethod;
use serde::Serialize;

/// Reconstruction evaluation results.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconstructionMetrics {
    /// Mean average precision over nodes with at least one outgoing edge.
    pub map: f64,
    /// Global precision@k for k = 1..=cap.
    pub precision_curve: Vec<f64>,
    /// Frobenius norm of (estimated - true) adjacency, self-pairs excluded.
    pub err: f64,
    /// Frobenius norm of the true adjacency.
    pub err_baseline: f64,
}

impl ReconstructionMetrics {
    /// One-line summary for reports.
    pub fn summary(&self) -> String {
        let head: Vec<String> = self
            .precision_curve
            .iter()
            .take(5)
            .map(|p| format!("{:.4}", p))
            .collect();
        format!(
            "MAP: {:.6} | P@k head: [{}] | err: {:.4} | err_baseline: {:.4}",
            self.map,
            head.join(", "),
            self.err,
            self.err_baseline
        )
    }
}

fn sort_by_score_desc<T>(pairs: &mut [(T, f64)]) {
    pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
}

/// Precision@k over a ranked hit list (true marks a correctly predicted edge).
///
/// `k` is clamped to the list length; an empty list scores 0.
pub fn precision_at_k(ranked_hits: &[bool], k: usize) -> f64 {
    let k = k.min(ranked_hits.len());
    if k == 0 {
        return 0.0;
    }
    ranked_hits[..k].iter().filter(|&&hit| hit).count() as f64 / k as f64
}

/// Average precision of one node's ranking of all other nodes.
fn average_precision(graph: &Graph, method: &dyn EmbeddingMethod, u: u32, n: usize) -> f64 {
    let mut scored: Vec<(u32, f64)> = (0..n as u32)
        .filter(|&v| v != u)
        .map(|v| (v, method.similarity(u as usize, v as usize)))
        .collect();
    sort_by_score_desc(&mut scored);

    let mut hits = 0usize;
    let mut precision_sum = 0.0;
    for (rank, &(v, _)) in scored.iter().enumerate() {
        if graph.edge_weight(u, v).is_some() {
            hits += 1;
            precision_sum += hits as f64 / (rank + 1) as f64;
        }
    }
    if hits == 0 {
        0.0
    } else {
        precision_sum / hits as f64
    }
}

/// Evaluate a trained method on reconstructing the graph it was trained on.
///
/// `max_k` caps the global precision curve.
pub fn evaluate_reconstruction(
    graph: &Graph,
    method: &dyn EmbeddingMethod,
    max_k: usize,
) -> ReconstructionMetrics {
    let n = graph.node_count();
    if n == 0 {
        return ReconstructionMetrics::default();
    }

    // MAP over nodes that have something to reconstruct.
    let mut ap_sum = 0.0;
    let mut ap_count = 0usize;
    for u in 0..n as u32 {
        if graph.out_degree(u) == 0 {
            continue;
        }
        ap_sum += average_precision(graph, method, u, n);
        ap_count += 1;
    }
    let map = if ap_count > 0 {
        ap_sum / ap_count as f64
    } else {
        0.0
    };

    // Global ranking of every ordered pair, and the error norms.
    let mut scored: Vec<((u32, u32), f64)> = Vec::with_capacity(n * n.saturating_sub(1));
    let mut err_sq = 0.0;
    let mut baseline_sq = 0.0;
    for u in 0..n as u32 {
        for v in 0..n as u32 {
            if u == v {
                continue;
            }
            let est = method.similarity(u as usize, v as usize);
            let truth = graph.edge_weight(u, v).unwrap_or(0.0);
            err_sq += (est - truth) * (est - truth);
            baseline_sq += truth * truth;
            scored.push(((u, v), est));
        }
    }
    sort_by_score_desc(&mut scored);

    let cap = max_k.min(scored.len());
    let mut precision_curve = Vec::with_capacity(cap);
    let mut hits = 0usize;
    for (rank, &((u, v), _)) in scored.iter().take(cap).enumerate() {
        if graph.edge_weight(u, v).is_some() {
            hits += 1;
        }
        precision_curve.push(hits as f64 / (rank + 1) as f64);
    }

    ReconstructionMetrics {
        map,
        precision_curve,
        err: err_sq.sqrt(),
        err_baseline: baseline_sq.sqrt(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emgraph_methods::Result;
    use nalgebra::DMatrix;

    /// Oracle that scores pairs straight from a stored matrix.
    struct FixedScores {
        scores: DMatrix<f64>,
        embedding: DMatrix<f64>,
    }

    impl FixedScores {
        fn new(scores: DMatrix<f64>) -> Self {
            let n = scores.nrows();
            Self {
                scores,
                embedding: DMatrix::zeros(n, 2),
            }
        }
    }

    impl EmbeddingMethod for FixedScores {
        fn method_name(&self) -> &'static str {
            "fixed_scores"
        }

        fn d(&self) -> usize {
            2
        }

        fn learn_embedding(&mut self, _graph: &Graph) -> Result<&DMatrix<f64>> {
            Ok(&self.embedding)
        }

        fn embedding(&self) -> Option<&DMatrix<f64>> {
            Some(&self.embedding)
        }

        fn similarity(&self, i: usize, j: usize) -> f64 {
            self.scores[(i, j)]
        }
    }

    fn chain_graph() -> Graph {
        let mut g = Graph::new();
        g.add_node(0);
        g.add_node(1);
        g.add_node(2);
        g.add_edge(0, 1, 1.0);
        g.add_edge(1, 2, 1.0);
        g
    }

    #[test]
    fn test_perfect_reconstruction() {
        let graph = chain_graph();
        let oracle = FixedScores::new(graph.adjacency_matrix());

        let metrics = evaluate_reconstruction(&graph, &oracle, 10);
        assert!((metrics.map - 1.0).abs() < 1e-12);
        assert!(metrics.err < 1e-12);
        assert!((metrics.err_baseline - 2.0f64.sqrt()).abs() < 1e-12);
        // Both true edges rank first: precision stays 1.0 through k=2.
        assert!((metrics.precision_curve[0] - 1.0).abs() < 1e-12);
        assert!((metrics.precision_curve[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_inverted_scores_rank_poorly() {
        let graph = chain_graph();
        let inverted = FixedScores::new(-graph.adjacency_matrix());
        let metrics = evaluate_reconstruction(&graph, &inverted, 10);
        assert!(metrics.map < 1.0);
        assert!(metrics.precision_curve[0] < 1.0);
    }

    #[test]
    fn test_metrics_within_unit_range() {
        let graph = chain_graph();
        let scores = DMatrix::from_fn(3, 3, |i, j| ((i * 7 + j * 3) % 5) as f64 / 5.0);
        let metrics = evaluate_reconstruction(&graph, &FixedScores::new(scores), 6);
        assert!((0.0..=1.0).contains(&metrics.map));
        for p in &metrics.precision_curve {
            assert!((0.0..=1.0).contains(p));
        }
    }

    #[test]
    fn test_curve_capped() {
        let graph = chain_graph();
        let oracle = FixedScores::new(graph.adjacency_matrix());
        let metrics = evaluate_reconstruction(&graph, &oracle, 3);
        assert_eq!(metrics.precision_curve.len(), 3);
    }

    #[test]
    fn test_precision_at_k() {
        let hits = [true, false, true, true];
        assert!((precision_at_k(&hits, 1) - 1.0).abs() < 1e-12);
        assert!((precision_at_k(&hits, 2) - 0.5).abs() < 1e-12);
        assert!((precision_at_k(&hits, 4) - 0.75).abs() < 1e-12);
        // k beyond the list clamps; empty list scores zero.
        assert!((precision_at_k(&hits, 10) - 0.75).abs() < 1e-12);
        assert_eq!(precision_at_k(&[], 3), 0.0);
    }

    #[test]
    fn test_empty_graph_defaults() {
        let graph = Graph::new();
        let oracle = FixedScores::new(DMatrix::zeros(0, 0));
        let metrics = evaluate_reconstruction(&graph, &oracle, 5);
        assert_eq!(metrics.map, 0.0);
        assert!(metrics.precision_curve.is_empty());
    }
}
