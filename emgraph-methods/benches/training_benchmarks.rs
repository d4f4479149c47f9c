//! Training benchmarks over a small SBM benchmark graph.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use emgraph_core::{sbm, SbmConfig};
use emgraph_methods::{
    EmbeddingMethod, GraphFactorization, GraphFactorizationConfig, Hope, HopeConfig,
};

fn bench_graph() -> emgraph_core::Graph {
    sbm::generate(&SbmConfig {
        block_sizes: vec![32, 32, 32],
        p_in: 0.2,
        p_out: 0.02,
        seed: 9,
    })
    .expect("valid config")
    .graph
}

fn bench_graph_factorization(c: &mut Criterion) {
    let graph = bench_graph();
    c.bench_function("graph_factorization_96_nodes", |b| {
        b.iter(|| {
            let mut model = GraphFactorization::new(GraphFactorizationConfig {
                d: 16,
                max_iter: 20,
                eta: 1e-3,
                regu: 0.1,
                seed: 1,
            });
            black_box(model.learn_embedding(&graph).expect("training succeeds"));
        })
    });
}

fn bench_hope(c: &mut Criterion) {
    let graph = bench_graph();
    c.bench_function("hope_96_nodes", |b| {
        b.iter(|| {
            let mut model = Hope::new(HopeConfig { d: 16, beta: 0.01 });
            black_box(model.learn_embedding(&graph).expect("training succeeds"));
        })
    });
}

criterion_group!(benches, bench_graph_factorization, bench_hope);
criterion_main!(benches);
