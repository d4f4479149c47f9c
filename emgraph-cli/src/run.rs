//! Experiment orchestration.
//!
//! A run is a flat sequence: load graph and labels, build the model list,
//! then train, evaluate and export one model at a time. Results go to stdout;
//! diagnostics go through tracing.

use anyhow::Context;
use emgraph_core::{formats, labels, sbm, GraphFormat, SbmConfig};
use emgraph_eval::evaluate_reconstruction;
use emgraph_methods::{
    EmbeddingMethod, GraphFactorization, GraphFactorizationConfig, Hope, HopeConfig,
    LaplacianEigenmaps, LaplacianEigenmapsConfig, LocallyLinearEmbedding,
    LocallyLinearEmbeddingConfig, Node2Vec, Node2VecConfig, Sdne, SdneConfig,
};
use emgraph_utils::ExperimentConfig;
use emgraph_viz::{export_dot, export_scatter, project_2d, VizConfig};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub struct RunArgs {
    pub data: PathBuf,
    pub labels: PathBuf,
    pub node2vec_flag: Option<String>,
    pub output_dir: PathBuf,
    pub max_k: usize,
    pub config: Option<PathBuf>,
}

/// Lenient flag parse: any integer enables on nonzero, everything else
/// (missing value included) disables.
pub(crate) fn parse_node2vec_flag(value: Option<&str>) -> bool {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .map(|v| v != 0)
        .unwrap_or(false)
}

/// The model lineup with its standard hyper-parameters.
fn build_models(run_n2v: bool) -> Vec<Box<dyn EmbeddingMethod>> {
    let mut models: Vec<Box<dyn EmbeddingMethod>> = Vec::new();
    models.push(Box::new(GraphFactorization::new(GraphFactorizationConfig {
        d: 128,
        max_iter: 1000,
        eta: 1e-4,
        regu: 1.0,
        seed: 42,
    })));
    models.push(Box::new(Hope::new(HopeConfig { d: 256, beta: 0.01 })));
    models.push(Box::new(LaplacianEigenmaps::new(LaplacianEigenmapsConfig {
        d: 128,
    })));
    models.push(Box::new(LocallyLinearEmbedding::new(
        LocallyLinearEmbeddingConfig { d: 128 },
    )));
    if run_n2v {
        models.push(Box::new(Node2Vec::new(Node2VecConfig {
            d: 182,
            walk_len: 80,
            num_walks: 10,
            context_size: 10,
            ret_p: 1.0,
            inout_p: 1.0,
            max_iter: 1,
            ..Default::default()
        })));
    }
    models.push(Box::new(Sdne::new(SdneConfig {
        d: 128,
        beta: 5.0,
        alpha: 1e-5,
        nu1: 1e-6,
        nu2: 1e-6,
        hidden_units: vec![500, 300],
        n_iter: 30,
        xeta: 0.001,
        n_batch: 500,
        seed: 42,
    })));
    models
}

/// Run the full experiment.
pub fn run_experiment(args: RunArgs) -> anyhow::Result<()> {
    let (data_path, labels_path, output_dir, max_k, mut run_n2v) = match &args.config {
        Some(path) => {
            let config = ExperimentConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?;
            (
                config.data,
                config.labels,
                config.output_dir,
                config.max_k,
                config.node2vec,
            )
        }
        None => (
            args.data.clone(),
            args.labels.clone(),
            args.output_dir.clone(),
            args.max_k,
            false,
        ),
    };
    if args.node2vec_flag.is_some() {
        run_n2v = parse_node2vec_flag(args.node2vec_flag.as_deref());
    }

    let (graph, format) = formats::load_graph(&data_path)
        .with_context(|| format!("loading graph {}", data_path.display()))?;
    if format == GraphFormat::LegacyAdjacency {
        tracing::info!("graph file was in the legacy format; consider `emgraph migrate`");
    }

    let node_labels = labels::load_labels(&labels_path, Some(graph.node_count()))
        .with_context(|| format!("loading labels {}", labels_path.display()))?;

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;
    export_dot(&graph, Some(&node_labels), &output_dir.join("graph.dot"))?;

    let stats = graph.stats();
    let viz_config = VizConfig::default();

    for mut model in build_models(run_n2v) {
        println!(
            "Num nodes: {}, num edges: {}",
            stats.node_count, stats.edge_count
        );

        let t1 = Instant::now();
        let method_name = model.method_name();
        model
            .learn_embedding(&graph)
            .with_context(|| format!("training {}", method_name))?;
        println!(
            "{}:\n\tTraining time: {:.6}",
            model.method_name(),
            t1.elapsed().as_secs_f64()
        );

        let metrics = evaluate_reconstruction(&graph, model.as_ref(), max_k);
        let curve_head: Vec<f64> = metrics.precision_curve.iter().take(5).copied().collect();
        println!(
            "\tMAP: {:.6} \t precision curve: {:?}",
            metrics.map, curve_head
        );

        let embedding = model
            .embedding()
            .context("model has no embedding after training")?;
        let points = project_2d(embedding)?;
        let plot_path = output_dir.join(format!("{}.txt", model.method_name()));
        export_scatter(
            &points,
            &node_labels.0,
            model.method_name(),
            &plot_path,
            &viz_config,
        )?;
        tracing::info!("exported {}", plot_path.display());

        println!("{}", "-".repeat(100));
    }

    Ok(())
}

/// Generate the benchmark files consumed by `run`.
pub fn generate_benchmark(
    blocks: usize,
    block_size: usize,
    p_in: f64,
    p_out: f64,
    seed: u64,
    data: &Path,
    labels_path: &Path,
) -> anyhow::Result<()> {
    let config = SbmConfig {
        block_sizes: vec![block_size; blocks],
        p_in,
        p_out,
        seed,
    };
    let sample = sbm::generate(&config)?;

    for path in [data, labels_path] {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
    }
    formats::save_graph(&sample.graph, data)?;
    labels::save_labels(&sample.labels, labels_path)?;

    let stats = sample.graph.stats();
    println!(
        "Generated SBM benchmark: {} nodes, {} edges, {} blocks",
        stats.node_count, stats.edge_count, blocks
    );
    println!("Graph: {}", data.display());
    println!("Labels: {}", labels_path.display());
    Ok(())
}

/// Convert a legacy graph file to the current format.
pub fn migrate_file(input: &Path, output: &Path) -> anyhow::Result<()> {
    let (graph, format) = formats::load_graph(input)
        .with_context(|| format!("loading graph {}", input.display()))?;
    if format == GraphFormat::NodeLink {
        println!("{} is already in the current format", input.display());
    }
    formats::save_graph(&graph, output)?;
    println!(
        "Wrote {} ({} nodes, {} edges)",
        output.display(),
        graph.node_count(),
        graph.edge_count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_missing_defaults_false() {
        assert!(!parse_node2vec_flag(None));
    }

    #[test]
    fn test_flag_zero_and_one() {
        assert!(!parse_node2vec_flag(Some("0")));
        assert!(parse_node2vec_flag(Some("1")));
    }

    #[test]
    fn test_flag_invalid_defaults_false() {
        assert!(!parse_node2vec_flag(Some("yes")));
        assert!(!parse_node2vec_flag(Some("")));
        assert!(!parse_node2vec_flag(Some("1.5")));
    }

    #[test]
    fn test_flag_any_nonzero_integer_enables() {
        assert!(parse_node2vec_flag(Some("2")));
        assert!(parse_node2vec_flag(Some("-1")));
        assert!(parse_node2vec_flag(Some(" 1 ")));
    }

    #[test]
    fn test_model_lineup() {
        let without = build_models(false);
        let with = build_models(true);
        assert_eq!(without.len(), 5);
        assert_eq!(with.len(), 6);
        assert!(with.iter().any(|m| m.method_name() == "node2vec"));
        assert!(!without.iter().any(|m| m.method_name() == "node2vec"));
        // Order matches the experiment protocol: factorization first, SDNE last.
        assert_eq!(without[0].method_name(), "graph_factorization");
        assert_eq!(without.last().map(|m| m.method_name()), Some("sdne"));
    }
}
