//! emgraph driver entry point.
//!
//! `run` executes the experiment end to end: load the benchmark graph and
//! labels, train each embedding model, evaluate graph reconstruction, and
//! export a 2-D visualization per model. `generate` and `migrate` produce and
//! upgrade the benchmark files it consumes.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod run;

#[derive(Parser)]
#[command(name = "emgraph")]
#[command(about = "Graph embedding experiments on an SBM benchmark graph")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train each embedding model, evaluate reconstruction, export plots
    Run {
        /// Graph file; legacy-format files are migrated on load
        #[arg(short = 'd', long, default_value = "data/sbm.json")]
        data: PathBuf,

        /// Node-label matrix file
        #[arg(short = 'l', long, default_value = "data/sbm_labels.json")]
        labels: PathBuf,

        /// Whether to run node2vec: "1" enables it, anything else is off
        #[arg(short = 'n', long, value_name = "0|1")]
        node2vec: Option<String>,

        /// Output directory for exported visualizations
        #[arg(short = 'o', long, default_value = "visualizations")]
        output_dir: PathBuf,

        /// Number of points kept on the precision curve
        #[arg(long, default_value_t = 100)]
        max_k: usize,

        /// Experiment config file (TOML or JSON); replaces the path defaults
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,
    },

    /// Generate the SBM benchmark graph and label files
    Generate {
        /// Number of blocks
        #[arg(long, default_value_t = 8)]
        blocks: usize,

        /// Nodes per block
        #[arg(long, default_value_t = 128)]
        block_size: usize,

        /// Within-block edge probability
        #[arg(long, default_value_t = 0.1)]
        p_in: f64,

        /// Across-block edge probability
        #[arg(long, default_value_t = 0.01)]
        p_out: f64,

        /// RNG seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Graph output path
        #[arg(short = 'd', long, default_value = "data/sbm.json")]
        data: PathBuf,

        /// Label output path
        #[arg(short = 'l', long, default_value = "data/sbm_labels.json")]
        labels: PathBuf,
    },

    /// Convert a legacy graph file to the current node-link format
    Migrate {
        /// Legacy graph file
        input: PathBuf,

        /// Destination for the converted file
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    emgraph_utils::basic_config(None)?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            data,
            labels,
            node2vec,
            output_dir,
            max_k,
            config,
        } => run::run_experiment(run::RunArgs {
            data,
            labels,
            node2vec_flag: node2vec,
            output_dir,
            max_k,
            config,
        }),
        Commands::Generate {
            blocks,
            block_size,
            p_in,
            p_out,
            seed,
            data,
            labels,
        } => run::generate_benchmark(blocks, block_size, p_in, p_out, seed, &data, &labels),
        Commands::Migrate { input, output } => run::migrate_file(&input, &output),
    }
}
