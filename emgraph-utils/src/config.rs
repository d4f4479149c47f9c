//! Experiment configuration files.
//!
//! The driver takes everything it needs from the command line, but repeated
//! experiment sweeps are easier to keep in a config file. TOML and JSON are
//! both accepted, keyed on file extension.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level experiment configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Path to the graph file (node-link or legacy format).
    pub data: PathBuf,
    /// Path to the node-label matrix file.
    pub labels: PathBuf,
    /// Directory for exported visualizations.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Whether to include the random-walk model in the run.
    #[serde(default)]
    pub node2vec: bool,
    /// Precision-curve cap.
    #[serde(default = "default_max_k")]
    pub max_k: usize,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("visualizations")
}

fn default_max_k() -> usize {
    100
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            data: PathBuf::from("data/sbm.json"),
            labels: PathBuf::from("data/sbm_labels.json"),
            output_dir: default_output_dir(),
            node2vec: false,
            max_k: default_max_k(),
        }
    }
}

impl ExperimentConfig {
    /// Load configuration from a TOML or JSON file (keyed on extension).
    pub fn load(path: &Path) -> crate::Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();

        let content = std::fs::read_to_string(path)?;

        match extension.as_str() {
            "toml" => toml::from_str(&content)
                .map_err(|e| crate::UtilError::Config(format!("TOML parse error: {}", e))),
            "json" => serde_json::from_str(&content)
                .map_err(|e| crate::UtilError::Config(format!("JSON parse error: {}", e))),
            _ => Err(crate::UtilError::Config(format!(
                "Unsupported config format: {}",
                extension
            ))),
        }
    }
}
