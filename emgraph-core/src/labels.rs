//! Node-label matrix loading.
//!
//! Labels arrive as a one-hot matrix, one row per node: either a bare JSON
//! matrix or an object with a `description` string and a `labels` matrix.
//! Some producers wrote the described form in Latin-1; loading first tries
//! UTF-8 and falls back to a Latin-1 re-decode of the same bytes.

use crate::{CoreError, Result};
use serde::Deserialize;
use std::path::Path;

/// Community assignment per node, collapsed from the one-hot matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLabels(pub Vec<u32>);

impl NodeLabels {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Community of the given node.
    pub fn community(&self, node: u32) -> Option<u32> {
        self.0.get(node as usize).copied()
    }

    /// Number of distinct communities.
    pub fn community_count(&self) -> usize {
        let mut seen: Vec<u32> = self.0.clone();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LabelFile {
    Matrix(Vec<Vec<f64>>),
    Described {
        #[serde(default)]
        #[allow(dead_code)]
        description: Option<String>,
        labels: Vec<Vec<f64>>,
    },
}

impl LabelFile {
    fn into_rows(self) -> Vec<Vec<f64>> {
        match self {
            LabelFile::Matrix(rows) => rows,
            LabelFile::Described { labels, .. } => labels,
        }
    }
}

fn collapse_one_hot(rows: Vec<Vec<f64>>) -> Result<NodeLabels> {
    let mut communities = Vec::with_capacity(rows.len());
    for (row_idx, row) in rows.iter().enumerate() {
        let community = row
            .iter()
            .position(|&v| v == 1.0)
            .ok_or_else(|| {
                CoreError::MalformedLabels(format!("row {} has no entry equal to 1", row_idx))
            })?;
        communities.push(community as u32);
    }
    Ok(NodeLabels(communities))
}

/// Load the one-hot label matrix, with the Latin-1 encoding fallback.
///
/// When `expected_nodes` is given, the row count must match it.
pub fn load_labels(path: &Path, expected_nodes: Option<usize>) -> Result<NodeLabels> {
    let bytes = std::fs::read(path)?;
    let content = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(
                "label file {} is not valid UTF-8, re-decoding as Latin-1",
                path.display()
            );
            decode_latin1(err.as_bytes())
        }
    };

    let file: LabelFile = serde_json::from_str(&content)?;
    let labels = collapse_one_hot(file.into_rows())?;

    if let Some(expected) = expected_nodes {
        if labels.len() != expected {
            return Err(CoreError::MalformedLabels(format!(
                "label rows ({}) do not match node count ({})",
                labels.len(),
                expected
            )));
        }
    }
    Ok(labels)
}

/// Save labels as a one-hot matrix in the current format.
pub fn save_labels(labels: &NodeLabels, path: &Path) -> Result<()> {
    let width = labels
        .0
        .iter()
        .map(|&c| c as usize + 1)
        .max()
        .unwrap_or(0);
    let rows: Vec<Vec<f64>> = labels
        .0
        .iter()
        .map(|&c| {
            let mut row = vec![0.0; width];
            row[c as usize] = 1.0;
            row
        })
        .collect();
    let content = serde_json::to_string(&rows)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_one_hot() {
        let labels =
            collapse_one_hot(vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        assert_eq!(labels.0, vec![1, 0, 1]);
        assert_eq!(labels.community_count(), 2);
    }

    #[test]
    fn test_row_without_one_is_rejected() {
        assert!(collapse_one_hot(vec![vec![0.0, 0.5]]).is_err());
    }

    #[test]
    fn test_load_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        std::fs::write(&path, "[[1.0, 0.0], [0.0, 1.0]]").unwrap();

        let labels = load_labels(&path, Some(2)).unwrap();
        assert_eq!(labels.0, vec![0, 1]);
    }

    #[test]
    fn test_load_latin1_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        // 0xE9 is a bare Latin-1 e-acute: invalid UTF-8, valid after the
        // fallback re-decode.
        let mut bytes = b"{\"description\": \"communaut".to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b"s\", \"labels\": [[1.0, 0.0]]}");
        std::fs::write(&path, bytes).unwrap();

        let labels = load_labels(&path, Some(1)).unwrap();
        assert_eq!(labels.0, vec![0]);
    }

    #[test]
    fn test_load_described_form() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        std::fs::write(
            &path,
            r#"{"description": "two blocks", "labels": [[0.0, 1.0]]}"#,
        )
        .unwrap();
        let labels = load_labels(&path, None).unwrap();
        assert_eq!(labels.0, vec![1]);
    }

    #[test]
    fn test_row_count_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        std::fs::write(&path, "[[1.0]]").unwrap();
        assert!(load_labels(&path, Some(3)).is_err());
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        let labels = NodeLabels(vec![0, 2, 1]);
        save_labels(&labels, &path).unwrap();
        let loaded = load_labels(&path, Some(3)).unwrap();
        assert_eq!(loaded, labels);
    }
}
