//! On-disk graph formats.
//!
//! The current format is JSON node-link: a `nodes` array and a `links` array.
//! Older exports used an adjacency-map layout with a `node` map and a nested
//! `edge` map keyed by source then target. Loading auto-detects the layout and
//! migrates legacy files in memory; `migrate_legacy` preserves every node and
//! every edge exactly once.

use crate::graph::Graph;
use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Detected on-disk layout of a graph file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    /// Current `nodes`/`links` layout.
    NodeLink,
    /// Older `node`/`edge` adjacency-map layout.
    LegacyAdjacency,
}

#[derive(Debug, Serialize, Deserialize)]
struct NodeLinkFile {
    #[serde(default = "default_directed")]
    directed: bool,
    nodes: Vec<NodeLinkNode>,
    links: Vec<NodeLinkEdge>,
}

fn default_directed() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize)]
struct NodeLinkNode {
    id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    community: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NodeLinkEdge {
    source: u32,
    target: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    weight: Option<f64>,
}

/// Legacy adjacency-map graph layout.
///
/// Node and edge maps are keyed by stringified node ids; each inner edge map
/// carries optional attributes. `BTreeMap` keeps migration order stable.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LegacyGraph {
    pub node: BTreeMap<String, LegacyNodeAttrs>,
    pub edge: BTreeMap<String, BTreeMap<String, LegacyEdgeAttrs>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LegacyNodeAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community: Option<u32>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LegacyEdgeAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

fn parse_node_id(key: &str) -> Result<u32> {
    key.parse::<u32>()
        .map_err(|_| CoreError::MalformedGraph(format!("non-numeric node id: {:?}", key)))
}

/// Migrate a legacy adjacency-map graph to the current representation.
///
/// Every node in the legacy node map and every (source, target) pair in the
/// legacy edge map appears in the result; nothing is duplicated or dropped.
/// Edges may reference nodes missing from the node map (legacy writers allowed
/// that); those endpoints are created.
pub fn migrate_legacy(legacy: &LegacyGraph) -> Result<Graph> {
    let mut graph = Graph::new();

    // Map keys are strings and iterate lexicographically ("10" before "2");
    // insert in numeric order so dense files stay dense.
    let mut nodes = Vec::with_capacity(legacy.node.len());
    for (key, attrs) in &legacy.node {
        nodes.push((parse_node_id(key)?, attrs));
    }
    nodes.sort_by_key(|(id, _)| *id);
    for (id, attrs) in nodes {
        graph.add_node(id);
        if let Some(community) = attrs.community {
            graph.set_community(id, community);
        }
    }

    for (source_key, targets) in &legacy.edge {
        let source = parse_node_id(source_key)?;
        for (target_key, attrs) in targets {
            let target = parse_node_id(target_key)?;
            graph.add_edge(source, target, attrs.weight.unwrap_or(1.0));
        }
    }

    Ok(graph)
}

fn detect_format(value: &serde_json::Value) -> Result<GraphFormat> {
    let obj = value
        .as_object()
        .ok_or_else(|| CoreError::MalformedGraph("top level is not an object".into()))?;
    if obj.contains_key("links") {
        Ok(GraphFormat::NodeLink)
    } else if obj.contains_key("edge") {
        Ok(GraphFormat::LegacyAdjacency)
    } else {
        Err(CoreError::MalformedGraph(
            "neither 'links' nor 'edge' present".into(),
        ))
    }
}

fn from_node_link(file: NodeLinkFile) -> Graph {
    let mut graph = Graph::new();
    for node in &file.nodes {
        graph.add_node(node.id);
        if let Some(community) = node.community {
            graph.set_community(node.id, community);
        }
    }
    for link in &file.links {
        graph.add_edge(link.source, link.target, link.weight.unwrap_or(1.0));
    }
    graph
}

/// Load a graph file, auto-detecting its format.
///
/// Returns the graph together with the format it was stored in, so callers can
/// report when a one-time migration happened.
pub fn load_graph(path: &Path) -> Result<(Graph, GraphFormat)> {
    let content = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    let format = detect_format(&value)?;

    let graph = match format {
        GraphFormat::NodeLink => {
            let file: NodeLinkFile = serde_json::from_value(value)?;
            from_node_link(file)
        }
        GraphFormat::LegacyAdjacency => {
            tracing::info!("migrating legacy graph file {}", path.display());
            let legacy: LegacyGraph = serde_json::from_value(value)?;
            migrate_legacy(&legacy)?
        }
    };

    if !graph.has_dense_ids() {
        return Err(CoreError::MalformedGraph(
            "node ids are not dense 0..n".into(),
        ));
    }
    Ok((graph, format))
}

/// Save a graph in the current node-link format.
pub fn save_graph(graph: &Graph, path: &Path) -> Result<()> {
    let nodes = graph
        .node_ids()
        .into_iter()
        .map(|id| NodeLinkNode {
            id,
            community: graph.community(id),
        })
        .collect();
    let links = graph
        .edges()
        .into_iter()
        .map(|(source, target, weight)| NodeLinkEdge {
            source,
            target,
            weight: Some(weight),
        })
        .collect();

    let file = NodeLinkFile {
        directed: true,
        nodes,
        links,
    };
    let content = serde_json::to_string_pretty(&file)?;
    std::fs::write(path, content)?;
    Ok(())
}
