//! Graphviz DOT export with community coloring.

use crate::Result;
use emgraph_core::{Graph, NodeLabels};
use std::path::Path;

const FILL_COLORS: [&str; 10] = [
    "lightcoral",
    "lightgreen",
    "khaki",
    "lightblue",
    "plum",
    "paleturquoise",
    "salmon",
    "palegreen",
    "skyblue",
    "orchid",
];

/// Render the graph as DOT, filling nodes by community.
///
/// Label precedence: explicit `labels` first, then communities stored on the
/// graph, then a neutral fill.
pub fn graph_to_dot(graph: &Graph, labels: Option<&NodeLabels>) -> String {
    let mut dot = String::from("digraph embedding_benchmark {\n");
    dot.push_str("  rankdir=LR;\n");
    dot.push_str("  node [shape=circle, style=filled, fontname=\"Helvetica\"];\n");
    dot.push_str("  edge [color=gray50, arrowsize=0.5];\n\n");

    for id in graph.node_ids() {
        let community = labels
            .and_then(|l| l.community(id))
            .or_else(|| graph.community(id));
        let fill = match community {
            Some(c) => FILL_COLORS[c as usize % FILL_COLORS.len()],
            None => "lightgray",
        };
        dot.push_str(&format!("  n{} [label=\"{}\", fillcolor=\"{}\"];\n", id, id, fill));
    }
    dot.push('\n');

    for (source, target, weight) in graph.edges() {
        if (weight - 1.0).abs() > f64::EPSILON {
            dot.push_str(&format!(
                "  n{} -> n{} [label=\"{:.2}\"];\n",
                source, target, weight
            ));
        } else {
            dot.push_str(&format!("  n{} -> n{};\n", source, target));
        }
    }

    dot.push_str("}\n");
    dot
}

/// Write the DOT rendering to a file.
pub fn export_dot(graph: &Graph, labels: Option<&NodeLabels>, path: &Path) -> Result<()> {
    std::fs::write(path, graph_to_dot(graph, labels))?;
    Ok(())
}
