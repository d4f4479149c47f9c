//! Scatter-plot export.
//!
//! Renders the 2-D projection as a terminal chart, one dataset per community,
//! on an off-screen backend and writes the frame to a text file.

use crate::{Result, VizError};
use chrono::Utc;
use ratatui::{
    backend::TestBackend,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Terminal,
};
use std::collections::BTreeMap;
use std::path::Path;

/// Chart dimensions in terminal cells.
#[derive(Debug, Clone)]
pub struct VizConfig {
    pub width: u16,
    pub height: u16,
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            width: 120,
            height: 40,
        }
    }
}

const PALETTE: [Color; 10] = [
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
    Color::LightRed,
    Color::LightGreen,
    Color::LightBlue,
    Color::LightMagenta,
];

fn bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    let margin = ((max - min) * 0.05).max(1e-6);
    [min - margin, max + margin]
}

/// Render the scatter and write it to `path`.
///
/// `communities[i]` colors `points[i]`; lengths must match.
pub fn export_scatter(
    points: &[(f64, f64)],
    communities: &[u32],
    title: &str,
    path: &Path,
    config: &VizConfig,
) -> Result<()> {
    if points.len() != communities.len() {
        return Err(VizError::InvalidInput(format!(
            "{} points but {} community labels",
            points.len(),
            communities.len()
        )));
    }

    let mut groups: BTreeMap<u32, Vec<(f64, f64)>> = BTreeMap::new();
    for (&point, &community) in points.iter().zip(communities) {
        groups.entry(community).or_default().push(point);
    }

    let names: Vec<String> = groups.keys().map(|c| format!("block {}", c)).collect();
    let datasets: Vec<Dataset> = groups
        .values()
        .zip(&names)
        .enumerate()
        .map(|(i, (data, name))| {
            Dataset::default()
                .name(name.as_str())
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(PALETTE[i % PALETTE.len()]))
                .data(data)
        })
        .collect();

    let x_bounds = bounds(points.iter().map(|p| p.0));
    let y_bounds = bounds(points.iter().map(|p| p.1));
    let chart = Chart::new(datasets)
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .x_axis(Axis::default().bounds(x_bounds))
        .y_axis(Axis::default().bounds(y_bounds));

    let backend = TestBackend::new(config.width, config.height);
    let mut terminal = Terminal::new(backend)?;
    terminal.draw(|frame| {
        frame.render_widget(chart, frame.size());
    })?;

    let buffer = terminal.backend().buffer();
    let mut rendered = String::new();
    rendered.push_str(&format!(
        "{} | {} nodes | exported {}\n",
        title,
        points.len(),
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            rendered.push_str(&buffer.get(x, y).symbol);
        }
        rendered.push('\n');
    }

    std::fs::write(path, rendered)?;
    Ok(())
}
