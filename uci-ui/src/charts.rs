//! Geometry for the two dashboard charts, independent of the DOM.

use uci_core::{ChartDataset, SummaryStats, NO_DATA_PLACEHOLDER};

pub const DONUT_RADIUS: f64 = 70.0;

const PALETTE: [&str; 8] = [
    "#f472b6", "#38bdf8", "#a78bfa", "#facc15", "#34d399", "#fb923c", "#f87171", "#94a3b8",
];

/// One arc of the sex donut, drawn as a dashed circle stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct DonutSegment {
    pub label: String,
    pub value: usize,
    /// Visible stroke length along the circumference.
    pub length: f64,
    /// Distance from the start of the circle to where this arc begins.
    pub offset: f64,
    pub color: &'static str,
}

/// One row of the horizontal condition chart.
#[derive(Debug, Clone, PartialEq)]
pub struct BarRow {
    pub label: String,
    pub value: usize,
    /// Width relative to the largest bar, 0–100.
    pub percent: f64,
}

pub fn circumference() -> f64 {
    2.0 * std::f64::consts::PI * DONUT_RADIUS
}

pub fn color_for(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Arcs in dataset order; an all-zero dataset draws nothing.
pub fn donut_segments(dataset: &ChartDataset) -> Vec<DonutSegment> {
    let total: usize = dataset.values.iter().sum();
    if total == 0 {
        return Vec::new();
    }

    let full = circumference();
    let mut offset = 0.0;
    dataset
        .labels
        .iter()
        .zip(&dataset.values)
        .enumerate()
        .map(|(index, (label, &value))| {
            let length = full * value as f64 / total as f64;
            let segment = DonutSegment {
                label: label.clone(),
                value,
                length,
                offset,
                color: color_for(index),
            };
            offset += length;
            segment
        })
        .collect()
}

pub fn bar_rows(dataset: &ChartDataset) -> Vec<BarRow> {
    let max = dataset.max_value();
    dataset
        .labels
        .iter()
        .zip(&dataset.values)
        .map(|(label, &value)| BarRow {
            label: label.clone(),
            value,
            percent: if max == 0 {
                0.0
            } else {
                value as f64 * 100.0 / max as f64
            },
        })
        .collect()
}

/// Title and value of the four summary slots. Before the first successful
/// refresh every slot shows the placeholder.
pub fn summary_slots(summary: Option<&SummaryStats>) -> [(&'static str, String); 4] {
    let value = |pick: fn(&SummaryStats) -> String| {
        summary.map_or_else(|| NO_DATA_PLACEHOLDER.to_string(), pick)
    };
    [
        ("Total de registros", value(|s| s.total.to_string())),
        ("Femenino", value(|s| s.female.to_string())),
        ("Masculino", value(|s| s.male.to_string())),
        ("Edad promedio", value(SummaryStats::mean_age_label)),
    ]
}
