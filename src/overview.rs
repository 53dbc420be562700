//! Headline figures and gauges shown above the charts.
//!
//! These are fixed display values, not derived from the uploaded ledger.

use rand::seq::index::sample;
use rand::Rng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const SPARKLINE_POINTS: usize = 30;
pub const SPARKLINE_MAX: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HeadlineMetric {
    pub label: String,
    pub value: f64,
    pub prefix: String,
    pub suffix: String,
    pub show_graph: bool,
    /// Decorative trend points, present only when `show_graph` is set.
    pub sparkline: Option<Vec<u32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GaugeMetric {
    pub title: String,
    pub value: f64,
    pub suffix: String,
    pub max_bound: f64,
}

/// One overview column: a headline figure above a gauge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OverviewPanel {
    pub headline: HeadlineMetric,
    pub gauge: GaugeMetric,
}

struct PanelLiteral {
    label: &'static str,
    value: f64,
    prefix: &'static str,
    suffix: &'static str,
    show_graph: bool,
    gauge_title: &'static str,
    gauge_value: f64,
    gauge_suffix: &'static str,
    gauge_max: f64,
}

const PANELS: [PanelLiteral; 4] = [
    PanelLiteral {
        label: "Total Accounts Receivable",
        value: 6_621_280.0,
        prefix: "$",
        suffix: "",
        show_graph: true,
        gauge_title: "Current Ratio",
        gauge_value: 1.86,
        gauge_suffix: "%",
        gauge_max: 3.0,
    },
    PanelLiteral {
        label: "Total Accounts Payable",
        value: 1_630_270.0,
        prefix: "$",
        suffix: "",
        show_graph: true,
        gauge_title: "In Stock",
        gauge_value: 10.0,
        gauge_suffix: " days",
        gauge_max: 31.0,
    },
    PanelLiteral {
        label: "Equity Ratio",
        value: 75.38,
        prefix: "",
        suffix: " %",
        show_graph: false,
        gauge_title: "Out Stock",
        gauge_value: 7.0,
        gauge_suffix: " days",
        gauge_max: 31.0,
    },
    PanelLiteral {
        label: "Debt Equity",
        value: 1.10,
        prefix: "",
        suffix: " %",
        show_graph: false,
        gauge_title: "Delay",
        gauge_value: 28.0,
        gauge_suffix: " days",
        gauge_max: 31.0,
    },
];

/// `SPARKLINE_POINTS` distinct integers drawn from `0..=SPARKLINE_MAX`.
pub fn sparkline<R: Rng + ?Sized>(rng: &mut R) -> Vec<u32> {
    sample(rng, SPARKLINE_MAX + 1, SPARKLINE_POINTS)
        .into_iter()
        .map(|v| v as u32)
        .collect()
}

/// The four overview panels, with fresh sparklines drawn from `rng`.
pub fn overview_metrics_with<R: Rng + ?Sized>(rng: &mut R) -> Vec<OverviewPanel> {
    PANELS
        .iter()
        .map(|p| OverviewPanel {
            headline: HeadlineMetric {
                label: p.label.to_string(),
                value: p.value,
                prefix: p.prefix.to_string(),
                suffix: p.suffix.to_string(),
                show_graph: p.show_graph,
                sparkline: p.show_graph.then(|| sparkline(rng)),
            },
            gauge: GaugeMetric {
                title: p.gauge_title.to_string(),
                value: p.gauge_value,
                suffix: p.gauge_suffix.to_string(),
                max_bound: p.gauge_max,
            },
        })
        .collect()
}

pub fn overview_metrics() -> Vec<OverviewPanel> {
    overview_metrics_with(&mut rand::thread_rng())
}
