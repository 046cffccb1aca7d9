//! Presentation Adapter
//!
//! Maps a prediction and its attribution into ranked, display-ready rows.
//! Values stay unrounded; only `prediction_display` is formatted.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::logic::explain::{AttributionResult, FeatureContribution};
use crate::logic::features::Feature;
use crate::logic::model::Prediction;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// One row of the ranked attribution table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedContribution {
    /// 1 = largest magnitude
    pub rank: usize,
    pub feature: Feature,
    pub label: String,
    pub value: f64,
    pub contribution: f64,
}

/// Data for a force plot: base value, output value and the features pushing
/// the output each way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForcePlot {
    pub base_value: f64,
    pub output_value: f64,
    /// Positive contributions, largest first
    pub higher: Vec<RankedContribution>,
    /// Negative contributions, largest magnitude first
    pub lower: Vec<RankedContribution>,
}

/// Everything a renderer needs for one prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub prediction: f64,
    pub prediction_display: String,
    pub baseline: f64,
    pub ranked: Vec<RankedContribution>,
    pub force_plot: ForcePlot,
}

// ============================================================================
// RANKING
// ============================================================================

/// Sort by descending `|contribution|`.
///
/// The sort is stable over canonical order, so equal magnitudes always come
/// out in canonical feature order.
pub fn rank_contributions(contributions: &[FeatureContribution]) -> Vec<RankedContribution> {
    let mut sorted: Vec<&FeatureContribution> = contributions.iter().collect();
    sorted.sort_by_key(|c| c.feature.index());
    sorted.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));

    sorted
        .into_iter()
        .enumerate()
        .map(|(i, c)| RankedContribution {
            rank: i + 1,
            feature: c.feature,
            label: c.feature.label().to_string(),
            value: c.value,
            contribution: c.contribution,
        })
        .collect()
}

pub fn build_report(prediction: &Prediction, attribution: &AttributionResult) -> Report {
    let ranked = rank_contributions(&attribution.contributions);

    let higher = ranked
        .iter()
        .filter(|r| r.contribution > 0.0)
        .cloned()
        .collect();
    let lower = ranked
        .iter()
        .filter(|r| r.contribution < 0.0)
        .cloned()
        .collect();

    Report {
        prediction: prediction.value,
        prediction_display: prediction.display(),
        baseline: attribution.baseline,
        ranked,
        force_plot: ForcePlot {
            base_value: attribution.baseline,
            output_value: prediction.value,
            higher,
            lower,
        },
    }
}

/// Plain-text table for logs.
pub fn render_table(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "prediction {} (baseline {:.2})",
        report.prediction_display, report.baseline
    );
    let _ = writeln!(out, "{:>4}  {:<22} {:>10} {:>12}", "rank", "feature", "value", "contribution");
    for row in &report.ranked {
        let _ = writeln!(
            out,
            "{:>4}  {:<22} {:>10.2} {:>+12.4}",
            row.rank,
            row.feature.name(),
            row.value,
            row.contribution
        );
    }
    out
}
