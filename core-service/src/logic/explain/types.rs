use serde::{Deserialize, Serialize};

use crate::logic::features::{Feature, FEATURE_COUNT};
use crate::tolerances;

/// Additive contribution of one feature to one prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub feature: Feature,
    /// Input value the contribution was computed for
    pub value: f64,
    /// Signed shift away from the baseline, unrounded
    pub contribution: f64,
}

/// Baseline plus one contribution per feature, in canonical order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionResult {
    pub baseline: f64,
    pub contributions: Vec<FeatureContribution>,
}

impl AttributionResult {
    pub fn new(baseline: f64, values: [f64; FEATURE_COUNT], phi: [f64; FEATURE_COUNT]) -> Self {
        let contributions = Feature::ALL
            .into_iter()
            .map(|feature| FeatureContribution {
                feature,
                value: values[feature.index()],
                contribution: phi[feature.index()],
            })
            .collect();
        Self {
            baseline,
            contributions,
        }
    }

    pub fn contribution(&self, feature: Feature) -> f64 {
        self.contributions[feature.index()].contribution
    }

    pub fn total_contribution(&self) -> f64 {
        self.contributions.iter().map(|c| c.contribution).sum()
    }

    /// `baseline + sum(contributions)`
    pub fn reconstructed_output(&self) -> f64 {
        self.baseline + self.total_contribution()
    }

    /// Signed gap between the reconstruction and `prediction`.
    pub fn additivity_gap(&self, prediction: f64) -> f64 {
        self.reconstructed_output() - prediction
    }

    pub fn is_additive(&self, prediction: f64) -> bool {
        tolerances::within_relative(
            self.reconstructed_output(),
            prediction,
            tolerances::ADDITIVITY_RELATIVE,
        )
    }
}
