//! Feature Vector - Core data structure for model input
//!
//! **Layout-bound feature vector**
//!
//! A vector always carries the [`Layout`] its values were written in, so
//! inference can refuse a vector whose order differs from the model's.

use serde::Serialize;

use super::layout::{Feature, Layout, FEATURE_COUNT};
use crate::error::{InputValidationError, InvalidReason};

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// One validated model input, immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    #[serde(serialize_with = "serialize_layout")]
    layout: Layout,
    values: [f64; FEATURE_COUNT],
}

fn serialize_layout<S: serde::Serializer>(layout: &Layout, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u32(layout.hash())
}

impl FeatureVector {
    /// Wrap raw values already in `layout` order. No domain checks: use
    /// [`FeatureVectorBuilder`] for untrusted input.
    pub fn from_values(layout: Layout, values: [f64; FEATURE_COUNT]) -> Self {
        Self { layout, values }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn layout_hash(&self) -> u32 {
        self.layout.hash()
    }

    /// Values in layout order.
    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Value of a feature, wherever the layout put it.
    pub fn get(&self, feature: Feature) -> f64 {
        self.values[self.layout.position(feature)]
    }

    /// `(feature, value)` pairs in layout order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        self.layout
            .order()
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }

    /// Values in canonical order.
    pub fn canonical_values(&self) -> [f64; FEATURE_COUNT] {
        let mut out = [0.0; FEATURE_COUNT];
        for (feature, value) in self.iter() {
            out[feature.index()] = value;
        }
        out
    }

    /// Re-bind the same named values to another layout.
    pub fn relayout(&self, layout: Layout) -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        for (slot, feature) in values.iter_mut().zip(layout.order()) {
            *slot = self.get(*feature);
        }
        Self { layout, values }
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "layout_hash": self.layout_hash(),
            "values": self.values,
            "named_values": self
                .iter()
                .map(|(feature, value)| (feature.name().to_string(), value))
                .collect::<std::collections::BTreeMap<_, _>>(),
        })
    }
}

// ============================================================================
// BUILDER PATTERN
// ============================================================================

/// Builder for creating a validated FeatureVector with typed setters
#[derive(Debug, Clone, Default)]
pub struct FeatureVectorBuilder {
    slots: [Option<f64>; FEATURE_COUNT],
}

impl FeatureVectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder with every slot at its form default.
    pub fn with_defaults() -> Self {
        let mut builder = Self::new();
        for feature in Feature::ALL {
            builder.slots[feature.index()] = Some(feature.default_value());
        }
        builder
    }

    /// Set a feature's raw value. Later calls overwrite earlier ones.
    pub fn set(mut self, feature: Feature, value: f64) -> Self {
        self.slots[feature.index()] = Some(value);
        self
    }

    pub fn is_set(&self, feature: Feature) -> bool {
        self.slots[feature.index()].is_some()
    }

    pub fn knee_adduction_angle(self, degrees: f64) -> Self {
        self.set(Feature::KneeAdductionAngle, degrees)
    }

    pub fn body_weight(self, kg: f64) -> Self {
        self.set(Feature::BodyWeight, kg)
    }

    pub fn height(self, cm: f64) -> Self {
        self.set(Feature::Height, cm)
    }

    pub fn bmi(self, value: f64) -> Self {
        self.set(Feature::Bmi, value)
    }

    pub fn walking_speed(self, m_per_s: f64) -> Self {
        self.set(Feature::WalkingSpeed, m_per_s)
    }

    pub fn foot_strike_velocity(self, m_per_s: f64) -> Self {
        self.set(Feature::FootStrikeVelocity, m_per_s)
    }

    pub fn age(self, years: f64) -> Self {
        self.set(Feature::Age, years)
    }

    /// 0 = female, 1 = male
    pub fn sex(self, code: f64) -> Self {
        self.set(Feature::Sex, code)
    }

    /// Validate and assemble in canonical order.
    pub fn build(&self) -> Result<FeatureVector, InputValidationError> {
        self.build_for(Layout::canonical())
    }

    /// Validate and assemble in `layout` order. Every slot is checked in
    /// canonical order, so the first reported error is deterministic.
    pub fn build_for(&self, layout: Layout) -> Result<FeatureVector, InputValidationError> {
        let mut canonical = [0.0; FEATURE_COUNT];
        for feature in Feature::ALL {
            let value = self.slots[feature.index()]
                .ok_or_else(|| InputValidationError::new(feature.name(), InvalidReason::Missing))?;
            feature
                .domain()
                .check(value)
                .map_err(|reason| InputValidationError::new(feature.name(), reason))?;
            canonical[feature.index()] = value;
        }

        let vector = FeatureVector::from_values(Layout::canonical(), canonical);
        if layout.is_canonical() {
            Ok(vector)
        } else {
            Ok(vector.relayout(layout))
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
