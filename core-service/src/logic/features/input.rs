//! Named raw inputs as collected by a form.
//!
//! The boundary between untyped `name -> value` pairs and the typed
//! [`FeatureVectorBuilder`]. Names resolve through [`Feature::from_name`], so
//! both machine names and display labels are accepted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::layout::{Feature, Layout};
use super::vector::{FeatureVector, FeatureVectorBuilder};
use crate::error::{InputValidationError, InvalidReason};

/// Raw `name -> value` pairs from the input surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureInput {
    values: BTreeMap<String, f64>,
}

impl FeatureInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every feature at its form default.
    pub fn defaults() -> Self {
        Feature::ALL
            .into_iter()
            .map(|f| (f.name(), f.default_value()))
            .collect()
    }

    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<f64> {
        self.values.remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Resolve names into a typed builder. Unknown names and two spellings
    /// of the same feature are rejected.
    pub fn to_builder(&self) -> Result<FeatureVectorBuilder, InputValidationError> {
        let mut builder = FeatureVectorBuilder::new();
        for (name, &value) in &self.values {
            let feature = Feature::from_name(name)
                .ok_or_else(|| InputValidationError::new(name.as_str(), InvalidReason::Unknown))?;
            if builder.is_set(feature) {
                return Err(InputValidationError::new(feature.name(), InvalidReason::Duplicate));
            }
            builder = builder.set(feature, value);
        }
        Ok(builder)
    }

    /// Validate and build in canonical order.
    pub fn build(&self) -> Result<FeatureVector, InputValidationError> {
        self.to_builder()?.build()
    }

    /// Validate and build in `layout` order (normally the loaded model's).
    pub fn build_for(&self, layout: Layout) -> Result<FeatureVector, InputValidationError> {
        self.to_builder()?.build_for(layout)
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for FeatureInput {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_input() -> FeatureInput {
        FeatureInput::new()
            .with("knee_adduction_angle", 5.0)
            .with("body_weight", 70.0)
            .with("height", 170.0)
            .with("bmi", 24.2)
            .with("walking_speed", 1.2)
            .with("foot_strike_velocity", 0.8)
            .with("age", 35.0)
            .with("sex", 1.0)
    }

    #[test]
    fn test_build_orders_by_feature_not_by_name() {
        // BTreeMap iterates alphabetically; the vector must not.
        let vector = example_input().build().unwrap();
        assert_eq!(
            vector.as_array(),
            &[5.0, 70.0, 170.0, 24.2, 1.2, 0.8, 35.0, 1.0]
        );
    }

    #[test]
    fn test_missing_sex_names_sex() {
        let mut input = example_input();
        input.remove("sex");
        let err = input.build().unwrap_err();
        assert_eq!(err.field(), "sex");
        assert_eq!(err.reason, InvalidReason::Missing);
    }

    #[test]
    fn test_sex_two_rejected() {
        let err = example_input().with("sex", 2.0).build().unwrap_err();
        assert_eq!(err.field(), "sex");
        assert_eq!(err.reason, InvalidReason::NotBinary);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = example_input().with("shoe_size", 42.0).build().unwrap_err();
        assert_eq!(err.field(), "shoe_size");
        assert_eq!(err.reason, InvalidReason::Unknown);
    }

    #[test]
    fn test_label_and_name_for_same_feature() {
        let err = example_input().with("性别", 0.0).build().unwrap_err();
        assert_eq!(err.field(), "sex");
        assert_eq!(err.reason, InvalidReason::Duplicate);
    }

    #[test]
    fn test_labels_accepted() {
        let input: FeatureInput = Feature::ALL
            .into_iter()
            .map(|f| (f.label(), f.default_value()))
            .collect();
        assert!(input.build().is_ok());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let err = example_input().with("body_weight", -1.0).build().unwrap_err();
        assert_eq!(err.field(), "body_weight");
        assert_eq!(err.reason, InvalidReason::Negative);
    }

    #[test]
    fn test_deserialize_from_json_object() {
        let input: FeatureInput = serde_json::from_str(
            r#"{"knee_adduction_angle": 5, "body_weight": 70, "height": 170, "bmi": 24.2,
                "walking_speed": 1.2, "foot_strike_velocity": 0.8, "age": 35, "sex": 1}"#,
        )
        .unwrap();
        assert_eq!(input.len(), 8);
        assert_eq!(input.build().unwrap().get(Feature::Sex), 1.0);
    }
}
