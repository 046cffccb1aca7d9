//! Integration Tests for the Feature Pipeline
//!
//! Named input through layout binding into the model and the attribution
//! engine.

#[cfg(test)]
mod integration_tests {
    use crate::error::InvalidReason;
    use crate::logic::explain::explain;
    use crate::logic::features::{Feature, FeatureInput, Layout, FEATURE_COUNT};
    use crate::logic::model::testing::demo_model;

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

    /// Named input, canonical vector, prediction, explanation
    #[test]
    fn test_input_to_explanation() {
        let model = demo_model();
        let vector = example_input().build_for(model.layout()).unwrap();
        assert_eq!(vector.get(Feature::Sex), 1.0);

        let prediction = model.predict(&vector).unwrap();
        let attribution = explain(&model, &vector).unwrap();

        assert_eq!(attribution.contributions.len(), FEATURE_COUNT);
        assert!(attribution.is_additive(prediction.value));
    }

    /// Input map order never reaches the vector
    #[test]
    fn test_insertion_order_irrelevant() {
        let forward = example_input().build().unwrap();

        let mut reversed = FeatureInput::new();
        for feature in Feature::ALL.iter().rev() {
            reversed.insert(feature.name(), forward.get(*feature));
        }
        let reversed = reversed.build().unwrap();

        assert_eq!(forward.as_array(), reversed.as_array());
        assert_eq!(forward.layout_hash(), reversed.layout_hash());
    }

    /// Building for a permuted layout keeps each value bound to its feature
    #[test]
    fn test_permuted_layout_binding() {
        let mut order = Feature::ALL;
        order.reverse();
        let layout = Layout::new(order).unwrap();

        let canonical = example_input().build().unwrap();
        let permuted = example_input().build_for(layout).unwrap();

        assert_ne!(canonical.as_array(), permuted.as_array());
        assert_eq!(canonical.canonical_values(), permuted.canonical_values());
        for feature in Feature::ALL {
            assert_eq!(canonical.get(feature), permuted.get(feature));
        }
        // Permuted vector is refused by a canonically trained model.
        assert!(demo_model().predict(&permuted).is_err());
    }

    /// Validation stops the pipeline before the model sees anything
    #[test]
    fn test_invalid_input_never_predicted() {
        let mut input = example_input();
        input.remove("sex");
        let err = input.build().unwrap_err();
        assert_eq!(err.field(), "sex");
        assert_eq!(err.reason, InvalidReason::Missing);

        let err = example_input().with("sex", 2.0).build().unwrap_err();
        assert_eq!(err.field(), "sex");
        assert_eq!(err.reason, InvalidReason::NotBinary);
    }
}
