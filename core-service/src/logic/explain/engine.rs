//! Attribution engine.
//!
//! Runs TreeSHAP over every tree of the loaded ensemble, scales by the
//! ensemble's aggregation factor and maps the per-position values back onto
//! canonical features. The baseline is the ensemble's cover-weighted expected
//! output, so `baseline + sum(contributions) == prediction` up to rounding.

use super::tree_shap;
use super::types::AttributionResult;
use crate::error::{AttributionIncompatibilityError, ExplainError};
use crate::logic::features::{FeatureVector, FEATURE_COUNT};
use crate::logic::model::{Model, Regressor};

/// Explain one prediction of `model` for `vector`.
///
/// # Errors
///
/// - [`ExplainError::ShapeMismatch`] if `vector` is not in the model's layout
/// - [`ExplainError::Incompatible`] if the model has no tree structure
pub fn explain(model: &Model, vector: &FeatureVector) -> Result<AttributionResult, ExplainError> {
    model.check_layout(vector)?;
    let ensemble = model.tree_ensemble().ok_or(AttributionIncompatibilityError {
        kind: model.kind(),
    })?;

    let row = vector.as_array();
    let scale = ensemble.scale();
    let mut by_position = [0.0; FEATURE_COUNT];
    for tree in ensemble.trees() {
        tree_shap::accumulate(tree, row, scale, &mut by_position);
    }

    let layout = model.layout();
    let mut phi = [0.0; FEATURE_COUNT];
    for (position, value) in by_position.into_iter().enumerate() {
        if let Some(feature) = layout.feature_at(position) {
            phi[feature.index()] = value;
        }
    }

    let result = AttributionResult::new(ensemble.expected_value(), vector.canonical_values(), phi);

    let prediction = ensemble.predict_row(row);
    let gap = result.additivity_gap(prediction);
    log::debug!(
        "Explained prediction {prediction} over {} trees: baseline {}, gap {gap:e}",
        ensemble.n_trees(),
        result.baseline
    );
    if !result.is_additive(prediction) {
        log::warn!(
            "Attribution does not add up: baseline {} + contributions {} != prediction {prediction}",
            result.baseline,
            result.total_contribution()
        );
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::explain::reference::brute_force;
    use crate::logic::features::{Feature, Layout};
    use crate::logic::model::artifact::EstimatorSpec;
    use crate::logic::model::testing::{demo_model, example_vector, DEMO_ARTIFACT};
    use crate::logic::model::{ModelArtifact, ModelKind, RegressionTree, TreeArrays};
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn demo_artifact() -> ModelArtifact {
        ModelArtifact::from_json(DEMO_ARTIFACT).unwrap()
    }

    fn model_from(artifact: ModelArtifact) -> Model {
        Model::from_artifact(artifact, String::new(), None).unwrap()
    }

    #[test]
    fn test_example_contributions() {
        let model = demo_model();
        let result = explain(&model, &example_vector()).unwrap();

        assert_abs_diff_eq!(result.baseline, 1816.6, epsilon = 1e-9);
        assert_abs_diff_eq!(result.contribution(Feature::KneeAdductionAngle), 11.4, epsilon = 1e-9);
        assert_abs_diff_eq!(result.contribution(Feature::BodyWeight), 30.925, epsilon = 1e-9);
        assert_abs_diff_eq!(result.contribution(Feature::Bmi), -7.875, epsilon = 1e-9);
        assert_abs_diff_eq!(result.contribution(Feature::WalkingSpeed), -1.575, epsilon = 1e-9);
        assert_abs_diff_eq!(result.contribution(Feature::FootStrikeVelocity), 33.375, epsilon = 1e-9);
        assert_abs_diff_eq!(result.contribution(Feature::Age), -1.5, epsilon = 1e-9);
        assert_abs_diff_eq!(result.contribution(Feature::Sex), 12.65, epsilon = 1e-9);
    }

    #[test]
    fn test_unused_feature_is_exactly_zero() {
        // No tree in the demo model splits on height.
        let result = explain(&demo_model(), &example_vector()).unwrap();
        assert_eq!(result.contribution(Feature::Height), 0.0);
    }

    #[test]
    fn test_example_is_additive() {
        let model = demo_model();
        let vector = example_vector();
        let prediction = model.predict(&vector).unwrap().value;
        let result = explain(&model, &vector).unwrap();

        assert!(result.is_additive(prediction));
        assert_abs_diff_eq!(result.reconstructed_output(), 1894.0, epsilon = 1e-9);
        assert_eq!(result.contributions.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_contributions_in_canonical_order() {
        let result = explain(&demo_model(), &example_vector()).unwrap();
        let order: Vec<Feature> = result.contributions.iter().map(|c| c.feature).collect();
        assert_eq!(order, Feature::ALL.to_vec());
        assert_eq!(result.contributions[1].value, 70.0);
    }

    #[test]
    fn test_matches_exhaustive_shapley() {
        let model = demo_model();
        let vector = example_vector();
        let ensemble = model.tree_ensemble().unwrap();
        let trees: Vec<&RegressionTree> = ensemble.trees().iter().collect();
        let expected = brute_force(&trees, vector.as_slice(), ensemble.scale());

        let result = explain(&model, &vector).unwrap();
        for feature in Feature::ALL {
            assert_abs_diff_eq!(
                result.contribution(feature),
                expected[feature.index()],
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_permuted_layout_rejected() {
        let model = demo_model();
        let mut order = Feature::ALL;
        order.swap(6, 7);
        let vector = example_vector().relayout(Layout::new(order).unwrap());

        let err = explain(&model, &vector).unwrap_err();
        assert!(matches!(err, ExplainError::ShapeMismatch(_)));
    }

    #[test]
    fn test_non_canonical_model_layout_maps_back() {
        let mut artifact = demo_artifact();
        artifact.feature_names.reverse();
        let model = model_from(artifact);
        let vector = example_vector().relayout(model.layout());

        let result = explain(&model, &vector).unwrap();
        let prediction = model.predict(&vector).unwrap().value;
        assert!(result.is_additive(prediction));

        // Position 2 is never split on; under the reversed layout it holds
        // foot-strike velocity.
        assert_eq!(model.layout().feature_at(2), Some(Feature::FootStrikeVelocity));
        assert_eq!(result.contribution(Feature::FootStrikeVelocity), 0.0);
        assert_eq!(result.contributions[0].feature, Feature::KneeAdductionAngle);
        assert_eq!(result.contributions[0].value, 5.0);
    }

    #[test]
    fn test_random_forest_is_additive() {
        let mut artifact = demo_artifact();
        let trees = match artifact.model {
            EstimatorSpec::GradientBoosting { trees, .. } => trees,
            other => panic!("unexpected estimator {other:?}"),
        };
        artifact.model = EstimatorSpec::RandomForest {
            expected_value: None,
            trees,
        };
        let model = model_from(artifact);
        assert_eq!(model.kind(), ModelKind::RandomForest);

        let vector = example_vector();
        let result = explain(&model, &vector).unwrap();
        let prediction = model.predict(&vector).unwrap().value;
        assert!(result.is_additive(prediction));
    }

    #[test]
    fn test_linear_model_incompatible() {
        let json = format!(
            r#"{{
                "format_version": 1,
                "feature_names": {},
                "model": {{ "type": "linear", "intercept": 100.0, "coefficients": [1, 1, 1, 1, 1, 1, 1, 1] }}
            }}"#,
            serde_json::to_string(&Feature::ALL.map(Feature::name)).unwrap()
        );
        let model = Model::from_json(&json).unwrap();

        // Prediction still works; only the explanation is refused.
        assert!(model.predict(&example_vector()).is_ok());
        let err = explain(&model, &example_vector()).unwrap_err();
        assert_eq!(
            err,
            ExplainError::Incompatible(AttributionIncompatibilityError {
                kind: ModelKind::Linear
            })
        );
    }

    /// Depth-2 tree: root splits on `f[0]`, children on `f[1]` and `f[2]`.
    /// Internal covers are the sums of their leaves.
    fn full_tree(features: [i64; 3], thresholds: [f64; 3], leaves: [f64; 4], covers: [f64; 4]) -> TreeArrays {
        let left = covers[0] + covers[1];
        let right = covers[2] + covers[3];
        TreeArrays {
            children_left: vec![1, 2, -1, -1, 5, -1, -1],
            children_right: vec![4, 3, -1, -1, 6, -1, -1],
            feature: vec![features[0], features[1], -2, -2, features[2], -2, -2],
            threshold: vec![thresholds[0], thresholds[1], -2.0, -2.0, thresholds[2], -2.0, -2.0],
            value: vec![0.0, 0.0, leaves[0], leaves[1], 0.0, leaves[2], leaves[3]],
            cover: vec![left + right, left, covers[0], covers[1], right, covers[2], covers[3]],
        }
    }

    fn tree_strategy() -> impl Strategy<Value = TreeArrays> {
        (
            prop::array::uniform3(0i64..FEATURE_COUNT as i64),
            prop::array::uniform3(-2.0f64..2.0),
            prop::array::uniform4(-500.0f64..500.0),
            prop::array::uniform4(1.0f64..50.0),
        )
            .prop_map(|(f, t, l, c)| full_tree(f, t, l, c))
    }

    proptest! {
        #[test]
        fn prop_demo_model_additive(
            adduction in -10.0f64..15.0,
            weight in 40.0f64..120.0,
            strike in 0.0f64..1.5,
            speed in 0.5f64..2.0,
            age in 18.0f64..90.0,
            sex in 0u8..2,
        ) {
            let model = demo_model();
            let vector = crate::logic::features::FeatureVectorBuilder::new()
                .knee_adduction_angle(adduction)
                .body_weight(weight)
                .height(170.0)
                .bmi(weight / 2.89)
                .walking_speed(speed)
                .foot_strike_velocity(strike)
                .age(age)
                .sex(f64::from(sex))
                .build()
                .unwrap();
            let prediction = model.predict(&vector).unwrap().value;
            let result = explain(&model, &vector).unwrap();
            prop_assert!(result.is_additive(prediction), "gap {}", result.additivity_gap(prediction));
            prop_assert_eq!(result.contribution(Feature::Height), 0.0);
        }

        #[test]
        fn prop_random_ensemble_additive(
            trees in prop::collection::vec(tree_strategy(), 1..8),
            base_score in -100.0f64..100.0,
            learning_rate in 0.01f64..1.0,
            row in prop::array::uniform8(-2.0f64..2.0),
        ) {
            let artifact = ModelArtifact {
                format_version: 1,
                name: None,
                feature_names: Feature::ALL.iter().map(|f| f.name().to_string()).collect(),
                model: EstimatorSpec::GradientBoosting {
                    base_score,
                    learning_rate,
                    expected_value: None,
                    trees,
                },
            };
            let model = model_from(artifact);
            let vector = FeatureVector::from_values(Layout::canonical(), row);
            let prediction = model.predict(&vector).unwrap().value;
            let result = explain(&model, &vector).unwrap();
            prop_assert!(result.is_additive(prediction), "gap {}", result.additivity_gap(prediction));
        }
    }
}
