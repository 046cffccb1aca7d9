//! Tree ensembles and the linear fallback estimator.
//!
//! Both gradient boosting and random forests reduce to
//! `offset + scale * sum(tree outputs)`:
//! - boosting: `offset = base_score`, `scale = learning_rate`
//! - forest: `offset = 0`, `scale = 1 / n_trees`
//!
//! Keeping the combination affine is what lets the attribution engine scale
//! per-tree Shapley values by the same factor.

use super::tree::RegressionTree;
use crate::logic::features::FEATURE_COUNT;

/// Anything that maps one feature row (in the model's layout) to a scalar.
pub trait Regressor {
    fn predict_row(&self, row: &[f64; FEATURE_COUNT]) -> f64;
}

/// How tree outputs are combined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aggregation {
    /// Boosting: `base_score + learning_rate * sum`
    Sum { base_score: f64, learning_rate: f64 },
    /// Bagging: mean of the trees
    Mean,
}

/// A fixed decision-tree ensemble.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeEnsemble {
    trees: Vec<RegressionTree>,
    aggregation: Aggregation,
}

impl TreeEnsemble {
    /// # Errors
    ///
    /// Returns `Err` if `trees` is empty or the boosting parameters are not
    /// finite.
    pub fn new(trees: Vec<RegressionTree>, aggregation: Aggregation) -> Result<Self, String> {
        if trees.is_empty() {
            return Err("empty tree ensemble".into());
        }
        if let Aggregation::Sum {
            base_score,
            learning_rate,
        } = aggregation
        {
            if !base_score.is_finite() || !learning_rate.is_finite() || learning_rate <= 0.0 {
                return Err(format!(
                    "invalid boosting parameters: base_score={base_score}, learning_rate={learning_rate}"
                ));
            }
        }
        Ok(Self { trees, aggregation })
    }

    /// Constant added to the scaled tree sum.
    pub fn offset(&self) -> f64 {
        match self.aggregation {
            Aggregation::Sum { base_score, .. } => base_score,
            Aggregation::Mean => 0.0,
        }
    }

    /// Factor applied to every tree output.
    pub fn scale(&self) -> f64 {
        match self.aggregation {
            Aggregation::Sum { learning_rate, .. } => learning_rate,
            Aggregation::Mean => 1.0 / self.trees.len() as f64,
        }
    }

    /// Expected output under the training cover distribution.
    pub fn expected_value(&self) -> f64 {
        let sum: f64 = self.trees.iter().map(RegressionTree::expected_value).sum();
        self.offset() + self.scale() * sum
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    pub fn aggregation(&self) -> Aggregation {
        self.aggregation
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_nodes(&self) -> usize {
        self.trees.iter().map(RegressionTree::n_nodes).sum()
    }

    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(RegressionTree::depth).max().unwrap_or(0)
    }
}

impl Regressor for TreeEnsemble {
    fn predict_row(&self, row: &[f64; FEATURE_COUNT]) -> f64 {
        let sum: f64 = self.trees.iter().map(|tree| tree.predict(row)).sum();
        self.offset() + self.scale() * sum
    }
}

/// `intercept + coefficients · x`. Predicts, but has no tree structure.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: [f64; FEATURE_COUNT],
}

impl Regressor for LinearModel {
    fn predict_row(&self, row: &[f64; FEATURE_COUNT]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::tree::TreeArrays;

    fn stump(feature: i64, threshold: f64, left: f64, right: f64) -> RegressionTree {
        RegressionTree::from_arrays(
            &TreeArrays {
                children_left: vec![1, -1, -1],
                children_right: vec![2, -1, -1],
                feature: vec![feature, -2, -2],
                threshold: vec![threshold, -2.0, -2.0],
                value: vec![0.0, left, right],
                cover: vec![10.0, 6.0, 4.0],
            },
            FEATURE_COUNT,
        )
        .unwrap()
    }

    #[test]
    fn test_boosting_sum() {
        let ensemble = TreeEnsemble::new(
            vec![stump(0, 0.5, -1.0, 1.0), stump(1, 0.5, -0.5, 0.5)],
            Aggregation::Sum {
                base_score: 2.0,
                learning_rate: 0.1,
            },
        )
        .unwrap();
        let mut row = [0.0; FEATURE_COUNT];
        row[0] = 0.7;
        row[1] = 0.7;
        // 2.0 + 0.1 * (1.0 + 0.5)
        assert!((ensemble.predict_row(&row) - 2.15).abs() < 1e-12);
        assert_eq!(ensemble.n_trees(), 2);
        assert_eq!(ensemble.max_depth(), 1);
    }

    #[test]
    fn test_forest_mean() {
        let ensemble = TreeEnsemble::new(
            vec![stump(0, 0.5, 1.0, 3.0), stump(0, 0.5, 2.0, 5.0)],
            Aggregation::Mean,
        )
        .unwrap();
        let mut row = [0.0; FEATURE_COUNT];
        row[0] = 1.0;
        assert!((ensemble.predict_row(&row) - 4.0).abs() < 1e-12);
        // E = mean(0.6*1 + 0.4*3, 0.6*2 + 0.4*5) = mean(1.8, 3.2)
        assert!((ensemble.expected_value() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_ensemble_rejected() {
        assert!(TreeEnsemble::new(vec![], Aggregation::Mean).is_err());
    }

    #[test]
    fn test_bad_learning_rate_rejected() {
        let result = TreeEnsemble::new(
            vec![stump(0, 0.5, 1.0, 3.0)],
            Aggregation::Sum {
                base_score: 0.0,
                learning_rate: f64::NAN,
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_linear_model() {
        let model = LinearModel {
            intercept: 1.0,
            coefficients: [1.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, -1.0],
        };
        let row = [1.0, 1.0, 9.0, 9.0, 9.0, 9.0, 9.0, 1.0];
        assert_eq!(model.predict_row(&row), 3.0);
    }
}
