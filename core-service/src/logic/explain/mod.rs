//! Explain Module - Attribution Engine
//!
//! Exact additive attributions for tree-ensemble predictions.

pub mod engine;
pub mod tree_shap;
pub mod types;

pub use engine::explain;
pub use types::{AttributionResult, FeatureContribution};

/// Exhaustive Shapley values, used to cross-check TreeSHAP in tests.
#[cfg(test)]
pub(crate) mod reference {
    use crate::logic::model::RegressionTree;

    /// `v(S)` for one tree: features in `S` follow `x`, the rest are
    /// integrated out by cover.
    fn coalition_value(tree: &RegressionTree, x: &[f64], known: &[bool], node: usize) -> f64 {
        let n = tree.node_at(node);
        match n.split {
            None => n.value,
            Some(split) if known[split.feature] => {
                let next = if x[split.feature] <= split.threshold {
                    split.left
                } else {
                    split.right
                };
                coalition_value(tree, x, known, next)
            }
            Some(split) => {
                let l = tree.node_at(split.left).cover;
                let r = tree.node_at(split.right).cover;
                (l * coalition_value(tree, x, known, split.left)
                    + r * coalition_value(tree, x, known, split.right))
                    / n.cover
            }
        }
    }

    fn factorial(n: usize) -> f64 {
        (1..=n).map(|k| k as f64).product()
    }

    /// Shapley values of `scale * sum(trees)` by enumerating all `2^m`
    /// coalitions.
    pub fn brute_force(trees: &[&RegressionTree], x: &[f64], scale: f64) -> Vec<f64> {
        let m = x.len();
        let value = |known: &[bool]| -> f64 {
            scale
                * trees
                    .iter()
                    .map(|tree| coalition_value(tree, x, known, 0))
                    .sum::<f64>()
        };

        let mut phi = vec![0.0; m];
        for i in 0..m {
            for mask in 0u32..(1 << m) {
                if mask & (1 << i) != 0 {
                    continue;
                }
                let size = mask.count_ones() as usize;
                let weight = factorial(size) * factorial(m - size - 1) / factorial(m);
                let without: Vec<bool> = (0..m).map(|j| mask & (1 << j) != 0).collect();
                let mut with = without.clone();
                with[i] = true;
                phi[i] += weight * (value(&with) - value(&without));
            }
        }
        phi
    }
}
