//! Path-dependent TreeSHAP for a single regression tree.
//!
//! Exact Shapley values for the coalition game
//! `v(S) = E[tree(x) | x_S]`, where features outside `S` are integrated out
//! by following both children weighted by their training cover.
//!
//! The recursion carries the set of unique features on the current
//! root-to-node path. For each path element:
//! - `zero_fraction`: share of cover that flows this way when the feature is
//!   unknown
//! - `one_fraction`: 1 if `x` itself flows this way, else 0
//! - `weight`: running Shapley weight over coalition sizes
//!
//! A feature split on twice along one path is unwound first, so each feature
//! appears once and its fractions multiply. Runs in `O(leaves * depth^2)`.

use crate::logic::model::RegressionTree;

#[derive(Debug, Clone, Copy)]
struct PathElement {
    /// `None` only for the root sentinel.
    feature: Option<usize>,
    zero_fraction: f64,
    one_fraction: f64,
    weight: f64,
}

/// Add `scale * phi_tree(x)` into `phi` (indexed like `x`).
pub fn accumulate(tree: &RegressionTree, x: &[f64], scale: f64, phi: &mut [f64]) {
    recurse(tree, x, scale, phi, 0, &[], 1.0, 1.0, None);
}

#[allow(clippy::too_many_arguments)]
fn recurse(
    tree: &RegressionTree,
    x: &[f64],
    scale: f64,
    phi: &mut [f64],
    node: usize,
    parent_path: &[PathElement],
    zero_fraction: f64,
    one_fraction: f64,
    feature: Option<usize>,
) {
    let mut path = parent_path.to_vec();
    extend(&mut path, zero_fraction, one_fraction, feature);

    let current = tree.node_at(node);
    let Some(split) = current.split else {
        let leaf = current.value * scale;
        for i in 1..path.len() {
            let el = path[i];
            let w = unwound_sum(&path, i);
            if let Some(f) = el.feature {
                phi[f] += w * (el.one_fraction - el.zero_fraction) * leaf;
            }
        }
        return;
    };

    let (hot, cold) = if x[split.feature] <= split.threshold {
        (split.left, split.right)
    } else {
        (split.right, split.left)
    };
    let hot_zero = tree.node_at(hot).cover / current.cover;
    let cold_zero = tree.node_at(cold).cover / current.cover;

    let mut incoming_zero = 1.0;
    let mut incoming_one = 1.0;
    if let Some(k) = path.iter().position(|el| el.feature == Some(split.feature)) {
        incoming_zero = path[k].zero_fraction;
        incoming_one = path[k].one_fraction;
        unwind(&mut path, k);
    }

    recurse(
        tree,
        x,
        scale,
        phi,
        hot,
        &path,
        hot_zero * incoming_zero,
        incoming_one,
        Some(split.feature),
    );
    recurse(
        tree,
        x,
        scale,
        phi,
        cold,
        &path,
        cold_zero * incoming_zero,
        0.0,
        Some(split.feature),
    );
}

/// Push a feature onto the path and update the coalition-size weights.
fn extend(path: &mut Vec<PathElement>, zero_fraction: f64, one_fraction: f64, feature: Option<usize>) {
    let depth = path.len();
    path.push(PathElement {
        feature,
        zero_fraction,
        one_fraction,
        weight: if depth == 0 { 1.0 } else { 0.0 },
    });
    let denom = (depth + 1) as f64;
    for i in (0..depth).rev() {
        path[i + 1].weight += one_fraction * path[i].weight * (i + 1) as f64 / denom;
        path[i].weight = zero_fraction * path[i].weight * (depth - i) as f64 / denom;
    }
}

/// Remove element `k` from the path, undoing its effect on the weights.
fn unwind(path: &mut Vec<PathElement>, k: usize) {
    let depth = path.len() - 1;
    let one = path[k].one_fraction;
    let zero = path[k].zero_fraction;
    let denom = (depth + 1) as f64;

    let mut next_one_portion = path[depth].weight;
    for i in (0..depth).rev() {
        if one != 0.0 {
            let tmp = path[i].weight;
            path[i].weight = next_one_portion * denom / ((i + 1) as f64 * one);
            next_one_portion = tmp - path[i].weight * zero * (depth - i) as f64 / denom;
        } else {
            path[i].weight = path[i].weight * denom / (zero * (depth - i) as f64);
        }
    }

    for i in k..depth {
        path[i].feature = path[i + 1].feature;
        path[i].zero_fraction = path[i + 1].zero_fraction;
        path[i].one_fraction = path[i + 1].one_fraction;
    }
    path.pop();
}

/// Total weight the path would have with element `k` unwound, without
/// modifying it.
fn unwound_sum(path: &[PathElement], k: usize) -> f64 {
    let depth = path.len() - 1;
    let one = path[k].one_fraction;
    let zero = path[k].zero_fraction;
    let denom = (depth + 1) as f64;

    let mut next_one_portion = path[depth].weight;
    let mut total = 0.0;
    for i in (0..depth).rev() {
        if one != 0.0 {
            let tmp = next_one_portion * denom / ((i + 1) as f64 * one);
            total += tmp;
            next_one_portion = path[i].weight - tmp * zero * (depth - i) as f64 / denom;
        } else if zero != 0.0 {
            total += path[i].weight / zero / ((depth - i) as f64 / denom);
        }
    }
    total
}
