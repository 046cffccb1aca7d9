//! Regression tree inference.
//!
//! Array-based tree representation with node traversal, built from the
//! sklearn-style parallel arrays of the model artifact. Each node keeps its
//! training cover (number or weight of samples that reached it), which the
//! attribution engine uses as the background distribution.

use serde::{Deserialize, Serialize};

/// Internal split of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split {
    /// Feature position (in the model's layout) to split on.
    pub feature: usize,
    /// Samples with `x[feature] <= threshold` go left.
    pub threshold: f64,
    pub left: usize,
    pub right: usize,
}

/// A node in a regression tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeNode {
    /// `None` for leaves.
    pub split: Option<Split>,
    /// Leaf output (internal nodes carry the exporter's mean, unused).
    pub value: f64,
    /// Training cover, always > 0.
    pub cover: f64,
}

impl TreeNode {
    pub const fn is_leaf(&self) -> bool {
        self.split.is_none()
    }
}

/// sklearn-style tree arrays as stored in the artifact.
///
/// `feature[i] < 0` marks a leaf; children of leaves are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeArrays {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
    pub cover: Vec<f64>,
}

/// A validated regression tree. Node 0 is the root.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Build from parallel arrays, checking that the structure is a proper
    /// tree over `n_features` inputs.
    ///
    /// # Errors
    ///
    /// Returns `Err` on inconsistent lengths, out-of-range children or
    /// features, non-finite values, non-positive covers, or a node reachable
    /// along two paths (including cycles).
    pub fn from_arrays(arrays: &TreeArrays, n_features: usize) -> Result<Self, String> {
        let n = arrays.feature.len();
        if n == 0 {
            return Err("tree has no nodes".into());
        }
        if arrays.children_left.len() != n
            || arrays.children_right.len() != n
            || arrays.threshold.len() != n
            || arrays.value.len() != n
            || arrays.cover.len() != n
        {
            return Err("inconsistent array lengths".into());
        }

        let child = |raw: i64, node: usize| -> Result<usize, String> {
            usize::try_from(raw)
                .ok()
                .filter(|&c| c < n && c != node)
                .ok_or_else(|| format!("node {node}: child index {raw} out of range"))
        };

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let cover = arrays.cover[i];
            if !(cover.is_finite() && cover > 0.0) {
                return Err(format!("node {i}: cover must be positive, got {cover}"));
            }
            let value = arrays.value[i];
            if !value.is_finite() {
                return Err(format!("node {i}: value is not finite"));
            }

            let split = if arrays.feature[i] < 0 {
                None
            } else {
                let feature = usize::try_from(arrays.feature[i])
                    .ok()
                    .filter(|&f| f < n_features)
                    .ok_or_else(|| {
                        format!("node {i}: feature {} out of range", arrays.feature[i])
                    })?;
                let threshold = arrays.threshold[i];
                if !threshold.is_finite() {
                    return Err(format!("node {i}: threshold is not finite"));
                }
                Some(Split {
                    feature,
                    threshold,
                    left: child(arrays.children_left[i], i)?,
                    right: child(arrays.children_right[i], i)?,
                })
            };
            nodes.push(TreeNode { split, value, cover });
        }

        let tree = Self { nodes };
        tree.check_reachability()?;
        Ok(tree)
    }

    /// Every node reachable from the root must be reached exactly once.
    fn check_reachability(&self) -> Result<(), String> {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![0usize];
        while let Some(idx) = stack.pop() {
            if std::mem::replace(&mut visited[idx], true) {
                return Err(format!("node {idx} is reachable along more than one path"));
            }
            if let Some(split) = self.nodes[idx].split {
                stack.push(split.right);
                stack.push(split.left);
            }
        }
        Ok(())
    }

    /// Leaf value for a single sample.
    pub fn predict(&self, features: &[f64]) -> f64 {
        let mut idx = 0usize;
        loop {
            let node = &self.nodes[idx];
            match node.split {
                None => return node.value,
                Some(split) => {
                    idx = if features[split.feature] <= split.threshold {
                        split.left
                    } else {
                        split.right
                    };
                }
            }
        }
    }

    /// Cover-weighted mean leaf value: the tree's output when nothing is
    /// known about the sample.
    pub fn expected_value(&self) -> f64 {
        self.node_expectation(0)
    }

    fn node_expectation(&self, idx: usize) -> f64 {
        let node = &self.nodes[idx];
        match node.split {
            None => node.value,
            Some(split) => {
                let left = &self.nodes[split.left];
                let right = &self.nodes[split.right];
                (left.cover * self.node_expectation(split.left)
                    + right.cover * self.node_expectation(split.right))
                    / node.cover
            }
        }
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn node_at(&self, index: usize) -> &TreeNode {
        &self.nodes[index]
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        self.node_depth(0)
    }

    fn node_depth(&self, idx: usize) -> usize {
        match self.nodes[idx].split {
            None => 0,
            Some(split) => 1 + self.node_depth(split.left).max(self.node_depth(split.right)),
        }
    }
}
