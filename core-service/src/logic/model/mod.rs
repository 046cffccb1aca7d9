//! Model Module - Inference Service
//!
//! Artifact loading, tree ensemble inference and the process-wide model.

pub mod artifact;
pub mod ensemble;
pub mod inference;
pub mod registry;
pub mod tree;

// Re-export common types
pub use artifact::{EstimatorSpec, ModelArtifact};
pub use ensemble::{Aggregation, LinearModel, Regressor, TreeEnsemble};
pub use inference::{predict, Estimator, Model, ModelKind, ModelMetadata, Prediction};
pub use tree::{RegressionTree, TreeArrays, TreeNode};
