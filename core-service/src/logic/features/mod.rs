//! Features Module - Feature Vector Builder
//!
//! Turns named raw inputs into a validated vector whose positions match the
//! model's training order.

pub mod input;
pub mod layout;
pub mod vector;

#[cfg(test)]
mod tests;

// Re-export common types
pub use input::FeatureInput;
pub use layout::{
    layout_hash, Domain, Feature, FeatureKind, Layout, LayoutInfo, FEATURE_COUNT, FEATURE_VERSION,
};
pub use vector::{FeatureVector, FeatureVectorBuilder};
