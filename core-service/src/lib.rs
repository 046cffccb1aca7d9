//! KneeForce Core - Knee Contact Force Prediction
//!
//! Predicts knee joint contact force during walking from eight gait
//! measurements and explains each prediction with additive feature
//! attributions (TreeSHAP).
//!
//! ## Pipeline
//! - `logic::features` - feature layout, input validation, feature vectors
//! - `logic::model` - artifact loading, tree ensemble inference, global model
//! - `logic::explain` - TreeSHAP attribution engine
//! - `api` - request orchestration, ranked reports, status structs

pub mod api;
pub mod constants;
pub mod error;
pub mod logic;
pub mod tolerances;

pub use api::commands::{assess, Assessment};
pub use api::engine_status::{engine_status, feature_schema, EngineStatus, FeatureDescriptor, ModelStatus};
pub use api::report::{build_report, rank_contributions, ForcePlot, RankedContribution, Report};
pub use error::{
    AttributionIncompatibilityError, Error, ExplainError, InputValidationError, InvalidReason,
    LayoutError, ModelLoadError, Result, ShapeMismatchError,
};
pub use logic::config::SafetyConfig;
pub use logic::explain::{explain, AttributionResult, FeatureContribution};
pub use logic::features::{
    Domain, Feature, FeatureInput, FeatureKind, FeatureVector, FeatureVectorBuilder, Layout,
    FEATURE_COUNT, FEATURE_VERSION,
};
pub use logic::model::{predict, registry, Model, ModelKind, Prediction};
