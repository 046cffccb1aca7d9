//! API Module
//!
//! Structure:
//! - commands.rs: one request end to end (validate, predict, explain)
//! - report.rs: ranking and force-plot data for renderers
//! - engine_status.rs: model status and feature schema

pub mod commands;
pub mod engine_status;
pub mod report;

// Re-export current version as default
pub use commands::*;
pub use engine_status::{engine_status, feature_schema, EngineStatus, FeatureDescriptor, ModelStatus};
pub use report::*;
