//! Logic Module - Prediction & Attribution Engines
//!
//! ## Layout
//! - `features/` - feature slots, layout binding, input validation
//! - `model/` - artifact loading, tree ensembles, process-wide model
//! - `explain/` - TreeSHAP attribution
//! - `config` - runtime switches

pub mod config;
pub mod explain;
pub mod features;
pub mod model;

pub use config::SafetyConfig;
