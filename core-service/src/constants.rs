//! Central Configuration Constants
//!
//! Single source of truth for configuration defaults.

/// Default model artifact path (relative to the working directory)
pub const DEFAULT_MODEL_PATH: &str = "models/demo_knee_force.json";

/// Artifact format version this build understands
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Decimal places shown for a prediction
pub const DISPLAY_DECIMALS: usize = 2;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "KneeForce";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get model artifact path from environment or use default
pub fn get_model_path() -> String {
    std::env::var("MODEL_PATH").unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
}

/// Get the expected artifact SHA-256 from environment, if pinned
pub fn get_expected_checksum() -> Option<String> {
    std::env::var("MODEL_SHA256")
        .ok()
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
}
