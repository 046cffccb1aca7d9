//! Error types for the prediction and explanation pipeline.
//!
//! One error type per failure class, so each stage returns exactly what it
//! can fail with:
//! - [`InputValidationError`] - missing or out-of-domain input, recoverable
//! - [`ModelLoadError`] - artifact missing/corrupt/incompatible, fatal at startup
//! - [`ShapeMismatchError`] - vector layout differs from the model's layout
//! - [`AttributionIncompatibilityError`] - model has no tree structure
//!
//! [`Error`] collects all of them for callers that run the whole pipeline.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::model::ModelKind;

// ============================================================================
// INPUT VALIDATION
// ============================================================================

/// Why a raw input value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    Missing,
    Unknown,
    Duplicate,
    NotFinite,
    Negative,
    NotBinary,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Missing => "is required",
            Self::Unknown => "is not a known feature",
            Self::Duplicate => "was supplied more than once",
            Self::NotFinite => "must be a finite number",
            Self::Negative => "must not be negative",
            Self::NotBinary => "must be 0 or 1",
        };
        f.write_str(msg)
    }
}

/// A named input field was missing or outside its allowed domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid input `{field}`: {reason}")]
pub struct InputValidationError {
    /// Field name as the caller supplied it (or the canonical name if missing).
    pub field: String,
    pub reason: InvalidReason,
}

impl InputValidationError {
    pub fn new(field: impl Into<String>, reason: InvalidReason) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

// ============================================================================
// LAYOUT
// ============================================================================

/// A feature ordering could not be bound to the known feature slots.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("layout needs {expected} features, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("unknown feature name `{0}`")]
    UnknownFeature(String),

    #[error("feature `{0}` appears more than once")]
    Duplicate(&'static str),
}

// ============================================================================
// MODEL LOADING
// ============================================================================

/// The model artifact could not be turned into a usable model.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("model artifact not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read model artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed model artifact: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unsupported artifact format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("incompatible feature layout: {0}")]
    Layout(#[from] LayoutError),

    #[error("invalid tree {tree}: {reason}")]
    InvalidTree { tree: usize, reason: String },

    #[error("invalid model: {0}")]
    Invalid(String),

    #[error("artifact checksum mismatch: expected {expected}, found {found}")]
    ChecksumMismatch { expected: String, found: String },
}

// ============================================================================
// PER-REQUEST FAILURES
// ============================================================================

/// The vector was built for a different feature order than the model's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("feature layout mismatch: model expects hash {expected_hash:08x}, vector has hash {actual_hash:08x}")]
pub struct ShapeMismatchError {
    pub expected_hash: u32,
    pub actual_hash: u32,
}

/// Attribution needs a tree ensemble; the loaded model is something else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("model kind `{kind}` has no tree structure to attribute")]
pub struct AttributionIncompatibilityError {
    pub kind: ModelKind,
}

/// Failures of the explanation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExplainError {
    #[error(transparent)]
    ShapeMismatch(#[from] ShapeMismatchError),

    #[error(transparent)]
    Incompatible(#[from] AttributionIncompatibilityError),
}

// ============================================================================
// UMBRELLA
// ============================================================================

/// Any failure of the prediction and explanation pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    InputValidation(#[from] InputValidationError),

    #[error(transparent)]
    ModelLoad(#[from] ModelLoadError),

    #[error(transparent)]
    ShapeMismatch(#[from] ShapeMismatchError),

    #[error(transparent)]
    AttributionIncompatible(#[from] AttributionIncompatibilityError),

    #[error("no model has been loaded")]
    ModelNotLoaded,

    #[error("a model is already loaded")]
    ModelAlreadyLoaded,
}

impl From<ExplainError> for Error {
    fn from(err: ExplainError) -> Self {
        match err {
            ExplainError::ShapeMismatch(e) => Self::ShapeMismatch(e),
            ExplainError::Incompatible(e) => Self::AttributionIncompatible(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
