//! Commands - one prediction request end to end.
//!
//! Validates named input against the model's layout, predicts, and (when
//! asked) attaches a ranked explanation. An explanation that cannot be built
//! for this model kind is reported next to the prediction instead of failing
//! the request.

use serde::Serialize;

use super::report::{build_report, Report};
use crate::error::{Error, ExplainError, Result};
use crate::logic::explain::explain;
use crate::logic::features::FeatureInput;
use crate::logic::model::{Model, Prediction};

/// Message used when explanations are switched off.
pub const EXPLAIN_DISABLED: &str = "explanations are disabled";

/// Result of one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub prediction: Prediction,
    pub explanation: Option<Report>,
    /// Why `explanation` is missing
    pub explanation_error: Option<String>,
}

/// Validate, predict and optionally explain.
///
/// # Errors
///
/// - [`Error::InputValidation`] for missing, unknown or out-of-domain input
/// - [`Error::ShapeMismatch`] if the built vector does not match the model
pub fn assess(model: &Model, input: &FeatureInput, with_explanation: bool) -> Result<Assessment> {
    let vector = input.build_for(model.layout())?;
    let prediction = model.predict(&vector)?;
    log::debug!("Predicted {} for {}", prediction.value, vector.to_log_entry());

    if !with_explanation {
        return Ok(Assessment {
            prediction,
            explanation: None,
            explanation_error: Some(EXPLAIN_DISABLED.to_string()),
        });
    }

    match explain(model, &vector) {
        Ok(attribution) => Ok(Assessment {
            prediction,
            explanation: Some(build_report(&prediction, &attribution)),
            explanation_error: None,
        }),
        Err(ExplainError::Incompatible(e)) => {
            log::info!("Returning prediction without explanation: {e}");
            Ok(Assessment {
                prediction,
                explanation: None,
                explanation_error: Some(e.to_string()),
            })
        }
        Err(e @ ExplainError::ShapeMismatch(_)) => Err(Error::from(e)),
    }
}
