//! Turns a raw `/predict` response into a ranked [`PredictionSet`] and the
//! summary line shown to the user.

use std::collections::HashSet;

use shared::{
    domain::Prediction,
    protocol::{PredictResponse, TopPrediction},
};
use tracing::warn;

use crate::error::{ClassifyError, APPLICATION_ERROR_MESSAGE};

pub const EMPTY_PREDICTIONS_MESSAGE: &str = "no predictions returned";
pub const MALFORMED_PREDICTIONS_MESSAGE: &str = "malformed prediction list";

/// Non-empty predictions ordered by non-increasing confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionSet(Vec<Prediction>);

impl PredictionSet {
    /// Sorts descending by confidence, keeping service order among ties.
    /// Returns `None` for an empty list.
    pub fn ranked(mut predictions: Vec<Prediction>) -> Option<Self> {
        if predictions.is_empty() {
            return None;
        }
        predictions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        Some(Self(predictions))
    }

    pub fn top(&self) -> &Prediction {
        &self.0[0]
    }

    pub fn as_slice(&self) -> &[Prediction] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Prediction> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Prediction> {
        self.0
    }
}

impl<'a> IntoIterator for &'a PredictionSet {
    type Item = &'a Prediction;
    type IntoIter = std::slice::Iter<'a, Prediction>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub predictions: PredictionSet,
    pub summary: String,
    /// Image as the service saw it after preprocessing, when returned.
    pub processed_image: Option<String>,
    /// Request timestamp echoed back by the service, when returned.
    pub echoed_timestamp: Option<String>,
}

impl Classification {
    pub fn top(&self) -> &Prediction {
        self.predictions.top()
    }
}

pub fn interpret(response: PredictResponse) -> Result<Classification, ClassifyError> {
    if !response.success {
        let message = response
            .error
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| APPLICATION_ERROR_MESSAGE.to_string());
        return Err(ClassifyError::Application(message));
    }

    let raw = response
        .predictions
        .ok_or_else(|| ClassifyError::Application(EMPTY_PREDICTIONS_MESSAGE.to_string()))?;
    let predictions: Vec<Prediction> = serde_json::from_value(raw).map_err(|err| {
        warn!(error = %err, "classify: prediction list did not decode");
        ClassifyError::Application(MALFORMED_PREDICTIONS_MESSAGE.to_string())
    })?;
    check_predictions(&predictions)?;

    let predictions = PredictionSet::ranked(predictions)
        .ok_or_else(|| ClassifyError::Application(EMPTY_PREDICTIONS_MESSAGE.to_string()))?;

    if let Some(reported) = &response.top_prediction {
        warn_on_top_mismatch(reported, predictions.top());
    }

    let summary = summarize(predictions.top());
    Ok(Classification {
        predictions,
        summary,
        processed_image: response.processed_image,
        echoed_timestamp: response.timestamp,
    })
}

pub fn summarize(top: &Prediction) -> String {
    format!(
        "Identified as {} with {}% confidence",
        top.species,
        format_confidence(top.confidence)
    )
}

/// Two decimal places, rounding half away from zero on the shortest decimal
/// form of the value, so `97.345` renders as `97.35` even though its binary
/// value is slightly below.
pub fn format_confidence(value: f64) -> String {
    if !value.is_finite() {
        return format!("{value}");
    }

    let repr = format!("{}", value.abs());
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
    let frac_digits: Vec<u32> = frac_part.chars().filter_map(|c| c.to_digit(10)).collect();
    let digit = |idx: usize| u128::from(frac_digits.get(idx).copied().unwrap_or(0));

    let whole: u128 = int_part.parse().unwrap_or(0);
    let mut hundredths = whole * 100 + digit(0) * 10 + digit(1);
    if digit(2) >= 5 {
        hundredths += 1;
    }

    let sign = if value < 0.0 && hundredths != 0 { "-" } else { "" };
    format!("{sign}{}.{:02}", hundredths / 100, hundredths % 100)
}

fn check_predictions(predictions: &[Prediction]) -> Result<(), ClassifyError> {
    if predictions.is_empty() {
        return Err(ClassifyError::Application(
            EMPTY_PREDICTIONS_MESSAGE.to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(predictions.len());
    for prediction in predictions {
        let confidence_ok =
            prediction.confidence.is_finite() && (0.0..=100.0).contains(&prediction.confidence);
        if !confidence_ok || !seen.insert(&prediction.class_id) {
            warn!(
                class_id = %prediction.class_id,
                confidence = prediction.confidence,
                "classify: rejecting prediction list"
            );
            return Err(ClassifyError::Application(
                MALFORMED_PREDICTIONS_MESSAGE.to_string(),
            ));
        }
    }

    Ok(())
}

fn warn_on_top_mismatch(reported: &TopPrediction, ranked_top: &Prediction) {
    if reported.species != ranked_top.species {
        warn!(
            reported = %reported.species,
            ranked = %ranked_top.species,
            "classify: service top_prediction disagrees with ranked list; using ranked list"
        );
    }
}

#[cfg(test)]
#[path = "tests/interpreter_tests.rs"]
mod tests;
