use serde::{Deserialize, Serialize};

use crate::domain::{ClassId, SpeciesClass};

pub const HEALTH_PATH: &str = "/health";
pub const PREDICT_PATH: &str = "/predict";
pub const MODEL_INFO_PATH: &str = "/model-info";
pub const CLASSES_PATH: &str = "/classes";

/// Header carrying the client-observed request time in RFC 3339 form.
pub const REQUEST_TIMESTAMP_HEADER: &str = "X-Request-Timestamp";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Self-describing `data:` URI of the image.
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopPrediction {
    pub species: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<ClassId>,
}

/// Body of a `/predict` response, success or failure.
///
/// `predictions` is kept as raw JSON so that a malformed list reaches the
/// interpreter as an application-level failure instead of failing the whole
/// body decode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predictions: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_prediction: Option<TopPrediction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictResponse {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Metadata from `/health`. Only used for display; unknown fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_loaded: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_classes: Option<u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub num_classes: u64,
    #[serde(default)]
    pub sample_classes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassesResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub classes: Vec<SpeciesClass>,
    #[serde(default)]
    pub total: u64,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
