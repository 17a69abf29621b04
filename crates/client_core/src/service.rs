use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{
    domain::SpeciesClass,
    error::ServiceErrorBody,
    protocol::{
        ClassesResponse, ModelInfo, PredictRequest, PredictResponse, ServiceInfo, CLASSES_PATH,
        HEALTH_PATH, MODEL_INFO_PATH, PREDICT_PATH, REQUEST_TIMESTAMP_HEADER,
    },
};
use tracing::{debug, info, warn};

use crate::{config::ClientSettings, encoder::EncodedImage, error::ClassifyError};

#[async_trait]
pub trait ClassifierService: Send + Sync {
    /// `GET /health`; display-only metadata.
    async fn service_info(&self) -> Result<ServiceInfo>;
    async fn model_info(&self) -> Result<ModelInfo>;
    async fn classes(&self) -> Result<Vec<SpeciesClass>>;
    /// `POST /predict`. Application-level failures come back as a
    /// [`PredictResponse`] with `success: false`; only transport-level
    /// failures are returned as errors.
    async fn classify(
        &self,
        payload: &EncodedImage,
        timestamp: DateTime<Utc>,
    ) -> Result<PredictResponse, ClassifyError>;
}

/// Best-effort `/health` query. Failures are logged and swallowed.
pub async fn fetch_service_info(service: &dyn ClassifierService) -> Option<ServiceInfo> {
    match service.service_info().await {
        Ok(info) => {
            info!(
                status = info.status.as_deref().unwrap_or("unknown"),
                model_loaded = ?info.model_loaded,
                num_classes = ?info.num_classes,
                "service: info fetched"
            );
            Some(info)
        }
        Err(err) => {
            warn!(error = %err, "service: info query failed; continuing without it");
            None
        }
    }
}

pub fn format_request_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub struct HttpClassifierService {
    http: Client,
    base_url: String,
}

impl HttpClassifierService {
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self::with_client(http, settings.service_base_url.clone()))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path);
        let body = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("invalid JSON from {url}"))?;
        Ok(body)
    }
}

#[async_trait]
impl ClassifierService for HttpClassifierService {
    async fn service_info(&self) -> Result<ServiceInfo> {
        self.get_json(HEALTH_PATH).await
    }

    async fn model_info(&self) -> Result<ModelInfo> {
        self.get_json(MODEL_INFO_PATH).await
    }

    async fn classes(&self) -> Result<Vec<SpeciesClass>> {
        let body: ClassesResponse = self.get_json(CLASSES_PATH).await?;
        if !body.success {
            return Err(anyhow!("service did not return a class list"));
        }
        Ok(body.classes)
    }

    async fn classify(
        &self,
        payload: &EncodedImage,
        timestamp: DateTime<Utc>,
    ) -> Result<PredictResponse, ClassifyError> {
        let url = self.endpoint(PREDICT_PATH);
        let response = self
            .http
            .post(&url)
            .header(REQUEST_TIMESTAMP_HEADER, format_request_timestamp(timestamp))
            .json(&PredictRequest {
                image: payload.as_str().to_string(),
            })
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, url = %url, "classify: request failed");
                ClassifyError::transport(err)
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(ClassifyError::transport)?;
        debug!(status = %status, bytes = body.len(), "classify: response received");

        if status.is_success() {
            return serde_json::from_slice::<PredictResponse>(&body).map_err(|err| {
                warn!(error = %err, "classify: unparseable success body");
                ClassifyError::transport(err)
            });
        }

        match serde_json::from_slice::<ServiceErrorBody>(&body) {
            Ok(error_body) => Ok(PredictResponse::failure(error_body.error)),
            Err(_) => Err(ClassifyError::Transport(format!(
                "service returned HTTP {status} without an error body"
            ))),
        }
    }
}

#[cfg(test)]
#[path = "tests/service_tests.rs"]
mod tests;
