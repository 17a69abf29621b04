use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use url::Url;

pub const SETTINGS_FILE: &str = "classifier.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub service_base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            service_base_url: "http://127.0.0.1:5000".into(),
            request_timeout_secs: 30,
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn with_service_url(mut self, raw: &str) -> anyhow::Result<Self> {
        self.service_base_url = normalize_base_url(raw)?;
        Ok(self)
    }
}

/// Defaults, then `classifier.toml` in the working directory, then the
/// environment.
pub fn load_settings() -> ClientSettings {
    load_settings_with(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_with(
    file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(file) {
        apply_file_settings(&mut settings, &raw);
    }

    if let Some(v) = env("CLASSIFIER_URL") {
        set_base_url(&mut settings, &v, "CLASSIFIER_URL");
    }
    if let Some(v) = env("APP__SERVICE_BASE_URL") {
        set_base_url(&mut settings, &v, "APP__SERVICE_BASE_URL");
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    settings
}

fn apply_file_settings(settings: &mut ClientSettings, raw: &str) {
    let table = match toml::from_str::<toml::Table>(raw) {
        Ok(table) => table,
        Err(err) => {
            tracing::warn!(error = %err, "config: ignoring unparseable {SETTINGS_FILE}");
            return;
        }
    };

    if let Some(v) = table.get("service_base_url").and_then(|v| v.as_str()) {
        set_base_url(settings, v, SETTINGS_FILE);
    }

    let timeout = table.get("request_timeout_secs").and_then(|v| match v {
        toml::Value::Integer(secs) => u64::try_from(*secs).ok(),
        toml::Value::String(secs) => secs.trim().parse().ok(),
        _ => None,
    });
    if let Some(secs) = timeout {
        settings.request_timeout_secs = secs;
    }
}

fn set_base_url(settings: &mut ClientSettings, raw: &str, source: &str) {
    match normalize_base_url(raw) {
        Ok(url) => settings.service_base_url = url,
        Err(err) => tracing::warn!(error = %err, source, "config: ignoring service url"),
    }
}

/// Parses `raw` as an http(s) URL and strips any trailing slash.
pub fn normalize_base_url(raw: &str) -> anyhow::Result<String> {
    let raw = raw.trim();
    let url = Url::parse(raw).with_context(|| format!("invalid service url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("service url must start with http:// or https://, got '{raw}'");
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
