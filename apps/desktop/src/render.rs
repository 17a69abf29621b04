//! Plain-text rendering of submission snapshots and service metadata.

use client_core::{SubmissionStatus, SubmissionView};
use shared::{
    domain::SpeciesClass,
    protocol::{ModelInfo, ServiceInfo},
};

const BAR_WIDTH: usize = 30;

pub fn render_status_line(view: &SubmissionView) -> String {
    let file = view.file_name.as_deref().unwrap_or("-");
    match view.status {
        SubmissionStatus::Empty => "[empty]".to_string(),
        SubmissionStatus::Validating => format!("[validating] {file}"),
        SubmissionStatus::Ready => format!("[ready] {file}"),
        SubmissionStatus::Submitting => format!("[submitting] {file} ..."),
        SubmissionStatus::Succeeded => format!("[succeeded] {file}"),
        SubmissionStatus::Failed => format!(
            "[failed] {}",
            view.error_message.as_deref().unwrap_or_default()
        ),
    }
}

pub fn render_result(view: &SubmissionView) -> String {
    match (&view.predictions, &view.summary) {
        (Some(predictions), Some(summary)) => {
            let mut out = format!("{summary}\n");
            for (rank, prediction) in predictions.iter().enumerate() {
                let filled = ((prediction.confidence / 100.0) * BAR_WIDTH as f64).round() as usize;
                out.push_str(&format!(
                    "{:>2}. {:<28} {:>7}% {}\n",
                    rank + 1,
                    prediction.species,
                    client_core::interpreter::format_confidence(prediction.confidence),
                    "#".repeat(filled.min(BAR_WIDTH)),
                ));
            }
            out.trim_end().to_string()
        }
        _ => format!(
            "Error: {}",
            view.error_message
                .as_deref()
                .unwrap_or("classification did not complete")
        ),
    }
}

pub fn render_service_info(info: &ServiceInfo) -> String {
    let mut parts = vec![format!(
        "service: {}",
        info.status.as_deref().unwrap_or("unknown")
    )];
    if let Some(loaded) = info.model_loaded {
        parts.push(format!("model loaded: {loaded}"));
    }
    if let Some(classes) = info.num_classes {
        parts.push(format!("classes: {classes}"));
    }
    for (key, value) in &info.extra {
        parts.push(format!("{key}: {value}"));
    }
    parts.join(", ")
}

pub fn render_model_info(model: &ModelInfo) -> String {
    let mut out = format!(
        "model loaded: {}, classes: {}, device: {}",
        model.model_loaded,
        model.num_classes,
        model.device.as_deref().unwrap_or("unknown")
    );
    if !model.sample_classes.is_empty() {
        out.push_str(&format!("\nsample: {}", model.sample_classes.join(", ")));
    }
    out
}

pub fn render_classes(classes: &[SpeciesClass]) -> String {
    let mut out = format!("{} species\n", classes.len());
    for class in classes {
        out.push_str(&format!("{:>4}  {}\n", class.id.to_string(), class.name));
    }
    out.trim_end().to_string()
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
