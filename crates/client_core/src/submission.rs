//! Submission lifecycle as an explicit state value and a pure transition
//! function.
//!
//! Everything the presentation layer can observe (status, preview, ranked
//! predictions, summary, error) lives in one [`Submission`] and is replaced in
//! a single step by [`transition`], so no reader ever sees a half-updated
//! submission. Asynchronous completions carry the [`SubmissionVersion`] they
//! were started under; once the user resets or picks another file the version
//! moves on and late completions are ignored.

use std::fmt;

use crate::{
    encoder::EncodedImage,
    error::{ClassifyError, NO_FILE_MESSAGE},
    interpreter::{Classification, PredictionSet},
    source::SourceFile,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SubmissionStatus {
    #[default]
    Empty,
    Validating,
    Ready,
    Submitting,
    Succeeded,
    Failed,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionStatus::Empty => "empty",
            SubmissionStatus::Validating => "validating",
            SubmissionStatus::Ready => "ready",
            SubmissionStatus::Submitting => "submitting",
            SubmissionStatus::Succeeded => "succeeded",
            SubmissionStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SubmissionStatus::Succeeded | SubmissionStatus::Failed)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SubmissionVersion(pub u64);

impl SubmissionVersion {
    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SubmissionVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Submission {
    status: SubmissionStatus,
    version: SubmissionVersion,
    source: Option<SourceFile>,
    preview: Option<EncodedImage>,
    classification: Option<Classification>,
    error_message: Option<String>,
}

impl Submission {
    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    pub fn version(&self) -> SubmissionVersion {
        self.version
    }

    pub fn source(&self) -> Option<&SourceFile> {
        self.source.as_ref()
    }

    pub fn preview(&self) -> Option<&EncodedImage> {
        self.preview.as_ref()
    }

    pub fn classification(&self) -> Option<&Classification> {
        self.classification.as_ref()
    }

    pub fn predictions(&self) -> Option<&PredictionSet> {
        self.classification.as_ref().map(|c| &c.predictions)
    }

    pub fn summary(&self) -> Option<&str> {
        self.classification.as_ref().map(|c| c.summary.as_str())
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn can_submit(&self) -> bool {
        matches!(
            self.status,
            SubmissionStatus::Ready | SubmissionStatus::Failed
        ) && self.source.is_some()
            && self.preview.is_some()
    }

    pub fn view(&self) -> SubmissionView {
        SubmissionView {
            status: self.status,
            file_name: self.source.as_ref().map(|s| s.name.clone()),
            preview: self.preview.clone(),
            predictions: self.predictions().cloned(),
            summary: self.summary().map(str::to_string),
            processed_image: self
                .classification
                .as_ref()
                .and_then(|c| c.processed_image.clone()),
            error_message: self.error_message.clone(),
            can_submit: self.can_submit(),
        }
    }

    fn clear_results(&mut self) {
        self.classification = None;
        self.error_message = None;
    }

    fn fail(&mut self, message: String) {
        self.status = SubmissionStatus::Failed;
        self.classification = None;
        self.error_message = Some(message);
    }
}

/// What the presentation layer renders. Does not carry the version token.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubmissionView {
    pub status: SubmissionStatus,
    pub file_name: Option<String>,
    pub preview: Option<EncodedImage>,
    pub predictions: Option<PredictionSet>,
    pub summary: Option<String>,
    pub processed_image: Option<String>,
    pub error_message: Option<String>,
    pub can_submit: bool,
}

#[derive(Debug)]
pub enum SubmissionEvent {
    /// Picker or drag-drop; enters `Validating` from any state.
    FileSelected(SourceFile),
    /// Validation and preview generation ended for the given version.
    ValidationFinished {
        version: SubmissionVersion,
        outcome: Result<EncodedImage, ClassifyError>,
    },
    SubmitRequested,
    /// Encoding, the service call and interpretation ended for the given
    /// version.
    SubmissionFinished {
        version: SubmissionVersion,
        outcome: Result<Classification, ClassifyError>,
    },
    Reset,
}

impl SubmissionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SubmissionEvent::FileSelected(_) => "file_selected",
            SubmissionEvent::ValidationFinished { .. } => "validation_finished",
            SubmissionEvent::SubmitRequested => "submit_requested",
            SubmissionEvent::SubmissionFinished { .. } => "submission_finished",
            SubmissionEvent::Reset => "reset",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Completion for a version that has since been reset or replaced.
    Stale {
        current: SubmissionVersion,
        received: SubmissionVersion,
    },
    /// The event is not valid in the current status.
    NotAccepted { status: SubmissionStatus },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Applied,
    Ignored(IgnoreReason),
}

impl Disposition {
    pub fn is_applied(self) -> bool {
        self == Disposition::Applied
    }
}

pub fn transition(
    mut current: Submission,
    event: SubmissionEvent,
) -> (Submission, Disposition) {
    match event {
        SubmissionEvent::FileSelected(file) => {
            current = Submission {
                status: SubmissionStatus::Validating,
                version: current.version.next(),
                source: Some(file),
                ..Submission::default()
            };
            (current, Disposition::Applied)
        }

        SubmissionEvent::ValidationFinished { version, outcome } => {
            if let Some(reason) = reject_completion(&current, version, SubmissionStatus::Validating)
            {
                return (current, Disposition::Ignored(reason));
            }
            match outcome {
                Ok(preview) => {
                    current.status = SubmissionStatus::Ready;
                    current.preview = Some(preview);
                }
                Err(err) => {
                    current.source = None;
                    current.preview = None;
                    current.fail(err.user_message());
                }
            }
            (current, Disposition::Applied)
        }

        SubmissionEvent::SubmitRequested => {
            if current.can_submit() {
                current.status = SubmissionStatus::Submitting;
                current.version = current.version.next();
                current.clear_results();
                return (current, Disposition::Applied);
            }
            match current.status {
                SubmissionStatus::Empty | SubmissionStatus::Failed => {
                    current.source = None;
                    current.preview = None;
                    current.fail(NO_FILE_MESSAGE.to_string());
                    (current, Disposition::Applied)
                }
                status => (
                    current,
                    Disposition::Ignored(IgnoreReason::NotAccepted { status }),
                ),
            }
        }

        SubmissionEvent::SubmissionFinished { version, outcome } => {
            if let Some(reason) = reject_completion(&current, version, SubmissionStatus::Submitting)
            {
                return (current, Disposition::Ignored(reason));
            }
            match outcome {
                Ok(classification) => {
                    current.status = SubmissionStatus::Succeeded;
                    current.error_message = None;
                    current.classification = Some(classification);
                }
                Err(err) => current.fail(err.user_message()),
            }
            (current, Disposition::Applied)
        }

        SubmissionEvent::Reset => {
            let version = current.version.next();
            (
                Submission {
                    version,
                    ..Submission::default()
                },
                Disposition::Applied,
            )
        }
    }
}

fn reject_completion(
    current: &Submission,
    version: SubmissionVersion,
    expected: SubmissionStatus,
) -> Option<IgnoreReason> {
    if version != current.version {
        return Some(IgnoreReason::Stale {
            current: current.version,
            received: version,
        });
    }
    if current.status != expected {
        return Some(IgnoreReason::NotAccepted {
            status: current.status,
        });
    }
    None
}

#[cfg(test)]
#[path = "tests/submission_tests.rs"]
mod tests;
