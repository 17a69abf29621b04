use super::*;

use serde_json::json;
use shared::protocol::PredictResponse;

use crate::{
    encoder::encode,
    error::{EncodingError, ValidationError},
    interpreter::interpret,
};

fn fish_png() -> SourceFile {
    SourceFile::from_path_with_metadata("/photos/fish.png", "image/png", 2 * 1024 * 1024)
}

fn apply(current: Submission, event: SubmissionEvent) -> Submission {
    let (next, disposition) = transition(current, event);
    assert_eq!(disposition, Disposition::Applied);
    next
}

fn ready_submission() -> Submission {
    let submission = apply(Submission::default(), SubmissionEvent::FileSelected(fish_png()));
    let version = submission.version();
    apply(
        submission,
        SubmissionEvent::ValidationFinished {
            version,
            outcome: Ok(encode("image/png", b"preview")),
        },
    )
}

fn submitting_submission() -> Submission {
    apply(ready_submission(), SubmissionEvent::SubmitRequested)
}

fn salmon_classification() -> Classification {
    let response: PredictResponse = serde_json::from_value(json!({
        "success": true,
        "predictions": [
            { "class_id": 1, "species": "Salmon", "confidence": 97.345 },
            { "class_id": 2, "species": "Trout", "confidence": 2.655 }
        ]
    }))
    .expect("response");
    interpret(response).expect("classification")
}

fn assert_preview_invariant(submission: &Submission) {
    let expects_preview = matches!(
        submission.status(),
        SubmissionStatus::Ready | SubmissionStatus::Submitting | SubmissionStatus::Succeeded
    );
    if expects_preview {
        assert!(submission.preview().is_some(), "{}", submission.status());
    }
    if matches!(
        submission.status(),
        SubmissionStatus::Empty | SubmissionStatus::Validating
    ) {
        assert!(submission.preview().is_none(), "{}", submission.status());
    }
    assert_eq!(
        submission.error_message().is_some(),
        submission.status() == SubmissionStatus::Failed
    );
    assert_eq!(
        submission.predictions().is_some(),
        submission.status() == SubmissionStatus::Succeeded
    );
}

#[test]
fn starts_empty() {
    let submission = Submission::default();
    assert_eq!(submission.status(), SubmissionStatus::Empty);
    assert!(submission.source().is_none());
    assert_preview_invariant(&submission);
}

#[test]
fn happy_path_reaches_succeeded_with_summary() {
    let submission = ready_submission();
    assert_eq!(submission.status(), SubmissionStatus::Ready);
    assert_preview_invariant(&submission);

    let submission = apply(submission, SubmissionEvent::SubmitRequested);
    assert_eq!(submission.status(), SubmissionStatus::Submitting);
    assert_preview_invariant(&submission);

    let version = submission.version();
    let submission = apply(
        submission,
        SubmissionEvent::SubmissionFinished {
            version,
            outcome: Ok(salmon_classification()),
        },
    );
    assert_eq!(submission.status(), SubmissionStatus::Succeeded);
    assert_eq!(
        submission.summary(),
        Some("Identified as Salmon with 97.35% confidence")
    );
    let species: Vec<_> = submission
        .predictions()
        .expect("predictions")
        .iter()
        .map(|p| p.species.clone())
        .collect();
    assert_eq!(species, ["Salmon", "Trout"]);
    assert_preview_invariant(&submission);
}

#[test]
fn rejected_file_fails_without_preview_or_file() {
    let submission = apply(
        Submission::default(),
        SubmissionEvent::FileSelected(SourceFile::from_path_with_metadata(
            "/photos/big.jpg",
            "image/jpeg",
            20 * 1024 * 1024,
        )),
    );
    let version = submission.version();
    let submission = apply(
        submission,
        SubmissionEvent::ValidationFinished {
            version,
            outcome: Err(ValidationError::FileTooLarge {
                size_bytes: 20 * 1024 * 1024,
                limit: 16 * 1024 * 1024,
            }
            .into()),
        },
    );

    assert_eq!(submission.status(), SubmissionStatus::Failed);
    assert_eq!(submission.error_message(), Some("file too large"));
    assert!(submission.preview().is_none());
    assert!(submission.source().is_none());
    assert!(!submission.can_submit());
}

#[test]
fn selecting_a_file_clears_previous_results_immediately() {
    let submission = submitting_submission();
    let version = submission.version();
    let submission = apply(
        submission,
        SubmissionEvent::SubmissionFinished {
            version,
            outcome: Ok(salmon_classification()),
        },
    );
    assert!(submission.summary().is_some());

    let submission = apply(submission, SubmissionEvent::FileSelected(fish_png()));
    assert_eq!(submission.status(), SubmissionStatus::Validating);
    assert!(submission.summary().is_none());
    assert!(submission.predictions().is_none());
    assert!(submission.error_message().is_none());
    assert!(submission.preview().is_none());
}

#[test]
fn submit_without_file_fails_with_message() {
    let (submission, disposition) =
        transition(Submission::default(), SubmissionEvent::SubmitRequested);
    assert_eq!(disposition, Disposition::Applied);
    assert_eq!(submission.status(), SubmissionStatus::Failed);
    assert_eq!(submission.error_message(), Some(NO_FILE_MESSAGE));
    assert!(submission.preview().is_none());
}

#[test]
fn submit_is_single_flight() {
    let submission = submitting_submission();
    let version = submission.version();
    let (submission, disposition) = transition(submission, SubmissionEvent::SubmitRequested);
    assert_eq!(
        disposition,
        Disposition::Ignored(IgnoreReason::NotAccepted {
            status: SubmissionStatus::Submitting
        })
    );
    assert_eq!(submission.version(), version);
    assert_eq!(submission.status(), SubmissionStatus::Submitting);
}

#[test]
fn submit_is_ignored_while_validating() {
    let submission = apply(Submission::default(), SubmissionEvent::FileSelected(fish_png()));
    let (submission, disposition) = transition(submission, SubmissionEvent::SubmitRequested);
    assert!(!disposition.is_applied());
    assert_eq!(submission.status(), SubmissionStatus::Validating);
}

#[test]
fn failure_keeps_file_and_allows_resubmission() {
    let submission = submitting_submission();
    let version = submission.version();
    let submission = apply(
        submission,
        SubmissionEvent::SubmissionFinished {
            version,
            outcome: Err(ClassifyError::Application("too blurry".into())),
        },
    );
    assert_eq!(submission.status(), SubmissionStatus::Failed);
    assert_eq!(submission.error_message(), Some("too blurry"));
    assert!(submission.predictions().is_none());
    assert!(submission.preview().is_some());
    assert!(submission.can_submit());

    let submission = apply(submission, SubmissionEvent::SubmitRequested);
    assert_eq!(submission.status(), SubmissionStatus::Submitting);
    assert!(submission.error_message().is_none());
    assert!(submission.version() > version);
}

#[test]
fn encoding_and_transport_failures_use_generic_messages() {
    let submission = submitting_submission();
    let version = submission.version();
    let submission = apply(
        submission,
        SubmissionEvent::SubmissionFinished {
            version,
            outcome: Err(EncodingError::NotDataUri.into()),
        },
    );
    assert_eq!(
        submission.error_message(),
        Some(crate::error::READ_ERROR_MESSAGE)
    );

    let submission = apply(submission, SubmissionEvent::SubmitRequested);
    let version = submission.version();
    let submission = apply(
        submission,
        SubmissionEvent::SubmissionFinished {
            version,
            outcome: Err(ClassifyError::Transport("connection refused".into())),
        },
    );
    assert_eq!(
        submission.error_message(),
        Some("an error occurred during prediction")
    );
}

#[test]
fn stale_completion_after_reset_is_discarded() {
    let submission = submitting_submission();
    let in_flight = submission.version();

    let submission = apply(submission, SubmissionEvent::Reset);
    let (submission, disposition) = transition(
        submission,
        SubmissionEvent::SubmissionFinished {
            version: in_flight,
            outcome: Ok(salmon_classification()),
        },
    );
    assert!(matches!(
        disposition,
        Disposition::Ignored(IgnoreReason::Stale { .. })
    ));
    assert_eq!(submission.status(), SubmissionStatus::Empty);
    assert!(submission.predictions().is_none());
}

#[test]
fn stale_completion_after_new_file_is_discarded() {
    let submission = submitting_submission();
    let in_flight = submission.version();

    let submission = apply(submission, SubmissionEvent::FileSelected(fish_png()));
    let (submission, disposition) = transition(
        submission,
        SubmissionEvent::SubmissionFinished {
            version: in_flight,
            outcome: Err(ClassifyError::Application("late".into())),
        },
    );
    assert!(!disposition.is_applied());
    assert_eq!(submission.status(), SubmissionStatus::Validating);
    assert!(submission.error_message().is_none());
}

#[test]
fn stale_validation_result_is_discarded() {
    let submission = apply(Submission::default(), SubmissionEvent::FileSelected(fish_png()));
    let first = submission.version();
    let submission = apply(submission, SubmissionEvent::FileSelected(fish_png()));

    let (submission, disposition) = transition(
        submission,
        SubmissionEvent::ValidationFinished {
            version: first,
            outcome: Ok(encode("image/png", b"old")),
        },
    );
    assert!(!disposition.is_applied());
    assert_eq!(submission.status(), SubmissionStatus::Validating);
    assert!(submission.preview().is_none());
}

#[test]
fn reset_is_idempotent() {
    let submission = submitting_submission();
    let once = apply(submission, SubmissionEvent::Reset);
    let twice = apply(once.clone(), SubmissionEvent::Reset);

    assert_eq!(once.view(), twice.view());
    assert_eq!(twice.view(), SubmissionView::default());
    assert_eq!(twice.status(), SubmissionStatus::Empty);
    assert!(twice.source().is_none());
    assert!(twice.preview().is_none());
    assert!(twice.predictions().is_none());
    assert!(twice.error_message().is_none());
}

#[test]
fn view_reflects_submission() {
    let view = submitting_submission().view();
    assert_eq!(view.status, SubmissionStatus::Submitting);
    assert_eq!(view.file_name.as_deref(), Some("fish.png"));
    assert!(view.preview.is_some());
    assert!(!view.can_submit);
}
