use std::sync::Arc;

use chrono::Utc;
use shared::protocol::ServiceInfo;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    encoder,
    error::ClassifyError,
    interpreter::{self, Classification},
    service::{fetch_service_info, ClassifierService},
    source::SourceFile,
    submission::{
        transition, Disposition, IgnoreReason, Submission, SubmissionEvent, SubmissionStatus,
        SubmissionVersion, SubmissionView,
    },
    validator::{validate, Validation},
};

const VIEW_CHANNEL_CAPACITY: usize = 64;

/// Drives the one live [`Submission`] through file reads and service calls.
///
/// The lock is only held while a transition runs, never across an await on
/// I/O, so a new file can be picked or the session reset while a request is
/// in flight; the late response is then dropped by version.
pub struct ClassifierSession {
    service: Arc<dyn ClassifierService>,
    submission: Mutex<Submission>,
    views: broadcast::Sender<SubmissionView>,
}

impl ClassifierSession {
    pub fn new(service: Arc<dyn ClassifierService>) -> Arc<Self> {
        let (views, _) = broadcast::channel(VIEW_CHANNEL_CAPACITY);
        Arc::new(Self {
            service,
            submission: Mutex::new(Submission::default()),
            views,
        })
    }

    /// Every applied transition publishes the resulting view.
    pub fn subscribe(&self) -> broadcast::Receiver<SubmissionView> {
        self.views.subscribe()
    }

    pub async fn snapshot(&self) -> SubmissionView {
        self.submission.lock().await.view()
    }

    pub async fn status(&self) -> SubmissionStatus {
        self.submission.lock().await.status()
    }

    /// Informational only; never touches the submission.
    pub async fn service_info(&self) -> Option<ServiceInfo> {
        fetch_service_info(self.service.as_ref()).await
    }

    pub async fn select_file(&self, file: SourceFile) -> SubmissionView {
        let descriptor = file.descriptor();
        let (_, version) = self
            .apply(SubmissionEvent::FileSelected(file.clone()))
            .await;
        info!(
            %version,
            file = %file.name,
            mime_type = %descriptor.mime_type,
            size_bytes = descriptor.size_bytes,
            "submission: file selected"
        );

        let outcome = match validate(&descriptor) {
            Validation::Rejected(err) => {
                info!(%version, reason = %err, "submission: file rejected");
                Err(ClassifyError::from(err))
            }
            Validation::Accepted => encoder::encode_source(&file).await.map_err(|err| {
                warn!(%version, error = %err, "submission: preview read failed");
                ClassifyError::from(err)
            }),
        };

        self.apply(SubmissionEvent::ValidationFinished { version, outcome })
            .await;
        self.snapshot().await
    }

    pub async fn submit(&self) -> SubmissionView {
        let started = self
            .apply_then(SubmissionEvent::SubmitRequested, |disposition, submission| {
                if !disposition.is_applied() || submission.status() != SubmissionStatus::Submitting
                {
                    return None;
                }
                submission
                    .source()
                    .map(|source| (submission.version(), source.clone()))
            })
            .await;

        let Some((version, source)) = started else {
            return self.snapshot().await;
        };

        info!(%version, file = %source.name, "submission: classifying");
        let outcome = self.classify_source(&source).await;
        match &outcome {
            Ok(classification) => info!(
                %version,
                species = %classification.top().species,
                confidence = classification.top().confidence,
                "submission: classified"
            ),
            Err(err) => warn!(%version, error = %err, "submission: classification failed"),
        }

        self.apply(SubmissionEvent::SubmissionFinished { version, outcome })
            .await;
        self.snapshot().await
    }

    pub async fn reset(&self) -> SubmissionView {
        let (_, version) = self.apply(SubmissionEvent::Reset).await;
        debug!(%version, "submission: reset");
        self.snapshot().await
    }

    async fn classify_source(&self, source: &SourceFile) -> Result<Classification, ClassifyError> {
        let payload = encoder::encode_source(source).await?;
        let response = self.service.classify(&payload, Utc::now()).await?;
        interpreter::interpret(response)
    }

    async fn apply(&self, event: SubmissionEvent) -> (Disposition, SubmissionVersion) {
        self.apply_then(event, |disposition, submission| {
            (disposition, submission.version())
        })
        .await
    }

    /// Runs one transition under the lock, publishes the new view and lets
    /// `inspect` read the result before anyone else can change it.
    async fn apply_then<R>(
        &self,
        event: SubmissionEvent,
        inspect: impl FnOnce(Disposition, &Submission) -> R,
    ) -> R {
        let event_name = event.name();
        let mut guard = self.submission.lock().await;
        let (next, disposition) = transition(std::mem::take(&mut *guard), event);
        *guard = next;

        match disposition {
            Disposition::Applied => {
                let _ = self.views.send(guard.view());
            }
            Disposition::Ignored(IgnoreReason::Stale { current, received }) => {
                debug!(
                    event = event_name,
                    %current,
                    %received,
                    "submission: discarding stale completion"
                );
            }
            Disposition::Ignored(reason) => {
                debug!(event = event_name, ?reason, "submission: event ignored");
            }
        }

        inspect(disposition, &guard)
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
