use async_trait::async_trait;
use chrono::Utc;
use ekklesia_application::{SubmissionPayload, SubmissionReceipt, SubmissionSink};
use ekklesia_core::AppResult;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// In-memory submission sink that keeps every accepted payload.
#[derive(Debug, Default)]
pub struct InMemorySubmissionSink {
    submissions: RwLock<Vec<(SubmissionReceipt, SubmissionPayload)>>,
}

impl InMemorySubmissionSink {
    /// Creates an empty in-memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns accepted submissions in arrival order.
    pub async fn submissions(&self) -> Vec<(SubmissionReceipt, SubmissionPayload)> {
        self.submissions.read().await.clone()
    }
}

#[async_trait]
impl SubmissionSink for InMemorySubmissionSink {
    async fn submit(&self, payload: SubmissionPayload) -> AppResult<SubmissionReceipt> {
        let receipt = SubmissionReceipt {
            submission_id: Uuid::new_v4().to_string(),
            form_key: payload.form_key.clone(),
            submitted_at: Utc::now(),
        };

        let mut submissions = self.submissions.write().await;
        submissions.push((receipt.clone(), payload));
        info!(
            submission_id = receipt.submission_id.as_str(),
            stored = submissions.len(),
            "stored registration submission in memory"
        );

        Ok(receipt)
    }
}
