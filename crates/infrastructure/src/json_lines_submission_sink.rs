use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ekklesia_application::{FormValues, SubmissionPayload, SubmissionReceipt, SubmissionSink};
use ekklesia_core::{AppError, AppResult};
use serde::Serialize;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionLine<'a> {
    submission_id: &'a str,
    form_key: &'a str,
    submitted_at: DateTime<Utc>,
    values: &'a FormValues,
}

/// Submission sink appending one JSON document per line to a file.
#[derive(Debug)]
pub struct JsonLinesSubmissionSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesSubmissionSink {
    /// Creates a sink writing to `path`; the file is created on first submit.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the output file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SubmissionSink for JsonLinesSubmissionSink {
    async fn submit(&self, payload: SubmissionPayload) -> AppResult<SubmissionReceipt> {
        let receipt = SubmissionReceipt {
            submission_id: Uuid::new_v4().to_string(),
            form_key: payload.form_key.clone(),
            submitted_at: Utc::now(),
        };

        let mut line = serde_json::to_vec(&SubmissionLine {
            submission_id: receipt.submission_id.as_str(),
            form_key: receipt.form_key.as_str(),
            submitted_at: receipt.submitted_at,
            values: &payload.values,
        })
        .map_err(|error| {
            AppError::Internal(format!("failed to encode submission record: {error}"))
        })?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to open submission log '{}': {error}",
                    self.path.display()
                ))
            })?;
        file.write_all(&line).await.map_err(|error| {
            AppError::Internal(format!(
                "failed to append to submission log '{}': {error}",
                self.path.display()
            ))
        })?;
        file.flush().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to flush submission log '{}': {error}",
                self.path.display()
            ))
        })?;

        info!(
            submission_id = receipt.submission_id.as_str(),
            path = %self.path.display(),
            "appended registration submission"
        );
        Ok(receipt)
    }
}
