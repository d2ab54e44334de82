use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ekklesia_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::value_coercion::FormValues;

/// Largest page the member lookup serves in one call.
pub const MAX_MEMBER_PAGE_SIZE: usize = 100;

/// Complete value set emitted by a finished wizard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    /// Form the values were collected for.
    pub form_key: String,
    /// Flat value mapping keyed by field id or predefined key.
    pub values: FormValues,
}

/// Acknowledgement returned by a submission sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    /// Identifier assigned by the sink.
    pub submission_id: String,
    /// Form the submission belongs to.
    pub form_key: String,
    /// Acceptance timestamp.
    pub submitted_at: DateTime<Utc>,
}

/// Port for persisting completed registrations.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    /// Persists one payload; rejections are returned unchanged to the caller.
    async fn submit(&self, payload: SubmissionPayload) -> AppResult<SubmissionReceipt>;
}

/// Selectable entity offered to committee rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberOption {
    /// Stable member or unit id.
    pub id: String,
    /// Name shown in the picker.
    pub display_name: String,
}

/// Page request for the member lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPageQuery {
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
    /// Optional case-insensitive name filter.
    pub search: Option<String>,
}

impl MemberPageQuery {
    /// Creates a validated page request.
    pub fn new(limit: usize, offset: usize, search: Option<String>) -> AppResult<Self> {
        if limit == 0 || limit > MAX_MEMBER_PAGE_SIZE {
            return Err(AppError::Validation(format!(
                "member page limit must be between 1 and {MAX_MEMBER_PAGE_SIZE}"
            )));
        }

        Ok(Self {
            limit,
            offset,
            search: search.and_then(|value| {
                let trimmed = value.trim().to_owned();
                (!trimmed.is_empty()).then_some(trimmed)
            }),
        })
    }
}

/// One page of selectable members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberPage {
    /// Rows on this page.
    pub items: Vec<MemberOption>,
    /// Total rows matching the query.
    pub total: usize,
}

/// Read-only lookup for members and units referenced by committee rows.
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// Lists one page of members.
    async fn list_members(&self, query: MemberPageQuery) -> AppResult<MemberPage>;
}
