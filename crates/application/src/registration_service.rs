use std::sync::Arc;

use ekklesia_core::AppResult;
use tracing::info;

use crate::registration_ports::{
    MemberDirectory, MemberPage, MemberPageQuery, SubmissionReceipt, SubmissionSink,
};
use crate::wizard::{PreparedSubmission, ValidationResult, WizardController, WizardDefinition};

/// Result of a submit request.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// The sink accepted the payload.
    Submitted(SubmissionReceipt),
    /// Validation failed; nothing was sent.
    Invalid {
        /// First failing step (1-based).
        step: usize,
        /// Errors across every failing step.
        errors: ValidationResult,
    },
}

/// Application service wiring wizard sessions to their outbound ports.
#[derive(Clone)]
pub struct RegistrationService {
    submission_sink: Arc<dyn SubmissionSink>,
    member_directory: Arc<dyn MemberDirectory>,
}

impl RegistrationService {
    /// Creates a new registration service from port implementations.
    #[must_use]
    pub fn new(
        submission_sink: Arc<dyn SubmissionSink>,
        member_directory: Arc<dyn MemberDirectory>,
    ) -> Self {
        Self {
            submission_sink,
            member_directory,
        }
    }

    /// Starts a wizard session.
    #[must_use]
    pub fn start(&self, definition: WizardDefinition) -> WizardController {
        WizardController::new(definition)
    }

    /// Validates every step and hands the payload to the submission sink.
    ///
    /// Sink failures are recorded on the session and returned unchanged.
    pub async fn submit(&self, controller: &mut WizardController) -> AppResult<SubmissionOutcome> {
        let payload = match controller.prepare_submission()? {
            PreparedSubmission::Ready(payload) => payload,
            PreparedSubmission::Invalid { step, errors } => {
                return Ok(SubmissionOutcome::Invalid { step, errors });
            }
        };

        let form_key = payload.form_key.clone();
        let field_count = payload.values.len();
        let result = self.submission_sink.submit(payload).await;
        controller.finish_submission(&result);

        let receipt = result?;
        info!(
            form_key = form_key.as_str(),
            submission_id = receipt.submission_id.as_str(),
            field_count,
            "registration submitted"
        );
        Ok(SubmissionOutcome::Submitted(receipt))
    }

    /// Lists members selectable in committee rows.
    pub async fn member_options(&self, query: MemberPageQuery) -> AppResult<MemberPage> {
        self.member_directory.list_members(query).await
    }
}
