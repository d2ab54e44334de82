//! Registration wizard services, validation runtime, and ports.

#![forbid(unsafe_code)]

mod registration_ports;
mod registration_service;
mod rule_check;
mod rule_compiler;
mod value_coercion;
mod visibility;
mod wizard;

pub use registration_ports::{
    MAX_MEMBER_PAGE_SIZE, MemberDirectory, MemberOption, MemberPage, MemberPageQuery,
    SubmissionPayload, SubmissionReceipt, SubmissionSink,
};
pub use registration_service::{RegistrationService, SubmissionOutcome};
pub use rule_check::FieldError;
pub use rule_compiler::{EMAIL_PATTERN, Rule, RuleKind, RuleSet, compile};
pub use value_coercion::FormValues;
pub use visibility::{evaluate, visible_fields};
pub use wizard::{
    FieldPath, PreparedSubmission, RepeatableGroup, RepeatableRow, RowId, StepOutcome,
    SubmissionStatus, ValidationResult, WizardController, WizardDefinition, WizardStep,
};
