//! Ekklesia registration form operator tool.
//!
//! Loads a form definition snapshot, reports its integrity diagnostics and
//! wizard partition, and optionally dry-runs a value set through the wizard.

#![forbid(unsafe_code)]

mod formctl_config;

use std::sync::Arc;

use ekklesia_application::{
    FormValues, RegistrationService, SubmissionOutcome, SubmissionReceipt, SubmissionSink,
    ValidationResult, WizardController, WizardDefinition,
};
use ekklesia_core::{AppError, AppResult};
use ekklesia_domain::IntegrityIssue;
use ekklesia_infrastructure::{
    InMemoryMemberDirectory, InMemorySubmissionSink, JsonLinesSubmissionSink,
    read_form_definition, read_form_values,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::formctl_config::{FormctlConfig, init_tracing};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StepReport {
    key: String,
    title: String,
    field_keys: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DefinitionReport {
    form_key: String,
    steps: Vec<StepReport>,
    integrity_issues: Vec<IntegrityIssue>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
enum DryRunReport {
    Submitted {
        receipt: SubmissionReceipt,
    },
    Invalid {
        step: usize,
        errors: ValidationResult,
    },
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = FormctlConfig::load()?;
    let form = read_form_definition(&config.definition_path).await?;

    let integrity_issues = form.integrity_issues();
    for issue in &integrity_issues {
        warn!(issue = %issue, "form definition integrity issue");
    }

    let definition = WizardDefinition::for_form(config.form_key.as_str(), &form)?;
    let Some(values_path) = config.values_path.as_deref() else {
        return print_json(&definition_report(&definition, integrity_issues));
    };

    let values = read_form_values(values_path).await?;
    let sink: Arc<dyn SubmissionSink> = match &config.submissions_path {
        Some(path) => Arc::new(JsonLinesSubmissionSink::new(path)),
        None => Arc::new(InMemorySubmissionSink::new()),
    };
    let service = RegistrationService::new(sink, Arc::new(InMemoryMemberDirectory::default()));

    let mut controller = service.start(definition);
    apply_values(&mut controller, values);
    let total_steps = controller.total_steps();
    controller.go_to(total_steps);

    let report = match service.submit(&mut controller).await? {
        SubmissionOutcome::Submitted(receipt) => {
            info!(
                submission_id = receipt.submission_id.as_str(),
                "dry run submitted"
            );
            DryRunReport::Submitted { receipt }
        }
        SubmissionOutcome::Invalid { step, errors } => {
            info!(step, error_count = errors.error_count(), "dry run failed validation");
            DryRunReport::Invalid { step, errors }
        }
    };

    print_json(&report)
}

fn apply_values(controller: &mut WizardController, values: FormValues) {
    for (key, value) in values {
        if let Err(error) = controller.set_value(key.as_str(), value) {
            warn!(key = key.as_str(), error = %error, "ignoring value without a matching field");
        }
    }
}

fn definition_report(
    definition: &WizardDefinition,
    integrity_issues: Vec<IntegrityIssue>,
) -> DefinitionReport {
    DefinitionReport {
        form_key: definition.form_key().to_owned(),
        steps: definition
            .steps()
            .iter()
            .map(|step| StepReport {
                key: step.key().to_owned(),
                title: step.title().to_owned(),
                field_keys: step.field_keys().to_vec(),
            })
            .collect(),
        integrity_issues,
    }
}

fn print_json<T: Serialize>(report: &T) -> AppResult<()> {
    let rendered = serde_json::to_string_pretty(report)
        .map_err(|error| AppError::Internal(format!("failed to render report: {error}")))?;
    println!("{rendered}");
    Ok(())
}
