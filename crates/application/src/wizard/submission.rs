use ekklesia_domain::FieldType;

use super::*;

/// Lifecycle of the wizard's single submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SubmissionStatus {
    /// Nothing sent yet.
    #[default]
    Idle,
    /// A payload was handed out and its outcome is not recorded yet.
    Pending,
    /// The sink accepted the payload.
    Submitted(SubmissionReceipt),
    /// The sink rejected the payload; the message is the sink's error.
    Failed(String),
}

impl SubmissionStatus {
    /// Returns whether another submission may start.
    #[must_use]
    pub fn accepts_submission(&self) -> bool {
        matches!(self, Self::Idle | Self::Failed(_))
    }
}

/// Result of preparing the final payload.
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedSubmission {
    /// Every step passed; the payload is ready for the sink.
    Ready(SubmissionPayload),
    /// At least one step failed validation.
    Invalid {
        /// First failing step (1-based).
        step: usize,
        /// Errors across every failing step.
        errors: ValidationResult,
    },
}

impl WizardController {
    /// Returns the submission lifecycle state.
    #[must_use]
    pub fn submission_status(&self) -> &SubmissionStatus {
        &self.submission
    }

    /// Validates every step and assembles the outgoing payload.
    ///
    /// Only callable from the final step. On success the session becomes
    /// [`SubmissionStatus::Pending`] until [`WizardController::finish_submission`]
    /// records the sink's answer.
    pub fn prepare_submission(&mut self) -> AppResult<PreparedSubmission> {
        if !self.is_last_step() {
            return Err(AppError::Conflict(format!(
                "submission is only available on step {} of {}",
                self.total_steps(),
                self.total_steps()
            )));
        }
        match &self.submission {
            SubmissionStatus::Pending => {
                return Err(AppError::Conflict(
                    "a submission is already in flight".to_owned(),
                ));
            }
            SubmissionStatus::Submitted(receipt) => {
                return Err(AppError::Conflict(format!(
                    "form was already submitted as '{}'",
                    receipt.submission_id
                )));
            }
            SubmissionStatus::Idle | SubmissionStatus::Failed(_) => {}
        }

        let mut first_invalid = None;
        let mut errors = ValidationResult::default();
        for step in 1..=self.total_steps() {
            let result = self.validate_step(step);
            self.replace_step_errors(step, &result);
            if !result.is_valid() {
                first_invalid.get_or_insert(step);
                errors.merge(result);
            }
        }

        if let Some(step) = first_invalid {
            debug!(
                step,
                error_count = errors.error_count(),
                "submission blocked by validation"
            );
            return Ok(PreparedSubmission::Invalid { step, errors });
        }

        let payload = SubmissionPayload {
            form_key: self.definition.form_key().to_owned(),
            values: self.collect_payload_values(),
        };
        self.submission = SubmissionStatus::Pending;
        Ok(PreparedSubmission::Ready(payload))
    }

    /// Records the sink's answer for the pending submission.
    pub fn finish_submission(&mut self, outcome: &AppResult<SubmissionReceipt>) {
        self.submission = match outcome {
            Ok(receipt) => {
                debug!(submission_id = receipt.submission_id.as_str(), "submission accepted");
                SubmissionStatus::Submitted(receipt.clone())
            }
            Err(error) => {
                debug!(error = %error, "submission rejected");
                SubmissionStatus::Failed(error.to_string())
            }
        };
    }

    fn collect_payload_values(&self) -> FormValues {
        let mut values = FormValues::new();

        for step in self.definition.steps() {
            for key in step.field_keys() {
                if let Some(field) = self.definition.field(key) {
                    if !self.is_visible(field) {
                        continue;
                    }
                    if let Some(value) = outgoing_value(field, self.values.get(key.as_str())) {
                        values.insert(key.clone(), value);
                    }
                } else if let Some(group) = self.definition.group(key) {
                    values.insert(key.clone(), self.collect_group_rows(group));
                }
            }
        }

        values
    }

    fn collect_group_rows(&self, group: &RepeatableGroup) -> Value {
        let rows = self
            .rows(group.key())
            .iter()
            .map(|row| {
                let mut object = FormValues::new();
                for field in group.row_fields() {
                    if !evaluate(field, row.values(), group.row_fields()) {
                        continue;
                    }
                    if let Some(value) = outgoing_value(field, row.value(field.id())) {
                        object.insert(field.id().to_owned(), value);
                    }
                }
                Value::Object(object)
            })
            .collect();

        Value::Array(rows)
    }
}

/// Normalizes one live value for the payload; `None` drops the key.
fn outgoing_value(field: &CustomField, value: Option<&Value>) -> Option<Value> {
    let value = value?;
    if value.is_null() {
        return None;
    }

    match field.field_type() {
        FieldType::Number | FieldType::Rating => match value {
            Value::String(text) if text.trim().is_empty() => None,
            Value::String(_) => {
                let number = coerce_to_number(Some(value));
                if number.is_nan() {
                    Some(value.clone())
                } else {
                    number_to_value(number).or_else(|| Some(value.clone()))
                }
            }
            _ => Some(value.clone()),
        },
        FieldType::Date | FieldType::Time if is_blank(Some(value)) => None,
        _ => Some(value.clone()),
    }
}
