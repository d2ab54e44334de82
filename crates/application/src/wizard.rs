//! Multi-step registration wizard.
//!
//! The controller owns the live value set for one session. Steps own a fixed
//! set of field keys; within a step, conditional logic may hide fields, and
//! hidden fields are neither validated nor submitted.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use ekklesia_core::{AppError, AppResult, NonEmptyString};
use ekklesia_domain::{CustomField, FormDefinition, FormLayout};
use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::registration_ports::{SubmissionPayload, SubmissionReceipt};
use crate::rule_check::FieldError;
use crate::rule_compiler::{RuleSet, compile};
use crate::value_coercion::{FormValues, coerce_to_number, is_blank, number_to_value};
use crate::visibility::evaluate;

mod definition;
mod rows;
mod submission;
mod validation;

pub use definition::{RepeatableGroup, WizardDefinition, WizardStep};
pub use rows::{RepeatableRow, RowId};
pub use submission::{PreparedSubmission, SubmissionStatus};
pub use validation::{FieldPath, ValidationResult};

/// Result of a navigation request.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The wizard moved between steps (1-based).
    Moved {
        /// Step before the move.
        from: usize,
        /// Step after the move.
        to: usize,
    },
    /// Validation failed; the wizard stayed on the current step.
    Blocked(ValidationResult),
    /// Nothing to do (edge step or out-of-range target).
    Unchanged,
}

impl StepOutcome {
    /// Returns whether the current step changed.
    #[must_use]
    pub fn moved(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

/// Session state for one run through a registration wizard.
#[derive(Debug, Clone)]
pub struct WizardController {
    definition: WizardDefinition,
    current_step: usize,
    values: FormValues,
    rows: BTreeMap<String, Vec<RepeatableRow>>,
    errors: ValidationResult,
    submission: SubmissionStatus,
}

impl WizardController {
    /// Starts a session on the first step with no values.
    #[must_use]
    pub fn new(definition: WizardDefinition) -> Self {
        let rows = definition
            .groups()
            .iter()
            .map(|group| (group.key().to_owned(), Vec::new()))
            .collect();

        Self {
            definition,
            current_step: 1,
            values: FormValues::new(),
            rows,
            errors: ValidationResult::default(),
            submission: SubmissionStatus::Idle,
        }
    }

    /// Returns the session's wizard definition.
    #[must_use]
    pub fn definition(&self) -> &WizardDefinition {
        &self.definition
    }

    /// Returns the current step number (1-based).
    #[must_use]
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.definition.steps().len()
    }

    /// Returns `(current, total)` for progress indicators.
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        (self.current_step, self.total_steps())
    }

    /// Returns whether the wizard is on its final step.
    #[must_use]
    pub fn is_last_step(&self) -> bool {
        self.current_step == self.total_steps()
    }

    /// Returns the current step's declaration.
    #[must_use]
    pub fn current_step_definition(&self) -> Option<&WizardStep> {
        self.definition.step(self.current_step)
    }

    /// Returns the live top-level values.
    #[must_use]
    pub fn values(&self) -> &FormValues {
        &self.values
    }

    /// Returns one live top-level value.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Records a value for a top-level field.
    pub fn set_value(&mut self, key: &str, value: Value) -> AppResult<()> {
        if self.definition.field(key).is_none() {
            return Err(AppError::NotFound(format!("wizard field '{key}'")));
        }

        self.values.insert(key.to_owned(), value);
        Ok(())
    }

    /// Removes a top-level value.
    pub fn clear_value(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Returns errors surfaced by the latest validations.
    #[must_use]
    pub fn errors(&self) -> &ValidationResult {
        &self.errors
    }

    /// Returns the compiled rules for a top-level field.
    #[must_use]
    pub fn rules_for(&self, key: &str) -> Option<RuleSet> {
        self.definition.field(key).map(compile)
    }

    /// Returns whether a top-level field currently renders.
    #[must_use]
    pub fn is_visible(&self, field: &CustomField) -> bool {
        evaluate(field, &self.values, self.definition.fields())
    }

    /// Returns the current step's visible top-level fields in step order.
    #[must_use]
    pub fn visible_fields(&self) -> Vec<&CustomField> {
        let Some(step) = self.current_step_definition() else {
            return Vec::new();
        };

        step.field_keys()
            .iter()
            .filter_map(|key| self.definition.field(key))
            .filter(|field| self.is_visible(field))
            .collect()
    }

    /// Validates the current step and advances on success.
    ///
    /// On the final step this does nothing; use submission instead.
    pub fn next(&mut self) -> StepOutcome {
        if self.is_last_step() {
            return StepOutcome::Unchanged;
        }

        let result = self.validate_step(self.current_step);
        self.replace_step_errors(self.current_step, &result);
        if !result.is_valid() {
            debug!(
                step = self.current_step,
                error_count = result.error_count(),
                "wizard step blocked by validation"
            );
            return StepOutcome::Blocked(result);
        }

        self.move_to(self.current_step + 1)
    }

    /// Returns to the previous step without validating.
    pub fn previous(&mut self) -> StepOutcome {
        if self.current_step <= 1 {
            return StepOutcome::Unchanged;
        }

        self.move_to(self.current_step - 1)
    }

    /// Jumps to any step without validating intermediate steps.
    pub fn go_to(&mut self, step: usize) -> StepOutcome {
        if step == 0 || step > self.total_steps() || step == self.current_step {
            return StepOutcome::Unchanged;
        }

        self.move_to(step)
    }

    fn move_to(&mut self, step: usize) -> StepOutcome {
        let from = self.current_step;
        self.current_step = step;
        debug!(from, to = step, "wizard step changed");
        StepOutcome::Moved { from, to: step }
    }
}
