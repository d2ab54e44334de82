use crate::rule_compiler::RuleKind;

use super::*;

/// Location of a validation error inside the wizard's value set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldPath {
    /// Top-level field key.
    Field(String),
    /// Repeatable group as a whole (row-count constraints).
    Group(String),
    /// One field of one repeatable row.
    Row {
        /// Group key.
        group: String,
        /// Row id.
        row: RowId,
        /// Row field id.
        field: String,
    },
}

impl FieldPath {
    /// Returns the top-level key (field or group) the path lives under.
    #[must_use]
    pub fn root_key(&self) -> &str {
        match self {
            Self::Field(key) | Self::Group(key) => key.as_str(),
            Self::Row { group, .. } => group.as_str(),
        }
    }
}

impl Display for FieldPath {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Field(key) | Self::Group(key) => formatter.write_str(key),
            Self::Row { group, row, field } => write!(formatter, "{group}[{row}].{field}"),
        }
    }
}

impl Serialize for FieldPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Field errors keyed by path; valid when empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationResult {
    errors: BTreeMap<FieldPath, FieldError>,
}

impl ValidationResult {
    /// Returns whether no error was recorded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of failing paths.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Returns every error keyed by path.
    #[must_use]
    pub fn errors(&self) -> &BTreeMap<FieldPath, FieldError> {
        &self.errors
    }

    /// Returns the error recorded for one path.
    #[must_use]
    pub fn error_for(&self, path: &FieldPath) -> Option<&FieldError> {
        self.errors.get(path)
    }

    /// Returns the error recorded for a top-level field.
    #[must_use]
    pub fn field_error(&self, key: &str) -> Option<&FieldError> {
        self.errors.get(&FieldPath::Field(key.to_owned()))
    }

    /// Moves every error of `other` into this result, replacing same-path entries.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }

    fn insert(&mut self, path: FieldPath, error: FieldError) {
        self.errors.insert(path, error);
    }

    pub(super) fn remove_row(&mut self, group_key: &str, row_id: RowId) {
        self.errors.retain(|path, _| match path {
            FieldPath::Row { group, row, .. } => group != group_key || *row != row_id,
            FieldPath::Field(_) | FieldPath::Group(_) => true,
        });
    }

    fn remove_group(&mut self, group_key: &str) {
        self.errors.remove(&FieldPath::Group(group_key.to_owned()));
    }
}

impl WizardController {
    /// Validates the visible fields and groups a step owns.
    ///
    /// Hidden fields are skipped. Row fields are evaluated against their own
    /// row, so row-level conditional logic may only reference sibling row
    /// fields.
    #[must_use]
    pub fn validate_step(&self, step: usize) -> ValidationResult {
        let mut result = ValidationResult::default();
        let Some(step) = self.definition.step(step) else {
            return result;
        };

        for key in step.field_keys() {
            if let Some(field) = self.definition.field(key) {
                if !self.is_visible(field) {
                    continue;
                }
                if let Some(error) = compile(field).check(self.values.get(key.as_str())) {
                    result.insert(FieldPath::Field(key.clone()), error);
                }
            } else if let Some(group) = self.definition.group(key) {
                self.validate_group(group, &mut result);
            }
        }

        result
    }

    /// Replaces the stored errors of one step with a fresh result.
    pub(super) fn replace_step_errors(&mut self, step: usize, result: &ValidationResult) {
        if let Some(step) = self.definition.step(step) {
            self.errors
                .errors
                .retain(|path, _| !step.owns(path.root_key()));
        }
        self.errors.merge(result.clone());
    }

    /// Drops a stored minimum-rows error once the group has enough rows.
    ///
    /// A group that is still short keeps its error until the next validation.
    pub(super) fn refresh_group_error(&mut self, group_key: &str) {
        let Some(group) = self.definition.group(group_key) else {
            return;
        };
        if self.rows(group_key).len() >= group.min_rows() {
            self.errors.remove_group(group_key);
        }
    }

    fn validate_group(&self, group: &RepeatableGroup, result: &mut ValidationResult) {
        let rows = self.rows(group.key());
        if rows.len() < group.min_rows() {
            let label = match group.label().trim() {
                "" => "This group",
                label => label,
            };
            result.insert(
                FieldPath::Group(group.key().to_owned()),
                FieldError {
                    rule: RuleKind::Required,
                    message: format!("{label} requires at least {} entries", group.min_rows()),
                },
            );
        }

        for row in rows {
            for field in group.row_fields() {
                if !evaluate(field, row.values(), group.row_fields()) {
                    continue;
                }
                if let Some(error) = compile(field).check(row.value(field.id())) {
                    result.insert(
                        FieldPath::Row {
                            group: group.key().to_owned(),
                            row: row.id(),
                            field: field.id().to_owned(),
                        },
                        error,
                    );
                }
            }
        }
    }
}
