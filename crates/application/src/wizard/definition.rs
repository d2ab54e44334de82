use std::collections::HashSet;

use super::*;

/// One wizard page owning a fixed set of field and group keys.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardStep {
    key: NonEmptyString,
    title: String,
    field_keys: Vec<String>,
}

impl WizardStep {
    /// Creates a step owning the given keys in render order.
    pub fn new<I, S>(
        key: impl Into<String>,
        title: impl Into<String>,
        field_keys: I,
    ) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            key: NonEmptyString::new(key)?,
            title: title.into(),
            field_keys: field_keys.into_iter().map(Into::into).collect(),
        })
    }

    /// Appends every custom field of a form definition, in render order.
    #[must_use]
    pub fn with_form_fields(mut self, form: &FormDefinition) -> Self {
        for group in form.render_plan() {
            for field in group.fields {
                if !self.field_keys.iter().any(|key| key == field.id()) {
                    self.field_keys.push(field.id().to_owned());
                }
            }
        }
        self
    }

    /// Returns the step key.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Returns the step title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Returns owned keys in render order.
    #[must_use]
    pub fn field_keys(&self) -> &[String] {
        &self.field_keys
    }

    /// Returns whether the step owns a key.
    #[must_use]
    pub fn owns(&self, key: &str) -> bool {
        self.field_keys.iter().any(|owned| owned == key)
    }
}

/// Repeatable collection of rows nested under one logical key.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatableGroup {
    key: NonEmptyString,
    label: String,
    row_fields: Vec<CustomField>,
    min_rows: usize,
    max_rows: Option<usize>,
}

impl RepeatableGroup {
    /// Creates a group whose rows carry the given fields.
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        row_fields: Vec<CustomField>,
    ) -> AppResult<Self> {
        let key = NonEmptyString::new(key)?;
        if row_fields.is_empty() {
            return Err(AppError::Validation(format!(
                "repeatable group '{}' must declare at least one row field",
                key.as_str()
            )));
        }

        let mut seen = HashSet::new();
        for field in &row_fields {
            if !seen.insert(field.id()) {
                return Err(AppError::Validation(format!(
                    "duplicate row field '{}' in repeatable group '{}'",
                    field.id(),
                    key.as_str()
                )));
            }
        }

        Ok(Self {
            key,
            label: label.into(),
            row_fields,
            min_rows: 0,
            max_rows: None,
        })
    }

    /// Requires at least `min_rows` rows before the step can pass.
    #[must_use]
    pub fn with_min_rows(mut self, min_rows: usize) -> Self {
        self.min_rows = min_rows;
        self
    }

    /// Caps the number of rows.
    #[must_use]
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    /// Returns the group key.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Returns the group label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Returns the fields every row carries.
    #[must_use]
    pub fn row_fields(&self) -> &[CustomField] {
        &self.row_fields
    }

    /// Finds a row field by id.
    #[must_use]
    pub fn row_field(&self, field_id: &str) -> Option<&CustomField> {
        self.row_fields.iter().find(|field| field.id() == field_id)
    }

    /// Returns the minimum row count.
    #[must_use]
    pub fn min_rows(&self) -> usize {
        self.min_rows
    }

    /// Returns the maximum row count.
    #[must_use]
    pub fn max_rows(&self) -> Option<usize> {
        self.max_rows
    }
}

/// Fixed step partition plus every field and group the steps refer to.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardDefinition {
    form_key: NonEmptyString,
    steps: Vec<WizardStep>,
    fields: Vec<CustomField>,
    groups: Vec<RepeatableGroup>,
}

impl WizardDefinition {
    /// Creates a validated wizard definition.
    ///
    /// Every field and group must be owned by exactly one step.
    pub fn new(
        form_key: impl Into<String>,
        steps: Vec<WizardStep>,
        fields: Vec<CustomField>,
        groups: Vec<RepeatableGroup>,
    ) -> AppResult<Self> {
        if steps.is_empty() {
            return Err(AppError::Validation(
                "wizards must include at least one step".to_owned(),
            ));
        }

        let mut step_keys = HashSet::new();
        for step in &steps {
            if !step_keys.insert(step.key()) {
                return Err(AppError::Validation(format!(
                    "duplicate wizard step '{}'",
                    step.key()
                )));
            }
        }

        let mut known_keys = HashSet::new();
        for key in fields
            .iter()
            .map(CustomField::id)
            .chain(groups.iter().map(RepeatableGroup::key))
        {
            if !known_keys.insert(key) {
                return Err(AppError::Validation(format!(
                    "duplicate wizard field or group key '{key}'"
                )));
            }
        }

        let mut owned_keys = HashSet::new();
        for step in &steps {
            for key in step.field_keys() {
                if !known_keys.contains(key.as_str()) {
                    return Err(AppError::Validation(format!(
                        "step '{}' owns unknown key '{key}'",
                        step.key()
                    )));
                }
                if !owned_keys.insert(key.as_str()) {
                    return Err(AppError::Validation(format!(
                        "key '{key}' is owned by more than one step"
                    )));
                }
            }
        }

        if let Some(orphan) = fields
            .iter()
            .map(CustomField::id)
            .chain(groups.iter().map(RepeatableGroup::key))
            .find(|key| !owned_keys.contains(key))
        {
            return Err(AppError::Validation(format!(
                "field or group '{orphan}' is not owned by any step"
            )));
        }

        Ok(Self {
            form_key: NonEmptyString::new(form_key)?,
            steps,
            fields,
            groups,
        })
    }

    /// Derives the step partition for a dynamic registration form.
    ///
    /// Single-page forms get one step; multi-section forms get one step per
    /// section plus a trailing step for ungrouped fields. Repeated field and
    /// section ids keep their first occurrence. Step keys that would collide
    /// or are blank get a numeric suffix instead.
    pub fn for_form(form_key: impl Into<String>, form: &FormDefinition) -> AppResult<Self> {
        let mut seen_fields = HashSet::new();
        let mut seen_sections = HashSet::new();
        let mut step_keys = HashSet::new();
        let mut fields = Vec::new();
        let mut steps: Vec<WizardStep> = Vec::new();

        for group in form.render_plan() {
            if let Some(section) = group.section
                && !seen_sections.insert(section.id())
            {
                debug!(
                    section_id = section.id(),
                    "skipping repeated section id in form definition"
                );
                continue;
            }

            let mut keys = Vec::new();
            for field in group.fields {
                if !seen_fields.insert(field.id()) {
                    debug!(
                        field_id = field.id(),
                        "skipping repeated field id in form definition"
                    );
                    continue;
                }
                keys.push(field.id().to_owned());
                fields.push(field.clone());
            }

            match form.form_layout() {
                FormLayout::SinglePage => match steps.first_mut() {
                    Some(step) => step.field_keys.extend(keys),
                    None => {
                        let key = unique_step_key("form", &mut step_keys);
                        steps.push(WizardStep::new(key, "Registration", keys)?);
                    }
                },
                FormLayout::MultiSection => {
                    let (base, title) = match group.section {
                        Some(section) => (section.id(), section.title()),
                        None => ("ungrouped", "Additional details"),
                    };
                    let key = unique_step_key(base, &mut step_keys);
                    steps.push(WizardStep::new(key, title, keys)?);
                }
            }
        }

        if steps.is_empty() {
            steps.push(WizardStep::new("form", "Registration", Vec::<String>::new())?);
        }

        Self::new(form_key, steps, fields, Vec::new())
    }

    /// Returns the form key stamped on submissions.
    #[must_use]
    pub fn form_key(&self) -> &str {
        self.form_key.as_str()
    }

    /// Returns steps in order.
    #[must_use]
    pub fn steps(&self) -> &[WizardStep] {
        &self.steps
    }

    /// Returns a step by 1-based number.
    #[must_use]
    pub fn step(&self, number: usize) -> Option<&WizardStep> {
        number.checked_sub(1).and_then(|index| self.steps.get(index))
    }

    /// Returns the 1-based number of the step owning a key.
    #[must_use]
    pub fn step_owning(&self, key: &str) -> Option<usize> {
        self.steps
            .iter()
            .position(|step| step.owns(key))
            .map(|index| index + 1)
    }

    /// Returns every top-level field.
    #[must_use]
    pub fn fields(&self) -> &[CustomField] {
        &self.fields
    }

    /// Finds a top-level field by key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&CustomField> {
        self.fields.iter().find(|field| field.id() == key)
    }

    /// Returns every repeatable group.
    #[must_use]
    pub fn groups(&self) -> &[RepeatableGroup] {
        &self.groups
    }

    /// Finds a repeatable group by key.
    #[must_use]
    pub fn group(&self, key: &str) -> Option<&RepeatableGroup> {
        self.groups.iter().find(|group| group.key() == key)
    }
}

/// Reserves a step key derived from `base`, suffixing it until it is unused.
fn unique_step_key(base: &str, taken: &mut HashSet<String>) -> String {
    let base = match base.trim() {
        "" => "section",
        trimmed => trimmed,
    };

    let mut candidate = base.to_owned();
    let mut suffix = 2_usize;
    while taken.contains(&candidate) {
        candidate = format!("{base}_{suffix}");
        suffix += 1;
    }

    taken.insert(candidate.clone());
    candidate
}
