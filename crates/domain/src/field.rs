use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conditional::ConditionalLogic;
use crate::field_catalog::{
    DEFAULT_OPTIONS, DefaultValidation, FieldType, FieldTypeConfig, get_field_type_config,
};

/// Declarative constraints configured on a custom field.
///
/// Every member is optional; an absent member means no constraint of that kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    /// Minimum string length in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum string length in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Minimum numeric value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Maximum numeric value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Regular-expression source values must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Message shown when `pattern` does not match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_message: Option<String>,
}

impl FieldValidation {
    /// Returns whether no constraint is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<DefaultValidation> for FieldValidation {
    fn from(value: DefaultValidation) -> Self {
        Self {
            min_length: value.min_length,
            max_length: value.max_length,
            min: value.min,
            max: value.max,
            pattern: value.pattern.map(str::to_owned),
            pattern_message: value.pattern_message.map(str::to_owned),
        }
    }
}

/// Generates a collision-resistant field id.
#[must_use]
pub fn generate_field_id() -> String {
    format!("field_{}", Uuid::new_v4().simple())
}

/// One configurable input in a dynamically defined form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomField {
    id: String,
    label: String,
    #[serde(rename = "type")]
    field_type: FieldType,
    #[serde(default)]
    required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    help_text: Option<String>,
    #[serde(default)]
    order: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    section_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    validation: Option<FieldValidation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    conditional_logic: Option<ConditionalLogic>,
}

impl CustomField {
    /// Creates a bare field with an explicit id.
    ///
    /// Predefined wizard fields use this with their fixed top-level key.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        field_type: FieldType,
        order: i32,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            field_type,
            required: false,
            options: Vec::new(),
            placeholder: None,
            help_text: None,
            order,
            section_id: None,
            validation: None,
            conditional_logic: None,
        }
    }

    /// Marks the field required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the options list.
    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the validation constraints.
    #[must_use]
    pub fn with_validation(mut self, validation: FieldValidation) -> Self {
        self.validation = Some(validation);
        self
    }

    /// Sets the conditional visibility logic.
    #[must_use]
    pub fn with_conditional_logic(mut self, logic: ConditionalLogic) -> Self {
        self.conditional_logic = Some(logic);
        self
    }

    /// Places the field in a section.
    #[must_use]
    pub fn in_section(mut self, section_id: impl Into<String>) -> Self {
        self.section_id = Some(section_id.into());
        self
    }

    /// Returns the stable field id.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Returns the field type.
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Returns whether a value is mandatory.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the ordered options list.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Returns the placeholder text.
    #[must_use]
    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    /// Returns the help text.
    #[must_use]
    pub fn help_text(&self) -> Option<&str> {
        self.help_text.as_deref()
    }

    /// Returns the render order within the section.
    #[must_use]
    pub fn order(&self) -> i32 {
        self.order
    }

    /// Returns the owning section id.
    #[must_use]
    pub fn section_id(&self) -> Option<&str> {
        self.section_id.as_deref()
    }

    /// Returns the validation constraints.
    #[must_use]
    pub fn validation(&self) -> Option<&FieldValidation> {
        self.validation.as_ref()
    }

    /// Returns the conditional visibility logic.
    #[must_use]
    pub fn conditional_logic(&self) -> Option<&ConditionalLogic> {
        self.conditional_logic.as_ref()
    }

    /// Returns the catalog entry for this field's type.
    #[must_use]
    pub fn type_config(&self) -> Option<&'static FieldTypeConfig> {
        get_field_type_config(self.field_type)
    }

    /// Updates the label.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Updates whether a value is mandatory.
    pub fn set_required(&mut self, required: bool) {
        self.required = required;
    }

    /// Replaces the options list; ignored for types without options.
    pub fn set_options(&mut self, options: Vec<String>) {
        if self.type_config().is_some_and(|config| config.supports_options) {
            self.options = options;
        }
    }

    /// Updates the placeholder; blank values clear it.
    pub fn set_placeholder(&mut self, placeholder: Option<String>) {
        self.placeholder = trimmed_non_empty(placeholder);
    }

    /// Updates the help text; blank values clear it.
    pub fn set_help_text(&mut self, help_text: Option<String>) {
        self.help_text = trimmed_non_empty(help_text);
    }

    /// Updates the render order.
    pub fn set_order(&mut self, order: i32) {
        self.order = order;
    }

    /// Updates the owning section.
    pub fn set_section_id(&mut self, section_id: Option<String>) {
        self.section_id = section_id;
    }

    /// Replaces the validation constraints.
    pub fn set_validation(&mut self, validation: Option<FieldValidation>) {
        self.validation = validation;
    }

    /// Replaces the conditional visibility logic.
    pub fn set_conditional_logic(&mut self, logic: Option<ConditionalLogic>) {
        self.conditional_logic = logic;
    }

    /// Mutable access to the conditional logic, if any.
    pub fn conditional_logic_mut(&mut self) -> Option<&mut ConditionalLogic> {
        self.conditional_logic.as_mut()
    }

    /// Switches the field to another type while keeping its id.
    ///
    /// Options survive only when both types carry options; validation is
    /// reset to the new type's catalog defaults.
    pub fn change_type(&mut self, field_type: FieldType) {
        if self.field_type == field_type {
            return;
        }

        let config = get_field_type_config(field_type);
        let supports_options = config.is_some_and(|config| config.supports_options);
        if !supports_options {
            self.options.clear();
        } else if self.options.is_empty() {
            self.options = default_options();
        }

        self.validation = config.and_then(default_validation_for);
        self.field_type = field_type;
    }
}

/// Creates a new field of the given type with catalog defaults.
#[must_use]
pub fn create_default_field(field_type: FieldType, order: i32) -> CustomField {
    let config = get_field_type_config(field_type);
    let label = config.map(|config| config.label).unwrap_or("Field");

    let mut field = CustomField::new(generate_field_id(), label, field_type, order);
    if config.is_some_and(|config| config.supports_options) {
        field.options = default_options();
    }
    field.validation = config.and_then(default_validation_for);
    field.conditional_logic = Some(ConditionalLogic::disabled());
    field
}

fn default_options() -> Vec<String> {
    DEFAULT_OPTIONS.iter().map(|option| (*option).to_owned()).collect()
}

fn default_validation_for(config: &FieldTypeConfig) -> Option<FieldValidation> {
    if !config.supports_validation {
        return None;
    }

    Some(FieldValidation::from(config.default_validation))
}

fn trimmed_non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim().to_owned();
        (!trimmed.is_empty()).then_some(trimmed)
    })
}
