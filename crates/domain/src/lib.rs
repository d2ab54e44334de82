//! Registration-form schema: field catalog, fields, sections, and conditional logic.

#![forbid(unsafe_code)]

mod conditional;
mod field;
mod field_catalog;
mod form;
mod section;

pub use conditional::{
    ConditionalAction, ConditionalLogic, ConditionalOperator, ConditionalRule, LogicType,
};
pub use field::{CustomField, FieldValidation, create_default_field, generate_field_id};
pub use field_catalog::{
    DEFAULT_OPTIONS, DefaultValidation, FieldType, FieldTypeConfig, display_label_or,
    field_type_config_by_name, get_field_type_config,
};
pub use form::{FormDefinition, FormLayout, IntegrityIssue, MoveDirection, SectionGroup};
pub use section::{FormSection, create_default_section};
