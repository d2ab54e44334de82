use std::str::FromStr;

use ekklesia_core::AppError;
use serde::{Deserialize, Serialize};

/// Supported custom field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    /// Single-line text input.
    Text,
    /// Multi-line text input.
    Textarea,
    /// Dropdown with one selectable option.
    Select,
    /// Single boolean checkbox.
    Checkbox,
    /// Radio group with one selectable option.
    Radio,
    /// Email address input.
    Email,
    /// Phone number input.
    Phone,
    /// Numeric input.
    Number,
    /// Date-only input.
    Date,
    /// Time-of-day input.
    Time,
    /// Star rating input.
    Rating,
    /// Checkbox group with many selectable options.
    MultiCheckbox,
}

impl FieldType {
    /// Every field type in catalog order.
    pub const ALL: [FieldType; 12] = [
        Self::Text,
        Self::Textarea,
        Self::Select,
        Self::Checkbox,
        Self::Radio,
        Self::Email,
        Self::Phone,
        Self::Number,
        Self::Date,
        Self::Time,
        Self::Rating,
        Self::MultiCheckbox,
    ];

    /// Returns a stable storage value for the field type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Number => "number",
            Self::Date => "date",
            Self::Time => "time",
            Self::Rating => "rating",
            Self::MultiCheckbox => "multi-checkbox",
        }
    }

    /// Returns whether values of this type are numbers once submitted.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Number | Self::Rating)
    }

    /// Returns whether values of this type are calendar or clock values.
    #[must_use]
    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::Time)
    }
}

impl FromStr for FieldType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field_type| field_type.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown field type '{value}'")))
    }
}

/// Default constraints a field type starts with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultValidation {
    /// Default minimum string length.
    pub min_length: Option<usize>,
    /// Default maximum string length.
    pub max_length: Option<usize>,
    /// Default minimum numeric value.
    pub min: Option<f64>,
    /// Default maximum numeric value.
    pub max: Option<f64>,
    /// Default regular-expression source.
    pub pattern: Option<&'static str>,
    /// Default message for pattern violations.
    pub pattern_message: Option<&'static str>,
}

impl DefaultValidation {
    const NONE: Self = Self {
        min_length: None,
        max_length: None,
        min: None,
        max: None,
        pattern: None,
        pattern_message: None,
    };

    /// Returns whether no default constraint is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

/// Catalog entry describing one field type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldTypeConfig {
    /// Field type this entry describes.
    pub field_type: FieldType,
    /// Label shown in the form builder palette.
    pub label: &'static str,
    /// Whether fields of this type carry an options list.
    pub supports_options: bool,
    /// Whether fields of this type accept author validation rules.
    pub supports_validation: bool,
    /// Constraints a new field of this type starts with.
    pub default_validation: DefaultValidation,
}

/// Options a freshly created option-bearing field starts with.
pub const DEFAULT_OPTIONS: [&str; 3] = ["Option 1", "Option 2", "Option 3"];

const FIELD_TYPE_CATALOG: [FieldTypeConfig; 12] = [
    FieldTypeConfig {
        field_type: FieldType::Text,
        label: "Short Text",
        supports_options: false,
        supports_validation: true,
        default_validation: DefaultValidation {
            max_length: Some(255),
            ..DefaultValidation::NONE
        },
    },
    FieldTypeConfig {
        field_type: FieldType::Textarea,
        label: "Long Text",
        supports_options: false,
        supports_validation: true,
        default_validation: DefaultValidation {
            max_length: Some(2000),
            ..DefaultValidation::NONE
        },
    },
    FieldTypeConfig {
        field_type: FieldType::Select,
        label: "Dropdown",
        supports_options: true,
        supports_validation: false,
        default_validation: DefaultValidation::NONE,
    },
    FieldTypeConfig {
        field_type: FieldType::Checkbox,
        label: "Checkbox",
        supports_options: false,
        supports_validation: false,
        default_validation: DefaultValidation::NONE,
    },
    FieldTypeConfig {
        field_type: FieldType::Radio,
        label: "Radio Buttons",
        supports_options: true,
        supports_validation: false,
        default_validation: DefaultValidation::NONE,
    },
    FieldTypeConfig {
        field_type: FieldType::Email,
        label: "Email",
        supports_options: false,
        supports_validation: true,
        default_validation: DefaultValidation::NONE,
    },
    FieldTypeConfig {
        field_type: FieldType::Phone,
        label: "Phone Number",
        supports_options: false,
        supports_validation: true,
        default_validation: DefaultValidation {
            pattern: Some(r"^[0-9+()\-\s]{7,20}$"),
            pattern_message: Some("Enter a valid phone number"),
            ..DefaultValidation::NONE
        },
    },
    FieldTypeConfig {
        field_type: FieldType::Number,
        label: "Number",
        supports_options: false,
        supports_validation: true,
        default_validation: DefaultValidation::NONE,
    },
    FieldTypeConfig {
        field_type: FieldType::Date,
        label: "Date",
        supports_options: false,
        supports_validation: false,
        default_validation: DefaultValidation::NONE,
    },
    FieldTypeConfig {
        field_type: FieldType::Time,
        label: "Time",
        supports_options: false,
        supports_validation: false,
        default_validation: DefaultValidation::NONE,
    },
    FieldTypeConfig {
        field_type: FieldType::Rating,
        label: "Rating",
        supports_options: false,
        supports_validation: true,
        default_validation: DefaultValidation {
            min: Some(1.0),
            max: Some(5.0),
            ..DefaultValidation::NONE
        },
    },
    FieldTypeConfig {
        field_type: FieldType::MultiCheckbox,
        label: "Multiple Choice",
        supports_options: true,
        supports_validation: false,
        default_validation: DefaultValidation::NONE,
    },
];

/// Looks up the catalog entry for a field type.
#[must_use]
pub fn get_field_type_config(field_type: FieldType) -> Option<&'static FieldTypeConfig> {
    FIELD_TYPE_CATALOG
        .iter()
        .find(|config| config.field_type == field_type)
}

/// Looks up the catalog entry for a stored field type name.
///
/// Unknown names resolve to `None`; callers pick their own fallback.
#[must_use]
pub fn field_type_config_by_name(name: &str) -> Option<&'static FieldTypeConfig> {
    name.parse::<FieldType>()
        .ok()
        .and_then(get_field_type_config)
}

/// Returns the palette label for a stored type name, or `fallback` when unknown.
#[must_use]
pub fn display_label_or<'a>(name: &str, fallback: &'a str) -> &'a str {
    field_type_config_by_name(name)
        .map(|config| config.label)
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::{
        FieldType, display_label_or, field_type_config_by_name, get_field_type_config,
    };

    #[test]
    fn every_field_type_has_a_catalog_entry() {
        for field_type in FieldType::ALL {
            let config = get_field_type_config(field_type);
            assert!(config.is_some(), "missing catalog entry for {field_type:?}");
        }
    }

    #[test]
    fn option_bearing_types_are_choice_inputs() {
        let option_types: Vec<FieldType> = FieldType::ALL
            .into_iter()
            .filter(|field_type| {
                get_field_type_config(*field_type).is_some_and(|config| config.supports_options)
            })
            .collect();

        assert_eq!(
            option_types,
            vec![FieldType::Select, FieldType::Radio, FieldType::MultiCheckbox]
        );
    }

    #[test]
    fn storage_names_round_trip_through_from_str() {
        for field_type in FieldType::ALL {
            assert_eq!(field_type.as_str().parse::<FieldType>(), Ok(field_type));
        }
    }

    #[test]
    fn unknown_type_name_resolves_to_none() {
        assert!(field_type_config_by_name("signature").is_none());
        assert_eq!(display_label_or("signature", "Custom"), "Custom");
        assert_eq!(display_label_or("multi-checkbox", "Custom"), "Multiple Choice");
    }

    #[test]
    fn serde_uses_kebab_case_names() {
        let encoded = serde_json::to_string(&FieldType::MultiCheckbox)
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(encoded, "\"multi-checkbox\"");
    }
}
