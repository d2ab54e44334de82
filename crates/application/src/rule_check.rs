use serde::Serialize;
use serde_json::Value;

use crate::rule_compiler::{RuleKind, RuleSet};
use crate::value_coercion::{coerce_to_number, is_missing};

/// First constraint a field value violated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Violated constraint.
    pub rule: RuleKind,
    /// Message for the presentation layer.
    pub message: String,
}

impl FieldError {
    fn new(rule: RuleKind, message: &str) -> Self {
        Self {
            rule,
            message: message.to_owned(),
        }
    }
}

impl RuleSet {
    /// Checks one value against the compiled rules.
    ///
    /// Rules run in [`RuleSet::kinds`] order and the first violation wins.
    /// Values that are not provided only fail `required`.
    #[must_use]
    pub fn check(&self, value: Option<&Value>) -> Option<FieldError> {
        if is_missing(value) {
            return self
                .required
                .as_ref()
                .filter(|rule| rule.value)
                .map(|rule| FieldError::new(RuleKind::Required, rule.message.as_str()));
        }

        if let Some(Value::String(text)) = value {
            let length = text.chars().count();
            if let Some(rule) = &self.min_length
                && length < rule.value
            {
                return Some(FieldError::new(RuleKind::MinLength, rule.message.as_str()));
            }
            if let Some(rule) = &self.max_length
                && length > rule.value
            {
                return Some(FieldError::new(RuleKind::MaxLength, rule.message.as_str()));
            }
        }

        let number = coerce_to_number(value);
        if !number.is_nan() {
            if let Some(rule) = &self.min
                && number < rule.value
            {
                return Some(FieldError::new(RuleKind::Min, rule.message.as_str()));
            }
            if let Some(rule) = &self.max
                && number > rule.value
            {
                return Some(FieldError::new(RuleKind::Max, rule.message.as_str()));
            }
        }

        if let (Some(rule), Some(Value::String(text))) = (&self.pattern, value)
            && self.pattern_matches(text) == Some(false)
        {
            return Some(FieldError::new(RuleKind::Pattern, rule.message.as_str()));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use ekklesia_domain::{CustomField, FieldType, FieldValidation};
    use serde_json::json;

    use crate::rule_compiler::{RuleKind, compile};

    fn bounded_text() -> CustomField {
        CustomField::new("greeting", "Greeting", FieldType::Text, 0)
            .required()
            .with_validation(FieldValidation {
                max_length: Some(10),
                ..FieldValidation::default()
            })
    }

    #[test]
    fn max_length_violation_is_reported() {
        let rules = compile(&bounded_text());

        let error = rules.check(Some(&json!("hello world")));
        assert_eq!(error.map(|error| error.rule), Some(RuleKind::MaxLength));
        assert_eq!(rules.check(Some(&json!("hello"))), None);
    }

    #[test]
    fn missing_required_value_fails_first() {
        let rules = compile(&bounded_text());

        for missing in [None, Some(json!(null)), Some(json!("   "))] {
            let error = rules.check(missing.as_ref());
            assert_eq!(error.map(|error| error.rule), Some(RuleKind::Required));
        }
    }

    #[test]
    fn optional_empty_value_skips_other_rules() {
        let field = CustomField::new("code", "Code", FieldType::Text, 0).with_validation(
            FieldValidation {
                min_length: Some(4),
                pattern: Some("^[0-9]+$".to_owned()),
                ..FieldValidation::default()
            },
        );

        assert_eq!(compile(&field).check(Some(&json!(""))), None);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let field = CustomField::new("name", "Name", FieldType::Text, 0).with_validation(
            FieldValidation {
                max_length: Some(4),
                ..FieldValidation::default()
            },
        );

        assert_eq!(compile(&field).check(Some(&json!("Zoë!"))), None);
    }

    #[test]
    fn numeric_bounds_coerce_strings() {
        let field = CustomField::new("rating", "Rating", FieldType::Rating, 0).with_validation(
            FieldValidation {
                min: Some(1.0),
                max: Some(5.0),
                ..FieldValidation::default()
            },
        );
        let rules = compile(&field);

        assert_eq!(
            rules.check(Some(&json!("6"))).map(|error| error.rule),
            Some(RuleKind::Max)
        );
        assert_eq!(
            rules.check(Some(&json!(0))).map(|error| error.rule),
            Some(RuleKind::Min)
        );
        assert_eq!(rules.check(Some(&json!(3))), None);
    }

    #[test]
    fn email_pattern_rejects_malformed_addresses() {
        let field = CustomField::new("email", "Email", FieldType::Email, 0);
        let rules = compile(&field);

        assert_eq!(
            rules.check(Some(&json!("not-an-email"))).map(|error| error.message),
            Some("Email must be a valid email address".to_owned())
        );
        assert_eq!(rules.check(Some(&json!("user@example.com"))), None);
    }

    #[test]
    fn compiled_pattern_follows_rule_edits() {
        let field = CustomField::new("code", "Code", FieldType::Text, 0).with_validation(
            FieldValidation {
                pattern: Some("^[A-Z]{3}$".to_owned()),
                ..FieldValidation::default()
            },
        );
        let mut rules = compile(&field);

        assert_eq!(rules.check(Some(&json!("ABC"))), None);
        assert_eq!(rules.check(Some(&json!("ABC"))), None);
        assert!(rules.check(Some(&json!("abc"))).is_some());

        if let Some(rule) = rules.pattern.as_mut() {
            rule.value = "^[a-z]{3}$".to_owned();
        }
        assert_eq!(rules.check(Some(&json!("abc"))), None);
        assert!(rules.check(Some(&json!("ABC"))).is_some());
    }

    #[test]
    fn invalid_author_pattern_is_skipped() {
        let field = CustomField::new("code", "Code", FieldType::Text, 0).with_validation(
            FieldValidation {
                pattern: Some("([unclosed".to_owned()),
                ..FieldValidation::default()
            },
        );

        assert_eq!(compile(&field).check(Some(&json!("anything"))), None);
    }

    #[test]
    fn unchecked_required_checkbox_is_missing() {
        let field = CustomField::new("consent", "Consent", FieldType::Checkbox, 0).required();
        let rules = compile(&field);

        assert_eq!(
            rules.check(Some(&json!(false))).map(|error| error.rule),
            Some(RuleKind::Required)
        );
        assert_eq!(rules.check(Some(&json!(true))), None);
    }
}
