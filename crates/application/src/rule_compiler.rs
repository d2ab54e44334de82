//! Compiles declarative field validation into enforceable rule sets.

use std::sync::OnceLock;

use ekklesia_domain::{CustomField, FieldType};
use regex::Regex;
use serde::Serialize;
use tracing::warn;

/// Pattern enforced on every email field.
pub const EMAIL_PATTERN: &str = r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$";

/// One enforceable constraint with its failure message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule<T> {
    /// Constraint bound.
    pub value: T,
    /// Message reported when the constraint fails.
    pub message: String,
}

impl<T> Rule<T> {
    fn new(value: T, message: String) -> Self {
        Self { value, message }
    }
}

/// Constraint kinds a rule set can carry, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    /// Value must be provided.
    Required,
    /// Minimum string length.
    MinLength,
    /// Maximum string length.
    MaxLength,
    /// Minimum numeric value.
    Min,
    /// Maximum numeric value.
    Max,
    /// Regular-expression match.
    Pattern,
}

/// Compiled constraints for one field, keyed by constraint name.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    /// Value must be provided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Rule<bool>>,
    /// Minimum string length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<Rule<usize>>,
    /// Maximum string length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<Rule<usize>>,
    /// Minimum numeric value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<Rule<f64>>,
    /// Maximum numeric value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<Rule<f64>>,
    /// Regular-expression source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Rule<String>>,
    #[serde(skip)]
    compiled_pattern: OnceLock<CompiledPattern>,
}

impl PartialEq for RuleSet {
    fn eq(&self, other: &Self) -> bool {
        self.required == other.required
            && self.min_length == other.min_length
            && self.max_length == other.max_length
            && self.min == other.min
            && self.max == other.max
            && self.pattern == other.pattern
    }
}

static EMAIL_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

/// Pattern source with its regex, or `None` when the source does not compile.
#[derive(Debug, Clone)]
struct CompiledPattern {
    source: String,
    regex: Option<Regex>,
}

impl CompiledPattern {
    fn new(source: &str) -> Self {
        let regex = if source == EMAIL_PATTERN {
            EMAIL_REGEX.get_or_init(|| build_regex(source)).clone()
        } else {
            build_regex(source)
        };

        Self {
            source: source.to_owned(),
            regex,
        }
    }
}

fn build_regex(source: &str) -> Option<Regex> {
    match Regex::new(source) {
        Ok(regex) => Some(regex),
        Err(error) => {
            warn!(
                pattern = source,
                error = %error,
                "skipping validation pattern that does not compile"
            );
            None
        }
    }
}

impl RuleSet {
    /// Returns whether the set carries no constraint.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns the constraint kinds present, in evaluation order.
    #[must_use]
    pub fn kinds(&self) -> Vec<RuleKind> {
        let present = [
            (RuleKind::Required, self.required.is_some()),
            (RuleKind::MinLength, self.min_length.is_some()),
            (RuleKind::MaxLength, self.max_length.is_some()),
            (RuleKind::Min, self.min.is_some()),
            (RuleKind::Max, self.max.is_some()),
            (RuleKind::Pattern, self.pattern.is_some()),
        ];

        present
            .into_iter()
            .filter_map(|(kind, is_present)| is_present.then_some(kind))
            .collect()
    }

    /// Returns whether `text` matches the pattern rule.
    ///
    /// The regex is built once per rule set; `None` means there is no
    /// pattern rule or its source does not compile.
    pub(crate) fn pattern_matches(&self, text: &str) -> Option<bool> {
        let source = self.pattern.as_ref()?.value.as_str();
        let cached = self.compiled_pattern.get_or_init(|| CompiledPattern::new(source));
        if cached.source == source {
            return cached.regex.as_ref().map(|regex| regex.is_match(text));
        }

        CompiledPattern::new(source)
            .regex
            .map(|regex| regex.is_match(text))
    }
}

/// Compiles a field's required flag, validation, and type into a rule set.
///
/// Email fields always carry [`EMAIL_PATTERN`], replacing any author pattern.
#[must_use]
pub fn compile(field: &CustomField) -> RuleSet {
    let label = display_label(field);
    let mut rules = RuleSet::default();

    if field.is_required() {
        rules.required = Some(Rule::new(true, format!("{label} is required")));
    }

    if let Some(validation) = field.validation() {
        if let Some(min_length) = validation.min_length {
            rules.min_length = Some(Rule::new(
                min_length,
                format!("{label} must be at least {min_length} characters"),
            ));
        }

        if let Some(max_length) = validation.max_length {
            rules.max_length = Some(Rule::new(
                max_length,
                format!("{label} must be at most {max_length} characters"),
            ));
        }

        if let Some(min) = validation.min {
            rules.min = Some(Rule::new(min, format!("{label} must be at least {min}")));
        }

        if let Some(max) = validation.max {
            rules.max = Some(Rule::new(max, format!("{label} must be at most {max}")));
        }

        if let Some(pattern) = validation
            .pattern
            .as_deref()
            .filter(|pattern| !pattern.is_empty())
        {
            let message = validation
                .pattern_message
                .as_deref()
                .map(str::trim)
                .filter(|message| !message.is_empty())
                .map(str::to_owned)
                .unwrap_or_else(|| format!("{label} has an invalid format"));
            rules.pattern = Some(Rule::new(pattern.to_owned(), message));
        }
    }

    if field.field_type() == FieldType::Email {
        rules.pattern = Some(Rule::new(
            EMAIL_PATTERN.to_owned(),
            format!("{label} must be a valid email address"),
        ));
    }

    rules
}

fn display_label(field: &CustomField) -> &str {
    let label = field.label().trim();
    if label.is_empty() {
        "This field"
    } else {
        label
    }
}
