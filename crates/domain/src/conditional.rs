use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison applied by one conditional rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionalOperator {
    /// String equality.
    Equals,
    /// String inequality.
    NotEquals,
    /// Case-insensitive substring match.
    Contains,
    /// Negated case-insensitive substring match.
    NotContains,
    /// Numeric greater-than.
    GreaterThan,
    /// Numeric less-than.
    LessThan,
    /// Value is absent or blank.
    IsEmpty,
    /// Value is present and not blank.
    IsNotEmpty,
}

impl ConditionalOperator {
    /// Returns a stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::IsEmpty => "is_empty",
            Self::IsNotEmpty => "is_not_empty",
        }
    }

    /// Returns whether the operator compares against a configured operand.
    #[must_use]
    pub fn requires_operand(&self) -> bool {
        !matches!(self, Self::IsEmpty | Self::IsNotEmpty)
    }
}

/// What a satisfied rule set does to the owning field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionalAction {
    /// Field renders only while the rules hold.
    #[default]
    Show,
    /// Field renders only while the rules do not hold.
    Hide,
}

/// How rule results are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicType {
    /// Every rule must hold.
    #[default]
    All,
    /// At least one rule must hold.
    Any,
}

/// One atomic visibility condition against another field's live value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalRule {
    /// Id of the field whose live value is inspected.
    pub field_id: String,
    /// Comparison operator.
    pub operator: ConditionalOperator,
    /// Configured comparison operand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl ConditionalRule {
    /// Creates a rule with a comparison operand.
    #[must_use]
    pub fn new(
        field_id: impl Into<String>,
        operator: ConditionalOperator,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            field_id: field_id.into(),
            operator,
            value: Some(value.into()),
        }
    }

    /// Creates a rule without an operand, for the emptiness checks.
    #[must_use]
    pub fn without_operand(field_id: impl Into<String>, operator: ConditionalOperator) -> Self {
        Self {
            field_id: field_id.into(),
            operator,
            value: None,
        }
    }
}

/// Visibility logic attached to a custom field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalLogic {
    /// Whether the rules are applied at all.
    #[serde(default)]
    pub enabled: bool,
    /// Effect of a satisfied rule set.
    #[serde(default)]
    pub action: ConditionalAction,
    /// Rule combination mode.
    #[serde(default)]
    pub logic_type: LogicType,
    /// Ordered rule list.
    #[serde(default)]
    pub rules: Vec<ConditionalRule>,
}

impl ConditionalLogic {
    /// Creates enabled logic from its parts.
    #[must_use]
    pub fn new(
        action: ConditionalAction,
        logic_type: LogicType,
        rules: Vec<ConditionalRule>,
    ) -> Self {
        Self {
            enabled: true,
            action,
            logic_type,
            rules,
        }
    }

    /// Returns the no-op logic new fields start with.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Returns whether this logic can affect visibility.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled && !self.rules.is_empty()
    }

    /// Returns whether any rule references the given field id.
    #[must_use]
    pub fn references(&self, field_id: &str) -> bool {
        self.rules.iter().any(|rule| rule.field_id == field_id)
    }

    /// Drops every rule that references the given field id.
    ///
    /// Returns the number of removed rules.
    pub fn remove_rules_for(&mut self, field_id: &str) -> usize {
        let before = self.rules.len();
        self.rules.retain(|rule| rule.field_id != field_id);
        before - self.rules.len()
    }
}
