use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use ekklesia_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::field::{CustomField, create_default_field};
use crate::field_catalog::FieldType;
use crate::section::{FormSection, create_default_section};

/// How a registration form is presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormLayout {
    /// Every field on one page.
    #[default]
    SinglePage,
    /// One page per section.
    MultiSection,
}

impl FormLayout {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SinglePage => "single-page",
            Self::MultiSection => "multi-section",
        }
    }
}

/// Direction for reorder operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Towards the start.
    Up,
    /// Towards the end.
    Down,
}

/// Structural problem found in a form definition snapshot.
///
/// Issues are diagnostics for authors; evaluation degrades around them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityIssue {
    /// Two fields share an id.
    DuplicateFieldId {
        /// Repeated id.
        field_id: String,
    },
    /// Two sections share an id.
    DuplicateSectionId {
        /// Repeated id.
        section_id: String,
    },
    /// A field points at a section that does not exist.
    DanglingSection {
        /// Offending field.
        field_id: String,
        /// Missing section id.
        section_id: String,
    },
    /// A conditional rule points at a field that does not exist.
    DanglingRuleReference {
        /// Field owning the rule.
        field_id: String,
        /// Missing field id.
        referenced_field_id: String,
    },
    /// A conditional rule inspects its own field.
    SelfReference {
        /// Field owning the rule.
        field_id: String,
    },
    /// A field carries options although its type has none.
    UnsupportedOptions {
        /// Offending field.
        field_id: String,
        /// Stored field type name.
        field_type: String,
    },
    /// A comparison rule has no operand configured.
    MissingRuleOperand {
        /// Field owning the rule.
        field_id: String,
        /// Field the rule inspects.
        referenced_field_id: String,
        /// Operator needing the operand.
        operator: String,
    },
}

impl Display for IntegrityIssue {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateFieldId { field_id } => {
                write!(formatter, "duplicate field id '{field_id}'")
            }
            Self::DuplicateSectionId { section_id } => {
                write!(formatter, "duplicate section id '{section_id}'")
            }
            Self::DanglingSection {
                field_id,
                section_id,
            } => write!(
                formatter,
                "field '{field_id}' references missing section '{section_id}'"
            ),
            Self::DanglingRuleReference {
                field_id,
                referenced_field_id,
            } => write!(
                formatter,
                "conditional rule on '{field_id}' references missing field '{referenced_field_id}'"
            ),
            Self::SelfReference { field_id } => {
                write!(formatter, "conditional rule on '{field_id}' references itself")
            }
            Self::UnsupportedOptions {
                field_id,
                field_type,
            } => write!(
                formatter,
                "field '{field_id}' of type '{field_type}' does not support options"
            ),
            Self::MissingRuleOperand {
                field_id,
                referenced_field_id,
                operator,
            } => write!(
                formatter,
                "conditional rule on '{field_id}' uses '{operator}' against '{referenced_field_id}' without a value"
            ),
        }
    }
}

/// Fields rendered together under one section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionGroup<'a> {
    /// Owning section, or `None` for ungrouped fields.
    pub section: Option<&'a FormSection>,
    /// Fields in render order.
    pub fields: Vec<&'a CustomField>,
}

/// Snapshot of one dynamic form: sections, fields, and layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    #[serde(default)]
    sections: Vec<FormSection>,
    #[serde(default)]
    fields: Vec<CustomField>,
    #[serde(default)]
    form_layout: FormLayout,
}

impl FormDefinition {
    /// Creates a definition from a snapshot.
    ///
    /// The snapshot is taken as-is; see [`FormDefinition::integrity_issues`].
    #[must_use]
    pub fn new(
        sections: Vec<FormSection>,
        fields: Vec<CustomField>,
        form_layout: FormLayout,
    ) -> Self {
        Self {
            sections,
            fields,
            form_layout,
        }
    }

    /// Returns sections in storage order.
    #[must_use]
    pub fn sections(&self) -> &[FormSection] {
        &self.sections
    }

    /// Returns fields in storage order.
    #[must_use]
    pub fn fields(&self) -> &[CustomField] {
        &self.fields
    }

    /// Returns the layout.
    #[must_use]
    pub fn form_layout(&self) -> FormLayout {
        self.form_layout
    }

    /// Updates the layout.
    pub fn set_form_layout(&mut self, form_layout: FormLayout) {
        self.form_layout = form_layout;
    }

    /// Finds a field by id.
    #[must_use]
    pub fn field(&self, field_id: &str) -> Option<&CustomField> {
        self.fields.iter().find(|field| field.id() == field_id)
    }

    /// Finds a section by id.
    #[must_use]
    pub fn section(&self, section_id: &str) -> Option<&FormSection> {
        self.sections
            .iter()
            .find(|section| section.id() == section_id)
    }

    /// Returns sections sorted by order, ties broken by id.
    #[must_use]
    pub fn sections_in_order(&self) -> Vec<&FormSection> {
        let mut sections: Vec<&FormSection> = self.sections.iter().collect();
        sections.sort_by(|left, right| {
            left.order()
                .cmp(&right.order())
                .then_with(|| left.id().cmp(right.id()))
        });
        sections
    }

    /// Returns the fields of one section in render order.
    ///
    /// `None` selects ungrouped fields, including fields whose section is missing.
    #[must_use]
    pub fn fields_in_section(&self, section_id: Option<&str>) -> Vec<&CustomField> {
        let mut fields: Vec<&CustomField> = self
            .fields
            .iter()
            .filter(|field| self.effective_section_id(field) == section_id)
            .collect();
        fields.sort_by(|left, right| {
            left.order()
                .cmp(&right.order())
                .then_with(|| left.id().cmp(right.id()))
        });
        fields
    }

    /// Returns the ordered render plan: sections first, then ungrouped fields.
    #[must_use]
    pub fn render_plan(&self) -> Vec<SectionGroup<'_>> {
        let mut groups: Vec<SectionGroup<'_>> = self
            .sections_in_order()
            .into_iter()
            .map(|section| SectionGroup {
                section: Some(section),
                fields: self.fields_in_section(Some(section.id())),
            })
            .collect();

        let ungrouped = self.fields_in_section(None);
        if !ungrouped.is_empty() {
            groups.push(SectionGroup {
                section: None,
                fields: ungrouped,
            });
        }

        groups
    }

    /// Appends a new default field at the end of a section.
    pub fn add_field(
        &mut self,
        field_type: FieldType,
        section_id: Option<&str>,
    ) -> AppResult<&CustomField> {
        if let Some(section_id) = section_id {
            self.require_section(section_id)?;
        }

        let order = self.next_field_order(section_id);
        let mut field = create_default_field(field_type, order);
        field.set_section_id(section_id.map(str::to_owned));

        let index = self.fields.len();
        self.fields.push(field);
        Ok(&self.fields[index])
    }

    /// Replaces a field with an edited copy carrying the same id.
    pub fn replace_field(&mut self, field: CustomField) -> AppResult<()> {
        let Some(slot) = self
            .fields
            .iter_mut()
            .find(|existing| existing.id() == field.id())
        else {
            return Err(AppError::NotFound(format!("field '{}'", field.id())));
        };

        *slot = field;
        Ok(())
    }

    /// Removes a field and prunes conditional rules that referenced it.
    pub fn remove_field(&mut self, field_id: &str) -> Option<CustomField> {
        let index = self.fields.iter().position(|field| field.id() == field_id)?;
        let removed = self.fields.remove(index);

        for field in &mut self.fields {
            if let Some(logic) = field.conditional_logic_mut() {
                logic.remove_rules_for(field_id);
            }
        }

        Some(removed)
    }

    /// Swaps a field with its neighbour inside the same section.
    ///
    /// Returns `false` when the field is missing or already at the edge.
    pub fn move_field(&mut self, field_id: &str, direction: MoveDirection) -> bool {
        let Some(field) = self.field(field_id) else {
            return false;
        };
        let section_id = self.effective_section_id(field).map(str::to_owned);
        let ordered_ids: Vec<String> = self
            .fields_in_section(section_id.as_deref())
            .into_iter()
            .map(|field| field.id().to_owned())
            .collect();

        let Some(reordered) = swap_with_neighbour(ordered_ids, field_id, direction) else {
            return false;
        };

        for (position, id) in reordered.iter().enumerate() {
            if let Some(field) = self.fields.iter_mut().find(|field| field.id() == id) {
                field.set_order(position_to_order(position));
            }
        }

        true
    }

    /// Moves a field into another section (or out of all sections), at the end.
    pub fn assign_field_to_section(
        &mut self,
        field_id: &str,
        section_id: Option<&str>,
    ) -> AppResult<()> {
        if let Some(section_id) = section_id {
            self.require_section(section_id)?;
        }

        let order = self.next_field_order(section_id);
        let Some(field) = self.fields.iter_mut().find(|field| field.id() == field_id) else {
            return Err(AppError::NotFound(format!("field '{field_id}'")));
        };

        field.set_section_id(section_id.map(str::to_owned));
        field.set_order(order);
        Ok(())
    }

    /// Appends a new default section.
    pub fn add_section(&mut self) -> &FormSection {
        let order = self
            .sections
            .iter()
            .map(FormSection::order)
            .max()
            .map_or(0, |order| order.saturating_add(1));

        let index = self.sections.len();
        self.sections.push(create_default_section(order));
        &self.sections[index]
    }

    /// Removes a section; its fields become ungrouped.
    pub fn remove_section(&mut self, section_id: &str) -> Option<FormSection> {
        let index = self
            .sections
            .iter()
            .position(|section| section.id() == section_id)?;
        let removed = self.sections.remove(index);

        let mut next_order = self.next_field_order(None);
        for field in &mut self.fields {
            if field.section_id() == Some(section_id) {
                field.set_section_id(None);
                field.set_order(next_order);
                next_order = next_order.saturating_add(1);
            }
        }

        Some(removed)
    }

    /// Swaps a section with its neighbour.
    pub fn move_section(&mut self, section_id: &str, direction: MoveDirection) -> bool {
        let ordered_ids: Vec<String> = self
            .sections_in_order()
            .into_iter()
            .map(|section| section.id().to_owned())
            .collect();

        let Some(reordered) = swap_with_neighbour(ordered_ids, section_id, direction) else {
            return false;
        };

        for (position, id) in reordered.iter().enumerate() {
            if let Some(section) = self.sections.iter_mut().find(|section| section.id() == id) {
                section.set_order(position_to_order(position));
            }
        }

        true
    }

    /// Lists referential and structural problems in the snapshot.
    #[must_use]
    pub fn integrity_issues(&self) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();

        let mut seen_sections = HashSet::new();
        for section in &self.sections {
            if !seen_sections.insert(section.id()) {
                issues.push(IntegrityIssue::DuplicateSectionId {
                    section_id: section.id().to_owned(),
                });
            }
        }

        let mut seen_fields = HashSet::new();
        for field in &self.fields {
            if !seen_fields.insert(field.id()) {
                issues.push(IntegrityIssue::DuplicateFieldId {
                    field_id: field.id().to_owned(),
                });
            }

            if let Some(section_id) = field.section_id()
                && self.section(section_id).is_none()
            {
                issues.push(IntegrityIssue::DanglingSection {
                    field_id: field.id().to_owned(),
                    section_id: section_id.to_owned(),
                });
            }

            if !field.options().is_empty()
                && !field
                    .type_config()
                    .is_some_and(|config| config.supports_options)
            {
                issues.push(IntegrityIssue::UnsupportedOptions {
                    field_id: field.id().to_owned(),
                    field_type: field.field_type().as_str().to_owned(),
                });
            }

            let Some(logic) = field.conditional_logic() else {
                continue;
            };

            for rule in &logic.rules {
                if rule.field_id == field.id() {
                    issues.push(IntegrityIssue::SelfReference {
                        field_id: field.id().to_owned(),
                    });
                } else if self.field(rule.field_id.as_str()).is_none() {
                    issues.push(IntegrityIssue::DanglingRuleReference {
                        field_id: field.id().to_owned(),
                        referenced_field_id: rule.field_id.clone(),
                    });
                }

                if rule.operator.requires_operand() && rule.value.is_none() {
                    issues.push(IntegrityIssue::MissingRuleOperand {
                        field_id: field.id().to_owned(),
                        referenced_field_id: rule.field_id.clone(),
                        operator: rule.operator.as_str().to_owned(),
                    });
                }
            }
        }

        issues
    }

    fn effective_section_id<'a>(&self, field: &'a CustomField) -> Option<&'a str> {
        field
            .section_id()
            .filter(|section_id| self.section(section_id).is_some())
    }

    fn next_field_order(&self, section_id: Option<&str>) -> i32 {
        self.fields_in_section(section_id)
            .last()
            .map_or(0, |field| field.order().saturating_add(1))
    }

    fn require_section(&self, section_id: &str) -> AppResult<()> {
        if self.section(section_id).is_none() {
            return Err(AppError::NotFound(format!("section '{section_id}'")));
        }

        Ok(())
    }
}

fn swap_with_neighbour(
    mut ordered_ids: Vec<String>,
    id: &str,
    direction: MoveDirection,
) -> Option<Vec<String>> {
    let position = ordered_ids.iter().position(|candidate| candidate == id)?;
    let neighbour = match direction {
        MoveDirection::Up => position.checked_sub(1)?,
        MoveDirection::Down => {
            let next = position + 1;
            (next < ordered_ids.len()).then_some(next)?
        }
    };

    ordered_ids.swap(position, neighbour);
    Some(ordered_ids)
}

fn position_to_order(position: usize) -> i32 {
    i32::try_from(position).unwrap_or(i32::MAX)
}
