use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Named, orderable grouping of custom fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSection {
    id: String,
    title: String,
    #[serde(default)]
    order: i32,
    #[serde(default)]
    collapsible: bool,
    #[serde(default = "default_expanded")]
    default_expanded: bool,
}

fn default_expanded() -> bool {
    true
}

impl FormSection {
    /// Creates a section with an explicit id.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, order: i32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            order,
            collapsible: false,
            default_expanded: true,
        }
    }

    /// Makes the section collapsible with the given initial state.
    #[must_use]
    pub fn collapsible(mut self, default_expanded: bool) -> Self {
        self.collapsible = true;
        self.default_expanded = default_expanded;
        self
    }

    /// Returns the stable section id.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the section title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Returns the render order.
    #[must_use]
    pub fn order(&self) -> i32 {
        self.order
    }

    /// Returns whether the section can be collapsed.
    #[must_use]
    pub fn is_collapsible(&self) -> bool {
        self.collapsible
    }

    /// Returns whether the section starts expanded.
    #[must_use]
    pub fn is_default_expanded(&self) -> bool {
        self.default_expanded
    }

    /// Updates the title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Updates the render order.
    pub fn set_order(&mut self, order: i32) {
        self.order = order;
    }
}

/// Creates a new section titled after its position.
#[must_use]
pub fn create_default_section(order: i32) -> FormSection {
    FormSection::new(
        format!("section_{}", Uuid::new_v4().simple()),
        format!("Section {}", order.saturating_add(1)),
        order,
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{FormSection, create_default_section};

    #[test]
    fn default_section_title_follows_position() {
        let first = create_default_section(0);
        let third = create_default_section(2);

        assert_eq!(first.title(), "Section 1");
        assert_eq!(third.title(), "Section 3");
        assert_ne!(first.id(), third.id());
        assert!(first.is_default_expanded());
        assert!(!first.is_collapsible());
    }

    #[test]
    fn missing_default_expanded_deserializes_as_expanded() {
        let section: FormSection = serde_json::from_value(json!({
            "id": "s1",
            "title": "Contact",
            "order": 0,
            "collapsible": true
        }))
        .unwrap_or_else(|_| unreachable!());

        assert!(section.is_collapsible());
        assert!(section.is_default_expanded());
    }
}
