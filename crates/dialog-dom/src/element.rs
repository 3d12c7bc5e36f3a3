//! Element descriptors.

use std::collections::BTreeMap;

/// Snapshot of the parts of an element the engine inspects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementDescriptor {
    /// Lowercase tag name
    pub tag: String,
    /// CSS classes
    pub classes: Vec<String>,
    /// Attributes other than `class`, keyed by lowercase name
    pub attributes: BTreeMap<String, String>,
}

impl ElementDescriptor {
    /// Create a descriptor for a tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Default::default()
        }
    }

    /// Add a class.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Set an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// The `id` attribute.
    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    /// Parsed `tabindex` attribute, if present and numeric.
    pub fn tab_index(&self) -> Option<i32> {
        self.attribute("tabindex")
            .and_then(|v| v.trim().parse::<i32>().ok())
    }

    /// Whether the element has a `disabled` attribute.
    pub fn is_disabled(&self) -> bool {
        self.has_attribute("disabled")
    }
}
