//! Record and multi-value field types

use serde::{Deserialize, Serialize};

/// A list-valued field as carried by a record.
///
/// Items may repeat and may be empty strings. The optional display override
/// is the scalar text shown for the field on the wire (set by a command, or
/// captured from the incoming scalar column); it is presentation metadata and
/// does not participate in equality.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MultiValue {
    items: Vec<String>,
    display: Option<String>,
}

impl MultiValue {
    /// A value with the given items and no display override.
    pub fn new(items: Vec<String>) -> Self {
        Self {
            items,
            display: None,
        }
    }

    /// A single-item value.
    pub fn single(item: impl Into<String>) -> Self {
        Self::new(vec![item.into()])
    }

    /// A value with no items (the empty list).
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Attach a display override for the scalar column.
    pub fn with_display(mut self, text: impl Into<String>) -> Self {
        self.display = Some(text.into());
        self
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }

    /// The text the scalar column carries for this value.
    ///
    /// # Returns
    /// The display override when set, otherwise the first item, otherwise
    /// the empty string.
    pub fn scalar_text(&self) -> &str {
        if let Some(text) = self.display.as_deref() {
            return text;
        }
        self.items.first().map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl PartialEq for MultiValue {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Eq for MultiValue {}

impl From<Vec<String>> for MultiValue {
    fn from(items: Vec<String>) -> Self {
        Self::new(items)
    }
}

/// An ordered mapping of field name to multi-value.
///
/// Insertion order is preserved; setting an existing field replaces its value
/// in place. The record adapter guarantees `__mv_*` companion columns never
/// appear here - downstream logic only ever sees logical field names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<(String, MultiValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a field's value by name.
    pub fn get(&self, name: &str) -> Option<&MultiValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Set a field, replacing in place if it exists, appending otherwise.
    pub fn set(&mut self, name: impl Into<String>, value: MultiValue) {
        let name = name.into();
        if let Some(entry) = self.fields.iter_mut().find(|(field, _)| *field == name) {
            entry.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    /// Remove a field, returning its value if present.
    pub fn remove(&mut self, name: &str) -> Option<MultiValue> {
        let idx = self.fields.iter().position(|(field, _)| field == name)?;
        Some(self.fields.remove(idx).1)
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(field, _)| field.as_str())
    }

    /// Fields and values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MultiValue)> {
        self.fields.iter().map(|(field, value)| (field.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================


// =============================================================================
// PROPERTY-BASED TESTS
// =============================================================================
