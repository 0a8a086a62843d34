//! Property descriptors
//!
//! A descriptor carries everything about a column that is not its value:
//! the member name, a human label, an optional tooltip, and kind-specific
//! metadata (numeric range, enum choices, nested record schema).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::schema::ArraySchema;

/// Numeric range for integer and real columns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumberRange {
    /// Smallest accepted value
    pub min: f64,
    /// Largest accepted value
    pub max: f64,
    /// Spin increment
    pub step: f64,
}

impl NumberRange {
    /// Create a new range
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Clamp a real value into the range
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    /// Clamp an integer value into the range
    pub fn clamp_int(&self, value: i32) -> i32 {
        self.clamp(f64::from(value)).round() as i32
    }

    /// Page increment used by spin editors (ten steps)
    pub fn page(&self) -> f64 {
        10.0 * self.step
    }
}

impl Default for NumberRange {
    fn default() -> Self {
        Self {
            min: f64::from(i32::MIN),
            max: f64::from(i32::MAX),
            step: 1.0,
        }
    }
}

/// One entry of an enumerated column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumChoice {
    /// Display label
    pub label: String,
    /// Stored value
    pub value: i32,
}

impl EnumChoice {
    pub fn new(label: impl Into<String>, value: i32) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Ordered set of enum choices
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnumData {
    choices: Vec<EnumChoice>,
}

impl EnumData {
    /// Create from an ordered list of choices
    pub fn new(choices: Vec<EnumChoice>) -> Self {
        Self { choices }
    }

    /// Build from `(label, value)` pairs
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, i32)>) -> Self {
        Self {
            choices: pairs
                .into_iter()
                .map(|(label, value)| EnumChoice::new(label, value))
                .collect(),
        }
    }

    /// All choices in declaration order
    pub fn choices(&self) -> &[EnumChoice] {
        &self.choices
    }

    /// Whether `value` is one of the declared choices
    pub fn contains(&self, value: i32) -> bool {
        self.choices.iter().any(|c| c.value == value)
    }

    /// Label for a stored value
    pub fn label_for(&self, value: i32) -> Option<&str> {
        self.choices
            .iter()
            .find(|c| c.value == value)
            .map(|c| c.label.as_str())
    }

    /// Value for a label
    pub fn value_for(&self, label: &str) -> Option<i32> {
        self.choices
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.value)
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}

/// Describes one property (column) of a record
#[derive(Debug, Clone, PartialEq)]
pub struct PropDescription {
    /// Member name, unique within a schema (e.g. `line_width`)
    pub name: String,
    /// Human readable label shown as column header
    pub label: String,
    /// Optional tooltip
    pub tooltip: Option<String>,
    /// Range for integer and real columns
    pub range: Option<NumberRange>,
    /// Choices for enumerated columns
    pub choices: Option<EnumData>,
    /// Record schema for array columns
    pub record: Option<Arc<ArraySchema>>,
}

impl PropDescription {
    /// Create a description with just a name and a label
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            tooltip: None,
            range: None,
            choices: None,
            record: None,
        }
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn with_range(mut self, range: NumberRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_choices(mut self, choices: EnumData) -> Self {
        self.choices = Some(choices);
        self
    }

    pub fn with_record(mut self, schema: Arc<ArraySchema>) -> Self {
        self.record = Some(schema);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_clamp() {
        let range = NumberRange::new(0.0, 10.0, 0.5);
        assert_eq!(range.clamp(-3.0), 0.0);
        assert_eq!(range.clamp(12.5), 10.0);
        assert_eq!(range.clamp(4.25), 4.25);
        assert_eq!(range.clamp_int(42), 10);
        assert_eq!(range.page(), 5.0);
    }

    #[test]
    fn test_enum_lookup() {
        let data = EnumData::from_pairs([("Public", 0), ("Private", 1), ("Protected", 2)]);
        assert_eq!(data.len(), 3);
        assert!(data.contains(2));
        assert!(!data.contains(7));
        assert_eq!(data.label_for(1), Some("Private"));
        assert_eq!(data.value_for("Protected"), Some(2));
        assert_eq!(data.value_for("Package"), None);
    }
}
