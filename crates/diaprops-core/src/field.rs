//! Typed fields
//!
//! A [`TypedField`] pairs a descriptor with a value whose kind never
//! changes after creation. Array fields own their nested
//! [`RecordStore`], which stays `None` until something asks for it.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::descriptor::PropDescription;
use crate::error::FieldError;
use crate::store::RecordStore;

/// Closed set of field kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Bool,
    Int,
    Enum,
    Real,
    String,
    MultilineString,
    /// RGBA colour; has no cell editor in array views
    Color,
    /// Nested record array
    Array,
}

impl FieldKind {
    /// Get all field kinds
    pub fn all() -> &'static [FieldKind] {
        &[
            FieldKind::Bool,
            FieldKind::Int,
            FieldKind::Enum,
            FieldKind::Real,
            FieldKind::String,
            FieldKind::MultilineString,
            FieldKind::Color,
            FieldKind::Array,
        ]
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Enum => write!(f, "enum"),
            Self::Real => write!(f, "real"),
            Self::String => write!(f, "string"),
            Self::MultilineString => write!(f, "multiline_string"),
            Self::Color => write!(f, "color"),
            Self::Array => write!(f, "array"),
        }
    }
}

/// RGBA colour with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    #[serde(default = "opaque")]
    pub alpha: f32,
}

fn opaque() -> f32 {
    1.0
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(red: f32, green: f32, blue: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 1.0,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        write!(
            f,
            "#{:02x}{:02x}{:02x}",
            byte(self.red),
            byte(self.green),
            byte(self.blue)
        )?;
        if self.alpha < 1.0 {
            write!(f, "{:02x}", byte(self.alpha))?;
        }
        Ok(())
    }
}

/// Value held by a field; the variant always matches the field kind
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Int(i32),
    Enum(i32),
    Real(f64),
    String(String),
    MultilineString(String),
    Color(Color),
    /// Nested store, `None` until materialized
    Array(Option<RecordStore>),
}

impl FieldValue {
    /// Kind tag of this value
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Bool(_) => FieldKind::Bool,
            Self::Int(_) => FieldKind::Int,
            Self::Enum(_) => FieldKind::Enum,
            Self::Real(_) => FieldKind::Real,
            Self::String(_) => FieldKind::String,
            Self::MultilineString(_) => FieldKind::MultilineString,
            Self::Color(_) => FieldKind::Color,
            Self::Array(_) => FieldKind::Array,
        }
    }

    /// Zero value for a kind
    pub fn zero(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Bool => Self::Bool(false),
            FieldKind::Int => Self::Int(0),
            FieldKind::Enum => Self::Enum(0),
            FieldKind::Real => Self::Real(0.0),
            FieldKind::String => Self::String(String::new()),
            FieldKind::MultilineString => Self::MultilineString(String::new()),
            FieldKind::Color => Self::Color(Color::BLACK),
            FieldKind::Array => Self::Array(None),
        }
    }
}

/// A value plus the descriptor of the column it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct TypedField {
    descr: Arc<PropDescription>,
    value: FieldValue,
}

impl TypedField {
    /// Create a field; the kind is taken from `value` and fixed from now on
    pub fn new(descr: Arc<PropDescription>, value: FieldValue) -> Self {
        Self { descr, value }
    }

    pub fn descr(&self) -> &PropDescription {
        &self.descr
    }

    /// Shared descriptor handle
    pub fn descr_arc(&self) -> &Arc<PropDescription> {
        &self.descr
    }

    pub fn name(&self) -> &str {
        &self.descr.name
    }

    pub fn kind(&self) -> FieldKind {
        self.value.kind()
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// Check that `value` could be stored in this field
    pub fn check(&self, value: &FieldValue) -> Result<(), FieldError> {
        if value.kind() != self.kind() {
            return Err(FieldError::KindMismatch {
                field: self.descr.name.clone(),
                expected: self.kind(),
                actual: value.kind(),
            });
        }
        if let (FieldValue::Enum(v), Some(choices)) = (value, &self.descr.choices) {
            if !choices.is_empty() && !choices.contains(*v) {
                return Err(FieldError::UnknownEnumValue {
                    field: self.descr.name.clone(),
                    value: *v,
                });
            }
        }
        Ok(())
    }

    /// Replace the value, keeping the kind
    ///
    /// Returns whether the stored value changed. Writing the current value
    /// back is always accepted.
    pub fn set(&mut self, value: FieldValue) -> Result<bool, FieldError> {
        if self.value == value {
            return Ok(false);
        }
        self.check(&value)?;
        self.value = value;
        Ok(true)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            FieldValue::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Integer content of an int or enum field
    pub fn as_int(&self) -> Option<i32> {
        match self.value {
            FieldValue::Int(v) | FieldValue::Enum(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self.value {
            FieldValue::Real(v) => Some(v),
            _ => None,
        }
    }

    /// Text content of a string or multiline string field
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            FieldValue::String(s) | FieldValue::MultilineString(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self.value {
            FieldValue::Color(c) => Some(c),
            _ => None,
        }
    }

    /// Nested store of an array field, if it has been materialized
    pub fn nested(&self) -> Option<&RecordStore> {
        match &self.value {
            FieldValue::Array(store) => store.as_ref(),
            _ => None,
        }
    }

    pub fn nested_mut(&mut self) -> Option<&mut RecordStore> {
        match &mut self.value {
            FieldValue::Array(store) => store.as_mut(),
            _ => None,
        }
    }

    /// Whether this array field already owns a nested store
    pub fn is_materialized(&self) -> bool {
        self.nested().is_some()
    }

    /// Nested store of an array field, creating an empty one on first use
    ///
    /// The boolean is `true` when the store was created by this call.
    pub fn nested_or_insert(&mut self) -> Result<(&mut RecordStore, bool), FieldError> {
        let schema = match (&self.value, &self.descr.record) {
            (FieldValue::Array(_), Some(schema)) => Arc::clone(schema),
            _ => {
                return Err(FieldError::NotAnArray {
                    field: self.descr.name.clone(),
                })
            }
        };
        match &mut self.value {
            FieldValue::Array(slot) => {
                let created = slot.is_none();
                if created {
                    tracing::debug!("Materializing nested store for '{}'", self.descr.name);
                }
                Ok((slot.get_or_insert_with(|| RecordStore::new(schema)), created))
            }
            _ => Err(FieldError::NotAnArray {
                field: self.descr.name.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::EnumData;

    fn descr(name: &str) -> Arc<PropDescription> {
        Arc::new(PropDescription::new(name, name))
    }

    #[test]
    fn test_kind_is_fixed() {
        let mut field = TypedField::new(descr("visible"), FieldValue::Bool(true));
        assert_eq!(field.kind(), FieldKind::Bool);

        let err = field.set(FieldValue::Int(1)).unwrap_err();
        assert!(matches!(err, FieldError::KindMismatch { .. }));
        assert_eq!(field.as_bool(), Some(true));
    }

    #[test]
    fn test_set_reports_change() {
        let mut field = TypedField::new(descr("name"), FieldValue::String("a".into()));
        assert!(!field.set(FieldValue::String("a".into())).unwrap());
        assert!(field.set(FieldValue::String("b".into())).unwrap());
        assert_eq!(field.as_str(), Some("b"));
    }

    #[test]
    fn test_enum_rejects_unknown_value() {
        let d = PropDescription::new("visibility", "Visibility")
            .with_choices(EnumData::from_pairs([("Public", 0), ("Private", 1)]));
        let mut field = TypedField::new(Arc::new(d), FieldValue::Enum(0));
        assert!(field.set(FieldValue::Enum(1)).unwrap());
        assert!(matches!(
            field.set(FieldValue::Enum(9)),
            Err(FieldError::UnknownEnumValue { value: 9, .. })
        ));
    }

    #[test]
    fn test_rewriting_current_value_is_accepted() {
        let d = PropDescription::new("visibility", "Visibility")
            .with_choices(EnumData::from_pairs([("Public", 1), ("Private", 2)]));
        let mut field = TypedField::new(Arc::new(d), FieldValue::Enum(0));
        assert!(!field.set(FieldValue::Enum(0)).unwrap());
        assert!(field.check(&FieldValue::Enum(0)).is_err());
        assert!(field.check(&FieldValue::Enum(2)).is_ok());
    }

    #[test]
    fn test_nested_or_insert_requires_array() {
        let mut field = TypedField::new(descr("width"), FieldValue::Real(1.0));
        assert!(matches!(
            field.nested_or_insert(),
            Err(FieldError::NotAnArray { .. })
        ));
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Color::rgb(1.0, 0.0, 0.0).to_string(), "#ff0000");
        let translucent = Color {
            alpha: 0.5,
            ..Color::WHITE
        };
        assert_eq!(translucent.to_string(), "#ffffff80");
    }
}
