//! Field kind to cell mapping
//!
//! Every [`FieldKind`] maps to a cell storage type and, where the kind is
//! editable in a table, to a cell editor. The mapping is a plain `match`,
//! so a new kind cannot be added without deciding how it is shown.

use diaprops_core::{ArraySchema, EnumData, FieldKind, NumberRange, TypedField};

/// Value type held by a display cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellStorage {
    Bool,
    Int,
    Real,
    Text,
    /// Handle to a nested array, shown as child rows
    Nested,
    /// Kept but not shown
    Opaque,
}

/// Cell editor bound to a column
#[derive(Debug, Clone, PartialEq)]
pub enum CellEditor {
    /// Check box, flips on activation
    Toggle,
    /// Spin button with range and decimal digits
    Spin { range: NumberRange, digits: u32 },
    /// Combo box over the enum choices
    EnumCombo(EnumData),
    /// Single line entry
    Text,
    /// Multi line entry
    MultilineText,
}

/// Storage type for a field kind
pub fn storage_for(kind: FieldKind) -> CellStorage {
    match kind {
        FieldKind::Bool => CellStorage::Bool,
        FieldKind::Int | FieldKind::Enum => CellStorage::Int,
        FieldKind::Real => CellStorage::Real,
        FieldKind::String | FieldKind::MultilineString => CellStorage::Text,
        FieldKind::Array => CellStorage::Nested,
        FieldKind::Color => CellStorage::Opaque,
    }
}

/// Decimal digits needed to show multiples of `step`
fn digits_for_step(step: f64) -> u32 {
    let mut digits = 0;
    let mut scaled = step.abs();
    while digits < 6 && scaled > 0.0 && (scaled - scaled.round()).abs() > 1e-9 {
        scaled *= 10.0;
        digits += 1;
    }
    digits
}

/// Editor for a column prototype, `None` for columns shown read-only
pub fn editor_for(field: &TypedField) -> Option<CellEditor> {
    let descr = field.descr();
    match field.kind() {
        FieldKind::Bool => Some(CellEditor::Toggle),
        FieldKind::Int => Some(CellEditor::Spin {
            range: descr.range.unwrap_or_default(),
            digits: 0,
        }),
        FieldKind::Real => {
            let range = descr.range.unwrap_or(NumberRange::new(f64::MIN, f64::MAX, 0.1));
            Some(CellEditor::Spin {
                range,
                digits: digits_for_step(range.step),
            })
        }
        FieldKind::Enum => Some(CellEditor::EnumCombo(
            descr.choices.clone().unwrap_or_default(),
        )),
        FieldKind::String => Some(CellEditor::Text),
        FieldKind::MultilineString => Some(CellEditor::MultilineText),
        // nested arrays are edited through child rows
        FieldKind::Array => None,
        FieldKind::Color => None,
    }
}

/// How one schema column is presented
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnBinding {
    pub index: usize,
    pub name: String,
    pub label: String,
    pub tooltip: Option<String>,
    pub kind: FieldKind,
    pub storage: CellStorage,
    pub editor: Option<CellEditor>,
}

impl ColumnBinding {
    pub fn is_editable(&self) -> bool {
        self.editor.is_some()
    }

    /// Whether the column is hidden because nothing can show it
    pub fn is_unmapped(&self) -> bool {
        self.editor.is_none() && self.storage == CellStorage::Opaque
    }
}

/// Bind every column of a schema
pub fn bind_columns(schema: &ArraySchema) -> Vec<ColumnBinding> {
    schema
        .columns()
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let descr = field.descr();
            ColumnBinding {
                index,
                name: descr.name.clone(),
                label: descr.label.clone(),
                tooltip: descr.tooltip.clone(),
                kind: field.kind(),
                storage: storage_for(field.kind()),
                editor: editor_for(field),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use diaprops_core::Color;

    #[test]
    fn test_every_kind_has_storage() {
        for kind in FieldKind::all() {
            let storage = storage_for(*kind);
            if *kind == FieldKind::Color {
                assert_eq!(storage, CellStorage::Opaque);
            } else {
                assert_ne!(storage, CellStorage::Opaque);
            }
        }
    }

    #[test]
    fn test_bindings() {
        let nested = ArraySchema::builder()
            .add_string("name", "Name", "")
            .build()
            .unwrap();
        let schema = ArraySchema::builder()
            .add_bool("abstract", "Abstract", false)
            .add_real("weight", "Weight", 1.0, NumberRange::new(0.0, 5.0, 0.25))
            .add_enum("vis", "Visibility", 0, EnumData::from_pairs([("Public", 0)]))
            .add_color("fill", "Fill", Color::WHITE)
            .add_array("params", "Parameters", nested)
            .build()
            .unwrap();

        let columns = bind_columns(&schema);
        assert_eq!(columns.len(), 5);
        assert_eq!(columns[0].editor, Some(CellEditor::Toggle));
        assert_eq!(
            columns[1].editor,
            Some(CellEditor::Spin {
                range: NumberRange::new(0.0, 5.0, 0.25),
                digits: 2
            })
        );
        assert_eq!(columns[2].storage, CellStorage::Int);
        assert!(columns[3].is_unmapped());
        assert!(!columns[4].is_editable());
        assert!(!columns[4].is_unmapped());
        assert_eq!(columns[4].storage, CellStorage::Nested);
    }

    #[test]
    fn test_digits_for_step() {
        assert_eq!(digits_for_step(1.0), 0);
        assert_eq!(digits_for_step(0.1), 1);
        assert_eq!(digits_for_step(0.05), 2);
    }
}
