//! Array schemas
//!
//! An [`ArraySchema`] is the ordered list of column prototypes shared by
//! every record of one array property. Each prototype is a [`TypedField`]
//! whose value is the default for new rows.
//!
//! Layout rules, checked once at construction:
//! - column names are unique
//! - every prototype value is valid for its column (enum defaults are
//!   among the choices)
//! - at most one column is array-valued (the nested column)
//! - a nested column's record schema has no array column of its own

use std::collections::HashSet;
use std::sync::Arc;

use crate::descriptor::{EnumData, NumberRange, PropDescription};
use crate::error::SchemaError;
use crate::field::{Color, FieldKind, FieldValue, TypedField};
use crate::record::Record;

/// Ordered column prototypes for one array property
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    columns: Vec<TypedField>,
    nested: Option<usize>,
}

impl ArraySchema {
    /// Validate and build a schema from column prototypes
    pub fn new(columns: Vec<TypedField>) -> Result<Self, SchemaError> {
        let mut names = HashSet::new();
        let mut nested: Option<usize> = None;

        for (idx, column) in columns.iter().enumerate() {
            if !names.insert(column.name().to_string()) {
                return Err(SchemaError::DuplicateColumn {
                    name: column.name().to_string(),
                });
            }
            column.check(column.value())?;
            if column.kind() != FieldKind::Array {
                continue;
            }
            if let Some(first) = nested {
                return Err(SchemaError::MultipleNestedColumns {
                    first: columns[first].name().to_string(),
                    second: column.name().to_string(),
                });
            }
            let record = column.descr().record.as_ref().ok_or_else(|| {
                SchemaError::MissingRecordSchema {
                    column: column.name().to_string(),
                }
            })?;
            if let Some(inner) = record.nested_column() {
                return Err(SchemaError::NestingTooDeep {
                    column: column.name().to_string(),
                    inner: record.columns[inner].name().to_string(),
                });
            }
            nested = Some(idx);
        }

        Ok(Self { columns, nested })
    }

    /// Start building a schema column by column
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn columns(&self) -> &[TypedField] {
        &self.columns
    }

    pub fn column(&self, idx: usize) -> Option<&TypedField> {
        self.columns.get(idx)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Index of the column called `name`
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    /// Index of the array-valued column, if any
    pub fn nested_column(&self) -> Option<usize> {
        self.nested
    }

    /// Record schema of the nested column, if any
    pub fn nested_schema(&self) -> Option<&Arc<ArraySchema>> {
        self.nested
            .and_then(|idx| self.columns[idx].descr().record.as_ref())
    }

    /// Kind sequence of the columns
    pub fn kinds(&self) -> impl Iterator<Item = FieldKind> + '_ {
        self.columns.iter().map(TypedField::kind)
    }

    /// New record made of clones of every column prototype
    pub fn new_record(&self) -> Record {
        Record::from_fields(self.columns.clone())
    }

    /// Whether `record` has one field per column with matching kinds
    pub fn is_congruent(&self, record: &Record) -> bool {
        record.len() == self.columns.len()
            && record
                .fields()
                .iter()
                .zip(&self.columns)
                .all(|(f, c)| f.kind() == c.kind() && f.name() == c.name())
    }
}

/// Incremental schema construction
///
/// Every `add_*` call appends a column; `tooltip` and `range` decorate the
/// last added column.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    columns: Vec<(PropDescription, FieldValue)>,
}

impl SchemaBuilder {
    fn push(mut self, descr: PropDescription, value: FieldValue) -> Self {
        self.columns.push((descr, value));
        self
    }

    pub fn add_bool(self, name: &str, label: &str, default: bool) -> Self {
        self.push(PropDescription::new(name, label), FieldValue::Bool(default))
    }

    pub fn add_int(self, name: &str, label: &str, default: i32, range: NumberRange) -> Self {
        self.push(
            PropDescription::new(name, label).with_range(range),
            FieldValue::Int(default),
        )
    }

    pub fn add_enum(self, name: &str, label: &str, default: i32, choices: EnumData) -> Self {
        self.push(
            PropDescription::new(name, label).with_choices(choices),
            FieldValue::Enum(default),
        )
    }

    pub fn add_real(self, name: &str, label: &str, default: f64, range: NumberRange) -> Self {
        self.push(
            PropDescription::new(name, label).with_range(range),
            FieldValue::Real(default),
        )
    }

    pub fn add_string(self, name: &str, label: &str, default: &str) -> Self {
        self.push(
            PropDescription::new(name, label),
            FieldValue::String(default.to_string()),
        )
    }

    pub fn add_multiline(self, name: &str, label: &str, default: &str) -> Self {
        self.push(
            PropDescription::new(name, label),
            FieldValue::MultilineString(default.to_string()),
        )
    }

    pub fn add_color(self, name: &str, label: &str, default: Color) -> Self {
        self.push(PropDescription::new(name, label), FieldValue::Color(default))
    }

    pub fn add_array(self, name: &str, label: &str, record: ArraySchema) -> Self {
        self.push(
            PropDescription::new(name, label).with_record(Arc::new(record)),
            FieldValue::Array(None),
        )
    }

    pub fn tooltip(mut self, tooltip: &str) -> Self {
        if let Some((descr, _)) = self.columns.last_mut() {
            descr.tooltip = Some(tooltip.to_string());
        }
        self
    }

    pub fn build(self) -> Result<ArraySchema, SchemaError> {
        let columns = self
            .columns
            .into_iter()
            .map(|(descr, value)| TypedField::new(Arc::new(descr), value))
            .collect();
        ArraySchema::new(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parameters() -> ArraySchema {
        ArraySchema::builder()
            .add_string("name", "Name", "")
            .add_string("type", "Type", "")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_keeps_order_and_defaults() {
        let schema = ArraySchema::builder()
            .add_bool("visible", "Visible", true)
            .add_int("count", "Count", 3, NumberRange::new(0.0, 10.0, 1.0))
            .tooltip("How many")
            .add_string("name", "Name", "untitled")
            .build()
            .unwrap();

        assert_eq!(schema.len(), 3);
        assert_eq!(schema.column_index("name"), Some(2));
        assert_eq!(
            schema.column(1).unwrap().descr().tooltip.as_deref(),
            Some("How many")
        );

        let record = schema.new_record();
        assert!(schema.is_congruent(&record));
        assert_eq!(record.get(0).unwrap().as_bool(), Some(true));
        assert_eq!(record.get(2).unwrap().as_str(), Some("untitled"));
    }

    #[test]
    fn test_single_nested_column() {
        let schema = ArraySchema::builder()
            .add_string("name", "Name", "")
            .add_array("parameters", "Parameters", parameters())
            .build()
            .unwrap();
        assert_eq!(schema.nested_column(), Some(1));
        assert_eq!(schema.nested_schema().unwrap().len(), 2);
    }

    #[test]
    fn test_rejects_second_nested_column() {
        let err = ArraySchema::builder()
            .add_array("a", "A", parameters())
            .add_array("b", "B", parameters())
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::MultipleNestedColumns { .. }));
    }

    #[test]
    fn test_rejects_two_level_nesting() {
        let middle = ArraySchema::builder()
            .add_array("parameters", "Parameters", parameters())
            .build()
            .unwrap();
        let err = ArraySchema::builder()
            .add_array("operations", "Operations", middle)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::NestingTooDeep {
                column: "operations".to_string(),
                inner: "parameters".to_string(),
            }
        );
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let err = ArraySchema::builder()
            .add_string("name", "Name", "")
            .add_bool("name", "Again", false)
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateColumn { .. }));
    }

    #[test]
    fn test_rejects_array_without_record() {
        let field = TypedField::new(
            Arc::new(PropDescription::new("rows", "Rows")),
            FieldValue::Array(None),
        );
        assert!(matches!(
            ArraySchema::new(vec![field]),
            Err(SchemaError::MissingRecordSchema { .. })
        ));
    }

    #[test]
    fn test_rejects_enum_default_outside_choices() {
        let err = ArraySchema::builder()
            .add_enum(
                "vis",
                "Visibility",
                0,
                EnumData::from_pairs([("Public", 1), ("Private", 2)]),
            )
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::Field(crate::error::FieldError::UnknownEnumValue { value: 0, .. })
        ));
    }
}
