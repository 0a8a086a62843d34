//! Declarative schema and document definitions
//!
//! Lets an array property be described in JSON:
//!
//! ```json
//! {
//!   "name": "operations",
//!   "label": "Operations",
//!   "columns": [
//!     { "name": "name", "kind": "string" },
//!     { "name": "visibility", "kind": "enum", "default": 0,
//!       "choices": [{ "label": "Public", "value": 0 }] },
//!     { "name": "parameters", "kind": "array",
//!       "columns": [{ "name": "name", "kind": "string" }] }
//!   ],
//!   "records": [{ "name": "draw", "visibility": 0 }]
//! }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::descriptor::{EnumData, NumberRange, PropDescription};
use crate::error::{LoadError, SchemaError};
use crate::field::{FieldKind, FieldValue, TypedField};
use crate::property::ArrayProperty;
use crate::schema::ArraySchema;
use crate::store::load_field;

/// One column of a declarative schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    /// Defaults to the name when absent
    #[serde(default)]
    pub label: Option<String>,
    pub kind: FieldKind,
    #[serde(default)]
    pub tooltip: Option<String>,
    /// Prototype value for new rows; when absent, the first choice of an
    /// enum column or the zero value of any other kind
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub range: Option<NumberRange>,
    #[serde(default)]
    pub choices: Option<EnumData>,
    /// Record columns of an array column
    #[serde(default)]
    pub columns: Option<Vec<ColumnDef>>,
}

impl ColumnDef {
    /// Build the column prototype
    pub fn to_field(&self) -> Result<TypedField, SchemaError> {
        let mut descr = PropDescription::new(
            self.name.clone(),
            self.label.clone().unwrap_or_else(|| self.name.clone()),
        );
        descr.tooltip = self.tooltip.clone();
        descr.range = self.range;
        descr.choices = self.choices.clone();

        match (self.kind, &self.columns) {
            (FieldKind::Array, Some(columns)) => {
                descr.record = Some(Arc::new(schema_from_defs(columns)?));
            }
            (FieldKind::Array, None) => {
                return Err(SchemaError::MissingRecordSchema {
                    column: self.name.clone(),
                })
            }
            (_, Some(_)) => {
                return Err(SchemaError::InvalidDefinition {
                    column: self.name.clone(),
                    reason: format!("a {} column cannot have record columns", self.kind),
                })
            }
            (_, None) => {}
        }
        if self.kind == FieldKind::Enum && self.choices.is_none() {
            return Err(SchemaError::InvalidDefinition {
                column: self.name.clone(),
                reason: "enum column without choices".to_string(),
            });
        }

        let initial = match (self.kind, &self.choices) {
            (FieldKind::Enum, Some(choices)) => choices
                .choices()
                .first()
                .map_or(FieldValue::zero(self.kind), |choice| {
                    FieldValue::Enum(choice.value)
                }),
            _ => FieldValue::zero(self.kind),
        };
        let mut field = TypedField::new(Arc::new(descr), initial);
        if let Some(default) = &self.default {
            load_field(&mut field, default, &self.name).map_err(|e| {
                SchemaError::InvalidDefinition {
                    column: self.name.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        Ok(field)
    }
}

/// Build a schema from column definitions
pub fn schema_from_defs(defs: &[ColumnDef]) -> Result<ArraySchema, SchemaError> {
    let columns = defs
        .iter()
        .map(ColumnDef::to_field)
        .collect::<Result<Vec<_>, _>>()?;
    ArraySchema::new(columns)
}

/// A complete array property: schema plus records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrayDocument {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    /// Row count of a static array; dynamic when absent
    #[serde(default)]
    pub fixed_len: Option<usize>,
    pub columns: Vec<ColumnDef>,
    #[serde(default = "empty_records")]
    pub records: Value,
}

fn empty_records() -> Value {
    Value::Array(Vec::new())
}

impl ArrayDocument {
    /// Parse a document from JSON text
    pub fn from_json_str(text: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build the property described by this document
    pub fn to_property(&self) -> Result<ArrayProperty, LoadError> {
        let schema = Arc::new(schema_from_defs(&self.columns)?);
        let descr = PropDescription::new(
            self.name.clone(),
            self.label.clone().unwrap_or_else(|| self.name.clone()),
        );
        let mut prop = match self.fixed_len {
            Some(len) => ArrayProperty::fixed(descr, schema, len)?,
            None => ArrayProperty::dynamic(descr, schema),
        };
        prop.load(&self.records)?;
        Ok(prop)
    }
}
