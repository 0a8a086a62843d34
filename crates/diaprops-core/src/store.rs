//! Record stores
//!
//! A [`RecordStore`] is the authoritative row sequence behind one
//! array-valued property. It shares its [`ArraySchema`] and owns its
//! records; dropping a record releases every field, nested stores included.
//!
//! Stores serialize to a JSON array of objects keyed by column name.
//! Missing keys fall back to the column prototype, and nested columns that
//! were never materialized are left out.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{LoadError, StoreError};
use crate::field::{Color, FieldKind, FieldValue, TypedField};
use crate::record::Record;
use crate::schema::ArraySchema;

/// Identity of a store instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreId(Uuid);

impl StoreId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Store({})", &self.0.to_string()[..8])
    }
}

/// Ordered records sharing one schema
#[derive(Debug)]
pub struct RecordStore {
    id: StoreId,
    schema: Arc<ArraySchema>,
    rows: Vec<Record>,
}

impl RecordStore {
    /// Create an empty store
    pub fn new(schema: Arc<ArraySchema>) -> Self {
        Self {
            id: StoreId::new(),
            schema,
            rows: Vec::new(),
        }
    }

    /// Create a store holding `len` default records
    pub fn with_len(schema: Arc<ArraySchema>, len: usize) -> Result<Self, StoreError> {
        let mut store = Self::new(schema);
        store.resize(len)?;
        Ok(store)
    }

    pub fn id(&self) -> StoreId {
        self.id
    }

    pub fn schema(&self) -> &Arc<ArraySchema> {
        &self.schema
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Record] {
        &mut self.rows
    }

    pub fn row(&self, idx: usize) -> Option<&Record> {
        self.rows.get(idx)
    }

    pub fn row_mut(&mut self, idx: usize) -> Option<&mut Record> {
        self.rows.get_mut(idx)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append one default record and return it
    pub fn push_default(&mut self) -> Result<&mut Record, StoreError> {
        let len = self.rows.len();
        self.resize(len + 1)?;
        Ok(&mut self.rows[len])
    }

    /// Make the row count exactly `len`
    ///
    /// Trailing rows are dropped when shrinking; new rows are clones of the
    /// column prototypes. Returns whether the row count changed.
    pub fn resize(&mut self, len: usize) -> Result<bool, StoreError> {
        let current = self.rows.len();
        if current == len {
            return Ok(false);
        }
        if current > len {
            self.rows.truncate(len);
        } else {
            let requested = len - current;
            self.rows
                .try_reserve_exact(requested)
                .map_err(|source| StoreError::Allocation { requested, source })?;
            for _ in 0..requested {
                self.rows.push(self.schema.new_record());
            }
        }
        tracing::debug!("{} resized from {} to {} rows", self.id, current, len);
        Ok(true)
    }

    /// Check that every source names an existing row at most once
    pub fn check_sources(&self, sources: &[Option<usize>]) -> Result<(), StoreError> {
        let len = self.rows.len();
        let mut seen = vec![false; len];
        for &index in sources.iter().flatten() {
            if index >= len {
                return Err(StoreError::RowOutOfRange { index, len });
            }
            if std::mem::replace(&mut seen[index], true) {
                return Err(StoreError::DuplicateSource { index });
            }
        }
        Ok(())
    }

    /// Rebuild the row sequence from source positions
    ///
    /// `Some(i)` moves the current row `i` into that slot, `None` puts a
    /// fresh default record there. Rows not referenced are dropped. Returns
    /// whether the resulting order or length differs from the current one.
    ///
    /// [`resize`](Self::resize) is the special case that keeps a prefix in
    /// place and pads with `None`.
    pub fn reconcile(&mut self, sources: &[Option<usize>]) -> Result<bool, StoreError> {
        self.check_sources(sources)?;
        let len = self.rows.len();

        let unchanged = sources.len() == len
            && sources
                .iter()
                .enumerate()
                .all(|(pos, source)| *source == Some(pos));
        if unchanged {
            return Ok(false);
        }

        let mut rows = Vec::new();
        rows.try_reserve_exact(sources.len())
            .map_err(|source| StoreError::Allocation {
                requested: sources.len(),
                source,
            })?;

        let mut old: Vec<Option<Record>> = std::mem::take(&mut self.rows)
            .into_iter()
            .map(Some)
            .collect();
        for source in sources {
            let record = source
                .and_then(|idx| old[idx].take())
                .unwrap_or_else(|| self.schema.new_record());
            rows.push(record);
        }
        self.rows = rows;
        tracing::debug!(
            "{} reconciled {} rows into {} rows",
            self.id,
            len,
            self.rows.len()
        );
        Ok(true)
    }

    /// Load records from a JSON array of objects
    pub fn from_json(schema: Arc<ArraySchema>, data: &Value) -> Result<Self, LoadError> {
        Self::load_at(schema, data, "$")
    }

    fn load_at(schema: Arc<ArraySchema>, data: &Value, path: &str) -> Result<Self, LoadError> {
        let items = data.as_array().ok_or_else(|| LoadError::UnexpectedShape {
            expected: "an array of records".to_string(),
            path: path.to_string(),
        })?;

        let mut store = Self::new(schema);
        store.resize(items.len())?;
        for (row, item) in items.iter().enumerate() {
            let row_path = format!("{}[{}]", path, row);
            let object = item.as_object().ok_or_else(|| LoadError::UnexpectedShape {
                expected: "a record object".to_string(),
                path: row_path.clone(),
            })?;
            for field in store.rows[row].fields_mut() {
                if let Some(value) = object.get(field.name()) {
                    let field_path = format!("{}.{}", row_path, field.name());
                    load_field(field, value, &field_path)?;
                }
            }
        }
        Ok(store)
    }

    /// Save records as a JSON array of objects
    pub fn to_json(&self) -> Value {
        Value::Array(
            self.rows
                .iter()
                .map(|record| {
                    let mut object = Map::new();
                    for field in record.fields() {
                        if let Some(value) = save_field(field) {
                            object.insert(field.name().to_string(), value);
                        }
                    }
                    Value::Object(object)
                })
                .collect(),
        )
    }
}

fn invalid(field: &TypedField, path: &str, reason: impl Into<String>) -> LoadError {
    LoadError::InvalidValue {
        column: field.name().to_string(),
        path: path.to_string(),
        reason: reason.into(),
    }
}

pub(crate) fn load_field(field: &mut TypedField, value: &Value, path: &str) -> Result<(), LoadError> {
    let parsed = match field.kind() {
        FieldKind::Bool => FieldValue::Bool(
            value
                .as_bool()
                .ok_or_else(|| invalid(field, path, "expected a boolean"))?,
        ),
        FieldKind::Int => FieldValue::Int(
            value
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| invalid(field, path, "expected a 32-bit integer"))?,
        ),
        FieldKind::Enum => {
            let by_label = value.as_str().and_then(|label| {
                field
                    .descr()
                    .choices
                    .as_ref()
                    .and_then(|choices| choices.value_for(label))
            });
            let by_value = value.as_i64().and_then(|v| i32::try_from(v).ok());
            FieldValue::Enum(
                by_value
                    .or(by_label)
                    .ok_or_else(|| invalid(field, path, "expected an enum value or label"))?,
            )
        }
        FieldKind::Real => FieldValue::Real(
            value
                .as_f64()
                .ok_or_else(|| invalid(field, path, "expected a number"))?,
        ),
        FieldKind::String => FieldValue::String(
            value
                .as_str()
                .ok_or_else(|| invalid(field, path, "expected a string"))?
                .to_string(),
        ),
        FieldKind::MultilineString => FieldValue::MultilineString(
            value
                .as_str()
                .ok_or_else(|| invalid(field, path, "expected a string"))?
                .to_string(),
        ),
        FieldKind::Color => FieldValue::Color(
            serde_json::from_value::<Color>(value.clone())
                .map_err(|e| invalid(field, path, e.to_string()))?,
        ),
        FieldKind::Array => {
            if value.is_null() {
                FieldValue::Array(None)
            } else {
                let schema = field
                    .descr()
                    .record
                    .clone()
                    .ok_or_else(|| invalid(field, path, "array column without record schema"))?;
                FieldValue::Array(Some(RecordStore::load_at(schema, value, path)?))
            }
        }
    };
    field
        .set(parsed)
        .map_err(|e| invalid(field, path, e.to_string()))?;
    Ok(())
}

fn save_field(field: &TypedField) -> Option<Value> {
    match field.value() {
        FieldValue::Bool(v) => Some(Value::Bool(*v)),
        FieldValue::Int(v) | FieldValue::Enum(v) => Some(Value::from(*v)),
        FieldValue::Real(v) => Some(Value::from(*v)),
        FieldValue::String(s) | FieldValue::MultilineString(s) => Some(Value::String(s.clone())),
        FieldValue::Color(c) => serde_json::to_value(c).ok(),
        FieldValue::Array(store) => store.as_ref().map(RecordStore::to_json),
    }
}

impl Clone for RecordStore {
    /// Deep copy with a fresh identity
    fn clone(&self) -> Self {
        Self {
            id: StoreId::new(),
            schema: Arc::clone(&self.schema),
            rows: self.rows.clone(),
        }
    }
}

impl PartialEq for RecordStore {
    /// Content equality; identities are not compared
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.schema, &other.schema) || self.schema == other.schema)
            && self.rows == other.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::NumberRange;
    use serde_json::json;

    fn schema() -> Arc<ArraySchema> {
        Arc::new(
            ArraySchema::builder()
                .add_string("name", "Name", "new")
                .add_int("size", "Size", 7, NumberRange::new(0.0, 100.0, 1.0))
                .build()
                .unwrap(),
        )
    }

    fn named(store: &RecordStore) -> Vec<String> {
        store
            .rows()
            .iter()
            .map(|r| r.get(0).unwrap().as_str().unwrap().to_string())
            .collect()
    }

    fn store_of(names: &[&str]) -> RecordStore {
        let mut store = RecordStore::new(schema());
        for name in names {
            store
                .push_default()
                .unwrap()
                .get_mut(0)
                .unwrap()
                .set(FieldValue::String(name.to_string()))
                .unwrap();
        }
        store
    }

    #[test]
    fn test_resize_same_len_is_noop() {
        let mut store = store_of(&["a", "b"]);
        assert!(!store.resize(2).unwrap());
        assert_eq!(named(&store), vec!["a", "b"]);
    }

    #[test]
    fn test_resize_shrink_keeps_prefix() {
        let mut store = store_of(&["a", "b", "c", "d"]);
        assert!(store.resize(2).unwrap());
        assert_eq!(named(&store), vec!["a", "b"]);
        assert!(store.resize(0).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_resize_grow_appends_prototypes() {
        let mut store = store_of(&["a"]);
        assert!(store.resize(3).unwrap());
        assert_eq!(named(&store), vec!["a", "new", "new"]);
        assert_eq!(store.row(2).unwrap().get(1).unwrap().as_int(), Some(7));
        assert_eq!(store.row(1).unwrap(), &store.schema().new_record());
    }

    #[test]
    fn test_reconcile_reorders_and_pads() {
        let mut store = store_of(&["a", "b", "c"]);
        assert!(store.reconcile(&[Some(2), None, Some(0)]).unwrap());
        assert_eq!(named(&store), vec!["c", "new", "a"]);
    }

    #[test]
    fn test_reconcile_identity_is_unchanged() {
        let mut store = store_of(&["a", "b"]);
        assert!(!store.reconcile(&[Some(0), Some(1)]).unwrap());
    }

    #[test]
    fn test_reconcile_rejects_bad_sources() {
        let mut store = store_of(&["a", "b"]);
        assert_eq!(
            store.reconcile(&[Some(5)]),
            Err(StoreError::RowOutOfRange { index: 5, len: 2 })
        );
        assert_eq!(
            store.reconcile(&[Some(1), Some(1)]),
            Err(StoreError::DuplicateSource { index: 1 })
        );
        assert_eq!(named(&store), vec!["a", "b"]);
    }

    #[test]
    fn test_clone_gets_new_identity() {
        let store = store_of(&["a"]);
        let copy = store.clone();
        assert_ne!(store.id(), copy.id());
        assert_eq!(store, copy);
    }

    #[test]
    fn test_json_load_and_defaults() {
        let data = json!([{ "name": "x", "size": 3 }, { "name": "y" }]);
        let store = RecordStore::from_json(schema(), &data).unwrap();
        assert_eq!(named(&store), vec!["x", "y"]);
        assert_eq!(store.row(1).unwrap().get(1).unwrap().as_int(), Some(7));
        assert_eq!(store.to_json(), json!([{ "name": "x", "size": 3 }, { "name": "y", "size": 7 }]));
    }

    #[test]
    fn test_json_load_rejects_wrong_type() {
        let data = json!([{ "size": "big" }]);
        let err = RecordStore::from_json(schema(), &data).unwrap_err();
        assert!(matches!(err, LoadError::InvalidValue { ref column, .. } if column == "size"));

        let err = RecordStore::from_json(schema(), &json!({})).unwrap_err();
        assert!(matches!(err, LoadError::UnexpectedShape { .. }));
    }
}
