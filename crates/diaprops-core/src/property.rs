//! Array-valued properties
//!
//! An [`ArrayProperty`] is what a diagram object hands out for a
//! list-shaped attribute: a descriptor, the record schema, the
//! authoritative [`RecordStore`] and the property's experience flags.
//!
//! Two flavors exist:
//! - **Static** arrays have a fixed row count set by the object type
//! - **Dynamic** arrays grow and shrink freely

use std::sync::Arc;

use serde_json::Value;

use crate::descriptor::PropDescription;
use crate::error::{LoadError, StoreError};
use crate::schema::ArraySchema;
use crate::store::RecordStore;

/// Static or dynamic array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayFlavor {
    /// Fixed number of rows
    Static {
        /// Row count, never changed by editing
        len: usize,
    },
    /// Variable number of rows
    Dynamic,
}

impl ArrayFlavor {
    pub fn is_resizable(&self) -> bool {
        matches!(self, ArrayFlavor::Dynamic)
    }
}

/// An array-valued property of a diagram object
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayProperty {
    descr: Arc<PropDescription>,
    flavor: ArrayFlavor,
    records: RecordStore,
    not_set: bool,
}

impl ArrayProperty {
    /// Create a dynamic array property with no rows
    pub fn dynamic(descr: PropDescription, schema: Arc<ArraySchema>) -> Self {
        let descr = Arc::new(descr.with_record(Arc::clone(&schema)));
        Self {
            descr,
            flavor: ArrayFlavor::Dynamic,
            records: RecordStore::new(schema),
            not_set: true,
        }
    }

    /// Create a static array property holding `len` default rows
    pub fn fixed(
        descr: PropDescription,
        schema: Arc<ArraySchema>,
        len: usize,
    ) -> Result<Self, StoreError> {
        let descr = Arc::new(descr.with_record(Arc::clone(&schema)));
        Ok(Self {
            descr,
            flavor: ArrayFlavor::Static { len },
            records: RecordStore::with_len(schema, len)?,
            not_set: true,
        })
    }

    pub fn descr(&self) -> &PropDescription {
        &self.descr
    }

    pub fn name(&self) -> &str {
        &self.descr.name
    }

    pub fn flavor(&self) -> ArrayFlavor {
        self.flavor
    }

    pub fn schema(&self) -> &Arc<ArraySchema> {
        self.records.schema()
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut RecordStore {
        &mut self.records
    }

    /// Whether the property still holds its initial, never-edited value
    pub fn is_not_set(&self) -> bool {
        self.not_set
    }

    /// Record that the property now carries a user value
    pub fn mark_set(&mut self) {
        if self.not_set {
            tracing::debug!("Property '{}' marked as set", self.descr.name);
        }
        self.not_set = false;
    }

    /// Whether two properties can be edited together in one dialog
    ///
    /// Static arrays require the very same record schema; dynamic arrays
    /// always merge.
    pub fn can_merge(&self, other: &ArrayProperty) -> bool {
        match (self.flavor, other.flavor) {
            (ArrayFlavor::Dynamic, ArrayFlavor::Dynamic) => true,
            _ => Arc::ptr_eq(self.schema(), other.schema()) && self.flavor == other.flavor,
        }
    }

    /// Replace the records from a JSON array of objects
    ///
    /// Static arrays keep their declared length: extra rows are dropped and
    /// missing rows are filled with defaults.
    pub fn load(&mut self, data: &Value) -> Result<(), LoadError> {
        let mut records = RecordStore::from_json(Arc::clone(self.schema()), data)?;
        if let ArrayFlavor::Static { len } = self.flavor {
            if records.len() != len {
                tracing::warn!(
                    "Static array '{}' loaded {} rows, expected {}",
                    self.descr.name,
                    records.len(),
                    len
                );
                records.resize(len)?;
            }
        }
        self.records = records;
        self.not_set = false;
        Ok(())
    }

    /// Save the records as a JSON array of objects
    pub fn save(&self) -> Value {
        self.records.to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Arc<ArraySchema> {
        Arc::new(
            ArraySchema::builder()
                .add_string("name", "Name", "")
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_fixed_starts_with_defaults() {
        let prop = ArrayProperty::fixed(PropDescription::new("corners", "Corners"), schema(), 4)
            .unwrap();
        assert_eq!(prop.records().len(), 4);
        assert!(prop.is_not_set());
        assert!(!prop.flavor().is_resizable());
        assert!(prop.descr().record.is_some());
    }

    #[test]
    fn test_can_merge() {
        let shared = schema();
        let a = ArrayProperty::fixed(PropDescription::new("a", "A"), Arc::clone(&shared), 2)
            .unwrap();
        let b = ArrayProperty::fixed(PropDescription::new("a", "A"), Arc::clone(&shared), 2)
            .unwrap();
        let c = ArrayProperty::fixed(PropDescription::new("a", "A"), schema(), 2).unwrap();
        assert!(a.can_merge(&b));
        assert!(!a.can_merge(&c));

        let d1 = ArrayProperty::dynamic(PropDescription::new("d", "D"), schema());
        let d2 = ArrayProperty::dynamic(PropDescription::new("d", "D"), schema());
        assert!(d1.can_merge(&d2));
    }

    #[test]
    fn test_load_marks_set_and_keeps_static_len() {
        let mut prop =
            ArrayProperty::fixed(PropDescription::new("pair", "Pair"), schema(), 2).unwrap();
        prop.load(&json!([{ "name": "a" }, { "name": "b" }, { "name": "c" }]))
            .unwrap();
        assert!(!prop.is_not_set());
        assert_eq!(prop.save(), json!([{ "name": "a" }, { "name": "b" }]));
    }
}
