//! Store to tree projection
//!
//! Builds display levels from record stores. Nested columns are followed
//! only where a nested store already exists; unvisited arrays stay
//! collapsed until the editor expands them.

use std::sync::Arc;

use diaprops_core::{FieldValue, Record, RecordStore, TypedField};

use crate::tree::{CellValue, DisplayLevel, DisplayNode};

/// Cell shown for one field
pub fn cell_from_field(field: &TypedField) -> CellValue {
    match field.value() {
        FieldValue::Bool(v) => CellValue::Bool(*v),
        FieldValue::Int(v) | FieldValue::Enum(v) => CellValue::Int(*v),
        FieldValue::Real(v) => CellValue::Real(*v),
        FieldValue::String(s) | FieldValue::MultilineString(s) => CellValue::Text(s.clone()),
        FieldValue::Array(_) => CellValue::Nested,
        FieldValue::Color(_) => CellValue::Opaque,
    }
}

/// Node for the record at `row`, with its nested rows if materialized
pub fn project_record(record: &Record, row: usize) -> DisplayNode {
    let cells = record.fields().iter().map(cell_from_field).collect();
    let mut node = DisplayNode::new(Some(row), cells);
    if let Some(nested) = record.fields().iter().find_map(TypedField::nested) {
        node.set_children(project_store(nested));
    }
    node
}

/// One node per record, in store order
pub fn project_store(store: &RecordStore) -> DisplayLevel {
    let nodes = store
        .rows()
        .iter()
        .enumerate()
        .map(|(row, record)| project_record(record, row))
        .collect();
    DisplayLevel::with_nodes(Arc::clone(store.schema()), nodes)
}
