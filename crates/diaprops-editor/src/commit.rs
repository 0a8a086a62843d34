//! Tree to store commit
//!
//! Writes a display level back into its record store: the row sequence
//! is rebuilt from the node sources, then every record takes the values
//! of the node at the same position. Visited nested levels are committed
//! recursively; nested stores the tree never showed are left alone.
//! Nothing is written until the whole tree has been checked.

use diaprops_core::{
    ArraySchema, FieldError, FieldKind, FieldValue, RecordStore, StoreError, TypedField,
};

use crate::error::{EditorError, EditorResult};
use crate::tree::{CellValue, DisplayLevel, DisplayNode};
use crate::type_map::storage_for;

/// What a commit changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Row count or order changed at some level
    pub structural: bool,
    /// Number of fields whose value differs from before
    pub values_changed: usize,
    /// Nested stores created for rows inserted with children
    pub nested_created: usize,
}

impl CommitOutcome {
    /// Whether the store differs from its previous content
    pub fn modified(&self) -> bool {
        self.structural || self.values_changed > 0
    }

    fn absorb(&mut self, other: CommitOutcome) {
        self.structural |= other.structural;
        self.values_changed += other.values_changed;
        self.nested_created += other.nested_created;
    }
}

/// Commit one level and every visited level below it
///
/// The whole tree is checked against the store first; when that fails the
/// store is left exactly as it was.
pub fn commit_level(level: &DisplayLevel, store: &mut RecordStore) -> EditorResult<CommitOutcome> {
    check_level(level, Some(&*store), store.schema())?;
    apply_level(level, store)
}

/// Check that `level` can be committed into `store` without changing it
///
/// `store` is `None` for a nested level whose store does not exist yet.
pub fn check_level(
    level: &DisplayLevel,
    store: Option<&RecordStore>,
    schema: &ArraySchema,
) -> EditorResult<()> {
    let sources: Vec<Option<usize>> = level.nodes().iter().map(DisplayNode::source).collect();
    match store {
        Some(store) => store.check_sources(&sources)?,
        None => {
            if let Some(&index) = sources.iter().flatten().next() {
                return Err(StoreError::RowOutOfRange { index, len: 0 }.into());
            }
        }
    }

    for node in level.nodes() {
        for (column, proto) in schema.columns().iter().enumerate() {
            if proto.kind() == FieldKind::Array {
                let Some(children) = node.children() else {
                    continue;
                };
                let Some(record) = proto.descr().record.as_ref() else {
                    return Err(FieldError::NotAnArray {
                        field: proto.name().to_string(),
                    }
                    .into());
                };
                let nested = store
                    .zip(node.source())
                    .and_then(|(store, source)| store.row(source))
                    .and_then(|row| row.get(column))
                    .and_then(TypedField::nested);
                check_level(children, nested, record)?;
                continue;
            }

            let cell = node.cell(column).ok_or(EditorError::InvalidColumn {
                column,
                total: node.cells().len(),
            })?;
            if let Some(value) = cell_value(proto, cell)? {
                proto.check(&value)?;
            }
        }
    }
    Ok(())
}

fn apply_level(level: &DisplayLevel, store: &mut RecordStore) -> EditorResult<CommitOutcome> {
    let sources: Vec<Option<usize>> = level.nodes().iter().map(DisplayNode::source).collect();
    let mut outcome = CommitOutcome {
        structural: store.reconcile(&sources)?,
        ..CommitOutcome::default()
    };

    for (record, node) in store.rows_mut().iter_mut().zip(level.nodes()) {
        for (column, field) in record.fields_mut().iter_mut().enumerate() {
            if field.kind() == FieldKind::Array {
                let Some(children) = node.children() else {
                    continue;
                };
                let (nested, created) = field.nested_or_insert()?;
                if created {
                    outcome.nested_created += 1;
                }
                outcome.absorb(apply_level(children, nested)?);
                continue;
            }

            let Some(cell) = node.cell(column) else {
                return Err(EditorError::InvalidColumn {
                    column,
                    total: node.cells().len(),
                });
            };
            if assign_field(field, cell)? {
                outcome.values_changed += 1;
            }
        }
    }

    Ok(outcome)
}

/// Copy a cell into a field, returning whether the field changed
pub fn assign_field(field: &mut TypedField, cell: &CellValue) -> EditorResult<bool> {
    match cell_value(field, cell)? {
        Some(value) => Ok(field.set(value)?),
        None => {
            tracing::debug!(
                "No setter for {} column '{}', skipped",
                field.kind(),
                field.name()
            );
            Ok(false)
        }
    }
}

/// Field value a cell converts to, `None` for columns without a setter
fn cell_value(field: &TypedField, cell: &CellValue) -> EditorResult<Option<FieldValue>> {
    let value = match (field.kind(), cell) {
        (FieldKind::Bool, CellValue::Bool(v)) => FieldValue::Bool(*v),
        (FieldKind::Int, CellValue::Int(v)) => FieldValue::Int(*v),
        (FieldKind::Enum, CellValue::Int(v)) => FieldValue::Enum(*v),
        (FieldKind::Real, CellValue::Real(v)) => FieldValue::Real(*v),
        (FieldKind::String, CellValue::Text(s)) => FieldValue::String(s.clone()),
        (FieldKind::MultilineString, CellValue::Text(s)) => {
            FieldValue::MultilineString(s.clone())
        }
        (FieldKind::Color, _) | (FieldKind::Array, _) => return Ok(None),
        (kind, other) => {
            return Err(EditorError::CellTypeMismatch {
                column: field.name().to_string(),
                expected: storage_for(kind),
                actual: other.type_name(),
            })
        }
    };
    Ok(Some(value))
}
