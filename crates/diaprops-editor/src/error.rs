//! Error types for the array editor crate.
//!
//! This module provides structured error types for display tree
//! navigation, cell editing, structural row operations and commits.

use diaprops_core::{FieldError, StoreError};
use thiserror::Error;

use crate::tree::TreePath;
use crate::type_map::CellStorage;

/// Errors that can occur during editor operations.
#[derive(Error, Debug)]
pub enum EditorError {
    /// The path does not name a row of the display tree.
    #[error("No row at path {path}")]
    InvalidPath { path: TreePath },

    /// The column index is past the end of the level's schema.
    #[error("Column out of bounds: {column} (columns: {total})")]
    InvalidColumn { column: usize, total: usize },

    /// The column has no cell editor bound.
    #[error("Column '{column}' is read-only")]
    ReadOnlyColumn { column: String },

    /// The cell value does not fit the column storage.
    #[error("Column '{column}' stores {expected:?} cells, got {actual}")]
    CellTypeMismatch {
        column: String,
        expected: CellStorage,
        actual: &'static str,
    },

    /// The enum value is not one of the column's choices.
    #[error("Value {value} is not a choice of column '{column}'")]
    InvalidEnumValue { column: String, value: i32 },

    /// Rows cannot be added to or removed from a static array.
    #[error("Property '{property}' has a fixed length of {len} rows")]
    FixedLength { property: String, len: usize },

    /// The row has no nested column to expand.
    #[error("Row {path} has no nested column")]
    NoNestedColumn { path: TreePath },

    /// The property handed in does not use the editor's schema.
    #[error("Property '{property}' does not match the editor schema")]
    SchemaMismatch { property: String },

    /// The projected row no longer exists in the record store.
    #[error("Projected row {row} is missing from the record store")]
    StaleProjection { row: usize },

    /// A field rejected a value.
    #[error("Field error: {0}")]
    Field(#[from] FieldError),

    /// A record store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_error_display() {
        let err = EditorError::InvalidPath {
            path: TreePath::from(vec![2, 1]),
        };
        assert_eq!(err.to_string(), "No row at path 2:1");

        let err = EditorError::FixedLength {
            property: "corners".to_string(),
            len: 4,
        };
        assert_eq!(
            err.to_string(),
            "Property 'corners' has a fixed length of 4 rows"
        );

        let err = EditorError::InvalidColumn {
            column: 9,
            total: 3,
        };
        assert_eq!(err.to_string(), "Column out of bounds: 9 (columns: 3)");
    }

    #[test]
    fn test_error_conversion() {
        let store_err = StoreError::DuplicateSource { index: 1 };
        let err: EditorError = store_err.into();
        assert!(matches!(err, EditorError::Store(_)));
    }
}
