//! Error handling for diaprops
//!
//! Provides error types for each layer of the property model:
//! - Schema errors (column layout and nesting rules)
//! - Field errors (value/kind mismatches)
//! - Store errors (structural changes on record stores)
//! - Load errors (reading records from serialized documents)
//!
//! All error types use `thiserror` for ergonomic error handling.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::field::FieldKind;

/// Schema error type
///
/// Raised while building an [`ArraySchema`](crate::ArraySchema). Nesting
/// violations are rejected here so that no later stage has to assert on them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// Two columns share the same name
    #[error("Duplicate column name '{name}'")]
    DuplicateColumn {
        /// The repeated column name.
        name: String,
    },

    /// More than one column is array-valued
    #[error("Schema has more than one nested column ('{first}' and '{second}')")]
    MultipleNestedColumns {
        /// The first array-valued column.
        first: String,
        /// The second array-valued column.
        second: String,
    },

    /// A nested schema contains another array column
    #[error("Nested column '{column}' contains array column '{inner}'; only one level of nesting is supported")]
    NestingTooDeep {
        /// The outer array-valued column.
        column: String,
        /// The offending inner column.
        inner: String,
    },

    /// An array column was declared without a record schema
    #[error("Array column '{column}' has no record schema")]
    MissingRecordSchema {
        /// The array-valued column.
        column: String,
    },

    /// A column definition names an unknown kind or carries the wrong default
    #[error("Invalid definition for column '{column}': {reason}")]
    InvalidDefinition {
        /// The column being defined.
        column: String,
        /// Why the definition was rejected.
        reason: String,
    },

    /// A field value does not match the column kind
    #[error(transparent)]
    Field(#[from] FieldError),
}

/// Field error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    /// Value kind differs from the field kind
    #[error("Field '{field}' is {expected:?}, got a {actual:?} value")]
    KindMismatch {
        /// The field name.
        field: String,
        /// The immutable kind of the field.
        expected: FieldKind,
        /// The kind of the rejected value.
        actual: FieldKind,
    },

    /// An enumerated value is not one of the declared choices
    #[error("Value {value} is not a choice of enum field '{field}'")]
    UnknownEnumValue {
        /// The field name.
        field: String,
        /// The rejected value.
        value: i32,
    },

    /// A nested store was requested on a field that is not array-valued
    #[error("Field '{field}' is not an array field")]
    NotAnArray {
        /// The field name.
        field: String,
    },
}

/// Store error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Growing the row sequence failed
    #[error("Failed to allocate {requested} records: {source}")]
    Allocation {
        /// Number of rows that were to be appended.
        requested: usize,
        /// The underlying allocation error.
        #[source]
        source: TryReserveError,
    },

    /// A reconcile source index points past the end of the store
    #[error("Row {index} out of range (store has {len} rows)")]
    RowOutOfRange {
        /// The offending index.
        index: usize,
        /// The store length.
        len: usize,
    },

    /// A reconcile source index was used twice
    #[error("Row {index} referenced more than once")]
    DuplicateSource {
        /// The repeated index.
        index: usize,
    },
}

/// Load error type
///
/// Represents failures while reading records from a JSON document.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The document is not shaped like a record list
    #[error("Expected {expected} at {path}")]
    UnexpectedShape {
        /// What was expected (e.g. "an array of records").
        expected: String,
        /// Location in the document.
        path: String,
    },

    /// A value has the wrong JSON type for its column
    #[error("Column '{column}' at {path}: {reason}")]
    InvalidValue {
        /// The column being read.
        column: String,
        /// Location in the document.
        path: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// JSON parsing failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document declares an invalid schema
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Building the store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Main error type for diaprops
///
/// A unified error type that can represent any error from the model layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Schema error
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Field error
    #[error(transparent)]
    Field(#[from] FieldError),

    /// Store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Load error
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a schema error
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Error::Schema(_) | Error::Load(LoadError::Schema(_)))
    }

    /// Check if this is a resource exhaustion error
    pub fn is_allocation_error(&self) -> bool {
        matches!(
            self,
            Error::Store(StoreError::Allocation { .. })
                | Error::Load(LoadError::Store(StoreError::Allocation { .. }))
        )
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
