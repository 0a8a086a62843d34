//! # diaprops Core
//!
//! The property model behind array-valued diagram attributes:
//! typed fields, array schemas, records, record stores and the
//! array property that owns them.
//!
//! ## Ownership
//!
//! ```text
//! ArrayProperty
//!   └── RecordStore (shares Arc<ArraySchema>)
//!         └── Record
//!               └── TypedField
//!                     └── RecordStore (nested column only, created lazily)
//! ```

pub mod definition;
pub mod descriptor;
pub mod error;
pub mod field;
pub mod property;
pub mod record;
pub mod schema;
pub mod store;

pub use definition::{schema_from_defs, ArrayDocument, ColumnDef};
pub use descriptor::{EnumChoice, EnumData, NumberRange, PropDescription};
pub use error::{Error, FieldError, LoadError, Result, SchemaError, StoreError};
pub use field::{Color, FieldKind, FieldValue, TypedField};
pub use property::{ArrayFlavor, ArrayProperty};
pub use record::Record;
pub use schema::{ArraySchema, SchemaBuilder};
pub use store::{RecordStore, StoreId};
