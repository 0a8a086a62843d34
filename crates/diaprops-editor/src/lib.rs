//! # diaprops Editor
//!
//! Interactive editing of array-valued properties.
//!
//! An [`ArrayEditor`] projects the records of an [`ArrayProperty`] into a
//! [`DisplayTree`], lets the host apply row operations and cell edits to
//! the tree, and commits the result back on request. Nested array columns
//! become child rows, created lazily the first time a row is expanded.
//!
//! The host toolkit talks to the tree through [`TreeModel`] and listens to
//! [`EditorEvent`]s instead of toolkit signals.
//!
//! [`ArrayProperty`]: diaprops_core::ArrayProperty

pub mod commit;
pub mod error;
pub mod events;
pub mod projection;
pub mod session;
pub mod tree;
pub mod type_map;

pub use commit::{assign_field, check_level, commit_level, CommitOutcome};
pub use error::{EditorError, EditorResult};
pub use events::{EditorEvent, EditorListeners, EventCategory, EventFilter, SubscriptionId};
pub use projection::{cell_from_field, project_record, project_store};
pub use session::ArrayEditor;
pub use tree::{CellValue, DisplayLevel, DisplayNode, DisplayTree, TreeModel, TreePath};
pub use type_map::{bind_columns, editor_for, storage_for, CellEditor, CellStorage, ColumnBinding};
