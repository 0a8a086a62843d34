//! # diaprops
//!
//! Editing support for array-valued properties of diagram objects: a
//! property whose value is a sequence of records sharing one schema, where
//! one column may itself hold a nested array.
//!
//! ## Architecture
//!
//! diaprops is organized as a workspace with multiple crates:
//!
//! 1. **diaprops-core** - Typed fields, schemas, record stores, properties
//! 2. **diaprops-editor** - Display tree, projection, commit, editing sessions
//! 3. **diaprops-settings** - Editor configuration
//! 4. **diaprops** - Facade and the `diaprops` command line tool

pub use diaprops_core::{
    ArrayDocument, ArrayFlavor, ArrayProperty, ArraySchema, ColumnDef, EnumData, FieldKind,
    FieldValue, NumberRange, PropDescription, Record, RecordStore, TypedField,
};
pub use diaprops_editor::{
    ArrayEditor, CellValue, CommitOutcome, DisplayTree, EditorError, EditorEvent, EventFilter,
    TreeModel, TreePath,
};
pub use diaprops_settings::{EditorSettings, ModifiedDetection};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - Console output on stderr
/// - RUST_LOG environment variable support, `default_level` otherwise
pub fn init_logging(default_level: &str) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
