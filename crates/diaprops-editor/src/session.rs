//! Array editing session
//!
//! An [`ArrayEditor`] owns one array property for the duration of an edit:
//! it projects the property's records into a [`DisplayTree`], applies row
//! operations and cell edits to that tree only, and writes the result
//! back when the host asks for it.
//!
//! Row operations work on the active row: the selected row, or the first
//! top-level row when nothing is selected.

use std::sync::Arc;

use diaprops_core::{ArrayFlavor, ArrayProperty, ArraySchema};
use diaprops_settings::{EditorSettings, ModifiedDetection};

use crate::commit::commit_level;
use crate::error::{EditorError, EditorResult};
use crate::events::{EditorEvent, EditorListeners, EventFilter, SubscriptionId};
use crate::projection::project_store;
use crate::tree::{CellValue, DisplayLevel, DisplayTree, TreePath};
use crate::type_map::{bind_columns, CellEditor, CellStorage, ColumnBinding};

/// Editing session over one array property
#[derive(Debug)]
pub struct ArrayEditor {
    property: ArrayProperty,
    settings: EditorSettings,
    tree: DisplayTree,
    columns: Vec<ColumnBinding>,
    nested_columns: Option<Vec<ColumnBinding>>,
    selection: Option<TreePath>,
    edited: bool,
    materialized: usize,
    listeners: EditorListeners,
}

fn warn_unmapped(property: &str, schema: &ArraySchema, columns: &[ColumnBinding]) {
    for column in columns.iter().filter(|c| c.is_unmapped()) {
        tracing::warn!(
            "Column '{}' ({}) of '{}' has no cell editor and is kept read-only",
            column.name,
            column.kind,
            property
        );
    }
    tracing::debug!(
        "Bound {} of {} columns for '{}'",
        columns.iter().filter(|c| c.is_editable()).count(),
        schema.len(),
        property
    );
}

impl ArrayEditor {
    /// Build an editor over `property`
    pub fn for_property(property: ArrayProperty, settings: EditorSettings) -> Self {
        let schema = Arc::clone(property.schema());
        let columns = bind_columns(&schema);
        let nested_columns = schema.nested_schema().map(|nested| bind_columns(nested));

        if settings.warn_unmapped_columns {
            warn_unmapped(property.name(), &schema, &columns);
            if let (Some(nested), Some(bound)) = (schema.nested_schema(), &nested_columns) {
                warn_unmapped(property.name(), nested, bound);
            }
        }

        let tree = DisplayTree::new(project_store(property.records()));
        tracing::debug!(
            "Opened editor for '{}' with {} rows",
            property.name(),
            tree.root().len()
        );

        Self {
            property,
            settings,
            tree,
            columns,
            nested_columns,
            selection: None,
            edited: false,
            materialized: 0,
            listeners: EditorListeners::new(),
        }
    }

    pub fn property(&self) -> &ArrayProperty {
        &self.property
    }

    /// Close the session and hand the property back
    pub fn into_property(self) -> ArrayProperty {
        self.property
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn tree(&self) -> &DisplayTree {
        &self.tree
    }

    /// Column bindings of the top level
    pub fn columns(&self) -> &[ColumnBinding] {
        &self.columns
    }

    /// Column bindings of nested levels, if the schema has a nested column
    pub fn nested_columns(&self) -> Option<&[ColumnBinding]> {
        self.nested_columns.as_deref()
    }

    /// Column bindings for the level `path` lives in
    pub fn bindings_for(&self, path: &TreePath) -> Option<&[ColumnBinding]> {
        match path.depth() {
            1 => Some(self.columns.as_slice()),
            2 => self.nested_columns(),
            _ => None,
        }
    }

    pub fn selection(&self) -> Option<&TreePath> {
        self.selection.as_ref()
    }

    /// Whether cells or rows changed since the last reset or commit
    pub fn is_edited(&self) -> bool {
        self.edited
    }

    /// Number of nested stores this session created
    pub fn materialized_count(&self) -> usize {
        self.materialized
    }

    pub fn subscribe<F>(&mut self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: FnMut(&EditorEvent) + 'static,
    {
        self.listeners.subscribe(filter, handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    fn emit(&mut self, event: EditorEvent) {
        self.listeners.emit(&event);
    }

    /// Re-project the stored records, discarding unsaved edits
    pub fn reset_from_property(&mut self) {
        self.tree = DisplayTree::new(project_store(self.property.records()));
        self.selection = None;
        self.edited = false;
        tracing::debug!("Reset editor for '{}'", self.property.name());
        self.emit(EditorEvent::Reset);
    }

    /// Commit the tree into the property
    ///
    /// Returns whether the property was modified. A modified commit clears
    /// the property's not-set flag.
    pub fn write_to_property(&mut self) -> EditorResult<bool> {
        let outcome = commit_level(self.tree.root(), self.property.records_mut())?;
        let modified = match self.settings.modified_detection {
            ModifiedDetection::CompareValues => outcome.modified(),
            ModifiedDetection::AnyEdit => outcome.modified() || self.edited,
        };
        if modified {
            self.property.mark_set();
        }
        self.tree.root_mut().mark_synchronized();
        self.edited = false;

        tracing::info!(
            "Committed '{}': {} rows, {} values changed, structural: {}, modified: {}",
            self.property.name(),
            self.property.records().len(),
            outcome.values_changed,
            outcome.structural,
            modified
        );
        self.emit(EditorEvent::Committed { modified });
        Ok(modified)
    }

    /// Row operations act on this path
    pub fn active_path(&self) -> Option<TreePath> {
        match &self.selection {
            Some(path) if self.tree.node(path).is_some() => Some(path.clone()),
            _ => (!self.tree.root().is_empty()).then(|| TreePath::root(0)),
        }
    }

    /// Change the selection, expanding the newly selected row
    pub fn select(&mut self, path: Option<TreePath>) -> EditorResult<()> {
        if let Some(path) = &path {
            if self.tree.node(path).is_none() {
                return Err(EditorError::InvalidPath { path: path.clone() });
            }
            let has_nested = self
                .tree
                .schema_at(path)
                .is_some_and(|schema| schema.nested_column().is_some());
            if has_nested {
                self.expand(path)?;
            }
        }
        self.selection = path.clone();
        self.emit(EditorEvent::SelectionChanged { path });
        Ok(())
    }

    /// Show the nested rows of `path`, creating its nested store if needed
    ///
    /// Returns whether a nested store was created. A row keeps the same
    /// nested store however often it is expanded.
    pub fn expand(&mut self, path: &TreePath) -> EditorResult<bool> {
        let schema = self
            .tree
            .schema_at(path)
            .cloned()
            .ok_or_else(|| EditorError::InvalidPath { path: path.clone() })?;
        let Some(column) = schema.nested_column() else {
            return Err(EditorError::NoNestedColumn { path: path.clone() });
        };
        let node = self
            .tree
            .node_mut(path)
            .ok_or_else(|| EditorError::InvalidPath { path: path.clone() })?;
        if node.children().is_some() {
            return Ok(false);
        }

        let Some(row) = node.source() else {
            // store is created on commit
            let nested_schema = schema
                .nested_schema()
                .cloned()
                .ok_or_else(|| EditorError::NoNestedColumn { path: path.clone() })?;
            node.set_children(DisplayLevel::new(nested_schema));
            return Ok(false);
        };

        let records = self.property.records_mut();
        let len = records.len();
        let field = records
            .row_mut(row)
            .and_then(|record| record.get_mut(column))
            .ok_or(EditorError::StaleProjection { row })?;
        let (store, created) = field.nested_or_insert()?;
        let store_id = store.id();
        node.set_children(project_store(store));

        if created {
            self.materialized += 1;
            tracing::debug!("Materialized {} for row {} of {} rows", store_id, path, len);
            self.emit(EditorEvent::NestedMaterialized {
                path: path.clone(),
                store: store_id,
            });
        }
        Ok(created)
    }

    /// Nested rows shown for `path`, `None` if it was never expanded
    pub fn nested_view(&self, path: &TreePath) -> Option<&DisplayLevel> {
        self.tree.node(path)?.children()
    }

    fn check_resizable(&self, parent: Option<&TreePath>) -> EditorResult<()> {
        match (parent, self.property.flavor()) {
            (None, ArrayFlavor::Static { len }) => Err(EditorError::FixedLength {
                property: self.property.name().to_string(),
                len,
            }),
            _ => Ok(()),
        }
    }

    /// Insert a blank row after the active row, or first if there is none
    pub fn insert_row(&mut self) -> EditorResult<TreePath> {
        match self.active_path() {
            Some(active) => self.insert_at(active.parent(), active.index() + 1),
            None => self.insert_at(None, 0),
        }
    }

    /// Insert a blank nested row under `parent`
    ///
    /// The row goes after the selected child of `parent`, or first when no
    /// child is selected. Expands `parent` if needed.
    pub fn insert_child(&mut self, parent: &TreePath) -> EditorResult<TreePath> {
        self.expand(parent)?;
        let index = match &self.selection {
            Some(selected) if selected.parent().as_ref() == Some(parent) => selected.index() + 1,
            _ => 0,
        };
        self.insert_at(Some(parent.clone()), index)
    }

    fn insert_at(&mut self, parent: Option<TreePath>, index: usize) -> EditorResult<TreePath> {
        self.check_resizable(parent.as_ref())?;

        let path = match &parent {
            Some(parent) => parent.child(index),
            None => TreePath::root(index),
        };
        let level = self
            .tree
            .level_mut(parent.as_ref())
            .ok_or_else(|| EditorError::InvalidPath { path: path.clone() })?;
        let node = level.new_node();
        level.insert(index, node);

        self.edited = true;
        tracing::debug!("Inserted row {}", path);
        self.emit(EditorEvent::RowInserted { path: path.clone() });

        if self.settings.select_inserted_row {
            self.select(Some(path.clone()))?;
        }
        Ok(path)
    }

    /// Remove the active row and select the row that followed it
    pub fn remove_row(&mut self) -> EditorResult<Option<TreePath>> {
        let Some(active) = self.active_path() else {
            return Ok(None);
        };
        let parent = active.parent();
        self.check_resizable(parent.as_ref())?;

        let level = self
            .tree
            .level_mut(parent.as_ref())
            .ok_or_else(|| EditorError::InvalidPath {
                path: active.clone(),
            })?;
        if level.remove(active.index()).is_none() {
            return Err(EditorError::InvalidPath { path: active });
        }
        let remaining = level.len();

        self.edited = true;
        tracing::debug!("Removed row {}", active);
        self.emit(EditorEvent::RowRemoved {
            path: active.clone(),
        });

        let next = (active.index() < remaining).then(|| active.clone());
        self.select(next.clone())?;
        Ok(next)
    }

    /// Swap the active row with its predecessor
    ///
    /// Returns false when the row is already first.
    pub fn move_up(&mut self) -> EditorResult<bool> {
        match self.active_path() {
            Some(active) if active.index() > 0 => {
                let to = active.index() - 1;
                self.move_row(active, to)
            }
            _ => Ok(false),
        }
    }

    /// Swap the active row with its successor
    ///
    /// Returns false when the row is already last.
    pub fn move_down(&mut self) -> EditorResult<bool> {
        let Some(active) = self.active_path() else {
            return Ok(false);
        };
        let siblings = self.tree.level(active.parent().as_ref()).map_or(0, DisplayLevel::len);
        if active.index() + 1 >= siblings {
            return Ok(false);
        }
        let to = active.index() + 1;
        self.move_row(active, to)
    }

    fn move_row(&mut self, from: TreePath, to: usize) -> EditorResult<bool> {
        let level = self
            .tree
            .level_mut(from.parent().as_ref())
            .ok_or_else(|| EditorError::InvalidPath { path: from.clone() })?;
        level.swap(from.index(), to);

        let to = from.sibling(to);
        self.edited = true;
        tracing::debug!("Moved row {} to {}", from, to);
        self.emit(EditorEvent::RowMoved {
            from,
            to: to.clone(),
        });
        self.selection = Some(to.clone());
        self.emit(EditorEvent::SelectionChanged { path: Some(to) });
        Ok(true)
    }

    pub fn cell(&self, path: &TreePath, column: usize) -> Option<&CellValue> {
        self.tree.node(path)?.cell(column)
    }

    /// Text shown for a cell; enum cells show their label
    pub fn display_text(&self, path: &TreePath, column: usize) -> Option<String> {
        let cell = self.cell(path, column)?;
        let binding = self.bindings_for(path)?.get(column)?;
        match (&binding.editor, cell) {
            (Some(CellEditor::EnumCombo(choices)), CellValue::Int(v)) => Some(
                choices
                    .label_for(*v)
                    .map_or_else(|| v.to_string(), str::to_string),
            ),
            _ => Some(cell.to_string()),
        }
    }

    /// Edit one cell
    ///
    /// The value must match the column storage; numbers are clamped to the
    /// column range and enum values must be one of the choices. Returns
    /// whether the cell changed.
    pub fn set_cell(
        &mut self,
        path: &TreePath,
        column: usize,
        value: CellValue,
    ) -> EditorResult<bool> {
        let value = {
            let bindings = self
                .bindings_for(path)
                .ok_or_else(|| EditorError::InvalidPath { path: path.clone() })?;
            let binding = bindings.get(column).ok_or(EditorError::InvalidColumn {
                column,
                total: bindings.len(),
            })?;
            let Some(editor) = &binding.editor else {
                return Err(EditorError::ReadOnlyColumn {
                    column: binding.name.clone(),
                });
            };
            if value.storage() != binding.storage {
                return Err(EditorError::CellTypeMismatch {
                    column: binding.name.clone(),
                    expected: binding.storage,
                    actual: value.type_name(),
                });
            }
            match (editor, value) {
                (CellEditor::Spin { range, .. }, CellValue::Int(v)) => {
                    CellValue::Int(range.clamp_int(v))
                }
                (CellEditor::Spin { range, .. }, CellValue::Real(v)) => {
                    CellValue::Real(range.clamp(v))
                }
                (CellEditor::EnumCombo(choices), CellValue::Int(v)) => {
                    if !choices.is_empty() && !choices.contains(v) {
                        return Err(EditorError::InvalidEnumValue {
                            column: binding.name.clone(),
                            value: v,
                        });
                    }
                    CellValue::Int(v)
                }
                (_, value) => value,
            }
        };

        let cell = self
            .tree
            .node_mut(path)
            .and_then(|node| node.cell_mut(column))
            .ok_or_else(|| EditorError::InvalidPath { path: path.clone() })?;
        if *cell == value {
            return Ok(false);
        }
        *cell = value;
        self.edited = true;
        self.emit(EditorEvent::CellEdited {
            path: path.clone(),
            column,
        });
        Ok(true)
    }

    /// Flip a boolean cell
    pub fn toggle(&mut self, path: &TreePath, column: usize) -> EditorResult<bool> {
        match self.cell(path, column).cloned() {
            Some(CellValue::Bool(v)) => self.set_cell(path, column, CellValue::Bool(!v)),
            Some(other) => Err(EditorError::CellTypeMismatch {
                column: self
                    .bindings_for(path)
                    .and_then(|b| b.get(column))
                    .map(|b| b.name.clone())
                    .unwrap_or_default(),
                expected: CellStorage::Bool,
                actual: other.type_name(),
            }),
            None => Err(EditorError::InvalidPath { path: path.clone() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diaprops_core::{NumberRange, PropDescription};

    fn editor(rows: usize) -> ArrayEditor {
        let schema = Arc::new(
            ArraySchema::builder()
                .add_string("name", "Name", "row")
                .add_int("size", "Size", 1, NumberRange::new(0.0, 10.0, 1.0))
                .build()
                .unwrap(),
        );
        let mut property = ArrayProperty::dynamic(PropDescription::new("items", "Items"), schema);
        property.records_mut().resize(rows).unwrap();
        ArrayEditor::for_property(property, EditorSettings::default())
    }

    #[test]
    fn test_active_path_defaults_to_first_row() {
        assert_eq!(editor(2).active_path(), Some(TreePath::root(0)));
        assert_eq!(editor(0).active_path(), None);
    }

    #[test]
    fn test_insert_into_empty_array() {
        let mut editor = editor(0);
        let path = editor.insert_row().unwrap();
        assert_eq!(path, TreePath::root(0));
        assert_eq!(editor.selection(), Some(&path));
        assert!(editor.is_edited());
    }

    #[test]
    fn test_set_cell_clamps_to_range() {
        let mut editor = editor(1);
        let path = TreePath::root(0);
        assert!(editor.set_cell(&path, 1, CellValue::Int(42)).unwrap());
        assert_eq!(editor.cell(&path, 1), Some(&CellValue::Int(10)));
        assert!(!editor.set_cell(&path, 1, CellValue::Int(10)).unwrap());
    }

    #[test]
    fn test_set_cell_rejects_wrong_storage() {
        let mut editor = editor(1);
        let err = editor
            .set_cell(&TreePath::root(0), 0, CellValue::Bool(true))
            .unwrap_err();
        assert!(matches!(err, EditorError::CellTypeMismatch { .. }));
        assert!(!editor.is_edited());
    }

    #[test]
    fn test_select_invalid_path() {
        let mut editor = editor(1);
        assert!(matches!(
            editor.select(Some(TreePath::root(4))),
            Err(EditorError::InvalidPath { .. })
        ));
        assert_eq!(editor.selection(), None);
    }

    #[test]
    fn test_expand_without_nested_column() {
        let mut editor = editor(1);
        assert!(matches!(
            editor.expand(&TreePath::root(0)),
            Err(EditorError::NoNestedColumn { .. })
        ));
    }
}
