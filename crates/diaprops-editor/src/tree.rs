//! Display tree
//!
//! The editable projection of record stores. Each [`DisplayLevel`] is
//! the row list of one store; a node of the outer level may carry the
//! level of its nested column once that column has been visited.
//!
//! Nodes remember the store row they were projected from so that commits
//! can carry records along when rows are reordered.

use std::fmt;
use std::sync::Arc;

use diaprops_core::ArraySchema;

use crate::projection::cell_from_field;
use crate::type_map::CellStorage;

/// Value shown in one cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Bool(bool),
    /// Integers and enum values
    Int(i32),
    Real(f64),
    /// Single and multi line strings
    Text(String),
    /// Opaque handle to the row's nested array
    Nested,
    /// Column with no cell representation
    Opaque,
}

impl CellValue {
    pub fn storage(&self) -> CellStorage {
        match self {
            Self::Bool(_) => CellStorage::Bool,
            Self::Int(_) => CellStorage::Int,
            Self::Real(_) => CellStorage::Real,
            Self::Text(_) => CellStorage::Text,
            Self::Nested => CellStorage::Nested,
            Self::Opaque => CellStorage::Opaque,
        }
    }

    /// Short type name used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Real(_) => "real",
            Self::Text(_) => "text",
            Self::Nested => "nested",
            Self::Opaque => "opaque",
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", if *v { "[x]" } else { "[ ]" }),
            Self::Int(v) => write!(f, "{}", v),
            Self::Real(v) => write!(f, "{}", v),
            Self::Text(s) => write!(f, "{:?}", s),
            Self::Nested => write!(f, "..."),
            Self::Opaque => write!(f, "-"),
        }
    }
}

/// Position of a row: one index per tree depth
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TreePath(Vec<usize>);

impl TreePath {
    /// Path of a top-level row
    pub fn root(index: usize) -> Self {
        Self(vec![index])
    }

    /// Path of a child row of this one
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Path of the same-level row at `index`
    pub fn sibling(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        if let Some(last) = indices.last_mut() {
            *last = index;
        }
        Self(indices)
    }

    /// Parent path, `None` for top-level rows
    pub fn parent(&self) -> Option<Self> {
        (self.0.len() > 1).then(|| Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Index within the parent level
    pub fn index(&self) -> usize {
        self.0.last().copied().unwrap_or(0)
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for TreePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", parts.join(":"))
    }
}

/// One displayed row
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayNode {
    source: Option<usize>,
    cells: Vec<CellValue>,
    children: Option<DisplayLevel>,
}

impl DisplayNode {
    pub(crate) fn new(source: Option<usize>, cells: Vec<CellValue>) -> Self {
        Self {
            source,
            cells,
            children: None,
        }
    }

    /// Store row this node was projected from, `None` for inserted rows
    pub fn source(&self) -> Option<usize> {
        self.source
    }

    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }

    pub fn cell(&self, column: usize) -> Option<&CellValue> {
        self.cells.get(column)
    }

    pub(crate) fn cell_mut(&mut self, column: usize) -> Option<&mut CellValue> {
        self.cells.get_mut(column)
    }

    /// Rows of the nested column, present once visited
    pub fn children(&self) -> Option<&DisplayLevel> {
        self.children.as_ref()
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut DisplayLevel> {
        self.children.as_mut()
    }

    pub(crate) fn set_children(&mut self, level: DisplayLevel) {
        self.children = Some(level);
    }
}

/// Sibling rows projected from one record store
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayLevel {
    schema: Arc<ArraySchema>,
    nodes: Vec<DisplayNode>,
}

impl DisplayLevel {
    pub fn new(schema: Arc<ArraySchema>) -> Self {
        Self {
            schema,
            nodes: Vec::new(),
        }
    }

    pub(crate) fn with_nodes(schema: Arc<ArraySchema>, nodes: Vec<DisplayNode>) -> Self {
        Self { schema, nodes }
    }

    pub fn schema(&self) -> &Arc<ArraySchema> {
        &self.schema
    }

    pub fn nodes(&self) -> &[DisplayNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&DisplayNode> {
        self.nodes.get(index)
    }

    pub(crate) fn node_mut(&mut self, index: usize) -> Option<&mut DisplayNode> {
        self.nodes.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Blank row holding the schema defaults
    pub(crate) fn new_node(&self) -> DisplayNode {
        DisplayNode::new(
            None,
            self.schema.columns().iter().map(cell_from_field).collect(),
        )
    }

    pub(crate) fn insert(&mut self, index: usize, node: DisplayNode) {
        let index = index.min(self.nodes.len());
        self.nodes.insert(index, node);
    }

    pub(crate) fn remove(&mut self, index: usize) -> Option<DisplayNode> {
        (index < self.nodes.len()).then(|| self.nodes.remove(index))
    }

    pub(crate) fn swap(&mut self, a: usize, b: usize) {
        self.nodes.swap(a, b);
    }

    /// Point every node at its own position, after a commit
    pub(crate) fn mark_synchronized(&mut self) {
        for (pos, node) in self.nodes.iter_mut().enumerate() {
            node.source = Some(pos);
            if let Some(children) = node.children.as_mut() {
                children.mark_synchronized();
            }
        }
    }
}

/// Whole projection of one array property
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayTree {
    root: DisplayLevel,
}

impl DisplayTree {
    pub fn new(root: DisplayLevel) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &DisplayLevel {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut DisplayLevel {
        &mut self.root
    }

    /// Level holding the children of `parent`, or the root level
    pub fn level(&self, parent: Option<&TreePath>) -> Option<&DisplayLevel> {
        match parent {
            None => Some(&self.root),
            Some(path) => self.node(path)?.children(),
        }
    }

    pub(crate) fn level_mut(&mut self, parent: Option<&TreePath>) -> Option<&mut DisplayLevel> {
        match parent {
            None => Some(&mut self.root),
            Some(path) => self.node_mut(path)?.children_mut(),
        }
    }

    pub fn node(&self, path: &TreePath) -> Option<&DisplayNode> {
        let (last, ancestors) = path.indices().split_last()?;
        let mut level = &self.root;
        for &idx in ancestors {
            level = level.node(idx)?.children()?;
        }
        level.node(*last)
    }

    pub(crate) fn node_mut(&mut self, path: &TreePath) -> Option<&mut DisplayNode> {
        let (last, ancestors) = path.indices().split_last()?;
        let mut level = &mut self.root;
        for &idx in ancestors {
            level = level.node_mut(idx)?.children_mut()?;
        }
        level.node_mut(*last)
    }

    /// Schema of the level `path` lives in
    pub fn schema_at(&self, path: &TreePath) -> Option<&Arc<ArraySchema>> {
        self.level(path.parent().as_ref()).map(DisplayLevel::schema)
    }

    /// Render the tree as indented text, one row per line
    pub fn render(&self) -> String {
        let mut out = String::new();
        render_level(&self.root, &mut Vec::new(), &mut out);
        out
    }
}

fn render_level(level: &DisplayLevel, prefix: &mut Vec<usize>, out: &mut String) {
    for (idx, node) in level.nodes().iter().enumerate() {
        prefix.push(idx);
        let path = TreePath::from(prefix.clone());
        let cells: Vec<String> = level
            .schema()
            .columns()
            .iter()
            .zip(node.cells())
            .filter(|(_, cell)| !matches!(cell, CellValue::Opaque))
            .map(|(column, cell)| format!("{}={}", column.name(), cell))
            .collect();
        out.push_str(&"  ".repeat(prefix.len() - 1));
        out.push_str(&format!("{} {}\n", path, cells.join(" ")));
        if let Some(children) = node.children() {
            render_level(children, prefix, out);
        }
        prefix.pop();
    }
}

/// Row and cell access for a host tree widget
pub trait TreeModel {
    /// Number of rows under `parent` (the top level for `None`)
    fn row_count(&self, parent: Option<&TreePath>) -> usize;

    /// Cell at `path` and `column`
    fn cell(&self, path: &TreePath, column: usize) -> Option<&CellValue>;

    /// Store `value` if the path exists and the storage type matches
    fn set_cell(&mut self, path: &TreePath, column: usize, value: CellValue) -> bool;

    /// Whether the nested rows of `path` have been materialized
    fn is_expanded(&self, path: &TreePath) -> bool;
}

impl TreeModel for DisplayTree {
    fn row_count(&self, parent: Option<&TreePath>) -> usize {
        self.level(parent).map_or(0, DisplayLevel::len)
    }

    fn cell(&self, path: &TreePath, column: usize) -> Option<&CellValue> {
        self.node(path)?.cell(column)
    }

    fn set_cell(&mut self, path: &TreePath, column: usize, value: CellValue) -> bool {
        match self.node_mut(path).and_then(|node| node.cell_mut(column)) {
            Some(cell) if cell.storage() == value.storage() => {
                *cell = value;
                true
            }
            _ => false,
        }
    }

    fn is_expanded(&self, path: &TreePath) -> bool {
        self.node(path).is_some_and(|node| node.children().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_navigation() {
        let path = TreePath::root(2).child(5);
        assert_eq!(path.depth(), 2);
        assert_eq!(path.index(), 5);
        assert_eq!(path.parent(), Some(TreePath::root(2)));
        assert_eq!(path.sibling(1), TreePath::from(vec![2, 1]));
        assert_eq!(TreePath::root(0).parent(), None);
        assert_eq!(path.to_string(), "2:5");
    }

    #[test]
    fn test_set_cell_checks_storage() {
        let schema = Arc::new(
            ArraySchema::builder()
                .add_bool("on", "On", false)
                .build()
                .unwrap(),
        );
        let mut level = DisplayLevel::new(Arc::clone(&schema));
        let node = level.new_node();
        level.insert(0, node);
        let mut tree = DisplayTree::new(level);

        let path = TreePath::root(0);
        assert!(tree.set_cell(&path, 0, CellValue::Bool(true)));
        assert!(!tree.set_cell(&path, 0, CellValue::Int(1)));
        assert!(!tree.set_cell(&TreePath::root(3), 0, CellValue::Bool(true)));
        assert_eq!(tree.cell(&path, 0), Some(&CellValue::Bool(true)));
        assert_eq!(tree.row_count(None), 1);
        assert!(!tree.is_expanded(&path));
    }
}
