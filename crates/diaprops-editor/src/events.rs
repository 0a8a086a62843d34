//! Editor events
//!
//! Every structural operation, cell edit, selection change and commit of
//! an [`ArrayEditor`](crate::ArrayEditor) produces one [`EditorEvent`].
//! Events are dispatched synchronously, in subscription order, to the
//! listeners registered with [`EditorListeners`].

use std::fmt;

use diaprops_core::StoreId;
use uuid::Uuid;

use crate::tree::TreePath;

/// Something that happened in an editing session
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// A blank row was inserted at `path`
    RowInserted { path: TreePath },
    /// The row at `path` was removed
    RowRemoved { path: TreePath },
    /// A row moved between two sibling positions
    RowMoved { from: TreePath, to: TreePath },
    /// A cell value changed
    CellEdited { path: TreePath, column: usize },
    /// The selection changed; `None` clears it
    SelectionChanged { path: Option<TreePath> },
    /// A nested store was created for the row at `path`
    NestedMaterialized { path: TreePath, store: StoreId },
    /// The tree was re-projected from the property
    Reset,
    /// The tree was written back to the property
    Committed { modified: bool },
}

impl EditorEvent {
    /// Category used by [`EventFilter`]
    pub fn category(&self) -> EventCategory {
        match self {
            Self::RowInserted { .. } | Self::RowRemoved { .. } | Self::RowMoved { .. } => {
                EventCategory::Structure
            }
            Self::CellEdited { .. } => EventCategory::Cell,
            Self::SelectionChanged { .. } | Self::NestedMaterialized { .. } => {
                EventCategory::Selection
            }
            Self::Reset | Self::Committed { .. } => EventCategory::Session,
        }
    }

    /// Short description for logging
    pub fn description(&self) -> String {
        match self {
            Self::RowInserted { path } => format!("row inserted at {}", path),
            Self::RowRemoved { path } => format!("row removed at {}", path),
            Self::RowMoved { from, to } => format!("row moved from {} to {}", from, to),
            Self::CellEdited { path, column } => format!("cell {} of row {} edited", column, path),
            Self::SelectionChanged { path: Some(path) } => format!("row {} selected", path),
            Self::SelectionChanged { path: None } => "selection cleared".to_string(),
            Self::NestedMaterialized { path, store } => {
                format!("{} created for row {}", store, path)
            }
            Self::Reset => "reset from property".to_string(),
            Self::Committed { modified } => format!("committed (modified: {})", modified),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    /// Row insertion, removal and moves.
    Structure,
    /// Cell edits.
    Cell,
    /// Selection and expansion.
    Selection,
    /// Reset and commit.
    Session,
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventCategory::Structure => write!(f, "Structure"),
            EventCategory::Cell => write!(f, "Cell"),
            EventCategory::Selection => write!(f, "Selection"),
            EventCategory::Session => write!(f, "Session"),
        }
    }
}

/// Filter to receive only specific event types
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    /// Receive all events.
    #[default]
    All,
    /// Receive events matching any of these categories.
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    /// Check if an event matches this filter
    pub fn matches(&self, event: &EditorEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

/// Subscription handle for unsubscribing from events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sub({})", &self.0.to_string()[..8])
    }
}

type EventHandler = Box<dyn FnMut(&EditorEvent)>;

/// Listeners of one editing session
#[derive(Default)]
pub struct EditorListeners {
    handlers: Vec<(SubscriptionId, EventFilter, EventHandler)>,
}

impl EditorListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; handlers run in registration order
    pub fn subscribe<F>(&mut self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: FnMut(&EditorEvent) + 'static,
    {
        let id = SubscriptionId::new();
        self.handlers.push((id, filter, Box::new(handler)));
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sub, _, _)| *sub != id);
        let removed = self.handlers.len() != before;
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Deliver an event to every matching handler
    pub fn emit(&mut self, event: &EditorEvent) {
        tracing::trace!("Editor event: {}", event.description());
        for (_, filter, handler) in self.handlers.iter_mut() {
            if filter.matches(event) {
                handler(event);
            }
        }
    }
}

impl fmt::Debug for EditorListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorListeners")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_filter_by_category() {
        let filter = EventFilter::Categories(vec![EventCategory::Structure]);
        assert!(filter.matches(&EditorEvent::RowRemoved {
            path: TreePath::root(0)
        }));
        assert!(!filter.matches(&EditorEvent::Reset));
        assert!(EventFilter::All.matches(&EditorEvent::Reset));
    }

    #[test]
    fn test_listeners_receive_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = EditorListeners::new();

        let log = Rc::clone(&seen);
        listeners.subscribe(EventFilter::All, move |e| {
            log.borrow_mut().push(format!("a:{}", e.description()))
        });
        let log = Rc::clone(&seen);
        let second = listeners.subscribe(
            EventFilter::Categories(vec![EventCategory::Session]),
            move |e| log.borrow_mut().push(format!("b:{}", e.description())),
        );

        listeners.emit(&EditorEvent::Reset);
        listeners.emit(&EditorEvent::SelectionChanged { path: None });
        assert!(listeners.unsubscribe(second));
        assert!(!listeners.unsubscribe(second));
        listeners.emit(&EditorEvent::Reset);

        assert_eq!(
            *seen.borrow(),
            vec![
                "a:reset from property",
                "b:reset from property",
                "a:selection cleared",
                "a:reset from property",
            ]
        );
    }
}
