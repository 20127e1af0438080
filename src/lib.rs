//! An IDE-style dockable panel widget for terminal shells.
//!
//! [`DockPanel`] hosts content widgets in a tree of splits and tabbed
//! groups. Dragging a tab onto another group's bar re-tabs the widget,
//! onto a group's edge splits it, and onto empty panel space spawns a
//! fresh group; split handles resize the tree in place. Everything is
//! driven by crossterm mouse events and painted through ratatui.

pub mod constants;
pub mod dock;
pub mod layout;
pub mod theme;
pub mod tracing_sub;
pub mod ui;
pub mod widgets;

pub use dock::{
    CONTEXT_MENU_EVENT, DockError, DockMode, DockPanel, DropTarget, HANDLE_SIZE_PROPERTY,
    MOUSE_DOWN_EVENT, MOUSE_MOVE_EVENT, MOUSE_UP_EVENT, Overlay, Placement, TAB_PROPERTY,
};
pub use layout::{Arrangement, SplitHandle, TabSlot, arrange};
pub use widgets::{
    AFTER_ATTACH, CHILD_ADDED, CHILD_REMOVED, EventLog, LAYOUT_REQUEST, Property, Tab, TabId,
    WidgetId, WidgetKind, Widgets,
};
