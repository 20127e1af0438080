//! Shared crate-wide constants.

/// Class tag carried by every dock panel widget.
pub const DOCK_PANEL_CLASS: &str = "p-DockPanel";

/// Class tag carried by every split node owned by a dock panel.
pub const DOCK_SPLIT_PANEL_CLASS: &str = "p-DockSplitPanel";

/// Class tag carried by every tab-group (tab bar + stacked content).
pub const DOCK_TAB_PANEL_CLASS: &str = "p-DockTabPanel";

/// Class tag carried by the placement preview overlay.
pub const OVERLAY_CLASS: &str = "p-DockTabPanel-overlay";

/// Class tag applied to the dock panel while a tab drag is in progress.
pub const DOCKING_CLASS: &str = "p-mod-docking";

/// Default width (in cells) of the draggable resize handles between split
/// children. Mirrored by the handle-size property default.
pub const DEFAULT_HANDLE_SIZE: u16 = 3;

/// Height (in rows) of a tab-group's tab bar.
pub const TAB_BAR_HEIGHT: u16 = 1;

/// Divisor selecting the edge-band depth of a group's content rect during a
/// drag: the outer `1/EDGE_BAND_DIVISOR` of each axis resolves to a split
/// placement, the middle to a tab placement. Each band keeps at least one
/// cell so thin groups remain splittable.
pub const EDGE_BAND_DIVISOR: u16 = 4;
