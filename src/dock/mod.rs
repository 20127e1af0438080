//! Dock panel: an IDE-style container whose tabs can be dragged to
//! rearrange content widgets into nested splits and tabbed groups.
//!
//! The panel owns a [`Widgets`] world holding its tree: a root split of
//! tab-groups (tab bar over a stack of content widgets), nested further
//! splits as the user docks. Pressing a tab opens a drag session; moves
//! resolve a drop target and preview it through the overlay; releasing
//! commits a single tree mutation.

mod overlay;
mod tree;
mod zones;

pub use overlay::Overlay;
pub use zones::{DropTarget, Placement};

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::prelude::{Direction, Rect};
use thiserror::Error;

use crate::constants::{
    DEFAULT_HANDLE_SIZE, DOCK_PANEL_CLASS, DOCK_SPLIT_PANEL_CLASS, DOCKING_CLASS,
};
use crate::layout::{Arrangement, arrange, rect_contains};
use crate::theme;
use crate::ui::UiFrame;
use crate::widgets::{
    EventLog, LAYOUT_REQUEST, Property, TabId, WidgetId, WidgetKind, Widgets,
};

/// Pointer event kinds reported through the world observer while the panel
/// handles mouse input.
pub const MOUSE_DOWN_EVENT: &str = "mousedown";
pub const MOUSE_MOVE_EVENT: &str = "mousemove";
pub const CONTEXT_MENU_EVENT: &str = "contextmenu";
pub const MOUSE_UP_EVENT: &str = "mouseup";

/// Where to insert a widget relative to a reference widget.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DockMode {
    SplitTop = 0,
    SplitLeft = 1,
    SplitRight = 2,
    SplitBottom = 3,
    TabBefore = 4,
    TabAfter = 5,
}

impl DockMode {
    /// Split axis implied by the mode. Tab modes report the axis of the
    /// bar they insert into, which is always horizontal.
    pub fn axis(self) -> Direction {
        match self {
            DockMode::SplitTop | DockMode::SplitBottom => Direction::Vertical,
            DockMode::SplitLeft | DockMode::SplitRight => Direction::Horizontal,
            DockMode::TabBefore | DockMode::TabAfter => Direction::Horizontal,
        }
    }

    /// True when the insertion lands before the reference.
    pub fn is_before(self) -> bool {
        matches!(
            self,
            DockMode::SplitTop | DockMode::SplitLeft | DockMode::TabBefore
        )
    }

    pub fn is_split(self) -> bool {
        !matches!(self, DockMode::TabBefore | DockMode::TabAfter)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DockError {
    #[error("widget has no tab")]
    WidgetHasNoTab,
    #[error("widget and reference are identical")]
    SelfReference,
}

/// Tab associated with a content widget. A widget cannot join the dock
/// tree without one.
pub static TAB_PROPERTY: Property<Option<TabId>> = Property::new("dock-tab", None);

/// Width of the split drag handles. Attached to the panel widget; changes
/// propagate to every split and post a conflated layout request.
pub static HANDLE_SIZE_PROPERTY: Property<u16> =
    Property::with_changed("handle-size", DEFAULT_HANDLE_SIZE, on_handle_size_changed);

fn on_handle_size_changed(widgets: &mut Widgets, panel: WidgetId) {
    let size = HANDLE_SIZE_PROPERTY.get(widgets, panel);
    let mut stack = vec![panel];
    let mut splits = Vec::new();
    while let Some(id) = stack.pop() {
        if matches!(widgets.kind(id), Some(WidgetKind::Split { .. })) {
            splits.push(id);
        }
        stack.extend(widgets.children(id).iter().copied());
    }
    for split in splits {
        widgets.set_split_handle_size(split, size);
    }
    widgets.post(panel, LAYOUT_REQUEST);
}

#[derive(Debug)]
struct DragSession {
    widget: WidgetId,
    origin: (u16, u16),
    active: bool,
    target: Option<DropTarget>,
}

#[derive(Debug)]
struct HandleGrab {
    split: WidgetId,
    index: usize,
    direction: Direction,
    last: (u16, u16),
}

#[derive(Debug)]
enum PointerGrab {
    Tab(DragSession),
    Handle(HandleGrab),
}

/// The dock panel widget.
pub struct DockPanel {
    widgets: Widgets,
    id: WidgetId,
    overlay: Overlay,
    grab: Option<PointerGrab>,
    arrangement: Option<Arrangement>,
}

impl DockPanel {
    pub const SPLIT_TOP: DockMode = DockMode::SplitTop;
    pub const SPLIT_LEFT: DockMode = DockMode::SplitLeft;
    pub const SPLIT_RIGHT: DockMode = DockMode::SplitRight;
    pub const SPLIT_BOTTOM: DockMode = DockMode::SplitBottom;
    pub const TAB_BEFORE: DockMode = DockMode::TabBefore;
    pub const TAB_AFTER: DockMode = DockMode::TabAfter;

    /// Build an empty panel: one root split child, no content, attached.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Build an empty panel with `log` installed before the first widget
    /// exists, so construction-time messages are captured too.
    pub fn new_observed(log: &EventLog) -> Self {
        Self::build(Some(log))
    }

    fn build(log: Option<&EventLog>) -> Self {
        let mut widgets = Widgets::new();
        if let Some(log) = log {
            log.install(&mut widgets);
        }
        let id = widgets.create_panel();
        widgets.add_class(id, DOCK_PANEL_CLASS);
        let handle_size = HANDLE_SIZE_PROPERTY.get(&widgets, id);
        let root = widgets.create_split(Direction::Horizontal, handle_size);
        widgets.add_class(root, DOCK_SPLIT_PANEL_CLASS);
        widgets.add_child(id, root);
        widgets.attach(id);
        tracing::debug!(panel = ?id, "created dock panel");
        Self {
            widgets,
            id,
            overlay: Overlay::new(),
            grab: None,
            arrangement: None,
        }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// The root split, absent once the panel was disposed.
    pub fn root(&self) -> Option<WidgetId> {
        self.widgets.children(self.id).first().copied()
    }

    pub fn widgets(&self) -> &Widgets {
        &self.widgets
    }

    pub fn widgets_mut(&mut self) -> &mut Widgets {
        &mut self.widgets
    }

    /// Deliver pending posted messages (layout requests conflate until
    /// this runs). The demo loop calls it once per frame.
    pub fn flush_posted(&mut self) {
        self.widgets.flush_posted();
    }

    // Tab association.

    pub fn tab_of(widgets: &Widgets, widget: WidgetId) -> Option<TabId> {
        TAB_PROPERTY.get(widgets, widget)
    }

    pub fn set_tab_of(widgets: &mut Widgets, widget: WidgetId, tab: TabId) {
        TAB_PROPERTY.set(widgets, widget, Some(tab));
    }

    pub fn tab(&self, widget: WidgetId) -> Option<TabId> {
        Self::tab_of(&self.widgets, widget)
    }

    pub fn set_tab(&mut self, widget: WidgetId, tab: TabId) {
        Self::set_tab_of(&mut self.widgets, widget, tab);
    }

    /// Create a content widget together with its tab in one step.
    pub fn create_content(&mut self, title: &str, closable: bool) -> WidgetId {
        let widget = self.widgets.create_widget();
        let tab = self.widgets.create_tab(title, closable);
        Self::set_tab_of(&mut self.widgets, widget, tab);
        widget
    }

    // Handle size.

    pub fn handle_size(&self) -> u16 {
        HANDLE_SIZE_PROPERTY.get(&self.widgets, self.id)
    }

    pub fn set_handle_size(&mut self, size: u16) {
        HANDLE_SIZE_PROPERTY.set(&mut self.widgets, self.id, size);
    }

    /// Insert `widget` into the tree.
    ///
    /// With no mode, a fresh single-widget tab-group is appended to the
    /// root split. A reference that is absent or no longer in the tree
    /// falls back to root-relative placement. A widget already in the
    /// tree moves to the new location.
    pub fn add_widget(
        &mut self,
        widget: WidgetId,
        mode: Option<DockMode>,
        reference: Option<WidgetId>,
    ) -> Result<(), DockError> {
        if self.is_disposed() {
            tracing::debug!(widget = ?widget, "add_widget on disposed panel ignored");
            return Ok(());
        }
        if Self::tab_of(&self.widgets, widget).is_none() {
            return Err(DockError::WidgetHasNoTab);
        }
        if reference == Some(widget) {
            return Err(DockError::SelfReference);
        }
        self.insert_validated(widget, mode, reference);
        Ok(())
    }

    /// Remove `widget` from the tree, collapsing emptied structure. The
    /// widget itself stays alive. Returns false when it was not present.
    pub fn remove_widget(&mut self, widget: WidgetId) -> bool {
        if self.is_disposed() {
            return false;
        }
        let removed = tree::remove_from_tree(&mut self.widgets, self.id, widget);
        if removed {
            self.widgets.post(self.id, LAYOUT_REQUEST);
        }
        removed
    }

    /// Remove `widget` and dispose it, as the tab close mark does.
    pub fn close_widget(&mut self, widget: WidgetId) -> bool {
        let removed = self.remove_widget(widget);
        if removed {
            self.widgets.dispose(widget);
        }
        removed
    }

    /// Select the tab of `widget` in its group.
    pub fn select(&mut self, widget: WidgetId) -> bool {
        tree::select_widget(&mut self.widgets, widget)
    }

    /// Tear down the panel: children disposed, session cleared, overlay
    /// hidden. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.is_disposed() {
            return;
        }
        tracing::debug!(panel = ?self.id, "dispose dock panel");
        self.grab = None;
        self.overlay.hide();
        self.arrangement = None;
        self.widgets.dispose(self.id);
    }

    pub fn is_disposed(&self) -> bool {
        self.widgets.is_disposed(self.id)
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Compute and cache the arrangement for `area` without painting.
    /// Pointer handling hit-tests against the cached arrangement.
    pub fn arrange_for(&mut self, area: Rect) -> &Arrangement {
        let arr = arrange(&self.widgets, self.id, area);
        self.arrangement.insert(arr)
    }

    pub fn arrangement(&self) -> Option<&Arrangement> {
        self.arrangement.as_ref()
    }

    /// Handle a pointer event. Returns true when the event was consumed.
    pub fn handle_mouse(&mut self, event: MouseEvent) -> bool {
        if self.is_disposed() {
            return false;
        }
        let (column, row) = (event.column, event.row);
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => self.on_left_down(column, row),
            MouseEventKind::Down(MouseButton::Right) => {
                if matches!(self.grab, Some(PointerGrab::Tab(_))) {
                    // The context-menu analog: logged, swallowed, the drag
                    // keeps going.
                    self.widgets.send(self.id, CONTEXT_MENU_EVENT);
                    return true;
                }
                false
            }
            MouseEventKind::Down(_) => self.grab.is_some(),
            MouseEventKind::Drag(MouseButton::Left) => match self.grab {
                Some(PointerGrab::Tab(_)) => {
                    self.on_tab_drag(column, row);
                    true
                }
                Some(PointerGrab::Handle(_)) => {
                    self.on_handle_drag(column, row);
                    true
                }
                None => false,
            },
            MouseEventKind::Up(MouseButton::Left) => match self.grab.take() {
                Some(PointerGrab::Tab(session)) => {
                    self.finish_tab_drag(session);
                    true
                }
                Some(PointerGrab::Handle(_)) => true,
                None => false,
            },
            MouseEventKind::Up(_) | MouseEventKind::Drag(_) => self.grab.is_some(),
            _ => false,
        }
    }

    fn on_left_down(&mut self, column: u16, row: u16) -> bool {
        if self.grab.is_some() {
            // One session at a time; a second press cannot open another.
            return true;
        }
        let Some(arr) = self.arrangement.as_ref() else {
            return false;
        };
        let close_hit = arr
            .tab_slots
            .iter()
            .find(|slot| {
                slot.close_rect
                    .is_some_and(|rect| rect_contains(rect, column, row))
            })
            .map(|slot| slot.widget);
        if let Some(widget) = close_hit {
            tracing::debug!(widget = ?widget, "tab close mark pressed");
            self.close_widget(widget);
            return true;
        }
        if let Some(slot) = arr.slot_at(column, row) {
            let widget = slot.widget;
            self.select(widget);
            self.grab = Some(PointerGrab::Tab(DragSession {
                widget,
                origin: (column, row),
                active: false,
                target: None,
            }));
            self.widgets.send(self.id, MOUSE_DOWN_EVENT);
            return true;
        }
        if let Some(handle) = arr.handle_at(column, row) {
            self.grab = Some(PointerGrab::Handle(HandleGrab {
                split: handle.split,
                index: handle.index,
                direction: handle.direction,
                last: (column, row),
            }));
            return true;
        }
        false
    }

    fn on_tab_drag(&mut self, column: u16, row: u16) {
        let (widget, was_active) = match &self.grab {
            Some(PointerGrab::Tab(session)) => (session.widget, session.active),
            _ => return,
        };
        if !was_active {
            self.widgets.add_class(self.id, DOCKING_CLASS);
            tracing::debug!(widget = ?widget, "begin tab drag");
        }
        let target = self
            .arrangement
            .as_ref()
            .and_then(|arr| zones::resolve(&self.widgets, arr, widget, column, row));
        match &target {
            Some(drop) => self.overlay.show(drop.preview),
            None => self.overlay.hide(),
        }
        if let Some(PointerGrab::Tab(session)) = self.grab.as_mut() {
            session.active = true;
            session.target = target;
        }
        self.widgets.send(self.id, MOUSE_MOVE_EVENT);
    }

    fn finish_tab_drag(&mut self, session: DragSession) {
        self.widgets.send(self.id, MOUSE_UP_EVENT);
        self.overlay.hide();
        self.widgets.remove_class(self.id, DOCKING_CLASS);
        if session.active
            && let Some(target) = session.target
        {
            tracing::debug!(
                widget = ?session.widget,
                placement = ?target.placement,
                "commit tab drop"
            );
            match target.placement {
                Placement::Root => self.insert_validated(session.widget, None, None),
                Placement::At { mode, reference } => {
                    self.insert_validated(session.widget, Some(mode), Some(reference));
                }
            }
        } else if session.active {
            tracing::debug!(widget = ?session.widget, "abort tab drag");
        }
    }

    fn on_handle_drag(&mut self, column: u16, row: u16) {
        let (split, index, direction, last) = match &self.grab {
            Some(PointerGrab::Handle(grab)) => {
                (grab.split, grab.index, grab.direction, grab.last)
            }
            _ => return,
        };
        if let Some(PointerGrab::Handle(grab)) = self.grab.as_mut() {
            grab.last = (column, row);
        }
        let delta = match direction {
            Direction::Horizontal => column as i32 - last.0 as i32,
            Direction::Vertical => row as i32 - last.1 as i32,
        };
        let Some(rect) = self.arrangement.as_ref().and_then(|arr| arr.rect(split)) else {
            return;
        };
        if delta != 0 && tree::apply_handle_drag(&mut self.widgets, rect, split, index, delta) {
            self.widgets.post(self.id, LAYOUT_REQUEST);
        }
    }

    /// Paint the panel: tab bars, split handles, content (through the
    /// caller's closure), then the drop overlay.
    pub fn render<F>(&mut self, frame: &mut Frame<'_>, area: Rect, mut content: F)
    where
        F: FnMut(WidgetId, Rect, &mut Frame<'_>),
    {
        self.arrange_for(area);
        let docking = match &self.grab {
            Some(PointerGrab::Tab(session)) if session.active => Some(session.widget),
            _ => None,
        };
        let Some(arr) = self.arrangement.clone() else {
            return;
        };
        self.paint_chrome(frame, &arr, docking);
        for (&id, &rect) in &arr.rects {
            if matches!(self.widgets.kind(id), Some(WidgetKind::Content))
                && rect.width > 0
                && rect.height > 0
            {
                content(id, rect, frame);
            }
        }
        self.overlay.render(frame);
    }

    fn paint_chrome(&self, frame: &mut Frame<'_>, arr: &Arrangement, docking: Option<WidgetId>) {
        let mut ui = UiFrame::new(frame);
        for &group in &arr.groups {
            if let Some(&bar) = self.widgets.children(group).first()
                && let Some(rect) = arr.rect(bar)
            {
                ui.fill(rect, " ", theme::tab_bar_bg());
            }
        }
        for slot in &arr.tab_slots {
            let style = if docking == Some(slot.widget) {
                theme::tab_docking()
            } else if slot.selected {
                theme::tab_selected()
            } else {
                theme::tab_inactive()
            };
            ui.fill(slot.rect, " ", style);
            if slot.rect.width > 2 {
                let title = self
                    .widgets
                    .tab(slot.tab)
                    .map(|tab| tab.title.as_str())
                    .unwrap_or_default();
                let reserved = if slot.close_rect.is_some() { 4 } else { 2 };
                let label = Rect {
                    x: slot.rect.x + 1,
                    width: slot.rect.width.saturating_sub(reserved),
                    ..slot.rect
                };
                ui.set_string_in(label, label.x, label.y, title, style);
            }
            if let Some(close) = slot.close_rect {
                ui.set_string_in(close, close.x, close.y, "×", theme::close_mark());
            }
        }
        for handle in &arr.handles {
            ui.paint_handle(handle.rect, handle.direction, theme::handle(), theme::handle_grip());
        }
    }

    /// Indented textual rendering of the tree, for diagnostics and tests.
    pub fn dump_tree(&self) -> String {
        let mut out = String::new();
        self.dump_node(self.id, 0, &mut out);
        out
    }

    fn dump_node(&self, id: WidgetId, depth: usize, out: &mut String) {
        let pad = "  ".repeat(depth);
        let classes = self.widgets.classes(id).join(" ");
        let line = match self.widgets.kind(id) {
            Some(WidgetKind::Panel) if classes.is_empty() => "Panel".to_string(),
            Some(WidgetKind::Panel) => format!("Panel {classes}"),
            Some(WidgetKind::Split { direction, .. }) => {
                let axis = match direction {
                    Direction::Horizontal => "horizontal",
                    Direction::Vertical => "vertical",
                };
                if classes.is_empty() {
                    format!("Split {axis}")
                } else {
                    format!("Split {classes} {axis}")
                }
            }
            Some(WidgetKind::Stack { .. }) => "Stack".to_string(),
            Some(WidgetKind::TabBar { tabs, selected }) => {
                let mut line = "TabBar".to_string();
                for (index, tab) in tabs.iter().enumerate() {
                    let title = self
                        .widgets
                        .tab(*tab)
                        .map(|t| t.title.as_str())
                        .unwrap_or("?");
                    let mark = if *selected == Some(index) { "*" } else { "" };
                    line.push_str(&format!(" \"{title}\"{mark}"));
                }
                line
            }
            Some(WidgetKind::Content) => {
                let title = Self::tab_of(&self.widgets, id)
                    .and_then(|tab| self.widgets.tab(tab))
                    .map(|tab| tab.title.as_str());
                match title {
                    Some(title) => format!("Widget \"{title}\""),
                    None => "Widget".to_string(),
                }
            }
            None => "?".to_string(),
        };
        out.push_str(&pad);
        out.push_str(&line);
        out.push('\n');
        for &child in self.widgets.children(id) {
            self.dump_node(child, depth + 1, out);
        }
    }
}

impl Default for DockPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DOCK_TAB_PANEL_CLASS;

    #[test]
    fn mode_axis_and_order() {
        assert_eq!(DockMode::SplitTop.axis(), Direction::Vertical);
        assert_eq!(DockMode::SplitBottom.axis(), Direction::Vertical);
        assert_eq!(DockMode::SplitLeft.axis(), Direction::Horizontal);
        assert_eq!(DockMode::SplitRight.axis(), Direction::Horizontal);
        assert!(DockMode::SplitTop.is_before());
        assert!(DockMode::SplitLeft.is_before());
        assert!(DockMode::TabBefore.is_before());
        assert!(!DockMode::SplitRight.is_before());
        assert!(!DockMode::TabAfter.is_before());
        assert!(!DockMode::TabAfter.is_split());
        assert_eq!(DockMode::TabAfter as u8, 5);
    }

    #[test]
    fn panel_constants_alias_the_modes() {
        assert_eq!(DockPanel::SPLIT_TOP, DockMode::SplitTop);
        assert_eq!(DockPanel::TAB_BEFORE, DockMode::TabBefore);
    }

    #[test]
    fn error_messages_are_stable() {
        assert_eq!(DockError::WidgetHasNoTab.to_string(), "widget has no tab");
        assert_eq!(
            DockError::SelfReference.to_string(),
            "widget and reference are identical"
        );
    }

    #[test]
    fn constructor_builds_panel_with_root_split() {
        let panel = DockPanel::new();
        let widgets = panel.widgets();
        assert!(widgets.has_class(panel.id(), DOCK_PANEL_CLASS));
        let root = panel.root().unwrap();
        assert!(widgets.has_class(root, DOCK_SPLIT_PANEL_CLASS));
        assert!(matches!(
            widgets.kind(root),
            Some(WidgetKind::Split { .. })
        ));
        assert!(widgets.children(root).is_empty());
        assert!(widgets.is_attached(root));
    }

    #[test]
    fn handle_size_defaults_and_delegates() {
        let mut panel = DockPanel::new();
        assert_eq!(panel.handle_size(), 3);
        let root = panel.root().unwrap();
        assert_eq!(panel.widgets().split_handle_size(root), Some(3));

        panel.set_handle_size(5);
        assert_eq!(panel.handle_size(), 5);
        assert_eq!(panel.widgets().split_handle_size(root), Some(5));
    }

    #[test]
    fn tab_round_trip() {
        let mut panel = DockPanel::new();
        let widget = panel.widgets_mut().create_widget();
        assert_eq!(panel.tab(widget), None);
        let tab = panel.widgets_mut().create_tab("Red", true);
        panel.set_tab(widget, tab);
        assert_eq!(panel.tab(widget), Some(tab));
    }

    #[test]
    fn add_widget_rejects_missing_tab() {
        let mut panel = DockPanel::new();
        let widget = panel.widgets_mut().create_widget();
        let err = panel.add_widget(widget, None, None).unwrap_err();
        assert_eq!(err, DockError::WidgetHasNoTab);
        assert_eq!(panel.widgets().parent(widget), None);
        assert!(panel.widgets().children(panel.root().unwrap()).is_empty());
    }

    #[test]
    fn add_widget_rejects_self_reference() {
        let mut panel = DockPanel::new();
        let widget = panel.create_content("solo", false);
        for mode in [
            DockMode::SplitTop,
            DockMode::SplitLeft,
            DockMode::SplitRight,
            DockMode::SplitBottom,
            DockMode::TabBefore,
            DockMode::TabAfter,
        ] {
            let err = panel.add_widget(widget, Some(mode), Some(widget)).unwrap_err();
            assert_eq!(err, DockError::SelfReference);
        }
        assert_eq!(panel.widgets().parent(widget), None);
    }

    #[test]
    fn added_widget_lands_under_a_stack_in_a_tab_group() {
        let mut panel = DockPanel::new();
        let widget = panel.create_content("a", false);
        panel.add_widget(widget, None, None).unwrap();

        let stack = panel.widgets().parent(widget).unwrap();
        assert!(matches!(
            panel.widgets().kind(stack),
            Some(WidgetKind::Stack { .. })
        ));
        let group = panel.widgets().parent(stack).unwrap();
        assert!(panel.widgets().has_class(group, DOCK_TAB_PANEL_CLASS));
        assert_eq!(panel.widgets().parent(group), panel.root());
    }

    #[test]
    fn dispose_clears_children_and_is_repeat_safe() {
        let mut panel = DockPanel::new();
        let a = panel.create_content("a", false);
        let b = panel.create_content("b", false);
        panel.add_widget(a, None, None).unwrap();
        panel.add_widget(b, Some(DockMode::SplitRight), Some(a)).unwrap();

        panel.dispose();
        assert!(panel.is_disposed());
        assert!(panel.widgets().children(panel.id()).is_empty());

        panel.dispose();
        assert!(panel.is_disposed());
        assert_eq!(panel.add_widget(a, None, None), Ok(()));
        assert!(panel.widgets().children(panel.id()).is_empty());
    }
}
