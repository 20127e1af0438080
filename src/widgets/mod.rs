//! Widget substrate: an identifier arena owning every node of a dock
//! panel's tree.
//!
//! Widgets are addressed by stable [`WidgetId`]s into a [`Widgets`] world
//! rather than by nested ownership, so structural edits (splice, collapse,
//! re-parent) are index operations and are testable without rendering.
//! Identifiers are never reused; disposed nodes stay queryable.
//!
//! The world also carries tabs, per-widget property slots, a deferred
//! message queue with conflation, and an injectable observer through which
//! both lifecycle messages and the panel's pointer events are visible.

pub mod property;

use std::any::Any;
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use ratatui::layout::Direction;

pub use property::Property;

/// Message delivered to a parent after a child was inserted.
pub const CHILD_ADDED: &str = "child-added";
/// Message delivered to a parent after a child was removed.
pub const CHILD_REMOVED: &str = "child-removed";
/// Message delivered to every widget of a subtree that became attached.
pub const AFTER_ATTACH: &str = "after-attach";
/// Posted (conflated) message asking the receiver to re-run layout.
pub const LAYOUT_REQUEST: &str = "layout-request";

/// Stable identifier of a widget node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WidgetId(u64);

impl WidgetId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Stable identifier of a tab handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TabId(u64);

impl TabId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A tab handle: the grabbable title strip paired with one content widget.
#[derive(Debug, Clone)]
pub struct Tab {
    pub title: String,
    pub closable: bool,
}

/// Structural role of a widget node.
#[derive(Debug, Clone)]
pub enum WidgetKind {
    /// Leaf rendered by the embedding application.
    Content,
    /// Plain box container; its children stack by role, not by geometry.
    Panel,
    /// Ordered children along one axis, separated by draggable handles.
    /// `weights` parallels the children list.
    Split {
        direction: Direction,
        handle_size: u16,
        weights: Vec<f32>,
    },
    /// Shows at most one child at a time.
    Stack { current: Option<WidgetId> },
    /// Ordered tab handles; `tabs` parallels the sibling stack's children.
    TabBar {
        tabs: Vec<TabId>,
        selected: Option<usize>,
    },
}

#[derive(Debug)]
struct WidgetNode {
    kind: WidgetKind,
    parent: Option<WidgetId>,
    children: Vec<WidgetId>,
    classes: Vec<String>,
    attached: bool,
    disposed: bool,
}

impl WidgetNode {
    fn new(kind: WidgetKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            classes: Vec::new(),
            attached: false,
            disposed: false,
        }
    }
}

type Observer = Box<dyn FnMut(WidgetId, &'static str)>;

/// The arena world. Owns every widget node, tab, property slot and the
/// deferred message queue.
#[derive(Default)]
pub struct Widgets {
    nodes: BTreeMap<WidgetId, WidgetNode>,
    tabs: BTreeMap<TabId, Tab>,
    props: BTreeMap<(WidgetId, &'static str), Box<dyn Any>>,
    posted: VecDeque<(WidgetId, &'static str)>,
    observer: Option<Observer>,
    next_widget: u64,
    next_tab: u64,
}

impl Widgets {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, kind: WidgetKind) -> WidgetId {
        let id = WidgetId(self.next_widget);
        self.next_widget += 1;
        self.nodes.insert(id, WidgetNode::new(kind));
        tracing::trace!(widget = ?id, "created widget");
        id
    }

    /// Create a content widget (a leaf the embedding application renders).
    pub fn create_widget(&mut self) -> WidgetId {
        self.alloc(WidgetKind::Content)
    }

    pub(crate) fn create_panel(&mut self) -> WidgetId {
        self.alloc(WidgetKind::Panel)
    }

    pub(crate) fn create_split(&mut self, direction: Direction, handle_size: u16) -> WidgetId {
        self.alloc(WidgetKind::Split {
            direction,
            handle_size,
            weights: Vec::new(),
        })
    }

    pub(crate) fn create_stack(&mut self) -> WidgetId {
        self.alloc(WidgetKind::Stack { current: None })
    }

    pub(crate) fn create_tab_bar(&mut self) -> WidgetId {
        self.alloc(WidgetKind::TabBar {
            tabs: Vec::new(),
            selected: None,
        })
    }

    pub fn create_tab(&mut self, title: impl Into<String>, closable: bool) -> TabId {
        let id = TabId(self.next_tab);
        self.next_tab += 1;
        self.tabs.insert(
            id,
            Tab {
                title: title.into(),
                closable,
            },
        );
        id
    }

    pub fn tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.get(&id)
    }

    pub fn tab_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.get_mut(&id)
    }

    pub fn exists(&self, id: WidgetId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn kind(&self, id: WidgetId) -> Option<&WidgetKind> {
        self.nodes.get(&id).map(|node| &node.kind)
    }

    pub(crate) fn kind_mut(&mut self, id: WidgetId) -> Option<&mut WidgetKind> {
        self.nodes.get_mut(&id).map(|node| &mut node.kind)
    }

    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.nodes
            .get(&id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    /// Append `child` to `parent`, moving it out of any previous parent.
    pub fn add_child(&mut self, parent: WidgetId, child: WidgetId) {
        let index = self.children(parent).len();
        self.insert_child(parent, index, child);
    }

    /// Insert `child` into `parent` at `index` (clamped), moving it out of
    /// any previous parent. Delivers `child-added` to the parent and, when
    /// the parent is attached, `after-attach` to the inserted subtree.
    pub fn insert_child(&mut self, parent: WidgetId, index: usize, child: WidgetId) {
        if parent == child || !self.exists(parent) || !self.exists(child) {
            return;
        }
        if let Some(previous) = self.parent(child) {
            self.remove_child(previous, child);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            let index = index.min(node.children.len());
            node.children.insert(index, child);
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        self.send(parent, CHILD_ADDED);
        if self.is_attached(parent) {
            self.deliver_after_attach(child);
        }
    }

    /// Detach `child` from `parent`. Returns false when it was not a child.
    pub fn remove_child(&mut self, parent: WidgetId, child: WidgetId) -> bool {
        let Some(node) = self.nodes.get_mut(&parent) else {
            return false;
        };
        let Some(index) = node.children.iter().position(|&c| c == child) else {
            return false;
        };
        node.children.remove(index);
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = None;
        }
        self.send(parent, CHILD_REMOVED);
        true
    }

    /// Mark a root widget attached and deliver `after-attach` through its
    /// subtree.
    pub fn attach(&mut self, id: WidgetId) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.attached = true;
        }
        self.deliver_after_attach(id);
    }

    pub fn detach(&mut self, id: WidgetId) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.attached = false;
        }
    }

    /// True when `id` or any ancestor carries the attached flag.
    pub fn is_attached(&self, id: WidgetId) -> bool {
        let mut current = Some(id);
        while let Some(id) = current {
            let Some(node) = self.nodes.get(&id) else {
                return false;
            };
            if node.attached {
                return true;
            }
            current = node.parent;
        }
        false
    }

    fn deliver_after_attach(&mut self, root: WidgetId) {
        let mut stack = vec![root];
        let mut order = Vec::new();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        for id in order {
            self.send(id, AFTER_ATTACH);
        }
    }

    pub fn add_class(&mut self, id: WidgetId, class: &str) {
        if let Some(node) = self.nodes.get_mut(&id)
            && !node.classes.iter().any(|c| c == class)
        {
            node.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, id: WidgetId, class: &str) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.classes.retain(|c| c != class);
        }
    }

    pub fn has_class(&self, id: WidgetId, class: &str) -> bool {
        self.nodes
            .get(&id)
            .is_some_and(|node| node.classes.iter().any(|c| c == class))
    }

    pub fn classes(&self, id: WidgetId) -> &[String] {
        self.nodes
            .get(&id)
            .map(|node| node.classes.as_slice())
            .unwrap_or_default()
    }

    pub fn is_disposed(&self, id: WidgetId) -> bool {
        self.nodes.get(&id).is_some_and(|node| node.disposed)
    }

    /// Dispose `id` and its whole subtree: detach from the parent, clear
    /// children lists, mark everything disposed. Safe to call again on an
    /// already-disposed widget.
    pub fn dispose(&mut self, id: WidgetId) {
        if !self.exists(id) || self.is_disposed(id) {
            return;
        }
        if let Some(parent) = self.parent(id) {
            self.remove_child(parent, id);
        }
        self.dispose_subtree(id);
        tracing::debug!(widget = ?id, "disposed widget");
    }

    fn dispose_subtree(&mut self, id: WidgetId) {
        let children = match self.nodes.get_mut(&id) {
            Some(node) => {
                node.disposed = true;
                node.attached = false;
                std::mem::take(&mut node.children)
            }
            None => return,
        };
        for child in children {
            if let Some(node) = self.nodes.get_mut(&child) {
                node.parent = None;
            }
            self.dispose_subtree(child);
        }
    }

    // Focused accessors over the kind data, for callers that do not want
    // to match on `WidgetKind` themselves.

    pub fn split_direction(&self, id: WidgetId) -> Option<Direction> {
        match self.kind(id) {
            Some(WidgetKind::Split { direction, .. }) => Some(*direction),
            _ => None,
        }
    }

    pub fn split_handle_size(&self, id: WidgetId) -> Option<u16> {
        match self.kind(id) {
            Some(WidgetKind::Split { handle_size, .. }) => Some(*handle_size),
            _ => None,
        }
    }

    pub fn split_weights(&self, id: WidgetId) -> &[f32] {
        match self.kind(id) {
            Some(WidgetKind::Split { weights, .. }) => weights.as_slice(),
            _ => &[],
        }
    }

    pub(crate) fn split_weights_mut(&mut self, id: WidgetId) -> Option<&mut Vec<f32>> {
        match self.kind_mut(id) {
            Some(WidgetKind::Split { weights, .. }) => Some(weights),
            _ => None,
        }
    }

    pub(crate) fn set_split_direction(&mut self, id: WidgetId, value: Direction) {
        if let Some(WidgetKind::Split { direction, .. }) = self.kind_mut(id) {
            *direction = value;
        }
    }

    pub(crate) fn set_split_handle_size(&mut self, id: WidgetId, value: u16) {
        if let Some(WidgetKind::Split { handle_size, .. }) = self.kind_mut(id) {
            *handle_size = value;
        }
    }

    pub fn stack_current(&self, id: WidgetId) -> Option<WidgetId> {
        match self.kind(id) {
            Some(WidgetKind::Stack { current }) => *current,
            _ => None,
        }
    }

    pub(crate) fn set_stack_current(&mut self, id: WidgetId, value: Option<WidgetId>) {
        if let Some(WidgetKind::Stack { current }) = self.kind_mut(id) {
            *current = value;
        }
    }

    pub fn tab_bar_tabs(&self, id: WidgetId) -> &[TabId] {
        match self.kind(id) {
            Some(WidgetKind::TabBar { tabs, .. }) => tabs.as_slice(),
            _ => &[],
        }
    }

    pub fn tab_bar_selected(&self, id: WidgetId) -> Option<usize> {
        match self.kind(id) {
            Some(WidgetKind::TabBar { selected, .. }) => *selected,
            _ => None,
        }
    }

    pub(crate) fn tab_bar_insert(&mut self, id: WidgetId, index: usize, tab: TabId) {
        if let Some(WidgetKind::TabBar { tabs, .. }) = self.kind_mut(id) {
            let index = index.min(tabs.len());
            tabs.insert(index, tab);
        }
    }

    pub(crate) fn tab_bar_remove(&mut self, id: WidgetId, index: usize) -> Option<TabId> {
        if let Some(WidgetKind::TabBar { tabs, .. }) = self.kind_mut(id)
            && index < tabs.len()
        {
            return Some(tabs.remove(index));
        }
        None
    }

    pub(crate) fn set_tab_bar_selected(&mut self, id: WidgetId, value: Option<usize>) {
        if let Some(WidgetKind::TabBar { selected, .. }) = self.kind_mut(id) {
            *selected = value;
        }
    }

    // Messages.

    /// Deliver a message synchronously.
    pub fn send(&mut self, id: WidgetId, kind: &'static str) {
        self.deliver(id, kind);
    }

    /// Queue a message for the next [`flush_posted`](Self::flush_posted).
    /// An identical pending `(id, kind)` pair is conflated away.
    pub fn post(&mut self, id: WidgetId, kind: &'static str) {
        if !self.posted.contains(&(id, kind)) {
            self.posted.push_back((id, kind));
        }
    }

    /// Deliver every queued message. Deliveries may queue further messages;
    /// those are processed in the same flush.
    pub fn flush_posted(&mut self) {
        while let Some((id, kind)) = self.posted.pop_front() {
            self.deliver(id, kind);
        }
    }

    pub fn has_posted(&self, id: WidgetId, kind: &str) -> bool {
        self.posted.iter().any(|&(i, k)| i == id && k == kind)
    }

    fn deliver(&mut self, id: WidgetId, kind: &'static str) {
        tracing::trace!(widget = ?id, kind, "deliver");
        if let Some(observer) = self.observer.as_mut() {
            observer(id, kind);
        }
    }

    /// Install the observer through which all deliveries (and the dock
    /// panel's pointer events) become visible. Replaces any previous one.
    pub fn set_observer(&mut self, observer: impl FnMut(WidgetId, &'static str) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }
}

/// Cloneable shared recording of everything the observer sees. The world is
/// single threaded, so a plain `Rc<RefCell<..>>` carries the entries.
#[derive(Clone, Default)]
pub struct EventLog {
    entries: Rc<RefCell<Vec<(WidgetId, &'static str)>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register this log as the world's observer.
    pub fn install(&self, widgets: &mut Widgets) {
        let entries = Rc::clone(&self.entries);
        widgets.set_observer(move |id, kind| entries.borrow_mut().push((id, kind)));
    }

    pub fn entries(&self) -> Vec<(WidgetId, &'static str)> {
        self.entries.borrow().clone()
    }

    /// The recorded kinds, in delivery order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.entries.borrow().iter().map(|&(_, kind)| kind).collect()
    }

    /// The recorded kinds delivered to `id` only.
    pub fn kinds_for(&self, id: WidgetId) -> Vec<&'static str> {
        self.entries
            .borrow()
            .iter()
            .filter(|&&(i, _)| i == id)
            .map(|&(_, kind)| kind)
            .collect()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.entries.borrow().iter().filter(|&&(_, k)| k == kind).count()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_stable_and_unique() {
        let mut widgets = Widgets::new();
        let a = widgets.create_widget();
        let b = widgets.create_widget();
        assert_ne!(a, b);
        widgets.dispose(a);
        let c = widgets.create_widget();
        assert_ne!(a, c);
        assert!(widgets.exists(a));
    }

    #[test]
    fn insert_child_moves_between_parents() {
        let mut widgets = Widgets::new();
        let p1 = widgets.create_panel();
        let p2 = widgets.create_panel();
        let child = widgets.create_widget();

        widgets.add_child(p1, child);
        assert_eq!(widgets.parent(child), Some(p1));

        widgets.add_child(p2, child);
        assert_eq!(widgets.parent(child), Some(p2));
        assert!(widgets.children(p1).is_empty());
        assert_eq!(widgets.children(p2), &[child]);
    }

    #[test]
    fn child_added_goes_to_the_parent() {
        let mut widgets = Widgets::new();
        let log = EventLog::new();
        log.install(&mut widgets);

        let parent = widgets.create_panel();
        let child = widgets.create_widget();
        widgets.add_child(parent, child);

        assert_eq!(log.kinds_for(parent), vec![CHILD_ADDED]);
        assert!(log.kinds_for(child).is_empty());
    }

    #[test]
    fn attach_delivers_after_attach_through_the_subtree() {
        let mut widgets = Widgets::new();
        let log = EventLog::new();
        log.install(&mut widgets);

        let root = widgets.create_panel();
        let mid = widgets.create_panel();
        let leaf = widgets.create_widget();
        widgets.add_child(root, mid);
        widgets.add_child(mid, leaf);

        widgets.attach(root);
        assert_eq!(log.count(AFTER_ATTACH), 3);

        // Inserting below an attached parent re-delivers to the new subtree.
        let late = widgets.create_widget();
        widgets.add_child(mid, late);
        assert_eq!(log.kinds_for(late), vec![AFTER_ATTACH]);
    }

    #[test]
    fn post_conflates_identical_messages() {
        let mut widgets = Widgets::new();
        let log = EventLog::new();
        log.install(&mut widgets);

        let panel = widgets.create_panel();
        widgets.post(panel, LAYOUT_REQUEST);
        widgets.post(panel, LAYOUT_REQUEST);
        widgets.post(panel, LAYOUT_REQUEST);
        assert_eq!(log.count(LAYOUT_REQUEST), 0);

        widgets.flush_posted();
        assert_eq!(log.count(LAYOUT_REQUEST), 1);

        // A fresh post after the flush is a fresh delivery.
        widgets.post(panel, LAYOUT_REQUEST);
        widgets.flush_posted();
        assert_eq!(log.count(LAYOUT_REQUEST), 2);
    }

    #[test]
    fn dispose_clears_subtree_and_is_repeat_safe() {
        let mut widgets = Widgets::new();
        let root = widgets.create_panel();
        let mid = widgets.create_panel();
        let leaf = widgets.create_widget();
        widgets.add_child(root, mid);
        widgets.add_child(mid, leaf);

        widgets.dispose(root);
        assert!(widgets.is_disposed(root));
        assert!(widgets.is_disposed(mid));
        assert!(widgets.is_disposed(leaf));
        assert!(widgets.children(root).is_empty());
        assert_eq!(widgets.parent(leaf), None);

        widgets.dispose(root);
        assert!(widgets.is_disposed(root));
    }

    #[test]
    fn classes_add_remove_query() {
        let mut widgets = Widgets::new();
        let w = widgets.create_widget();
        widgets.add_class(w, "p-mod-docking");
        widgets.add_class(w, "p-mod-docking");
        assert!(widgets.has_class(w, "p-mod-docking"));
        assert_eq!(widgets.classes(w).len(), 1);
        widgets.remove_class(w, "p-mod-docking");
        assert!(!widgets.has_class(w, "p-mod-docking"));
    }

    #[test]
    fn detached_subtree_is_not_attached() {
        let mut widgets = Widgets::new();
        let root = widgets.create_panel();
        let leaf = widgets.create_widget();
        widgets.add_child(root, leaf);
        assert!(!widgets.is_attached(leaf));
        widgets.attach(root);
        assert!(widgets.is_attached(leaf));
        widgets.detach(root);
        assert!(!widgets.is_attached(leaf));
    }
}
