//! Tree mutations behind the dock panel: insertion in every mode, removal
//! with structural collapse, and split resizing.
//!
//! A split's `weights` stay parallel to its children; only the helpers in
//! this module may grow or shrink either side.

use ratatui::prelude::{Direction, Rect};

use super::{DockMode, DockPanel, HANDLE_SIZE_PROPERTY};
use crate::constants::{DEFAULT_HANDLE_SIZE, DOCK_SPLIT_PANEL_CLASS, DOCK_TAB_PANEL_CLASS};
use crate::layout::arrange::is_tab_group;
use crate::layout::{axis_extent, split_rects};
use crate::widgets::{LAYOUT_REQUEST, WidgetId, WidgetKind, Widgets};

/// Smallest extent a split child may be dragged down to.
const MIN_PANE_EXTENT: i32 = 2;

impl DockPanel {
    /// Insert a widget whose arguments already passed validation, then
    /// schedule a relayout.
    pub(super) fn insert_validated(
        &mut self,
        widget: WidgetId,
        mode: Option<DockMode>,
        reference: Option<WidgetId>,
    ) {
        insert(&mut self.widgets, self.id, widget, mode, reference);
        self.widgets.post(self.id, LAYOUT_REQUEST);
    }
}

/// Tab-group (tagged panel) whose stack holds `widget`, if any.
pub(super) fn group_of(widgets: &Widgets, widget: WidgetId) -> Option<WidgetId> {
    let stack = widgets.parent(widget)?;
    if !matches!(widgets.kind(stack), Some(WidgetKind::Stack { .. })) {
        return None;
    }
    let group = widgets.parent(stack)?;
    is_tab_group(widgets, group).then_some(group)
}

/// Position of `widget` within its group's stack.
pub(super) fn slot_index(widgets: &Widgets, group: WidgetId, widget: WidgetId) -> Option<usize> {
    let stack = widgets.children(group).get(1).copied()?;
    widgets.children(stack).iter().position(|&c| c == widget)
}

fn in_dock(widgets: &Widgets, panel: WidgetId, id: WidgetId) -> bool {
    let mut cursor = Some(id);
    while let Some(current) = cursor {
        if current == panel {
            return true;
        }
        cursor = widgets.parent(current);
    }
    false
}

pub(super) fn bar_and_stack(widgets: &Widgets, group: WidgetId) -> Option<(WidgetId, WidgetId)> {
    let children = widgets.children(group);
    match (children.first(), children.get(1)) {
        (Some(&bar), Some(&stack)) => Some((bar, stack)),
        _ => None,
    }
}

// Weight-preserving split edits.

fn split_insert(widgets: &mut Widgets, split: WidgetId, index: usize, child: WidgetId, weight: f32) {
    widgets.insert_child(split, index, child);
    if let Some(weights) = widgets.split_weights_mut(split) {
        let index = index.min(weights.len());
        weights.insert(index, weight);
    }
}

fn split_remove(widgets: &mut Widgets, split: WidgetId, child: WidgetId) -> Option<f32> {
    let index = widgets.children(split).iter().position(|&c| c == child)?;
    widgets.remove_child(split, child);
    widgets
        .split_weights_mut(split)
        .and_then(|weights| (index < weights.len()).then(|| weights.remove(index)))
}

fn mean_weight(weights: &[f32]) -> f32 {
    if weights.is_empty() {
        1.0
    } else {
        weights.iter().sum::<f32>() / weights.len() as f32
    }
}

fn new_split(widgets: &mut Widgets, panel: WidgetId, direction: Direction) -> WidgetId {
    let handle_size = HANDLE_SIZE_PROPERTY.get(widgets, panel);
    let split = widgets.create_split(direction, handle_size);
    widgets.add_class(split, DOCK_SPLIT_PANEL_CLASS);
    split
}

/// Build a tab-group around `widget`: tagged panel over a bar and a stack.
fn create_group(widgets: &mut Widgets, widget: WidgetId) -> WidgetId {
    let group = widgets.create_panel();
    widgets.add_class(group, DOCK_TAB_PANEL_CLASS);
    let bar = widgets.create_tab_bar();
    let stack = widgets.create_stack();
    widgets.add_child(group, bar);
    widgets.add_child(group, stack);
    insert_into_group(widgets, group, 0, widget);
    group
}

/// Add `widget` at `index` of the group, tab and stack slot together, and
/// select it.
fn insert_into_group(widgets: &mut Widgets, group: WidgetId, index: usize, widget: WidgetId) {
    let Some((bar, stack)) = bar_and_stack(widgets, group) else {
        return;
    };
    let Some(tab) = DockPanel::tab_of(widgets, widget) else {
        return;
    };
    let index = index.min(widgets.children(stack).len());
    widgets.insert_child(stack, index, widget);
    widgets.tab_bar_insert(bar, index, tab);
    select_in_group(widgets, group, index);
}

fn select_in_group(widgets: &mut Widgets, group: WidgetId, index: usize) {
    let Some((bar, stack)) = bar_and_stack(widgets, group) else {
        return;
    };
    let current = widgets.children(stack).get(index).copied();
    widgets.set_tab_bar_selected(bar, current.is_some().then_some(index));
    widgets.set_stack_current(stack, current);
}

/// Select the tab of `widget` within its group. False when the widget is
/// not docked.
pub(super) fn select_widget(widgets: &mut Widgets, widget: WidgetId) -> bool {
    let Some(group) = group_of(widgets, widget) else {
        return false;
    };
    let Some(index) = slot_index(widgets, group, widget) else {
        return false;
    };
    select_in_group(widgets, group, index);
    true
}

fn remove_from_group(widgets: &mut Widgets, group: WidgetId, widget: WidgetId) -> bool {
    let Some((bar, stack)) = bar_and_stack(widgets, group) else {
        return false;
    };
    let Some(index) = widgets.children(stack).iter().position(|&c| c == widget) else {
        return false;
    };
    let selected = widgets.tab_bar_selected(bar);
    widgets.remove_child(stack, widget);
    widgets.tab_bar_remove(bar, index);
    let len = widgets.children(stack).len();
    let repaired = match selected {
        Some(_) if len == 0 => None,
        Some(selected) if index < selected => Some(selected - 1),
        Some(selected) if index == selected => Some(index.min(len - 1)),
        other => other,
    };
    match repaired {
        Some(index) => select_in_group(widgets, group, index),
        None => {
            widgets.set_tab_bar_selected(bar, None);
            widgets.set_stack_current(stack, None);
        }
    }
    true
}

/// Remove `widget` from wherever it is docked, collapsing any structure
/// the removal empties. The widget itself is left alive and parentless.
pub(super) fn remove_from_tree(widgets: &mut Widgets, panel: WidgetId, widget: WidgetId) -> bool {
    let Some(group) = group_of(widgets, widget) else {
        return false;
    };
    if !remove_from_group(widgets, group, widget) {
        return false;
    }
    tracing::debug!(widget = ?widget, "removed widget from dock");
    let emptied = bar_and_stack(widgets, group)
        .is_none_or(|(_, stack)| widgets.children(stack).is_empty());
    if emptied
        && let Some(split) = widgets.parent(group)
        && matches!(widgets.kind(split), Some(WidgetKind::Split { .. }))
    {
        split_remove(widgets, split, group);
        widgets.dispose(group);
        collapse_upward(widgets, panel, split);
    }
    true
}

/// Walk degenerate splits up toward the root: empty splits vanish, lone
/// children take their parent split's slot, and the root split absorbs a
/// lone split child instead of being replaced.
fn collapse_upward(widgets: &mut Widgets, panel: WidgetId, split: WidgetId) {
    let mut cursor = Some(split);
    while let Some(split) = cursor {
        if !matches!(widgets.kind(split), Some(WidgetKind::Split { .. })) {
            break;
        }
        let Some(parent) = widgets.parent(split) else {
            break;
        };
        if parent == panel {
            absorb_into_root(widgets, split);
            break;
        }
        cursor = match widgets.children(split).len() {
            0 => {
                split_remove(widgets, parent, split);
                widgets.dispose(split);
                Some(parent)
            }
            1 => {
                let child = widgets.children(split)[0];
                let index = widgets
                    .children(parent)
                    .iter()
                    .position(|&c| c == split)
                    .unwrap_or(0);
                let weight = split_remove(widgets, parent, split).unwrap_or(1.0);
                widgets.remove_child(split, child);
                widgets.dispose(split);
                split_insert(widgets, parent, index, child, weight);
                merge_same_axis(widgets, parent, child);
                Some(parent)
            }
            _ => None,
        };
    }
}

/// A lone split child of the root is flattened into the root: the root
/// takes its direction and children, keeping the panel's root identity.
fn absorb_into_root(widgets: &mut Widgets, root: WidgetId) {
    let children = widgets.children(root);
    if children.len() != 1 {
        return;
    }
    let child = children[0];
    if !matches!(widgets.kind(child), Some(WidgetKind::Split { .. })) {
        return;
    }
    let direction = widgets.split_direction(child).unwrap_or(Direction::Horizontal);
    let grandchildren: Vec<WidgetId> = widgets.children(child).to_vec();
    let weights: Vec<f32> = widgets.split_weights(child).to_vec();
    split_remove(widgets, root, child);
    for (index, grandchild) in grandchildren.into_iter().enumerate() {
        widgets.remove_child(child, grandchild);
        let weight = weights.get(index).copied().unwrap_or(1.0);
        split_insert(widgets, root, index, grandchild, weight);
    }
    widgets.set_split_direction(root, direction);
    widgets.dispose(child);
}

/// After hoisting, a split child sharing its parent's axis is spliced into
/// the parent, its weights rescaled to fill the slot it held.
fn merge_same_axis(widgets: &mut Widgets, parent: WidgetId, child: WidgetId) {
    let same_axis = matches!(
        (widgets.split_direction(parent), widgets.split_direction(child)),
        (Some(a), Some(b)) if a == b
    );
    if !same_axis {
        return;
    }
    let Some(index) = widgets.children(parent).iter().position(|&c| c == child) else {
        return;
    };
    let weight = split_remove(widgets, parent, child).unwrap_or(1.0);
    let grandchildren: Vec<WidgetId> = widgets.children(child).to_vec();
    let grandweights: Vec<f32> = widgets.split_weights(child).to_vec();
    let total: f32 = grandweights.iter().sum();
    let scale = if total > 0.0 {
        weight / total
    } else {
        weight / grandchildren.len().max(1) as f32
    };
    for (offset, grandchild) in grandchildren.into_iter().enumerate() {
        widgets.remove_child(child, grandchild);
        let slice = grandweights.get(offset).copied().unwrap_or(1.0) * scale;
        split_insert(widgets, parent, index + offset, grandchild, slice);
    }
    widgets.dispose(child);
}

/// Root split adjusted for a root-relative split insertion. A mismatched
/// direction flips in place when the root is near-empty, otherwise the old
/// root is wrapped as the sole child of a fresh root on the wanted axis.
fn ensure_root(widgets: &mut Widgets, panel: WidgetId, direction: Direction) -> Option<WidgetId> {
    let root = widgets.children(panel).first().copied()?;
    if widgets.split_direction(root) == Some(direction) {
        return Some(root);
    }
    if widgets.children(root).len() <= 1 {
        widgets.set_split_direction(root, direction);
        return Some(root);
    }
    let new_root = new_split(widgets, panel, direction);
    widgets.remove_child(panel, root);
    widgets.add_child(panel, new_root);
    split_insert(widgets, new_root, 0, root, 1.0);
    tracing::debug!(root = ?new_root, ?direction, "wrapped root split");
    Some(new_root)
}

fn first_group(widgets: &Widgets, id: WidgetId) -> Option<WidgetId> {
    if is_tab_group(widgets, id) {
        return Some(id);
    }
    for &child in widgets.children(id) {
        if let Some(found) = first_group(widgets, child) {
            return Some(found);
        }
    }
    None
}

fn append_fresh_group(widgets: &mut Widgets, panel: WidgetId, widget: WidgetId) {
    let Some(root) = widgets.children(panel).first().copied() else {
        return;
    };
    let weight = mean_weight(widgets.split_weights(root));
    let index = widgets.children(root).len();
    let group = create_group(widgets, widget);
    split_insert(widgets, root, index, group, weight);
}

/// The insertion algorithm proper. `widget` is assumed validated; a stale
/// or missing reference degrades to root-relative placement.
pub(super) fn insert(
    widgets: &mut Widgets,
    panel: WidgetId,
    widget: WidgetId,
    mode: Option<DockMode>,
    reference: Option<WidgetId>,
) {
    // Re-adding a docked widget moves it.
    remove_from_tree(widgets, panel, widget);
    let live = reference.filter(|&reference| {
        group_of(widgets, reference).is_some_and(|group| in_dock(widgets, panel, group))
    });
    match (mode, live) {
        (Some(mode), Some(reference)) if mode.is_split() => {
            insert_split(widgets, panel, widget, mode, reference);
        }
        (Some(mode), Some(reference)) => {
            insert_tab(widgets, widget, mode, reference);
        }
        (Some(mode), None) if mode.is_split() => {
            let Some(root) = ensure_root(widgets, panel, mode.axis()) else {
                return;
            };
            let weight = mean_weight(widgets.split_weights(root));
            let index = if mode.is_before() {
                0
            } else {
                widgets.children(root).len()
            };
            let group = create_group(widgets, widget);
            split_insert(widgets, root, index, group, weight);
        }
        (Some(mode), None) => {
            let Some(root) = widgets.children(panel).first().copied() else {
                return;
            };
            match first_group(widgets, root) {
                Some(group) => {
                    let stack_len = bar_and_stack(widgets, group)
                        .map(|(_, stack)| widgets.children(stack).len())
                        .unwrap_or(0);
                    let index = if mode.is_before() { 0 } else { stack_len };
                    insert_into_group(widgets, group, index, widget);
                }
                None => append_fresh_group(widgets, panel, widget),
            }
        }
        (None, _) => append_fresh_group(widgets, panel, widget),
    }
    tracing::debug!(widget = ?widget, ?mode, ?reference, "inserted widget");
}

fn insert_split(
    widgets: &mut Widgets,
    panel: WidgetId,
    widget: WidgetId,
    mode: DockMode,
    reference: WidgetId,
) {
    let Some(ref_group) = group_of(widgets, reference) else {
        return;
    };
    let Some(split) = widgets.parent(ref_group) else {
        return;
    };
    if !matches!(widgets.kind(split), Some(WidgetKind::Split { .. })) {
        return;
    }
    let Some(ref_index) = widgets.children(split).iter().position(|&c| c == ref_group) else {
        return;
    };
    let axis = mode.axis();
    if widgets.split_direction(split) == Some(axis) {
        let weight = mean_weight(widgets.split_weights(split));
        let index = if mode.is_before() { ref_index } else { ref_index + 1 };
        let group = create_group(widgets, widget);
        split_insert(widgets, split, index, group, weight);
    } else if widgets.children(split).len() <= 1 {
        widgets.set_split_direction(split, axis);
        let weight = mean_weight(widgets.split_weights(split));
        let index = if mode.is_before() { 0 } else { widgets.children(split).len() };
        let group = create_group(widgets, widget);
        split_insert(widgets, split, index, group, weight);
    } else {
        // The slot splits on the perpendicular axis: wrap the reference
        // group and the new group in a child split holding the old slot's
        // weight.
        let slot_weight = split_remove(widgets, split, ref_group).unwrap_or(1.0);
        let wrapper = new_split(widgets, panel, axis);
        let group = create_group(widgets, widget);
        let (first, second) = if mode.is_before() {
            (group, ref_group)
        } else {
            (ref_group, group)
        };
        split_insert(widgets, wrapper, 0, first, 1.0);
        split_insert(widgets, wrapper, 1, second, 1.0);
        split_insert(widgets, split, ref_index, wrapper, slot_weight);
    }
}

fn insert_tab(widgets: &mut Widgets, widget: WidgetId, mode: DockMode, reference: WidgetId) {
    let Some(group) = group_of(widgets, reference) else {
        return;
    };
    let Some(index) = slot_index(widgets, group, reference) else {
        return;
    };
    let index = if mode.is_before() { index } else { index + 1 };
    insert_into_group(widgets, group, index, widget);
}

/// Shift the boundary after child `index` of `split` by `delta` cells,
/// clamped so neither neighbor drops below a usable extent. `rect` is the
/// split's last arranged rect. Returns true when the weights changed.
pub(super) fn apply_handle_drag(
    widgets: &mut Widgets,
    rect: Rect,
    split: WidgetId,
    index: usize,
    delta: i32,
) -> bool {
    let Some(direction) = widgets.split_direction(split) else {
        return false;
    };
    let handle_size = widgets.split_handle_size(split).unwrap_or(DEFAULT_HANDLE_SIZE);
    let count = widgets.children(split).len();
    if count < 2 || index + 1 >= count {
        return false;
    }
    let weights: Vec<f32> = widgets.split_weights(split).to_vec();
    let (rects, _) = split_rects(direction, rect, &weights, count, handle_size);
    if rects.len() != count {
        return false;
    }
    let mut sizes: Vec<i32> = rects
        .iter()
        .map(|r| axis_extent(direction, *r) as i32)
        .collect();
    let pair = sizes[index] + sizes[index + 1];
    if pair < 2 * MIN_PANE_EXTENT {
        return false;
    }
    let moved = (sizes[index] + delta).clamp(MIN_PANE_EXTENT, pair - MIN_PANE_EXTENT);
    if moved == sizes[index] {
        return false;
    }
    sizes[index] = moved;
    sizes[index + 1] = pair - moved;
    let new_weights: Vec<f32> = sizes.iter().map(|&s| s.max(1) as f32).collect();
    if let Some(weights) = widgets.split_weights_mut(split) {
        *weights = new_weights;
    }
    tracing::trace!(split = ?split, index, delta, "resized split");
    true
}
