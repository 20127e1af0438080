//! Arrangement pass: resolve a widget subtree to cell rectangles.
//!
//! The output is pure data. Hit tests during pointer handling and the
//! painter both read the same [`Arrangement`], so what the user clicks is
//! exactly what was drawn.

use std::collections::BTreeMap;

use ratatui::prelude::{Direction, Rect};

use crate::constants::TAB_BAR_HEIGHT;
use crate::widgets::{TabId, WidgetId, WidgetKind, Widgets};

use super::{rect_contains, split_rects};

/// One tab handle's strip inside a tab bar row.
#[derive(Debug, Clone)]
pub struct TabSlot {
    pub group: WidgetId,
    pub bar: WidgetId,
    pub widget: WidgetId,
    pub tab: TabId,
    pub index: usize,
    pub rect: Rect,
    /// Cell of the close mark, present on closable tabs that fit.
    pub close_rect: Option<Rect>,
    pub selected: bool,
}

/// Grabbable gap between two adjacent split children.
#[derive(Debug, Clone)]
pub struct SplitHandle {
    pub split: WidgetId,
    /// Index of the child leading the handle.
    pub index: usize,
    pub direction: Direction,
    pub rect: Rect,
}

/// Rectangles for every visible widget of one frame.
#[derive(Debug, Clone, Default)]
pub struct Arrangement {
    pub area: Rect,
    pub rects: BTreeMap<WidgetId, Rect>,
    pub tab_slots: Vec<TabSlot>,
    pub handles: Vec<SplitHandle>,
    /// Tab-groups in paint order.
    pub groups: Vec<WidgetId>,
}

impl Arrangement {
    pub fn rect(&self, id: WidgetId) -> Option<Rect> {
        self.rects.get(&id).copied()
    }

    pub fn slot_at(&self, column: u16, row: u16) -> Option<&TabSlot> {
        self.tab_slots
            .iter()
            .find(|slot| rect_contains(slot.rect, column, row))
    }

    pub fn handle_at(&self, column: u16, row: u16) -> Option<&SplitHandle> {
        self.handles
            .iter()
            .find(|handle| rect_contains(handle.rect, column, row))
    }

    /// The tab-group whose rect contains the point. Groups never overlap.
    pub fn group_at(&self, column: u16, row: u16) -> Option<WidgetId> {
        self.groups
            .iter()
            .copied()
            .find(|&group| self.rect(group).is_some_and(|r| rect_contains(r, column, row)))
    }
}

/// True when `id` is a tab-group shell: a panel holding a tab bar over a
/// stack.
pub(crate) fn is_tab_group(widgets: &Widgets, id: WidgetId) -> bool {
    let children = widgets.children(id);
    matches!(widgets.kind(id), Some(WidgetKind::Panel))
        && children.len() == 2
        && matches!(widgets.kind(children[0]), Some(WidgetKind::TabBar { .. }))
        && matches!(widgets.kind(children[1]), Some(WidgetKind::Stack { .. }))
}

/// Resolve the subtree under `root` within `area`.
pub fn arrange(widgets: &Widgets, root: WidgetId, area: Rect) -> Arrangement {
    let mut out = Arrangement {
        area,
        ..Arrangement::default()
    };
    arrange_into(widgets, root, area, &mut out);
    out
}

fn arrange_into(widgets: &Widgets, id: WidgetId, rect: Rect, out: &mut Arrangement) {
    out.rects.insert(id, rect);
    match widgets.kind(id) {
        Some(WidgetKind::Panel) if is_tab_group(widgets, id) => {
            out.groups.push(id);
            let children = widgets.children(id);
            let bar_height = TAB_BAR_HEIGHT.min(rect.height);
            let bar = Rect {
                height: bar_height,
                ..rect
            };
            let stack = Rect {
                y: rect.y.saturating_add(bar_height),
                height: rect.height.saturating_sub(bar_height),
                ..rect
            };
            arrange_into(widgets, children[0], bar, out);
            arrange_into(widgets, children[1], stack, out);
        }
        Some(WidgetKind::Panel) => {
            // Plain box: every child spans the panel.
            for &child in widgets.children(id) {
                arrange_into(widgets, child, rect, out);
            }
        }
        Some(WidgetKind::Split {
            direction,
            handle_size,
            weights,
        }) => {
            let children = widgets.children(id);
            let (rects, gaps) = split_rects(*direction, rect, weights, children.len(), *handle_size);
            for (&child, child_rect) in children.iter().zip(rects.iter().copied()) {
                arrange_into(widgets, child, child_rect, out);
            }
            for (index, gap_rect) in gaps.into_iter().enumerate() {
                out.handles.push(SplitHandle {
                    split: id,
                    index,
                    direction: *direction,
                    rect: gap_rect,
                });
            }
        }
        Some(WidgetKind::Stack { current }) => {
            if let Some(current) = current
                && widgets.children(id).contains(current)
            {
                arrange_into(widgets, *current, rect, out);
            }
        }
        Some(WidgetKind::TabBar { tabs, selected }) => {
            arrange_tab_bar(widgets, id, rect, tabs, *selected, out);
        }
        Some(WidgetKind::Content) | None => {}
    }
}

fn arrange_tab_bar(
    widgets: &Widgets,
    bar: WidgetId,
    rect: Rect,
    tabs: &[TabId],
    selected: Option<usize>,
    out: &mut Arrangement,
) {
    if rect.height == 0 {
        return;
    }
    let Some(group) = widgets.parent(bar) else {
        return;
    };
    let stack_children: &[WidgetId] = widgets
        .children(group)
        .get(1)
        .map(|&stack| widgets.children(stack))
        .unwrap_or_default();

    let right = rect.x.saturating_add(rect.width);
    let mut cursor = rect.x;
    for (index, (&tab_id, &widget)) in tabs.iter().zip(stack_children.iter()).enumerate() {
        let remaining = right.saturating_sub(cursor);
        if remaining < 3 {
            break;
        }
        let Some(tab) = widgets.tab(tab_id) else {
            continue;
        };
        let title_width = tab.title.chars().count().min(u16::MAX as usize) as u16;
        let close_width = if tab.closable { 2 } else { 0 };
        let width = title_width
            .saturating_add(2)
            .saturating_add(close_width)
            .min(remaining);
        let slot_rect = Rect {
            x: cursor,
            y: rect.y,
            width,
            height: 1,
        };
        // The close mark sits just inside the slot's right edge.
        let close_rect = (tab.closable && width >= title_width.saturating_add(4)).then(|| Rect {
            x: slot_rect.x + slot_rect.width - 2,
            y: slot_rect.y,
            width: 1,
            height: 1,
        });
        out.tab_slots.push(TabSlot {
            group,
            bar,
            widget,
            tab: tab_id,
            index,
            rect: slot_rect,
            close_rect,
            selected: selected == Some(index),
        });
        cursor = cursor.saturating_add(width);
    }
}
