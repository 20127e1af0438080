//! Drop-target resolution for tab drags.
//!
//! Given the cached arrangement and a pointer position, work out where a
//! release would put the dragged widget and which region to preview. Tab
//! bars win over edge bands; bands cover the outer quarter of a group's
//! content area, at least one cell deep; the remaining center tabs onto
//! the group. Anywhere inside the panel that is not over a group falls
//! back to root placement.

use ratatui::prelude::Rect;

use super::tree;
use super::DockMode;
use crate::constants::EDGE_BAND_DIVISOR;
use crate::layout::{Arrangement, rect_contains};
use crate::widgets::{WidgetId, Widgets};

/// Where a drop would land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Append a fresh tab-group at the end of the root split.
    Root,
    /// Dock relative to an existing widget.
    At { mode: DockMode, reference: WidgetId },
}

/// A resolved drop target with the region the overlay should preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTarget {
    pub placement: Placement,
    pub preview: Rect,
}

/// Resolve the drop target for `dragged` at the given pointer position.
/// None means a release there is a no-op.
pub(super) fn resolve(
    widgets: &Widgets,
    arr: &Arrangement,
    dragged: WidgetId,
    column: u16,
    row: u16,
) -> Option<DropTarget> {
    if !rect_contains(arr.area, column, row) {
        return None;
    }

    if let Some(slot) = arr.slot_at(column, row) {
        let before = column < slot.rect.x + slot.rect.width / 2;
        let placement = if slot.widget == dragged {
            same_place(widgets, slot.group, dragged)
        } else if before {
            Placement::At {
                mode: DockMode::TabBefore,
                reference: slot.widget,
            }
        } else {
            Placement::At {
                mode: DockMode::TabAfter,
                reference: slot.widget,
            }
        };
        return Some(target(placement, arr, slot.group));
    }

    for &group in &arr.groups {
        let Some((bar, stack)) = tree::bar_and_stack(widgets, group) else {
            continue;
        };
        if arr
            .rect(bar)
            .is_some_and(|rect| rect_contains(rect, column, row))
        {
            // Trailing bar space appends to the group.
            let placement = append_placement(widgets, group, stack, dragged);
            return Some(target(placement, arr, group));
        }
        let Some(stack_rect) = arr.rect(stack) else {
            continue;
        };
        if !rect_contains(stack_rect, column, row) {
            continue;
        }
        if let Some(mode) = edge_band(stack_rect, column, row) {
            let placement = match split_reference(widgets, stack, dragged) {
                Some(reference) => Placement::At { mode, reference },
                None => Placement::Root,
            };
            let preview = match placement {
                Placement::At { .. } => {
                    half_rect(arr.rect(group).unwrap_or(stack_rect), mode)
                }
                Placement::Root => arr.area,
            };
            return Some(DropTarget { placement, preview });
        }
        let placement = append_placement(widgets, group, stack, dragged);
        return Some(target(placement, arr, group));
    }

    Some(DropTarget {
        placement: Placement::Root,
        preview: arr.area,
    })
}

fn target(placement: Placement, arr: &Arrangement, group: WidgetId) -> DropTarget {
    let preview = match placement {
        Placement::Root => arr.area,
        Placement::At { .. } => arr.rect(group).unwrap_or(arr.area),
    };
    DropTarget { placement, preview }
}

/// Placement that re-inserts `dragged` where it already sits, expressed
/// through a neighbor so the commit is harmless.
fn same_place(widgets: &Widgets, group: WidgetId, dragged: WidgetId) -> Placement {
    let members = tree::bar_and_stack(widgets, group)
        .map(|(_, stack)| widgets.children(stack))
        .unwrap_or_default();
    let index = members.iter().position(|&m| m == dragged);
    match index {
        Some(index) if index > 0 => Placement::At {
            mode: DockMode::TabAfter,
            reference: members[index - 1],
        },
        Some(index) if index + 1 < members.len() => Placement::At {
            mode: DockMode::TabBefore,
            reference: members[index + 1],
        },
        _ => Placement::Root,
    }
}

/// Placement appending to the end of `group`'s bar.
fn append_placement(
    widgets: &Widgets,
    group: WidgetId,
    stack: WidgetId,
    dragged: WidgetId,
) -> Placement {
    let members = widgets.children(stack);
    match members.last() {
        Some(&last) if last != dragged => Placement::At {
            mode: DockMode::TabAfter,
            reference: last,
        },
        Some(_) if members.len() > 1 => Placement::At {
            mode: DockMode::TabAfter,
            reference: members[members.len() - 2],
        },
        _ => same_place(widgets, group, dragged),
    }
}

/// A group member other than the dragged widget, to anchor a split.
fn split_reference(widgets: &Widgets, stack: WidgetId, dragged: WidgetId) -> Option<WidgetId> {
    widgets
        .children(stack)
        .iter()
        .copied()
        .find(|&member| member != dragged)
}

/// Which edge band of `rect` contains the point, if any. Bands are the
/// outer quarter per side, at least one cell; the nearest edge wins, with
/// ties broken left, right, top, bottom.
fn edge_band(rect: Rect, column: u16, row: u16) -> Option<DockMode> {
    let right_edge = rect.x + rect.width - 1;
    let bottom_edge = rect.y + rect.height - 1;
    let h_band = (rect.width / EDGE_BAND_DIVISOR).max(1);
    let v_band = (rect.height / EDGE_BAND_DIVISOR).max(1);
    let candidates = [
        (column - rect.x, h_band, DockMode::SplitLeft),
        (right_edge - column, h_band, DockMode::SplitRight),
        (row - rect.y, v_band, DockMode::SplitTop),
        (bottom_edge - row, v_band, DockMode::SplitBottom),
    ];
    let mut best: Option<(u16, DockMode)> = None;
    for (distance, band, mode) in candidates {
        if distance < band && best.is_none_or(|(seen, _)| distance < seen) {
            best = Some((distance, mode));
        }
    }
    best.map(|(_, mode)| mode)
}

/// Half of `rect` on the side the split mode names; tab modes keep the
/// whole rect.
fn half_rect(rect: Rect, mode: DockMode) -> Rect {
    match mode {
        DockMode::SplitLeft => Rect {
            width: rect.width / 2,
            ..rect
        },
        DockMode::SplitRight => Rect {
            x: rect.x + rect.width / 2,
            width: rect.width - rect.width / 2,
            ..rect
        },
        DockMode::SplitTop => Rect {
            height: rect.height / 2,
            ..rect
        },
        DockMode::SplitBottom => Rect {
            y: rect.y + rect.height / 2,
            height: rect.height - rect.height / 2,
            ..rect
        },
        DockMode::TabBefore | DockMode::TabAfter => rect,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dock::DockPanel;
    use crate::layout::arrange;

    // Two side-by-side groups in a 41x10 panel: "a" on [0, 19), the
    // handle on [19, 22), "b" on [22, 41).
    fn side_by_side() -> (DockPanel, WidgetId, WidgetId) {
        let mut panel = DockPanel::new();
        let a = panel.create_content("a", false);
        let b = panel.create_content("b", false);
        panel.add_widget(a, None, None).unwrap();
        panel
            .add_widget(b, Some(DockMode::SplitRight), Some(a))
            .unwrap();
        panel.arrange_for(Rect::new(0, 0, 41, 10));
        (panel, a, b)
    }

    fn resolve_at(panel: &DockPanel, dragged: WidgetId, column: u16, row: u16) -> Option<DropTarget> {
        let arr = panel.arrangement().unwrap();
        resolve(panel.widgets(), arr, dragged, column, row)
    }

    #[test]
    fn left_band_splits_left_of_the_group() {
        let (panel, a, b) = side_by_side();
        // Stack of "a" spans rows 1..10, width 19, so bands are 4 wide
        // and 2 tall.
        let hit = resolve_at(&panel, b, 2, 5).unwrap();
        assert_eq!(
            hit.placement,
            Placement::At {
                mode: DockMode::SplitLeft,
                reference: a
            }
        );
        assert_eq!(hit.preview, Rect::new(0, 0, 9, 10));
    }

    #[test]
    fn band_boundary_is_exclusive() {
        let (panel, a, b) = side_by_side();
        // Column 3 is the last left-band cell, column 4 the first center
        // cell at this row.
        let inside = resolve_at(&panel, b, 3, 5).unwrap();
        assert_eq!(
            inside.placement,
            Placement::At {
                mode: DockMode::SplitLeft,
                reference: a
            }
        );
        let center = resolve_at(&panel, b, 4, 5).unwrap();
        assert_eq!(
            center.placement,
            Placement::At {
                mode: DockMode::TabAfter,
                reference: a
            }
        );
    }

    #[test]
    fn nearest_edge_wins_and_ties_go_left() {
        let (panel, a, b) = side_by_side();
        // Row 2 is one cell into the top band; column 2 is two cells into
        // the left band, so top is nearer.
        let top = resolve_at(&panel, b, 2, 2).unwrap();
        assert_eq!(
            top.placement,
            Placement::At {
                mode: DockMode::SplitTop,
                reference: a
            }
        );
        // Equal distances prefer the horizontal edge.
        let tie = resolve_at(&panel, b, 1, 2).unwrap();
        assert_eq!(
            tie.placement,
            Placement::At {
                mode: DockMode::SplitLeft,
                reference: a
            }
        );
    }

    #[test]
    fn center_tabs_after_the_last_member() {
        let (panel, a, b) = side_by_side();
        let hit = resolve_at(&panel, b, 9, 5).unwrap();
        assert_eq!(
            hit.placement,
            Placement::At {
                mode: DockMode::TabAfter,
                reference: a
            }
        );
        assert_eq!(hit.preview, Rect::new(0, 0, 19, 10));
    }

    #[test]
    fn tab_slot_halves_pick_before_or_after() {
        let (panel, _, b) = side_by_side();
        // The "a" slot spans [0, 3): left half is column 0, right is 1-2.
        let before = resolve_at(&panel, b, 0, 0).unwrap();
        assert!(matches!(
            before.placement,
            Placement::At {
                mode: DockMode::TabBefore,
                ..
            }
        ));
        let after = resolve_at(&panel, b, 2, 0).unwrap();
        assert!(matches!(
            after.placement,
            Placement::At {
                mode: DockMode::TabAfter,
                ..
            }
        ));
    }

    #[test]
    fn bar_row_beats_the_top_band() {
        let (panel, a, b) = side_by_side();
        let hit = resolve_at(&panel, b, 10, 0).unwrap();
        assert_eq!(
            hit.placement,
            Placement::At {
                mode: DockMode::TabAfter,
                reference: a
            }
        );
    }

    #[test]
    fn own_slot_resolves_to_a_harmless_neighbor() {
        let mut panel = DockPanel::new();
        let a = panel.create_content("a", false);
        let b = panel.create_content("b", false);
        panel.add_widget(a, None, None).unwrap();
        panel
            .add_widget(b, Some(DockMode::TabAfter), Some(a))
            .unwrap();
        panel.arrange_for(Rect::new(0, 0, 41, 10));

        // Slot of "b" spans [3, 6).
        let hit = resolve_at(&panel, b, 4, 0).unwrap();
        assert_eq!(
            hit.placement,
            Placement::At {
                mode: DockMode::TabAfter,
                reference: a
            }
        );
    }

    #[test]
    fn sole_member_over_its_own_group_falls_back_to_root() {
        let (panel, _, b) = side_by_side();
        // Own slot, own center and own band all degrade to root.
        let slot = resolve_at(&panel, b, 23, 0).unwrap();
        assert_eq!(slot.placement, Placement::Root);
        let center = resolve_at(&panel, b, 31, 5).unwrap();
        assert_eq!(center.placement, Placement::Root);
        assert_eq!(center.preview, Rect::new(0, 0, 41, 10));
    }

    #[test]
    fn handle_gap_resolves_to_root() {
        let (panel, _, b) = side_by_side();
        let hit = resolve_at(&panel, b, 20, 5).unwrap();
        assert_eq!(hit.placement, Placement::Root);
        assert_eq!(hit.preview, Rect::new(0, 0, 41, 10));
    }

    #[test]
    fn outside_the_panel_resolves_to_nothing() {
        let (panel, _, b) = side_by_side();
        assert_eq!(resolve_at(&panel, b, 41, 5), None);
        assert_eq!(resolve_at(&panel, b, 10, 10), None);
    }

    #[test]
    fn preview_halves_cover_each_side() {
        let rect = Rect::new(10, 2, 21, 9);
        assert_eq!(half_rect(rect, DockMode::SplitLeft), Rect::new(10, 2, 10, 9));
        assert_eq!(half_rect(rect, DockMode::SplitRight), Rect::new(20, 2, 11, 9));
        assert_eq!(half_rect(rect, DockMode::SplitTop), Rect::new(10, 2, 21, 4));
        assert_eq!(half_rect(rect, DockMode::SplitBottom), Rect::new(10, 6, 21, 5));
        assert_eq!(half_rect(rect, DockMode::TabAfter), rect);
    }

    #[test]
    fn band_geometry_is_exact() {
        let rect = Rect::new(0, 1, 19, 9);
        assert_eq!(edge_band(rect, 0, 5), Some(DockMode::SplitLeft));
        assert_eq!(edge_band(rect, 18, 5), Some(DockMode::SplitRight));
        assert_eq!(edge_band(rect, 9, 1), Some(DockMode::SplitTop));
        assert_eq!(edge_band(rect, 9, 9), Some(DockMode::SplitBottom));
        assert_eq!(edge_band(rect, 9, 5), None);
        // A two-cell rect is nothing but bands.
        let tiny = Rect::new(0, 0, 2, 2);
        assert_eq!(edge_band(tiny, 0, 0), Some(DockMode::SplitLeft));
        assert_eq!(edge_band(tiny, 1, 0), Some(DockMode::SplitRight));
    }

    #[test]
    fn arrangement_is_reusable_for_headless_resolution() {
        let (panel, a, _) = side_by_side();
        let arr = arrange(panel.widgets(), panel.id(), Rect::new(0, 0, 41, 10));
        let hit = resolve(panel.widgets(), &arr, a, 30, 5).unwrap();
        assert_eq!(
            hit.placement,
            Placement::At {
                mode: DockMode::TabAfter,
                // "b" is the only member of the right group.
                reference: panel.widgets().children(
                    tree::bar_and_stack(panel.widgets(), arr.groups[1]).unwrap().1
                )[0],
            }
        );
    }
}
