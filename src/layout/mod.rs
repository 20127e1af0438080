//! Cell-geometry primitives shared by the arrangement pass and the docking
//! zone resolver.

pub mod arrange;

pub use arrange::{Arrangement, SplitHandle, TabSlot, arrange};

use ratatui::prelude::{Direction, Rect};

/// Length of `rect` along `direction`.
pub fn axis_extent(direction: Direction, rect: Rect) -> u16 {
    match direction {
        Direction::Horizontal => rect.width,
        Direction::Vertical => rect.height,
    }
}

/// Gap reserved between adjacent split children. The requested handle size
/// shrinks when the area cannot spare it while keeping at least one content
/// cell per child.
pub fn gap_size(direction: Direction, area: Rect, child_count: usize, handle_size: u16) -> u16 {
    if child_count < 2 || handle_size == 0 {
        return 0;
    }
    let total = axis_extent(direction, area);
    if total == 0 {
        return 0;
    }
    let min_content = child_count as u16;
    if total <= min_content {
        return 0;
    }
    let max_gap = total.saturating_sub(min_content);
    let per_gap = max_gap / (child_count as u16 - 1);
    handle_size.min(per_gap)
}

/// Distribute `area` among `child_count` children along `direction`,
/// proportionally to `weights`, with a handle gap between neighbors.
///
/// Returns the child rects and the gap rects (one per adjacent pair). A
/// weights slice of the wrong length falls back to uniform sizing; rounding
/// remainders go to the last child.
pub fn split_rects(
    direction: Direction,
    area: Rect,
    weights: &[f32],
    child_count: usize,
    handle_size: u16,
) -> (Vec<Rect>, Vec<Rect>) {
    if child_count == 0 {
        return (Vec::new(), Vec::new());
    }
    let gap = gap_size(direction, area, child_count, handle_size);
    let gap_total = gap.saturating_mul(child_count.saturating_sub(1) as u16);

    let weights = if weights.len() == child_count && weights.iter().any(|w| *w > 0.0) {
        weights.to_vec()
    } else {
        vec![1.0; child_count]
    };
    // Collapse rescaling can hand down weights summing below 1.0.
    let sum: f32 = weights.iter().sum();
    let total_weight = if sum > 0.0 { sum } else { 1.0 };
    let total = axis_extent(direction, area).saturating_sub(gap_total);

    let mut sizes = Vec::with_capacity(child_count);
    let mut used: u16 = 0;
    for (idx, weight) in weights.iter().enumerate() {
        let size = if idx + 1 == child_count {
            total.saturating_sub(used)
        } else {
            let portion = ((*weight / total_weight) * total as f32).floor() as u16;
            used = used.saturating_add(portion);
            portion
        };
        sizes.push(size);
    }

    let mut rects = Vec::with_capacity(child_count);
    let mut cursor = match direction {
        Direction::Horizontal => area.x,
        Direction::Vertical => area.y,
    };
    for size in &sizes {
        let rect = match direction {
            Direction::Horizontal => Rect {
                x: cursor,
                y: area.y,
                width: *size,
                height: area.height,
            },
            Direction::Vertical => Rect {
                x: area.x,
                y: cursor,
                width: area.width,
                height: *size,
            },
        };
        cursor = cursor.saturating_add(*size).saturating_add(gap);
        rects.push(rect);
    }

    let mut gaps = Vec::with_capacity(child_count.saturating_sub(1));
    if gap > 0 {
        for rect in rects.iter().take(child_count - 1) {
            let gap_rect = match direction {
                Direction::Horizontal => Rect {
                    x: rect.x.saturating_add(rect.width),
                    y: area.y,
                    width: gap,
                    height: area.height,
                },
                Direction::Vertical => Rect {
                    x: area.x,
                    y: rect.y.saturating_add(rect.height),
                    width: area.width,
                    height: gap,
                },
            };
            gaps.push(gap_rect);
        }
    }
    (rects, gaps)
}

pub fn rect_contains(rect: Rect, column: u16, row: u16) -> bool {
    if rect.width == 0 || rect.height == 0 {
        return false;
    }
    let max_x = rect.x.saturating_add(rect.width);
    let max_y = rect.y.saturating_add(rect.height);
    column >= rect.x && column < max_x && row >= rect.y && row < max_y
}
