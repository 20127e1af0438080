//! UiFrame: a thin wrapper around `ratatui::Frame` that clamps drawing to
//! the visible area and centralizes clipping logic.
//!
//! Arranged rects can drift partially outside the terminal buffer while a
//! resize is in flight. Writing out-of-bounds into the underlying `Buffer`
//! panics, so every draw call here clips first.

use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Direction, Rect};
use ratatui::style::Style;
use ratatui::widgets::Widget;

/// Wrapper around `ratatui::Frame` that clamps drawing to the visible
/// area. The dock chrome renders through this type instead of touching
/// the buffer directly.
pub struct UiFrame<'a> {
    area: Rect,
    buffer: &'a mut Buffer,
}

impl<'a> UiFrame<'a> {
    pub fn new(frame: &'a mut Frame<'_>) -> Self {
        let area = frame.area();
        let buffer = frame.buffer_mut();
        Self { area, buffer }
    }

    /// Construct a `UiFrame` directly from an area and buffer, for
    /// offscreen rendering and tests.
    pub(crate) fn from_parts(area: Rect, buffer: &'a mut Buffer) -> Self {
        Self { area, buffer }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    fn clip_rect(&self, rect: Rect) -> Option<Rect> {
        let clipped = rect.intersection(self.area);
        if clipped.width == 0 || clipped.height == 0 {
            None
        } else {
            Some(clipped)
        }
    }

    pub fn render_widget<W>(&mut self, widget: W, area: Rect)
    where
        W: Widget,
    {
        if let Some(clipped) = self.clip_rect(area) {
            widget.render(clipped, self.buffer);
        }
    }

    /// Fill every cell of `rect` with `symbol` in `style`.
    pub fn fill(&mut self, rect: Rect, symbol: &str, style: Style) {
        let Some(clipped) = self.clip_rect(rect) else {
            return;
        };
        for y in clipped.y..clipped.y.saturating_add(clipped.height) {
            for x in clipped.x..clipped.x.saturating_add(clipped.width) {
                if let Some(cell) = self.buffer.cell_mut((x, y)) {
                    cell.set_symbol(symbol);
                    cell.set_style(style);
                }
            }
        }
    }

    /// Write `text` at (x, y), truncated to `bounds` and the frame area.
    pub fn set_string_in(&mut self, bounds: Rect, x: u16, y: u16, text: &str, style: Style) {
        let bounds = bounds.intersection(self.area);
        safe_set_string(self.buffer, bounds, x, y, text, style);
    }

    /// Paint a split handle: a dotted strip with a small grip at its
    /// center, oriented across the split direction.
    pub fn paint_handle(&mut self, rect: Rect, direction: Direction, fill: Style, grip: Style) {
        let Some(clipped) = self.clip_rect(rect) else {
            return;
        };
        self.fill(clipped, "·", fill);
        let center_x = clipped.x + clipped.width / 2;
        let center_y = clipped.y + clipped.height / 2;
        let glyphs = [(-1i32, "o"), (0, "O"), (1, "o")];
        match direction {
            Direction::Horizontal => {
                for (offset, symbol) in glyphs {
                    let y = center_y as i32 + offset;
                    if y < clipped.y as i32 || y >= clipped.y as i32 + clipped.height as i32 {
                        continue;
                    }
                    if let Some(cell) = self.buffer.cell_mut((center_x, y as u16)) {
                        cell.set_symbol(symbol);
                        cell.set_style(grip);
                    }
                }
            }
            Direction::Vertical => {
                for (offset, symbol) in glyphs {
                    let x = center_x as i32 + offset;
                    if x < clipped.x as i32 || x >= clipped.x as i32 + clipped.width as i32 {
                        continue;
                    }
                    if let Some(cell) = self.buffer.cell_mut((x as u16, center_y)) {
                        cell.set_symbol(symbol);
                        cell.set_style(grip);
                    }
                }
            }
        }
    }
}

pub(crate) fn safe_set_string(
    buffer: &mut Buffer,
    bounds: Rect,
    x: u16,
    y: u16,
    text: &str,
    style: Style,
) {
    if bounds.width == 0 || bounds.height == 0 {
        return;
    }
    let max_x = bounds.x.saturating_add(bounds.width);
    let max_y = bounds.y.saturating_add(bounds.height);
    if x < bounds.x || x >= max_x || y < bounds.y || y >= max_y {
        return;
    }
    let available = max_x.saturating_sub(x);
    if available == 0 {
        return;
    }
    let text = truncate_to_width(text, available as usize);
    buffer.set_string(x, y, text, style);
}

pub(crate) fn truncate_to_width(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    value.chars().take(width).collect()
}
