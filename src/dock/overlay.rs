//! Translucent-looking preview of where a dragged tab would land.

use ratatui::Frame;
use ratatui::prelude::Rect;
use ratatui::widgets::{Block, BorderType, Clear};

use crate::constants::OVERLAY_CLASS;
use crate::theme;

/// The drop preview rectangle. Hidden until a drag produces a target,
/// painted last so it sits above every group.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overlay {
    rect: Option<Rect>,
}

impl Overlay {
    pub fn new() -> Self {
        Self { rect: None }
    }

    /// Class the overlay would carry in a DOM rendition; kept for parity
    /// with the other dock class names.
    pub fn class_name(&self) -> &'static str {
        OVERLAY_CLASS
    }

    pub fn show(&mut self, rect: Rect) {
        self.rect = Some(rect);
    }

    pub fn hide(&mut self) {
        self.rect = None;
    }

    pub fn is_visible(&self) -> bool {
        self.rect.is_some()
    }

    pub fn rect(&self) -> Option<Rect> {
        self.rect
    }

    pub fn render(&self, frame: &mut Frame<'_>) {
        let Some(rect) = self.rect else {
            return;
        };
        let rect = rect.intersection(frame.area());
        if rect.is_empty() {
            return;
        }
        frame.render_widget(Clear, rect);
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(theme::overlay_border())
            .style(theme::overlay());
        frame.render_widget(block, rect);
    }
}
