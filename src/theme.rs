use ratatui::style::{Color, Modifier, Style};

// Centralized theme styles. Keep these as small helpers so the chrome
// painting code never hardcodes a color.

// Tab bar
pub fn tab_bar_bg() -> Style {
    Style::default().bg(Color::Black)
}
pub fn tab_inactive() -> Style {
    Style::default().bg(Color::DarkGray).fg(Color::Black)
}
pub fn tab_selected() -> Style {
    Style::default()
        .bg(Color::Gray)
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD)
}
pub fn tab_docking() -> Style {
    tab_selected().add_modifier(Modifier::DIM)
}
pub fn close_mark() -> Style {
    Style::default().fg(Color::Red)
}

// Split handles
pub fn handle() -> Style {
    Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
}
pub fn handle_grip() -> Style {
    Style::default().fg(Color::Gray)
}

// Drop overlay
pub fn overlay() -> Style {
    Style::default().bg(Color::Blue).add_modifier(Modifier::DIM)
}
pub fn overlay_border() -> Style {
    Style::default().fg(Color::LightBlue)
}
