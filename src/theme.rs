//! Centralized colors and styles for the console UI.
//!
//! All colors live here rather than inline in render code, so the whole
//! console can be restyled in one place.

#![allow(dead_code)]

use ratatui::style::{Color, Modifier, Style};

/// Core color palette.
pub struct Colors;

impl Colors {
    /// Primary dark background for panels
    pub const BG_PRIMARY: Color = Color::Rgb(20, 20, 30);

    /// Default foreground text
    pub const FG_PRIMARY: Color = Color::White;

    /// Muted/secondary text
    pub const FG_MUTED: Color = Color::DarkGray;

    /// Accent for borders, titles, highlights
    pub const PRIMARY: Color = Color::Cyan;

    /// Selected item highlight
    pub const SELECTED_BG: Color = Color::Yellow;

    /// Selected item text, for contrast on the yellow background
    pub const SELECTED_FG: Color = Color::Black;

    /// Unselected list item
    pub const UNSELECTED: Color = Color::Gray;

    /// Success feedback
    pub const SUCCESS: Color = Color::Green;

    /// Warning feedback
    pub const WARNING: Color = Color::Yellow;

    /// Error feedback
    pub const ERROR: Color = Color::Red;

    /// Navigation hint text
    pub const NAV_HINT: Color = Color::DarkGray;
}

/// Pre-built styles for common UI patterns.
pub struct Styles;

impl Styles {
    /// Main title style
    pub fn title() -> Style {
        Style::default()
            .fg(Colors::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Selected/highlighted menu item
    pub fn selected() -> Style {
        Style::default()
            .fg(Colors::SELECTED_FG)
            .bg(Colors::SELECTED_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Unselected menu item
    pub fn unselected() -> Style {
        Style::default().fg(Colors::UNSELECTED)
    }

    /// Default text
    pub fn text() -> Style {
        Style::default().fg(Colors::FG_PRIMARY)
    }

    /// Muted text
    pub fn text_muted() -> Style {
        Style::default().fg(Colors::FG_MUTED)
    }

    /// Success message
    pub fn success() -> Style {
        Style::default().fg(Colors::SUCCESS)
    }

    /// Warning message
    pub fn warning() -> Style {
        Style::default().fg(Colors::WARNING)
    }

    /// Error message
    pub fn error() -> Style {
        Style::default().fg(Colors::ERROR)
    }

    /// Navigation hint (keybindings)
    pub fn nav_hint() -> Style {
        Style::default().fg(Colors::NAV_HINT)
    }

    /// Active panel border
    pub fn border_active() -> Style {
        Style::default().fg(Colors::PRIMARY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styles_construct() {
        let _ = Styles::title();
        let _ = Styles::selected();
        let _ = Styles::error();
    }
}
