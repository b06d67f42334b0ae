//! Menu item definitions and list rendering.

use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};
use ratatui::Frame;

use crate::theme::Styles;

pub const MAIN_MENU_ITEMS: &[&str] = &[
    "Network",
    "Disks",
    "Hosts file",
    "Service password",
    "Quit",
];

pub const NETWORK_MENU_ITEMS: &[&str] = &[
    "Show settings",
    "Use DHCP",
    "Static address",
    "Set hostname",
    "Back",
];

pub const DISK_MENU_ITEMS: &[&str] = &[
    "List disks",
    "Expand last partition",
    "Rescan disks",
    "Back",
];

pub const PASSWORD_MENU_ITEMS: &[&str] = &[
    "Derive password",
    "Apply password",
    "Verify checksums",
    "Back",
];

/// Render a titled list with the standard selection styling.
pub fn render_menu(frame: &mut Frame, area: Rect, title: &str, items: &[&str], selected: usize) {
    let list_items: Vec<ListItem> = items
        .iter()
        .map(|item| ListItem::new(Line::from(*item)).style(Styles::unselected()))
        .collect();

    let list = List::new(list_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::border_active())
                .title(title.to_string()),
        )
        .highlight_style(Styles::selected())
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(selected));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Render a titled list of owned strings (interfaces, disks).
pub fn render_string_menu(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    items: &[String],
    selected: usize,
) {
    let refs: Vec<&str> = items.iter().map(String::as_str).collect();
    render_menu(frame, area, title, &refs, selected);
}
