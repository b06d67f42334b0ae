//! Screen rendering for the console.
//!
//! One render function per screen, dispatched on [`AppMode`]. Layout is a
//! fixed three-row split: title bar, body, status line.

pub mod menus;

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::{AppMode, AppState, FormState, PendingAction};
use crate::theme::Styles;

pub fn render(frame: &mut Frame, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_title(frame, rows[0]);
    render_body(frame, rows[1], state);
    render_status(frame, rows[2], state);

    if state.mode == AppMode::Confirm {
        render_confirm(frame, state);
    }
}

fn render_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new("Appliance Console")
        .style(Styles::title())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, area);
}

fn render_body(frame: &mut Frame, area: Rect, state: &AppState) {
    match state.mode {
        AppMode::MainMenu => {
            menus::render_menu(
                frame,
                area,
                "Main menu",
                menus::MAIN_MENU_ITEMS,
                state.main_selection,
            );
        }
        AppMode::NetworkMenu => {
            menus::render_menu(
                frame,
                area,
                "Network",
                menus::NETWORK_MENU_ITEMS,
                state.network_selection,
            );
        }
        AppMode::DiskMenu => {
            menus::render_menu(
                frame,
                area,
                "Disks",
                menus::DISK_MENU_ITEMS,
                state.disk_selection,
            );
        }
        AppMode::PasswordMenu => {
            menus::render_menu(
                frame,
                area,
                "Service password",
                menus::PASSWORD_MENU_ITEMS,
                state.password_selection,
            );
        }
        AppMode::Select => {
            menus::render_string_menu(
                frame,
                area,
                "Select",
                &state.select_items,
                state.select_index,
            );
        }
        AppMode::Form => {
            if let Some(ref form) = state.form {
                render_form(frame, area, form);
            }
        }
        AppMode::Output | AppMode::Confirm => render_output(frame, area, state),
    }
}

fn render_form(frame: &mut Frame, area: Rect, form: &FormState) {
    let mut lines = Vec::with_capacity(form.fields.len() + 2);
    for (i, field) in form.fields.iter().enumerate() {
        let marker = if i == form.current { "> " } else { "  " };
        let style = if i == form.current {
            Styles::text()
        } else {
            Styles::text_muted()
        };
        let required = if field.required { " *" } else { "" };
        lines.push(Line::from(Span::styled(
            format!("{marker}{}{required}: {}", field.label, field.value),
            style,
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter next/submit - Esc cancel",
        Styles::nav_hint(),
    )));

    let body = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Styles::border_active())
            .title(form.title.clone()),
    );
    frame.render_widget(body, area);
}

fn render_output(frame: &mut Frame, area: Rect, state: &AppState) {
    let lines: Vec<Line> = state
        .output
        .iter()
        .skip(state.output_scroll)
        .map(|l| Line::from(l.as_str()))
        .collect();

    let body = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Styles::border_active())
            .title(state.output_title.clone()),
    );
    frame.render_widget(body, area);
}

fn render_status(frame: &mut Frame, area: Rect, state: &AppState) {
    let hint = match state.mode {
        AppMode::MainMenu => "Up/Down navigate - Enter select - q quit",
        AppMode::Output => "Up/Down scroll - Esc back",
        AppMode::Form => "Enter next/submit - Esc cancel",
        AppMode::Confirm => "Left/Right choose - Enter confirm - Esc cancel",
        _ => "Up/Down navigate - Enter select - Esc back",
    };
    let status = Paragraph::new(Line::from(vec![
        Span::styled(state.status_message.clone(), Styles::text()),
        Span::raw("  "),
        Span::styled(hint, Styles::nav_hint()),
    ]));
    frame.render_widget(status, area);
}

fn render_confirm(frame: &mut Frame, state: &AppState) {
    let message = match state.pending {
        Some(PendingAction::ExpandDisk(ref disk)) => {
            format!("Grow the last partition of {disk} to the maximum size?")
        }
        Some(PendingAction::ApplyPassword) => {
            "Derive and roll out the service password?".to_string()
        }
        None => return,
    };

    let area = centered_rect(60, 7, frame.area());
    frame.render_widget(Clear, area);

    let yes = if state.confirm_yes {
        Span::styled("[ Yes ]", Styles::selected())
    } else {
        Span::styled("[ Yes ]", Styles::unselected())
    };
    let no = if state.confirm_yes {
        Span::styled("[ No ]", Styles::unselected())
    } else {
        Span::styled("[ No ]", Styles::selected())
    };

    let lines = vec![
        Line::from(message),
        Line::from(""),
        Line::from(vec![yes, Span::raw("   "), no]),
    ];

    let dialog = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::warning())
                .title("Confirm"),
        );
    frame.render_widget(dialog, area);
}

fn centered_rect(width_pct: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - width_pct) / 2),
            Constraint::Percentage(width_pct),
            Constraint::Percentage((100 - width_pct) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
