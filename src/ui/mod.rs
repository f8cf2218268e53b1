//! User interface components.
//!
//! Provides TUI widgets and drawing functions for the application's
//! terminal-based user interface using ratatui.

mod editor;
mod library;
mod prompter;

pub use editor::draw_editor;
pub use library::draw_library;
pub use prompter::draw_prompter;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, AppMode};
use crate::constants::ui as ui_const;

/// Render the full application UI to the terminal frame.
pub fn draw(f: &mut Frame, app: &mut App) {
    // Create the base layout
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(ui_const::COMMAND_BAR_HEIGHT), // Command/status bar at bottom
        ])
        .split(f.size());

    // Draw the main content based on current mode
    match app.mode {
        AppMode::Library => draw_library(f, app, chunks[0]),
        AppMode::Prompter => {
            if app.edit_sync.is_editing() {
                draw_editor(f, app, chunks[0]);
            } else {
                draw_prompter(f, app, chunks[0]);
            }
        }
    }

    // Bar first, so the dismiss hint stays visible under any modal.
    draw_command_bar(f, app, chunks[1]);

    // Draw status/info modal (blocking)
    if let Some(status) = &app.status_message {
        draw_status_message(f, status);
        return;
    }
    // Draw error message if present (blocking)
    if let Some(error) = &app.error_message {
        draw_error_message(f, error);
        return;
    }

    // Draw help modal if shown
    if app.show_help {
        draw_help_modal(f, app);
    }
}

fn draw_command_bar(f: &mut Frame, app: &App, area: Rect) {
    let title = if app.is_command_mode { "Command" } else { "Commands/Status" };
    let border_color = if app.is_command_mode { Color::Cyan } else { Color::Yellow };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(Span::styled(title, Style::default().fg(border_color)));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let text = if app.is_command_mode {
        format!(":{}", app.command_buffer)
    } else {
        hint_line(app)
    };
    f.render_widget(Paragraph::new(text).style(Style::default().fg(Color::Gray)), inner);

    if app.is_command_mode {
        #[allow(clippy::cast_possible_truncation)]
        f.set_cursor(inner.left() + app.command_buffer.len() as u16 + 1, inner.top());
    }
}

fn hint_line(app: &App) -> String {
    match app.mode {
        AppMode::Library => {
            "enter: open | tab: switch pane | :newp/:new/:ren/:del | q: quit".to_string()
        }
        AppMode::Prompter if app.edit_sync.is_editing() => {
            "esc: done editing (changes are saved)".to_string()
        }
        AppMode::Prompter => {
            "space: autoscroll | n: notecards | e: edit | s: settings | ?: help | q: back"
                .to_string()
        }
    }
}

fn draw_status_message(f: &mut Frame, status: &str) {
    let area = centered_rect(50, 20, f.size());
    let block = Block::default()
        .title("Status")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    let paragraph = Paragraph::new(status.to_string())
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

fn draw_error_message(f: &mut Frame, error: &str) {
    let area = centered_rect(60, 25, f.size());
    let block = Block::default()
        .title("Error (esc to dismiss)")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let paragraph = Paragraph::new(error.to_string())
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

fn draw_help_modal(f: &mut Frame, app: &App) {
    let area = centered_rect(70, 80, f.size());

    let mut lines = vec![
        help_heading("Library"),
        help_entry("enter", "open project / script"),
        help_entry("tab", "switch pane"),
        help_entry(":newp <name>", "new project"),
        help_entry(":new <name>", "new script"),
        help_entry(":ren <name>", "rename script"),
        help_entry(":del", "delete script"),
        Line::default(),
        help_heading("Prompter"),
        help_entry("space", "toggle autoscroll"),
        help_entry("[ / ]", "autoscroll speed"),
        help_entry("n", "toggle notecard mode"),
        help_entry("left/right", "previous / next notecard"),
        help_entry("up/down", "manual scroll"),
        help_entry("+ / -", "font size"),
        help_entry("< / >", "margin"),
        help_entry("{ / }", "line height"),
        help_entry("m / M", "mirror horizontal / vertical"),
        help_entry("a", "cycle text alignment"),
        help_entry("t", "transparent rendering"),
        help_entry("d / D", "shadow strength up / down"),
        help_entry("o / O", "stroke width up / down"),
        help_entry("e", "edit script"),
        help_entry("r", "reset settings"),
        help_entry("s", "settings panel"),
    ];
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!("{} v{}", app.config.app_name(), app.config.app_version()),
        Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default()
        .title("Help (esc to close)")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

fn help_heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ))
}

fn help_entry(key: &str, action: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {key:<14}"), Style::default().fg(Color::Cyan)),
        Span::raw(action.to_string()),
    ])
}

/// Center a rect of `percent_x` by `percent_y` inside `area`.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::config::Config;
    use ratatui::{backend::TestBackend, Terminal};
    use tempfile::TempDir;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    #[test]
    fn test_command_bar_stays_visible_under_error_modal() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new(Config::with_library(dir.path())).unwrap();
        app.error_message = Some("disk full".to_string());

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| draw(f, &mut app)).unwrap();

        let screen = screen_text(&terminal);
        assert!(screen.contains("disk full"));
        assert!(screen.contains("Commands/Status"));
    }

    #[test]
    fn test_command_bar_stays_visible_under_status_modal() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new(Config::with_library(dir.path())).unwrap();
        app.status_message = Some("saved".to_string());

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| draw(f, &mut app)).unwrap();

        let screen = screen_text(&terminal);
        assert!(screen.contains("saved"));
        assert!(screen.contains("Commands/Status"));
    }
}
