use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use crate::app::{App, LibraryPane};

/// Draw the project/script library browser.
pub fn draw_library(f: &mut Frame, app: &mut App, area: Rect) {
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    draw_project_pane(f, app, panes[0]);
    draw_script_pane(f, app, panes[1]);
}

fn draw_project_pane(f: &mut Frame, app: &mut App, area: Rect) {
    let focused = app.library_pane == LibraryPane::Projects;
    let border_color = if focused { Color::Yellow } else { Color::DarkGray };

    let items: Vec<ListItem> = app
        .projects
        .iter()
        .map(|p| ListItem::new(p.as_str().to_string()))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(Span::styled("Projects", Style::default().fg(border_color)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, &mut app.project_list_state);
}

fn draw_script_pane(f: &mut Frame, app: &mut App, area: Rect) {
    let focused = app.library_pane == LibraryPane::Scripts;
    let border_color = if focused { Color::Yellow } else { Color::DarkGray };

    let items: Vec<ListItem> = app
        .scripts
        .iter()
        .map(|s| ListItem::new(s.as_str().to_string()))
        .collect();

    let title = app
        .project_list_state
        .selected()
        .and_then(|i| app.projects.get(i))
        .map_or_else(|| "Scripts".to_string(), |p| format!("Scripts: {p}"));

    let list = List::new(items)
        .block(
            Block::default()
                .title(Span::styled(title, Style::default().fg(border_color)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, &mut app.script_list_state);
}
