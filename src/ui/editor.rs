use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;

/// Draw the script edit surface.
pub fn draw_editor(f: &mut Frame, app: &mut App, area: Rect) {
    let title = app
        .active_script
        .as_ref()
        .map_or_else(|| "Edit".to_string(), |s| format!("Edit: {s}"));
    let block = Block::default()
        .title(Span::styled(title, Style::default().fg(Color::Cyan)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(buffer) = app.edit_sync.buffer_mut() else {
        return;
    };

    // A zero-row inner area renders nothing and must not move the cursor.
    let height = inner.height as usize;
    if height == 0 {
        return;
    }
    buffer.scroll_offset = follow_cursor(buffer.scroll_offset, buffer.cursor_y, height);

    let lines: Vec<Line> = buffer
        .lines
        .iter()
        .skip(buffer.scroll_offset)
        .take(height)
        .map(|l| styled_line(l.as_str()))
        .collect();
    f.render_widget(Paragraph::new(lines), inner);

    let cursor_col: usize = buffer.lines.get(buffer.cursor_y).map_or(0, |line| {
        line.chars().take(buffer.cursor_x).collect::<String>().width()
    });
    let cursor_row = buffer.cursor_y.saturating_sub(buffer.scroll_offset);
    if cursor_row < height {
        #[allow(clippy::cast_possible_truncation)]
        f.set_cursor(
            inner.left() + cursor_col.min(inner.width.saturating_sub(1) as usize) as u16,
            inner.top() + cursor_row as u16,
        );
    }
}

/// Scroll offset that keeps the cursor line inside a `height`-row window.
fn follow_cursor(offset: usize, cursor: usize, height: usize) -> usize {
    if height == 0 {
        offset
    } else if cursor < offset {
        cursor
    } else if cursor >= offset + height {
        cursor + 1 - height
    } else {
        offset
    }
}

/// Editor lines use lightweight markup prefixes; tint them so structure is
/// visible while editing.
fn styled_line(line: &str) -> Line<'_> {
    let style = if line.starts_with("# ") || line.starts_with("## ") || line.starts_with("### ") {
        Style::default().fg(Color::Yellow)
    } else if line.starts_with("- ") {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::White)
    };
    Line::from(Span::styled(line, style))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::config::Config;
    use crate::content::ScriptContent;
    use ratatui::{backend::TestBackend, Terminal};
    use tempfile::TempDir;

    #[test]
    fn test_follow_cursor_scrolls_up_and_down() {
        assert_eq!(follow_cursor(6, 0, 5), 0);
        assert_eq!(follow_cursor(0, 9, 5), 5);
        assert_eq!(follow_cursor(3, 4, 5), 3);
    }

    #[test]
    fn test_follow_cursor_zero_height_keeps_offset() {
        assert_eq!(follow_cursor(6, 0, 0), 6);
    }

    #[test]
    fn test_draw_survives_two_row_terminal_with_stale_scroll() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new(Config::with_library(dir.path())).unwrap();
        app.enter_edit();
        {
            let buffer = app.edit_sync.buffer_mut().unwrap();
            buffer.lines = (0..10).map(|i| format!("line {i}")).collect();
            buffer.scroll_offset = 6;
            buffer.cursor_y = 0;
        }

        // 30x2 leaves the bordered block a zero-row interior.
        let backend = TestBackend::new(30, 2);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| draw_editor(f, &mut app, f.size()))
            .unwrap();
    }

    #[test]
    fn test_draw_replaces_stale_scroll_offset() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new(Config::with_library(dir.path())).unwrap();
        app.presentation
            .replace_content(ScriptContent::from_markup("<p>one</p>\n<p>two</p>").unwrap());
        app.enter_edit();
        if let Some(buffer) = app.edit_sync.buffer_mut() {
            buffer.scroll_offset = 6;
            buffer.cursor_y = 0;
        }

        let backend = TestBackend::new(30, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| draw_editor(f, &mut app, f.size()))
            .unwrap();

        assert_eq!(app.edit_sync.buffer().unwrap().scroll_offset, 0);
    }
}
