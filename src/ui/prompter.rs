//! Prompter view rendering.
//!
//! Draws the script using the same wrapping routine the layout measurer
//! uses, so pagination breaks match what is on screen. Font size scales the
//! text band: fewer columns, more rows per line. Mirroring flips the
//! finished character grid, never the source text.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::constants::ui as ui_const;
use crate::content::{BlockKind, BlockNode};
use crate::measure::wrap_display;
use crate::presentation::{PresentationSettings, ScrollMode, TextAlign};

/// Draw the prompter view (continuous or notecard).
pub fn draw_prompter(f: &mut Frame, app: &mut App, area: Rect) {
    let (main_area, panel_area) = if app.show_settings_panel {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(ui_const::SETTINGS_PANEL_WIDTH),
            ])
            .split(area);
        (chunks[0], Some(chunks[1]))
    } else {
        (area, None)
    };

    let transparent = app.presentation.settings().transparent_rendering;
    let block = if transparent {
        Block::default()
    } else {
        let title = app
            .active_script
            .as_ref()
            .map_or_else(|| "Prompter".to_string(), |s| format!("Prompter: {s}"));
        Block::default()
            .title(Span::styled(title, Style::default().fg(Color::Yellow)))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
    };
    let inner = block.inner(main_area);
    f.render_widget(block, main_area);

    if inner.width < ui_const::MIN_VIEWPORT_WIDTH || inner.height < 2 {
        return;
    }

    // Footer steals the last row; the prompter viewport is what remains.
    let viewport = Rect { height: inner.height - 1, ..inner };
    app.presentation.set_viewport(viewport.width, viewport.height);

    let settings = app.presentation.settings().clone();
    let cx = app.presentation.layout_context();
    let columns = cx.columns();
    if columns == 0 {
        return;
    }

    let blocks: Vec<BlockNode> = match settings.scroll_mode {
        ScrollMode::Paginated => app
            .presentation
            .paginator()
            .current_slide()
            .map(|s| s.blocks().to_vec())
            .unwrap_or_default(),
        ScrollMode::Continuous => app.presentation.content().blocks().to_vec(),
    };

    // Whole rows by construction of LayoutContext::row_height.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let row_span = cx.row_height() as usize;
    let mut rows = layout_rows(&blocks, columns, row_span, &settings);

    if settings.mirror_vertical {
        rows.reverse();
    }

    let visible: Vec<&(String, Style)> = match settings.scroll_mode {
        ScrollMode::Continuous => {
            let offset = app.presentation.scroll().offset_rows();
            rows.iter().skip(offset).take(viewport.height as usize).collect()
        }
        ScrollMode::Paginated => rows.iter().take(viewport.height as usize).collect(),
    };

    let band_left = usize::from(settings.margin)
        + usize::from(viewport.width.saturating_sub(settings.margin * 2)).saturating_sub(columns)
            / 2;
    let lines: Vec<Line> = visible
        .iter()
        .map(|(text, style)| {
            Line::from(vec![
                Span::raw(" ".repeat(band_left)),
                Span::styled(text.clone(), *style),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), viewport);

    draw_footer(f, app, Rect { y: inner.bottom() - 1, height: 1, ..inner });

    if let Some(panel) = panel_area {
        draw_settings_panel(f, &settings, panel);
    }
}

/// Flatten blocks into styled visual rows: wrapped text lines padded to the
/// column band, aligned and mirrored per the settings. One entry per
/// terminal row. `row_span` is the measurer's whole-row span per wrapped
/// line, so rendered heights match measured heights exactly.
fn layout_rows(
    blocks: &[BlockNode],
    columns: usize,
    row_span: usize,
    settings: &PresentationSettings,
) -> Vec<(String, Style)> {
    let mut rows = Vec::new();

    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            // Inter-block gap, mirroring the measurer's spacing.
            for _ in 0..row_span {
                rows.push((String::new(), Style::default()));
            }
        }
        let style = block_style(block.kind, settings);
        for line in wrap_display(&block.plain_text(), columns) {
            let mut text = align_line(&line, columns, settings.text_align);
            if settings.mirror_horizontal {
                text = text.chars().rev().collect();
            }
            rows.push((text, style));
            for _ in 1..row_span {
                rows.push((String::new(), Style::default()));
            }
        }
    }
    rows
}

fn block_style(kind: BlockKind, settings: &PresentationSettings) -> Style {
    let mut style = Style::default().fg(Color::White);
    match kind {
        BlockKind::Heading(_) => {
            style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
        }
        BlockKind::ListItem => {
            style = style.fg(Color::Cyan);
        }
        BlockKind::Paragraph => {}
    }
    if settings.shadow_strength > 0 {
        style = style.add_modifier(Modifier::DIM);
    }
    if settings.transparent_rendering && settings.stroke_width > 0 {
        style = style.add_modifier(Modifier::BOLD);
    }
    style
}

/// Pad a wrapped line to the full column band for the requested alignment.
fn align_line(line: &str, columns: usize, align: TextAlign) -> String {
    let width = line.width();
    let pad = columns.saturating_sub(width);
    match align {
        TextAlign::Left | TextAlign::Justify => format!("{line}{}", " ".repeat(pad)),
        TextAlign::Right => format!("{}{line}", " ".repeat(pad)),
        TextAlign::Center => {
            let left = pad / 2;
            format!("{}{line}{}", " ".repeat(left), " ".repeat(pad - left))
        }
    }
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let settings = app.presentation.settings();
    let text = match settings.scroll_mode {
        ScrollMode::Paginated => {
            let paginator = app.presentation.paginator();
            if paginator.is_empty() {
                "notecards: empty".to_string()
            } else {
                format!("card {}/{}", paginator.current_index() + 1, paginator.len())
            }
        }
        ScrollMode::Continuous => {
            let state = if app.presentation.autoscroll_enabled() { "▶" } else { "⏸" };
            format!(
                "{state} {:.2}x  row {}  align {}",
                settings.speed,
                app.presentation.scroll().offset_rows(),
                settings.text_align.name()
            )
        }
    };
    f.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn draw_settings_panel(f: &mut Frame, settings: &PresentationSettings, area: Rect) {
    let block = Block::default()
        .title(Span::styled("Settings", Style::default().fg(Color::Cyan)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mode = match settings.scroll_mode {
        ScrollMode::Continuous => "continuous",
        ScrollMode::Paginated => "notecards",
    };
    let lines = vec![
        panel_entry("mode", mode),
        panel_entry("speed", &format!("{:.2}", settings.speed)),
        panel_entry("margin", &settings.margin.to_string()),
        panel_entry("font size", &format!("{:.2}", settings.font_size)),
        panel_entry("line height", &format!("{:.1}", settings.line_height)),
        panel_entry("align", settings.text_align.name()),
        panel_entry("mirror h", on_off(settings.mirror_horizontal)),
        panel_entry("mirror v", on_off(settings.mirror_vertical)),
        panel_entry("shadow", &settings.shadow_strength.to_string()),
        panel_entry("stroke", &settings.stroke_width.to_string()),
        panel_entry("transparent", on_off(settings.transparent_rendering)),
    ];
    f.render_widget(Paragraph::new(lines), inner);
}

fn panel_entry(name: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{name:<12}"), Style::default().fg(Color::DarkGray)),
        Span::raw(value.to_string()),
    ])
}

const fn on_off(v: bool) -> &'static str {
    if v {
        "on"
    } else {
        "off"
    }
}
