//! Layout measurement for the prompter viewport.
//!
//! The pagination engine never inspects the terminal directly. It asks a
//! [`Measure`] implementation how tall a fragment of blocks renders at a
//! given width and font metrics, using the same wrapping rules the prompter
//! view uses to draw, so measured page breaks are visually exact.

use unicode_width::UnicodeWidthChar;

use crate::content::BlockNode;
use crate::error::{Error, Result};

/// Layout parameters shared by measurement and rendering.
///
/// Font size scales the terminal grid: a glyph occupies `font_size` columns
/// and a wrapped line occupies `font_size * line_height` rows, which is how
/// the rem-based sizing of the prompter maps onto a character cell display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutContext {
    /// Usable viewport width in cells (margins already subtracted).
    pub width: u16,
    /// Font size in rem-equivalent units.
    pub font_size: f64,
    /// Line height multiplier.
    pub line_height: f64,
}

impl LayoutContext {
    /// Text columns available at this width and font size.
    pub fn columns(&self) -> usize {
        if self.font_size <= 0.0 {
            return 0;
        }
        (f64::from(self.width) / self.font_size).floor() as usize
    }

    /// Rendered height of one wrapped text line, in whole rows.
    ///
    /// The terminal renders whole rows, so the fractional
    /// `font_size * line_height` span is rounded here, once. Measurement
    /// and rendering both go through this value; if they disagreed, a
    /// slide that measures as fitting could render taller than the
    /// viewport and lose its tail.
    pub fn row_height(&self) -> f64 {
        (self.font_size * self.line_height).round().max(1.0)
    }
}

/// Measures the rendered height of a block fragment.
pub trait Measure {
    /// Measure the height, in rows, of `blocks` laid out under `cx`.
    ///
    /// Must be side-effect free and cheap enough to call once per appended
    /// block during pagination. Fails if the context cannot hold any text
    /// (zero usable columns), in which case the caller keeps its previous
    /// layout rather than producing an empty one.
    fn measure(&self, blocks: &[BlockNode], cx: &LayoutContext) -> Result<f64>;
}

/// Production measurer: unicode-aware greedy word wrap, identical to the
/// prompter view's rendering pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextMeasurer;

impl Measure for TextMeasurer {
    fn measure(&self, blocks: &[BlockNode], cx: &LayoutContext) -> Result<f64> {
        let columns = cx.columns();
        if columns == 0 {
            return Err(Error::measurement(format!(
                "no usable columns at width {} and font size {}",
                cx.width, cx.font_size
            )));
        }

        let mut height = 0.0;
        for (i, block) in blocks.iter().enumerate() {
            if i > 0 {
                // Inter-block gap, one row at the current line height.
                height += cx.row_height();
            }
            let lines = wrap_display(&block.plain_text(), columns);
            height += cx.row_height() * lines.len() as f64;
        }
        Ok(height)
    }
}

/// Wrap `text` into lines of at most `columns` display cells.
///
/// Greedy word wrap; a word wider than the full line is broken at the cell
/// boundary rather than overflowing. Empty text still occupies one line.
/// This is the single wrapping routine shared by measurement and rendering.
pub fn wrap_display(text: &str, columns: usize) -> Vec<String> {
    if columns == 0 {
        return vec![String::new()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0usize;

    for word in text.split_whitespace() {
        let word_width = display_width(word);
        let needed = if current.is_empty() { word_width } else { word_width + 1 };

        if current_width + needed <= columns {
            if !current.is_empty() {
                current.push(' ');
                current_width += 1;
            }
            current.push_str(word);
            current_width += word_width;
        } else if word_width <= columns {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_width = word_width;
        } else {
            // Overlong word: flush and hard-break at cell boundaries.
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current_width = 0;
            for c in word.chars() {
                let w = c.width().unwrap_or(0);
                if current_width + w > columns && !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                current.push(c);
                current_width += w;
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn display_width(s: &str) -> usize {
    s.chars().map(|c| c.width().unwrap_or(0)).sum()
}

/// Deterministic measurer keyed by fragment text length.
///
/// Each block counts as `ceil(len / columns)` lines of unit height, with no
/// inter-block gap. Keeps pagination tests independent of any display
/// surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharCountMeasurer;

impl Measure for CharCountMeasurer {
    fn measure(&self, blocks: &[BlockNode], cx: &LayoutContext) -> Result<f64> {
        let columns = cx.columns();
        if columns == 0 {
            return Err(Error::measurement("zero columns"));
        }
        let mut height = 0.0;
        for block in blocks {
            let len = block.plain_text().chars().count().max(1);
            height += len.div_ceil(columns) as f64;
        }
        Ok(height)
    }
}
