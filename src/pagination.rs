//! Notecard pagination engine.
//!
//! Flows script content into discrete slides using greedy first-fit over the
//! block sequence: blocks are appended to the current slide until the
//! measured height would exceed the viewport, then a new slide starts. A
//! block is never split; a single block taller than the viewport gets its
//! own oversized slide rather than being truncated.

use tracing::debug;

use crate::content::{BlockNode, ScriptContent};
use crate::error::Result;
use crate::measure::{LayoutContext, Measure};

/// One notecard slide: an ordered fragment of the script's blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    blocks: Vec<BlockNode>,
}

impl Slide {
    /// The blocks on this slide, in document order.
    pub fn blocks(&self) -> &[BlockNode] {
        &self.blocks
    }
}

/// Owns the slide list and the current-slide cursor.
///
/// The slide list is fully replaced on every recomputation, never patched.
/// A failed measurement leaves the previous slide list in place.
#[derive(Debug, Default)]
pub struct Paginator {
    slides: Vec<Slide>,
    current: usize,
}

impl Paginator {
    /// Create an empty paginator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the slide set from scratch.
    ///
    /// `viewport_height` is in rows; `cx` carries width and font metrics.
    /// On success the previous slide set is replaced and the cursor resets
    /// to the first slide. On measurement failure the previous slide set
    /// and cursor are retained unchanged.
    pub fn recompute(
        &mut self,
        content: &ScriptContent,
        measurer: &dyn Measure,
        cx: &LayoutContext,
        viewport_height: f64,
    ) -> Result<()> {
        let slides = flow_blocks(content.blocks(), measurer, cx, viewport_height)?;
        debug!(slides = slides.len(), blocks = content.len(), "repaginated");
        self.slides = slides;
        self.current = 0;
        Ok(())
    }

    /// Drop all slides and reset the cursor (pagination mode turned off).
    pub fn clear(&mut self) {
        self.slides.clear();
        self.current = 0;
    }

    /// All slides in order.
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Number of slides.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Whether there are no slides.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Index of the current slide (0 when empty).
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The current slide, if any.
    pub fn current_slide(&self) -> Option<&Slide> {
        self.slides.get(self.current)
    }

    /// Advance to the next slide, clamping at the last. No wraparound.
    pub fn next(&mut self) {
        if self.current + 1 < self.slides.len() {
            self.current += 1;
        }
    }

    /// Step back to the previous slide, clamping at the first.
    pub fn prev(&mut self) {
        self.current = self.current.saturating_sub(1);
    }
}

/// Greedy first-fit flow of `blocks` into viewport-sized slides.
fn flow_blocks(
    blocks: &[BlockNode],
    measurer: &dyn Measure,
    cx: &LayoutContext,
    viewport_height: f64,
) -> Result<Vec<Slide>> {
    let mut slides = Vec::new();
    let mut accumulator: Vec<BlockNode> = Vec::new();

    for block in blocks {
        accumulator.push(block.clone());
        let height = measurer.measure(&accumulator, cx)?;

        // Keep the append if it fits, or if this block is alone on the
        // slide (a block taller than the viewport is kept whole rather
        // than split or dropped).
        if height <= viewport_height || accumulator.len() == 1 {
            continue;
        }

        let overflowing = accumulator.pop().unwrap_or_else(|| block.clone());
        slides.push(Slide { blocks: std::mem::take(&mut accumulator) });
        accumulator.push(overflowing);
    }

    if !accumulator.is_empty() {
        slides.push(Slide { blocks: accumulator });
    }

    Ok(slides)
}
