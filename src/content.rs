//! Script content model and markup parsing.
//!
//! Scripts are stored as a lightweight HTML subset: block-level tags
//! (`<p>`, `<h1>`–`<h3>`, `<li>`) containing inline styling tags
//! (`<b>`, `<i>`, `<u>`). This module parses that markup into an ordered
//! sequence of block nodes, which is the unit the pagination engine flows.
//! A block is never split across slides.

// Allow unwrap for compile-time constant regex patterns in lazy_static blocks
#![allow(clippy::unwrap_used)]

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

lazy_static! {
    static ref BLOCK_RE: Regex =
        Regex::new(r"(?s)<(p|h1|h2|h3|li)>(.*?)</(p|h1|h2|h3|li)>").unwrap();
    static ref INLINE_TAG_RE: Regex = Regex::new(r"</?(?:b|i|u)>").unwrap();
    static ref INLINE_RUN_RE: Regex = Regex::new(r"(?s)<(b|i|u)>(.*?)</(b|i|u)>|([^<]+)").unwrap();
}

/// Kind of a block-level node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    /// Plain paragraph.
    Paragraph,
    /// Heading at level 1–3.
    Heading(u8),
    /// Bulleted list item.
    ListItem,
}

impl BlockKind {
    /// Markup tag name for this kind.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Paragraph => "p",
            Self::Heading(1) => "h1",
            Self::Heading(2) => "h2",
            Self::Heading(_) => "h3",
            Self::ListItem => "li",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "p" => Some(Self::Paragraph),
            "h1" => Some(Self::Heading(1)),
            "h2" => Some(Self::Heading(2)),
            "h3" => Some(Self::Heading(3)),
            "li" => Some(Self::ListItem),
            _ => None,
        }
    }
}

/// A single styled run of text inside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineRun {
    /// The run's text with tags stripped.
    pub text: String,
    /// Bold styling.
    pub bold: bool,
    /// Italic styling.
    pub italic: bool,
    /// Underline styling.
    pub underline: bool,
}

/// One block-level node: the atomic unit of pagination.
///
/// The inline markup of a block is preserved verbatim; pagination never
/// splits inside a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockNode {
    /// Block kind (paragraph, heading, list item).
    pub kind: BlockKind,
    /// Inner markup, inline tags included.
    pub inline: String,
}

impl BlockNode {
    /// Create a paragraph node.
    pub fn paragraph(inline: impl Into<String>) -> Self {
        Self { kind: BlockKind::Paragraph, inline: inline.into() }
    }

    /// Plain text with inline tags stripped (measurement and wrapping input).
    pub fn plain_text(&self) -> String {
        INLINE_TAG_RE.replace_all(&self.inline, "").to_string()
    }

    /// Parse the inline markup into styled runs for rendering.
    pub fn inline_runs(&self) -> Vec<InlineRun> {
        let mut runs = Vec::new();
        for cap in INLINE_RUN_RE.captures_iter(&self.inline) {
            if let (Some(tag), Some(body)) = (cap.get(1), cap.get(2)) {
                // Nested inline tags inside the body are stripped, not styled.
                let text = INLINE_TAG_RE.replace_all(body.as_str(), "").to_string();
                runs.push(InlineRun {
                    text,
                    bold: tag.as_str() == "b",
                    italic: tag.as_str() == "i",
                    underline: tag.as_str() == "u",
                });
            } else if let Some(plain) = cap.get(4) {
                runs.push(InlineRun {
                    text: plain.as_str().to_string(),
                    bold: false,
                    italic: false,
                    underline: false,
                });
            }
        }
        runs
    }

    /// Serialize this block back to markup.
    pub fn to_markup(&self) -> String {
        let tag = self.kind.tag();
        format!("<{tag}>{}</{tag}>", self.inline)
    }
}

/// A rich-text script document: an ordered sequence of block nodes.
///
/// Immutable per revision: every edit commit produces a new value via
/// [`ScriptContent::from_markup`] or [`ScriptContent::from_editor_lines`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptContent {
    blocks: Vec<BlockNode>,
}

impl ScriptContent {
    /// Create content from an already-parsed block sequence.
    pub fn from_blocks(blocks: Vec<BlockNode>) -> Self {
        Self { blocks }
    }

    /// Parse markup into a block sequence.
    ///
    /// Text outside recognized block tags is treated as loose paragraphs
    /// split on blank lines, so plain-text scripts load without markup.
    pub fn from_markup(markup: &str) -> Result<Self> {
        let mut blocks = Vec::new();
        let mut last_end = 0;

        for cap in BLOCK_RE.captures_iter(markup) {
            let whole = cap.get(0).ok_or_else(|| Error::parse("empty capture", None))?;
            let open = cap.get(1).ok_or_else(|| Error::parse("missing open tag", None))?;
            let close = cap.get(3).ok_or_else(|| Error::parse("missing close tag", None))?;
            if open.as_str() != close.as_str() {
                return Err(Error::parse(
                    format!("mismatched tags <{}>..</{}>", open.as_str(), close.as_str()),
                    None,
                ));
            }

            push_loose_text(&mut blocks, &markup[last_end..whole.start()]);

            let kind = BlockKind::from_tag(open.as_str())
                .ok_or_else(|| Error::parse(format!("unknown tag {}", open.as_str()), None))?;
            let inline = cap.get(2).map_or("", |m| m.as_str()).trim().to_string();
            blocks.push(BlockNode { kind, inline });
            last_end = whole.end();
        }

        push_loose_text(&mut blocks, &markup[last_end..]);

        Ok(Self { blocks })
    }

    /// Serialize the full document back to markup.
    pub fn to_markup(&self) -> String {
        self.blocks
            .iter()
            .map(BlockNode::to_markup)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Ordered block nodes (read-only).
    pub fn blocks(&self) -> &[BlockNode] {
        &self.blocks
    }

    /// Whether the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Convert to edit-surface lines.
    ///
    /// Headings become `#`-prefixed lines, list items `- `-prefixed lines,
    /// paragraphs keep their inline markup verbatim. Blocks are separated by
    /// blank lines so paragraph boundaries survive the round trip.
    pub fn to_editor_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                lines.push(String::new());
            }
            match block.kind {
                BlockKind::Paragraph => lines.push(block.inline.clone()),
                BlockKind::Heading(level) => {
                    let hashes = "#".repeat(usize::from(level.clamp(1, 3)));
                    lines.push(format!("{hashes} {}", block.inline));
                }
                BlockKind::ListItem => lines.push(format!("- {}", block.inline)),
            }
        }
        if lines.is_empty() {
            lines.push(String::new());
        }
        lines
    }

    /// Rebuild content from edit-surface lines (inverse of `to_editor_lines`).
    pub fn from_editor_lines(lines: &[String]) -> Self {
        let mut blocks = Vec::new();
        let mut paragraph = Vec::new();

        let mut close_paragraph = |paragraph: &mut Vec<String>, blocks: &mut Vec<BlockNode>| {
            if !paragraph.is_empty() {
                blocks.push(BlockNode::paragraph(paragraph.join(" ")));
                paragraph.clear();
            }
        };

        for line in lines {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                close_paragraph(&mut paragraph, &mut blocks);
            } else if let Some(rest) = trimmed.strip_prefix("### ") {
                close_paragraph(&mut paragraph, &mut blocks);
                blocks.push(BlockNode { kind: BlockKind::Heading(3), inline: rest.to_string() });
            } else if let Some(rest) = trimmed.strip_prefix("## ") {
                close_paragraph(&mut paragraph, &mut blocks);
                blocks.push(BlockNode { kind: BlockKind::Heading(2), inline: rest.to_string() });
            } else if let Some(rest) = trimmed.strip_prefix("# ") {
                close_paragraph(&mut paragraph, &mut blocks);
                blocks.push(BlockNode { kind: BlockKind::Heading(1), inline: rest.to_string() });
            } else if let Some(rest) = trimmed.strip_prefix("- ") {
                close_paragraph(&mut paragraph, &mut blocks);
                blocks.push(BlockNode { kind: BlockKind::ListItem, inline: rest.to_string() });
            } else {
                paragraph.push(trimmed.to_string());
            }
        }
        close_paragraph(&mut paragraph, &mut blocks);

        Self { blocks }
    }
}

fn push_loose_text(blocks: &mut Vec<BlockNode>, text: &str) {
    for chunk in text.split("\n\n") {
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            blocks.push(BlockNode::paragraph(chunk.replace('\n', " ")));
        }
    }
}
