//! Presentation settings and the prompter state machine.
//!
//! `PresentationState` is the single owner of the current script content and
//! all display parameters. Every layout-affecting change flows through it so
//! the slide set, autoscroll flag, and persisted snapshot can never drift
//! out of sync. All mutation happens on the UI event loop; persistence and
//! mirroring failures are logged and absorbed, local state stays
//! authoritative.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::autoscroll::AutoscrollDriver;
use crate::constants::settings as bounds;
use crate::content::ScriptContent;
use crate::measure::{LayoutContext, Measure, TextMeasurer};
use crate::pagination::Paginator;
use crate::storage::SettingsStore;
use crate::types::ProjectId;

/// Presentation scroll mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollMode {
    /// Continuous scrolling, optionally driven by autoscroll.
    #[default]
    Continuous,
    /// Discrete notecard slides.
    Paginated,
}

/// Horizontal text alignment in the prompter view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    /// Left-aligned (default).
    #[default]
    Left,
    /// Centered.
    Center,
    /// Right-aligned.
    Right,
    /// Justified (rendered as left in the terminal).
    Justify,
}

impl TextAlign {
    /// Cycle to the next alignment (for the alignment key).
    pub const fn next(self) -> Self {
        match self {
            Self::Left => Self::Center,
            Self::Center => Self::Right,
            Self::Right => Self::Justify,
            Self::Justify => Self::Left,
        }
    }

    /// Human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Justify => "justify",
        }
    }
}

/// All operator-controlled display parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationSettings {
    /// Continuous scrolling or notecard pagination.
    pub scroll_mode: ScrollMode,
    /// Autoscroll speed in rows per frame (continuous mode only).
    pub speed: f64,
    /// Horizontal margin in cells.
    pub margin: u16,
    /// Font size in rem-equivalent units.
    pub font_size: f64,
    /// Flip the rendered text horizontally (prompter glass).
    pub mirror_horizontal: bool,
    /// Flip the rendered text vertically.
    pub mirror_vertical: bool,
    /// Text shadow strength (cosmetic).
    pub shadow_strength: u8,
    /// Text stroke width; meaningful only with transparent rendering.
    pub stroke_width: u8,
    /// Line height multiplier.
    pub line_height: f64,
    /// Horizontal text alignment.
    pub text_align: TextAlign,
    /// Transparent background rendering.
    pub transparent_rendering: bool,
}

impl Default for PresentationSettings {
    fn default() -> Self {
        Self {
            scroll_mode: ScrollMode::Continuous,
            speed: bounds::DEFAULT_SPEED,
            margin: bounds::DEFAULT_MARGIN,
            font_size: bounds::DEFAULT_FONT_SIZE,
            mirror_horizontal: false,
            mirror_vertical: false,
            shadow_strength: bounds::DEFAULT_SHADOW_STRENGTH,
            stroke_width: bounds::DEFAULT_STROKE_WIDTH,
            line_height: bounds::DEFAULT_LINE_HEIGHT,
            text_align: TextAlign::Left,
            transparent_rendering: false,
        }
    }
}

/// Persisted form of [`PresentationSettings`].
///
/// Every field is optional so older or partial snapshots merge cleanly:
/// absent fields keep the in-memory value instead of nulling it out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    /// Scroll mode, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_mode: Option<ScrollMode>,
    /// Autoscroll speed, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Margin, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<u16>,
    /// Font size, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Horizontal mirroring, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror_horizontal: Option<bool>,
    /// Vertical mirroring, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror_vertical: Option<bool>,
    /// Shadow strength, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_strength: Option<u8>,
    /// Stroke width, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<u8>,
    /// Line height, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    /// Text alignment, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    /// Transparent rendering, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparent_rendering: Option<bool>,
    /// When the snapshot was written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl SettingsSnapshot {
    /// Capture a full snapshot of `settings`.
    pub fn capture(settings: &PresentationSettings) -> Self {
        Self {
            scroll_mode: Some(settings.scroll_mode),
            speed: Some(settings.speed),
            margin: Some(settings.margin),
            font_size: Some(settings.font_size),
            mirror_horizontal: Some(settings.mirror_horizontal),
            mirror_vertical: Some(settings.mirror_vertical),
            shadow_strength: Some(settings.shadow_strength),
            stroke_width: Some(settings.stroke_width),
            line_height: Some(settings.line_height),
            text_align: Some(settings.text_align),
            transparent_rendering: Some(settings.transparent_rendering),
            saved_at: Some(Utc::now()),
        }
    }

    /// Merge this snapshot over `settings`, clamping every loaded value.
    ///
    /// Fields absent from the snapshot keep their current value.
    pub fn apply_to(&self, settings: &mut PresentationSettings) {
        if let Some(mode) = self.scroll_mode {
            settings.scroll_mode = mode;
        }
        if let Some(speed) = self.speed {
            settings.speed = speed.clamp(bounds::SPEED_MIN, bounds::SPEED_MAX);
        }
        if let Some(margin) = self.margin {
            settings.margin = margin.min(bounds::MARGIN_MAX);
        }
        if let Some(font_size) = self.font_size {
            settings.font_size = font_size.clamp(bounds::FONT_SIZE_MIN, bounds::FONT_SIZE_MAX);
        }
        if let Some(v) = self.mirror_horizontal {
            settings.mirror_horizontal = v;
        }
        if let Some(v) = self.mirror_vertical {
            settings.mirror_vertical = v;
        }
        if let Some(v) = self.shadow_strength {
            settings.shadow_strength = v.min(bounds::SHADOW_STRENGTH_MAX);
        }
        if let Some(v) = self.stroke_width {
            settings.stroke_width = v.min(bounds::STROKE_WIDTH_MAX);
        }
        if let Some(line_height) = self.line_height {
            settings.line_height =
                line_height.clamp(bounds::LINE_HEIGHT_MIN, bounds::LINE_HEIGHT_MAX);
        }
        if let Some(align) = self.text_align {
            settings.text_align = align;
        }
        if let Some(v) = self.transparent_rendering {
            settings.transparent_rendering = v;
        }
    }
}

/// The prompter state machine: content, settings, slides, scroll position.
pub struct PresentationState {
    settings: PresentationSettings,
    content: ScriptContent,
    paginator: Paginator,
    scroll: AutoscrollDriver,
    measurer: Box<dyn Measure + Send>,
    viewport: (u16, u16),
}

impl std::fmt::Debug for PresentationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresentationState")
            .field("settings", &self.settings)
            .field("blocks", &self.content.len())
            .field("slides", &self.paginator.len())
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

impl Default for PresentationState {
    fn default() -> Self {
        Self::new(Box::new(TextMeasurer))
    }
}

impl PresentationState {
    /// Create a state machine with the given measurer.
    pub fn new(measurer: Box<dyn Measure + Send>) -> Self {
        Self {
            settings: PresentationSettings::default(),
            content: ScriptContent::default(),
            paginator: Paginator::new(),
            scroll: AutoscrollDriver::new(),
            measurer,
            viewport: (0, 0),
        }
    }

    /// Current settings (read-only).
    pub const fn settings(&self) -> &PresentationSettings {
        &self.settings
    }

    /// Current script content.
    pub const fn content(&self) -> &ScriptContent {
        &self.content
    }

    /// The slide list (empty outside pagination mode).
    pub const fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    /// Scroll driver (continuous mode).
    pub const fn scroll(&self) -> &AutoscrollDriver {
        &self.scroll
    }

    /// Whether autoscroll is running.
    pub const fn autoscroll_enabled(&self) -> bool {
        self.scroll.is_enabled()
    }

    /// Last known prompter viewport size in cells (width, height).
    pub const fn viewport(&self) -> (u16, u16) {
        self.viewport
    }

    /// Layout context for the current settings and viewport.
    pub fn layout_context(&self) -> LayoutContext {
        let usable = self.viewport.0.saturating_sub(self.settings.margin * 2);
        LayoutContext {
            width: usable,
            font_size: self.settings.font_size,
            line_height: self.settings.line_height,
        }
    }

    /// Replace the script content with a new revision.
    ///
    /// Repaginates in notecard mode and clamps the scroll position in
    /// continuous mode.
    pub fn replace_content(&mut self, content: ScriptContent) {
        self.content = content;
        self.scroll.scroll_by(0.0, self.max_scroll());
        self.repaginate_if_needed();
    }

    /// Record the prompter viewport size; repaginates on change.
    pub fn set_viewport(&mut self, width: u16, height: u16) {
        if self.viewport == (width, height) {
            return;
        }
        self.viewport = (width, height);
        self.repaginate_if_needed();
    }

    /// Switch between continuous scrolling and notecard pagination.
    ///
    /// Entering pagination forcibly disables autoscroll (the two are
    /// mutually exclusive). Leaving pagination drops the slide set without
    /// re-enabling autoscroll.
    pub fn set_scroll_mode(&mut self, mode: ScrollMode) {
        if self.settings.scroll_mode == mode {
            return;
        }
        self.settings.scroll_mode = mode;
        match mode {
            ScrollMode::Paginated => {
                self.scroll.disable();
                self.repaginate_if_needed();
            }
            ScrollMode::Continuous => {
                self.paginator.clear();
            }
        }
    }

    /// Toggle notecard mode.
    pub fn toggle_pagination(&mut self) {
        let next = match self.settings.scroll_mode {
            ScrollMode::Continuous => ScrollMode::Paginated,
            ScrollMode::Paginated => ScrollMode::Continuous,
        };
        self.set_scroll_mode(next);
    }

    /// Start autoscroll. Leaves pagination mode first if necessary, since
    /// the two are mutually exclusive.
    pub fn enable_autoscroll(&mut self) {
        if self.settings.scroll_mode == ScrollMode::Paginated {
            self.set_scroll_mode(ScrollMode::Continuous);
        }
        self.scroll.enable();
    }

    /// Stop autoscroll, keeping the scroll position.
    pub fn disable_autoscroll(&mut self) {
        self.scroll.disable();
    }

    /// Advance one autoscroll frame.
    pub fn on_frame(&mut self) {
        let speed = self.settings.speed;
        let max = self.max_scroll();
        self.scroll.advance(speed, max);
    }

    /// Manual scroll by `delta` rows.
    pub fn scroll_by(&mut self, delta: f64) {
        let max = self.max_scroll();
        self.scroll.scroll_by(delta, max);
    }

    /// Adjust speed by `delta`, clamped to the documented bounds.
    pub fn adjust_speed(&mut self, delta: f64) {
        self.set_speed(self.settings.speed + delta);
    }

    /// Set autoscroll speed, clamped to `[SPEED_MIN, SPEED_MAX]`.
    pub fn set_speed(&mut self, speed: f64) {
        self.settings.speed = speed.clamp(bounds::SPEED_MIN, bounds::SPEED_MAX);
    }

    /// Set the horizontal margin, clamped to `[0, MARGIN_MAX]`. Repaginates.
    pub fn set_margin(&mut self, margin: u16) {
        let clamped = margin.min(bounds::MARGIN_MAX);
        if clamped == self.settings.margin {
            return;
        }
        self.settings.margin = clamped;
        self.repaginate_if_needed();
    }

    /// Set the font size, clamped. Repaginates.
    pub fn set_font_size(&mut self, font_size: f64) {
        let clamped = font_size.clamp(bounds::FONT_SIZE_MIN, bounds::FONT_SIZE_MAX);
        if (clamped - self.settings.font_size).abs() < f64::EPSILON {
            return;
        }
        self.settings.font_size = clamped;
        self.repaginate_if_needed();
    }

    /// Set the line height, clamped. Repaginates.
    pub fn set_line_height(&mut self, line_height: f64) {
        let clamped = line_height.clamp(bounds::LINE_HEIGHT_MIN, bounds::LINE_HEIGHT_MAX);
        if (clamped - self.settings.line_height).abs() < f64::EPSILON {
            return;
        }
        self.settings.line_height = clamped;
        self.repaginate_if_needed();
    }

    /// Toggle horizontal mirroring.
    pub fn toggle_mirror_horizontal(&mut self) {
        self.settings.mirror_horizontal = !self.settings.mirror_horizontal;
    }

    /// Toggle vertical mirroring.
    pub fn toggle_mirror_vertical(&mut self) {
        self.settings.mirror_vertical = !self.settings.mirror_vertical;
    }

    /// Set shadow strength, clamped.
    pub fn set_shadow_strength(&mut self, strength: u8) {
        self.settings.shadow_strength = strength.min(bounds::SHADOW_STRENGTH_MAX);
    }

    /// Set stroke width, clamped. Only visible with transparent rendering.
    pub fn set_stroke_width(&mut self, width: u8) {
        self.settings.stroke_width = width.min(bounds::STROKE_WIDTH_MAX);
    }

    /// Cycle text alignment.
    pub fn cycle_text_align(&mut self) {
        self.settings.text_align = self.settings.text_align.next();
    }

    /// Toggle transparent rendering.
    pub fn toggle_transparent_rendering(&mut self) {
        self.settings.transparent_rendering = !self.settings.transparent_rendering;
    }

    /// Advance to the next slide (notecard mode).
    pub fn next_slide(&mut self) {
        self.paginator.next();
    }

    /// Step back to the previous slide (notecard mode).
    pub fn prev_slide(&mut self) {
        self.paginator.prev();
    }

    /// Load persisted settings for a project, merging over the current
    /// values. A missing snapshot or a failing store is a logged no-op.
    pub fn load_for_project(&mut self, store: &dyn SettingsStore, project: &ProjectId) {
        match store.load_settings(project) {
            Ok(Some(snapshot)) => {
                snapshot.apply_to(&mut self.settings);
                if self.settings.scroll_mode == ScrollMode::Paginated {
                    self.scroll.disable();
                }
                self.repaginate_if_needed();
                debug!(%project, "loaded presentation settings");
            }
            Ok(None) => {}
            Err(e) => warn!(%project, error = %e, "failed to load settings, keeping defaults"),
        }
    }

    /// Persist the full current snapshot. Failures are logged and absorbed.
    pub fn persist(&self, store: &dyn SettingsStore, project: &ProjectId) {
        let snapshot = SettingsSnapshot::capture(&self.settings);
        if let Err(e) = store.save_settings(project, &snapshot) {
            warn!(%project, error = %e, "failed to persist settings");
        }
    }

    /// Restore documented defaults and clear the persisted snapshot.
    pub fn reset_to_defaults(&mut self, store: &dyn SettingsStore, project: &ProjectId) {
        self.settings = PresentationSettings::default();
        self.scroll.disable();
        self.scroll.rewind();
        self.paginator.clear();
        if let Err(e) = store.clear_settings(project) {
            warn!(%project, error = %e, "failed to clear persisted settings");
        }
    }

    /// Total rendered height of the content in rows, or 0.0 when it cannot
    /// be measured.
    pub fn content_height(&self) -> f64 {
        self.measurer
            .measure(self.content.blocks(), &self.layout_context())
            .unwrap_or(0.0)
    }

    /// Maximum scroll position: content height minus the viewport.
    fn max_scroll(&self) -> f64 {
        (self.content_height() - f64::from(self.viewport.1)).max(0.0)
    }

    /// Recompute slides if in notecard mode; keep the old set when the
    /// viewport cannot be measured.
    fn repaginate_if_needed(&mut self) {
        if self.settings.scroll_mode != ScrollMode::Paginated {
            return;
        }
        let cx = self.layout_context();
        let viewport_height = f64::from(self.viewport.1);
        if let Err(e) =
            self.paginator
                .recompute(&self.content, self.measurer.as_ref(), &cx, viewport_height)
        {
            warn!(error = %e, "repagination skipped, keeping previous slides");
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::measure::CharCountMeasurer;

    fn state_with_content(blocks: usize) -> PresentationState {
        let mut state = PresentationState::new(Box::new(CharCountMeasurer));
        state.set_viewport(40, 10);
        let markup = (0..blocks)
            .map(|i| format!("<p>block number {i} with some words in it</p>"))
            .collect::<Vec<_>>()
            .join("\n");
        state.replace_content(ScriptContent::from_markup(&markup).unwrap());
        state
    }

    #[test]
    fn test_defaults_match_documented_values() {
        let settings = PresentationSettings::default();
        assert_eq!(settings.scroll_mode, ScrollMode::Continuous);
        assert!((settings.speed - 1.0).abs() < f64::EPSILON);
        assert_eq!(settings.margin, 2);
        assert!((settings.font_size - 2.0).abs() < f64::EPSILON);
        assert!(!settings.mirror_horizontal);
        assert!(!settings.mirror_vertical);
        assert_eq!(settings.text_align, TextAlign::Left);
        assert!(!settings.transparent_rendering);
    }

    #[test]
    fn test_speed_clamps_to_bounds() {
        let mut state = PresentationState::default();
        state.set_speed(999.0);
        assert!((state.settings().speed - bounds::SPEED_MAX).abs() < f64::EPSILON);
        state.set_speed(0.0);
        assert!((state.settings().speed - bounds::SPEED_MIN).abs() < f64::EPSILON);
    }

    #[test]
    fn test_margin_clamps_to_bounds() {
        let mut state = PresentationState::default();
        state.set_margin(500);
        assert_eq!(state.settings().margin, bounds::MARGIN_MAX);
    }

    #[test]
    fn test_pagination_disables_autoscroll() {
        let mut state = state_with_content(5);
        state.enable_autoscroll();
        assert!(state.autoscroll_enabled());

        state.set_scroll_mode(ScrollMode::Paginated);
        assert!(!state.autoscroll_enabled());
        assert!(!state.paginator().is_empty());
    }

    #[test]
    fn test_leaving_pagination_does_not_reenable_autoscroll() {
        let mut state = state_with_content(5);
        state.enable_autoscroll();
        state.set_scroll_mode(ScrollMode::Paginated);
        state.set_scroll_mode(ScrollMode::Continuous);

        assert!(!state.autoscroll_enabled());
        assert!(state.paginator().is_empty());
    }

    #[test]
    fn test_enabling_autoscroll_leaves_pagination() {
        let mut state = state_with_content(5);
        state.set_scroll_mode(ScrollMode::Paginated);

        state.enable_autoscroll();
        assert!(state.autoscroll_enabled());
        assert_eq!(state.settings().scroll_mode, ScrollMode::Continuous);
    }

    #[test]
    fn test_font_size_change_repaginates() {
        let mut state = state_with_content(8);
        state.set_scroll_mode(ScrollMode::Paginated);
        let before = state.paginator().len();

        state.set_font_size(6.0);
        let after = state.paginator().len();
        assert!(after > before, "larger font should produce more slides");
    }

    #[test]
    fn test_viewport_resize_repaginates() {
        let mut state = state_with_content(8);
        state.set_scroll_mode(ScrollMode::Paginated);
        let before = state.paginator().len();

        state.set_viewport(40, 4);
        assert!(state.paginator().len() >= before);
    }

    #[test]
    fn test_partial_snapshot_keeps_unspecified_fields() {
        let mut settings = PresentationSettings::default();
        let snapshot = SettingsSnapshot { font_size: Some(3.0), ..Default::default() };

        snapshot.apply_to(&mut settings);
        assert!((settings.font_size - 3.0).abs() < f64::EPSILON);
        assert!((settings.speed - bounds::DEFAULT_SPEED).abs() < f64::EPSILON);
        assert_eq!(settings.margin, bounds::DEFAULT_MARGIN);
        assert_eq!(settings.text_align, TextAlign::Left);
    }

    #[test]
    fn test_snapshot_values_are_clamped_on_apply() {
        let mut settings = PresentationSettings::default();
        let snapshot = SettingsSnapshot {
            speed: Some(1000.0),
            margin: Some(999),
            ..Default::default()
        };

        snapshot.apply_to(&mut settings);
        assert!((settings.speed - bounds::SPEED_MAX).abs() < f64::EPSILON);
        assert_eq!(settings.margin, bounds::MARGIN_MAX);
    }

    #[test]
    fn test_snapshot_round_trips_through_json() {
        let settings = PresentationSettings {
            mirror_horizontal: true,
            text_align: TextAlign::Center,
            ..Default::default()
        };
        let snapshot = SettingsSnapshot::capture(&settings);
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: SettingsSnapshot = serde_json::from_str(&json).unwrap();

        let mut restored = PresentationSettings::default();
        parsed.apply_to(&mut restored);
        assert!(restored.mirror_horizontal);
        assert_eq!(restored.text_align, TextAlign::Center);
    }

    #[test]
    fn test_frame_advances_only_when_autoscroll_on() {
        let mut state = state_with_content(20);
        state.on_frame();
        assert_eq!(state.scroll().offset_rows(), 0);

        state.enable_autoscroll();
        state.set_speed(2.0);
        state.on_frame();
        assert_eq!(state.scroll().offset_rows(), 2);
    }
}
