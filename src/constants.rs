//! Application constants.
//!
//! Centralizes magic numbers and configuration values for better maintainability.

/// Presentation setting defaults and bounds.
pub mod settings {
    /// Default autoscroll speed in rows per frame.
    pub const DEFAULT_SPEED: f64 = 1.0;

    /// Minimum autoscroll speed.
    pub const SPEED_MIN: f64 = 0.25;

    /// Maximum autoscroll speed.
    pub const SPEED_MAX: f64 = 10.0;

    /// Speed adjustment step per keypress.
    pub const SPEED_STEP: f64 = 0.25;

    /// Default horizontal margin in cells.
    pub const DEFAULT_MARGIN: u16 = 2;

    /// Maximum horizontal margin in cells.
    pub const MARGIN_MAX: u16 = 30;

    /// Default font size in rem-equivalent units.
    pub const DEFAULT_FONT_SIZE: f64 = 2.0;

    /// Minimum font size.
    pub const FONT_SIZE_MIN: f64 = 0.5;

    /// Maximum font size.
    pub const FONT_SIZE_MAX: f64 = 8.0;

    /// Font size adjustment step per keypress.
    pub const FONT_SIZE_STEP: f64 = 0.25;

    /// Default line height multiplier.
    pub const DEFAULT_LINE_HEIGHT: f64 = 1.5;

    /// Minimum line height multiplier.
    pub const LINE_HEIGHT_MIN: f64 = 1.0;

    /// Maximum line height multiplier.
    pub const LINE_HEIGHT_MAX: f64 = 3.0;

    /// Default text shadow strength.
    pub const DEFAULT_SHADOW_STRENGTH: u8 = 0;

    /// Maximum text shadow strength.
    pub const SHADOW_STRENGTH_MAX: u8 = 10;

    /// Default stroke width (transparent rendering only).
    pub const DEFAULT_STROKE_WIDTH: u8 = 0;

    /// Maximum stroke width.
    pub const STROKE_WIDTH_MAX: u8 = 10;
}

/// Edit/view synchronization timing.
pub mod sync {
    /// Debounce window for emitting edited content, in milliseconds.
    pub const EDIT_DEBOUNCE_MS: u64 = 50;
}

/// Autoscroll frame timing.
pub mod frame {
    /// Frame interval for the autoscroll ticker, in milliseconds (~30 fps).
    pub const TICK_INTERVAL_MS: u64 = 33;
}

/// Async task constants.
pub mod async_tasks {
    /// Channel buffer size for async task communication.
    pub const CHANNEL_BUFFER_SIZE: usize = 64;
}

/// UI layout constants.
pub mod ui {
    /// Height of the command/status bar in rows.
    pub const COMMAND_BAR_HEIGHT: u16 = 3;

    /// Width of the settings side panel in cells.
    pub const SETTINGS_PANEL_WIDTH: u16 = 28;

    /// Minimum viewport width in cells before drawing is skipped.
    pub const MIN_VIEWPORT_WIDTH: u16 = 10;
}
