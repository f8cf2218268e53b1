//! Continuous autoscroll driver.
//!
//! In continuous mode the prompter advances its scroll position by the
//! configured speed once per frame. Frames are delivered by a background
//! ticker task over the app's update channel; the task is aborted outright
//! whenever autoscroll stops, so no stray tick can fire against a torn-down
//! view.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::warn;

use crate::constants::frame::TICK_INTERVAL_MS;

/// Scroll position state for continuous mode.
///
/// Holds the position in fractional rows so sub-row speeds (0.25 rows per
/// frame) accumulate correctly across frames.
#[derive(Debug, Default)]
pub struct AutoscrollDriver {
    position: f64,
    enabled: bool,
}

impl AutoscrollDriver {
    /// Create a driver at the top of the document, disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether autoscroll is currently running.
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Start advancing on each frame.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Stop advancing. The position stays where it is.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Current scroll position in rows (fractional).
    pub const fn position(&self) -> f64 {
        self.position
    }

    /// Whole-row scroll offset for rendering.
    pub fn offset_rows(&self) -> usize {
        self.position.max(0.0) as usize
    }

    /// Advance one frame by `speed` rows, clamped to `[0, max]`.
    ///
    /// Does nothing while disabled; the frame ticker may still deliver a
    /// tick that raced with disabling.
    pub fn advance(&mut self, speed: f64, max: f64) {
        if !self.enabled {
            return;
        }
        self.position = (self.position + speed).clamp(0.0, max.max(0.0));
    }

    /// Manual scroll by `delta` rows (user input, autoscroll off or on).
    pub fn scroll_by(&mut self, delta: f64, max: f64) {
        self.position = (self.position + delta).clamp(0.0, max.max(0.0));
    }

    /// Jump back to the top of the document.
    pub fn rewind(&mut self) {
        self.position = 0.0;
    }
}

/// Background task that delivers frame ticks while autoscroll runs.
///
/// One message per frame interval is sent through the channel; the owning
/// event loop applies it to the driver. `cancel` aborts the task rather
/// than flagging it, and is idempotent.
#[derive(Debug, Default)]
pub struct FrameTicker {
    handle: Option<JoinHandle<()>>,
}

impl FrameTicker {
    /// Create a ticker with no running task.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a ticker task is currently running.
    pub const fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Spawn the frame task, sending `tick` through `tx` every interval.
    ///
    /// Restarting a running ticker cancels the old task first, so at most
    /// one task exists at a time.
    pub fn start<T, F>(&mut self, tx: mpsc::Sender<T>, tick: F)
    where
        T: Send + 'static,
        F: Fn() -> T + Send + 'static,
    {
        self.cancel();
        let handle = tokio::spawn(async move {
            let mut frames = interval(Duration::from_millis(TICK_INTERVAL_MS));
            frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                frames.tick().await;
                if tx.send(tick()).await.is_err() {
                    // Receiver gone: the app is shutting down.
                    warn!("frame ticker channel closed, stopping");
                    break;
                }
            }
        });
        self.handle = Some(handle);
    }

    /// Abort the frame task. Safe to call when already cancelled.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for FrameTicker {
    fn drop(&mut self) {
        self.cancel();
    }
}
