//! Input handling abstractions.
//!
//! This module provides traits and types for handling keyboard input
//! in a modular way, allowing mode-specific handlers to be tested independently.

use crossterm::event::{KeyCode, KeyEvent};

/// Result of processing an input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
    /// The input was consumed and handled.
    Consumed,
    /// The input was ignored (not applicable to this handler).
    Ignored,
    /// The application should quit.
    Quit,
    /// The mode should change.
    ModeChange(AppMode),
    /// The help overlay should open.
    Help,
    /// An error occurred (message to display).
    Error(String),
    /// A status message should be shown.
    Status(String),
}

/// Application modes (mirrors `app::AppMode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Project/script library browser.
    Library,
    /// Prompter view (continuous or notecard).
    Prompter,
}

impl From<crate::app::AppMode> for AppMode {
    fn from(mode: crate::app::AppMode) -> Self {
        match mode {
            crate::app::AppMode::Library => Self::Library,
            crate::app::AppMode::Prompter => Self::Prompter,
        }
    }
}

impl From<AppMode> for crate::app::AppMode {
    fn from(mode: AppMode) -> Self {
        match mode {
            AppMode::Library => Self::Library,
            AppMode::Prompter => Self::Prompter,
        }
    }
}

/// Context passed to input handlers.
///
/// This provides handlers with the information they need to process
/// input without directly accessing the full App state.
pub struct InputContext {
    /// Current application mode.
    pub mode: AppMode,
    /// Whether help is currently shown.
    pub show_help: bool,
    /// Whether the edit surface is focused (prompter edit mode).
    pub is_editing: bool,
}

/// Trait for handling keyboard input.
///
/// Implementations of this trait handle input for specific modes
/// or input contexts.
pub trait InputHandler {
    /// Handle a key event.
    ///
    /// # Arguments
    /// * `key` - The key event to handle
    /// * `ctx` - Context about the current application state
    ///
    /// # Returns
    /// The result of handling the input.
    fn handle(&mut self, key: KeyEvent, ctx: &InputContext) -> InputResult;

    /// Get the name of this handler (for debugging).
    fn name(&self) -> &'static str;
}

/// Handler for global shortcuts: help, quit, and backing out of the
/// prompter. Consulted by the app before per-mode dispatch.
#[derive(Debug, Default)]
pub struct GlobalHandler;

impl InputHandler for GlobalHandler {
    fn handle(&mut self, key: KeyEvent, ctx: &InputContext) -> InputResult {
        // Never intercept keystrokes destined for the edit surface.
        if ctx.is_editing {
            return InputResult::Ignored;
        }

        if key.code == KeyCode::F(1) || key.code == KeyCode::Char('?') {
            return InputResult::Help;
        }

        match key.code {
            KeyCode::Char('q') => match ctx.mode {
                AppMode::Library => InputResult::Quit,
                AppMode::Prompter => InputResult::ModeChange(AppMode::Library),
            },
            KeyCode::Esc if ctx.mode == AppMode::Prompter => {
                InputResult::ModeChange(AppMode::Library)
            }
            _ => InputResult::Ignored,
        }
    }

    fn name(&self) -> &'static str {
        "GlobalHandler"
    }
}
