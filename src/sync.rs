//! Edit/view synchronization.
//!
//! The prompter has two surface states: a read-only rendered view and an
//! edit surface. While editing, every keystroke schedules an emission of the
//! latest content snapshot after a short debounce window; a new keystroke
//! cancels and reschedules, so at most one emission is ever pending and it
//! always carries the newest content. Leaving edit mode (or tearing down
//! the view) flushes the pending emission immediately so no edit is lost.
//!
//! The debounce is a plain deadline polled by the event loop rather than a
//! spawned timer, which makes cancel/flush races impossible: whoever holds
//! the `&mut` decides.

use std::time::{Duration, Instant};

use crate::constants::sync::EDIT_DEBOUNCE_MS;
use crate::content::ScriptContent;

/// Which surface is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewState {
    /// Read-only rendered view; edit surface hidden.
    #[default]
    Viewing,
    /// Edit surface visible and focused.
    Editing,
}

/// Cancellable scheduled emission of a content snapshot.
#[derive(Debug)]
pub struct Debounce {
    window: Duration,
    deadline: Option<Instant>,
    pending: Option<ScriptContent>,
}

impl Default for Debounce {
    fn default() -> Self {
        Self::new(Duration::from_millis(EDIT_DEBOUNCE_MS))
    }
}

impl Debounce {
    /// Create a debounce with the given window.
    pub const fn new(window: Duration) -> Self {
        Self { window, deadline: None, pending: None }
    }

    /// Schedule `content` for emission after the window elapses.
    ///
    /// Replaces any previously scheduled snapshot and restarts the window;
    /// emissions never stack.
    pub fn schedule(&mut self, content: ScriptContent) {
        self.pending = Some(content);
        self.deadline = Some(Instant::now() + self.window);
    }

    /// Drop any pending emission. Idempotent.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.deadline = None;
    }

    /// Whether an emission is scheduled.
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the snapshot if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<ScriptContent> {
        match self.deadline {
            Some(deadline) if now >= deadline => self.take(),
            _ => None,
        }
    }

    /// Take the snapshot immediately, regardless of the deadline.
    pub fn flush(&mut self) -> Option<ScriptContent> {
        self.take()
    }

    fn take(&mut self) -> Option<ScriptContent> {
        self.deadline = None;
        self.pending.take()
    }
}

/// Multi-line edit buffer for the edit surface.
///
/// Lines are the editor representation of the script (see
/// [`ScriptContent::to_editor_lines`]); blank lines separate paragraphs.
#[derive(Debug, Default)]
pub struct EditorBuffer {
    /// Buffer lines. Always at least one line.
    pub lines: Vec<String>,
    /// Cursor column (char index into the current line).
    pub cursor_x: usize,
    /// Cursor line.
    pub cursor_y: usize,
    /// First visible line (vertical scrolling).
    pub scroll_offset: usize,
}

impl EditorBuffer {
    /// Build a buffer from content.
    pub fn from_content(content: &ScriptContent) -> Self {
        Self { lines: content.to_editor_lines(), ..Default::default() }
    }

    /// Rebuild content from the buffer.
    pub fn to_content(&self) -> ScriptContent {
        ScriptContent::from_editor_lines(&self.lines)
    }

    /// Insert a character at the cursor.
    pub fn insert_char(&mut self, c: char) {
        self.ensure_line();
        let line = &mut self.lines[self.cursor_y];
        let byte = char_to_byte(line, self.cursor_x);
        line.insert(byte, c);
        self.cursor_x += 1;
    }

    /// Split the current line at the cursor.
    pub fn insert_newline(&mut self) {
        self.ensure_line();
        let line = &mut self.lines[self.cursor_y];
        let byte = char_to_byte(line, self.cursor_x);
        let rest = line.split_off(byte);
        self.lines.insert(self.cursor_y + 1, rest);
        self.cursor_y += 1;
        self.cursor_x = 0;
    }

    /// Delete the character before the cursor, joining lines at column 0.
    pub fn backspace(&mut self) {
        self.ensure_line();
        if self.cursor_x > 0 {
            let line = &mut self.lines[self.cursor_y];
            let byte = char_to_byte(line, self.cursor_x - 1);
            line.remove(byte);
            self.cursor_x -= 1;
        } else if self.cursor_y > 0 {
            let current = self.lines.remove(self.cursor_y);
            self.cursor_y -= 1;
            self.cursor_x = self.lines[self.cursor_y].chars().count();
            self.lines[self.cursor_y].push_str(&current);
        }
    }

    /// Delete the character at the cursor, joining lines at end of line.
    pub fn delete_forward(&mut self) {
        self.ensure_line();
        let len = self.lines[self.cursor_y].chars().count();
        if self.cursor_x < len {
            let byte = char_to_byte(&self.lines[self.cursor_y], self.cursor_x);
            self.lines[self.cursor_y].remove(byte);
        } else if self.cursor_y + 1 < self.lines.len() {
            let next = self.lines.remove(self.cursor_y + 1);
            self.lines[self.cursor_y].push_str(&next);
        }
    }

    /// Move the cursor, clamping to buffer bounds.
    pub fn move_cursor(&mut self, dx: isize, dy: isize) {
        self.ensure_line();
        let new_y = self.cursor_y.saturating_add_signed(dy).min(self.lines.len() - 1);
        self.cursor_y = new_y;
        let len = self.lines[self.cursor_y].chars().count();
        self.cursor_x = self.cursor_x.min(len).saturating_add_signed(dx).min(len);
    }

    /// Jump to start of line.
    pub fn move_home(&mut self) {
        self.cursor_x = 0;
    }

    /// Jump to end of line.
    pub fn move_end(&mut self) {
        self.ensure_line();
        self.cursor_x = self.lines[self.cursor_y].chars().count();
    }

    fn ensure_line(&mut self) {
        if self.lines.is_empty() {
            self.lines.push(String::new());
            self.cursor_x = 0;
            self.cursor_y = 0;
        }
        self.cursor_y = self.cursor_y.min(self.lines.len() - 1);
    }
}

fn char_to_byte(line: &str, char_idx: usize) -> usize {
    line.char_indices()
        .nth(char_idx)
        .map_or(line.len(), |(i, _)| i)
}

/// The edit/view state machine.
///
/// Owns the transient edit session (buffer + debounce); exists for the
/// lifetime of the prompter view.
#[derive(Debug, Default)]
pub struct EditSync {
    state: ViewState,
    buffer: Option<EditorBuffer>,
    debounce: Debounce,
}

impl EditSync {
    /// Create the layer in the initial `Viewing` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current surface state.
    pub const fn state(&self) -> ViewState {
        self.state
    }

    /// Whether the edit surface is active.
    pub const fn is_editing(&self) -> bool {
        matches!(self.state, ViewState::Editing)
    }

    /// The edit buffer, present only while editing.
    pub const fn buffer(&self) -> Option<&EditorBuffer> {
        self.buffer.as_ref()
    }

    /// Mutable edit buffer, present only while editing.
    pub fn buffer_mut(&mut self) -> Option<&mut EditorBuffer> {
        self.buffer.as_mut()
    }

    /// `Viewing → Editing`: create the edit session from `content` and
    /// focus the edit surface. No-op when already editing.
    pub fn enter_edit(&mut self, content: &ScriptContent) {
        if self.is_editing() {
            return;
        }
        self.buffer = Some(EditorBuffer::from_content(content));
        self.state = ViewState::Editing;
    }

    /// Record a keystroke-level change: reschedule the debounced emission
    /// with the buffer's current snapshot.
    pub fn notify_changed(&mut self) {
        if let Some(buffer) = &self.buffer {
            self.debounce.schedule(buffer.to_content());
        }
    }

    /// Emission due at `now`, if the debounce window elapsed.
    pub fn poll_emission(&mut self, now: Instant) -> Option<ScriptContent> {
        self.debounce.poll(now)
    }

    /// `Editing → Viewing`: flush any pending emission and drop the edit
    /// session. Returns the final snapshot to emit, if one was pending.
    pub fn exit_edit(&mut self) -> Option<ScriptContent> {
        if !self.is_editing() {
            return None;
        }
        let flushed = self.debounce.flush();
        self.buffer = None;
        self.state = ViewState::Viewing;
        flushed
    }

    /// View teardown: same flush guarantee as exiting edit mode.
    pub fn teardown(&mut self) -> Option<ScriptContent> {
        let flushed = self.debounce.flush();
        self.buffer = None;
        self.state = ViewState::Viewing;
        flushed
    }
}
