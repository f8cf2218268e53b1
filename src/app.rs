//! Application state and event handling.
//!
//! `App` wires the prompter core (presentation state machine, pagination,
//! autoscroll, edit sync) to the library storage, the mirror channel, and
//! keyboard input. All mutation happens on the UI event loop; background
//! work is limited to the autoscroll frame ticker.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::widgets::ListState;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::autoscroll::FrameTicker;
use crate::config::Config;
use crate::constants::{async_tasks, settings as bounds};
use crate::content::ScriptContent;
use crate::error::Result;
use crate::input::{GlobalHandler, InputContext, InputHandler, InputResult};
use crate::mirror::{MirrorLink, MirrorMessage};
use crate::presentation::{PresentationState, ScrollMode, SettingsSnapshot};
use crate::storage::{FsLibrary, ScriptStore};
use crate::sync::EditSync;
use crate::types::{ProjectId, ScriptId};

/// Messages delivered to the event loop from background tasks.
#[derive(Debug)]
pub enum AppUpdate {
    /// Autoscroll frame tick.
    Frame,
    /// Content replaced externally (e.g. edited on the mirror surface).
    ContentReplaced(String),
}

/// Top-level application modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Project/script library browser.
    Library,
    /// Prompter view (viewing or editing).
    Prompter,
}

/// Which library pane has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryPane {
    /// Project list.
    Projects,
    /// Script list of the selected project.
    Scripts,
}

/// The application state.
pub struct App {
    /// Current top-level mode.
    pub mode: AppMode,
    /// Loaded configuration.
    pub config: Config,
    /// Filesystem project library.
    pub library: FsLibrary,
    /// Projects in the library.
    pub projects: Vec<ProjectId>,
    /// Project list selection.
    pub project_list_state: ListState,
    /// Scripts of the selected project.
    pub scripts: Vec<ScriptId>,
    /// Script list selection.
    pub script_list_state: ListState,
    /// Focused library pane.
    pub library_pane: LibraryPane,
    /// Project whose script is open in the prompter.
    pub active_project: Option<ProjectId>,
    /// Script open in the prompter.
    pub active_script: Option<ScriptId>,
    /// The prompter state machine.
    pub presentation: PresentationState,
    /// Edit/view synchronization layer.
    pub edit_sync: EditSync,
    /// Outbound mirror link, when a mirror surface is attached.
    pub mirror: Option<MirrorLink>,
    /// Sender half of the update channel (for background tasks).
    pub update_tx: mpsc::Sender<AppUpdate>,
    update_rx: mpsc::Receiver<AppUpdate>,
    global_input: GlobalHandler,
    ticker: FrameTicker,
    should_quit: bool,
    /// Blocking error message, if any.
    pub error_message: Option<String>,
    /// Transient status message, if any.
    pub status_message: Option<String>,
    /// Whether the help modal is shown.
    pub show_help: bool,
    /// Whether the settings side panel is shown in the prompter.
    pub show_settings_panel: bool,
    /// Whether global command mode is active.
    pub is_command_mode: bool,
    /// Global command buffer contents.
    pub command_buffer: String,
}

impl App {
    /// Create the app, opening the library at the configured path.
    pub fn new(config: Config) -> Result<Self> {
        let library = FsLibrary::open(config.library_path.clone())?;
        let (update_tx, update_rx) = mpsc::channel(async_tasks::CHANNEL_BUFFER_SIZE);

        let mut app = Self {
            mode: AppMode::Library,
            config,
            library,
            projects: Vec::new(),
            project_list_state: ListState::default(),
            scripts: Vec::new(),
            script_list_state: ListState::default(),
            library_pane: LibraryPane::Projects,
            active_project: None,
            active_script: None,
            presentation: PresentationState::default(),
            edit_sync: EditSync::new(),
            mirror: None,
            update_tx,
            update_rx,
            global_input: GlobalHandler,
            ticker: FrameTicker::new(),
            should_quit: false,
            error_message: None,
            status_message: None,
            show_help: false,
            show_settings_panel: false,
            is_command_mode: false,
            command_buffer: String::new(),
        };
        app.refresh_projects();
        Ok(app)
    }

    /// Whether the event loop should exit.
    pub const fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Request a clean exit.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Attach a mirror surface. Subsequent state changes are pushed to it.
    ///
    /// The binary runs standalone today; this is the seam a secondary
    /// display (a mirror-mode process or external window) plugs into at
    /// startup to receive content, settings, slide, and scroll updates.
    /// Until then the mirror contract is exercised through this entry
    /// point by the integration tests.
    pub fn attach_mirror(&mut self, link: MirrorLink) {
        self.mirror = Some(link);
    }

    /// Final flush before exit: pending edits are committed, the frame
    /// ticker is cancelled. Safe to call more than once.
    pub fn teardown(&mut self) {
        self.ticker.cancel();
        self.presentation.disable_autoscroll();
        if let Some(content) = self.edit_sync.teardown() {
            self.commit_content(content);
        }
    }

    // ---- library -----------------------------------------------------

    /// Re-scan the library for projects.
    pub fn refresh_projects(&mut self) {
        match self.library.list_projects() {
            Ok(projects) => {
                self.projects = projects;
                if self.project_list_state.selected().is_none() && !self.projects.is_empty() {
                    self.project_list_state.select(Some(0));
                }
                self.refresh_scripts();
            }
            Err(e) => self.error_message = Some(format!("Failed to list projects: {e}")),
        }
    }

    /// Re-scan the selected project for scripts.
    pub fn refresh_scripts(&mut self) {
        self.scripts.clear();
        self.script_list_state.select(None);
        let Some(project) = self.selected_project() else { return };
        match self.library.list_scripts(&project) {
            Ok(scripts) => {
                self.scripts = scripts;
                if !self.scripts.is_empty() {
                    self.script_list_state.select(Some(0));
                }
            }
            Err(e) => warn!(error = %e, "failed to list scripts"),
        }
    }

    fn selected_project(&self) -> Option<ProjectId> {
        self.project_list_state
            .selected()
            .and_then(|i| self.projects.get(i))
            .cloned()
    }

    fn selected_script(&self) -> Option<ScriptId> {
        self.script_list_state
            .selected()
            .and_then(|i| self.scripts.get(i))
            .cloned()
    }

    /// Open the selected script in the prompter.
    pub fn open_selected_script(&mut self) {
        let (Some(project), Some(script)) = (self.selected_project(), self.selected_script())
        else {
            self.status_message = Some("Select a script first".to_string());
            return;
        };

        match self.library.load_script(&project, &script) {
            Ok(content) => {
                self.presentation.replace_content(content);
                self.presentation.load_for_project(&self.library, &project);
                self.active_project = Some(project);
                self.active_script = Some(script);
                self.mode = AppMode::Prompter;
                self.send_mirror(MirrorMessage::ContentReplaced {
                    markup: self.presentation.content().to_markup(),
                });
            }
            Err(e) => self.error_message = Some(format!("Failed to open script: {e}")),
        }
    }

    // ---- update channel ----------------------------------------------

    /// Drain pending background updates (frame ticks, external content).
    pub fn handle_updates(&mut self) {
        while let Ok(update) = self.update_rx.try_recv() {
            match update {
                AppUpdate::Frame => self.on_frame(),
                AppUpdate::ContentReplaced(markup) => self.on_external_content(&markup),
            }
        }

        // Debounced edit emissions are polled on the same cadence.
        if let Some(content) = self.edit_sync.poll_emission(Instant::now()) {
            self.commit_content(content);
        }
    }

    fn on_frame(&mut self) {
        // A tick may race with disabling autoscroll; the driver ignores it.
        if !self.presentation.autoscroll_enabled() {
            return;
        }
        self.presentation.on_frame();
        self.send_mirror(MirrorMessage::ScrollTo { row: self.presentation.scroll().position() });
    }

    fn on_external_content(&mut self, markup: &str) {
        match ScriptContent::from_markup(markup) {
            Ok(content) => {
                debug!(blocks = content.len(), "content replaced externally");
                self.presentation.replace_content(content);
            }
            Err(e) => warn!(error = %e, "ignoring malformed external content"),
        }
    }

    /// Commit an edited content revision: update the prompter, persist the
    /// script, and push to the mirror. Storage failures are logged, never
    /// surfaced as blocking errors, so in-progress edits are never lost.
    pub fn commit_content(&mut self, content: ScriptContent) {
        self.presentation.replace_content(content);

        if let (Some(project), Some(script)) = (&self.active_project, &self.active_script) {
            if let Err(e) = self
                .library
                .save_script(project, script, self.presentation.content())
            {
                warn!(error = %e, "failed to save script, keeping local revision");
            }
        }

        self.send_mirror(MirrorMessage::ContentReplaced {
            markup: self.presentation.content().to_markup(),
        });
    }

    fn send_mirror(&self, message: MirrorMessage) {
        match &self.mirror {
            Some(link) => link.send(message),
            None => debug!("no mirror attached, dropping message"),
        }
    }

    // ---- prompter controls -------------------------------------------

    /// Toggle autoscroll, managing the frame ticker lifecycle.
    pub fn toggle_autoscroll(&mut self) {
        if self.presentation.autoscroll_enabled() {
            self.presentation.disable_autoscroll();
            self.ticker.cancel();
        } else {
            self.presentation.enable_autoscroll();
            let tx = self.update_tx.clone();
            self.ticker.start(tx, || AppUpdate::Frame);
        }
        self.persist_settings();
    }

    /// Toggle notecard pagination. Entering it cancels the frame ticker.
    pub fn toggle_pagination(&mut self) {
        self.presentation.toggle_pagination();
        if self.presentation.settings().scroll_mode == ScrollMode::Paginated {
            self.ticker.cancel();
        }
        self.settings_changed();
    }

    /// Persist settings and notify the mirror (after any settings change).
    fn settings_changed(&mut self) {
        self.persist_settings();
        self.send_mirror(MirrorMessage::SettingsChanged {
            snapshot: SettingsSnapshot::capture(self.presentation.settings()),
        });
    }

    fn persist_settings(&mut self) {
        if let Some(project) = &self.active_project {
            self.presentation.persist(&self.library, project);
        }
    }

    /// Reset presentation settings to defaults, clearing persisted state.
    pub fn reset_settings(&mut self) {
        self.ticker.cancel();
        if let Some(project) = self.active_project.clone() {
            self.presentation.reset_to_defaults(&self.library, &project);
        }
        self.status_message = Some("Settings reset to defaults".to_string());
    }

    fn slide_changed(&mut self) {
        self.send_mirror(MirrorMessage::SlideChanged {
            index: self.presentation.paginator().current_index(),
            total: self.presentation.paginator().len(),
        });
    }

    // ---- edit mode ---------------------------------------------------

    /// Enter edit mode (prompter only). Hides the settings panel.
    pub fn enter_edit(&mut self) {
        let content = self.presentation.content().clone();
        self.edit_sync.enter_edit(&content);
        self.show_settings_panel = false;
    }

    /// Leave edit mode, flushing any pending edit immediately.
    pub fn exit_edit(&mut self) {
        if let Some(content) = self.edit_sync.exit_edit() {
            self.commit_content(content);
        }
    }

    // ---- input -------------------------------------------------------

    /// Dispatch a key event.
    pub fn handle_key(&mut self, key: KeyEvent) {
        // Help and blocking messages swallow input first.
        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?')) {
                self.show_help = false;
            }
            return;
        }
        if self.error_message.is_some() {
            if key.code == KeyCode::Esc {
                self.error_message = None;
            }
            return;
        }
        if self.status_message.is_some() && key.code == KeyCode::Esc {
            self.status_message = None;
            return;
        }
        self.status_message = None;

        if self.is_command_mode {
            self.handle_command_input(key);
            return;
        }

        if self.edit_sync.is_editing() {
            self.handle_edit_input(key);
            return;
        }

        // Global shortcuts (help, quit, back) outside edit mode
        let ctx = InputContext {
            mode: self.mode.into(),
            show_help: self.show_help,
            is_editing: self.edit_sync.is_editing(),
        };
        match self.global_input.handle(key, &ctx) {
            InputResult::Help => {
                self.show_help = true;
                return;
            }
            InputResult::Quit => {
                self.quit();
                return;
            }
            InputResult::ModeChange(mode) => {
                self.change_mode(mode.into());
                return;
            }
            InputResult::Consumed => return,
            InputResult::Error(message) => {
                self.error_message = Some(message);
                return;
            }
            InputResult::Status(message) => {
                self.status_message = Some(message);
                return;
            }
            InputResult::Ignored => {}
        }

        if key.code == KeyCode::Char(':') {
            self.is_command_mode = true;
            self.command_buffer.clear();
            return;
        }

        match self.mode {
            AppMode::Library => self.handle_library_input(key),
            AppMode::Prompter => self.handle_prompter_input(key),
        }
    }

    /// Switch top-level modes. Leaving the prompter stops scrolling first.
    fn change_mode(&mut self, mode: AppMode) {
        if self.mode == AppMode::Prompter && mode == AppMode::Library {
            self.ticker.cancel();
            self.presentation.disable_autoscroll();
        }
        self.mode = mode;
    }

    fn handle_command_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.is_command_mode = false;
                self.command_buffer.clear();
            }
            KeyCode::Enter => {
                self.execute_command();
                self.is_command_mode = false;
                self.command_buffer.clear();
            }
            KeyCode::Backspace => {
                self.command_buffer.pop();
            }
            KeyCode::Char(c) => {
                self.command_buffer.push(c);
            }
            _ => {}
        }
    }

    /// Execute a `:` command from the command bar.
    pub fn execute_command(&mut self) {
        let buffer = self.command_buffer.clone();
        let mut parts = buffer.split_whitespace();
        let command = parts.next().unwrap_or("");
        let arg = parts.next();

        match (command, arg) {
            ("q" | "quit", _) => self.quit(),
            ("h" | "help", _) => self.show_help = true,
            ("reload" | "refresh", _) => self.refresh_projects(),
            ("newp", Some(name)) => {
                let project = ProjectId::new(name);
                match self.library.create_project(&project) {
                    Ok(()) => {
                        self.refresh_projects();
                        self.status_message = Some(format!("Created project {project}"));
                    }
                    Err(e) => self.error_message = Some(e.to_string()),
                }
            }
            ("new", Some(name)) => {
                let Some(project) = self.selected_project() else {
                    self.error_message = Some("No project selected".to_string());
                    return;
                };
                let script = ScriptId::new(name);
                match self.library.create_script(&project, &script) {
                    Ok(()) => {
                        self.refresh_scripts();
                        self.status_message = Some(format!("Created script {script}"));
                    }
                    Err(e) => self.error_message = Some(e.to_string()),
                }
            }
            ("ren", Some(name)) => {
                let (Some(project), Some(script)) =
                    (self.selected_project(), self.selected_script())
                else {
                    self.error_message = Some("No script selected".to_string());
                    return;
                };
                match self.library.rename_script(&project, &script, &ScriptId::new(name)) {
                    Ok(()) => self.refresh_scripts(),
                    Err(e) => self.error_message = Some(e.to_string()),
                }
            }
            ("del", _) => {
                let (Some(project), Some(script)) =
                    (self.selected_project(), self.selected_script())
                else {
                    self.error_message = Some("No script selected".to_string());
                    return;
                };
                match self.library.delete_script(&project, &script) {
                    Ok(()) => self.refresh_scripts(),
                    Err(e) => self.error_message = Some(e.to_string()),
                }
            }
            _ => {
                self.error_message = Some(format!("Unknown command: {buffer}"));
            }
        }
    }

    fn handle_library_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab => {
                self.library_pane = match self.library_pane {
                    LibraryPane::Projects => LibraryPane::Scripts,
                    LibraryPane::Scripts => LibraryPane::Projects,
                };
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Enter => match self.library_pane {
                LibraryPane::Projects => {
                    self.refresh_scripts();
                    self.library_pane = LibraryPane::Scripts;
                }
                LibraryPane::Scripts => self.open_selected_script(),
            },
            _ => {}
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let (state, len) = match self.library_pane {
            LibraryPane::Projects => (&mut self.project_list_state, self.projects.len()),
            LibraryPane::Scripts => (&mut self.script_list_state, self.scripts.len()),
        };
        if len == 0 {
            return;
        }
        let current = state.selected().unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(len - 1);
        state.select(Some(next));
        if self.library_pane == LibraryPane::Projects {
            self.refresh_scripts();
        }
    }

    #[allow(clippy::too_many_lines)]
    fn handle_prompter_input(&mut self, key: KeyEvent) {
        let paginated = self.presentation.settings().scroll_mode == ScrollMode::Paginated;
        match key.code {
            KeyCode::Char('e') | KeyCode::Char('i') => self.enter_edit(),
            KeyCode::Char(' ') if !paginated => self.toggle_autoscroll(),
            KeyCode::Char('n') => self.toggle_pagination(),
            KeyCode::Char('s') => self.show_settings_panel = !self.show_settings_panel,
            KeyCode::Char('r') => self.reset_settings(),

            // Slide navigation (notecard mode)
            KeyCode::Right | KeyCode::PageDown if paginated => {
                self.presentation.next_slide();
                self.slide_changed();
            }
            KeyCode::Left | KeyCode::PageUp if paginated => {
                self.presentation.prev_slide();
                self.slide_changed();
            }

            // Manual scrolling (continuous mode)
            KeyCode::Up if !paginated => self.presentation.scroll_by(-1.0),
            KeyCode::Down if !paginated => self.presentation.scroll_by(1.0),
            KeyCode::PageUp if !paginated => self.presentation.scroll_by(-10.0),
            KeyCode::PageDown if !paginated => self.presentation.scroll_by(10.0),
            KeyCode::Home if !paginated => {
                let pos = self.presentation.scroll().position();
                self.presentation.scroll_by(-pos);
            }

            // Speed
            KeyCode::Char(']') => {
                self.presentation.adjust_speed(bounds::SPEED_STEP);
                self.settings_changed();
            }
            KeyCode::Char('[') => {
                self.presentation.adjust_speed(-bounds::SPEED_STEP);
                self.settings_changed();
            }

            // Font size
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let size = self.presentation.settings().font_size + bounds::FONT_SIZE_STEP;
                self.presentation.set_font_size(size);
                self.settings_changed();
            }
            KeyCode::Char('-') => {
                let size = self.presentation.settings().font_size - bounds::FONT_SIZE_STEP;
                self.presentation.set_font_size(size);
                self.settings_changed();
            }

            // Margin
            KeyCode::Char('>') => {
                let margin = self.presentation.settings().margin.saturating_add(1);
                self.presentation.set_margin(margin);
                self.settings_changed();
            }
            KeyCode::Char('<') => {
                let margin = self.presentation.settings().margin.saturating_sub(1);
                self.presentation.set_margin(margin);
                self.settings_changed();
            }

            // Line height
            KeyCode::Char('}') => {
                let lh = self.presentation.settings().line_height + 0.1;
                self.presentation.set_line_height(lh);
                self.settings_changed();
            }
            KeyCode::Char('{') => {
                let lh = self.presentation.settings().line_height - 0.1;
                self.presentation.set_line_height(lh);
                self.settings_changed();
            }

            // Mirroring and cosmetics
            KeyCode::Char('m') => {
                self.presentation.toggle_mirror_horizontal();
                self.settings_changed();
            }
            KeyCode::Char('M') => {
                self.presentation.toggle_mirror_vertical();
                self.settings_changed();
            }
            KeyCode::Char('a') => {
                self.presentation.cycle_text_align();
                self.settings_changed();
            }
            KeyCode::Char('t') => {
                self.presentation.toggle_transparent_rendering();
                self.settings_changed();
            }
            KeyCode::Char('d') => {
                let strength = self.presentation.settings().shadow_strength.saturating_add(1);
                self.presentation.set_shadow_strength(strength);
                self.settings_changed();
            }
            KeyCode::Char('D') => {
                let strength = self.presentation.settings().shadow_strength.saturating_sub(1);
                self.presentation.set_shadow_strength(strength);
                self.settings_changed();
            }
            KeyCode::Char('o') => {
                let width = self.presentation.settings().stroke_width.saturating_add(1);
                self.presentation.set_stroke_width(width);
                self.settings_changed();
            }
            KeyCode::Char('O') => {
                let width = self.presentation.settings().stroke_width.saturating_sub(1);
                self.presentation.set_stroke_width(width);
                self.settings_changed();
            }
            _ => {}
        }
    }

    fn handle_edit_input(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Esc {
            self.exit_edit();
            return;
        }

        let Some(buffer) = self.edit_sync.buffer_mut() else { return };
        let mut changed = true;
        match key.code {
            KeyCode::Char(c) => buffer.insert_char(c),
            KeyCode::Enter => buffer.insert_newline(),
            KeyCode::Backspace => buffer.backspace(),
            KeyCode::Delete => buffer.delete_forward(),
            KeyCode::Left => {
                buffer.move_cursor(-1, 0);
                changed = false;
            }
            KeyCode::Right => {
                buffer.move_cursor(1, 0);
                changed = false;
            }
            KeyCode::Up => {
                buffer.move_cursor(0, -1);
                changed = false;
            }
            KeyCode::Down => {
                buffer.move_cursor(0, 1);
                changed = false;
            }
            KeyCode::Home => {
                buffer.move_home();
                changed = false;
            }
            KeyCode::End => {
                buffer.move_end();
                changed = false;
            }
            _ => changed = false,
        }

        if changed {
            self.edit_sync.notify_changed();
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::storage::SettingsStore;
    use crossterm::event::KeyModifiers;
    use tempfile::TempDir;

    fn make_key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    fn app_with_script(markup: &str) -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let config = Config::with_library(dir.path());
        let mut app = App::new(config).unwrap();

        let project = ProjectId::new("demo");
        let script = ScriptId::new("intro");
        app.library.create_project(&project).unwrap();
        app.library
            .save_script(&project, &script, &ScriptContent::from_markup(markup).unwrap())
            .unwrap();
        app.refresh_projects();
        app.library_pane = LibraryPane::Scripts;
        app.open_selected_script();
        app.presentation.set_viewport(40, 10);
        (dir, app)
    }

    #[test]
    fn test_open_script_enters_prompter_mode() {
        let (_dir, app) = app_with_script("<p>hello world</p>");
        assert_eq!(app.mode, AppMode::Prompter);
        assert_eq!(app.presentation.content().len(), 1);
        assert!(app.active_project.is_some());
    }

    #[test]
    fn test_edit_keystrokes_flush_on_escape() {
        let (_dir, mut app) = app_with_script("<p>hi</p>");
        app.handle_key(make_key(KeyCode::Char('e')));
        assert!(app.edit_sync.is_editing());

        app.handle_key(make_key(KeyCode::End));
        for c in " there".chars() {
            app.handle_key(make_key(KeyCode::Char(c)));
        }
        app.handle_key(make_key(KeyCode::Esc));

        assert!(!app.edit_sync.is_editing());
        assert_eq!(app.presentation.content().blocks()[0].plain_text(), "hi there");

        // The flushed revision is persisted.
        let project = app.active_project.clone().unwrap();
        let script = app.active_script.clone().unwrap();
        let saved = app.library.load_script(&project, &script).unwrap();
        assert_eq!(saved.blocks()[0].plain_text(), "hi there");
    }

    #[tokio::test]
    async fn test_pagination_key_disables_autoscroll() {
        // The space key starts the frame ticker, which needs a runtime.
        let (_dir, mut app) = app_with_script("<p>one</p><p>two</p><p>three</p>");
        app.handle_key(make_key(KeyCode::Char(' ')));
        assert!(app.presentation.autoscroll_enabled());

        app.handle_key(make_key(KeyCode::Char('n')));
        assert!(!app.presentation.autoscroll_enabled());
        assert_eq!(app.presentation.settings().scroll_mode, ScrollMode::Paginated);
    }

    #[test]
    fn test_settings_keys_clamp_and_persist() {
        let (_dir, mut app) = app_with_script("<p>text</p>");
        for _ in 0..100 {
            app.handle_key(make_key(KeyCode::Char(']')));
        }
        assert!((app.presentation.settings().speed - bounds::SPEED_MAX).abs() < f64::EPSILON);

        // Snapshot was persisted with the clamped value.
        let project = app.active_project.clone().unwrap();
        let snapshot = app.library.load_settings(&project).unwrap().unwrap();
        assert_eq!(snapshot.speed, Some(bounds::SPEED_MAX));
    }

    #[test]
    fn test_reset_clears_persisted_settings() {
        let (_dir, mut app) = app_with_script("<p>text</p>");
        app.handle_key(make_key(KeyCode::Char(']')));
        let project = app.active_project.clone().unwrap();
        assert!(app.library.load_settings(&project).unwrap().is_some());

        app.reset_settings();
        assert!(app.library.load_settings(&project).unwrap().is_none());
        assert!((app.presentation.settings().speed - bounds::DEFAULT_SPEED).abs() < f64::EPSILON);
    }

    #[test]
    fn test_external_content_replaces_document() {
        let (_dir, mut app) = app_with_script("<p>old</p>");
        app.on_external_content("<p>new text</p>");
        assert_eq!(app.presentation.content().blocks()[0].plain_text(), "new text");
    }

    #[test]
    fn test_malformed_external_content_is_ignored() {
        let (_dir, mut app) = app_with_script("<p>old</p>");
        app.on_external_content("<p>bad</h1>");
        assert_eq!(app.presentation.content().blocks()[0].plain_text(), "old");
    }

    #[test]
    fn test_command_new_project() {
        let (_dir, mut app) = app_with_script("<p>x</p>");
        app.mode = AppMode::Library;
        app.command_buffer = "newp rehearsal".to_string();
        app.execute_command();
        assert!(app.projects.iter().any(|p| p.as_str() == "rehearsal"));
    }

    #[tokio::test]
    async fn test_quit_key_leaves_prompter_and_stops_scroll() {
        let (_dir, mut app) = app_with_script("<p>one</p><p>two</p>");
        app.handle_key(make_key(KeyCode::Char(' ')));
        assert!(app.presentation.autoscroll_enabled());

        app.handle_key(make_key(KeyCode::Char('q')));
        assert_eq!(app.mode, AppMode::Library);
        assert!(!app.presentation.autoscroll_enabled());

        // From the library, q quits outright.
        app.handle_key(make_key(KeyCode::Char('q')));
        assert!(app.should_quit());
    }

    #[test]
    fn test_question_mark_opens_help() {
        let (_dir, mut app) = app_with_script("<p>x</p>");
        app.handle_key(make_key(KeyCode::Char('?')));
        assert!(app.show_help);
    }

    #[test]
    fn test_help_modal_swallows_input() {
        let (_dir, mut app) = app_with_script("<p>x</p>");
        app.show_help = true;
        app.handle_key(make_key(KeyCode::Char('e')));
        assert!(!app.edit_sync.is_editing());
        app.handle_key(make_key(KeyCode::Esc));
        assert!(!app.show_help);
    }
}
