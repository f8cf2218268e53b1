//! Integration tests driving the prompter through the public crate API:
//! library storage, content flow, pagination, settings persistence, and the
//! edit/commit/mirror path.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tempfile::TempDir;

use prompterm::app::{App, AppMode, LibraryPane};
use prompterm::config::Config;
use prompterm::constants::settings as bounds;
use prompterm::constants::sync::EDIT_DEBOUNCE_MS;
use prompterm::content::ScriptContent;
use prompterm::mirror::{MirrorLink, MirrorMessage};
use prompterm::presentation::{ScrollMode, SettingsSnapshot};
use prompterm::storage::{FsLibrary, ScriptStore, SettingsStore};
use prompterm::types::{ProjectId, ScriptId};

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::empty())
}

/// Fresh library with one project/script, opened in the prompter.
fn open_app(markup: &str) -> (TempDir, App) {
    let dir = TempDir::new().unwrap();
    let mut app = App::new(Config::with_library(dir.path())).unwrap();

    let project = ProjectId::new("show");
    let script = ScriptId::new("opening");
    app.library.create_project(&project).unwrap();
    app.library
        .save_script(&project, &script, &ScriptContent::from_markup(markup).unwrap())
        .unwrap();
    app.refresh_projects();
    app.library_pane = LibraryPane::Scripts;
    app.open_selected_script();
    app.presentation.set_viewport(80, 20);
    (dir, app)
}

#[test]
fn test_open_load_edit_save_round_trip() {
    let (_dir, mut app) = open_app("<h1>Intro</h1><p>Welcome to the show</p>");
    assert_eq!(app.mode, AppMode::Prompter);

    app.handle_key(key(KeyCode::Char('e')));
    app.handle_key(key(KeyCode::End));
    for c in ", everyone".chars() {
        app.handle_key(key(KeyCode::Char(c)));
    }
    app.handle_key(key(KeyCode::Esc));

    let project = app.active_project.clone().unwrap();
    let script = app.active_script.clone().unwrap();
    let saved = app.library.load_script(&project, &script).unwrap();
    assert_eq!(saved.blocks()[0].plain_text(), "Intro, everyone");
    assert_eq!(saved.blocks()[1].plain_text(), "Welcome to the show");
}

#[test]
fn test_debounced_edits_commit_after_window() {
    let (_dir, mut app) = open_app("<p>a</p>");
    app.handle_key(key(KeyCode::Char('e')));
    app.handle_key(key(KeyCode::End));
    app.handle_key(key(KeyCode::Char('b')));
    app.handle_key(key(KeyCode::Char('c')));

    // Still within the debounce window, nothing is committed yet.
    let project = app.active_project.clone().unwrap();
    let script = app.active_script.clone().unwrap();
    assert_eq!(
        app.library.load_script(&project, &script).unwrap().blocks()[0].plain_text(),
        "a"
    );

    std::thread::sleep(Duration::from_millis(EDIT_DEBOUNCE_MS + 20));
    app.handle_updates();

    assert_eq!(
        app.library.load_script(&project, &script).unwrap().blocks()[0].plain_text(),
        "abc"
    );
    // Still editing; the commit happened mid-session.
    assert!(app.edit_sync.is_editing());
}

#[test]
fn test_notecard_mode_paginates_and_navigates() {
    // Many paragraphs so more than one notecard exists at a small viewport.
    let markup: String = (0..30).map(|i| format!("<p>paragraph number {i}</p>")).collect();
    let (_dir, mut app) = open_app(&markup);
    app.presentation.set_viewport(40, 8);

    app.handle_key(key(KeyCode::Char('n')));
    assert_eq!(app.presentation.settings().scroll_mode, ScrollMode::Paginated);
    let total = app.presentation.paginator().len();
    assert!(total > 1, "expected multiple notecards, got {total}");

    // Every block lands on exactly one card, in order.
    let flattened: Vec<String> = app
        .presentation
        .paginator()
        .slides()
        .iter()
        .flat_map(|s| s.blocks().iter().map(|b| b.plain_text()))
        .collect();
    let original: Vec<String> = app
        .presentation
        .content()
        .blocks()
        .iter()
        .map(|b| b.plain_text())
        .collect();
    assert_eq!(flattened, original);

    app.handle_key(key(KeyCode::Right));
    assert_eq!(app.presentation.paginator().current_index(), 1);
    app.handle_key(key(KeyCode::Left));
    assert_eq!(app.presentation.paginator().current_index(), 0);

    // Past the last card the index clamps.
    for _ in 0..total + 5 {
        app.handle_key(key(KeyCode::Right));
    }
    assert_eq!(app.presentation.paginator().current_index(), total - 1);
}

#[tokio::test]
async fn test_autoscroll_and_pagination_exclude_each_other() {
    let (_dir, mut app) = open_app("<p>one</p><p>two</p>");

    app.handle_key(key(KeyCode::Char(' ')));
    assert!(app.presentation.autoscroll_enabled());

    // Entering notecard mode stops the scroll.
    app.handle_key(key(KeyCode::Char('n')));
    assert!(!app.presentation.autoscroll_enabled());

    // Space is inert while paginated.
    app.handle_key(key(KeyCode::Char(' ')));
    assert!(!app.presentation.autoscroll_enabled());

    // Leaving notecard mode and re-enabling works again.
    app.handle_key(key(KeyCode::Char('n')));
    app.handle_key(key(KeyCode::Char(' ')));
    assert!(app.presentation.autoscroll_enabled());
    assert_eq!(app.presentation.settings().scroll_mode, ScrollMode::Continuous);
    app.teardown();
}

#[test]
fn test_settings_persist_per_project_and_reload() {
    let dir = TempDir::new().unwrap();
    let library = FsLibrary::open(dir.path()).unwrap();
    let project = ProjectId::new("news");
    library.create_project(&project).unwrap();

    // First session adjusts settings.
    {
        let mut app = App::new(Config::with_library(dir.path())).unwrap();
        let script = ScriptId::new("six-oclock");
        app.library
            .save_script(&project, &script, &ScriptContent::from_markup("<p>hi</p>").unwrap())
            .unwrap();
        app.refresh_projects();
        app.library_pane = LibraryPane::Scripts;
        app.open_selected_script();

        app.handle_key(key(KeyCode::Char(']')));
        app.handle_key(key(KeyCode::Char(']')));
        app.handle_key(key(KeyCode::Char('+')));
    }

    // Second session sees the persisted values.
    let mut app = App::new(Config::with_library(dir.path())).unwrap();
    app.library_pane = LibraryPane::Scripts;
    app.open_selected_script();

    let settings = app.presentation.settings();
    assert!((settings.speed - (bounds::DEFAULT_SPEED + 2.0 * bounds::SPEED_STEP)).abs() < 1e-9);
    assert!(
        (settings.font_size - (bounds::DEFAULT_FONT_SIZE + bounds::FONT_SIZE_STEP)).abs() < 1e-9
    );
}

#[test]
fn test_partial_snapshot_merges_over_defaults() {
    let dir = TempDir::new().unwrap();
    let library = FsLibrary::open(dir.path()).unwrap();
    let project = ProjectId::new("talk");
    library.create_project(&project).unwrap();

    // Hand-written partial snapshot, as an older version might have saved.
    let snapshot: SettingsSnapshot = serde_json::from_str(r#"{ "font_size": 3.0 }"#).unwrap();
    library.save_settings(&project, &snapshot).unwrap();
    library
        .save_script(&project, &ScriptId::new("keynote"), &ScriptContent::from_markup("<p>x</p>").unwrap())
        .unwrap();

    let mut app = App::new(Config::with_library(dir.path())).unwrap();
    app.library_pane = LibraryPane::Scripts;
    app.open_selected_script();

    let settings = app.presentation.settings();
    assert!((settings.font_size - 3.0).abs() < f64::EPSILON);
    assert!((settings.speed - bounds::DEFAULT_SPEED).abs() < f64::EPSILON);
    assert_eq!(settings.margin, bounds::DEFAULT_MARGIN);
}

#[test]
fn test_mirror_receives_content_and_settings() {
    let (_dir, mut app) = open_app("<p>hello</p>");
    let (link, mut rx) = MirrorLink::pair();
    app.attach_mirror(link);

    app.handle_key(key(KeyCode::Char(']')));
    match rx.try_recv().unwrap() {
        MirrorMessage::SettingsChanged { snapshot } => {
            assert_eq!(snapshot.speed, Some(bounds::DEFAULT_SPEED + bounds::SPEED_STEP));
        }
        other => panic!("unexpected mirror message: {other:?}"),
    }

    app.handle_key(key(KeyCode::Char('e')));
    app.handle_key(key(KeyCode::End));
    app.handle_key(key(KeyCode::Char('!')));
    app.handle_key(key(KeyCode::Esc));

    let replaced = std::iter::from_fn(|| rx.try_recv().ok())
        .filter_map(|m| match m {
            MirrorMessage::ContentReplaced { markup } => Some(markup),
            _ => None,
        })
        .last()
        .unwrap();
    assert!(replaced.contains("hello!"));
}

#[test]
fn test_external_content_reflows_pagination() {
    let (_dir, mut app) = open_app("<p>only one</p>");
    app.presentation.set_viewport(40, 8);
    app.handle_key(key(KeyCode::Char('n')));
    assert_eq!(app.presentation.paginator().len(), 1);

    let markup: String = (0..30).map(|i| format!("<p>block {i}</p>")).collect();
    app.update_tx
        .try_send(prompterm::app::AppUpdate::ContentReplaced(markup))
        .unwrap();
    app.handle_updates();

    assert!(app.presentation.paginator().len() > 1);
    assert_eq!(app.presentation.paginator().current_index(), 0);
}

#[test]
fn test_reset_restores_defaults_and_clears_disk() {
    let (_dir, mut app) = open_app("<p>x</p>");
    app.handle_key(key(KeyCode::Char('m')));
    app.handle_key(key(KeyCode::Char(']')));
    let project = app.active_project.clone().unwrap();
    assert!(app.library.load_settings(&project).unwrap().is_some());

    app.handle_key(key(KeyCode::Char('r')));
    let settings = app.presentation.settings();
    assert!(!settings.mirror_horizontal);
    assert!((settings.speed - bounds::DEFAULT_SPEED).abs() < f64::EPSILON);
    assert!(app.library.load_settings(&project).unwrap().is_none());
}

#[test]
fn test_teardown_flushes_in_progress_edit() {
    let (_dir, mut app) = open_app("<p>draft</p>");
    app.handle_key(key(KeyCode::Char('e')));
    app.handle_key(key(KeyCode::End));
    app.handle_key(key(KeyCode::Char('s')));

    // Quit immediately, well inside the debounce window.
    let started = Instant::now();
    app.teardown();
    assert!(started.elapsed() < Duration::from_millis(EDIT_DEBOUNCE_MS));

    let project = app.active_project.clone().unwrap();
    let script = app.active_script.clone().unwrap();
    let saved = app.library.load_script(&project, &script).unwrap();
    assert_eq!(saved.blocks()[0].plain_text(), "drafts");
}
