//! State machine tests for the TUI App.
//!
//! Each test spawns the mock backend on a separate thread (to avoid nested tokio runtime panics),
//! creates a BlockingHttpService, builds an App, and drives it with key events and explicit
//! clock ticks.

use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use snappic_core::message::FlashKind;
use snappic_service::test_helpers::{listed_image, spawn_test_server, MockBackend};
use snappic_service::BlockingHttpService;
use snappic_tui::app::{App, Mode};

const INTERVAL: Duration = Duration::from_millis(2000);

/// Spawn the mock backend on a separate thread, return the base URL and a
/// handle to its state. BlockingHttpService creates its own tokio Runtime,
/// so the server must live in a separate thread's Runtime to avoid nesting.
fn spawn_server() -> (String, Arc<MockBackend>) {
    let (tx, rx) = std::sync::mpsc::sync_channel(1);
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let server = spawn_test_server().await;
            tx.send((server.base_url.clone(), server.backend.clone()))
                .unwrap();
            std::future::pending::<()>().await;
        });
    });
    rx.recv().unwrap()
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn char_key(c: char) -> KeyEvent {
    key(KeyCode::Char(c))
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        app.handle_key(char_key(c));
    }
}

fn make_app() -> (App, Arc<MockBackend>) {
    let (url, backend) = spawn_server();
    let app = App::new(BlockingHttpService::new(&url), INTERVAL).unwrap();
    (app, backend)
}

fn names(app: &App) -> Vec<String> {
    app.gallery()
        .gallery()
        .items()
        .iter()
        .map(|i| i.filename().to_string())
        .collect()
}

fn write_image(dir: &tempfile::TempDir, name: &str, len: usize) -> String {
    let path = dir.path().join(name);
    std::fs::File::create(&path)
        .unwrap()
        .write_all(&vec![7u8; len])
        .unwrap();
    path.to_string_lossy().into_owned()
}

// ---- Gallery polling ----

#[test]
fn app_starts_in_gallery_and_polls_immediately() {
    let (app, backend) = make_app();
    assert!(matches!(app.mode(), Mode::Gallery));
    assert!(app.is_polling());
    assert!(!app.is_input_mode());
    assert_eq!(backend.list_requests(), 1);
    assert!(app.gallery().gallery().is_empty());
}

#[test]
fn poll_reconciles_by_filename() {
    let (mut app, backend) = make_app();
    backend.set_images(vec![listed_image("A", 1.0), listed_image("B", 1.0)]);
    app.refresh_gallery();
    let b_node = app.gallery().gallery().get("B").unwrap().node_id();

    backend.set_images(vec![listed_image("B", 3.0), listed_image("C", 0.0)]);
    app.tick(Instant::now() + INTERVAL);

    assert_eq!(names(&app), vec!["B", "C"]);
    let b = app.gallery().gallery().get("B").unwrap();
    assert_eq!(b.node_id(), b_node);
    assert_eq!(b.timer().label, "2s");
}

#[test]
fn tick_before_interval_does_not_poll() {
    let (mut app, backend) = make_app();
    app.tick(Instant::now());
    assert_eq!(backend.list_requests(), 1);
    app.tick(Instant::now() + INTERVAL);
    assert_eq!(backend.list_requests(), 2);
}

#[test]
fn empty_listing_clears_gallery() {
    let (mut app, backend) = make_app();
    backend.set_images(vec![listed_image("A", 0.0)]);
    app.refresh_gallery();
    assert_eq!(names(&app), vec!["A"]);

    backend.advance(20.0);
    app.refresh_gallery();
    assert!(app.gallery().gallery().is_empty());
}

#[test]
fn poll_failure_keeps_current_view() {
    let (mut app, backend) = make_app();
    backend.set_images(vec![listed_image("A", 2.0)]);
    app.refresh_gallery();

    backend.set_fail_listing(true);
    app.refresh_gallery();
    assert_eq!(names(&app), vec!["A"]);
    assert!(app.last_poll_error().is_some());

    backend.set_fail_listing(false);
    app.refresh_gallery();
    assert!(app.last_poll_error().is_none());
}

#[test]
fn focus_loss_pauses_and_focus_gain_polls() {
    let (mut app, backend) = make_app();
    app.set_focus(false, Instant::now());
    assert!(!app.is_polling());

    app.tick(Instant::now() + INTERVAL * 5);
    assert_eq!(backend.list_requests(), 1);

    backend.set_images(vec![listed_image("A", 0.0)]);
    app.set_focus(true, Instant::now());
    assert!(app.is_polling());
    assert_eq!(backend.list_requests(), 2);
    assert_eq!(names(&app), vec!["A"]);
}

#[test]
fn repeated_focus_gained_keeps_polling() {
    let (mut app, backend) = make_app();
    let start = Instant::now();
    for step in 1..=5u32 {
        let at = start + Duration::from_millis(1500) * step;
        app.set_focus(true, at);
        app.tick(at + Duration::from_millis(600));
    }
    // Startup fetch plus polls at the ticks of 2.1s, 5.1s and 8.1s.
    assert_eq!(backend.list_requests(), 4);
    assert!(app.is_polling());
}

#[test]
fn refresh_key_polls_now() {
    let (mut app, backend) = make_app();
    app.handle_key(char_key('r'));
    assert_eq!(backend.list_requests(), 2);
}

// ---- Upload view ----

#[test]
fn u_opens_upload_and_pauses_polling() {
    let (mut app, backend) = make_app();
    app.handle_key(char_key('u'));
    assert!(matches!(app.mode(), Mode::Upload { .. }));
    assert!(app.is_input_mode());
    assert!(!app.is_polling());

    app.tick(Instant::now() + INTERVAL * 3);
    assert_eq!(backend.list_requests(), 1);
}

#[test]
fn upload_esc_returns_to_gallery_and_resumes() {
    let (mut app, backend) = make_app();
    app.handle_key(char_key('u'));
    app.handle_key(key(KeyCode::Esc));
    assert!(matches!(app.mode(), Mode::Gallery));
    assert!(app.is_polling());
    assert_eq!(backend.list_requests(), 2);
}

#[test]
fn typing_fills_fields() {
    let (mut app, _backend) = make_app();
    app.handle_key(char_key('u'));
    type_text(&mut app, "cat.jpg");
    app.handle_key(key(KeyCode::Backspace));
    app.handle_key(key(KeyCode::Tab));
    type_text(&mut app, "hi q");

    match app.mode() {
        Mode::Upload { draft, .. } => {
            assert_eq!(draft.path, "cat.jp");
            assert_eq!(draft.comment, "hi q");
        }
        other => panic!("expected upload mode, got {other:?}"),
    }
}

#[test]
fn submit_without_file_shows_error() {
    let (mut app, backend) = make_app();
    app.handle_key(char_key('u'));
    app.handle_key(key(KeyCode::Enter));

    let flash = app.flash().unwrap();
    assert_eq!(flash.kind, FlashKind::Error);
    assert_eq!(flash.text, "Please select an image");
    assert_eq!(backend.upload_requests(), 0);
}

#[test]
fn oversized_file_rejected_without_request() {
    let (mut app, backend) = make_app();
    let dir = tempfile::tempdir().unwrap();
    let path = write_image(&dir, "huge.jpg", 6 * 1024 * 1024);

    app.handle_key(char_key('u'));
    type_text(&mut app, &path);
    app.handle_key(key(KeyCode::Enter));

    assert_eq!(
        app.flash().map(|f| f.text.as_str()),
        Some("File too large. Maximum size is 5MB")
    );
    assert_eq!(backend.upload_requests(), 0);
    assert!(matches!(app.mode(), Mode::Upload { .. }));
}

#[test]
fn successful_upload_navigates_after_delay() {
    let (mut app, backend) = make_app();
    let dir = tempfile::tempdir().unwrap();
    let path = write_image(&dir, "cat.png", 128);

    app.handle_key(char_key('u'));
    type_text(&mut app, &path);
    app.handle_key(key(KeyCode::Tab));
    type_text(&mut app, "my cat");
    app.handle_key(key(KeyCode::Enter));

    assert_eq!(backend.upload_requests(), 1);
    let flash = app.flash().unwrap();
    assert_eq!(flash.kind, FlashKind::Success);
    assert_eq!(flash.text, "Image uploaded successfully!");
    assert!(matches!(app.mode(), Mode::Upload { .. }));

    // Still on the form just before the delay runs out.
    app.tick(Instant::now() + Duration::from_millis(100));
    assert!(matches!(app.mode(), Mode::Upload { .. }));

    app.tick(Instant::now() + Duration::from_secs(2));
    assert!(matches!(app.mode(), Mode::Gallery));
    assert!(app.is_polling());
    let items = app.gallery().gallery().items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].image().comment.as_deref(), Some("my cat"));
}

#[test]
fn form_is_locked_after_success() {
    let (mut app, _backend) = make_app();
    let dir = tempfile::tempdir().unwrap();
    let path = write_image(&dir, "cat.png", 16);

    app.handle_key(char_key('u'));
    type_text(&mut app, &path);
    app.handle_key(key(KeyCode::Enter));
    type_text(&mut app, "xyz");

    match app.mode() {
        Mode::Upload { draft, .. } => assert_eq!(draft.path, path),
        other => panic!("expected upload mode, got {other:?}"),
    }
}

#[test]
fn upload_error_stays_on_form_and_message_clears() {
    let (mut app, backend) = make_app();
    let dir = tempfile::tempdir().unwrap();
    let path = write_image(&dir, "notes.txt", 16);

    app.handle_key(char_key('u'));
    type_text(&mut app, &path);
    app.handle_key(key(KeyCode::Enter));

    assert_eq!(backend.upload_requests(), 1);
    let flash = app.flash().unwrap();
    assert_eq!(flash.kind, FlashKind::Error);
    assert_eq!(flash.text, "Invalid file format. Use JPG, PNG, or WEBP");

    app.tick(Instant::now() + Duration::from_secs(2));
    assert!(matches!(app.mode(), Mode::Upload { .. }));
    assert!(app.flash().is_some());

    app.tick(Instant::now() + Duration::from_secs(6));
    assert!(app.flash().is_none());
    assert!(matches!(app.mode(), Mode::Upload { .. }));
}

#[test]
fn unreachable_backend_reports_network_error() {
    let url = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };
    let mut app = App::new(BlockingHttpService::new(&url), INTERVAL).unwrap();
    assert!(app.last_poll_error().is_some());

    let dir = tempfile::tempdir().unwrap();
    let path = write_image(&dir, "cat.jpg", 16);
    app.handle_key(char_key('u'));
    type_text(&mut app, &path);
    app.handle_key(key(KeyCode::Enter));

    assert_eq!(
        app.flash().map(|f| f.text.as_str()),
        Some("Network error. Please try again.")
    );
}

#[test]
fn next_wakeup_tracks_poll_deadline() {
    let (app, _backend) = make_app();
    let wait = app.next_wakeup(Instant::now());
    assert!(wait <= Duration::from_secs(1));
}
