//! Unit tests for the playback engine and the QR text renderer.

use std::time::Duration;

use qrcode::types::QrError;
use rstest::{fixture, rstest};
use tokio::time::{Instant, sleep};

use super::*;
use crate::config::PlaybackConfig;

/// Renders a fragment as itself, refusing anything containing `bad`.
#[derive(Clone, Copy, Debug, Default)]
struct EchoRenderer;

impl CodeRenderer for EchoRenderer {
    type Output = String;

    fn render(&self, fragment: &str) -> Result<String, RenderError> {
        if fragment.contains("bad") {
            return Err(RenderError::Rejected {
                reason: "bad fragment".into(),
            });
        }
        Ok(format!("[{fragment}]"))
    }

    fn placeholder(&self, _fragment: &str, _error: &RenderError) -> String { "XX".into() }
}

fn fragments(names: &[&str]) -> Vec<String> { names.iter().map(|&name| name.to_owned()).collect() }

#[fixture]
fn loaded() -> PlaybackEngine<EchoRenderer> {
    let mut engine = PlaybackEngine::new(EchoRenderer);
    engine
        .load(fragments(&["a", "b", "c"]))
        .expect("load three fragments");
    engine
}

#[rstest]
fn load_prerenders_and_resets(mut loaded: PlaybackEngine<EchoRenderer>) {
    assert!(loaded.show_index(2));
    loaded.load(fragments(&["x", "y"])).expect("reload");

    assert_eq!(loaded.current_index(), 0);
    assert_eq!(loaded.len(), 2);
    let codes: Vec<_> = loaded.frames().iter().map(|f| f.code().as_str()).collect();
    assert_eq!(codes, ["[x]", "[y]"]);
}

#[test]
fn load_rejects_empty_sequence() {
    let mut engine = PlaybackEngine::new(EchoRenderer);
    assert_eq!(engine.load(Vec::new()), Err(PlaybackError::Empty));
    assert!(engine.is_empty());
    assert_eq!(engine.current_fragment(), None);
}

#[test]
fn render_failures_become_placeholders() {
    let mut engine = PlaybackEngine::new(EchoRenderer);
    engine
        .load(fragments(&["ok", "bad", "fine"]))
        .expect("load");

    let frame = &engine.frames()[1];
    assert!(frame.is_placeholder());
    assert_eq!(frame.code(), "XX");
    assert_eq!(frame.fragment(), "bad");
    assert!(!engine.frames()[0].is_placeholder());
}

#[rstest]
#[case(1, true, 1)]
#[case(3, false, 0)]
#[case(usize::MAX, false, 0)]
fn show_index_bounds(
    loaded: PlaybackEngine<EchoRenderer>,
    #[case] target: usize,
    #[case] moved: bool,
    #[case] expected: usize,
) {
    assert_eq!(loaded.show_index(target), moved);
    assert_eq!(loaded.current_index(), expected);
}

#[test]
fn start_requires_loaded_fragments() {
    let mut engine = PlaybackEngine::new(EchoRenderer);
    assert_eq!(
        engine.start(PlaybackConfig::default()),
        Err(PlaybackError::Empty)
    );
}

#[rstest]
fn start_requires_runtime(mut loaded: PlaybackEngine<EchoRenderer>) {
    assert_eq!(
        loaded.start(PlaybackConfig::default()),
        Err(PlaybackError::NoRuntime)
    );
    assert!(!loaded.is_running());
}

#[tokio::test(start_paused = true)]
async fn advances_once_per_interval_and_wraps() {
    let mut engine = loaded();
    let mut rx = engine.subscribe();
    let started = Instant::now();
    engine
        .start(PlaybackConfig::from_millis(1000))
        .expect("start");

    for expected in [1, 2, 0] {
        rx.changed().await.expect("timer alive");
        assert_eq!(*rx.borrow_and_update(), expected);
    }
    assert_eq!(started.elapsed(), Duration::from_millis(3000));
    assert_eq!(engine.current_fragment(), Some("a"));
}

#[tokio::test(start_paused = true)]
async fn restart_replaces_the_timer() {
    let mut engine = loaded();
    let mut rx = engine.subscribe();
    let config = PlaybackConfig::from_millis(1000);
    engine.start(config).expect("start");
    sleep(Duration::from_millis(500)).await;
    engine.start(config).expect("restart");
    let restarted = Instant::now();

    rx.changed().await.expect("timer alive");
    assert_eq!(restarted.elapsed(), Duration::from_millis(1000));
    assert_eq!(*rx.borrow_and_update(), 1);

    sleep(Duration::from_millis(500)).await;
    assert!(!rx.has_changed().expect("sender alive"));
}

#[tokio::test(start_paused = true)]
async fn stop_halts_advancement_and_is_idempotent() {
    let mut engine = loaded();
    engine
        .start(PlaybackConfig::from_millis(100))
        .expect("start");
    assert!(engine.is_running());

    engine.stop();
    engine.stop();
    sleep(Duration::from_secs(5)).await;

    assert!(!engine.is_running());
    assert_eq!(engine.current_index(), 0);
}

#[tokio::test(start_paused = true)]
async fn load_stops_running_timer() {
    let mut engine = loaded();
    engine
        .start(PlaybackConfig::from_millis(100))
        .expect("start");
    engine.load(fragments(&["z"])).expect("reload");

    sleep(Duration::from_secs(1)).await;
    assert!(!engine.is_running());
    assert_eq!(engine.current_fragment(), Some("z"));
}

#[test]
fn qr_text_renderer_draws_fragment() {
    let art = QrTextRenderer::new()
        .render("B$2U0100MFRGG")
        .expect("short fragment renders");
    assert!(art.lines().count() > 10);
    assert!(art.chars().any(|c| matches!(c, '█' | '▀' | '▄')));
}

#[test]
fn qr_text_renderer_rejects_oversized_fragment() {
    let oversized = "A".repeat(8000);
    assert_eq!(
        QrTextRenderer::new().render(&oversized),
        Err(RenderError::Qr(QrError::DataTooLong))
    );
}

#[test]
fn qr_placeholder_is_marked() {
    let renderer = QrTextRenderer::new();
    let error = RenderError::Qr(QrError::DataTooLong);
    let placeholder = renderer.placeholder("B$2U0100MFRGG", &error);
    assert!(placeholder.starts_with("##### UNRENDERABLE B$2U0100"));
}
