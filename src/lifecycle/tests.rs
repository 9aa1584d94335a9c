use std::time::Duration;

use rstest::rstest;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use super::*;
use crate::{
    capture::{CaptureSession, ChannelSource},
    config::PlaybackConfig,
    fragment::BbqrCodec,
    playback::{PlaybackEngine, RenderError},
    reassembly::ReassemblyEngine,
};

struct PlainRenderer;

impl CodeRenderer for PlainRenderer {
    type Output = String;

    fn render(&self, fragment: &str) -> Result<String, RenderError> { Ok(fragment.to_owned()) }

    fn placeholder(&self, fragment: &str, _error: &RenderError) -> String { fragment.to_owned() }
}

#[derive(Default)]
struct Counter {
    active: bool,
    suspensions: usize,
}

impl Suspend for Counter {
    fn suspend(&mut self) {
        self.active = false;
        self.suspensions += 1;
    }

    fn is_active(&self) -> bool { self.active }
}

#[rstest]
#[case(true, Visibility::Hidden)]
#[case(false, Visibility::Visible)]
fn visibility_from_hidden_flag(#[case] hidden: bool, #[case] expected: Visibility) {
    assert_eq!(Visibility::from_hidden(hidden), expected);
}

#[test]
fn becoming_visible_resumes_nothing() {
    let mut lifecycle = Lifecycle::new();
    let mut counter = Counter::default();

    lifecycle.apply(Visibility::Hidden, &mut [&mut counter as &mut dyn Suspend]);
    let resumed = lifecycle.apply(Visibility::Visible, &mut [&mut counter as &mut dyn Suspend]);

    assert_eq!(resumed, 0);
    assert!(!counter.is_active());
    assert_eq!(counter.suspensions, 1);
    assert_eq!(lifecycle.visibility(), Visibility::Visible);
}

#[test]
fn hiding_twice_is_harmless() {
    let mut lifecycle = Lifecycle::new();
    let mut counter = Counter {
        active: true,
        suspensions: 0,
    };

    let first = lifecycle.apply(Visibility::Hidden, &mut [&mut counter as &mut dyn Suspend]);
    let second = lifecycle.apply(Visibility::Hidden, &mut [&mut counter as &mut dyn Suspend]);
    assert_eq!((first, second), (1, 0));
}

#[tokio::test(start_paused = true)]
async fn hiding_stops_playback_and_capture() {
    let mut playback = PlaybackEngine::new(PlainRenderer);
    playback
        .load(vec!["a".into(), "b".into()])
        .expect("load");
    playback
        .start(PlaybackConfig::from_millis(100))
        .expect("start");

    let (_tx, source) = ChannelSource::channel(4);
    let mut capture = CaptureSession::spawn(
        ReassemblyEngine::new(BbqrCodec),
        source,
        &CancellationToken::new(),
    )
    .expect("spawn");

    let mut lifecycle = Lifecycle::new();
    let suspended = lifecycle.apply(
        Visibility::Hidden,
        &mut [&mut playback as &mut dyn Suspend, &mut capture],
    );

    assert_eq!(suspended, 2);
    assert!(!playback.is_running());
    assert!(!capture.is_active());
    let index = playback.current_index();
    sleep(Duration::from_secs(1)).await;
    assert_eq!(playback.current_index(), index);
}
