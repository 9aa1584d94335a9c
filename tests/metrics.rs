#![cfg(feature = "metrics")]
//! Tests for `bbqrflow` metrics helpers.
//!
//! These tests verify that counters update as expected using
//! `metrics_util::debugging::DebuggingRecorder`.
use bbqrflow::{
    fragment::{BbqrCodec, FileType},
    metrics::{self as bbqr_metrics, Disposition},
    reassembly::ReassemblyEngine,
};
use bbqrflow_testing::{patterned_bytes, split_parts};
use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use rstest::rstest;

/// Creates a debugging recorder and snapshotter for metrics testing.
fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

/// Sum of counter values named `name`, optionally filtered by disposition.
fn counter_value(snapshotter: &Snapshotter, name: &str, disposition: Option<&str>) -> u64 {
    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter(|(k, _, _, _)| {
            k.key().name() == name
                && disposition.is_none_or(|wanted| {
                    k.key()
                        .labels()
                        .any(|l| l.key() == "disposition" && l.value() == wanted)
                })
        })
        .map(|(_, _, _, v)| match v {
            DebugValue::Counter(c) => c,
            _ => 0,
        })
        .sum()
}

#[rstest]
#[case(Disposition::Accepted, "accepted")]
#[case(Disposition::Duplicate, "duplicate")]
#[case(Disposition::Dropped, "dropped")]
fn fragment_metric_carries_disposition(#[case] disposition: Disposition, #[case] label: &str) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || bbqr_metrics::inc_fragments(disposition));

    assert_eq!(
        counter_value(&snapshotter, bbqr_metrics::FRAGMENTS_TOTAL, Some(label)),
        1,
        "{label} fragment metric not recorded"
    );
}

#[test]
fn reassembly_records_every_disposition() {
    let parts = split_parts(&patterned_bytes(600), FileType::Binary, 3);
    let (snapshotter, recorder) = debugging_recorder_setup();

    metrics::with_local_recorder(&recorder, || {
        let mut engine = ReassemblyEngine::new(BbqrCodec);
        for fragment in [&parts[0], &parts[0], &"junk".to_owned(), &parts[2], &parts[1]] {
            engine.ingest(fragment).expect("ingest");
        }
    });

    let name = bbqr_metrics::FRAGMENTS_TOTAL;
    assert_eq!(counter_value(&snapshotter, name, Some("accepted")), 3);
    assert_eq!(counter_value(&snapshotter, name, Some("duplicate")), 1);
    assert_eq!(counter_value(&snapshotter, name, Some("dropped")), 1);
    assert_eq!(
        counter_value(&snapshotter, bbqr_metrics::SESSIONS_COMPLETED, None),
        1
    );
}

#[test]
fn session_and_playback_counters_increment() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        bbqr_metrics::inc_sessions_failed();
        bbqr_metrics::inc_playback_ticks();
        bbqr_metrics::inc_playback_ticks();
        bbqr_metrics::inc_render_failures();
    });

    assert_eq!(counter_value(&snapshotter, bbqr_metrics::SESSIONS_FAILED, None), 1);
    assert_eq!(counter_value(&snapshotter, bbqr_metrics::PLAYBACK_TICKS, None), 2);
    assert_eq!(counter_value(&snapshotter, bbqr_metrics::RENDER_FAILURES, None), 1);
}
