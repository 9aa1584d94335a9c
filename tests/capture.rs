//! Integration tests driving capture sessions from scripted frame sources.

use std::time::Duration;

use bbqrflow::{
    CaptureConfig,
    capture::{CaptureError, CaptureOutcome, CaptureSession},
    fragment::{BbqrCodec, FileType},
    reassembly::{Progress, ReassemblyEngine, ReassemblyError, SessionStatus},
};
use bbqrflow_testing::{ScriptedSource, Step, patterned_bytes, split_parts, within};
use rstest::rstest;
use tokio_util::sync::CancellationToken;

fn engine() -> ReassemblyEngine<BbqrCodec> { ReassemblyEngine::new(BbqrCodec) }

#[tokio::test]
async fn noisy_camera_feed_still_completes() {
    let payload = patterned_bytes(900);
    let parts = split_parts(&payload, FileType::Binary, 4);
    let source = ScriptedSource::new([
        Step::Blank,
        Step::Frame(parts[3].clone()),
        Step::Frame("not a bbqr code".into()),
        Step::Frame(parts[3].clone()),
        Step::Blank,
        Step::Frame(parts[0].clone()),
        Step::Frame(parts[2].clone()),
        Step::Frame(parts[1].clone()),
        Step::Hang,
    ]);

    let handle =
        CaptureSession::spawn(engine(), source, &CancellationToken::new()).expect("spawn");
    let status = handle.status();
    let outcome = within!(handle.join()).expect("capture");

    let CaptureOutcome::Complete(recovered) = outcome else {
        panic!("expected completion, got {outcome:?}");
    };
    assert_eq!(recovered.file_type(), FileType::Binary);
    assert_eq!(recovered.data(), payload.as_slice());
    let last = *status.borrow();
    assert_eq!(last.frames, 8);
    assert_eq!(last.state, SessionStatus::Complete);
}

#[rstest]
#[case::before_any_frame(0)]
#[case::mid_series(2)]
#[tokio::test(start_paused = true)]
async fn shutdown_during_a_stall_cancels_with_progress(#[case] delivered: usize) {
    let parts = split_parts(&patterned_bytes(900), FileType::Binary, 4);
    let source = ScriptedSource::frames(parts.into_iter().take(delivered))
        .then(Step::Pause(Duration::from_secs(30)))
        .then(Step::Hang);
    let shutdown = CancellationToken::new();
    let handle = CaptureSession::spawn(engine(), source, &shutdown).expect("spawn");

    tokio::time::sleep(Duration::from_secs(1)).await;
    shutdown.cancel();
    let outcome = within!(handle.join()).expect("capture");

    let expected_total = (delivered > 0).then_some(4);
    let CaptureOutcome::Cancelled(report) = outcome else {
        panic!("expected cancellation, got {outcome:?}");
    };
    assert_eq!(report.progress, Progress::new(delivered, expected_total));
    assert_eq!(report.fragments.len(), delivered);
}

#[tokio::test(start_paused = true)]
async fn stop_while_paused_reports_last_progress() {
    let parts = split_parts(&patterned_bytes(900), FileType::Binary, 4);
    let source = ScriptedSource::frames([parts[1].clone()])
        .then(Step::Pause(Duration::from_secs(60)))
        .then(Step::Frame(parts[0].clone()));
    let handle =
        CaptureSession::spawn(engine(), source, &CancellationToken::new()).expect("spawn");

    let mut status = handle.status();
    within!(status.wait_for(|s| s.progress.collected == 1)).expect("task alive");
    handle.stop();
    handle.stop();

    assert!(handle.is_stopped());
    let outcome = within!(handle.join()).expect("capture");
    let CaptureOutcome::Cancelled(report) = outcome else {
        panic!("expected cancellation, got {outcome:?}");
    };
    assert_eq!(report.progress, Progress::new(1, Some(4)));
    assert_eq!(report.fragments, [parts[1].clone()]);
}

#[tokio::test]
async fn wrong_payload_type_fails_the_session() {
    let parts = split_parts(&patterned_bytes(300), FileType::Binary, 2);
    let expected_fragments = parts.clone();
    let engine = ReassemblyEngine::with_config(
        BbqrCodec,
        CaptureConfig::new().expect_type(FileType::Psbt),
    );
    let source = ScriptedSource::frames(parts).then(Step::Hang);
    let handle =
        CaptureSession::spawn(engine, source, &CancellationToken::new()).expect("spawn");
    let status = handle.status();

    let err = within!(handle.join()).expect_err("type mismatch");

    let CaptureError::Reassembly { source, report } = err else {
        panic!("expected a reassembly failure, got {err:?}");
    };
    assert_eq!(
        source,
        ReassemblyError::TypeMismatch {
            expected: FileType::Psbt,
            found: FileType::Binary,
        }
    );
    assert_eq!(report.fragments, expected_fragments);
    assert_eq!(report.state, SessionStatus::Failed);
    assert_eq!(status.borrow().state, SessionStatus::Failed);

    let mut retry = ReassemblyEngine::new(BbqrCodec);
    for fragment in &report.fragments {
        retry.ingest(fragment).expect("ingest saved fragment");
    }
    assert_eq!(
        retry.payload().map(|payload| payload.data().to_vec()),
        Some(patterned_bytes(300))
    );
}

#[tokio::test]
async fn source_closing_early_is_exhaustion() {
    let parts = split_parts(&patterned_bytes(900), FileType::Binary, 4);
    let source = ScriptedSource::frames([parts[0].clone(), parts[0].clone()]).then(Step::Blank);
    let handle =
        CaptureSession::spawn(engine(), source, &CancellationToken::new()).expect("spawn");

    let outcome = within!(handle.join()).expect("capture");

    let CaptureOutcome::Exhausted(report) = outcome else {
        panic!("expected exhaustion, got {outcome:?}");
    };
    assert_eq!(report.progress, Progress::new(1, Some(4)));
    assert_eq!(report.fragments, [parts[0].clone()]);
}
