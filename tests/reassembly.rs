//! Integration tests for the reassembly engine.
//!
//! Properties are checked with `proptest` against real BBQr fragment sets;
//! log assertions run serially because they share the global logger.

use std::{cell::Cell, rc::Rc};

use bbqrflow::{
    fragment::{
        BbqrCodec,
        Detected,
        FileType,
        FragmentCodec,
        JoinError,
        Joined,
        Split,
        SplitError,
        SplitOptions,
    },
    reassembly::{DropReason, IngestOutcome, Progress, ReassemblyEngine},
};
use bbqrflow_testing::{LoggerHandle, logger, patterned_bytes, split_parts};
use log::Level;
use proptest::prelude::*;
use rstest::rstest;
use serial_test::serial;

/// Delegates to [`BbqrCodec`], counting join attempts.
struct CountingCodec {
    joins: Rc<Cell<usize>>,
}

impl FragmentCodec for CountingCodec {
    fn split(
        &self,
        payload: &[u8],
        file_type: FileType,
        options: &SplitOptions,
    ) -> Result<Split, SplitError> {
        BbqrCodec.split(payload, file_type, options)
    }

    fn reassemble(&self, fragments: &[String]) -> Result<Joined, JoinError> {
        self.joins.set(self.joins.get() + 1);
        BbqrCodec.reassemble(fragments)
    }

    fn detect_type(&self, payload: &[u8]) -> Detected { BbqrCodec.detect_type(payload) }
}

/// Codec whose fragments announce nothing about their series.
struct OpaqueCodec;

impl FragmentCodec for OpaqueCodec {
    fn split(
        &self,
        payload: &[u8],
        file_type: FileType,
        options: &SplitOptions,
    ) -> Result<Split, SplitError> {
        BbqrCodec.split(payload, file_type, options)
    }

    fn reassemble(&self, _fragments: &[String]) -> Result<Joined, JoinError> {
        Err(JoinError::Empty)
    }

    fn detect_type(&self, payload: &[u8]) -> Detected { BbqrCodec.detect_type(payload) }
}

#[test]
fn parts_two_one_three_complete_a_600_byte_payload() {
    let payload = patterned_bytes(600);
    let parts = split_parts(&payload, FileType::Binary, 3);
    let mut engine = ReassemblyEngine::new(BbqrCodec);

    for index in [1, 0] {
        let outcome = engine.ingest(&parts[index]).expect("ingest");
        assert!(!outcome.is_complete());
    }
    assert!(engine.ingest(&parts[2]).expect("ingest").is_complete());
    let recovered = engine.payload().expect("payload");
    assert_eq!(recovered.len(), 600);
    assert_eq!(recovered.data(), payload.as_slice());
}

#[test]
fn repeated_part_then_new_part_counts_two() {
    let parts = split_parts(&patterned_bytes(600), FileType::Binary, 3);
    let mut engine = ReassemblyEngine::new(BbqrCodec);

    engine.ingest(&parts[0]).expect("ingest");
    engine.ingest(&parts[0]).expect("ingest");
    engine.ingest(&parts[1]).expect("ingest");

    assert_eq!(engine.progress().collected, 2);
    assert!(!engine.is_complete());
}

#[test]
fn duplicates_skip_the_join_attempt() {
    let parts = split_parts(&patterned_bytes(600), FileType::Binary, 3);
    let joins = Rc::new(Cell::new(0));
    let mut engine = ReassemblyEngine::new(CountingCodec {
        joins: Rc::clone(&joins),
    });

    for _ in 0..3 {
        engine.ingest(&parts[0]).expect("ingest");
    }

    assert_eq!(joins.get(), 1);
    assert_eq!(engine.progress().collected, 1);
}

#[test]
fn codec_without_series_totals_drops_and_reports_unknown_total() {
    let mut engine = ReassemblyEngine::new(OpaqueCodec);
    let outcome = engine.ingest("anything").expect("ingest");

    assert_eq!(
        outcome,
        IngestOutcome::Dropped {
            progress: Progress::new(0, None),
            reason: DropReason::Corrupt(JoinError::Empty),
        }
    );
    assert_eq!(engine.progress().to_string(), "0/?");
}

#[rstest]
#[serial(logger)]
fn session_lifecycle_is_logged(mut logger: LoggerHandle) {
    logger.clear();
    let mut engine = ReassemblyEngine::new(BbqrCodec);
    engine.start();
    engine.ingest("B$HU0100616263").expect("ingest");

    let mut started = false;
    let mut completed = false;
    while let Some(record) = logger.pop() {
        if record.level() == Level::Info {
            started |= record.args().contains("started");
            completed |= record.args().contains("complete: 3 bytes");
        }
    }
    assert!(started, "session start not logged");
    assert!(completed, "session completion not logged");
}

#[rstest]
#[serial(logger)]
fn corrupt_fragment_warns(mut logger: LoggerHandle) {
    logger.clear();
    let mut engine = ReassemblyEngine::new(BbqrCodec);
    engine.ingest("B$QU0100ABCD").expect("ingest");
    assert!(logger.drain_contains(Level::Warn, "dropped fragment"));
}

fn permuted_parts() -> impl Strategy<Value = (Vec<u8>, u16, Vec<usize>)> {
    (64_usize..1200, 2_u16..8).prop_flat_map(|(len, parts)| {
        let order: Vec<usize> = (0..usize::from(parts)).collect();
        (
            proptest::collection::vec(any::<u8>(), len),
            Just(parts),
            Just(order).prop_shuffle(),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn any_order_reassembles_identically((payload, parts, order) in permuted_parts()) {
        let options = SplitOptions::default()
            .with_split_range(parts, parts)
            .with_version_range(1, 40);
        let Ok(split) = BbqrCodec.split(&payload, FileType::Binary, &options) else {
            return Ok(());
        };
        let fragments = split.into_parts();
        let mut engine = ReassemblyEngine::new(BbqrCodec);
        let mut last = 0;

        for &index in order.iter().filter(|&&index| index < fragments.len()) {
            engine.ingest(&fragments[index]).expect("ingest");
            let collected = engine.progress().collected;
            prop_assert!(collected >= last);
            last = collected;
        }

        prop_assert!(engine.is_complete());
        prop_assert_eq!(engine.payload().map(|p| p.data().to_vec()), Some(payload));
    }

    #[test]
    fn repeated_ingest_is_idempotent(
        (payload, parts, order) in permuted_parts(),
        repeat in any::<prop::sample::Index>(),
    ) {
        let options = SplitOptions::default()
            .with_split_range(parts, parts)
            .with_version_range(1, 40);
        let Ok(split) = BbqrCodec.split(&payload, FileType::Binary, &options) else {
            return Ok(());
        };
        let fragments = split.into_parts();
        let mut engine = ReassemblyEngine::new(BbqrCodec);
        let seen: Vec<&String> = order
            .iter()
            .filter_map(|&index| fragments.get(index))
            .take(fragments.len() - 1)
            .collect();
        for fragment in &seen {
            engine.ingest(fragment).expect("ingest");
        }
        let before = (engine.progress(), engine.is_complete());

        let again = seen[repeat.index(seen.len())];
        let outcome = engine.ingest(again).expect("ingest");

        prop_assert_eq!(outcome, IngestOutcome::Duplicate(before.0));
        prop_assert_eq!((engine.progress(), engine.is_complete()), before);
    }
}
