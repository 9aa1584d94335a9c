//! Property tests for the split and join primitives.

use bbqrflow::fragment::{Encoding, FileType, SplitOptions, join, split};
use proptest::prelude::*;

fn encoding() -> impl Strategy<Value = Encoding> {
    prop_oneof![Just(Encoding::Hex), Just(Encoding::Base32), Just(Encoding::Zlib)]
}

fn file_type() -> impl Strategy<Value = FileType> {
    prop_oneof![
        Just(FileType::Psbt),
        Just(FileType::Transaction),
        Just(FileType::Json),
        Just(FileType::Cbor),
        Just(FileType::UnicodeText),
        Just(FileType::Executable),
        Just(FileType::Binary),
    ]
}

prop_compose! {
    fn split_case()(
        payload in proptest::collection::vec(any::<u8>(), 1..3000),
        file_type in file_type(),
        encoding in encoding(),
        min_version in 1_u8..=20,
        extra in 0_u8..=20,
    ) -> (Vec<u8>, FileType, SplitOptions) {
        let options = SplitOptions::default()
            .with_encoding(encoding)
            .with_version_range(min_version, min_version + extra);
        (payload, file_type, options)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn join_inverts_split((payload, file_type, options) in split_case()) {
        let split = split(&payload, file_type, &options).expect("default split range fits");

        match options.encoding {
            Encoding::Zlib => prop_assert!(split.encoding() != Encoding::Hex),
            requested => prop_assert_eq!(split.encoding(), requested),
        }
        prop_assert!(split.version() >= options.min_version);
        prop_assert!(split.version() <= options.max_version);

        let joined = join(split.parts()).expect("join");
        prop_assert_eq!(joined.file_type(), file_type);
        prop_assert_eq!(joined.payload(), payload.as_slice());
    }

    #[test]
    fn join_ignores_part_order(
        (payload, file_type, options) in split_case(),
        seed in any::<u64>(),
    ) {
        let mut parts = split(&payload, file_type, &options).expect("split").into_parts();
        let len = parts.len();
        parts.rotate_left(usize::try_from(seed % len as u64).unwrap_or(0));
        parts.reverse();

        let joined = join(&parts).expect("join");
        prop_assert_eq!(joined.payload(), payload.as_slice());
    }

    #[test]
    fn compressible_payloads_travel_compressed(
        phrase in "[a-z ]{4,16}",
        repeats in 20_usize..200,
        file_type in file_type(),
    ) {
        let payload = phrase.repeat(repeats).into_bytes();
        let options = SplitOptions::default().with_encoding(Encoding::Zlib);
        let split = split(&payload, file_type, &options).expect("split");

        prop_assert_eq!(split.encoding(), Encoding::Zlib);
        let joined = join(split.parts()).expect("join");
        prop_assert_eq!(joined.encoding(), Encoding::Zlib);
        prop_assert_eq!(joined.payload(), payload.as_slice());
    }

    #[test]
    fn split_is_deterministic((payload, file_type, options) in split_case()) {
        let first = split(&payload, file_type, &options).expect("split");
        let second = split(&payload, file_type, &options).expect("split");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn fewer_parts_never_exist_in_range((payload, file_type, options) in split_case()) {
        let chosen = split(&payload, file_type, &options).expect("split");
        prop_assume!(chosen.len() > 1);
        let tighter = options.with_split_range(1, u16::try_from(chosen.len() - 1).expect("fits"));
        prop_assert!(split(&payload, file_type, &tighter).is_err());
    }
}
