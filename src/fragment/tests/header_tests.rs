//! Tests for header parsing and base36 part numbering.

use rstest::rstest;

use crate::fragment::{
    Encoding,
    FileType,
    FragmentHeader,
    HeaderError,
    HeaderField,
    PartIndex,
    PartTotal,
};

#[test]
fn header_parses_fields_and_body() {
    let (header, body) = FragmentHeader::parse("B$2P0301ABCDEFGH").expect("valid header");
    assert_eq!(header.encoding(), Encoding::Base32);
    assert_eq!(header.file_type(), FileType::Psbt);
    assert_eq!(header.total().get(), 3);
    assert_eq!(header.index().get(), 1);
    assert_eq!(body, "ABCDEFGH");
}

#[test]
fn header_accepts_lower_case_digits() {
    let (header, body) = FragmentHeader::parse("B$HJ0a05").expect("valid header");
    assert_eq!(header.total().get(), 10);
    assert_eq!(header.index().get(), 5);
    assert!(body.is_empty());
}

#[test]
fn header_round_trips_through_display() {
    let total = PartTotal::new(1295).expect("max total");
    let index = PartIndex::new(36).expect("index");
    let header =
        FragmentHeader::new(Encoding::Zlib, FileType::UnicodeText, total, index).expect("header");
    assert_eq!(header.to_string(), "B$ZUZZ10");

    let (parsed, _) = FragmentHeader::parse(&header.to_string()).expect("reparse");
    assert_eq!(parsed, header);
}

#[rstest]
#[case::too_short("B$2P03", HeaderError::TooShort { len: 6 })]
#[case::missing_magic("X$2P0300AAAA", HeaderError::MissingMagic)]
#[case::non_ascii("B$2Pé000", HeaderError::NonAscii)]
#[case::unknown_encoding("B$QP0300", HeaderError::UnknownEncoding('Q'))]
#[case::unknown_type("B$2Q0300", HeaderError::UnknownFileType('Q'))]
#[case::bad_total("B$2P0!00", HeaderError::InvalidDigits { field: HeaderField::Total, digits: "0!".into() })]
#[case::bad_index("B$2P03-1", HeaderError::InvalidDigits { field: HeaderField::Index, digits: "-1".into() })]
#[case::zero_total("B$2P0000", HeaderError::ZeroTotal)]
#[case::index_past_total("B$2P0303", HeaderError::IndexOutOfRange { index: 3, total: 3 })]
fn header_rejects_malformed_input(#[case] text: &str, #[case] expected: HeaderError) {
    let err = FragmentHeader::parse(text).expect_err("header must be rejected");
    assert_eq!(err, expected);
}

#[test]
fn header_mismatch_reports_first_differing_field() {
    let (lead, _) = FragmentHeader::parse("B$2P0300").expect("lead");
    let (other_type, _) = FragmentHeader::parse("B$2T0301").expect("other type");
    let (other_total, _) = FragmentHeader::parse("B$2P0401").expect("other total");
    let (sibling, _) = FragmentHeader::parse("B$2P0302").expect("sibling");

    assert_eq!(lead.mismatch(&other_type), Some(HeaderField::FileType));
    assert_eq!(lead.mismatch(&other_total), Some(HeaderField::Total));
    assert_eq!(lead.mismatch(&sibling), None);
}

#[test]
fn part_numbers_enforce_their_ranges() {
    assert!(PartTotal::new(0).is_none());
    assert!(PartTotal::new(1296).is_none());
    assert!(PartIndex::try_from(1296_usize).is_err());

    let total = PartTotal::new(2).expect("total");
    assert!(total.contains(PartIndex::zero()));
    assert!(!total.contains(PartIndex::new(2).expect("index")));
}
