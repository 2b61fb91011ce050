//! Unit tests for the row text codec

use rendezvous_core::data::{decode, encode, Row};
use rendezvous_core::RendezvousError;

const PEOPLE: &str = "Ada,Lovelace,36\nAlan,Turing,41\nGrace,Hopper,85";

#[test]
fn test_decode_people() {
    let rows = decode(PEOPLE).unwrap();
    assert_eq!(
        rows,
        vec![
            Row::new("Ada", "Lovelace", 36),
            Row::new("Alan", "Turing", 41),
            Row::new("Grace", "Hopper", 85),
        ]
    );
}

#[test]
fn test_text_round_trip() {
    let samples = [
        "",
        "Ada,Lovelace,36",
        PEOPLE,
        "Jean,,0\n,Anonymous,120",
        "Marie,Curie,-3\nLise,Meitner,89",
    ];

    for text in samples {
        let rows = decode(text).unwrap();
        assert_eq!(encode(&rows), text, "round trip of {:?}", text);
    }
}

#[test]
fn test_rows_round_trip() {
    let cases = vec![
        Vec::new(),
        vec![Row::new("Ada", "Lovelace", 36)],
        vec![
            Row::new("Alan", "Turing", 41),
            Row::new("Grace", "Hopper", 85),
            Row::new("Grace", "Hopper", 85),
        ],
        vec![Row::new("Edsger", "Dijkstra", i64::MAX), Row::new("Kurt", "Gödel", i64::MIN)],
    ];

    for rows in cases {
        assert_eq!(decode(&encode(&rows)).unwrap(), rows);
    }
}

#[test]
fn test_encode_has_no_trailing_newline() {
    let text = encode(&[Row::new("Ada", "Lovelace", 36), Row::new("Alan", "Turing", 41)]);
    assert_eq!(text, "Ada,Lovelace,36\nAlan,Turing,41");
}

#[test]
fn test_inconsistent_field_count_rejected() {
    let err = decode("Ada,Lovelace,36\nAlan,Turing").unwrap_err();
    assert_eq!(
        err,
        RendezvousError::MalformedRow {
            line: 2,
            reason: "expected 3 fields, found 2".into(),
        }
    );
    assert!(err.is_collaborator());
}

#[test]
fn test_non_canonical_age_rejected() {
    for text in ["Ada,Lovelace, 36", "Ada,Lovelace,036", "Ada,Lovelace,+36", "Ada,Lovelace,36 "] {
        let err = decode(text).unwrap_err();
        assert!(
            matches!(err, RendezvousError::MalformedRow { line: 1, .. }),
            "{:?} gave {:?}",
            text,
            err
        );
    }

    // An accepted age re-encodes to the same text
    let text = "Ada,Lovelace,36\nAlan,Turing,-41";
    assert_eq!(encode(&decode(text).unwrap()), text);
}
