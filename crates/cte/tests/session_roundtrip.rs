use bytes::Bytes;
use cte::session::{DecoderSession, DecoderState, EncoderSession, FieldReader, FieldWriter};
use cte::wire::{
    decode_all, CteError, Field, FieldKind, COMMAND_DATA_EXTENDED_MAX_LEN, MAX_LIST_LEN,
    PUBLIC_KEY_SIZE, SIGNATURE_SIZE,
};

fn decode_fields(bytes: Bytes) -> Vec<Field> {
    let mut decoder = DecoderSession::new(bytes).expect("input within limits");
    let mut fields = Vec::new();
    while let Some(field) = decoder.advance().expect("field should decode") {
        fields.push(field);
    }
    assert_eq!(decoder.state(), DecoderState::Exhausted);
    fields
}

#[test]
fn transaction_scenario_round_trips() {
    let k1 = [0x11u8; PUBLIC_KEY_SIZE];
    let k2 = [0x22u8; PUBLIC_KEY_SIZE];
    let s1 = [0xAAu8; SIGNATURE_SIZE];

    let mut encoder = EncoderSession::new();
    encoder.append_public_key_list(&[k1, k2]).unwrap();
    encoder.append_signature_list(&[s1]).unwrap();
    encoder.append_index_reference(5).unwrap();
    encoder.append_command_text("Hello").unwrap();
    let bytes = encoder.finalize().unwrap();

    let mut decoder = DecoderSession::new(bytes).unwrap();

    let keys = decoder.advance().unwrap().unwrap();
    assert_eq!(keys.kind(), FieldKind::PublicKeyList);
    assert_eq!(keys, Field::PublicKeyList(vec![k1, k2]));

    let sigs = decoder.advance().unwrap().unwrap();
    assert_eq!(sigs.count(), Some(1));
    assert_eq!(sigs, Field::SignatureList(vec![s1]));

    assert_eq!(decoder.advance().unwrap(), Some(Field::IndexReference(5)));

    let command = decoder.advance().unwrap().unwrap();
    assert_eq!(command.command_data(), Some(&b"Hello"[..]));
    assert_eq!(command.text().as_deref(), Some("Hello"));

    assert_eq!(decoder.advance().unwrap(), None);
    assert_eq!(decoder.state(), DecoderState::Exhausted);
}

#[test]
fn every_kind_round_trips_in_any_order() {
    let fields = vec![
        Field::command_text(&"z".repeat(COMMAND_DATA_EXTENDED_MAX_LEN)),
        Field::IndexReference(15),
        Field::Version,
        Field::SignatureList((0..MAX_LIST_LEN as u8).map(|i| [i; SIGNATURE_SIZE]).collect()),
        Field::CommandData(Bytes::new()),
        Field::PublicKeyList((0..MAX_LIST_LEN as u8).map(|i| [!i; PUBLIC_KEY_SIZE]).collect()),
        Field::IndexReference(0),
        Field::command_text(&"y".repeat(32)),
    ];

    let mut encoder = EncoderSession::new();
    for field in &fields {
        encoder.append_field(field).unwrap();
    }
    let bytes = encoder.finalize().unwrap();

    assert_eq!(decode_fields(bytes.clone()), fields);
    assert_eq!(decode_all(bytes).unwrap(), fields);
}

#[test]
fn command_length_boundaries_round_trip() {
    for len in [0usize, 1, 31, 32, 33, 255, 256, 1196, 1197] {
        let payload: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        let mut encoder = EncoderSession::new();
        encoder.append_command_data(&payload).unwrap();
        let bytes = encoder.finalize().unwrap();

        let header_len = if len <= 31 { 1 } else { 2 };
        assert_eq!(bytes.len(), header_len + len, "length {len}");
        assert_eq!(
            decode_fields(bytes),
            vec![Field::CommandData(Bytes::from(payload))]
        );
    }
}

#[test]
fn oversized_command_is_rejected() {
    let mut encoder = EncoderSession::new();
    let err = encoder
        .append_command_data(&[0u8; COMMAND_DATA_EXTENDED_MAX_LEN + 1])
        .unwrap_err();
    assert!(matches!(err, CteError::InvalidArgument(_)));
    assert_eq!(err.code(), -2);
}

#[test]
fn truncated_buffer_fails_then_refuses_reuse() {
    let mut encoder = EncoderSession::new();
    encoder.append_signature_list(&[[1u8; 64], [2u8; 64]]).unwrap();
    let bytes = encoder.finalize().unwrap();

    let mut decoder = DecoderSession::new(bytes.slice(..100)).unwrap();
    let err = decoder.advance().unwrap_err();
    assert!(matches!(err, CteError::InsufficientData { .. }));
    assert_eq!(err.code(), -4);
    assert_eq!(decoder.state(), DecoderState::Errored);

    let err = decoder.advance().unwrap_err();
    assert!(matches!(err, CteError::InvalidState(_)));
}

#[test]
fn empty_buffer_reports_no_fields() {
    let mut decoder = DecoderSession::new(Vec::<u8>::new()).unwrap();
    assert_eq!(decoder.advance().unwrap(), None);
    assert!(matches!(
        decoder.advance(),
        Err(CteError::InvalidState(_))
    ));
}

#[test]
fn second_finalize_never_returns_a_buffer() {
    let mut encoder = EncoderSession::new();
    encoder.append_index_reference(1).unwrap();
    let _ = encoder.finalize().unwrap();
    for _ in 0..3 {
        let err = encoder.finalize().unwrap_err();
        assert!(matches!(err, CteError::InvalidState(_)));
        assert_eq!(err.code(), -5);
    }
}

#[test]
fn stream_helpers_agree_with_sessions() {
    let fields = vec![
        Field::Version,
        Field::PublicKeyList(vec![[3; 32]]),
        Field::command_text("stream"),
    ];

    let mut writer = FieldWriter::new(Vec::<u8>::new());
    writer.write_fields(&fields).unwrap();
    let wire = writer.into_inner();

    let mut encoder = EncoderSession::new();
    for field in &fields {
        encoder.append_field(field).unwrap();
    }
    assert_eq!(encoder.finalize().unwrap().as_ref(), wire.as_slice());

    let mut reader = FieldReader::new(std::io::Cursor::new(wire));
    let mut read = Vec::new();
    while let Some(field) = reader.read_field().unwrap() {
        read.push(field);
    }
    assert_eq!(read, fields);
}
