// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Integration tests for the dynamic backend.

use super::*;
use crate::error::{DecodeErrorKind, EncodeError};
use crate::resolve;
use crate::schema::{ResolvedSchema, Schema, TypeId};
use std::sync::Arc;

const SCHEMA: &str = r#"
namespace: [Anki, Test]
types:
  - kind: enum
    name: Magic
    storage: u32
    members:
      - { name: none }
      - { name: beef, value: 3735928559 }
  - kind: message
    name: Mixed
    fields:
      - { name: flag, type: bool }
      - { name: small, type: i8 }
      - { name: port, type: u16 }
      - { name: delta, type: i32 }
      - { name: stamp, type: i64 }
      - { name: magic, type: Magic }
      - { name: note, type: string }
  - kind: struct
    name: Grid
    fields:
      - { name: cells, type: u16, fixed: 4 }
      - { name: id, type: u8 }
  - kind: union
    name: Inner
    members:
      - { name: number, type: i32 }
      - { name: text, type: string, max_length: 8 }
  - kind: union
    name: Outer
    members:
      - { name: inner, type: Inner }
      - { name: grid, type: Grid }
      - { name: raw, type: u8, max_count: 4 }
  - kind: message
    name: Envelope
    fields:
      - { name: seq, type: u32, default: 7 }
      - { name: body, type: Outer }
      - { name: samples, type: f64, max_count: 3 }
"#;

fn schema() -> Arc<ResolvedSchema> {
    let parsed: Schema = serde_yaml::from_str(SCHEMA).expect("parse schema");
    Arc::new(resolve(&parsed).expect("resolve schema"))
}

fn id(schema: &ResolvedSchema, name: &str) -> TypeId {
    schema.lookup(name).expect("declared type")
}

fn mixed_value() -> Value {
    Value::structure([
        ("flag", Value::Bool(true)),
        ("small", Value::I8(-128)),
        ("port", Value::U16(u16::MAX)),
        ("delta", Value::I32(-123_123)),
        ("stamp", Value::I64(i64::MIN + 1)),
        ("magic", Value::Enum(0xdead_beef)),
        ("note", Value::from("several words of text")),
    ])
}

fn round_trip(schema: &ResolvedSchema, name: &str, value: &Value) -> Vec<u8> {
    let ty = id(schema, name);
    let bytes = to_bytes(schema, ty, value).expect("pack");
    assert_eq!(size_of(schema, ty, value).expect("size"), bytes.len());
    let decoded = unpack(schema, ty, &bytes).expect("unpack");
    assert_eq!(&decoded.value, value);
    assert_eq!(decoded.consumed, bytes.len());
    assert!(decoded.warnings.is_empty());
    bytes
}

#[test]
fn test_mixed_struct_layout() {
    let schema = schema();
    let bytes = round_trip(&schema, "Mixed", &mixed_value());
    let note = "several words of text";
    assert_eq!(bytes.len(), 1 + 1 + 2 + 4 + 8 + 4 + (1 + note.len()));

    assert_eq!(bytes[0], 0x01);
    assert_eq!(bytes[1], 0x80);
    assert_eq!(&bytes[2..4], &[0xff, 0xff]);
    assert_eq!(&bytes[4..8], &(-123_123i32).to_le_bytes());
    assert_eq!(&bytes[16..20], &[0xef, 0xbe, 0xad, 0xde]);
    assert_eq!(bytes[20] as usize, note.len());
    assert_eq!(&bytes[21..], note.as_bytes());
}

#[test]
fn test_every_truncation_underruns() {
    let schema = schema();
    let ty = id(&schema, "Mixed");
    let bytes = to_bytes(&schema, ty, &mixed_value()).expect("pack");
    for cut in 0..bytes.len() {
        let err = unpack(&schema, ty, &bytes[..cut]).expect_err("truncated input");
        assert!(
            matches!(err.kind, DecodeErrorKind::BufferUnderrun { .. }),
            "cut at {} gave {:?}",
            cut,
            err
        );
        // The enum is decoded as its own type.
        let innermost = if (16..20).contains(&cut) { "Magic" } else { "Mixed" };
        assert_eq!(err.type_name, innermost);
    }
}

#[test]
fn test_unpack_ignores_trailing_bytes() {
    let schema = schema();
    let ty = id(&schema, "Grid");
    let value = Value::structure([
        ("cells", Value::Array(vec![Value::U16(1), Value::U16(2), Value::U16(3), Value::U16(4)])),
        ("id", Value::U8(9)),
    ]);
    let mut bytes = to_bytes(&schema, ty, &value).expect("pack");
    bytes.extend_from_slice(&[0xaa, 0xbb]);
    let decoded = unpack(&schema, ty, &bytes).expect("unpack");
    assert_eq!(decoded.consumed, 9);
    assert_eq!(decoded.value, value);
}

#[test]
fn test_fixed_array_size_is_independent_of_contents() {
    let schema = schema();
    let ty = id(&schema, "Grid");
    for fill in [0u16, 1, u16::MAX] {
        let value = Value::structure([
            ("cells", Value::Array(vec![Value::U16(fill); 4])),
            ("id", Value::U8(0)),
        ]);
        assert_eq!(size_of(&schema, ty, &value).expect("size"), 4 * 2 + 1);
    }
    assert_eq!(schema.layout(ty).fixed_size(), Some(9));

    let short = Value::structure([
        ("cells", Value::Array(vec![Value::U16(1); 3])),
        ("id", Value::U8(0)),
    ]);
    assert!(matches!(
        size_of(&schema, ty, &short),
        Err(EncodeError::FixedArrayLength { expected: 4, len: 3, .. })
    ));
}

#[test]
fn test_union_in_union_round_trip() {
    let schema = schema();
    let nested = Value::union("inner", Value::union("text", Value::from("hi")));
    let bytes = round_trip(&schema, "Outer", &nested);
    assert_eq!(bytes, [0x00, 0x01, 0x02, b'h', b'i']);

    let raw = Value::union("raw", Value::Sequence(vec![Value::U8(1), Value::U8(2)]));
    assert_eq!(round_trip(&schema, "Outer", &raw), [0x02, 0x02, 0x01, 0x02]);
}

#[test]
fn test_struct_with_union_member_round_trip() {
    let schema = schema();
    let envelope = Value::structure([
        ("seq", Value::U32(42)),
        ("body", Value::union("inner", Value::union("number", Value::I32(-1)))),
        ("samples", Value::Sequence(vec![Value::F64(f64::NAN), Value::F64(-0.0), Value::F64(f64::INFINITY)])),
    ]);
    round_trip(&schema, "Envelope", &envelope);
}

#[test]
fn test_invalid_union_tag() {
    let schema = schema();
    let ty = id(&schema, "Envelope");
    let err = unpack(&schema, ty, &[0, 0, 0, 0, 0x00, 0x05]).expect_err("tag 5 of Inner");
    assert_eq!(err.kind, DecodeErrorKind::InvalidUnionTag(5));
    assert_eq!(err.type_name, "Inner");
    assert_eq!(err.offset, 5);
}

#[test]
fn test_invalid_bool() {
    let schema = schema();
    let ty = id(&schema, "Mixed");
    let mut bytes = to_bytes(&schema, ty, &mixed_value()).expect("pack");
    bytes[0] = 2;
    let err = unpack(&schema, ty, &bytes).expect_err("bool 2");
    assert_eq!(err.kind, DecodeErrorKind::InvalidBoolEncoding(2));
    assert_eq!(err.offset, 0);
}

#[test]
fn test_unknown_enum_value_is_kept() {
    let schema = schema();
    let ty = id(&schema, "Mixed");
    let mut bytes = to_bytes(&schema, ty, &mixed_value()).expect("pack");
    bytes[16..20].copy_from_slice(&77u32.to_le_bytes());

    let decoded = unpack(&schema, ty, &bytes).expect("unknown enum still decodes");
    assert_eq!(decoded.value.get_field("magic"), Some(&Value::Enum(77)));
    assert_eq!(
        decoded.warnings,
        [DecodeWarning::UnknownEnumValue {
            type_name: "Magic".into(),
            offset: 16,
            value: 77,
        }]
    );

    // The raw value survives a second trip unchanged.
    let again = to_bytes(&schema, ty, &decoded.value).expect("repack");
    assert_eq!(again, bytes);
}

#[test]
fn test_encode_errors_write_nothing() {
    let schema = schema();
    let ty = id(&schema, "Outer");
    let mut sink = vec![0x55];

    let too_long = Value::union("raw", Value::Sequence(vec![Value::U8(0); 5]));
    assert!(matches!(
        pack(&schema, ty, &too_long, &mut sink),
        Err(EncodeError::ArrayTooLong { len: 5, max: 4, .. })
    ));

    assert!(matches!(
        pack(&schema, ty, &Value::Union(None), &mut sink),
        Err(EncodeError::UnionUnset { .. })
    ));

    let long_text = Value::union("inner", Value::union("text", Value::from("way too long")));
    assert!(matches!(
        pack(&schema, ty, &long_text, &mut sink),
        Err(EncodeError::ArrayTooLong { max: 8, .. })
    ));

    let wrong = Value::union("inner", Value::union("number", Value::U32(1)));
    assert!(matches!(
        pack(&schema, ty, &wrong, &mut sink),
        Err(EncodeError::TypeMismatch { .. })
    ));

    assert_eq!(sink, [0x55]);
}

#[test]
fn test_missing_field() {
    let schema = schema();
    let ty = id(&schema, "Grid");
    let err = size_of(&schema, ty, &Value::structure([("id", Value::U8(1))])).expect_err("no cells");
    assert_eq!(
        err,
        EncodeError::MissingField {
            type_name: "Grid".into(),
            field: "cells".into(),
        }
    );
}

#[test]
fn test_message_union_exclusivity() {
    let schema = schema();
    let mut outer = DynamicMessage::new(&schema, "Outer").expect("Outer");
    assert_eq!(outer.active_member(), Some("inner"));

    outer
        .set_member("raw", Value::Sequence(vec![Value::U8(1), Value::U8(2), Value::U8(3)]))
        .expect("set raw");
    outer
        .set_member("inner", Value::union("number", Value::I32(5)))
        .expect("set inner");
    assert_eq!(outer.tag().expect("union"), Some(0));
    assert_eq!(outer.size().expect("size"), 1 + 1 + 4);

    let err = outer
        .set_member("raw", Value::Sequence(vec![Value::U8(0); 9]))
        .expect_err("too long");
    assert!(matches!(err, AccessError::Invalid(EncodeError::ArrayTooLong { .. })));
    assert_eq!(outer.active_member(), Some("inner"));

    assert!(matches!(
        outer.set_member("nope", Value::U8(0)),
        Err(AccessError::MemberNotFound { .. })
    ));
}

#[test]
fn test_message_defaults_and_fields() {
    let schema = schema();
    let mut envelope = DynamicMessage::new(&schema, "Anki::Test::Envelope").expect("qualified name");
    assert_eq!(envelope.get("seq").expect("seq"), &Value::U32(7));
    assert_eq!(envelope.get("samples").expect("samples"), &Value::Sequence(Vec::new()));

    envelope.set("seq", 9u32).expect("set seq");
    assert!(matches!(
        envelope.set("seq", "nine"),
        Err(AccessError::Invalid(EncodeError::TypeMismatch { .. }))
    ));
    assert!(matches!(
        envelope.get("missing"),
        Err(AccessError::FieldNotFound { .. })
    ));
    assert!(matches!(envelope.tag(), Err(AccessError::WrongKind { .. })));

    let bytes = envelope.to_bytes().expect("pack");
    let (decoded, consumed) = DynamicMessage::unpack(&schema, envelope.type_id(), &bytes).expect("unpack");
    assert_eq!(consumed, bytes.len());
    assert_eq!(decoded, envelope);
}

#[test]
fn test_with_member_factory() {
    let schema = schema();
    let inner = DynamicMessage::with_member(&schema, "Inner", "text", "abc").expect("factory");
    assert_eq!(inner.tag().expect("union"), Some(1));
    assert_eq!(inner.to_bytes().expect("pack"), [0x01, 0x03, b'a', b'b', b'c']);

    assert!(matches!(
        DynamicMessage::new(&schema, "Missing"),
        Err(AccessError::UnknownType(_))
    ));
}
