// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Wire vectors: byte-exact encodings every backend must reproduce.
//
// Each vector packs a known value through the dynamic backend, compares the
// bytes against the expected hex, then unpacks and re-packs them.

#![allow(clippy::unreadable_literal)]

use clad::dynamic::{self, Value};
use clad::{resolve, ResolutionError, ResolvedSchema, Schema, Width};

const SCHEMA: &str = r#"
namespace: [Vectors]
types:
  - kind: enum
    name: Gappy
    members:
      - { name: e1 }
      - { name: e2 }
      - { name: e3, value: 16 }
      - { name: e4, value: 1280 }
      - { name: e5 }
      - { name: e6, value: 1000 }
      - { name: e7 }
  - kind: alias
    name: Meters
    type: f32
  - kind: struct
    name: Point
    fields:
      - { name: x, type: Meters }
      - { name: y, type: Meters }
  - kind: message
    name: Path
    fields:
      - { name: kind, type: Gappy }
      - { name: name, type: string, length_prefix: u16 }
      - { name: points, type: Point, max_count: 300 }
  - kind: union
    name: Wide
    members:
      - { name: point, type: Point }
      - { name: path, type: Path, tag: 256 }
"#;

fn schema() -> ResolvedSchema {
    let parsed: Schema = serde_yaml::from_str(SCHEMA).expect("parse schema");
    resolve(&parsed).expect("resolve schema")
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn verify(schema: &ResolvedSchema, name: &str, value: &Value, expected_hex: &str) {
    let id = schema.lookup(name).expect("declared type");
    let bytes = dynamic::to_bytes(schema, id, value).expect("pack");
    assert_eq!(hex(&bytes), expected_hex, "encoding of {name}");

    let decoded = dynamic::unpack(schema, id, &bytes).expect("unpack");
    assert_eq!(&decoded.value, value);
    assert_eq!(decoded.consumed, bytes.len());

    let again = dynamic::to_bytes(schema, id, &decoded.value).expect("re-pack");
    assert_eq!(again, bytes, "re-encoding of {name}");
}

fn point(x: f32, y: f32) -> Value {
    Value::structure([("x", Value::F32(x)), ("y", Value::F32(y))])
}

#[test]
fn golden_enum_assignment() {
    let schema = schema();
    let gappy = schema
        .enum_type(schema.lookup("Gappy").expect("Gappy"))
        .expect("enum");
    let values: Vec<(&str, u64)> = gappy
        .members
        .iter()
        .map(|m| (m.name.as_str(), m.value))
        .collect();
    assert_eq!(
        values,
        [
            ("e1", 0),
            ("e2", 1),
            ("e3", 16),
            ("e4", 1280),
            ("e5", 1281),
            ("e6", 1000),
            ("e7", 1001),
        ]
    );
    assert_eq!(gappy.width, Width::U16);
}

#[test]
fn golden_point() {
    verify(&schema(), "Point", &point(1.0, -2.5), "0000803f000020c0");
}

#[test]
fn golden_path() {
    let path = Value::structure([
        ("kind", Value::Enum(1281)),
        ("name", Value::from("ab")),
        ("points", Value::Sequence(vec![point(0.0, 1.0)])),
    ]);
    // kind u16 | name: u16 prefix + bytes | points: u16 prefix (max 300) + 8 bytes each
    verify(
        &schema(),
        "Path",
        &path,
        "0105020061620100000000000000803f",
    );
}

#[test]
fn golden_wide_union_tag() {
    let schema = schema();
    let wide = schema
        .union_type(schema.lookup("Wide").expect("Wide"))
        .expect("union");
    assert_eq!(wide.tag_width, Width::U16);

    verify(
        &schema,
        "Wide",
        &Value::union("point", point(0.0, 0.0)),
        "00000000000000000000",
    );

    let empty_path = Value::structure([
        ("kind", Value::Enum(0)),
        ("name", Value::from("")),
        ("points", Value::Sequence(Vec::new())),
    ]);
    verify(
        &schema,
        "Wide",
        &Value::union("path", empty_path),
        "0001000000000000",
    );
}

#[test]
fn golden_layout_facts() {
    let schema = schema();
    let point = schema.layout(schema.lookup("Point").expect("Point"));
    assert_eq!(point.fixed_size(), Some(8));
    assert_eq!(point.offsets, [Some(0), Some(4)]);

    let path = schema.layout(schema.lookup("Path").expect("Path"));
    assert_eq!(path.min, 2 + 2 + 2);
    assert_eq!(path.max, Some(2 + (2 + 65_535) + (2 + 300 * 8)));
    assert_eq!(path.offsets, [Some(0), Some(2), None]);
}

#[test]
fn length_prefix_overflow_is_reported() {
    let parsed: Schema = serde_yaml::from_str(
        r#"
types:
  - kind: struct
    name: Frame
    fields:
      - { name: payload, type: u8, max_count: 300, count_prefix: u8 }
"#,
    )
    .expect("parse");
    let err = resolve(&parsed).expect_err("300 does not fit u8");
    assert_eq!(
        err,
        ResolutionError::LengthPrefixOverflow {
            type_name: "Frame".into(),
            member: "payload".into(),
            max: 300,
            prefix: "u8",
        }
    );
}
