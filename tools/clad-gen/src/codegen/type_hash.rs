// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use clad::schema::{Element, ResolvedKind, Shape};
use clad::ResolvedSchema;
use std::fmt::Write as _;

/// 32-bit FNV-1a hash.
#[must_use]
pub fn fnv1a(bytes: &[u8]) -> u32 {
    const FNV_PRIME: u32 = 16_777_619;
    const FNV_OFFSET: u32 = 2_166_136_261;

    let mut hash = FNV_OFFSET;
    for byte in bytes {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Fingerprint of everything that shapes the wire: type order, kinds,
/// member names, enum values, union tags, widths and bounds.
///
/// Field defaults are left out; they never reach the wire.
#[must_use]
pub fn schema_fingerprint(schema: &ResolvedSchema) -> u32 {
    fnv1a(canonical_form(schema).as_bytes())
}

/// One line per type, in declaration order.
pub fn canonical_form(schema: &ResolvedSchema) -> String {
    let mut out = format!("namespace {}\n", schema.namespace().join("::"));
    for (_, ty) in schema.iter() {
        // Writing into a String cannot fail.
        let _ = match &ty.kind {
            ResolvedKind::Alias(p) => writeln!(out, "alias {} {}", ty.name, p),
            ResolvedKind::Enum(e) => {
                let members: Vec<String> = e
                    .members
                    .iter()
                    .map(|m| format!("{}={}", m.name, m.value))
                    .collect();
                writeln!(out, "enum {} {} {}", ty.name, e.width, members.join(" "))
            }
            ResolvedKind::Struct(s) => {
                let fields: Vec<String> = s
                    .fields
                    .iter()
                    .map(|f| format!("{}:{}", f.name, shape_name(schema, &f.shape)))
                    .collect();
                writeln!(out, "{} {} {}", ty.kind.label(), ty.name, fields.join(" "))
            }
            ResolvedKind::Union(u) => {
                let members: Vec<String> = u
                    .members
                    .iter()
                    .map(|m| format!("{}@{}:{}", m.name, m.tag, shape_name(schema, &m.shape)))
                    .collect();
                writeln!(out, "union {} {} {}", ty.name, u.tag_width, members.join(" "))
            }
        };
    }
    out
}

/// `u16[4]`, `f64[u8;10]`, `string<u8;40>`.
pub(crate) fn shape_name(schema: &ResolvedSchema, shape: &Shape) -> String {
    match shape {
        Shape::Scalar(e) => element(schema, e),
        Shape::Fixed { element: e, len } => format!("{}[{}]", element(schema, e), len),
        Shape::Variable {
            element: e,
            prefix,
            max,
        } => format!("{}[{};{}]", element(schema, e), prefix, max),
    }
}

fn element(schema: &ResolvedSchema, element: &Element) -> String {
    match element {
        Element::String { prefix, max } => format!("string<{};{}>", prefix, max),
        other => schema.element_name(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clad::resolve;
    use clad::schema::{EnumDef, Field, Primitive, Schema, StructDef, TypeDef};

    fn resolved(enum_value: u64) -> ResolvedSchema {
        let schema = Schema::new(["geo"])
            .with_type(TypeDef::Enum(
                EnumDef::new("Kind").member("a", None).member("b", Some(enum_value)),
            ))
            .with_type(TypeDef::Struct(
                StructDef::new("Point")
                    .field(Field::new("kind", clad::schema::TypeRef::named("Kind")))
                    .field(Field::new("x", Primitive::F32)),
            ));
        resolve(&schema).expect("resolve")
    }

    #[test]
    fn test_fnv_reference_values() {
        assert_eq!(fnv1a(b""), 0x811c_9dc5);
        assert_eq!(fnv1a(b"a"), 0xe40c_292c);
    }

    #[test]
    fn test_fingerprint_reproducible() {
        assert_eq!(schema_fingerprint(&resolved(5)), schema_fingerprint(&resolved(5)));
    }

    #[test]
    fn test_fingerprint_tracks_enum_values() {
        assert_ne!(schema_fingerprint(&resolved(5)), schema_fingerprint(&resolved(6)));
    }

    #[test]
    fn test_canonical_form() {
        assert_eq!(
            canonical_form(&resolved(5)),
            "namespace geo\nenum Kind u8 a=0 b=5\nstruct Point kind:Kind x:f32\n"
        );
    }
}
