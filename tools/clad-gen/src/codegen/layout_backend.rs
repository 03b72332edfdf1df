// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON layout report.
//!
//! Renders the layout facts of every type (sizes, offsets, enum values,
//! union tags) so they can be diffed across schema revisions or checked by
//! a backend written outside this workspace.

use super::type_hash::{schema_fingerprint, shape_name};
use super::{Backend, EmitError};
use clad::layout::{shape_bounds, Bounds};
use clad::schema::{ResolvedKind, ResolvedType, Shape};
use clad::ResolvedSchema;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutBackend;

impl LayoutBackend {
    pub fn new() -> Self {
        Self
    }

    /// Structured form of the report, before serialization.
    pub fn report(&self, schema: &ResolvedSchema) -> LayoutReport {
        LayoutReport {
            namespace: schema.namespace().join("::"),
            fingerprint: format!("0x{:08X}", schema_fingerprint(schema)),
            types: schema.iter().map(|(_, ty)| type_report(schema, ty)).collect(),
        }
    }
}

impl Backend for LayoutBackend {
    fn name(&self) -> &'static str {
        "layout"
    }

    fn file_extension(&self) -> &'static str {
        "json"
    }

    fn emit(&self, schema: &ResolvedSchema) -> Result<String, EmitError> {
        let mut json = serde_json::to_string_pretty(&self.report(schema))?;
        json.push('\n');
        Ok(json)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutReport {
    pub namespace: String,
    pub fingerprint: String,
    pub types: Vec<TypeReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeReport {
    pub name: String,
    pub kind: &'static str,
    pub size: SizeReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<MemberReport>,
}

/// `max` is `null` for unbounded types; `fixed` is set when min == max.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeReport {
    pub min: u64,
    pub max: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed: Option<u64>,
}

impl From<Bounds> for SizeReport {
    fn from(bounds: Bounds) -> Self {
        Self {
            min: bounds.min,
            max: bounds.max,
            fixed: bounds.fixed_size(),
        }
    }
}

/// A struct field, an enum member or a union member.
#[derive(Debug, Clone, Serialize)]
pub struct MemberReport {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeReport>,
}

fn type_report(schema: &ResolvedSchema, ty: &ResolvedType) -> TypeReport {
    let slot = |name: &str, shape: &Shape, offset: Option<u64>, value: Option<u64>| MemberReport {
        name: name.to_owned(),
        ty: Some(shape_name(schema, shape)),
        offset,
        value,
        size: Some(shape_bounds(schema, shape).into()),
    };
    let (width, members) = match &ty.kind {
        ResolvedKind::Alias(p) => (Some(p.name()), Vec::new()),
        ResolvedKind::Enum(e) => (
            Some(e.width.name()),
            e.members
                .iter()
                .map(|m| MemberReport {
                    name: m.name.clone(),
                    ty: None,
                    offset: None,
                    value: Some(m.value),
                    size: None,
                })
                .collect(),
        ),
        ResolvedKind::Struct(s) => (
            None,
            s.fields
                .iter()
                .zip(&ty.layout.offsets)
                .map(|(f, offset)| slot(&f.name, &f.shape, *offset, None))
                .collect(),
        ),
        ResolvedKind::Union(u) => (
            Some(u.tag_width.name()),
            u.members
                .iter()
                .map(|m| slot(&m.name, &m.shape, None, Some(m.tag)))
                .collect(),
        ),
    };
    TypeReport {
        name: ty.name.clone(),
        kind: ty.kind.label(),
        size: ty.layout.bounds().into(),
        width,
        members,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clad::resolve;
    use clad::schema::{Field, LengthSpec, Primitive, Schema, StructDef, TypeDef, TypeRef};

    #[test]
    fn test_struct_report() {
        let schema = Schema::new(["geo"]).with_type(TypeDef::Struct(
            StructDef::new("Label")
                .field(Field::new("id", Primitive::U16))
                .field(Field::new("text", TypeRef::String(LengthSpec::max(40))))
                .field(Field::new("weight", Primitive::F32)),
        ));
        let resolved = resolve(&schema).expect("resolve");
        let report = LayoutBackend.report(&resolved);

        let label = &report.types[0];
        assert_eq!(label.kind, "struct");
        assert_eq!(label.size, SizeReport { min: 7, max: Some(47), fixed: None });
        let offsets: Vec<Option<u64>> = label.members.iter().map(|m| m.offset).collect();
        assert_eq!(offsets, [Some(0), Some(2), None]);
        assert_eq!(label.members[1].ty.as_deref(), Some("string<u8;40>"));
    }

    #[test]
    fn test_emit_is_json() {
        let schema = Schema::new(Vec::<String>::new()).with_type(TypeDef::Struct(
            StructDef::new("Pair")
                .field(Field::new("a", Primitive::U8))
                .field(Field::new("b", Primitive::U8)),
        ));
        let resolved = resolve(&schema).expect("resolve");
        let json = LayoutBackend.emit(&resolved).expect("emit");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["types"][0]["size"]["fixed"], 2);
        assert_eq!(value["types"][0]["members"][1]["offset"], 1);
    }
}
