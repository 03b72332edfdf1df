// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Validated AST handed over by the schema front-end.
//!
//! The document form is a serde tree (YAML or JSON). Raw field records are
//! checked while deserializing, so a `Schema` value always has exactly one
//! cardinality per field and string bounds only on string elements.

use crate::wire::Width;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl Primitive {
    pub const ALL: [Primitive; 11] = [
        Primitive::Bool,
        Primitive::I8,
        Primitive::I16,
        Primitive::I32,
        Primitive::I64,
        Primitive::U8,
        Primitive::U16,
        Primitive::U32,
        Primitive::U64,
        Primitive::F32,
        Primitive::F64,
    ];

    /// Encoded size in bytes.
    pub const fn size(self) -> usize {
        match self {
            Primitive::Bool | Primitive::I8 | Primitive::U8 => 1,
            Primitive::I16 | Primitive::U16 => 2,
            Primitive::I32 | Primitive::U32 | Primitive::F32 => 4,
            Primitive::I64 | Primitive::U64 | Primitive::F64 => 8,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::I8 => "i8",
            Primitive::I16 => "i16",
            Primitive::I32 => "i32",
            Primitive::I64 => "i64",
            Primitive::U8 => "u8",
            Primitive::U16 => "u16",
            Primitive::U32 => "u32",
            Primitive::U64 => "u64",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    pub const fn is_float(self) -> bool {
        matches!(self, Primitive::F32 | Primitive::F64)
    }

    /// Inclusive range of an integer primitive.
    pub const fn int_range(self) -> Option<(i128, i128)> {
        match self {
            Primitive::I8 => Some((i8::MIN as i128, i8::MAX as i128)),
            Primitive::I16 => Some((i16::MIN as i128, i16::MAX as i128)),
            Primitive::I32 => Some((i32::MIN as i128, i32::MAX as i128)),
            Primitive::I64 => Some((i64::MIN as i128, i64::MAX as i128)),
            Primitive::U8 => Some((0, u8::MAX as i128)),
            Primitive::U16 => Some((0, u16::MAX as i128)),
            Primitive::U32 => Some((0, u32::MAX as i128)),
            Primitive::U64 => Some((0, u64::MAX as i128)),
            Primitive::Bool | Primitive::F32 | Primitive::F64 => None,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared bound on a variable array or a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LengthSpec {
    pub max: Option<u64>,
    pub prefix: Option<Width>,
}

impl LengthSpec {
    pub fn max(max: u64) -> Self {
        Self {
            max: Some(max),
            prefix: None,
        }
    }

    pub fn prefix(prefix: Width) -> Self {
        Self {
            max: None,
            prefix: Some(prefix),
        }
    }
}

/// Element type of a field or union member, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Primitive(Primitive),
    String(LengthSpec),
    /// Declared type, plain or qualified with the schema namespace.
    Named(String),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn string() -> Self {
        TypeRef::String(LengthSpec::default())
    }
}

impl From<Primitive> for TypeRef {
    fn from(p: Primitive) -> Self {
        TypeRef::Primitive(p)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cardinality {
    #[default]
    Scalar,
    Fixed(u64),
    Variable(LengthSpec),
}

/// Literal used as a field default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(v) => write!(f, "{}", v),
            Literal::Int(v) => write!(f, "{}", v),
            Literal::UInt(v) => write!(f, "{}", v),
            Literal::Float(v) => write!(f, "{}", v),
            Literal::Text(v) => write!(f, "{:?}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawField")]
pub struct Field {
    pub name: String,
    pub ty: TypeRef,
    pub cardinality: Cardinality,
    pub default: Option<Literal>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            cardinality: Cardinality::Scalar,
            default: None,
        }
    }

    pub fn fixed(mut self, len: u64) -> Self {
        self.cardinality = Cardinality::Fixed(len);
        self
    }

    pub fn variable(mut self, spec: LengthSpec) -> Self {
        self.cardinality = Cardinality::Variable(spec);
        self
    }

    pub fn with_default(mut self, literal: Literal) -> Self {
        self.default = Some(literal);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawUnionMember")]
pub struct UnionMember {
    pub name: String,
    pub ty: TypeRef,
    pub cardinality: Cardinality,
    pub tag: Option<u64>,
}

impl UnionMember {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            cardinality: Cardinality::Scalar,
            tag: None,
        }
    }

    pub fn variable(mut self, spec: LengthSpec) -> Self {
        self.cardinality = Cardinality::Variable(spec);
        self
    }

    pub fn with_tag(mut self, tag: u64) -> Self {
        self.tag = Some(tag);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumMember {
    pub name: String,
    #[serde(default)]
    pub value: Option<u64>,
}

impl EnumMember {
    pub fn new(name: impl Into<String>, value: Option<u64>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AliasDef {
    pub name: String,
    #[serde(rename = "type")]
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumDef {
    pub name: String,
    #[serde(default)]
    pub storage: Option<Width>,
    #[serde(default)]
    pub members: Vec<EnumMember>,
}

impl EnumDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            storage: None,
            members: Vec::new(),
        }
    }

    pub fn member(mut self, name: impl Into<String>, value: Option<u64>) -> Self {
        self.members.push(EnumMember::new(name, value));
        self
    }

    pub fn storage(mut self, width: Width) -> Self {
        self.storage = Some(width);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructDef {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl StructDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnionDef {
    pub name: String,
    #[serde(default)]
    pub members: Vec<UnionMember>,
    #[serde(default)]
    pub dupes_allowed: bool,
    #[serde(default)]
    pub auto: bool,
}

impl UnionDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            dupes_allowed: false,
            auto: false,
        }
    }

    pub fn member(mut self, member: UnionMember) -> Self {
        self.members.push(member);
        self
    }
}

/// One named declaration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeDef {
    Alias(AliasDef),
    Enum(EnumDef),
    Struct(StructDef),
    /// A struct that is also a top-level serializable root.
    Message(StructDef),
    Union(UnionDef),
}

impl TypeDef {
    pub fn name(&self) -> &str {
        match self {
            TypeDef::Alias(def) => &def.name,
            TypeDef::Enum(def) => &def.name,
            TypeDef::Struct(def) | TypeDef::Message(def) => &def.name,
            TypeDef::Union(def) => &def.name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TypeDef::Alias(_) => "alias",
            TypeDef::Enum(_) => "enum",
            TypeDef::Struct(_) => "struct",
            TypeDef::Message(_) => "message",
            TypeDef::Union(_) => "union",
        }
    }
}

/// Ordered declarations plus their namespace.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Schema {
    #[serde(default)]
    pub namespace: Vec<String>,
    #[serde(default)]
    pub types: Vec<TypeDef>,
}

impl Schema {
    pub fn new<I, S>(namespace: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            namespace: namespace.into_iter().map(Into::into).collect(),
            types: Vec::new(),
        }
    }

    pub fn with_type(mut self, def: TypeDef) -> Self {
        self.types.push(def);
        self
    }
}

/// Document form of a field, before cardinality is settled.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawField {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    default: Option<Literal>,
    #[serde(default)]
    max_length: Option<u64>,
    #[serde(default)]
    length_prefix: Option<Width>,
    #[serde(default)]
    fixed: Option<u64>,
    #[serde(default)]
    variable: bool,
    #[serde(default)]
    max_count: Option<u64>,
    #[serde(default)]
    count_prefix: Option<Width>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawUnionMember {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    tag: Option<u64>,
    #[serde(default)]
    max_length: Option<u64>,
    #[serde(default)]
    length_prefix: Option<Width>,
    #[serde(default)]
    variable: bool,
    #[serde(default)]
    max_count: Option<u64>,
    #[serde(default)]
    count_prefix: Option<Width>,
}

/// Element and cardinality keys shared by fields and union members.
struct RawSlot {
    max_length: Option<u64>,
    length_prefix: Option<Width>,
    fixed: Option<u64>,
    variable: bool,
    max_count: Option<u64>,
    count_prefix: Option<Width>,
}

impl RawSlot {
    fn settle(self, member: &str, ty: &str) -> Result<(TypeRef, Cardinality), String> {
        let string_bound = LengthSpec {
            max: self.max_length,
            prefix: self.length_prefix,
        };
        let ty = if ty == "string" {
            TypeRef::String(string_bound)
        } else if string_bound != LengthSpec::default() {
            return Err(format!(
                "`{}`: max_length/length_prefix only apply to string elements",
                member
            ));
        } else if let Some(p) = Primitive::from_name(ty) {
            TypeRef::Primitive(p)
        } else {
            TypeRef::Named(ty.to_owned())
        };

        let count = LengthSpec {
            max: self.max_count,
            prefix: self.count_prefix,
        };
        let variable = self.variable || count != LengthSpec::default();
        let cardinality = match (self.fixed, variable) {
            (Some(_), true) => {
                return Err(format!(
                    "`{}` cannot be both a fixed and a variable array",
                    member
                ))
            }
            (Some(len), false) => Cardinality::Fixed(len),
            (None, true) => Cardinality::Variable(count),
            (None, false) => Cardinality::Scalar,
        };
        Ok((ty, cardinality))
    }
}

impl TryFrom<RawField> for Field {
    type Error = String;

    fn try_from(raw: RawField) -> Result<Self, Self::Error> {
        let slot = RawSlot {
            max_length: raw.max_length,
            length_prefix: raw.length_prefix,
            fixed: raw.fixed,
            variable: raw.variable,
            max_count: raw.max_count,
            count_prefix: raw.count_prefix,
        };
        let (ty, cardinality) = slot.settle(&raw.name, &raw.ty)?;
        Ok(Self {
            name: raw.name,
            ty,
            cardinality,
            default: raw.default,
        })
    }
}

impl TryFrom<RawUnionMember> for UnionMember {
    type Error = String;

    fn try_from(raw: RawUnionMember) -> Result<Self, Self::Error> {
        // Union payloads are scalars or variable arrays.
        let slot = RawSlot {
            max_length: raw.max_length,
            length_prefix: raw.length_prefix,
            fixed: None,
            variable: raw.variable,
            max_count: raw.max_count,
            count_prefix: raw.count_prefix,
        };
        let (ty, cardinality) = slot.settle(&raw.name, &raw.ty)?;
        Ok(Self {
            name: raw.name,
            ty,
            cardinality,
            tag: raw.tag,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_document_parses() {
        let schema: Schema = serde_yaml::from_str(
            r#"
namespace: [Anki, Test]
types:
  - kind: alias
    name: Meters
    type: f32
  - kind: enum
    name: Mode
    storage: u16
    members:
      - { name: idle }
      - { name: busy, value: 16 }
  - kind: message
    name: Frame
    fields:
      - { name: flag, type: bool, default: true }
      - { name: label, type: string, max_length: 40 }
      - { name: grid, type: u16, fixed: 4 }
      - { name: samples, type: f64, max_count: 10 }
      - { name: tags, type: string, max_length: 8, variable: true, count_prefix: u16 }
  - kind: union
    name: Event
    members:
      - { name: frame, type: Frame }
      - { name: raw, type: u8, max_count: 16, tag: 7 }
"#,
        )
        .expect("parse");

        assert_eq!(schema.namespace, ["Anki", "Test"]);
        assert_eq!(schema.types.len(), 4);

        let TypeDef::Enum(mode) = &schema.types[1] else {
            panic!("expected enum, got {:?}", schema.types[1]);
        };
        assert_eq!(mode.storage, Some(Width::U16));
        assert_eq!(mode.members[1], EnumMember::new("busy", Some(16)));

        let TypeDef::Message(frame) = &schema.types[2] else {
            panic!("expected message");
        };
        assert_eq!(frame.fields[0].default, Some(Literal::Bool(true)));
        assert_eq!(frame.fields[1].ty, TypeRef::String(LengthSpec::max(40)));
        assert_eq!(frame.fields[2].cardinality, Cardinality::Fixed(4));
        assert_eq!(
            frame.fields[3].cardinality,
            Cardinality::Variable(LengthSpec::max(10))
        );
        assert_eq!(
            frame.fields[4].cardinality,
            Cardinality::Variable(LengthSpec::prefix(Width::U16))
        );

        let TypeDef::Union(event) = &schema.types[3] else {
            panic!("expected union");
        };
        assert_eq!(event.members[0].ty, TypeRef::named("Frame"));
        assert_eq!(event.members[1].tag, Some(7));
    }

    #[test]
    fn test_fixed_and_variable_rejected() {
        let err = serde_yaml::from_str::<Field>("{ name: bad, type: u8, fixed: 2, max_count: 4 }")
            .expect_err("conflicting cardinality");
        assert!(err.to_string().contains("both a fixed and a variable"));
    }

    #[test]
    fn test_string_bound_on_non_string_rejected() {
        let err = serde_yaml::from_str::<Field>("{ name: bad, type: u8, max_length: 4 }")
            .expect_err("string bound on u8");
        assert!(err.to_string().contains("only apply to string"));
    }

    #[test]
    fn test_literal_forms() {
        let lits: Vec<Literal> = serde_yaml::from_str("[true, -3, 18446744073709551615, 1.5, idle]")
            .expect("literals");
        assert_eq!(
            lits,
            [
                Literal::Bool(true),
                Literal::Int(-3),
                Literal::UInt(u64::MAX),
                Literal::Float(1.5),
                Literal::Text("idle".into()),
            ]
        );
    }

    #[test]
    fn test_primitive_names() {
        for p in Primitive::ALL {
            assert_eq!(Primitive::from_name(p.name()), Some(p));
        }
        assert_eq!(Primitive::from_name("string"), None);
        assert_eq!(Primitive::U16.int_range(), Some((0, 65_535)));
    }
}
