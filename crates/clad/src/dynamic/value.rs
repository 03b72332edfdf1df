// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic value types.

use crate::schema::{DefaultValue, Element, Primitive, ResolvedKind, ResolvedSchema, Shape, TypeId};
use std::collections::HashMap;

/// A dynamic value that can hold any CLAD type shape.
///
/// Equality is structural, with floats compared bit-for-bit so that NaN
/// payloads and signed zeros survive a round trip check.
#[derive(Debug, Clone)]
pub enum Value {
    // Primitives
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),

    /// Raw numeric value; it need not match a declared member.
    Enum(u64),

    // Composites
    Struct(HashMap<String, Value>),
    /// Fixed array.
    Array(Vec<Value>),
    /// Variable array.
    Sequence(Vec<Value>),
    /// `None` is the unset union.
    Union(Option<UnionValue>),
}

/// Active member of a union together with its payload.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionValue {
    pub member: String,
    pub payload: Box<Value>,
}

impl UnionValue {
    pub fn new(member: impl Into<String>, payload: Value) -> Self {
        Self {
            member: member.into(),
            payload: Box::new(payload),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::U8(a), Self::U8(b)) => a == b,
            (Self::U16(a), Self::U16(b)) => a == b,
            (Self::U32(a), Self::U32(b)) => a == b,
            (Self::U64(a), Self::U64(b)) => a == b,
            (Self::I8(a), Self::I8(b)) => a == b,
            (Self::I16(a), Self::I16(b)) => a == b,
            (Self::I32(a), Self::I32(b)) => a == b,
            (Self::I64(a), Self::I64(b)) => a == b,
            (Self::F32(a), Self::F32(b)) => a.to_bits() == b.to_bits(),
            (Self::F64(a), Self::F64(b)) => a.to_bits() == b.to_bits(),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Enum(a), Self::Enum(b)) => a == b,
            (Self::Struct(a), Self::Struct(b)) => a == b,
            (Self::Array(a), Self::Array(b)) | (Self::Sequence(a), Self::Sequence(b)) => a == b,
            (Self::Union(a), Self::Union(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// Struct value from `(field, value)` pairs.
    pub fn structure<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::Struct(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Union value with `member` active.
    pub fn union(member: impl Into<String>, payload: Value) -> Self {
        Self::Union(Some(UnionValue::new(member, payload)))
    }

    /// Zero state of a declared type: first enum member, first union
    /// member with a default payload, field defaults applied.
    pub fn default_for(schema: &ResolvedSchema, id: TypeId) -> Self {
        match &schema.get(id).kind {
            ResolvedKind::Alias(p) => Self::zero(*p),
            ResolvedKind::Enum(e) => Self::Enum(e.members.first().map_or(0, |m| m.value)),
            ResolvedKind::Struct(s) => Self::Struct(
                s.fields
                    .iter()
                    .map(|f| {
                        let value = match &f.default {
                            Some(default) => Self::from_default(default, f.shape.element()),
                            None => Self::default_for_shape(schema, &f.shape),
                        };
                        (f.name.clone(), value)
                    })
                    .collect(),
            ),
            ResolvedKind::Union(u) => Self::Union(
                u.members
                    .first()
                    .map(|m| UnionValue::new(m.name.clone(), Self::default_for_shape(schema, &m.shape))),
            ),
        }
    }

    pub fn default_for_shape(schema: &ResolvedSchema, shape: &Shape) -> Self {
        match shape {
            Shape::Scalar(element) => Self::default_for_element(schema, element),
            Shape::Fixed { element, len } => Self::Array(
                (0..*len)
                    .map(|_| Self::default_for_element(schema, element))
                    .collect(),
            ),
            Shape::Variable { .. } => Self::Sequence(Vec::new()),
        }
    }

    pub fn default_for_element(schema: &ResolvedSchema, element: &Element) -> Self {
        match element {
            Element::Primitive(p) => Self::zero(*p),
            Element::String { .. } => Self::String(String::new()),
            Element::Enum(id) | Element::Struct(id) | Element::Union(id) => Self::default_for(schema, *id),
        }
    }

    pub fn zero(p: Primitive) -> Self {
        match p {
            Primitive::Bool => Self::Bool(false),
            Primitive::I8 => Self::I8(0),
            Primitive::I16 => Self::I16(0),
            Primitive::I32 => Self::I32(0),
            Primitive::I64 => Self::I64(0),
            Primitive::U8 => Self::U8(0),
            Primitive::U16 => Self::U16(0),
            Primitive::U32 => Self::U32(0),
            Primitive::U64 => Self::U64(0),
            Primitive::F32 => Self::F32(0.0),
            Primitive::F64 => Self::F64(0.0),
        }
    }

    /// Resolved defaults are range-checked, so the narrowing casts are exact.
    fn from_default(default: &DefaultValue, element: &Element) -> Self {
        match (default, element) {
            (DefaultValue::Bool(v), _) => Self::Bool(*v),
            (DefaultValue::Int(v), Element::Primitive(p)) => match p {
                Primitive::I8 => Self::I8(*v as i8),
                Primitive::I16 => Self::I16(*v as i16),
                Primitive::I32 => Self::I32(*v as i32),
                Primitive::I64 => Self::I64(*v as i64),
                Primitive::U8 => Self::U8(*v as u8),
                Primitive::U16 => Self::U16(*v as u16),
                Primitive::U32 => Self::U32(*v as u32),
                Primitive::U64 => Self::U64(*v as u64),
                Primitive::F32 => Self::F32(*v as f32),
                Primitive::F64 => Self::F64(*v as f64),
                Primitive::Bool => Self::Bool(*v != 0),
            },
            (DefaultValue::Float(v), Element::Primitive(Primitive::F32)) => Self::F32(*v as f32),
            (DefaultValue::Float(v), _) => Self::F64(*v),
            (DefaultValue::Text(v), _) => Self::String(v.clone()),
            (DefaultValue::Enum { value, .. }, _) => Self::Enum(*value),
            (DefaultValue::Int(v), _) => Self::I64(*v as i64),
        }
    }

    /// Short name of the variant, used in mismatch reports.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::String(_) => "string",
            Self::Enum(_) => "enum",
            Self::Struct(_) => "struct",
            Self::Array(_) => "array",
            Self::Sequence(_) => "sequence",
            Self::Union(_) => "union",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Any unsigned integer or enum, widened.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U8(v) => Some(u64::from(*v)),
            Self::U16(v) => Some(u64::from(*v)),
            Self::U32(v) => Some(u64::from(*v)),
            Self::U64(v) | Self::Enum(v) => Some(*v),
            _ => None,
        }
    }

    /// Any signed integer, widened.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I8(v) => Some(i64::from(*v)),
            Self::I16(v) => Some(i64::from(*v)),
            Self::I32(v) => Some(i64::from(*v)),
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F32(v) => Some(f64::from(*v)),
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Elements of a fixed or variable array.
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(v) | Self::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn get_field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Struct(fields) => fields.get(name),
            _ => None,
        }
    }

    pub fn get_field_mut(&mut self, name: &str) -> Option<&mut Value> {
        match self {
            Self::Struct(fields) => fields.get_mut(name),
            _ => None,
        }
    }

    /// Active union member and payload.
    pub fn as_union(&self) -> Option<(&str, &Value)> {
        match self {
            Self::Union(Some(active)) => Some((&active.member, &active.payload)),
            _ => None,
        }
    }
}

macro_rules! impl_from_primitive {
    ($($type:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$type> for Value {
                fn from(v: $type) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_from_primitive! {
    bool => Bool,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    String => String,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<UnionValue> for Value {
    fn from(v: UnionValue) -> Self {
        Self::Union(Some(v))
    }
}
