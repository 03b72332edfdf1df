// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire codec driven by the resolved schema at run time.
//!
//! Packing walks the value twice over the same code path: once into a byte
//! counter, which validates every bound and yields the exact size, then into
//! the real sink. The second walk cannot fail, so nothing is written for a
//! value that does not fit its type.

use super::value::Value;
use crate::error::{DecodeError, DecodeErrorKind, EncodeError};
use crate::schema::{Element, Primitive, ResolvedKind, ResolvedSchema, Shape, TypeId};
use crate::wire::{check_len, Cursor, Width, Writer};
use std::collections::HashMap;
use std::fmt;

/// Non-fatal finding while decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeWarning {
    /// An enum carried a value no member declares; the raw value is kept.
    UnknownEnumValue {
        type_name: String,
        offset: usize,
        value: u64,
    },
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownEnumValue {
                type_name,
                offset,
                value,
            } => write!(f, "unknown `{}` value {} at byte {}", type_name, value, offset),
        }
    }
}

/// Result of [`unpack`].
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub value: Value,
    /// Bytes read from the front of the source.
    pub consumed: usize,
    pub warnings: Vec<DecodeWarning>,
}

/// Exact encoded size of `value` as an instance of `id`.
pub fn size_of(schema: &ResolvedSchema, id: TypeId, value: &Value) -> Result<usize, EncodeError> {
    let mut measure = Measure(0);
    Encoder { schema }.emit_type(id, value, &mut measure)?;
    Ok(measure.0)
}

/// Check every bound, tag and field of `value` without encoding it.
pub fn validate(schema: &ResolvedSchema, id: TypeId, value: &Value) -> Result<(), EncodeError> {
    size_of(schema, id, value).map(|_| ())
}

/// Size of one slot value; used to check single-field updates.
pub(crate) fn shape_size(
    schema: &ResolvedSchema,
    owner: &str,
    member: &str,
    shape: &Shape,
    value: &Value,
) -> Result<usize, EncodeError> {
    let mut measure = Measure(0);
    Encoder { schema }.emit_shape(owner, member, shape, value, &mut measure)?;
    Ok(measure.0)
}

/// Append the encoding of `value` to `sink` and return the bytes written.
/// `sink` is untouched on error.
pub fn pack(
    schema: &ResolvedSchema,
    id: TypeId,
    value: &Value,
    sink: &mut Vec<u8>,
) -> Result<usize, EncodeError> {
    let size = size_of(schema, id, value)?;
    let start = sink.len();
    sink.reserve(size);
    let written = {
        let mut w = Writer::new(sink);
        Encoder { schema }.emit_type(id, value, &mut w)
    };
    if let Err(err) = written {
        sink.truncate(start);
        return Err(err);
    }
    debug_assert_eq!(sink.len() - start, size);
    Ok(sink.len() - start)
}

pub fn to_bytes(schema: &ResolvedSchema, id: TypeId, value: &Value) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    pack(schema, id, value, &mut buf)?;
    Ok(buf)
}

/// Decode one `id` value from the front of `src`.
pub fn unpack(schema: &ResolvedSchema, id: TypeId, src: &[u8]) -> Result<Decoded, DecodeError> {
    let mut decoder = Decoder {
        schema,
        r: Cursor::new(src),
        warnings: Vec::new(),
    };
    let value = decoder.decode_type(id)?;
    Ok(Decoded {
        value,
        consumed: decoder.r.offset(),
        warnings: decoder.warnings,
    })
}

/// Destination of an encoding walk.
trait Output {
    fn put_uint(&mut self, width: Width, value: u64);
    /// A primitive value already checked against its declared type.
    fn put_primitive(&mut self, p: Primitive, value: &Value);
    fn put_bytes(&mut self, bytes: &[u8]);
}

/// Counts bytes instead of writing them.
struct Measure(usize);

impl Output for Measure {
    fn put_uint(&mut self, width: Width, _value: u64) {
        self.0 += width.bytes();
    }

    fn put_primitive(&mut self, p: Primitive, _value: &Value) {
        self.0 += p.size();
    }

    fn put_bytes(&mut self, bytes: &[u8]) {
        self.0 += bytes.len();
    }
}

impl Output for Writer<'_> {
    fn put_uint(&mut self, width: Width, value: u64) {
        self.write_uint(width, value);
    }

    fn put_primitive(&mut self, _p: Primitive, value: &Value) {
        match value {
            Value::Bool(v) => self.write_bool(*v),
            Value::U8(v) => self.write_u8(*v),
            Value::U16(v) => self.write_u16_le(*v),
            Value::U32(v) => self.write_u32_le(*v),
            Value::U64(v) => self.write_u64_le(*v),
            Value::I8(v) => self.write_i8(*v),
            Value::I16(v) => self.write_i16_le(*v),
            Value::I32(v) => self.write_i32_le(*v),
            Value::I64(v) => self.write_i64_le(*v),
            Value::F32(v) => self.write_f32_le(*v),
            Value::F64(v) => self.write_f64_le(*v),
            // Rejected by `primitive_matches` before any output is called.
            _ => {}
        }
    }

    fn put_bytes(&mut self, bytes: &[u8]) {
        self.write_bytes(bytes);
    }
}

fn primitive_matches(p: Primitive, value: &Value) -> bool {
    matches!(
        (p, value),
        (Primitive::Bool, Value::Bool(_))
            | (Primitive::I8, Value::I8(_))
            | (Primitive::I16, Value::I16(_))
            | (Primitive::I32, Value::I32(_))
            | (Primitive::I64, Value::I64(_))
            | (Primitive::U8, Value::U8(_))
            | (Primitive::U16, Value::U16(_))
            | (Primitive::U32, Value::U32(_))
            | (Primitive::U64, Value::U64(_))
            | (Primitive::F32, Value::F32(_))
            | (Primitive::F64, Value::F64(_))
    )
}

fn mismatch(type_name: &str, expected: impl Into<String>, found: &Value) -> EncodeError {
    EncodeError::TypeMismatch {
        type_name: type_name.to_owned(),
        expected: expected.into(),
        found: found.kind_name().to_owned(),
    }
}

struct Encoder<'s> {
    schema: &'s ResolvedSchema,
}

impl Encoder<'_> {
    fn emit_type(&self, id: TypeId, value: &Value, out: &mut impl Output) -> Result<(), EncodeError> {
        let ty = self.schema.get(id);
        match (&ty.kind, value) {
            (ResolvedKind::Alias(p), v) => self.emit_primitive(&ty.name, *p, v, out),
            (ResolvedKind::Enum(e), Value::Enum(raw)) => {
                if *raw > e.width.max_value() {
                    return Err(EncodeError::TypeMismatch {
                        type_name: ty.name.clone(),
                        expected: format!("value within {}", e.width),
                        found: raw.to_string(),
                    });
                }
                out.put_uint(e.width, *raw);
                Ok(())
            }
            (ResolvedKind::Struct(s), Value::Struct(fields)) => {
                for field in &s.fields {
                    let value = fields.get(&field.name).ok_or_else(|| EncodeError::MissingField {
                        type_name: ty.name.clone(),
                        field: field.name.clone(),
                    })?;
                    self.emit_shape(&ty.name, &field.name, &field.shape, value, out)?;
                }
                Ok(())
            }
            (ResolvedKind::Union(_), Value::Union(None)) => Err(EncodeError::UnionUnset {
                type_name: ty.name.clone(),
            }),
            (ResolvedKind::Union(u), Value::Union(Some(active))) => {
                let case = u.by_name(&active.member).ok_or_else(|| EncodeError::UnknownMember {
                    type_name: ty.name.clone(),
                    member: active.member.clone(),
                })?;
                out.put_uint(u.tag_width, case.tag);
                self.emit_shape(&ty.name, &case.name, &case.shape, &active.payload, out)
            }
            (kind, v) => Err(mismatch(&ty.name, kind.label(), v)),
        }
    }

    fn emit_shape(
        &self,
        owner: &str,
        member: &str,
        shape: &Shape,
        value: &Value,
        out: &mut impl Output,
    ) -> Result<(), EncodeError> {
        match (shape, value) {
            (Shape::Scalar(element), v) => self.emit_element(owner, member, element, v, out),
            (Shape::Fixed { element, len }, Value::Array(items)) => {
                if items.len() as u64 != *len {
                    return Err(EncodeError::FixedArrayLength {
                        type_name: owner.to_owned(),
                        member: member.to_owned(),
                        expected: *len,
                        len: items.len(),
                    });
                }
                items
                    .iter()
                    .try_for_each(|item| self.emit_element(owner, member, element, item, out))
            }
            (Shape::Variable { element, prefix, max }, Value::Sequence(items)) => {
                check_len(owner, member, items.len(), *max)?;
                out.put_uint(*prefix, items.len() as u64);
                items
                    .iter()
                    .try_for_each(|item| self.emit_element(owner, member, element, item, out))
            }
            (Shape::Fixed { .. }, v) => Err(mismatch(owner, "array", v)),
            (Shape::Variable { .. }, v) => Err(mismatch(owner, "sequence", v)),
        }
    }

    fn emit_element(
        &self,
        owner: &str,
        member: &str,
        element: &Element,
        value: &Value,
        out: &mut impl Output,
    ) -> Result<(), EncodeError> {
        match (element, value) {
            (Element::Primitive(p), v) => self.emit_primitive(owner, *p, v, out),
            (Element::String { prefix, max }, Value::String(text)) => {
                check_len(owner, member, text.len(), *max)?;
                out.put_uint(*prefix, text.len() as u64);
                out.put_bytes(text.as_bytes());
                Ok(())
            }
            (Element::String { .. }, v) => Err(mismatch(owner, "string", v)),
            (Element::Enum(id) | Element::Struct(id) | Element::Union(id), v) => self.emit_type(*id, v, out),
        }
    }

    fn emit_primitive(
        &self,
        owner: &str,
        p: Primitive,
        value: &Value,
        out: &mut impl Output,
    ) -> Result<(), EncodeError> {
        if !primitive_matches(p, value) {
            return Err(mismatch(owner, p.name(), value));
        }
        out.put_primitive(p, value);
        Ok(())
    }
}

struct Decoder<'s, 'b> {
    schema: &'s ResolvedSchema,
    r: Cursor<'b>,
    warnings: Vec<DecodeWarning>,
}

impl Decoder<'_, '_> {
    fn decode_type(&mut self, id: TypeId) -> Result<Value, DecodeError> {
        let schema = self.schema;
        let ty = schema.get(id);
        self.decode_kind(&ty.name, &ty.kind)
            .map_err(|err| err.within(&ty.name))
    }

    fn decode_kind(&mut self, name: &str, kind: &ResolvedKind) -> Result<Value, DecodeError> {
        match kind {
            ResolvedKind::Alias(p) => self.decode_primitive(*p),
            ResolvedKind::Enum(e) => {
                let at = self.r.offset();
                let raw = self.r.read_uint(e.width)?;
                if e.by_value(raw).is_none() {
                    log::debug!("unknown `{}` value {} at byte {}", name, raw, at);
                    self.warnings.push(DecodeWarning::UnknownEnumValue {
                        type_name: name.to_owned(),
                        offset: at,
                        value: raw,
                    });
                }
                Ok(Value::Enum(raw))
            }
            ResolvedKind::Struct(s) => {
                let mut fields = HashMap::with_capacity(s.fields.len());
                for field in &s.fields {
                    let value = self.decode_shape(&field.shape)?;
                    fields.insert(field.name.clone(), value);
                }
                Ok(Value::Struct(fields))
            }
            ResolvedKind::Union(u) => {
                let at = self.r.offset();
                let tag = self.r.read_uint(u.tag_width)?;
                let case = u
                    .by_tag(tag)
                    .ok_or_else(|| DecodeError::new(at, DecodeErrorKind::InvalidUnionTag(tag)))?;
                let payload = self.decode_shape(&case.shape)?;
                Ok(Value::union(case.name.clone(), payload))
            }
        }
    }

    fn decode_shape(&mut self, shape: &Shape) -> Result<Value, DecodeError> {
        match shape {
            Shape::Scalar(element) => self.decode_element(element),
            Shape::Fixed { element, len } => {
                let items = (0..*len)
                    .map(|_| self.decode_element(element))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(items))
            }
            Shape::Variable { element, prefix, max } => {
                let count = self.r.read_len(*prefix, *max)?;
                let items = (0..count)
                    .map(|_| self.decode_element(element))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Sequence(items))
            }
        }
    }

    fn decode_element(&mut self, element: &Element) -> Result<Value, DecodeError> {
        match element {
            Element::Primitive(p) => self.decode_primitive(*p),
            Element::String { prefix, max } => self.r.read_string(*prefix, *max).map(Value::String),
            Element::Enum(id) | Element::Struct(id) | Element::Union(id) => self.decode_type(*id),
        }
    }

    fn decode_primitive(&mut self, p: Primitive) -> Result<Value, DecodeError> {
        let r = &mut self.r;
        Ok(match p {
            Primitive::Bool => Value::Bool(r.read_bool()?),
            Primitive::I8 => Value::I8(r.read_i8()?),
            Primitive::I16 => Value::I16(r.read_i16_le()?),
            Primitive::I32 => Value::I32(r.read_i32_le()?),
            Primitive::I64 => Value::I64(r.read_i64_le()?),
            Primitive::U8 => Value::U8(r.read_u8()?),
            Primitive::U16 => Value::U16(r.read_u16_le()?),
            Primitive::U32 => Value::U32(r.read_u32_le()?),
            Primitive::U64 => Value::U64(r.read_u64_le()?),
            Primitive::F32 => Value::F32(r.read_f32_le()?),
            Primitive::F64 => Value::F64(r.read_f64_le()?),
        })
    }
}
