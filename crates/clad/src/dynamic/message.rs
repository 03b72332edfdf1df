// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed handle over a dynamic value.

use super::codec::{self, DecodeWarning};
use super::value::Value;
use crate::error::{DecodeError, EncodeError};
use crate::schema::{ResolvedKind, ResolvedSchema, Shape, TypeId, UnionType};
use std::sync::Arc;
use thiserror::Error;

/// Errors for DynamicMessage operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("type `{0}` is not declared")]
    UnknownType(String),

    #[error("`{type_name}` has no field `{field}`")]
    FieldNotFound { type_name: String, field: String },

    #[error("union `{type_name}` has no member `{member}`")]
    MemberNotFound { type_name: String, member: String },

    #[error("`{type_name}` is a {kind}, expected a {expected}")]
    WrongKind {
        type_name: String,
        kind: &'static str,
        expected: &'static str,
    },

    #[error(transparent)]
    Invalid(#[from] EncodeError),
}

/// Dynamic message container with runtime type checking.
#[derive(Debug, Clone)]
pub struct DynamicMessage {
    schema: Arc<ResolvedSchema>,
    id: TypeId,
    value: Value,
    warnings: Vec<DecodeWarning>,
}

impl DynamicMessage {
    /// Zero-state message of the named type.
    pub fn new(schema: &Arc<ResolvedSchema>, type_name: &str) -> Result<Self, AccessError> {
        let id = lookup(schema, type_name)?;
        Ok(Self {
            schema: schema.clone(),
            id,
            value: Value::default_for(schema, id),
            warnings: Vec::new(),
        })
    }

    /// Wrap an existing value after validating it against the type.
    pub fn from_value(
        schema: &Arc<ResolvedSchema>,
        type_name: &str,
        value: Value,
    ) -> Result<Self, AccessError> {
        let id = lookup(schema, type_name)?;
        codec::validate(schema, id, &value)?;
        Ok(Self {
            schema: schema.clone(),
            id,
            value,
            warnings: Vec::new(),
        })
    }

    /// Union message with `member` already active.
    pub fn with_member(
        schema: &Arc<ResolvedSchema>,
        type_name: &str,
        member: &str,
        payload: impl Into<Value>,
    ) -> Result<Self, AccessError> {
        let mut message = Self::new(schema, type_name)?;
        message.set_member(member, payload)?;
        Ok(message)
    }

    /// Decode a message of type `id` from the front of `src`.
    /// Returns the message and the number of bytes consumed.
    pub fn unpack(
        schema: &Arc<ResolvedSchema>,
        id: TypeId,
        src: &[u8],
    ) -> Result<(Self, usize), DecodeError> {
        let decoded = codec::unpack(schema, id, src)?;
        let message = Self {
            schema: schema.clone(),
            id,
            value: decoded.value,
            warnings: decoded.warnings,
        };
        Ok((message, decoded.consumed))
    }

    pub fn schema(&self) -> &Arc<ResolvedSchema> {
        &self.schema
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn type_name(&self) -> &str {
        self.schema.name(self.id)
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Warnings collected when this message was unpacked.
    pub fn warnings(&self) -> &[DecodeWarning] {
        &self.warnings
    }

    /// Get a struct field by name.
    pub fn get(&self, field: &str) -> Result<&Value, AccessError> {
        self.struct_field(field)?;
        self.value.get_field(field).ok_or_else(|| AccessError::FieldNotFound {
            type_name: self.type_name().to_owned(),
            field: field.to_owned(),
        })
    }

    /// Set a struct field. The value is checked against the field type
    /// first; on error the message is unchanged.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<(), AccessError> {
        let value = value.into();
        let shape = self.struct_field(field)?;
        codec::shape_size(&self.schema, self.type_name(), field, &shape, &value)?;
        match &mut self.value {
            Value::Struct(fields) => {
                fields.insert(field.to_owned(), value);
                Ok(())
            }
            other => Err(AccessError::Invalid(EncodeError::TypeMismatch {
                type_name: self.schema.name(self.id).to_owned(),
                expected: "struct".to_owned(),
                found: other.kind_name().to_owned(),
            })),
        }
    }

    /// Tag of the active union member, `None` while unset.
    pub fn tag(&self) -> Result<Option<u64>, AccessError> {
        let union = self.union_type()?;
        Ok(self
            .value
            .as_union()
            .and_then(|(member, _)| union.by_name(member))
            .map(|case| case.tag))
    }

    pub fn active_member(&self) -> Option<&str> {
        self.value.as_union().map(|(member, _)| member)
    }

    /// Make `member` the active union member. Tag and payload change
    /// together; on error the message is unchanged.
    pub fn set_member(&mut self, member: &str, payload: impl Into<Value>) -> Result<(), AccessError> {
        let payload = payload.into();
        let case = self
            .union_type()?
            .by_name(member)
            .ok_or_else(|| AccessError::MemberNotFound {
                type_name: self.type_name().to_owned(),
                member: member.to_owned(),
            })?;
        codec::shape_size(&self.schema, self.type_name(), member, &case.shape, &payload)?;
        self.value = Value::union(member, payload);
        Ok(())
    }

    pub fn size(&self) -> Result<usize, EncodeError> {
        codec::size_of(&self.schema, self.id, &self.value)
    }

    pub fn pack(&self, sink: &mut Vec<u8>) -> Result<usize, EncodeError> {
        codec::pack(&self.schema, self.id, &self.value, sink)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        codec::to_bytes(&self.schema, self.id, &self.value)
    }

    fn struct_field(&self, field: &str) -> Result<Shape, AccessError> {
        match &self.schema.get(self.id).kind {
            ResolvedKind::Struct(s) => s
                .field(field)
                .map(|f| f.shape)
                .ok_or_else(|| AccessError::FieldNotFound {
                    type_name: self.type_name().to_owned(),
                    field: field.to_owned(),
                }),
            kind => Err(self.wrong_kind(kind, "struct")),
        }
    }

    fn union_type(&self) -> Result<&UnionType, AccessError> {
        match &self.schema.get(self.id).kind {
            ResolvedKind::Union(u) => Ok(u),
            kind => Err(self.wrong_kind(kind, "union")),
        }
    }

    fn wrong_kind(&self, kind: &ResolvedKind, expected: &'static str) -> AccessError {
        AccessError::WrongKind {
            type_name: self.type_name().to_owned(),
            kind: kind.label(),
            expected,
        }
    }
}

impl PartialEq for DynamicMessage {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.value == other.value
    }
}

fn lookup(schema: &ResolvedSchema, type_name: &str) -> Result<TypeId, AccessError> {
    schema
        .lookup(type_name)
        .ok_or_else(|| AccessError::UnknownType(type_name.to_owned()))
}
