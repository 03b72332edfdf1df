// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for schema resolution and the wire codecs.

use thiserror::Error;

/// Schema-level failure. Resolution aborts on the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("`{referrer}` refers to unknown type `{name}`")]
    UnknownType { referrer: String, name: String },

    #[error("type `{type_name}` contains itself by value: {path}")]
    CyclicType { type_name: String, path: String },

    #[error("enum `{type_name}`: `{member}` reuses value {value} already taken by `{previous}`")]
    DuplicateEnumValue {
        type_name: String,
        member: String,
        previous: String,
        value: u64,
    },

    #[error("`{type_name}.{member}`: maximum length {max} does not fit a {prefix} length prefix")]
    LengthPrefixOverflow {
        type_name: String,
        member: String,
        max: u64,
        prefix: &'static str,
    },

    #[error("type `{0}` is declared more than once")]
    DuplicateTypeName(String),

    #[error("`{type_name}` declares member `{member}` more than once")]
    DuplicateMemberName { type_name: String, member: String },

    #[error("enum `{type_name}`: value {value} of `{member}` does not fit {storage}")]
    EnumValueOutOfRange {
        type_name: String,
        member: String,
        value: u64,
        storage: &'static str,
    },

    #[error("union `{type_name}`: `{member}` reuses tag {tag} already taken by `{previous}`")]
    DuplicateUnionTag {
        type_name: String,
        member: String,
        previous: String,
        tag: u64,
    },

    #[error("union `{type_name}`: `{member}` has the same payload type as `{previous}`")]
    DuplicateUnionPayload {
        type_name: String,
        member: String,
        previous: String,
    },

    #[error("union `{0}` has no members")]
    EmptyUnion(String),

    #[error("`{type_name}.{member}`: invalid default: {reason}")]
    InvalidDefault {
        type_name: String,
        member: String,
        reason: String,
    },

    #[error("`{referrer}` uses `{name}`, which is not a valid type here")]
    NotAType { referrer: String, name: String },
}

/// Failure while packing a value. Nothing is written when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("`{type_name}.{member}` holds {len} elements, at most {max} allowed")]
    ArrayTooLong {
        type_name: String,
        member: String,
        len: usize,
        max: u64,
    },

    #[error("union `{type_name}` has no active member")]
    UnionUnset { type_name: String },

    #[error("`{type_name}`: expected {expected}, found {found}")]
    TypeMismatch {
        type_name: String,
        expected: String,
        found: String,
    },

    #[error("struct `{type_name}` is missing field `{field}`")]
    MissingField { type_name: String, field: String },

    #[error("`{type_name}.{member}` is a fixed array of {expected} elements, found {len}")]
    FixedArrayLength {
        type_name: String,
        member: String,
        expected: u64,
        len: usize,
    },

    #[error("union `{type_name}` has no member `{member}`")]
    UnknownMember { type_name: String, member: String },
}

/// What went wrong while unpacking.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeErrorKind {
    #[error("buffer underrun: needed {needed} bytes, {available} available")]
    BufferUnderrun { needed: usize, available: usize },

    #[error("invalid bool encoding 0x{0:02x}")]
    InvalidBoolEncoding(u8),

    #[error("invalid union tag {0}")]
    InvalidUnionTag(u64),

    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    #[error("length {length} exceeds the declared maximum {max}")]
    LengthOutOfBounds { length: u64, max: u64 },
}

/// Failure while unpacking. `type_name` is the innermost type being
/// decoded, `offset` the byte position of the offending read relative to
/// the start of the unpack call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to decode `{type_name}` at byte {offset}: {kind}")]
pub struct DecodeError {
    pub type_name: String,
    pub offset: usize,
    pub kind: DecodeErrorKind,
}

impl DecodeError {
    /// Error with no type attached yet; see [`DecodeError::within`].
    pub fn new(offset: usize, kind: DecodeErrorKind) -> Self {
        Self {
            type_name: String::new(),
            offset,
            kind,
        }
    }

    /// Attach the enclosing type name unless a nested type already did.
    pub fn within(mut self, type_name: &str) -> Self {
        if self.type_name.is_empty() {
            self.type_name = type_name.to_owned();
        }
        self
    }

    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_keeps_innermost_name() {
        let err = DecodeError::new(3, DecodeErrorKind::InvalidUnionTag(9))
            .within("Inner")
            .within("Outer");
        assert_eq!(err.type_name, "Inner");
        assert_eq!(err.offset, 3);
        assert_eq!(
            err.to_string(),
            "failed to decode `Inner` at byte 3: invalid union tag 9"
        );
    }

    #[test]
    fn test_error_display_variants() {
        let err = ResolutionError::LengthPrefixOverflow {
            type_name: "Frame".into(),
            member: "payload".into(),
            max: 300,
            prefix: "u8",
        };
        assert_eq!(
            err.to_string(),
            "`Frame.payload`: maximum length 300 does not fit a u8 length prefix"
        );

        let err = EncodeError::ArrayTooLong {
            type_name: "Frame".into(),
            member: "samples".into(),
            len: 11,
            max: 10,
        };
        assert_eq!(
            err.to_string(),
            "`Frame.samples` holds 11 elements, at most 10 allowed"
        );

        let kind = DecodeErrorKind::InvalidBoolEncoding(0x02);
        assert_eq!(kind.to_string(), "invalid bool encoding 0x02");
    }
}
