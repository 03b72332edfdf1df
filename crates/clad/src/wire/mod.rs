// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire runtime shared by generated bindings and the dynamic backend.
//!
//! Generated types implement [`Packable`] on top of [`Writer`] and
//! [`Cursor`]; the dynamic codec drives the same two primitives, which is
//! what keeps both backends byte-identical.

mod cursor;
mod writer;

pub use crate::error::{DecodeError, DecodeErrorKind, EncodeError};
pub use cursor::Cursor;
pub use writer::Writer;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unsigned integer width used for enum storage, union tags and length
/// prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Width {
    U8,
    U16,
    U32,
}

impl Width {
    pub const fn bytes(self) -> usize {
        match self {
            Width::U8 => 1,
            Width::U16 => 2,
            Width::U32 => 4,
        }
    }

    /// Largest value representable in this width.
    pub const fn max_value(self) -> u64 {
        match self {
            Width::U8 => u8::MAX as u64,
            Width::U16 => u16::MAX as u64,
            Width::U32 => u32::MAX as u64,
        }
    }

    /// Narrowest width holding `value`, starting at 8 bits.
    pub const fn smallest_for(value: u64) -> Option<Width> {
        if value <= Width::U8.max_value() {
            Some(Width::U8)
        } else if value <= Width::U16.max_value() {
            Some(Width::U16)
        } else if value <= Width::U32.max_value() {
            Some(Width::U32)
        } else {
            None
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Width::U8 => "u8",
            Width::U16 => "u16",
            Width::U32 => "u32",
        }
    }
}

/// Width of a variable array or string length prefix.
pub type LengthPrefix = Width;

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A type with a CLAD wire encoding.
///
/// Implementors provide the body codec; framing helpers such as
/// [`Packable::pack`] and [`Packable::unpack`] are derived from it.
pub trait Packable: Sized {
    /// Schema name used in error reports.
    const TYPE_NAME: &'static str;

    /// Encoded size when every value of the type has the same size.
    const FIXED_SIZE: Option<usize> = None;

    /// Exact number of bytes [`Packable::write_to`] emits.
    fn size(&self) -> usize;

    /// Check every length bound and union tag before anything is written.
    fn validate(&self) -> Result<(), EncodeError> {
        Ok(())
    }

    /// Append the encoding. Only called on validated values.
    fn write_to(&self, w: &mut Writer<'_>);

    /// Decode the body. Errors may leave `type_name` empty.
    fn read_body(r: &mut Cursor<'_>) -> Result<Self, DecodeError>;

    /// Decode, attributing errors without a type to `TYPE_NAME`.
    fn read_from(r: &mut Cursor<'_>) -> Result<Self, DecodeError> {
        Self::read_body(r).map_err(|err| err.within(Self::TYPE_NAME))
    }

    /// Validate, then append the encoding to `sink`. Returns the number of
    /// bytes written; `sink` is untouched on error.
    fn pack(&self, sink: &mut Vec<u8>) -> Result<usize, EncodeError> {
        self.validate()?;
        let size = self.size();
        let start = sink.len();
        sink.reserve(size);
        self.write_to(&mut Writer::new(sink));
        debug_assert_eq!(sink.len() - start, size);
        Ok(sink.len() - start)
    }

    fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let mut buf = Vec::with_capacity(self.size());
        self.pack(&mut buf)?;
        Ok(buf)
    }

    /// Decode one value from the front of `src`, returning it with the
    /// number of bytes consumed.
    fn unpack(src: &[u8]) -> Result<(Self, usize), DecodeError> {
        let mut r = Cursor::new(src);
        let value = Self::read_from(&mut r)?;
        Ok((value, r.offset()))
    }
}

/// Bound check on a variable-length member before encoding.
pub fn check_len(type_name: &str, member: &str, len: usize, max: u64) -> Result<(), EncodeError> {
    if len as u64 > max {
        return Err(EncodeError::ArrayTooLong {
            type_name: type_name.to_owned(),
            member: member.to_owned(),
            len,
            max,
        });
    }
    Ok(())
}
