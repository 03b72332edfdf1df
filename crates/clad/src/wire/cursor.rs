// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounds-checked read cursor over a packed buffer.

use super::Width;
use crate::error::{DecodeError, DecodeErrorKind};

/// Generate little-endian read methods for primitive types.
///
/// Each generated method checks the remaining length, copies `$size` bytes
/// and advances the offset. Floats go through `from_le_bytes`, which keeps
/// NaN payloads and signed zeros bit-for-bit.
macro_rules! impl_read_le {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> Result<$type, DecodeError> {
            let bytes = self.take::<$size>()?;
            Ok(<$type>::from_le_bytes(bytes))
        }
    };
}

/// Immutable cursor for reading (bounds-checked, zero-copy)
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    impl_read_le!(read_u8, u8, 1);
    impl_read_le!(read_i8, i8, 1);
    impl_read_le!(read_u16_le, u16, 2);
    impl_read_le!(read_i16_le, i16, 2);
    impl_read_le!(read_u32_le, u32, 4);
    impl_read_le!(read_i32_le, i32, 4);
    impl_read_le!(read_u64_le, u64, 8);
    impl_read_le!(read_i64_le, i64, 8);
    impl_read_le!(read_f32_le, f32, 4);
    impl_read_le!(read_f64_le, f64, 8);

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if len > self.remaining() {
            return Err(self.underrun(len));
        }
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    /// Strict bool: only `0` and `1` are accepted.
    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        let at = self.offset;
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DecodeError::new(
                at,
                DecodeErrorKind::InvalidBoolEncoding(other),
            )),
        }
    }

    /// Unsigned integer of the given width, widened to `u64`.
    pub fn read_uint(&mut self, width: Width) -> Result<u64, DecodeError> {
        Ok(match width {
            Width::U8 => u64::from(self.read_u8()?),
            Width::U16 => u64::from(self.read_u16_le()?),
            Width::U32 => u64::from(self.read_u32_le()?),
        })
    }

    /// Length prefix, rejected when it exceeds the declared maximum.
    pub fn read_len(&mut self, prefix: Width, max: u64) -> Result<usize, DecodeError> {
        let at = self.offset;
        let length = self.read_uint(prefix)?;
        if length > max {
            return Err(DecodeError::new(
                at,
                DecodeErrorKind::LengthOutOfBounds { length, max },
            ));
        }
        usize::try_from(length)
            .map_err(|_| DecodeError::new(at, DecodeErrorKind::LengthOutOfBounds { length, max }))
    }

    pub fn read_string(&mut self, prefix: Width, max: u64) -> Result<String, DecodeError> {
        let len = self.read_len(prefix, max)?;
        let at = self.offset;
        let bytes = self.read_bytes(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| DecodeError::new(at, DecodeErrorKind::InvalidUtf8))
    }

    /// Length-prefixed sequence of elements decoded by `read`.
    pub fn read_vec<T, F>(&mut self, prefix: Width, max: u64, mut read: F) -> Result<Vec<T>, DecodeError>
    where
        F: FnMut(&mut Self) -> Result<T, DecodeError>,
    {
        let len = self.read_len(prefix, max)?;
        // Every element occupies at least one byte on the wire, except
        // zero-sized ones, so the remaining length caps the allocation.
        let mut items = Vec::with_capacity(len.min(self.remaining()));
        for _ in 0..len {
            items.push(read(self)?);
        }
        Ok(items)
    }

    /// Exactly `N` elements, no prefix.
    pub fn read_array<T, F, const N: usize>(&mut self, mut read: F) -> Result<[T; N], DecodeError>
    where
        F: FnMut(&mut Self) -> Result<T, DecodeError>,
    {
        let mut items = Vec::with_capacity(N);
        for _ in 0..N {
            items.push(read(self)?);
        }
        match items.try_into() {
            Ok(array) => Ok(array),
            Err(_) => unreachable!("exactly {} elements were collected", N),
        }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let slice = self.read_bytes(N)?;
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(slice);
        Ok(bytes)
    }

    fn underrun(&self, needed: usize) -> DecodeError {
        DecodeError::new(
            self.offset,
            DecodeErrorKind::BufferUnderrun {
                needed,
                available: self.remaining(),
            },
        )
    }
}
