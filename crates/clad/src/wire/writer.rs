// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Append-only writer over a growable sink.

use super::Width;

/// Generate little-endian write methods for primitive types.
macro_rules! impl_write_le {
    ($name:ident, $type:ty) => {
        pub fn $name(&mut self, value: $type) {
            self.sink.extend_from_slice(&value.to_le_bytes());
        }
    };
}

/// Writer used by [`Packable::write_to`](super::Packable::write_to).
///
/// Writes never fail: bounds are enforced by `validate` before the first
/// byte goes out.
#[derive(Debug)]
pub struct Writer<'a> {
    sink: &'a mut Vec<u8>,
}

impl<'a> Writer<'a> {
    pub fn new(sink: &'a mut Vec<u8>) -> Self {
        Self { sink }
    }

    impl_write_le!(write_u8, u8);
    impl_write_le!(write_i8, i8);
    impl_write_le!(write_u16_le, u16);
    impl_write_le!(write_i16_le, i16);
    impl_write_le!(write_u32_le, u32);
    impl_write_le!(write_i32_le, i32);
    impl_write_le!(write_u64_le, u64);
    impl_write_le!(write_i64_le, i64);
    impl_write_le!(write_f32_le, f32);
    impl_write_le!(write_f64_le, f64);

    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.sink.extend_from_slice(data);
    }

    /// Unsigned integer truncated to `width`. Callers check the range.
    pub fn write_uint(&mut self, width: Width, value: u64) {
        match width {
            Width::U8 => self.write_u8(value as u8),
            Width::U16 => self.write_u16_le(value as u16),
            Width::U32 => self.write_u32_le(value as u32),
        }
    }

    pub fn write_len(&mut self, prefix: Width, len: usize) {
        self.write_uint(prefix, len as u64);
    }

    pub fn write_string(&mut self, prefix: Width, value: &str) {
        self.write_len(prefix, value.len());
        self.write_bytes(value.as_bytes());
    }

    /// Bytes in the sink, including anything written before this writer.
    pub fn position(&self) -> usize {
        self.sink.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_emits_little_endian() {
        let mut buf = Vec::new();
        let mut w = Writer::new(&mut buf);
        w.write_u16_le(0xABCD);
        w.write_i32_le(-1);
        w.write_bool(true);
        w.write_f32_le(1.0);
        assert_eq!(w.position(), 11);
        assert_eq!(
            buf,
            [0xCD, 0xAB, 0xff, 0xff, 0xff, 0xff, 0x01, 0x00, 0x00, 0x80, 0x3f]
        );
    }

    #[test]
    fn test_writer_prefixes() {
        let mut buf = Vec::new();
        let mut w = Writer::new(&mut buf);
        w.write_string(Width::U16, "hi");
        w.write_uint(Width::U32, 1281);
        assert_eq!(buf, [0x02, 0x00, b'h', b'i', 0x01, 0x05, 0x00, 0x00]);
    }
}
