// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic reference backend
//!
//! Interprets a [`ResolvedSchema`](crate::ResolvedSchema) at run time, with
//! no generated code. It implements the wire rules directly and is the
//! yardstick generated backends are compared against.
//!
//! # Example
//!
//! ```rust
//! use clad::dynamic::DynamicMessage;
//! use clad::{resolve, Schema};
//! use std::sync::Arc;
//!
//! let schema: Schema = serde_yaml::from_str(
//!     r#"
//! types:
//!   - kind: union
//!     name: Reading
//!     members:
//!       - { name: celsius, type: f32 }
//!       - { name: label, type: string, max_length: 16 }
//! "#,
//! )?;
//! let schema = Arc::new(resolve(&schema)?);
//!
//! let mut reading = DynamicMessage::new(&schema, "Reading")?;
//! reading.set_member("label", "probe")?;
//! assert_eq!(reading.tag()?, Some(1));
//! assert_eq!(reading.to_bytes()?, [0x01, 0x05, b'p', b'r', b'o', b'b', b'e']);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod codec;
mod message;
mod value;

pub use codec::{pack, size_of, to_bytes, unpack, validate, DecodeWarning, Decoded};
pub use message::{AccessError, DynamicMessage};
pub use value::{UnionValue, Value};

#[cfg(test)]
mod tests;
