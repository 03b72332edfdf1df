// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # CLAD - schema-driven binary message layouts
//!
//! CLAD turns a declarative schema of enums, structs, messages and tagged
//! unions into a resolved type graph with a fully determined wire layout.
//! Every backend (generated Rust, the runtime-interpreted [`dynamic`] codec,
//! third-party printers) consumes the same [`ResolvedSchema`], so a value
//! packed by one backend unpacks byte-for-byte in any other.
//!
//! ## Quick Start
//!
//! ```rust
//! use clad::dynamic::{self, Value};
//! use clad::{resolve, Schema};
//!
//! let schema: Schema = serde_yaml::from_str(
//!     r#"
//! namespace: [Demo]
//! types:
//!   - kind: struct
//!     name: Point
//!     fields:
//!       - { name: x, type: i16 }
//!       - { name: y, type: i16 }
//! "#,
//! )?;
//! let resolved = resolve(&schema)?;
//! let point = resolved.lookup("Point").expect("declared above");
//!
//! let value = Value::structure([("x", Value::I16(-2)), ("y", Value::I16(7))]);
//! let mut bytes = Vec::new();
//! dynamic::pack(&resolved, point, &value, &mut bytes)?;
//! assert_eq!(bytes, [0xfe, 0xff, 0x07, 0x00]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Wire format
//!
//! | Kind | Encoding |
//! |------|----------|
//! | primitive | little-endian, natural width, no padding |
//! | bool | one byte, `0` or `1` |
//! | enum | unsigned storage width (u8, u16 or u32) |
//! | fixed array | `N` elements, no prefix |
//! | variable array / string | length prefix, then elements (bytes for strings) |
//! | struct | fields in declaration order |
//! | union | tag (u8, u16 or u32), then the active member's payload |

pub mod dynamic;
pub mod error;
pub mod layout;
mod resolver;
pub mod schema;
pub mod wire;

pub use error::{DecodeError, DecodeErrorKind, EncodeError, ResolutionError};
pub use layout::Layout;
pub use resolver::resolve;
pub use schema::{Primitive, ResolvedSchema, Schema, TypeId};
pub use wire::{Cursor, Packable, Width, Writer};
