// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! clad-gen: backends that turn a resolved CLAD schema into code.
//!
//! ```rust
//! use clad_gen::codegen::{Backend, RustBackend};
//! use clad_gen::loader::{parse_schema, SchemaFormat};
//!
//! let schema = parse_schema(
//!     "types:\n  - kind: struct\n    name: Point\n    fields:\n      - { name: x, type: f32 }\n",
//!     SchemaFormat::Yaml,
//! )?;
//! let resolved = clad::resolve(&schema)?;
//! let code = RustBackend::new().emit(&resolved)?;
//! assert!(code.contains("pub struct Point {"));
//! assert!(code.contains("pub const SIZE: usize = 4;"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod codegen;
pub mod config;
pub mod loader;

pub use codegen::{Backend, EmitError, LayoutBackend, RustBackend};
pub use config::{BackendKind, ConfigError, GeneratorConfig};
pub use loader::{load_resolved, load_schema, LoadError};
