// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Emitter Contract and the backends implementing it.
//!
//! A backend receives a fully resolved schema, including the cached layout
//! of every type, and renders it into one output file.

pub mod layout_backend;
pub mod naming;
pub mod rust_backend;
pub mod type_hash;

pub use layout_backend::LayoutBackend;
pub use rust_backend::RustBackend;
pub use type_hash::{fnv1a, schema_fingerprint};

use clad::ResolvedSchema;
use thiserror::Error;

/// A code emitter for one target.
pub trait Backend {
    /// Short name used on the command line and in logs.
    fn name(&self) -> &'static str;

    /// Extension of the produced file, without the dot.
    fn file_extension(&self) -> &'static str;

    fn emit(&self, schema: &ResolvedSchema) -> Result<String, EmitError>;
}

/// Errors raised while rendering a resolved schema.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("`{name}` in `{type_name}` is not a valid identifier")]
    InvalidIdentifier { type_name: String, name: String },

    #[error("`{name}` in `{type_name}` is reserved in the target language")]
    ReservedName { type_name: String, name: String },

    #[error("`{first}` and `{second}` in `{type_name}` both map to `{ident}`")]
    NameCollision {
        type_name: String,
        first: String,
        second: String,
        ident: String,
    },

    #[error("invalid runtime path `{0}`")]
    RuntimePath(String),

    #[error("naming pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("layout report: {0}")]
    Json(#[from] serde_json::Error),
}
