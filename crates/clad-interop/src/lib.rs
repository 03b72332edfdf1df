// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bindings generated by `clad-gen` from `schemas/interop.yaml` at build
//! time, kept next to the schema source so tests can run the dynamic
//! backend over the same declarations.

#[allow(clippy::all, clippy::pedantic)]
mod generated {
    include!(concat!(env!("OUT_DIR"), "/interop.rs"));
}

pub use generated::*;

/// The schema the bindings were generated from.
pub const SCHEMA_SOURCE: &str = include_str!("../schemas/interop.yaml");
