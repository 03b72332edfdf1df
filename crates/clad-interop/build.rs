// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
// Build script to generate Rust bindings for the interop schema

use clad_gen::codegen::{Backend, RustBackend};
use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);

    let schema = clad_gen::load_resolved(&crate_dir.join("schemas/interop.yaml"))?;
    let code = RustBackend::new().emit(&schema)?;
    std::fs::write(out_dir.join("interop.rs"), code)?;

    println!("cargo:rerun-if-changed=schemas/interop.yaml");
    Ok(())
}
