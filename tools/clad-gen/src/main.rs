// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! CLAD code generator CLI
//!
//! # Usage
//!
//! ```bash
//! # Rust bindings on stdout
//! clad-gen generate schemas/sensor.yaml
//!
//! # Into a file, with the runtime re-exported under another path
//! clad-gen generate schemas/sensor.yaml -o src/sensor.rs --runtime-path crate::wire
//!
//! # Settings from a config file, flags still win
//! clad-gen generate schemas/sensor.yaml --config clad-gen.yaml
//!
//! # Resolve only and print a summary
//! clad-gen check schemas/sensor.yaml
//!
//! # JSON layout report
//! clad-gen layout schemas/sensor.yaml
//! ```

use anyhow::Context;
use clad::layout::Bounds;
use clad::ResolvedSchema;
use clad_gen::{load_resolved, BackendKind, GeneratorConfig};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// CLAD schema compiler
#[derive(Parser, Debug)]
#[command(name = "clad-gen")]
#[command(about = "CLAD schema compiler - deterministic binary layouts and bindings")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate bindings for a schema
    Generate {
        /// Schema file (.yaml, .yml or .json)
        schema: PathBuf,

        /// Backend to run
        #[arg(short, long, value_enum)]
        backend: Option<BackendKind>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Path of the wire runtime in generated Rust code
        #[arg(long)]
        runtime_path: Option<String>,

        /// Generator configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Resolve a schema and print a summary
    Check {
        /// Schema file
        schema: PathBuf,
    },

    /// Print the JSON layout report of a schema
    Layout {
        /// Schema file
        schema: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Generated code may go to stdout, so logs go to stderr.
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Commands::Generate {
            schema,
            backend,
            output,
            runtime_path,
            config,
        } => {
            let mut settings = match config {
                Some(path) => GeneratorConfig::from_file(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => GeneratorConfig::default(),
            };
            if let Some(backend) = backend {
                settings.backend = backend;
            }
            if output.is_some() {
                settings.output = output;
            }
            if let Some(path) = runtime_path {
                settings.runtime_path = path;
            }
            cmd_generate(&schema, &settings)
        }
        Commands::Check { schema } => cmd_check(&schema),
        Commands::Layout { schema, output } => {
            let settings = GeneratorConfig {
                backend: BackendKind::Layout,
                output,
                ..GeneratorConfig::default()
            };
            cmd_generate(&schema, &settings)
        }
    }
}

fn load(path: &Path) -> anyhow::Result<ResolvedSchema> {
    load_resolved(path).with_context(|| format!("compiling {}", path.display()))
}

fn cmd_generate(schema_path: &Path, settings: &GeneratorConfig) -> anyhow::Result<()> {
    settings.validate()?;
    let schema = load(schema_path)?;
    let backend = settings.backend();
    tracing::info!(
        "running {} backend over {} types",
        backend.name(),
        schema.len()
    );
    let code = backend
        .emit(&schema)
        .with_context(|| format!("{} backend", backend.name()))?;

    match &settings.output {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("creating {}", dir.display()))?;
            }
            std::fs::write(path, &code).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("wrote {} bytes to {}", code.len(), path.display());
        }
        None => print!("{code}"),
    }
    Ok(())
}

fn cmd_check(schema_path: &Path) -> anyhow::Result<()> {
    let schema = load(schema_path)?;
    let namespace = schema.namespace().join("::");
    println!(
        "{}: {} types, fingerprint 0x{:08X}",
        if namespace.is_empty() { "<root>" } else { namespace.as_str() },
        schema.len(),
        clad_gen::codegen::schema_fingerprint(&schema)
    );
    for (_, ty) in schema.iter() {
        println!(
            "  {:<8} {:<24} {}",
            ty.kind.label(),
            ty.name,
            describe(ty.layout.bounds())
        );
    }
    Ok(())
}

fn describe(bounds: Bounds) -> String {
    match (bounds.fixed_size(), bounds.max) {
        (Some(size), _) => format!("{size} bytes"),
        (None, Some(max)) => format!("{}..={} bytes", bounds.min, max),
        (None, None) => format!("{}.. bytes (unbounded)", bounds.min),
    }
}
