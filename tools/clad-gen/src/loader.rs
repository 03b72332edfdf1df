// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema documents on disk.
//!
//! `.json` files are read as JSON, everything else as YAML. Both carry the
//! same AST.

use clad::{resolve, ResolutionError, ResolvedSchema, Schema};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid YAML schema: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON schema: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    Yaml,
    Json,
}

impl SchemaFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SchemaFormat::Json,
            _ => SchemaFormat::Yaml,
        }
    }
}

pub fn parse_schema(text: &str, format: SchemaFormat) -> Result<Schema, LoadError> {
    Ok(match format {
        SchemaFormat::Yaml => serde_yaml::from_str(text)?,
        SchemaFormat::Json => serde_json::from_str(text)?,
    })
}

pub fn load_schema(path: &Path) -> Result<Schema, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let schema = parse_schema(&text, SchemaFormat::for_path(path))?;
    tracing::debug!(
        "loaded {} types from {}",
        schema.types.len(),
        path.display()
    );
    Ok(schema)
}

/// Load and resolve in one step.
pub fn load_resolved(path: &Path) -> Result<ResolvedSchema, LoadError> {
    Ok(resolve(&load_schema(path)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_by_extension() {
        assert_eq!(SchemaFormat::for_path(Path::new("a/b.json")), SchemaFormat::Json);
        assert_eq!(SchemaFormat::for_path(Path::new("a/b.JSON")), SchemaFormat::Json);
        assert_eq!(SchemaFormat::for_path(Path::new("a/b.yaml")), SchemaFormat::Yaml);
        assert_eq!(SchemaFormat::for_path(Path::new("schema")), SchemaFormat::Yaml);
    }

    #[test]
    fn test_json_and_yaml_agree() {
        let yaml = "namespace: [geo]\ntypes:\n  - kind: alias\n    name: Meters\n    type: f32\n";
        let json = r#"{"namespace":["geo"],"types":[{"kind":"alias","name":"Meters","type":"f32"}]}"#;
        let a = parse_schema(yaml, SchemaFormat::Yaml).expect("yaml");
        let b = parse_schema(json, SchemaFormat::Json).expect("json");
        assert_eq!(a, b);
    }
}
