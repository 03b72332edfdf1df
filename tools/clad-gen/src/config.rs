// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generator configuration.
//!
//! Loaded from an optional YAML file; command-line flags override it.

use crate::codegen::{Backend, LayoutBackend, RustBackend};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Backend selected for `generate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Rust,
    Layout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub backend: BackendKind,

    /// Output file; stdout when unset.
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Crate path generated Rust code uses for the wire runtime.
    #[serde(default = "default_runtime_path")]
    pub runtime_path: String,
}

fn default_runtime_path() -> String {
    "::clad".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            output: None,
            runtime_path: default_runtime_path(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.runtime_path.trim().is_empty() {
            return Err(ConfigError::Invalid("runtime_path must not be empty".into()));
        }
        if matches!(&self.output, Some(path) if path.as_os_str().is_empty()) {
            return Err(ConfigError::Invalid("output must not be empty".into()));
        }
        Ok(())
    }

    /// Instantiate the configured backend.
    pub fn backend(&self) -> Box<dyn Backend> {
        match self.backend {
            BackendKind::Rust => {
                Box::new(RustBackend::new().with_runtime_path(self.runtime_path.clone()))
            }
            BackendKind::Layout => Box::new(LayoutBackend::new()),
        }
    }
}
