// src/config/loader.rs

use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::config::model::{BatchConfig, RawBatchFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawBatchFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (range, placeholder bindings, etc.). Use [`load_and_validate`]
/// for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawBatchFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading config file at {:?}", path))?;

    let raw: RawBatchFile = toml::from_str(&contents)
        .with_context(|| format!("parsing TOML config from {:?}", path))?;

    Ok(raw)
}

/// Load a configuration file from path and run validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks targets, range and placeholder bindings via
///   `BatchConfig::try_from`, so the returned value upholds every config
///   invariant by construction.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<BatchConfig> {
    let raw = load_from_path(&path)?;
    BatchConfig::try_from(raw)
}

