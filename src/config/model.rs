// src/config/model.rs

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::errors::{DriveError, Result};
use crate::config::validate::validate_raw;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [batch]
/// targets = ["/projects/commons-io", "/projects/gson"]
/// start = 101
/// end = 1000
/// template = "mvn sonar:sonar -B -q -Dsonar.branch=b{branchIndex} {dbParams} -f {targetPath}/pom.xml"
///
/// [params]
/// dbParams = "-Dsonar.jdbc.url=jdbc:mysql://localhost:13306/sonar -Dsonar.jdbc.username=sonar"
/// ```
///
/// This is the raw, unvalidated shape; use [`BatchConfig::try_from`] (or
/// `config::load_and_validate`) to obtain a validated config.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBatchFile {
    /// The `[batch]` section: targets, range and command template.
    pub batch: BatchSection,

    /// The `[params]` table of shared parameters.
    ///
    /// Values are opaque strings (connection URLs, credentials, static
    /// flags); nothing here is ever parsed or validated beyond substitution.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

/// `[batch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchSection {
    /// Ordered list of target paths, one worker each.
    ///
    /// The number of targets should not be greater than the number of CPUs;
    /// the orchestrator spawns one worker per entry with no internal cap.
    pub targets: Vec<String>,

    /// First branch index (inclusive).
    pub start: i64,

    /// Last branch index (inclusive).
    pub end: i64,

    /// Command template with `{placeholder}` substitution.
    pub template: String,

    /// Optional per-invocation timeout in seconds.
    ///
    /// If unset, a hung external command is waited on forever.
    #[serde(default)]
    pub invocation_timeout_secs: Option<u64>,
}

/// A filesystem location identifying one unit of work.
///
/// Opaque: existence on disk is a runtime precondition checked by the
/// runner when the worker starts, not a static invariant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetPath(String);

impl TargetPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetPath {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Inclusive branch-index range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchRange {
    pub start: i64,
    pub end: i64,
}

impl BranchRange {
    /// Number of iterations in the range. Valid ranges have `start <= end`.
    ///
    /// Computed in i128: the full `i64::MIN..=i64::MAX` width does not fit
    /// in u64, and `end - start + 1` itself can overflow i64.
    pub fn count(&self) -> u128 {
        (self.end as i128 - self.start as i128 + 1) as u128
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> {
        self.start..=self.end
    }
}

/// Validated, immutable batch configuration.
///
/// Invariants (enforced by `TryFrom<RawBatchFile>`, which is the only way to
/// construct one):
/// - `targets` is non-empty and free of duplicates
/// - `range.start <= range.end`
/// - every placeholder in `template` is reserved or bound in `params`
///
/// Read-only after construction; shared by reference across all workers, so
/// no locking is ever needed.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub targets: Vec<TargetPath>,
    pub range: BranchRange,
    pub template: String,
    pub params: BTreeMap<String, String>,
    pub invocation_timeout: Option<Duration>,
}

impl TryFrom<RawBatchFile> for BatchConfig {
    type Error = DriveError;

    fn try_from(raw: RawBatchFile) -> Result<Self> {
        validate_raw(&raw)?;

        let RawBatchFile { batch, params } = raw;
        Ok(Self {
            targets: batch.targets.into_iter().map(TargetPath::new).collect(),
            range: BranchRange {
                start: batch.start,
                end: batch.end,
            },
            template: batch.template,
            params,
            invocation_timeout: batch.invocation_timeout_secs.map(Duration::from_secs),
        })
    }
}

impl BatchConfig {
    /// Restrict the run to a subset of configured targets (the `--target`
    /// flag). Every requested path must match a configured target.
    pub fn retain_targets(mut self, requested: &[String]) -> Result<Self> {
        if requested.is_empty() {
            return Ok(self);
        }

        for path in requested {
            if !self.targets.iter().any(|t| t.as_str() == path) {
                return Err(DriveError::Config(format!(
                    "--target '{}' does not match any target in [batch].targets",
                    path
                )));
            }
        }

        self.targets.retain(|t| requested.iter().any(|p| p == t.as_str()));
        Ok(self)
    }
}
