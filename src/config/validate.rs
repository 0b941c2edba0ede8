// src/config/validate.rs

use std::collections::BTreeSet;

use crate::config::model::RawBatchFile;
use crate::errors::{DriveError, Result};
use crate::template;

/// Run semantic validation against a raw configuration.
///
/// This checks:
/// - there is at least one target, and no duplicates
/// - `start <= end`
/// - every template placeholder is reserved (`branchIndex`, `targetPath`)
///   or bound in `[params]`
///
/// It does **not** check that target paths exist on disk; that is a runtime
/// precondition verified by the worker's runner, so that a config can be
/// validated on a machine other than the one it runs on.
pub fn validate_raw(raw: &RawBatchFile) -> Result<()> {
    ensure_has_targets(raw)?;
    ensure_unique_targets(raw)?;
    validate_range(raw)?;
    validate_template_bindings(raw)?;
    Ok(())
}

fn ensure_has_targets(raw: &RawBatchFile) -> Result<()> {
    if raw.batch.targets.is_empty() {
        return Err(DriveError::Config(
            "[batch].targets must contain at least one target path".to_string(),
        ));
    }
    Ok(())
}

fn ensure_unique_targets(raw: &RawBatchFile) -> Result<()> {
    let mut seen = BTreeSet::new();
    for target in raw.batch.targets.iter() {
        if !seen.insert(target.as_str()) {
            return Err(DriveError::Config(format!(
                "duplicate target '{}' in [batch].targets",
                target
            )));
        }
    }
    Ok(())
}

fn validate_range(raw: &RawBatchFile) -> Result<()> {
    if raw.batch.start > raw.batch.end {
        return Err(DriveError::Config(format!(
            "[batch].start must be <= [batch].end (got {}..{})",
            raw.batch.start, raw.batch.end
        )));
    }
    Ok(())
}

fn validate_template_bindings(raw: &RawBatchFile) -> Result<()> {
    for name in template::placeholders(&raw.batch.template) {
        let reserved =
            name == template::BRANCH_INDEX_VAR || name == template::TARGET_PATH_VAR;
        if !reserved && !raw.params.contains_key(&name) {
            return Err(DriveError::Config(format!(
                "template references unbound placeholder '{{{}}}': \
                 not a reserved variable and not found in [params]",
                name
            )));
        }
    }
    Ok(())
}
