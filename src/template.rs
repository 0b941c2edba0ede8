// src/template.rs

//! Pure command-template substitution.
//!
//! A template is a plain string containing `{placeholder}` references. Two
//! placeholder names are reserved and resolved per iteration:
//!
//! - `{branchIndex}`: the current branch index of the worker loop
//! - `{targetPath}`: the target path the worker is driving
//!
//! Every other placeholder must be bound by the `[params]` table of the
//! config; this is checked once at validation time, never per iteration.
//!
//! Substitution is a single pass: values substituted into the template are
//! not re-scanned, so a parameter value containing braces stays literal.
//! Brace text that is not a `{identifier}` form (e.g. `{ 1 }`, `{}`) is left
//! untouched.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Reserved placeholder resolved to the worker's current branch index.
pub const BRANCH_INDEX_VAR: &str = "branchIndex";

/// Reserved placeholder resolved to the worker's target path.
pub const TARGET_PATH_VAR: &str = "targetPath";

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{([A-Za-z][A-Za-z0-9_]*)\}").expect("placeholder regex is valid")
    })
}

/// List every placeholder referenced by `template`, in order of appearance.
///
/// Duplicates are kept; callers that want the distinct set can collect into
/// a `BTreeSet`.
pub fn placeholders(template: &str) -> Vec<String> {
    placeholder_re()
        .captures_iter(template)
        .map(|c| c[1].to_string())
        .collect()
}

/// Render `template` into a concrete command line.
///
/// Deterministic and side-effect free: identical inputs always produce the
/// identical output string. A placeholder that is neither reserved nor bound
/// in `params` is left as-is; validation rejects such templates before any
/// worker runs, so this is unreachable in a validated config.
pub fn render(
    template: &str,
    target_path: &str,
    branch_index: i64,
    params: &BTreeMap<String, String>,
) -> String {
    let index_str = branch_index.to_string();

    placeholder_re()
        .replace_all(template, |caps: &Captures<'_>| {
            let name = &caps[1];
            match name {
                BRANCH_INDEX_VAR => index_str.clone(),
                TARGET_PATH_VAR => target_path.to_string(),
                _ => params
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string()),
            }
        })
        .into_owned()
}
