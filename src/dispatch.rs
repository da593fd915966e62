//! Dispatch locator: find a working automation endpoint for Illustrator.
//!
//! Windows registers one COM ProgID per installed Illustrator version
//! ("Illustrator.Application.28") next to a version-independent default
//! ("Illustrator.Application"). Which of these actually binds varies by
//! install history, so connection is a retry loop: pick a candidate, try
//! it, and on failure pick again with the failed name excluded.
//!
//! Candidate selection itself is platform-neutral and lives here; only the
//! registry enumeration is Windows-specific. Priority order:
//!
//! 1. `ILLUSTRATOR_BRIDGE_DISPATCH` environment variable — returned as-is,
//!    even if excluded, so a user override is never second-guessed
//! 2. the default ProgID, when registered and not excluded
//! 3. the versioned ProgID with the numerically highest version suffix

use std::collections::HashSet;
use std::env;

/// Environment variable forcing a specific dispatch identifier.
pub const DISPATCH_ENV_VAR: &str = "ILLUSTRATOR_BRIDGE_DISPATCH";

/// Version-independent ProgID probed before any enumeration.
pub const DEFAULT_PROG_ID: &str = "Illustrator.Application";

/// Prefix of versioned ProgIDs.
pub const VERSIONED_PREFIX: &str = "Illustrator.Application.";

/// Dispatch identifier forced through the environment, if any.
pub fn env_override() -> Option<String> {
    env::var(DISPATCH_ENV_VAR).ok().filter(|v| !v.is_empty())
}

/// Numeric version fragment of a versioned ProgID.
///
/// Parsed as a float so "28.1" style suffixes order correctly; "10" must
/// outrank "9", which string comparison would get wrong.
pub fn version_suffix(name: &str) -> Option<f64> {
    name.strip_prefix(VERSIONED_PREFIX)?.parse().ok()
}

/// Pick the best candidate from an enumerated list of class names.
///
/// The default ProgID wins when present; otherwise the versioned name with
/// the highest numeric suffix. Names in `excludes` are skipped. Versioned
/// names whose suffix does not parse are only used when nothing parseable
/// remains. Returns `None` when no candidate survives.
pub fn select_candidate(names: &[String], excludes: &HashSet<String>) -> Option<String> {
    if names.iter().any(|n| n == DEFAULT_PROG_ID) && !excludes.contains(DEFAULT_PROG_ID) {
        return Some(DEFAULT_PROG_ID.to_string());
    }

    let mut best: Option<(f64, &String)> = None;
    let mut fallback: Option<&String> = None;

    for name in names {
        if !name.starts_with(VERSIONED_PREFIX) || excludes.contains(name) {
            continue;
        }
        match version_suffix(name) {
            Some(version) => {
                if best.map_or(true, |(v, _)| version > v) {
                    best = Some((version, name));
                }
            }
            None => {
                if fallback.is_none() {
                    fallback = Some(name);
                }
            }
        }
    }

    best.map(|(_, name)| name.clone())
        .or_else(|| fallback.cloned())
}

/// Resolve a dispatch identifier: environment override first, then the
/// supplied candidate list filtered through `excludes`.
///
/// The override bypasses discovery entirely, exclusion set included; the
/// connection loop in the session is responsible for not retrying an
/// override it has already rejected.
pub fn resolve_from(names: &[String], excludes: &HashSet<String>) -> Option<String> {
    if let Some(forced) = env_override() {
        return Some(forced);
    }
    select_candidate(names, excludes)
}

/// Resolve against the live Windows registry.
///
/// Enumeration errors are treated as "nothing registered"; the caller sees
/// `None`, never an error.
#[cfg(target_os = "windows")]
pub fn resolve(excludes: &HashSet<String>) -> Option<String> {
    if let Some(forced) = env_override() {
        log::debug!("dispatch forced via {}: {}", DISPATCH_ENV_VAR, forced);
        return Some(forced);
    }

    let names = crate::platform::windows::registry::automation_class_names();
    let picked = select_candidate(&names, excludes);
    if let Some(name) = &picked {
        log::debug!("dispatch candidate: {}", name);
    }
    picked
}
