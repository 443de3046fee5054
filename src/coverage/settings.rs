// src/coverage/settings.rs

//! Reader for the code-coverage package's project settings.
//!
//! The package stores its settings as a serialized dictionary whose values
//! are themselves JSON strings:
//!
//! ```json
//! {
//!   "m_Dictionary": {
//!     "m_DictionaryValues": [
//!       { "type": "System.String", "key": "PathsToExclude",
//!         "value": "{\"m_Value\":\"{ProjectPath}/Assets/Plugins/**\"}" }
//!     ]
//!   }
//! }
//! ```
//!
//! Only a syntactically broken top-level document is an error. A missing
//! file, dictionary, key, or an unreadable nested value means "not
//! configured" and yields `None`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{Result, UnitypipeError};
use crate::fs::FileSystem;

/// Package id of the editor's code coverage package.
pub const COVERAGE_PACKAGE_ID: &str = "com.unity.testtools.codecoverage";

/// Dictionary key holding the exclusion filter.
pub const PATHS_TO_EXCLUDE_KEY: &str = "PathsToExclude";

/// Placeholder the settings UI writes in front of project-relative paths.
pub const PROJECT_PATH_TOKEN: &str = "{ProjectPath}";

#[derive(Debug, Deserialize)]
struct WrappedValue {
    #[serde(rename = "m_Value")]
    value: String,
}

/// Location of the coverage settings file inside a project.
pub fn settings_path(project_dir: &Path) -> PathBuf {
    project_dir
        .join("ProjectSettings")
        .join("Packages")
        .join(COVERAGE_PACKAGE_ID)
        .join("Settings.json")
}

/// Read the `PathsToExclude` filter of a project, already rewritten into the
/// negated filter syntax (see [`rewrite_project_placeholders`]).
///
/// Returns `Ok(None)` when no exclusion is configured and `Ok(Some(""))`
/// when it is configured but empty.
pub fn read_exclude_paths(fs: &dyn FileSystem, project_dir: &Path) -> Result<Option<String>> {
    let path = settings_path(project_dir);

    if !fs.is_file(&path) {
        debug!(path = %path.display(), "no coverage settings file; no path exclusions");
        return Ok(None);
    }

    let contents = match fs.read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "coverage settings unreadable; ignoring");
            return Ok(None);
        }
    };

    let raw = parse_exclude_value(&contents).map_err(|source| UnitypipeError::ParseError {
        path: path.clone(),
        source,
    })?;

    match raw {
        Some(raw) => {
            let rewritten = rewrite_project_placeholders(&raw);
            debug!(path = %path.display(), exclude = %rewritten, "coverage path exclusions");
            Ok(Some(rewritten))
        }
        None => {
            debug!(path = %path.display(), "`{}` not configured", PATHS_TO_EXCLUDE_KEY);
            Ok(None)
        }
    }
}

/// Extract the raw (un-rewritten) `PathsToExclude` value from a settings
/// document.
///
/// Fails only if `contents` is not valid JSON.
pub fn parse_exclude_value(contents: &str) -> std::result::Result<Option<String>, serde_json::Error> {
    let document: Value = serde_json::from_str(contents)?;

    let Some(entries) = document
        .pointer("/m_Dictionary/m_DictionaryValues")
        .and_then(Value::as_array)
    else {
        return Ok(None);
    };

    let Some(nested) = entries
        .iter()
        .filter(|entry| entry.get("key").and_then(Value::as_str) == Some(PATHS_TO_EXCLUDE_KEY))
        .find_map(|entry| entry.get("value").and_then(Value::as_str))
    else {
        return Ok(None);
    };

    match serde_json::from_str::<WrappedValue>(nested) {
        Ok(wrapped) => Ok(Some(wrapped.value)),
        Err(e) => {
            warn!(error = %e, "malformed `{}` value; ignoring", PATHS_TO_EXCLUDE_KEY);
            Ok(None)
        }
    }
}

/// Replace every `{ProjectPath}` immediately followed by a path separator
/// with `-`, turning project-relative include paths into exclusion filters.
///
/// `{ProjectPath}/Assets/Gen/**` becomes `-Assets/Gen/**`.
pub fn rewrite_project_placeholders(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(idx) = rest.find(PROJECT_PATH_TOKEN) {
        let after = &rest[idx + PROJECT_PATH_TOKEN.len()..];
        out.push_str(&rest[..idx]);
        match after.chars().next() {
            Some('/') | Some('\\') => {
                out.push('-');
                rest = &after[1..];
            }
            _ => {
                out.push_str(PROJECT_PATH_TOKEN);
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
