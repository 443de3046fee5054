// src/logscan.rs

//! Editor log inspection after a stage has failed.
//!
//! Pulls out what a reviewer needs from a multi-megabyte editor log: the
//! build result line, compiler errors split into file/line/code/message, the
//! remaining error lines, and the exit code the editor printed.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::errors::Result;
use crate::fs::FileSystem;

static ERROR_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\s+error|error\s+|\berror\b)").expect("static regex")
});

static LINE_COLUMN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+),\d+\)$").expect("static regex"));

const BUILD_RESULT_MARKER: &str = "build finished, result:";
const EXIT_CODE_MARKER: &str = "##### ExitCode";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BuildResult {
    Success,
    Failure,
    /// No result line: the editor crashed or was killed.
    #[serde(rename = "Unexpected Termination")]
    UnexpectedTermination,
}

/// `Assets/Scripts/UI/EndModal.cs(1,17): error CS0234: The type ...`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilerError {
    pub file_path: String,
    pub line_number: Option<u32>,
    pub error_code: String,
    pub error_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildLogReport {
    pub build_result: BuildResult,
    pub compiler_errors: Vec<CompilerError>,
    pub system_error_messages: Vec<String>,
    pub exit_code: Option<String>,
}

impl BuildLogReport {
    pub fn has_errors(&self) -> bool {
        !self.compiler_errors.is_empty() || !self.system_error_messages.is_empty()
    }
}

/// Read and parse an editor log. Lines containing any of `exclude` are
/// ignored when collecting errors.
pub fn scan_build_log(
    fs: &dyn FileSystem,
    log_path: &Path,
    exclude: &[String],
) -> Result<BuildLogReport> {
    let contents = fs.read_to_string(log_path)?;
    Ok(parse_build_log(&contents, exclude))
}

pub fn parse_build_log(contents: &str, exclude: &[String]) -> BuildLogReport {
    let build_result = contents
        .lines()
        .find(|line| line.to_lowercase().contains(BUILD_RESULT_MARKER))
        .map(|line| {
            if line.contains("Success") {
                BuildResult::Success
            } else if line.contains("Failure") {
                BuildResult::Failure
            } else {
                BuildResult::UnexpectedTermination
            }
        })
        .unwrap_or(BuildResult::UnexpectedTermination);

    // Sorted and de-duplicated: the editor repeats errors across domain reloads.
    let error_lines: BTreeSet<&str> = contents
        .lines()
        .filter(|line| ERROR_LINE.is_match(line))
        .filter(|line| !exclude.iter().any(|keyword| line.contains(keyword.as_str())))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut compiler_errors = Vec::new();
    let mut system_error_messages = Vec::new();
    for line in error_lines {
        if line.contains("Asset") {
            if let Some(err) = parse_compiler_error(line) {
                compiler_errors.push(err);
            }
        } else {
            system_error_messages.push(line.to_string());
        }
    }

    let exit_code = contents
        .lines()
        .skip_while(|line| !line.contains(EXIT_CODE_MARKER))
        .nth(1)
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string);

    BuildLogReport {
        build_result,
        compiler_errors,
        system_error_messages,
        exit_code,
    }
}

fn parse_compiler_error(line: &str) -> Option<CompilerError> {
    let parts: Vec<&str> = line.split(':').map(str::trim).collect();
    let [raw_path, error_code, description] = parts.as_slice() else {
        return None;
    };

    let (file_path, line_number) = match LINE_COLUMN.captures(raw_path) {
        Some(caps) => (
            LINE_COLUMN.replace(raw_path, "").into_owned(),
            caps.get(1).and_then(|m| m.as_str().parse().ok()),
        ),
        None => (raw_path.to_string(), None),
    };

    if file_path.is_empty() || error_code.is_empty() || description.is_empty() {
        return None;
    }

    Some(CompilerError {
        file_path,
        line_number,
        error_code: error_code.to_string(),
        error_description: description.to_string(),
    })
}

/// First log line containing one of the known failure signatures.
pub fn find_known_failure<'a>(contents: &'a str, signatures: &[String]) -> Option<&'a str> {
    contents.lines().find(|line| {
        signatures
            .iter()
            .any(|sig| !sig.is_empty() && line.contains(sig.as_str()))
    })
}
