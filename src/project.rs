// src/project.rs

//! Facts read from an editor project checkout: the pinned editor version,
//! where that editor lives on the agent, and the scripts assembly name.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::{Result, UnitypipeError};
use crate::fs::FileSystem;

/// Directory scanned for the scripts assembly definition.
pub const SCRIPTS_DIR: &str = "Assets/Scripts";

/// Editor version pinned by a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorVersion {
    /// e.g. `2022.3.10f1`
    pub version: String,
    /// Changeset hash, e.g. `ff3792e53c62`
    pub revision: String,
}

pub fn project_version_path(project_dir: &Path) -> PathBuf {
    project_dir.join("ProjectSettings").join("ProjectVersion.txt")
}

/// Read `ProjectSettings/ProjectVersion.txt`.
///
/// The second line has the form
/// `m_EditorVersionWithRevision: 2022.3.10f1 (ff3792e53c62)`.
pub fn read_editor_version(fs: &dyn FileSystem, project_dir: &Path) -> Result<EditorVersion> {
    let path = project_version_path(project_dir);
    let contents = fs.read_to_string(&path)?;
    parse_editor_version(&contents).ok_or_else(|| {
        UnitypipeError::VersionError(format!(
            "no `m_EditorVersionWithRevision` line in {}",
            path.display()
        ))
    })
}

pub fn parse_editor_version(contents: &str) -> Option<EditorVersion> {
    let line = contents
        .lines()
        .find(|line| line.trim_start().starts_with("m_EditorVersionWithRevision:"))?;

    let mut fields = line.split_whitespace().skip(1);
    let version = fields.next()?.to_string();
    let revision = fields
        .next()?
        .trim_start_matches('(')
        .trim_end_matches(')')
        .to_string();

    if version.is_empty() || revision.is_empty() {
        return None;
    }

    Some(EditorVersion { version, revision })
}

/// Editor binary inside a Hub install root: `<root>/<version>/Editor/Unity`.
pub fn hub_editor_executable(hub_root: &Path, version: &EditorVersion) -> PathBuf {
    hub_root.join(&version.version).join("Editor").join("Unity")
}

/// Name of the first assembly definition (`*.asmdef`) in `Assets/Scripts`,
/// in path order.
///
/// A project without one is legal; coverage then runs without an assembly
/// filter.
pub fn find_assembly_filter(fs: &dyn FileSystem, project_dir: &Path) -> Option<String> {
    let scripts = project_dir.join(SCRIPTS_DIR);

    let entries = match fs.read_dir(&scripts) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %scripts.display(), error = %e, "cannot list scripts directory");
            return None;
        }
    };

    let name = entries
        .iter()
        .filter(|path| path.extension().is_some_and(|ext| ext == "asmdef"))
        .filter(|path| fs.is_file(path))
        .find_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string));

    match &name {
        Some(name) => debug!(assembly = %name, "found scripts assembly definition"),
        None => warn!(dir = %scripts.display(), "no assembly definition found"),
    }

    name
}
