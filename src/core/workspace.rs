//! Workspace discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

/// A VCT workspace: a directory tree holding project dossiers and
/// after-sales tickets as plain YAML files, marked by a `.vct/` directory.
#[derive(Debug)]
pub struct Workspace {
    /// Root directory of the workspace (parent of .vct/)
    root: PathBuf,
}

impl Workspace {
    /// Find the workspace root by walking up from the current directory
    pub fn discover() -> Result<Self, WorkspaceError> {
        let current = std::env::current_dir()
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find the workspace root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, WorkspaceError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        loop {
            let vct_dir = current.join(".vct");
            if vct_dir.is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(WorkspaceError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new workspace structure at the given path
    pub fn init(path: &Path) -> Result<Self, WorkspaceError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        let vct_dir = root.join(".vct");
        if vct_dir.exists() {
            return Err(WorkspaceError::AlreadyExists(root.clone()));
        }

        std::fs::create_dir_all(&vct_dir)
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        let config_path = vct_dir.join("config.yaml");
        std::fs::write(&config_path, Self::default_config())
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        for dir in ["projects", "tickets"] {
            std::fs::create_dir_all(root.join(dir))
                .map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        }

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# VCT Workspace Configuration

# Default author for new entities (can be overridden by global config)
# author: ""

# Default role to act under (engineering, commercial, management, production, admin)
# role: ""
"#
    }

    /// Get the workspace root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .vct configuration directory
    pub fn vct_dir(&self) -> PathBuf {
        self.root.join(".vct")
    }

    /// Directory holding project dossier files
    pub fn projects_dir(&self) -> PathBuf {
        self.root.join("projects")
    }

    /// Directory holding after-sales ticket files
    pub fn tickets_dir(&self) -> PathBuf {
        self.root.join("tickets")
    }

    /// Path to the team roster file
    pub fn team_path(&self) -> PathBuf {
        self.vct_dir().join("team.yaml")
    }

    /// Iterate all dossier files under projects/
    pub fn iter_dossier_files(&self) -> impl Iterator<Item = PathBuf> {
        Self::iter_yaml_files(self.projects_dir())
    }

    /// Iterate all ticket files under tickets/
    pub fn iter_ticket_files(&self) -> impl Iterator<Item = PathBuf> {
        Self::iter_yaml_files(self.tickets_dir())
    }

    fn iter_yaml_files(dir: PathBuf) -> impl Iterator<Item = PathBuf> {
        walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().to_string_lossy().ends_with(".vct.yaml"))
            .map(|e| e.path().to_path_buf())
    }
}

/// Errors that can occur during workspace operations
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("not a VCT workspace (searched from {searched_from:?}). Run 'vct init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("VCT workspace already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let ws = Workspace::init(tmp.path()).unwrap();

        assert!(ws.vct_dir().exists());
        assert!(ws.vct_dir().join("config.yaml").exists());
        assert!(ws.projects_dir().is_dir());
        assert!(ws.tickets_dir().is_dir());
    }

    #[test]
    fn test_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path()).unwrap();

        let err = Workspace::init(tmp.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::AlreadyExists(_)));
    }

    #[test]
    fn test_discover_from_nested_dir() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let ws = Workspace::discover_from(&subdir).unwrap();
        assert_eq!(
            ws.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_discover_fails_without_marker() {
        let tmp = tempdir().unwrap();
        let err = Workspace::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::NotFound { .. }));
    }
}
