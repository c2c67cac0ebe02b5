//! YAML persistence helpers and diagnostics

pub mod diagnostics;

pub use diagnostics::YamlSyntaxError;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// Errors from reading or writing YAML files
#[derive(Debug, Error)]
pub enum YamlError {
    #[error(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("failed to serialize {path}: {message}")]
    Serialize { path: String, message: String },

    #[error("IO error on {path}: {message}")]
    Io { path: String, message: String },
}

/// Read and deserialize a YAML file, producing a source-located diagnostic
/// on syntax errors
pub fn read_file<T: DeserializeOwned + 'static>(path: &Path) -> Result<T, YamlError> {
    let contents = std::fs::read_to_string(path).map_err(|e| YamlError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    serde_yml::from_str(&contents).map_err(|e| {
        YamlSyntaxError::from_serde_error(&e, &contents, &path.display().to_string()).into()
    })
}

/// Serialize and write a YAML file atomically: write to a temporary sibling,
/// then rename over the target. Readers never observe a half-written file.
pub fn write_file<T: Serialize>(path: &Path, value: &T) -> Result<(), YamlError> {
    let contents = serde_yml::to_string(value).map_err(|e| YamlError::Serialize {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let io_err = |e: std::io::Error| YamlError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let tmp = path.with_extension("yaml.tmp");
    std::fs::write(&tmp, contents).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}
