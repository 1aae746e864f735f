//! Staged file output.
//!
//! Every artifact is serialized and staged in a temporary file next to its
//! destination before any destination is replaced.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

/// File contents waiting to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Artifact {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

impl Artifact {
    /// Pretty-printed JSON document.
    pub(crate) fn json<T: Serialize>(path: impl Into<PathBuf>, value: &T) -> Result<Self> {
        let path = path.into();
        let mut contents = serde_json::to_vec_pretty(value)
            .with_context(|| format!("Failed to serialize {}", path.display()))?;
        contents.push(b'\n');
        Ok(Self { path, contents })
    }

    pub(crate) fn text(path: impl Into<PathBuf>, contents: String) -> Self {
        Self {
            path: path.into(),
            contents: contents.into_bytes(),
        }
    }
}

/// Write every artifact, replacing existing files.
///
/// Nothing is replaced if staging any artifact fails. Each replacement is an
/// atomic rename, but they happen one after another: if a later rename fails,
/// earlier destinations already hold their new contents.
pub(crate) fn write_all(artifacts: &[Artifact]) -> Result<()> {
    let mut staged = Vec::with_capacity(artifacts.len());

    for artifact in artifacts {
        let dir = parent_dir(&artifact.path);
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;

        let mut file = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to stage {}", artifact.path.display()))?;
        file.write_all(&artifact.contents)
            .and_then(|()| file.flush())
            .with_context(|| format!("Failed to stage {}", artifact.path.display()))?;

        staged.push((file, &artifact.path));
    }

    for (file, path) in staged {
        file.persist(path)
            .map_err(|err| err.error)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(path = %path.display(), "wrote file");
    }

    Ok(())
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
