//! Artifact writer
//!
//! Writing happens in two phases. Every artifact is first staged in a
//! temporary file next to its destination; only when all of them are staged
//! are they renamed into place. A rename that fails rolls the batch back:
//! files this call created are removed and files it replaced get their
//! previous contents back.

use bindings_generator_common::{GeneratorError, Result};
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;

/// A rendered output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Path relative to the output directory
    pub relative_path: PathBuf,
    /// Full file contents
    pub contents: String,
}

impl Artifact {
    pub fn new(relative_path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            contents: contents.into(),
        }
    }
}

/// Write all artifacts under `output_dir`, returning the written paths
pub fn write_artifacts(output_dir: &Path, artifacts: &[Artifact]) -> Result<Vec<PathBuf>> {
    for artifact in artifacts {
        check_relative(&artifact.relative_path)?;
    }

    fs::create_dir_all(output_dir).map_err(|e| {
        GeneratorError::Generation(format!(
            "Failed to create output directory {}: {}",
            output_dir.display(),
            e
        ))
    })?;

    let mut staged = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        staged.push(stage(output_dir, artifact)?);
    }

    let mut committed: Vec<Committed> = Vec::with_capacity(staged.len());
    for (temp, path) in staged {
        match commit(temp, &path) {
            Ok(previous) => committed.push(Committed { path, previous }),
            Err(e) => {
                rollback(&committed);
                return Err(e);
            }
        }
    }

    Ok(committed.into_iter().map(|c| c.path).collect())
}

/// A file renamed into place, with what it replaced
struct Committed {
    path: PathBuf,
    previous: Option<Vec<u8>>,
}

/// Write an artifact to a temporary file in its destination directory
fn stage(output_dir: &Path, artifact: &Artifact) -> Result<(NamedTempFile, PathBuf)> {
    let path = output_dir.join(&artifact.relative_path);
    let parent = path.parent().unwrap_or(output_dir);
    fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(artifact.contents.as_bytes())?;
    temp.flush()?;

    Ok((temp, path))
}

/// Rename a staged file into place, returning the contents it replaced
fn commit(temp: NamedTempFile, path: &Path) -> Result<Option<Vec<u8>>> {
    let previous = if path.is_file() {
        Some(fs::read(path)?)
    } else {
        None
    };

    temp.persist(path).map_err(|e| {
        GeneratorError::Generation(format!("Failed to write {}: {}", path.display(), e.error))
    })?;
    Ok(previous)
}

/// Undo the renames of a failed batch, newest first
fn rollback(committed: &[Committed]) {
    for file in committed.iter().rev() {
        let _ = match &file.previous {
            Some(contents) => fs::write(&file.path, contents),
            None => fs::remove_file(&file.path),
        };
    }
}

/// Artifacts must stay inside the output directory
fn check_relative(path: &Path) -> Result<()> {
    let escapes = path.components().any(|component| {
        matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });

    if escapes || path.as_os_str().is_empty() {
        return Err(GeneratorError::Generation(format!(
            "Artifact path {} must be relative to the output directory",
            path.display()
        )));
    }
    Ok(())
}
