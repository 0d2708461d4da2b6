//! Writing into the output directory.
//!
//! Every file is written to a temporary file in the same directory and then
//! renamed over the target, so the dev server never reads a half-written
//! document.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::error::{AssetError, BuildError};

/// A file written by a build cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Atomically replace `path` with `contents`.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<WrittenFile, BuildError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let write_failed = |source| BuildError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(write_failed)?;
    temp.write_all(contents).map_err(write_failed)?;
    temp.as_file().sync_all().map_err(write_failed)?;
    temp.persist(path).map_err(|e| write_failed(e.error))?;

    Ok(WrittenFile {
        path: path.to_path_buf(),
        bytes: contents.len() as u64,
    })
}

/// Copy the public tree into `out_dir`, skipping `exclude` (the template).
///
/// An output directory nested inside the public root is never walked, so
/// earlier output is not copied into itself. Failures are per file: each one
/// is recorded and the copy continues.
pub fn copy_public_tree(public_dir: &Path, out_dir: &Path, exclude: &Path) -> Vec<AssetError> {
    let mut errors = Vec::new();

    if !public_dir.is_dir() {
        return errors;
    }

    let walker = WalkDir::new(public_dir)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !entry.path().starts_with(out_dir));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().unwrap_or(public_dir).to_path_buf();
                errors.push(AssetError::Copy {
                    path,
                    source: err.into(),
                });
                continue;
            }
        };

        let source = entry.path();
        if source == exclude {
            continue;
        }

        let Ok(relative) = source.strip_prefix(public_dir) else {
            continue;
        };
        let target = out_dir.join(relative);

        let result = if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
        } else {
            fs::copy(source, &target).map(|_| ())
        };

        if let Err(source_err) = result {
            errors.push(AssetError::Copy {
                path: source.to_path_buf(),
                source: source_err,
            });
        }
    }

    errors
}
