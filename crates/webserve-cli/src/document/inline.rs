//! Asset inlining for single-document output.
//!
//! Every file under the assets root is looked up by its path relative to the
//! public root (`assets/logo.png`). Raster images become base64 `data:` URIs,
//! JSON files replace their quoted path with the JSON text itself. Other
//! files are left alone and stay reachable through the public-tree copy.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use walkdir::WalkDir;

use crate::error::AssetError;

/// How one asset is embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssetKind {
    Image(&'static str),
    Json,
}

fn asset_kind(path: &Path) -> Option<AssetKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let kind = match ext.as_str() {
        "png" => AssetKind::Image("image/png"),
        "jpg" | "jpeg" => AssetKind::Image("image/jpeg"),
        "gif" => AssetKind::Image("image/gif"),
        "webp" => AssetKind::Image("image/webp"),
        "bmp" => AssetKind::Image("image/bmp"),
        "ico" => AssetKind::Image("image/x-icon"),
        "json" => AssetKind::Json,
        _ => return None,
    };
    Some(kind)
}

/// Result of one inlining pass.
#[derive(Debug, Default)]
pub struct InlineOutcome {
    /// The document with every inlinable reference replaced
    pub document: String,
    /// Assets that were embedded, as root-relative paths
    pub inlined: Vec<String>,
    /// Assets that were skipped
    pub errors: Vec<AssetError>,
}

/// Replace references to the assets under `assets_root` inside `document`.
///
/// `public_root` defines the reference strings: an asset at
/// `<public_root>/assets/logo.png` is referenced as `assets/logo.png`. A
/// missing assets root inlines nothing.
pub fn inline_assets(document: &str, assets_root: &Path, public_root: &Path) -> InlineOutcome {
    let mut outcome = InlineOutcome {
        document: document.to_string(),
        ..Default::default()
    };

    if !assets_root.is_dir() {
        return outcome;
    }

    for path in asset_files(assets_root) {
        let Some(kind) = asset_kind(&path) else {
            continue;
        };
        let reference = reference_for(&path, public_root);

        match embed(&path, kind) {
            Ok(embedded) => {
                let needle = match kind {
                    AssetKind::Image(_) => reference.clone(),
                    AssetKind::Json => format!("\"{}\"", reference),
                };
                if outcome.document.contains(&needle) {
                    outcome.document = outcome.document.replace(&needle, &embedded);
                    outcome.inlined.push(reference);
                }
            }
            Err(err) => {
                tracing::warn!("{}", err);
                outcome.errors.push(err);
            }
        }
    }

    outcome
}

/// Files under `root`, sorted for a deterministic replacement order.
fn asset_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!("Skipping unreadable asset entry: {}", err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

/// Path of `file` relative to `public_root`, with forward slashes.
fn reference_for(file: &Path, public_root: &Path) -> String {
    let relative = file.strip_prefix(public_root).unwrap_or(file);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn embed(path: &Path, kind: AssetKind) -> Result<String, AssetError> {
    match kind {
        AssetKind::Image(mime) => {
            let bytes = std::fs::read(path).map_err(|source| AssetError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
        }
        AssetKind::Json => {
            let text = std::fs::read_to_string(path).map_err(|source| AssetError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            serde_json::from_str::<serde_json::Value>(&text).map_err(|source| {
                AssetError::InvalidJson {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            Ok(text.trim().to_string())
        }
    }
}
