//! Storage layout — deterministic path derivation for stored artifacts.
//!
//! Every artifact lives under `storage_root/<token>/` where `token` is a
//! fresh UUIDv4. The directory name is derived purely from the token, never
//! from the uploaded filename, so concurrent uploads cannot collide and the
//! mapping from identifier to path needs no index. Every derived path is
//! checked for containment inside the storage root before it is returned.

use crate::models::artifact::ArtifactPaths;
use crate::services::validation::sanitize_filename;
use std::{
    io::{self, ErrorKind},
    path::{Component, Path, PathBuf},
};
use thiserror::Error;
use uuid::Uuid;

/// Fixed name of the processor output directory under an artifact root.
pub const PROCESSED_DIR: &str = "processed";
/// Fixed entry-point filename the processor must produce.
pub const ENTRY_POINT: &str = "index.html";
/// Fixed name of the nested asset tree under the processed directory.
pub const ASSETS_DIR: &str = "assets";

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("invalid artifact identifier `{0}`")]
    InvalidIdentifier(String),
    #[error("invalid asset name")]
    InvalidAssetName,
    #[error("path `{0}` escapes the storage root")]
    Containment(PathBuf),
}

/// Owns the canonicalized storage root and derives all artifact paths.
///
/// Holds no state beyond the root path; the same inputs always yield the
/// same paths.
#[derive(Clone, Debug)]
pub struct ArtifactLayout {
    root: PathBuf,
}

impl ArtifactLayout {
    /// Create a layout rooted at `root`, creating and canonicalizing the
    /// directory so later containment checks compare resolved paths.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        let root = std::fs::canonicalize(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Derive paths for a brand-new artifact with a fresh token.
    ///
    /// `sanitized_filename` must already have passed upload validation.
    pub fn new_artifact(&self, sanitized_filename: &str) -> Result<ArtifactPaths, LayoutError> {
        self.paths_for(Uuid::new_v4(), sanitized_filename)
    }

    /// Re-derive the paths of an existing artifact from its unique
    /// filename (`<token>_<sanitized name>`), without generating a token.
    pub fn resolve_artifact(&self, unique_filename: &str) -> Result<ArtifactPaths, LayoutError> {
        let (token, name) = split_unique_filename(unique_filename)
            .ok_or_else(|| LayoutError::InvalidIdentifier(unique_filename.to_string()))?;
        self.paths_for(token, name)
    }

    /// Derive the on-disk path of a nested generated asset:
    /// `<root>/<token>/processed/assets/<category>/<filename>`.
    ///
    /// Category and filename are sanitized exactly like upload filenames
    /// before they touch the path.
    pub fn resolve_asset(
        &self,
        unique_filename: &str,
        category: &str,
        filename: &str,
    ) -> Result<PathBuf, LayoutError> {
        let paths = self.resolve_artifact(unique_filename)?;
        let category = sanitize_filename(category).ok_or(LayoutError::InvalidAssetName)?;
        let filename = sanitize_filename(filename).ok_or(LayoutError::InvalidAssetName)?;

        let path = paths
            .processed_dir
            .join(ASSETS_DIR)
            .join(category)
            .join(filename);
        self.ensure_contained(&path)?;
        Ok(path)
    }

    fn paths_for(&self, token: Uuid, name: &str) -> Result<ArtifactPaths, LayoutError> {
        // The name part must already be in sanitized form; identifiers
        // arriving over HTTP could smuggle anything else in.
        if sanitize_filename(name).as_deref() != Some(name) {
            return Err(LayoutError::InvalidIdentifier(format!("{token}_{name}")));
        }

        let unique_filename = format!("{token}_{name}");
        let root_dir = self.root.join(token.to_string());
        let original_file = root_dir.join(&unique_filename);
        let processed_dir = root_dir.join(PROCESSED_DIR);
        let entry_point = processed_dir.join(ENTRY_POINT);

        for path in [&root_dir, &original_file, &processed_dir, &entry_point] {
            self.ensure_contained(path)?;
        }

        Ok(ArtifactPaths {
            token,
            unique_filename,
            root_dir,
            original_file,
            processed_dir,
            entry_point,
        })
    }

    /// Verify that `path` stays inside the storage root.
    ///
    /// Rejects lexical escapes first, then resolves the deepest existing
    /// ancestor through any symlinks and requires it to remain under the
    /// (already canonical) root.
    fn ensure_contained(&self, path: &Path) -> Result<(), LayoutError> {
        let escape = || LayoutError::Containment(path.to_path_buf());

        if path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::CurDir))
        {
            return Err(escape());
        }
        if !path.starts_with(&self.root) {
            return Err(escape());
        }

        let mut probe = path.to_path_buf();
        let resolved = loop {
            match std::fs::canonicalize(&probe) {
                Ok(resolved) => break resolved,
                Err(err) if err.kind() == ErrorKind::NotFound => match probe.parent() {
                    Some(parent) if parent.starts_with(&self.root) => probe = parent.to_path_buf(),
                    _ => break self.root.clone(),
                },
                Err(_) => return Err(escape()),
            }
        };

        if resolved.starts_with(&self.root) {
            Ok(())
        } else {
            Err(escape())
        }
    }
}

/// Split `<token>_<name>` at the first underscore. UUIDs contain no
/// underscores, so the split point is unambiguous.
fn split_unique_filename(unique: &str) -> Option<(Uuid, &str)> {
    let (token, name) = unique.split_once('_')?;
    if name.is_empty() {
        return None;
    }
    Uuid::parse_str(token).ok().map(|token| (token, name))
}
