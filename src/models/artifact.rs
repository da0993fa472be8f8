//! Represents a stored artifact: an uploaded document plus the processed,
//! browsable output derived from it.

use std::path::PathBuf;
use uuid::Uuid;

/// The full on-disk shape of one stored artifact.
///
/// All paths are derived deterministically from the token by
/// `ArtifactLayout` and are verified to lie inside the storage root before
/// this struct is constructed. Created once per upload; never mutated.
#[derive(Clone, Debug)]
pub struct ArtifactPaths {
    /// Collision-resistant identifier generated at upload time.
    pub token: Uuid,

    /// `<token>_<sanitized original filename>` — the public identifier
    /// used in URLs and session bindings.
    pub unique_filename: String,

    /// Directory holding everything belonging to this artifact:
    /// `storage_root/<token>/`.
    pub root_dir: PathBuf,

    /// Where the original uploaded bytes are persisted.
    pub original_file: PathBuf,

    /// Directory the external processor writes its rendering into.
    pub processed_dir: PathBuf,

    /// Fixed-name root of the browsable rendering
    /// (`processed/index.html`).
    pub entry_point: PathBuf,
}
