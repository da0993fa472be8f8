//! Artifact serving — turns an artifact identifier plus a requested path
//! into bytes, never escaping the storage root.

use crate::errors::AppError;
use crate::services::layout::{ArtifactLayout, LayoutError};
use std::io;
use tokio::fs::{self, File};
use tracing::warn;

/// Read the entry-point HTML of a processed artifact.
///
/// NotFound covers both "never processed" and "deleted after a failed
/// upload"; the layout has already verified containment of the path.
pub async fn load_entry_point(
    layout: &ArtifactLayout,
    unique_filename: &str,
) -> Result<String, AppError> {
    let paths = layout.resolve_artifact(unique_filename)?;
    match fs::read_to_string(&paths.entry_point).await {
        Ok(content) => Ok(content),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            warn!(artifact = %unique_filename, "entry point missing");
            Err(AppError::NotFound)
        }
        Err(err) => Err(AppError::Io(err)),
    }
}

/// Open a nested generated asset for streaming.
///
/// Returns the opened file, its length and a content type derived from the
/// filename. The resolved path is canonicalized and re-checked against the
/// storage root after opening, on top of the layout's own containment
/// guarantee.
pub async fn open_asset(
    layout: &ArtifactLayout,
    unique_filename: &str,
    category: &str,
    filename: &str,
) -> Result<(File, u64, &'static str), AppError> {
    let path = layout.resolve_asset(unique_filename, category, filename)?;

    let file = match File::open(&path).await {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "asset not found");
            return Err(AppError::NotFound);
        }
        Err(err) => return Err(AppError::Io(err)),
    };

    let resolved = fs::canonicalize(&path).await?;
    if !resolved.starts_with(layout.root()) {
        return Err(LayoutError::Containment(resolved).into());
    }

    let len = file.metadata().await?.len();
    Ok((file, len, content_type_for(filename)))
}

/// Minimal extension-to-content-type table for generated viewer assets;
/// anything unknown streams as an octet stream.
fn content_type_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css",
        "js" => "text/javascript",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        _ => "application/octet-stream",
    }
}
