//! Upload stage
//!
//! Turns an ordered list of local image files into remote media asset ids.
//! All paths are validated before the first network call, ids come back in
//! input order, and any single failed upload fails the whole stage.

use crate::service::WorldService;
use serde_json::json;
use std::path::{Path, PathBuf};
use worldgen_core::{Result, WorldgenError};

/// Image extensions the service accepts.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// One uploaded image: the remote id plus where it came from and the
/// azimuth it was assigned in the multi-image prompt.
#[derive(Debug, Clone)]
pub struct MediaAsset {
    pub id: String,
    pub source_path: PathBuf,
    pub azimuth: f64,
}

/// Collect candidate images from a directory, sorted by file name.
pub fn collect_images(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(WorldgenError::Input(format!(
            "Images directory not found: {}",
            dir.display()
        )));
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && has_image_extension(p))
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(WorldgenError::Input(format!(
            "No images found in {} (expected {})",
            dir.display(),
            IMAGE_EXTENSIONS.join("/")
        )));
    }
    Ok(paths)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Evenly spaced azimuths for `n` images (360°/n apart), rounded to
/// millidegrees the way the service expects them.
pub fn azimuths(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let step = 360.0 / n as f64;
    (0..n)
        .map(|i| (i as f64 * step * 1000.0).round() / 1000.0)
        .collect()
}

/// MIME type for an image extension.
pub fn guess_mime_type(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Upload each image in order and return the media asset ids, preserving
/// input order. Every path is checked up front so a bad input fails before
/// anything is sent.
pub fn upload_images(service: &dyn WorldService, paths: &[PathBuf]) -> Result<Vec<MediaAsset>> {
    if paths.is_empty() {
        return Err(WorldgenError::Input("No images to upload".to_string()));
    }
    for path in paths {
        if !path.is_file() {
            return Err(WorldgenError::Input(format!(
                "Image not found: {}",
                path.display()
            )));
        }
        std::fs::File::open(path).map_err(|e| {
            WorldgenError::Input(format!("Image not readable: {}: {}", path.display(), e))
        })?;
    }

    let azimuths = azimuths(paths.len());
    let mut assets = Vec::with_capacity(paths.len());

    for (path, azimuth) in paths.iter().zip(azimuths) {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                WorldgenError::Input(format!("Invalid image file name: {}", path.display()))
            })?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        let metadata = json!({
            "source_path": path.to_string_lossy(),
            "azimuth": azimuth,
        });
        let prepared = service.prepare_upload(file_name, "image", &extension, metadata)?;

        let data = std::fs::read(path)?;
        service.upload_bytes(&prepared.upload_info, &data, guess_mime_type(&extension))?;

        println!(
            "  Uploaded {} -> {}",
            path.display(),
            prepared.media_asset.media_asset_id
        );

        assets.push(MediaAsset {
            id: prepared.media_asset.media_asset_id,
            source_path: path.clone(),
            azimuth,
        });
    }

    Ok(assets)
}
