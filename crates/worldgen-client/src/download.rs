//! Asset download stage
//!
//! Fetches whichever output artifacts a completed generation produced into
//! a per-run `assets/` directory. Absent assets are skipped, and a failure
//! on one asset does not stop the remaining downloads; the report lists
//! what was downloaded, what failed, and what the descriptor never had.

use crate::api::WorldAssets;
use crate::service::WorldService;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use worldgen_core::{ContentHash, Result};

/// The kinds of output artifact a world generation can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Splat,
    ColliderMesh,
    Pano,
    Thumbnail,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Splat => write!(f, "splat"),
            AssetKind::ColliderMesh => write!(f, "collider_mesh"),
            AssetKind::Pano => write!(f, "pano"),
            AssetKind::Thumbnail => write!(f, "thumbnail"),
        }
    }
}

/// One artifact written to local storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadedAsset {
    pub kind: AssetKind,
    /// Splat resolution key, when the kind has variants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    pub local_path: String,
    pub source_url: String,
    pub content_hash: String,
}

/// A download that was attempted and failed. Non-fatal to the run.
#[derive(Debug, Clone)]
pub struct FailedDownload {
    pub name: String,
    pub url: String,
    pub error: String,
}

/// Outcome of the download stage.
#[derive(Debug, Default)]
pub struct DownloadReport {
    pub downloaded: Vec<DownloadedAsset>,
    pub failed: Vec<FailedDownload>,
    pub absent: Vec<AssetKind>,
}

impl DownloadReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    /// Names of the failed assets, for the final error message.
    pub fn failed_names(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.name.as_str()).collect()
    }
}

/// Download every asset present in the descriptor into `out_dir`.
///
/// Only filesystem setup can fail the stage as a whole; per-asset fetch and
/// write errors are collected in the report.
pub fn download_assets(
    service: &dyn WorldService,
    assets: &WorldAssets,
    out_dir: &Path,
) -> Result<DownloadReport> {
    std::fs::create_dir_all(out_dir)?;
    let mut report = DownloadReport::default();

    if assets.splat_urls.is_empty() {
        report.absent.push(AssetKind::Splat);
    } else {
        for (key, url) in &assets.splat_urls {
            let file_name = format!("splats_{}.spz", key);
            fetch_one(
                service,
                AssetKind::Splat,
                Some(key.clone()),
                url,
                &out_dir.join(&file_name),
                &mut report,
            );
        }
    }

    match &assets.collider_mesh_url {
        Some(url) => fetch_one(
            service,
            AssetKind::ColliderMesh,
            None,
            url,
            &out_dir.join("collider_mesh.glb"),
            &mut report,
        ),
        None => report.absent.push(AssetKind::ColliderMesh),
    }

    match &assets.pano_url {
        Some(url) => fetch_one(
            service,
            AssetKind::Pano,
            None,
            url,
            &out_dir.join("pano.jpg"),
            &mut report,
        ),
        None => report.absent.push(AssetKind::Pano),
    }

    match &assets.thumbnail_url {
        Some(url) => fetch_one(
            service,
            AssetKind::Thumbnail,
            None,
            url,
            &out_dir.join("thumbnail.jpg"),
            &mut report,
        ),
        None => report.absent.push(AssetKind::Thumbnail),
    }

    Ok(report)
}

fn fetch_one(
    service: &dyn WorldService,
    kind: AssetKind,
    variant: Option<String>,
    url: &str,
    path: &Path,
    report: &mut DownloadReport,
) {
    let name = match &variant {
        Some(key) => format!("splats_{}", key),
        None => kind.to_string(),
    };

    let outcome = service
        .fetch_asset(url)
        .and_then(|bytes| {
            std::fs::write(path, &bytes)?;
            Ok(ContentHash::from_bytes(&bytes))
        });

    match outcome {
        Ok(hash) => {
            println!("  Downloaded {} -> {}", name, path.display());
            report.downloaded.push(DownloadedAsset {
                kind,
                variant,
                local_path: path.to_string_lossy().to_string(),
                source_url: url.to_string(),
                content_hash: hash.to_prefixed_hex(),
            });
        }
        Err(e) => {
            eprintln!("  Download of {} failed: {}", name, e);
            report.failed.push(FailedDownload {
                name,
                url: url.to_string(),
                error: e.to_string(),
            });
        }
    }
}
