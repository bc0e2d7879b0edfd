//! Per-run manifest
//!
//! Records the identifiers and asset locations of one completed run:
//! operation id, media asset ids, world id, the asset URLs the service
//! reported, and the files actually written locally. A manifest is only
//! ever written once the generation has succeeded.

use crate::download::DownloadedAsset;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use worldgen_core::{now_iso8601, Result, WorldgenError};

pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Local record of one completed generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub generated_at: String,
    pub operation_id: String,
    pub model: String,
    pub media_asset_ids: Vec<String>,
    #[serde(default)]
    pub world_id: Option<String>,
    #[serde(default)]
    pub world_url: Option<String>,
    /// Present asset URLs by name (splats_<key>, collider_mesh, pano, thumbnail).
    #[serde(default)]
    pub asset_urls: BTreeMap<String, String>,
    /// Artifacts written locally, when downloads were requested.
    #[serde(default)]
    pub downloads: Vec<DownloadedAsset>,
}

impl RunManifest {
    pub fn new(operation_id: &str, model: &str, media_asset_ids: Vec<String>) -> Self {
        Self {
            generated_at: now_iso8601(),
            operation_id: operation_id.to_string(),
            model: model.to_string(),
            media_asset_ids,
            world_id: None,
            world_url: None,
            asset_urls: BTreeMap::new(),
            downloads: Vec::new(),
        }
    }

    /// Save the manifest, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| WorldgenError::Json(format!("Failed to serialize manifest: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| WorldgenError::Json(format!("Failed to parse manifest: {}", e)))
    }
}
