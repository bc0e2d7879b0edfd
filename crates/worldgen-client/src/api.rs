//! Wire schema of the generation service
//!
//! Request payloads are built with `serde_json::json!` at the call sites;
//! this module holds the typed response shapes the client relies on plus
//! pure extraction helpers for the loosely structured parts (asset URLs can
//! appear either on the world record or on the operation's response
//! snapshot, and splats are keyed by resolution).

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use worldgen_core::{Result, WorldgenError};

/// Response to a prepare-upload request: the remote media asset record plus
/// a signed URL (and any headers it requires) to PUT the bytes to.
#[derive(Debug, Clone, Deserialize)]
pub struct PrepareUploadResponse {
    pub media_asset: MediaAssetRecord,
    pub upload_info: UploadInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaAssetRecord {
    pub media_asset_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadInfo {
    pub upload_url: String,
    #[serde(default)]
    pub required_headers: Option<BTreeMap<String, String>>,
}

/// A long-running generation operation as reported by the service.
///
/// `done` plus `error` encode the terminal states; `metadata.world_id`
/// appears once the service has allocated the world being generated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub operation_id: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub metadata: Option<OperationMetadata>,
    #[serde(default)]
    pub response: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationMetadata {
    #[serde(default)]
    pub world_id: Option<String>,
}

impl Operation {
    pub fn world_id(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.world_id.as_deref())
            .filter(|id| !id.is_empty())
    }

    /// The remote failure reason, verbatim, if the operation failed.
    pub fn failure_reason(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }
}

/// Parse a worlds:generate response into its operation id.
pub fn parse_generate_response(body: &Value) -> Result<String> {
    body.get("operation_id")
        .and_then(|v| v.as_str())
        .filter(|id| !id.is_empty())
        .map(|id| id.to_string())
        .ok_or_else(|| {
            WorldgenError::Fatal(format!("Unexpected generate response: {}", body))
        })
}

/// The named output asset URLs of a completed generation. Any subset may be
/// absent; splats come as a map keyed by resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorldAssets {
    pub splat_urls: BTreeMap<String, String>,
    pub collider_mesh_url: Option<String>,
    pub pano_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl WorldAssets {
    /// Extract asset URLs from an `assets` object.
    pub fn from_value(assets: &Value) -> Self {
        let mut out = WorldAssets::default();

        if let Some(url) = assets.get("thumbnail_url").and_then(|v| v.as_str()) {
            if !url.is_empty() {
                out.thumbnail_url = Some(url.to_string());
            }
        }

        if let Some(url) = assets
            .get("imagery")
            .and_then(|i| i.get("pano_url"))
            .and_then(|v| v.as_str())
        {
            if !url.is_empty() {
                out.pano_url = Some(url.to_string());
            }
        }

        if let Some(url) = assets
            .get("mesh")
            .and_then(|m| m.get("collider_mesh_url"))
            .and_then(|v| v.as_str())
        {
            if !url.is_empty() {
                out.collider_mesh_url = Some(url.to_string());
            }
        }

        if let Some(spz) = assets
            .get("splats")
            .and_then(|s| s.get("spz_urls"))
            .and_then(|v| v.as_object())
        {
            for (key, url) in spz {
                if let Some(url) = url.as_str() {
                    if !url.is_empty() {
                        out.splat_urls.insert(key.clone(), url.to_string());
                    }
                }
            }
        }

        out
    }

    pub fn is_empty(&self) -> bool {
        self.splat_urls.is_empty()
            && self.collider_mesh_url.is_none()
            && self.pano_url.is_none()
            && self.thumbnail_url.is_none()
    }

    /// Present asset URLs as `(name, url)` pairs for the manifest, in a
    /// stable order.
    pub fn named_urls(&self) -> Vec<(String, String)> {
        let mut urls = Vec::new();
        for (key, url) in &self.splat_urls {
            urls.push((format!("splats_{}", key), url.clone()));
        }
        if let Some(url) = &self.collider_mesh_url {
            urls.push(("collider_mesh".to_string(), url.clone()));
        }
        if let Some(url) = &self.pano_url {
            urls.push(("pano".to_string(), url.clone()));
        }
        if let Some(url) = &self.thumbnail_url {
            urls.push(("thumbnail".to_string(), url.clone()));
        }
        urls
    }
}

/// Find the asset descriptor for a completed world. The service exposes it
/// either on the fetched world record (`world.assets`) or, as a snapshot, on
/// the operation response itself.
pub fn extract_assets(world: Option<&Value>, operation_response: Option<&Value>) -> WorldAssets {
    if let Some(assets) = world
        .and_then(|w| w.get("world"))
        .and_then(|w| w.get("assets"))
    {
        return WorldAssets::from_value(assets);
    }
    if let Some(assets) = operation_response.and_then(|r| r.get("assets")) {
        return WorldAssets::from_value(assets);
    }
    WorldAssets::default()
}

/// Viewer URL of a fetched world record, when present.
pub fn extract_world_url(world: &Value) -> Option<String> {
    world
        .get("world")
        .and_then(|w| w.get("world_marble_url"))
        .or_else(|| world.get("world_marble_url"))
        .and_then(|v| v.as_str())
        .filter(|u| !u.is_empty())
        .map(|u| u.to_string())
}
