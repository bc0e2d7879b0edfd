//! One end-to-end generation run
//!
//! Sequences the stages for a single invocation: collect and upload images,
//! submit the job, poll to completion, fetch the world record, optionally
//! download assets, and write the run manifest. Control flow is strictly
//! sequential; the only blocking points are network calls and the poll wait.

use crate::api::{extract_assets, extract_world_url};
use crate::download::{download_assets, DownloadReport};
use crate::job::{submit_job, wait_for_completion, GenerateParams, PollSettings};
use crate::manifest::{RunManifest, MANIFEST_FILE_NAME};
use crate::service::WorldService;
use crate::upload::{collect_images, upload_images};
use std::path::PathBuf;
use worldgen_core::Result;

/// Image cap per generation; reconstruction mode raises it.
pub const MAX_IMAGES: usize = 4;
pub const MAX_IMAGES_RECONSTRUCT: usize = 8;

/// Everything one invocation needs.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub images_dir: PathBuf,
    pub out_dir: PathBuf,
    pub n_images: usize,
    pub download_assets: bool,
    pub params: GenerateParams,
    pub poll: PollSettings,
}

/// What a successful run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub manifest_path: PathBuf,
    pub manifest: RunManifest,
    pub report: Option<DownloadReport>,
}

/// Run the whole pipeline. The manifest is written only once the job has
/// succeeded; a failed or timed-out job leaves no manifest behind.
pub fn run_generation(service: &dyn WorldService, opts: &RunOptions) -> Result<RunOutcome> {
    let images = collect_images(&opts.images_dir)?;

    let cap = if opts.params.reconstruct_images {
        MAX_IMAGES_RECONSTRUCT
    } else {
        MAX_IMAGES
    };
    let n = opts.n_images.max(1).min(cap).min(images.len());
    let selected = &images[..n];

    println!("Uploading {} of {} images...", n, images.len());
    let assets = upload_images(service, selected)?;

    let job = submit_job(service, &assets, &opts.params)?;
    println!("Started generation. operation_id={}", job.operation_id);

    let op = wait_for_completion(service, &job.operation_id, &opts.poll)?;

    // The world record carries the viewer URL and the fullest asset list,
    // but the operation's response snapshot is enough to proceed if the
    // extra fetch fails.
    let world = match op.world_id() {
        Some(world_id) => match service.get_world(world_id) {
            Ok(world) => Some(world),
            Err(e) => {
                eprintln!("Warning: could not fetch world {}: {}", world_id, e);
                None
            }
        },
        None => None,
    };

    let world_assets = extract_assets(world.as_ref(), op.response.as_ref());

    let mut manifest = RunManifest::new(
        &job.operation_id,
        &opts.params.model,
        job.media_asset_ids.clone(),
    );
    manifest.world_id = op.world_id().map(|id| id.to_string());
    manifest.world_url = world.as_ref().and_then(extract_world_url);
    manifest.asset_urls = world_assets.named_urls().into_iter().collect();

    let report = if opts.download_assets {
        let assets_dir = opts.out_dir.join("assets");
        let report = download_assets(service, &world_assets, &assets_dir)?;
        manifest.downloads = report.downloaded.clone();
        Some(report)
    } else {
        None
    };

    let manifest_path = opts.out_dir.join(MANIFEST_FILE_NAME);
    manifest.save(&manifest_path)?;
    println!("Wrote manifest: {}", manifest_path.display());
    if let Some(url) = &manifest.world_url {
        println!("World URL: {}", url);
    }

    Ok(RunOutcome {
        manifest_path,
        manifest,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{op_failed, op_pending, op_running, op_succeeded, ScriptedService};
    use serde_json::json;
    use std::path::Path;
    use std::time::Duration;
    use worldgen_core::WorldgenError;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("worldgen_run_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_images(dir: &Path, names: &[&str]) {
        for name in names {
            std::fs::write(dir.join(name), name.as_bytes()).unwrap();
        }
    }

    fn options(root: &Path, download: bool) -> RunOptions {
        RunOptions {
            images_dir: root.join("images"),
            out_dir: root.join("out"),
            n_images: 4,
            download_assets: download,
            params: GenerateParams {
                model: "Marble 0.1-plus".to_string(),
                display_name: None,
                text_prompt: None,
                reconstruct_images: false,
                public: false,
                seed: None,
            },
            poll: PollSettings {
                interval: Duration::ZERO,
                timeout: Duration::from_secs(60),
            },
        }
    }

    fn response_with_assets() -> serde_json::Value {
        json!({"assets": {
            "thumbnail_url": "https://cdn/thumb.jpg",
            "mesh": {"collider_mesh_url": "https://cdn/collider.glb"},
            "splats": {"spz_urls": {"full": "https://cdn/full.spz"}}
        }})
    }

    #[test]
    fn test_full_run_with_downloads() {
        let root = temp_dir();
        std::fs::create_dir_all(root.join("images")).unwrap();
        write_images(&root.join("images"), &["a.jpg", "b.jpg"]);

        let service = ScriptedService::new();
        service.script_statuses(vec![
            op_pending("op-scripted"),
            op_running("op-scripted", "w-1"),
            op_succeeded("op-scripted", "w-1", Some(response_with_assets())),
        ]);

        let outcome = run_generation(&service, &options(&root, true)).unwrap();

        assert!(outcome.manifest_path.exists());
        assert_eq!(outcome.manifest.media_asset_ids.len(), 2);
        assert_eq!(outcome.manifest.world_id.as_deref(), Some("w-1"));
        // splats_full + collider_mesh + thumbnail present, pano absent
        assert_eq!(outcome.manifest.asset_urls.len(), 3);
        assert!(root.join("out/assets/splats_full.spz").exists());
        assert!(root.join("out/assets/collider_mesh.glb").exists());
        assert!(root.join("out/assets/thumbnail.jpg").exists());

        let report = outcome.report.unwrap();
        assert!(report.all_succeeded());
        assert_eq!(report.downloaded.len(), 3);

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_manifest_reflects_partial_download_failure() {
        let root = temp_dir();
        std::fs::create_dir_all(root.join("images")).unwrap();
        write_images(&root.join("images"), &["a.jpg"]);

        let service = ScriptedService::new();
        service.script_statuses(vec![op_succeeded(
            "op-scripted",
            "w-1",
            Some(response_with_assets()),
        )]);
        service.fail_fetch_of("https://cdn/full.spz");

        let outcome = run_generation(&service, &options(&root, true)).unwrap();
        let report = outcome.report.unwrap();

        assert_eq!(report.downloaded.len(), 2);
        assert_eq!(report.failed_names(), vec!["splats_full"]);
        // Manifest still written, recording the two successful downloads.
        assert!(outcome.manifest_path.exists());
        assert_eq!(outcome.manifest.downloads.len(), 2);

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_no_manifest_for_failed_job() {
        let root = temp_dir();
        std::fs::create_dir_all(root.join("images")).unwrap();
        write_images(&root.join("images"), &["a.jpg"]);

        let service = ScriptedService::new();
        service.script_statuses(vec![op_failed("op-scripted", "bad overlap")]);

        let err = run_generation(&service, &options(&root, true)).unwrap_err();
        assert!(matches!(err, WorldgenError::JobFailed(_)));
        assert!(!root.join("out").join(MANIFEST_FILE_NAME).exists());

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_no_manifest_on_timeout() {
        let root = temp_dir();
        std::fs::create_dir_all(root.join("images")).unwrap();
        write_images(&root.join("images"), &["a.jpg"]);

        let service = ScriptedService::new();
        service.script_statuses(vec![op_running("op-scripted", "w-1")]);
        service.repeat_last_status();

        let mut opts = options(&root, false);
        opts.poll.timeout = Duration::ZERO;

        let err = run_generation(&service, &opts).unwrap_err();
        assert!(matches!(err, WorldgenError::Timeout { .. }));
        assert!(!root.join("out").join(MANIFEST_FILE_NAME).exists());

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_image_cap_without_reconstruction() {
        let root = temp_dir();
        std::fs::create_dir_all(root.join("images")).unwrap();
        write_images(
            &root.join("images"),
            &["a.jpg", "b.jpg", "c.jpg", "d.jpg", "e.jpg", "f.jpg"],
        );

        let service = ScriptedService::new();
        service.script_statuses(vec![op_succeeded("op-scripted", "w-1", None)]);

        let mut opts = options(&root, false);
        opts.n_images = 6;

        let outcome = run_generation(&service, &opts).unwrap();
        assert_eq!(outcome.manifest.media_asset_ids.len(), MAX_IMAGES);

        std::fs::remove_dir_all(&root).ok();
    }
}
