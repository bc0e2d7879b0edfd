//! Job submission and polling
//!
//! Submits one multi-image generation request and watches the resulting
//! long-running operation. Status transitions are driven entirely by the
//! remote service; this side only observes. The loop polls at a fixed
//! interval until the operation settles or the overall budget is exhausted.

use crate::api::Operation;
use crate::service::WorldService;
use crate::upload::MediaAsset;
use serde_json::json;
use std::time::{Duration, Instant};
use worldgen_core::{now_iso8601, Result, WorldgenError};

/// Observed status of a generation operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn from_operation(op: &Operation) -> Self {
        if op.done {
            if op.error.is_some() {
                JobStatus::Failed
            } else {
                JobStatus::Succeeded
            }
        } else if op.world_id().is_some() {
            JobStatus::Running
        } else {
            JobStatus::Pending
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Running => "RUNNING",
            JobStatus::Succeeded => "SUCCEEDED",
            JobStatus::Failed => "FAILED",
        };
        write!(f, "{}", s)
    }
}

/// Request parameters for one generation.
#[derive(Debug, Clone)]
pub struct GenerateParams {
    pub model: String,
    pub display_name: Option<String>,
    pub text_prompt: Option<String>,
    pub reconstruct_images: bool,
    pub public: bool,
    pub seed: Option<u64>,
}

/// A submitted generation job, identified by its remote operation id.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub operation_id: String,
    pub media_asset_ids: Vec<String>,
    pub submitted_at: String,
}

/// Polling policy for one invocation.
#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

/// Submit a multi-image generation job referencing the uploaded media, in
/// upload order.
pub fn submit_job(
    service: &dyn WorldService,
    assets: &[MediaAsset],
    params: &GenerateParams,
) -> Result<GenerationJob> {
    if assets.is_empty() {
        return Err(WorldgenError::Input(
            "Cannot submit a generation job without uploaded images".to_string(),
        ));
    }

    let items: Vec<_> = assets
        .iter()
        .map(|a| {
            json!({
                "azimuth": a.azimuth,
                "content": {"source": "media_asset", "media_asset_id": a.id},
            })
        })
        .collect();

    let mut world_prompt = json!({
        "type": "multi-image",
        "multi_image_prompt": items,
        "reconstruct_images": params.reconstruct_images,
    });
    if let Some(text) = &params.text_prompt {
        world_prompt["text_prompt"] = json!(text);
    }

    let mut payload = json!({
        "world_prompt": world_prompt,
        "model": params.model,
        "permission": {"public": params.public},
    });
    if let Some(name) = &params.display_name {
        payload["display_name"] = json!(name);
    }
    if let Some(seed) = params.seed {
        payload["seed"] = json!(seed);
    }

    let operation_id = service.generate_world(&payload)?;
    Ok(GenerationJob {
        operation_id,
        media_asset_ids: assets.iter().map(|a| a.id.clone()).collect(),
        submitted_at: now_iso8601(),
    })
}

/// Poll the operation at a fixed interval until it succeeds or fails,
/// or until the overall timeout elapses.
///
/// Returns the final operation on success; a failed operation surfaces the
/// remote reason verbatim.
pub fn wait_for_completion(
    service: &dyn WorldService,
    operation_id: &str,
    settings: &PollSettings,
) -> Result<Operation> {
    let start = Instant::now();
    let mut last_status = None;

    loop {
        let op = service.get_operation(operation_id)?;
        let status = JobStatus::from_operation(&op);

        if last_status != Some(status) {
            println!("  Status: {}", status);
            last_status = Some(status);
        }

        match status {
            JobStatus::Succeeded => return Ok(op),
            JobStatus::Failed => {
                let reason = op
                    .failure_reason()
                    .unwrap_or_else(|| "unknown remote failure".to_string());
                return Err(WorldgenError::JobFailed(reason));
            }
            JobStatus::Pending | JobStatus::Running => {
                let waited = start.elapsed();
                if waited >= settings.timeout {
                    return Err(WorldgenError::Timeout {
                        operation_id: operation_id.to_string(),
                        waited_secs: waited.as_secs_f64(),
                    });
                }
                std::thread::sleep(settings.interval);
            }
        }
    }
}
