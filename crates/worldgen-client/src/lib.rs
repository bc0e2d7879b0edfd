//! Worldgen Client - multi-image 3D world generation
//!
//! Drives a remote image-to-world generation service: uploads a set of
//! photos, submits one multi-image generation job, polls the resulting
//! long-running operation until it settles, and optionally downloads the
//! produced artifacts (splats, collider mesh, panorama, thumbnail) together
//! with a manifest recording identifiers and content hashes for the run.

pub mod api;
pub mod config;
pub mod download;
pub mod http;
pub mod job;
pub mod manifest;
pub mod run;
pub mod service;
pub mod upload;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{Operation, WorldAssets};
pub use config::{WorldgenConfig, API_KEY_ENV};
pub use download::{AssetKind, DownloadReport, DownloadedAsset};
pub use http::MarbleClient;
pub use job::{GenerateParams, GenerationJob, JobStatus, PollSettings};
pub use manifest::RunManifest;
pub use run::{run_generation, RunOptions, RunOutcome};
pub use service::WorldService;
pub use upload::MediaAsset;
