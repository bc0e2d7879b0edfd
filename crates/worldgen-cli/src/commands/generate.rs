//! The generate command: one full upload → generate → poll → download run

use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use worldgen_client::job::{GenerateParams, PollSettings};
use worldgen_client::run::{run_generation, RunOptions};
use worldgen_client::{MarbleClient, WorldgenConfig};
use worldgen_core::{run_slug, Result, WorldgenError};

#[derive(Args)]
pub struct GenerateArgs {
    /// Directory containing input images (jpg/jpeg/png/webp)
    pub images_dir: PathBuf,

    /// Output directory (defaults to worldgen_out/<timestamp>)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Optional world display name
    #[arg(long)]
    pub display_name: Option<String>,

    /// Optional text guidance for the generation
    #[arg(long)]
    pub text_prompt: Option<String>,

    /// Model to use (overrides config; mini is cheaper/faster)
    #[arg(long)]
    pub model: Option<String>,

    /// How many images to use (max 4; max 8 with --reconstruct-images)
    #[arg(long, default_value = "4")]
    pub n_images: usize,

    /// Enable reconstruction mode (raises the image cap to 8)
    #[arg(long)]
    pub reconstruct_images: bool,

    /// Make the generated world public (default: private)
    #[arg(long)]
    pub public: bool,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Overall poll timeout in seconds (overrides config)
    #[arg(long)]
    pub timeout_s: Option<u64>,

    /// Seconds between status polls (overrides config)
    #[arg(long)]
    pub poll_interval_s: Option<u64>,

    /// Download returned assets (splats/mesh/pano/thumbnail) into the
    /// output directory
    #[arg(long)]
    pub download_assets: bool,
}

pub fn run(args: GenerateArgs) -> Result<()> {
    let config = WorldgenConfig::load()?;

    let out_dir = args
        .out_dir
        .unwrap_or_else(|| PathBuf::from("worldgen_out").join(run_slug()));

    let options = RunOptions {
        images_dir: args.images_dir,
        out_dir,
        n_images: args.n_images,
        download_assets: args.download_assets,
        params: GenerateParams {
            model: args.model.unwrap_or_else(|| config.model.clone()),
            display_name: args.display_name,
            text_prompt: args.text_prompt,
            reconstruct_images: args.reconstruct_images,
            public: args.public,
            seed: args.seed,
        },
        poll: PollSettings {
            interval: args
                .poll_interval_s
                .map(Duration::from_secs)
                .unwrap_or(config.poll_interval),
            timeout: args
                .timeout_s
                .map(Duration::from_secs)
                .unwrap_or(config.timeout),
        },
    };

    let client = MarbleClient::new(config.api_key, config.base_url);
    let outcome = run_generation(&client, &options)?;

    if let Some(world_id) = &outcome.manifest.world_id {
        println!("Done. world_id={}", world_id);
    }

    if let Some(report) = &outcome.report {
        println!(
            "Assets: {} downloaded, {} failed, {} absent",
            report.downloaded.len(),
            report.failed.len(),
            report.absent.len()
        );
        if !report.all_succeeded() {
            return Err(WorldgenError::Fatal(format!(
                "{} asset download(s) failed: {}",
                report.failed.len(),
                report.failed_names().join(", ")
            )));
        }
    }

    Ok(())
}
