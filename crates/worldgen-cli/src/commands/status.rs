//! The status command: inspect a previously submitted operation

use worldgen_client::job::JobStatus;
use worldgen_client::service::WorldService;
use worldgen_client::{MarbleClient, WorldgenConfig};
use worldgen_core::Result;

pub fn run(operation_id: &str) -> Result<()> {
    let config = WorldgenConfig::load()?;
    let client = MarbleClient::new(config.api_key, config.base_url);

    let op = client.get_operation(operation_id)?;
    let status = JobStatus::from_operation(&op);

    println!("Operation: {}", operation_id);
    println!("Status:    {}", status);
    if let Some(world_id) = op.world_id() {
        println!("World:     {}", world_id);
    }
    if let Some(reason) = op.failure_reason() {
        println!("Failure:   {}", reason);
    }

    Ok(())
}
