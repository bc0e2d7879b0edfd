//! Service trait seam
//!
//! The pipeline stages (upload, submit/poll, download) talk to the remote
//! service through this trait so they can be exercised against a scripted
//! implementation in tests. `MarbleClient` is the HTTP implementation.

use crate::api::{Operation, PrepareUploadResponse, UploadInfo};
use serde_json::Value;
use worldgen_core::Result;

/// One endpoint set of the generation service.
pub trait WorldService {
    /// Register an upload, receiving a media asset id and a signed URL.
    fn prepare_upload(
        &self,
        file_name: &str,
        kind: &str,
        extension: &str,
        metadata: Value,
    ) -> Result<PrepareUploadResponse>;

    /// PUT raw bytes to a signed upload URL.
    fn upload_bytes(&self, upload: &UploadInfo, data: &[u8], content_type: &str) -> Result<()>;

    /// Submit a generation request; returns the operation id.
    fn generate_world(&self, payload: &Value) -> Result<String>;

    /// Fetch the current state of a long-running operation.
    fn get_operation(&self, operation_id: &str) -> Result<Operation>;

    /// Fetch a world record by id.
    fn get_world(&self, world_id: &str) -> Result<Value>;

    /// Download one output artifact from its (signed) URL.
    fn fetch_asset(&self, url: &str) -> Result<Vec<u8>>;
}
