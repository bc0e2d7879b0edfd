//! Scripted in-memory service for stage tests. No network involved.

use crate::api::{MediaAssetRecord, Operation, OperationMetadata, PrepareUploadResponse, UploadInfo};
use crate::service::WorldService;
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use worldgen_core::{Result, WorldgenError};

/// A [`WorldService`] that replays scripted responses and records every
/// call, so tests can assert on call order and counts.
#[derive(Default)]
pub struct ScriptedService {
    prepared: RefCell<Vec<String>>,
    fail_uploads: RefCell<HashSet<String>>,
    statuses: RefCell<Vec<Operation>>,
    status_cursor: Cell<usize>,
    repeat_last: Cell<bool>,
    status_requests: Cell<usize>,
    generate_payload: RefCell<Option<Value>>,
    world: RefCell<Option<Value>>,
    fail_fetch: RefCell<HashSet<String>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    /// File names passed to prepare_upload, in call order.
    pub fn prepared_files(&self) -> Vec<String> {
        self.prepared.borrow().clone()
    }

    /// Make the signed-URL upload of one file name fail.
    pub fn fail_upload_of(&self, file_name: &str) {
        self.fail_uploads.borrow_mut().insert(file_name.to_string());
    }

    /// Queue the operation states to hand out, one per status request.
    pub fn script_statuses(&self, ops: Vec<Operation>) {
        *self.statuses.borrow_mut() = ops;
        self.status_cursor.set(0);
    }

    /// Keep returning the last scripted state once the queue is exhausted.
    pub fn repeat_last_status(&self) {
        self.repeat_last.set(true);
    }

    pub fn status_requests(&self) -> usize {
        self.status_requests.get()
    }

    pub fn last_generate_payload(&self) -> Option<Value> {
        self.generate_payload.borrow().clone()
    }

    pub fn set_world(&self, world: Value) {
        *self.world.borrow_mut() = Some(world);
    }

    /// Make downloads from one URL fail.
    pub fn fail_fetch_of(&self, url: &str) {
        self.fail_fetch.borrow_mut().insert(url.to_string());
    }
}

impl WorldService for ScriptedService {
    fn prepare_upload(
        &self,
        file_name: &str,
        _kind: &str,
        _extension: &str,
        _metadata: Value,
    ) -> Result<PrepareUploadResponse> {
        let index = self.prepared.borrow().len();
        self.prepared.borrow_mut().push(file_name.to_string());
        Ok(PrepareUploadResponse {
            media_asset: MediaAssetRecord {
                media_asset_id: format!("ma-{}", index),
            },
            upload_info: UploadInfo {
                upload_url: format!("https://upload.example.com/{}", file_name),
                required_headers: None,
            },
        })
    }

    fn upload_bytes(&self, upload: &UploadInfo, _data: &[u8], _content_type: &str) -> Result<()> {
        let failing = self
            .fail_uploads
            .borrow()
            .iter()
            .any(|name| upload.upload_url.ends_with(name.as_str()));
        if failing {
            return Err(WorldgenError::Fatal(format!(
                "PUT upload failed after 3 attempts: {}",
                upload.upload_url
            )));
        }
        Ok(())
    }

    fn generate_world(&self, payload: &Value) -> Result<String> {
        *self.generate_payload.borrow_mut() = Some(payload.clone());
        Ok("op-scripted".to_string())
    }

    fn get_operation(&self, operation_id: &str) -> Result<Operation> {
        self.status_requests.set(self.status_requests.get() + 1);
        let statuses = self.statuses.borrow();
        if statuses.is_empty() {
            return Err(WorldgenError::Fatal(format!(
                "No scripted states for operation {}",
                operation_id
            )));
        }

        let cursor = self.status_cursor.get();
        if cursor < statuses.len() {
            self.status_cursor.set(cursor + 1);
            Ok(statuses[cursor].clone())
        } else if self.repeat_last.get() {
            Ok(statuses[statuses.len() - 1].clone())
        } else {
            Err(WorldgenError::Fatal(format!(
                "Status trace exhausted after {} requests",
                cursor
            )))
        }
    }

    fn get_world(&self, _world_id: &str) -> Result<Value> {
        Ok(self.world.borrow().clone().unwrap_or_else(|| json!({})))
    }

    fn fetch_asset(&self, url: &str) -> Result<Vec<u8>> {
        if self.fail_fetch.borrow().contains(url) {
            return Err(WorldgenError::Fatal(format!(
                "GET asset failed after 3 attempts: {}",
                url
            )));
        }
        Ok(url.as_bytes().to_vec())
    }
}

pub fn op_pending(operation_id: &str) -> Operation {
    Operation {
        operation_id: operation_id.to_string(),
        ..Operation::default()
    }
}

pub fn op_running(operation_id: &str, world_id: &str) -> Operation {
    Operation {
        operation_id: operation_id.to_string(),
        metadata: Some(OperationMetadata {
            world_id: Some(world_id.to_string()),
        }),
        ..Operation::default()
    }
}

pub fn op_succeeded(operation_id: &str, world_id: &str, response: Option<Value>) -> Operation {
    Operation {
        operation_id: operation_id.to_string(),
        done: true,
        metadata: Some(OperationMetadata {
            world_id: Some(world_id.to_string()),
        }),
        response,
        ..Operation::default()
    }
}

pub fn op_failed(operation_id: &str, message: &str) -> Operation {
    Operation {
        operation_id: operation_id.to_string(),
        done: true,
        error: Some(json!({"message": message})),
        ..Operation::default()
    }
}
