//! HTTP client for the generation service
//!
//! Owns authentication and retry policy. Transient failures (rate limits,
//! 5xx, connection problems) are retried with exponential backoff up to a
//! bounded count, then escalated to a fatal error; authentication and other
//! client errors propagate immediately. The API key is held in memory only
//! and never printed.

use crate::api::{parse_generate_response, Operation, PrepareUploadResponse, UploadInfo};
use crate::service::WorldService;
use serde_json::Value;
use std::time::Duration;
use worldgen_core::{Result, WorldgenError};

pub const DEFAULT_BASE_URL: &str = "https://api.worldlabs.ai";
const API_KEY_HEADER: &str = "WLT-Api-Key";
const REQUEST_TIMEOUT_SECS: u64 = 60;
const DOWNLOAD_TIMEOUT_SECS: u64 = 300;
const MAX_RETRIES: usize = 3;
const RETRY_BASE_DELAY_MS: u64 = 500;

/// HTTP implementation of [`WorldService`].
pub struct MarbleClient {
    api_key: String,
    base_url: String,
}

impl MarbleClient {
    pub fn new(api_key: String, base_url: String) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self { api_key, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn post_json(&self, path: &str, payload: &Value) -> Result<Value> {
        let url = self.url(path);
        let mut response = with_retry(&format!("POST {}", path), || {
            build_agent(REQUEST_TIMEOUT_SECS)
                .post(&url)
                .header(API_KEY_HEADER, &self.api_key)
                .send_json(payload)
        })?;

        response
            .body_mut()
            .read_json::<Value>()
            .map_err(|e| WorldgenError::Json(format!("Invalid response from POST {}: {}", path, e)))
    }

    fn get_json(&self, path: &str) -> Result<Value> {
        let url = self.url(path);
        let mut response = with_retry(&format!("GET {}", path), || {
            build_agent(REQUEST_TIMEOUT_SECS)
                .get(&url)
                .header(API_KEY_HEADER, &self.api_key)
                .call()
        })?;

        response
            .body_mut()
            .read_json::<Value>()
            .map_err(|e| WorldgenError::Json(format!("Invalid response from GET {}: {}", path, e)))
    }
}

impl WorldService for MarbleClient {
    fn prepare_upload(
        &self,
        file_name: &str,
        kind: &str,
        extension: &str,
        metadata: Value,
    ) -> Result<PrepareUploadResponse> {
        let payload = serde_json::json!({
            "file_name": file_name,
            "kind": kind,
            "extension": extension,
            "metadata": metadata,
        });
        let body = self.post_json("/marble/v1/media-assets:prepare_upload", &payload)?;
        serde_json::from_value(body.clone()).map_err(|_| {
            WorldgenError::Fatal(format!("Unexpected prepare_upload response: {}", body))
        })
    }

    fn upload_bytes(&self, upload: &UploadInfo, data: &[u8], content_type: &str) -> Result<()> {
        // Signed URL: no API key, but any headers the service demands.
        with_retry("PUT upload", || {
            let mut request = build_agent(DOWNLOAD_TIMEOUT_SECS).put(&upload.upload_url);
            let mut has_content_type = false;
            if let Some(headers) = &upload.required_headers {
                for (name, value) in headers {
                    if name.eq_ignore_ascii_case("content-type") {
                        has_content_type = true;
                    }
                    request = request.header(name, value);
                }
            }
            if !has_content_type {
                request = request.header("Content-Type", content_type);
            }
            request.send(data)
        })?;
        Ok(())
    }

    fn generate_world(&self, payload: &Value) -> Result<String> {
        let body = self.post_json("/marble/v1/worlds:generate", payload)?;
        parse_generate_response(&body)
    }

    fn get_operation(&self, operation_id: &str) -> Result<Operation> {
        let body = self.get_json(&format!("/marble/v1/operations/{}", operation_id))?;
        serde_json::from_value(body.clone())
            .map_err(|_| WorldgenError::Fatal(format!("Unexpected operation response: {}", body)))
    }

    fn get_world(&self, world_id: &str) -> Result<Value> {
        self.get_json(&format!("/marble/v1/worlds/{}", world_id))
    }

    fn fetch_asset(&self, url: &str) -> Result<Vec<u8>> {
        let response = with_retry("GET asset", || {
            build_agent(DOWNLOAD_TIMEOUT_SECS).get(url).call()
        })?;

        let mut reader = response.into_body().into_reader();
        let mut bytes = Vec::new();
        std::io::Read::read_to_end(&mut reader, &mut bytes)
            .map_err(|e| WorldgenError::Fatal(format!("Failed to read asset body: {}", e)))?;
        Ok(bytes)
    }
}

/// Run a request, retrying transient failures with exponential backoff.
/// After retries are exhausted the transient error is escalated to fatal.
fn with_retry<T>(
    what: &str,
    mut request: impl FnMut() -> std::result::Result<T, ureq::Error>,
) -> Result<T> {
    let mut attempt = 0usize;
    loop {
        match request() {
            Ok(response) => return Ok(response),
            Err(e) => match classify(e, what) {
                WorldgenError::Transient(msg) => {
                    attempt += 1;
                    if attempt >= MAX_RETRIES {
                        return Err(WorldgenError::Fatal(format!(
                            "{} failed after {} attempts: {}",
                            what, attempt, msg
                        )));
                    }
                    sleep_backoff(attempt - 1);
                }
                other => return Err(other),
            },
        }
    }
}

/// Map a transport error onto the worldgen taxonomy.
fn classify(e: ureq::Error, what: &str) -> WorldgenError {
    match e {
        ureq::Error::StatusCode(code @ (401 | 403)) => {
            WorldgenError::Auth(format!("{}: API key rejected (HTTP {})", what, code))
        }
        ureq::Error::StatusCode(code) if matches!(code, 429 | 500 | 502 | 503 | 504) => {
            WorldgenError::Transient(format!("{}: HTTP {}", what, code))
        }
        ureq::Error::StatusCode(code) => WorldgenError::Fatal(format!("{}: HTTP {}", what, code)),
        ureq::Error::Timeout(_)
        | ureq::Error::Io(_)
        | ureq::Error::ConnectionFailed
        | ureq::Error::HostNotFound => WorldgenError::Transient(format!("{}: {}", what, e)),
        other => WorldgenError::Fatal(format!("{}: {}", what, other)),
    }
}

fn sleep_backoff(attempt: usize) {
    let delay_ms = RETRY_BASE_DELAY_MS.saturating_mul(1u64 << attempt);
    std::thread::sleep(Duration::from_millis(delay_ms));
}

fn build_agent(timeout_secs: u64) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(timeout_secs)))
        .build();
    config.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_auth() {
        let err = classify(ureq::Error::StatusCode(401), "POST /x");
        assert!(matches!(err, WorldgenError::Auth(_)));
        let err = classify(ureq::Error::StatusCode(403), "POST /x");
        assert!(matches!(err, WorldgenError::Auth(_)));
    }

    #[test]
    fn test_classify_transient_status_codes() {
        for code in [429u16, 500, 502, 503, 504] {
            let err = classify(ureq::Error::StatusCode(code), "GET /x");
            assert!(err.is_transient(), "HTTP {} should be transient", code);
        }
    }

    #[test]
    fn test_classify_other_status_is_fatal() {
        for code in [400u16, 404, 422] {
            let err = classify(ureq::Error::StatusCode(code), "GET /x");
            assert!(matches!(err, WorldgenError::Fatal(_)), "HTTP {}", code);
        }
    }

    #[test]
    fn test_classify_connection_failures_are_transient() {
        assert!(classify(ureq::Error::ConnectionFailed, "GET /x").is_transient());
        assert!(classify(ureq::Error::HostNotFound, "GET /x").is_transient());
    }

    #[test]
    fn test_retry_escalates_transient_to_fatal() {
        let mut calls = 0usize;
        let result: Result<()> = with_retry("GET /flaky", || {
            calls += 1;
            Err(ureq::Error::StatusCode(503))
        });
        assert_eq!(calls, MAX_RETRIES);
        match result {
            Err(WorldgenError::Fatal(msg)) => assert!(msg.contains("503")),
            other => panic!("expected fatal escalation, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_retry_does_not_touch_auth_errors() {
        let mut calls = 0usize;
        let result: Result<()> = with_retry("GET /private", || {
            calls += 1;
            Err(ureq::Error::StatusCode(401))
        });
        assert_eq!(calls, 1);
        assert!(matches!(result, Err(WorldgenError::Auth(_))));
    }

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let client = MarbleClient::new("k".into(), "https://api.example.com/".into());
        assert_eq!(client.url("/marble/v1/worlds/w-1"), "https://api.example.com/marble/v1/worlds/w-1");
    }
}
