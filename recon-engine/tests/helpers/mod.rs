//! Test Helper Utilities
//!
//! Shared mock-pipeline setup for recon-engine integration tests

#![allow(dead_code)]

use recon_common::config::HttpSettings;
use recon_engine::config::{EndpointSet, PollingSettings, QueueConfig, ReconConfig};
use recon_engine::services::PipelineClient;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path prefix the mock queue lives under
pub const QUEUE_PREFIX: &str = "/EURO";

pub const SUBMIT: &str = "subir";
pub const PARSE: &str = "procesar";
pub const SYNC: &str = "sincronizar";
pub const RECONCILE: &str = "reconciliar";

/// Full mock path of one stage
pub fn stage_path(stage: &str) -> String {
    format!("{}/{}", QUEUE_PREFIX, stage)
}

/// Endpoint set pointing at the mock server
pub fn endpoints_for(server: &MockServer) -> EndpointSet {
    EndpointSet::from_base(&format!("{}{}", server.uri(), QUEUE_PREFIX))
}

/// Polling knobs with millisecond intervals
pub fn fast_polling() -> PollingSettings {
    PollingSettings {
        sync_max_attempts: 3,
        sync_interval_ms: 5,
        reconcile_interval_ms: 5,
        ..PollingSettings::default()
    }
}

pub fn fast_http() -> HttpSettings {
    HttpSettings {
        timeout_secs: 5,
        ..HttpSettings::default()
    }
}

/// Single-queue config ("euro" rules) routed at the mock server
pub fn test_config(server: &MockServer) -> ReconConfig {
    let defaults = ReconConfig::default();
    let euro_rules = defaults
        .queue("euro")
        .map(|queue| queue.rules.clone())
        .unwrap_or_default();

    ReconConfig {
        http: fast_http(),
        polling: fast_polling(),
        queues: vec![QueueConfig::new("euro", endpoints_for(server), euro_rules)],
        ..defaults
    }
}

pub fn client_for(server: &MockServer) -> PipelineClient {
    PipelineClient::new(endpoints_for(server), &fast_http()).unwrap()
}

/// Parse-trigger body with a single step
pub fn parse_body(processed: u64, failed: u64) -> Value {
    json!({
        "processes": [
            {"steps": [{"processed_record": processed, "failed_record": failed}]}
        ]
    })
}

/// Synchronize body (list-wrapped, as the remote API answers)
pub fn sync_body(processed: u64, failed: u64) -> Value {
    json!([{"processed_record": processed, "failed_record": failed}])
}

/// Reconcile body listing `count` ids
pub fn reconcile_body(count: usize) -> Value {
    Value::Array((0..count).map(|i| json!(format!("id-{}", i))).collect())
}

/// `n` newline-terminated data lines
pub fn file_lines(n: usize) -> Vec<u8> {
    (0..n)
        .map(|i| format!("REC{:04}|100.00|PEN\n", i))
        .collect::<String>()
        .into_bytes()
}

/// Mount a stage answering `body` as JSON on every call
pub async fn mount_json(server: &MockServer, stage: &str, body: Value) {
    Mock::given(method("POST"))
        .and(path(stage_path(stage)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount a stage answering `body` for the next `times` calls only
///
/// Mounted first, so it takes precedence over later mounts for the same stage.
pub async fn mount_json_times(server: &MockServer, stage: &str, body: Value, times: u64) {
    Mock::given(method("POST"))
        .and(path(stage_path(stage)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .up_to_n_times(times)
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, stage: &str, status: u16, body: &str) {
    Mock::given(method("POST"))
        .and(path(stage_path(stage)))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// Happy-path pipeline: accepted upload, given parse/sync counts, `reconciled` ids
pub async fn mount_pipeline(server: &MockServer, processed: u64, failed: u64, reconciled: usize) {
    mount_status(server, SUBMIT, 200, "uploaded").await;
    mount_json(server, PARSE, parse_body(processed, failed)).await;
    mount_json(server, SYNC, sync_body(processed, failed)).await;
    mount_json(server, RECONCILE, reconcile_body(reconciled)).await;
}

/// Number of requests the server received for one stage
pub async fn calls_to(server: &MockServer, stage: &str) -> usize {
    let wanted = stage_path(stage);
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == wanted)
        .count()
}

/// Address that refuses connections
pub const UNREACHABLE_BASE: &str = "http://127.0.0.1:1/EURO";
