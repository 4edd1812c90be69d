//! JSONL sinks land under `LOG_DIR/RUN_ID`.
//!
//! The run context is process-global, so everything is checked from a single
//! test.

use std::fs;

use holdco::logging::{log_request, log_startup, log_state_change, run_dir, tick_aggregator, ProfileScope};
use serde_json::Value;
use tempfile::TempDir;

fn records(path: &std::path::Path) -> Vec<Value> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(|l| serde_json::from_str(l).expect("each line is JSON"))
        .collect()
}

#[test]
fn writes_manifest_and_event_records() {
    let tmp = TempDir::new().expect("tempdir");
    std::env::set_var("LOG_DIR", tmp.path());
    std::env::set_var("RUN_ID", "it-run");
    std::env::set_var("LOG_LEVEL", "trace");
    std::env::set_var("LOG_FLUSH_SECS", "0");
    std::env::remove_var("LOG_DOMAINS");
    std::env::remove_var("PROFILE_SAMPLE");

    let dir = run_dir();
    assert_eq!(dir, tmp.path().join("it-run"));

    log_startup("127.0.0.1:0", 10, "abc123");
    log_state_change("currency", "IDR", "USD");
    log_request("GET", "/company/zz9", 404, 512, 1.5);
    {
        let _scope = ProfileScope::new("render_home");
    }
    tick_aggregator();

    let manifest: Value =
        serde_json::from_str(&fs::read_to_string(dir.join("manifest.json")).expect("manifest")).expect("json");
    assert_eq!(manifest["run_id"], "it-run");
    assert_eq!(manifest["crate"], "holdco");

    let events = records(&dir.join("events.jsonl"));
    let startup = events.iter().find(|r| r["event"] == "startup").expect("startup record");
    assert_eq!(startup["lvl"], "INFO");
    assert_eq!(startup["component"], "system");
    assert_eq!(startup["msg"], "dashboard listening");
    assert_eq!(startup["data"]["companies"], 10);

    let change = events.iter().find(|r| r["event"] == "state_change").expect("state change");
    assert_eq!(change["data"]["to"], "USD");

    let request = events.iter().find(|r| r["event"] == "request").expect("request record");
    assert_eq!(request["lvl"], "WARN");
    assert_eq!(request["path"], "/company/zz9");
    assert_eq!(request["status"], 404);

    let seqs: Vec<u64> = events.iter().filter_map(|r| r["seq"].as_u64()).collect();
    assert!(seqs.windows(2).all(|w| w[0] < w[1]));

    let trace = records(&dir.join("trace.jsonl"));
    assert!(trace.iter().any(|r| r["event"] == "profile" && r["data"]["label"] == "render_home"));

    let metrics = records(&dir.join("metrics.jsonl"));
    let stats = metrics.iter().find(|r| r["event"] == "request_stats").expect("request stats");
    assert_eq!(stats["data"]["client_errors"], 1);
}
