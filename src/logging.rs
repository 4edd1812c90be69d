//! Structured JSONL logging for the dashboard server.
//!
//! Every record is one JSON object on stdout and in the run directory
//! (`LOG_DIR/<run_id>/`):
//! - `events.jsonl` for info and above
//! - `trace.jsonl` for trace/debug
//! - `metrics.jsonl` for `request_stats` and profiling records
//!
//! `LOG_LEVEL` sets the minimum level, `LOG_DOMAINS` a comma-separated
//! domain allow-list (default all).

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

// =============================================================================
// Levels and domains
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl Level {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "fatal" => Some(Level::Fatal),
            _ => None,
        }
    }

    pub fn from_env() -> Self {
        std::env::var("LOG_LEVEL")
            .ok()
            .and_then(|v| Level::parse(&v))
            .unwrap_or(Level::Info)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Http,    // request lifecycle, connection errors
    View,    // page rendering
    Data,    // seed load, validation
    State,   // currency / role / range changes
    System,  // startup, shutdown, aggregates
    Profile, // timing
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Http => "http",
            Domain::View => "view",
            Domain::Data => "data",
            Domain::State => "state",
            Domain::System => "system",
            Domain::Profile => "profile",
        }
    }

    pub fn enabled_in(&self, allow_list: Option<&str>) -> bool {
        match allow_list {
            None | Some("all") | Some("") => true,
            Some(list) => list.split(',').any(|d| d.trim() == self.as_str()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled_in(std::env::var("LOG_DOMAINS").ok().as_deref())
    }
}

// =============================================================================
// Run context
// =============================================================================

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static PROFILE_SEQ: AtomicU64 = AtomicU64::new(0);
static RUN_CONTEXT: OnceLock<RunContext> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

type Sink = Option<Mutex<BufWriter<File>>>;

#[derive(Debug)]
struct RunContext {
    run_id: String,
    run_dir: PathBuf,
    events: Sink,
    trace: Sink,
    metrics: Sink,
}

fn open_sink(path: PathBuf) -> Sink {
    match File::create(&path) {
        Ok(f) => Some(Mutex::new(BufWriter::new(f))),
        Err(err) => {
            eprintln!("[log] cannot open {}: {}", path.display(), err);
            None
        }
    }
}

fn ensure_run_context() -> &'static RunContext {
    RUN_CONTEXT.get_or_init(|| {
        let run_id = std::env::var("RUN_ID")
            .unwrap_or_else(|_| format!("holdco-{}-{}", ts_epoch_ms(), process::id()));
        let base = std::env::var("LOG_DIR").unwrap_or_else(|_| "out/runs".to_string());
        let run_dir = PathBuf::from(base).join(&run_id);
        if let Err(err) = create_dir_all(&run_dir) {
            eprintln!("[log] cannot create run dir {}: {}", run_dir.display(), err);
        }

        let manifest = json!({
            "run_id": run_id,
            "ts": ts_now(),
            "pid": process::id(),
            "crate": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "log_dir": run_dir.to_string_lossy(),
        });
        let _ = std::fs::write(run_dir.join("manifest.json"), manifest.to_string());

        RunContext {
            events: open_sink(run_dir.join("events.jsonl")),
            trace: open_sink(run_dir.join("trace.jsonl")),
            metrics: open_sink(run_dir.join("metrics.jsonl")),
            run_id,
            run_dir,
        }
    })
}

/// Directory of the current run, creating it on first use.
pub fn run_dir() -> PathBuf {
    ensure_run_context().run_dir.clone()
}

fn write_line(sink: &Sink, line: &str) {
    if let Some(writer) = sink {
        if let Ok(mut w) = writer.lock() {
            let _ = writeln!(w, "{}", line);
            let _ = w.flush();
        }
    }
}

fn sanitize_fields(mut fields: Map<String, Value>) -> Map<String, Value> {
    for key in ["authorization", "cookie", "set-cookie"] {
        if fields.contains_key(key) {
            fields.insert(key.to_string(), v_str("[REDACTED]"));
        }
    }
    fields
}

/// Correlation keys are lifted out of `data` to the top level.
fn split_fields(mut fields: Map<String, Value>) -> (Map<String, Value>, Map<String, Value>) {
    let mut top = Map::new();
    for key in ["method", "path", "status", "company_id", "msg"] {
        if let Some(value) = fields.remove(key) {
            top.insert(key.to_string(), value);
        }
    }
    (top, fields)
}

// =============================================================================
// Core
// =============================================================================

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn ts_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// Emit a structured log entry if `level` and `domain` pass the env filters.
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    if level < Level::from_env() || !domain.is_enabled() {
        return;
    }
    emit_record(level, domain.as_str(), event, fields);
}

/// Assemble one record without writing it.
pub fn build_record(
    run_id: &str,
    seq: u64,
    level: Level,
    component: &str,
    event: &str,
    fields: Map<String, Value>,
) -> Value {
    let (mut top, data) = split_fields(sanitize_fields(fields));
    let msg = top.remove("msg").unwrap_or_else(|| v_str(""));

    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("run_id".to_string(), json!(run_id));
    entry.insert("seq".to_string(), json!(seq));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("component".to_string(), json!(component));
    entry.insert("event".to_string(), json!(event));
    entry.insert("msg".to_string(), msg);
    for (k, v) in top {
        entry.insert(k, v);
    }
    entry.insert("data".to_string(), Value::Object(data));
    Value::Object(entry)
}

fn emit_record(level: Level, component: &str, event: &str, fields: Map<String, Value>) {
    let ctx = ensure_run_context();
    let line = build_record(&ctx.run_id, next_seq(), level, component, event, fields).to_string();

    if event == "request_stats" || component == Domain::Profile.as_str() {
        write_line(&ctx.metrics, &line);
    }
    match level {
        Level::Trace | Level::Debug => write_line(&ctx.trace, &line),
        _ => write_line(&ctx.events, &line),
    }
    println!("{}", line);
}

// =============================================================================
// Dashboard helpers
// =============================================================================

pub fn log_startup(addr: &str, companies: usize, fingerprint: &str) {
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("msg", v_str("dashboard listening")),
            ("addr", v_str(addr)),
            ("companies", json!(companies)),
            ("fingerprint", v_str(fingerprint)),
            ("version", v_str(env!("CARGO_PKG_VERSION"))),
        ]),
    );
}

pub fn log_request(method: &str, path: &str, status: u16, bytes: usize, elapsed_ms: f64) {
    let level = if status >= 500 {
        Level::Error
    } else if status >= 400 {
        Level::Warn
    } else {
        Level::Info
    };
    log(
        level,
        Domain::Http,
        "request",
        obj(&[
            ("method", v_str(method)),
            ("path", v_str(path)),
            ("status", json!(status)),
            ("bytes", json!(bytes)),
            ("elapsed_ms", v_num(elapsed_ms)),
        ]),
    );
    record_request(status, elapsed_ms);
}

/// One UI-state setter applied through `/state`.
pub fn log_state_change(field: &str, from: &str, to: &str) {
    log(
        Level::Info,
        Domain::State,
        "state_change",
        obj(&[("field", v_str(field)), ("from", v_str(from)), ("to", v_str(to))]),
    );
}

pub fn log_connection_error(peer: &str, err: &anyhow::Error) {
    log(
        Level::Warn,
        Domain::Http,
        "connection_error",
        obj(&[("peer", v_str(peer)), ("error", v_str(&format!("{:#}", err)))]),
    );
}

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

// =============================================================================
// Profiling
// =============================================================================

/// Emits a `profile` record with the elapsed time when dropped.
pub struct ProfileScope {
    label: &'static str,
    context: Option<Map<String, Value>>,
    started: Instant,
    enabled: bool,
}

impl ProfileScope {
    pub fn new(label: &'static str) -> Self {
        Self::with_context(label, &[])
    }

    pub fn with_context(label: &'static str, fields: &[(&str, Value)]) -> Self {
        let enabled = should_sample(std::env::var("PROFILE_SAMPLE").ok().as_deref());
        Self {
            label,
            context: if enabled { Some(obj(fields)) } else { None },
            started: Instant::now(),
            enabled,
        }
    }
}

/// `PROFILE_SAMPLE` is a 0..1 fraction; unset means every scope.
fn should_sample(raw: Option<&str>) -> bool {
    match raw.and_then(|v| v.parse::<f64>().ok()) {
        None => true,
        Some(p) if p >= 1.0 => true,
        Some(p) if p <= 0.0 => false,
        Some(p) => {
            let seq = PROFILE_SEQ.fetch_add(1, Ordering::SeqCst);
            ((seq % 10_000) as f64 / 10_000.0) < p
        }
    }
}

impl Drop for ProfileScope {
    fn drop(&mut self) {
        if !self.enabled {
            return;
        }
        let mut fields = self.context.take().unwrap_or_default();
        fields.insert("label".to_string(), v_str(self.label));
        fields.insert("elapsed_ms".to_string(), v_num(self.started.elapsed().as_secs_f64() * 1000.0));
        log(Level::Trace, Domain::Profile, "profile", fields);
    }
}

// =============================================================================
// Request aggregator
// =============================================================================

static AGGREGATOR: OnceLock<Mutex<RequestAggregator>> = OnceLock::new();

fn aggregator() -> &'static Mutex<RequestAggregator> {
    AGGREGATOR.get_or_init(|| {
        let secs = std::env::var("LOG_FLUSH_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300);
        Mutex::new(RequestAggregator::new(secs))
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RequestStats {
    pub requests: u64,
    pub ok: u64,
    pub client_errors: u64,
    pub server_errors: u64,
    pub total_ms: f64,
    pub max_ms: f64,
}

impl RequestStats {
    pub fn mean_ms(&self) -> Option<f64> {
        if self.requests == 0 {
            None
        } else {
            Some(self.total_ms / self.requests as f64)
        }
    }
}

#[derive(Debug)]
pub struct RequestAggregator {
    stats: RequestStats,
    last_flush: Instant,
    flush_interval_secs: u64,
}

impl RequestAggregator {
    pub fn new(flush_interval_secs: u64) -> Self {
        Self {
            stats: RequestStats::default(),
            last_flush: Instant::now(),
            flush_interval_secs,
        }
    }

    pub fn record(&mut self, status: u16, elapsed_ms: f64) {
        let s = &mut self.stats;
        s.requests += 1;
        match status {
            500..=u16::MAX => s.server_errors += 1,
            400..=499 => s.client_errors += 1,
            _ => s.ok += 1,
        }
        s.total_ms += elapsed_ms;
        s.max_ms = s.max_ms.max(elapsed_ms);
    }

    /// Returns and resets the window once the flush interval has elapsed.
    pub fn maybe_flush(&mut self) -> Option<RequestStats> {
        if self.last_flush.elapsed().as_secs() < self.flush_interval_secs || self.stats.requests == 0 {
            return None;
        }
        self.last_flush = Instant::now();
        Some(std::mem::take(&mut self.stats))
    }
}

fn record_request(status: u16, elapsed_ms: f64) {
    if let Ok(mut agg) = aggregator().lock() {
        agg.record(status, elapsed_ms);
    }
}

/// Call periodically to emit `request_stats`.
pub fn tick_aggregator() {
    let flushed = match aggregator().lock() {
        Ok(mut agg) => agg.maybe_flush(),
        Err(_) => None,
    };
    if let Some(s) = flushed {
        log(
            Level::Info,
            Domain::System,
            "request_stats",
            obj(&[
                ("requests", json!(s.requests)),
                ("ok", json!(s.ok)),
                ("client_errors", json!(s.client_errors)),
                ("server_errors", json!(s.server_errors)),
                ("mean_ms", s.mean_ms().map(v_num).unwrap_or(Value::Null)),
                ("max_ms", v_num(s.max_ms)),
            ]),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Error < Level::Fatal);
        assert_eq!(Level::parse(" WARN "), Some(Level::Warn));
        assert_eq!(Level::parse("verbose"), None);
    }

    #[test]
    fn test_domain_allow_list() {
        assert!(Domain::Http.enabled_in(None));
        assert!(Domain::Http.enabled_in(Some("all")));
        assert!(Domain::State.enabled_in(Some("http, state")));
        assert!(!Domain::View.enabled_in(Some("http,state")));
    }

    #[test]
    fn test_record_lifts_correlation_keys() {
        let rec = build_record(
            "run-1",
            7,
            Level::Warn,
            "http",
            "request",
            obj(&[
                ("path", v_str("/company/c99")),
                ("status", json!(404)),
                ("msg", v_str("not found")),
                ("cookie", v_str("session=abc")),
                ("bytes", json!(12)),
            ]),
        );
        assert_eq!(rec["lvl"], "WARN");
        assert_eq!(rec["seq"], 7);
        assert_eq!(rec["path"], "/company/c99");
        assert_eq!(rec["status"], 404);
        assert_eq!(rec["msg"], "not found");
        assert_eq!(rec["data"]["bytes"], 12);
        assert_eq!(rec["data"]["cookie"], "[REDACTED]");
        assert!(rec["data"].get("path").is_none());
    }

    #[test]
    fn test_aggregator_counts_by_class() {
        let mut agg = RequestAggregator::new(0);
        assert!(agg.maybe_flush().is_none());
        agg.record(200, 2.0);
        agg.record(303, 1.0);
        agg.record(404, 3.0);
        agg.record(500, 6.0);
        let s = agg.maybe_flush().unwrap();
        assert_eq!((s.requests, s.ok, s.client_errors, s.server_errors), (4, 2, 1, 1));
        assert_eq!(s.mean_ms(), Some(3.0));
        assert_eq!(s.max_ms, 6.0);
        assert!(agg.maybe_flush().is_none());
    }

    #[test]
    fn test_sampling_bounds() {
        assert!(should_sample(None));
        assert!(should_sample(Some("1")));
        assert!(!should_sample(Some("0")));
        assert!(should_sample(Some("not-a-number")));
    }

    #[test]
    fn test_seq_increments() {
        let s1 = next_seq();
        let s2 = next_seq();
        assert!(s2 > s1);
    }
}
