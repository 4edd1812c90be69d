//! HTTP front end.
//!
//! Routing is a pure function from [`Request`] to [`Response`] so it can be
//! driven without sockets; [`serve`] owns the listener, the socket IO and all
//! request logging.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use url::Url;

use crate::config::Config;
use crate::logging::{
    log, log_connection_error, log_request, log_state_change, obj, tick_aggregator, v_str, Domain,
    Level, ProfileScope,
};
use crate::model::Currency;
use crate::seed::Portfolio;
use crate::session::{AppProvider, AppState, Role, StateHandle};
use crate::views::company::{render_not_found, CompanyView};
use crate::views::home::HomeView;
use crate::views::initiatives::InitiativesView;
use crate::views::portfolio::PortfolioView;
use crate::views::reports::ReportsView;
use crate::views::risk::RiskView;
use crate::views::settings::SettingsView;
use crate::views::{layout, ViewContext};

/// Largest request head accepted before the connection is rejected.
pub const MAX_HEAD_BYTES: usize = 16 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: String,
    /// Path and query as sent.
    pub target: String,
    pub path: String,
    params: Vec<(String, String)>,
}

impl Request {
    /// Parses the request line of a head; header lines are ignored.
    pub fn parse(head: &str) -> Result<Self> {
        let line = head.lines().next().ok_or_else(|| anyhow!("empty request"))?;
        let mut parts = line.split_whitespace();
        let (Some(method), Some(target), Some(version), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            bail!("malformed request line: {:?}", line);
        };
        if !version.starts_with("HTTP/1.") {
            bail!("unsupported protocol {:?}", version);
        }
        Self::new(method, target)
    }

    pub fn get(target: &str) -> Result<Self> {
        Self::new("GET", target)
    }

    fn new(method: &str, target: &str) -> Result<Self> {
        if !target.starts_with('/') || target.starts_with("//") {
            bail!("request target must be an absolute path: {:?}", target);
        }
        let url = Url::parse(&format!("http://localhost{}", target))
            .with_context(|| format!("invalid request target {:?}", target))?;
        Ok(Self {
            method: method.to_string(),
            target: target.to_string(),
            path: url.path().to_string(),
            params: url.query_pairs().into_owned().collect(),
        })
    }

    /// First value of a query parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

/// One UI-state setter applied while handling a request.
#[derive(Debug, Clone, PartialEq)]
pub struct StateChange {
    pub field: &'static str,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
    pub state_changes: Vec<StateChange>,
}

impl Response {
    fn new(status: u16, content_type: &'static str, body: String) -> Self {
        Self { status, content_type, headers: Vec::new(), body, state_changes: Vec::new() }
    }

    pub fn html(status: u16, body: String) -> Self {
        Self::new(status, "text/html; charset=utf-8", body)
    }

    pub fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self::new(status, "application/json", body),
            Err(err) => Self::text(500, &format!("serialization failed: {}", err)),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self::new(status, "text/plain; charset=utf-8", body.to_string())
    }

    pub fn redirect(location: &str) -> Self {
        let mut resp = Self::text(303, "See Other");
        resp.headers.push(("Location", location.to_string()));
        resp
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Serialized HTTP/1.1 response; the connection always closes after it.
    pub fn to_http(&self) -> Vec<u8> {
        let mut head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n",
            self.status,
            reason(self.status),
            self.content_type,
            self.body.len()
        );
        for (name, value) in &self.headers {
            // A value that would end the header line is dropped.
            if value.contains(['\r', '\n']) {
                continue;
            }
            head.push_str(&format!("{}: {}\r\n", name, value));
        }
        head.push_str("\r\n");
        let mut out = head.into_bytes();
        out.extend_from_slice(self.body.as_bytes());
        out
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        303 => "See Other",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Only same-site absolute paths without control characters are followed
/// after a state change.
fn safe_return(raw: Option<&str>) -> &str {
    match raw {
        Some(r)
            if r.starts_with('/')
                && !r.starts_with("//")
                && !r.contains('\\')
                && !r.chars().any(char::is_control) =>
        {
            r
        }
        _ => "/",
    }
}

/// The dashboard application: dataset, configuration and UI state.
pub struct Dashboard {
    portfolio: Portfolio,
    config: Config,
    provider: AppProvider,
}

impl Dashboard {
    pub fn new(portfolio: Portfolio, config: Config) -> Self {
        let provider = AppProvider::new(AppState::from_config(&config));
        Self { portfolio, config, provider }
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> StateHandle {
        self.provider.handle()
    }

    pub fn handle(&self, req: &Request) -> Response {
        if req.method != "GET" {
            let mut resp = Response::text(405, "Method Not Allowed");
            resp.headers.push(("Allow", "GET".to_string()));
            return resp;
        }

        let ctx = ViewContext::new(
            &self.portfolio,
            &self.config,
            self.state().snapshot(),
            Utc::now(),
            req.target.clone(),
        );
        let path = match req.path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        let segments: Vec<&str> = path.split('/').skip(1).collect();

        match segments.as_slice() {
            [""] => {
                let view = HomeView::build(&ctx);
                page(&ctx, view.title, &view.render())
            }
            ["portfolio"] => {
                let view = PortfolioView::build(&ctx, req.param("q"), req.param("sector"), req.param("status"));
                page(&ctx, "Portfolio", &view.render())
            }
            ["company", id] => match CompanyView::build(&ctx, id, req.param("tab")) {
                Some(view) => page(&ctx, &view.name, &view.render()),
                None => {
                    let mut resp = page(&ctx, "Company Not Found", &render_not_found(id));
                    resp.status = 404;
                    resp
                }
            },
            ["initiatives"] => {
                let view = InitiativesView::build(&ctx, req.param("q"), req.param("sector"));
                page(&ctx, "Initiatives", &view.render())
            }
            ["risk"] => page(&ctx, "Risk & Compliance", &RiskView::build(&ctx).render()),
            ["reports"] => page(&ctx, "Reports", &ReportsView::build(&ctx).render()),
            ["settings"] => page(&ctx, "Settings", &SettingsView::build(&ctx).render()),
            ["state"] => self.apply_state(req),

            ["api", "health"] => Response::json(
                200,
                &json!({
                    "status": "ok",
                    "companies": self.portfolio.len(),
                    "fingerprint": self.portfolio.fingerprint(),
                }),
            ),
            ["api", "home"] => Response::json(200, &HomeView::build(&ctx)),
            ["api", "portfolio"] => Response::json(
                200,
                &PortfolioView::build(&ctx, req.param("q"), req.param("sector"), req.param("status")),
            ),
            ["api", "company", id] => match CompanyView::build(&ctx, id, req.param("tab")) {
                Some(view) => Response::json(200, &view),
                None => Response::json(404, &json!({ "error": "company not found", "id": id })),
            },
            ["api", "initiatives"] => {
                Response::json(200, &InitiativesView::build(&ctx, req.param("q"), req.param("sector")))
            }
            ["api", "risk"] => Response::json(200, &RiskView::build(&ctx)),
            ["api", "reports"] => Response::json(200, &ReportsView::build(&ctx)),
            ["api", "settings"] => Response::json(200, &SettingsView::build(&ctx)),
            ["api", "state"] => Response::json(200, &ctx.state),
            ["api", ..] => Response::json(404, &json!({ "error": "not found", "path": req.path })),
            _ => {
                let body = format!(
                    r#"<section class="card empty"><h1>Page Not Found</h1><p>Nothing lives at {}.</p><p><a class="btn" href="/">Back to Home</a></p></section>"#,
                    crate::views::html::escape(&req.path)
                );
                let mut resp = page(&ctx, "Page Not Found", &body);
                resp.status = 404;
                resp
            }
        }
    }

    /// `/state`: applies the recognised setters and redirects back.
    fn apply_state(&self, req: &Request) -> Response {
        let handle = self.state();
        let mut changes = Vec::new();

        if let Some(currency) = req.param("currency").and_then(Currency::parse) {
            let from = handle.currency();
            if from != currency {
                handle.set_currency(currency);
                changes.push(StateChange { field: "currency", from: from.label().into(), to: currency.label().into() });
            }
        }
        if let Some(role) = req.param("role").and_then(Role::parse) {
            let from = handle.role();
            if from != role {
                handle.set_role(role);
                changes.push(StateChange { field: "role", from: from.key().into(), to: role.key().into() });
            }
        }
        if let Some(range) = req.param("range").map(str::trim).filter(|r| !r.is_empty()) {
            let from = handle.date_range();
            if from != range {
                handle.set_date_range(range);
                changes.push(StateChange { field: "date_range", from, to: range.to_string() });
            }
        }

        let mut resp = Response::redirect(safe_return(req.param("return")));
        resp.state_changes = changes;
        resp
    }
}

fn page(ctx: &ViewContext, title: &str, content: &str) -> Response {
    Response::html(200, layout::render(ctx, title, content))
}

// =============================================================================
// Socket IO
// =============================================================================

pub async fn bind(config: &Config) -> Result<TcpListener> {
    let addr = config.listen_addr();
    TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))
}

/// Accept loop. Connections are handled one at a time; a failed connection is
/// logged and skipped.
pub async fn serve(dashboard: Arc<Dashboard>, listener: TcpListener) -> Result<()> {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(err) => {
                log_connection_error("accept", &anyhow::Error::new(err));
                continue;
            }
        };
        if let Err(err) = handle_connection(&dashboard, stream).await {
            log_connection_error(&peer.to_string(), &err);
        }
        tick_aggregator();
    }
}

pub async fn handle_connection(dashboard: &Dashboard, mut stream: TcpStream) -> Result<()> {
    let started = Instant::now();
    let read_timeout = Duration::from_millis(dashboard.config.read_timeout_ms);
    let head = tokio::time::timeout(read_timeout, read_head(&mut stream))
        .await
        .context("timed out reading request head")??;

    let (method, path, response) = match Request::parse(&head) {
        Ok(req) => {
            let _scope = ProfileScope::with_context("handle_request", &[("path", v_str(&req.path))]);
            let resp = dashboard.handle(&req);
            (req.method, req.path, resp)
        }
        Err(err) => {
            log(
                Level::Warn,
                Domain::Http,
                "bad_request",
                obj(&[("error", v_str(&format!("{:#}", err)))]),
            );
            ("-".to_string(), "-".to_string(), Response::text(400, "Bad Request"))
        }
    };

    for change in &response.state_changes {
        log_state_change(change.field, &change.from, &change.to);
    }

    stream
        .write_all(&response.to_http())
        .await
        .context("failed to write response")?;
    let _ = stream.shutdown().await;

    log_request(
        &method,
        &path,
        response.status,
        response.body.len(),
        started.elapsed().as_secs_f64() * 1000.0,
    );
    Ok(())
}

/// Reads up to the blank line ending the request head.
pub async fn read_head<R: AsyncRead + Unpin>(reader: &mut R) -> Result<String> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    loop {
        let n = reader.read(&mut chunk).await.context("failed to read request")?;
        if n == 0 {
            if buf.is_empty() {
                bail!("connection closed before a request was sent");
            }
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            buf.truncate(end);
            break;
        }
        if buf.len() > MAX_HEAD_BYTES {
            bail!("request head exceeds {} bytes", MAX_HEAD_BYTES);
        }
    }
    String::from_utf8(buf).context("request head is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_request_line_and_query() {
        let req = Request::parse("GET /portfolio?q=baja&sector=All HTTP/1.1\r\nHost: x").unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/portfolio");
        assert_eq!(req.param("q"), Some("baja"));
        assert_eq!(req.param("sector"), Some("All"));
        assert_eq!(req.param("status"), None);
    }

    #[test]
    fn decodes_form_encoded_params() {
        let req = Request::get("/state?range=Q3+2026&role=Risk%20Officer").unwrap();
        assert_eq!(req.param("range"), Some("Q3 2026"));
        assert_eq!(req.param("role"), Some("Risk Officer"));
    }

    #[test]
    fn rejects_malformed_heads() {
        assert!(Request::parse("").is_err());
        assert!(Request::parse("GET /").is_err());
        assert!(Request::parse("GET / HTTP/1.1 extra").is_err());
        assert!(Request::parse("GET http://evil/ HTTP/1.1").is_err());
        assert!(Request::parse("GET //evil HTTP/1.1").is_err());
        assert!(Request::parse("GET / SPDY/3").is_err());
    }

    #[test]
    fn return_target_must_be_local() {
        assert_eq!(safe_return(Some("/risk?x=1")), "/risk?x=1");
        assert_eq!(safe_return(Some("//evil.example")), "/");
        assert_eq!(safe_return(Some("https://evil.example")), "/");
        assert_eq!(safe_return(Some("/\\evil")), "/");
        assert_eq!(safe_return(None), "/");
        assert_eq!(safe_return(Some("/\r\nSet-Cookie: a=1")), "/");
        assert_eq!(safe_return(Some("/risk\n")), "/");
        assert_eq!(safe_return(Some("/risk\u{7f}")), "/");
    }

    #[test]
    fn header_values_with_line_breaks_are_not_written() {
        let mut resp = Response::text(200, "ok");
        resp.headers.push(("Location", "/\r\nSet-Cookie: a=1".to_string()));
        let raw = String::from_utf8(resp.to_http()).unwrap();
        assert!(!raw.contains("Set-Cookie"));
        assert!(!raw.contains("Location"));
        assert!(raw.ends_with("Connection: close\r\n\r\nok"));
    }

    #[test]
    fn response_serializes_headers_and_length() {
        let raw = String::from_utf8(Response::redirect("/risk").to_http()).unwrap();
        assert!(raw.starts_with("HTTP/1.1 303 See Other\r\n"));
        assert!(raw.contains("Location: /risk\r\n"));
        assert!(raw.contains("Content-Length: 9\r\n"));
        assert!(raw.ends_with("\r\n\r\nSee Other"));
    }

    #[tokio::test]
    async fn read_head_stops_at_blank_line() {
        let mut input: &[u8] = b"GET / HTTP/1.1\r\nHost: a\r\n\r\nignored body";
        let head = read_head(&mut input).await.unwrap();
        assert_eq!(head, "GET / HTTP/1.1\r\nHost: a");
    }

    #[tokio::test]
    async fn read_head_rejects_oversized_and_empty() {
        let big = vec![b'a'; MAX_HEAD_BYTES + 10];
        let mut input: &[u8] = &big;
        assert!(read_head(&mut input).await.is_err());
        let mut empty: &[u8] = b"";
        assert!(read_head(&mut empty).await.is_err());
    }
}
