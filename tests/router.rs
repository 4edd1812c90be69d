//! Router tests: every route driven through `Dashboard::handle` without a
//! socket.

use holdco::config::Config;
use holdco::model::Currency;
use holdco::seed::Portfolio;
use holdco::server::{Dashboard, Request, Response};
use holdco::session::Role;
use serde_json::Value;

fn dashboard() -> Dashboard {
    Dashboard::new(Portfolio::seed(), Config::default())
}

fn get(d: &Dashboard, target: &str) -> Response {
    let req = Request::get(target).unwrap_or_else(|e| panic!("bad target {}: {}", target, e));
    d.handle(&req)
}

fn get_json(d: &Dashboard, target: &str) -> (u16, Value) {
    let resp = get(d, target);
    assert_eq!(resp.content_type, "application/json", "{} is not JSON", target);
    let body: Value = serde_json::from_str(&resp.body).expect("valid JSON");
    (resp.status, body)
}

#[test]
fn every_page_renders_inside_the_layout() {
    let d = dashboard();
    for (target, title) in [
        ("/", "Group Overview"),
        ("/portfolio", "Portfolio"),
        ("/company/c1", "Nusantara Energy"),
        ("/initiatives", "Initiatives"),
        ("/risk", "Risk &amp; Compliance"),
        ("/reports", "Reports"),
        ("/settings", "Settings"),
    ] {
        let resp = get(&d, target);
        assert_eq!(resp.status, 200, "{}", target);
        assert!(resp.content_type.starts_with("text/html"));
        assert!(
            resp.body.contains(&format!("<title>{} · Nusantara Group</title>", title)),
            "{} missing title {}",
            target,
            title
        );
        assert!(resp.body.contains(r#"<aside class="sidebar">"#));
    }
}

#[test]
fn active_nav_link_follows_route() {
    let d = dashboard();
    let body = get(&d, "/risk").body;
    assert!(body.contains(r#"<a class="nav-link active" href="/risk">"#));
    assert!(body.contains(r#"<a class="nav-link" href="/">"#));
}

#[test]
fn trailing_slash_is_ignored() {
    let d = dashboard();
    assert_eq!(get(&d, "/portfolio/").status, 200);
}

#[test]
fn unknown_company_renders_not_found_view() {
    let d = dashboard();
    let resp = get(&d, "/company/zz9");
    assert_eq!(resp.status, 404);
    assert!(resp.body.contains("Company Not Found"));
    assert!(resp.body.contains(r#"href="/portfolio">Return to Portfolio</a>"#));

    let (status, body) = get_json(&d, "/api/company/zz9");
    assert_eq!(status, 404);
    assert_eq!(body["error"], "company not found");
    assert_eq!(body["id"], "zz9");
}

#[test]
fn unknown_paths_are_404() {
    let d = dashboard();
    assert_eq!(get(&d, "/nowhere").status, 404);
    let (status, body) = get_json(&d, "/api/nowhere");
    assert_eq!(status, 404);
    assert_eq!(body["path"], "/api/nowhere");
}

#[test]
fn non_get_is_rejected() {
    let d = dashboard();
    let req = Request::parse("POST /state?currency=USD HTTP/1.1\r\nHost: x").unwrap();
    let resp = d.handle(&req);
    assert_eq!(resp.status, 405);
    assert_eq!(resp.header("Allow"), Some("GET"));
    assert_eq!(d.state().currency(), Currency::Idr);
}

#[test]
fn health_reports_dataset() {
    let d = dashboard();
    let (status, body) = get_json(&d, "/api/health");
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["companies"], 10);
    assert_eq!(body["fingerprint"], d.portfolio().fingerprint());
}

#[test]
fn state_route_applies_setters_and_redirects() {
    let d = dashboard();
    let resp = get(&d, "/state?currency=USD&role=Risk+Officer&range=Q3+2026&return=%2Fportfolio%3Fsector%3DLogistics");
    assert_eq!(resp.status, 303);
    assert_eq!(resp.header("Location"), Some("/portfolio?sector=Logistics"));
    let fields: Vec<&str> = resp.state_changes.iter().map(|c| c.field).collect();
    assert_eq!(fields, vec!["currency", "role", "date_range"]);

    let handle = d.state();
    assert_eq!(handle.currency(), Currency::Usd);
    assert_eq!(handle.role(), Role::RiskOfficer);
    assert_eq!(handle.date_range(), "Q3 2026");

    let (_, state) = get_json(&d, "/api/state");
    assert_eq!(state["currency"], "USD");
    assert_eq!(state["role"], "Risk Officer");
    assert_eq!(state["dateRange"], "Q3 2026");

    let (_, company) = get_json(&d, "/api/company/c1?tab=performance");
    assert!(company["content"]["revenue"]["value"]
        .as_str()
        .unwrap_or_default()
        .starts_with('$'));
}

#[test]
fn state_route_ignores_unknown_values_and_foreign_returns() {
    let d = dashboard();
    let resp = get(&d, "/state?currency=EUR&role=intern&return=%2F%2Fevil.example");
    assert_eq!(resp.status, 303);
    assert_eq!(resp.header("Location"), Some("/"));
    assert!(resp.state_changes.is_empty());
    assert_eq!(d.state().currency(), Currency::Idr);
    assert_eq!(d.state().role(), Role::Ceo);
}

#[test]
fn encoded_line_breaks_in_return_cannot_add_headers() {
    let d = dashboard();
    let resp = get(&d, "/state?currency=USD&return=%2F%0D%0ASet-Cookie:%20session=1");
    assert_eq!(resp.status, 303);
    assert_eq!(resp.header("Location"), Some("/"));
    assert_eq!(d.state().currency(), Currency::Usd);

    let raw = String::from_utf8(resp.to_http()).expect("utf-8");
    let head = raw.split("\r\n\r\n").next().unwrap_or_default();
    assert!(head.ends_with("\r\nLocation: /"));
    assert!(!raw.contains("Set-Cookie"));

    let resp = get(&d, "/state?return=%2Frisk%0Ax");
    assert_eq!(resp.header("Location"), Some("/"));
}

#[test]
fn repeating_a_setter_records_no_change() {
    let d = dashboard();
    assert_eq!(get(&d, "/state?currency=USD").state_changes.len(), 1);
    assert!(get(&d, "/state?currency=usd").state_changes.is_empty());
}

#[test]
fn portfolio_api_filters_by_status_in_seed_order() {
    let d = dashboard();
    let (_, body) = get_json(&d, "/api/portfolio?status=Intervention&sector=All");
    let ids: Vec<&str> = body["rows"]
        .as_array()
        .expect("rows")
        .iter()
        .filter_map(|r| r["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["c3", "c8"]);
    assert_eq!(body["shown"], 2);
    assert_eq!(body["total"], 10);
}

#[test]
fn initiatives_api_groups_into_four_columns() {
    let d = dashboard();
    let (_, body) = get_json(&d, "/api/initiatives");
    let counts: Vec<u64> = body["columns"]
        .as_array()
        .expect("columns")
        .iter()
        .filter_map(|c| c["count"].as_u64())
        .collect();
    assert_eq!(counts, vec![0, 7, 2, 1]);
}

#[test]
fn risk_api_summarises_register() {
    let d = dashboard();
    let (_, body) = get_json(&d, "/api/risk");
    assert_eq!(body["register"]["openRisks"], 11);
    assert_eq!(body["register"]["avgCompliance"], 87);
    assert_eq!(body["register"]["critical"].as_array().map(Vec::len), Some(4));
}

#[test]
fn company_tab_falls_back_to_performance() {
    let d = dashboard();
    let (_, body) = get_json(&d, "/api/company/c3?tab=bogus");
    assert_eq!(body["tab"], "Performance");
    assert_eq!(body["content"]["kind"], "performance");
    let html = get(&d, "/company/c3?tab=people").body;
    assert!(html.contains("under development"));
}

#[test]
fn reports_subscription_tracks_role() {
    let d = dashboard();
    assert!(get(&d, "/reports").body.contains("Weekly CEO Brief every Monday"));
    get(&d, "/state?role=BU+CEO&return=%2Freports");
    let (_, body) = get_json(&d, "/api/reports");
    assert!(body["subscription"]
        .as_str()
        .unwrap_or_default()
        .contains("Monthly Holding Pack"));
}
