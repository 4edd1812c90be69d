//! Page shell: sidebar navigation, topbar controls and the stylesheet.

use url::form_urlencoded;

use crate::model::Currency;
use crate::session::Role;
use crate::views::html::escape;
use crate::views::ViewContext;

pub const NAV_ITEMS: [(&str, &str); 6] = [
    ("Home", "/"),
    ("Portfolio", "/portfolio"),
    ("Company Detail", "/company/c1"),
    ("Initiatives", "/initiatives"),
    ("Risk & Compliance", "/risk"),
    ("Reports", "/reports"),
];

/// Exact match for `/`, prefix match for everything else.
pub fn is_active(item_path: &str, current: &str) -> bool {
    if item_path == "/" {
        current == "/"
    } else {
        current == item_path || current.starts_with(item_path)
    }
}

/// Link to `/state` applying `pairs` and returning to `return_to`.
pub fn state_href(pairs: &[(&str, &str)], return_to: &str) -> String {
    let mut ser = form_urlencoded::Serializer::new(String::new());
    for (k, v) in pairs {
        ser.append_pair(k, v);
    }
    ser.append_pair("return", return_to);
    format!("/state?{}", ser.finish())
}

/// Minutes since the dataset was loaded, as shown in the topbar.
pub fn refresh_label(ctx: &ViewContext) -> String {
    match (ctx.now - ctx.portfolio.loaded_at()).num_minutes() {
        m if m <= 0 => "just now".to_string(),
        1 => "1 min ago".to_string(),
        m if m < 60 => format!("{} mins ago", m),
        m => format!("{} h ago", m / 60),
    }
}

/// Share of companies whose feed is within the staleness window.
pub fn data_validity_pct(ctx: &ViewContext) -> Option<u32> {
    let companies = ctx.portfolio.companies();
    if companies.is_empty() {
        return None;
    }
    let fresh = companies
        .iter()
        .filter(|c| c.days_since_update(ctx.now) <= ctx.config.stale_after_days)
        .count();
    Some((fresh as f64 * 100.0 / companies.len() as f64).round() as u32)
}

fn sidebar(ctx: &ViewContext) -> String {
    let current = ctx.path();
    let links: String = NAV_ITEMS
        .iter()
        .map(|(name, path)| {
            let class = if is_active(path, current) { "nav-link active" } else { "nav-link" };
            format!(r#"<a class="{}" href="{}">{}</a>"#, class, path, escape(name))
        })
        .collect();
    let settings_class = if is_active("/settings", current) { "nav-link active" } else { "nav-link" };
    format!(
        r#"<aside class="sidebar">
  <div class="brand"><span class="brand-mark">N</span><span>NUSANTARA<br>GROUP</span></div>
  <div class="nav-caption">Command Center</div>
  <nav>{}</nav>
  <div class="nav-footer"><a class="{}" href="/settings">Settings</a></div>
</aside>"#,
        links, settings_class
    )
}

fn topbar(ctx: &ViewContext) -> String {
    let location = ctx.location.as_str();
    let currency_links: String = Currency::ALL
        .iter()
        .map(|c| {
            let class = if *c == ctx.state.currency() { "toggle active" } else { "toggle" };
            format!(
                r#"<a class="{}" href="{}">{}</a>"#,
                class,
                escape(&state_href(&[("currency", c.label())], location)),
                c.label()
            )
        })
        .collect();
    let role_options: String = Role::ALL
        .iter()
        .map(|r| {
            let sel = if *r == ctx.state.role() { " selected" } else { "" };
            format!(r#"<option value="{}"{}>{}</option>"#, escape(r.key()), sel, escape(r.label()))
        })
        .collect();
    let validity = data_validity_pct(ctx)
        .map(|p| format!("{}%", p))
        .unwrap_or_else(|| "n/a".to_string());

    format!(
        r#"<header class="topbar">
  <form class="search" method="get" action="/portfolio"><input type="search" name="q" placeholder="Search portfolio companies..."></form>
  <div class="indicators">
    <span class="pill">Last refresh: <b>{refresh}</b></span>
    <span class="pill pill-good">Data validity: <b>{validity}</b></span>
    <span class="pill">{range}</span>
  </div>
  <div class="controls">
    <div class="currency-toggle">{currency_links}</div>
    <form class="role" method="get" action="/state">
      <label>Viewing as <select name="role">{role_options}</select></label>
      <input type="hidden" name="return" value="{location}">
      <button type="submit" class="btn btn-small">Apply</button>
    </form>
  </div>
</header>"#,
        refresh = refresh_label(ctx),
        validity = validity,
        range = escape(ctx.state.date_range()),
        currency_links = currency_links,
        role_options = role_options,
        location = escape(location),
    )
}

/// Wraps a page body in the shell.
pub fn render(ctx: &ViewContext, title: &str, content: &str) -> String {
    TEMPLATE
        .replace("__TITLE__", &escape(title))
        .replace("__SIDEBAR__", &sidebar(ctx))
        .replace("__TOPBAR__", &topbar(ctx))
        .replace("__CONTENT__", content)
}

const TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>__TITLE__ · Nusantara Group</title>
  <style>
    :root {
      --bg: #f8f9fa; --bg-raised: #ffffff; --bg-side: #0f172a;
      --fg: #0f172a; --fg-muted: #64748b; --fg-side: #cbd5e1;
      --accent: #f59e0b; --accent-muted: rgba(245,158,11,0.1);
      --green: #059669; --green-muted: #ecfdf5;
      --red: #dc2626; --red-muted: #fef2f2;
      --yellow: #d97706; --yellow-muted: #fffbeb;
      --blue: #4f46e5; --blue-muted: #eef2ff;
      --border: #e2e8f0;
      --sans: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
      --mono: 'JetBrains Mono', 'SF Mono', monospace;
      --radius: 10px; --radius-sm: 4px;
    }
    *, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }
    body { font-family: var(--sans); background: var(--bg); color: var(--fg); display: flex; min-height: 100vh; font-size: 14px; }

    /* ── Sidebar ── */
    .sidebar { width: 240px; background: var(--bg-side); color: var(--fg-side); display: flex; flex-direction: column; flex-shrink: 0; }
    .brand { display: flex; align-items: center; gap: 0.75rem; padding: 1.5rem; color: #fff; font-family: Georgia, serif; font-weight: 600; letter-spacing: 0.08em; border-bottom: 1px solid rgba(255,255,255,0.05); }
    .brand-mark { width: 32px; height: 32px; display: inline-flex; align-items: center; justify-content: center; border: 1px solid rgba(245,158,11,0.3); color: var(--accent); font-style: italic; border-radius: var(--radius-sm); }
    .nav-caption { padding: 2rem 1.5rem 0.75rem; font-size: 10px; font-weight: 700; text-transform: uppercase; letter-spacing: 0.15em; color: var(--fg-muted); }
    nav { display: flex; flex-direction: column; gap: 0.25rem; padding: 0 0.75rem; flex: 1; }
    .nav-link { color: #94a3b8; text-decoration: none; padding: 0.6rem 0.75rem; border-radius: 6px; border: 1px solid transparent; }
    .nav-link:hover { color: #e2e8f0; background: rgba(255,255,255,0.05); }
    .nav-link.active { color: var(--accent); background: var(--accent-muted); border-color: rgba(245,158,11,0.2); }
    .nav-footer { padding: 1rem 0.75rem; border-top: 1px solid rgba(255,255,255,0.05); display: flex; flex-direction: column; }

    /* ── Topbar ── */
    .main { flex: 1; min-width: 0; display: flex; flex-direction: column; }
    .topbar { display: flex; align-items: center; gap: 1.5rem; padding: 1rem 2rem; background: rgba(255,255,255,0.7); border-bottom: 1px solid var(--border); flex-wrap: wrap; }
    .search input { width: 280px; padding: 0.5rem 0.75rem; border: 1px solid var(--border); border-radius: 6px; background: var(--bg); }
    .indicators { display: flex; gap: 0.75rem; flex: 1; font-size: 12px; color: var(--fg-muted); }
    .pill { padding: 0.25rem 0.6rem; border: 1px solid var(--border); border-radius: 6px; background: #fff; }
    .pill-good { background: var(--green-muted); color: #065f46; border-color: #d1fae5; }
    .controls { display: flex; align-items: center; gap: 1.25rem; }
    .currency-toggle { display: flex; background: #f1f5f9; padding: 3px; border-radius: 6px; border: 1px solid var(--border); }
    .toggle { padding: 0.2rem 0.7rem; font-size: 11px; font-weight: 700; color: var(--fg-muted); text-decoration: none; border-radius: var(--radius-sm); }
    .toggle.active { background: #fff; color: var(--fg); box-shadow: 0 1px 2px rgba(0,0,0,0.08); }
    .role label { font-size: 10px; font-weight: 700; text-transform: uppercase; color: #94a3b8; letter-spacing: 0.08em; }
    .role select { margin-left: 0.5rem; font-size: 13px; font-weight: 600; padding: 0.25rem; }

    /* ── Content ── */
    .content { padding: 2rem; max-width: 1280px; width: 100%; margin: 0 auto; display: flex; flex-direction: column; gap: 1.5rem; }
    .page-header { display: flex; justify-content: space-between; align-items: flex-end; }
    .page-header h1 { font-size: 1.5rem; letter-spacing: -0.01em; }
    .muted { color: var(--fg-muted); font-size: 13px; }
    .actions { display: flex; gap: 0.75rem; }
    .btn { padding: 0.5rem 1rem; border-radius: 6px; border: 1px solid var(--border); background: #fff; font-weight: 500; cursor: pointer; }
    .btn[disabled] { opacity: 0.55; cursor: not-allowed; }
    .btn-small { padding: 0.2rem 0.6rem; font-size: 12px; }
    .card { background: var(--bg-raised); border: 1px solid var(--border); border-radius: var(--radius); padding: 1.25rem; box-shadow: 0 1px 2px rgba(0,0,0,0.04); }
    .card h2 { font-size: 1rem; margin-bottom: 1rem; }
    .grid { display: grid; gap: 1.25rem; }
    .grid-2 { grid-template-columns: repeat(2, minmax(0, 1fr)); }
    .grid-3 { grid-template-columns: repeat(3, minmax(0, 1fr)); }
    .grid-4 { grid-template-columns: repeat(4, minmax(0, 1fr)); }
    .kpi-label { font-size: 11px; font-weight: 600; text-transform: uppercase; color: var(--fg-muted); letter-spacing: 0.05em; }
    .kpi-value { font-size: 1.4rem; font-weight: 700; margin: 0.35rem 0; font-variant-numeric: tabular-nums; }
    .trend-up { color: var(--green); font-size: 12px; font-weight: 600; }
    .trend-down { color: var(--red); font-size: 12px; font-weight: 600; }

    table { width: 100%; border-collapse: collapse; }
    th { text-align: left; font-size: 11px; text-transform: uppercase; color: var(--fg-muted); padding: 0.6rem 0.75rem; border-bottom: 1px solid var(--border); background: #f8fafc; }
    td { padding: 0.7rem 0.75rem; border-bottom: 1px solid #f1f5f9; vertical-align: top; }
    td.num { text-align: right; font-family: var(--mono); }
    td a { color: var(--fg); font-weight: 600; text-decoration: none; }
    td a:hover { color: var(--blue); }

    .badge { display: inline-block; padding: 0.1rem 0.5rem; border-radius: var(--radius-sm); font-size: 12px; font-weight: 600; }
    .tone-good { background: var(--green-muted); color: var(--green); }
    .tone-warning { background: var(--yellow-muted); color: var(--yellow); }
    .tone-danger { background: var(--red-muted); color: var(--red); }
    .tone-info { background: var(--blue-muted); color: var(--blue); }
    .tone-neutral { background: #f1f5f9; color: var(--fg-muted); }
    .bar { width: 100%; height: 6px; background: #f1f5f9; border-radius: 999px; overflow: hidden; }
    .bar-fill { height: 100%; border-radius: 999px; }
    .bar-fill.tone-good { background: var(--green); }
    .bar-fill.tone-warning { background: var(--yellow); }
    .bar-fill.tone-danger { background: var(--red); }
    .bar-fill.tone-info { background: var(--blue); }
    .bar-fill.tone-neutral { background: #94a3b8; }
    .empty { padding: 2rem; text-align: center; color: #94a3b8; border: 2px dashed var(--border); border-radius: var(--radius); }

    .alert { display: flex; gap: 0.75rem; padding: 0.75rem 0; border-bottom: 1px solid #f1f5f9; }
    .alert-meta { font-size: 12px; color: var(--fg-muted); }
    .filters { display: flex; gap: 0.75rem; flex-wrap: wrap; align-items: center; }
    .filters input, .filters select { padding: 0.45rem 0.6rem; border: 1px solid var(--border); border-radius: 6px; background: #fff; }
    .tabs { display: flex; gap: 1.5rem; border-bottom: 1px solid var(--border); }
    .tab { padding: 0.75rem 0; color: var(--fg-muted); text-decoration: none; border-bottom: 2px solid transparent; font-weight: 500; }
    .tab.active { color: var(--blue); border-bottom-color: var(--blue); }
    .kanban { display: grid; grid-template-columns: repeat(4, minmax(240px, 1fr)); gap: 1.25rem; overflow-x: auto; }
    .column h3 { font-size: 12px; text-transform: uppercase; color: #334155; letter-spacing: 0.05em; display: flex; justify-content: space-between; margin-bottom: 0.75rem; }
    .initiative { background: #fff; border: 1px solid var(--border); border-radius: var(--radius); margin-bottom: 0.9rem; overflow: hidden; }
    .initiative .stripe { height: 5px; }
    .initiative .body { padding: 0.9rem; display: flex; flex-direction: column; gap: 0.5rem; }
    .initiative .company { font-size: 10px; font-weight: 700; text-transform: uppercase; color: var(--fg-muted); }
    .over-budget { color: var(--red); font-weight: 700; }
    .decision { color: var(--yellow); font-weight: 700; font-size: 12px; }
    .split { display: flex; justify-content: space-between; font-size: 12px; color: var(--fg-muted); }
    .heat { display: inline-block; min-width: 52px; text-align: center; padding: 0.2rem 0.45rem; border-radius: var(--radius-sm); font-weight: 700; font-size: 12px; }
    form.inert input { background: #f8fafc; }
  </style>
</head>
<body>
__SIDEBAR__
<div class="main">
__TOPBAR__
<main class="content">
__CONTENT__
</main>
</div>
</body>
</html>
"##;
