//! Small HTML building blocks shared by the pages.

use crate::model::Tone;

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn badge(label: &str, tone: Tone) -> String {
    format!(r#"<span class="badge {}">{}</span>"#, tone.css_class(), escape(label))
}

/// Horizontal bar; `pct` is clamped to 0..=100.
pub fn bar(pct: f64, tone: Tone) -> String {
    let width = if pct.is_finite() { pct.clamp(0.0, 100.0) } else { 0.0 };
    format!(
        r#"<div class="bar"><div class="bar-fill {}" style="width:{:.1}%"></div></div>"#,
        tone.css_class(),
        width
    )
}

/// Rendered for every action without a backend.
pub fn inert_button(label: &str) -> String {
    format!(
        r#"<button type="button" class="btn" disabled title="Not available in this build">{}</button>"#,
        escape(label)
    )
}

pub fn empty_state(message: &str) -> String {
    format!(r#"<div class="empty">{}</div>"#, escape(message))
}

pub fn page_header(title: &str, subtitle: &str, actions: &str) -> String {
    format!(
        r#"<div class="page-header"><div><h1>{}</h1><p class="muted">{}</p></div><div class="actions">{}</div></div>"#,
        escape(title),
        escape(subtitle),
        actions
    )
}

/// `<select>` with an "All" option followed by `options`.
pub fn select(name: &str, all_label: &str, options: &[&str], selected: Option<&str>) -> String {
    let mut out = format!(r#"<select name="{}"><option value="All">{}</option>"#, escape(name), escape(all_label));
    for opt in options {
        let sel = if Some(*opt) == selected { " selected" } else { "" };
        out.push_str(&format!(
            r#"<option value="{0}"{1}>{0}</option>"#,
            escape(opt),
            sel
        ));
    }
    out.push_str("</select>");
    out
}

pub fn card(title: &str, inner: &str) -> String {
    format!(
        r#"<section class="card"><h2>{}</h2>{}</section>"#,
        escape(title),
        inner
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<a href="x">R&D's</a>"#), "&lt;a href=&quot;x&quot;&gt;R&amp;D&#39;s&lt;/a&gt;");
    }

    #[test]
    fn bar_is_clamped() {
        assert!(bar(110.0, Tone::Danger).contains("width:100.0%"));
        assert!(bar(-5.0, Tone::Good).contains("width:0.0%"));
        assert!(bar(f64::NAN, Tone::Good).contains("width:0.0%"));
    }

    #[test]
    fn select_marks_current_value() {
        let html = select("sector", "All Sectors", &["FMCG", "Logistics"], Some("Logistics"));
        assert!(html.contains(r#"<option value="Logistics" selected>"#));
        assert!(!html.contains(r#"<option value="FMCG" selected>"#));
    }
}
