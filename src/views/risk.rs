use serde::Serialize;

use crate::filter::{RiskRegister, RiskRow, WatchlistEntry};
use crate::model::Tone;
use crate::seed::AuditSchedule;
use crate::views::html::{card, empty_state, escape, inert_button, page_header};
use crate::views::ViewContext;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskView {
    pub register: RiskRegister,
    pub avg_compliance_tone: Tone,
    pub audits: AuditSchedule,
}

/// Average compliance is judged against the watchlist line, not the target.
fn average_tone(avg: Option<u32>, watch_below: u32) -> Tone {
    match avg {
        Some(a) if a >= 90 => Tone::Good,
        Some(a) if a >= watch_below => Tone::Warning,
        Some(_) => Tone::Danger,
        None => Tone::Neutral,
    }
}

fn watch_tone(score: u32) -> Tone {
    if score < 70 {
        Tone::Danger
    } else {
        Tone::Warning
    }
}

impl RiskView {
    pub fn build(ctx: &ViewContext) -> Self {
        let register = RiskRegister::build(
            ctx.portfolio.companies(),
            ctx.config.compliance_target,
            ctx.config.watchlist_below,
        );
        Self {
            avg_compliance_tone: average_tone(register.avg_compliance, ctx.config.watchlist_below),
            audits: ctx.portfolio.audit_schedule(),
            register,
        }
    }

    pub fn render(&self) -> String {
        let r = &self.register;
        let summary = format!(
            r#"<div class="grid grid-4">
  <div class="card"><div class="kpi-label">Open Risks</div><div class="kpi-value">{open}</div><span class="trend-down">▲ {critical} Critical</span></div>
  <div class="card"><div class="kpi-label">Avg Compliance Score</div><div class="kpi-value"><span class="heat {avg_class}">{avg}</span></div><span class="muted">Target: {target}</span></div>
  <div class="card"><div class="kpi-label">Safety Incidents YTD</div><div class="kpi-value">{safety}</div></div>
  <div class="card"><div class="kpi-label">Upcoming Audits</div><div class="kpi-value">{audits}</div><span class="muted">Next: {next} Days</span></div>
</div>"#,
            open = r.open_risks,
            critical = r.critical.len(),
            avg_class = self.avg_compliance_tone.css_class(),
            avg = r.avg_compliance.map(|a| a.to_string()).unwrap_or_else(|| "n/a".to_string()),
            target = r.compliance_target,
            safety = r.safety_incidents,
            audits = self.audits.upcoming,
            next = self.audits.next_in_days,
        );

        let critical = if r.critical.is_empty() {
            empty_state("No critical risks currently registered.")
        } else {
            let rows: String = r.critical.iter().map(critical_row).collect();
            format!(
                "<table><tr><th>Company</th><th>Risk Title</th><th>Category</th><th>Owner</th></tr>{}</table>",
                rows
            )
        };

        let watchlist = if r.watchlist.is_empty() {
            empty_state("All companies meet compliance targets.")
        } else {
            let rows: String = r
                .watchlist
                .iter()
                .map(|w| watch_row(w, r.compliance_target))
                .collect();
            format!("<table>{}</table>", rows)
        };

        [
            page_header(
                "Risk & Compliance",
                "Portfolio risk register and compliance tracking",
                &inert_button("Log Incident"),
            ),
            summary,
            format!(
                r#"<div class="grid grid-3"><div style="grid-column: span 2">{}</div>{}</div>"#,
                card("Top Critical Risks (High Impact & Likelihood)", &critical),
                card("Compliance Watchlist", &watchlist)
            ),
        ]
        .concat()
    }
}

fn critical_row(row: &RiskRow) -> String {
    format!(
        r#"<tr><td><a href="/company/{}?tab=risk">{}</a><div class="muted">{}</div></td><td><b>{}</b></td><td>{}</td><td>{}</td></tr>"#,
        escape(&row.company_id),
        escape(&row.company_name),
        escape(row.company_sector.label()),
        escape(&row.risk.title),
        row.risk.category.label(),
        escape(&row.risk.owner)
    )
}

fn watch_row(w: &WatchlistEntry, target: u32) -> String {
    format!(
        r#"<tr><td><a href="/company/{}?tab=risk">{}</a><div class="muted">Score below target ({})</div></td><td class="num"><span class="heat {}">{}</span></td></tr>"#,
        escape(&w.company_id),
        escape(&w.name),
        target,
        watch_tone(w.score).css_class(),
        w.score
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::seed::Portfolio;
    use crate::session::AppState;
    use chrono::Utc;

    #[test]
    fn summary_reflects_register() {
        let portfolio = Portfolio::seed();
        let config = Config::default();
        let ctx = ViewContext::new(&portfolio, &config, AppState::default(), Utc::now(), "/risk");
        let view = RiskView::build(&ctx);
        assert_eq!(view.register.avg_compliance, Some(87));
        assert_eq!(view.avg_compliance_tone, Tone::Warning);
        let html = view.render();
        assert!(html.contains("▲ 4 Critical"));
        assert!(html.contains("Target: 95"));
        assert!(html.contains("Pabrik Baja Sentosa"));
        assert!(html.contains(r#"<span class="heat tone-danger">65</span>"#));
        assert!(html.contains(r#"<span class="heat tone-warning">72</span>"#));
    }

    #[test]
    fn empty_portfolio_has_no_average() {
        assert_eq!(average_tone(None, 80), Tone::Neutral);
        assert_eq!(average_tone(Some(92), 80), Tone::Good);
        assert_eq!(average_tone(Some(70), 80), Tone::Danger);
    }
}
