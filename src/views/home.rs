use serde::Serialize;

use crate::format::{format_days, format_number, format_percent, format_ratio, format_signed_percent};
use crate::metrics::{attention_alerts, sector_mix, Alert, HeatmapCell, HeatmapRow, PortfolioTotals};
use crate::model::Tone;
use crate::views::html::{badge, bar, card, empty_state, escape, inert_button, page_header};
use crate::views::ViewContext;

/// Companies shown in the health matrix.
pub const HEATMAP_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub label: &'static str,
    pub value: String,
    /// Derived delta, e.g. `-1.7% vs plan`; absent when not derivable.
    pub trend: Option<String>,
    pub positive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRow {
    pub month: &'static str,
    pub revenue: String,
    pub ebitda: String,
    pub revenue_pct: f64,
    pub ebitda_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorRow {
    pub sector: &'static str,
    pub revenue: String,
    pub share_pct: f64,
    pub share: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeView {
    pub title: &'static str,
    pub subtitle: String,
    pub totals: PortfolioTotals,
    pub kpis: Vec<Kpi>,
    pub alerts: Vec<Alert>,
    pub monthly: Vec<MonthlyRow>,
    pub sector_mix: Vec<SectorRow>,
    pub heatmap: Vec<HeatmapRow>,
}

fn trend(delta_pct: Option<f64>, suffix: &str, higher_is_better: bool) -> (Option<String>, bool) {
    match delta_pct {
        Some(d) if d.is_finite() => (
            Some(format!("{} {}", format_signed_percent(d), suffix)),
            (d >= 0.0) == higher_is_better,
        ),
        _ => (None, true),
    }
}

impl HomeView {
    pub fn build(ctx: &ViewContext) -> Self {
        let companies = ctx.portfolio.companies();
        let totals = PortfolioTotals::compute(companies);

        let (revenue_trend, revenue_up) = trend(totals.revenue_vs_budget_pct(), "vs plan", true);
        let (ebitda_trend, ebitda_up) = trend(totals.ebitda_vs_budget_pct(), "vs plan", true);
        let kpi = |label: &'static str, value: String, trend: Option<String>, positive: bool| Kpi {
            label,
            value,
            trend,
            positive,
        };
        let kpis = vec![
            kpi("Revenue YTD", ctx.money(totals.revenue), revenue_trend, revenue_up),
            kpi("EBITDA YTD", ctx.money(totals.ebitda), ebitda_trend, ebitda_up),
            kpi("Net Profit", ctx.money(totals.net_profit), None, true),
            kpi("Cash Position", ctx.money(totals.cash), None, true),
            kpi("Net Debt", ctx.money(totals.net_debt), None, true),
            kpi("Capex Burn", ctx.money(totals.capex), None, true),
            kpi("WC Days", format_ratio(totals.avg_working_capital_days, format_days), None, true),
            kpi("Headcount", format_number(totals.headcount as f64), None, true),
        ];

        let series = ctx.portfolio.monthly_performance();
        let peak = series
            .iter()
            .flat_map(|p| [p.revenue, p.ebitda])
            .fold(0.0_f64, f64::max);
        let scale = |v: f64| if peak > 0.0 { v / peak * 100.0 } else { 0.0 };
        let monthly = series
            .iter()
            .map(|p| MonthlyRow {
                month: p.month,
                revenue: ctx.money(p.revenue),
                ebitda: ctx.money(p.ebitda),
                revenue_pct: scale(p.revenue),
                ebitda_pct: scale(p.ebitda),
            })
            .collect();

        let sector_mix = sector_mix(companies)
            .into_iter()
            .map(|s| SectorRow {
                sector: s.sector.label(),
                revenue: ctx.money(s.revenue),
                share_pct: s.share_pct,
                share: format_percent(s.share_pct),
            })
            .collect();

        Self {
            title: "Group Overview",
            subtitle: format!("Portfolio Command Center • {}", ctx.state.date_range()),
            totals,
            kpis,
            alerts: attention_alerts(companies, ctx.config, ctx.now),
            monthly,
            sector_mix,
            heatmap: companies.iter().take(HEATMAP_ROWS).map(HeatmapRow::of).collect(),
        }
    }

    pub fn render(&self) -> String {
        let kpis: String = self
            .kpis
            .iter()
            .map(|k| {
                let trend = match &k.trend {
                    Some(t) => format!(
                        r#"<span class="{}">{}</span>"#,
                        if k.positive { "trend-up" } else { "trend-down" },
                        escape(t)
                    ),
                    None => String::new(),
                };
                format!(
                    r#"<div class="card"><div class="kpi-label">{}</div><div class="kpi-value">{}</div>{}</div>"#,
                    escape(k.label),
                    escape(&k.value),
                    trend
                )
            })
            .collect();

        let alerts = if self.alerts.is_empty() {
            empty_state("Nothing requires attention.")
        } else {
            self.alerts
                .iter()
                .map(|a| {
                    format!(
                        r#"<div class="alert">{}<div><a href="/company/{}"><b>{}</b></a><div>{}</div><div class="alert-meta">Owner: {} · Due: {}</div></div></div>"#,
                        badge(a.severity.label(), a.severity.tone()),
                        escape(&a.company_id),
                        escape(a.title),
                        escape(&a.description),
                        escape(&a.owner),
                        escape(a.due)
                    )
                })
                .collect()
        };

        let monthly_rows: String = self
            .monthly
            .iter()
            .map(|m| {
                format!(
                    "<tr><td>{}</td><td>{}{}</td><td>{}{}</td></tr>",
                    m.month,
                    bar(m.revenue_pct, Tone::Neutral),
                    escape(&m.revenue),
                    bar(m.ebitda_pct, Tone::Info),
                    escape(&m.ebitda)
                )
            })
            .collect();

        let mix_rows: String = self
            .sector_mix
            .iter()
            .map(|s| {
                format!(
                    r#"<tr><td>{}</td><td>{}</td><td class="num">{}</td><td class="num">{}</td></tr>"#,
                    escape(s.sector),
                    bar(s.share_pct, Tone::Info),
                    escape(&s.share),
                    escape(&s.revenue)
                )
            })
            .collect();

        let heat = |c: &HeatmapCell| {
            format!(r#"<td><span class="heat {}">{}</span></td>"#, c.tone.css_class(), escape(&c.label))
        };
        let heat_rows: String = self
            .heatmap
            .iter()
            .map(|r| {
                format!(
                    r#"<tr><td><a href="/company/{}">{}</a><div class="muted">{}</div></td>{}{}{}{}{}{}</tr>"#,
                    escape(&r.company_id),
                    escape(&r.name),
                    escape(r.sector.label()),
                    heat(&r.growth),
                    heat(&r.margin),
                    heat(&r.cash),
                    heat(&r.safety),
                    heat(&r.delivery),
                    heat(&r.compliance)
                )
            })
            .collect();

        [
            page_header(
                self.title,
                &self.subtitle,
                &[inert_button("PDF Brief"), inert_button("Create Intervention")].concat(),
            ),
            format!(r#"<div class="grid grid-4">{}</div>"#, kpis),
            format!(
                r#"<div class="grid grid-2">{}{}</div>"#,
                card(&format!("Requires Attention ({})", self.alerts.len()), &alerts),
                card(
                    "Revenue vs EBITDA",
                    &format!("<table><tr><th>Month</th><th>Revenue</th><th>EBITDA</th></tr>{}</table>", monthly_rows)
                ),
            ),
            card("Revenue Mix by Sector", &format!("<table>{}</table>", mix_rows)),
            card(
                "Portfolio Health Matrix",
                &format!(
                    "<table><tr><th>Entity</th><th>Growth</th><th>Margin</th><th>Cash</th><th>Safety</th><th>Delivery</th><th>Risk</th></tr>{}</table>",
                    heat_rows
                ),
            ),
        ]
        .concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::seed::Portfolio;
    use crate::session::AppState;
    use chrono::Utc;

    #[test]
    fn header_actions_are_inert() {
        let portfolio = Portfolio::seed();
        let config = Config::default();
        let ctx = ViewContext::new(&portfolio, &config, AppState::default(), Utc::now(), "/");
        let html = HomeView::build(&ctx).render();
        assert!(html.contains(&inert_button("PDF Brief")));
        assert!(html.contains(&inert_button("Create Intervention")));
    }
}
