//! Company detail page: header, tab strip and per-tab content.

use serde::Serialize;

use crate::format::{format_percent, format_ratio};
use crate::metrics::{compliance_narrative, compliance_tone, CompanyRatios, VarianceDrivers};
use crate::model::{Company, Grade, Region, RiskCategory, RiskStatus, Sector, Status, Tone};
use crate::views::html::{bar, badge, card, empty_state, escape, inert_button};
use crate::views::initiatives::InitiativeCard;
use crate::views::ViewContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tab {
    Performance,
    CashCapital,
    Operations,
    RiskCompliance,
    Initiatives,
    People,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Performance,
        Tab::CashCapital,
        Tab::Operations,
        Tab::RiskCompliance,
        Tab::Initiatives,
        Tab::People,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Performance => "Performance",
            Tab::CashCapital => "Cash & Capital",
            Tab::Operations => "Operations",
            Tab::RiskCompliance => "Risk & Compliance",
            Tab::Initiatives => "Initiatives",
            Tab::People => "People",
        }
    }

    /// Query value used in `?tab=`.
    pub fn slug(&self) -> &'static str {
        match self {
            Tab::Performance => "performance",
            Tab::CashCapital => "cash",
            Tab::Operations => "operations",
            Tab::RiskCompliance => "risk",
            Tab::Initiatives => "initiatives",
            Tab::People => "people",
        }
    }

    /// Unknown or missing values fall back to Performance.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim) else {
            return Tab::Performance;
        };
        Tab::ALL
            .iter()
            .copied()
            .find(|t| t.slug().eq_ignore_ascii_case(raw) || t.label().eq_ignore_ascii_case(raw))
            .unwrap_or(Tab::Performance)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricCard {
    pub label: &'static str,
    pub value: String,
    /// e.g. `▼ 4% vs budget`
    pub variance: Option<String>,
    pub variance_tone: Tone,
    pub attainment_pct: Option<f64>,
    pub target: String,
    pub last_year: String,
}

impl MetricCard {
    fn new(ctx: &ViewContext, label: &'static str, actual: f64, budget: f64, ly: f64, variance: Option<f64>) -> Self {
        let (variance, variance_tone) = match variance {
            Some(v) if v.is_finite() => {
                let arrow = if v >= 0.0 { "▲" } else { "▼" };
                let tone = if v >= 0.0 { Tone::Good } else { Tone::Danger };
                (Some(format!("{} {}% vs budget", arrow, (v * 100.0).round().abs())), tone)
            }
            _ => (None, Tone::Neutral),
        };
        Self {
            label,
            value: ctx.money(actual),
            variance,
            variance_tone,
            attainment_pct: if budget != 0.0 { Some((actual / budget * 100.0).min(100.0)) } else { None },
            target: ctx.money(budget),
            last_year: ctx.money(ly),
        }
    }

    fn render(&self, extra: &str) -> String {
        let variance = self
            .variance
            .as_deref()
            .map(|v| badge(v, self.variance_tone))
            .unwrap_or_default();
        format!(
            r#"<div class="card"><div class="kpi-label">{}</div><div class="kpi-value">{}</div>{}{}<div class="split"><span>Target: {}</span><span>LY: {}</span></div>{}</div>"#,
            escape(self.label),
            escape(&self.value),
            variance,
            bar(self.attainment_pct.unwrap_or(0.0), Tone::Info),
            escape(&self.target),
            escape(&self.last_year),
            extra
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverRow {
    pub label: &'static str,
    pub value: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskLine {
    pub id: String,
    pub title: String,
    pub owner: String,
    pub category: RiskCategory,
    pub impact: Grade,
    pub likelihood: Grade,
    pub status: RiskStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TabContent {
    Performance {
        revenue: MetricCard,
        ebitda: MetricCard,
        net_profit: String,
        margin: String,
        margin_vs_budget: String,
        drivers: Vec<DriverRow>,
    },
    RiskCompliance {
        risks: Vec<RiskLine>,
        compliance_score: u32,
        compliance_tone: Tone,
        narrative: &'static str,
        safety_incidents: u32,
    },
    Initiatives {
        cards: Vec<InitiativeCard>,
    },
    Placeholder {
        tab: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabLink {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyView {
    pub id: String,
    pub name: String,
    pub status: Status,
    pub sector: Sector,
    pub region: Region,
    pub owner: String,
    pub ownership: String,
    pub updated: String,
    pub data_source: String,
    pub tab: Tab,
    pub tabs: Vec<TabLink>,
    pub content: TabContent,
}

impl CompanyView {
    /// `None` when no company has `id`.
    pub fn build(ctx: &ViewContext, id: &str, tab: Option<&str>) -> Option<Self> {
        let company = ctx.portfolio.find(id)?;
        let tab = Tab::parse(tab);
        let tabs = Tab::ALL
            .iter()
            .map(|t| TabLink {
                label: t.label(),
                href: format!("/company/{}?tab={}", company.id, t.slug()),
                active: *t == tab,
            })
            .collect();
        Some(Self {
            id: company.id.clone(),
            name: company.name.clone(),
            status: company.status,
            sector: company.sector,
            region: company.region,
            owner: company.owner.clone(),
            ownership: format!("{}%", company.ownership_percent),
            updated: company.last_updated.format("%Y-%m-%d").to_string(),
            data_source: company.data_source.clone(),
            tab,
            tabs,
            content: tab_content(ctx, company, tab),
        })
    }

    pub fn render(&self) -> String {
        let header = format!(
            r#"<div class="page-header"><div><h1>{name} {status}</h1><p class="muted">{sector} • {region} • Owner: {owner} • {ownership} owned • Updated {updated} ({source})</p></div><div class="actions">{ask}</div></div>"#,
            name = escape(&self.name),
            status = badge(self.status.label(), self.status.tone()),
            sector = escape(self.sector.label()),
            region = escape(self.region.label()),
            owner = escape(&self.owner),
            ownership = escape(&self.ownership),
            updated = escape(&self.updated),
            source = escape(&self.data_source),
            ask = inert_button("Ask / Decision Request"),
        );
        let tabs: String = self
            .tabs
            .iter()
            .map(|t| {
                format!(
                    r#"<a class="{}" href="{}">{}</a>"#,
                    if t.active { "tab active" } else { "tab" },
                    escape(&t.href),
                    escape(t.label)
                )
            })
            .collect();
        [header, format!(r#"<div class="tabs">{}</div>"#, tabs), render_content(&self.content)].concat()
    }
}

fn tab_content(ctx: &ViewContext, c: &Company, tab: Tab) -> TabContent {
    match tab {
        Tab::Performance => {
            let r = CompanyRatios::of(c);
            let d = VarianceDrivers::of(c);
            let signed = |v: f64, good: bool| DriverRow {
                label: "",
                value: format!("{}{}", if v > 0.0 { "+" } else { "" }, ctx.money(v)),
                tone: if good { Tone::Good } else { Tone::Danger },
            };
            let drivers = vec![
                DriverRow { label: "Volume", ..signed(d.volume, true) },
                DriverRow { label: "Price", ..signed(d.price, true) },
                DriverRow { label: "Cost", ..signed(d.cost, false) },
                DriverRow { label: "FX Impact", ..signed(d.fx, false) },
                DriverRow { label: "Total Variance", ..signed(d.total, d.total >= 0.0) },
            ];
            let margin_vs_budget = match r.margin_delta_pts {
                Some(delta) => format!("{}{:.1} pts vs budget", if delta > 0.0 { "+" } else { "" }, delta),
                None => "n/a".to_string(),
            };
            TabContent::Performance {
                revenue: MetricCard::new(ctx, "Revenue YTD", c.revenue_ytd, c.revenue_budget, c.revenue_ly, r.revenue_variance),
                ebitda: MetricCard::new(ctx, "EBITDA YTD", c.ebitda_ytd, c.ebitda_budget, c.ebitda_ly, r.ebitda_variance),
                net_profit: ctx.money(c.net_profit_ytd),
                margin: format_ratio(r.ebitda_margin_pct, format_percent),
                margin_vs_budget,
                drivers,
            }
        }
        Tab::RiskCompliance => TabContent::RiskCompliance {
            risks: c
                .risks
                .iter()
                .map(|r| RiskLine {
                    id: r.id.clone(),
                    title: r.title.clone(),
                    owner: r.owner.clone(),
                    category: r.category,
                    impact: r.impact,
                    likelihood: r.likelihood,
                    status: r.status,
                })
                .collect(),
            compliance_score: c.compliance_score,
            compliance_tone: compliance_tone(c.compliance_score),
            narrative: compliance_narrative(c.compliance_score),
            safety_incidents: c.safety_incidents,
        },
        Tab::Initiatives => TabContent::Initiatives {
            cards: c.initiatives.iter().map(|i| InitiativeCard::new(&c.id, &c.name, i)).collect(),
        },
        Tab::CashCapital | Tab::Operations | Tab::People => TabContent::Placeholder { tab: tab.label() },
    }
}

fn render_content(content: &TabContent) -> String {
    match content {
        TabContent::Performance { revenue, ebitda, net_profit, margin, margin_vs_budget, drivers } => {
            let margin_line = format!(
                r#"<div class="split"><span>Margin: {}</span><span>{}</span></div>"#,
                escape(margin),
                escape(margin_vs_budget)
            );
            let driver_rows: String = drivers
                .iter()
                .map(|d| {
                    format!(
                        r#"<tr><td>{}</td><td class="num"><span class="badge {}">{}</span></td></tr>"#,
                        escape(d.label),
                        d.tone.css_class(),
                        escape(&d.value)
                    )
                })
                .collect();
            [
                format!(
                    r#"<div class="grid grid-3">{}{}<div class="card"><div class="kpi-label">Net Profit YTD</div><div class="kpi-value">{}</div></div></div>"#,
                    revenue.render(""),
                    ebitda.render(&margin_line),
                    escape(net_profit)
                ),
                card("EBITDA Variance Drivers (vs Budget)", &format!("<table>{}</table>", driver_rows)),
            ]
            .concat()
        }
        TabContent::RiskCompliance { risks, compliance_score, compliance_tone, narrative, safety_incidents } => {
            let table = if risks.is_empty() {
                empty_state("No active risks registered.")
            } else {
                let rows: String = risks
                    .iter()
                    .map(|r| {
                        format!(
                            r#"<tr><td><b>{}</b><div class="muted">Owner: {}</div></td><td>{}</td><td>{} / {}</td><td>{}</td></tr>"#,
                            escape(&r.title),
                            escape(&r.owner),
                            r.category.label(),
                            badge(r.impact.label(), r.impact.tone()),
                            badge(r.likelihood.label(), r.likelihood.tone()),
                            badge(r.status.label(), r.status.tone())
                        )
                    })
                    .collect();
                format!(
                    "<table><tr><th>Risk Title</th><th>Category</th><th>Impact / Likelihood</th><th>Status</th></tr>{}</table>",
                    rows
                )
            };
            format!(
                r#"<div class="grid grid-3"><div style="grid-column: span 2">{}</div><div>{}{}</div></div>"#,
                card(&format!("Top Risks ({})", risks.len()), &table),
                card(
                    "Compliance Score",
                    &format!(
                        r#"<div class="kpi-value"><span class="heat {}">{}</span> / 100</div><p class="muted">{}</p>"#,
                        compliance_tone.css_class(),
                        compliance_score,
                        escape(narrative)
                    )
                ),
                card("Safety Incidents YTD", &format!(r#"<div class="kpi-value">{}</div>"#, safety_incidents)),
            )
        }
        TabContent::Initiatives { cards } => {
            if cards.is_empty() {
                empty_state("No active initiatives for this company.")
            } else {
                let inner: String = cards.iter().map(InitiativeCard::render_detail).collect();
                format!(r#"<div class="grid grid-2">{}</div>"#, inner)
            }
        }
        TabContent::Placeholder { tab } => card(
            tab,
            &empty_state(&format!("The {} module is under development.", tab)),
        ),
    }
}

/// Body of the not-found page.
pub fn render_not_found(id: &str) -> String {
    format!(
        r#"<section class="card empty"><h1>Company Not Found</h1><p>No portfolio company has id "{}", or you don't have access.</p><p><a class="btn" href="/portfolio">Return to Portfolio</a></p></section>"#,
        escape(id)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::model::Currency;
    use crate::seed::Portfolio;
    use crate::session::{AppState, Role};
    use chrono::Utc;

    fn with_ctx<R>(state: AppState, f: impl FnOnce(&ViewContext) -> R) -> R {
        let portfolio = Portfolio::seed();
        let config = Config::default();
        let ctx = ViewContext::new(&portfolio, &config, state, Utc::now(), "/company/c1");
        f(&ctx)
    }

    #[test]
    fn tab_parse_falls_back_to_performance() {
        assert_eq!(Tab::parse(None), Tab::Performance);
        assert_eq!(Tab::parse(Some("risk")), Tab::RiskCompliance);
        assert_eq!(Tab::parse(Some("Cash & Capital")), Tab::CashCapital);
        assert_eq!(Tab::parse(Some("bogus")), Tab::Performance);
    }

    #[test]
    fn unknown_company_is_none() {
        with_ctx(AppState::default(), |ctx| {
            assert!(CompanyView::build(ctx, "c99", None).is_none());
        });
        assert!(render_not_found("c99").contains("Company Not Found"));
    }

    #[test]
    fn performance_tab_in_usd() {
        let state = AppState::new(Currency::Usd, Role::Ceo, "YTD 2026");
        let view = with_ctx(state, |ctx| CompanyView::build(ctx, "c1", None)).unwrap();
        assert_eq!(view.tab, Tab::Performance);
        assert!(view.tabs[0].active);
        match &view.content {
            TabContent::Performance { revenue, margin, drivers, .. } => {
                assert_eq!(revenue.value, "$833M");
                assert_eq!(revenue.variance.as_deref(), Some("▼ 4% vs budget"));
                assert_eq!(margin, "25.6%");
                assert_eq!(drivers.len(), 5);
                assert_eq!(drivers[4].tone, Tone::Danger);
            }
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn risk_tab_carries_narrative() {
        let view = with_ctx(AppState::default(), |ctx| CompanyView::build(ctx, "c8", Some("risk"))).unwrap();
        match &view.content {
            TabContent::RiskCompliance { risks, compliance_tone, narrative, .. } => {
                assert_eq!(risks.len(), 2);
                assert_eq!(*compliance_tone, Tone::Danger);
                assert!(narrative.starts_with("Critical"));
            }
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn placeholder_tabs_render_under_development() {
        let view = with_ctx(AppState::default(), |ctx| CompanyView::build(ctx, "c2", Some("people"))).unwrap();
        assert_eq!(view.content, TabContent::Placeholder { tab: "People" });
        assert!(view.render().contains("under development"));
    }
}
