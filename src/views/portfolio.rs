use serde::Serialize;

use crate::filter::CompanyFilter;
use crate::format::{format_days, format_percent, format_ratio};
use crate::metrics::CompanyRatios;
use crate::model::{Company, Health, Sector, Status};
use crate::views::html::{badge, empty_state, escape, inert_button, page_header, select};
use crate::views::ViewContext;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioRow {
    pub id: String,
    pub name: String,
    pub sector: Sector,
    pub region: String,
    pub status: Status,
    pub revenue: String,
    pub ebitda_margin: String,
    pub cash_days: String,
    pub health: Health,
    pub compliance: String,
}

impl PortfolioRow {
    fn of(c: &Company, ctx: &ViewContext) -> Self {
        let ratios = CompanyRatios::of(c);
        Self {
            id: c.id.clone(),
            name: c.name.clone(),
            sector: c.sector,
            region: c.region.label().to_string(),
            status: c.status,
            revenue: ctx.money(c.revenue_ytd),
            ebitda_margin: format_ratio(ratios.ebitda_margin_pct, format_percent),
            cash_days: format_ratio(ratios.cash_days, format_days),
            health: c.overall_health,
            compliance: format!("{}/100", c.compliance_score),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioView {
    pub filter: CompanyFilter,
    /// Search text as typed, for echoing back into the form.
    pub query: String,
    pub rows: Vec<PortfolioRow>,
    pub shown: usize,
    pub total: usize,
}

impl PortfolioView {
    pub fn build(ctx: &ViewContext, q: Option<&str>, sector: Option<&str>, status: Option<&str>) -> Self {
        let filter = CompanyFilter::from_query(q, sector, status);
        let companies = ctx.portfolio.companies();
        let rows: Vec<PortfolioRow> = filter
            .apply(companies)
            .into_iter()
            .map(|c| PortfolioRow::of(c, ctx))
            .collect();
        Self {
            query: q.unwrap_or_default().trim().to_string(),
            shown: rows.len(),
            total: companies.len(),
            filter,
            rows,
        }
    }

    pub fn render(&self) -> String {
        let sectors: Vec<&str> = Sector::ALL.iter().map(|s| s.label()).collect();
        let statuses: Vec<&str> = Status::ALL.iter().map(|s| s.label()).collect();
        let filters = format!(
            r#"<form class="card filters" method="get" action="/portfolio">
  <input type="search" name="q" value="{}" placeholder="Search companies...">
  {}
  {}
  <button type="submit" class="btn">Filter</button>
</form>"#,
            escape(&self.query),
            select("sector", "All Sectors", &sectors, self.filter.sector.map(|s| s.label())),
            select("status", "All Statuses", &statuses, self.filter.status.map(|s| s.label())),
        );

        let body = if self.rows.is_empty() {
            empty_state("No companies found matching your filters.")
        } else {
            let rows: String = self
                .rows
                .iter()
                .map(|r| {
                    format!(
                        r#"<tr><td><a href="/company/{id}">{name}</a><div class="muted">{sector} • {region}</div></td><td>{status}</td><td class="num">{revenue}</td><td class="num">{margin}</td><td class="num">{cash}</td><td><span class="{health_class}" title="{health}">{symbol}</span></td><td class="num">{compliance}</td><td><a href="/company/{id}">View</a></td></tr>"#,
                        id = escape(&r.id),
                        name = escape(&r.name),
                        sector = escape(r.sector.label()),
                        region = escape(&r.region),
                        status = badge(r.status.label(), r.status.tone()),
                        revenue = escape(&r.revenue),
                        margin = escape(&r.ebitda_margin),
                        cash = escape(&r.cash_days),
                        health_class = health_class(r.health),
                        health = r.health.label(),
                        symbol = r.health.symbol(),
                        compliance = escape(&r.compliance),
                    )
                })
                .collect();
            format!(
                "<table><tr><th>Company</th><th>Status</th><th>Revenue YTD</th><th>EBITDA Margin</th><th>Cash Days</th><th>Health</th><th>Compliance</th><th>Actions</th></tr>{}</table>",
                rows
            )
        };

        [
            page_header(
                "Portfolio Companies",
                "All operating companies and subsidiaries",
                &[inert_button("Export CSV"), inert_button("Bulk Actions")].concat(),
            ),
            filters,
            format!(
                r#"<section class="card">{}<p class="muted">Showing {} of {} companies</p></section>"#,
                body, self.shown, self.total
            ),
        ]
        .concat()
    }
}

fn health_class(health: Health) -> String {
    format!("heat {}", health.tone().css_class())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::seed::Portfolio;
    use crate::session::AppState;
    use chrono::Utc;

    #[test]
    fn rows_format_ratios_and_count() {
        let portfolio = Portfolio::seed();
        let config = Config::default();
        let ctx = ViewContext::new(&portfolio, &config, AppState::default(), Utc::now(), "/portfolio");
        let view = PortfolioView::build(&ctx, None, Some("Logistics"), None);
        assert_eq!((view.shown, view.total), (1, 10));
        let row = &view.rows[0];
        assert_eq!(row.revenue, "Rp 4,2 T");
        assert_eq!(row.ebitda_margin, "8.3%");
        assert_eq!(row.cash_days, "13d");
        assert_eq!(row.compliance, "72/100");
        assert!(view.render().contains("Showing 1 of 10 companies"));
    }

    #[test]
    fn empty_filter_result_renders_message() {
        let portfolio = Portfolio::seed();
        let config = Config::default();
        let ctx = ViewContext::new(&portfolio, &config, AppState::default(), Utc::now(), "/portfolio");
        let view = PortfolioView::build(&ctx, Some("nothing-matches"), None, None);
        assert!(view.rows.is_empty());
        assert!(view.render().contains("No companies found matching your filters."));
    }
}
