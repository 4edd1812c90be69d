use serde::Serialize;

use crate::filter::{kanban, InitiativeFilter, InitiativeRow};
use crate::model::{Health, InitiativeStatus, Initiative, Sector, Tone};
use crate::views::html::{bar, badge, empty_state, escape, inert_button, page_header, select};
use crate::views::ViewContext;

/// Display form of one initiative, shared by the kanban board and the
/// company initiatives tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiativeCard {
    pub id: String,
    pub company_id: String,
    pub company_name: String,
    pub title: String,
    pub status: InitiativeStatus,
    pub health: Health,
    pub budget_burn: f64,
    pub burn_bar_pct: f64,
    pub over_budget: bool,
    pub next_milestone: String,
    pub due_date: String,
    pub key_risks: Vec<String>,
    pub decision_required: bool,
    pub owner: String,
}

impl InitiativeCard {
    pub fn new(company_id: &str, company_name: &str, i: &Initiative) -> Self {
        Self {
            id: i.id.clone(),
            company_id: company_id.to_string(),
            company_name: company_name.to_string(),
            title: i.title.clone(),
            status: i.status,
            health: i.health,
            budget_burn: i.budget_burn,
            burn_bar_pct: i.burn_bar_pct(),
            over_budget: i.over_budget(),
            next_milestone: i.next_milestone.clone(),
            due_date: i.due_date.format("%Y-%m-%d").to_string(),
            key_risks: i.key_risks.clone(),
            decision_required: i.decision_required,
            owner: i.owner.clone(),
        }
    }

    fn from_row(row: &InitiativeRow) -> Self {
        Self::new(&row.company_id, &row.company_name, &row.initiative)
    }

    /// Compact card for the kanban board.
    pub fn render_compact(&self) -> String {
        format!(
            r#"<div class="initiative"><div class="stripe bar-fill {stripe}"></div><div class="body">
  <div class="company">{company}</div>
  <b>{title}</b>
  <div class="split"><span>Budget Burn</span><span{burn_class}>{burn}%</span></div>
  {bar}
  <div class="muted">Next: {milestone}</div>
  <div class="split"><span>{owner}</span>{decision}</div>
</div></div>"#,
            stripe = self.health.tone().css_class(),
            company = escape(&self.company_name),
            title = escape(&self.title),
            burn_class = if self.over_budget { r#" class="over-budget""# } else { "" },
            burn = self.budget_burn,
            bar = bar(self.burn_bar_pct, self.burn_tone()),
            milestone = escape(&self.next_milestone),
            owner = escape(&self.owner),
            decision = if self.decision_required {
                r#"<span class="decision" title="Decision required">▲ Decision</span>"#
            } else {
                ""
            },
        )
    }

    /// Full card with due date and key risks, for the company page.
    pub fn render_detail(&self) -> String {
        let risks = if self.key_risks.is_empty() {
            String::new()
        } else {
            let items: String = self.key_risks.iter().map(|r| format!("<li>{}</li>", escape(r))).collect();
            format!(r#"<div class="muted">Key Risks</div><ul>{}</ul>"#, items)
        };
        format!(
            r#"<div class="card"><div class="split"><b>{title}</b>{status}</div>
  <div class="split"><span>Budget Burn</span><span{burn_class}>{burn}%</span></div>
  {bar}
  <div class="split"><span>Next Milestone: {milestone}</span><span>Due {due}</span></div>
  {risks}
  <div class="split"><span>Owner: {owner}</span>{decision}</div>
</div>"#,
            title = escape(&self.title),
            status = badge(self.status.label(), self.status.tone()),
            burn_class = if self.over_budget { r#" class="over-budget""# } else { "" },
            burn = self.budget_burn,
            bar = bar(self.burn_bar_pct, self.burn_tone()),
            milestone = escape(&self.next_milestone),
            due = escape(&self.due_date),
            risks = risks,
            owner = escape(&self.owner),
            decision = if self.decision_required { r#"<span class="decision">Decision required</span>"# } else { "" },
        )
    }

    fn burn_tone(&self) -> Tone {
        if self.over_budget {
            Tone::Danger
        } else {
            Tone::Info
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnView {
    pub status: InitiativeStatus,
    pub count: usize,
    pub cards: Vec<InitiativeCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitiativesView {
    pub query: String,
    pub sector: Option<Sector>,
    pub columns: Vec<ColumnView>,
}

impl InitiativesView {
    pub fn build(ctx: &ViewContext, q: Option<&str>, sector: Option<&str>) -> Self {
        let rows = InitiativeRow::flatten(ctx.portfolio.companies());
        let filter = InitiativeFilter::from_query(q, sector);
        let filtered = filter.apply(&rows);
        let columns = kanban(&filtered)
            .into_iter()
            .map(|col| ColumnView {
                status: col.status,
                count: col.items.len(),
                cards: col.items.into_iter().map(InitiativeCard::from_row).collect(),
            })
            .collect();
        Self {
            query: q.unwrap_or_default().trim().to_string(),
            sector: filter.sector,
            columns,
        }
    }

    pub fn render(&self) -> String {
        let sectors: Vec<&str> = Sector::ALL.iter().map(|s| s.label()).collect();
        let filters = format!(
            r#"<form class="card filters" method="get" action="/initiatives">
  <input type="search" name="q" value="{}" placeholder="Search initiatives or companies...">
  {}
  <button type="submit" class="btn">Filter</button>
</form>"#,
            escape(&self.query),
            select("sector", "All Sectors", &sectors, self.sector.map(|s| s.label())),
        );

        let columns: String = self
            .columns
            .iter()
            .map(|col| {
                let cards = if col.cards.is_empty() {
                    empty_state("No initiatives")
                } else {
                    col.cards.iter().map(InitiativeCard::render_compact).collect()
                };
                format!(
                    r#"<div class="column"><h3><span>{}</span><span class="badge tone-neutral">{}</span></h3>{}</div>"#,
                    col.status.label(),
                    col.count,
                    cards
                )
            })
            .collect();

        [
            page_header(
                "Transformation Initiatives",
                "Group-wide strategic projects and milestones",
                &inert_button("New Initiative"),
            ),
            filters,
            format!(r#"<div class="kanban">{}</div>"#, columns),
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
    fn board_marks_over_budget_and_keeps_empty_columns() {
        let portfolio = Portfolio::seed();
        let config = Config::default();
        let ctx = ViewContext::new(&portfolio, &config, AppState::default(), Utc::now(), "/initiatives");
        let view = InitiativesView::build(&ctx, None, Some("Manufacturing"));
        let counts: Vec<usize> = view.columns.iter().map(|c| c.count).collect();
        assert_eq!(counts, vec![0, 0, 1, 0]);
        let furnace = &view.columns[2].cards[0];
        assert!(furnace.over_budget);
        assert_eq!(furnace.burn_bar_pct, 100.0);
        assert!(furnace.decision_required);

        let html = view.render();
        assert_eq!(html.matches("No initiatives").count(), 3);
        assert!(html.contains(r#"<span class="over-budget">110%</span>"#));
        assert!(html.contains("disabled"));
    }
}
