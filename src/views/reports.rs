use serde::Serialize;

use crate::model::Tone;
use crate::seed::ReportTemplate;
use crate::session::Role;
use crate::views::html::{badge, card, escape, inert_button, page_header};
use crate::views::ViewContext;

/// Refresh status of one upstream data source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStatus {
    pub source: String,
    pub companies: usize,
    /// Age of the stalest company on this feed.
    pub max_age_days: i64,
    pub label: &'static str,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportsView {
    pub templates: Vec<ReportTemplate>,
    pub feeds: Vec<FeedStatus>,
    pub all_feeds_current: bool,
    pub subscription: String,
}

/// Default delivery subscription for the viewing role.
pub fn subscription_for(role: Role) -> String {
    let (report, schedule) = match role {
        Role::Ceo => ("Weekly CEO Brief", "every Monday at 08:00 AM"),
        Role::RiskOfficer => ("Risk & Compliance Register", "on the first business day of each week"),
        Role::BuCeo => ("Monthly Holding Pack", "on the 1st of each month"),
    };
    format!("You are currently subscribed to receive the {} {}.", report, schedule)
}

impl ReportsView {
    pub fn build(ctx: &ViewContext) -> Self {
        let mut feeds: Vec<FeedStatus> = Vec::new();
        for c in ctx.portfolio.companies() {
            let age = c.days_since_update(ctx.now);
            match feeds.iter_mut().find(|f| f.source == c.data_source) {
                Some(feed) => {
                    feed.companies += 1;
                    feed.max_age_days = feed.max_age_days.max(age);
                }
                None => feeds.push(FeedStatus {
                    source: c.data_source.clone(),
                    companies: 1,
                    max_age_days: age,
                    label: "",
                    tone: Tone::Neutral,
                }),
            }
        }
        for feed in &mut feeds {
            let stale = feed.max_age_days > ctx.config.stale_after_days;
            feed.label = if stale { "Delayed" } else { "Live" };
            feed.tone = if stale { Tone::Warning } else { Tone::Good };
        }

        Self {
            templates: ctx.portfolio.report_templates().to_vec(),
            all_feeds_current: feeds.iter().all(|f| f.tone == Tone::Good),
            feeds,
            subscription: subscription_for(ctx.state.role()),
        }
    }

    pub fn render(&self) -> String {
        let templates: String = self
            .templates
            .iter()
            .map(|t| {
                format!(
                    r#"<div class="card"><div class="split"><b>{}</b><span class="badge tone-neutral">{}</span></div><p class="muted">{}</p><div class="split"><span>{} · Last generated {}</span><span>{}{}</span></div></div>"#,
                    escape(t.title),
                    escape(t.format),
                    escape(t.description),
                    escape(t.frequency),
                    escape(t.last_generated),
                    inert_button("Generate Now"),
                    inert_button("Download"),
                )
            })
            .collect();

        let feed_rows: String = self
            .feeds
            .iter()
            .map(|f| {
                format!(
                    r#"<tr><td>{}</td><td class="num">{} {}</td><td>{}</td></tr>"#,
                    escape(&f.source),
                    f.companies,
                    if f.companies == 1 { "company" } else { "companies" },
                    badge(f.label, f.tone)
                )
            })
            .collect();
        let feed_note = if self.all_feeds_current {
            "All automated feeds are operating normally."
        } else {
            "One or more feeds are behind the reporting SLA."
        };

        [
            page_header(
                "Reports & Exports",
                "Prebuilt templates and data extracts",
                &[inert_button("PDF Brief"), inert_button("Custom Report Builder")].concat(),
            ),
            format!(
                r#"<div class="grid grid-3"><div style="grid-column: span 2" class="grid">{}</div><div class="grid">{}{}</div></div>"#,
                templates,
                card(
                    "Data Freshness",
                    &format!(r#"<table>{}</table><p class="muted">{}</p>"#, feed_rows, feed_note)
                ),
                card(
                    "Automated Delivery",
                    &format!(
                        r#"<p>{}</p><p>{}</p>"#,
                        escape(&self.subscription),
                        inert_button("Manage Subscriptions")
                    )
                ),
            ),
        ]
        .concat()
    }
}
