//! Conjunctive filters over companies, initiatives and risks.
//!
//! Every filter keeps the input order: the result is a subsequence of its
//! input in which each element satisfies all active criteria. `None` on a
//! criterion means "no constraint".

use serde::Serialize;

use crate::model::{
    Company, Grade, Initiative, InitiativeStatus, Risk, RiskCategory, RiskStatus, Sector, Status,
};

/// Order-preserving filter shared by all list views.
pub fn stable_filter<'a, T>(items: &'a [T], pred: impl Fn(&T) -> bool) -> Vec<&'a T> {
    items.iter().filter(|item| pred(item)).collect()
}

/// Parses a query value for an enum criterion. `""`, `"All"` and unknown
/// labels leave the criterion unconstrained.
pub fn parse_criterion<T>(raw: Option<&str>, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    let raw = raw?.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
        return None;
    }
    parse(raw)
}

fn normalize_search(raw: Option<&str>) -> String {
    raw.map(|s| s.trim().to_lowercase()).unwrap_or_default()
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    needle_lower.is_empty() || haystack.to_lowercase().contains(needle_lower)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompanyFilter {
    /// Lower-cased substring matched against the company name.
    pub search: String,
    pub sector: Option<Sector>,
    pub status: Option<Status>,
}

impl CompanyFilter {
    pub fn from_query(q: Option<&str>, sector: Option<&str>, status: Option<&str>) -> Self {
        Self {
            search: normalize_search(q),
            sector: parse_criterion(sector, Sector::parse),
            status: parse_criterion(status, Status::parse),
        }
    }

    pub fn matches(&self, c: &Company) -> bool {
        contains_ci(&c.name, &self.search)
            && self.sector.map_or(true, |s| c.sector == s)
            && self.status.map_or(true, |s| c.status == s)
    }

    pub fn apply<'a>(&self, companies: &'a [Company]) -> Vec<&'a Company> {
        stable_filter(companies, |c| self.matches(c))
    }

    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || self.sector.is_some() || self.status.is_some()
    }
}

/// An initiative together with the company it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiativeRow {
    pub company_id: String,
    pub company_name: String,
    pub company_sector: Sector,
    #[serde(flatten)]
    pub initiative: Initiative,
}

impl InitiativeRow {
    pub fn flatten(companies: &[Company]) -> Vec<InitiativeRow> {
        companies
            .iter()
            .flat_map(|c| {
                c.initiatives.iter().map(move |i| InitiativeRow {
                    company_id: c.id.clone(),
                    company_name: c.name.clone(),
                    company_sector: c.sector,
                    initiative: i.clone(),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InitiativeFilter {
    pub search: String,
    pub sector: Option<Sector>,
}

impl InitiativeFilter {
    pub fn from_query(q: Option<&str>, sector: Option<&str>) -> Self {
        Self {
            search: normalize_search(q),
            sector: parse_criterion(sector, Sector::parse),
        }
    }

    /// Search matches the initiative title or the company name.
    pub fn matches(&self, row: &InitiativeRow) -> bool {
        (contains_ci(&row.initiative.title, &self.search)
            || contains_ci(&row.company_name, &self.search))
            && self.sector.map_or(true, |s| row.company_sector == s)
    }

    pub fn apply<'a>(&self, rows: &'a [InitiativeRow]) -> Vec<&'a InitiativeRow> {
        stable_filter(rows, |r| self.matches(r))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KanbanColumn<'a> {
    pub status: InitiativeStatus,
    pub items: Vec<&'a InitiativeRow>,
}

/// Groups rows into one column per status, in status display order. Empty
/// columns are kept.
pub fn kanban<'a>(rows: &[&'a InitiativeRow]) -> Vec<KanbanColumn<'a>> {
    InitiativeStatus::ALL
        .iter()
        .map(|status| KanbanColumn {
            status: *status,
            items: rows
                .iter()
                .copied()
                .filter(|r| r.initiative.status == *status)
                .collect(),
        })
        .collect()
}

/// A risk together with the company it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskRow {
    pub company_id: String,
    pub company_name: String,
    pub company_sector: Sector,
    #[serde(flatten)]
    pub risk: Risk,
}

impl RiskRow {
    pub fn flatten(companies: &[Company]) -> Vec<RiskRow> {
        companies
            .iter()
            .flat_map(|c| {
                c.risks.iter().map(move |r| RiskRow {
                    company_id: c.id.clone(),
                    company_name: c.name.clone(),
                    company_sector: c.sector,
                    risk: r.clone(),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RiskFilter {
    pub search: String,
    pub category: Option<RiskCategory>,
    pub status: Option<RiskStatus>,
    pub impact: Option<Grade>,
    pub likelihood: Option<Grade>,
}

impl RiskFilter {
    pub fn open() -> Self {
        Self { status: Some(RiskStatus::Open), ..Self::default() }
    }

    pub fn matches(&self, row: &RiskRow) -> bool {
        let r = &row.risk;
        (contains_ci(&r.title, &self.search) || contains_ci(&row.company_name, &self.search))
            && self.category.map_or(true, |v| r.category == v)
            && self.status.map_or(true, |v| r.status == v)
            && self.impact.map_or(true, |v| r.impact == v)
            && self.likelihood.map_or(true, |v| r.likelihood == v)
    }

    pub fn apply<'a>(&self, rows: &'a [RiskRow]) -> Vec<&'a RiskRow> {
        stable_filter(rows, |r| self.matches(r))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub company_id: String,
    pub name: String,
    pub score: u32,
}

/// Summary figures for the risk & compliance page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskRegister {
    pub open_risks: usize,
    pub high_impact: usize,
    pub high_likelihood: usize,
    /// Open risks graded High on both axes, in company order.
    pub critical: Vec<RiskRow>,
    pub avg_compliance: Option<u32>,
    pub compliance_target: u32,
    pub watchlist: Vec<WatchlistEntry>,
    pub safety_incidents: u64,
}

impl RiskRegister {
    pub fn build(companies: &[Company], compliance_target: u32, watch_below: u32) -> Self {
        let rows = RiskRow::flatten(companies);
        let open = RiskFilter::open().apply(&rows);
        let high_impact = open.iter().filter(|r| r.risk.impact == Grade::High).count();
        let high_likelihood = open.iter().filter(|r| r.risk.likelihood == Grade::High).count();
        let critical = open
            .iter()
            .filter(|r| r.risk.is_critical())
            .map(|r| (*r).clone())
            .collect();

        let avg_compliance = if companies.is_empty() {
            None
        } else {
            let sum: u32 = companies.iter().map(|c| c.compliance_score).sum();
            Some((sum as f64 / companies.len() as f64).round() as u32)
        };

        let watchlist = stable_filter(companies, |c| c.compliance_score < watch_below)
            .into_iter()
            .map(|c| WatchlistEntry {
                company_id: c.id.clone(),
                name: c.name.clone(),
                score: c.compliance_score,
            })
            .collect();

        Self {
            open_risks: open.len(),
            high_impact,
            high_likelihood,
            critical,
            avg_compliance,
            compliance_target,
            watchlist,
            safety_incidents: companies.iter().map(|c| c.safety_incidents as u64).sum(),
        }
    }
}
