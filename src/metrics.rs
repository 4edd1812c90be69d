//! Portfolio aggregation and per-company ratio derivation.
//!
//! Everything here is a pure reduction over the resident company list and is
//! recomputed per request. Ratios return `None` when their denominator is
//! zero rather than propagating a non-finite value.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Config;
use crate::model::{Company, Health, Sector, Tone};

const DAYS_PER_YEAR: f64 = 365.0;

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator)
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    pub company_count: usize,
    pub revenue: f64,
    pub revenue_budget: f64,
    pub revenue_ly: f64,
    pub ebitda: f64,
    pub ebitda_budget: f64,
    pub net_profit: f64,
    pub cash: f64,
    pub net_debt: f64,
    pub capex: f64,
    pub headcount: u64,
    pub safety_incidents: u64,
    /// Unweighted mean, rounded to whole days.
    pub avg_working_capital_days: Option<f64>,
    /// Unweighted mean, rounded.
    pub avg_compliance: Option<u32>,
}

impl PortfolioTotals {
    pub fn compute(companies: &[Company]) -> Self {
        let mut t = Self { company_count: companies.len(), ..Self::default() };
        for c in companies {
            t.revenue += c.revenue_ytd;
            t.revenue_budget += c.revenue_budget;
            t.revenue_ly += c.revenue_ly;
            t.ebitda += c.ebitda_ytd;
            t.ebitda_budget += c.ebitda_budget;
            t.net_profit += c.net_profit_ytd;
            t.cash += c.cash;
            t.net_debt += c.net_debt;
            t.capex += c.capex;
            t.headcount += c.headcount as u64;
            t.safety_incidents += c.safety_incidents as u64;
        }
        t.avg_working_capital_days =
            mean(companies.iter().map(|c| c.working_capital_days)).map(f64::round);
        t.avg_compliance = mean(companies.iter().map(|c| c.compliance_score as f64))
            .map(|v| v.round() as u32);
        t
    }

    /// Revenue vs budget in percent (e.g. -1.7).
    pub fn revenue_vs_budget_pct(&self) -> Option<f64> {
        ratio(self.revenue, self.revenue_budget).map(|r| (r - 1.0) * 100.0)
    }

    pub fn ebitda_vs_budget_pct(&self) -> Option<f64> {
        ratio(self.ebitda, self.ebitda_budget).map(|r| (r - 1.0) * 100.0)
    }

    pub fn revenue_vs_ly_pct(&self) -> Option<f64> {
        ratio(self.revenue, self.revenue_ly).map(|r| (r - 1.0) * 100.0)
    }

    pub fn ebitda_margin_pct(&self) -> Option<f64> {
        ratio(self.ebitda, self.revenue).map(|r| r * 100.0)
    }
}

/// Derived per-company ratios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRatios {
    pub ebitda_margin_pct: Option<f64>,
    pub budget_margin_pct: Option<f64>,
    /// Actual minus budget margin, percentage points.
    pub margin_delta_pts: Option<f64>,
    /// actual / budget - 1
    pub revenue_variance: Option<f64>,
    pub ebitda_variance: Option<f64>,
    pub revenue_attainment_pct: Option<f64>,
    pub ebitda_attainment_pct: Option<f64>,
    /// cash / (revenue / 365)
    pub cash_days: Option<f64>,
    pub net_debt_to_ebitda: Option<f64>,
}

impl CompanyRatios {
    pub fn of(c: &Company) -> Self {
        let ebitda_margin_pct = ratio(c.ebitda_ytd, c.revenue_ytd).map(|r| r * 100.0);
        let budget_margin_pct = ratio(c.ebitda_budget, c.revenue_budget).map(|r| r * 100.0);
        let margin_delta_pts = match (ebitda_margin_pct, budget_margin_pct) {
            (Some(actual), Some(budget)) => Some(actual - budget),
            _ => None,
        };
        Self {
            ebitda_margin_pct,
            budget_margin_pct,
            margin_delta_pts,
            revenue_variance: ratio(c.revenue_ytd, c.revenue_budget).map(|r| r - 1.0),
            ebitda_variance: ratio(c.ebitda_ytd, c.ebitda_budget).map(|r| r - 1.0),
            revenue_attainment_pct: ratio(c.revenue_ytd, c.revenue_budget).map(|r| r * 100.0),
            ebitda_attainment_pct: ratio(c.ebitda_ytd, c.ebitda_budget).map(|r| r * 100.0),
            cash_days: ratio(c.revenue_ytd, DAYS_PER_YEAR).and_then(|daily| ratio(c.cash, daily)),
            net_debt_to_ebitda: ratio(c.net_debt, c.ebitda_ytd),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub label: String,
    pub tone: Tone,
}

impl HeatmapCell {
    fn new(label: impl Into<String>, tone: Tone) -> Self {
        Self { label: label.into(), tone }
    }
}

/// One row of the portfolio health matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapRow {
    pub company_id: String,
    pub name: String,
    pub sector: Sector,
    pub growth: HeatmapCell,
    pub margin: HeatmapCell,
    pub cash: HeatmapCell,
    pub safety: HeatmapCell,
    pub delivery: HeatmapCell,
    pub compliance: HeatmapCell,
}

fn pct_label(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{}%", v.round() as i64),
        _ => "n/a".to_string(),
    }
}

impl HeatmapRow {
    pub fn of(c: &Company) -> Self {
        let ratios = CompanyRatios::of(c);

        let growth_tone = if c.revenue_ytd > c.revenue_budget { Tone::Good } else { Tone::Warning };
        let margin_tone = if c.ebitda_ytd > c.ebitda_budget {
            Tone::Good
        } else if c.ebitda_ytd < c.ebitda_budget * 0.8 {
            Tone::Danger
        } else {
            Tone::Warning
        };
        let cash = if c.cash > 1000.0 {
            HeatmapCell::new("High", Tone::Good)
        } else if c.cash < 200.0 {
            HeatmapCell::new("Low", Tone::Danger)
        } else {
            HeatmapCell::new("Med", Tone::Warning)
        };
        let safety_tone = match c.safety_incidents {
            0 => Tone::Good,
            n if n > 3 => Tone::Danger,
            _ => Tone::Warning,
        };
        let delivery_tone = if c.on_time_delivery >= 95.0 {
            Tone::Good
        } else if c.on_time_delivery < 85.0 {
            Tone::Danger
        } else {
            Tone::Warning
        };

        Self {
            company_id: c.id.clone(),
            name: c.name.clone(),
            sector: c.sector,
            growth: HeatmapCell::new(pct_label(ratios.revenue_attainment_pct), growth_tone),
            margin: HeatmapCell::new(pct_label(ratios.ebitda_margin_pct), margin_tone),
            cash,
            safety: HeatmapCell::new(c.safety_incidents.to_string(), safety_tone),
            delivery: HeatmapCell::new(format!("{}%", c.on_time_delivery), delivery_tone),
            compliance: HeatmapCell::new(
                c.compliance_score.to_string(),
                compliance_tone(c.compliance_score),
            ),
        }
    }
}

pub fn compliance_tone(score: u32) -> Tone {
    if score >= 90 {
        Tone::Good
    } else if score >= 75 {
        Tone::Warning
    } else {
        Tone::Danger
    }
}

pub fn compliance_narrative(score: u32) -> &'static str {
    if score >= 90 {
        "Excellent standing. No major findings."
    } else if score >= 75 {
        "Minor findings in recent audit. Remediation in progress."
    } else {
        "Critical compliance issues detected. Immediate action required."
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorShare {
    pub sector: Sector,
    pub revenue: f64,
    pub share_pct: f64,
}

/// Revenue share per sector in `Sector::ALL` order; empty sectors omitted.
pub fn sector_mix(companies: &[Company]) -> Vec<SectorShare> {
    let total: f64 = companies.iter().map(|c| c.revenue_ytd).sum();
    Sector::ALL
        .iter()
        .filter_map(|sector| {
            let revenue: f64 = companies
                .iter()
                .filter(|c| c.sector == *sector)
                .map(|c| c.revenue_ytd)
                .sum();
            let present = companies.iter().any(|c| c.sector == *sector);
            present.then(|| SectorShare {
                sector: *sector,
                revenue,
                share_pct: ratio(revenue, total).map(|r| r * 100.0).unwrap_or(0.0),
            })
        })
        .collect()
}

/// EBITDA bridge vs budget. Driver weights are fixed shares of budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VarianceDrivers {
    pub volume: f64,
    pub price: f64,
    pub cost: f64,
    pub fx: f64,
    pub total: f64,
}

impl VarianceDrivers {
    pub fn of(c: &Company) -> Self {
        Self {
            volume: c.ebitda_budget * 0.05,
            price: c.ebitda_budget * 0.02,
            cost: -c.ebitda_budget * 0.08,
            fx: -c.ebitda_budget * 0.01,
            total: c.ebitda_ytd - c.ebitda_budget,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    CashBurn,
    CovenantBreach,
    MarginDeterioration,
    DataStale,
}

impl AlertKind {
    pub fn title(&self) -> &'static str {
        match self {
            AlertKind::CashBurn => "Critical Cash Burn",
            AlertKind::CovenantBreach => "Covenant Breach Warning",
            AlertKind::MarginDeterioration => "Margin Deterioration",
            AlertKind::DataStale => "Data SLA Violation",
        }
    }

    pub fn severity(&self) -> Health {
        match self {
            AlertKind::CashBurn | AlertKind::CovenantBreach => Health::Red,
            AlertKind::MarginDeterioration | AlertKind::DataStale => Health::Amber,
        }
    }

    pub fn due(&self) -> &'static str {
        match self {
            AlertKind::CashBurn => "Immediate",
            AlertKind::CovenantBreach => "2 Days",
            AlertKind::MarginDeterioration => "1 Week",
            AlertKind::DataStale => "Overdue",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: Health,
    pub title: &'static str,
    pub description: String,
    pub owner: String,
    pub due: &'static str,
    pub company_id: String,
}

impl Alert {
    fn new(kind: AlertKind, company: &Company, description: String, owner: &str) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            title: kind.title(),
            description,
            owner: owner.to_string(),
            due: kind.due(),
            company_id: company.id.clone(),
        }
    }
}

/// Items for the "Requires Attention" panel. Red alerts come first; within a
/// severity, company order is kept.
pub fn attention_alerts(companies: &[Company], cfg: &Config, now: DateTime<Utc>) -> Vec<Alert> {
    let mut alerts = Vec::new();
    for c in companies {
        let r = CompanyRatios::of(c);
        if let Some(days) = r.cash_days.filter(|d| *d < cfg.cash_days_alert) {
            alerts.push(Alert::new(
                AlertKind::CashBurn,
                c,
                format!("{} cash days < {} ({}d)", c.name, cfg.cash_days_alert, days.round()),
                &c.owner,
            ));
        }
        if let Some(lev) = r.net_debt_to_ebitda.filter(|l| *l > cfg.leverage_alert) {
            alerts.push(Alert::new(
                AlertKind::CovenantBreach,
                c,
                format!("{} net debt/EBITDA > {}x ({:.1}x)", c.name, cfg.leverage_alert, lev),
                &c.owner,
            ));
        }
        if let Some(delta) = r.margin_delta_pts.filter(|d| *d <= -cfg.margin_alert_pts) {
            alerts.push(Alert::new(
                AlertKind::MarginDeterioration,
                c,
                format!("{} EBITDA margin {:.1} pts vs budget", c.name, delta),
                &c.owner,
            ));
        }
        if c.days_since_update(now) > cfg.stale_after_days {
            alerts.push(Alert::new(
                AlertKind::DataStale,
                c,
                format!(
                    "{} financial reporting > {} days stale",
                    c.name, cfg.stale_after_days
                ),
                "System",
            ));
        }
    }
    // stable: keeps company order within a severity
    alerts.sort_by_key(|a| match a.severity {
        Health::Red => 0,
        Health::Amber => 1,
        Health::Green => 2,
    });
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Portfolio;

    #[test]
    fn totals_over_seed() {
        let p = Portfolio::seed();
        let t = PortfolioTotals::compute(p.companies());
        assert_eq!(t.company_count, 10);
        assert_eq!(t.revenue, 75900.0);
        assert_eq!(t.revenue_budget, 77200.0);
        assert_eq!(t.ebitda, 20970.0);
        assert_eq!(t.net_profit, 10880.0);
        assert_eq!(t.cash, 25030.0);
        assert_eq!(t.net_debt, 37000.0);
        assert_eq!(t.capex, 13650.0);
        assert_eq!(t.headcount, 58650);
        assert_eq!(t.safety_incidents, 20);
        assert_eq!(t.avg_working_capital_days, Some(50.0));
    }

    #[test]
    fn average_compliance_rounds_to_nearest() {
        // 866 / 10 = 86.6
        let p = Portfolio::seed();
        assert_eq!(PortfolioTotals::compute(p.companies()).avg_compliance, Some(87));
    }

    #[test]
    fn empty_list_has_no_averages() {
        let t = PortfolioTotals::compute(&[]);
        assert_eq!(t.revenue, 0.0);
        assert_eq!(t.avg_working_capital_days, None);
        assert_eq!(t.avg_compliance, None);
        assert_eq!(t.revenue_vs_budget_pct(), None);
    }

    #[test]
    fn sums_do_not_depend_on_order() {
        let p = Portfolio::seed();
        let mut reversed = p.companies().to_vec();
        reversed.reverse();
        let a = PortfolioTotals::compute(p.companies());
        let b = PortfolioTotals::compute(&reversed);
        assert_eq!(a, b);
    }

    #[test]
    fn ratios_for_translogistik() {
        let p = Portfolio::seed();
        let r = CompanyRatios::of(p.find("c3").unwrap());
        assert!((r.ebitda_margin_pct.unwrap() - 8.333).abs() < 0.01);
        assert!((r.revenue_variance.unwrap() + 0.16).abs() < 1e-9);
        assert!((r.cash_days.unwrap() - 13.04).abs() < 0.01);
        assert!((r.net_debt_to_ebitda.unwrap() - 8.0).abs() < 1e-9);
        assert!((r.margin_delta_pts.unwrap() + 3.667).abs() < 0.01);
    }

    #[test]
    fn zero_denominators_yield_none() {
        let mut c = Portfolio::seed().companies()[0].clone();
        c.revenue_ytd = 0.0;
        c.revenue_budget = 0.0;
        c.ebitda_ytd = 0.0;
        let r = CompanyRatios::of(&c);
        assert_eq!(r.ebitda_margin_pct, None);
        assert_eq!(r.margin_delta_pts, None);
        assert_eq!(r.revenue_variance, None);
        assert_eq!(r.cash_days, None);
        assert_eq!(r.net_debt_to_ebitda, None);
        assert_eq!(HeatmapRow::of(&c).margin.label, "n/a");
    }

    #[test]
    fn heatmap_tones_follow_thresholds() {
        let p = Portfolio::seed();
        let row = HeatmapRow::of(p.find("c1").unwrap());
        assert_eq!(row.growth, HeatmapCell::new("96%", Tone::Warning));
        assert_eq!(row.margin, HeatmapCell::new("26%", Tone::Warning));
        assert_eq!(row.cash.label, "Med");
        assert_eq!(row.safety.tone, Tone::Warning);
        assert_eq!(row.delivery, HeatmapCell::new("92%", Tone::Warning));
        assert_eq!(row.compliance.tone, Tone::Warning);

        let row = HeatmapRow::of(p.find("c8").unwrap());
        assert_eq!(row.margin.tone, Tone::Danger);
        assert_eq!(row.cash, HeatmapCell::new("Low", Tone::Danger));
        assert_eq!(row.safety.tone, Tone::Danger);
        assert_eq!(row.delivery.tone, Tone::Danger);
        assert_eq!(row.compliance.tone, Tone::Danger);
    }

    #[test]
    fn sector_mix_shares_sum_to_hundred() {
        let p = Portfolio::seed();
        let mix = sector_mix(p.companies());
        assert_eq!(mix.len(), 8);
        assert_eq!(mix[0].sector, Sector::Resources);
        let total: f64 = mix.iter().map(|s| s.share_pct).sum();
        assert!((total - 100.0).abs() < 1e-9);
        let fmcg = mix.iter().find(|s| s.sector == Sector::Fmcg).unwrap();
        assert_eq!(fmcg.revenue, 15700.0);
    }

    #[test]
    fn variance_drivers_scale_with_budget() {
        let p = Portfolio::seed();
        let d = VarianceDrivers::of(p.find("c1").unwrap());
        assert!((d.volume - 175.0).abs() < 1e-9);
        assert!((d.cost + 280.0).abs() < 1e-9);
        assert_eq!(d.total, -300.0);
    }

    #[test]
    fn alerts_are_derived_and_ordered_by_severity() {
        let p = Portfolio::seed();
        let alerts = attention_alerts(p.companies(), &Config::default(), p.loaded_at());
        let reds: Vec<_> = alerts
            .iter()
            .take_while(|a| a.severity == Health::Red)
            .map(|a| (a.company_id.as_str(), a.kind))
            .collect();
        assert_eq!(
            reds,
            vec![
                ("c1", AlertKind::CashBurn),
                ("c3", AlertKind::CashBurn),
                ("c3", AlertKind::CovenantBreach),
                ("c8", AlertKind::CashBurn),
                ("c8", AlertKind::CovenantBreach),
            ]
        );
        assert!(alerts[reds.len()..].iter().all(|a| a.severity == Health::Amber));
        let stale: Vec<_> = alerts.iter().filter(|a| a.kind == AlertKind::DataStale).collect();
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].company_id, "c3");
        assert_eq!(stale[0].owner, "System");
        let margin: Vec<_> = alerts
            .iter()
            .filter(|a| a.kind == AlertKind::MarginDeterioration)
            .map(|a| a.company_id.as_str())
            .collect();
        assert_eq!(margin, vec!["c3", "c6", "c8", "c10"]);
    }
}
