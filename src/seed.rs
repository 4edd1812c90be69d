//! Static seed dataset and the read-only `Portfolio` fixture built from it.
//!
//! The dataset is constructed once at start-up and never mutated. Refresh
//! timestamps are expressed relative to the construction instant.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

use crate::model::{
    Company, Currency, Grade, Health, Initiative, InitiativeStatus, Region, Risk, RiskCategory,
    RiskStatus, Sector, Status,
};

/// One point of the home page performance series (billions of IDR).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyPoint {
    pub month: &'static str,
    pub revenue: f64,
    pub ebitda: f64,
}

pub const MONTHLY_PERFORMANCE: [MonthlyPoint; 7] = [
    MonthlyPoint { month: "Jan", revenue: 4000.0, ebitda: 2400.0 },
    MonthlyPoint { month: "Feb", revenue: 3000.0, ebitda: 1398.0 },
    MonthlyPoint { month: "Mar", revenue: 2000.0, ebitda: 9800.0 },
    MonthlyPoint { month: "Apr", revenue: 2780.0, ebitda: 3908.0 },
    MonthlyPoint { month: "May", revenue: 1890.0, ebitda: 4800.0 },
    MonthlyPoint { month: "Jun", revenue: 2390.0, ebitda: 3800.0 },
    MonthlyPoint { month: "Jul", revenue: 3490.0, ebitda: 4300.0 },
];

/// Standard report in the reports catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTemplate {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub frequency: &'static str,
    pub format: &'static str,
    pub last_generated: &'static str,
}

pub const REPORT_TEMPLATES: [ReportTemplate; 4] = [
    ReportTemplate {
        id: "weekly-ceo-brief",
        title: "Weekly CEO Brief",
        description: "1-2 page summary of portfolio movements, critical alerts, and cash position.",
        frequency: "Weekly",
        format: "PDF",
        last_generated: "Today, 08:00 AM",
    },
    ReportTemplate {
        id: "monthly-holding-pack",
        title: "Monthly Holding Pack",
        description: "Comprehensive financial and operational review across all sectors.",
        frequency: "Monthly",
        format: "PDF/PPTX",
        last_generated: "Oct 1, 2026",
    },
    ReportTemplate {
        id: "risk-compliance-register",
        title: "Risk & Compliance Register",
        description: "Full export of all open risks, incidents, and compliance scores.",
        frequency: "On-demand",
        format: "CSV/Excel",
        last_generated: "Yesterday, 14:30 PM",
    },
    ReportTemplate {
        id: "initiatives-burn-rate",
        title: "Initiatives Burn Rate",
        description: "Budget vs actuals for all transformation initiatives.",
        frequency: "Bi-weekly",
        format: "CSV",
        last_generated: "Oct 15, 2026",
    },
];

/// Audit calendar shown on the risk page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSchedule {
    pub upcoming: u32,
    pub next_in_days: u32,
}

pub const AUDIT_SCHEDULE: AuditSchedule = AuditSchedule { upcoming: 4, next_in_days: 14 };

/// Read-only set of portfolio companies.
#[derive(Debug, Clone)]
pub struct Portfolio {
    companies: Vec<Company>,
    loaded_at: DateTime<Utc>,
}

impl Portfolio {
    pub fn seed() -> Self {
        Self::seed_at(Utc::now())
    }

    pub fn seed_at(now: DateTime<Utc>) -> Self {
        Self::from_companies(seed_companies(now), now)
    }

    pub fn from_companies(companies: Vec<Company>, loaded_at: DateTime<Utc>) -> Self {
        Self { companies, loaded_at }
    }

    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Lookup by id; `None` is the not-found state, not an error.
    pub fn find(&self, id: &str) -> Option<&Company> {
        self.companies.iter().find(|c| c.id == id)
    }

    pub fn monthly_performance(&self) -> &'static [MonthlyPoint] {
        &MONTHLY_PERFORMANCE
    }

    pub fn report_templates(&self) -> &'static [ReportTemplate] {
        &REPORT_TEMPLATES
    }

    pub fn audit_schedule(&self) -> AuditSchedule {
        AUDIT_SCHEDULE
    }

    /// SHA-256 over the serialized companies, hex encoded.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        match serde_json::to_vec(&self.companies) {
            Ok(bytes) => hasher.update(&bytes),
            Err(_) => hasher.update(b"unserializable"),
        }
        hex::encode(hasher.finalize())
    }

    /// Checks id uniqueness for companies, initiatives and risks.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for company in &self.companies {
            if !seen.insert(company.id.as_str()) {
                return Err(format!("duplicate company id {}", company.id));
            }
            let mut initiative_ids = HashSet::new();
            for init in &company.initiatives {
                if !initiative_ids.insert(init.id.as_str()) {
                    return Err(format!("duplicate initiative id {} in {}", init.id, company.id));
                }
            }
            let mut risk_ids = HashSet::new();
            for risk in &company.risks {
                if !risk_ids.insert(risk.id.as_str()) {
                    return Err(format!("duplicate risk id {} in {}", risk.id, company.id));
                }
            }
        }
        Ok(())
    }
}

impl Default for Portfolio {
    fn default() -> Self {
        Self::seed()
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn initiative(
    id: &str,
    title: &str,
    status: InitiativeStatus,
    health: Health,
    budget_burn: f64,
    next_milestone: &str,
    key_risks: &[&str],
    decision_required: bool,
    owner: &str,
    due_date: NaiveDate,
) -> Initiative {
    Initiative {
        id: id.into(),
        title: title.into(),
        status,
        health,
        budget_burn,
        next_milestone: next_milestone.into(),
        key_risks: key_risks.iter().map(|s| s.to_string()).collect(),
        decision_required,
        owner: owner.into(),
        due_date,
    }
}

fn risk(
    id: &str,
    title: &str,
    category: RiskCategory,
    likelihood: Grade,
    impact: Grade,
    owner: &str,
    status: RiskStatus,
) -> Risk {
    Risk {
        id: id.into(),
        title: title.into(),
        category,
        likelihood,
        impact,
        owner: owner.into(),
        status,
    }
}

/// The ten seed companies, refreshed `n` days before `now`.
pub fn seed_companies(now: DateTime<Utc>) -> Vec<Company> {
    let days_ago = |n: i64| now - Duration::days(n);
    use Grade::{High, Low, Medium};

    vec![
        Company {
            id: "c1".into(),
            name: "Nusantara Energy".into(),
            sector: Sector::Resources,
            region: Region::Kalimantan,
            ownership_percent: 65.0,
            reporting_currency: Currency::Usd,
            status: Status::Watch,
            owner: "Budi S.".into(),
            revenue_ytd: 12500.0,
            revenue_budget: 13000.0,
            revenue_ly: 11000.0,
            ebitda_ytd: 3200.0,
            ebitda_budget: 3500.0,
            ebitda_ly: 2800.0,
            net_profit_ytd: 1500.0,
            cash: 800.0,
            net_debt: 4500.0,
            capex: 1200.0,
            working_capital_days: 45.0,
            headcount: 4500,
            on_time_delivery: 92.0,
            safety_incidents: 3,
            compliance_score: 85,
            overall_health: Health::Amber,
            initiatives: vec![initiative(
                "i1",
                "Mine Automation Phase 1",
                InitiativeStatus::InProgress,
                Health::Amber,
                65.0,
                "Fleet Deployment",
                &["Supply chain delays"],
                true,
                "Andi M.",
                date(2026, 4, 15),
            )],
            risks: vec![
                risk("r1", "Coal Price Volatility", RiskCategory::Financial, High, High, "CFO", RiskStatus::Open),
                risk("r2", "Environmental Permit Renewal", RiskCategory::Compliance, Medium, High, "Legal", RiskStatus::Open),
            ],
            last_updated: days_ago(2),
            data_source: "SAP ERP".into(),
        },
        Company {
            id: "c2".into(),
            name: "IndoAgri Foods".into(),
            sector: Sector::Fmcg,
            region: Region::WestJava,
            ownership_percent: 100.0,
            reporting_currency: Currency::Idr,
            status: Status::Normal,
            owner: "Siti W.".into(),
            revenue_ytd: 8500.0,
            revenue_budget: 8200.0,
            revenue_ly: 7800.0,
            ebitda_ytd: 1400.0,
            ebitda_budget: 1350.0,
            ebitda_ly: 1200.0,
            net_profit_ytd: 800.0,
            cash: 1200.0,
            net_debt: 1500.0,
            capex: 300.0,
            working_capital_days: 25.0,
            headcount: 8200,
            on_time_delivery: 98.0,
            safety_incidents: 0,
            compliance_score: 95,
            overall_health: Health::Green,
            initiatives: vec![initiative(
                "i2",
                "New Plant Construction",
                InitiativeStatus::InProgress,
                Health::Green,
                40.0,
                "Roofing Complete",
                &["Weather delays"],
                false,
                "Rudi H.",
                date(2026, 8, 1),
            )],
            risks: vec![risk(
                "r3",
                "Raw Material Inflation",
                RiskCategory::Operational,
                High,
                Medium,
                "Procurement",
                RiskStatus::Mitigated,
            )],
            last_updated: days_ago(1),
            data_source: "Oracle NetSuite".into(),
        },
        Company {
            id: "c3".into(),
            name: "TransLogistik ID".into(),
            sector: Sector::Logistics,
            region: Region::DkiJakarta,
            ownership_percent: 80.0,
            reporting_currency: Currency::Idr,
            status: Status::Intervention,
            owner: "Hendra T.".into(),
            revenue_ytd: 4200.0,
            revenue_budget: 5000.0,
            revenue_ly: 4800.0,
            ebitda_ytd: 350.0,
            ebitda_budget: 600.0,
            ebitda_ly: 550.0,
            net_profit_ytd: -50.0,
            cash: 150.0,
            net_debt: 2800.0,
            capex: 150.0,
            working_capital_days: 65.0,
            headcount: 3100,
            on_time_delivery: 82.0,
            safety_incidents: 5,
            compliance_score: 72,
            overall_health: Health::Red,
            initiatives: vec![initiative(
                "i3",
                "Fleet Optimization",
                InitiativeStatus::Delayed,
                Health::Red,
                90.0,
                "Route AI Integration",
                &["Vendor underperformance", "Budget overrun"],
                true,
                "Hendra T.",
                date(2026, 3, 1),
            )],
            risks: vec![
                risk("r4", "Fuel Price Hike", RiskCategory::Financial, High, High, "CFO", RiskStatus::Open),
                risk("r5", "Driver Strike", RiskCategory::Operational, Medium, High, "HR", RiskStatus::Open),
            ],
            // stale feed
            last_updated: days_ago(8),
            data_source: "Custom TMS".into(),
        },
        Company {
            id: "c4".into(),
            name: "Mega Property Group".into(),
            sector: Sector::RealEstate,
            region: Region::DkiJakarta,
            ownership_percent: 55.0,
            reporting_currency: Currency::Idr,
            status: Status::Normal,
            owner: "Diana R.".into(),
            revenue_ytd: 6800.0,
            revenue_budget: 6500.0,
            revenue_ly: 6200.0,
            ebitda_ytd: 2100.0,
            ebitda_budget: 2000.0,
            ebitda_ly: 1900.0,
            net_profit_ytd: 1200.0,
            cash: 2500.0,
            net_debt: 8500.0,
            capex: 4500.0,
            working_capital_days: 120.0,
            headcount: 1500,
            on_time_delivery: 95.0,
            safety_incidents: 1,
            compliance_score: 90,
            overall_health: Health::Green,
            initiatives: vec![initiative(
                "i4",
                "CBD Tower 3 Launch",
                InitiativeStatus::InProgress,
                Health::Green,
                20.0,
                "Pre-sales opening",
                &[],
                false,
                "Diana R.",
                date(2026, 6, 15),
            )],
            risks: vec![risk(
                "r6",
                "Interest Rate Hike",
                RiskCategory::Financial,
                High,
                High,
                "Treasury",
                RiskStatus::Open,
            )],
            last_updated: days_ago(0),
            data_source: "Yardi".into(),
        },
        Company {
            id: "c5".into(),
            name: "FinBank Nusantara".into(),
            sector: Sector::FinancialServices,
            region: Region::DkiJakarta,
            ownership_percent: 40.0,
            reporting_currency: Currency::Idr,
            status: Status::Normal,
            owner: "Tito S.".into(),
            revenue_ytd: 15500.0,
            revenue_budget: 15000.0,
            revenue_ly: 14200.0,
            ebitda_ytd: 6500.0,
            ebitda_budget: 6200.0,
            ebitda_ly: 5800.0,
            net_profit_ytd: 4200.0,
            cash: 15000.0,
            net_debt: 0.0,
            capex: 800.0,
            working_capital_days: 0.0,
            headcount: 12000,
            on_time_delivery: 99.0,
            safety_incidents: 0,
            compliance_score: 98,
            overall_health: Health::Green,
            initiatives: vec![initiative(
                "i5",
                "Digital Banking App v3",
                InitiativeStatus::InProgress,
                Health::Amber,
                75.0,
                "UAT Sign-off",
                &["Security audit findings"],
                false,
                "CTO",
                date(2026, 5, 1),
            )],
            risks: vec![
                risk("r7", "Cybersecurity Breach", RiskCategory::Operational, Medium, High, "CISO", RiskStatus::Open),
                risk("r8", "NPL Increase", RiskCategory::Financial, Medium, High, "CRO", RiskStatus::Mitigated),
            ],
            last_updated: days_ago(0),
            data_source: "Core Banking".into(),
        },
        Company {
            id: "c6".into(),
            name: "TelcoNet".into(),
            sector: Sector::TelecomTech,
            region: Region::International,
            ownership_percent: 100.0,
            reporting_currency: Currency::Usd,
            status: Status::Watch,
            owner: "Kevin W.".into(),
            revenue_ytd: 9200.0,
            revenue_budget: 9500.0,
            revenue_ly: 8900.0,
            ebitda_ytd: 4100.0,
            ebitda_budget: 4500.0,
            ebitda_ly: 4000.0,
            net_profit_ytd: 1800.0,
            cash: 3200.0,
            net_debt: 12000.0,
            capex: 5500.0,
            working_capital_days: 35.0,
            headcount: 6500,
            on_time_delivery: 96.0,
            safety_incidents: 0,
            compliance_score: 88,
            overall_health: Health::Amber,
            initiatives: vec![initiative(
                "i6",
                "5G Rollout Phase 2",
                InitiativeStatus::InProgress,
                Health::Amber,
                55.0,
                "1000 Sites Active",
                &["Equipment import delays"],
                true,
                "Kevin W.",
                date(2026, 7, 30),
            )],
            risks: vec![risk(
                "r9",
                "Regulatory Spectrum Fee",
                RiskCategory::Compliance,
                High,
                Medium,
                "GovRel",
                RiskStatus::Open,
            )],
            last_updated: days_ago(1),
            data_source: "SAP ERP".into(),
        },
        Company {
            id: "c7".into(),
            name: "SehatCare Hospitals".into(),
            sector: Sector::Healthcare,
            region: Region::EastJava,
            ownership_percent: 90.0,
            reporting_currency: Currency::Idr,
            status: Status::Normal,
            owner: "Dr. Anita".into(),
            revenue_ytd: 3800.0,
            revenue_budget: 3600.0,
            revenue_ly: 3200.0,
            ebitda_ytd: 850.0,
            ebitda_budget: 800.0,
            ebitda_ly: 700.0,
            net_profit_ytd: 450.0,
            cash: 600.0,
            net_debt: 1200.0,
            capex: 400.0,
            working_capital_days: 40.0,
            headcount: 4200,
            on_time_delivery: 98.0,
            safety_incidents: 1,
            compliance_score: 96,
            overall_health: Health::Green,
            initiatives: vec![initiative(
                "i7",
                "New Wing Surabaya",
                InitiativeStatus::Completed,
                Health::Green,
                98.0,
                "Grand Opening",
                &[],
                false,
                "Dr. Anita",
                date(2026, 2, 20),
            )],
            risks: vec![risk(
                "r10",
                "Medical Malpractice Claim",
                RiskCategory::Operational,
                Low,
                High,
                "Legal",
                RiskStatus::Mitigated,
            )],
            last_updated: days_ago(0),
            data_source: "HIS".into(),
        },
        Company {
            id: "c8".into(),
            name: "Pabrik Baja Sentosa".into(),
            sector: Sector::Manufacturing,
            region: Region::Banten,
            ownership_percent: 100.0,
            reporting_currency: Currency::Idr,
            status: Status::Intervention,
            owner: "Joko P.".into(),
            revenue_ytd: 5400.0,
            revenue_budget: 6200.0,
            revenue_ly: 6000.0,
            ebitda_ytd: 420.0,
            ebitda_budget: 850.0,
            ebitda_ly: 800.0,
            net_profit_ytd: -120.0,
            cash: 80.0,
            net_debt: 3500.0,
            capex: 200.0,
            working_capital_days: 85.0,
            headcount: 2800,
            on_time_delivery: 75.0,
            safety_incidents: 8,
            compliance_score: 65,
            overall_health: Health::Red,
            initiatives: vec![initiative(
                "i8",
                "Furnace Upgrade",
                InitiativeStatus::Delayed,
                Health::Red,
                110.0,
                "Testing",
                &["Contractor dispute"],
                true,
                "Joko P.",
                date(2026, 1, 15),
            )],
            risks: vec![
                risk("r11", "Scrap Metal Shortage", RiskCategory::Operational, High, High, "Procurement", RiskStatus::Open),
                risk("r12", "Environmental Fine", RiskCategory::Compliance, High, Medium, "HSE", RiskStatus::Open),
            ],
            last_updated: days_ago(3),
            data_source: "SAP ERP".into(),
        },
        Company {
            id: "c9".into(),
            name: "Agro Makmur".into(),
            sector: Sector::Fmcg,
            region: Region::Sumatra,
            ownership_percent: 75.0,
            reporting_currency: Currency::Idr,
            status: Status::Normal,
            owner: "Lina K.".into(),
            revenue_ytd: 7200.0,
            revenue_budget: 7000.0,
            revenue_ly: 6800.0,
            ebitda_ytd: 1600.0,
            ebitda_budget: 1500.0,
            ebitda_ly: 1450.0,
            net_profit_ytd: 900.0,
            cash: 1100.0,
            net_debt: 2200.0,
            capex: 450.0,
            working_capital_days: 30.0,
            headcount: 15000,
            on_time_delivery: 94.0,
            safety_incidents: 2,
            compliance_score: 92,
            overall_health: Health::Green,
            initiatives: vec![initiative(
                "i9",
                "Sustainable Sourcing Cert",
                InitiativeStatus::InProgress,
                Health::Green,
                50.0,
                "Audit Phase 1",
                &[],
                false,
                "Lina K.",
                date(2026, 9, 1),
            )],
            risks: vec![risk(
                "r13",
                "Weather Anomalies (El Nino)",
                RiskCategory::Operational,
                Medium,
                High,
                "Operations",
                RiskStatus::Open,
            )],
            last_updated: days_ago(1),
            data_source: "Oracle NetSuite".into(),
        },
        Company {
            id: "c10".into(),
            name: "IndoTech Solutions".into(),
            sector: Sector::TelecomTech,
            region: Region::DkiJakarta,
            ownership_percent: 60.0,
            reporting_currency: Currency::Idr,
            status: Status::Watch,
            owner: "Ferry A.".into(),
            revenue_ytd: 2800.0,
            revenue_budget: 3200.0,
            revenue_ly: 2500.0,
            ebitda_ytd: 450.0,
            ebitda_budget: 600.0,
            ebitda_ly: 380.0,
            net_profit_ytd: 200.0,
            cash: 400.0,
            net_debt: 800.0,
            capex: 150.0,
            working_capital_days: 55.0,
            headcount: 850,
            on_time_delivery: 88.0,
            safety_incidents: 0,
            compliance_score: 85,
            overall_health: Health::Amber,
            initiatives: vec![initiative(
                "i10",
                "Cloud Migration Services Launch",
                InitiativeStatus::InProgress,
                Health::Amber,
                80.0,
                "Go-Live",
                &["Talent shortage"],
                false,
                "Ferry A.",
                date(2026, 4, 1),
            )],
            risks: vec![risk(
                "r14",
                "Key Talent Attrition",
                RiskCategory::Operational,
                High,
                Medium,
                "HR",
                RiskStatus::Open,
            )],
            last_updated: days_ago(2),
            data_source: "Workday".into(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_has_ten_valid_companies() {
        let portfolio = Portfolio::seed();
        assert_eq!(portfolio.len(), 10);
        assert!(portfolio.validate().is_ok());
    }

    #[test]
    fn find_returns_none_for_unknown_id() {
        let portfolio = Portfolio::seed();
        assert_eq!(portfolio.find("c8").map(|c| c.name.as_str()), Some("Pabrik Baja Sentosa"));
        assert!(portfolio.find("c99").is_none());
    }

    #[test]
    fn refresh_ages_are_relative_to_load_time() {
        let now = Utc::now();
        let portfolio = Portfolio::seed_at(now);
        let stale = portfolio.find("c3").unwrap();
        assert_eq!(stale.days_since_update(now), 8);
        assert_eq!(portfolio.find("c4").unwrap().days_since_update(now), 0);
    }

    #[test]
    fn fingerprint_is_deterministic_for_same_instant() {
        let now = Utc::now();
        let a = Portfolio::seed_at(now).fingerprint();
        let b = Portfolio::seed_at(now).fingerprint();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn validate_rejects_duplicate_company_ids() {
        let now = Utc::now();
        let mut companies = seed_companies(now);
        companies[1].id = "c1".into();
        let portfolio = Portfolio::from_companies(companies, now);
        assert!(portfolio.validate().unwrap_err().contains("c1"));
    }
}
