//! Portfolio data model: companies, their initiatives and risk records.
//!
//! Every categorical field is a closed enum. Serde uses the display label
//! (`"In Progress"`, `"Telecom/Tech"`) so JSON matches what the pages show.
//! All monetary fields are billions of IDR; conversion happens only at the
//! display boundary (see `format`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! labeled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant,)+
        }

        impl $name {
            /// All variants in display order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            /// Case-insensitive match against the display label.
            pub fn parse(raw: &str) -> Option<Self> {
                let raw = raw.trim();
                Self::ALL.iter().copied().find(|v| v.label().eq_ignore_ascii_case(raw))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

labeled_enum!(Sector {
    Resources => "Resources",
    Manufacturing => "Manufacturing",
    Fmcg => "FMCG",
    Logistics => "Logistics",
    RealEstate => "Real Estate",
    FinancialServices => "Financial Services",
    TelecomTech => "Telecom/Tech",
    Healthcare => "Healthcare",
});

labeled_enum!(Region {
    DkiJakarta => "DKI Jakarta",
    WestJava => "West Java",
    EastJava => "East Java",
    CentralJava => "Central Java",
    Banten => "Banten",
    Sumatra => "Sumatra",
    Kalimantan => "Kalimantan",
    Sulawesi => "Sulawesi",
    International => "International",
});

labeled_enum!(
    /// Holding-level supervision status of a company.
    Status {
        Normal => "Normal",
        Watch => "Watch",
        Intervention => "Intervention",
    }
);

labeled_enum!(
    /// Traffic-light classification.
    Health {
        Green => "Green",
        Amber => "Amber",
        Red => "Red",
    }
);

labeled_enum!(Currency {
    Idr => "IDR",
    Usd => "USD",
});

labeled_enum!(
    /// Kanban column of an initiative.
    InitiativeStatus {
        NotStarted => "Not Started",
        InProgress => "In Progress",
        Delayed => "Delayed",
        Completed => "Completed",
    }
);

labeled_enum!(RiskCategory {
    Financial => "Financial",
    Operational => "Operational",
    Compliance => "Compliance",
    Strategic => "Strategic",
});

labeled_enum!(
    /// Likelihood / impact grade of a risk.
    Grade {
        Low => "Low",
        Medium => "Medium",
        High => "High",
    }
);

labeled_enum!(RiskStatus {
    Open => "Open",
    Mitigated => "Mitigated",
    Closed => "Closed",
});

/// Visual tone shared by badges, heatmap cells and alert rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Good,
    Warning,
    Danger,
    Info,
    Neutral,
}

impl Tone {
    pub fn css_class(&self) -> &'static str {
        match self {
            Tone::Good => "tone-good",
            Tone::Warning => "tone-warning",
            Tone::Danger => "tone-danger",
            Tone::Info => "tone-info",
            Tone::Neutral => "tone-neutral",
        }
    }
}

impl Status {
    pub fn tone(&self) -> Tone {
        match self {
            Status::Normal => Tone::Good,
            Status::Watch => Tone::Warning,
            Status::Intervention => Tone::Danger,
        }
    }
}

impl Health {
    pub fn tone(&self) -> Tone {
        match self {
            Health::Green => Tone::Good,
            Health::Amber => Tone::Warning,
            Health::Red => Tone::Danger,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Health::Green => "●",
            Health::Amber => "▲",
            Health::Red => "✕",
        }
    }
}

impl InitiativeStatus {
    pub fn tone(&self) -> Tone {
        match self {
            InitiativeStatus::NotStarted => Tone::Neutral,
            InitiativeStatus::InProgress => Tone::Info,
            InitiativeStatus::Delayed => Tone::Danger,
            InitiativeStatus::Completed => Tone::Good,
        }
    }
}

impl Grade {
    pub fn tone(&self) -> Tone {
        match self {
            Grade::Low => Tone::Good,
            Grade::Medium => Tone::Warning,
            Grade::High => Tone::Danger,
        }
    }
}

impl RiskStatus {
    pub fn tone(&self) -> Tone {
        match self {
            RiskStatus::Open => Tone::Danger,
            RiskStatus::Mitigated | RiskStatus::Closed => Tone::Good,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Initiative {
    pub id: String,
    pub title: String,
    pub status: InitiativeStatus,
    pub health: Health,
    /// Percentage of budget consumed; may exceed 100.
    pub budget_burn: f64,
    pub next_milestone: String,
    pub key_risks: Vec<String>,
    pub decision_required: bool,
    pub owner: String,
    pub due_date: NaiveDate,
}

impl Initiative {
    pub fn over_budget(&self) -> bool {
        self.budget_burn > 100.0
    }

    /// Burn clamped for progress bars.
    pub fn burn_bar_pct(&self) -> f64 {
        self.budget_burn.clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    pub id: String,
    pub title: String,
    pub category: RiskCategory,
    pub likelihood: Grade,
    pub impact: Grade,
    pub owner: String,
    pub status: RiskStatus,
}

impl Risk {
    pub fn is_open(&self) -> bool {
        self.status == RiskStatus::Open
    }

    /// Open, high impact and high likelihood.
    pub fn is_critical(&self) -> bool {
        self.is_open() && self.impact == Grade::High && self.likelihood == Grade::High
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    pub sector: Sector,
    pub region: Region,
    pub ownership_percent: f64,
    pub reporting_currency: Currency,
    pub status: Status,
    pub owner: String,

    pub revenue_ytd: f64,
    pub revenue_budget: f64,
    pub revenue_ly: f64,
    pub ebitda_ytd: f64,
    pub ebitda_budget: f64,
    pub ebitda_ly: f64,
    pub net_profit_ytd: f64,
    pub cash: f64,
    pub net_debt: f64,
    pub capex: f64,
    pub working_capital_days: f64,
    pub headcount: u32,

    pub on_time_delivery: f64,
    pub safety_incidents: u32,
    pub compliance_score: u32,
    pub overall_health: Health,

    pub initiatives: Vec<Initiative>,
    pub risks: Vec<Risk>,

    pub last_updated: DateTime<Utc>,
    pub data_source: String,
}

impl Company {
    /// Whole days since the last data refresh.
    pub fn days_since_update(&self, now: DateTime<Utc>) -> i64 {
        (now - self.last_updated).num_days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_parse() {
        for sector in Sector::ALL {
            assert_eq!(Sector::parse(sector.label()), Some(*sector));
        }
        assert_eq!(InitiativeStatus::parse("in progress"), Some(InitiativeStatus::InProgress));
        assert_eq!(Status::parse(" Watch "), Some(Status::Watch));
        assert_eq!(Status::parse("All"), None);
    }

    #[test]
    fn serde_uses_display_labels() {
        let json = serde_json::to_string(&Sector::TelecomTech).unwrap();
        assert_eq!(json, "\"Telecom/Tech\"");
        let back: InitiativeStatus = serde_json::from_str("\"Not Started\"").unwrap();
        assert_eq!(back, InitiativeStatus::NotStarted);
    }

    #[test]
    fn critical_requires_open_high_high() {
        let mut risk = Risk {
            id: "r".into(),
            title: "t".into(),
            category: RiskCategory::Financial,
            likelihood: Grade::High,
            impact: Grade::High,
            owner: "CFO".into(),
            status: RiskStatus::Open,
        };
        assert!(risk.is_critical());
        risk.status = RiskStatus::Mitigated;
        assert!(!risk.is_critical());
        risk.status = RiskStatus::Open;
        risk.likelihood = Grade::Medium;
        assert!(!risk.is_critical());
    }

    #[test]
    fn tones_are_exhaustive() {
        assert_eq!(Status::Intervention.tone(), Tone::Danger);
        assert_eq!(Health::Amber.tone(), Tone::Warning);
        assert_eq!(InitiativeStatus::Completed.tone(), Tone::Good);
        assert_eq!(Grade::Low.tone(), Tone::Good);
    }
}
