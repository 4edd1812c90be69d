use crate::format::DEFAULT_IDR_PER_USD;
use crate::model::Currency;
use crate::session::Role;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind: String,
    pub port: u16,
    /// Fixed display conversion rate, not a live quote.
    pub idr_per_usd: f64,
    pub default_currency: Currency,
    pub default_role: Role,
    pub default_date_range: String,
    /// Feeds older than this many days raise a data SLA alert.
    pub stale_after_days: i64,
    pub compliance_target: u32,
    /// Companies scoring below this land on the compliance watchlist.
    pub watchlist_below: u32,
    pub cash_days_alert: f64,
    /// Net debt / EBITDA above this raises a covenant alert.
    pub leverage_alert: f64,
    /// Margin shortfall vs budget (percentage points) that raises an alert.
    pub margin_alert_pts: f64,
    pub read_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
            idr_per_usd: DEFAULT_IDR_PER_USD,
            default_currency: Currency::Idr,
            default_role: Role::Ceo,
            default_date_range: "YTD 2026".to_string(),
            stale_after_days: 7,
            compliance_target: 95,
            watchlist_below: 80,
            cash_days_alert: 30.0,
            leverage_alert: 4.5,
            margin_alert_pts: 2.0,
            read_timeout_ms: 5000,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl Config {
    /// Environment overrides on top of [`Config::default`]; unparseable values
    /// keep the default.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            bind: std::env::var("HOLDCO_BIND").unwrap_or(d.bind),
            port: env_parse("HOLDCO_PORT").unwrap_or(d.port),
            idr_per_usd: env_parse::<f64>("HOLDCO_IDR_PER_USD")
                .filter(|r| *r > 0.0)
                .unwrap_or(d.idr_per_usd),
            default_currency: std::env::var("HOLDCO_CURRENCY")
                .ok()
                .and_then(|v| Currency::parse(&v))
                .unwrap_or(d.default_currency),
            default_role: std::env::var("HOLDCO_ROLE")
                .ok()
                .and_then(|v| Role::parse(&v))
                .unwrap_or(d.default_role),
            default_date_range: std::env::var("HOLDCO_DATE_RANGE").unwrap_or(d.default_date_range),
            stale_after_days: env_parse("HOLDCO_STALE_DAYS").unwrap_or(d.stale_after_days),
            compliance_target: env_parse("HOLDCO_COMPLIANCE_TARGET").unwrap_or(d.compliance_target),
            watchlist_below: env_parse("HOLDCO_WATCHLIST_BELOW").unwrap_or(d.watchlist_below),
            cash_days_alert: env_parse("HOLDCO_CASH_DAYS_ALERT").unwrap_or(d.cash_days_alert),
            leverage_alert: env_parse("HOLDCO_LEVERAGE_ALERT").unwrap_or(d.leverage_alert),
            margin_alert_pts: env_parse("HOLDCO_MARGIN_ALERT_PTS").unwrap_or(d.margin_alert_pts),
            read_timeout_ms: env_parse("HOLDCO_READ_TIMEOUT_MS").unwrap_or(d.read_timeout_ms),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_constants() {
        let cfg = Config::default();
        assert_eq!(cfg.idr_per_usd, 15_000.0);
        assert_eq!(cfg.default_currency, Currency::Idr);
        assert_eq!(cfg.default_role, Role::Ceo);
        assert_eq!(cfg.default_date_range, "YTD 2026");
        assert_eq!(cfg.compliance_target, 95);
        assert_eq!(cfg.listen_addr(), "127.0.0.1:8080");
    }
}
