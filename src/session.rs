//! Shared UI state: display currency, viewing role and date-range label.
//!
//! `AppProvider` owns the state; consumers receive a `StateHandle` explicitly.
//! A handle that outlives its provider is a programmer error and panics on
//! use instead of falling back to defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use crate::config::Config;
use crate::model::Currency;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "CEO")]
    Ceo,
    #[serde(rename = "Risk Officer")]
    RiskOfficer,
    #[serde(rename = "BU CEO")]
    BuCeo,
}

impl Role {
    pub const ALL: &'static [Role] = &[Role::Ceo, Role::RiskOfficer, Role::BuCeo];

    /// Query/serde value.
    pub fn key(&self) -> &'static str {
        match self {
            Role::Ceo => "CEO",
            Role::RiskOfficer => "Risk Officer",
            Role::BuCeo => "BU CEO",
        }
    }

    /// Label shown in the role selector.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Ceo => "Group CEO",
            Role::RiskOfficer => "Risk Officer",
            Role::BuCeo => "BU CEO",
        }
    }

    /// Accepts either the key or the selector label.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.key().eq_ignore_ascii_case(raw) || r.label().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    currency: Currency,
    role: Role,
    date_range: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            currency: Currency::Idr,
            role: Role::Ceo,
            date_range: "YTD 2026".to_string(),
        }
    }
}

impl AppState {
    pub fn new(currency: Currency, role: Role, date_range: impl Into<String>) -> Self {
        Self { currency, role, date_range: date_range.into() }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.default_currency, cfg.default_role, cfg.default_date_range.clone())
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn set_currency(&mut self, currency: Currency) {
        self.currency = currency;
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = role;
    }

    pub fn date_range(&self) -> &str {
        &self.date_range
    }

    pub fn set_date_range(&mut self, date_range: impl Into<String>) {
        self.date_range = date_range.into();
    }
}

/// Owning scope of the UI state.
#[derive(Debug)]
pub struct AppProvider {
    inner: Arc<Mutex<AppState>>,
}

impl AppProvider {
    pub fn new(initial: AppState) -> Self {
        Self { inner: Arc::new(Mutex::new(initial)) }
    }

    pub fn handle(&self) -> StateHandle {
        StateHandle { inner: Arc::downgrade(&self.inner) }
    }
}

/// Accessor handed to consumers of the UI state.
#[derive(Debug, Clone)]
pub struct StateHandle {
    inner: Weak<Mutex<AppState>>,
}

impl StateHandle {
    fn with<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> R {
        let Some(inner) = self.inner.upgrade() else {
            panic!("StateHandle used outside its AppProvider scope");
        };
        let mut guard = inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }

    pub fn snapshot(&self) -> AppState {
        self.with(|s| s.clone())
    }

    pub fn currency(&self) -> Currency {
        self.with(|s| s.currency())
    }

    pub fn set_currency(&self, currency: Currency) {
        self.with(|s| s.set_currency(currency))
    }

    pub fn role(&self) -> Role {
        self.with(|s| s.role())
    }

    pub fn set_role(&self, role: Role) {
        self.with(|s| s.set_role(role))
    }

    pub fn date_range(&self) -> String {
        self.with(|s| s.date_range().to_string())
    }

    pub fn set_date_range(&self, date_range: impl Into<String>) {
        let date_range = date_range.into();
        self.with(|s| s.set_date_range(date_range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_are_visible_through_every_handle() {
        let provider = AppProvider::new(AppState::default());
        let a = provider.handle();
        let b = provider.handle();
        a.set_currency(Currency::Usd);
        b.set_role(Role::RiskOfficer);
        a.set_date_range("Q3 2026");
        let snap = b.snapshot();
        assert_eq!(snap.currency(), Currency::Usd);
        assert_eq!(snap.role(), Role::RiskOfficer);
        assert_eq!(snap.date_range(), "Q3 2026");
    }

    #[test]
    #[should_panic(expected = "outside its AppProvider scope")]
    fn handle_after_provider_drop_panics() {
        let provider = AppProvider::new(AppState::default());
        let handle = provider.handle();
        drop(provider);
        let _ = handle.currency();
    }

    #[test]
    fn role_parses_key_and_label() {
        assert_eq!(Role::parse("CEO"), Some(Role::Ceo));
        assert_eq!(Role::parse("Group CEO"), Some(Role::Ceo));
        assert_eq!(Role::parse("bu ceo"), Some(Role::BuCeo));
        assert_eq!(Role::parse("CFO"), None);
    }

    #[test]
    fn state_serializes_camel_case() {
        let json = serde_json::to_value(AppState::default()).unwrap();
        assert_eq!(json["currency"], "IDR");
        assert_eq!(json["role"], "CEO");
        assert_eq!(json["dateRange"], "YTD 2026");
    }
}
