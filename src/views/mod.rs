//! Page view models and their HTML rendering.
//!
//! Every page has a serde-serializable view model built from a
//! [`ViewContext`]; the HTML routes render it inside the shared layout and
//! the `/api/*` routes serialize it as-is.

pub mod company;
pub mod home;
pub mod html;
pub mod initiatives;
pub mod layout;
pub mod portfolio;
pub mod reports;
pub mod risk;
pub mod settings;

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::format::{format_currency, format_ratio};
use crate::seed::Portfolio;
use crate::session::AppState;

/// Everything a page needs to build its view model.
#[derive(Debug, Clone)]
pub struct ViewContext<'a> {
    pub portfolio: &'a Portfolio,
    pub config: &'a Config,
    pub state: AppState,
    pub now: DateTime<Utc>,
    /// Request target (path and query), used for nav highlighting and as the
    /// return address of topbar controls.
    pub location: String,
}

impl<'a> ViewContext<'a> {
    pub fn new(
        portfolio: &'a Portfolio,
        config: &'a Config,
        state: AppState,
        now: DateTime<Utc>,
        location: impl Into<String>,
    ) -> Self {
        Self { portfolio, config, state, now, location: location.into() }
    }

    /// Billions of IDR in the selected display currency.
    pub fn money(&self, value_bn: f64) -> String {
        format_currency(value_bn, self.state.currency(), self.config.idr_per_usd)
    }

    pub fn money_opt(&self, value_bn: Option<f64>) -> String {
        format_ratio(value_bn, |v| self.money(v))
    }

    /// Path component of the location.
    pub fn path(&self) -> &str {
        self.location.split('?').next().unwrap_or("/")
    }
}
