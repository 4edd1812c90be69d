use serde::Serialize;

use crate::format::format_number;
use crate::views::html::{card, escape, inert_button, page_header};
use crate::views::ViewContext;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub email: &'static str,
}

const PROFILE: Profile = Profile {
    first_name: "Admin",
    last_name: "User",
    email: "admin@nusantara.co.id",
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub profile: Profile,
    pub currency: &'static str,
    pub role: &'static str,
    pub date_range: String,
    pub conversion: String,
}

impl SettingsView {
    pub fn build(ctx: &ViewContext) -> Self {
        Self {
            profile: PROFILE,
            currency: ctx.state.currency().label(),
            role: ctx.state.role().label(),
            date_range: ctx.state.date_range().to_string(),
            conversion: format!("1 USD = {} IDR", format_number(ctx.config.idr_per_usd)),
        }
    }

    pub fn render(&self) -> String {
        let field = |label: &str, name: &str, value: &str| {
            format!(
                r#"<label class="field"><span class="muted">{}</span><input name="{}" value="{}" disabled></label>"#,
                label,
                name,
                escape(value)
            )
        };
        let profile = format!(
            "<div class=\"grid grid-2\">{}{}</div>{}<p>{}</p>",
            field("First Name", "first_name", self.profile.first_name),
            field("Last Name", "last_name", self.profile.last_name),
            field("Email Address", "email", self.profile.email),
            inert_button("Save Changes"),
        );
        let prefs = format!(
            r#"<table><tr><td>Display Currency</td><td class="num">{}</td></tr><tr><td>Role View</td><td class="num">{}</td></tr><tr><td>Reporting Period</td><td class="num">{}</td></tr><tr><td>Conversion Rate</td><td class="num">{}</td></tr></table><p class="muted">Change currency and role from the top bar.</p>"#,
            self.currency,
            escape(self.role),
            escape(&self.date_range),
            escape(&self.conversion),
        );
        [
            page_header("Settings", "Profile and display preferences", ""),
            format!(
                r#"<div class="grid grid-2">{}{}</div>"#,
                card("Profile Information", &profile),
                card("Display Preferences", &prefs)
            ),
        ]
        .concat()
    }
}
