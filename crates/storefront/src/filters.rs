//! Custom Askama template filters and display formatting.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use rust_decimal::Decimal;
use techmart_core::round_money;

/// Format an amount for display, e.g. `$99.99`.
#[must_use]
pub fn format_money(amount: Decimal) -> String {
    format!("${:.2}", round_money(amount))
}

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the URL of the content-hashed stylesheet.
///
/// The hash is computed at build time from `static/css/main.css`; without it
/// the unhashed file is served.
///
/// Usage in templates: `{{ ""|stylesheet_href }}`
#[askama::filter_fn]
pub fn stylesheet_href(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(stylesheet_path(env!("CSS_HASH")))
}

fn stylesheet_path(hash: &str) -> String {
    if hash.is_empty() {
        "/static/css/main.css".to_string()
    } else {
        format!("/static/css/derived/main.{hash}.css")
    }
}
