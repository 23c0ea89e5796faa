//! Askama filters shared by the storefront templates.

use std::fmt::Display;

use chrono::Datelike;

/// Year for the footer copyright line: `{{ ""|current_year }}`.
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    Ok(chrono::Local::now().year())
}

/// Friendly name for a signed-in visitor, taken from the part of their
/// email before the `@`: `{{ user|greeting_name }}`.
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn greeting_name(email: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(local_part(&email.to_string()).to_owned())
}

fn local_part(email: &str) -> &str {
    match email.split_once('@') {
        Some((name, _)) if !name.is_empty() => name,
        _ => email,
    }
}
