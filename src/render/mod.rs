//! Server-side HTML for the public page and the live list fragments.

use std::fmt::Write;

use chrono::{DateTime, Utc};

pub mod admin;
pub mod public;

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Full redraw of a list from a snapshot: every item through `row`, the
/// `placeholder` markup when there are none, then `bind` gets the items
/// and the drawn markup to attach whatever depends on them.
pub fn render_list<I, R, B>(items: &[I], placeholder: &str, row: R, bind: B) -> String
where
    R: Fn(&I) -> String,
    B: FnOnce(&[I], String) -> String,
{
    let body = if items.is_empty() {
        placeholder.to_string()
    } else {
        items.iter().map(row).collect::<Vec<_>>().join("\n")
    };
    bind(items, body)
}

/// Binder for lists with nothing to attach.
pub fn unbound<I>(_items: &[I], html: String) -> String {
    html
}

/// Falls back to ISO dates when `format` is not a valid strftime pattern.
pub fn format_date(ts: &DateTime<Utc>, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", ts.format(format)).is_err() {
        return ts.format("%Y-%m-%d").to_string();
    }
    out
}
