//! Management table bodies. Used by the dashboard template and by the
//! admin live streams, so both always draw the same rows.

use super::{format_date, html_escape, render_list, unbound};
use crate::models::{Ad, Contact, Design, Record};

pub const NO_CONTACTS: &str = "No messages found.";
pub const NO_DESIGNS: &str = "No designs found.";
pub const NO_ADS: &str = "No ads found.";

fn empty_row(columns: usize, text: &str) -> String {
    format!("<tr class=\"empty\"><td colspan=\"{}\" class=\"text-center\">{}</td></tr>", columns, text)
}

fn delete_link(base: &str, collection: &str, key: &str) -> String {
    format!(
        "<a class=\"btn btn-sm btn-danger\" data-confirm=\"delete\" href=\"{}/{}/{}/delete\">Delete</a>",
        base,
        collection,
        html_escape(key)
    )
}

/// Unread messages are drawn bold.
pub fn contacts_table(records: &[Record<Contact>], base: &str, date_format: &str) -> String {
    render_list(
        records,
        &empty_row(5, NO_CONTACTS),
        |r| {
            let c = &r.value;
            let class = if c.read { "" } else { " class=\"unread\"" };
            format!(
                "<tr{class} data-key=\"{key}\"><td>{name}</td><td>{email}</td><td>{subject}</td><td>{date}</td>\
                 <td class=\"actions\"><a class=\"btn btn-sm btn-primary\" href=\"{base}/contacts/{key}\">View</a> {delete}</td></tr>",
                class = class,
                key = html_escape(&r.key),
                name = html_escape(&c.name),
                email = html_escape(&c.email),
                subject = html_escape(&c.subject),
                date = format_date(&c.timestamp, date_format),
                base = base,
                delete = delete_link(base, "contacts", &r.key),
            )
        },
        unbound,
    )
}

pub fn designs_table(records: &[Record<Design>], base: &str) -> String {
    render_list(
        records,
        &empty_row(4, NO_DESIGNS),
        |r| {
            let d = &r.value;
            let thumb = if d.image.is_empty() {
                String::new()
            } else {
                format!(
                    "<img class=\"thumb\" src=\"{}\" alt=\"{}\">",
                    html_escape(&d.image),
                    html_escape(&d.title)
                )
            };
            format!(
                "<tr data-key=\"{key}\"><td>{thumb}</td><td>{title}</td><td>{category}</td>\
                 <td class=\"actions\">{delete}</td></tr>",
                key = html_escape(&r.key),
                thumb = thumb,
                title = html_escape(&d.title),
                category = html_escape(&d.category),
                delete = delete_link(base, "designs", &r.key),
            )
        },
        unbound,
    )
}

/// Toggle posts straight away; delete goes through confirmation.
pub fn ads_table(records: &[Record<Ad>], base: &str) -> String {
    render_list(
        records,
        &empty_row(4, NO_ADS),
        |r| {
            let a = &r.value;
            let (status, action) = if a.active {
                ("Active", "Deactivate")
            } else {
                ("Inactive", "Activate")
            };
            format!(
                "<tr data-key=\"{key}\"><td>{title}</td><td>{kind}</td><td>{status}</td>\
                 <td class=\"actions\"><form class=\"inline\" method=\"post\" action=\"{base}/ads/{key}/toggle\">\
                 <button type=\"submit\" class=\"btn btn-sm btn-primary\">{action}</button></form> {delete}</td></tr>",
                key = html_escape(&r.key),
                title = html_escape(&a.title),
                kind = a.kind.as_str(),
                status = status,
                base = base,
                action = action,
                delete = delete_link(base, "ads", &r.key),
            )
        },
        unbound,
    )
}
