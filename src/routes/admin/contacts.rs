use rocket::form::Form;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use super::{back_to, confirm_page, removal_notice, ConfirmForm};
use crate::config::SiteConfig;
use crate::error::Notice;
use crate::render::format_date;
use crate::security::auth::AdminUser;
use crate::site::console::Confirmation;
use crate::site::AdminConsole;

/// Full message in a dialog page. Opening it marks the message read.
#[get("/contacts/<key>")]
pub fn contact_view(
    admin: AdminUser,
    key: &str,
    config: &State<SiteConfig>,
    console: &State<AdminConsole>,
) -> Result<Template, Flash<Redirect>> {
    let record = console
        .view_contact(key)
        .map_err(|e| back_to(config, "contacts", Notice::failure(&e)))?;
    let contact = &record.value;

    let ctx = json!({
        "page_title": format!("Message from {}", contact.name),
        "site_name": config.site_name,
        "admin_base": config.admin_base(),
        "admin": admin.account,
        "key": record.key,
        "contact": contact,
        "received": format_date(&contact.timestamp, &config.date_format),
    });
    Ok(Template::render("admin/contact_view", &ctx))
}

#[get("/contacts/<key>/delete")]
pub fn contact_delete_confirm(admin: AdminUser, key: &str, config: &State<SiteConfig>) -> Template {
    confirm_page(
        &admin,
        config,
        "Are you sure you want to delete this message?",
        key,
        &format!("{}/contacts/{}/delete", config.admin_base(), key),
        "contacts",
    )
}

#[post("/contacts/<key>/delete", data = "<form>")]
pub fn contact_delete(
    _admin: AdminUser,
    key: &str,
    form: Form<ConfirmForm>,
    config: &State<SiteConfig>,
    console: &State<AdminConsole>,
) -> Flash<Redirect> {
    let answer = Confirmation::from_answer(form.confirm.as_deref());
    let notice = removal_notice(console.delete_contact(key, answer), "Message deleted.");
    back_to(config, "contacts", notice)
}
