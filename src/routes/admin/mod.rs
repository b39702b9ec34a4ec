use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use crate::config::SiteConfig;
use crate::error::{Notice, OpResult};
use crate::security::auth::AdminUser;
use crate::site::console::Removal;

pub mod ads;
pub mod contacts;
pub mod dashboard;
pub mod designs;
pub mod live;
pub mod maintenance;

/// Answer posted by a confirmation dialog.
#[derive(Debug, FromForm)]
pub struct ConfirmForm {
    pub confirm: Option<String>,
}

/// Back to a dashboard section with a notice.
pub(crate) fn back_to(config: &SiteConfig, section: &str, notice: Notice) -> Flash<Redirect> {
    notice.flash(Redirect::to(format!("{}#{}", config.admin_base(), section)))
}

/// Confirmation dialog in front of a delete. Posting `confirm=yes` to
/// `action` deletes; anything else keeps the record.
pub(crate) fn confirm_page(admin: &AdminUser, config: &SiteConfig, question: &str, detail: &str, action: &str, section: &str) -> Template {
    let ctx = json!({
        "page_title": "Confirm",
        "site_name": config.site_name,
        "admin_base": config.admin_base(),
        "admin": admin.account,
        "question": question,
        "detail": detail,
        "action": action,
        "cancel_url": format!("{}#{}", config.admin_base(), section),
    });
    Template::render("admin/confirm", &ctx)
}

pub(crate) fn removal_notice(result: OpResult<Removal>, removed: &str) -> Notice {
    match result {
        Ok(Removal::Removed) => Notice::success(removed),
        Ok(Removal::Kept) => Notice::info("Deletion cancelled."),
        Err(e) => Notice::failure(&e),
    }
}

/// Catch-all for any admin path whose `AdminUser` guard forwarded:
/// nothing loads until the visitor signs in.
#[get("/<_path..>", rank = 99)]
pub fn redirect_to_login(_path: std::path::PathBuf, config: &State<SiteConfig>) -> Redirect {
    Redirect::to(format!("{}/login", config.admin_base()))
}

#[post("/<_path..>", rank = 99)]
pub fn post_redirect_to_login(_path: std::path::PathBuf, config: &State<SiteConfig>) -> Redirect {
    Redirect::to(format!("{}/login", config.admin_base()))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        dashboard::dashboard,
        contacts::contact_view,
        contacts::contact_delete_confirm,
        contacts::contact_delete,
        designs::design_create,
        designs::design_delete_confirm,
        designs::design_delete,
        ads::ad_create,
        ads::ad_toggle,
        ads::ad_delete_confirm,
        ads::ad_delete,
        maintenance::maintenance_update,
        live::live,
        redirect_to_login,
        post_redirect_to_login,
    ]
}
