use rocket::form::Form;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;

use super::{back_to, confirm_page, removal_notice, ConfirmForm};
use crate::config::SiteConfig;
use crate::error::{Notice, Operation, OrFail};
use crate::models::{AdDraft, AdKind};
use crate::security::auth::AdminUser;
use crate::site::console::Confirmation;
use crate::site::AdminConsole;

#[derive(Debug, FromForm)]
pub struct AdForm {
    #[field(default = String::new())]
    pub title: String,
    #[field(name = "type", default = String::from("image"))]
    pub kind: String,
    #[field(default = String::new())]
    pub content: String,
    pub active: bool,
}

#[post("/ads", data = "<form>")]
pub fn ad_create(
    _admin: AdminUser,
    form: Form<AdForm>,
    config: &State<SiteConfig>,
    console: &State<AdminConsole>,
) -> Flash<Redirect> {
    let result = form
        .kind
        .parse::<AdKind>()
        .or_fail(Operation::CreateAd)
        .and_then(|kind| {
            console.create_ad(&AdDraft {
                title: form.title.clone(),
                kind,
                content: form.content.clone(),
                active: form.active,
            })
        });
    back_to(config, "ads", Notice::from_result(&result, |_| "Ad added.".to_string()))
}

/// No confirmation: the change is one click away from being undone.
#[post("/ads/<key>/toggle")]
pub fn ad_toggle(
    _admin: AdminUser,
    key: &str,
    config: &State<SiteConfig>,
    console: &State<AdminConsole>,
) -> Flash<Redirect> {
    let result = console.toggle_ad(key);
    let notice = Notice::from_result(&result, |active| {
        let text = if *active { "Ad activated." } else { "Ad deactivated." };
        text.to_string()
    });
    back_to(config, "ads", notice)
}

#[get("/ads/<key>/delete")]
pub fn ad_delete_confirm(admin: AdminUser, key: &str, config: &State<SiteConfig>) -> Template {
    confirm_page(
        &admin,
        config,
        "Are you sure you want to delete this ad?",
        key,
        &format!("{}/ads/{}/delete", config.admin_base(), key),
        "ads",
    )
}

#[post("/ads/<key>/delete", data = "<form>")]
pub fn ad_delete(
    _admin: AdminUser,
    key: &str,
    form: Form<ConfirmForm>,
    config: &State<SiteConfig>,
    console: &State<AdminConsole>,
) -> Flash<Redirect> {
    let answer = Confirmation::from_answer(form.confirm.as_deref());
    let notice = removal_notice(console.delete_ad(key, answer), "Ad deleted.");
    back_to(config, "ads", notice)
}
