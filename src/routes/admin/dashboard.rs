use rocket::request::FlashMessage;
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use crate::config::SiteConfig;
use crate::render::admin::{ads_table, contacts_table, designs_table};
use crate::routes::flash_notice;
use crate::security::auth::AdminUser;
use crate::site::AdminConsole;

// ── Dashboard ──────────────────────────────────────────

#[get("/")]
pub fn dashboard(
    admin: AdminUser,
    flash: Option<FlashMessage<'_>>,
    config: &State<SiteConfig>,
    console: &State<AdminConsole>,
) -> Template {
    let base = config.admin_base();
    let stats = console.stats();

    let contacts = console.contacts().unwrap_or_else(|e| {
        log::error!("Could not load contacts: {}", e);
        Vec::new()
    });
    let designs = console.designs().unwrap_or_else(|e| {
        log::error!("Could not load designs: {}", e);
        Vec::new()
    });
    let ads = console.ads().unwrap_or_else(|e| {
        log::error!("Could not load ads: {}", e);
        Vec::new()
    });
    let maintenance = console.maintenance().unwrap_or_else(|e| {
        log::error!("Could not load maintenance flag: {}", e);
        Default::default()
    });

    let context = json!({
        "page_title": "Dashboard",
        "site_name": config.site_name,
        "admin_base": base,
        "admin": admin.account,
        "contacts_count": stats.contacts,
        "designs_count": stats.designs,
        "active_ads_count": stats.active_ads,
        "contacts_rows": contacts_table(&contacts, &base, &config.date_format),
        "designs_rows": designs_table(&designs, &base),
        "ads_rows": ads_table(&ads, &base),
        "maintenance": maintenance,
        "inline_images": config.inline_design_images,
        "notice": flash_notice(flash),
    });

    Template::render("admin/dashboard", &context)
}
