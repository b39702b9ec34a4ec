use rocket::form::Form;
use rocket::response::{Flash, Redirect};
use rocket::{Either, State};

use super::back_to;
use crate::config::SiteConfig;
use crate::error::Notice;
use crate::models::Maintenance;
use crate::security::auth::AdminUser;
use crate::site::AdminConsole;

/// Both maintenance forms post the whole pair. `source` tells the toggle
/// (reported) from a message edit (reported only when it fails).
#[derive(Debug, FromForm)]
pub struct MaintenanceForm {
    pub enabled: bool,
    #[field(default = String::new())]
    pub message: String,
    #[field(default = String::from("toggle"))]
    pub source: String,
}

#[post("/maintenance", data = "<form>")]
pub fn maintenance_update(
    _admin: AdminUser,
    form: Form<MaintenanceForm>,
    config: &State<SiteConfig>,
    console: &State<AdminConsole>,
) -> Either<Flash<Redirect>, Redirect> {
    let state = Maintenance {
        enabled: form.enabled,
        message: form.message.trim().to_string(),
    };
    let result = console.set_maintenance(&state);

    match (result, form.source.as_str()) {
        (Err(e), _) => Either::Left(back_to(config, "maintenance", Notice::failure(&e))),
        (Ok(()), "message") => Either::Right(Redirect::to(format!("{}#maintenance", config.admin_base()))),
        (Ok(()), _) => {
            let text = if state.enabled {
                "Maintenance mode enabled."
            } else {
                "Maintenance mode disabled."
            };
            Either::Left(back_to(config, "maintenance", Notice::success(text)))
        }
    }
}
