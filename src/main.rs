#[macro_use]
extern crate rocket;

use std::process;
use std::sync::Arc;

use rocket::data::{Limits, ToByteUnit};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::fs::{FileServer, Options};
use rocket::http::Header;
use rocket::response::content::RawHtml;
use rocket::{Build, Rocket};
use rocket_dyn_templates::Template;

mod boot;
mod config;
mod db;
mod error;
mod files;
mod identity;
mod mailer;
mod models;
mod rate_limit;
mod render;
mod routes;
mod security;
mod site;
mod store;
mod tasks;

#[cfg(test)]
mod tests;

use config::{SiteConfig, StoreBackend};
use files::{FileStore, LocalFileStore};
use identity::{GoogleOAuth, IdentityProvider, LocalIdentity};
use mailer::SmtpMailer;
use rate_limit::RateLimiter;
use site::{AdminConsole, AuthGateway, ContactInbox, MaintenanceGate, PublicRenderer};
use store::mongo::MongoStore;
use store::sqlite::SqliteStore;
use store::Store;

pub struct NoCacheAdmin;

#[rocket::async_trait]
impl Fairing for NoCacheAdmin {
    fn info(&self) -> Info {
        Info { name: "No-Cache Admin Pages", kind: Kind::Response }
    }

    async fn on_response<'r>(&self, req: &'r rocket::Request<'_>, res: &mut rocket::Response<'r>) {
        let prefix = req
            .rocket()
            .state::<SiteConfig>()
            .map(|c| c.admin_base())
            .unwrap_or_else(|| "/admin".to_string());
        if req.uri().path().starts_with(&*prefix) {
            res.set_header(Header::new("Cache-Control", "no-store, no-cache, must-revalidate, max-age=0"));
            res.set_header(Header::new("Pragma", "no-cache"));
        }
    }
}

#[catch(404)]
fn not_found() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>404</h1><p>Page not found.</p><a href='/'>← Home</a></body></html>".to_string())
}

#[catch(500)]
fn server_error() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>500</h1><p>Internal server error.</p><a href='/'>← Home</a></body></html>".to_string())
}

/// Wires the components over the given collaborators. Tests call this with
/// doubles; `rocket()` with the configured backends.
pub fn assemble(
    config: SiteConfig,
    store: Arc<dyn Store>,
    identity: Arc<dyn IdentityProvider>,
    files: Arc<dyn FileStore>,
) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .join(("template_dir", "website/templates"))
        // Design images arrive whole in one multipart form
        .merge((
            "limits",
            Limits::default()
                .limit("file", 20.mebibytes())
                .limit("data-form", 25.mebibytes()),
        ));

    let admin_mount = config.admin_base();
    let uploads_dir = config.uploads_dir.clone();

    rocket::custom(figment)
        .manage(PublicRenderer::new(store.clone()))
        .manage(ContactInbox::new(store.clone()))
        .manage(MaintenanceGate::new(store.clone()))
        .manage(AdminConsole::new(store.clone(), files, config.inline_design_images))
        .manage(AuthGateway::new(identity.clone()))
        .manage(identity)
        .manage(store)
        .manage(Arc::new(RateLimiter::new()))
        .manage(config)
        .attach(Template::fairing())
        .attach(NoCacheAdmin)
        .attach(tasks::BackgroundTasks)
        .mount("/static", FileServer::new(boot::STATIC_DIR, Options::Index | Options::Missing))
        .mount("/uploads", FileServer::new(uploads_dir, Options::Index | Options::Missing))
        .mount("/", routes::public::routes())
        .mount("/", routes::live::routes())
        .mount(&admin_mount, routes::auth::routes())
        .mount(&admin_mount, routes::admin::routes())
        .register("/", catchers![not_found, server_error])
}

#[launch]
fn rocket() -> _ {
    env_logger::init();

    let config = SiteConfig::load().unwrap_or_else(|e| {
        log::error!("{}", e);
        process::exit(1);
    });

    // Boot check: create directories, validate critical files
    boot::run(&config);

    let pool = db::init_pool_at(&config.database_path).expect("Failed to initialize database pool");
    db::run_migrations(&pool).expect("Failed to run database migrations");

    let store: Arc<dyn Store> = match config.store_backend {
        StoreBackend::Sqlite => Arc::new(SqliteStore::new(pool.clone())),
        StoreBackend::Mongo => {
            let mongo = MongoStore::new(&config.mongo_uri, &config.mongo_database)
                .expect("Failed to connect to MongoDB");
            mongo.test_connection().expect("MongoDB is not reachable");
            Arc::new(mongo)
        }
    };
    store.run_migrations().expect("Failed to prepare the document store");

    let base = config.admin_base();
    let mailer = Arc::new(SmtpMailer::new(config.smtp.clone()));
    let mut local = LocalIdentity::new(
        pool,
        mailer,
        &config.absolute_url(&format!("{}/reset-password", base)),
        &config.site_name,
    )
    .with_session_hours(config.session_expiry_hours);
    if let Some(google) = &config.google {
        local = local.with_google(GoogleOAuth::new(
            &google.client_id,
            &google.client_secret,
            &config.absolute_url(&format!("{}/login/google/callback", base)),
        ));
    }
    boot::seed_admin(&config, &local);

    let files = Arc::new(LocalFileStore::new(&config.uploads_dir, "/uploads"));

    log::info!("Admin panel mounted at: {}", base);
    assemble(config, store, Arc::new(local), files)
}
