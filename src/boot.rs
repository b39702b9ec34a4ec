use log::{error, info, warn};
use std::fs;
use std::path::Path;
use std::process;

use crate::config::{SiteConfig, CONFIG_FILE};
use crate::identity::LocalIdentity;

const TEMPLATE_DIR: &str = "website/templates";
pub const STATIC_DIR: &str = "website/static";

/// Templates the server cannot run without.
const CRITICAL_TEMPLATES: &[&str] = &[
    "website/templates/admin/base.html.tera",
    "website/templates/admin/login.html.tera",
    "website/templates/admin/forgot_password.html.tera",
    "website/templates/admin/reset_password.html.tera",
    "website/templates/admin/dashboard.html.tera",
    "website/templates/admin/confirm.html.tera",
    "website/templates/admin/contact_view.html.tera",
];

/// Assets whose absence degrades the pages but does not break them.
const STATIC_ASSETS: &[&str] = &[
    "website/static/css/site.css",
    "website/static/css/admin.css",
    "website/static/js/site.js",
    "website/static/js/admin.js",
];

fn writable(dir: &Path) -> Result<(), std::io::Error> {
    let probe = dir.join(".write_test");
    fs::write(&probe, "test")?;
    fs::remove_file(&probe)
}

/// Run all boot checks before Rocket launches: create missing directories,
/// verify templates and assets, and abort when something critical is
/// missing.
pub fn run(config: &SiteConfig) {
    info!("{} boot check starting...", config.site_name);

    let mut warnings = 0u32;
    let mut errors = 0u32;

    // ── 1. Directories ─────────────────────────────────
    let mut dirs = vec![
        TEMPLATE_DIR.to_string(),
        format!("{}/admin", TEMPLATE_DIR),
        format!("{}/css", STATIC_DIR),
        format!("{}/js", STATIC_DIR),
        config.uploads_dir.clone(),
    ];
    // Identity tables live in SQLite whichever document store is used
    if let Some(parent) = Path::new(&config.database_path).parent() {
        if !parent.as_os_str().is_empty() {
            dirs.push(parent.to_string_lossy().into_owned());
        }
    }
    for dir in &dirs {
        let path = Path::new(dir);
        if !path.exists() {
            match fs::create_dir_all(path) {
                Ok(_) => info!("  Created directory: {}", dir),
                Err(e) => {
                    error!("  FAILED to create directory {}: {}", dir, e);
                    errors += 1;
                }
            }
        }
    }

    // ── 2. Critical templates ──────────────────────────
    for file in CRITICAL_TEMPLATES {
        if !Path::new(file).exists() {
            error!("  MISSING critical template: {}", file);
            errors += 1;
        }
    }

    // ── 3. Static assets ───────────────────────────────
    for file in STATIC_ASSETS {
        if !Path::new(file).exists() {
            warn!("  Missing static asset: {} (pages will be unstyled or static)", file);
            warnings += 1;
        }
    }

    // ── 4. Writable data directories ───────────────────
    if let Some(db_dir) = Path::new(&config.database_path).parent().filter(|p| p.exists()) {
        if let Err(e) = writable(db_dir) {
            error!("  Database directory not writable: {}", e);
            errors += 1;
        }
    }
    let uploads = Path::new(&config.uploads_dir);
    if !config.inline_design_images && uploads.exists() {
        if let Err(e) = writable(uploads) {
            warn!("  Uploads directory not writable: {} (design uploads will fail)", e);
            warnings += 1;
        }
    }

    // ── 5. Optional services ───────────────────────────
    if config.smtp.host.trim().is_empty() {
        warn!("  SMTP is not configured (password reset emails cannot be sent)");
        warnings += 1;
    }
    if !Path::new(CONFIG_FILE).exists() {
        info!("  {} not found, using defaults and VITRINE_* variables", CONFIG_FILE);
    }

    // ── Summary ─────────────────────────────────────────
    if errors > 0 {
        error!(
            "Boot check FAILED: {} error(s), {} warning(s). Aborting.",
            errors, warnings
        );
        process::exit(1);
    }

    if warnings > 0 {
        warn!(
            "Boot check passed with {} warning(s). Some features may not work correctly.",
            warnings
        );
    } else {
        info!("Boot check passed. All systems go.");
    }
}

/// Creates the configured bootstrap account when no admin exists yet.
/// Returns whether an account was created.
pub fn seed_admin(config: &SiteConfig, identity: &LocalIdentity) -> bool {
    let (email, password) = match (&config.bootstrap_admin_email, &config.bootstrap_admin_password) {
        (Some(e), Some(p)) if !e.trim().is_empty() => (e, p),
        _ => {
            if identity.admin_count() == 0 {
                warn!("No admin account exists. Set bootstrap_admin_email and bootstrap_admin_password to create one.");
            }
            return false;
        }
    };
    if identity.admin_count() > 0 {
        return false;
    }
    match identity.create_admin(email, password, "") {
        Ok(_) => {
            info!("Created bootstrap admin account {}", email);
            true
        }
        Err(e) => {
            error!("Could not create bootstrap admin {}: {}", email, e);
            false
        }
    }
}
