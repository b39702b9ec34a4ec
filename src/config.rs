use rocket::figment::providers::{Env, Format, Serialized, Toml};
use rocket::figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File read on top of the built-in defaults.
pub const CONFIG_FILE: &str = "Vitrine.toml";

#[derive(Debug, Error)]
#[error("invalid site configuration: {0}")]
pub struct ConfigError(#[from] rocket::figment::Error);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Sqlite,
    Mongo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    /// Percentage shown by the skill bar, 0-100.
    pub level: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
}

/// Site-level settings. Rocket's own settings (port, secret key) stay in
/// `Rocket.toml` / `ROCKET_*`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub site_name: String,
    pub site_url: String,
    pub tagline: String,
    pub about: String,
    pub admin_slug: String,

    pub store_backend: StoreBackend,
    pub database_path: String,
    pub mongo_uri: String,
    pub mongo_database: String,

    pub uploads_dir: String,
    /// Store design images as `data:` URLs inside the record instead of
    /// uploading them through the file store.
    pub inline_design_images: bool,

    pub session_expiry_hours: i64,
    pub login_rate_limit: u64,
    pub reset_rate_limit: u64,
    pub contact_rate_limit: u64,

    pub terms_prompt_delay_ms: u64,
    pub date_format: String,
    pub welcome_messages: Vec<String>,
    pub skills: Vec<Skill>,

    pub smtp: SmtpConfig,
    pub google: Option<GoogleConfig>,

    pub bootstrap_admin_email: Option<String>,
    pub bootstrap_admin_password: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            site_name: "Vitrine".to_string(),
            site_url: "http://localhost:8000".to_string(),
            tagline: "Design, branding and illustration".to_string(),
            about: String::new(),
            admin_slug: "admin".to_string(),
            store_backend: StoreBackend::Sqlite,
            database_path: "website/db/vitrine.db".to_string(),
            mongo_uri: "mongodb://localhost:27017".to_string(),
            mongo_database: "vitrine".to_string(),
            uploads_dir: "website/uploads".to_string(),
            inline_design_images: true,
            session_expiry_hours: 24,
            login_rate_limit: 5,
            reset_rate_limit: 3,
            contact_rate_limit: 5,
            terms_prompt_delay_ms: 2000,
            date_format: "%d/%m/%Y".to_string(),
            welcome_messages: vec![
                "Olá, seja bem-vindo!".to_string(),
                "Hello, welcome!".to_string(),
                "Hola, bienvenido!".to_string(),
                "Bonjour, bienvenue!".to_string(),
            ],
            skills: vec![
                Skill { name: "Graphic design".to_string(), level: 90 },
                Skill { name: "Branding".to_string(), level: 85 },
                Skill { name: "Illustration".to_string(), level: 75 },
                Skill { name: "Web design".to_string(), level: 80 },
            ],
            smtp: SmtpConfig {
                port: 587,
                ..SmtpConfig::default()
            },
            google: None,
            bootstrap_admin_email: None,
            bootstrap_admin_password: None,
        }
    }
}

impl SiteConfig {
    /// Defaults, then `Vitrine.toml`, then `VITRINE_*` variables
    /// (`VITRINE_SMTP__HOST` reaches nested tables).
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(SiteConfig::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed("VITRINE_").split("__"))
    }

    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self::figment().extract()?)
    }

    /// Mount point of the back-office, e.g. `/admin`.
    pub fn admin_base(&self) -> String {
        format!("/{}", self.admin_slug.trim_matches('/'))
    }

    pub fn is_secure(&self) -> bool {
        self.site_url.starts_with("https://")
    }

    pub fn absolute_url(&self, path: &str) -> String {
        format!("{}{}", self.site_url.trim_end_matches('/'), path)
    }
}
