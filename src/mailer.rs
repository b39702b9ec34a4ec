use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::SmtpConfig;

/// Outbound mail, used for password reset links.
pub trait Mailer: Send + Sync {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), String>;
}

pub struct SmtpMailer {
    settings: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(settings: SmtpConfig) -> Self {
        SmtpMailer { settings }
    }

    pub fn is_configured(&self) -> bool {
        !self.settings.host.is_empty() && !self.settings.from.is_empty()
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), String> {
        if !self.is_configured() {
            return Err("No email provider configured. Password reset requires SMTP settings.".into());
        }
        let s = &self.settings;

        let email = Message::builder()
            .from(s.from.parse().map_err(|e| format!("Invalid from address: {}", e))?)
            .to(to.parse().map_err(|e| format!("Invalid to address: {}", e))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| format!("Failed to build email: {}", e))?;

        let mut builder = SmtpTransport::starttls_relay(&s.host)
            .map_err(|e| format!("SMTP relay error: {}", e))?
            .port(s.port);
        if !s.username.is_empty() {
            builder = builder.credentials(Credentials::new(s.username.clone(), s.password.clone()));
        }

        builder
            .build()
            .send(&email)
            .map_err(|e| format!("SMTP send error: {}", e))?;
        log::info!("Sent \"{}\" to {}", subject, to);
        Ok(())
    }
}
