use std::sync::Arc;

use chrono::{Duration, Utc};
use rusqlite::{params, OptionalExtension};

use super::{AuthError, GoogleOAuth, IdentityProvider, Session};
use crate::db::DbPool;
use crate::mailer::Mailer;
use crate::models::AdminAccount;
use crate::security::{hash_token, random_token};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const RESET_TOKEN_MINUTES: i64 = 30;
const MIN_PASSWORD_LEN: usize = 8;
const INVALID_CREDENTIALS: &str = "Invalid email or password.";

/// Identity backed by the local SQLite database: bcrypt passwords,
/// server-side sessions, mailed reset links, optional Google sign-in.
pub struct LocalIdentity {
    pool: DbPool,
    mailer: Arc<dyn Mailer>,
    google: Option<GoogleOAuth>,
    session_hours: i64,
    reset_url: String,
    site_name: String,
    hash_cost: u32,
}

impl LocalIdentity {
    /// `reset_url` is the absolute reset page; the token is appended as a query.
    pub fn new(pool: DbPool, mailer: Arc<dyn Mailer>, reset_url: &str, site_name: &str) -> Self {
        LocalIdentity {
            pool,
            mailer,
            google: None,
            session_hours: 24,
            reset_url: reset_url.to_string(),
            site_name: site_name.to_string(),
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    pub fn with_google(mut self, google: GoogleOAuth) -> Self {
        self.google = Some(google);
        self
    }

    pub fn with_session_hours(mut self, hours: i64) -> Self {
        self.session_hours = hours.max(1);
        self
    }

    #[cfg(test)]
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    fn conn(&self) -> Result<r2d2::PooledConnection<r2d2_sqlite::SqliteConnectionManager>, AuthError> {
        self.pool
            .get()
            .map_err(|e| AuthError::new(format!("Identity database unavailable: {}", e)))
    }

    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        bcrypt::hash(password, self.hash_cost).map_err(|e| AuthError::new(e.to_string()))
    }

    pub fn create_admin(&self, email: &str, password: &str, display_name: &str) -> Result<i64, AuthError> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::new("A valid email address is required."));
        }
        check_password_strength(password)?;
        let hash = self.hash_password(password)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO admins (email, password_hash, display_name) VALUES (?1, ?2, ?3)",
            params![email, hash, display_name],
        )
        .map_err(|e| AuthError::new(format!("Could not create account: {}", e)))?;
        Ok(conn.last_insert_rowid())
    }

    pub fn admin_count(&self) -> i64 {
        self.conn()
            .ok()
            .and_then(|c| c.query_row("SELECT COUNT(*) FROM admins", [], |row| row.get(0)).ok())
            .unwrap_or(0)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<(AdminAccount, String)>, AuthError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, email, display_name, password_hash FROM admins WHERE email = ?1",
            params![email.trim()],
            |row| {
                Ok((
                    AdminAccount {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        display_name: row.get(2)?,
                    },
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()
        .map_err(|e| AuthError::new(e.to_string()))
    }

    fn open_session(&self, account: AdminAccount) -> Result<Session, AuthError> {
        let now = Utc::now().naive_utc();
        let expires_at = now + Duration::hours(self.session_hours);
        let id = uuid::Uuid::new_v4().to_string();

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO sessions (id, admin_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                id,
                account.id,
                now.format(TIME_FORMAT).to_string(),
                expires_at.format(TIME_FORMAT).to_string()
            ],
        )
        .map_err(|e| AuthError::new(format!("Session creation failed: {}", e)))?;
        if let Err(e) = conn.execute(
            "UPDATE admins SET last_login_at = ?1 WHERE id = ?2",
            params![now.format(TIME_FORMAT).to_string(), account.id],
        ) {
            log::warn!("Could not record last login for {}: {}", account.email, e);
        }

        Ok(Session { id, account, expires_at })
    }
}

fn check_password_strength(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::new(format!(
            "Password must be at least {} characters.",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

impl IdentityProvider for LocalIdentity {
    fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::new("Email and password are required."));
        }
        let (account, hash) = self
            .find_by_email(email)?
            .ok_or_else(|| AuthError::new(INVALID_CREDENTIALS))?;
        if !bcrypt::verify(password, &hash).unwrap_or(false) {
            return Err(AuthError::new(INVALID_CREDENTIALS));
        }
        self.open_session(account)
    }

    fn federated_enabled(&self) -> bool {
        self.google.is_some()
    }

    fn federated_authorize_url(&self, state: &str) -> Result<String, AuthError> {
        let google = self
            .google
            .as_ref()
            .ok_or_else(|| AuthError::new("Google sign-in is not configured."))?;
        google.authorize_url(state).map_err(AuthError::new)
    }

    fn sign_in_federated(&self, code: &str) -> Result<Session, AuthError> {
        let google = self
            .google
            .as_ref()
            .ok_or_else(|| AuthError::new("Google sign-in is not configured."))?;
        let email = google.verified_email(code).map_err(AuthError::new)?;
        let (account, _) = self
            .find_by_email(&email)?
            .ok_or_else(|| AuthError::new(format!("No administrator account is registered for {}.", email)))?;
        self.open_session(account)
    }

    fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::new("Email address is required."));
        }
        let account = match self.find_by_email(email)? {
            Some((account, _)) => account,
            None => {
                // Same outcome as a known address: no account enumeration
                log::info!("Password reset requested for unknown address {}", email);
                return Ok(());
            }
        };

        let token = random_token();
        let expires = Utc::now().naive_utc() + Duration::minutes(RESET_TOKEN_MINUTES);
        self.conn()?
            .execute(
                "INSERT INTO password_resets (token_hash, admin_id, expires_at) VALUES (?1, ?2, ?3)",
                params![hash_token(&token), account.id, expires.format(TIME_FORMAT).to_string()],
            )
            .map_err(|e| AuthError::new(e.to_string()))?;

        let link = format!("{}?token={}", self.reset_url, token);
        let subject = format!("Reset your password - {}", self.site_name);
        let body = format!(
            "Hello,\n\n\
             A password reset was requested for your account on {site}.\n\n\
             Open the link below to choose a new password:\n\n\
             {link}\n\n\
             This link expires in {minutes} minutes and can only be used once.\n\n\
             If you didn't request this, you can safely ignore this email.\n",
            site = self.site_name,
            link = link,
            minutes = RESET_TOKEN_MINUTES,
        );
        self.mailer.send(&account.email, &subject, &body).map_err(AuthError::new)
    }

    fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        check_password_strength(new_password)?;
        let token_hash = hash_token(token.trim());
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(|e| AuthError::new(e.to_string()))?;

        let admin_id: Option<i64> = tx
            .query_row(
                "SELECT admin_id FROM password_resets
                 WHERE token_hash = ?1 AND used = 0 AND expires_at > datetime('now')",
                params![token_hash],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| AuthError::new(e.to_string()))?;
        let admin_id = admin_id.ok_or_else(|| AuthError::new("This password reset link is invalid or has expired."))?;

        let hash = self.hash_password(new_password)?;
        tx.execute(
            "UPDATE admins SET password_hash = ?1 WHERE id = ?2",
            params![hash, admin_id],
        )
        .and_then(|_| tx.execute("UPDATE password_resets SET used = 1 WHERE token_hash = ?1", params![token_hash]))
        .and_then(|_| tx.execute("DELETE FROM sessions WHERE admin_id = ?1", params![admin_id]))
        .map_err(|e| AuthError::new(e.to_string()))?;
        tx.commit().map_err(|e| AuthError::new(e.to_string()))
    }

    fn current_user(&self, session_id: &str) -> Option<AdminAccount> {
        let conn = self.conn().ok()?;
        conn.query_row(
            "SELECT a.id, a.email, a.display_name FROM sessions s
             JOIN admins a ON a.id = s.admin_id
             WHERE s.id = ?1 AND s.expires_at > datetime('now')",
            params![session_id],
            |row| {
                Ok(AdminAccount {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    display_name: row.get(2)?,
                })
            },
        )
        .ok()
    }

    fn purge_expired(&self) -> Result<usize, AuthError> {
        let conn = self.conn()?;
        let sessions = conn
            .execute("DELETE FROM sessions WHERE expires_at <= datetime('now')", [])
            .map_err(|e| AuthError::new(e.to_string()))?;
        let resets = conn
            .execute(
                "DELETE FROM password_resets WHERE used = 1 OR expires_at <= datetime('now')",
                [],
            )
            .map_err(|e| AuthError::new(e.to_string()))?;
        Ok(sessions + resets)
    }

    fn sign_out(&self, session_id: &str) -> Result<(), AuthError> {
        self.conn()?
            .execute("DELETE FROM sessions WHERE id = ?1", params![session_id])
            .map_err(|e| AuthError::new(e.to_string()))?;
        Ok(())
    }
}

