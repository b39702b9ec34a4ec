use chrono::NaiveDateTime;
use thiserror::Error;

use crate::models::AdminAccount;

pub mod google;
pub mod local;

pub use google::GoogleOAuth;
pub use local::LocalIdentity;

/// Provider-side failure. The message is shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct AuthError(pub String);

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        AuthError(message.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: String,
    pub account: AdminAccount,
    pub expires_at: NaiveDateTime,
}

/// Identity collaborator: credentials, federated sign-in, sessions and
/// password resets.
pub trait IdentityProvider: Send + Sync {
    fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    fn federated_enabled(&self) -> bool;
    /// Consent page URL for the federated provider.
    fn federated_authorize_url(&self, state: &str) -> Result<String, AuthError>;
    /// Blocking: talks to the provider over HTTP.
    fn sign_in_federated(&self, code: &str) -> Result<Session, AuthError>;

    fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;
    fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError>;

    fn current_user(&self, session_id: &str) -> Option<AdminAccount>;
    fn sign_out(&self, session_id: &str) -> Result<(), AuthError>;

    /// Drops expired sessions and spent reset tokens; returns how many.
    fn purge_expired(&self) -> Result<usize, AuthError>;
}
