use std::sync::Arc;

use rocket::tokio::task;

use crate::error::{OpError, OpResult, Operation, OrFail};
use crate::identity::{IdentityProvider, Session};
use crate::models::AdminAccount;

/// Sign-in, federated sign-in, password reset and session lookup, over an
/// injected identity provider. Failures carry the provider's message.
pub struct AuthGateway {
    identity: Arc<dyn IdentityProvider>,
}

impl AuthGateway {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        AuthGateway { identity }
    }

    pub fn sign_in(&self, email: &str, password: &str) -> OpResult<Session> {
        let session = self
            .identity
            .sign_in_with_password(email, password)
            .or_fail(Operation::SignIn)?;
        log::info!("Admin {} signed in", session.account.email);
        Ok(session)
    }

    pub fn federated_enabled(&self) -> bool {
        self.identity.federated_enabled()
    }

    pub fn federated_url(&self, state: &str) -> OpResult<String> {
        self.identity
            .federated_authorize_url(state)
            .or_fail(Operation::FederatedSignIn)
    }

    /// The code exchange talks to the provider, so it runs off the async
    /// worker threads.
    pub async fn sign_in_federated(&self, code: &str) -> OpResult<Session> {
        let identity = self.identity.clone();
        let code = code.to_string();
        let session = task::spawn_blocking(move || identity.sign_in_federated(&code))
            .await
            .map_err(|e| OpError::new(Operation::FederatedSignIn, e))?
            .or_fail(Operation::FederatedSignIn)?;
        log::info!("Admin {} signed in with Google", session.account.email);
        Ok(session)
    }

    /// Nothing is dispatched for an empty address. The mail goes out over
    /// SMTP, so the provider call runs off the async worker threads.
    pub async fn request_password_reset(&self, email: &str) -> OpResult<()> {
        if email.trim().is_empty() {
            return Err(OpError::new(Operation::SendPasswordReset, "Email address is required."));
        }
        let identity = self.identity.clone();
        let email = email.to_string();
        task::spawn_blocking(move || identity.send_password_reset(&email))
            .await
            .map_err(|e| OpError::new(Operation::SendPasswordReset, e))?
            .or_fail(Operation::SendPasswordReset)
    }

    pub fn complete_password_reset(&self, token: &str, password: &str, confirm: &str) -> OpResult<()> {
        if password != confirm {
            return Err(OpError::new(Operation::ResetPassword, "Passwords do not match."));
        }
        self.identity
            .reset_password(token, password)
            .or_fail(Operation::ResetPassword)
    }

    pub fn sign_out(&self, session_id: &str) -> OpResult<()> {
        self.identity.sign_out(session_id).or_fail(Operation::SignOut)
    }

    pub fn current(&self, session_id: &str) -> Option<AdminAccount> {
        self.identity.current_user(session_id)
    }
}
