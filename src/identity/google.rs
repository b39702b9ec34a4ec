use std::time::Duration;

use serde::Deserialize;

const AUTHORIZE_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Google OAuth 2.0 authorization-code client.
#[derive(Debug, Clone)]
pub struct GoogleOAuth {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
}

impl GoogleOAuth {
    pub fn new(client_id: &str, client_secret: &str, redirect_uri: &str) -> Self {
        GoogleOAuth {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            redirect_uri: redirect_uri.to_string(),
        }
    }

    pub fn authorize_url(&self, state: &str) -> Result<String, String> {
        let url = url::Url::parse_with_params(
            AUTHORIZE_ENDPOINT,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", "openid email profile"),
                ("state", state),
                ("prompt", "select_account"),
            ],
        )
        .map_err(|e| format!("Invalid authorization URL: {}", e))?;
        Ok(url.into())
    }

    /// Exchange the authorization code and return the account's verified email.
    pub fn verified_email(&self, code: &str) -> Result<String, String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| format!("HTTP client error: {}", e))?;

        let token_resp = client
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .map_err(|e| format!("Google token request failed: {}", e))?;

        if !token_resp.status().is_success() {
            let status = token_resp.status();
            let text = token_resp.text().unwrap_or_default();
            return Err(format!("Google token endpoint returned {}: {}", status, text));
        }
        let token: TokenResponse = token_resp
            .json()
            .map_err(|e| format!("Google token parse error: {}", e))?;

        let info: UserInfo = client
            .get(USERINFO_ENDPOINT)
            .bearer_auth(&token.access_token)
            .send()
            .map_err(|e| format!("Google userinfo request failed: {}", e))?
            .error_for_status()
            .map_err(|e| format!("Google userinfo request failed: {}", e))?
            .json()
            .map_err(|e| format!("Google userinfo parse error: {}", e))?;

        match info.email {
            Some(email) if info.email_verified => Ok(email),
            Some(_) => Err("Your Google account email is not verified.".to_string()),
            None => Err("Google did not share an email address.".to_string()),
        }
    }
}
