use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::request::{FromRequest, Outcome, Request};
use rocket::State;

use crate::models::AdminAccount;
use crate::site::auth::AuthGateway;

pub const SESSION_COOKIE: &str = "vitrine_session";
pub const OAUTH_STATE_COOKIE: &str = "vitrine_oauth_state";

// ── Client IP request guard ──

/// Real client IP: proxy headers first, then the socket peer.
pub struct ClientIp(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ClientIp {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let headers = request.headers();

        for name in ["CF-Connecting-IP", "X-Real-IP"] {
            if let Some(ip) = headers.get_one(name).map(str::trim).filter(|ip| !ip.is_empty()) {
                return Outcome::Success(ClientIp(ip.to_string()));
            }
        }

        // X-Forwarded-For: client, proxy1, proxy2: the leftmost entry is the client
        if let Some(ip) = headers
            .get_one("X-Forwarded-For")
            .and_then(|fwd| fwd.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
        {
            return Outcome::Success(ClientIp(ip.to_string()));
        }

        let ip = request
            .client_ip()
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Outcome::Success(ClientIp(ip))
    }
}

// ── Admin guard ──

/// Guard: a signed-in back-office account. Forwards with 401 otherwise so
/// the admin catch-all can redirect to the login page.
pub struct AdminUser {
    pub account: AdminAccount,
    pub session_id: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let gateway = match request.guard::<&State<AuthGateway>>().await.succeeded() {
            Some(g) => g,
            None => return Outcome::Error((Status::InternalServerError, ())),
        };
        let cookies = request.cookies();
        let session_id = match cookies.get_private(SESSION_COOKIE) {
            Some(c) => c.value().to_string(),
            None => return Outcome::Forward(Status::Unauthorized),
        };

        match gateway.current(&session_id) {
            Some(account) => Outcome::Success(AdminUser { account, session_id }),
            None => {
                cookies.remove_private(Cookie::from(SESSION_COOKIE));
                Outcome::Forward(Status::Unauthorized)
            }
        }
    }
}

// ── Cookies ──

pub fn set_session_cookie(cookies: &CookieJar<'_>, session_id: &str, secure: bool) {
    let mut cookie = Cookie::new(SESSION_COOKIE, session_id.to_string());
    cookie.set_http_only(true);
    // Lax: the federated flow lands here from the provider's redirect
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_secure(secure);
    cookies.add_private(cookie);
}

pub fn clear_session_cookie(cookies: &CookieJar<'_>) {
    cookies.remove_private(Cookie::from(SESSION_COOKIE));
}

/// OAuth `state` round-trip.
pub fn set_oauth_state(cookies: &CookieJar<'_>, state: &str, secure: bool) {
    let mut cookie = Cookie::new(OAUTH_STATE_COOKIE, state.to_string());
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_secure(secure);
    cookies.add_private(cookie);
}

/// Reads and clears the pending OAuth state.
pub fn take_oauth_state(cookies: &CookieJar<'_>) -> Option<String> {
    let value = cookies.get_private(OAUTH_STATE_COOKIE).map(|c| c.value().to_string());
    cookies.remove_private(Cookie::from(OAUTH_STATE_COOKIE));
    value
}
