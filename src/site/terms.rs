use rocket::http::{Cookie, CookieJar, SameSite};
use rocket::request::{FromRequest, Outcome, Request};

/// Client-side consent flag. Never stored in the backend.
pub const CONSENT_COOKIE: &str = "terms_accepted";

pub const REJECTION_MESSAGE: &str =
    "You must accept the terms of use to continue browsing this site.";

/// What the public page does about the terms modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermsPrompt {
    /// Consent already given.
    Hidden,
    /// Shown by the page script after the configured delay.
    Delayed,
    /// Shown at once with the blocking message.
    Rejected,
}

impl TermsPrompt {
    pub fn for_visit(consent: &TermsConsent, rejected: bool) -> Self {
        match (consent.accepted, rejected) {
            (true, _) => TermsPrompt::Hidden,
            (false, true) => TermsPrompt::Rejected,
            (false, false) => TermsPrompt::Delayed,
        }
    }
}

/// Guard: whether this browser has accepted the terms.
pub struct TermsConsent {
    pub accepted: bool,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for TermsConsent {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let accepted = request
            .cookies()
            .get(CONSENT_COOKIE)
            .map(|c| c.value() == "true")
            .unwrap_or(false);
        Outcome::Success(TermsConsent { accepted })
    }
}

pub fn accept(cookies: &CookieJar<'_>) {
    let mut cookie = Cookie::new(CONSENT_COOKIE, "true");
    cookie.set_path("/");
    cookie.set_same_site(SameSite::Lax);
    cookie.make_permanent();
    cookies.add(cookie);
}
