use std::sync::Arc;

use rocket::form::Form;
use rocket::http::CookieJar;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::{json, Value};

use super::flash_notice;
use crate::config::SiteConfig;
use crate::error::{Notice, OpError};
use crate::rate_limit::{Policy, RateLimiter};
use crate::security::auth::{
    clear_session_cookie, set_oauth_state, set_session_cookie, take_oauth_state, AdminUser, ClientIp,
};
use crate::security::random_token;
use crate::site::{AuthGateway, MaintenanceGate};

#[derive(Debug, FromForm)]
pub struct LoginForm {
    #[field(default = String::new())]
    pub email: String,
    #[field(default = String::new())]
    pub password: String,
}

#[derive(Debug, FromForm)]
pub struct ForgotForm {
    #[field(default = String::new())]
    pub email: String,
}

#[derive(Debug, FromForm)]
pub struct ResetForm {
    #[field(default = String::new())]
    pub token: String,
    #[field(default = String::new())]
    pub password: String,
    #[field(default = String::new())]
    pub confirm_password: String,
}

/// Shared context of the sign-in pages. They sit behind the maintenance
/// overlay like the public page.
fn auth_context(config: &SiteConfig, gate: &MaintenanceGate, gateway: &AuthGateway, notice: Option<Notice>) -> Value {
    json!({
        "site_name": config.site_name,
        "admin_base": config.admin_base(),
        "google_enabled": gateway.federated_enabled(),
        "maintenance": gate.current(),
        "notice": notice,
        "email": "",
    })
}

fn login_url(config: &SiteConfig) -> String {
    format!("{}/login", config.admin_base())
}

fn failed(config: &SiteConfig, err: &OpError) -> Flash<Redirect> {
    Notice::failure(err).flash(Redirect::to(login_url(config)))
}

// ── Credential sign-in ──────────────────────────────────

#[get("/login")]
pub fn login_page(
    admin: Option<AdminUser>,
    flash: Option<FlashMessage<'_>>,
    config: &State<SiteConfig>,
    gate: &State<MaintenanceGate>,
    gateway: &State<AuthGateway>,
) -> Result<Template, Redirect> {
    if admin.is_some() {
        return Err(Redirect::to(config.admin_base()));
    }
    let ctx = auth_context(config, gate, gateway, flash_notice(flash));
    Ok(Template::render("admin/login", &ctx))
}

#[post("/login", data = "<form>")]
pub fn login_submit(
    form: Form<LoginForm>,
    client: ClientIp,
    cookies: &CookieJar<'_>,
    config: &State<SiteConfig>,
    gate: &State<MaintenanceGate>,
    gateway: &State<AuthGateway>,
    limiter: &State<Arc<RateLimiter>>,
) -> Result<Redirect, Template> {
    let render_error = |notice: Notice| {
        let mut ctx = auth_context(config, gate, gateway, Some(notice));
        ctx["email"] = json!(form.email);
        Template::render("admin/login", &ctx)
    };

    if !limiter.check_and_record("login", &client.0, Policy::per_quarter_hour(config.login_rate_limit)) {
        log::warn!("Login rate limit hit for {}", client.0);
        return Err(render_error(Notice::error(
            "Too many login attempts. Please try again in 15 minutes.",
        )));
    }

    match gateway.sign_in(&form.email, &form.password) {
        Ok(session) => {
            set_session_cookie(cookies, &session.id, config.is_secure());
            Ok(Redirect::to(config.admin_base()))
        }
        Err(e) => Err(render_error(Notice::failure(&e))),
    }
}

// ── Google sign-in ──────────────────────────────────────

#[get("/login/google")]
pub fn google_start(
    cookies: &CookieJar<'_>,
    config: &State<SiteConfig>,
    gateway: &State<AuthGateway>,
) -> Result<Redirect, Flash<Redirect>> {
    let state = random_token();
    let url = gateway.federated_url(&state).map_err(|e| failed(config, &e))?;
    set_oauth_state(cookies, &state, config.is_secure());
    Ok(Redirect::to(url))
}

#[get("/login/google/callback?<code>&<state>&<error>")]
pub async fn google_callback(
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    cookies: &CookieJar<'_>,
    config: &State<SiteConfig>,
    gateway: &State<AuthGateway>,
) -> Result<Redirect, Flash<Redirect>> {
    use crate::error::Operation::FederatedSignIn;

    let expected = take_oauth_state(cookies);
    if let Some(error) = error {
        return Err(failed(config, &OpError::new(FederatedSignIn, error)));
    }
    if expected.is_none() || expected != state {
        return Err(failed(config, &OpError::new(FederatedSignIn, "the sign-in request expired, please try again")));
    }
    let code = code.ok_or_else(|| failed(config, &OpError::new(FederatedSignIn, "no authorization code received")))?;

    let session = gateway.sign_in_federated(&code).await.map_err(|e| failed(config, &e))?;
    set_session_cookie(cookies, &session.id, config.is_secure());
    Ok(Redirect::to(config.admin_base()))
}

// ── Password reset ──────────────────────────────────────

#[get("/forgot-password")]
pub fn forgot_page(
    flash: Option<FlashMessage<'_>>,
    config: &State<SiteConfig>,
    gate: &State<MaintenanceGate>,
    gateway: &State<AuthGateway>,
) -> Template {
    Template::render("admin/forgot_password", &auth_context(config, gate, gateway, flash_notice(flash)))
}

#[post("/forgot-password", data = "<form>")]
pub async fn forgot_submit(
    form: Form<ForgotForm>,
    client: ClientIp,
    config: &State<SiteConfig>,
    gate: &State<MaintenanceGate>,
    gateway: &State<AuthGateway>,
    limiter: &State<Arc<RateLimiter>>,
) -> Result<Flash<Redirect>, Template> {
    let render_error = |notice: Notice| {
        let mut ctx = auth_context(config, gate, gateway, Some(notice));
        ctx["email"] = json!(form.email);
        Template::render("admin/forgot_password", &ctx)
    };

    if !limiter.check_and_record("reset", &client.0, Policy::per_quarter_hour(config.reset_rate_limit)) {
        return Err(render_error(Notice::error(
            "Too many reset requests. Please try again in 15 minutes.",
        )));
    }

    match gateway.request_password_reset(&form.email).await {
        Ok(()) => Ok(Notice::info("If an account exists for that address, a reset link is on its way. Check your inbox.")
            .flash(Redirect::to(login_url(config)))),
        Err(e) => Err(render_error(Notice::failure(&e))),
    }
}

#[get("/reset-password?<token>")]
pub fn reset_page(
    token: Option<String>,
    config: &State<SiteConfig>,
    gate: &State<MaintenanceGate>,
    gateway: &State<AuthGateway>,
) -> Template {
    let mut ctx = auth_context(config, gate, gateway, None);
    ctx["token"] = json!(token.unwrap_or_default());
    Template::render("admin/reset_password", &ctx)
}

#[post("/reset-password", data = "<form>")]
pub fn reset_submit(
    form: Form<ResetForm>,
    config: &State<SiteConfig>,
    gate: &State<MaintenanceGate>,
    gateway: &State<AuthGateway>,
) -> Result<Flash<Redirect>, Template> {
    match gateway.complete_password_reset(&form.token, &form.password, &form.confirm_password) {
        Ok(()) => Ok(Notice::success("Your password has been reset. You can sign in now.")
            .flash(Redirect::to(login_url(config)))),
        Err(e) => {
            let mut ctx = auth_context(config, gate, gateway, Some(Notice::failure(&e)));
            ctx["token"] = json!(form.token);
            Err(Template::render("admin/reset_password", &ctx))
        }
    }
}

// ── Sign-out ────────────────────────────────────────────

#[get("/logout")]
pub fn logout(admin: Option<AdminUser>, cookies: &CookieJar<'_>, gateway: &State<AuthGateway>) -> Redirect {
    if let Some(admin) = admin {
        if let Err(e) = gateway.sign_out(&admin.session_id) {
            log::error!("{}", e);
        }
    }
    clear_session_cookie(cookies);
    Redirect::to("/")
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        login_page,
        login_submit,
        google_start,
        google_callback,
        forgot_page,
        forgot_submit,
        reset_page,
        reset_submit,
        logout
    ]
}
