use std::sync::Arc;

use rocket::form::Form;
use rocket::http::CookieJar;
use rocket::request::FlashMessage;
use rocket::response::content::RawHtml;
use rocket::response::{Flash, Redirect};
use rocket::State;

use super::flash_notice;
use crate::config::SiteConfig;
use crate::error::Notice;
use crate::models::ContactDraft;
use crate::rate_limit::{Policy, RateLimiter};
use crate::render::public::{home_page, HomePage};
use crate::security::auth::ClientIp;
use crate::site::gallery::ALL;
use crate::site::terms::{self, TermsConsent, TermsPrompt};
use crate::site::{ContactInbox, MaintenanceGate, PublicRenderer};

#[derive(Debug, FromForm)]
pub struct ContactForm {
    #[field(default = String::new())]
    pub name: String,
    #[field(default = String::new())]
    pub email: String,
    #[field(default = String::new())]
    pub subject: String,
    #[field(default = String::new())]
    pub message: String,
}

impl ContactForm {
    fn draft(&self) -> ContactDraft {
        ContactDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            subject: self.subject.clone(),
            message: self.message.clone(),
        }
    }
}

/// Everything needed to draw the public page, gathered per request.
struct PageInputs<'a> {
    config: &'a SiteConfig,
    renderer: &'a PublicRenderer,
    gate: &'a MaintenanceGate,
}

impl PageInputs<'_> {
    fn render(&self, filter: &str, terms: TermsPrompt, notice: Option<&Notice>, contact: &ContactDraft) -> RawHtml<String> {
        // A failed read draws the empty placeholder; the error is only logged
        let designs = self.renderer.designs().unwrap_or_else(|e| {
            log::error!("Could not load designs: {}", e);
            Vec::new()
        });
        let ads = self.renderer.ads().unwrap_or_else(|e| {
            log::error!("Could not load ads: {}", e);
            Vec::new()
        });
        let maintenance = self.gate.current();

        RawHtml(home_page(&HomePage {
            config: self.config,
            designs: &designs,
            ads: &ads,
            filter,
            maintenance: &maintenance,
            terms,
            notice,
            contact,
        }))
    }
}

#[get("/?<category>&<terms>")]
pub fn home(
    category: Option<String>,
    terms: Option<String>,
    consent: TermsConsent,
    flash: Option<FlashMessage<'_>>,
    config: &State<SiteConfig>,
    renderer: &State<PublicRenderer>,
    gate: &State<MaintenanceGate>,
) -> RawHtml<String> {
    let prompt = TermsPrompt::for_visit(&consent, terms.as_deref() == Some("rejected"));
    let filter = category.as_deref().map(str::trim).filter(|c| !c.is_empty()).unwrap_or(ALL);
    let notice = flash_notice(flash);

    PageInputs { config, renderer, gate }.render(filter, prompt, notice.as_ref(), &ContactDraft::default())
}

#[post("/contact", data = "<form>")]
pub fn contact_submit(
    form: Form<ContactForm>,
    client: ClientIp,
    consent: TermsConsent,
    config: &State<SiteConfig>,
    inbox: &State<ContactInbox>,
    limiter: &State<Arc<RateLimiter>>,
    renderer: &State<PublicRenderer>,
    gate: &State<MaintenanceGate>,
) -> Result<Flash<Redirect>, RawHtml<String>> {
    let draft = form.draft();
    let page = PageInputs { config, renderer, gate };
    let prompt = TermsPrompt::for_visit(&consent, false);

    if !limiter.check_and_record("contact", &client.0, Policy::per_quarter_hour(config.contact_rate_limit)) {
        let notice = Notice::error("Too many messages sent. Please try again in 15 minutes.");
        return Err(page.render(ALL, prompt, Some(&notice), &draft));
    }

    match inbox.submit(&draft) {
        Ok(_) => Ok(Notice::success("Message sent! We will get back to you soon.")
            .flash(Redirect::to("/#contact"))),
        Err(e) => {
            let notice = Notice::failure(&e);
            Err(page.render(ALL, prompt, Some(&notice), &draft))
        }
    }
}

#[post("/terms/accept")]
pub fn terms_accept(cookies: &CookieJar<'_>) -> Redirect {
    terms::accept(cookies);
    Redirect::to("/")
}

/// The modal stays up; the page explains why.
#[post("/terms/reject")]
pub fn terms_reject() -> Redirect {
    Redirect::to("/?terms=rejected")
}

pub fn routes() -> Vec<rocket::Route> {
    routes![home, contact_submit, terms_accept, terms_reject]
}
