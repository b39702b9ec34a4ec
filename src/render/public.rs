use super::{html_escape, render_list, unbound};
use crate::config::SiteConfig;
use crate::error::Notice;
use crate::models::{Ad, AdKind, ContactDraft, Design, Maintenance, Record};
use crate::site::gallery::{active_ads, categories, filter_designs, ALL};
use crate::site::terms::{TermsPrompt, REJECTION_MESSAGE};

pub const NO_DESIGNS: &str = "No designs found.";
pub const NO_ADS: &str = "Ad space available.";

/// Everything the public page shows for one request.
pub struct HomePage<'a> {
    pub config: &'a SiteConfig,
    pub designs: &'a [Record<Design>],
    pub ads: &'a [Record<Ad>],
    pub filter: &'a str,
    pub maintenance: &'a Maintenance,
    pub terms: TermsPrompt,
    pub notice: Option<&'a Notice>,
    pub contact: &'a ContactDraft,
}

pub fn home_page(page: &HomePage<'_>) -> String {
    let config = page.config;
    let site_name = html_escape(&config.site_name);
    let welcome = serde_json::to_string(&config.welcome_messages).unwrap_or_else(|_| "[]".to_string());
    let body_attrs = if page.maintenance.enabled {
        " class=\"no-scroll\" style=\"overflow:hidden\""
    } else {
        ""
    };

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{site_name}</title>
<meta name="description" content="{tagline}">
<link rel="stylesheet" href="/static/css/site.css">
</head>
<body data-live="/live"{body_attrs}>
<header class="site-header">
  <a class="logo" href="/">{site_name}</a>
  <button class="mobile-menu-btn" type="button" aria-label="Menu">&#9776;</button>
  <nav>
    <a href="#home">Home</a>
    <a href="#about">About</a>
    <a href="#portfolio">Portfolio</a>
    <a href="#contact">Contact</a>
  </nav>
</header>

<section id="home" class="hero">
  <h1 id="welcome-text" data-messages="{welcome}"></h1>
  <p class="tagline">{tagline}</p>
</section>

<section id="about" class="about">
  <h2>About</h2>
  <p>{about}</p>
  <div class="skills">{skills}</div>
</section>

<section id="portfolio" class="portfolio">
  <h2>Portfolio</h2>
  <div id="gallery">{gallery}</div>
</section>

<aside id="ads" class="ad-slot">
  <div id="ad-content">{ads}</div>
</aside>

<section id="contact" class="contact">
  <h2>Contact</h2>
  {contact}
</section>

<footer class="site-footer">
  <p>&copy; {site_name}</p>
</footer>

<div id="maintenance-slot">{maintenance}</div>
{terms}
{notice}
<script src="/static/js/site.js" defer></script>
</body>
</html>
"##,
        site_name = site_name,
        tagline = html_escape(&config.tagline),
        body_attrs = body_attrs,
        welcome = html_escape(&welcome),
        about = html_escape(&config.about).replace('\n', "<br>"),
        skills = skill_bars(config),
        gallery = gallery(page.designs, page.filter),
        ads = ad_slot(page.ads),
        contact = contact_form(page.contact),
        maintenance = maintenance_overlay(page.maintenance),
        terms = terms_modal(page.terms, config.terms_prompt_delay_ms),
        notice = page.notice.map(notice_dialog).unwrap_or_default(),
    )
}

fn skill_bars(config: &SiteConfig) -> String {
    config
        .skills
        .iter()
        .map(|s| {
            format!(
                "<div class=\"skill\"><span class=\"skill-name\">{}</span>\
                 <div class=\"skill-bar\"><div class=\"skill-progress\" data-level=\"{}\"></div></div></div>",
                html_escape(&s.name),
                s.level.min(100)
            )
        })
        .collect()
}

/// Filter bar plus grid. Items outside `filter` stay in the markup but
/// hidden, so the client-side filter can bring them back.
pub fn gallery(designs: &[Record<Design>], filter: &str) -> String {
    let filter = match filter.trim() {
        "" => ALL,
        f => f,
    };
    let shown: Vec<&str> = filter_designs(designs, filter).iter().map(|r| r.key.as_str()).collect();
    render_list(
        designs,
        &format!("<p class=\"text-center empty\">{}</p>", NO_DESIGNS),
        |r| design_item(r, shown.contains(&r.key.as_str())),
        |items, grid| {
            format!(
                "{}\n<div id=\"designs-container\" class=\"designs-grid\">{}</div>",
                filter_bar(&categories(items), filter),
                grid
            )
        },
    )
}

fn filter_bar(categories: &[String], current: &str) -> String {
    let button = |value: &str, label: &str| {
        let active = if value == current { " active" } else { "" };
        format!(
            "<a class=\"filter-btn{}\" data-filter=\"{}\" href=\"/?category={}#portfolio\">{}</a>",
            active,
            html_escape(value),
            url::form_urlencoded::byte_serialize(value.as_bytes()).collect::<String>(),
            html_escape(label)
        )
    };
    let mut html = String::from("<div class=\"filter-bar\">");
    html.push_str(&button(ALL, "All"));
    for cat in categories {
        html.push_str(&button(cat, cat));
    }
    html.push_str("</div>");
    html
}

fn design_item(r: &Record<Design>, shown: bool) -> String {
    let d = &r.value;
    let hidden = if shown { "" } else { " hidden" };
    let picture = if d.image.is_empty() {
        "<div class=\"design-noimage\"></div>".to_string()
    } else {
        format!(
            "<img src=\"{}\" alt=\"{}\" loading=\"lazy\">",
            html_escape(&d.image),
            html_escape(&d.title)
        )
    };
    format!(
        "<div class=\"design-item\" data-category=\"{cat}\"{hidden}>{picture}\
         <div class=\"design-overlay\"><h3 class=\"design-title\">{title}</h3>\
         <p class=\"design-category\">{cat}</p></div></div>",
        cat = html_escape(d.category.trim()),
        hidden = hidden,
        picture = picture,
        title = html_escape(&d.title),
    )
}

/// Active ads only. `html` ads are admin-authored and go in unescaped.
pub fn ad_slot(ads: &[Record<Ad>]) -> String {
    render_list(
        &active_ads(ads),
        &format!("<p class=\"ad-placeholder\">{}</p>", NO_ADS),
        |r| match r.value.kind {
            AdKind::Image => format!(
                "<div class=\"ad-item\"><img src=\"{}\" alt=\"{}\"></div>",
                html_escape(&r.value.content),
                html_escape(&r.value.title)
            ),
            AdKind::Html => format!("<div class=\"ad-item\">{}</div>", r.value.content),
        },
        unbound,
    )
}

/// Empty fields on success; the submitted values after a failure.
pub fn contact_form(draft: &ContactDraft) -> String {
    format!(
        r#"<form id="contact-form" class="contact-form" method="post" action="/contact">
    <input type="text" name="name" placeholder="Name" value="{name}" required>
    <input type="email" name="email" placeholder="Email" value="{email}" required>
    <input type="text" name="subject" placeholder="Subject" value="{subject}" required>
    <textarea name="message" rows="6" placeholder="Message" required>{message}</textarea>
    <button type="submit" class="btn">Send message</button>
  </form>"#,
        name = html_escape(&draft.name),
        email = html_escape(&draft.email),
        subject = html_escape(&draft.subject),
        message = html_escape(&draft.message),
    )
}

/// Blocking overlay with no way to close it; empty when the site is open.
pub fn maintenance_overlay(state: &Maintenance) -> String {
    if !state.enabled {
        return String::new();
    }
    let message = if state.message.trim().is_empty() {
        "The site is under maintenance. Please come back soon.".to_string()
    } else {
        html_escape(&state.message)
    };
    format!(
        "<div id=\"maintenance-modal\" class=\"modal maintenance-modal\" style=\"display:flex\" role=\"alertdialog\" aria-modal=\"true\">\
         <div class=\"modal-content\"><h2>Under maintenance</h2><p>{}</p></div></div>",
        message
    )
}

pub fn terms_modal(prompt: TermsPrompt, delay_ms: u64) -> String {
    let (class, warning) = match prompt {
        TermsPrompt::Hidden => return String::new(),
        TermsPrompt::Delayed => ("modal terms-modal", String::new()),
        TermsPrompt::Rejected => (
            "modal terms-modal active",
            format!("<p class=\"terms-warning\" role=\"alert\">{}</p>", REJECTION_MESSAGE),
        ),
    };
    format!(
        r#"<div id="terms-modal" class="{class}" data-delay="{delay}" role="dialog" aria-modal="true">
  <div class="modal-content">
    <h2>Terms of use</h2>
    <p>By browsing this site you agree to its terms of use and privacy policy. Messages sent through the contact form are stored so we can reply to you.</p>
    {warning}
    <form method="post" action="/terms/accept"><button id="accept-terms" type="submit" class="btn">Accept</button></form>
    <form method="post" action="/terms/reject"><button id="reject-terms" type="submit" class="btn btn-secondary">Reject</button></form>
  </div>
</div>"#,
        class = class,
        delay = delay_ms,
        warning = warning,
    )
}

pub fn notice_dialog(notice: &Notice) -> String {
    format!(
        "<dialog id=\"notice\" class=\"notice notice-{}\" open><p>{}</p>\
         <form method=\"dialog\"><button class=\"btn\">OK</button></form></dialog>",
        notice.kind.as_str(),
        html_escape(&notice.message)
    )
}
