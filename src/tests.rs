#![cfg(test)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rocket::tokio::sync::broadcast;
use serde_json::{json, Map, Value};

use crate::config::SiteConfig;
use crate::db::{run_migrations, DbPool};
use crate::error::{NoticeKind, Notice, OpError, Operation};
use crate::files::{extension_for, FileStore};
use crate::identity::{IdentityProvider, LocalIdentity};
use crate::mailer::Mailer;
use crate::models::{ad, contact, design, maintenance};
use crate::models::{Ad, AdDraft, AdKind, Contact, ContactDraft, Design, DesignDraft, Maintenance, Record};
use crate::rate_limit::{Policy, RateLimiter};
use crate::render::admin::{ads_table, contacts_table, designs_table};
use crate::render::public::{ad_slot, contact_form, gallery, home_page, maintenance_overlay, terms_modal, HomePage};
use crate::render::{format_date, html_escape, render_list};
use crate::site::console::{Confirmation, ImageUpload, Removal};
use crate::site::gallery::{categories, filter_designs, ALL};
use crate::site::terms::{TermsConsent, TermsPrompt, REJECTION_MESSAGE};
use crate::site::{AdminConsole, AuthGateway, ContactInbox, MaintenanceGate, PublicRenderer};
use crate::store::sqlite::SqliteStore;
use crate::store::{check_path, new_key, read_collection, touches, ChangeFeed, Store, StoreError, Subscription};

/// Atomic counter for unique shared-cache DB names so parallel tests don't collide.
static TEST_DB_COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

/// Fresh in-memory SQLite pool with all migrations applied. Named
/// shared-cache DB so every pooled connection sees the same data.
fn test_pool() -> DbPool {
    let id = TEST_DB_COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    let uri = format!("file:vitrine_test_{}?mode=memory&cache=shared", id);
    let manager = SqliteConnectionManager::file(uri);
    let pool = Pool::builder()
        .max_size(4)
        .build(manager)
        .expect("Failed to create test pool");
    {
        let conn = pool.get().unwrap();
        conn.execute_batch("PRAGMA foreign_keys=ON;").unwrap();
    }
    run_migrations(&pool).expect("Failed to run migrations");
    pool
}

fn test_store() -> Arc<dyn Store> {
    Arc::new(SqliteStore::new(test_pool()))
}

// ── Doubles ──────────────────────────────────────────────

/// Store whose backend is unreachable.
struct FailingStore {
    feed: ChangeFeed,
}

impl FailingStore {
    fn new() -> Arc<dyn Store> {
        Arc::new(FailingStore { feed: ChangeFeed::default() })
    }

    fn offline<T>() -> Result<T, StoreError> {
        Err(StoreError::Backend("backend offline".to_string()))
    }
}

impl Store for FailingStore {
    fn run_migrations(&self) -> Result<(), StoreError> {
        Ok(())
    }
    fn get(&self, _: &str) -> Result<Option<Value>, StoreError> {
        Self::offline()
    }
    fn children(&self, _: &str) -> Result<Vec<(String, Value)>, StoreError> {
        Self::offline()
    }
    fn push(&self, _: &str, _: &Value) -> Result<String, StoreError> {
        Self::offline()
    }
    fn set(&self, _: &str, _: &Value) -> Result<(), StoreError> {
        Self::offline()
    }
    fn update(&self, _: &str, _: &Map<String, Value>) -> Result<(), StoreError> {
        Self::offline()
    }
    fn remove(&self, _: &str) -> Result<(), StoreError> {
        Self::offline()
    }
    fn changes(&self) -> broadcast::Receiver<String> {
        self.feed.subscribe()
    }
}

/// Delegates to a real store but takes `delay` over every listing.
struct SlowStore {
    inner: Arc<dyn Store>,
    delay: Duration,
}

impl SlowStore {
    fn wrap(inner: Arc<dyn Store>, delay: Duration) -> Arc<dyn Store> {
        Arc::new(SlowStore { inner, delay })
    }
}

impl Store for SlowStore {
    fn run_migrations(&self) -> Result<(), StoreError> {
        self.inner.run_migrations()
    }
    fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        self.inner.get(path)
    }
    fn children(&self, path: &str) -> Result<Vec<(String, Value)>, StoreError> {
        std::thread::sleep(self.delay);
        self.inner.children(path)
    }
    fn push(&self, path: &str, value: &Value) -> Result<String, StoreError> {
        self.inner.push(path, value)
    }
    fn set(&self, path: &str, value: &Value) -> Result<(), StoreError> {
        self.inner.set(path, value)
    }
    fn update(&self, path: &str, fields: &Map<String, Value>) -> Result<(), StoreError> {
        self.inner.update(path, fields)
    }
    fn remove(&self, path: &str) -> Result<(), StoreError> {
        self.inner.remove(path)
    }
    fn changes(&self) -> broadcast::Receiver<String> {
        self.inner.changes()
    }
}

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingMailer {
    fn sent(&self) -> Vec<(String, String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), String> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

#[derive(Default)]
struct MemoryFiles {
    uploads: Mutex<Vec<(String, usize)>>,
}

impl FileStore for MemoryFiles {
    fn upload(&self, name_hint: &str, bytes: &[u8], content_type: Option<&str>) -> Result<String, String> {
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push((name_hint.to_string(), bytes.len()));
        Ok(format!("/uploads/mem-{}.{}", uploads.len(), extension_for(content_type, name_hint)))
    }
}

fn test_identity(pool: &DbPool, mailer: Arc<RecordingMailer>) -> LocalIdentity {
    LocalIdentity::new(pool.clone(), mailer, "http://localhost:8000/admin/reset-password", "Vitrine")
        .with_hash_cost(4)
}

fn console(store: &Arc<dyn Store>) -> AdminConsole {
    AdminConsole::new(store.clone(), Arc::new(MemoryFiles::default()), true)
}

fn design_record(key: &str, title: &str, category: &str) -> Record<Design> {
    Record {
        key: key.to_string(),
        value: Design {
            title: title.to_string(),
            category: category.to_string(),
            image: format!("/uploads/{}.png", key),
            timestamp: Utc::now(),
        },
    }
}

fn ad_record(key: &str, kind: AdKind, content: &str, active: bool) -> Record<Ad> {
    Record {
        key: key.to_string(),
        value: Ad {
            title: format!("Ad {}", key),
            kind,
            content: content.to_string(),
            active,
            timestamp: Utc::now(),
        },
    }
}

fn full_draft() -> ContactDraft {
    ContactDraft {
        name: "Ana Souza".to_string(),
        email: "ana@example.com".to_string(),
        subject: "Logo".to_string(),
        message: "I need a new logo for my bakery.".to_string(),
    }
}

fn push_ad(store: &Arc<dyn Store>, active: bool) -> String {
    let value = json!({
        "title": "Spring sale",
        "type": "image",
        "content": "https://cdn.example.com/banner.png",
        "active": active,
        "timestamp": "2024-03-01T10:00:00Z",
    });
    store.push(ad::PATH, &value).unwrap()
}

// ═══════════════════════════════════════════════════════════
// Document store
// ═══════════════════════════════════════════════════════════

#[test]
fn store_push_generates_unique_keys_in_insertion_order() {
    let store = test_store();
    let first = store.push("designs", &json!({"title": "b"})).unwrap();
    let second = store.push("designs", &json!({"title": "a"})).unwrap();
    assert_ne!(first, second);

    let children = store.children("designs").unwrap();
    let keys: Vec<&str> = children.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec![first.as_str(), second.as_str()]);
    assert_eq!(children[0].1["title"], "b");
}

#[test]
fn store_update_merges_only_listed_fields() {
    let store = test_store();
    let key = store.push("ads", &json!({"title": "x", "active": false})).unwrap();
    let path = format!("ads/{}", key);

    let mut fields = Map::new();
    fields.insert("active".to_string(), json!(true));
    store.update(&path, &fields).unwrap();

    assert_eq!(store.get(&path).unwrap(), Some(json!({"title": "x", "active": true})));
}

#[test]
fn store_update_of_missing_record_is_not_found() {
    let store = test_store();
    let mut fields = Map::new();
    fields.insert("read".to_string(), json!(true));
    let err = store.update("contacts/nope", &fields).unwrap_err();
    assert_eq!(err, StoreError::NotFound("contacts/nope".to_string()));
    assert!(store.get("contacts/nope").unwrap().is_none());
}

#[test]
fn store_set_overwrites_whole_value() {
    let store = test_store();
    store.set("maintenance", &json!({"enabled": true, "message": "brb"})).unwrap();
    store.set("maintenance", &json!({"enabled": false})).unwrap();
    assert_eq!(store.get("maintenance").unwrap(), Some(json!({"enabled": false})));
}

#[test]
fn store_remove_is_idempotent() {
    let store = test_store();
    let key = store.push("contacts", &json!({"name": "a"})).unwrap();
    let path = format!("contacts/{}", key);
    store.remove(&path).unwrap();
    assert!(store.get(&path).unwrap().is_none());
    store.remove(&path).unwrap();
}

#[test]
fn store_remove_collection_drops_children() {
    let store = test_store();
    store.push("ads", &json!({"title": "a"})).unwrap();
    store.push("ads", &json!({"title": "b"})).unwrap();
    store.remove("ads").unwrap();
    assert!(store.children("ads").unwrap().is_empty());
}

#[test]
fn store_paths_are_validated() {
    assert!(check_path("designs").is_ok());
    assert!(check_path("designs/0190abc").is_ok());
    assert!(check_path("").is_err());
    assert!(check_path("designs//x").is_err());
    assert!(check_path("designs/../contacts").is_err());
    assert!(check_path("designs/$where").is_err());

    let store = test_store();
    assert!(store.push("a/../b", &json!({})).is_err());
}

#[test]
fn store_touches_ancestors_and_descendants() {
    assert!(touches("designs", "designs/abc"));
    assert!(touches("designs/abc", "designs"));
    assert!(touches("maintenance", "maintenance"));
    assert!(!touches("designs", "designs2/abc"));
    assert!(!touches("ads", "contacts/abc"));
}

#[test]
fn store_new_key_shape() {
    let key = new_key();
    assert_eq!(key.len(), 20);
    assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn read_collection_skips_malformed_records() {
    let store = test_store();
    store
        .push(contact::PATH, &json!({"name": "ok", "timestamp": "2024-01-01T00:00:00Z"}))
        .unwrap();
    store.push(contact::PATH, &json!({"name": "no timestamp"})).unwrap();

    let contacts = read_collection::<Contact>(&*store, contact::PATH).unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].value.name, "ok");
    assert!(!contacts[0].value.read);
}

// ═══════════════════════════════════════════════════════════
// Live subscriptions
// ═══════════════════════════════════════════════════════════

#[rocket::async_test]
async fn subscription_yields_current_snapshot_then_updates() {
    let store = test_store();
    let renderer = PublicRenderer::new(store.clone());
    let mut sub = renderer.subscribe_designs();

    let first = sub.next().await.unwrap().unwrap();
    assert!(first.is_empty());

    store
        .push(design::PATH, &json!({"title": "Poster", "category": "print", "timestamp": "2024-01-01T00:00:00Z"}))
        .unwrap();
    let second = sub.next().await.unwrap().unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].value.title, "Poster");
}

#[rocket::async_test]
async fn subscription_ignores_other_collections() {
    let store = test_store();
    let mut sub = Subscription::<Vec<Record<Ad>>>::collection(store.clone(), ad::PATH);
    sub.next().await.unwrap().unwrap();

    store.push(contact::PATH, &json!({"name": "x"})).unwrap();
    let woke = rocket::tokio::time::timeout(Duration::from_millis(100), sub.next()).await;
    assert!(woke.is_err(), "a contacts write must not redraw the ads");
}

#[test]
fn slow_snapshots_leave_the_async_worker_free() {
    let runtime = rocket::tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime.block_on(async {
        let store = SlowStore::wrap(test_store(), Duration::from_millis(300));
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let mut sub = Subscription::<Vec<Record<Design>>>::collection(store.clone(), design::PATH);
                rocket::tokio::spawn(async move {
                    sub.next().await.unwrap().unwrap();
                    sub.next().await.unwrap().unwrap()
                })
            })
            .collect();
        store
            .push(design::PATH, &json!({"title": "Poster", "category": "print", "timestamp": "2024-01-01T00:00:00Z"}))
            .unwrap();

        let started = std::time::Instant::now();
        rocket::tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(
            started.elapsed() < Duration::from_millis(250),
            "timer delayed {:?} by store reads",
            started.elapsed()
        );

        for reader in readers {
            assert_eq!(reader.await.unwrap().len(), 1);
        }
    });
}

#[rocket::async_test]
async fn interrupted_snapshot_is_read_again() {
    let store = SlowStore::wrap(test_store(), Duration::from_millis(100));
    let mut sub = Subscription::<Vec<Record<Design>>>::collection(store.clone(), design::PATH);

    let cut_short = rocket::tokio::time::timeout(Duration::from_millis(10), sub.next()).await;
    assert!(cut_short.is_err());

    let first = rocket::tokio::time::timeout(Duration::from_secs(2), sub.next()).await;
    assert!(first.expect("snapshot re-read after cancellation").unwrap().unwrap().is_empty());
}

#[rocket::async_test]
async fn document_subscription_starts_from_default() {
    let store = test_store();
    let gate = MaintenanceGate::new(store.clone());
    let mut sub = gate.subscribe();

    assert_eq!(sub.next().await.unwrap().unwrap(), Maintenance::default());

    console(&store)
        .set_maintenance(&Maintenance { enabled: true, message: "Back at noon".to_string() })
        .unwrap();
    let next = sub.next().await.unwrap().unwrap();
    assert!(next.enabled);
    assert_eq!(next.message, "Back at noon");
}

// ═══════════════════════════════════════════════════════════
// Rendering
// ═══════════════════════════════════════════════════════════

#[test]
fn empty_snapshots_render_placeholders() {
    assert!(gallery(&[], ALL).contains("No designs found."));
    assert!(ad_slot(&[]).contains("Ad space available."));
    assert!(contacts_table(&[], "/admin", "%d/%m/%Y").contains("No messages found."));
    assert!(designs_table(&[], "/admin").contains("No designs found."));
    assert!(ads_table(&[], "/admin").contains("No ads found."));
}

#[test]
fn render_list_draws_rows_then_binds() {
    let html = render_list(
        &[1, 2, 3],
        "<p>none</p>",
        |n| format!("<li>{}</li>", n),
        |items, body| format!("<ul data-count=\"{}\">{}</ul>", items.len(), body),
    );
    assert_eq!(html, "<ul data-count=\"3\"><li>1</li>\n<li>2</li>\n<li>3</li></ul>");

    let empty: Vec<u8> = Vec::new();
    let html = render_list(&empty, "<p>none</p>", |n| n.to_string(), |_, body| body);
    assert_eq!(html, "<p>none</p>");
}

#[test]
fn filter_designs_matches_category_exactly() {
    let records = vec![
        design_record("a", "Poster", "print"),
        design_record("b", "Logo", "branding"),
        design_record("c", "Flyer", "print"),
        design_record("d", "Print shop", "printing"),
    ];

    let print: Vec<&str> = filter_designs(&records, "print").iter().map(|r| r.key.as_str()).collect();
    assert_eq!(print, vec!["a", "c"]);
    assert_eq!(filter_designs(&records, ALL).len(), 4);
    assert!(filter_designs(&records, "web").is_empty());
    assert_eq!(categories(&records), vec!["print", "branding", "printing"]);
}

#[test]
fn padded_category_is_listed_and_shown_under_its_button() {
    let records = vec![design_record("a", "Poster", "print "), design_record("b", "Logo", "branding")];

    assert_eq!(categories(&records), vec!["print", "branding"]);
    assert_eq!(filter_designs(&records, "print").len(), 1);

    let html = gallery(&records, "print");
    assert!(html.contains("data-filter=\"print\""));
    assert!(html.contains("<div class=\"design-item\" data-category=\"print\">"));
    assert!(html.contains("<div class=\"design-item\" data-category=\"branding\" hidden>"));
}

#[test]
fn gallery_hides_items_outside_the_filter() {
    let records = vec![design_record("a", "Poster", "print"), design_record("b", "Logo", "branding")];
    let html = gallery(&records, "branding");

    assert!(html.contains("data-category=\"print\" hidden"));
    assert!(html.contains("data-category=\"branding\">"));
    assert!(html.contains("class=\"filter-btn active\" data-filter=\"branding\""));
    assert!(html.contains("data-filter=\"all\""));
}

#[test]
fn ad_slot_renders_only_active_ads_by_type() {
    let ads = vec![
        ad_record("a", AdKind::Image, "https://cdn.example.com/a.png", true),
        ad_record("b", AdKind::Html, "<strong>Sale</strong>", true),
        ad_record("c", AdKind::Image, "https://cdn.example.com/hidden.png", false),
    ];
    let html = ad_slot(&ads);
    assert!(html.contains("<img src=\"https://cdn.example.com/a.png\""));
    assert!(html.contains("<strong>Sale</strong>"));
    assert!(!html.contains("hidden.png"));

    let inactive = vec![ad_record("c", AdKind::Image, "x.png", false)];
    assert!(ad_slot(&inactive).contains("Ad space available."));
}

#[test]
fn contacts_table_marks_unread_rows() {
    let rows = vec![
        Record {
            key: "k1".to_string(),
            value: Contact::received(&full_draft(), Utc::now()),
        },
        Record {
            key: "k2".to_string(),
            value: Contact {
                read: true,
                ..Contact::received(&full_draft(), Utc::now())
            },
        },
    ];
    let html = contacts_table(&rows, "/admin", "%d/%m/%Y");
    assert!(html.contains("<tr class=\"unread\" data-key=\"k1\">"));
    assert!(html.contains("<tr data-key=\"k2\">"));
    assert!(html.contains("href=\"/admin/contacts/k1\""));
    assert!(html.contains("href=\"/admin/contacts/k2/delete\""));
}

#[test]
fn html_is_escaped_in_user_content() {
    assert_eq!(html_escape("<a href=\"x\">'&'</a>"), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");

    let draft = ContactDraft {
        name: "<script>".to_string(),
        ..full_draft()
    };
    let html = contact_form(&draft);
    assert!(html.contains("value=\"&lt;script&gt;\""));
    assert!(!html.contains("<script>"));
}

#[test]
fn format_date_falls_back_on_bad_pattern() {
    let ts = chrono::DateTime::parse_from_rfc3339("2024-05-06T07:08:09Z").unwrap().with_timezone(&Utc);
    assert_eq!(format_date(&ts, "%d/%m/%Y"), "06/05/2024");
    assert_eq!(format_date(&ts, "%Q"), "2024-05-06");
}

fn render_home(maintenance: &Maintenance, terms: TermsPrompt) -> String {
    let config = SiteConfig::default();
    home_page(&HomePage {
        config: &config,
        designs: &[],
        ads: &[],
        filter: ALL,
        maintenance,
        terms,
        notice: None,
        contact: &ContactDraft::default(),
    })
}

#[test]
fn maintenance_blocks_fresh_page_loads() {
    let on = Maintenance { enabled: true, message: "Back soon".to_string() };
    let html = render_home(&on, TermsPrompt::Hidden);
    assert!(html.contains("id=\"maintenance-modal\""));
    assert!(html.contains("<body data-live=\"/live\" class=\"no-scroll\" style=\"overflow:hidden\">"));
    assert!(html.contains("Back soon"));

    let html = render_home(&Maintenance::default(), TermsPrompt::Hidden);
    assert!(!html.contains("id=\"maintenance-modal\""));
    assert!(html.contains("<body data-live=\"/live\">"));
    assert!(maintenance_overlay(&Maintenance::default()).is_empty());
}

#[test]
fn terms_modal_only_without_consent() {
    let absent = TermsPrompt::for_visit(&TermsConsent { accepted: false }, false);
    let accepted = TermsPrompt::for_visit(&TermsConsent { accepted: true }, false);
    let rejected = TermsPrompt::for_visit(&TermsConsent { accepted: false }, true);
    assert_eq!(absent, TermsPrompt::Delayed);
    assert_eq!(accepted, TermsPrompt::Hidden);
    assert_eq!(rejected, TermsPrompt::Rejected);
    assert_eq!(TermsPrompt::for_visit(&TermsConsent { accepted: true }, true), TermsPrompt::Hidden);

    assert!(terms_modal(TermsPrompt::Hidden, 2000).is_empty());
    let delayed = terms_modal(TermsPrompt::Delayed, 2000);
    assert!(delayed.contains("class=\"modal terms-modal\" data-delay=\"2000\""));
    let blocking = terms_modal(TermsPrompt::Rejected, 2000);
    assert!(blocking.contains("terms-modal active"));
    assert!(blocking.contains(REJECTION_MESSAGE));

    assert!(!render_home(&Maintenance::default(), TermsPrompt::Hidden).contains("terms-modal"));
}

// ═══════════════════════════════════════════════════════════
// Contact form
// ═══════════════════════════════════════════════════════════

#[test]
fn contact_submit_appends_one_unread_record() {
    let store = test_store();
    let inbox = ContactInbox::new(store.clone());

    let before = Utc::now();
    let key = inbox.submit(&full_draft()).unwrap();
    let after = Utc::now();

    let contacts = read_collection::<Contact>(&*store, contact::PATH).unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].key, key);
    let c = &contacts[0].value;
    assert!(!c.read);
    assert!(c.timestamp >= before && c.timestamp <= after);
    assert_eq!(c.subject, "Logo");

    inbox.submit(&full_draft()).unwrap();
    assert_eq!(read_collection::<Contact>(&*store, contact::PATH).unwrap().len(), 2);
}

#[test]
fn contact_submit_rejects_blank_fields() {
    let store = test_store();
    let inbox = ContactInbox::new(store.clone());
    let draft = ContactDraft {
        message: "   ".to_string(),
        ..full_draft()
    };
    let err = inbox.submit(&draft).unwrap_err();
    assert_eq!(err.op, Operation::SubmitContact);
    assert!(err.to_string().contains("message"));
    assert!(store.children(contact::PATH).unwrap().is_empty());
}

#[test]
fn contact_submit_failure_is_reported_once() {
    let inbox = ContactInbox::new(FailingStore::new());
    let result = inbox.submit(&full_draft());
    let err = result.as_ref().unwrap_err();
    assert_eq!(err.to_string(), "Could not send your message: backend offline");

    let notice = Notice::from_result(&result, |_| "sent".to_string());
    assert_eq!(notice.kind, NoticeKind::Error);
}

// ═══════════════════════════════════════════════════════════
// Admin console
// ═══════════════════════════════════════════════════════════

#[test]
fn toggle_ad_flips_only_active() {
    let store = test_store();
    let key = push_ad(&store, false);
    let path = format!("ads/{}", key);
    let before = store.get(&path).unwrap().unwrap();

    let admin = console(&store);
    assert!(admin.toggle_ad(&key).unwrap());

    let mut after = store.get(&path).unwrap().unwrap();
    assert_eq!(after["active"], json!(true));
    after["active"] = json!(false);
    assert_eq!(after, before);

    assert!(!admin.toggle_ad(&key).unwrap());
}

#[test]
fn toggle_missing_ad_fails_without_creating_it() {
    let store = test_store();
    let err = console(&store).toggle_ad("ghost").unwrap_err();
    assert_eq!(err.op, Operation::ToggleAd);
    assert!(store.get("ads/ghost").unwrap().is_none());
}

#[test]
fn delete_requires_confirmation() {
    let store = test_store();
    let admin = console(&store);
    let key = push_ad(&store, true);

    assert_eq!(admin.delete_ad(&key, Confirmation::Declined).unwrap(), Removal::Kept);
    assert_eq!(admin.ads().unwrap().len(), 1);
    assert!(ads_table(&admin.ads().unwrap(), "/admin").contains(&key));

    assert_eq!(admin.delete_ad(&key, Confirmation::Confirmed).unwrap(), Removal::Removed);
    assert!(admin.ads().unwrap().is_empty());
    assert!(!ads_table(&admin.ads().unwrap(), "/admin").contains(&key));
}

#[test]
fn confirmation_needs_explicit_yes() {
    assert_eq!(Confirmation::from_answer(Some("yes")), Confirmation::Confirmed);
    assert_eq!(Confirmation::from_answer(Some(" YES ")), Confirmation::Confirmed);
    assert_eq!(Confirmation::from_answer(Some("no")), Confirmation::Declined);
    assert_eq!(Confirmation::from_answer(Some("")), Confirmation::Declined);
    assert_eq!(Confirmation::from_answer(None), Confirmation::Declined);
}

#[test]
fn view_contact_marks_it_read() {
    let store = test_store();
    let key = ContactInbox::new(store.clone()).submit(&full_draft()).unwrap();
    let admin = console(&store);

    let viewed = admin.view_contact(&key).unwrap();
    assert!(viewed.value.read);
    assert_eq!(viewed.value.message, "I need a new logo for my bakery.");

    let stored = admin.contacts().unwrap();
    assert!(stored[0].value.read);

    assert_eq!(admin.view_contact("missing").unwrap_err().op, Operation::ViewContact);
}

#[test]
fn create_design_inlines_image_as_data_url() {
    let store = test_store();
    let admin = console(&store);
    let draft = DesignDraft {
        title: "Poster".to_string(),
        category: "print".to_string(),
    };
    let image = ImageUpload {
        bytes: vec![0x89, b'P', b'N', b'G'],
        content_type: Some("image/png".to_string()),
        file_name: "poster.png".to_string(),
    };

    admin.create_design(&draft, &image).unwrap();
    let designs = admin.designs().unwrap();
    assert_eq!(designs.len(), 1);
    assert_eq!(designs[0].value.image, "data:image/png;base64,iVBORw==");
    assert_eq!(designs[0].value.category, "print");
}

#[test]
fn create_design_requires_an_image() {
    let store = test_store();
    let err = console(&store)
        .create_design(
            &DesignDraft {
                title: "Poster".to_string(),
                category: "print".to_string(),
            },
            &ImageUpload::default(),
        )
        .unwrap_err();
    assert_eq!(err.op, Operation::CreateDesign);
    assert!(store.children(design::PATH).unwrap().is_empty());
}

#[test]
fn create_design_can_use_the_file_store() {
    let store = test_store();
    let files = Arc::new(MemoryFiles::default());
    let admin = AdminConsole::new(store.clone(), files.clone(), false);
    let image = ImageUpload {
        bytes: vec![1, 2, 3],
        content_type: None,
        file_name: "logo.jpg".to_string(),
    };
    admin
        .create_design(
            &DesignDraft {
                title: "Logo".to_string(),
                category: "branding".to_string(),
            },
            &image,
        )
        .unwrap();

    assert_eq!(files.uploads.lock().unwrap().len(), 1);
    assert_eq!(admin.designs().unwrap()[0].value.image, "/uploads/mem-1.jpg");
}

#[test]
fn image_upload_guesses_mime_from_name() {
    let upload = ImageUpload {
        bytes: b"<svg/>".to_vec(),
        content_type: Some("application/octet-stream".to_string()),
        file_name: "icon.svg".to_string(),
    };
    assert!(upload.data_url().starts_with("data:image/svg+xml;base64,"));
}

#[test]
fn create_ad_writes_structured_fields() {
    let store = test_store();
    let admin = console(&store);
    admin
        .create_ad(&AdDraft {
            title: "Banner".to_string(),
            kind: AdKind::Html,
            content: "<b>Hi</b>".to_string(),
            active: true,
        })
        .unwrap();

    let raw = store.children(ad::PATH).unwrap();
    assert_eq!(raw[0].1["type"], "html");
    assert_eq!(raw[0].1["active"], true);
    assert!(raw[0].1["timestamp"].is_string());

    assert!("banner".parse::<AdKind>().is_err());
    assert!(admin
        .create_ad(&AdDraft {
            title: "".to_string(),
            kind: AdKind::Image,
            content: "x".to_string(),
            active: false,
        })
        .is_err());
}

#[test]
fn stats_count_independently() {
    let store = test_store();
    push_ad(&store, true);
    push_ad(&store, false);
    push_ad(&store, true);
    ContactInbox::new(store.clone()).submit(&full_draft()).unwrap();

    let stats = console(&store).stats();
    assert_eq!(stats.contacts, Some(1));
    assert_eq!(stats.designs, Some(0));
    assert_eq!(stats.active_ads, Some(2));

    let offline = console(&FailingStore::new()).stats();
    assert_eq!(offline.contacts, None);
    assert_eq!(offline.active_ads, None);
}

#[test]
fn maintenance_is_written_as_a_pair() {
    let store = test_store();
    let admin = console(&store);
    admin
        .set_maintenance(&Maintenance { enabled: true, message: "Moving servers".to_string() })
        .unwrap();
    admin
        .set_maintenance(&Maintenance { enabled: false, message: String::new() })
        .unwrap();
    assert_eq!(store.get(maintenance::PATH).unwrap(), Some(json!({"enabled": false, "message": ""})));
}

#[test]
fn maintenance_gate_stays_open_when_store_fails() {
    let gate = MaintenanceGate::new(FailingStore::new());
    assert_eq!(gate.current(), Maintenance::default());

    let err: OpError = console(&FailingStore::new())
        .set_maintenance(&Maintenance::default())
        .unwrap_err();
    assert_eq!(err.op, Operation::SetMaintenance);
}

// ═══════════════════════════════════════════════════════════
// Identity and auth gateway
// ═══════════════════════════════════════════════════════════

#[test]
fn password_sign_in_creates_session() {
    let pool = test_pool();
    let identity = test_identity(&pool, Arc::new(RecordingMailer::default()));
    identity.create_admin("owner@example.com", "correct horse", "Owner").unwrap();

    let session = identity.sign_in_with_password("OWNER@example.com", "correct horse").unwrap();
    assert_eq!(session.account.email, "owner@example.com");
    assert_eq!(identity.current_user(&session.id).unwrap().display_name, "Owner");

    let err = identity.sign_in_with_password("owner@example.com", "wrong").unwrap_err();
    assert_eq!(err.to_string(), "Invalid email or password.");
    let err = identity.sign_in_with_password("nobody@example.com", "correct horse").unwrap_err();
    assert_eq!(err.to_string(), "Invalid email or password.");
}

#[test]
fn sign_out_ends_the_session() {
    let pool = test_pool();
    let identity = test_identity(&pool, Arc::new(RecordingMailer::default()));
    identity.create_admin("owner@example.com", "correct horse", "").unwrap();
    let session = identity.sign_in_with_password("owner@example.com", "correct horse").unwrap();

    identity.sign_out(&session.id).unwrap();
    assert!(identity.current_user(&session.id).is_none());
}

#[test]
fn expired_sessions_are_rejected_and_purged() {
    let pool = test_pool();
    let identity = test_identity(&pool, Arc::new(RecordingMailer::default()));
    let admin_id = identity.create_admin("owner@example.com", "correct horse", "").unwrap();
    pool.get()
        .unwrap()
        .execute(
            "INSERT INTO sessions (id, admin_id, created_at, expires_at) VALUES ('old', ?1, '2000-01-01 00:00:00', '2000-01-02 00:00:00')",
            rusqlite::params![admin_id],
        )
        .unwrap();

    assert!(identity.current_user("old").is_none());
    assert_eq!(identity.purge_expired().unwrap(), 1);
}

#[test]
fn password_reset_round_trip() {
    let pool = test_pool();
    let mailer = Arc::new(RecordingMailer::default());
    let identity = test_identity(&pool, mailer.clone());
    identity.create_admin("owner@example.com", "old password", "").unwrap();
    let session = identity.sign_in_with_password("owner@example.com", "old password").unwrap();

    identity.send_password_reset("owner@example.com").unwrap();
    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "owner@example.com");

    let body = &sent[0].2;
    let start = body.find("token=").unwrap() + "token=".len();
    let token: String = body[start..].chars().take_while(|c| c.is_ascii_hexdigit()).collect();
    assert_eq!(token.len(), 64);

    identity.reset_password(&token, "new password").unwrap();
    assert!(identity.sign_in_with_password("owner@example.com", "new password").is_ok());
    assert!(identity.sign_in_with_password("owner@example.com", "old password").is_err());
    assert!(identity.current_user(&session.id).is_none(), "reset must end old sessions");

    let reused = identity.reset_password(&token, "another password").unwrap_err();
    assert!(reused.to_string().contains("invalid or has expired"));
}

#[test]
fn password_reset_for_unknown_address_sends_nothing() {
    let pool = test_pool();
    let mailer = Arc::new(RecordingMailer::default());
    let identity = test_identity(&pool, mailer.clone());

    identity.send_password_reset("ghost@example.com").unwrap();
    assert!(mailer.sent().is_empty());
    assert_eq!(
        identity.send_password_reset("  ").unwrap_err().to_string(),
        "Email address is required."
    );
}

#[test]
fn short_passwords_are_rejected() {
    let pool = test_pool();
    let identity = test_identity(&pool, Arc::new(RecordingMailer::default()));
    let err = identity.create_admin("owner@example.com", "short", "").unwrap_err();
    assert_eq!(err.to_string(), "Password must be at least 8 characters.");
    assert_eq!(identity.admin_count(), 0);
}

#[test]
fn federated_sign_in_needs_configuration() {
    let pool = test_pool();
    let identity = test_identity(&pool, Arc::new(RecordingMailer::default()));
    assert!(!identity.federated_enabled());
    assert_eq!(
        identity.federated_authorize_url("state").unwrap_err().to_string(),
        "Google sign-in is not configured."
    );
}

#[test]
fn google_authorize_url_carries_state() {
    let google = crate::identity::GoogleOAuth::new("cid", "secret", "http://localhost:8000/admin/login/google/callback");
    let url = google.authorize_url("abc123").unwrap();
    assert!(url.starts_with("https://accounts.google.com/"));
    assert!(url.contains("client_id=cid"));
    assert!(url.contains("state=abc123"));
    assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8000%2Fadmin%2Flogin%2Fgoogle%2Fcallback"));
}

#[rocket::async_test]
async fn gateway_reports_provider_messages_verbatim() {
    let pool = test_pool();
    let gateway = AuthGateway::new(Arc::new(test_identity(&pool, Arc::new(RecordingMailer::default()))));

    let err = gateway.sign_in("owner@example.com", "whatever").unwrap_err();
    assert_eq!(err.to_string(), "Sign-in failed: Invalid email or password.");

    let err = gateway.request_password_reset("").await.unwrap_err();
    assert_eq!(err.op, Operation::SendPasswordReset);

    let err = gateway.complete_password_reset("token", "new password", "different").unwrap_err();
    assert_eq!(err.to_string(), "Could not reset the password: Passwords do not match.");
}

// ═══════════════════════════════════════════════════════════
// Rate limiter, config
// ═══════════════════════════════════════════════════════════

#[test]
fn rate_limiter_blocks_after_max_attempts() {
    let limiter = RateLimiter::new();
    let policy = Policy::per_quarter_hour(2);
    assert!(limiter.check_and_record("login", "1.2.3.4", policy));
    assert!(limiter.check_and_record("login", "1.2.3.4", policy));
    assert!(!limiter.check_and_record("login", "1.2.3.4", policy));

    assert!(limiter.check_and_record("login", "5.6.7.8", policy));
    assert!(limiter.check_and_record("contact", "1.2.3.4", policy));
}

#[test]
fn rate_limiter_window_expires() {
    let limiter = RateLimiter::new();
    let policy = Policy {
        max_attempts: 1,
        window: Duration::from_millis(20),
    };
    assert!(limiter.check_and_record("reset", "ip", policy));
    assert!(!limiter.check_and_record("reset", "ip", policy));
    std::thread::sleep(Duration::from_millis(30));
    limiter.cleanup(Duration::from_millis(20));
    assert!(limiter.check_and_record("reset", "ip", policy));
}

#[test]
fn bootstrap_admin_is_seeded_once() {
    let pool = test_pool();
    let identity = test_identity(&pool, Arc::new(RecordingMailer::default()));
    let mut config = SiteConfig::default();
    assert!(!crate::boot::seed_admin(&config, &identity));

    config.bootstrap_admin_email = Some("owner@example.com".to_string());
    config.bootstrap_admin_password = Some("correct horse".to_string());
    assert!(crate::boot::seed_admin(&config, &identity));
    assert!(!crate::boot::seed_admin(&config, &identity));
    assert_eq!(identity.admin_count(), 1);
    assert!(identity.sign_in_with_password("owner@example.com", "correct horse").is_ok());
}

#[test]
fn config_defaults_and_overrides() {
    use rocket::figment::providers::Serialized;
    use rocket::figment::Figment;

    let defaults = SiteConfig::default();
    assert_eq!(defaults.admin_base(), "/admin");
    assert_eq!(defaults.terms_prompt_delay_ms, 2000);
    assert!(defaults.inline_design_images);
    assert_eq!(defaults.welcome_messages.len(), 4);
    assert!(!defaults.is_secure());

    let config: SiteConfig = Figment::from(Serialized::defaults(SiteConfig::default()))
        .merge(("admin_slug", "/back-office/"))
        .merge(("site_url", "https://studio.example.com/"))
        .extract()
        .unwrap();
    assert_eq!(config.admin_base(), "/back-office");
    assert!(config.is_secure());
    assert_eq!(config.absolute_url("/admin/login"), "https://studio.example.com/admin/login");
}

#[test]
fn operation_failures_name_the_operation() {
    let err = OpError::new(Operation::DeleteDesign, StoreError::Backend("timeout".to_string()));
    assert_eq!(err.to_string(), "Could not delete the design: timeout");
    assert_eq!(Notice::failure(&err).message, err.to_string());
}

// ═══════════════════════════════════════════════════════════
// HTTP routes
// ═══════════════════════════════════════════════════════════

mod http {
    use super::*;
    use rocket::http::{ContentType, Status};
    use rocket::local::blocking::Client;

    struct Site {
        client: Client,
        store: Arc<dyn Store>,
    }

    fn site() -> Site {
        let (rocket, store) = site_rocket();
        let client = Client::tracked(rocket).expect("valid rocket instance");
        Site { client, store }
    }

    fn site_rocket() -> (rocket::Rocket<rocket::Build>, Arc<dyn Store>) {
        site_rocket_with(Arc::new(RecordingMailer::default()))
    }

    fn site_rocket_with(mailer: Arc<RecordingMailer>) -> (rocket::Rocket<rocket::Build>, Arc<dyn Store>) {
        let pool = test_pool();
        let store: Arc<dyn Store> = Arc::new(SqliteStore::new(pool.clone()));
        let identity = test_identity(&pool, mailer);
        identity.create_admin("owner@example.com", "correct horse", "Owner").unwrap();

        let rocket = crate::assemble(
            SiteConfig::default(),
            store.clone(),
            Arc::new(identity),
            Arc::new(MemoryFiles::default()),
        );
        (rocket, store)
    }

    fn sign_in(client: &Client) {
        let res = client
            .post("/admin/login")
            .header(ContentType::Form)
            .body("email=owner%40example.com&password=correct+horse")
            .dispatch();
        assert_eq!(res.status(), Status::SeeOther);
        assert_eq!(res.headers().get_one("Location"), Some("/admin"));
    }

    #[test]
    fn home_renders_placeholders_and_terms_prompt() {
        let site = site();
        let res = site.client.get("/").dispatch();
        assert_eq!(res.status(), Status::Ok);
        let body = res.into_string().unwrap();
        assert!(body.contains("No designs found."));
        assert!(body.contains("Ad space available."));
        assert!(body.contains("id=\"terms-modal\""));
    }

    #[test]
    fn accepting_terms_hides_the_modal_for_good() {
        let site = site();
        let res = site.client.post("/terms/accept").dispatch();
        assert_eq!(res.status(), Status::SeeOther);

        let body = site.client.get("/").dispatch().into_string().unwrap();
        assert!(!body.contains("id=\"terms-modal\""));
        let body = site.client.get("/?terms=rejected").dispatch().into_string().unwrap();
        assert!(!body.contains("id=\"terms-modal\""));
    }

    #[test]
    fn rejecting_terms_keeps_the_modal_with_a_message() {
        let site = site();
        let res = site.client.post("/terms/reject").dispatch();
        assert_eq!(res.headers().get_one("Location"), Some("/?terms=rejected"));

        let body = site.client.get("/?terms=rejected").dispatch().into_string().unwrap();
        assert!(body.contains("terms-modal active"));
        assert!(body.contains(REJECTION_MESSAGE));
    }

    #[test]
    fn contact_form_success_clears_the_form() {
        let site = site();
        let res = site
            .client
            .post("/contact")
            .header(ContentType::Form)
            .body("name=Ana&email=ana%40example.com&subject=Logo&message=Hello+there")
            .dispatch();
        assert_eq!(res.status(), Status::SeeOther);
        assert_eq!(res.headers().get_one("Location"), Some("/#contact"));
        assert_eq!(site.store.children(contact::PATH).unwrap().len(), 1);

        let body = site.client.get("/").dispatch().into_string().unwrap();
        assert!(body.contains("Message sent!"));
        assert!(body.contains("name=\"name\" placeholder=\"Name\" value=\"\""));
    }

    #[test]
    fn contact_form_failure_keeps_the_input() {
        let site = site();
        let res = site
            .client
            .post("/contact")
            .header(ContentType::Form)
            .body("name=Ana&email=ana%40example.com&subject=Logo&message=")
            .dispatch();
        assert_eq!(res.status(), Status::Ok);
        let body = res.into_string().unwrap();
        assert!(body.contains("Could not send your message"));
        assert!(body.contains("value=\"Ana\""));
        assert!(site.store.children(contact::PATH).unwrap().is_empty());
    }

    #[test]
    fn maintenance_overlay_on_next_load() {
        let site = site();
        let first = site.client.get("/").dispatch().into_string().unwrap();
        assert!(!first.contains("id=\"maintenance-modal\""));

        console(&site.store)
            .set_maintenance(&Maintenance { enabled: true, message: "Back at noon".to_string() })
            .unwrap();

        let body = site.client.get("/").dispatch().into_string().unwrap();
        assert!(body.contains("id=\"maintenance-modal\""));
        assert!(body.contains("class=\"no-scroll\""));

        let login = site.client.get("/admin/login").dispatch().into_string().unwrap();
        assert!(login.contains("id=\"maintenance-modal\""));
    }

    #[test]
    fn admin_pages_redirect_to_login_before_loading() {
        let site = site();
        let key = push_ad(&site.store, false);

        let res = site.client.get("/admin").dispatch();
        assert_eq!(res.status(), Status::SeeOther);
        assert_eq!(res.headers().get_one("Location"), Some("/admin/login"));

        let res = site.client.post(format!("/admin/ads/{}/toggle", key)).dispatch();
        assert_eq!(res.headers().get_one("Location"), Some("/admin/login"));
        let ad = site.store.get(&format!("ads/{}", key)).unwrap().unwrap();
        assert_eq!(ad["active"], json!(false));
    }

    #[test]
    fn failed_login_shows_provider_message() {
        let site = site();
        let res = site
            .client
            .post("/admin/login")
            .header(ContentType::Form)
            .body("email=owner%40example.com&password=nope")
            .dispatch();
        assert_eq!(res.status(), Status::Ok);
        let body = res.into_string().unwrap();
        assert!(body.contains("Invalid email or password."));
        assert!(body.contains("value=\"owner@example.com\""));
    }

    #[test]
    fn signed_in_admin_sees_dashboard_and_can_sign_out() {
        let site = site();
        sign_in(&site.client);

        let res = site.client.get("/admin").dispatch();
        assert_eq!(res.status(), Status::Ok);
        assert_eq!(
            res.headers().get_one("Cache-Control"),
            Some("no-store, no-cache, must-revalidate, max-age=0")
        );
        let body = res.into_string().unwrap();
        assert!(body.contains("id=\"admin-dashboard\""));
        assert!(body.contains("No messages found."));

        let res = site.client.get("/admin/logout").dispatch();
        assert_eq!(res.headers().get_one("Location"), Some("/"));
        let res = site.client.get("/admin").dispatch();
        assert_eq!(res.headers().get_one("Location"), Some("/admin/login"));
    }

    #[test]
    fn delete_route_honours_confirmation() {
        let site = site();
        sign_in(&site.client);
        let key = ContactInbox::new(site.store.clone()).submit(&full_draft()).unwrap();
        let path = format!("/admin/contacts/{}/delete", key);
        let row = format!("data-key=\"{}\"", key);
        let dashboard = |client: &Client| client.get("/admin").dispatch().into_string().unwrap();

        let confirm = site.client.get(&path).dispatch().into_string().unwrap();
        assert!(confirm.contains("Are you sure you want to delete this message?"));

        site.client.post(&path).header(ContentType::Form).body("").dispatch();
        assert_eq!(site.store.children(contact::PATH).unwrap().len(), 1);
        assert!(dashboard(&site.client).contains(&row));

        site.client.post(&path).header(ContentType::Form).body("confirm=yes").dispatch();
        assert!(site.store.children(contact::PATH).unwrap().is_empty());
        assert!(!dashboard(&site.client).contains(&row));
    }

    #[test]
    fn forgot_password_mails_a_link_and_returns_to_login() {
        let mailer = Arc::new(RecordingMailer::default());
        let (rocket, _store) = site_rocket_with(mailer.clone());
        let client = Client::tracked(rocket).expect("valid rocket instance");

        let res = client
            .post("/admin/forgot-password")
            .header(ContentType::Form)
            .body("email=owner%40example.com")
            .dispatch();
        assert_eq!(res.status(), Status::SeeOther);
        assert_eq!(res.headers().get_one("Location"), Some("/admin/login"));

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "owner@example.com");
        assert!(sent[0].2.contains("/admin/reset-password?token="));
    }

    #[test]
    fn toggle_route_flips_the_ad() {
        let site = site();
        sign_in(&site.client);
        let key = push_ad(&site.store, false);

        let res = site.client.post(format!("/admin/ads/{}/toggle", key)).dispatch();
        assert_eq!(res.status(), Status::SeeOther);
        let ad = site.store.get(&format!("ads/{}", key)).unwrap().unwrap();
        assert_eq!(ad["active"], json!(true));
    }

    #[test]
    fn viewing_a_contact_marks_it_read() {
        let site = site();
        sign_in(&site.client);
        let key = ContactInbox::new(site.store.clone()).submit(&full_draft()).unwrap();

        let res = site.client.get(format!("/admin/contacts/{}", key)).dispatch();
        assert_eq!(res.status(), Status::Ok);
        assert!(res.into_string().unwrap().contains("I need a new logo for my bakery."));
        let stored = site.store.get(&format!("contacts/{}", key)).unwrap().unwrap();
        assert_eq!(stored["read"], json!(true));
    }

    /// Reads the event stream until every needle has arrived.
    async fn read_until(res: &mut rocket::local::asynchronous::LocalResponse<'_>, needles: &[&str]) -> String {
        use rocket::tokio::io::AsyncReadExt;

        let mut body = String::new();
        let mut buf = [0u8; 4096];
        let read = async {
            while !needles.iter().all(|n| body.contains(n)) {
                let n = res.read(&mut buf).await.unwrap();
                assert!(n > 0, "stream ended early: {}", body);
                body.push_str(&String::from_utf8_lossy(&buf[..n]));
            }
        };
        rocket::tokio::time::timeout(Duration::from_secs(5), read)
            .await
            .expect("events arrive");
        body
    }

    #[rocket::async_test]
    async fn public_live_stream_carries_every_fragment() {
        let (rocket, store) = site_rocket();
        let client = rocket::local::asynchronous::Client::tracked(rocket).await.unwrap();

        let mut res = client.get("/live").dispatch().await;
        assert_eq!(res.status(), Status::Ok);
        assert_eq!(res.content_type(), Some(ContentType::EventStream));
        let body = read_until(&mut res, &["No designs found.", "Ad space available.", "\"enabled\":false"]).await;
        assert!(body.contains("designs"));
        assert!(body.contains("maintenance"));

        store
            .push(design::PATH, &json!({"title": "Poster", "category": "print", "timestamp": "2024-01-01T00:00:00Z"}))
            .unwrap();
        read_until(&mut res, &["Poster"]).await;
    }

    #[rocket::async_test]
    async fn admin_live_stream_needs_a_session() {
        let (rocket, _store) = site_rocket();
        let client = rocket::local::asynchronous::Client::tracked(rocket).await.unwrap();

        let res = client.get("/admin/live").dispatch().await;
        assert_eq!(res.status(), Status::SeeOther);
        assert_eq!(res.headers().get_one("Location"), Some("/admin/login"));

        client
            .post("/admin/login")
            .header(ContentType::Form)
            .body("email=owner%40example.com&password=correct+horse")
            .dispatch()
            .await;
        let mut res = client.get("/admin/live").dispatch().await;
        assert_eq!(res.status(), Status::Ok);
        read_until(&mut res, &["contacts-count", "designs-count", "ads-count", "No messages found."]).await;
    }
}
