use rocket::response::stream::{Event, EventStream};
use rocket::tokio::select;
use rocket::{Shutdown, State};

use crate::config::SiteConfig;
use crate::render::admin::{ads_table, contacts_table, designs_table};
use crate::routes::live::rendered;
use crate::security::auth::AdminUser;
use crate::site::console::count_active;
use crate::site::AdminConsole;

/// Redrawn table body plus its dashboard counter, as `<section>` and
/// `<section>-count` events.
fn table_events(section: &str, rows: String, count: usize) -> Vec<Event> {
    vec![
        Event::data(rows).event(section.to_string()),
        Event::data(count.to_string()).event(format!("{}-count", section)),
    ]
}

/// The whole dashboard on one connection.
#[get("/live")]
pub fn live(
    _admin: AdminUser,
    config: &State<SiteConfig>,
    console: &State<AdminConsole>,
    mut shutdown: Shutdown,
) -> EventStream![] {
    let base = config.admin_base();
    let date_format = config.date_format.clone();
    let mut contacts = console.subscribe_contacts();
    let mut designs = console.subscribe_designs();
    let mut ads = console.subscribe_ads();
    let mut maintenance = console.subscribe_maintenance();

    EventStream! {
        loop {
            let events = select! {
                next = contacts.next() => rendered(contacts.path(), next, |c| {
                    table_events("contacts", contacts_table(c, &base, &date_format), c.len())
                }),
                next = designs.next() => rendered(designs.path(), next, |d| {
                    table_events("designs", designs_table(d, &base), d.len())
                }),
                next = ads.next() => rendered(ads.path(), next, |a| {
                    table_events("ads", ads_table(a, &base), count_active(a))
                }),
                next = maintenance.next() => rendered(maintenance.path(), next, |m| {
                    vec![Event::json(m).event("maintenance")]
                }),
                _ = &mut shutdown => break,
            };
            match events {
                Some(events) => {
                    for event in events {
                        yield event;
                    }
                }
                None => break,
            }
        }
    }
}
