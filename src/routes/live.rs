use rocket::response::stream::{Event, EventStream};
use rocket::tokio::select;
use rocket::{Shutdown, State};
use serde_json::json;

use crate::models::Maintenance;
use crate::render::public::{ad_slot, gallery, maintenance_overlay};
use crate::site::gallery::ALL;
use crate::site::{MaintenanceGate, PublicRenderer};
use crate::store::StoreError;

/// Turns one subscription step into the events to send. `None` ends the
/// stream; a snapshot that fails to load is logged and sends nothing.
pub(crate) fn rendered<T>(
    path: &str,
    next: Option<Result<T, StoreError>>,
    render: impl FnOnce(&T) -> Vec<Event>,
) -> Option<Vec<Event>> {
    match next? {
        Ok(value) => Some(render(&value)),
        Err(e) => {
            log::error!("Live update for {} failed: {}", path, e);
            Some(Vec::new())
        }
    }
}

fn maintenance_event(state: &Maintenance) -> Vec<Event> {
    // JSON: an empty overlay would be an empty, undelivered SSE message
    let payload = json!({ "enabled": state.enabled, "html": maintenance_overlay(state) });
    vec![Event::json(&payload).event("maintenance")]
}

/// Every live fragment of the public page on one connection, as named
/// `designs`, `ads` and `maintenance` events.
#[get("/live")]
pub fn live(renderer: &State<PublicRenderer>, gate: &State<MaintenanceGate>, mut shutdown: Shutdown) -> EventStream![] {
    let mut designs = renderer.subscribe_designs();
    let mut ads = renderer.subscribe_ads();
    let mut maintenance = gate.subscribe();

    EventStream! {
        loop {
            let events = select! {
                next = designs.next() => rendered(designs.path(), next, |d| {
                    vec![Event::data(gallery(d, ALL)).event("designs")]
                }),
                next = ads.next() => rendered(ads.path(), next, |a| {
                    vec![Event::data(ad_slot(a)).event("ads")]
                }),
                next = maintenance.next() => rendered(maintenance.path(), next, maintenance_event),
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

pub fn routes() -> Vec<rocket::Route> {
    routes![live]
}
