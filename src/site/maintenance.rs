use std::sync::Arc;

use crate::models::{maintenance, Maintenance};
use crate::store::{read_document, Store, Subscription};

/// Read side of the maintenance singleton.
pub struct MaintenanceGate {
    store: Arc<dyn Store>,
}

impl MaintenanceGate {
    pub fn new(store: Arc<dyn Store>) -> Self {
        MaintenanceGate { store }
    }

    /// Current flag. An unreadable flag leaves the site open.
    pub fn current(&self) -> Maintenance {
        read_document(&*self.store, maintenance::PATH).unwrap_or_else(|e| {
            log::error!("Could not read maintenance flag: {}", e);
            Maintenance::default()
        })
    }

    pub fn subscribe(&self) -> Subscription<Maintenance> {
        Subscription::document(self.store.clone(), maintenance::PATH)
    }
}
