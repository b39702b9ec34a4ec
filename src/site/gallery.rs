use std::sync::Arc;

use crate::models::{ad, design, Ad, Design, Record};
use crate::store::{read_collection, Store, StoreError, Subscription};

/// Filter value that shows every design.
pub const ALL: &str = "all";

/// Read side of the public page: the gallery and the ad slot.
pub struct PublicRenderer {
    store: Arc<dyn Store>,
}

impl PublicRenderer {
    pub fn new(store: Arc<dyn Store>) -> Self {
        PublicRenderer { store }
    }

    pub fn designs(&self) -> Result<Vec<Record<Design>>, StoreError> {
        read_collection(&*self.store, design::PATH)
    }

    pub fn ads(&self) -> Result<Vec<Record<Ad>>, StoreError> {
        read_collection(&*self.store, ad::PATH)
    }

    pub fn subscribe_designs(&self) -> Subscription<Vec<Record<Design>>> {
        Subscription::collection(self.store.clone(), design::PATH)
    }

    pub fn subscribe_ads(&self) -> Subscription<Vec<Record<Ad>>> {
        Subscription::collection(self.store.clone(), ad::PATH)
    }
}

/// Whether `design` is shown under `filter`. Categories compare trimmed,
/// the same way the filter bar lists them.
pub fn matches_filter(design: &Design, filter: &str) -> bool {
    let filter = filter.trim();
    filter.is_empty() || filter == ALL || design.category.trim() == filter
}

/// Exactly the designs whose category equals `filter`; everything for `"all"`.
pub fn filter_designs<'a>(records: &'a [Record<Design>], filter: &str) -> Vec<&'a Record<Design>> {
    records.iter().filter(|r| matches_filter(&r.value, filter)).collect()
}

/// Distinct non-empty categories in first-seen order.
pub fn categories(records: &[Record<Design>]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for r in records {
        let cat = r.value.category.trim();
        if !cat.is_empty() && !seen.iter().any(|c| c == cat) {
            seen.push(cat.to_string());
        }
    }
    seen
}

pub fn active_ads(records: &[Record<Ad>]) -> Vec<&Record<Ad>> {
    records.iter().filter(|r| r.value.active).collect()
}
