pub mod account;
pub mod ad;
pub mod contact;
pub mod design;
pub mod maintenance;

pub use account::AdminAccount;
pub use ad::{Ad, AdDraft, AdKind};
pub use contact::{Contact, ContactDraft};
pub use design::{Design, DesignDraft};
pub use maintenance::Maintenance;

/// A decoded record together with its store-generated key.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<T> {
    pub key: String,
    pub value: T,
}
