//! The site's components. Each one is built with injected collaborator
//! handles and returns typed results; routes decide how to present them.

pub mod auth;
pub mod console;
pub mod contact;
pub mod gallery;
pub mod maintenance;
pub mod terms;

pub use auth::AuthGateway;
pub use console::AdminConsole;
pub use contact::ContactInbox;
pub use gallery::PublicRenderer;
pub use maintenance::MaintenanceGate;
