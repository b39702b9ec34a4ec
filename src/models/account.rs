use serde::Serialize;

/// A back-office account. Every account has full admin rights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminAccount {
    pub id: i64,
    pub email: String,
    pub display_name: String,
}
