use serde::{Deserialize, Serialize};

pub const PATH: &str = "maintenance";

/// Site-wide availability flag. Always written as a whole pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maintenance {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub message: String,
}
