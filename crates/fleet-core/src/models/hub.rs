//! Hub model

use serde::{Deserialize, Serialize};

/// Physical pickup/return location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hub {
    pub id: i32,
    pub name: String,
    pub address: Option<String>,
    pub contact_number: Option<String>,
}
