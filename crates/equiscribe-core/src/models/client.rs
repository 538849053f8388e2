//! Client (horse owner) records.

use serde::{Deserialize, Serialize};

/// A client who may own several horses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Creation timestamp, kept across edits
    pub created_at: String,
}

impl Client {
    pub fn new(name: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
