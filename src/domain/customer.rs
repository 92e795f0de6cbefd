//! Customer domain entity. Identity key is the phone number.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub phone: String,
    pub vehicle_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(id: i64, phone: String, vehicle_number: Option<String>) -> Self {
        Self {
            id,
            phone,
            vehicle_number,
            created_at: Utc::now(),
        }
    }
}
