use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Temporary access grant for a non-employee. `organization` is the
/// organization's name at the time the grant was written.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ExternalConnection {
    pub id: i32,
    pub organization: String,
    pub full_name: String,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub access_start: NaiveDateTime,
    pub access_end: Option<NaiveDateTime>,
}

impl ExternalConnection {
    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        self.access_end.map(|end| end < now).unwrap_or(false)
    }
}
