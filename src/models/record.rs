use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One access grant in the journal. Parties are stored as name snapshots so
/// later edits to organizations or external connections leave history intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Record {
    pub record_id: i32,

    pub user_full_name: String,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,

    pub organization_name: Option<String>,
    pub external_user_name: Option<String>,
    pub external_user_position: Option<String>,
    pub external_user_email: Option<String>,
    pub external_user_phone: Option<String>,

    pub object_name: String,
    pub work_types: Option<String>,
    pub access_type: String,

    pub access_start_date: NaiveDateTime,
    pub access_end_date: Option<NaiveDateTime>,

    pub actual_connection_date: Option<NaiveDateTime>,
    pub actual_disconnection_date: Option<NaiveDateTime>,

    pub curator: Option<String>,
    pub executor: Option<String>,

    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessType {
    Local,
    Remote,
}

impl AccessType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "local" | "локальный" => Some(AccessType::Local),
            "remote" | "удаленный" | "удалённый" => Some(AccessType::Remote),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_type_accepts_both_languages() {
        assert_eq!(AccessType::parse("local"), Some(AccessType::Local));
        assert_eq!(AccessType::parse("Удаленный"), Some(AccessType::Remote));
        assert_eq!(AccessType::parse("REMOTE"), Some(AccessType::Remote));
        assert_eq!(AccessType::parse("vpn"), None);
    }
}
