use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::external_connection::ExternalConnection;
use crate::utils::time::parse_timestamp;
use crate::utils::validation::{non_blank, validate_not_blank};

/// Organization ids arrive as numbers from API clients and as strings from
/// `<select>` values.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdInput {
    Number(i64),
    Text(String),
}

impl IdInput {
    pub fn as_id(&self) -> Option<i32> {
        match self {
            IdInput::Number(n) => i32::try_from(*n).ok(),
            IdInput::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ExternalConnectionPayload {
    #[serde(alias = "OrganizationId")]
    pub organization_id: Option<IdInput>,
    #[serde(alias = "FullName")]
    #[validate(custom(function = "validate_not_blank"))]
    pub full_name: Option<String>,
    #[serde(alias = "Position")]
    pub position: Option<String>,
    #[serde(alias = "Email")]
    #[validate(email(message = "Некорректный email"))]
    pub email: Option<String>,
    #[serde(alias = "Phone")]
    pub phone: Option<String>,
    #[serde(alias = "AccessStart")]
    pub access_start: Option<String>,
    #[serde(alias = "AccessEnd")]
    pub access_end: Option<String>,
}

/// Validated input for insert/update. The organization is still an id here;
/// the service resolves it to a name inside the write transaction.
#[derive(Debug, Clone)]
pub struct NewExternalConnection {
    pub organization_id: i32,
    pub full_name: String,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub access_start: NaiveDateTime,
    pub access_end: Option<NaiveDateTime>,
}

impl ExternalConnectionPayload {
    pub fn into_new(self) -> Result<NewExternalConnection> {
        let required = || Error::BadRequest("Обязательные поля не заполнены".to_string());

        let email = non_blank(self.email);
        let payload = Self {
            email: email.clone(),
            ..self
        };
        payload.validate()?;

        let organization_id = match &payload.organization_id {
            None => return Err(required()),
            Some(raw) => raw
                .as_id()
                .ok_or_else(|| Error::BadRequest("Организация не найдена".to_string()))?,
        };
        let full_name = non_blank(payload.full_name).ok_or_else(required)?;
        let access_start = payload
            .access_start
            .as_deref()
            .map(parse_timestamp)
            .transpose()
            .map_err(Error::BadRequest)?
            .flatten()
            .ok_or_else(required)?;
        let access_end = payload
            .access_end
            .as_deref()
            .map(parse_timestamp)
            .transpose()
            .map_err(Error::BadRequest)?
            .flatten();

        if let Some(end) = access_end {
            if end < access_start {
                return Err(Error::BadRequest(
                    "Дата окончания должна быть позже даты начала".to_string(),
                ));
            }
        }

        Ok(NewExternalConnection {
            organization_id,
            full_name,
            position: non_blank(payload.position),
            email,
            phone: non_blank(payload.phone),
            access_start,
            access_end,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ExternalConnectionListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

pub const DEFAULT_CONNECTIONS_LIMIT: i64 = 10;
pub const MAX_CONNECTIONS_LIMIT: i64 = 100;

impl ExternalConnectionListQuery {
    /// Unparseable or non-positive values fall back to page 1 / limit 10.
    pub fn page_and_limit(&self) -> (i64, i64) {
        let parse = |v: &Option<String>| {
            v.as_deref()
                .and_then(|s| s.trim().parse::<i64>().ok())
                .filter(|n| *n > 0)
        };
        let page = parse(&self.page).unwrap_or(1);
        let limit = parse(&self.limit)
            .unwrap_or(DEFAULT_CONNECTIONS_LIMIT)
            .min(MAX_CONNECTIONS_LIMIT);
        (page, limit)
    }
}

/// Row offset of a 1-based page. Saturates so absurd pages read past the end.
pub fn page_offset(page: i64, limit: i64) -> i64 {
    (page - 1).max(0).saturating_mul(limit.max(0))
}

pub fn total_pages(total_items: i64, limit: i64) -> i64 {
    if limit > 0 {
        total_items.saturating_add(limit - 1) / limit
    } else {
        0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalConnectionPage {
    pub data: Vec<ExternalConnection>,
    pub total_items: i64,
    pub total_pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> ExternalConnectionPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn accepts_string_and_numeric_organization_ids() {
        let a = payload(json!({"organizationId": 7, "fullName": "Иванов", "accessStart": "2024-01-01"}));
        let b = payload(json!({"OrganizationId": "7", "FullName": "Иванов", "AccessStart": "2024-01-01T08:00"}));
        assert_eq!(a.into_new().unwrap().organization_id, 7);
        assert_eq!(b.into_new().unwrap().organization_id, 7);
    }

    #[test]
    fn missing_required_fields_is_bad_request() {
        let err = payload(json!({"fullName": "Иванов"})).into_new().unwrap_err();
        assert!(matches!(err, Error::BadRequest(ref m) if m == "Обязательные поля не заполнены"));

        let err = payload(json!({"organizationId": 1, "fullName": "  ", "accessStart": "2024-01-01"}))
            .into_new()
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_) | Error::BadRequest(_)));
    }

    #[test]
    fn end_before_start_is_rejected() {
        let err = payload(json!({
            "organizationId": 1,
            "fullName": "Иванов",
            "accessStart": "2024-02-01",
            "accessEnd": "2024-01-01"
        }))
        .into_new()
        .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn blank_optionals_become_none() {
        let new = payload(json!({
            "organizationId": 1,
            "fullName": "Иванов",
            "email": "",
            "phone": " ",
            "accessStart": "2024-02-01",
            "accessEnd": ""
        }))
        .into_new()
        .unwrap();
        assert_eq!(new.email, None);
        assert_eq!(new.phone, None);
        assert_eq!(new.access_end, None);
    }

    #[test]
    fn page_and_limit_defaults() {
        let q = ExternalConnectionListQuery::default();
        assert_eq!(q.page_and_limit(), (1, 10));
        let q = ExternalConnectionListQuery {
            page: Some("abc".into()),
            limit: Some("1000".into()),
        };
        assert_eq!(q.page_and_limit(), (1, 100));
    }

    #[test]
    fn huge_pages_do_not_overflow() {
        let q = ExternalConnectionListQuery {
            page: Some(i64::MAX.to_string()),
            limit: None,
        };
        let (page, limit) = q.page_and_limit();
        assert_eq!(page, i64::MAX);
        assert_eq!(page_offset(page, limit), i64::MAX);

        // Out of i64 range does not parse and falls back to the first page.
        let q = ExternalConnectionListQuery {
            page: Some(u64::MAX.to_string()),
            limit: Some("5".into()),
        };
        assert_eq!(q.page_and_limit(), (1, 5));
    }

    #[test]
    fn envelope_arithmetic() {
        assert_eq!(page_offset(1, 10), 0);
        assert_eq!(page_offset(3, 10), 20);
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(i64::MAX, 10), i64::MAX / 10);

        let page = ExternalConnectionPage {
            data: Vec::new(),
            total_items: 11,
            total_pages: total_pages(11, 10),
        };
        let body = serde_json::to_value(&page).unwrap();
        assert_eq!(body, json!({"data": [], "totalItems": 11, "totalPages": 2}));
    }
}
