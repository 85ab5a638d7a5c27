use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Deserialize;
use validator::{ValidateEmail, ValidationError, ValidationErrors};

use crate::error::{Error, Result};
use crate::models::record::{AccessType, Record};
use crate::services::record_view::{
    RecordField, RecordFilter, RecordListView, SortDirection, SortSpec, RECORDS_PAGE_SIZE,
};
use crate::utils::time::{parse_date, parse_timestamp};
use crate::utils::validation::{is_contact_phone, non_blank};

/// Create/update body for an access record. Everything is optional at the
/// serde level so that missing fields turn into readable 400s instead of
/// extractor rejections.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "PascalCase")]
pub struct RecordPayload {
    #[serde(alias = "userFullName")]
    pub user_full_name: Option<String>,
    #[serde(alias = "position")]
    pub position: Option<String>,
    #[serde(alias = "email")]
    pub email: Option<String>,
    #[serde(alias = "phone")]
    pub phone: Option<String>,

    #[serde(alias = "organizationName")]
    pub organization_name: Option<String>,
    #[serde(alias = "externalUserName")]
    pub external_user_name: Option<String>,
    #[serde(alias = "externalUserPosition")]
    pub external_user_position: Option<String>,
    #[serde(alias = "externalUserEmail")]
    pub external_user_email: Option<String>,
    #[serde(alias = "externalUserPhone")]
    pub external_user_phone: Option<String>,

    #[serde(alias = "objectName")]
    pub object_name: Option<String>,
    #[serde(alias = "workTypes")]
    pub work_types: Option<String>,
    #[serde(alias = "accessType")]
    pub access_type: Option<String>,

    #[serde(alias = "accessStartDate")]
    pub access_start_date: Option<String>,
    #[serde(alias = "accessEndDate")]
    pub access_end_date: Option<String>,

    #[serde(alias = "actualConnectionDate")]
    pub actual_connection_date: Option<String>,
    #[serde(alias = "actualDisconnectionDate")]
    pub actual_disconnection_date: Option<String>,

    #[serde(alias = "curator")]
    pub curator: Option<String>,
    #[serde(alias = "executor")]
    pub executor: Option<String>,

    #[serde(alias = "notes")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
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
    /// Kept exactly as submitted once it parses as an [`AccessType`].
    pub access_type: String,
    pub access_start_date: NaiveDateTime,
    pub access_end_date: Option<NaiveDateTime>,
    pub actual_connection_date: Option<NaiveDateTime>,
    pub actual_disconnection_date: Option<NaiveDateTime>,
    pub curator: Option<String>,
    pub executor: Option<String>,
    pub notes: Option<String>,
}

fn field_error(message: &'static str) -> ValidationError {
    let mut err = ValidationError::new("invalid");
    err.message = Some(message.into());
    err
}

fn timestamp_field(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: Option<String>,
) -> Option<NaiveDateTime> {
    match raw.as_deref().map(parse_timestamp) {
        None => None,
        Some(Ok(value)) => value,
        Some(Err(_)) => {
            errors.add(field, field_error("Некорректная дата"));
            None
        }
    }
}

impl RecordPayload {
    /// Checks required fields, formats and the ordering of the access window.
    pub fn into_new_record(self) -> Result<NewRecord> {
        let mut errors = ValidationErrors::new();

        let user_full_name = non_blank(self.user_full_name);
        let object_name = non_blank(self.object_name);
        let access_type_raw = non_blank(self.access_type);
        let start = timestamp_field(&mut errors, "AccessStartDate", self.access_start_date);

        let mut missing = Vec::new();
        if user_full_name.is_none() {
            missing.push("ФИО");
        }
        if object_name.is_none() {
            missing.push("Объект");
        }
        if access_type_raw.is_none() {
            missing.push("Тип доступа");
        }
        if start.is_none() && errors.is_empty() {
            missing.push("Дата начала");
        }
        if !missing.is_empty() {
            return Err(Error::BadRequest(format!(
                "Заполните обязательные поля: {}",
                missing.join(", ")
            )));
        }

        let access_type = access_type_raw.filter(|raw| AccessType::parse(raw).is_some());
        if access_type.is_none() {
            errors.add(
                "AccessType",
                field_error("Тип доступа должен быть локальный или удаленный"),
            );
        }

        let email = non_blank(self.email);
        if email.as_ref().is_some_and(|e| !e.validate_email()) {
            errors.add("Email", field_error("Некорректный email"));
        }
        let external_user_email = non_blank(self.external_user_email);
        if external_user_email.as_ref().is_some_and(|e| !e.validate_email()) {
            errors.add("ExternalUserEmail", field_error("Некорректный email"));
        }
        let phone = non_blank(self.phone);
        if phone.as_deref().is_some_and(|p| !is_contact_phone(p)) {
            errors.add("Phone", field_error("Некорректный телефон"));
        }
        let external_user_phone = non_blank(self.external_user_phone);
        if external_user_phone.as_deref().is_some_and(|p| !is_contact_phone(p)) {
            errors.add("ExternalUserPhone", field_error("Некорректный телефон"));
        }

        let end = timestamp_field(&mut errors, "AccessEndDate", self.access_end_date);
        let connected = timestamp_field(&mut errors, "ActualConnectionDate", self.actual_connection_date);
        let disconnected = timestamp_field(
            &mut errors,
            "ActualDisconnectionDate",
            self.actual_disconnection_date,
        );

        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                errors.add(
                    "AccessEndDate",
                    field_error("Дата окончания должна быть позже даты начала"),
                );
            }
        }
        if let Some(at) = connected {
            if start.is_some_and(|s| at < s) {
                errors.add(
                    "ActualConnectionDate",
                    field_error("Фактическое подключение не может быть раньше срока предоставления доступа"),
                );
            } else if end.is_some_and(|e| at > e) {
                errors.add(
                    "ActualConnectionDate",
                    field_error("Фактическое подключение не может быть позже срока предоставления доступа"),
                );
            }
        }
        if let Some(at) = disconnected {
            if start.is_some_and(|s| at < s) {
                errors.add(
                    "ActualDisconnectionDate",
                    field_error("Фактическое отключение не может быть раньше даты предоставления доступа"),
                );
            } else if end.is_some_and(|e| at > e) {
                errors.add(
                    "ActualDisconnectionDate",
                    field_error("Фактическое отключение не может быть позже срока предоставления доступа"),
                );
            }
        }

        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        // All four are `Some` once the missing-field check and the
        // error check above have passed.
        let (Some(user_full_name), Some(object_name), Some(access_type), Some(access_start_date)) =
            (user_full_name, object_name, access_type, start)
        else {
            return Err(Error::BadRequest("Заполните обязательные поля".to_string()));
        };

        Ok(NewRecord {
            user_full_name,
            position: non_blank(self.position),
            email,
            phone,
            organization_name: non_blank(self.organization_name),
            external_user_name: non_blank(self.external_user_name),
            external_user_position: non_blank(self.external_user_position),
            external_user_email,
            external_user_phone,
            object_name,
            work_types: non_blank(self.work_types),
            access_type,
            access_start_date,
            access_end_date: end,
            actual_connection_date: connected,
            actual_disconnection_date: disconnected,
            curator: non_blank(self.curator),
            executor: non_blank(self.executor),
            notes: non_blank(self.notes),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

/// Query string of the journal list and export endpoints. Field filters use
/// the record's wire names (`UserFullName=...`); the remaining keys control
/// the date range, sorting, paging and export format.
#[derive(Debug, Clone, Default)]
pub struct RecordListQuery {
    pub filters: Vec<(RecordField, String)>,
    pub access_start_from: Option<String>,
    pub access_start_to: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub format: Option<String>,
}

impl RecordListQuery {
    /// Unknown keys are ignored.
    pub fn from_params(params: HashMap<String, String>) -> Self {
        let mut query = Self::default();
        for (key, value) in params {
            match key.as_str() {
                "AccessStartDateFrom" => query.access_start_from = Some(value),
                "AccessStartDateTo" => query.access_start_to = Some(value),
                "sort" | "sortBy" => query.sort = Some(value),
                "direction" | "sortDirection" => query.direction = Some(value),
                "page" => query.page = Some(value),
                "perPage" | "limit" => query.per_page = Some(value),
                "format" => query.format = Some(value),
                other => {
                    if let Some(field) = RecordField::from_key(other) {
                        query.filters.push((field, value));
                    }
                }
            }
        }
        query.filters.sort_by_key(|(f, _)| f.key());
        query
    }

    pub fn filter(&self) -> Result<RecordFilter> {
        let date = |raw: &Option<String>| -> Result<_> {
            match raw.as_deref() {
                None => Ok(None),
                Some(s) => parse_date(s)
                    .map_err(|_| Error::BadRequest(format!("Некорректная дата фильтра: {}", s))),
            }
        };
        let mut filter = RecordFilter::default();
        for (field, value) in &self.filters {
            filter.set(*field, value);
        }
        filter.set_access_start_from(date(&self.access_start_from)?);
        filter.set_access_start_to(date(&self.access_start_to)?);
        Ok(filter)
    }

    pub fn sort_spec(&self) -> Result<Option<SortSpec>> {
        let Some(key) = self.sort.as_deref().filter(|s| !s.trim().is_empty()) else {
            return Ok(None);
        };
        let field = RecordField::from_key(key)
            .ok_or_else(|| Error::BadRequest(format!("Неизвестное поле сортировки: {}", key)))?;
        let direction = match self.direction.as_deref() {
            None => SortDirection::Ascending,
            Some(raw) => SortDirection::parse(raw).ok_or_else(|| {
                Error::BadRequest(format!("Неизвестное направление сортировки: {}", raw))
            })?,
        };
        Ok(Some(SortSpec { field, direction }))
    }

    pub fn page(&self) -> Option<usize> {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<usize>().ok())
            .map(|p| p.max(1))
    }

    pub fn per_page(&self) -> usize {
        self.per_page
            .as_deref()
            .and_then(|p| p.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(RECORDS_PAGE_SIZE)
            .min(500)
    }

    pub fn export_format(&self) -> Result<ExportFormat> {
        match self.format.as_deref().map(|f| f.trim().to_ascii_lowercase()) {
            None => Ok(ExportFormat::Csv),
            Some(f) if f == "csv" || f.is_empty() => Ok(ExportFormat::Csv),
            Some(f) if f == "xlsx" => Ok(ExportFormat::Xlsx),
            Some(f) => Err(Error::BadRequest(format!("Неподдерживаемый формат: {}", f))),
        }
    }

    /// Builds the journal view state this query describes.
    pub fn into_view(&self, records: Vec<Record>) -> Result<RecordListView> {
        let mut view = RecordListView::new(records).with_per_page(self.per_page());
        view.replace_filter(self.filter()?);
        view.set_sort(self.sort_spec()?);
        if let Some(page) = self.page() {
            view.set_page(page);
        }
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_payload() -> RecordPayload {
        serde_json::from_value(json!({
            "UserFullName": "Иванов Иван Иванович",
            "Position": "инженер",
            "Email": "ivanov@corp.by",
            "Phone": "+375 29 123 45 67",
            "OrganizationName": "ООО Ромашка",
            "ExternalUserName": "Петров Пётр",
            "ExternalUserPosition": "администратор",
            "ExternalUserEmail": "petrov@romashka.by",
            "ExternalUserPhone": "+375 33 765 43 21",
            "ObjectName": "Сервер 1С",
            "WorkTypes": "обновление конфигурации",
            "AccessType": "remote",
            "AccessStartDate": "2024-01-10T09:00",
            "AccessEndDate": "2024-01-20T18:00",
            "ActualConnectionDate": "2024-01-11T10:00",
            "ActualDisconnectionDate": "2024-01-11T12:00",
            "Curator": "Сидоров",
            "Executor": "Кузнецов",
            "Notes": "по заявке №15"
        }))
        .unwrap()
    }

    #[test]
    fn full_payload_is_accepted() {
        let record = full_payload().into_new_record().unwrap();
        assert_eq!(record.access_type, "remote");
        assert_eq!(record.curator.as_deref(), Some("Сидоров"));
        assert!(record.access_end_date.is_some());
    }

    #[test]
    fn missing_required_fields_are_named() {
        let payload: RecordPayload = serde_json::from_value(json!({
            "UserFullName": "Иванов",
            "AccessType": "local"
        }))
        .unwrap();
        match payload.into_new_record() {
            Err(Error::BadRequest(msg)) => {
                assert!(msg.contains("Объект"));
                assert!(msg.contains("Дата начала"));
                assert!(!msg.contains("ФИО"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn connection_outside_window_is_rejected() {
        let mut payload = full_payload();
        payload.actual_connection_date = Some("2024-01-05T10:00".into());
        match payload.into_new_record() {
            Err(Error::Validation(errors)) => {
                assert!(errors.field_errors().contains_key("ActualConnectionDate"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn unknown_access_type_is_rejected() {
        let mut payload = full_payload();
        payload.access_type = Some("vpn".into());
        assert!(matches!(payload.into_new_record(), Err(Error::Validation(_))));
    }

    #[test]
    fn access_type_is_kept_as_submitted() {
        let mut payload = full_payload();
        payload.access_type = Some("  Remote ".into());
        assert_eq!(payload.into_new_record().unwrap().access_type, "Remote");

        let mut payload = full_payload();
        payload.access_type = Some("удаленный".into());
        assert_eq!(payload.into_new_record().unwrap().access_type, "удаленный");
    }

    #[test]
    fn emails_follow_the_shared_email_rule() {
        let mut payload = full_payload();
        payload.email = Some("ops@localhost".into());
        assert_eq!(payload.into_new_record().unwrap().email.as_deref(), Some("ops@localhost"));

        let mut payload = full_payload();
        payload.external_user_email = Some("not an email".into());
        match payload.into_new_record() {
            Err(Error::Validation(errors)) => {
                assert!(errors.field_errors().contains_key("ExternalUserEmail"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn oversized_page_gives_an_empty_page() {
        let params: HashMap<String, String> =
            [("page".to_string(), u64::MAX.to_string())].into_iter().collect();
        let query = RecordListQuery::from_params(params);
        let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let record = Record {
            record_id: 1,
            user_full_name: "Иванов".into(),
            position: None,
            email: None,
            phone: None,
            organization_name: None,
            external_user_name: None,
            external_user_position: None,
            external_user_email: None,
            external_user_phone: None,
            object_name: "АРМ".into(),
            work_types: None,
            access_type: "local".into(),
            access_start_date: start,
            access_end_date: None,
            actual_connection_date: None,
            actual_disconnection_date: None,
            curator: None,
            executor: None,
            notes: None,
        };
        let page = query.into_view(vec![record]).unwrap().current_page();
        assert!(page.data.is_empty());
        assert_eq!(page.total_items, 1);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn camel_case_body_is_normalized() {
        let payload: RecordPayload = serde_json::from_value(json!({
            "userFullName": "Иванов",
            "objectName": "АРМ",
            "accessType": "локальный",
            "accessStartDate": "2024-01-10"
        }))
        .unwrap();
        let record = payload.into_new_record().unwrap();
        assert_eq!(record.object_name, "АРМ");
        assert_eq!(record.access_type, "локальный");
    }

    #[test]
    fn query_params_split_into_filters_and_controls() {
        let params: HashMap<String, String> = [
            ("UserFullName", "иван"),
            ("AccessStartDateFrom", "2024-01-01"),
            ("AccessStartDateTo", "2024-01-31"),
            ("sort", "AccessStartDate"),
            ("direction", "desc"),
            ("page", "2"),
            ("unknown", "x"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let query = RecordListQuery::from_params(params);
        assert_eq!(query.filters, vec![(RecordField::UserFullName, "иван".to_string())]);
        assert_eq!(query.page(), Some(2));
        assert_eq!(
            query.sort_spec().unwrap(),
            Some(SortSpec {
                field: RecordField::AccessStartDate,
                direction: SortDirection::Descending
            })
        );
        assert!(!query.filter().unwrap().is_empty());
    }

    #[test]
    fn bad_filter_date_is_bad_request() {
        let query = RecordListQuery {
            access_start_from: Some("31.01.2024".into()),
            ..Default::default()
        };
        assert!(matches!(query.filter(), Err(Error::BadRequest(_))));
    }

    #[test]
    fn export_format_defaults_to_csv() {
        assert_eq!(RecordListQuery::default().export_format().unwrap(), ExportFormat::Csv);
        let q = RecordListQuery {
            format: Some("XLSX".into()),
            ..Default::default()
        };
        assert_eq!(q.export_format().unwrap(), ExportFormat::Xlsx);
    }
}
