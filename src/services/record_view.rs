//! Filtering, sorting and pagination over the access journal.
//!
//! Everything here works on an already-fetched `Vec<Record>`; the database
//! only ever returns the full journal ordered by start date.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::record::Record;
use crate::utils::time::{end_of_day, start_of_day, to_iso};

pub const RECORDS_PAGE_SIZE: usize = 10;
pub const DEFAULT_PAGE_SIZE: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    RecordId,
    UserFullName,
    Position,
    Email,
    Phone,
    OrganizationName,
    ExternalUserName,
    ExternalUserPosition,
    ExternalUserEmail,
    ExternalUserPhone,
    ObjectName,
    WorkTypes,
    AccessType,
    AccessStartDate,
    AccessEndDate,
    ActualConnectionDate,
    ActualDisconnectionDate,
    Curator,
    Executor,
    Notes,
}

impl RecordField {
    pub const ALL: [RecordField; 20] = [
        RecordField::RecordId,
        RecordField::UserFullName,
        RecordField::Position,
        RecordField::Email,
        RecordField::Phone,
        RecordField::OrganizationName,
        RecordField::ExternalUserName,
        RecordField::ExternalUserPosition,
        RecordField::ExternalUserEmail,
        RecordField::ExternalUserPhone,
        RecordField::ObjectName,
        RecordField::WorkTypes,
        RecordField::AccessType,
        RecordField::AccessStartDate,
        RecordField::AccessEndDate,
        RecordField::ActualConnectionDate,
        RecordField::ActualDisconnectionDate,
        RecordField::Curator,
        RecordField::Executor,
        RecordField::Notes,
    ];

    pub fn key(self) -> &'static str {
        match self {
            RecordField::RecordId => "RecordId",
            RecordField::UserFullName => "UserFullName",
            RecordField::Position => "Position",
            RecordField::Email => "Email",
            RecordField::Phone => "Phone",
            RecordField::OrganizationName => "OrganizationName",
            RecordField::ExternalUserName => "ExternalUserName",
            RecordField::ExternalUserPosition => "ExternalUserPosition",
            RecordField::ExternalUserEmail => "ExternalUserEmail",
            RecordField::ExternalUserPhone => "ExternalUserPhone",
            RecordField::ObjectName => "ObjectName",
            RecordField::WorkTypes => "WorkTypes",
            RecordField::AccessType => "AccessType",
            RecordField::AccessStartDate => "AccessStartDate",
            RecordField::AccessEndDate => "AccessEndDate",
            RecordField::ActualConnectionDate => "ActualConnectionDate",
            RecordField::ActualDisconnectionDate => "ActualDisconnectionDate",
            RecordField::Curator => "Curator",
            RecordField::Executor => "Executor",
            RecordField::Notes => "Notes",
        }
    }

    /// Case-insensitive lookup by wire name.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.key().eq_ignore_ascii_case(key.trim()))
    }

    pub fn is_date(self) -> bool {
        matches!(
            self,
            RecordField::AccessStartDate
                | RecordField::AccessEndDate
                | RecordField::ActualConnectionDate
                | RecordField::ActualDisconnectionDate
        )
    }

    pub fn timestamp(self, r: &Record) -> Option<NaiveDateTime> {
        match self {
            RecordField::AccessStartDate => Some(r.access_start_date),
            RecordField::AccessEndDate => r.access_end_date,
            RecordField::ActualConnectionDate => r.actual_connection_date,
            RecordField::ActualDisconnectionDate => r.actual_disconnection_date,
            _ => None,
        }
    }

    /// Stringified value as it appears on the wire; absent values are `None`.
    pub fn text(self, r: &Record) -> Option<String> {
        let s = |v: &Option<String>| v.clone();
        match self {
            RecordField::RecordId => Some(r.record_id.to_string()),
            RecordField::UserFullName => Some(r.user_full_name.clone()),
            RecordField::Position => s(&r.position),
            RecordField::Email => s(&r.email),
            RecordField::Phone => s(&r.phone),
            RecordField::OrganizationName => s(&r.organization_name),
            RecordField::ExternalUserName => s(&r.external_user_name),
            RecordField::ExternalUserPosition => s(&r.external_user_position),
            RecordField::ExternalUserEmail => s(&r.external_user_email),
            RecordField::ExternalUserPhone => s(&r.external_user_phone),
            RecordField::ObjectName => Some(r.object_name.clone()),
            RecordField::WorkTypes => s(&r.work_types),
            RecordField::AccessType => Some(r.access_type.clone()),
            RecordField::Curator => s(&r.curator),
            RecordField::Executor => s(&r.executor),
            RecordField::Notes => s(&r.notes),
            date => date.timestamp(r).map(to_iso),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    text: Vec<(RecordField, String)>,
    access_start_from: Option<NaiveDate>,
    access_start_to: Option<NaiveDate>,
}

impl RecordFilter {
    /// Sets a substring filter; a blank value clears it.
    pub fn set(&mut self, field: RecordField, value: &str) {
        self.text.retain(|(f, _)| *f != field);
        let needle = value.trim();
        if !needle.is_empty() {
            self.text.push((field, needle.to_lowercase()));
        }
    }

    pub fn set_access_start_from(&mut self, date: Option<NaiveDate>) {
        self.access_start_from = date;
    }

    pub fn set_access_start_to(&mut self, date: Option<NaiveDate>) {
        self.access_start_to = date;
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.access_start_from.is_none() && self.access_start_to.is_none()
    }

    pub fn matches(&self, record: &Record) -> bool {
        if let Some(from) = self.access_start_from {
            if record.access_start_date < start_of_day(from) {
                return false;
            }
        }
        if let Some(to) = self.access_start_to {
            if record.access_start_date > end_of_day(to) {
                return false;
            }
        }
        self.text.iter().all(|(field, needle)| {
            field
                .text(record)
                .map(|v| v.to_lowercase().contains(needle.as_str()))
                .unwrap_or(false)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(SortDirection::Ascending),
            "desc" | "descending" => Some(SortDirection::Descending),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: RecordField,
    pub direction: SortDirection,
}

/// Ascending comparison. Missing or unparseable dates compare as the latest
/// possible value, missing text as the empty string.
fn compare_ascending(field: RecordField, a: &Record, b: &Record) -> Ordering {
    if field.is_date() {
        return match (field.timestamp(a), field.timestamp(b)) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
    }
    if field == RecordField::RecordId {
        return a.record_id.cmp(&b.record_id);
    }
    let x = field.text(a).unwrap_or_default();
    let y = field.text(b).unwrap_or_default();
    x.cmp(&y)
}

pub fn sort_records(records: &mut [Record], spec: SortSpec) {
    records.sort_by(|a, b| {
        let ord = compare_ascending(spec.field, a, b);
        match spec.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

/// Filter then sort; the order of `records` is kept when `sort` is `None`.
pub fn apply(records: Vec<Record>, filter: &RecordFilter, sort: Option<SortSpec>) -> Vec<Record> {
    let mut out: Vec<Record> = records.into_iter().filter(|r| filter.matches(r)).collect();
    if let Some(spec) = sort {
        sort_records(&mut out, spec);
    }
    out
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total_items: usize,
    pub total_pages: usize,
    pub page: usize,
}

/// 1-based page slice. Pages past the end are empty rather than an error.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);
    let data = items
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .collect();
    Page {
        data,
        total_items,
        total_pages,
        page,
    }
}

/// State of the journal screen: the fetched records plus the user's current
/// filters, sort column and page.
#[derive(Debug, Clone)]
pub struct RecordListView {
    records: Vec<Record>,
    filter: RecordFilter,
    sort: Option<SortSpec>,
    page: usize,
    per_page: usize,
}

impl RecordListView {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            filter: RecordFilter::default(),
            sort: None,
            page: 1,
            per_page: RECORDS_PAGE_SIZE,
        }
    }

    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    pub fn filter(&self) -> &RecordFilter {
        &self.filter
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_filter(&mut self, field: RecordField, value: &str) {
        self.filter.set(field, value);
        self.page = 1;
    }

    pub fn set_access_start_range(&mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) {
        self.filter.set_access_start_from(from);
        self.filter.set_access_start_to(to);
        self.page = 1;
    }

    pub fn replace_filter(&mut self, filter: RecordFilter) {
        self.filter = filter;
        self.page = 1;
    }

    pub fn reset_filters(&mut self) {
        self.replace_filter(RecordFilter::default());
    }

    /// Column-header click: the same column flips ascending to descending,
    /// anything else starts ascending.
    pub fn request_sort(&mut self, field: RecordField) {
        let direction = match self.sort {
            Some(SortSpec {
                field: current,
                direction: SortDirection::Ascending,
            }) if current == field => SortDirection::Descending,
            _ => SortDirection::Ascending,
        };
        self.sort = Some(SortSpec { field, direction });
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.sort = sort;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Filtered and sorted records, unpaginated. This is what exports use.
    pub fn processed(&self) -> Vec<Record> {
        apply(self.records.clone(), &self.filter, self.sort)
    }

    pub fn current_page(&self) -> Page<Record> {
        paginate(self.processed(), self.page, self.per_page)
    }

    pub fn into_processed(self) -> Vec<Record> {
        apply(self.records, &self.filter, self.sort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn record(id: i32, name: &str, start: NaiveDateTime) -> Record {
        Record {
            record_id: id,
            user_full_name: name.to_string(),
            position: Some("инженер".into()),
            email: None,
            phone: None,
            organization_name: Some("ООО Ромашка".into()),
            external_user_name: None,
            external_user_position: None,
            external_user_email: None,
            external_user_phone: None,
            object_name: "Сервер 1С".into(),
            work_types: None,
            access_type: "удаленный".into(),
            access_start_date: start,
            access_end_date: None,
            actual_connection_date: None,
            actual_disconnection_date: None,
            curator: None,
            executor: None,
            notes: None,
        }
    }

    fn ids(records: &[Record]) -> Vec<i32> {
        records.iter().map(|r| r.record_id).collect()
    }

    #[test]
    fn date_range_is_inclusive_at_day_granularity() {
        let records = vec![
            record(1, "A", at(2023, 12, 31, 23)),
            record(2, "B", at(2024, 1, 1, 0)),
            record(3, "C", at(2024, 1, 15, 12)),
            record(4, "D", at(2024, 1, 31, 23)),
            record(5, "E", at(2024, 2, 1, 0)),
        ];
        let mut filter = RecordFilter::default();
        filter.set_access_start_from(NaiveDate::from_ymd_opt(2024, 1, 1));
        filter.set_access_start_to(NaiveDate::from_ymd_opt(2024, 1, 31));
        assert_eq!(ids(&apply(records, &filter, None)), vec![2, 3, 4]);
    }

    #[test]
    fn text_filters_are_case_insensitive_and_combined() {
        let mut other = record(2, "Петров Пётр", at(2024, 1, 2, 0));
        other.organization_name = Some("ИП Сидоров".into());
        let records = vec![record(1, "Иванов Иван", at(2024, 1, 1, 0)), other];

        let mut filter = RecordFilter::default();
        filter.set(RecordField::UserFullName, "иван");
        assert_eq!(ids(&apply(records.clone(), &filter, None)), vec![1]);

        filter.set(RecordField::OrganizationName, "сидоров");
        assert!(apply(records.clone(), &filter, None).is_empty());

        filter.set(RecordField::UserFullName, "");
        assert_eq!(ids(&apply(records, &filter, None)), vec![2]);
    }

    #[test]
    fn filter_on_absent_field_excludes_record() {
        let records = vec![record(1, "A", at(2024, 1, 1, 0))];
        let mut filter = RecordFilter::default();
        filter.set(RecordField::Notes, "x");
        assert!(apply(records, &filter, None).is_empty());
    }

    #[test]
    fn missing_dates_sort_last_ascending_and_first_descending() {
        let mut a = record(1, "A", at(2024, 1, 1, 0));
        a.access_end_date = Some(at(2024, 3, 1, 0));
        let b = record(2, "B", at(2024, 1, 1, 0));
        let mut c = record(3, "C", at(2024, 1, 1, 0));
        c.access_end_date = Some(at(2024, 2, 1, 0));

        let asc = SortSpec {
            field: RecordField::AccessEndDate,
            direction: SortDirection::Ascending,
        };
        let mut rows = vec![a.clone(), b.clone(), c.clone()];
        sort_records(&mut rows, asc);
        assert_eq!(ids(&rows), vec![3, 1, 2]);

        let desc = SortSpec {
            direction: SortDirection::Descending,
            ..asc
        };
        let mut rows = vec![a, b, c];
        sort_records(&mut rows, desc);
        assert_eq!(ids(&rows), vec![2, 1, 3]);
    }

    #[test]
    fn text_sort_is_lexicographic_with_missing_as_empty() {
        let mut a = record(1, "Б", at(2024, 1, 1, 0));
        a.curator = Some("Яковлев".into());
        let b = record(2, "А", at(2024, 1, 1, 0));
        let mut c = record(3, "В", at(2024, 1, 1, 0));
        c.curator = Some("Андреев".into());

        let mut rows = vec![a, b, c];
        sort_records(
            &mut rows,
            SortSpec {
                field: RecordField::Curator,
                direction: SortDirection::Ascending,
            },
        );
        assert_eq!(ids(&rows), vec![2, 3, 1]);
    }

    #[test]
    fn header_clicks_toggle_direction() {
        let mut view = RecordListView::new(vec![]);
        view.request_sort(RecordField::ObjectName);
        assert_eq!(view.sort().unwrap().direction, SortDirection::Ascending);
        view.request_sort(RecordField::ObjectName);
        assert_eq!(view.sort().unwrap().direction, SortDirection::Descending);
        view.request_sort(RecordField::ObjectName);
        assert_eq!(view.sort().unwrap().direction, SortDirection::Ascending);
        view.request_sort(RecordField::Curator);
        assert_eq!(
            view.sort(),
            Some(SortSpec {
                field: RecordField::Curator,
                direction: SortDirection::Ascending
            })
        );
    }

    #[test]
    fn changing_a_filter_returns_to_first_page() {
        let records = (1..=25).map(|i| record(i, "A", at(2024, 1, 1, 0))).collect();
        let mut view = RecordListView::new(records);
        view.set_page(3);
        let page = view.current_page();
        assert_eq!(page.total_pages, 3);
        assert_eq!(ids(&page.data), vec![21, 22, 23, 24, 25]);

        view.set_filter(RecordField::UserFullName, "a");
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn paginate_edges() {
        let page = paginate((1..=30).collect::<Vec<_>>(), 2, DEFAULT_PAGE_SIZE);
        assert_eq!(page.data, (16..=30).collect::<Vec<_>>());
        assert_eq!(page.total_pages, 2);

        let empty = paginate(Vec::<i32>::new(), 1, RECORDS_PAGE_SIZE);
        assert_eq!(empty.total_pages, 0);
        assert!(empty.data.is_empty());

        let past_end = paginate(vec![1, 2, 3], 5, 2);
        assert!(past_end.data.is_empty());
        assert_eq!(past_end.total_items, 3);
    }

    #[test]
    fn huge_page_is_empty_not_a_panic() {
        let page = paginate((1..=30).collect::<Vec<_>>(), usize::MAX, usize::MAX);
        assert!(page.data.is_empty());
        assert_eq!(page.page, usize::MAX);

        let page = paginate((1..=30).collect::<Vec<_>>(), usize::MAX, DEFAULT_PAGE_SIZE);
        assert!(page.data.is_empty());
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn field_keys_round_trip() {
        for field in RecordField::ALL {
            assert_eq!(RecordField::from_key(field.key()), Some(field));
        }
        assert_eq!(RecordField::from_key("userfullname"), Some(RecordField::UserFullName));
        assert_eq!(RecordField::from_key("Password"), None);
    }
}
