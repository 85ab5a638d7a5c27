use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Journal timestamps are naive wall-clock values in the server's local zone,
/// the same clock the browser forms fill in. Expiry checks compare against this.
pub fn now_naive() -> NaiveDateTime {
    Local::now().naive_local()
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parses the timestamp shapes browsers and API clients send.
///
/// RFC 3339 values with an offset are converted to server-local wall-clock
/// time; naive values are already wall-clock and are taken as-is. A bare date
/// means midnight. Blank input yields `Ok(None)`.
pub fn parse_timestamp(raw: &str) -> Result<Option<NaiveDateTime>, String> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(None);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(Some(dt.with_timezone(&Local).naive_local()));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Some(dt));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(Some(date.and_time(NaiveTime::MIN)));
    }
    Err(format!("Некорректная дата: {}", s))
}

pub fn parse_date(raw: &str) -> Result<Option<NaiveDate>, String> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    parse_timestamp(s).map(|dt| dt.map(|dt| dt.date()))
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// 23:59:59.999, the inclusive upper bound of a day filter.
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    let end = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    date.and_time(end)
}

pub fn to_iso(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// `dd.mm.yyyy, HH:MM:SS`, the Russian locale rendering used in reports.
pub fn to_ru_display(dt: NaiveDateTime) -> String {
    dt.format("%d.%m.%Y, %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn accepts_browser_datetime_local() {
        assert_eq!(
            parse_timestamp("2024-01-15T10:30").unwrap(),
            Some(ymd_hms(2024, 1, 15, 10, 30, 0))
        );
    }

    #[test]
    fn offsets_land_on_the_same_clock_as_naive_input() {
        let utc = ymd_hms(2024, 1, 15, 7, 30, 0);
        let local = Local.from_utc_datetime(&utc).naive_local();
        assert_eq!(
            parse_timestamp("2024-01-15T10:30:00+03:00").unwrap(),
            Some(local)
        );
        assert_eq!(
            parse_timestamp("2024-01-15T07:30:00Z").unwrap(),
            Some(local)
        );
        let naive = local.format("%Y-%m-%dT%H:%M:%S").to_string();
        assert_eq!(parse_timestamp(&naive).unwrap(), Some(local));
    }

    #[test]
    fn now_naive_is_local_wall_clock() {
        let before = Local::now().naive_local();
        let now = now_naive();
        assert!(now >= before);
        assert!(now - before < chrono::Duration::seconds(5));
    }

    #[test]
    fn bare_date_is_midnight() {
        assert_eq!(
            parse_timestamp("2024-02-29").unwrap(),
            Some(ymd_hms(2024, 2, 29, 0, 0, 0))
        );
    }

    #[test]
    fn blank_is_absent_and_garbage_is_error() {
        assert_eq!(parse_timestamp("   ").unwrap(), None);
        assert!(parse_timestamp("15/01/2024").is_err());
    }

    #[test]
    fn day_bounds_are_inclusive() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(start_of_day(d), ymd_hms(2024, 1, 31, 0, 0, 0));
        assert_eq!(to_iso(end_of_day(d)), "2024-01-31T23:59:59");
        assert!(end_of_day(d) > ymd_hms(2024, 1, 31, 23, 59, 59));
    }

    #[test]
    fn russian_display_format() {
        assert_eq!(
            to_ru_display(ymd_hms(2024, 3, 5, 9, 7, 1)),
            "05.03.2024, 09:07:01"
        );
    }
}
