//! Timetable query construction.
//!
//! The search endpoint always expects a round-trip shaped form, so even a
//! one-way lookup carries a return leg. That leg defaults to the current
//! time rounded up to the next half hour.

use chrono::{Duration, NaiveDateTime, Timelike};

use crate::stations::Station;

/// Date format expected by the endpoint.
pub const DATE_FORMAT: &str = "%Y/%m/%d";

/// Time format expected by the endpoint.
pub const TIME_FORMAT: &str = "%H:%M";

/// A lookup as the agent phrases it: station names plus date and time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableRequest {
    /// Origin, as a station code or display name
    pub start: String,
    /// Destination, as a station code or display name
    pub destination: String,
    /// Travel date, `YYYY/MM/DD`
    pub date: String,
    /// Earliest departure of interest, `HH:MM`
    pub time: String,
}

impl TimetableRequest {
    pub fn new(
        start: impl Into<String>,
        destination: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self {
            start: start.into(),
            destination: destination.into(),
            date: date.into(),
            time: time.into(),
        }
    }
}

/// A fully resolved query, ready to be sent as a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableQuery {
    pub start: Station,
    pub end: Station,
    pub outward_date: String,
    pub outward_time: String,
    pub return_date: String,
    pub return_time: String,
    /// `S` for a standard search
    pub search_type: String,
    /// `TW` for traditional Chinese
    pub lang: String,
    pub discount_type: String,
}

impl TimetableQuery {
    /// Build a query with the return leg derived from `now`.
    pub fn new(
        start: Station,
        end: Station,
        outward_date: impl Into<String>,
        outward_time: impl Into<String>,
        now: NaiveDateTime,
    ) -> Self {
        let return_at = next_half_hour(now);
        Self {
            start,
            end,
            outward_date: outward_date.into(),
            outward_time: outward_time.into(),
            return_date: return_at.format(DATE_FORMAT).to_string(),
            return_time: return_at.format(TIME_FORMAT).to_string(),
            search_type: "S".to_string(),
            lang: "TW".to_string(),
            discount_type: String::new(),
        }
    }

    /// Form fields in the order the endpoint documents them.
    pub fn to_form(&self) -> Vec<(&'static str, String)> {
        vec![
            ("SearchType", self.search_type.clone()),
            ("Lang", self.lang.clone()),
            ("StartStation", self.start.code().to_string()),
            ("EndStation", self.end.code().to_string()),
            ("OutWardSearchDate", self.outward_date.clone()),
            ("OutWardSearchTime", self.outward_time.clone()),
            ("ReturnSearchDate", self.return_date.clone()),
            ("ReturnSearchTime", self.return_time.clone()),
            ("DiscountType", self.discount_type.clone()),
        ]
    }
}

/// Round `now` up to the next half-hour boundary.
///
/// Minutes 0-29 move to :30 of the same hour; minutes 30-59 move to :00 of
/// the next hour, rolling the date over at midnight. Seconds are dropped.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use tool_server::timetable::next_half_hour;
///
/// let at = |h, m| NaiveDate::from_ymd_opt(2025, 5, 27).unwrap().and_hms_opt(h, m, 0).unwrap();
/// assert_eq!(next_half_hour(at(14, 10)), at(14, 30));
/// assert_eq!(next_half_hour(at(14, 30)), at(15, 0));
/// ```
pub fn next_half_hour(now: NaiveDateTime) -> NaiveDateTime {
    let hour_start = now
        .date()
        .and_hms_opt(now.hour(), 0, 0)
        .unwrap_or(now);
    if now.minute() >= 30 {
        hour_start + Duration::hours(1)
    } else {
        hour_start + Duration::minutes(30)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn early_minutes_round_to_half_past() {
        assert_eq!(next_half_hour(at(2025, 5, 27, 9, 0, 0)), at(2025, 5, 27, 9, 30, 0));
        assert_eq!(next_half_hour(at(2025, 5, 27, 9, 29, 59)), at(2025, 5, 27, 9, 30, 0));
    }

    #[test]
    fn late_minutes_round_to_next_hour() {
        assert_eq!(next_half_hour(at(2025, 5, 27, 9, 30, 0)), at(2025, 5, 27, 10, 0, 0));
        assert_eq!(next_half_hour(at(2025, 5, 27, 9, 59, 12)), at(2025, 5, 27, 10, 0, 0));
    }

    #[test]
    fn rounding_crosses_midnight() {
        assert_eq!(next_half_hour(at(2025, 12, 31, 23, 45, 0)), at(2026, 1, 1, 0, 0, 0));
    }

    #[test]
    fn query_formats_return_leg() {
        let query = TimetableQuery::new(
            Station::TaiPei,
            Station::TaiZhong,
            "2025/05/27",
            "14:30",
            at(2025, 5, 26, 8, 5, 0),
        );
        assert_eq!(query.return_date, "2025/05/26");
        assert_eq!(query.return_time, "08:30");
        assert_eq!(query.search_type, "S");
        assert_eq!(query.lang, "TW");
    }

    #[test]
    fn form_carries_every_field() {
        let query = TimetableQuery::new(
            Station::NanGang,
            Station::ZuoYing,
            "2025/05/28",
            "05:30",
            at(2025, 5, 26, 18, 40, 0),
        );
        let form = query.to_form();
        let keys: Vec<_> = form.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            [
                "SearchType",
                "Lang",
                "StartStation",
                "EndStation",
                "OutWardSearchDate",
                "OutWardSearchTime",
                "ReturnSearchDate",
                "ReturnSearchTime",
                "DiscountType",
            ]
        );
        assert_eq!(form[2].1, "NanGang");
        assert_eq!(form[3].1, "ZuoYing");
        assert_eq!(form[6].1, "2025/05/26");
        assert_eq!(form[7].1, "19:00");
        assert_eq!(form[8].1, "");
    }
}
