//! Text report for a timetable reply.
//!
//! The report is what the agent reads back to the user, so it is plain
//! fixed-width text in traditional Chinese, matching the `Lang=TW` search.

use chrono::NaiveTime;

use super::query::TIME_FORMAT;
use super::types::{TimetableReply, TrainItem};

/// Default number of trains listed.
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Placeholder the endpoint uses for a missing time.
const MISSING: &str = "N/A";

/// Width of the separator lines.
const RULE_WIDTH: usize = 60;

/// Filters applied while building the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    /// Maximum trains listed; `None` lists every qualifying train.
    pub max_results: Option<usize>,
    /// Only trains departing strictly after this `HH:MM` are listed.
    pub after: Option<String>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            max_results: Some(DEFAULT_MAX_RESULTS),
            after: None,
        }
    }
}

impl ReportOptions {
    /// Set the result limit. Zero or negative means unlimited.
    pub fn with_max_results(mut self, max: i64) -> Self {
        self.max_results = usize::try_from(max).ok().filter(|n| *n > 0);
        self
    }

    /// Only list trains departing strictly after `time`.
    pub fn after(mut self, time: impl Into<String>) -> Self {
        self.after = Some(time.into());
        self
    }
}

/// Whether `departure` is strictly later than `threshold`.
///
/// Both are compared as `HH:MM` times when they parse, otherwise as
/// strings (zero-padded times sort the same way).
pub fn departs_after(departure: &str, threshold: &str) -> bool {
    match (
        NaiveTime::parse_from_str(departure.trim(), TIME_FORMAT),
        NaiveTime::parse_from_str(threshold.trim(), TIME_FORMAT),
    ) {
        (Ok(dep), Ok(limit)) => dep > limit,
        _ => departure > threshold,
    }
}

/// Trains that pass the filters, in reply order, up to the limit.
pub fn qualifying_trains<'a>(
    trains: &'a [TrainItem],
    options: &'a ReportOptions,
) -> impl Iterator<Item = &'a TrainItem> + 'a {
    trains
        .iter()
        .filter(|train| {
            train
                .departure_time
                .as_deref()
                .is_some_and(|dep| dep != MISSING)
        })
        .filter(|train| match (&options.after, train.departure_time.as_deref()) {
            (Some(threshold), Some(dep)) => departs_after(dep, threshold),
            _ => true,
        })
        .take(options.max_results.unwrap_or(usize::MAX))
}

fn rule() -> String {
    format!("{}\n", "-".repeat(RULE_WIDTH))
}

/// Render a successful reply as a fixed-width report.
///
/// A reply flagged unsuccessful renders as a single failure line. A reply
/// with no qualifying trains still renders, with a "no suitable service"
/// line in place of the train table.
pub fn format_report(reply: &TimetableReply, options: &ReportOptions) -> String {
    if !reply.success {
        return "查詢失敗\n".to_string();
    }

    let table = &reply.data.departure_table;
    let start = table.title.start_station_name.as_deref().unwrap_or("未知");
    let end = table.title.end_station_name.as_deref().unwrap_or("未知");

    let mut out = String::from("台灣高鐵時刻表查詢結果\n");
    out.push_str(&format!("路線: 從 {start} 到 {end}\n"));
    if let Some(label) = &table.title.title_split1 {
        out.push_str(&format!("查詢時間: {label}\n"));
    }

    let trains: Vec<&TrainItem> = qualifying_trains(&table.train_item, options).collect();
    if trains.is_empty() {
        out.push_str("\n沒有找到合適的班次\n");
    } else {
        out.push_str(&format!(
            "\n{:^6} {:^6} {:^6} {:^8}\n",
            "車次", "發車時間", "到達時間", "行車時間"
        ));
        out.push_str(&rule());
        for train in trains {
            out.push_str(&format!(
                "{:^8} {:^10} {:^10} {:^10}\n",
                train.train_number.as_deref().unwrap_or(MISSING),
                train.departure_time.as_deref().unwrap_or(MISSING),
                train.destination_time.as_deref().unwrap_or(MISSING),
                train.duration.as_deref().unwrap_or(MISSING),
            ));
        }
        out.push_str(&rule());
    }

    let prices = &reply.data.price_table;
    if !prices.is_empty() {
        out.push_str(&format!(
            "\n票價說明 {:^6} {:^6} {:^6}\n",
            "普通票", "優待票", "自由座"
        ));
        out.push_str(&rule());
        for (label, list) in prices.classes() {
            if !list.is_empty() {
                out.push_str(&format!("{label}:   {}\n", list.join(", ")));
            }
        }
    }

    out
}
