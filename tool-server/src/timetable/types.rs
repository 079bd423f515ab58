//! Timetable response DTOs.
//!
//! These map the JSON returned by the search endpoint. The payload is
//! loosely typed: fields are omitted or `null` at will, and numbers and
//! strings are used interchangeably, so every field is defaulted and
//! scalars are read as text.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Top level of a search reply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimetableReply {
    /// Whether the search succeeded on the remote side.
    #[serde(default, deserialize_with = "nullable")]
    pub success: bool,

    #[serde(default, deserialize_with = "nullable")]
    pub data: TimetableData,
}

/// Departure and fare tables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimetableData {
    #[serde(default, deserialize_with = "nullable")]
    pub departure_table: DepartureTable,

    #[serde(default, deserialize_with = "nullable")]
    pub price_table: PriceTable,
}

/// Title block plus the ordered list of trains.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DepartureTable {
    #[serde(default, deserialize_with = "nullable")]
    pub title: Title,

    #[serde(default, deserialize_with = "nullable")]
    pub train_item: Vec<TrainItem>,
}

/// Route title of a departure table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Title {
    #[serde(default, deserialize_with = "loose_string")]
    pub start_station_name: Option<String>,

    #[serde(default, deserialize_with = "loose_string")]
    pub end_station_name: Option<String>,

    /// Human label for the searched date and time.
    #[serde(default, deserialize_with = "loose_string")]
    pub title_split1: Option<String>,
}

/// One train in the departure table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrainItem {
    #[serde(default, deserialize_with = "loose_string")]
    pub train_number: Option<String>,

    /// Departure from the origin, `HH:MM`.
    #[serde(default, deserialize_with = "loose_string")]
    pub departure_time: Option<String>,

    /// Arrival at the destination, `HH:MM`.
    #[serde(default, deserialize_with = "loose_string")]
    pub destination_time: Option<String>,

    /// Travel time, e.g. `"01:02"`.
    #[serde(default, deserialize_with = "loose_string")]
    pub duration: Option<String>,
}

/// Fare lists keyed by fare class.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PriceTable {
    #[serde(default, deserialize_with = "loose_strings")]
    pub coach: Vec<String>,

    #[serde(default, deserialize_with = "loose_strings")]
    pub business: Vec<String>,

    #[serde(default, deserialize_with = "loose_strings")]
    pub unreserved: Vec<String>,
}

impl PriceTable {
    /// Fare classes in report order, with their display labels.
    pub fn classes(&self) -> [(&'static str, &[String]); 3] {
        [
            ("標準座", self.coach.as_slice()),
            ("商務座", self.business.as_slice()),
            ("自由座", self.unreserved.as_slice()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.coach.is_empty() && self.business.is_empty() && self.unreserved.is_empty()
    }
}

/// Treat an explicit `null` like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Render a JSON scalar as text; `null` and empty strings become `None`.
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

fn loose_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values.into_iter().filter_map(scalar_text).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_full_reply() {
        let reply: TimetableReply = serde_json::from_value(json!({
            "success": true,
            "data": {
                "DepartureTable": {
                    "Title": {
                        "StartStationName": "台北",
                        "EndStationName": "台中",
                        "TitleSplit1": "2025/05/27 14:30"
                    },
                    "TrainItem": [
                        {"TrainNumber": "0657", "DepartureTime": "14:46",
                         "DestinationTime": "15:48", "Duration": "01:02"}
                    ]
                },
                "PriceTable": {"Coach": ["700"], "Business": ["1,150"], "Unreserved": ["675"]}
            }
        }))
        .unwrap();

        assert!(reply.success);
        let table = &reply.data.departure_table;
        assert_eq!(table.title.start_station_name.as_deref(), Some("台北"));
        assert_eq!(table.train_item.len(), 1);
        assert_eq!(table.train_item[0].train_number.as_deref(), Some("0657"));
        assert_eq!(reply.data.price_table.business, vec!["1,150"]);
    }

    #[test]
    fn tolerates_nulls_numbers_and_missing_fields() {
        let reply: TimetableReply = serde_json::from_value(json!({
            "success": true,
            "data": {
                "DepartureTable": {
                    "Title": null,
                    "TrainItem": [
                        {"TrainNumber": 803, "DepartureTime": null, "Duration": ""}
                    ]
                },
                "PriceTable": {"Coach": [700, null, "850"]}
            }
        }))
        .unwrap();

        let train = &reply.data.departure_table.train_item[0];
        assert_eq!(train.train_number.as_deref(), Some("803"));
        assert_eq!(train.departure_time, None);
        assert_eq!(train.destination_time, None);
        assert_eq!(train.duration, None);
        assert_eq!(reply.data.price_table.coach, vec!["700", "850"]);
        assert!(reply.data.price_table.business.is_empty());
    }

    #[test]
    fn empty_object_is_unsuccessful() {
        let reply: TimetableReply = serde_json::from_value(json!({})).unwrap();
        assert!(!reply.success);
        assert!(reply.data.departure_table.train_item.is_empty());
        assert!(reply.data.price_table.is_empty());
    }

    #[test]
    fn wrong_shape_is_rejected() {
        let result = serde_json::from_value::<TimetableReply>(json!({"data": "oops"}));
        assert!(result.is_err());
    }
}
