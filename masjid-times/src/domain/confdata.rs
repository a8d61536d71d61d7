//! The configuration payload ("confData") published by the source site.
//!
//! Only the fields the pipeline reads are typed. Every other key is kept
//! verbatim in [`ConfData::extra`] so the raw payload can be served back
//! unchanged.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Decoded confData payload for one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfData {
    /// Iqama clock strings for fajr, dohr, asr, maghreb and isha.
    pub times: Vec<String>,

    /// Sunrise clock string.
    pub shuruq: String,

    /// Twelve monthly tables, January first.
    pub calendar: Vec<MonthTable>,

    /// Friday prayer time, if the place publishes one.
    #[serde(default)]
    pub jumua: Option<String>,

    /// Hijri date as a display string.
    #[serde(default)]
    pub hijri_date: Option<String>,

    /// All remaining confData keys.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One month of a timetable: day-of-month key → raw row tokens.
///
/// Rows are kept in document order. Non-string tokens are dropped while
/// decoding; decorative string tokens are kept and filtered later.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthTable {
    days: Vec<(String, Vec<String>)>,
}

impl MonthTable {
    /// Build a table from `(day key, tokens)` rows.
    pub fn from_rows<K, T>(rows: impl IntoIterator<Item = (K, Vec<T>)>) -> Self
    where
        K: Into<String>,
        T: Into<String>,
    {
        Self {
            days: rows
                .into_iter()
                .map(|(k, tokens)| (k.into(), tokens.into_iter().map(Into::into).collect()))
                .collect(),
        }
    }

    /// Raw tokens for a day of the month, looked up by its decimal key.
    pub fn day(&self, day: u32) -> Option<&[String]> {
        let key = day.to_string();
        self.days
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, tokens)| tokens.as_slice())
    }

    /// Rows in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.days.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of day rows.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Returns true if the month has no rows.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl<'de> Deserialize<'de> for MonthTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MonthVisitor;

        impl<'de> Visitor<'de> for MonthVisitor {
            type Value = MonthTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of day-of-month to a list of times")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<MonthTable, A::Error> {
                let mut days = Vec::with_capacity(map.size_hint().unwrap_or(31));
                while let Some((day, tokens)) = map.next_entry::<String, Vec<Value>>()? {
                    let tokens = tokens
                        .into_iter()
                        .filter_map(|t| match t {
                            Value::String(s) => Some(s),
                            _ => None,
                        })
                        .collect();
                    days.push((day, tokens));
                }
                Ok(MonthTable { days })
            }
        }

        deserializer.deserialize_map(MonthVisitor)
    }
}

impl Serialize for MonthTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.days.len()))?;
        for (day, tokens) in &self.days {
            map.serialize_entry(day, tokens)?;
        }
        map.end()
    }
}
