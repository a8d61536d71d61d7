//! Daily prayers and the per-day timetable.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The six daily entries of a timetable row, in the order the source lists them.
///
/// Sunrise (`Shuruk`) is not a prayer but occupies the second column of
/// every row, so it is modelled alongside the five prayers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prayer {
    Fajr,
    Shuruk,
    Dohr,
    Asr,
    Maghreb,
    Isha,
}

impl Prayer {
    /// Column order of a timetable row.
    pub const DAY_ORDER: [Prayer; 6] = [
        Prayer::Fajr,
        Prayer::Shuruk,
        Prayer::Dohr,
        Prayer::Asr,
        Prayer::Maghreb,
        Prayer::Isha,
    ];

    /// The prayers that carry an iqama, in the order of the payload's `times` list.
    pub const IQAMA_ORDER: [Prayer; 5] = [
        Prayer::Fajr,
        Prayer::Dohr,
        Prayer::Asr,
        Prayer::Maghreb,
        Prayer::Isha,
    ];

    /// Lowercase label used in JSON output.
    pub fn label(&self) -> &'static str {
        match self {
            Prayer::Fajr => "fajr",
            Prayer::Shuruk => "shuruk",
            Prayer::Dohr => "dohr",
            Prayer::Asr => "asr",
            Prayer::Maghreb => "maghreb",
            Prayer::Isha => "isha",
        }
    }
}

impl fmt::Display for Prayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Prayer label → clock string, ordered by `Prayer`.
pub type PrayerMap = BTreeMap<Prayer, String>;

/// One day of a timetable, after decorative tokens have been dropped.
///
/// Missing columns are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTimes {
    pub fajr: String,
    pub shuruk: String,
    pub dohr: String,
    pub asr: String,
    pub maghreb: String,
    pub isha: String,
}

impl DayTimes {
    /// Assign already-filtered clock tokens to columns by position.
    ///
    /// Extra tokens beyond the sixth are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use masjid_times::domain::DayTimes;
    ///
    /// let day = DayTimes::from_clock_tokens(&["05:10", "06:20", "12:30"]);
    /// assert_eq!(day.fajr, "05:10");
    /// assert_eq!(day.dohr, "12:30");
    /// assert_eq!(day.asr, "");
    /// ```
    pub fn from_clock_tokens(tokens: &[&str]) -> Self {
        let mut day = DayTimes::default();
        for (prayer, token) in Prayer::DAY_ORDER.iter().zip(tokens) {
            *day.slot_mut(*prayer) = (*token).to_string();
        }
        day
    }

    /// The clock string for a column.
    pub fn get(&self, prayer: Prayer) -> &str {
        match prayer {
            Prayer::Fajr => &self.fajr,
            Prayer::Shuruk => &self.shuruk,
            Prayer::Dohr => &self.dohr,
            Prayer::Asr => &self.asr,
            Prayer::Maghreb => &self.maghreb,
            Prayer::Isha => &self.isha,
        }
    }

    fn slot_mut(&mut self, prayer: Prayer) -> &mut String {
        match prayer {
            Prayer::Fajr => &mut self.fajr,
            Prayer::Shuruk => &mut self.shuruk,
            Prayer::Dohr => &mut self.dohr,
            Prayer::Asr => &mut self.asr,
            Prayer::Maghreb => &mut self.maghreb,
            Prayer::Isha => &mut self.isha,
        }
    }

    /// The five iqama-bearing prayers as a label map (sunrise excluded).
    pub fn prayers(&self) -> PrayerMap {
        Prayer::IQAMA_ORDER
            .iter()
            .map(|p| (*p, self.get(*p).to_string()))
            .collect()
    }
}
