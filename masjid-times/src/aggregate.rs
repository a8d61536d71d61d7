//! The composite "today" view: timetable, iqama offsets and devotional text.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::calendar::{DAY_COLUMNS, date_tokens};
use crate::devotional::{DEFAULT_MAILBOX_TIMEOUT, DevotionalText, Mailbox, read_latest};
use crate::domain::{Clock, ClockTime, ConfData, DayTimes, PlaceId, Prayer, PrayerMap};
use crate::error::PrayerError;
use crate::source::SourceFetcher;

/// Number of entries the payload's `times` list must carry.
const IQAMA_COUNT: usize = Prayer::IQAMA_ORDER.len();

/// Everything a display needs for one day, built fresh per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositeView {
    /// ISO date taken as "today"
    pub date: String,
    pub today: PrayerMap,
    pub tomorrow: PrayerMap,
    pub shuruk: String,
    pub jumua: String,
    /// Minutes from adhan to iqama; `None` when either time does not parse
    pub iqama_delay: BTreeMap<Prayer, Option<i64>>,
    #[serde(rename = "hijriDate")]
    pub hijri_date: String,
    pub title: String,
    pub opening_formula: String,
    pub body_primary_language: String,
    pub body_secondary_language: String,
}

impl CompositeView {
    /// Fill in the devotional fields.
    pub fn with_devotional(mut self, text: DevotionalText) -> Self {
        self.title = text.title;
        self.opening_formula = text.opening_formula;
        self.body_primary_language = text.body_primary_language;
        self.body_secondary_language = text.body_secondary_language;
        self
    }
}

/// Build the timetable part of the composite view for `today`.
///
/// Devotional fields are left empty.
///
/// # Errors
///
/// * `DataIncomplete` if today has fewer than six clock times, or the
///   payload's `times` list fewer than five entries
/// * `DataIncomplete` if the payload lacks today's month table
pub fn compose(conf: &ConfData, today: NaiveDate) -> Result<CompositeView, PrayerError> {
    let today_tokens = date_tokens(conf, today)?;
    if today_tokens.len() < DAY_COLUMNS {
        return Err(PrayerError::DataIncomplete(format!(
            "{today} has {} valid times, expected {DAY_COLUMNS}",
            today_tokens.len()
        )));
    }
    if conf.times.len() < IQAMA_COUNT {
        return Err(PrayerError::DataIncomplete(format!(
            "times has {} entries, expected {IQAMA_COUNT}",
            conf.times.len()
        )));
    }
    let today_times = DayTimes::from_clock_tokens(&today_tokens);

    // Tomorrow may fall outside the payload; that only blanks the row.
    let tomorrow_times = today
        .succ_opt()
        .and_then(|tomorrow| date_tokens(conf, tomorrow).ok())
        .map(|tokens| DayTimes::from_clock_tokens(&tokens))
        .unwrap_or_default();

    let iqama_delay = Prayer::IQAMA_ORDER
        .iter()
        .zip(&conf.times)
        .map(|(prayer, iqama)| (*prayer, delay_minutes(today_times.get(*prayer), iqama)))
        .collect();

    let shuruk = if today_times.shuruk.is_empty() {
        conf.shuruq.clone()
    } else {
        today_times.shuruk.clone()
    };

    Ok(CompositeView {
        date: today.format("%Y-%m-%d").to_string(),
        today: today_times.prayers(),
        tomorrow: tomorrow_times.prayers(),
        shuruk,
        jumua: conf.jumua.clone().unwrap_or_default(),
        iqama_delay,
        hijri_date: conf.hijri_date.clone().unwrap_or_default(),
        title: String::new(),
        opening_formula: String::new(),
        body_primary_language: String::new(),
        body_secondary_language: String::new(),
    })
}

/// Signed minutes from `adhan` to `iqama`, or `None` if either is not a clock time.
fn delay_minutes(adhan: &str, iqama: &str) -> Option<i64> {
    let adhan = ClockTime::parse_hhmm(adhan).ok()?;
    let iqama = ClockTime::parse_hhmm(iqama).ok()?;
    Some(adhan.minutes_until(iqama))
}

/// Fetcher, mailbox and clock wired together.
#[derive(Clone)]
pub struct Aggregator {
    fetcher: Arc<SourceFetcher>,
    mailbox: Arc<dyn Mailbox>,
    clock: Arc<dyn Clock>,
    mailbox_timeout: Duration,
}

impl Aggregator {
    pub fn new(
        fetcher: Arc<SourceFetcher>,
        mailbox: Arc<dyn Mailbox>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            fetcher,
            mailbox,
            clock,
            mailbox_timeout: DEFAULT_MAILBOX_TIMEOUT,
        }
    }

    /// Bound the mailbox exchange.
    pub fn with_mailbox_timeout(mut self, timeout: Duration) -> Self {
        self.mailbox_timeout = timeout;
        self
    }

    pub fn fetcher(&self) -> &SourceFetcher {
        &self.fetcher
    }

    /// The date the aggregator treats as today.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Build the composite view for a place.
    ///
    /// The mailbox is only read once the timetable part is known to be
    /// complete. Mailbox problems leave the devotional fields empty.
    pub async fn build_composite(&self, place: &PlaceId) -> Result<CompositeView, PrayerError> {
        let conf = self.fetcher.fetch(place).await?;
        let view = compose(&conf, self.today())?;

        let extraction = read_latest(self.mailbox.as_ref(), self.mailbox_timeout).await;
        debug!(place = %place, date = %view.date, "built composite view");

        Ok(view.with_devotional(extraction.text))
    }
}
