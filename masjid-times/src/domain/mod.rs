//! Domain types for the prayer timetable pipeline.
//!
//! Identifiers and times enforce their invariants at construction time;
//! the confData payload is decoded into typed fields plus a pass-through
//! map of everything else.

mod confdata;
mod place;
mod prayer;
mod time;

pub use confdata::{ConfData, MonthTable};
pub use place::{InvalidPlaceId, PlaceId};
pub use prayer::{DayTimes, Prayer, PrayerMap};
pub use time::{Clock, ClockTime, FixedClock, SystemClock, TimeError};
