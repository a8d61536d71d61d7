//! Response bodies for the API.

use serde::Serialize;

use crate::domain::{ConfData, DayTimes};

/// The payload exactly as the source site publishes it.
#[derive(Debug, Serialize)]
pub struct RawDataResponse {
    pub rawdata: ConfData,
}

/// Twelve months of daily timetables.
#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub calendar: Vec<Vec<DayTimes>>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
