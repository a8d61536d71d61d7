//! Pipeline error types.
//!
//! These are the failures a caller of the pipeline can see. Cache and
//! mailbox problems never show up here: they are absorbed where they
//! happen and only degrade the result.

use crate::domain::InvalidPlaceId;

/// Errors surfaced by the fetcher, calendar resolver and aggregator.
#[derive(Debug, thiserror::Error)]
pub enum PrayerError {
    /// The source site does not know this place
    #[error("place not found: {place}")]
    NotFound { place: String },

    /// The source site answered with an unexpected status
    #[error("upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// The page was fetched but the embedded confData is absent or undecodable
    #[error("confData missing for {place}: {reason}")]
    ServerDataMissing { place: String, reason: String },

    /// A caller-supplied argument is out of range or malformed
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The timetable does not have enough data for the requested view
    #[error("incomplete prayer data: {0}")]
    DataIncomplete(String),

    /// The upstream call did not complete in time
    #[error("request timed out")]
    Timeout,

    /// Connection-level HTTP failure (DNS, refused, reset, ...)
    #[error("HTTP transport error: {0}")]
    Transport(#[source] reqwest::Error),
}

impl From<reqwest::Error> for PrayerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PrayerError::Timeout
        } else {
            PrayerError::Transport(err)
        }
    }
}

impl From<InvalidPlaceId> for PrayerError {
    fn from(err: InvalidPlaceId) -> Self {
        PrayerError::InvalidArgument(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PlaceId;

    #[test]
    fn error_display() {
        let err = PrayerError::NotFound {
            place: "nowhere".into(),
        };
        assert_eq!(err.to_string(), "place not found: nowhere");

        let err = PrayerError::Upstream {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert_eq!(err.to_string(), "upstream error 503: Service Unavailable");

        let err = PrayerError::InvalidArgument("month 13 out of range 1-12".into());
        assert_eq!(
            err.to_string(),
            "invalid argument: month 13 out of range 1-12"
        );

        let err = PrayerError::Timeout;
        assert_eq!(err.to_string(), "request timed out");
    }

    #[test]
    fn invalid_place_becomes_invalid_argument() {
        let err: PrayerError = PlaceId::parse("a/b").unwrap_err().into();
        assert!(matches!(err, PrayerError::InvalidArgument(_)));
    }
}
