//! Place identifier types.

use std::fmt;

/// Error returned when parsing an invalid place identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid place identifier: {reason}")]
pub struct InvalidPlaceId {
    reason: &'static str,
}

/// Identifier of a place of worship on the source site.
///
/// The identifier is the slug the site uses in its page URLs
/// (e.g. `mosquee-sahaba-creteil`). It doubles as the cache key, so it is
/// restricted to characters that are safe in both a URL path segment and
/// a file name: ASCII letters, digits, `-`, `_` and `.`.
///
/// # Examples
///
/// ```
/// use masjid_times::domain::PlaceId;
///
/// let place = PlaceId::parse("mosquee-sahaba-creteil").unwrap();
/// assert_eq!(place.as_str(), "mosquee-sahaba-creteil");
///
/// // Path separators and whitespace are rejected
/// assert!(PlaceId::parse("../etc").is_err());
/// assert!(PlaceId::parse("two words").is_err());
/// assert!(PlaceId::parse("").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PlaceId(String);

/// Longest identifier accepted; real slugs are far shorter.
const MAX_LEN: usize = 128;

impl PlaceId {
    /// Parse a place identifier from a string.
    pub fn parse(s: &str) -> Result<Self, InvalidPlaceId> {
        if s.is_empty() {
            return Err(InvalidPlaceId {
                reason: "must not be empty",
            });
        }

        if s.len() > MAX_LEN {
            return Err(InvalidPlaceId {
                reason: "must be at most 128 characters",
            });
        }

        if s.chars().all(|c| c == '.') {
            return Err(InvalidPlaceId {
                reason: "must not consist only of dots",
            });
        }

        let valid = s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
        if !valid {
            return Err(InvalidPlaceId {
                reason: "must contain only ASCII letters, digits, '-', '_' or '.'",
            });
        }

        Ok(Self(s.to_string()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlaceId({})", self.0)
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_slugs() {
        assert!(PlaceId::parse("mosquee-sahaba-creteil").is_ok());
        assert!(PlaceId::parse("grande_mosquee.paris").is_ok());
        assert!(PlaceId::parse("m2").is_ok());
    }

    #[test]
    fn reject_separators_and_spaces() {
        assert!(PlaceId::parse("a/b").is_err());
        assert!(PlaceId::parse("a\\b").is_err());
        assert!(PlaceId::parse("a b").is_err());
        assert!(PlaceId::parse("a?b=c").is_err());
    }

    #[test]
    fn reject_dot_only() {
        assert!(PlaceId::parse(".").is_err());
        assert!(PlaceId::parse("..").is_err());
    }

    #[test]
    fn reject_non_ascii() {
        assert!(PlaceId::parse("mosquée").is_err());
    }

    #[test]
    fn reject_too_long() {
        let long = "a".repeat(MAX_LEN + 1);
        assert!(PlaceId::parse(&long).is_err());
        assert!(PlaceId::parse(&"a".repeat(MAX_LEN)).is_ok());
    }

    #[test]
    fn display_and_debug() {
        let place = PlaceId::parse("abc").unwrap();
        assert_eq!(place.to_string(), "abc");
        assert_eq!(format!("{place:?}"), "PlaceId(abc)");
    }
}
