//! Source site access.
//!
//! Place pages on the source site embed their whole configuration as a
//! JavaScript literal. This module fetches those pages, extracts the
//! literal and caches the decoded payload.

mod client;
mod script;

pub use client::{DEFAULT_TIMEOUT_SECS, SourceConfig, SourceFetcher};
pub use script::{ScriptError, decode_conf_literal, extract_conf_data, locate_script};
