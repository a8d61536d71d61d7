//! Locating the confData literal inside a place page.
//!
//! The page embeds its configuration as `var confData = {...};` inside an
//! inline `<script>` element. The JSON literal is decoded with a streaming
//! deserializer, so semicolons inside string values do not end it early.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::ConfData;

/// Any `<script>` element and its text.
static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b[^>]*>(.*?)</script\s*>").expect("valid regex"));

/// The assignment that introduces the payload.
static CONF_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bvar\s+confData\s*=\s*").expect("valid regex"));

/// Why the payload could not be read off a page.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    /// No script element contains the marker assignment
    #[error("no script contains the confData assignment")]
    ScriptNotFound,

    /// The marker is present but is not followed by a decodable payload
    #[error("confData literal is not a valid payload: {0}")]
    InvalidLiteral(String),
}

/// Find the text of the first `<script>` element that assigns confData.
pub fn locate_script(html: &str) -> Option<&str> {
    SCRIPT_BLOCK
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .find(|text| CONF_MARKER.is_match(text))
}

/// Decode the confData literal that follows the marker in `script`.
pub fn decode_conf_literal(script: &str) -> Result<ConfData, ScriptError> {
    let marker = CONF_MARKER
        .find(script)
        .ok_or(ScriptError::ScriptNotFound)?;
    let literal = &script[marker.end()..];

    // Decode exactly one JSON value; whatever follows it (`;`, more code) is ignored
    serde_json::Deserializer::from_str(literal)
        .into_iter::<ConfData>()
        .next()
        .ok_or_else(|| ScriptError::InvalidLiteral("empty literal".to_string()))?
        .map_err(|e| ScriptError::InvalidLiteral(e.to_string()))
}

/// Locate and decode the confData payload embedded in a page.
pub fn extract_conf_data(html: &str) -> Result<ConfData, ScriptError> {
    let script = locate_script(html).ok_or(ScriptError::ScriptNotFound)?;
    decode_conf_literal(script)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{"times":["05:10","12:30","15:45","18:10","19:40"],"shuruq":"06:20","calendar":[{"1":["05:10","06:20","12:30","15:45","18:10","19:40"]}],"jumua":"13:15","label":"a;b"}"#;

    fn page(script_body: &str) -> String {
        format!(
            "<html><head><script src=\"/app.js\"></script>\
             <script>window.dataLayer = [];</script>\
             <SCRIPT type=\"text/javascript\">\n{script_body}\n</SCRIPT></head><body></body></html>"
        )
    }

    #[test]
    fn extracts_payload_from_page() {
        let html = page(&format!("var confData = {PAYLOAD};\nvar other = 1;"));
        let conf = extract_conf_data(&html).unwrap();
        assert_eq!(conf.times.len(), 5);
        assert_eq!(conf.jumua.as_deref(), Some("13:15"));
        // The semicolon inside a string value did not cut the literal short
        assert_eq!(conf.extra["label"], "a;b");
    }

    #[test]
    fn locate_skips_unrelated_scripts() {
        let html = page(&format!("var confData = {PAYLOAD};"));
        let script = locate_script(&html).unwrap();
        assert!(script.contains("confData"));
        assert!(!script.contains("dataLayer"));
    }

    #[test]
    fn missing_script_is_reported() {
        let html = page("var somethingElse = {};");
        assert_eq!(extract_conf_data(&html), Err(ScriptError::ScriptNotFound));
    }

    #[test]
    fn marker_outside_script_is_ignored() {
        let html = format!("<body>var confData = {PAYLOAD};</body>");
        assert_eq!(extract_conf_data(&html), Err(ScriptError::ScriptNotFound));
    }

    #[test]
    fn undecodable_literal_is_reported() {
        let html = page("var confData = {\"times\": [\"05:10\"");
        assert!(matches!(
            extract_conf_data(&html),
            Err(ScriptError::InvalidLiteral(_))
        ));
    }

    #[test]
    fn literal_missing_required_fields_is_reported() {
        let html = page("var confData = {\"times\": []};");
        assert!(matches!(
            extract_conf_data(&html),
            Err(ScriptError::InvalidLiteral(_))
        ));
    }
}
