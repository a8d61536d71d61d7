//! Line-oriented extraction of the daily text from a mail body.
//!
//! Messages follow a loose layout: a title line, a separator, the opening
//! formula, then the text in French followed by the Arabic text, then
//! a mailing-list footer. The body is wrapped at a fixed column by the
//! sender, so paragraphs have to be rebuilt before the two languages can
//! be told apart.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Footer phrases; the body is cut at the earliest of them.
pub const TRUNCATION_PHRASES: [&str; 6] = [
    "Retrouvez le hadith du jour",
    "www.hadithdujour.com",
    "officielhadithdujour@gmail.com",
    "désinscription",
    "Afficher l'intégralité",
    "Message tronqué",
];

/// At most this many trailing newlines are stripped from a field.
const MAX_TRAILING_NEWLINES: usize = 5;

/// Line index of the title after decoration removal.
const TITLE_LINE: usize = 0;

/// Line index of the opening formula after decoration removal.
const OPENING_LINE: usize = 2;

/// First line index of the body.
const BODY_START: usize = 3;

static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("valid regex"));

/// The four labelled fields of a devotional message. Empty when unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevotionalText {
    pub title: String,
    pub opening_formula: String,
    pub body_primary_language: String,
    pub body_secondary_language: String,
}

/// Result of an extraction attempt.
///
/// Extraction never fails; when nothing usable was found the fields are
/// empty and `diagnostic` says why.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub text: DevotionalText,
    pub diagnostic: Option<String>,
}

impl Extraction {
    /// All-empty fields with a reason.
    pub fn failed(diagnostic: impl Into<String>) -> Self {
        Self {
            text: DevotionalText::default(),
            diagnostic: Some(diagnostic.into()),
        }
    }
}

/// Split a raw message body into title, opening formula and the two bodies.
///
/// # Examples
///
/// ```
/// use masjid_times::devotional::extract;
///
/// let raw = "TITLE\n***\nBismillah\nHello world\nمرحبا";
/// let text = extract(raw).text;
/// assert_eq!(text.title, "TITLE");
/// assert_eq!(text.opening_formula, "Bismillah");
/// assert_eq!(text.body_primary_language, "Hello world");
/// assert_eq!(text.body_secondary_language, "مرحبا");
/// ```
pub fn extract(raw: &str) -> Extraction {
    let normalized = raw.trim().replace('\r', "");
    if normalized.is_empty() {
        return Extraction::failed("empty message body");
    }

    let lines = content_lines(&normalized);

    let title = lines.get(TITLE_LINE).map_or("", |l| l.trim());
    let opening = lines.get(OPENING_LINE).map_or("", |l| l.trim());
    let body_lines = lines.get(BODY_START..).unwrap_or_default();

    let body = reflow(&body_lines.join("\n"));
    let body = truncate_at_footer(&body);
    let (primary, secondary) = split_languages(body);

    Extraction {
        text: DevotionalText {
            title: clean_field(title),
            opening_formula: clean_field(opening),
            body_primary_language: clean_field(&primary),
            body_secondary_language: clean_field(&secondary),
        },
        diagnostic: None,
    }
}

/// A line made only of rule characters (`*`, `-`, `_`, `=`, `~`, `#`) and spaces.
fn is_decorative(line: &str) -> bool {
    let t = line.trim();
    !t.is_empty()
        && t.chars()
            .all(|c| c.is_whitespace() || matches!(c, '*' | '-' | '_' | '=' | '~' | '#'))
}

/// Lines with decorative rules removed.
///
/// A run of rules standing between two text lines is the only thing
/// separating them, so it becomes one blank line; anywhere else it is
/// dropped.
fn content_lines(text: &str) -> Vec<&str> {
    let raw: Vec<&str> = text.split('\n').collect();
    let mut lines = Vec::with_capacity(raw.len());

    let mut i = 0;
    while i < raw.len() {
        if !is_decorative(raw[i]) {
            lines.push(raw[i]);
            i += 1;
            continue;
        }

        let start = i;
        while i < raw.len() && is_decorative(raw[i]) {
            i += 1;
        }

        let before = start.checked_sub(1).map(|j| raw[j]);
        let after = raw.get(i).copied();
        if let (Some(b), Some(a)) = (before, after)
            && !b.trim().is_empty()
            && !a.trim().is_empty()
        {
            lines.push("");
        }
    }

    lines
}

fn has_arabic(s: &str) -> bool {
    s.chars().any(|c| ('\u{0600}'..='\u{06FF}').contains(&c))
}

/// Rebuild paragraphs wrapped at a fixed column.
///
/// A newline with no newline on either side becomes a space; blank-line
/// paragraph breaks are kept. A line break where the text switches into
/// Arabic script is also kept. Runs of spaces collapse to one.
fn reflow(body: &str) -> String {
    let lines: Vec<&str> = body.split('\n').collect();
    let last = lines.len() - 1;
    let mut out = String::with_capacity(body.len());

    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            let prev = lines[i - 1];
            let preceded_by_newline = prev.is_empty() && i > 1;
            let followed_by_newline = line.is_empty() && i < last;
            let lone = !preceded_by_newline && !followed_by_newline;
            let enters_arabic = !has_arabic(prev) && has_arabic(line);

            out.push(if lone && !enters_arabic { ' ' } else { '\n' });
        }
        out.push_str(line);
    }

    MULTI_SPACE.replace_all(&out, " ").into_owned()
}

/// The body up to the earliest footer phrase.
fn truncate_at_footer(body: &str) -> &str {
    TRUNCATION_PHRASES.iter().fold(body, |text, phrase| {
        text.find(phrase).map_or(text, |i| &text[..i])
    })
}

/// Split at the first line containing Arabic script.
fn split_languages(body: &str) -> (String, String) {
    let lines: Vec<&str> = body.split('\n').collect();
    match lines.iter().position(|l| has_arabic(l)) {
        Some(i) => (
            lines[..i].join("\n").trim().to_string(),
            lines[i..].join("\n").trim().to_string(),
        ),
        None => (body.trim().to_string(), String::new()),
    }
}

/// Drop `*` emphasis, then up to five trailing newlines and surrounding whitespace.
fn clean_field(s: &str) -> String {
    let without_stars = s.replace('*', "");
    let mut text = without_stars.as_str();
    for _ in 0..MAX_TRAILING_NEWLINES {
        match text.strip_suffix('\n') {
            Some(rest) => text = rest,
            None => break,
        }
    }
    text.trim().to_string()
}
