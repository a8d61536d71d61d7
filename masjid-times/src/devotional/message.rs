//! Getting the plain-text body out of a stored or fetched message.

use mailparse::{ParsedMail, parse_mail};
use tracing::debug;

/// The decoded text of the first `text/plain` part of a message.
///
/// Transfer encodings and charsets are decoded; line endings come back as
/// `\n`. Single-part messages without a content type are treated as plain
/// text. Returns `None` when the message does not parse or has no
/// plain-text part.
///
/// # Examples
///
/// ```
/// use masjid_times::devotional::plain_text_body;
///
/// let raw = b"Subject: Hadith\r\nContent-Type: text/plain; charset=utf-8\r\n\r\nHello\r\n";
/// assert_eq!(plain_text_body(raw).as_deref(), Some("Hello\n"));
/// ```
pub fn plain_text_body(raw: &[u8]) -> Option<String> {
    let mail = match parse_mail(raw) {
        Ok(mail) => mail,
        Err(e) => {
            debug!(error = %e, "message does not parse");
            return None;
        }
    };
    first_plain_text(&mail).map(|body| body.replace("\r\n", "\n"))
}

/// Depth-first search for a `text/plain` leaf.
fn first_plain_text(part: &ParsedMail<'_>) -> Option<String> {
    if part.ctype.mimetype.starts_with("multipart/") {
        return part.subparts.iter().find_map(first_plain_text);
    }
    if part.ctype.mimetype != "text/plain" {
        return None;
    }
    match part.get_body() {
        Ok(body) => Some(body),
        Err(e) => {
            debug!(error = %e, charset = %part.ctype.charset, "undecodable text part");
            None
        }
    }
}
