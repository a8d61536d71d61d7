//! The daily devotional text shown next to the timetable.

mod extract;
mod imap;
mod mailbox;
mod message;

pub use extract::{DevotionalText, Extraction, TRUNCATION_PHRASES, extract};
pub use imap::{
    DEFAULT_IMAP_FOLDER, DEFAULT_IMAP_HOST, DEFAULT_IMAP_PORT, ImapConfig, ImapMailbox,
};
pub use mailbox::{
    DEFAULT_MAILBOX_TIMEOUT, DirMailbox, Mailbox, MailboxError, MailboxSession, NoMailbox,
    StaticMailbox, read_latest,
};
pub use message::plain_text_body;
