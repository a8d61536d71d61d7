//! Where devotional messages come from.
//!
//! A [`Mailbox`] hands out sessions; a session yields the body of the most
//! recent message and is closed afterwards whatever the outcome.
//! [`read_latest`] wraps the whole exchange and never fails: any problem
//! turns into an empty [`Extraction`] with a diagnostic.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use tracing::{debug, warn};

use super::extract::{Extraction, extract};
use super::message::plain_text_body;

/// Default bound on a whole mailbox exchange.
pub const DEFAULT_MAILBOX_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from mailbox access.
#[derive(Debug, thiserror::Error)]
pub enum MailboxError {
    #[error("no mailbox configured")]
    NotConfigured,

    #[error("mailbox I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IMAP error: {0}")]
    Imap(#[from] async_imap::error::Error),

    #[error("invalid IMAP host name: {0:?}")]
    InvalidHost(String),

    #[error("mailbox is empty")]
    Empty,

    #[error("message has no plain-text part")]
    NoPlainText,

    #[error("mailbox did not answer within {0:?}")]
    Timeout(Duration),
}

/// A source of messages.
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// Open a session.
    async fn connect(&self) -> Result<Box<dyn MailboxSession>, MailboxError>;
}

/// An open mailbox session.
#[async_trait]
pub trait MailboxSession: Send {
    /// Body text of the most recent message.
    async fn latest_message_body(&mut self) -> Result<String, MailboxError>;

    /// Release the session.
    async fn close(self: Box<Self>);
}

/// Read and extract the most recent message.
///
/// The session is closed on every path once connected. The whole exchange
/// is bounded by `timeout`.
pub async fn read_latest(mailbox: &dyn Mailbox, timeout: Duration) -> Extraction {
    let exchange = async {
        let mut session = mailbox.connect().await?;
        let body = session.latest_message_body().await;
        session.close().await;
        body
    };

    let body = match tokio::time::timeout(timeout, exchange).await {
        Ok(result) => result,
        Err(_) => Err(MailboxError::Timeout(timeout)),
    };

    match body {
        Ok(body) => {
            let extraction = extract(&body);
            if let Some(reason) = &extraction.diagnostic {
                debug!(%reason, "devotional extraction found nothing");
            }
            extraction
        }
        Err(MailboxError::NotConfigured) => {
            debug!("no mailbox configured, devotional text left empty");
            Extraction::failed(MailboxError::NotConfigured.to_string())
        }
        Err(e) => {
            warn!(error = %e, "failed to read devotional message");
            Extraction::failed(e.to_string())
        }
    }
}

/// A mailbox that is not there.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMailbox;

#[async_trait]
impl Mailbox for NoMailbox {
    async fn connect(&self) -> Result<Box<dyn MailboxSession>, MailboxError> {
        Err(MailboxError::NotConfigured)
    }
}

/// A mailbox holding a fixed message, or none.
#[derive(Debug, Clone, Default)]
pub struct StaticMailbox {
    body: Option<String>,
}

impl StaticMailbox {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
        }
    }

    pub fn empty() -> Self {
        Self { body: None }
    }
}

#[async_trait]
impl Mailbox for StaticMailbox {
    async fn connect(&self) -> Result<Box<dyn MailboxSession>, MailboxError> {
        Ok(Box::new(StaticSession {
            body: self.body.clone(),
        }))
    }
}

struct StaticSession {
    body: Option<String>,
}

#[async_trait]
impl MailboxSession for StaticSession {
    async fn latest_message_body(&mut self) -> Result<String, MailboxError> {
        self.body.clone().ok_or(MailboxError::Empty)
    }

    async fn close(self: Box<Self>) {}
}

/// A directory of stored messages, one per file.
///
/// The most recently modified file is the latest message. Files ending in
/// `.eml` are parsed as mail and their plain-text part used; anything else
/// is read as the body itself.
#[derive(Debug, Clone)]
pub struct DirMailbox {
    dir: PathBuf,
}

impl DirMailbox {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl Mailbox for DirMailbox {
    async fn connect(&self) -> Result<Box<dyn MailboxSession>, MailboxError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut messages = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            messages.push((modified, entry.path()));
        }

        debug!(dir = %self.dir.display(), count = messages.len(), "opened mailbox directory");
        Ok(Box::new(DirSession { messages }))
    }
}

struct DirSession {
    messages: Vec<(SystemTime, PathBuf)>,
}

#[async_trait]
impl MailboxSession for DirSession {
    async fn latest_message_body(&mut self) -> Result<String, MailboxError> {
        // Ties on modification time go to the greater path
        let (_, path) = self.messages.iter().max().ok_or(MailboxError::Empty)?;

        let bytes = tokio::fs::read(path).await?;

        let is_eml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("eml"));
        if is_eml {
            plain_text_body(&bytes).ok_or(MailboxError::NoPlainText)
        } else {
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
    }

    async fn close(self: Box<Self>) {}
}
