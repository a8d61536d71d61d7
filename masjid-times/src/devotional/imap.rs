//! A mailbox on an IMAP server over TLS.

use std::fmt;
use std::sync::Arc;

use async_imap::Session;
use async_trait::async_trait;
use futures::TryStreamExt;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tracing::{debug, warn};

use super::mailbox::{Mailbox, MailboxError, MailboxSession};
use super::message::plain_text_body;

pub const DEFAULT_IMAP_HOST: &str = "imap.gmail.com";
pub const DEFAULT_IMAP_PORT: u16 = 993;
pub const DEFAULT_IMAP_FOLDER: &str = "INBOX";

/// Where and as whom to log in.
#[derive(Clone)]
pub struct ImapConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub folder: String,
}

impl ImapConfig {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: DEFAULT_IMAP_HOST.to_string(),
            port: DEFAULT_IMAP_PORT,
            user: user.into(),
            password: password.into(),
            folder: DEFAULT_IMAP_FOLDER.to_string(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }
}

impl fmt::Debug for ImapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImapConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("folder", &self.folder)
            .finish()
    }
}

/// Reads the newest message of one folder.
///
/// Each [`connect`](Mailbox::connect) opens a fresh TLS connection, logs in
/// and selects the folder; closing the session logs out.
#[derive(Clone)]
pub struct ImapMailbox {
    config: ImapConfig,
    tls: TlsConnector,
}

impl ImapMailbox {
    pub fn new(config: ImapConfig) -> Self {
        let roots = RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };
        let tls = ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth();

        Self {
            config,
            tls: TlsConnector::from(Arc::new(tls)),
        }
    }

    pub fn config(&self) -> &ImapConfig {
        &self.config
    }
}

impl fmt::Debug for ImapMailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImapMailbox")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Mailbox for ImapMailbox {
    async fn connect(&self) -> Result<Box<dyn MailboxSession>, MailboxError> {
        let ImapConfig { host, port, user, .. } = &self.config;

        let server_name = ServerName::try_from(host.clone())
            .map_err(|_| MailboxError::InvalidHost(host.clone()))?;
        let tcp = TcpStream::connect((host.as_str(), *port)).await?;
        let stream = self.tls.connect(server_name, tcp).await?;

        let client = async_imap::Client::new(stream);
        let mut session = client
            .login(user, &self.config.password)
            .await
            .map_err(|(e, _)| e)?;

        if let Err(e) = session.select(&self.config.folder).await {
            logout(&mut session).await;
            return Err(e.into());
        }

        debug!(%host, folder = %self.config.folder, "opened IMAP session");
        Ok(Box::new(ImapSession { session }))
    }
}

struct ImapSession {
    session: Session<TlsStream<TcpStream>>,
}

#[async_trait]
impl MailboxSession for ImapSession {
    async fn latest_message_body(&mut self) -> Result<String, MailboxError> {
        let ids = self.session.search("ALL").await?;
        let latest = ids.into_iter().max().ok_or(MailboxError::Empty)?;

        let fetched: Vec<_> = self
            .session
            .fetch(latest.to_string(), "RFC822")
            .await?
            .try_collect()
            .await?;

        let raw = fetched
            .iter()
            .find_map(|fetch| fetch.body())
            .ok_or(MailboxError::Empty)?;
        plain_text_body(raw).ok_or(MailboxError::NoPlainText)
    }

    async fn close(self: Box<Self>) {
        let mut this = self;
        logout(&mut this.session).await;
    }
}

async fn logout(session: &mut Session<TlsStream<TcpStream>>) {
    if let Err(e) = session.logout().await {
        warn!(error = %e, "IMAP logout failed");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::net::TcpListener;

    use super::*;
    use crate::devotional::{DEFAULT_MAILBOX_TIMEOUT, DevotionalText, read_latest};

    #[test]
    fn defaults_point_at_gmail_inbox() {
        let config = ImapConfig::new("me@example.com", "secret");
        assert_eq!(config.host, "imap.gmail.com");
        assert_eq!(config.port, 993);
        assert_eq!(config.folder, "INBOX");
    }

    #[test]
    fn debug_hides_password() {
        let config = ImapConfig::new("me@example.com", "hunter2").with_port(143);
        let shown = format!("{:?}", ImapMailbox::new(config));
        assert!(shown.contains("me@example.com"));
        assert!(!shown.contains("hunter2"));
    }

    #[tokio::test]
    async fn refused_connection_gives_empty_fields() {
        // Grab a free port, then close it
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = ImapConfig::new("me", "pw")
            .with_host("localhost")
            .with_port(port);
        let extraction = read_latest(&ImapMailbox::new(config), DEFAULT_MAILBOX_TIMEOUT).await;

        assert_eq!(extraction.text, DevotionalText::default());
        assert!(
            extraction
                .diagnostic
                .is_some_and(|d| d.contains("I/O error"))
        );
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        // Accepts the connection but never completes the handshake
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(60)).await;
            drop(socket);
        });

        let config = ImapConfig::new("me", "pw")
            .with_host("localhost")
            .with_port(port);
        let extraction = read_latest(&ImapMailbox::new(config), Duration::from_millis(200)).await;

        assert_eq!(extraction.text, DevotionalText::default());
        assert!(
            extraction
                .diagnostic
                .is_some_and(|d| d.contains("did not answer"))
        );
        server.abort();
    }

    #[tokio::test]
    async fn bad_host_name_is_reported() {
        let config = ImapConfig::new("me", "pw").with_host("not a host");
        let extraction = read_latest(&ImapMailbox::new(config), DEFAULT_MAILBOX_TIMEOUT).await;

        assert_eq!(
            extraction.diagnostic.as_deref(),
            Some("invalid IMAP host name: \"not a host\"")
        );
    }
}
