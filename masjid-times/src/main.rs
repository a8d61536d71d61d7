use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use masjid_times::aggregate::Aggregator;
use masjid_times::cache::{CacheConfig, CacheStore, DiskBackend};
use masjid_times::config::Settings;
use masjid_times::devotional::{DirMailbox, ImapMailbox, Mailbox, NoMailbox};
use masjid_times::domain::SystemClock;
use masjid_times::source::SourceFetcher;
use masjid_times::web::{AppState, create_router};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();

    let settings = Settings::from_env().expect("Invalid configuration");

    // Cache: on disk when a directory is configured, otherwise in memory
    let cache = match &settings.cache_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "using on-disk cache");
            CacheStore::new(Arc::new(DiskBackend::new(dir)), settings.cache_ttl)
        }
        None => CacheStore::in_memory(&CacheConfig {
            ttl: settings.cache_ttl,
            ..CacheConfig::default()
        }),
    };

    let fetcher =
        SourceFetcher::new(settings.source.clone(), cache).expect("Failed to create HTTP client");

    // Mailbox: IMAP account first, then a directory of stored messages
    let mailbox: Arc<dyn Mailbox> = match (&settings.imap, &settings.mailbox_dir) {
        (Some(imap), _) => {
            info!(
                host = %imap.host,
                user = %imap.user,
                folder = %imap.folder,
                "reading devotional messages over IMAP"
            );
            Arc::new(ImapMailbox::new(imap.clone()))
        }
        (None, Some(dir)) => {
            info!(dir = %dir.display(), "reading devotional messages from directory");
            Arc::new(DirMailbox::new(dir))
        }
        (None, None) => {
            warn!("no IMAP account or mailbox directory set, devotional text will be empty");
            Arc::new(NoMailbox)
        }
    };

    let aggregator = Aggregator::new(Arc::new(fetcher), mailbox, Arc::new(SystemClock))
        .with_mailbox_timeout(settings.mailbox_timeout);
    let app = create_router(AppState::new(aggregator));

    let addr = settings.bind_addr;
    info!(%addr, source = %settings.source.base_url, "masjid times listening");
    info!("  GET  /health");
    info!("  GET  /api/v1/{{place}}/");
    info!("  GET  /api/v1/{{place}}/prayer-times");
    info!("  GET  /api/v1/{{place}}/calendar[/{{month}}]");
    info!("  GET  /api/v1/{{place}}/trmnl");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app).await.expect("Server error");
}
