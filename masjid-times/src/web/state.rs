//! Application state for the web layer.

use std::sync::Arc;

use crate::aggregate::Aggregator;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Fetcher, mailbox and clock behind every endpoint
    pub aggregator: Arc<Aggregator>,
}

impl AppState {
    pub fn new(aggregator: Aggregator) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
        }
    }
}
