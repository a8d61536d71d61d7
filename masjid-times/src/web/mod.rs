//! Web layer for the prayer-times API.
//!
//! Thin JSON endpoints over the fetcher, calendar views and aggregator.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
