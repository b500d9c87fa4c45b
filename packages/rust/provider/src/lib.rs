//! Client for the DataForSEO-compatible keyword provider.
//!
//! This crate provides:
//! - [`ProviderClient`] — authenticated HTTP client with a bounded [`RetryPolicy`]
//! - Keyword suggestions and related keywords (the expansion endpoints)
//! - [`ProviderClient::fetch_metrics`] — metrics for literal keyword strings
//! - [`ProviderClient::fetch_secondary_signal`] — AI search-volume estimates
//! - [`RawKeyword`] — the one normalized record every response shape is adapted into

mod client;
mod expansion;
mod metrics;
mod raw;
mod retry;
mod signal;
pub mod wire;

pub use client::{Market, ProviderClient};
pub use metrics::METRICS_BATCH_SIZE;
pub use raw::{MAX_SEARCH_VOLUME, MIN_SEARCH_VOLUME, RawKeyword};
pub use retry::RetryPolicy;
pub use signal::SIGNAL_BATCH_SIZE;
