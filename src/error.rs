//! Crate-wide error type.
//!
//! Every fallible layer (store, fetcher, presentation shell) funnels into
//! [`PulseError`] so request handlers can propagate with `?` and map the
//! result to a plain-text error page in one place.

use thiserror::Error;

/// Errors surfaced by the scrape/store/render pipeline.
#[derive(Debug, Error)]
pub enum PulseError {
    /// SQLite-level failure in the record store.
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    /// Filesystem failure (store path creation or reset).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Network or decode failure talking to the search API.
    #[error("fetch error: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The search endpoint URL could not be built.
    #[error("invalid search url: {0}")]
    Url(#[from] url::ParseError),
}
