// src/sources/mod.rs
pub mod careers;
pub mod indeed;
pub mod linkedin;
pub mod xing;

use async_trait::async_trait;

use crate::posting::{Query, RawRecord, Source};

/// Per-source fetch failure. The aggregator records it into the run stats
/// and moves on; one source never aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("timed out")]
    Timeout,
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("parse: {0}")]
    Parse(String),
}

/// Fetch capability of one job source. HTTP, HTML and authentication stay
/// behind this seam; the pipeline only ever sees raw records or a tagged
/// failure.
#[async_trait]
pub trait JobSource: Send + Sync {
    async fn fetch(&self, query: &Query) -> Result<Vec<RawRecord>, FetchError>;
    fn name(&self) -> &'static str;
    fn source(&self) -> Source;
}

/// Fixed CSS selectors are part of the program text; a typo is a bug, not a
/// runtime condition.
pub(crate) fn selector(css: &str) -> scraper::Selector {
    scraper::Selector::parse(css).expect("css selector")
}
