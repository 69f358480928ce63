// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod config;
pub mod dedupe;
pub mod export;
pub mod filter;
pub mod normalize;
pub mod posting;
pub mod rank;
pub mod sources;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::Aggregator;
pub use crate::config::{ConfigError, SearchConfig};
pub use crate::export::ReportSink;
pub use crate::posting::{Posting, Query, RawRecord, RunStats, Source, SourceStats};
pub use crate::sources::{FetchError, JobSource};
