// src/aggregate.rs
//! Orchestration: fan queries out to the sources, fold every per-source
//! outcome into the run stats, then run the sequential pipeline
//! (normalize → dedupe → filter → rank) over the combined pool.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::dedupe;
use crate::filter::Filter;
use crate::normalize;
use crate::posting::{Posting, RawRecord, RunStats, Source};
use crate::rank;
use crate::sources::{FetchError, JobSource};

pub struct Aggregator {
    sources: Vec<Arc<dyn JobSource>>,
    config: SearchConfig,
}

impl Aggregator {
    pub fn new(sources: Vec<Arc<dyn JobSource>>, config: SearchConfig) -> Self {
        Self { sources, config }
    }

    /// Run the whole pipeline once. A failing or hanging source never aborts
    /// the run; its stats record the failure instead. An empty result is
    /// valid output.
    pub async fn run(&self) -> (Vec<Posting>, RunStats) {
        self.run_at(Utc::now()).await
    }

    /// Clock-injected variant; the single `now` makes filtering and ranking
    /// reproducible across the run.
    pub async fn run_at(&self, now: DateTime<Utc>) -> (Vec<Posting>, RunStats) {
        let outcomes = self.fetch_all().await;

        let mut stats = RunStats::default();
        let mut pool: Vec<Posting> = Vec::new();
        for (source, raw, error) in outcomes {
            let entry = stats.source_mut(source);
            entry.raw += raw.len();
            if let Some(e) = error {
                entry.error = Some(e.to_string());
            }
            for record in raw {
                match normalize::normalize(&record, source, now) {
                    Ok(posting) => {
                        entry.normalized += 1;
                        pool.push(posting);
                    }
                    Err(e) => {
                        entry.malformed += 1;
                        debug!(error = %e, "skipping malformed record");
                    }
                }
            }
        }
        stats.pool = pool.len();

        let deduped = dedupe::dedupe(pool);
        stats.after_dedupe = deduped.len();

        let filter = Filter::new(self.config.criteria());
        let filtered = filter.apply(deduped, now);
        stats.after_filter = filtered.len();

        let ranked = rank::rank(
            filtered,
            &self.config.rank_weights(),
            self.config.max_age(),
            now,
        );

        info!(
            pool = stats.pool,
            deduped = stats.after_dedupe,
            kept = ranked.len(),
            "aggregation run complete"
        );
        (ranked, stats)
    }

    /// Fan out concurrently, one task per source; each adapter call is
    /// bounded by the per-source timeout. `join_all` keeps source order, so
    /// the collected pool is deterministic for a fixed adapter set.
    async fn fetch_all(&self) -> Vec<(Source, Vec<RawRecord>, Option<FetchError>)> {
        let queries = self.config.queries();
        let timeout = Duration::from_millis(self.config.sources.per_source_timeout_ms);

        let fetches = self.sources.iter().map(|source| {
            let source = Arc::clone(source);
            let queries = queries.clone();
            async move {
                let mut raw = Vec::new();
                let mut error = None;
                for query in &queries {
                    match tokio::time::timeout(timeout, source.fetch(query)).await {
                        Ok(Ok(mut records)) => raw.append(&mut records),
                        Ok(Err(e)) => {
                            warn!(source = source.name(), error = %e, "source fetch failed");
                            error = Some(e);
                            break;
                        }
                        Err(_) => {
                            warn!(source = source.name(), "source timed out");
                            error = Some(FetchError::Timeout);
                            break;
                        }
                    }
                }
                (source.source(), raw, error)
            }
        });

        join_all(fetches).await
    }
}
