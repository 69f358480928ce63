// src/posting.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Originating adapter of a posting.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Source {
    LinkedIn,
    Indeed,
    Xing,
    CareerPage,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::LinkedIn => "LinkedIn",
            Source::Indeed => "Indeed",
            Source::Xing => "XING",
            Source::CareerPage => "CareerPage",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical job record after source-specific parsing.
///
/// Created by the normalizer from one raw record; mutated only by the
/// deduplicator (merge) and the filter/ranker (annotation fields); immutable
/// once handed to a report sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub title: String,
    pub company: String,
    /// May be empty when the source does not expose a location.
    pub location: String,
    /// Canonicalized; unique per source but not globally unique.
    pub url: String,
    pub source: Source,
    #[serde(default)]
    pub posted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: String,
    /// Technical terms found by the filter.
    #[serde(default)]
    pub keywords_matched: BTreeSet<String>,
    /// Computed by the ranker; absent before ranking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Every source that contributed to this posting after dedup, in
    /// first-encounter order. Always holds at least the originating source.
    pub merged_from: Vec<Source>,
}

/// What an adapter hands to the normalizer. Loose on purpose: boards disagree
/// about which fields exist and how dates are written.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    pub description: String,
    /// Machine-readable date, when the source exposes one.
    pub posted_at: Option<DateTime<Utc>>,
    /// Free-form date text ("vor 3 Tagen", "2024-01-15") for the normalizer
    /// to interpret.
    pub posted_at_hint: Option<String>,
}

/// One adapter invocation: a keyword searched within a locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub keyword: String,
    pub locale: String,
}

/// Per-source counters, accumulated across the run and never reset mid-run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceStats {
    pub raw: usize,
    pub normalized: usize,
    pub malformed: usize,
    pub error: Option<String>,
}

/// Run-level accounting owned by the aggregator.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    pub per_source: BTreeMap<Source, SourceStats>,
    pub pool: usize,
    pub after_dedupe: usize,
    pub after_filter: usize,
}

impl RunStats {
    pub fn source_mut(&mut self, source: Source) -> &mut SourceStats {
        self.per_source.entry(source).or_default()
    }

    pub fn source(&self, source: Source) -> Option<&SourceStats> {
        self.per_source.get(&source)
    }
}
