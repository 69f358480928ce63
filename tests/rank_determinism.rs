// tests/rank_determinism.rs
//! A fixed input pool must rank identically across runs, whatever the
//! parallel fetch interleaving looked like.

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;
use stellenradar::{Aggregator, FetchError, JobSource, Query, RawRecord, SearchConfig, Source};

const CONFIG: &str = r#"
[filter]
allowed_locales = ["Germany"]
seniority_terms = ["junior", "graduate"]
technical_terms = ["ai", "python", "machine learning"]
max_age_hours = 24

[rank.weights]
keywords = 1.0
seniority = 2.0
recency = 3.0

[sources]
per_source_timeout_ms = 1000

[queries]
keywords = ["Junior AI Engineer"]
"#;

struct Board {
    source: Source,
    records: Vec<RawRecord>,
    delay_ms: u64,
}

#[async_trait]
impl JobSource for Board {
    async fn fetch(&self, _query: &Query) -> Result<Vec<RawRecord>, FetchError> {
        // Stagger responses so fetch completion order differs from source
        // order; the collected pool must not care.
        tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        Ok(self.records.clone())
    }

    fn name(&self) -> &'static str {
        self.source.as_str()
    }

    fn source(&self) -> Source {
        self.source
    }
}

fn record(title: &str, company: &str, url: &str, hours_ago: Option<i64>) -> RawRecord {
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
    RawRecord {
        title: title.into(),
        company: company.into(),
        location: "Berlin".into(),
        url: url.into(),
        description: "python machine learning".into(),
        posted_at: hours_ago.map(|h| now - Duration::hours(h)),
        posted_at_hint: None,
    }
}

fn boards(slow_first: bool) -> Vec<Arc<dyn JobSource>> {
    let (a, b) = if slow_first { (80, 10) } else { (10, 80) };
    vec![
        Arc::new(Board {
            source: Source::LinkedIn,
            delay_ms: a,
            records: vec![
                record("Junior AI Engineer", "Acme", "https://l.com/1", Some(2)),
                record("Junior Python Dev", "Beta AG", "https://l.com/2", None),
            ],
        }),
        Arc::new(Board {
            source: Source::Indeed,
            delay_ms: b,
            records: vec![
                record("junior ai engineer", "Acme", "https://i.com/9", Some(4)),
                record("Graduate ML Engineer", "Gamma", "https://i.com/3", Some(1)),
            ],
        }),
    ]
}

#[tokio::test]
async fn repeated_runs_produce_identical_order() {
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();

    let config = SearchConfig::from_toml_str(CONFIG).unwrap();
    let (first, _) = Aggregator::new(boards(false), config.clone())
        .run_at(now)
        .await;
    let (second, _) = Aggregator::new(boards(true), config).run_at(now).await;

    assert!(!first.is_empty());
    assert_eq!(first, second);

    // The cross-source duplicate merged and corroboration is recorded.
    let acme = first
        .iter()
        .find(|p| p.company == "Acme")
        .expect("merged Acme posting");
    assert_eq!(acme.merged_from, vec![Source::LinkedIn, Source::Indeed]);
}
