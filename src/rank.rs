// src/rank.rs
//! Deterministic relevance ordering. The score is a weighted sum of keyword
//! matches, a seniority bonus and a recency bonus; the weights are
//! configuration, not algorithm.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::posting::Posting;

/// Scoring weights. Tunable without touching the algorithm.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RankWeights {
    pub keywords: f64,
    pub seniority: f64,
    pub recency: f64,
}

impl Default for RankWeights {
    fn default() -> Self {
        Self {
            keywords: 1.0,
            seniority: 2.0,
            recency: 3.0,
        }
    }
}

/// Markers of a true entry-level role; earn the full seniority bonus.
const ENTRY_TERMS: &[&str] = &[
    "junior", "graduate", "entry level", "entry-level", "trainee",
    "werkstudent", "einstieg", "absolvent", "berufseinsteiger",
];

/// Generic early-career wording; earns half the bonus.
const GENERIC_TERMS: &[&str] = &["early career", "associate", "starter", "anfänger"];

fn seniority_bonus(p: &Posting) -> f64 {
    let text = format!("{} {}", p.title, p.description).to_lowercase();
    if ENTRY_TERMS.iter().any(|t| text.contains(t)) {
        1.0
    } else if GENERIC_TERMS.iter().any(|t| text.contains(t)) {
        0.5
    } else {
        0.0
    }
}

/// Linear decay from 1.0 at `posted_at == now` to 0.0 at `posted_at ==
/// now - max_age`. Missing `posted_at` earns 0.0 — unknown recency is
/// neutral, not penalized twice.
fn recency_bonus(p: &Posting, now: DateTime<Utc>, max_age: Duration) -> f64 {
    let Some(posted) = p.posted_at else {
        return 0.0;
    };
    let age = now.signed_duration_since(posted);
    if age <= Duration::zero() {
        return 1.0;
    }
    if age >= max_age {
        return 0.0;
    }
    1.0 - age.num_seconds() as f64 / max_age.num_seconds() as f64
}

/// Total order, descending score. Ties break on cross-source corroboration
/// (more `merged_from` entries first), then lexically on `title`, so a
/// fixed input pool always ranks identically.
pub fn rank(
    mut postings: Vec<Posting>,
    weights: &RankWeights,
    max_age: Duration,
    now: DateTime<Utc>,
) -> Vec<Posting> {
    for p in &mut postings {
        let score = weights.keywords * p.keywords_matched.len() as f64
            + weights.seniority * seniority_bonus(p)
            + weights.recency * recency_bonus(p, now, max_age);
        p.score = Some(score);
    }

    postings.sort_by(|a, b| {
        b.score
            .unwrap_or(0.0)
            .total_cmp(&a.score.unwrap_or(0.0))
            .then_with(|| b.merged_from.len().cmp(&a.merged_from.len()))
            .then_with(|| a.title.cmp(&b.title))
    });
    postings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posting::Source;
    use chrono::TimeZone;
    use std::collections::BTreeSet;

    fn posting(title: &str, keywords: &[&str], sources: &[Source]) -> Posting {
        Posting {
            title: title.into(),
            company: "Acme".into(),
            location: "Berlin".into(),
            url: format!("https://a.com/{title}"),
            source: sources[0],
            posted_at: None,
            description: String::new(),
            keywords_matched: keywords.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            score: None,
            merged_from: sources.to_vec(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn keyword_count_drives_score() {
        let out = rank(
            vec![
                posting("AI Engineer", &["ai"], &[Source::LinkedIn]),
                posting("ML Engineer", &["ai", "python"], &[Source::LinkedIn]),
            ],
            &RankWeights::default(),
            Duration::hours(24),
            now(),
        );
        assert_eq!(out[0].title, "ML Engineer");
    }

    #[test]
    fn entry_level_beats_generic_beats_none() {
        let w = RankWeights { keywords: 0.0, seniority: 1.0, recency: 0.0 };
        let out = rank(
            vec![
                posting("Software Engineer", &[], &[Source::LinkedIn]),
                posting("Associate Engineer", &[], &[Source::LinkedIn]),
                posting("Junior Engineer", &[], &[Source::LinkedIn]),
            ],
            &w,
            Duration::hours(24),
            now(),
        );
        assert_eq!(out[0].title, "Junior Engineer");
        assert_eq!(out[1].title, "Associate Engineer");
        assert_eq!(out[2].title, "Software Engineer");
    }

    #[test]
    fn recency_decays_linearly_and_missing_is_neutral() {
        let max_age = Duration::hours(24);
        let mut fresh = posting("A", &[], &[Source::LinkedIn]);
        fresh.posted_at = Some(now());
        let mut half = posting("B", &[], &[Source::LinkedIn]);
        half.posted_at = Some(now() - Duration::hours(12));
        let unknown = posting("C", &[], &[Source::LinkedIn]);

        let w = RankWeights { keywords: 0.0, seniority: 0.0, recency: 1.0 };
        let out = rank(vec![unknown, half, fresh], &w, max_age, now());
        assert_eq!(out[0].title, "A");
        assert!((out[0].score.unwrap() - 1.0).abs() < 1e-9);
        assert!((out[1].score.unwrap() - 0.5).abs() < 1e-9);
        assert_eq!(out[2].score.unwrap(), 0.0);
    }

    #[test]
    fn ties_break_on_corroboration_then_title() {
        let w = RankWeights { keywords: 0.0, seniority: 0.0, recency: 0.0 };
        let out = rank(
            vec![
                posting("Zeta role", &[], &[Source::LinkedIn]),
                posting("Alpha role", &[], &[Source::LinkedIn]),
                posting("Mid role", &[], &[Source::LinkedIn, Source::Indeed]),
            ],
            &w,
            Duration::hours(24),
            now(),
        );
        assert_eq!(out[0].title, "Mid role");
        assert_eq!(out[1].title, "Alpha role");
        assert_eq!(out[2].title, "Zeta role");
    }

    #[test]
    fn repeated_runs_are_identical() {
        let pool = vec![
            posting("AI Engineer", &["ai"], &[Source::LinkedIn]),
            posting("Junior Dev", &["python"], &[Source::Xing]),
            posting("Data Scientist", &["ai", "python"], &[Source::Indeed]),
        ];
        let a = rank(pool.clone(), &RankWeights::default(), Duration::hours(24), now());
        let b = rank(pool, &RankWeights::default(), Duration::hours(24), now());
        assert_eq!(a, b);
    }
}
