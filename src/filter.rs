// src/filter.rs
//! Relevance predicates: locale, seniority, technical keywords, recency.
//! Criteria arrive from the configuration surface; the term lists are
//! compiled into matchers once so per-posting checks stay cheap.

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use std::collections::BTreeSet;

use crate::posting::Posting;

/// Explicit filter configuration. Every knob is externally supplied; the
/// only policy the filter owns is the fixed alias/exclusion tables below.
#[derive(Debug, Clone)]
pub struct FilterCriteria {
    pub allowed_locales: Vec<String>,
    pub seniority_terms: Vec<String>,
    pub technical_terms: Vec<String>,
    pub max_age: Duration,
    pub require_any_technical_term: bool,
}

/// Locale aliasing: a canonical region name and the strings that imply it.
/// German states and major cities stand in for "Germany" because boards
/// print whichever granularity they have.
const LOCALE_ALIASES: &[(&str, &[&str])] = &[
    (
        "germany",
        &[
            "deutschland", "de", "bundesweit",
            "baden-württemberg", "bayern", "berlin", "brandenburg", "bremen",
            "hamburg", "hessen", "mecklenburg-vorpommern", "niedersachsen",
            "nordrhein-westfalen", "rheinland-pfalz", "saarland", "sachsen",
            "sachsen-anhalt", "schleswig-holstein", "thüringen",
            "münchen", "munich", "frankfurt", "köln", "cologne", "stuttgart",
            "düsseldorf", "leipzig", "dresden", "hannover", "nürnberg",
            "nuremberg",
        ],
    ),
    (
        "remote",
        &["home office", "homeoffice", "remote-first", "anywhere"],
    ),
];

/// Titles carrying these mark roles above entry level. A posting with no
/// seniority evidence at all passes: absence of evidence is not evidence of
/// absence.
const EXCLUDED_SENIORITY: &[&str] = &[
    "senior", "lead ", "principal", "staff ", "head of", "manager",
    "architect", "director", "leitung",
];

/// Criteria with the technical-term list compiled into word-boundary
/// matchers.
pub struct Filter {
    criteria: FilterCriteria,
    technical: Vec<(String, Regex)>,
}

impl Filter {
    pub fn new(criteria: FilterCriteria) -> Self {
        let technical = compile_terms(&criteria.technical_terms);
        Self { criteria, technical }
    }

    /// Retain postings satisfying all criteria. Populates
    /// `keywords_matched` on survivors; no other mutation.
    pub fn apply(&self, postings: Vec<Posting>, now: DateTime<Utc>) -> Vec<Posting> {
        postings
            .into_iter()
            .filter_map(|p| self.evaluate(p, now))
            .collect()
    }

    fn evaluate(&self, mut p: Posting, now: DateTime<Utc>) -> Option<Posting> {
        if !matches_locale(&p.location, &self.criteria.allowed_locales) {
            return None;
        }

        let text = format!("{} {}", p.title, p.description).to_lowercase();
        if !self.seniority_ok(&text) {
            return None;
        }

        let matched: BTreeSet<String> = self
            .technical
            .iter()
            .filter(|(_, re)| re.is_match(&text))
            .map(|(term, _)| term.clone())
            .collect();
        if self.criteria.require_any_technical_term && matched.is_empty() {
            return None;
        }

        // Recency unknown ⇒ not penalized here; only the ranker cares.
        if let Some(posted) = p.posted_at {
            if now.signed_duration_since(posted) > self.criteria.max_age {
                return None;
            }
        }

        p.keywords_matched.extend(matched);
        Some(p)
    }

    fn seniority_ok(&self, text: &str) -> bool {
        if self
            .criteria
            .seniority_terms
            .iter()
            .any(|t| text.contains(&t.to_lowercase()))
        {
            return true;
        }
        !EXCLUDED_SENIORITY.iter().any(|t| text.contains(t))
    }
}

/// Empty location passes everything; otherwise substring/alias match against
/// the allowed locales.
fn matches_locale(location: &str, allowed: &[String]) -> bool {
    if location.is_empty() {
        return true;
    }
    let loc = location.to_lowercase();
    allowed.iter().any(|want| {
        let want = want.to_lowercase();
        if contains_term(&loc, &want) {
            return true;
        }
        LOCALE_ALIASES
            .iter()
            .find(|(canon, _)| *canon == want)
            .is_some_and(|(_, aliases)| aliases.iter().any(|a| contains_term(&loc, a)))
    })
}

/// Substring match, except very short aliases ("de") which must stand alone
/// as a word — plain substring would light up inside "Dresden".
fn contains_term(haystack: &str, term: &str) -> bool {
    if term.chars().count() > 3 {
        return haystack.contains(term);
    }
    haystack
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word == term)
}

fn compile_terms(terms: &[String]) -> Vec<(String, Regex)> {
    terms
        .iter()
        .filter_map(|t| {
            let canon = t.trim().to_lowercase();
            if canon.is_empty() {
                return None;
            }
            let re = Regex::new(&format!(r"\b{}\b", regex::escape(&canon)))
                .expect("term regex");
            Some((canon, re))
        })
        .collect()
}
