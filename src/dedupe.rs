// src/dedupe.rs
//! Cross-source duplicate merge. There is no global primary key for a job:
//! the same role is URL-distinct across boards and titles get mangled per
//! source, so identity is an explicit similarity key plus deterministic
//! tie-breaks, not string equality.

use crate::posting::Posting;

/// Derived identity hint: normalized company plus lowercased title with
/// punctuation stripped. Equal keys mark merge candidates regardless of
/// `url` equality.
pub fn similarity_key(p: &Posting) -> (String, String) {
    (fold(&p.company), fold(&p.title))
}

/// Lowercase, replace every non-alphanumeric run with a single space.
fn fold(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Same-title-different-city roles must not merge: candidates additionally
/// need matching locations, or an empty location on at least one side.
fn location_compatible(a: &Posting, b: &Posting) -> bool {
    a.location.is_empty() || b.location.is_empty() || fold(&a.location) == fold(&b.location)
}

/// Fold `other` into `into`. Field-by-field, the more complete value wins:
/// non-empty beats empty, and the more recent `posted_at` beats the older
/// one when both are present (career pages often show only a repost date).
/// When both sides are fully populated the first-encountered value stays.
fn absorb(into: &mut Posting, other: Posting) {
    if into.location.is_empty() {
        into.location = other.location;
    }
    if into.description.is_empty() {
        into.description = other.description;
    }
    into.posted_at = match (into.posted_at, other.posted_at) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    };
    into.keywords_matched.extend(other.keywords_matched);
    for source in other.merged_from {
        if !into.merged_from.contains(&source) {
            into.merged_from.push(source);
        }
    }
}

/// Merge postings that describe the same real-world job. Single global pass:
/// stable-sort the pool by similarity key, scan each equal-key group, and
/// fold location-compatible candidates into the earliest bucket. Output
/// keeps first-encounter order, so the stage is deterministic for a fixed
/// adapter order and idempotent on its own output.
pub fn dedupe(postings: Vec<Posting>) -> Vec<Posting> {
    let mut items: Vec<(String, String, usize, Posting)> = postings
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            let (company, title) = similarity_key(&p);
            (company, title, i, p)
        })
        .collect();
    items.sort_by(|a, b| (&a.0, &a.1, a.2).cmp(&(&b.0, &b.1, b.2)));

    // Buckets of the current key group live at merged[group_start..].
    let mut merged: Vec<(usize, Posting)> = Vec::with_capacity(items.len());
    let mut group_start = 0;
    let mut last_key: Option<(String, String)> = None;

    for (company, title, index, posting) in items {
        let key = (company, title);
        if last_key.as_ref() != Some(&key) {
            group_start = merged.len();
            last_key = Some(key);
            merged.push((index, posting));
            continue;
        }

        let slot = merged[group_start..]
            .iter()
            .position(|(_, bucket)| location_compatible(bucket, &posting))
            .map(|offset| group_start + offset);
        match slot {
            Some(i) => absorb(&mut merged[i].1, posting),
            None => merged.push((index, posting)),
        }
    }

    merged.sort_by_key(|(index, _)| *index);
    merged.into_iter().map(|(_, p)| p).collect()
}
