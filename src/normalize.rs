// src/normalize.rs
//! Raw record → canonical `Posting`: whitespace/HTML cleanup, URL
//! canonicalization, and free-form posted-date parsing. Pure transforms;
//! everything time-dependent resolves against a caller-supplied `now`.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;
use std::collections::BTreeSet;
use url::Url;

use crate::posting::{Posting, RawRecord, Source};

/// A required field could not be extracted. Counted by the aggregator,
/// never fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed record from {origin}: missing {field}")]
pub struct MalformedRecord {
    pub origin: Source,
    pub field: &'static str,
}

/// Normalize text: decode HTML entities, strip tags, fold typographic quotes
/// to ASCII, collapse whitespace.
pub fn clean_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    out = re_tags.replace_all(&out, " ").to_string();

    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("ws regex"));
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// Query parameters that only track the click, never identify the job.
const TRACKING_PARAMS: &[&str] = &[
    "utm", "utm_source", "utm_medium", "utm_campaign", "utm_term", "utm_content",
    "gclid", "fbclid", "ref", "refid", "trk", "trackingid", "mkt_tok",
];

/// Canonicalize a posting URL so later identity comparisons are stable:
/// drop the fragment and tracking parameters, trim a trailing slash. The
/// host is lowercased by the parser. Strings that do not parse as URLs are
/// kept as-is (trimmed) rather than discarded.
pub fn normalize_url(raw: &str) -> String {
    let raw = raw.trim();
    let Ok(mut url) = Url::parse(raw) else {
        return raw.trim_end_matches('/').to_string();
    };

    url.set_fragment(None);
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| {
            let k = k.to_ascii_lowercase();
            !TRACKING_PARAMS.contains(&k.as_str())
        })
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        let mut qs = url::form_urlencoded::Serializer::new(String::new());
        qs.extend_pairs(kept.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        url.set_query(Some(&qs.finish()));
    }

    url.to_string().trim_end_matches('/').to_string()
}

/// Parse a free-form posted-date string the way boards print them: absolute
/// ISO/German/slash forms first, then relative English and German phrases.
/// Relative phrases resolve against `now`.
pub fn parse_date_hint(hint: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let h = clean_text(hint).to_lowercase();
    if h.is_empty() {
        return None;
    }

    let head: String = h.chars().take(10).collect();
    for fmt in ["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(&head, fmt) {
            return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }

    if ["today", "heute", "just posted", "gerade eben"]
        .iter()
        .any(|t| h.contains(t))
    {
        return Some(now);
    }
    if h.contains("yesterday") || h.contains("gestern") {
        return Some(now - Duration::days(1));
    }

    static RE_REL: OnceCell<Regex> = OnceCell::new();
    let re = RE_REL.get_or_init(|| {
        Regex::new(r"(?:vor\s+)?(\d+)\s*(minute|stunde|hour|tag|day|woche|week|monat|month)")
            .expect("relative date regex")
    });
    if let Some(caps) = re.captures(&h) {
        let n: i64 = caps[1].parse().ok()?;
        let ago = match &caps[2] {
            "minute" => Duration::minutes(n),
            "stunde" | "hour" => Duration::hours(n),
            "tag" | "day" => Duration::days(n),
            "woche" | "week" => Duration::weeks(n),
            "monat" | "month" => Duration::days(n * 30),
            _ => return None,
        };
        return Some(now - ago);
    }

    None
}

/// Map one raw record into the canonical schema. Fails with
/// [`MalformedRecord`] when `title`, `company` or `url` cannot be extracted.
pub fn normalize(
    raw: &RawRecord,
    source: Source,
    now: DateTime<Utc>,
) -> Result<Posting, MalformedRecord> {
    let title = clean_text(&raw.title);
    if title.is_empty() {
        return Err(MalformedRecord { origin: source, field: "title" });
    }
    let company = clean_text(&raw.company);
    if company.is_empty() {
        return Err(MalformedRecord { origin: source, field: "company" });
    }
    let url = normalize_url(&raw.url);
    if url.is_empty() {
        return Err(MalformedRecord { origin: source, field: "url" });
    }

    let posted_at = raw.posted_at.or_else(|| {
        raw.posted_at_hint
            .as_deref()
            .and_then(|h| parse_date_hint(h, now))
    });

    Ok(Posting {
        title,
        company,
        location: clean_text(&raw.location),
        url,
        source,
        posted_at,
        description: clean_text(&raw.description),
        keywords_matched: BTreeSet::new(),
        score: None,
        merged_from: vec![source],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn clean_text_strips_tags_and_entities() {
        let s = "  <b>Junior&nbsp;AI</b>   Engineer (m/w/d)!  ";
        assert_eq!(clean_text(s), "Junior AI Engineer (m/w/d)!");
    }

    #[test]
    fn url_normalization_strips_tracking_and_fragment() {
        assert_eq!(
            normalize_url("https://Example.com/jobs/123?utm_source=feed&id=9#apply"),
            "https://example.com/jobs/123?id=9"
        );
        assert_eq!(
            normalize_url("https://example.com/jobs/123/?utm=x"),
            "https://example.com/jobs/123"
        );
    }

    #[test]
    fn url_without_scheme_is_kept_verbatim() {
        assert_eq!(normalize_url("  careers/123/ "), "careers/123");
    }

    #[test]
    fn date_hints_absolute_and_relative() {
        let now = at(2024, 6, 15, 12);
        assert_eq!(parse_date_hint("2024-06-01", now), Some(at(2024, 6, 1, 0)));
        assert_eq!(parse_date_hint("01.06.2024", now), Some(at(2024, 6, 1, 0)));
        assert_eq!(parse_date_hint("heute", now), Some(now));
        assert_eq!(
            parse_date_hint("vor 3 Tagen", now),
            Some(now - Duration::days(3))
        );
        assert_eq!(
            parse_date_hint("2 hours ago", now),
            Some(now - Duration::hours(2))
        );
        assert_eq!(parse_date_hint("irgendwann", now), None);
    }

    #[test]
    fn normalize_requires_title_company_url() {
        let now = at(2024, 6, 15, 12);
        let raw = RawRecord {
            title: "<i></i>".into(),
            company: "Acme".into(),
            url: "https://a.com/1".into(),
            ..Default::default()
        };
        let err = normalize(&raw, Source::LinkedIn, now).unwrap_err();
        assert_eq!(err.field, "title");

        let ok = normalize(
            &RawRecord {
                title: "Junior  AI Engineer".into(),
                company: " Acme ".into(),
                url: "https://a.com/1?utm=x".into(),
                posted_at_hint: Some("gestern".into()),
                ..Default::default()
            },
            Source::Indeed,
            now,
        )
        .unwrap();
        assert_eq!(ok.title, "Junior AI Engineer");
        assert_eq!(ok.url, "https://a.com/1");
        assert_eq!(ok.posted_at, Some(now - Duration::days(1)));
        assert_eq!(ok.merged_from, vec![Source::Indeed]);
    }
}
