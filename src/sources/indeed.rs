// src/sources/indeed.rs
//! Indeed RSS feed. Item titles come as "Role - Company - Location" and
//! pubDate is RFC 2822.

use async_trait::async_trait;
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use crate::posting::{Query, RawRecord, Source};
use crate::sources::{FetchError, JobSource};

const BASE_URL: &str = "https://de.indeed.com/rss";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

fn parse_rfc2822(ts: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
}

pub struct IndeedSource {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { client: reqwest::Client },
}

impl IndeedSource {
    /// Parse canned XML instead of fetching; for tests.
    pub fn from_fixture(xml: &str) -> Self {
        Self {
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    pub fn new(client: reqwest::Client) -> Self {
        Self {
            mode: Mode::Http { client },
        }
    }

    fn parse_feed(xml: &str) -> Result<Vec<RawRecord>, FetchError> {
        let xml = scrub_html_entities_for_xml(xml);
        let rss: Rss = from_str(&xml).map_err(|e| FetchError::Parse(e.to_string()))?;

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let raw_title = it.title.unwrap_or_default();
            let mut parts = raw_title.splitn(3, " - ").map(str::trim);
            let title = parts.next().unwrap_or_default().to_string();
            let company = parts.next().unwrap_or_default().to_string();
            let location = parts.next().unwrap_or_default().to_string();

            out.push(RawRecord {
                title,
                company,
                location,
                url: it.link.unwrap_or_default(),
                description: it.description.unwrap_or_default(),
                posted_at: it.pub_date.as_deref().and_then(parse_rfc2822),
                posted_at_hint: None,
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl JobSource for IndeedSource {
    async fn fetch(&self, query: &Query) -> Result<Vec<RawRecord>, FetchError> {
        match &self.mode {
            Mode::Fixture(xml) => Self::parse_feed(xml),
            Mode::Http { client } => {
                let body = client
                    .get(BASE_URL)
                    .query(&[
                        ("q", query.keyword.as_str()),
                        ("l", query.locale.as_str()),
                        ("sort", "date"),
                    ])
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await?;
                Self::parse_feed(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "Indeed"
    }

    fn source(&self) -> Source {
        Source::Indeed
    }
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
