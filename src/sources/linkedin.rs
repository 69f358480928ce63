// src/sources/linkedin.rs
//! LinkedIn public job-search results: HTML cards, machine-readable dates in
//! the `<time datetime>` attribute when present.

use async_trait::async_trait;
use scraper::Html;

use crate::posting::{Query, RawRecord, Source};
use crate::sources::{selector, FetchError, JobSource};

const BASE_URL: &str = "https://www.linkedin.com/jobs/search/";

pub struct LinkedInSource {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { client: reqwest::Client },
}

impl LinkedInSource {
    /// Parse canned HTML instead of fetching; for tests.
    pub fn from_fixture(html: &str) -> Self {
        Self {
            mode: Mode::Fixture(html.to_string()),
        }
    }

    pub fn new(client: reqwest::Client) -> Self {
        Self {
            mode: Mode::Http { client },
        }
    }

    fn parse_listing(html: &str) -> Vec<RawRecord> {
        let doc = Html::parse_document(html);
        let card_sel = selector("div.base-card");
        let title_sel = selector("h3.base-search-card__title");
        let company_sel = selector("h4.base-search-card__subtitle");
        let location_sel = selector("span.job-search-card__location");
        let link_sel = selector("a.base-card__full-link");
        let time_sel = selector("time");

        let mut out = Vec::new();
        for card in doc.select(&card_sel) {
            let text_of = |sel| {
                card.select(sel)
                    .next()
                    .map(|e| e.text().collect::<String>())
                    .unwrap_or_default()
            };
            let url = card
                .select(&link_sel)
                .next()
                .and_then(|e| e.value().attr("href"))
                .unwrap_or_default()
                .to_string();
            // Prefer the machine date; fall back to the human text
            // ("3 days ago") and let the normalizer sort it out.
            let posted_at_hint = card.select(&time_sel).next().map(|e| {
                e.value()
                    .attr("datetime")
                    .map(str::to_string)
                    .unwrap_or_else(|| e.text().collect::<String>())
            });

            out.push(RawRecord {
                title: text_of(&title_sel),
                company: text_of(&company_sel),
                location: text_of(&location_sel),
                url,
                description: String::new(),
                posted_at: None,
                posted_at_hint,
            });
        }
        out
    }
}

#[async_trait]
impl JobSource for LinkedInSource {
    async fn fetch(&self, query: &Query) -> Result<Vec<RawRecord>, FetchError> {
        match &self.mode {
            Mode::Fixture(html) => Ok(Self::parse_listing(html)),
            Mode::Http { client } => {
                let body = client
                    .get(BASE_URL)
                    .query(&[
                        ("keywords", query.keyword.as_str()),
                        ("location", query.locale.as_str()),
                        ("sort", "date"),
                    ])
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await?;
                Ok(Self::parse_listing(&body))
            }
        }
    }

    fn name(&self) -> &'static str {
        "LinkedIn"
    }

    fn source(&self) -> Source {
        Source::LinkedIn
    }
}
