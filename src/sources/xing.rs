// src/sources/xing.rs
//! XING job search: HTML result items, German-language relative dates
//! ("vor 3 Tagen") in the date span.

use async_trait::async_trait;
use scraper::Html;

use crate::posting::{Query, RawRecord, Source};
use crate::sources::{selector, FetchError, JobSource};

const BASE_URL: &str = "https://www.xing.com/jobs/search";

pub struct XingSource {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { client: reqwest::Client },
}

impl XingSource {
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
        let item_sel = selector("article.job-item");
        let title_sel = selector("h2.job-item__title");
        let company_sel = selector("p.job-item__company");
        let location_sel = selector("span.job-item__location");
        let link_sel = selector("a.job-item__link");
        let date_sel = selector("span.job-item__date");

        let mut out = Vec::new();
        for item in doc.select(&item_sel) {
            let text_of = |sel| {
                item.select(sel)
                    .next()
                    .map(|e| e.text().collect::<String>())
                    .unwrap_or_default()
            };
            let url = item
                .select(&link_sel)
                .next()
                .and_then(|e| e.value().attr("href"))
                .unwrap_or_default()
                .to_string();
            let hint = text_of(&date_sel);

            out.push(RawRecord {
                title: text_of(&title_sel),
                company: text_of(&company_sel),
                location: text_of(&location_sel),
                url,
                description: String::new(),
                posted_at: None,
                posted_at_hint: (!hint.trim().is_empty()).then(|| hint),
            });
        }
        out
    }
}

#[async_trait]
impl JobSource for XingSource {
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
        "XING"
    }

    fn source(&self) -> Source {
        Source::Xing
    }
}
