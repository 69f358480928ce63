// src/sources/careers.rs
//! Generic company career-page harvester: collect anchors whose text smells
//! like a vacancy. Deliberately coarse — the filter stage applies the real
//! criteria; this adapter only has to not miss openings.

use async_trait::async_trait;
use scraper::Html;
use url::Url;

use crate::posting::{Query, RawRecord, Source};
use crate::sources::{selector, FetchError, JobSource};

const VACANCY_HINTS: &[&str] = &[
    "job", "position", "vacancy", "opening", "stelle",
    "engineer", "developer", "scientist", "entwickler",
];

pub struct CareersSource {
    company: String,
    url: String,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { client: reqwest::Client },
}

impl CareersSource {
    /// Parse canned HTML instead of fetching; for tests.
    pub fn from_fixture(company: &str, url: &str, html: &str) -> Self {
        Self {
            company: company.to_string(),
            url: url.to_string(),
            mode: Mode::Fixture(html.to_string()),
        }
    }

    pub fn new(client: reqwest::Client, company: String, url: String) -> Self {
        Self {
            company,
            url,
            mode: Mode::Http { client },
        }
    }

    fn harvest(&self, html: &str) -> Vec<RawRecord> {
        let doc = Html::parse_document(html);
        let link_sel = selector("a[href]");
        let base = Url::parse(&self.url).ok();

        let mut out = Vec::new();
        for anchor in doc.select(&link_sel) {
            let text = anchor.text().collect::<String>();
            let text_lower = text.to_lowercase();
            if !VACANCY_HINTS.iter().any(|h| text_lower.contains(h)) {
                continue;
            }
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let url = match &base {
                Some(b) => b
                    .join(href)
                    .map(|u| u.to_string())
                    .unwrap_or_else(|_| href.to_string()),
                None => href.to_string(),
            };

            out.push(RawRecord {
                title: text.trim().chars().take(120).collect(),
                company: self.company.clone(),
                location: String::new(),
                url,
                description: String::new(),
                posted_at: None,
                posted_at_hint: None,
            });
        }
        out
    }
}

#[async_trait]
impl JobSource for CareersSource {
    async fn fetch(&self, _query: &Query) -> Result<Vec<RawRecord>, FetchError> {
        match &self.mode {
            Mode::Fixture(html) => Ok(self.harvest(html)),
            Mode::Http { client } => {
                let body = client
                    .get(&self.url)
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await?;
                Ok(self.harvest(&body))
            }
        }
    }

    fn name(&self) -> &'static str {
        "CareerPage"
    }

    fn source(&self) -> Source {
        Source::CareerPage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
    <html><body>
      <nav><a href="/about">About us</a></nav>
      <main>
        <a href="/careers/42">Junior AI Engineer position</a>
        <a href="https://other.example/opening/7">Working Student opening</a>
        <a href="/imprint">Imprint</a>
      </main>
    </body></html>"#;

    #[tokio::test]
    async fn harvests_vacancy_links_and_absolutizes() {
        let source =
            CareersSource::from_fixture("Acme", "https://acme.example/careers", FIXTURE);
        let query = Query {
            keyword: String::new(),
            locale: String::new(),
        };
        let records = source.fetch(&query).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].url, "https://acme.example/careers/42");
        assert_eq!(records[0].company, "Acme");
        assert_eq!(records[1].url, "https://other.example/opening/7");
    }
}
