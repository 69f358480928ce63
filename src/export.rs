// src/export.rs
//! Report sinks. The pipeline produces `(Vec<Posting>, RunStats)`; where
//! that goes — JSON, CSV, a spreadsheet service — is a replaceable
//! collaborator behind one trait.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

use crate::posting::{Posting, RunStats};

#[async_trait::async_trait]
pub trait ReportSink: Send + Sync {
    async fn store(&self, postings: &[Posting], stats: &RunStats) -> Result<()>;
}

#[derive(Serialize)]
struct Report<'a> {
    generated_at: DateTime<Utc>,
    postings: &'a [Posting],
    stats: &'a RunStats,
}

/// Writes the ranked report as pretty JSON.
pub struct JsonSink {
    path: PathBuf,
}

impl JsonSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl ReportSink for JsonSink {
    async fn store(&self, postings: &[Posting], stats: &RunStats) -> Result<()> {
        let report = Report {
            generated_at: Utc::now(),
            postings,
            stats,
        };
        let body = serde_json::to_string_pretty(&report)?;
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        std::fs::write(&self.path, body)
            .with_context(|| format!("writing {}", self.path.display()))
    }
}

const CSV_HEADER: &str = "Company,Job Title,Job URL,Posted,Sources,Location,Keywords,Score";

/// Writes the ranked report as CSV with the classic spreadsheet column set.
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl ReportSink for CsvSink {
    async fn store(&self, postings: &[Posting], _stats: &RunStats) -> Result<()> {
        let mut body = String::from(CSV_HEADER);
        body.push('\n');
        for p in postings {
            let posted = p
                .posted_at
                .map(|ts| ts.format("%d.%m.%Y %H:%M").to_string())
                .unwrap_or_else(|| "Unknown".to_string());
            let sources = p
                .merged_from
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            let keywords = p
                .keywords_matched
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join("; ");
            let score = format!("{:.2}", p.score.unwrap_or(0.0));
            let row = [
                p.company.as_str(),
                p.title.as_str(),
                p.url.as_str(),
                posted.as_str(),
                sources.as_str(),
                p.location.as_str(),
                keywords.as_str(),
                score.as_str(),
            ]
            .iter()
            .map(|cell| csv_cell(cell))
            .collect::<Vec<_>>()
            .join(",");
            body.push_str(&row);
            body.push('\n');
        }

        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        std::fs::write(&self.path, body)
            .with_context(|| format!("writing {}", self.path.display()))
    }
}

/// Quote a cell when it carries a delimiter, quote or newline.
fn csv_cell(cell: &str) -> String {
    if cell.contains([',', '"', '\n']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

// --- Test helper ---
pub struct MockSink {
    pub calls: std::sync::Mutex<Vec<(usize, RunStats)>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self {
            calls: std::sync::Mutex::new(vec![]),
        }
    }
}

impl Default for MockSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ReportSink for MockSink {
    async fn store(&self, postings: &[Posting], stats: &RunStats) -> Result<()> {
        self.calls
            .lock()
            .expect("mock sink lock")
            .push((postings.len(), stats.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posting::Source;

    #[test]
    fn cells_with_delimiters_are_quoted() {
        assert_eq!(csv_cell("Acme"), "Acme");
        assert_eq!(csv_cell("Acme, Inc."), "\"Acme, Inc.\"");
        assert_eq!(csv_cell("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[tokio::test]
    async fn csv_report_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        let posting = Posting {
            title: "Junior AI Engineer".into(),
            company: "Acme, Inc.".into(),
            location: "Berlin".into(),
            url: "https://a.com/1".into(),
            source: Source::LinkedIn,
            posted_at: None,
            description: String::new(),
            keywords_matched: ["ai".to_string()].into_iter().collect(),
            score: Some(3.5),
            merged_from: vec![Source::LinkedIn, Source::Indeed],
        };

        CsvSink::new(&path)
            .store(&[posting], &RunStats::default())
            .await
            .unwrap();

        let body = std::fs::read_to_string(&path).unwrap();
        let mut lines = body.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        let row = lines.next().unwrap();
        assert!(row.starts_with("\"Acme, Inc.\",Junior AI Engineer,"));
        assert!(row.contains("LinkedIn; Indeed"));
        assert!(row.ends_with("3.50"));
    }
}
