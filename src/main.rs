//! stellenradar — Binary Entrypoint
//! Runs one aggregation pass over the configured job sources and writes the
//! ranked report.

use anyhow::Context;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stellenradar::aggregate::Aggregator;
use stellenradar::config::SearchConfig;
use stellenradar::export::{CsvSink, JsonSink, ReportSink};
use stellenradar::sources::{
    careers::CareersSource, indeed::IndeedSource, linkedin::LinkedInSource, xing::XingSource,
    JobSource,
};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 stellenradar/0.1";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("stellenradar=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op elsewhere.
    let _ = dotenvy::dotenv();
    init_tracing();

    // Malformed configuration is the only fatal error; everything after this
    // point degrades per source instead of aborting.
    let config = SearchConfig::load().context("loading search config")?;

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("building http client")?;

    let mut sources: Vec<Arc<dyn JobSource>> = Vec::new();
    if config.sources.linkedin {
        sources.push(Arc::new(LinkedInSource::new(client.clone())));
    }
    if config.sources.indeed {
        sources.push(Arc::new(IndeedSource::new(client.clone())));
    }
    if config.sources.xing {
        sources.push(Arc::new(XingSource::new(client.clone())));
    }
    for page in &config.sources.career_pages {
        sources.push(Arc::new(CareersSource::new(
            client.clone(),
            page.company.clone(),
            page.url.clone(),
        )));
    }
    info!(sources = sources.len(), "starting aggregation run");

    let aggregator = Aggregator::new(sources, config);
    let (postings, stats) = aggregator.run().await;

    for (source, s) in &stats.per_source {
        info!(
            source = %source,
            raw = s.raw,
            normalized = s.normalized,
            malformed = s.malformed,
            error = s.error.as_deref().unwrap_or("-"),
            "source summary"
        );
    }
    for (i, p) in postings.iter().take(5).enumerate() {
        info!(
            rank = i + 1,
            title = %p.title,
            company = %p.company,
            score = p.score.unwrap_or(0.0),
            "top posting"
        );
    }

    let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let json_path = format!("output/jobs_{stamp}.json");
    let csv_path = format!("output/jobs_{stamp}.csv");
    JsonSink::new(&json_path)
        .store(&postings, &stats)
        .await
        .context("writing json report")?;
    CsvSink::new(&csv_path)
        .store(&postings, &stats)
        .await
        .context("writing csv report")?;
    info!(json = %json_path, csv = %csv_path, kept = postings.len(), "reports written");

    Ok(())
}
