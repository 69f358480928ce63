// src/config.rs
//! Search configuration: filter criteria, ranking weights, source toggles
//! and the query list. TOML on disk, env-var path override, and a
//! `from_toml_str` constructor so tests never touch the filesystem.
//!
//! Invalid or missing configuration is the one fatal error in the system;
//! it aborts before any fetch. An empty run result is *not* an error.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::filter::FilterCriteria;
use crate::posting::Query;
use crate::rank::RankWeights;

pub const DEFAULT_CONFIG_PATH: &str = "config/search.toml";
pub const ENV_CONFIG_PATH: &str = "STELLENRADAR_CONFIG_PATH";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub filter: FilterSection,
    pub rank: RankSection,
    #[serde(default)]
    pub sources: SourcesSection,
    pub queries: QuerySection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterSection {
    pub allowed_locales: Vec<String>,
    pub seniority_terms: Vec<String>,
    pub technical_terms: Vec<String>,
    pub max_age_hours: i64,
    #[serde(default = "default_true")]
    pub require_any_technical_term: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankSection {
    pub weights: RankWeights,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesSection {
    #[serde(default = "default_true")]
    pub linkedin: bool,
    #[serde(default = "default_true")]
    pub indeed: bool,
    #[serde(default = "default_true")]
    pub xing: bool,
    /// Company career pages to harvest in addition to the boards.
    #[serde(default)]
    pub career_pages: Vec<CareerPageCfg>,
    #[serde(default = "default_timeout_ms")]
    pub per_source_timeout_ms: u64,
}

impl Default for SourcesSection {
    fn default() -> Self {
        Self {
            linkedin: true,
            indeed: true,
            xing: true,
            career_pages: Vec::new(),
            per_source_timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CareerPageCfg {
    pub company: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuerySection {
    pub keywords: Vec<String>,
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_true() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_locale() -> String {
    "Germany".to_string()
}

impl SearchConfig {
    /// Resolve the config path (env override first) and load.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::from_path(&path)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: SearchConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.queries.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "queries.keywords must name at least one keyword".into(),
            ));
        }
        if self.filter.max_age_hours <= 0 {
            return Err(ConfigError::Invalid(
                "filter.max_age_hours must be positive".into(),
            ));
        }
        if self.sources.per_source_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "sources.per_source_timeout_ms must be positive".into(),
            ));
        }
        let w = &self.rank.weights;
        for (name, value) in [
            ("keywords", w.keywords),
            ("seniority", w.seniority),
            ("recency", w.recency),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "rank.weights.{name} must be a non-negative number"
                )));
            }
        }
        Ok(())
    }

    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            allowed_locales: self.filter.allowed_locales.clone(),
            seniority_terms: self.filter.seniority_terms.clone(),
            technical_terms: self.filter.technical_terms.clone(),
            max_age: self.max_age(),
            require_any_technical_term: self.filter.require_any_technical_term,
        }
    }

    pub fn rank_weights(&self) -> RankWeights {
        self.rank.weights
    }

    pub fn max_age(&self) -> chrono::Duration {
        chrono::Duration::hours(self.filter.max_age_hours)
    }

    /// One query per configured keyword, all within the configured locale.
    pub fn queries(&self) -> Vec<Query> {
        self.queries
            .keywords
            .iter()
            .filter(|k| !k.trim().is_empty())
            .map(|k| Query {
                keyword: k.trim().to_string(),
                locale: self.queries.locale.clone(),
            })
            .collect()
    }
}
