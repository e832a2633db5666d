use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use tracing::debug;

pub const DEFAULT_RESOLVER_URL: &str = "https://doi.org";
pub const BIBTEX_MEDIA_TYPE: &str = "application/x-bibtex";

/// Source of BibTeX records for DOIs.
///
/// `Ok(None)` means the source answered but had nothing usable; `Err` is a
/// transport failure. Neither is retried.
pub trait BibliographySource: Send + Sync {
    fn fetch_bibtex(&self, doi: &str) -> Result<Option<String>>;
}

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_RESOLVER_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("rii-meta/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Content-negotiating client for the DOI resolver.
#[derive(Debug, Clone)]
pub struct DoiResolver {
    client: Client,
    base_url: String,
}

impl DoiResolver {
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .context("failed to build DOI resolver HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn resolver_url(&self, doi: &str) -> String {
        format!("{}/{}", self.base_url, doi)
    }
}

impl BibliographySource for DoiResolver {
    fn fetch_bibtex(&self, doi: &str) -> Result<Option<String>> {
        let url = self.resolver_url(doi);
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, BIBTEX_MEDIA_TYPE)
            .send()
            .with_context(|| format!("failed to request {url}"))?;

        let status = response.status();
        if !status.is_success() {
            debug!(doi = %doi, status = status.as_u16(), "bibtex lookup returned no record");
            return Ok(None);
        }

        let body = response
            .text()
            .with_context(|| format!("failed to read response body from {url}"))?;
        Ok(Some(body))
    }
}
