//! Parsing of free-text reference blocks into structured citations.
//!
//! A block holds one or more citations separated by `<br>` markers. Each
//! citation may carry an enumeration prefix (`1) `), inline markup and
//! `<a href="...">` links, one of which is usually a DOI resolver link.

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::bibliography::BibliographySource;
use crate::markup::MarkupStripper;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Citation {
    pub raw: String,
    pub display_text: String,
    pub url: Option<String>,
    pub doi: Option<String>,
    pub bibliography_text: Option<String>,
}

pub struct CitationParser {
    markup: MarkupStripper,
    line_break: Regex,
    enumeration: Regex,
    href: Regex,
    doi_link: Regex,
    source: Option<Box<dyn BibliographySource>>,
}

impl CitationParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            markup: MarkupStripper::new()?,
            line_break: Regex::new(r"(?i)<\s*br\s*/?\s*>")
                .context("failed to compile line break regex")?,
            enumeration: Regex::new(r"^\s*(?:\d+\))?\s*")
                .context("failed to compile enumeration marker regex")?,
            href: Regex::new(r#"href\s*=\s*"([^"]+)""#)
                .context("failed to compile href regex")?,
            doi_link: Regex::new(r#""(?:https?://)?(?:[\w-]+\.)*doi\.org/([^"]+)""#)
                .context("failed to compile DOI link regex")?,
            source: None,
        })
    }

    /// Attaches the source used when enrichment is requested.
    pub fn with_source(mut self, source: Box<dyn BibliographySource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn parse(&self, raw_block: &str, enrich: bool) -> Vec<Citation> {
        self.line_break
            .split(raw_block)
            .map(|fragment| {
                let mut citation = self.parse_fragment(fragment);
                if enrich {
                    self.enrich(&mut citation);
                }
                citation
            })
            .collect()
    }

    fn parse_fragment(&self, fragment: &str) -> Citation {
        let body = self.enumeration.replace(fragment, "");
        let display_text = self.markup.strip(&body).trim_end().to_string();

        Citation {
            raw: fragment.to_string(),
            display_text,
            url: self.url(fragment),
            doi: self.doi(fragment),
            bibliography_text: None,
        }
    }

    /// Only the first link is considered; a leading DOI link means no URL.
    fn url(&self, fragment: &str) -> Option<String> {
        self.href
            .captures(fragment)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str())
            .filter(|target| !is_doi_link(target))
            .map(ToOwned::to_owned)
    }

    fn doi(&self, fragment: &str) -> Option<String> {
        self.doi_link
            .captures(fragment)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|doi| !doi.is_empty())
    }

    fn enrich(&self, citation: &mut Citation) {
        let Some(doi) = citation.doi.as_deref() else {
            return;
        };
        let Some(source) = self.source.as_deref() else {
            debug!(doi = %doi, "no bibliography source configured");
            return;
        };

        match source.fetch_bibtex(doi) {
            Ok(bibtex) => citation.bibliography_text = bibtex,
            Err(error) => {
                warn!(doi = %doi, error = %error, "bibtex lookup failed");
            }
        }
    }
}

fn is_doi_link(target: &str) -> bool {
    target.contains("doi.org/")
}
