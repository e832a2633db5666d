pub mod cite;
pub mod extract;
pub mod formula;
pub mod inventory;
pub mod status;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use rii_meta::bibliography::{DoiResolver, ResolverConfig};
use rii_meta::citation::CitationParser;

use crate::cli::BibtexArgs;

pub(crate) const INVENTORY_MANIFEST: &str = "catalog_inventory.json";
pub(crate) const EXTRACT_RUN_PREFIX: &str = "extract_run_";

pub(crate) fn manifest_dir(cache_root: &Path) -> PathBuf {
    cache_root.join("manifests")
}

/// Builds a citation parser, attaching the DOI resolver only when lookups are enabled.
pub(crate) fn build_citation_parser(args: &BibtexArgs) -> Result<CitationParser> {
    let parser = CitationParser::new()?;
    if !args.fetch_bibtex {
        return Ok(parser);
    }

    let mut config = ResolverConfig {
        base_url: args.resolver_url.clone(),
        timeout: Duration::from_secs(args.timeout_secs),
        ..ResolverConfig::default()
    };
    if let Some(user_agent) = &args.user_agent {
        config.user_agent = user_agent.clone();
    }

    Ok(parser.with_source(Box::new(DoiResolver::new(&config)?)))
}
