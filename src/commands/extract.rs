use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use rii_meta::axis::{AxisLink, classify};
use rii_meta::catalog::{Catalog, load_catalog, read_page_references};
use rii_meta::citation::CitationParser;
use rii_meta::formula::FormulaNormalizer;
use rii_meta::metadata::{ENTRY_PATH, build_metadata, output_path, write_citations};
use rii_meta::model::{CatalogRecord, ExtractCounts, ExtractRunManifest};
use rii_meta::util::{ensure_directory, now_utc_string, utc_compact_string, write_json_pretty};

use super::{EXTRACT_RUN_PREFIX, build_citation_parser, manifest_dir};
use crate::cli::ExtractArgs;

struct ExtractContext<'a> {
    catalog: &'a Catalog,
    normalizer: &'a FormulaNormalizer,
    citations: Option<&'a CitationParser>,
    database_root: &'a Path,
    output_root: &'a Path,
    fetch_bibtex: bool,
    dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordKind {
    Single,
    Uniaxial,
    Biaxial,
    Skipped,
}

#[derive(Debug, Clone)]
struct RecordOutcome {
    kind: RecordKind,
    citations: usize,
    bibtex_fetched: usize,
    warning: Option<String>,
}

impl RecordOutcome {
    fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            citations: 0,
            bibtex_fetched: 0,
            warning: None,
        }
    }
}

pub fn run(args: ExtractArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("extract-{}", utc_compact_string(started_ts));

    let manifest_dir = manifest_dir(&args.cache_root);
    ensure_directory(&manifest_dir)?;
    let run_manifest_path = args.run_manifest_path.clone().unwrap_or_else(|| {
        manifest_dir.join(format!(
            "{EXTRACT_RUN_PREFIX}{}.json",
            utc_compact_string(started_ts)
        ))
    });

    info!(
        database_root = %args.database_root.display(),
        output_root = %args.output_root.display(),
        run_id = %run_id,
        "starting extract"
    );

    let catalog = load_catalog(&args.database_root)?;
    let normalizer = FormulaNormalizer::new()?;
    let citation_parser = if args.with_references {
        Some(build_citation_parser(&args.bibtex)?)
    } else {
        None
    };

    let selected = select_records(&catalog, &args.shelves, args.limit);
    info!(
        catalog_records = catalog.len(),
        selected_records = selected.len(),
        jobs = args.jobs,
        "catalog loaded"
    );

    let context = ExtractContext {
        catalog: &catalog,
        normalizer: &normalizer,
        citations: citation_parser.as_ref(),
        database_root: &args.database_root,
        output_root: &args.output_root,
        fetch_bibtex: args.bibtex.fetch_bibtex,
        dry_run: args.dry_run,
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.jobs.max(1))
        .build()
        .context("failed to build extract worker pool")?;

    let results: Vec<(&CatalogRecord, Result<RecordOutcome>)> = if args.fail_fast {
        pool.install(|| {
            selected
                .par_iter()
                .map(|record| process_record(&context, record).map(|outcome| (*record, outcome)))
                .collect::<Result<Vec<_>>>()
        })?
        .into_iter()
        .map(|(record, outcome)| (record, Ok(outcome)))
        .collect()
    } else {
        pool.install(|| {
            selected
                .par_iter()
                .map(|record| (*record, process_record(&context, record)))
                .collect()
        })
    };

    let (counts, warnings) = tally(selected.len(), results);

    let manifest = ExtractRunManifest {
        manifest_version: 1,
        run_id,
        status: if counts.failed_count == 0 {
            "completed".to_string()
        } else {
            "completed_with_failures".to_string()
        },
        started_at,
        updated_at: now_utc_string(),
        command: render_extract_command(&args),
        database_root: args.database_root.display().to_string(),
        output_root: args.output_root.display().to_string(),
        fetch_bibtex: args.bibtex.fetch_bibtex,
        counts,
        warnings,
    };

    write_json_pretty(&run_manifest_path, &manifest)?;
    info!(path = %run_manifest_path.display(), "wrote extract run manifest");
    info!(
        written = manifest.counts.documents_written,
        single = manifest.counts.single_count,
        uniaxial = manifest.counts.uniaxial_count,
        biaxial = manifest.counts.biaxial_count,
        skipped = manifest.counts.skipped_secondary_count,
        failed = manifest.counts.failed_count,
        "extract completed"
    );

    Ok(())
}

fn select_records<'a>(
    catalog: &'a Catalog,
    shelves: &[String],
    limit: Option<usize>,
) -> Vec<&'a CatalogRecord> {
    catalog
        .records()
        .iter()
        .filter(|record| shelves.is_empty() || shelves.contains(&record.shelf))
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

fn process_record(
    context: &ExtractContext<'_>,
    record: &CatalogRecord,
) -> Result<RecordOutcome> {
    let link = classify(record, context.catalog)
        .with_context(|| format!("failed to link axes for {}", record.path))?;

    let kind = match &link {
        AxisLink::Skipped => return Ok(RecordOutcome::new(RecordKind::Skipped)),
        AxisLink::Single => RecordKind::Single,
        AxisLink::UniaxialMember { .. } => RecordKind::Uniaxial,
        AxisLink::BiaxialMember { .. } => RecordKind::Biaxial,
    };
    let mut outcome = RecordOutcome::new(kind);

    let formula = context.normalizer.normalize(&record.material_description);
    let mut document = build_metadata(record, &formula, &link, context.database_root);

    if let Some(parser) = context.citations {
        match read_page_references(context.database_root, record) {
            Ok(Some(block)) => {
                let citations = parser.parse(&block, context.fetch_bibtex);
                outcome.citations = citations.len();
                outcome.bibtex_fetched = citations
                    .iter()
                    .filter(|citation| citation.bibliography_text.is_some())
                    .count();
                write_citations(&mut document, ENTRY_PATH, &citations);
            }
            Ok(None) => debug!(path = %record.path, "page has no references"),
            Err(error) => {
                warn!(path = %record.path, error = %error, "could not read page references");
                outcome.warning = Some(format!("{}: {error:#}", record.path));
            }
        }
    }

    let destination = output_path(context.output_root, &record.path);
    if context.dry_run {
        debug!(path = %destination.display(), fields = document.len(), "dry-run, not writing");
    } else {
        document
            .write(&destination)
            .with_context(|| format!("failed to write metadata for {}", record.path))?;
    }

    Ok(outcome)
}

fn tally(
    records_total: usize,
    results: Vec<(&CatalogRecord, Result<RecordOutcome>)>,
) -> (ExtractCounts, Vec<String>) {
    let mut counts = ExtractCounts {
        records_total,
        ..ExtractCounts::default()
    };
    let mut warnings = Vec::new();

    for (record, result) in results {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(path = %record.path, error = %format!("{error:#}"), "record failed");
                counts.failed_count += 1;
                warnings.push(format!("{}: {error:#}", record.path));
                continue;
            }
        };

        match outcome.kind {
            RecordKind::Skipped => {
                counts.skipped_secondary_count += 1;
                continue;
            }
            RecordKind::Single => counts.single_count += 1,
            RecordKind::Uniaxial => counts.uniaxial_count += 1,
            RecordKind::Biaxial => counts.biaxial_count += 1,
        }
        counts.documents_written += 1;
        counts.citations_parsed += outcome.citations;
        counts.bibtex_fetched += outcome.bibtex_fetched;
        warnings.extend(outcome.warning);
    }

    (counts, warnings)
}

fn render_extract_command(args: &ExtractArgs) -> String {
    let mut command = vec![
        "rii-meta".to_string(),
        "extract".to_string(),
        "--database-root".to_string(),
        args.database_root.display().to_string(),
        "--output-root".to_string(),
        args.output_root.display().to_string(),
        "--cache-root".to_string(),
        args.cache_root.display().to_string(),
        "--jobs".to_string(),
        args.jobs.to_string(),
    ];

    if let Some(path) = &args.run_manifest_path {
        command.push("--run-manifest-path".to_string());
        command.push(path.display().to_string());
    }
    if args.with_references {
        command.push("--with-references".to_string());
    }
    if args.bibtex.fetch_bibtex {
        command.push("--fetch-bibtex".to_string());
        command.push("--resolver-url".to_string());
        command.push(args.bibtex.resolver_url.clone());
        command.push("--timeout-secs".to_string());
        command.push(args.bibtex.timeout_secs.to_string());
        if let Some(user_agent) = &args.bibtex.user_agent {
            command.push("--user-agent".to_string());
            command.push(user_agent.clone());
        }
    }
    for shelf in &args.shelves {
        command.push("--shelf".to_string());
        command.push(shelf.clone());
    }
    if let Some(limit) = args.limit {
        command.push("--limit".to_string());
        command.push(limit.to_string());
    }
    if args.fail_fast {
        command.push("--fail-fast".to_string());
    }
    if args.dry_run {
        command.push("--dry-run".to_string());
    }

    command.join(" ")
}

#[cfg(test)]
mod tests;
