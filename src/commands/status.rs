use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use rii_meta::model::{CatalogInventoryManifest, ExtractRunManifest};

use super::{EXTRACT_RUN_PREFIX, INVENTORY_MANIFEST, manifest_dir};
use crate::cli::StatusArgs;

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_dir = manifest_dir(&args.cache_root);
    let inventory_path = manifest_dir.join(INVENTORY_MANIFEST);

    info!(cache_root = %args.cache_root.display(), "status requested");

    if inventory_path.exists() {
        let raw = fs::read(&inventory_path)
            .with_context(|| format!("failed to read {}", inventory_path.display()))?;
        let inventory: CatalogInventoryManifest = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", inventory_path.display()))?;

        info!(
            generated_at = %inventory.generated_at,
            database_root = %inventory.database_root,
            library_sha256 = %inventory.library_sha256,
            record_count = inventory.record_count,
            shelves = inventory.shelves.len(),
            "loaded inventory manifest"
        );
    } else {
        warn!(path = %inventory_path.display(), "inventory manifest missing");
    }

    match latest_extract_run(&manifest_dir)? {
        Some(run_path) => {
            let raw = fs::read(&run_path)
                .with_context(|| format!("failed to read {}", run_path.display()))?;
            let manifest: ExtractRunManifest = serde_json::from_slice(&raw)
                .with_context(|| format!("failed to parse {}", run_path.display()))?;

            info!(
                run_id = %manifest.run_id,
                status = %manifest.status,
                updated_at = %manifest.updated_at,
                output_root = %manifest.output_root,
                records = manifest.counts.records_total,
                written = manifest.counts.documents_written,
                skipped = manifest.counts.skipped_secondary_count,
                failed = manifest.counts.failed_count,
                citations = manifest.counts.citations_parsed,
                bibtex = manifest.counts.bibtex_fetched,
                warnings = manifest.warnings.len(),
                "loaded latest extract run manifest"
            );
        }
        None => warn!(path = %manifest_dir.display(), "no extract run manifest found"),
    }

    Ok(())
}

/// Run manifests carry a compact UTC timestamp, so the lexically greatest name is the latest.
fn latest_extract_run(manifest_dir: &Path) -> Result<Option<PathBuf>> {
    if !manifest_dir.exists() {
        return Ok(None);
    }

    let entries = fs::read_dir(manifest_dir)
        .with_context(|| format!("failed to read {}", manifest_dir.display()))?;

    let mut latest: Option<PathBuf> = None;
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", manifest_dir.display()))?;
        let path = entry.path();

        let is_run_manifest = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with(EXTRACT_RUN_PREFIX) && name.ends_with(".json"))
            .unwrap_or(false);

        if is_run_manifest && latest.as_ref().is_none_or(|current| path > *current) {
            latest = Some(path);
        }
    }

    Ok(latest)
}
