use std::path::Path;

use anyhow::{Result, bail};
use tracing::info;

use rii_meta::catalog::{LIBRARY_FILE, load_catalog};
use rii_meta::model::{CatalogInventoryManifest, ShelfCount};
use rii_meta::util::{now_utc_string, sha256_file, write_json_pretty};

use super::{INVENTORY_MANIFEST, manifest_dir};
use crate::cli::InventoryArgs;

pub fn run(args: InventoryArgs) -> Result<()> {
    let manifest = build_manifest(&args.database_root)?;

    if args.dry_run {
        info!(
            record_count = manifest.record_count,
            shelves = manifest.shelves.len(),
            source = %manifest.database_root,
            "inventory dry-run complete"
        );
        return Ok(());
    }

    let manifest_path = args
        .manifest_path
        .unwrap_or_else(|| manifest_dir(&args.cache_root).join(INVENTORY_MANIFEST));

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote inventory manifest");
    info!(record_count = manifest.record_count, "inventory completed");

    Ok(())
}

pub fn build_manifest(database_root: &Path) -> Result<CatalogInventoryManifest> {
    let library_path = database_root.join(LIBRARY_FILE);
    let catalog = load_catalog(database_root)?;

    if catalog.is_empty() {
        bail!("no pages found in {}", library_path.display());
    }

    let library_sha256 = sha256_file(&library_path)?;
    let records = catalog.records().to_vec();

    Ok(CatalogInventoryManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        database_root: database_root.display().to_string(),
        library_sha256,
        record_count: records.len(),
        shelves: count_shelves(&records),
        records,
    })
}

fn count_shelves(records: &[rii_meta::model::CatalogRecord]) -> Vec<ShelfCount> {
    let mut shelves = Vec::<ShelfCount>::new();
    for record in records {
        match shelves.iter_mut().find(|entry| entry.shelf == record.shelf) {
            Some(entry) => entry.record_count += 1,
            None => shelves.push(ShelfCount {
                shelf: record.shelf.clone(),
                record_count: 1,
            }),
        }
    }
    shelves
}
