use serde::{Deserialize, Serialize};

/// One page of the shelf/book/page hierarchy, flattened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub shelf: String,
    pub shelf_name: String,
    pub book_category: Option<String>,
    pub book: String,
    pub material_description: String,
    pub page: String,
    pub page_category: Option<String>,
    pub reference_description: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShelfCount {
    pub shelf: String,
    pub record_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogInventoryManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub database_root: String,
    pub library_sha256: String,
    pub record_count: usize,
    pub shelves: Vec<ShelfCount>,
    pub records: Vec<CatalogRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractCounts {
    pub records_total: usize,
    pub documents_written: usize,
    pub single_count: usize,
    pub uniaxial_count: usize,
    pub biaxial_count: usize,
    pub skipped_secondary_count: usize,
    pub failed_count: usize,
    pub citations_parsed: usize,
    pub bibtex_fetched: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub database_root: String,
    pub output_root: String,
    pub fetch_bibtex: bool,
    pub counts: ExtractCounts,
    pub warnings: Vec<String>,
}
