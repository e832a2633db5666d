//! Loading of the refractive-index `library.yml` catalog and page data files.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};

use crate::model::CatalogRecord;

pub const LIBRARY_FILE: &str = "library.yml";

/// Read-only catalog with a path index for sibling lookups.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<CatalogRecord>,
    by_path: HashMap<String, Vec<usize>>,
}

impl Catalog {
    pub fn from_records(records: Vec<CatalogRecord>) -> Self {
        let mut by_path = HashMap::<String, Vec<usize>>::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            by_path.entry(record.path.clone()).or_default().push(index);
        }

        Self { records, by_path }
    }

    pub fn records(&self) -> &[CatalogRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records whose path is exactly `path`.
    pub fn count_path(&self, path: &str) -> usize {
        self.by_path.get(path).map_or(0, Vec::len)
    }

    pub fn get(&self, path: &str) -> Option<&CatalogRecord> {
        self.by_path
            .get(path)
            .and_then(|indices| indices.first())
            .and_then(|index| self.records.get(*index))
    }
}

#[derive(Debug, Deserialize)]
struct ShelfEntry {
    #[serde(rename = "SHELF", deserialize_with = "scalar_string")]
    shelf: String,
    #[serde(deserialize_with = "scalar_string")]
    name: String,
    #[serde(default)]
    content: Vec<BookItem>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BookItem {
    Divider {
        #[serde(rename = "DIVIDER", deserialize_with = "scalar_string")]
        divider: String,
    },
    Book {
        #[serde(rename = "BOOK", deserialize_with = "scalar_string")]
        book: String,
        #[serde(deserialize_with = "scalar_string")]
        name: String,
        #[serde(default)]
        content: Vec<PageItem>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PageItem {
    Divider {
        #[serde(rename = "DIVIDER", deserialize_with = "scalar_string")]
        divider: String,
    },
    Page {
        #[serde(rename = "PAGE", deserialize_with = "scalar_string")]
        page: String,
        #[serde(deserialize_with = "scalar_string")]
        name: String,
        #[serde(deserialize_with = "scalar_string")]
        data: String,
    },
}

// Page ids such as `1975` parse as YAML integers.
fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::String(value) => Ok(value),
        serde_yaml::Value::Number(value) => Ok(value.to_string()),
        serde_yaml::Value::Bool(value) => Ok(value.to_string()),
        serde_yaml::Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!(
            "expected a scalar value, found {other:?}"
        ))),
    }
}

pub fn load_catalog(database_root: &Path) -> Result<Catalog> {
    let library_path = database_root.join(LIBRARY_FILE);
    let raw = fs::read_to_string(&library_path)
        .with_context(|| format!("failed to read {}", library_path.display()))?;
    let records = parse_library(&raw)
        .with_context(|| format!("failed to parse {}", library_path.display()))?;
    Ok(Catalog::from_records(records))
}

pub fn parse_library(raw: &str) -> Result<Vec<CatalogRecord>> {
    let shelves: Vec<ShelfEntry> =
        serde_yaml::from_str(raw).context("library is not a list of shelves")?;

    let mut records = Vec::new();
    for shelf in shelves {
        let mut book_category: Option<String> = None;

        for item in shelf.content {
            let (book, material_description, pages) = match item {
                BookItem::Divider { divider } => {
                    book_category = Some(divider);
                    continue;
                }
                BookItem::Book {
                    book,
                    name,
                    content,
                } => (book, name, content),
            };

            let mut page_category: Option<String> = None;
            for page_item in pages {
                match page_item {
                    PageItem::Divider { divider } => page_category = Some(divider),
                    PageItem::Page { page, name, data } => records.push(CatalogRecord {
                        shelf: shelf.shelf.clone(),
                        shelf_name: shelf.name.clone(),
                        book_category: book_category.clone(),
                        book: book.clone(),
                        material_description: material_description.clone(),
                        page,
                        page_category: page_category.clone(),
                        reference_description: name,
                        path: normalize_data_path(&data),
                    }),
                }
            }
        }
    }

    Ok(records)
}

/// Joins a page's `data` value onto `data/`, resolving `.` and `..` lexically.
pub fn normalize_data_path(raw: &str) -> String {
    let mut parts = Vec::<&str>::new();
    for part in raw.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }

    format!("data/{}", parts.join("/"))
}

#[derive(Debug, Deserialize)]
struct PageDataFile {
    #[serde(rename = "REFERENCES", default)]
    references: Option<String>,
}

/// Reads the `REFERENCES` block of a page data file.
pub fn read_page_references(
    database_root: &Path,
    record: &CatalogRecord,
) -> Result<Option<String>> {
    let data_path = database_root.join(&record.path);
    let raw = fs::read_to_string(&data_path)
        .with_context(|| format!("failed to read {}", data_path.display()))?;
    let data: PageDataFile = serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse {}", data_path.display()))?;

    Ok(data
        .references
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty()))
}
