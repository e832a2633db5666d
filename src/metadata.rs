//! Flat metadata documents handed to the structured-output writer.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

use crate::axis::AxisLink;
use crate::citation::Citation;
use crate::formula::FormulaResult;
use crate::model::CatalogRecord;
use crate::util::write_json_pretty;

pub const ENTRY_PATH: &str = "/entry";
const REFERENCE_GROUP: &str = "REFERENCES";
const REFERENCE_BASENAME: &str = "reference";

/// Semantic field path to value, ordered by path.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetadataDocument {
    fields: BTreeMap<String, Value>,
}

impl MetadataDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(path.into(), value.into());
    }

    pub fn contains(&self, path: &str) -> bool {
        self.fields.contains_key(path)
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.fields.get(path)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        write_json_pretty(path, self)
    }
}

/// Builds the sample and dispersion fields for a primary record.
pub fn build_metadata(
    record: &CatalogRecord,
    formula: &FormulaResult,
    link: &AxisLink,
    database_root: &Path,
) -> MetadataDocument {
    let mut document = MetadataDocument::new();

    document.insert(
        format!("{ENTRY_PATH}/sample/chemical_formula"),
        formula.formula.clone(),
    );
    if !formula.elements.is_empty() {
        document.insert(
            format!("{ENTRY_PATH}/sample/atom_types"),
            formula.atom_types().join(","),
        );
    }
    if !formula.colloquial_names.is_empty() {
        document.insert(
            format!("{ENTRY_PATH}/sample/colloquial_name"),
            formula.colloquial_names.join(", "),
        );
    }

    let literature = record
        .reference_description
        .split_once(':')
        .map_or(record.reference_description.as_str(), |(head, _)| head)
        .trim();
    if !literature.is_empty() {
        document.insert(format!("{ENTRY_PATH}/literature"), literature.to_string());
    }

    if let Some(dispersion_type) = link.dispersion_type() {
        document.insert(format!("{ENTRY_PATH}/dispersion_type"), dispersion_type);
    }

    let data_file = |path: &str| database_root.join(path).display().to_string();
    match link {
        AxisLink::UniaxialMember { extraordinary_path } => {
            document.insert(
                format!("{ENTRY_PATH}/dispersion_z"),
                data_file(extraordinary_path),
            );
        }
        AxisLink::BiaxialMember {
            beta_path,
            gamma_path,
        } => {
            document.insert(format!("{ENTRY_PATH}/dispersion_y"), data_file(beta_path));
            document.insert(format!("{ENTRY_PATH}/dispersion_z"), data_file(gamma_path));
        }
        AxisLink::Single | AxisLink::Skipped => {}
    }

    document
}

/// Writes each citation into its own reference group below `base`.
///
/// Group names are `reference`, `reference1`, `reference2`, ..., skipping any
/// already present in `document`. Returns the group names used.
pub fn write_citations(
    document: &mut MetadataDocument,
    base: &str,
    citations: &[Citation],
) -> Vec<String> {
    let mut names = Vec::with_capacity(citations.len());
    let mut counter = 0usize;

    for citation in citations {
        let group = loop {
            let name = if counter == 0 {
                REFERENCE_BASENAME.to_string()
            } else {
                format!("{REFERENCE_BASENAME}{counter}")
            };
            let group = format!("{base}/{REFERENCE_GROUP}[{name}]");
            if !document.contains(&format!("{group}/text")) {
                names.push(name);
                break group;
            }
            counter += 1;
        };

        if let Some(url) = &citation.url {
            document.insert(format!("{group}/url"), url.clone());
        }
        if let Some(doi) = &citation.doi {
            document.insert(format!("{group}/doi"), doi.clone());
        }
        if let Some(bibtex) = &citation.bibliography_text {
            document.insert(format!("{group}/bibtex"), bibtex.clone());
        }
        document.insert(format!("{group}/text"), citation.display_text.clone());
    }

    names
}

/// Maps `data/<shelf>/<book>/<page>.yml` to `<output_root>/<shelf>/<book>-<page>.json`.
pub fn output_path(output_root: &Path, catalog_path: &str) -> PathBuf {
    let relative = catalog_path.strip_prefix("data/").unwrap_or(catalog_path);
    let (shelf, rest) = relative.split_once('/').unwrap_or(("", relative));
    let flattened = rest.replace('/', "-");
    let stem = flattened
        .rsplit_once('.')
        .map_or(flattened.as_str(), |(stem, _)| stem);

    let directory = if shelf.is_empty() {
        output_root.to_path_buf()
    } else {
        output_root.join(shelf)
    };
    directory.join(format!("{stem}.json"))
}
