//! Linking of per-axis dispersion records into uniaxial and biaxial groups.
//!
//! Axis membership is encoded in the file name: `Malitson-o.yml` and
//! `Malitson-e.yml` are the ordinary and extraordinary axes of one uniaxial
//! dataset, `Zelmon-alpha.yml`, `Zelmon-beta.yml` and `Zelmon-gamma.yml` the
//! three axes of a biaxial one. The primary member (`-o`, `-alpha`) owns the
//! group; secondary members are skipped.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::catalog::Catalog;
use crate::model::CatalogRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisSuffix {
    Ordinary,
    Extraordinary,
    Alpha,
    Beta,
    Gamma,
    None,
}

impl AxisSuffix {
    pub fn from_path(path: &str) -> Self {
        AxisPath::parse(path).map_or(Self::None, |parsed| parsed.suffix)
    }

    fn from_token(token: &str) -> Self {
        match token {
            "o" => Self::Ordinary,
            "e" => Self::Extraordinary,
            "alpha" => Self::Alpha,
            "beta" => Self::Beta,
            "gamma" => Self::Gamma,
            _ => Self::None,
        }
    }

    pub fn token(self) -> Option<&'static str> {
        match self {
            Self::Ordinary => Some("o"),
            Self::Extraordinary => Some("e"),
            Self::Alpha => Some("alpha"),
            Self::Beta => Some("beta"),
            Self::Gamma => Some("gamma"),
            Self::None => None,
        }
    }
}

/// Byte span of the `-token` axis suffix within a path.
#[derive(Debug, Clone, Copy)]
struct AxisPath {
    suffix: AxisSuffix,
    dash: usize,
    token_end: usize,
}

impl AxisPath {
    fn parse(path: &str) -> Option<Self> {
        let name_start = path.rfind('/').map_or(0, |index| index + 1);
        let name = &path[name_start..];
        let stem_len = name.rfind('.').unwrap_or(name.len());
        let stem = &name[..stem_len];

        let (base, token) = stem.rsplit_once('-')?;
        let suffix = AxisSuffix::from_token(token);
        if suffix == AxisSuffix::None {
            return None;
        }

        Some(Self {
            suffix,
            dash: name_start + base.len(),
            token_end: name_start + stem_len,
        })
    }
}

/// Rebuilds `path` with its axis suffix replaced by `target`.
///
/// Returns `None` when `path` carries no axis suffix or `target` is
/// [`AxisSuffix::None`].
pub fn sibling_path(path: &str, target: AxisSuffix) -> Option<String> {
    let parsed = AxisPath::parse(path)?;
    let token = target.token()?;
    Some(format!(
        "{}-{}{}",
        &path[..parsed.dash],
        token,
        &path[parsed.token_end..]
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AxisLink {
    Single,
    UniaxialMember {
        extraordinary_path: String,
    },
    BiaxialMember {
        beta_path: String,
        gamma_path: String,
    },
    Skipped,
}

impl AxisLink {
    pub fn dispersion_type(&self) -> Option<&'static str> {
        match self {
            Self::Single => Some("isotropic"),
            Self::UniaxialMember { .. } => Some("uniaxial"),
            Self::BiaxialMember { .. } => Some("biaxial"),
            Self::Skipped => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("axis sibling {sibling} of {primary} is missing from the catalog")]
    MissingSibling { primary: String, sibling: String },
    #[error("axis sibling {sibling} of {primary} appears {count} times in the catalog")]
    DuplicateSibling {
        primary: String,
        sibling: String,
        count: usize,
    },
}

pub fn classify(record: &CatalogRecord, catalog: &Catalog) -> Result<AxisLink, LinkError> {
    classify_path(&record.path, catalog)
}

pub fn classify_path(path: &str, catalog: &Catalog) -> Result<AxisLink, LinkError> {
    match AxisSuffix::from_path(path) {
        AxisSuffix::Extraordinary | AxisSuffix::Beta | AxisSuffix::Gamma => {
            debug!(path = %path, "skipping secondary axis record");
            Ok(AxisLink::Skipped)
        }
        AxisSuffix::Ordinary => {
            debug!(path = %path, "resolving extraordinary axis");
            Ok(AxisLink::UniaxialMember {
                extraordinary_path: resolve_sibling(path, AxisSuffix::Extraordinary, catalog)?,
            })
        }
        AxisSuffix::Alpha => {
            debug!(path = %path, "resolving beta and gamma axes");
            Ok(AxisLink::BiaxialMember {
                beta_path: resolve_sibling(path, AxisSuffix::Beta, catalog)?,
                gamma_path: resolve_sibling(path, AxisSuffix::Gamma, catalog)?,
            })
        }
        AxisSuffix::None => Ok(AxisLink::Single),
    }
}

fn resolve_sibling(
    path: &str,
    target: AxisSuffix,
    catalog: &Catalog,
) -> Result<String, LinkError> {
    let sibling = sibling_path(path, target).ok_or_else(|| LinkError::MissingSibling {
        primary: path.to_string(),
        sibling: format!("<{:?} axis>", target),
    })?;

    match catalog.count_path(&sibling) {
        1 => Ok(sibling),
        0 => Err(LinkError::MissingSibling {
            primary: path.to_string(),
            sibling,
        }),
        count => Err(LinkError::DuplicateSibling {
            primary: path.to_string(),
            sibling,
            count,
        }),
    }
}
