//! Metadata derivation for the refractiveindex.info catalog.
//!
//! Three independent components do the work: [`formula::FormulaNormalizer`]
//! turns material descriptions into Hill-ordered formulas,
//! [`citation::CitationParser`] splits reference blocks into citations, and
//! [`axis::classify`] links per-axis records of anisotropic materials.

pub mod axis;
pub mod bibliography;
pub mod catalog;
pub mod citation;
pub mod formula;
pub mod markup;
pub mod metadata;
pub mod model;
pub mod util;

pub use axis::{AxisLink, AxisSuffix, LinkError, classify};
pub use catalog::{Catalog, load_catalog};
pub use citation::{Citation, CitationParser};
pub use formula::{ElementCount, FormulaNormalizer, FormulaResult};
