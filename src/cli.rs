use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "rii-meta",
    version,
    about = "Derive structured metadata from the refractiveindex.info catalog"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load library.yml and write the flattened catalog manifest
    Inventory(InventoryArgs),
    /// Write one metadata document per primary catalog record
    Extract(ExtractArgs),
    /// Normalise a single material description
    Formula(FormulaArgs),
    /// Parse a single reference block
    Cite(CiteArgs),
    /// Summarise the inventory and latest extract run manifests
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    #[arg(long, default_value = "refractiveindex.info-database/database")]
    pub database_root: PathBuf,

    #[arg(long, default_value = ".cache/rii-meta")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct BibtexArgs {
    #[arg(long, default_value_t = false)]
    pub fetch_bibtex: bool,

    #[arg(long, default_value = "https://doi.org")]
    pub resolver_url: String,

    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    #[arg(long)]
    pub user_agent: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(long, default_value = "refractiveindex.info-database/database")]
    pub database_root: PathBuf,

    #[arg(long, default_value = "dispersions")]
    pub output_root: PathBuf,

    #[arg(long, default_value = ".cache/rii-meta")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub run_manifest_path: Option<PathBuf>,

    /// Parse the REFERENCES block of each page data file
    #[arg(long, default_value_t = false)]
    pub with_references: bool,

    #[command(flatten)]
    pub bibtex: BibtexArgs,

    /// Worker threads; also bounds concurrent DOI lookups
    #[arg(long, default_value_t = 4)]
    pub jobs: usize,

    #[arg(long = "shelf")]
    pub shelves: Vec<String>,

    #[arg(long)]
    pub limit: Option<usize>,

    #[arg(long, default_value_t = false)]
    pub fail_fast: bool,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct FormulaArgs {
    pub description: String,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CiteArgs {
    pub reference: String,

    #[command(flatten)]
    pub bibtex: BibtexArgs,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/rii-meta")]
    pub cache_root: PathBuf,
}
