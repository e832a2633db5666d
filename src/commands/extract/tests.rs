use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::*;
use crate::cli::BibtexArgs;

const LIBRARY: &str = r#"
- SHELF: main
  name: "MAIN"
  content:
    - BOOK: Ag
      name: "Ag (Silver)"
      content:
        - PAGE: Johnson
          name: "Johnson and Christy 1972: n,k 0.188-1.94 µm"
          data: "main/Ag/Johnson.yml"
    - BOOK: Al2O3
      name: "Al<sub>2</sub>O<sub>3</sub> (Sapphire)"
      content:
        - PAGE: Malitson-o
          name: "Malitson and Dodge 1972: n(o)"
          data: "main/Al2O3/Malitson-o.yml"
        - PAGE: Malitson-e
          name: "Malitson and Dodge 1972: n(e)"
          data: "main/Al2O3/Malitson-e.yml"
    - BOOK: KTiOPO4
      name: "KTiOPO<sub>4</sub> (Potassium titanyl phosphate, KTP)"
      content:
        - PAGE: Kato-alpha
          name: "Kato and Takaoka 2002: n(α)"
          data: "main/KTiOPO4/Kato-alpha.yml"
        - PAGE: Kato-beta
          name: "Kato and Takaoka 2002: n(β)"
          data: "main/KTiOPO4/Kato-beta.yml"
        - PAGE: Kato-gamma
          name: "Kato and Takaoka 2002: n(γ)"
          data: "main/KTiOPO4/Kato-gamma.yml"
    - BOOK: CaCO3
      name: "CaCO<sub>3</sub> (Calcite)"
      content:
        - PAGE: Ghosh-o
          name: "Ghosh 1999: n(o)"
          data: "main/CaCO3/Ghosh-o.yml"
- SHELF: organic
  name: "ORGANIC"
  content:
    - BOOK: C8H8
      name: "(C8H8)n polystyrene"
      content:
        - PAGE: Sultanova
          name: "Sultanova et al. 2009"
          data: "organic/C8H8/Sultanova.yml"
"#;

const JOHNSON_DATA: &str = r#"REFERENCES: "1) P. B. Johnson and R. W. Christy. <a href=\"https://doi.org/10.1103/PhysRevB.6.4370\">Phys. Rev. B <b>6</b>, 4370 (1972)</a><br>2) Tabulated at <a href=\"https://example.org/johnson.txt\">example.org</a>"
DATA:
  - type: tabulated nk
    data: |
        0.1879 1.07 1.212
"#;

fn write_database(root: &Path) {
    fs::write(root.join("library.yml"), LIBRARY).expect("write library");
    let johnson = root.join("data/main/Ag/Johnson.yml");
    fs::create_dir_all(johnson.parent().expect("parent")).expect("mkdir");
    fs::write(&johnson, JOHNSON_DATA).expect("write data file");
}

fn args(root: &Path, output_root: PathBuf, manifest: PathBuf) -> ExtractArgs {
    ExtractArgs {
        database_root: root.to_path_buf(),
        output_root,
        cache_root: root.join("cache"),
        run_manifest_path: Some(manifest),
        with_references: true,
        bibtex: BibtexArgs {
            fetch_bibtex: false,
            resolver_url: "https://doi.org".to_string(),
            timeout_secs: 30,
            user_agent: None,
        },
        jobs: 2,
        shelves: Vec::new(),
        limit: None,
        fail_fast: false,
        dry_run: false,
    }
}

fn read_json(path: &Path) -> Value {
    let raw = fs::read_to_string(path)
        .unwrap_or_else(|error| panic!("failed to read {}: {error}", path.display()));
    serde_json::from_str(&raw).expect("valid json")
}

#[test]
fn extract_writes_primary_records_and_reports_failures() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    write_database(root);
    let output_root = root.join("out");
    let manifest_path = root.join("run.json");

    run(args(root, output_root.clone(), manifest_path.clone())).expect("extract should finish");

    let manifest = read_json(&manifest_path);
    let counts = &manifest["counts"];
    assert_eq!(counts["records_total"], 8);
    assert_eq!(counts["single_count"], 2);
    assert_eq!(counts["uniaxial_count"], 1);
    assert_eq!(counts["biaxial_count"], 1);
    assert_eq!(counts["skipped_secondary_count"], 3);
    assert_eq!(counts["failed_count"], 1);
    assert_eq!(counts["documents_written"], 4);
    assert_eq!(counts["citations_parsed"], 2);
    assert_eq!(manifest["status"], "completed_with_failures");

    let warnings = manifest["warnings"].as_array().expect("warnings array");
    assert!(
        warnings
            .iter()
            .any(|w| w.as_str().is_some_and(|w| w.contains("Ghosh-e.yml")))
    );

    assert!(!output_root.join("main/Al2O3-Malitson-e.json").exists());
    assert!(!output_root.join("main/CaCO3-Ghosh-o.json").exists());
}

#[test]
fn extract_documents_carry_formula_links_and_references() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    write_database(root);
    let output_root = root.join("out");

    run(args(root, output_root.clone(), root.join("run.json"))).expect("extract should finish");

    let silver = read_json(&output_root.join("main/Ag-Johnson.json"));
    assert_eq!(silver["/entry/sample/chemical_formula"], "Ag");
    assert_eq!(silver["/entry/sample/colloquial_name"], "Silver");
    assert_eq!(silver["/entry/dispersion_type"], "isotropic");
    assert_eq!(
        silver["/entry/REFERENCES[reference]/doi"],
        "10.1103/PhysRevB.6.4370"
    );
    assert_eq!(
        silver["/entry/REFERENCES[reference1]/url"],
        "https://example.org/johnson.txt"
    );
    assert_eq!(
        silver["/entry/REFERENCES[reference]/text"],
        "P. B. Johnson and R. W. Christy. Phys. Rev. B 6, 4370 (1972)"
    );

    let sapphire = read_json(&output_root.join("main/Al2O3-Malitson-o.json"));
    assert_eq!(sapphire["/entry/sample/chemical_formula"], "Al2O3");
    assert_eq!(sapphire["/entry/dispersion_type"], "uniaxial");
    assert!(
        sapphire["/entry/dispersion_z"]
            .as_str()
            .is_some_and(|path| path.ends_with("data/main/Al2O3/Malitson-e.yml"))
    );

    let ktp = read_json(&output_root.join("main/KTiOPO4-Kato-alpha.json"));
    assert_eq!(ktp["/entry/sample/chemical_formula"], "KO5PTi");
    assert_eq!(ktp["/entry/sample/atom_types"], "K,O,P,Ti");
    assert!(
        ktp["/entry/dispersion_y"]
            .as_str()
            .is_some_and(|path| path.ends_with("Kato-beta.yml"))
    );

    let polystyrene = read_json(&output_root.join("organic/C8H8-Sultanova.json"));
    assert_eq!(polystyrene["/entry/sample/chemical_formula"], "C8H8");
    assert_eq!(
        polystyrene["/entry/sample/colloquial_name"],
        "(C8H8)n, polystyrene"
    );
}

#[test]
fn extract_fail_fast_stops_on_catalog_inconsistency() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    write_database(root);

    let mut args = args(root, root.join("out"), root.join("run.json"));
    args.fail_fast = true;

    let error = run(args).expect_err("missing Ghosh-e sibling should abort");
    assert!(format!("{error:#}").contains("Ghosh-e.yml"));
    assert!(!root.join("run.json").exists());
}

#[test]
fn extract_dry_run_writes_only_the_manifest() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    write_database(root);
    let output_root = root.join("out");

    let mut args = args(root, output_root.clone(), root.join("run.json"));
    args.dry_run = true;
    args.shelves = vec!["organic".to_string()];
    run(args).expect("dry run should finish");

    assert!(!output_root.exists());
    let manifest = read_json(&root.join("run.json"));
    assert_eq!(manifest["counts"]["records_total"], 1);
    assert_eq!(manifest["counts"]["documents_written"], 1);
    assert_eq!(manifest["status"], "completed");
}

#[test]
fn select_records_filters_by_shelf_and_limit() {
    let records = rii_meta::catalog::parse_library(LIBRARY).expect("library should parse");
    let catalog = Catalog::from_records(records);

    assert_eq!(select_records(&catalog, &[], None).len(), 8);
    assert_eq!(select_records(&catalog, &["organic".to_string()], None).len(), 1);
    assert_eq!(select_records(&catalog, &[], Some(3)).len(), 3);
}

#[test]
fn render_extract_command_includes_bibtex_flags_when_enabled() {
    let mut args = args(Path::new("db"), PathBuf::from("out"), PathBuf::from("run.json"));
    args.bibtex.fetch_bibtex = true;
    args.shelves = vec!["main".to_string()];

    let command = render_extract_command(&args);
    assert!(command.starts_with("rii-meta extract --database-root db"));
    assert!(command.contains("--with-references"));
    assert!(command.contains("--fetch-bibtex --resolver-url https://doi.org --timeout-secs 30"));
    assert!(command.contains("--shelf main"));
    assert!(!command.contains("--user-agent"));
}

#[test]
fn render_extract_command_keeps_custom_user_agent() {
    let mut args = args(Path::new("db"), PathBuf::from("out"), PathBuf::from("run.json"));
    args.bibtex.fetch_bibtex = true;
    args.bibtex.user_agent = Some("catalog-bot/2".to_string());

    let command = render_extract_command(&args);
    assert!(command.contains("--timeout-secs 30 --user-agent catalog-bot/2"));
}
