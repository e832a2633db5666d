use std::collections::BTreeMap;

use super::*;

fn normalizer() -> FormulaNormalizer {
    FormulaNormalizer::new().expect("formula regexes should compile")
}

fn pairs(result: &FormulaResult) -> Vec<(&str, u32)> {
    result
        .elements
        .iter()
        .map(|element| (element.symbol.as_str(), element.count))
        .collect()
}

#[test]
fn polymer_notation_yields_repeat_unit_and_both_names() {
    let result = normalizer().normalize("(C8H8)n polystyrene");
    assert_eq!(result.formula, "C8H8");
    assert_eq!(result.colloquial_names, vec!["(C8H8)n", "polystyrene"]);
    assert_eq!(pairs(&result), vec![("C", 8), ("H", 8)]);
}

#[test]
fn polymer_name_in_parentheses_is_trimmed() {
    let result = normalizer().normalize("(C2H4)n (polyethylene)");
    assert_eq!(result.formula, "C2H4");
    assert_eq!(result.colloquial_names, vec!["(C2H4)n", "polyethylene"]);
}

#[test]
fn polymer_without_name_keeps_only_notation_alias() {
    let result = normalizer().normalize("(C5O2H8)n");
    assert_eq!(result.colloquial_names, vec!["(C5O2H8)n"]);
    assert_eq!(result.formula, "C5H8O2");
}

#[test]
fn internal_parentheses_are_not_a_colloquial_name() {
    let result = normalizer().normalize("Mg(OH)2");
    assert!(result.colloquial_names.is_empty());
    assert_eq!(pairs(&result), vec![("H", 2), ("Mg", 1), ("O", 1)]);
    assert_eq!(result.formula, "H2MgO");
}

#[test]
fn words_before_parenthetical_do_not_decompose() {
    let result = normalizer().normalize("Gallium arsenide (GaAs)");
    assert_eq!(result.colloquial_names, vec!["GaAs"]);
    assert_eq!(result.formula, "Galliumarsenide");
    assert!(result.elements.is_empty());
}

#[test]
fn trailing_parenthetical_splits_formula_and_name() {
    let result = normalizer().normalize("SiO<sub>2</sub> (Silicon dioxide, Silica, Quartz)");
    assert_eq!(result.formula, "O2Si");
    assert_eq!(
        result.colloquial_names,
        vec!["Silicon dioxide, Silica, Quartz"]
    );
    assert_eq!(result.atom_types(), vec!["O", "Si"]);
}

#[test]
fn unbalanced_parenthesis_falls_back_to_whole_text() {
    let result = normalizer().normalize("SiO2 (amorphous");
    assert!(result.colloquial_names.is_empty());
    assert_eq!(result.formula, "SiO2amorphous");
    assert!(result.elements.is_empty());
}

#[test]
fn markup_is_stripped_before_cleaning() {
    let result = normalizer().normalize("Al<sub>2</sub>O<sub>3</sub>");
    assert_eq!(result.formula, "Al2O3");
    assert_eq!(pairs(&result), vec![("Al", 2), ("O", 3)]);
}

#[test]
fn plain_description_without_parentheses_has_no_names() {
    let result = normalizer().normalize("GaAs");
    assert!(result.colloquial_names.is_empty());
    assert_eq!(result.formula, "AsGa");
}

#[test]
fn repeated_symbols_are_summed() {
    let result = normalizer().normalize("CH3CH2OH");
    assert_eq!(result.formula, "C2H6O");
    assert_eq!(pairs(&result), vec![("C", 2), ("H", 6), ("O", 1)]);
}

#[test]
fn hill_order_places_carbon_then_hydrogen_then_alphabetical() {
    let result = normalizer().normalize("BrOH2C");
    assert_eq!(result.atom_types(), vec!["C", "H", "Br", "O"]);

    let result = normalizer().normalize("CCl4");
    assert_eq!(result.atom_types(), vec!["C", "Cl"]);
}

#[test]
fn hill_order_without_carbon_is_alphabetical_including_hydrogen() {
    let result = normalizer().normalize("NaOH");
    assert_eq!(result.atom_types(), vec!["H", "Na", "O"]);
}

#[test]
fn hill_order_holds_for_assorted_multisets() {
    let cases: Vec<Vec<(&str, u32)>> = vec![
        vec![("Zn", 1), ("C", 2), ("H", 4), ("Ag", 3)],
        vec![("O", 2), ("C", 1)],
        vec![("H", 1), ("Te", 2), ("Cd", 1)],
        vec![("U", 1), ("F", 6)],
        vec![("C", 60)],
    ];

    for case in cases {
        let totals: BTreeMap<String, u32> = case
            .iter()
            .map(|(symbol, count)| (symbol.to_string(), *count))
            .collect();
        let ordered = hill_order(totals);
        let symbols: Vec<&str> = ordered.iter().map(|e| e.symbol.as_str()).collect();

        let mut rest: &[&str] = &symbols;
        if symbols.contains(&"C") {
            assert_eq!(symbols[0], "C");
            rest = &symbols[1..];
            if symbols.contains(&"H") {
                assert_eq!(symbols[1], "H");
                rest = &symbols[2..];
            }
        }
        assert!(
            rest.windows(2).all(|pair| pair[0] < pair[1]),
            "not strictly ascending: {symbols:?}"
        );
    }
}

#[test]
fn count_of_one_renders_as_bare_symbol() {
    assert_eq!(ElementCount::new("O", 1).to_string(), "O");
    assert_eq!(ElementCount::new("O", 2).to_string(), "O2");
    assert_eq!(ElementCount::new("Si", 12).to_string(), "Si12");
    assert_eq!(
        render_formula(&[ElementCount::new("C", 1), ElementCount::new("H", 4)]),
        "CH4"
    );
}

#[test]
fn normalizing_canonical_formula_is_idempotent() {
    let normalizer = normalizer();
    for description in [
        "(C8H8)n polystyrene",
        "Mg(OH)2",
        "Al<sub>2</sub>O<sub>3</sub> (Sapphire)",
        "CH3COOH",
        "Ba(NO3)2",
    ] {
        let first = normalizer.normalize(description);
        let second = normalizer.normalize(&first.formula);
        assert_eq!(first.elements, second.elements, "input {description}");
        assert_eq!(first.formula, second.formula, "input {description}");
    }
}

#[test]
fn two_letter_symbols_win_over_single_letters() {
    let result = normalizer().normalize("Si");
    assert_eq!(pairs(&result), vec![("Si", 1)]);

    let result = normalizer().normalize("CoO");
    assert_eq!(pairs(&result), vec![("Co", 1), ("O", 1)]);

    let result = normalizer().normalize("CO2");
    assert_eq!(pairs(&result), vec![("C", 1), ("O", 2)]);
}

#[test]
fn isotope_symbols_are_recognised() {
    let result = normalizer().normalize("D2O (Heavy water)");
    assert_eq!(result.formula, "D2O");
    assert_eq!(result.colloquial_names, vec!["Heavy water"]);
}

#[test]
fn placeholder_symbol_is_not_an_element() {
    let result = normalizer().normalize("X");
    assert_eq!(result.formula, "X");
    assert!(result.elements.is_empty());
}

#[test]
fn zero_count_rejects_decomposition() {
    let result = normalizer().normalize("H0O");
    assert_eq!(result.formula, "H0O");
    assert!(result.elements.is_empty());
}

#[test]
fn empty_description_yields_empty_result() {
    let result = normalizer().normalize("<i></i>");
    assert_eq!(result.formula, "");
    assert!(result.elements.is_empty());
    assert!(result.colloquial_names.is_empty());
}
