//! Chemical formula normalisation for material descriptions.
//!
//! A description such as `"Gallium arsenide (GaAs)"` or `"(C8H8)n polystyrene"`
//! is split into a working formula and colloquial names, cleaned down to
//! alphanumerics and, where the whole formula tokenises into element symbols,
//! re-rendered in Hill order.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;

use crate::markup::MarkupStripper;

/// Periodic table symbols, hydrogen through oganesson.
const ELEMENT_SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

/// Deuterium and tritium appear as their own symbols in isotope-labelled materials.
const ISOTOPE_SYMBOLS: [&str; 2] = ["D", "T"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementCount {
    pub symbol: String,
    pub count: u32,
}

impl ElementCount {
    pub fn new(symbol: impl Into<String>, count: u32) -> Self {
        Self {
            symbol: symbol.into(),
            count,
        }
    }
}

impl fmt::Display for ElementCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count > 1 {
            write!(f, "{}{}", self.symbol, self.count)
        } else {
            f.write_str(&self.symbol)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormulaResult {
    pub formula: String,
    pub colloquial_names: Vec<String>,
    pub elements: Vec<ElementCount>,
}

impl FormulaResult {
    pub fn atom_types(&self) -> Vec<&str> {
        self.elements
            .iter()
            .map(|element| element.symbol.as_str())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct FormulaNormalizer {
    markup: MarkupStripper,
    polymer: Regex,
    trailing_name: Regex,
    non_alphanumeric: Regex,
    element_token: Regex,
}

impl FormulaNormalizer {
    pub fn new() -> Result<Self> {
        let mut symbols: Vec<&str> = ELEMENT_SYMBOLS
            .iter()
            .chain(ISOTOPE_SYMBOLS.iter())
            .copied()
            .collect();
        // Two-letter symbols must be tried first so `Si` never splits into `S` + `i`.
        symbols.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));

        Ok(Self {
            markup: MarkupStripper::new()?,
            polymer: Regex::new(r"^\(([^()]+)\)n")
                .context("failed to compile polymer notation regex")?,
            trailing_name: Regex::new(r"^(.*)\(([^()]+)\)$")
                .context("failed to compile trailing colloquial name regex")?,
            non_alphanumeric: Regex::new(r"[^A-Za-z0-9]")
                .context("failed to compile formula cleanup regex")?,
            element_token: Regex::new(&format!(r"({})(\d*)", symbols.join("|")))
                .context("failed to compile element symbol regex")?,
        })
    }

    pub fn normalize(&self, description: &str) -> FormulaResult {
        let text = self.markup.strip(description);
        let (working, colloquial_names) = self.split_colloquial_names(text.trim());
        let cleaned = self
            .non_alphanumeric
            .replace_all(&working, "")
            .into_owned();

        match self.decompose(&cleaned) {
            Some(elements) => FormulaResult {
                formula: render_formula(&elements),
                colloquial_names,
                elements,
            },
            None => FormulaResult {
                formula: cleaned,
                colloquial_names,
                elements: Vec::new(),
            },
        }
    }

    fn split_colloquial_names(&self, text: &str) -> (String, Vec<String>) {
        if let Some(repeat_unit) = self
            .polymer
            .captures(text)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str())
        {
            let mut names = vec![format!("({repeat_unit})n")];
            let tail = text
                .rsplit_once(")n")
                .map(|(_, tail)| tail)
                .unwrap_or_default()
                .trim_matches(|c: char| c == '(' || c == ')' || c.is_whitespace());
            if !tail.is_empty() {
                names.push(tail.to_string());
            }
            return (repeat_unit.to_string(), names);
        }

        let Some(captures) = self.trailing_name.captures(text) else {
            return (text.to_string(), Vec::new());
        };
        let working = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        let name = captures
            .get(2)
            .map(|m| m.as_str().trim())
            .unwrap_or_default();

        let names = if name.is_empty() {
            Vec::new()
        } else {
            vec![name.to_string()]
        };
        (working.to_string(), names)
    }

    /// Tokenises `formula` into element symbols with optional counts.
    ///
    /// Returns `None` unless the tokens cover the whole string, so words such as
    /// `Galliumarsenide` are never mistaken for a partial formula.
    fn decompose(&self, formula: &str) -> Option<Vec<ElementCount>> {
        if formula.is_empty() {
            return None;
        }

        let mut totals = BTreeMap::<String, u32>::new();
        let mut cursor = 0usize;

        for captures in self.element_token.captures_iter(formula) {
            let token = captures.get(0)?;
            if token.start() != cursor {
                return None;
            }
            cursor = token.end();

            let symbol = captures.get(1)?.as_str();
            let count = match captures.get(2).map(|m| m.as_str()) {
                Some(digits) if !digits.is_empty() => {
                    digits.parse::<u32>().ok().filter(|count| *count > 0)?
                }
                _ => 1,
            };

            let total = totals.entry(symbol.to_string()).or_insert(0);
            *total = total.checked_add(count)?;
        }

        if cursor != formula.len() {
            return None;
        }

        Some(hill_order(totals))
    }
}

/// Orders aggregated element counts by the Hill system: carbon, then hydrogen,
/// then everything else alphabetically. Without carbon the order is purely
/// alphabetical.
pub fn hill_order(totals: BTreeMap<String, u32>) -> Vec<ElementCount> {
    let mut remaining = totals;
    let mut ordered = Vec::with_capacity(remaining.len());

    if let Some(carbon) = remaining.remove("C") {
        ordered.push(ElementCount::new("C", carbon));
        if let Some(hydrogen) = remaining.remove("H") {
            ordered.push(ElementCount::new("H", hydrogen));
        }
    }

    ordered.extend(
        remaining
            .into_iter()
            .map(|(symbol, count)| ElementCount { symbol, count }),
    );
    ordered
}

pub fn render_formula(elements: &[ElementCount]) -> String {
    elements.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests;
