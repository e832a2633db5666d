use std::io::{self, Write};

use anyhow::Result;

use rii_meta::formula::{FormulaNormalizer, FormulaResult};
use rii_meta::util::write_json_stdout;

use crate::cli::FormulaArgs;

pub fn run(args: FormulaArgs) -> Result<()> {
    let normalizer = FormulaNormalizer::new()?;
    let result = normalizer.normalize(&args.description);

    if args.json {
        return write_json_stdout(&result);
    }

    write_text_response(&args.description, &result)
}

fn write_text_response(description: &str, result: &FormulaResult) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    writeln!(output, "Description: {description}")?;
    writeln!(output, "Formula: {}", result.formula)?;
    if result.elements.is_empty() {
        writeln!(output, "Elements: (none)")?;
    } else {
        let elements: Vec<String> = result
            .elements
            .iter()
            .map(|element| format!("{}={}", element.symbol, element.count))
            .collect();
        writeln!(output, "Elements: {}", elements.join(" "))?;
    }
    if !result.colloquial_names.is_empty() {
        writeln!(output, "Colloquial names: {}", result.colloquial_names.join("; "))?;
    }

    output.flush()?;
    Ok(())
}
