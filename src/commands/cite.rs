use std::io::{self, Write};

use anyhow::Result;
use tracing::info;

use rii_meta::citation::Citation;
use rii_meta::util::write_json_stdout;

use super::build_citation_parser;
use crate::cli::CiteArgs;

pub fn run(args: CiteArgs) -> Result<()> {
    let parser = build_citation_parser(&args.bibtex)?;
    let citations = parser.parse(&args.reference, args.bibtex.fetch_bibtex);

    info!(
        citations = citations.len(),
        with_doi = citations.iter().filter(|c| c.doi.is_some()).count(),
        with_bibtex = citations
            .iter()
            .filter(|c| c.bibliography_text.is_some())
            .count(),
        "parsed reference block"
    );

    if args.json {
        return write_json_stdout(&citations);
    }

    write_text_response(&citations)
}

fn write_text_response(citations: &[Citation]) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    for (index, citation) in citations.iter().enumerate() {
        writeln!(output, "[{}] {}", index + 1, citation.display_text)?;
        if let Some(url) = &citation.url {
            writeln!(output, "    url: {url}")?;
        }
        if let Some(doi) = &citation.doi {
            writeln!(output, "    doi: {doi}")?;
        }
        if let Some(bibtex) = &citation.bibliography_text {
            for line in bibtex.lines() {
                writeln!(output, "    {line}")?;
            }
        }
    }

    output.flush()?;
    Ok(())
}
