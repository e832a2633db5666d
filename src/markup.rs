use anyhow::{Context, Result};
use regex::Regex;

/// Removes inline HTML-like markup (`<i>`, `<sub>`, `</a>`, ...) from catalog text.
#[derive(Debug, Clone)]
pub struct MarkupStripper {
    tag: Regex,
}

impl MarkupStripper {
    pub fn new() -> Result<Self> {
        Ok(Self {
            tag: Regex::new(r"</?[^<>]*>").context("failed to compile markup tag regex")?,
        })
    }

    pub fn strip(&self, text: &str) -> String {
        self.tag.replace_all(text, "").into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::MarkupStripper;

    #[test]
    fn strip_removes_opening_closing_and_empty_tags() {
        let stripper = MarkupStripper::new().expect("markup regex should compile");
        assert_eq!(
            stripper.strip("Al<sub>2</sub>O<sub>3</sub> <i>film</i><br/>"),
            "Al2O3 film"
        );
    }

    #[test]
    fn strip_leaves_unbalanced_angle_brackets() {
        let stripper = MarkupStripper::new().expect("markup regex should compile");
        assert_eq!(stripper.strip("n > 1.5"), "n > 1.5");
    }
}
