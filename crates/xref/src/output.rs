//! Colored terminal output for command results and run summaries.

use console::{Style, Term};

/// Width of the label column in summary rows.
const LABEL_WIDTH: usize = 12;

/// Terminal output formatter.
///
/// Command results (JSON, navigation markup) go to stdout; everything else
/// goes to stderr so results can be piped.
pub(crate) struct Output {
    out: Term,
    err: Term,
    green: Style,
    yellow: Style,
    red: Style,
    bold: Style,
    cyan_bold: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            bold: Style::new().bold(),
            cyan_bold: Style::new().cyan().bold(),
        }
    }

    /// Write a command result to stdout.
    pub(crate) fn result(&self, content: &str) -> std::io::Result<()> {
        self.out.write_line(content)
    }

    pub(crate) fn info(&self, msg: &str) {
        let _ = self.err.write_line(msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        let _ = self.err.write_line(&self.green.apply_to(msg).to_string());
    }

    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.err.write_line(&self.yellow.apply_to(msg).to_string());
    }

    pub(crate) fn error(&self, msg: &str) {
        let _ = self.err.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Print a section title (cyan bold) under a rule.
    pub(crate) fn heading(&self, title: &str) {
        let _ = self.err.write_line(&"-".repeat(48));
        let _ = self
            .err
            .write_line(&self.cyan_bold.apply_to(title).to_string());
    }

    /// Print an aligned `label: count` row.
    pub(crate) fn count(&self, label: &str, value: usize) {
        let _ = self.err.write_line(&format_row(
            label,
            &self.bold.apply_to(value).to_string(),
        ));
    }

    /// Print a yellow row listing `items`, or nothing if there are none.
    pub(crate) fn warn_list(&self, label: &str, items: &[String]) {
        if items.is_empty() {
            return;
        }
        let row = format_row(label, &items.join(", "));
        let _ = self.err.write_line(&self.yellow.apply_to(row).to_string());
    }
}

fn format_row(label: &str, value: &str) -> String {
    format!("  {:<width$} {value}", format!("{label}:"), width = LABEL_WIDTH)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_format_row_aligns_values() {
        assert_eq!(format_row("Pages", "3"), "  Pages:       3");
        assert_eq!(format_row("Ambiguous", "a, b"), "  Ambiguous:   a, b");
    }
}
