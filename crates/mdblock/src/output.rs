//! Terminal output utilities.

use console::{Style, Term};

/// Terminal output formatter.
///
/// Diagnostics go to stderr; rendered HTML goes to stdout.
pub(crate) struct Output {
    term: Term,
    out: Term,
    red: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            out: Term::stdout(),
            red: Style::new().red(),
        }
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Write rendered HTML to stdout.
    pub(crate) fn html(&self, html: &str) -> std::io::Result<()> {
        self.out.write_line(html)
    }
}
