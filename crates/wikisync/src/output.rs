//! Colored terminal output on stderr.

use console::{Style, Term};
use wikisync_sync::{DocumentStatus, SyncReport};

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
    dim: Style,
    cyan_bold: Style,
}

impl Output {
    /// Create a new output formatter writing to stderr.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            dim: Style::new().dim(),
            cyan_bold: Style::new().cyan().bold(),
        }
    }

    /// Print an info message.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        self.styled(&self.red, msg);
    }

    /// Print a highlighted message (cyan bold).
    pub(crate) fn highlight(&self, msg: &str) {
        self.styled(&self.cyan_bold, msg);
    }

    /// Print one line per document and the run totals.
    pub(crate) fn report(&self, report: &SyncReport) {
        for doc in &report.documents {
            let name = doc.path.display();
            let path = doc.titles.join(" / ");
            match &doc.status {
                DocumentStatus::Synced { leaf_id, writes, .. } => {
                    let line = format!("  ok      {path} ({leaf_id}, {writes} write(s))");
                    self.styled(&self.green, &line);
                }
                DocumentStatus::Skipped { reason } => {
                    self.styled(&self.yellow, &format!("  skipped {name}: {reason}"));
                }
                DocumentStatus::Failed { error } => {
                    self.styled(&self.red, &format!("  failed  {name}: {error}"));
                }
                DocumentStatus::NotAttempted => {
                    self.styled(&self.dim, &format!("  pending {name}"));
                }
            }
        }

        self.info(&format!(
            "\nPages: {} created, {} updated, {} unchanged",
            report.created, report.updated, report.unchanged
        ));
        let totals = format!(
            "Documents: {} synced, {} skipped, {} failed, {} not attempted",
            report.synced(),
            report.skipped(),
            report.failed(),
            report.not_attempted()
        );
        if report.is_success() {
            self.styled(&self.green, &totals);
        } else {
            self.styled(&self.red, &totals);
        }
    }

    fn styled(&self, style: &Style, msg: &str) {
        let _ = self.term.write_line(&style.apply_to(msg).to_string());
    }
}
