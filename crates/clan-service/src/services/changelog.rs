//! Change log - human-readable rendering of a reconciliation pass
//!
//! One dated line per change, inserted into the mirror's recent-changes
//! section most recent first.

use chrono::NaiveDate;

use clan_core::changeset::ChangeSet;
use clan_core::traits::{PortResult, RosterMirror};

/// Rendered summary of one pass
#[derive(Debug, Clone)]
pub struct ChangeReport {
    lines: Vec<String>,
    joined: usize,
    left: usize,
    renamed: usize,
    suppressed: bool,
}

impl ChangeReport {
    /// Render a change set as dated changelog lines
    pub fn from_change_set(change_set: &ChangeSet, date: NaiveDate) -> Self {
        let mut lines = Vec::new();
        for rename in &change_set.renamed {
            lines.push(format!(
                "{date}: {} renamed to {}",
                rename.old_name, rename.member.name
            ));
        }
        for member in &change_set.leaving {
            lines.push(format!("{date}: {} left", member.name));
        }
        for member in &change_set.joining {
            lines.push(format!("{date}: {} joined", member.name));
        }
        Self {
            lines,
            joined: change_set.joining.len(),
            left: change_set.leaving.len(),
            renamed: change_set.renamed.len(),
            suppressed: change_set.suppress_external_updates,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whether the pass tripped the safety cap
    pub fn suppressed(&self) -> bool {
        self.suppressed
    }

    /// One-line summary for logs and operator messages
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} joined, {} left, {} renamed",
            self.joined, self.left, self.renamed
        );
        if self.suppressed {
            summary.push_str(" (external updates suppressed - manual review required)");
        }
        summary
    }

    /// Insert the lines into the mirror's recent-changes section
    pub async fn publish(&self, mirror: &dyn RosterMirror) -> PortResult<()> {
        if self.lines.is_empty() {
            return Ok(());
        }
        mirror.insert_changelog(&self.lines).await
    }
}
