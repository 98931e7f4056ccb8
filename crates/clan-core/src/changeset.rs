//! Change set - the four-way classification produced by a reconciliation pass

use serde::{Deserialize, Serialize};

use crate::entities::Member;

/// A detected rename: the stored identity continued under a new name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rename {
    /// The name the member was stored under before the pass
    pub old_name: String,
    /// The member as they now appear, identity fields carried over
    pub member: Member,
}

/// Classification of every entity considered by one reconciliation pass
///
/// The four classes partition the set of members considered: no member
/// appears in two of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub joining: Vec<Member>,
    pub leaving: Vec<Member>,
    pub renamed: Vec<Rename>,
    pub staying: Vec<Member>,
    /// Set when the leaver count tripped the safety cap; external rank
    /// updates must be suppressed and an operator notified.
    pub suppress_external_updates: bool,
}

impl ChangeSet {
    /// Whether the pass changed nothing
    pub fn is_empty(&self) -> bool {
        self.joining.is_empty() && self.leaving.is_empty() && self.renamed.is_empty()
    }

    /// Total number of members classified
    pub fn total_classified(&self) -> usize {
        self.joining.len() + self.leaving.len() + self.renamed.len() + self.staying.len()
    }
}
