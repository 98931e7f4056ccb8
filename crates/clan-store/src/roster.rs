//! Roster store - the in-memory triple of member lists
//!
//! A member appears in exactly one of the three rosters. Mutations must run
//! under the update coordinator's lock; readers take a [`RosterSnapshot`]
//! instead and never contend with writers.

use clan_core::entities::Member;
use clan_core::error::DomainError;
use clan_core::value_objects::MemberId;

/// Which of the three member collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Roster {
    Current,
    Retired,
    Banned,
}

/// How a search hit matched the query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    OldName,
    Partial,
}

/// One search hit: the member plus how it matched
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub kind: MatchKind,
    pub member: Member,
}

/// Search results across all three rosters
#[derive(Debug, Clone, Default)]
pub struct RosterSearch {
    pub current: Vec<SearchHit>,
    pub retired: Vec<SearchHit>,
    pub banned: Vec<SearchHit>,
}

impl RosterSearch {
    pub fn is_empty(&self) -> bool {
        self.current.is_empty() && self.retired.is_empty() && self.banned.is_empty()
    }
}

/// Deep-copied triple, safe to read outside the lock
#[derive(Debug, Clone, Default)]
pub struct RosterSnapshot {
    pub current: Vec<Member>,
    pub retired: Vec<Member>,
    pub banned: Vec<Member>,
}

/// The in-memory roster triple
#[derive(Debug, Default)]
pub struct RosterStore {
    current: Vec<Member>,
    retired: Vec<Member>,
    banned: Vec<Member>,
}

impl RosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted lists (mirror or backup), re-sorting each
    pub fn from_lists(current: Vec<Member>, retired: Vec<Member>, banned: Vec<Member>) -> Self {
        let mut store = Self {
            current,
            retired,
            banned,
        };
        store.sort_roster(Roster::Current);
        store.sort_roster(Roster::Retired);
        store.sort_roster(Roster::Banned);
        store
    }

    fn list(&self, roster: Roster) -> &Vec<Member> {
        match roster {
            Roster::Current => &self.current,
            Roster::Retired => &self.retired,
            Roster::Banned => &self.banned,
        }
    }

    fn list_mut(&mut self, roster: Roster) -> &mut Vec<Member> {
        match roster {
            Roster::Current => &mut self.current,
            Roster::Retired => &mut self.retired,
            Roster::Banned => &mut self.banned,
        }
    }

    /// First exact match in one roster
    pub fn get(&self, roster: Roster, id: &MemberId) -> Option<&Member> {
        self.list(roster).iter().find(|m| m.matches_id(id))
    }

    /// First exact match in any roster
    pub fn get_any(&self, id: &MemberId) -> Option<(Roster, &Member)> {
        for roster in [Roster::Current, Roster::Retired, Roster::Banned] {
            if let Some(m) = self.get(roster, id) {
                return Some((roster, m));
            }
        }
        None
    }

    /// Exact, old-name, and partial-name matches across the triple
    pub fn search(&self, raw: &str) -> RosterSearch {
        let query = raw.trim().replace('\u{00A0}', " ");
        let search_list = |list: &[Member]| {
            let mut hits = Vec::new();
            for m in list {
                if m.name.matches(&query) {
                    hits.push(SearchHit {
                        kind: MatchKind::Exact,
                        member: m.clone(),
                    });
                } else if m.has_old_name(&query) {
                    hits.push(SearchHit {
                        kind: MatchKind::OldName,
                        member: m.clone(),
                    });
                } else if m.name.contains(&query) {
                    hits.push(SearchHit {
                        kind: MatchKind::Partial,
                        member: m.clone(),
                    });
                }
            }
            hits
        };
        RosterSearch {
            current: search_list(&self.current),
            retired: search_list(&self.retired),
            banned: search_list(&self.banned),
        }
    }

    /// Check the union-wide uniqueness invariants for a candidate member
    fn check_unique(&self, member: &Member) -> Result<(), DomainError> {
        for list in [&self.current, &self.retired, &self.banned] {
            for existing in list {
                if existing.name == member.name {
                    return Err(DomainError::DuplicateName(member.name.to_string()));
                }
                if !member.discord_id.is_none() && existing.discord_id == member.discord_id {
                    return Err(DomainError::DuplicateIdentity(member.discord_id.to_string()));
                }
                if member.profile_link.is_some()
                    && existing.profile_link == member.profile_link
                {
                    return Err(DomainError::DuplicateIdentity(
                        member.profile_link.as_ref().map(ToString::to_string).unwrap_or_default(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Add a member, enforcing uniqueness and keeping the roster sorted
    pub fn add(&mut self, roster: Roster, member: Member) -> Result<(), DomainError> {
        self.check_unique(&member)?;
        self.list_mut(roster).push(member);
        self.sort_roster(roster);
        Ok(())
    }

    /// Remove a member by lookup key
    pub fn remove(&mut self, roster: Roster, id: &MemberId) -> Result<Member, DomainError> {
        let list = self.list_mut(roster);
        let pos = list
            .iter()
            .position(|m| m.matches_id(id))
            .ok_or_else(|| DomainError::MemberNotFound(id.to_string()))?;
        Ok(list.remove(pos))
    }

    /// Move a member between rosters, preserving all fields
    pub fn move_member(
        &mut self,
        from: Roster,
        to: Roster,
        id: &MemberId,
    ) -> Result<(), DomainError> {
        let member = self.remove(from, id)?;
        self.list_mut(to).push(member);
        self.sort_roster(to);
        Ok(())
    }

    /// Atomically install the result of a reconciliation pass
    ///
    /// Readers only ever observe the triple before or after this call,
    /// never a half-applied change set.
    pub fn apply_reconcile(&mut self, new_current: Vec<Member>, retired_additions: Vec<Member>) {
        self.current = new_current;
        self.retired.extend(retired_additions);
        self.sort_roster(Roster::Current);
        self.sort_roster(Roster::Retired);
    }

    /// Deep-copied triple safe to read outside the lock
    pub fn snapshot(&self) -> RosterSnapshot {
        RosterSnapshot {
            current: self.current.clone(),
            retired: self.retired.clone(),
            banned: self.banned.clone(),
        }
    }

    pub fn len(&self, roster: Roster) -> usize {
        self.list(roster).len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty() && self.retired.is_empty() && self.banned.is_empty()
    }

    /// Iterate one roster in stored order
    pub fn iter(&self, roster: Roster) -> impl Iterator<Item = &Member> {
        self.list(roster).iter()
    }

    fn sort_roster(&mut self, roster: Roster) {
        match roster {
            // Current and banned by name; retired newest leavers first.
            Roster::Current => self.current.sort_by(|a, b| a.name.cmp(&b.name)),
            Roster::Banned => self.banned.sort_by(|a, b| a.name.cmp(&b.name)),
            Roster::Retired => self
                .retired
                .sort_by(|a, b| b.leave_date.cmp(&a.leave_date).then_with(|| a.name.cmp(&b.name))),
        }
    }
}
