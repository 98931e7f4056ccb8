//! Fixed-layout stat records
//!
//! Skills and activities are keyed by a fixed, ordered vocabulary that
//! mirrors the hiscores per-player detail layout: 28 skill rows first,
//! then activity rows with RuneScore at absolute row index 53 and the five
//! clue-scroll counters at rows 54-58. Storing them as fixed arrays gives
//! O(1) field access and makes the "blank" member a plain `Default`.

use serde::{Deserialize, Serialize};

/// Skill vocabulary, in hiscores row order
pub const SKILL_NAMES: [&str; SKILL_COUNT] = [
    "Overall",
    "Attack",
    "Defence",
    "Strength",
    "Constitution",
    "Ranged",
    "Prayer",
    "Magic",
    "Cooking",
    "Woodcutting",
    "Fletching",
    "Fishing",
    "Firemaking",
    "Crafting",
    "Smithing",
    "Mining",
    "Herblore",
    "Agility",
    "Thieving",
    "Slayer",
    "Farming",
    "Runecrafting",
    "Hunter",
    "Construction",
    "Summoning",
    "Dungeoneering",
    "Divination",
    "Invention",
];

/// Activity vocabulary, in hiscores row order; RuneScore is last
pub const ACTIVITY_NAMES: [&str; ACTIVITY_COUNT] = [
    "Bounty Hunter",
    "Bounty Hunter Rogues",
    "Dominion Tower",
    "The Crucible",
    "Castle Wars Games",
    "B.A. Attackers",
    "B.A. Defenders",
    "B.A. Collectors",
    "B.A. Healers",
    "Duel Tournament",
    "Mobilising Armies",
    "Conquest",
    "Fist of Guthix",
    "GG: Athletics",
    "GG: Resource Race",
    "WE2: Armadyl Lifetime Contribution",
    "WE2: Bandos Lifetime Contribution",
    "WE2: Armadyl PvP Kills",
    "WE2: Bandos PvP Kills",
    "Heist Guard Level",
    "Heist Robber Level",
    "CFP: 5 Game Average",
    "AF15: Cow Tipping",
    "AF15: Rats Killed",
    "The Pit",
    "RuneScore",
];

pub const SKILL_COUNT: usize = 28;
pub const ACTIVITY_COUNT: usize = 26;
pub const CLUE_COUNT: usize = 5;

/// Index of the Overall row within [`Skills`]
pub const SKILL_OVERALL: usize = 0;
/// Index of the Constitution row within [`Skills`]
pub const SKILL_CONSTITUTION: usize = 4;
/// Index of RuneScore within [`Activities`]
pub const ACTIVITY_RUNESCORE: usize = ACTIVITY_COUNT - 1;

/// Absolute detail-feed row index where activities begin
pub const ACTIVITY_FIRST_ROW: usize = SKILL_COUNT;
/// Absolute detail-feed row index of RuneScore
pub const RUNESCORE_ROW: usize = 53;
/// Absolute detail-feed row index of the first clue counter
pub const CLUE_FIRST_ROW: usize = 54;

/// One skill row: `rank, level, xp`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SkillStat {
    pub rank: i64,
    pub level: u32,
    pub xp: u64,
}

/// One activity row: `rank, score`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActivityStat {
    pub rank: i64,
    pub score: i64,
}

/// All 28 skills in vocabulary order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Skills(pub [SkillStat; SKILL_COUNT]);

impl Skills {
    #[inline]
    pub fn overall(&self) -> &SkillStat {
        &self.0[SKILL_OVERALL]
    }

    #[inline]
    pub fn constitution(&self) -> &SkillStat {
        &self.0[SKILL_CONSTITUTION]
    }

    /// Iterate `(name, stat)` pairs in vocabulary order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &SkillStat)> {
        SKILL_NAMES.iter().copied().zip(self.0.iter())
    }

    /// True if any skill xp in `self` is strictly below the same skill in
    /// `other` (a monotonicity violation when `self` is the newer snapshot)
    pub fn any_xp_below(&self, other: &Skills) -> bool {
        self.0.iter().zip(other.0.iter()).any(|(a, b)| a.xp < b.xp)
    }
}

/// All 26 activities in vocabulary order (RuneScore last)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Activities(pub [ActivityStat; ACTIVITY_COUNT]);

impl Activities {
    #[inline]
    pub fn runescore(&self) -> i64 {
        self.0[ACTIVITY_RUNESCORE].score
    }

    pub fn set_runescore(&mut self, score: i64) {
        self.0[ACTIVITY_RUNESCORE].score = score;
    }

    /// Iterate `(name, stat)` pairs in vocabulary order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ActivityStat)> {
        ACTIVITY_NAMES.iter().copied().zip(self.0.iter())
    }

    /// True if any score other than RuneScore strictly increased from
    /// `prior` to `self`
    pub fn any_score_above(&self, prior: &Activities) -> bool {
        self.0
            .iter()
            .zip(prior.0.iter())
            .take(ACTIVITY_RUNESCORE)
            .any(|(new, old)| new.score > old.score)
    }
}

/// Clue-scroll completion counters, easiest tier first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClueCounts {
    pub easy: u64,
    pub medium: u64,
    pub hard: u64,
    pub elite: u64,
    pub master: u64,
}

impl ClueCounts {
    pub fn total(&self) -> u64 {
        self.easy + self.medium + self.hard + self.elite + self.master
    }

    pub fn tiers(&self) -> [u64; CLUE_COUNT] {
        [self.easy, self.medium, self.hard, self.elite, self.master]
    }

    /// True if any tier in `self` is strictly below the same tier in `other`
    pub fn any_below(&self, other: &ClueCounts) -> bool {
        self.tiers()
            .iter()
            .zip(other.tiers().iter())
            .any(|(a, b)| a < b)
    }

    /// True if any tier strictly increased from `prior` to `self`
    pub fn any_above(&self, prior: &ClueCounts) -> bool {
        self.tiers()
            .iter()
            .zip(prior.tiers().iter())
            .any(|(a, b)| a > b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_layout_constants() {
        // The detail feed places RuneScore immediately before the clue rows.
        assert_eq!(ACTIVITY_FIRST_ROW + ACTIVITY_RUNESCORE, RUNESCORE_ROW);
        assert_eq!(RUNESCORE_ROW + 1, CLUE_FIRST_ROW);
        assert_eq!(SKILL_NAMES.len(), SKILL_COUNT);
        assert_eq!(ACTIVITY_NAMES.len(), ACTIVITY_COUNT);
        assert_eq!(ACTIVITY_NAMES[ACTIVITY_RUNESCORE], "RuneScore");
    }

    #[test]
    fn test_skill_accessors() {
        let mut skills = Skills::default();
        skills.0[SKILL_OVERALL].xp = 1_000_000;
        skills.0[SKILL_CONSTITUTION].xp = 100_000;
        assert_eq!(skills.overall().xp, 1_000_000);
        assert_eq!(skills.constitution().xp, 100_000);
    }

    #[test]
    fn test_any_xp_below() {
        let mut old = Skills::default();
        old.0[3].xp = 500;
        let mut new = old.clone();
        assert!(!new.any_xp_below(&old));
        new.0[3].xp = 499;
        assert!(new.any_xp_below(&old));
    }

    #[test]
    fn test_runescore_excluded_from_activity_increase() {
        let prior = Activities::default();
        let mut new = Activities::default();
        new.set_runescore(500);
        assert!(!new.any_score_above(&prior));
        new.0[0].score = 1;
        assert!(new.any_score_above(&prior));
    }

    #[test]
    fn test_clue_totals_and_comparisons() {
        let a = ClueCounts {
            easy: 1,
            medium: 2,
            hard: 3,
            elite: 4,
            master: 5,
        };
        assert_eq!(a.total(), 15);

        let mut b = a;
        b.hard = 2;
        assert!(b.any_below(&a));
        assert!(!a.any_below(&b));
        b.hard = 4;
        assert!(b.any_above(&a));
    }
}
