//! Domain entities - core business objects

mod member;
mod row;
mod stats;

pub use member::{rename_match_score, Member, DEFAULT_LEAVE_REASON};
pub use row::{RowError, DATETIME_FMT, DATE_FMT, ROW_COLUMNS, ROW_HEADER, TIME_FMT};
pub use stats::{
    Activities, ActivityStat, ClueCounts, Skills, SkillStat, ACTIVITY_COUNT, ACTIVITY_FIRST_ROW,
    ACTIVITY_NAMES, ACTIVITY_RUNESCORE, CLUE_COUNT, CLUE_FIRST_ROW, RUNESCORE_ROW,
    SKILL_CONSTITUTION, SKILL_COUNT, SKILL_NAMES, SKILL_OVERALL,
};
