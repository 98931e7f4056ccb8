//! Mirror row codec
//!
//! The mirrored tabular document stores one member per row in a fixed
//! 20-column order. Serialization must round-trip exactly: parsing a
//! serialized row and serializing it again yields the identical cells.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::value_objects::{DiscordId, IngameRank, PlayerName, ProfileLink, SiteRank, NO_SITE};

use super::member::Member;

/// Calendar date cell format
pub const DATE_FMT: &str = "%Y-%m-%d";
/// Time-of-day format (used in file names and markers)
pub const TIME_FMT: &str = "%H.%M.%S";
/// Datetime cell format
pub const DATETIME_FMT: &str = "%Y-%m-%d_%H.%M.%S";

/// Number of columns in a member row
pub const ROW_COLUMNS: usize = 20;

/// Header row of every member tab
pub const ROW_HEADER: [&str; ROW_COLUMNS] = [
    "Name",
    "Ingame Rank",
    "Discord Rank",
    "Site Rank",
    "Join Date",
    "Passed Gem",
    "Site Profile",
    "Leave Date",
    "Leave Reason",
    "Referral",
    "Discord ID",
    "Discord Name",
    "Old Names",
    "Last Active",
    "ID",
    "Entry ID",
    "Warning Points",
    "Note1",
    "Note2",
    "Note3",
];

/// Error when decoding a member row
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("row has {0} columns, expected {ROW_COLUMNS}")]
    WrongColumnCount(usize),

    #[error("bad {column} cell {value:?}")]
    BadCell { column: &'static str, value: String },
}

fn bad(column: &'static str, value: &str) -> RowError {
    RowError::BadCell {
        column,
        value: value.to_string(),
    }
}

fn fmt_date(d: Option<NaiveDate>) -> String {
    d.map(|d| d.format(DATE_FMT).to_string()).unwrap_or_default()
}

fn parse_date(column: &'static str, cell: &str) -> Result<Option<NaiveDate>, RowError> {
    if cell.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(cell, DATE_FMT)
        .map(Some)
        .map_err(|_| bad(column, cell))
}

fn fmt_datetime(t: Option<DateTime<Utc>>) -> String {
    t.map(|t| t.format(DATETIME_FMT).to_string()).unwrap_or_default()
}

fn parse_datetime(column: &'static str, cell: &str) -> Result<Option<DateTime<Utc>>, RowError> {
    if cell.is_empty() {
        return Ok(None);
    }
    NaiveDateTime::parse_from_str(cell, DATETIME_FMT)
        .map(|t| Some(t.and_utc()))
        .map_err(|_| bad(column, cell))
}

impl Member {
    /// Serialize to the 20-column mirror row
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.name.to_string(),
            self.rank_ingame.to_string(),
            self.rank_discord.clone(),
            self.rank_site.to_string(),
            fmt_date(self.join_date),
            if self.passed_gem { "TRUE" } else { "FALSE" }.to_string(),
            self.profile_link
                .as_ref()
                .map_or_else(|| NO_SITE.to_string(), ToString::to_string),
            fmt_date(self.leave_date),
            self.leave_reason.clone(),
            self.referral.clone(),
            self.discord_id.to_string(),
            self.discord_name.clone(),
            self.old_names.join(","),
            fmt_datetime(self.last_active),
            self.row_id.clone(),
            self.entry_id.clone(),
            self.warning_points.to_string(),
            self.notes[0].clone(),
            self.notes[1].clone(),
            self.notes[2].clone(),
        ]
    }

    /// Decode a member from a mirror row
    ///
    /// Stats are not part of the row contract; they are restored from local
    /// backups or refreshed from the hiscores on the next pass.
    pub fn from_row(site_base: &str, row: &[String]) -> Result<Self, RowError> {
        if row.len() != ROW_COLUMNS {
            return Err(RowError::WrongColumnCount(row.len()));
        }

        let name = PlayerName::parse(&row[0]).map_err(|_| bad("Name", &row[0]))?;
        let mut member = Member::new(name);

        member.rank_ingame = row[1]
            .parse::<IngameRank>()
            .map_err(|_| bad("Ingame Rank", &row[1]))?;
        member.rank_discord = row[2].clone();
        member.rank_site = row[3]
            .parse::<SiteRank>()
            .map_err(|_| bad("Site Rank", &row[3]))?;
        member.join_date = parse_date("Join Date", &row[4])?;
        member.passed_gem = match row[5].as_str() {
            "TRUE" => true,
            "FALSE" => false,
            other => return Err(bad("Passed Gem", other)),
        };
        member.profile_link = ProfileLink::from_row_cell(site_base, &row[6])
            .map_err(|_| bad("Site Profile", &row[6]))?;
        member.leave_date = parse_date("Leave Date", &row[7])?;
        member.leave_reason = row[8].clone();
        member.referral = row[9].clone();
        member.discord_id =
            DiscordId::from_row_cell(&row[10]).map_err(|_| bad("Discord ID", &row[10]))?;
        member.discord_name = row[11].clone();
        member.old_names = row[12]
            .split(',')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        member.last_active = parse_datetime("Last Active", &row[13])?;
        member.row_id = row[14].clone();
        member.entry_id = row[15].clone();
        member.warning_points = row[16]
            .parse()
            .map_err(|_| bad("Warning Points", &row[16]))?;
        member.notes = [row[17].clone(), row[18].clone(), row[19].clone()];

        Ok(member)
    }
}
