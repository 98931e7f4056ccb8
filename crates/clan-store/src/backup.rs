//! Local backup files
//!
//! Each roster is mirrored to `backup_memberlists/{current|old|banned}_members/<YYYY-MM-DD>`:
//! one member per line, fields tab-separated, with the stat collections
//! (skills, activities, clue counts, notify stats, discord roles, warnings,
//! misc) rendered as bracketed list literals. Writes go to a temp file and
//! are renamed into place so a crash never leaves a torn backup.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, warn};

use clan_core::entities::{Member, DATE_FMT};
use clan_core::error::DomainError;
use clan_core::value_objects::Warning;

use crate::roster::RosterSnapshot;

/// Subdirectory per roster
const ROSTER_DIRS: [&str; 3] = ["current_members", "old_members", "banned_members"];

/// Number of tab-separated fields per backup line: the 20 mirror columns
/// plus clan xp, kills, and the seven bracketed collections.
const BACKUP_FIELDS: usize = 29;

/// A parsed bracketed literal: an atom or a nested list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BracketValue {
    Atom(String),
    List(Vec<BracketValue>),
}

impl BracketValue {
    fn as_atom(&self) -> Result<&str, BackupError> {
        match self {
            Self::Atom(s) => Ok(s),
            Self::List(_) => Err(BackupError::Shape("expected atom, found list")),
        }
    }

    fn as_list(&self) -> Result<&[BracketValue], BackupError> {
        match self {
            Self::List(items) => Ok(items),
            Self::Atom(_) => Err(BackupError::Shape("expected list, found atom")),
        }
    }

    fn parse_atom<T: std::str::FromStr>(&self) -> Result<T, BackupError> {
        self.as_atom()?
            .parse()
            .map_err(|_| BackupError::Shape("atom failed to parse"))
    }
}

/// Errors raised by the backup codec
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("unbalanced brackets at byte {0}")]
    Unbalanced(usize),

    #[error("backup line has {0} fields, expected {BACKUP_FIELDS}")]
    WrongFieldCount(usize),

    #[error("malformed backup field: {0}")]
    Shape(&'static str),

    #[error("bad member row in backup: {0}")]
    Row(#[from] clan_core::entities::RowError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<BackupError> for DomainError {
    fn from(err: BackupError) -> Self {
        DomainError::Persistence(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Bracketed list literals
// ---------------------------------------------------------------------------

/// Free-text atoms must not contain the structural characters.
fn sanitize_atom(s: &str) -> String {
    s.replace(',', ";").replace('[', "(").replace(']', ")").replace('\t', " ")
}

fn render_list<I: IntoIterator<Item = String>>(items: I) -> String {
    let inner: Vec<String> = items.into_iter().collect();
    format!("[{}]", inner.join(", "))
}

/// Parse one bracketed literal (nested lists of comma-separated atoms)
pub fn parse_bracket(input: &str) -> Result<BracketValue, BackupError> {
    let chars: Vec<char> = input.trim().chars().collect();
    let mut pos = 0usize;
    let value = parse_value(&chars, &mut pos)?;
    skip_ws(&chars, &mut pos);
    if pos != chars.len() {
        return Err(BackupError::Unbalanced(pos));
    }
    Ok(value)
}

fn skip_ws(chars: &[char], pos: &mut usize) {
    while chars.get(*pos).is_some_and(|c| c.is_whitespace()) {
        *pos += 1;
    }
}

fn parse_value(chars: &[char], pos: &mut usize) -> Result<BracketValue, BackupError> {
    skip_ws(chars, pos);
    if chars.get(*pos) == Some(&'[') {
        *pos += 1;
        let mut items = Vec::new();
        loop {
            skip_ws(chars, pos);
            match chars.get(*pos) {
                Some(']') => {
                    *pos += 1;
                    return Ok(BracketValue::List(items));
                }
                Some(',') => {
                    *pos += 1;
                }
                Some(_) => items.push(parse_value(chars, pos)?),
                None => return Err(BackupError::Unbalanced(*pos)),
            }
        }
    } else {
        // Atom: runs until a structural character at this nesting level.
        let start = *pos;
        while let Some(c) = chars.get(*pos) {
            if *c == ',' || *c == ']' || *c == '[' {
                break;
            }
            *pos += 1;
        }
        if *pos == start {
            return Err(BackupError::Unbalanced(*pos));
        }
        let atom: String = chars[start..*pos].iter().collect();
        Ok(BracketValue::Atom(atom.trim().to_string()))
    }
}

// ---------------------------------------------------------------------------
// Member <-> backup line
// ---------------------------------------------------------------------------

/// Render one member as a backup line
pub fn member_to_backup_line(member: &Member) -> String {
    let mut fields: Vec<String> = member
        .to_row()
        .into_iter()
        .map(|cell| cell.replace('\t', " "))
        .collect();

    fields.push(member.clan_xp.to_string());
    fields.push(member.kills.to_string());
    fields.push(render_list(member.skills.0.iter().map(|s| {
        render_list([s.rank.to_string(), s.level.to_string(), s.xp.to_string()])
    })));
    fields.push(render_list(
        member
            .activities
            .0
            .iter()
            .map(|a| render_list([a.rank.to_string(), a.score.to_string()])),
    ));
    fields.push(render_list(
        member.clue_counts.tiers().iter().map(ToString::to_string),
    ));
    fields.push(render_list(member.notify_stats.iter().map(|s| sanitize_atom(s))));
    fields.push(render_list(member.discord_roles.iter().map(ToString::to_string)));
    fields.push(render_list(member.warnings.iter().map(|w| {
        render_list([
            w.points.to_string(),
            w.expires.format(DATE_FMT).to_string(),
            sanitize_atom(&w.reason),
        ])
    })));
    fields.push(render_list(member.misc.iter().map(|(k, v)| {
        render_list([sanitize_atom(k), sanitize_atom(v)])
    })));

    fields.join("\t")
}

/// Parse one backup line back into a member
pub fn member_from_backup_line(site_base: &str, line: &str) -> Result<Member, BackupError> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != BACKUP_FIELDS {
        return Err(BackupError::WrongFieldCount(fields.len()));
    }

    let row: Vec<String> = fields[..20].iter().map(ToString::to_string).collect();
    let mut member = Member::from_row(site_base, &row)?;

    member.clan_xp = fields[20]
        .parse()
        .map_err(|_| BackupError::Shape("clan xp"))?;
    member.kills = fields[21]
        .parse()
        .map_err(|_| BackupError::Shape("kills"))?;

    for (i, triple) in parse_bracket(fields[22])?.as_list()?.iter().enumerate() {
        let triple = triple.as_list()?;
        if triple.len() != 3 || i >= member.skills.0.len() {
            return Err(BackupError::Shape("skill triple"));
        }
        member.skills.0[i].rank = triple[0].parse_atom()?;
        member.skills.0[i].level = triple[1].parse_atom()?;
        member.skills.0[i].xp = triple[2].parse_atom()?;
    }

    for (i, pair) in parse_bracket(fields[23])?.as_list()?.iter().enumerate() {
        let pair = pair.as_list()?;
        if pair.len() != 2 || i >= member.activities.0.len() {
            return Err(BackupError::Shape("activity pair"));
        }
        member.activities.0[i].rank = pair[0].parse_atom()?;
        member.activities.0[i].score = pair[1].parse_atom()?;
    }

    let clues = parse_bracket(fields[24])?;
    let clues = clues.as_list()?;
    if clues.len() != 5 {
        return Err(BackupError::Shape("clue counters"));
    }
    member.clue_counts.easy = clues[0].parse_atom()?;
    member.clue_counts.medium = clues[1].parse_atom()?;
    member.clue_counts.hard = clues[2].parse_atom()?;
    member.clue_counts.elite = clues[3].parse_atom()?;
    member.clue_counts.master = clues[4].parse_atom()?;

    member.notify_stats = parse_bracket(fields[25])?
        .as_list()?
        .iter()
        .map(|v| v.as_atom().map(ToString::to_string))
        .collect::<Result<_, _>>()?;

    member.discord_roles = parse_bracket(fields[26])?
        .as_list()?
        .iter()
        .map(BracketValue::parse_atom)
        .collect::<Result<_, _>>()?;

    member.warnings = parse_bracket(fields[27])?
        .as_list()?
        .iter()
        .map(|w| {
            let w = w.as_list()?;
            if w.len() != 3 {
                return Err(BackupError::Shape("warning triple"));
            }
            let expires = NaiveDate::parse_from_str(w[1].as_atom()?, DATE_FMT)
                .map_err(|_| BackupError::Shape("warning expiry"))?;
            Ok(Warning::new(w[0].parse_atom()?, expires, w[2].as_atom()?))
        })
        .collect::<Result<_, _>>()?;

    for pair in parse_bracket(fields[28])?.as_list()? {
        let pair = pair.as_list()?;
        if pair.len() != 2 {
            return Err(BackupError::Shape("misc pair"));
        }
        member
            .misc
            .insert(pair[0].as_atom()?.to_string(), pair[1].as_atom()?.to_string());
    }

    Ok(member)
}

// ---------------------------------------------------------------------------
// Backup files
// ---------------------------------------------------------------------------

fn write_atomic(path: &Path, contents: &str) -> Result<(), BackupError> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Write the dated backup files for all three rosters
pub fn write_backups(
    backup_dir: &Path,
    snapshot: &RosterSnapshot,
    today: NaiveDate,
) -> Result<(), DomainError> {
    let lists = [&snapshot.current, &snapshot.retired, &snapshot.banned];
    let file_name = today.format(DATE_FMT).to_string();

    for (dir, list) in ROSTER_DIRS.iter().zip(lists) {
        let dir_path = backup_dir.join(dir);
        fs::create_dir_all(&dir_path).map_err(BackupError::from)?;
        let contents: String = list
            .iter()
            .map(|m| member_to_backup_line(m) + "\n")
            .collect();
        write_atomic(&dir_path.join(&file_name), &contents)?;
        debug!(roster = dir, members = list.len(), file = %file_name, "Backup written");
    }
    Ok(())
}

fn newest_file(dir: &Path) -> Option<PathBuf> {
    let mut dates: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| NaiveDate::parse_from_str(n, DATE_FMT).is_ok())
        })
        .collect();
    dates.sort();
    dates.pop()
}

fn load_file(site_base: &str, path: &Path) -> Result<Vec<Member>, BackupError> {
    let mut members = Vec::new();
    for (lineno, line) in fs::read_to_string(path)?.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        match member_from_backup_line(site_base, line) {
            Ok(m) => members.push(m),
            Err(e) => {
                // One bad line must not lose the rest of the roster.
                warn!(file = %path.display(), line = lineno + 1, error = %e, "Skipping bad backup line");
            }
        }
    }
    Ok(members)
}

/// Load the most recent backup of each roster, if any exist
pub fn load_latest_backups(
    backup_dir: &Path,
    site_base: &str,
) -> Result<Option<RosterSnapshot>, DomainError> {
    let mut lists: [Vec<Member>; 3] = Default::default();
    let mut found = false;

    for (dir, slot) in ROSTER_DIRS.iter().zip(lists.iter_mut()) {
        if let Some(path) = newest_file(&backup_dir.join(dir)) {
            *slot = load_file(site_base, &path).map_err(DomainError::from)?;
            found = true;
        }
    }

    if !found {
        return Ok(None);
    }
    let [current, retired, banned] = lists;
    Ok(Some(RosterSnapshot {
        current,
        retired,
        banned,
    }))
}
