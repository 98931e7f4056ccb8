//! Hiscores client - the game's public stat service
//!
//! Both endpoints return comma-separated plain text. The feed is flaky
//! under load, so every fetch retries with jittered exponential backoff.
//! A clan list that cannot be fetched aborts the caller's update; a
//! per-player detail that cannot be fetched degrades to `None`, because
//! newly joined players are routinely absent from the detail index.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::StatusCode;
use tracing::{debug, instrument, warn};

use clan_common::HiscoresConfig;
use clan_core::entities::{
    ActivityStat, ClueCounts, SkillStat, ACTIVITY_COUNT, ACTIVITY_FIRST_ROW, CLUE_COUNT,
    CLUE_FIRST_ROW, SKILL_COUNT,
};
use clan_core::error::DomainError;
use clan_core::traits::{ClanListEntry, HiscoresApi, PlayerDetail, PortResult};
use clan_core::value_objects::{IngameRank, PlayerName};

/// Base delay for the first retry; doubles per attempt
const BACKOFF_BASE_MS: u64 = 500;
/// Upper bound on the random jitter added to each backoff
const BACKOFF_JITTER_MS: u64 = 250;

/// Live client for the hiscores endpoints
#[derive(Debug, Clone)]
pub struct HiscoresClient {
    http: reqwest::Client,
    base_url: String,
    clan_name: String,
    retries: u32,
}

enum Fetch {
    Body(String),
    NotFound,
}

impl HiscoresClient {
    /// Build a client from configuration
    pub fn new(config: &HiscoresConfig, clan_name: &str) -> Result<Self, DomainError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::External(format!("hiscores client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            clan_name: clan_name.to_string(),
            retries: config.retries,
        })
    }

    /// GET with retries; `NotFound` is terminal, everything else backs off
    async fn fetch_with_retries(&self, url: &str) -> PortResult<Fetch> {
        let mut last_error = String::new();
        for attempt in 0..=self.retries {
            if attempt > 0 {
                let jitter = rand::thread_rng().gen_range(0..BACKOFF_JITTER_MS);
                let delay = BACKOFF_BASE_MS * (1 << (attempt - 1).min(5)) + jitter;
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            match self.http.get(url).send().await {
                Ok(response) if response.status() == StatusCode::NOT_FOUND => {
                    return Ok(Fetch::NotFound);
                }
                Ok(response) => match response.error_for_status() {
                    Ok(ok) => match ok.text().await {
                        Ok(body) => return Ok(Fetch::Body(body)),
                        Err(e) => last_error = e.to_string(),
                    },
                    Err(e) => last_error = e.to_string(),
                },
                Err(e) => last_error = e.to_string(),
            }
            debug!(url, attempt, error = %last_error, "Hiscores fetch failed, retrying");
        }
        Err(DomainError::External(format!(
            "hiscores fetch failed after {} attempts: {last_error}",
            self.retries + 1
        )))
    }

    fn clan_list_url(&self) -> String {
        format!(
            "{}/members_lite.ws?clanName={}",
            self.base_url,
            self.clan_name.replace(' ', "+")
        )
    }

    fn player_url(&self, name: &PlayerName) -> String {
        format!(
            "{}/index_lite.ws?player={}",
            self.base_url,
            name.as_str().replace(' ', "+")
        )
    }
}

/// Parse the clan-list feed: one header line, then `name, rank, clan_xp, kills`
///
/// Malformed lines are skipped with a warning rather than failing the whole
/// list; the feed occasionally carries truncated trailing rows.
pub fn parse_clan_list(body: &str) -> Vec<ClanListEntry> {
    let mut entries = Vec::new();
    for line in body.lines().skip(1) {
        let line = line.replace('\u{00A0}', " ");
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != 4 {
            warn!(line, "Skipping malformed clan-list row");
            continue;
        }
        let parsed = (
            PlayerName::parse(fields[0]),
            fields[1].parse::<IngameRank>(),
            fields[2].parse::<u64>(),
            fields[3].parse::<u64>(),
        );
        match parsed {
            (Ok(name), Ok(rank), Ok(clan_xp), Ok(kills)) => entries.push(ClanListEntry {
                name,
                rank,
                clan_xp,
                kills,
            }),
            _ => warn!(line, "Skipping unparseable clan-list row"),
        }
    }
    entries
}

fn parse_i64(field: Option<&&str>) -> i64 {
    field.and_then(|s| s.trim().parse::<i64>().ok()).unwrap_or(-1)
}

/// Parse the per-player detail feed
///
/// Rows 0-27 are skills (`rank,level,xp`), activity rows follow
/// (`rank,score`), and the five clue counters sit at the end of the
/// activity block. Unranked rows carry `-1`, which is clamped to zero for
/// the unsigned counters.
pub fn parse_player_detail(body: &str) -> PlayerDetail {
    let rows: Vec<Vec<&str>> = body
        .lines()
        .map(|line| line.trim().split(',').collect())
        .collect();

    let mut detail = PlayerDetail::default();

    for (i, skill) in detail.skills.0.iter_mut().enumerate().take(SKILL_COUNT) {
        if let Some(row) = rows.get(i) {
            *skill = SkillStat {
                rank: parse_i64(row.first()),
                level: u32::try_from(parse_i64(row.get(1)).max(0)).unwrap_or(0),
                xp: u64::try_from(parse_i64(row.get(2)).max(0)).unwrap_or(0),
            };
        }
    }

    for (i, activity) in detail
        .activities
        .0
        .iter_mut()
        .enumerate()
        .take(ACTIVITY_COUNT)
    {
        if let Some(row) = rows.get(ACTIVITY_FIRST_ROW + i) {
            *activity = ActivityStat {
                rank: parse_i64(row.first()),
                score: parse_i64(row.get(1)).max(0),
            };
        }
    }

    let mut clues = [0_u64; CLUE_COUNT];
    for (i, clue) in clues.iter_mut().enumerate() {
        if let Some(row) = rows.get(CLUE_FIRST_ROW + i) {
            *clue = u64::try_from(parse_i64(row.get(1)).max(0)).unwrap_or(0);
        }
    }
    detail.clue_counts = ClueCounts {
        easy: clues[0],
        medium: clues[1],
        hard: clues[2],
        elite: clues[3],
        master: clues[4],
    };

    detail
}

#[async_trait]
impl HiscoresApi for HiscoresClient {
    #[instrument(skip(self))]
    async fn fetch_clan_list(&self) -> PortResult<Vec<ClanListEntry>> {
        match self.fetch_with_retries(&self.clan_list_url()).await? {
            Fetch::Body(body) => {
                let entries = parse_clan_list(&body);
                debug!(members = entries.len(), "Fetched clan list");
                Ok(entries)
            }
            Fetch::NotFound => Err(DomainError::External(format!(
                "clan list not found for '{}'",
                self.clan_name
            ))),
        }
    }

    #[instrument(skip(self), fields(player = %name))]
    async fn fetch_player(&self, name: &PlayerName) -> PortResult<Option<PlayerDetail>> {
        // Absent players and exhausted retries both degrade to None; the
        // reconcile pass treats missing detail as "not yet indexed".
        match self.fetch_with_retries(&self.player_url(name)).await {
            Ok(Fetch::Body(body)) => Ok(Some(parse_player_detail(&body))),
            Ok(Fetch::NotFound) => Ok(None),
            Err(e) => {
                warn!(player = %name, error = %e, "Player detail unavailable");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clan_core::entities::{ACTIVITY_RUNESCORE, RUNESCORE_ROW, SKILL_CONSTITUTION};

    #[test]
    fn test_parse_clan_list_skips_header() {
        let body = "Clanmate, Clan Rank, Total XP, Kills\n\
                    Alice, Owner, 500000000, 12\n\
                    Bob\u{00A0}Jr, Recruit, 1000, 0\n";
        let entries = parse_clan_list(body);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name.as_str(), "Alice");
        assert_eq!(entries[0].rank, IngameRank::Owner);
        assert_eq!(entries[0].clan_xp, 500_000_000);
        assert_eq!(entries[1].name.as_str(), "Bob Jr");
    }

    #[test]
    fn test_parse_clan_list_skips_malformed_rows() {
        let body = "header\nAlice, Owner, 100, 1\ngarbage row\nBob, NotARank, 5, 0\n";
        let entries = parse_clan_list(body);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name.as_str(), "Alice");
    }

    fn detail_body() -> String {
        let mut lines = Vec::new();
        // 28 skill rows
        for i in 0..SKILL_COUNT {
            lines.push(format!("{i},99,{}", 1_000_000 * (i + 1)));
        }
        // activity rows up to and including RuneScore
        for i in SKILL_COUNT..=RUNESCORE_ROW {
            lines.push(format!("-1,{}", i * 10));
        }
        // five clue rows
        for i in 0..CLUE_COUNT {
            lines.push(format!("5,{}", i + 1));
        }
        lines.join("\n")
    }

    #[test]
    fn test_parse_player_detail_layout() {
        let detail = parse_player_detail(&detail_body());
        assert_eq!(detail.skills.overall().xp, 1_000_000);
        assert_eq!(
            detail.skills.constitution().xp,
            1_000_000 * (SKILL_CONSTITUTION as u64 + 1)
        );
        assert_eq!(detail.activities.runescore(), RUNESCORE_ROW as i64 * 10);
        assert_eq!(detail.clue_counts.easy, 1);
        assert_eq!(detail.clue_counts.master, 5);
        assert_eq!(detail.clue_counts.total(), 15);
    }

    #[test]
    fn test_parse_player_detail_clamps_unranked() {
        let body = "-1,-1,-1\n".repeat(60);
        let detail = parse_player_detail(&body);
        assert_eq!(detail.skills.overall().rank, -1);
        assert_eq!(detail.skills.overall().xp, 0);
        assert_eq!(detail.activities.runescore(), 0);
        assert_eq!(detail.clue_counts.total(), 0);
    }

    #[test]
    fn test_parse_player_detail_truncated_feed() {
        // Only skill rows present; everything else defaults.
        let body = "1,99,200\n".repeat(SKILL_COUNT);
        let detail = parse_player_detail(&body);
        assert_eq!(detail.skills.overall().xp, 200);
        assert_eq!(detail.activities.0[ACTIVITY_RUNESCORE].score, 0);
        assert_eq!(detail.clue_counts.total(), 0);
    }

    #[test]
    fn test_urls_escape_spaces() {
        let config = HiscoresConfig {
            base_url: "https://hiscores.example/m=clan".to_string(),
            timeout_secs: 10,
            retries: 6,
        };
        let client = HiscoresClient::new(&config, "The Clan").unwrap();
        assert_eq!(
            client.clan_list_url(),
            "https://hiscores.example/m=clan/members_lite.ws?clanName=The+Clan"
        );
        let name = PlayerName::parse("Bob Jr").unwrap();
        assert_eq!(
            client.player_url(&name),
            "https://hiscores.example/m=clan/index_lite.ws?player=Bob+Jr"
        );
    }
}
