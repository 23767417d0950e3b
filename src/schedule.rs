//! Finding the game to follow: team resolution, schedule lookup, and
//! doubleheader disambiguation.

use crate::client::StatsApiClient;
use crate::error::{DugoutError, Result};
use crate::render::Zone;
use chrono::{DateTime, NaiveDate, Utc};
use dialoguer::{theme::ColorfulTheme, Select};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamsResponse {
    pub teams: Vec<Team>,
}

#[derive(Debug, Clone, Default, Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Team {
    pub id: u64,
    pub name: String,
    pub team_name: String,
    pub club_name: String,
    pub abbreviation: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleResponse {
    pub dates: Vec<ScheduleDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleDate {
    pub games: Vec<ScheduleGame>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleGame {
    pub game_pk: u64,
    pub game_date: String,
    pub status: ScheduleStatus,
    pub teams: ScheduleTeams,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleStatus {
    pub abstract_game_state: String,
    pub detailed_state: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleTeams {
    pub away: ScheduleSide,
    pub home: ScheduleSide,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleSide {
    pub score: Option<u32>,
    pub team: Team,
}

impl ScheduleGame {
    pub fn start_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.game_date)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    fn abstract_state(&self) -> String {
        self.status.abstract_game_state.to_lowercase()
    }

    pub fn is_live(&self) -> bool {
        self.abstract_state() == "live"
    }

    pub fn is_final(&self) -> bool {
        self.abstract_state() == "final"
    }

    pub fn is_preview(&self) -> bool {
        self.abstract_state() == "preview"
    }

    fn status_label(&self) -> &str {
        if !self.status.detailed_state.is_empty() {
            &self.status.detailed_state
        } else if !self.status.abstract_game_state.is_empty() {
            &self.status.abstract_game_state
        } else {
            "?"
        }
    }
}

/// Resolve a team id, abbreviation, club name, or full name to an id.
pub async fn resolve_team_id(client: &StatsApiClient, input: &str, season: i32) -> Result<u64> {
    let trimmed = input.trim();
    if let Ok(id) = trimmed.parse::<u64>() {
        return Ok(id);
    }

    let teams = load_teams(client, season).await?;
    match_team(&teams, trimmed).ok_or_else(|| DugoutError::TeamNotFound(trimmed.to_string()))
}

/// Pure matching core: exact (case-insensitive) on abbreviation, club name,
/// short name, or full name, then a substring pass as a last resort.
pub fn match_team(teams: &[Team], query: &str) -> Option<u64> {
    let q = query.to_lowercase();
    for team in teams {
        if team.abbreviation.to_lowercase() == q
            || team.team_name.to_lowercase() == q
            || team.club_name.to_lowercase() == q
            || team.name.to_lowercase() == q
        {
            return Some(team.id);
        }
    }
    teams
        .iter()
        .find(|t| t.name.to_lowercase().contains(&q))
        .map(|t| t.id)
}

fn teams_cache_path(season: i32) -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("dugout").join(format!("teams-{season}.json")))
}

/// Teams list for a season, via a best-effort JSON cache. Cache failures
/// fall through to the network; write failures are ignored.
async fn load_teams(client: &StatsApiClient, season: i32) -> Result<Vec<Team>> {
    let cache = teams_cache_path(season);
    if let Some(path) = &cache {
        if let Ok(content) = std::fs::read_to_string(path) {
            if let Ok(teams) = serde_json::from_str::<Vec<Team>>(&content) {
                if !teams.is_empty() {
                    return Ok(teams);
                }
            }
        }
    }

    let teams = client.fetch_teams(season).await?;

    if let Some(path) = &cache {
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        if let Ok(json) = serde_json::to_string(&teams) {
            let _ = std::fs::write(path, json);
        }
    }
    Ok(teams)
}

/// Pick a live game if any; otherwise the most recent final and the next
/// upcoming one.
pub fn choose_live_last_next(
    games: &[ScheduleGame],
    now: DateTime<Utc>,
) -> (
    Option<&ScheduleGame>,
    Option<&ScheduleGame>,
    Option<&ScheduleGame>,
) {
    let mut sorted: Vec<&ScheduleGame> = games.iter().collect();
    sorted.sort_by_key(|g| g.start_utc().unwrap_or(now));

    if let Some(live) = sorted.iter().find(|g| g.is_live()) {
        return (Some(live), None, None);
    }

    let last_final = sorted
        .iter()
        .filter(|g| g.is_final())
        .max_by_key(|g| g.start_utc().unwrap_or(now))
        .copied();
    let next_up = sorted
        .iter()
        .find(|g| g.is_preview() && g.start_utc().map_or(false, |d| d >= now))
        .copied();

    (None, last_final, next_up)
}

/// One-line summary for last/next game display.
pub fn game_brief(game: &ScheduleGame, zone: Zone) -> String {
    let away = &game.teams.away;
    let home = &game.teams.home;
    let away_tag = nonempty(&away.team.abbreviation).unwrap_or("Away");
    let home_tag = nonempty(&home.team.abbreviation).unwrap_or("Home");
    let score = |s: Option<u32>| s.map_or("-".to_string(), |v| v.to_string());
    let when = game
        .start_utc()
        .map(|dt| zone.format(dt, "%a %Y-%m-%d %I:%M %p %Z"))
        .unwrap_or_else(|| game.game_date.clone());

    format!(
        "{when}  {away_tag} {} @ {home_tag} {}  [{}]",
        score(away.score),
        score(home.score),
        game.status_label()
    )
}

fn nonempty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Games on the target local date, for disambiguation.
pub fn games_on_date<'a>(
    games: &'a [ScheduleGame],
    zone: Zone,
    target: NaiveDate,
) -> Vec<&'a ScheduleGame> {
    games
        .iter()
        .filter(|g| g.start_utc().map(|dt| zone.date(dt)) == Some(target))
        .collect()
}

/// Interactive doubleheader pick. Returns `None` when no game matches the
/// date; skips the prompt when there is only one candidate.
pub fn select_game_interactive(
    games: &[ScheduleGame],
    team_id: u64,
    zone: Zone,
    target: NaiveDate,
) -> Result<Option<u64>> {
    let candidates = games_on_date(games, zone, target);
    match candidates.len() {
        0 => return Ok(None),
        1 => return Ok(Some(candidates[0].game_pk)),
        _ => {}
    }

    let rows: Vec<String> = candidates
        .iter()
        .map(|g| {
            let opponent = if g.teams.home.team.id == team_id {
                &g.teams.away.team
            } else {
                &g.teams.home.team
            };
            let opp_tag = nonempty(&opponent.abbreviation)
                .or(nonempty(&opponent.team_name))
                .unwrap_or("?");
            let when = g
                .start_utc()
                .map(|dt| zone.format(dt, "%a %I:%M %p"))
                .unwrap_or_default();
            format!("{when} vs {opp_tag} [{}]", g.status_label())
        })
        .collect();

    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Multiple games found. Choose one")
        .items(&rows)
        .default(0)
        .interact()?;

    Ok(Some(candidates[choice].game_pk))
}
