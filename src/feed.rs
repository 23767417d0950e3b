//! Typed view over the GUMBO live feed document.
//!
//! Every field the stream consumes is resolved to a documented default
//! exactly once, here, via `#[serde(default)]`. The diff engine and the
//! renderer never re-implement null checks on the raw document.

use serde::Deserialize;

/// Coarse lifecycle state of a game. `Final` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Pregame,
    Live,
    Final,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Pregame
    }
}

/// Immutable result of one successful poll of the live feed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub game_data: GameData,
    pub live_data: LiveData,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameData {
    pub status: GameStatus,
    pub teams: FeedTeams,
    pub venue: Venue,
    pub probable_pitchers: ProbablePitchers,
    pub datetime: GameDatetime,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameStatus {
    pub abstract_game_state: String,
    pub detailed_state: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeedTeams {
    pub away: TeamInfo,
    pub home: TeamInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamInfo {
    pub name: String,
    pub team_name: String,
    pub abbreviation: String,
}

impl TeamInfo {
    /// Short display tag: abbreviation, then club name, then a placeholder.
    pub fn tag<'a>(&'a self, placeholder: &'a str) -> &'a str {
        if !self.abbreviation.is_empty() {
            &self.abbreviation
        } else if !self.team_name.is_empty() {
            &self.team_name
        } else {
            placeholder
        }
    }

    pub fn display_name<'a>(&'a self, placeholder: &'a str) -> &'a str {
        if !self.name.is_empty() {
            &self.name
        } else if !self.team_name.is_empty() {
            &self.team_name
        } else {
            placeholder
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Venue {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProbablePitchers {
    pub away: Option<PersonRef>,
    pub home: Option<PersonRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonRef {
    pub full_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameDatetime {
    pub date_time: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LiveData {
    pub linescore: Linescore,
    pub plays: Plays,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Plays {
    pub all_plays: Vec<PlayRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Linescore {
    pub current_inning: Option<u32>,
    pub inning_state: Option<String>,
    pub is_top_inning: Option<bool>,
    pub teams: LinescoreTeams,
    pub innings: Vec<InningLine>,
    pub offense: Offense,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinescoreTeams {
    pub away: TeamLine,
    pub home: TeamLine,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamLine {
    pub runs: Option<u32>,
    pub hits: Option<u32>,
    pub errors: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InningLine {
    pub away: InningCell,
    pub home: InningCell,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InningCell {
    pub runs: Option<u32>,
}

/// Live offense state; a base field is present exactly when occupied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Offense {
    pub first: Option<PersonRef>,
    pub second: Option<PersonRef>,
    pub third: Option<PersonRef>,
}

/// Base occupancy, either from a play's own runner list or from the
/// snapshot-level offense fallback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bases {
    pub first: bool,
    pub second: bool,
    pub third: bool,
}

impl Bases {
    pub fn any(&self) -> bool {
        self.first || self.second || self.third
    }

    /// Runner in scoring position: second or third occupied.
    pub fn scoring_position(&self) -> bool {
        self.second || self.third
    }
}

/// One at-bat (or pseudo-play) from the ordered play list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayRecord {
    pub about: About,
    pub result: PlayResult,
    pub count: Count,
    pub matchup: Matchup,
    pub play_events: Vec<PitchEvent>,
    pub runners: Vec<RunnerRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct About {
    pub at_bat_index: Option<i64>,
    pub half_inning: String,
    pub inning: u32,
    pub is_scoring_play: bool,
    pub outs: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayResult {
    pub description: String,
    pub event: String,
    pub event_type: String,
    pub rbi: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Count {
    pub balls: Option<u32>,
    pub strikes: Option<u32>,
    pub outs: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Matchup {
    pub batter: Option<PersonRef>,
    pub pitcher: Option<PersonRef>,
}

/// One event within an at-bat. Not every event is a pitch; pickoffs and
/// mound visits share this list, discriminated by `is_pitch`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PitchEvent {
    pub is_pitch: bool,
    pub details: PitchDetails,
    pub pitch_data: PitchData,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PitchDetails {
    pub call: Option<Described>,
    #[serde(rename = "type")]
    pub pitch_type: Option<Described>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Described {
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PitchData {
    pub start_speed: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunnerRecord {
    pub movement: Movement,
    pub details: RunnerDetails,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Movement {
    pub end: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunnerDetails {
    pub runner: Option<PersonRef>,
}

impl Snapshot {
    /// Classify the game's coarse lifecycle state.
    pub fn phase(&self) -> Phase {
        let abstract_state = self.game_data.status.abstract_game_state.to_lowercase();
        if abstract_state == "final" {
            return Phase::Final;
        }
        let detailed = self.game_data.status.detailed_state.to_lowercase();
        if abstract_state == "preview" || detailed.contains("pre") || detailed.contains("warm") {
            return Phase::Pregame;
        }
        Phase::Live
    }

    pub fn plays(&self) -> &[PlayRecord] {
        &self.live_data.plays.all_plays
    }

    pub fn detailed_status(&self) -> &str {
        let s = &self.game_data.status.detailed_state;
        if s.is_empty() {
            "Unknown"
        } else {
            s
        }
    }

    pub fn current_inning(&self) -> Option<u32> {
        self.live_data.linescore.current_inning
    }

    /// Current half-inning tag as the feed reports it ("Top"/"Bottom").
    pub fn inning_half(&self) -> Option<&str> {
        self.live_data.linescore.inning_state.as_deref()
    }

    /// Base occupancy from the live offense state, used when a play carries
    /// no runner list of its own.
    pub fn offense_bases(&self) -> Bases {
        let offense = &self.live_data.linescore.offense;
        Bases {
            first: offense.first.is_some(),
            second: offense.second.is_some(),
            third: offense.third.is_some(),
        }
    }
}

impl PlayRecord {
    pub fn at_bat_index(&self) -> Option<i64> {
        self.about.at_bat_index
    }

    /// Bookkeeping pseudo-plays (status changes) never count as game action.
    pub fn is_status_change(&self) -> bool {
        self.result.event_type.eq_ignore_ascii_case("statuschange")
    }

    /// Human description with documented fallbacks.
    pub fn description(&self) -> &str {
        if !self.result.description.is_empty() {
            &self.result.description
        } else if !self.result.event.is_empty() {
            &self.result.event
        } else {
            "…"
        }
    }

    pub fn outs(&self) -> u32 {
        self.count.outs.unwrap_or(self.about.outs)
    }

    /// Signature used to detect corrections to an already-shown play.
    pub fn signature(&self) -> String {
        format!("{}|{}", self.description(), self.outs())
    }

    pub fn is_scoring(&self) -> bool {
        self.about.is_scoring_play || self.result.rbi > 0
    }

    pub fn is_top_half(&self) -> bool {
        self.about.half_inning.to_lowercase().starts_with("top")
    }

    /// Number of actual pitches thrown this at-bat, if any events are known.
    pub fn pitch_count(&self) -> Option<usize> {
        if self.play_events.is_empty() {
            None
        } else {
            Some(self.play_events.iter().filter(|e| e.is_pitch).count())
        }
    }

    /// Base occupancy from this play's runner movements, if it carries any.
    pub fn runner_bases(&self) -> Option<Bases> {
        if self.runners.is_empty() {
            return None;
        }
        let mut bases = Bases::default();
        for r in &self.runners {
            match r.movement.end.as_deref() {
                Some("1B") => bases.first = true,
                Some("2B") => bases.second = true,
                Some("3B") => bases.third = true,
                _ => {}
            }
        }
        Some(bases)
    }

    /// Last name of the runner ending on the given base, truncated for
    /// display, if the feed names one.
    pub fn runner_on(&self, base: &str) -> Option<String> {
        for r in &self.runners {
            if r.movement.end.as_deref() == Some(base) {
                if let Some(person) = &r.details.runner {
                    if !person.full_name.is_empty() {
                        let last = person
                            .full_name
                            .split_whitespace()
                            .last()
                            .unwrap_or(&person.full_name);
                        let mut name: String = last.chars().take(8).collect();
                        if name.is_empty() {
                            name = person.full_name.clone();
                        }
                        return Some(name);
                    }
                }
            }
        }
        None
    }
}
