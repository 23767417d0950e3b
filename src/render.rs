//! Pure formatting: snapshot (+ diff context) in, text lines out. No I/O and
//! no hidden state, so every line shape is testable on its own.
//!
//! All color and iconography goes through [`Style`]; toggling it changes how
//! lines look, never which lines are produced.

use crate::feed::{Bases, PlayRecord, Snapshot};
use chrono::{DateTime, Local, Utc};
use chrono_tz::Tz;
use colored::{Color, Colorize};

/// Timezone used to localize start times: the process-local zone, or an
/// explicit IANA zone from `--tz`.
#[derive(Debug, Clone, Copy)]
pub enum Zone {
    Local,
    Named(Tz),
}

impl Zone {
    pub fn format(&self, utc: DateTime<Utc>, fmt: &str) -> String {
        match self {
            Zone::Local => utc.with_timezone(&Local).format(fmt).to_string(),
            Zone::Named(tz) => utc.with_timezone(tz).format(fmt).to_string(),
        }
    }

    /// Calendar date of a UTC instant in this zone.
    pub fn date(&self, utc: DateTime<Utc>) -> chrono::NaiveDate {
        match self {
            Zone::Local => utc.with_timezone(&Local).date_naive(),
            Zone::Named(tz) => utc.with_timezone(tz).date_naive(),
        }
    }

    pub fn today(&self) -> chrono::NaiveDate {
        self.date(Utc::now())
    }
}

/// Injectable presentation policy.
#[derive(Debug, Clone, Copy)]
pub struct Style {
    pub color: bool,
}

impl Style {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn away(&self, text: &str) -> String {
        self.paint(text, Color::Cyan)
    }

    fn home(&self, text: &str) -> String {
        self.paint(text, Color::Magenta)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(text, Color::BrightBlack)
    }

    /// Separator printed above each scoreboard block.
    pub fn rule(&self) -> String {
        self.dim(&"─".repeat(48))
    }

    /// Wider separator used around schedule briefs.
    pub fn wide_rule(&self) -> String {
        self.dim(&"—".repeat(72))
    }
}

fn half_arrow(top: bool) -> &'static str {
    if top {
        "▲"
    } else {
        "▼"
    }
}

/// Multi-line scoreboard: inning tag plus R/H/E for both sides.
pub fn scoreboard(snapshot: &Snapshot, style: Style) -> String {
    let linescore = &snapshot.live_data.linescore;
    let away = &linescore.teams.away;
    let home = &linescore.teams.home;
    let away_tag = snapshot.game_data.teams.away.tag("AWY");
    let home_tag = snapshot.game_data.teams.home.tag("HME");

    let inning_text = match (snapshot.current_inning(), snapshot.inning_half()) {
        (Some(inning), Some(half)) => {
            format!("{} {} {}", half_arrow(half == "Top"), half, inning)
        }
        (Some(inning), None) => format!("Inning {inning}"),
        _ => "Inning ?".to_string(),
    };

    let away_line = format!(
        "⚾ {} {:>2}  (H:{:>2} E:{})",
        style.away(away_tag),
        away.runs.unwrap_or(0),
        away.hits.unwrap_or(0),
        away.errors.unwrap_or(0),
    );
    let home_line = format!(
        "⚾ {} {:>2}  (H:{:>2} E:{})",
        style.home(home_tag),
        home.runs.unwrap_or(0),
        home.hits.unwrap_or(0),
        home.errors.unwrap_or(0),
    );

    format!(
        "🏟  {}\n     {}\n     {}",
        style.paint(&inning_text, Color::Yellow),
        away_line,
        home_line
    )
}

/// Compact inning-by-inning run cells, `-` for innings not yet played.
pub fn linescore(snapshot: &Snapshot, style: Style) -> String {
    let ls = &snapshot.live_data.linescore;
    let away_tag = snapshot.game_data.teams.away.tag("AWY");
    let home_tag = snapshot.game_data.teams.home.tag("HME");

    let cell = |runs: Option<u32>| match runs {
        Some(r) => r.to_string(),
        None => "-".to_string(),
    };
    let away_cells: Vec<String> = ls.innings.iter().map(|i| cell(i.away.runs)).collect();
    let home_cells: Vec<String> = ls.innings.iter().map(|i| cell(i.home.runs)).collect();

    format!(
        "{} {}\n{} {}",
        style.away(away_tag),
        away_cells.join(" "),
        style.home(home_tag),
        home_cells.join(" ")
    )
}

/// Inning banner, emitted only on a boundary. `None` when the linescore does
/// not yet carry an inning.
pub fn inning_banner(snapshot: &Snapshot, style: Style) -> Option<String> {
    let inning = snapshot.current_inning()?;
    let is_top = snapshot.live_data.linescore.is_top_inning?;
    let label = if is_top { "Top" } else { "Bottom" };
    let text = format!("{} {} {}", half_arrow(is_top), label, inning);
    Some(if is_top {
        style.away(&text)
    } else {
        style.home(&text)
    })
}

fn bases_text(bases: Bases, play: &PlayRecord, with_names: bool) -> String {
    let mut parts = Vec::with_capacity(3);
    for (label, occupied) in [
        ("1B", bases.first),
        ("2B", bases.second),
        ("3B", bases.third),
    ] {
        if occupied {
            match with_names.then(|| play.runner_on(label)).flatten() {
                Some(name) => parts.push(format!("{label}:{name}")),
                None => parts.push(format!("{label}:◉")),
            }
        } else {
            parts.push(format!("{label}:○"));
        }
    }
    format!(" [{}]", parts.join(" "))
}

/// One line per at-bat: inning tag, description, count, bases, matchup, outs.
pub fn play_line(play: &PlayRecord, fallback: Bases, style: Style) -> String {
    let mut desc = play.description().to_string();
    if play.result.rbi > 0 {
        desc.push_str(&format!(" ({} RBI)", play.result.rbi));
    }

    let top = play.is_top_half();
    let tag_text = format!("{}{}", half_arrow(top), play.about.inning);
    let tag = if top {
        style.away(&tag_text)
    } else {
        style.home(&tag_text)
    };

    // A play with its own runner list wins over the snapshot fallback; the
    // fallback keeps bases visible when the feed omits runners.
    let (bases, from_runners) = match play.runner_bases() {
        Some(b) => (b, true),
        None => (fallback, false),
    };
    let bases_txt = if from_runners || fallback.any() {
        bases_text(bases, play, from_runners)
    } else {
        String::new()
    };

    let styled_desc = if play.is_scoring() {
        let lowered = desc.to_lowercase();
        if lowered.contains("homers") || lowered.contains("home run") {
            format!("🔥 {} 🔥", style.paint(&desc.to_uppercase(), Color::BrightRed))
        } else if play.result.rbi >= 3 {
            format!("💥 {} 💥", style.paint(&desc, Color::BrightYellow))
        } else {
            format!("⚡ {} ⚡", style.paint(&desc, Color::BrightGreen))
        }
    } else if bases.scoring_position() {
        style.paint(&desc, Color::Yellow)
    } else {
        desc
    };

    let count_txt = match (play.count.balls, play.count.strikes, play.pitch_count()) {
        (Some(b), Some(s), Some(p)) => format!(" ({b}-{s}, {p}p)"),
        (Some(b), Some(s), None) => format!(" ({b}-{s})"),
        (_, _, Some(p)) => format!(" [{p}p]"),
        _ => String::new(),
    };

    let matchup = match (&play.matchup.batter, &play.matchup.pitcher) {
        (Some(batter), Some(pitcher)) if !play.is_status_change() => {
            format!("  — {} vs {}", batter.full_name, pitcher.full_name)
        }
        _ => String::new(),
    };

    format!(
        "{tag}  {styled_desc}{count_txt}{bases_txt}{matchup}   [{} out]",
        play.outs()
    )
}

/// A correction: the finalized result of an at-bat whose preliminary line
/// was already shown.
pub fn correction_line(play: &PlayRecord, fallback: Bases, style: Style) -> String {
    format!("📝 {}", play_line(play, fallback, style))
}

/// New pitch sub-lines for an at-bat, starting at event offset `from`.
/// Non-pitch events (pickoffs, mound visits) are skipped.
pub fn pitch_lines(play: &PlayRecord, from: usize, style: Style) -> Vec<String> {
    let mut lines = Vec::new();
    for event in play.play_events.iter().skip(from) {
        if !event.is_pitch {
            continue;
        }
        let pitch_type = event
            .details
            .pitch_type
            .as_ref()
            .map(|d| d.description.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("Pitch");
        let call = event
            .details
            .call
            .as_ref()
            .map(|d| d.description.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("?");
        let mut line = format!("   • {pitch_type} — {call}");
        if let Some(speed) = event.pitch_data.start_speed {
            line.push_str(&format!(" @ {speed:.1} mph"));
        }
        lines.push(style.paint(&line, Color::White));
    }
    lines
}

/// Localized start time, if the feed carries one.
pub fn start_time(snapshot: &Snapshot, zone: Zone) -> Option<String> {
    let raw = &snapshot.game_data.datetime.date_time;
    if raw.is_empty() {
        return None;
    }
    let parsed = DateTime::parse_from_rfc3339(raw).ok()?;
    Some(zone.format(parsed.with_timezone(&Utc), "%a %I:%M %p %Z"))
}

/// Pregame block: teams, probable pitchers, venue, localized start time.
pub fn pregame_block(snapshot: &Snapshot, zone: Zone, style: Style) -> String {
    header_block(snapshot, zone, style, "🎯 Game Starting Soon! 🎯")
}

/// Header shown once when a live game first appears.
pub fn live_header(snapshot: &Snapshot, zone: Zone, style: Style) -> String {
    header_block(snapshot, zone, style, "⚾ Game On! ⚾")
}

fn header_block(snapshot: &Snapshot, zone: Zone, style: Style, title: &str) -> String {
    let teams = &snapshot.game_data.teams;
    let mut lines = vec![
        title.to_string(),
        format!(
            "Teams: {} at {}",
            style.away(teams.away.display_name("Away")),
            style.home(teams.home.display_name("Home"))
        ),
    ];

    let probables = &snapshot.game_data.probable_pitchers;
    if let (Some(away), Some(home)) = (&probables.away, &probables.home) {
        lines.push(format!(
            "Pitchers: {} vs. {}",
            away.full_name, home.full_name
        ));
    }
    if !snapshot.game_data.venue.name.is_empty() {
        lines.push(format!("📍 {}", snapshot.game_data.venue.name));
    }
    if let Some(when) = start_time(snapshot, zone) {
        lines.push(format!("🕐 {when}"));
    }
    lines.join("\n")
}

/// Closing banner, rendered exactly once when the game goes final.
pub fn closing_banner(style: Style) -> String {
    format!(
        "🏁 {}",
        style.paint("Game Over! Thanks for watching.", Color::Green)
    )
}
