//! The driver loop: poll, diff, render, sleep, until the game goes final.

use crate::client::{FeedSource, PollOutcome, StatsApiClient};
use crate::diff::{self, DiffOptions, StreamState};
use crate::error::{DugoutError, Result};
use crate::feed::{Bases, Phase};
use crate::render::{self, Style, Zone};
use crate::ui;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct StreamOptions {
    /// Base poll interval; also the starting point for backoff.
    pub interval: Duration,
    /// Print each pitch of newly appeared plays.
    pub show_pitches: bool,
    /// Render the full play history on the first cycle.
    pub from_start: bool,
    /// Only render scoring plays; suppressed plays still feed the state.
    pub scoring_only: bool,
    /// Compact linescore under each scoreboard reprint.
    pub line_score: bool,
    /// Reprint the scoreboard at least this often, even if unchanged.
    pub box_interval: Option<Duration>,
    /// Scoreboard and banners only.
    pub quiet: bool,
    /// Pitch detail for every play, not just new ones.
    pub verbose: bool,
    pub zone: Zone,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs_f64(crate::config::DEFAULT_INTERVAL_SECS),
            show_pitches: false,
            from_start: false,
            scoring_only: false,
            line_score: false,
            box_interval: None,
            quiet: false,
            verbose: false,
            zone: Zone::Local,
        }
    }
}

/// Stream one game to the sink until it reaches `Final` (the only normal
/// exit) or the process is interrupted. Warnings go to stderr, never into
/// the sink.
pub async fn stream<S: FeedSource>(
    source: &S,
    options: &StreamOptions,
    style: Style,
    sink: &mut dyn Write,
) -> Result<()> {
    let mut state = StreamState::new(options.interval, options.from_start);
    let mut pregame_shown = false;
    let mut header_shown = false;

    loop {
        let outcome = match source.poll(state.etag.as_deref()).await {
            Ok(outcome) => outcome,
            Err(err) => {
                let wait = state.backoff.next_delay();
                ui::warning(&format!(
                    "net hiccup: {}; retrying in {:.1}s",
                    err.user_message(),
                    wait.as_secs_f64()
                ));
                tokio::time::sleep(wait).await;
                continue;
            }
        };

        let snapshot = match outcome {
            PollOutcome::NotModified => {
                tokio::time::sleep(options.interval).await;
                continue;
            }
            PollOutcome::Rejected { status } => {
                ui::warning(&format!(
                    "http {status}; retrying in {:.1}s",
                    options.interval.as_secs_f64()
                ));
                tokio::time::sleep(options.interval).await;
                continue;
            }
            PollOutcome::Fetched { snapshot, etag } => {
                // the fresh token always replaces the old one; a missing
                // header means caching is off for this cycle
                state.etag = etag;
                state.backoff.reset();
                *snapshot
            }
        };

        let cycle = diff::diff(
            &state,
            &snapshot,
            DiffOptions {
                replay_from_start: state.replay_from_start,
                verbose_pitches: options.verbose,
            },
        );
        let scoreboard = render::scoreboard(&snapshot, style);
        let status_text = snapshot.detailed_status().to_string();
        let changed = state.last_scoreboard.as_deref() != Some(scoreboard.as_str())
            || state.last_status.as_deref() != Some(status_text.as_str());

        if cycle.phase == Phase::Pregame {
            if changed {
                if !pregame_shown {
                    writeln!(sink)?;
                    writeln!(sink, "{}", render::pregame_block(&snapshot, options.zone, style))?;
                    writeln!(sink)?;
                    pregame_shown = true;
                }
                writeln!(sink, "{}", style.rule())?;
                writeln!(sink, "{scoreboard}")?;
            }
        } else if snapshot.plays().is_empty() {
            if changed {
                writeln!(sink, "{}", style.wide_rule())?;
                writeln!(sink, "{scoreboard}")?;
                writeln!(sink, "[{status_text}]")?;
            }
        } else {
            if !header_shown {
                writeln!(sink)?;
                writeln!(sink, "{}", render::live_header(&snapshot, options.zone, style))?;
                writeln!(sink)?;
                header_shown = true;
            }

            let plays = snapshot.plays();
            let fallback = snapshot.offense_bases();
            let mut rendered_play = false;
            let mut rendered_correction = false;

            if !options.quiet {
                for &i in &cycle.new_plays {
                    let play = &plays[i];
                    if options.scoring_only && !play.is_scoring() {
                        continue;
                    }
                    writeln!(sink, "{}", render::play_line(play, fallback, style))?;
                    rendered_play = true;
                }

                if options.show_pitches || options.verbose {
                    for range in &cycle.new_pitches {
                        for line in render::pitch_lines(&plays[range.play], range.from, style) {
                            writeln!(sink, "{line}")?;
                        }
                    }
                }

                for &i in &cycle.corrections {
                    writeln!(sink, "{}", render::correction_line(&plays[i], fallback, style))?;
                    rendered_correction = true;
                }
            }

            let scoreboard_changed =
                state.last_scoreboard.as_deref() != Some(scoreboard.as_str());
            let forced = options
                .box_interval
                .map_or(false, |every| state.last_forced_snapshot.elapsed() >= every);
            if forced {
                state.last_forced_snapshot = Instant::now();
            }

            if cycle.boundary
                || rendered_play
                || rendered_correction
                || scoreboard_changed
                || forced
            {
                writeln!(sink, "{}", style.rule())?;
                writeln!(sink, "{scoreboard}")?;
                if cycle.boundary {
                    if let Some(banner) = render::inning_banner(&snapshot, style) {
                        writeln!(sink, "{banner}")?;
                        writeln!(sink)?;
                    }
                }
                if options.line_score {
                    writeln!(sink, "{}", render::linescore(&snapshot, style))?;
                }
            }

            // the from-start request is spent once plays have been diffed
            state.replay_from_start = false;
        }

        let finished = cycle.phase == Phase::Final;
        if finished {
            writeln!(sink, "{}", style.rule())?;
            writeln!(sink, "{scoreboard}")?;
            writeln!(sink)?;
            writeln!(sink, "{}", render::closing_banner(style))?;
        }

        state.absorb(&snapshot);
        state.last_scoreboard = Some(scoreboard);
        state.last_status = Some(status_text);
        sink.flush()?;

        if finished {
            return Ok(());
        }
        tokio::time::sleep(options.interval).await;
    }
}

/// One-shot dump: fetch the feed once and write the scoreboard plus every
/// play line to a file.
pub async fn dump_game(
    client: &StatsApiClient,
    gamepk: u64,
    path: &Path,
    style: Style,
) -> Result<()> {
    let snapshot = client.fetch_live(gamepk).await?;
    let mut file = std::fs::File::create(path).map_err(|e| DugoutError::SinkWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    writeln!(file, "{}", render::scoreboard(&snapshot, style))?;
    // historical at-bats get no base fallback; the live offense state only
    // describes the moment of the fetch
    for play in snapshot.plays() {
        if play.is_status_change() {
            continue;
        }
        writeln!(file, "{}", render::play_line(play, Bases::default(), style))?;
    }
    Ok(())
}
