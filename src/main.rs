use chrono::{Datelike, Duration as DateDelta, NaiveDate, Utc};
use clap::Parser;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input};
use dugout::cli::{positive_duration, Cli};
use dugout::client::{GameFeed, StatsApiClient};
use dugout::config::{FileConfig, DEFAULT_INTERVAL_SECS};
use dugout::error::{DugoutError, Result};
use dugout::render::{Style, Zone};
use dugout::schedule;
use dugout::stream::{self, StreamOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use tokio::runtime::Runtime;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("{} {}", "Error:".bold().red(), err.user_message());
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let rt = Runtime::new()?;
    rt.block_on(run_async(cli))
}

async fn run_async(cli: Cli) -> Result<()> {
    let cfg = FileConfig::load();

    let zone = match cli.tz.clone().or_else(|| cfg.tz.clone()) {
        Some(name) => Zone::Named(
            name.parse()
                .map_err(|_| DugoutError::UnknownTimezone(name))?,
        ),
        None => Zone::Local,
    };

    let color = !(cli.no_color || cfg.no_color.unwrap_or(false));
    if !color {
        colored::control::set_override(false);
    }
    let style = Style::new(color);

    let interval = positive_duration(
        cli.interval.or(cfg.interval).unwrap_or(DEFAULT_INTERVAL_SECS),
        "--interval",
    )?;
    let box_interval = cli
        .box_interval
        .or(cfg.box_interval)
        .map(|minutes| positive_duration(minutes * 60.0, "--box-interval"))
        .transpose()?;

    let options = StreamOptions {
        interval,
        show_pitches: cli.pitches,
        from_start: cli.from_start,
        scoring_only: cli.scoring_only,
        line_score: cli.line_score || cfg.line_score.unwrap_or(false),
        box_interval,
        quiet: cli.quiet,
        verbose: cli.verbose,
        zone,
    };

    let client = StatsApiClient::new()?;

    let date = match &cli.date {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            DugoutError::invalid_argument(format!("invalid --date '{raw}', expected YYYY-MM-DD"))
        })?,
        None => zone.today(),
    };

    let gamepk = match cli.gamepk {
        Some(pk) => Some(pk),
        None => locate_game(&client, &cli, &cfg, zone, style, date).await?,
    };
    let Some(gamepk) = gamepk else {
        // nothing live and nothing selected; the last/next briefs were shown
        return Ok(());
    };

    if let Some(dump_path) = &cli.dump {
        stream::dump_game(&client, gamepk, Path::new(dump_path), style).await?;
        println!("Wrote log to {dump_path}");
        return Ok(());
    }

    let mut sink = open_sink(cli.log.as_deref())?;
    let feed = GameFeed::new(client, gamepk);
    stream::stream(&feed, &options, style, sink.as_mut()).await
}

/// Resolve the team and pick the game to follow: a live one if any,
/// otherwise show last/next briefs and offer the games on the target date.
async fn locate_game(
    client: &StatsApiClient,
    cli: &Cli,
    cfg: &FileConfig,
    zone: Zone,
    style: Style,
    date: NaiveDate,
) -> Result<Option<u64>> {
    let team_input = cli
        .team
        .clone()
        .or_else(|| cli.team_flag.clone())
        .or_else(|| cfg.team.clone());
    let team_input = match team_input {
        Some(team) if !team.trim().is_empty() => team,
        _ => Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt("Team (e.g., LAD, NYY, SFG or Dodgers, Yankees, Giants)")
            .interact_text()?,
    };

    let season = date.year();
    let team_id = schedule::resolve_team_id(client, &team_input, season).await?;
    let opponent_id = match &cli.opponent {
        Some(opponent) => Some(schedule::resolve_team_id(client, opponent, season).await?),
        None => None,
    };

    let start = (date - DateDelta::days(2)).to_string();
    let end = (date + DateDelta::days(3)).to_string();
    let games = client
        .fetch_schedule(team_id, &start, &end, opponent_id)
        .await?;
    if games.is_empty() {
        return Err(DugoutError::NoGames {
            date: date.to_string(),
        });
    }

    let (live, last_final, next_up) = schedule::choose_live_last_next(&games, Utc::now());
    if let Some(live) = live {
        return Ok(Some(live.game_pk));
    }

    println!("{}", style.wide_rule());
    if let Some(last) = last_final {
        println!("Last game:");
        println!("  {}", schedule::game_brief(last, zone));
    }
    if let Some(next) = next_up {
        println!("Next game:");
        println!("  {}", schedule::game_brief(next, zone));
    }

    schedule::select_game_interactive(&games, team_id, zone, date)
}

fn open_sink(log: Option<&str>) -> Result<Box<dyn Write>> {
    match log {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| DugoutError::SinkWrite {
                    path: PathBuf::from(path),
                    source: e,
                })?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(std::io::stdout())),
    }
}
