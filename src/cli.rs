use crate::error::{DugoutError, Result};
use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "dugout")]
#[command(
    author,
    version,
    about = "Stream MLB play-by-play in your terminal"
)]
pub struct Cli {
    /// Team id, abbreviation, or name (e.g., 119, LAD, Dodgers)
    pub team: Option<String>,

    /// Team id, abbreviation, or name (alternative to the positional argument)
    #[clap(long = "team", value_name = "TEAM")]
    pub team_flag: Option<String>,

    /// Date to look up, YYYY-MM-DD (default: today in the local timezone)
    #[clap(long)]
    pub date: Option<String>,

    /// MLB gamePk (skips the schedule lookup entirely)
    #[clap(long)]
    pub gamepk: Option<u64>,

    /// Opponent id, abbreviation, or name to disambiguate doubleheaders
    #[clap(long)]
    pub opponent: Option<String>,

    /// Poll interval in seconds
    #[clap(long)]
    pub interval: Option<f64>,

    /// Print each pitch as it arrives
    #[clap(long)]
    pub pitches: bool,

    /// Print all prior at-bats on the first fetch
    #[clap(long = "from-start")]
    pub from_start: bool,

    /// Disable ANSI color
    #[clap(long = "no-color")]
    pub no_color: bool,

    /// Only print scoring plays and inning transitions
    #[clap(long = "scoring-only")]
    pub scoring_only: bool,

    /// Print a compact inning-by-inning linescore under the scoreboard
    #[clap(long = "line-score")]
    pub line_score: bool,

    /// Every N minutes, reprint the scoreboard even if unchanged
    #[clap(long = "box-interval", value_name = "MINUTES")]
    pub box_interval: Option<f64>,

    /// IANA timezone for start times (e.g., America/New_York). Defaults to local
    #[clap(long)]
    pub tz: Option<String>,

    /// Scoreboard and inning banners only
    #[clap(short, long)]
    pub quiet: bool,

    /// More details: pitches and runners
    #[clap(short, long)]
    pub verbose: bool,

    /// Append the event stream to a file instead of stdout
    #[clap(long, value_name = "FILE")]
    pub log: Option<String>,

    /// Write the full game log to a file once and exit
    #[clap(long, value_name = "FILE")]
    pub dump: Option<String>,
}

/// Convert a user-supplied number of seconds into a `Duration`, rejecting
/// zero, negatives, NaN, and values too large to represent.
pub fn positive_duration(seconds: f64, flag: &str) -> Result<Duration> {
    if !(seconds > 0.0) {
        return Err(DugoutError::invalid_argument(format!(
            "{flag} must be a positive number of seconds"
        )));
    }
    Duration::try_from_secs_f64(seconds).map_err(|_| {
        DugoutError::invalid_argument(format!("{flag} is out of range"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_duration_accepts_fractional_seconds() {
        let d = positive_duration(2.5, "--interval").unwrap();
        assert_eq!(d, Duration::from_millis(2500));
    }

    #[test]
    fn positive_duration_rejects_nonpositive_and_nan() {
        assert!(positive_duration(0.0, "--interval").is_err());
        assert!(positive_duration(-1.0, "--interval").is_err());
        assert!(positive_duration(f64::NAN, "--interval").is_err());
    }

    #[test]
    fn positive_duration_rejects_unrepresentable_values() {
        assert!(positive_duration(f64::INFINITY, "--box-interval").is_err());
        assert!(positive_duration(1e30, "--box-interval").is_err());
    }
}
