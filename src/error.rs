use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for dugout operations
pub type Result<T> = std::result::Result<T, DugoutError>;

#[derive(Debug, Error)]
pub enum DugoutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Dialoguer error: {0}")]
    Dialoguer(#[from] dialoguer::Error),

    #[error("Could not resolve team: {0}")]
    TeamNotFound(String),

    #[error("No games found for {date}")]
    NoGames { date: String },

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Failed to write {path}: {source}")]
    SinkWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

impl DugoutError {
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Io(err) => format!("I/O operation failed: {err}"),
            Self::Http(err) => format!("Request to the stats API failed: {err}"),
            Self::Dialoguer(err) => format!("UI interaction error: {err}"),
            Self::TeamNotFound(team) => format!(
                "Could not resolve team '{team}'. Try an abbreviation (LAD), a club name \
                 (Dodgers), or a numeric team id"
            ),
            Self::NoGames { date } => format!("No games found for {date}"),
            Self::UnknownTimezone(tz) => {
                format!("Unknown timezone '{tz}'. Use an IANA name like America/New_York")
            }
            Self::InvalidArgument { message } => message.clone(),
            Self::SinkWrite { path, source } => {
                format!("Failed to write {}: {source}", path.display())
            }
            Self::Other(msg) => msg.clone(),
        }
    }
}
