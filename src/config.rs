//! Optional config file with defaults for the most common flags. Lives at
//! `<config dir>/dugout/config.toml`; a missing file is not an error.

use crate::ui;
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_INTERVAL_SECS: f64 = 2.5;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub team: Option<String>,
    pub interval: Option<f64>,
    pub no_color: Option<bool>,
    pub tz: Option<String>,
    pub line_score: Option<bool>,
    pub box_interval: Option<f64>,
}

impl FileConfig {
    /// Load the config file if present. Malformed content degrades to
    /// defaults with a single warning; the stream must still start.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &PathBuf) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match toml::from_str(&content) {
            Ok(cfg) => cfg,
            Err(e) => {
                ui::warning(&format!("ignoring malformed {}: {e}", path.display()));
                Self::default()
            }
        }
    }

    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("dugout").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = FileConfig::load_from(&PathBuf::from("/nonexistent/dugout.toml"));
        assert!(cfg.team.is_none());
        assert!(cfg.interval.is_none());
    }

    #[test]
    fn parses_known_keys() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(
            f,
            "team = \"LAD\"\ninterval = 5.0\nno_color = true\nline_score = true"
        )
        .unwrap();
        let cfg = FileConfig::load_from(&f.path().to_path_buf());
        assert_eq!(cfg.team.as_deref(), Some("LAD"));
        assert_eq!(cfg.interval, Some(5.0));
        assert_eq!(cfg.no_color, Some(true));
        assert_eq!(cfg.line_score, Some(true));
    }

    #[test]
    fn malformed_file_degrades_to_defaults() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "team = [not toml").unwrap();
        let cfg = FileConfig::load_from(&f.path().to_path_buf());
        assert!(cfg.team.is_none());
    }
}
