//! HTTP access to the MLB Stats API: conditional live-feed polls with
//! ETag caching, plus the schedule and teams lookups.

use crate::error::Result;
use crate::feed::Snapshot;
use crate::schedule::{ScheduleGame, ScheduleResponse, Team, TeamsResponse};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ETAG, IF_NONE_MATCH, REFERER, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;

pub const API_BASE: &str = "https://statsapi.mlb.com/api";

const UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                  AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0.0.0 Safari/537.36";

/// Ceiling for the exponential retry wait.
pub const BACKOFF_CEILING: Duration = Duration::from_secs(20);

/// Exponential backoff for connectivity failures. The wait doubles per
/// consecutive failure from the base interval up to [`BACKOFF_CEILING`];
/// any success resets it.
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(base: Duration) -> Self {
        Self {
            base,
            current: base,
        }
    }

    /// The wait to apply for the failure just observed. Doubles the next
    /// wait, capped at the ceiling.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(BACKOFF_CEILING);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.base;
    }
}

/// Outcome of one conditional live-feed poll. Connectivity failures are the
/// `Err` path; everything the server actually answered is an `Ok` variant.
#[derive(Debug)]
pub enum PollOutcome {
    /// Fresh document. The token replaces the stored one unconditionally;
    /// `None` means the server disabled caching for this cycle.
    Fetched {
        snapshot: Box<Snapshot>,
        etag: Option<String>,
    },
    /// The document is unchanged; nothing to parse or render.
    NotModified,
    /// Client/server rejection (HTTP >= 400). Warned and retried at the
    /// base interval, never escalated to backoff.
    Rejected { status: u16 },
}

/// Seam between the driver loop and the network, so the loop can be driven
/// by a scripted source in tests.
pub trait FeedSource {
    fn poll(&self, etag: Option<&str>) -> impl Future<Output = Result<PollOutcome>> + Send;
}

#[derive(Clone)]
pub struct StatsApiClient {
    client: Client,
    base_url: String,
}

impl StatsApiClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(API_BASE)
    }

    /// Point the client at an alternate base URL (tests).
    pub fn with_base_url<S: Into<String>>(base_url: S) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(UA));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(REFERER, HeaderValue::from_static("https://www.mlb.com/"));

        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn live_feed_url(&self, gamepk: u64) -> String {
        format!("{}/v1.1/game/{}/feed/live", self.base_url, gamepk)
    }

    /// One conditional read of the live feed. Sends `If-None-Match` when a
    /// token is held; HTTP 304 short-circuits re-parsing.
    pub async fn poll_live(&self, gamepk: u64, etag: Option<&str>) -> Result<PollOutcome> {
        let mut request = self.client.get(self.live_feed_url(gamepk));
        if let Some(tag) = etag {
            request = request.header(IF_NONE_MATCH, tag);
        }

        let response = request.send().await?;

        if response.status() == StatusCode::NOT_MODIFIED {
            return Ok(PollOutcome::NotModified);
        }
        if response.status().as_u16() >= 400 {
            return Ok(PollOutcome::Rejected {
                status: response.status().as_u16(),
            });
        }

        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let snapshot: Snapshot = response.json().await?;

        Ok(PollOutcome::Fetched {
            snapshot: Box::new(snapshot),
            etag,
        })
    }

    /// Unconditional fetch, for the one-shot dump.
    pub async fn fetch_live(&self, gamepk: u64) -> Result<Snapshot> {
        let response = self
            .client
            .get(self.live_feed_url(gamepk))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// Active teams for a season.
    pub async fn fetch_teams(&self, season: i32) -> Result<Vec<Team>> {
        let url = format!("{}/v1/teams", self.base_url);
        let response = self
            .client
            .get(url)
            .query(&[
                ("sportId", "1".to_string()),
                ("season", season.to_string()),
                ("activeStatus", "Y".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;
        let body: TeamsResponse = response.json().await?;
        Ok(body.teams)
    }

    /// A team's schedule over a date range, flattened across dates.
    pub async fn fetch_schedule(
        &self,
        team_id: u64,
        start_date: &str,
        end_date: &str,
        opponent_id: Option<u64>,
    ) -> Result<Vec<ScheduleGame>> {
        let url = format!("{}/v1/schedule", self.base_url);
        let mut query = vec![
            ("sportId", "1".to_string()),
            ("teamId", team_id.to_string()),
            ("startDate", start_date.to_string()),
            ("endDate", end_date.to_string()),
            ("hydrate", "linescore,team,flags,statusFlags".to_string()),
        ];
        if let Some(opponent) = opponent_id {
            query.push(("opponentId", opponent.to_string()));
        }

        let response = self
            .client
            .get(url)
            .query(&query)
            .send()
            .await?
            .error_for_status()?;
        let body: ScheduleResponse = response.json().await?;

        let mut games = Vec::new();
        for date in body.dates {
            games.extend(date.games);
        }
        Ok(games)
    }
}

/// A single game's live feed, bound to a client. This is the production
/// [`FeedSource`] the driver loop runs against.
#[derive(Clone)]
pub struct GameFeed {
    client: StatsApiClient,
    gamepk: u64,
}

impl GameFeed {
    pub fn new(client: StatsApiClient, gamepk: u64) -> Self {
        Self { client, gamepk }
    }
}

impl FeedSource for GameFeed {
    fn poll(&self, etag: Option<&str>) -> impl Future<Output = Result<PollOutcome>> + Send {
        self.client.poll_live(self.gamepk, etag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let mut backoff = Backoff::new(Duration::from_secs(2));
        assert_eq!(backoff.next_delay(), Duration::from_secs(2));
        assert_eq!(backoff.next_delay(), Duration::from_secs(4));
        assert_eq!(backoff.next_delay(), Duration::from_secs(8));
        assert_eq!(backoff.next_delay(), Duration::from_secs(16));
        assert_eq!(backoff.next_delay(), Duration::from_secs(20));
        assert_eq!(backoff.next_delay(), Duration::from_secs(20));
    }

    #[test]
    fn backoff_resets_to_base() {
        let mut backoff = Backoff::new(Duration::from_secs(2));
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_secs(2));
    }
}
