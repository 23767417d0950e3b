//! Fetcher behavior against a mock stats API: conditional reads, token
//! handling, and the rejection/transient split.

use dugout::client::{PollOutcome, StatsApiClient};
use dugout::render::Style;
use dugout::stream::dump_game;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn live_feed_body() -> serde_json::Value {
    json!({
        "gameData": {
            "status": {"abstractGameState": "Live", "detailedState": "In Progress"},
            "teams": {
                "away": {"abbreviation": "LAD", "name": "Los Angeles Dodgers"},
                "home": {"abbreviation": "SF", "name": "San Francisco Giants"}
            }
        },
        "liveData": {
            "linescore": {"currentInning": 1, "inningState": "Top"},
            "plays": {"allPlays": [
                {"about": {"atBatIndex": 0, "halfInning": "top", "inning": 1},
                 "result": {"description": "Ohtani singles.", "eventType": "single"},
                 "count": {"balls": 1, "strikes": 2, "outs": 0}}
            ]}
        }
    })
}

#[tokio::test]
async fn poll_parses_snapshot_and_captures_etag() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.1/game/717715/feed/live"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"v1\"")
                .set_body_json(live_feed_body()),
        )
        .mount(&server)
        .await;

    let client = StatsApiClient::with_base_url(server.uri()).unwrap();
    let outcome = client.poll_live(717715, None).await.unwrap();

    match outcome {
        PollOutcome::Fetched { snapshot, etag } => {
            assert_eq!(etag.as_deref(), Some("\"v1\""));
            assert_eq!(snapshot.plays().len(), 1);
            assert_eq!(snapshot.plays()[0].description(), "Ohtani singles.");
        }
        other => panic!("expected Fetched, got {other:?}"),
    }
}

#[tokio::test]
async fn poll_sends_conditional_header_and_honors_304() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.1/game/717715/feed/live"))
        .and(header("If-None-Match", "\"v1\""))
        .respond_with(ResponseTemplate::new(304))
        .mount(&server)
        .await;

    let client = StatsApiClient::with_base_url(server.uri()).unwrap();
    let outcome = client.poll_live(717715, Some("\"v1\"")).await.unwrap();
    assert!(matches!(outcome, PollOutcome::NotModified));
}

#[tokio::test]
async fn poll_without_etag_header_clears_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.1/game/717715/feed/live"))
        .respond_with(ResponseTemplate::new(200).set_body_json(live_feed_body()))
        .mount(&server)
        .await;

    let client = StatsApiClient::with_base_url(server.uri()).unwrap();
    let outcome = client.poll_live(717715, Some("\"stale\"")).await.unwrap();
    match outcome {
        PollOutcome::Fetched { etag, .. } => assert!(etag.is_none()),
        other => panic!("expected Fetched, got {other:?}"),
    }
}

#[tokio::test]
async fn server_rejection_is_reported_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.1/game/717715/feed/live"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let client = StatsApiClient::with_base_url(server.uri()).unwrap();
    let outcome = client.poll_live(717715, None).await.unwrap();
    assert!(matches!(outcome, PollOutcome::Rejected { status: 503 }));
}

#[tokio::test]
async fn connectivity_failure_is_the_error_path() {
    // nothing listens here; connection is refused
    let client = StatsApiClient::with_base_url("http://127.0.0.1:9").unwrap();
    assert!(client.poll_live(717715, None).await.is_err());
}

#[tokio::test]
async fn dump_renders_history_without_live_base_fallback() {
    let server = MockServer::start().await;
    let mut body = live_feed_body();
    // runners on base right now must not decorate long-finished at-bats
    body["liveData"]["linescore"]["offense"] =
        json!({"first": {"fullName": "Mookie Betts"}});
    Mock::given(method("GET"))
        .and(path("/v1.1/game/717715/feed/live"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("game.log");
    let client = StatsApiClient::with_base_url(server.uri()).unwrap();
    dump_game(&client, 717715, &out_path, Style::plain())
        .await
        .unwrap();

    let text = std::fs::read_to_string(&out_path).unwrap();
    assert!(text.contains("Ohtani singles."));
    assert!(!text.contains("1B:"));
}

#[tokio::test]
async fn fetch_teams_unwraps_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/teams"))
        .and(query_param("sportId", "1"))
        .and(query_param("season", "2025"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "teams": [
                {"id": 119, "name": "Los Angeles Dodgers", "abbreviation": "LAD",
                 "teamName": "Dodgers", "clubName": "Dodgers"}
            ]
        })))
        .mount(&server)
        .await;

    let client = StatsApiClient::with_base_url(server.uri()).unwrap();
    let teams = client.fetch_teams(2025).await.unwrap();
    assert_eq!(teams.len(), 1);
    assert_eq!(teams[0].id, 119);
    assert_eq!(teams[0].abbreviation, "LAD");
}

#[tokio::test]
async fn fetch_schedule_flattens_dates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/schedule"))
        .and(query_param("teamId", "119"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dates": [
                {"games": [{"gamePk": 1, "gameDate": "2025-08-22T02:10:00Z",
                            "status": {"abstractGameState": "Final"}}]},
                {"games": [{"gamePk": 2, "gameDate": "2025-08-23T02:10:00Z",
                            "status": {"abstractGameState": "Preview"}}]}
            ]
        })))
        .mount(&server)
        .await;

    let client = StatsApiClient::with_base_url(server.uri()).unwrap();
    let games = client
        .fetch_schedule(119, "2025-08-21", "2025-08-26", None)
        .await
        .unwrap();
    assert_eq!(games.len(), 2);
    assert_eq!(games[0].game_pk, 1);
    assert_eq!(games[1].game_pk, 2);
}
