//! Client for the upstream lounge ranking API.
//!
//! Wraps a pooled reqwest client, folds failures into [`FetchError`] and
//! reshapes the leaderboard payload into the stable contract the frontend
//! consumes. All other payloads pass through as raw JSON.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::info;
use url::Url;

/// Game identifier sent upstream by endpoints that do not take one.
pub const DEFAULT_GAME: &str = "mkworld";

/// Wall-clock bound for each upstream call. Timeouts surface as
/// [`FetchError::Request`], never as a client error.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Upstream failure, split into "the service answered with an error
/// status" and "the call itself failed" (connect, timeout, decode).
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("upstream returned {status}")]
    Status { status: StatusCode },

    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Status { status } if *status == StatusCode::NOT_FOUND)
    }
}

/// Query forwarded to the upstream leaderboard endpoint.
#[derive(Debug, Clone)]
pub struct LeaderboardQuery {
    pub season: u32,
    pub skip: u32,
    pub page_size: u32,
    pub sort_by: String,
    pub min_mmr: Option<i64>,
    pub max_mmr: Option<i64>,
    pub search: Option<String>,
}

/// Shape of the upstream leaderboard body. Missing fields degrade to
/// empty rather than failing the request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct UpstreamLeaderboard {
    data: Vec<Value>,
    total_players: u64,
}

/// Stable leaderboard contract served to callers.
///
/// The upstream only reports `totalPlayers`; both count fields carry it so
/// callers keyed to either name keep working.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardPage {
    pub data: Vec<Value>,
    pub total_count: u64,
    pub total_players: u64,
}

impl From<UpstreamLeaderboard> for LeaderboardPage {
    fn from(upstream: UpstreamLeaderboard) -> Self {
        Self {
            data: upstream.data,
            total_count: upstream.total_players,
            total_players: upstream.total_players,
        }
    }
}

/// HTTP client for the ranking service, shared across handlers.
#[derive(Clone)]
pub struct LoungeClient {
    http: Client,
    base_url: Url,
}

impl LoungeClient {
    /// Build a client for the given API base URL.
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        // A trailing slash makes Url::join treat the last path segment as
        // a directory instead of replacing it.
        let mut base = base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)?;

        let http = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self { http, base_url })
    }

    pub async fn player_details(&self, name: &str, season: u32) -> Result<Value, FetchError> {
        info!("Fetching player details for \"{}\" (season {})", name, season);
        let query = [
            ("name", name.to_string()),
            ("game", DEFAULT_GAME.to_string()),
            ("season", season.to_string()),
        ];
        self.get_json("player/details", &query).await
    }

    /// Fetch a leaderboard page and reshape it into [`LeaderboardPage`].
    pub async fn leaderboard(
        &self,
        query: &LeaderboardQuery,
    ) -> Result<LeaderboardPage, FetchError> {
        let mut params = vec![
            ("game", DEFAULT_GAME.to_string()),
            ("season", query.season.to_string()),
            ("skip", query.skip.to_string()),
            ("pageSize", query.page_size.to_string()),
            ("sortBy", query.sort_by.clone()),
        ];
        if let Some(min_mmr) = query.min_mmr {
            params.push(("minMmr", min_mmr.to_string()));
        }
        if let Some(max_mmr) = query.max_mmr {
            params.push(("maxMmr", max_mmr.to_string()));
        }
        if let Some(search) = &query.search {
            params.push(("search", search.clone()));
        }

        info!("Fetching leaderboard (season {})", query.season);
        let raw = self.get_json("player/leaderboard", &params).await?;
        let upstream: UpstreamLeaderboard = serde_json::from_value(raw).unwrap_or_default();
        Ok(upstream.into())
    }

    /// Run the upstream fuzzy name search and return the raw candidate
    /// list. Callers narrow it down (e.g. to an exact match).
    pub async fn leaderboard_search(
        &self,
        name: &str,
        season: u32,
    ) -> Result<Vec<Value>, FetchError> {
        info!("Searching leaderboard for \"{}\" (season {})", name, season);
        let query = [
            ("game", DEFAULT_GAME.to_string()),
            ("season", season.to_string()),
            ("search", name.to_string()),
        ];
        let raw = self.get_json("player/leaderboard", &query).await?;
        Ok(raw
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    pub async fn table(&self, table_id: &str) -> Result<Value, FetchError> {
        info!("Fetching table {}", table_id);
        let query = [("tableId", table_id.to_string())];
        self.get_json("table", &query).await
    }

    pub async fn player_stats(&self, season: u32, game: &str) -> Result<Value, FetchError> {
        info!("Fetching player stats (game {}, season {})", game, season);
        let query = [("game", game.to_string()), ("season", season.to_string())];
        self.get_json("player/stats", &query).await
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, FetchError> {
        let url = self
            .base_url
            .join(path)
            .expect("endpoint paths are valid relative URLs");

        let response = self.http.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status });
        }

        Ok(response.json::<Value>().await?)
    }
}
