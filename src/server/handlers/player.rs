use crate::{
    cache::cache_key,
    error::{LoungeError, Result},
    metrics,
    server::{state::AppState, validation},
    upstream::{DEFAULT_GAME, FetchError},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;
use std::time::Instant;
use tracing::{error, warn};

#[derive(Debug, Deserialize)]
pub struct SeasonQuery {
    /// Kept as a raw string so "0" and garbage are distinguishable from
    /// an absent parameter.
    season: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    season: Option<String>,
    game: Option<String>,
}

/// Serve full player details, proxied from the upstream ranking API.
///
/// Details change slowly, so entries live twice as long as the default
/// cache TTL.
pub async fn player_details(
    Path(raw_name): Path<String>,
    Query(query): Query<SeasonQuery>,
    State(state): State<AppState>,
) -> Result<Response> {
    let start = Instant::now();

    let name = validation::player_name(&raw_name)?;
    let season = validation::season_or_default(query.season.as_deref())?;

    let key = cache_key(
        "player-details",
        &[("name", name.clone()), ("season", season.to_string())],
    );

    if let Some(hit) = state.cache.get(&key) {
        metrics::record_cache_hit("player-details");
        metrics::record_request("player-details", 200);
        metrics::record_duration("player-details", start);
        return Ok(Json(hit).into_response());
    }
    metrics::record_cache_miss("player-details");

    match state.upstream.player_details(&name, season).await {
        Ok(data) => {
            state
                .cache
                .set(&key, data.clone(), state.cache.default_ttl() * 2);
            metrics::record_request("player-details", 200);
            metrics::record_duration("player-details", start);
            Ok(Json(data).into_response())
        }
        Err(err) if err.is_not_found() => {
            metrics::record_request("player-details", 404);
            metrics::record_duration("player-details", start);
            // The message names what the caller asked for, not the
            // sanitized form.
            Err(LoungeError::NotFound(format!(
                "No lounge records found for \"{raw_name}\""
            )))
        }
        Err(FetchError::Status { status }) => {
            let purged = state.cache.invalidate(|key| key.starts_with("player-details"));
            warn!(
                "Upstream {} fetching player details; invalidated {} cached entries",
                status, purged
            );
            metrics::record_upstream_error("player-details");
            metrics::record_request("player-details", status.as_u16());
            metrics::record_duration("player-details", start);
            Err(LoungeError::UpstreamStatus {
                status: status.as_u16(),
                message: "Failed to retrieve player details".to_string(),
            })
        }
        Err(FetchError::Request(err)) => {
            state.cache.invalidate(|key| key.starts_with("player-details"));
            error!("Player details fetch failed: {}", err);
            metrics::record_upstream_error("player-details");
            metrics::record_request("player-details", 500);
            metrics::record_duration("player-details", start);
            Err(LoungeError::Internal(
                "Failed to fetch player details".to_string(),
            ))
        }
    }
}

/// Look a player up on the leaderboard by exact name.
///
/// The upstream search endpoint is fuzzy; this handler narrows it to a
/// case-insensitive exact match and 404s when none of the candidates
/// matches, even if the upstream returned some.
pub async fn player_leaderboard(
    Path(raw_name): Path<String>,
    Query(query): Query<SeasonQuery>,
    State(state): State<AppState>,
) -> Result<Response> {
    let start = Instant::now();

    let name = validation::player_name(&raw_name)?;
    let season = validation::season_or_default(query.season.as_deref())?;

    let key = cache_key(
        "player-leaderboard",
        &[("name", name.clone()), ("season", season.to_string())],
    );

    if let Some(hit) = state.cache.get(&key) {
        metrics::record_cache_hit("player-leaderboard");
        metrics::record_request("player-leaderboard", 200);
        metrics::record_duration("player-leaderboard", start);
        return Ok(Json(hit).into_response());
    }
    metrics::record_cache_miss("player-leaderboard");

    match state.upstream.leaderboard_search(&name, season).await {
        Ok(candidates) => {
            let wanted = name.to_lowercase();
            let matched = candidates.into_iter().find(|candidate| {
                candidate
                    .get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|candidate_name| candidate_name.to_lowercase() == wanted)
            });

            match matched {
                Some(player) => {
                    state
                        .cache
                        .set(&key, player.clone(), state.cache.default_ttl());
                    metrics::record_request("player-leaderboard", 200);
                    metrics::record_duration("player-leaderboard", start);
                    Ok(Json(player).into_response())
                }
                None => {
                    metrics::record_request("player-leaderboard", 404);
                    metrics::record_duration("player-leaderboard", start);
                    Err(LoungeError::NotFound("Player not found".to_string()))
                }
            }
        }
        Err(err) => {
            let purged = state
                .cache
                .invalidate(|key| key.starts_with("player-leaderboard"));
            warn!(
                "Leaderboard search failed ({}); invalidated {} cached entries",
                err, purged
            );
            metrics::record_upstream_error("player-leaderboard");
            metrics::record_request("player-leaderboard", 500);
            metrics::record_duration("player-leaderboard", start);
            Err(LoungeError::Internal("Failed to fetch data".to_string()))
        }
    }
}

/// Serve season-wide player statistics. Slow-moving data, cached at 2×
/// the default TTL like player details.
pub async fn player_stats(
    Query(query): Query<StatsQuery>,
    State(state): State<AppState>,
) -> Result<Response> {
    let start = Instant::now();

    let season = validation::season_or_default(query.season.as_deref())?;
    let game = match query.game.as_deref() {
        Some(raw) => validation::game(raw)?,
        None => DEFAULT_GAME.to_string(),
    };

    let key = cache_key(
        "player-stats",
        &[("game", game.clone()), ("season", season.to_string())],
    );

    if let Some(hit) = state.cache.get(&key) {
        metrics::record_cache_hit("player-stats");
        metrics::record_request("player-stats", 200);
        metrics::record_duration("player-stats", start);
        return Ok(Json(hit).into_response());
    }
    metrics::record_cache_miss("player-stats");

    match state.upstream.player_stats(season, &game).await {
        Ok(data) => {
            state
                .cache
                .set(&key, data.clone(), state.cache.default_ttl() * 2);
            metrics::record_request("player-stats", 200);
            metrics::record_duration("player-stats", start);
            Ok(Json(data).into_response())
        }
        Err(err) => {
            let purged = state.cache.invalidate(|key| key.starts_with("player-stats"));
            warn!(
                "Player stats fetch failed ({}); invalidated {} cached entries",
                err, purged
            );
            metrics::record_upstream_error("player-stats");
            metrics::record_request("player-stats", 500);
            metrics::record_duration("player-stats", start);
            Err(LoungeError::Internal(
                "Failed to fetch player stats".to_string(),
            ))
        }
    }
}
