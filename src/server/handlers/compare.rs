use crate::{
    cache::cache_key,
    error::{LoungeError, Result},
    metrics,
    server::{state::AppState, validation},
};
use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use futures_util::future::join_all;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Instant;

/// Most players a single compare request may name.
const MAX_COMPARE_PLAYERS: usize = 4;

#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    /// Comma-separated player names.
    names: Option<String>,
    season: Option<String>,
}

/// Compare up to four players side by side.
///
/// Upstream calls run concurrently, one per name, and the response waits
/// for all of them. A player the upstream cannot find does not fail the
/// batch — that slot carries `{error: true, name, message}` instead, so
/// callers can separate valid players from misses.
pub async fn compare_players(
    Query(query): Query<CompareQuery>,
    State(state): State<AppState>,
) -> Result<Response> {
    let start = Instant::now();

    let raw_names: Vec<&str> = query
        .names
        .as_deref()
        .map(|csv| csv.split(',').collect())
        .unwrap_or_default();

    if raw_names.is_empty() || raw_names.len() > MAX_COMPARE_PLAYERS {
        return Err(LoungeError::InvalidInput(
            "Please provide 1-4 player names separated by commas".to_string(),
        ));
    }

    let mut names = Vec::with_capacity(raw_names.len());
    for raw in raw_names {
        let name = validation::player_name(raw)
            .map_err(|err| LoungeError::InvalidInput(format!("Invalid player name: {err}")))?;
        names.push(name);
    }

    let season = validation::season_or_default(query.season.as_deref())?;

    // Sorted copy for the key so "a,b" and "b,a" share a cache entry;
    // the response itself keeps the requested order.
    let mut sorted_names = names.clone();
    sorted_names.sort();
    let key = cache_key(
        "players-compare",
        &[
            ("names", sorted_names.join(",")),
            ("season", season.to_string()),
        ],
    );

    if let Some(hit) = state.cache.get(&key) {
        metrics::record_cache_hit("players-compare");
        metrics::record_request("players-compare", 200);
        metrics::record_duration("players-compare", start);
        return Ok(Json(hit).into_response());
    }
    metrics::record_cache_miss("players-compare");

    let fetches = names.iter().map(|name| {
        let upstream = state.upstream.clone();
        let name = name.clone();
        async move {
            match upstream.player_details(&name, season).await {
                Ok(player) => player,
                Err(err) => {
                    // Per-player failures are captured in the slot, never
                    // thrown — the batch itself still succeeds.
                    let message = if err.is_not_found() {
                        "Player not found".to_string()
                    } else {
                        format!("Failed to fetch player \"{name}\"")
                    };
                    json!({ "error": true, "name": name, "message": message })
                }
            }
        }
    });

    let results = Value::Array(join_all(fetches).await);

    state
        .cache
        .set(&key, results.clone(), state.cache.default_ttl());
    metrics::record_request("players-compare", 200);
    metrics::record_duration("players-compare", start);
    Ok(Json(results).into_response())
}
