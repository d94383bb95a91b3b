use crate::{
    cache::cache_key,
    error::{LoungeError, Result},
    metrics,
    server::{state::AppState, validation},
    upstream::LeaderboardQuery,
};
use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::time::Instant;
use tracing::warn;

const DEFAULT_PAGE_SIZE: u32 = 50;

/// Hard cap forwarded upstream no matter what the caller asked for.
const MAX_PAGE_SIZE: u32 = 100;

const DEFAULT_SORT: &str = "Mmr";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardParams {
    skip: Option<String>,
    page_size: Option<String>,
    min_mmr: Option<String>,
    max_mmr: Option<String>,
    search: Option<String>,
    sort_by: Option<String>,
    season: Option<String>,
}

/// Serve a leaderboard page with pagination and filters.
///
/// The upstream reports `totalPlayers`; the response exposes it as both
/// `totalCount` and `totalPlayers` so existing callers keep working.
pub async fn leaderboard(
    Query(params): Query<LeaderboardParams>,
    State(state): State<AppState>,
) -> Result<Response> {
    let start = Instant::now();

    let season = validation::season_or_default(params.season.as_deref())?;

    // Numeric filters degrade to their defaults rather than erroring;
    // only season gets strict validation on this endpoint.
    let skip = params
        .skip
        .as_deref()
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(0);
    let page_size = params
        .page_size
        .as_deref()
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .min(MAX_PAGE_SIZE);
    let min_mmr = params
        .min_mmr
        .as_deref()
        .and_then(|v| v.trim().parse::<i64>().ok());
    let max_mmr = params
        .max_mmr
        .as_deref()
        .and_then(|v| v.trim().parse::<i64>().ok());
    let sort_by = params
        .sort_by
        .clone()
        .unwrap_or_else(|| DEFAULT_SORT.to_string());
    let search = params.search.as_deref().and_then(validation::search_term);

    let query = LeaderboardQuery {
        season,
        skip,
        page_size,
        sort_by,
        min_mmr,
        max_mmr,
        search,
    };

    let mut key_params = vec![
        ("skip", skip.to_string()),
        ("pageSize", page_size.to_string()),
        ("sortBy", query.sort_by.clone()),
        ("season", season.to_string()),
    ];
    if let Some(min_mmr) = min_mmr {
        key_params.push(("minMmr", min_mmr.to_string()));
    }
    if let Some(max_mmr) = max_mmr {
        key_params.push(("maxMmr", max_mmr.to_string()));
    }
    if let Some(search) = &query.search {
        key_params.push(("search", search.clone()));
    }
    let key = cache_key("leaderboard", &key_params);

    if let Some(hit) = state.cache.get(&key) {
        metrics::record_cache_hit("leaderboard");
        metrics::record_request("leaderboard", 200);
        metrics::record_duration("leaderboard", start);
        return Ok(Json(hit).into_response());
    }
    metrics::record_cache_miss("leaderboard");

    match state.upstream.leaderboard(&query).await {
        Ok(page) => {
            let body = serde_json::to_value(&page)
                .map_err(|err| LoungeError::Internal(err.to_string()))?;
            state
                .cache
                .set(&key, body.clone(), state.cache.default_ttl());
            metrics::record_request("leaderboard", 200);
            metrics::record_duration("leaderboard", start);
            Ok(Json(body).into_response())
        }
        Err(err) => {
            let purged = state.cache.invalidate(|key| key.starts_with("leaderboard"));
            warn!(
                "Leaderboard fetch failed ({}); invalidated {} cached entries",
                err, purged
            );
            metrics::record_upstream_error("leaderboard");
            metrics::record_request("leaderboard", 500);
            metrics::record_duration("leaderboard", start);
            Err(LoungeError::Internal(
                "Failed to fetch leaderboard".to_string(),
            ))
        }
    }
}
