use crate::{
    cache::cache_key,
    error::{LoungeError, Result},
    metrics,
    server::{state::AppState, validation},
    upstream::FetchError,
};
use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use std::time::Instant;
use tracing::{error, warn};

/// Serve a single lounge table (match record) by numeric ID.
pub async fn table_lookup(
    Path(raw_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let start = Instant::now();

    let table_id = validation::table_id(&raw_id)?;

    let key = cache_key("table", &[("id", table_id.clone())]);

    if let Some(hit) = state.cache.get(&key) {
        metrics::record_cache_hit("table");
        metrics::record_request("table", 200);
        metrics::record_duration("table", start);
        return Ok(Json(hit).into_response());
    }
    metrics::record_cache_miss("table");

    match state.upstream.table(&table_id).await {
        Ok(data) => {
            state
                .cache
                .set(&key, data.clone(), state.cache.default_ttl());
            metrics::record_request("table", 200);
            metrics::record_duration("table", start);
            Ok(Json(data).into_response())
        }
        Err(err) if err.is_not_found() => {
            metrics::record_request("table", 404);
            metrics::record_duration("table", start);
            Err(LoungeError::NotFound(
                "No lounge table found for that ID".to_string(),
            ))
        }
        Err(FetchError::Status { status }) => {
            let purged = state.cache.invalidate(|key| key.starts_with("table"));
            warn!(
                "Upstream {} fetching table; invalidated {} cached entries",
                status, purged
            );
            metrics::record_upstream_error("table");
            metrics::record_request("table", status.as_u16());
            metrics::record_duration("table", start);
            Err(LoungeError::UpstreamStatus {
                status: status.as_u16(),
                message: "Failed to retrieve table".to_string(),
            })
        }
        Err(FetchError::Request(err)) => {
            state.cache.invalidate(|key| key.starts_with("table"));
            error!("Table fetch failed: {}", err);
            metrics::record_upstream_error("table");
            metrics::record_request("table", 500);
            metrics::record_duration("table", start);
            Err(LoungeError::Internal("Failed to fetch table".to_string()))
        }
    }
}
