pub mod handlers;
pub mod state;
pub mod validation;

use crate::config::Config;
use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, Method, header},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use state::AppState;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

/// Build the full application router.
///
/// Split from [`start`] so tests can drive the router directly with
/// `tower::ServiceExt::oneshot` instead of binding a listener.
pub fn build_router(config: Config) -> Router {
    let cors = cors_layer(&config);
    let state = AppState::new(config);

    Router::new()
        .route("/", get(handlers::health::health_check))
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::health::prometheus_metrics))
        .route(
            "/api/player/details/{name}",
            get(handlers::player::player_details),
        )
        .route(
            "/api/player/leaderboard/{name}",
            get(handlers::player::player_leaderboard),
        )
        .route("/api/player/stats", get(handlers::player::player_stats))
        .route(
            "/api/players/compare",
            get(handlers::compare::compare_players),
        )
        .route("/api/leaderboard", get(handlers::leaderboard::leaderboard))
        .route("/api/table/{tableid}", get(handlers::table::table_lookup))
        .layer(middleware::from_fn(version_header))
        .layer(cors)
        .with_state(state)
}

/// Dev mode allows any origin; production pins CORS to the configured
/// frontend origin and enables credentials.
fn cors_layer(config: &Config) -> CorsLayer {
    if config.is_dev {
        return CorsLayer::permissive();
    }

    match config.frontend_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true),
        Some(Err(_)) => {
            warn!("FRONTEND_URL is not a valid header value; allowing any origin");
            CorsLayer::new().allow_origin(Any).allow_methods([Method::GET])
        }
        None => {
            warn!("FRONTEND_URL not set in production; allowing any origin");
            CorsLayer::new().allow_origin(Any).allow_methods([Method::GET])
        }
    }
}

/// Stamp every response with the crate version.
async fn version_header(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response.headers_mut().insert(
        "x-lounge-version",
        HeaderValue::from_static(env!("CARGO_PKG_VERSION")),
    );
    response
}

/// Start the Axum HTTP server
pub async fn start(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("0.0.0.0:{}", config.port);

    let app = build_router(config);

    let listener = match tokio::net::TcpListener::bind(addr.as_str()).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to address {}: {}", addr, e);
            return Err(e.into());
        }
    };

    info!("Server listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
