//! Newsroom API service
//!
//! The main entry point for all external API requests.
//! Handles:
//! - Authentication and authorization
//! - Rate limiting
//! - Request routing
//! - Observability (logging, metrics, tracing)

mod handlers;
mod middleware;

use axum::{
    extract::Request,
    routing::{delete, get, post, put},
    Extension, Router, ServiceExt,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use newsroom_common::{
    auth::JwtManager,
    config::{AppConfig, ObservabilityConfig},
    db::DbPool,
    errors::AppError,
    metrics,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::Layer;
use tower_http::{
    cors::{Any, CorsLayer},
    normalize_path::NormalizePathLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Arc::new(AppConfig::load()?);

    // Initialize tracing
    init_tracing(&config.observability);

    info!("Starting Newsroom API v{}", newsroom_common::VERSION);

    // Initialize metrics
    metrics::register_metrics();
    init_metrics_exporter(&config.observability)?;

    // Initialize database connection
    let db = DbPool::new(&config.database).await?;
    if config.database.run_migrations {
        db.run_migrations().await?;
    }

    // Token manager for login and bearer auth
    let jwt_secret = config
        .auth
        .jwt_secret
        .clone()
        .ok_or_else(|| AppError::Configuration {
            message: "auth.jwt_secret must be set (APP__AUTH__JWT_SECRET)".to_string(),
        })?;
    let jwt = Arc::new(JwtManager::new(
        &jwt_secret,
        config.auth.token_expiration_secs,
    ));

    // Create app state
    let state = AppState {
        config: config.clone(),
        db,
    };

    // Build the router; trailing slashes are normalized away
    let app = NormalizePathLayer::trim_trailing_slash().layer(create_router(state, jwt));

    // Start the server
    let bind_addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(bind_addr.as_str()).await?;
    info!("Listening on {}", bind_addr);

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState, jwt: Arc<JwtManager>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let mut router = Router::new()
        // Dashboard
        .route("/", get(handlers::dashboard::dashboard))
        // Health endpoints (no auth)
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        // Login (no auth)
        .route("/accounts/login", post(handlers::auth::login))
        // Topic endpoints
        .route("/topics", get(handlers::topics::list_topics))
        .route("/topics", post(handlers::topics::create_topic))
        .route("/topics/{id}", get(handlers::topics::get_topic))
        .route("/topics/{id}", delete(handlers::topics::delete_topic))
        // Newspaper endpoints
        .route("/newspapers", get(handlers::newspapers::list_newspapers))
        .route("/newspapers", post(handlers::newspapers::create_newspaper))
        .route("/newspapers/{id}", get(handlers::newspapers::get_newspaper))
        .route("/newspapers/{id}", put(handlers::newspapers::update_newspaper))
        .route("/newspapers/{id}", delete(handlers::newspapers::delete_newspaper))
        .route(
            "/newspapers/{id}/publishers",
            post(handlers::newspapers::assign_publisher),
        )
        .route(
            "/newspapers/{id}/publishers",
            delete(handlers::newspapers::remove_publisher),
        )
        // Redactor endpoints
        .route("/redactors", get(handlers::redactors::list_redactors))
        .route("/redactors", post(handlers::redactors::create_redactor))
        .route("/redactors/{id}", get(handlers::redactors::get_redactor))
        .route("/redactors/{id}", put(handlers::redactors::update_experience))
        .route("/redactors/{id}", delete(handlers::redactors::delete_redactor));

    if state.config.rate_limit.enabled {
        let limiter = middleware::rate_limit::create_rate_limiter(
            state.config.rate_limit.requests_per_second,
            state.config.rate_limit.burst,
        );
        router = router.layer(axum::middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit::rate_limit_middleware,
        ));
    }

    // Compose the app
    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .layer(Extension(jwt))
        .with_state(state)
}

fn init_tracing(config: &ObservabilityConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.json_logging {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Expose Prometheus metrics on the configured port; 0 disables the exporter
fn init_metrics_exporter(config: &ObservabilityConfig) -> anyhow::Result<()> {
    if config.metrics_port == 0 {
        return Ok(());
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            metrics::LATENCY_BUCKETS,
        )?
        .install()?;

    info!("Prometheus exporter listening on {}", addr);
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
