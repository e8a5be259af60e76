use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feedkeep_backend::config::Config;
use feedkeep_backend::db::Store;
use feedkeep_backend::services::{Fetcher, FollowService, Scheduler};
use feedkeep_backend::{routes, AppState};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "feedkeep_backend=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    let store = Store::connect(&config.database_url)
        .await
        .expect("failed to connect to database");
    let fetcher = Fetcher::new();
    let follow_service = FollowService::new(store.clone(), fetcher.clone());

    let shutdown = CancellationToken::new();

    let scheduler = Scheduler::new(
        store.clone(),
        fetcher.clone(),
        std::time::Duration::from_secs(config.scheduler_interval_secs),
        shutdown.clone(),
    );
    let scheduler_handle = tokio::spawn(scheduler.run());

    let state = Arc::new(AppState {
        store,
        follow_service,
    });

    let app = Router::new()
        .merge(routes::create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await.expect("failed to bind listener");
    tracing::info!("server running on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal(shutdown.clone()))
        .await
        .expect("server error");

    scheduler_handle.await.ok();
}

/// Resolves once SIGINT (or, on unix, SIGTERM/SIGHUP) is received, and trips
/// `shutdown` so the Scheduler drains its in-flight Tasks concurrently with
/// the HTTP server finishing its own in-flight requests.
async fn wait_for_shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl_c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        let mut sighup = signal(SignalKind::hangup()).expect("failed to install SIGHUP handler");
        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sighup.recv() => {},
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
    shutdown.cancel();
}
