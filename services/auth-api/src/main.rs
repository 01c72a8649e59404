//! Tollgate Auth API
//!
//! Account and refresh-token lifecycle service.
//!
//! ## gRPC Service
//!
//! Implements `tollgate.v1.AuthService` on `GRPC_ADDR`:
//! Register, Login, Logout, IsRefreshTokenValid, ChangePassword.
//! Server reflection is enabled.
//!
//! ## HTTP side channel
//!
//! Served on `HTTP_ADDR`:
//!
//! - `GET /health` - process liveness
//! - `GET /ready` - session store reachable and auth tables present
//! - `GET /metrics` - Prometheus exposition
//!
//! Both listeners stop accepting on SIGINT/SIGTERM and drain in-flight
//! requests before the process exits.

mod config;
mod error;
mod grpc;
mod handlers;
mod state;
mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tokio_util::sync::CancellationToken;
use tollgate_auth_core::AuthService;
use tollgate_db::pg::Repositories;
use tollgate_proto::auth_service::auth_service_server::AuthServiceServer;
use tonic::transport::Server as TonicServer;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::grpc::GrpcAuthService;
use crate::handlers::{health, ready};
use crate::state::AppState;

/// Histogram fed by every RPC; argon2-bound calls land in the upper buckets
const GRPC_LATENCY: &str = "grpc_request_duration_seconds";
const GRPC_LATENCY_BUCKETS: &[f64] = &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5];

const COUNTERS: &[(&str, &str)] = &[
    ("auth_registrations_total", "Users registered"),
    ("auth_logins_total", "Login attempts by result"),
    ("auth_sessions_revoked_total", "Sessions revoked by reason"),
    (
        "auth_token_checks_total",
        "Refresh-token checks by result (valid, invalid, rotated)",
    ),
    ("auth_password_changes_total", "Successful password changes"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("auth_api=debug".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        http_addr = %config.http_addr,
        grpc_addr = %config.grpc_addr,
        auth = ?config.auth,
        "Starting Tollgate Auth API"
    );

    let metrics_handle = config.metrics_enabled.then(install_metrics).transpose()?;

    let pool = tollgate_db::create_pool(&config.database_url).await?;
    tollgate_db::pg::ensure_schema(&pool).await?;

    // Stored session expiry follows the token lifetime
    let repos = Repositories::new(pool.clone()).with_session_ttl_days(config.session_ttl_days());
    let auth = AuthService::new(
        config.auth.clone(),
        Arc::new(repos.users),
        Arc::new(repos.sessions),
    )?;
    let state = AppState::new(auth, pool, config.clone());

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    let app = build_router(state.clone(), metrics_handle);

    // A listener that fails takes the other one down with it
    let result = tokio::try_join!(
        serve_http(app, config.http_addr, shutdown.clone()),
        serve_grpc(state, config.grpc_addr, shutdown.clone()),
    );
    shutdown.cancel();
    result?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let request_timeout = state.request_timeout();

    let traced = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::new(request_timeout));

    let mut router = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .layer(traced);

    // Scrapes bypass tracing and the timeout
    if let Some(handle) = metrics_handle {
        router = router.route("/metrics", get(move || async move { handle.render() }));
    }

    router.with_state(state)
}

async fn serve_http(
    app: Router,
    addr: SocketAddr,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "HTTP listener bound");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    tracing::info!("HTTP listener drained");
    Ok(())
}

async fn serve_grpc(
    state: AppState,
    addr: SocketAddr,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let reflection = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(tollgate_proto::tollgate::v1::FILE_DESCRIPTOR_SET)
        .build_v1()?;

    tracing::info!(%addr, "gRPC listener starting");
    TonicServer::builder()
        .add_service(reflection)
        .add_service(AuthServiceServer::new(GrpcAuthService::new(state.auth)))
        .serve_with_shutdown(addr, shutdown.cancelled_owned())
        .await?;

    tracing::info!("gRPC listener drained");
    Ok(())
}

fn install_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(GRPC_LATENCY.to_string()), GRPC_LATENCY_BUCKETS)?
        .install_recorder()?;

    for &(name, help) in COUNTERS {
        metrics::describe_counter!(name, help);
    }
    metrics::describe_histogram!(GRPC_LATENCY, metrics::Unit::Seconds, "gRPC latency by method");

    Ok(handle)
}

/// Cancel `shutdown` on the first SIGINT or SIGTERM
async fn cancel_on_signal(shutdown: CancellationToken) {
    let signal = tokio::select! {
        () = sigint() => "SIGINT",
        () = sigterm() => "SIGTERM",
        () = shutdown.cancelled() => return,
    };

    tracing::info!(signal, "Draining listeners");
    shutdown.cancel();
}

async fn sigint() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "SIGINT handler unavailable");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn sigterm() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "SIGTERM handler unavailable");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn sigterm() {
    std::future::pending::<()>().await;
}
