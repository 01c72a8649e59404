//! Liveness and readiness endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// Session store condition as seen by `/ready`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreStatus {
    /// Reachable, with `auth.users` and `auth.sessions` in place
    Ready,
    /// Reachable, but the auth tables are gone
    SchemaMissing,
    /// Query failed or the pool timed out
    Unreachable,
}

#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreStatus>,
}

/// GET /health - process is up; touches nothing else
pub async fn health() -> Json<ServiceStatus> {
    Json(ServiceStatus {
        status: "ok",
        store: None,
    })
}

/// GET /ready - 200 only while the session store can serve requests
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ServiceStatus>) {
    let store = match tollgate_db::pg::schema_present(&state.pool).await {
        Ok(true) => StoreStatus::Ready,
        Ok(false) => {
            tracing::warn!("Auth tables missing; not ready");
            StoreStatus::SchemaMissing
        }
        Err(e) => {
            tracing::warn!(error = %e, "Session store unreachable; not ready");
            StoreStatus::Unreachable
        }
    };

    let (code, status) = match store {
        StoreStatus::Ready => (StatusCode::OK, "ready"),
        _ => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
    };

    (
        code,
        Json(ServiceStatus {
            status,
            store: Some(store),
        }),
    )
}
