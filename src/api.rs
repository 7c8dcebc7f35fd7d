// 🌐 REST API - thin axum adapter over the ledger
//
// Store work is blocking (SQLite behind a mutex), so every handler hops onto
// the blocking pool before touching the ledger.

use crate::error::{LedgerError, StoreError};
use crate::ledger::Ledger;
use crate::registry::RegistryView;
use crate::store::RegistryStore;
use crate::validation::{RechargeRequest, TransferRequest};
use axum::{
    extract::{rejection::JsonRejection, OriginalUri, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
pub struct AppState<S> {
    pub ledger: Arc<Ledger<S>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
        }
    }
}

/// Error body returned for every failed request
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    pub path: String,
    pub status: u16,
    pub timestamp: String,
}

/// A ledger failure plus the request path it happened on
pub struct ApiError {
    error: LedgerError,
    path: String,
}

impl ApiError {
    fn new(error: LedgerError, uri: &OriginalUri) -> Self {
        Self {
            error,
            path: uri.0.path().to_string(),
        }
    }
}

pub fn status_for(error: &LedgerError) -> StatusCode {
    match error {
        LedgerError::RegistryNotFound { .. } => StatusCode::NOT_FOUND,
        LedgerError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
        LedgerError::InsufficientFunds { .. } => StatusCode::BAD_REQUEST,
        LedgerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.error);

        if status.is_server_error() {
            tracing::error!(path = %self.path, error = %self.error, "request failed");
        } else {
            tracing::warn!(path = %self.path, kind = self.error.kind(), error = %self.error, "request rejected");
        }

        let body = ErrorBody {
            error: self.error.kind().to_string(),
            message: self.error.to_string(),
            path: self.path,
            status: status.as_u16(),
            timestamp: Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}

async fn run_blocking<T, F>(work: F) -> Result<T, LedgerError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, LedgerError> + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result,
        Err(join_error) => Err(StoreError::Worker(join_error.to_string()).into()),
    }
}

fn body_error(rejection: JsonRejection) -> LedgerError {
    LedgerError::validation("body", &rejection.body_text())
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "OK", "version": crate::VERSION }))
}

/// GET /api/budget/:user_id/registry - List a user's registries
async fn list_registries<S: RegistryStore + 'static>(
    State(state): State<AppState<S>>,
    Path(user_id): Path<String>,
    uri: OriginalUri,
) -> Result<Json<Vec<RegistryView>>, ApiError> {
    let ledger = Arc::clone(&state.ledger);

    run_blocking(move || ledger.list_by_user(&user_id))
        .await
        .map(Json)
        .map_err(|e| ApiError::new(e, &uri))
}

/// POST /api/budget/:user_id/registry/:registry_id/recharge
async fn recharge<S: RegistryStore + 'static>(
    State(state): State<AppState<S>>,
    Path((user_id, registry_id)): Path<(String, String)>,
    uri: OriginalUri,
    payload: Result<Json<RechargeRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(request) = payload.map_err(|r| ApiError::new(body_error(r), &uri))?;
    let amount = request.validate().map_err(|e| ApiError::new(e, &uri))?;

    let ledger = Arc::clone(&state.ledger);
    run_blocking(move || ledger.recharge(&user_id, &registry_id, amount))
        .await
        .map_err(|e| ApiError::new(e, &uri))?;

    Ok(StatusCode::OK)
}

/// POST /api/budget/:user_id/registry/:registry_id/transfer
async fn transfer<S: RegistryStore + 'static>(
    State(state): State<AppState<S>>,
    Path((user_id, registry_id)): Path<(String, String)>,
    uri: OriginalUri,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(request) = payload.map_err(|r| ApiError::new(body_error(r), &uri))?;
    let (target_registry_id, amount) = request
        .validate(&registry_id)
        .map(|(target, amount)| (target.to_string(), amount))
        .map_err(|e| ApiError::new(e, &uri))?;

    let ledger = Arc::clone(&state.ledger);
    run_blocking(move || ledger.transfer(&user_id, &registry_id, &target_registry_id, amount))
        .await
        .map_err(|e| ApiError::new(e, &uri))?;

    Ok(StatusCode::OK)
}

// ============================================================================
// Router
// ============================================================================

pub fn router<S: RegistryStore + 'static>(ledger: Arc<Ledger<S>>) -> Router {
    let state = AppState { ledger };

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/budget/:user_id/registry", get(list_registries::<S>))
        .route("/budget/:user_id/registry/:registry_id/recharge", post(recharge::<S>))
        .route("/budget/:user_id/registry/:registry_id/transfer", post(transfer::<S>))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&LedgerError::user_not_found("1")), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&LedgerError::validation("amount", "x")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&LedgerError::InsufficientFunds {
                available: dec!(1),
                requested: dec!(2)
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&LedgerError::Store(StoreError::LockPoisoned)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
