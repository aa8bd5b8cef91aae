//! HTTP surface: Slack Events endpoint plus the administrative `/cmd`
//! routes used by `dinner-rotation-ctl`.

pub mod extract;
pub mod handlers;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::chat::ChatPlatform;
use crate::persistence::{MealStore, MemberStore};
use crate::{AppError, GlobalConfig, Result};

/// Shared state handed to every request handler.
pub struct AppState {
    /// Validated configuration.
    pub config: Arc<GlobalConfig>,
    /// Meal persistence.
    pub meals: Arc<dyn MealStore>,
    /// Member persistence.
    pub members: Arc<dyn MemberStore>,
    /// Chat platform; `None` when no bot token is configured.
    pub chat: Option<Arc<dyn ChatPlatform>>,
}

/// Error body returned by every failing route: `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Build an error with an explicit status.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// The chat platform is not configured.
    #[must_use]
    pub fn chat_unavailable() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "slack is not configured; no bot token loaded",
        )
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let status = match &err {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyPosted(_) => StatusCode::CONFLICT,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_) | AppError::Db(_) | AppError::Slack(_) | AppError::Http(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            error!(%err, "request failed");
        }
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Build the application router.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/event", post(handlers::event))
        .route("/cmd/assign-cooks", put(handlers::assign_cooks))
        .route("/cmd/eating-tomorrow", post(handlers::eating_tomorrow))
        .route("/cmd/weekly-update", post(handlers::weekly_update))
        .route("/cmd/weekly-report", get(handlers::weekly_report))
        .route("/cmd/members", get(handlers::list_members))
        .route("/cmd/members/{slack_uid}", patch(handlers::update_member))
        .route("/cmd/members/{slack_uid}/cooked", post(handlers::record_cooked))
        .route("/cmd/upcoming-cooks", get(handlers::upcoming_cooks))
        .route("/cmd/meals/{id}", delete(handlers::delete_meal))
        .with_state(state)
}

/// Serve the router on the configured address until `ct` is cancelled.
///
/// # Errors
///
/// Returns `AppError::Config` for an invalid address and `AppError::Http`
/// if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, ct: CancellationToken) -> Result<()> {
    let addr = state.config.http_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| AppError::Http(format!("failed to bind {addr}: {err}")))?;
    info!(%addr, "http server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { ct.cancelled().await })
        .await
        .map_err(|err| AppError::Http(format!("http server error: {err}")))?;

    info!("http server stopped");
    Ok(())
}
