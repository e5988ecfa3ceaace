use std::sync::Arc;

use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use common_auth::TokenService;

use crate::auth_handlers::{login, me, role_lookup};
use crate::authenticator::CredentialVerifier;
use crate::metrics::AuthMetrics;
use crate::role_store::RoleStore;

#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub authenticator: Arc<dyn CredentialVerifier>,
    pub roles: RoleStore,
    pub metrics: Arc<AuthMetrics>,
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl AppState {
    pub fn record_login_metric(&self, outcome: &str) {
        self.metrics.login_attempt(outcome);
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn metrics_endpoint(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(error = %err, "Unable to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Routes shared by the binary and the integration tests.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/auth/login", post(login))
        .route("/auth/role/:username", get(role_lookup))
        .route("/auth/me", get(me))
        .with_state(state)
}
