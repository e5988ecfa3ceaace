use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common_auth::{ensure_role, AuthContext, ROLE_ADMIN};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::authenticator::CredentialError;
use crate::AppState;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: &'static str,
    message: String,
}

#[derive(Debug)]
pub struct AuthError {
    status: StatusCode,
    body: ErrorResponse,
}

impl AuthError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                code,
                message: message.into(),
            },
        }
    }

    // One message for unknown user and wrong password alike.
    fn invalid_credentials() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "INVALID_CREDENTIALS",
            "Invalid username or password.",
        )
    }

    fn authenticator_unavailable() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "AUTHENTICATOR_UNAVAILABLE",
            "Authenticator API unavailable.",
        )
    }

    fn internal_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "SERVER_ERROR", message)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub username: String,
    pub role: String,
    pub expires_in: i64,
}

pub async fn login(
    State(state): State<AppState>,
    Json(login): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let LoginRequest { username, password } = login;

    if let Err(err) = state.authenticator.verify(&username, &password).await {
        return Err(match err {
            CredentialError::Rejected => {
                state.record_login_metric("invalid_credentials");
                AuthError::invalid_credentials()
            }
            CredentialError::Unavailable(reason) => {
                warn!(reason = %reason, "Authenticator unreachable during login");
                state.record_login_metric("unavailable");
                AuthError::authenticator_unavailable()
            }
        });
    }

    // No role is written unless the provider accepted the credentials.
    let role = state.roles.ensure_role(&username).await.map_err(|err| {
        error!(error = ?err, "Failed to resolve role assignment");
        state.record_login_metric("error");
        AuthError::internal_error("Unable to resolve role assignment.")
    })?;

    let issued = state.tokens.issue(&username, &role).map_err(|err| {
        error!(error = ?err, "Failed to issue session token");
        state.record_login_metric("error");
        AuthError::internal_error("Unable to issue session token.")
    })?;

    state.record_login_metric("success");

    Ok(Json(LoginResponse {
        access_token: issued.access_token,
        token_type: issued.token_type,
        username,
        role,
        expires_in: issued.expires_in,
    }))
}

#[derive(Debug, Serialize)]
pub struct RoleLookupResponse {
    pub username: String,
    pub role: Option<String>,
}

pub async fn role_lookup(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(username): Path<String>,
) -> Result<Json<RoleLookupResponse>, (StatusCode, String)> {
    ensure_role(&auth, &[ROLE_ADMIN])?;

    let role = state.roles.get_role(&username).await.map_err(|err| {
        error!(error = ?err, "Failed to look up role assignment");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Unable to look up role assignment.".to_string(),
        )
    })?;

    Ok(Json(RoleLookupResponse { username, role }))
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub username: String,
    pub role: String,
}

pub async fn me(auth: AuthContext) -> Json<MeResponse> {
    let claims = auth.into_claims();
    Json(MeResponse {
        username: claims.subject,
        role: claims.role,
    })
}
