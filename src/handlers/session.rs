use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{credentials::verify_credentials, TokenService};
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{clear_session_cookie, session_cookie, Identity};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub credential: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    fn validate(self) -> Result<(String, String), ApiError> {
        let mut errors = HashMap::new();
        let credential = self.credential.unwrap_or_default();
        let password = self.password.unwrap_or_default();

        if credential.is_empty() {
            errors.insert(
                "credential".to_string(),
                "Please provide a valid email or username.".to_string(),
            );
        }
        if password.is_empty() {
            errors.insert(
                "password".to_string(),
                "Please provide a password.".to_string(),
            );
        }

        if errors.is_empty() {
            Ok((credential, password))
        } else {
            Err(ApiError::validation_error("Bad Request", errors))
        }
    }
}

/// POST /api/session - Log in
///
/// Verifies the credential (username or email) and password, then sets the
/// session cookie. Failure is always the same generic 401 body.
pub async fn login(
    Extension(tokens): Extension<Arc<TokenService>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (credential, password) = payload.validate()?;

    let pool = DatabaseManager::pool().await?;
    let identity = verify_credentials(&pool, &credential, &password).await?;

    let token = tokens.issue(&identity).map_err(|e| {
        tracing::error!("failed to issue session token: {}", e);
        ApiError::internal_server_error("An error occurred while processing your request")
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        session_cookie(&token, tokens.expiry_hours() * 3600).map_err(|e| {
            tracing::error!("failed to build session cookie: {}", e);
            ApiError::internal_server_error("An error occurred while processing your request")
        })?,
    );

    tracing::info!("user {} logged in", identity.username);
    Ok((headers, Json(json!({ "user": identity }))))
}

/// GET /api/session - Restore session user
///
/// Reflects the request's resolved identity. Never errors and never
/// requires authentication: an anonymous request gets `{"user": null}`.
pub async fn restore(identity: Option<Identity>) -> Json<serde_json::Value> {
    Json(json!({ "user": identity }))
}

/// DELETE /api/session - Log out
///
/// There is no server-side session store to invalidate; logout is purely a
/// cookie clear on the client.
pub async fn logout() -> Result<impl IntoResponse, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        clear_session_cookie().map_err(|e| {
            tracing::error!("failed to build session cookie: {}", e);
            ApiError::internal_server_error("An error occurred while processing your request")
        })?,
    );

    Ok((StatusCode::OK, headers, Json(json!({ "message": "success" }))))
}
