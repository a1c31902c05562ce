use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{password::hash_password, TokenService};
use crate::database::queries::{is_unique_violation, users};
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{session_cookie, Identity};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl SignupRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = HashMap::new();

        let email = self.email.as_deref().unwrap_or_default();
        if email.len() < 3 || !email.contains('@') {
            errors.insert("email".to_string(), "Invalid email".to_string());
        }

        let username = self.username.as_deref().unwrap_or_default();
        if username.len() < 4 || username.len() > 30 {
            errors.insert(
                "username".to_string(),
                "Please provide a username between 4 and 30 characters.".to_string(),
            );
        } else if username.contains('@') {
            errors.insert("username".to_string(), "Username cannot be an email.".to_string());
        }

        if self.password.as_deref().unwrap_or_default().len() < 6 {
            errors.insert(
                "password".to_string(),
                "Password must be 6 characters or more.".to_string(),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Bad Request", errors))
        }
    }
}

/// POST /api/users - Sign up
///
/// Creates the user, then behaves exactly like login: sets the session
/// cookie and returns the safe user fields.
pub async fn signup(
    Extension(tokens): Extension<Arc<TokenService>>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()?;

    let hashed_password = hash_password(payload.password.as_deref().unwrap_or_default())
        .map_err(|e| {
            tracing::error!("password hashing failed: {}", e);
            ApiError::internal_server_error("An error occurred while processing your request")
        })?;

    let new_user = users::NewUser {
        username: payload.username.unwrap_or_default(),
        email: payload.email.unwrap_or_default(),
        hashed_password,
        first_name: payload.first_name,
        last_name: payload.last_name,
    };

    let pool = DatabaseManager::pool().await?;
    let user = users::insert(&pool, &new_user).await.map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::conflict("User already exists")
        } else {
            super::storage_error(e)
        }
    })?;

    let identity = Identity {
        id: user.id,
        email: user.email,
        username: user.username,
    };

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

    tracing::info!("user {} signed up", identity.username);
    Ok((StatusCode::CREATED, headers, Json(json!({ "user": identity }))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, username: &str, password: &str) -> SignupRequest {
        SignupRequest {
            email: Some(email.to_string()),
            username: Some(username.to_string()),
            password: Some(password.to_string()),
            first_name: None,
            last_name: None,
        }
    }

    #[test]
    fn valid_signup_passes() {
        assert!(request("alice@example.com", "alice22", "hunter22").validate().is_ok());
    }

    #[test]
    fn username_cannot_be_an_email() {
        let err = request("alice@example.com", "alice@example.com", "hunter22")
            .validate()
            .unwrap_err();
        match err {
            ApiError::ValidationError { field_errors, .. } => {
                assert_eq!(field_errors["username"], "Username cannot be an email.");
            }
            other => panic!("expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn overlong_username_message_covers_the_range() {
        let err = request("alice@example.com", &"a".repeat(31), "hunter22")
            .validate()
            .unwrap_err();
        match err {
            ApiError::ValidationError { field_errors, .. } => {
                assert_eq!(
                    field_errors["username"],
                    "Please provide a username between 4 and 30 characters."
                );
            }
            other => panic!("expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn short_password_is_rejected() {
        let err = request("alice@example.com", "alice22", "abc").validate().unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
