use axum::{extract::FromRequestParts, http::request::Parts};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::Claims;
use crate::error::ApiError;

/// Resolved caller identity for the current request
///
/// Derived fresh from the session token on every request and discarded with
/// it; never carries the password hash or any other secret field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub username: String,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            email: claims.email,
            username: claims.username,
        }
    }
}

/// Extracting `Identity` is the auth guard: handlers that take it reject
/// anonymous requests with 401 before any handler code runs. Handlers that
/// tolerate anonymous callers extract `Option<Identity>` instead.
#[axum::async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
