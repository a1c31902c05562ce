use sqlx::PgPool;

use crate::auth::password::verify_password;
use crate::database::queries::users;
use crate::error::ApiError;
use crate::middleware::auth::Identity;

/// Check a submitted credential (username or email) and password against the
/// stored record.
///
/// Unknown user and wrong password produce the same `InvalidCredentials`
/// failure, so a caller cannot probe which usernames exist. On success the
/// returned identity carries only non-secret fields.
pub async fn verify_credentials(
    pool: &PgPool,
    credential: &str,
    password: &str,
) -> Result<Identity, ApiError> {
    let user = users::find_by_credential(pool, credential)
        .await
        .map_err(|e| {
            tracing::error!("credential lookup failed: {}", e);
            ApiError::internal_server_error("An error occurred while processing your request")
        })?;

    let Some(user) = user else {
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password(password, &user.hashed_password) {
        return Err(ApiError::InvalidCredentials);
    }

    Ok(Identity {
        id: user.id,
        email: user.email,
        username: user.username,
    })
}
