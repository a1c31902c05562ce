pub mod images;
pub mod reviews;
pub mod session;
pub mod spots;
pub mod users;

use crate::error::ApiError;

/// Unexpected storage failure: log the real error, return a generic 500.
pub(crate) fn storage_error(err: sqlx::Error) -> ApiError {
    tracing::error!("storage error: {}", err);
    ApiError::internal_server_error("An error occurred while processing your request")
}
