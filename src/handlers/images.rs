use axum::{
    extract::Path,
    response::{IntoResponse, Json},
};
use serde_json::json;
use uuid::Uuid;

use crate::database::queries::{review_images, spot_images};
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::Identity;
use crate::policy::{authorize_mutation, require_found, ResourceKind};

use super::storage_error;

/// DELETE /api/spot-images/:id - Delete a spot image (guarded, spot owner only)
pub async fn delete_spot_image(
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let image = spot_images::find_with_owner(&pool, id)
        .await
        .map_err(storage_error)?;
    let image = require_found(image, ResourceKind::SpotImage)?;
    authorize_mutation(&identity, &image)?;

    spot_images::delete(&pool, image.id).await.map_err(storage_error)?;

    Ok(Json(json!({ "message": "Successfully deleted" })))
}

/// DELETE /api/review-images/:id - Delete a review image (guarded, review author only)
pub async fn delete_review_image(
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let image = review_images::find_with_owner(&pool, id)
        .await
        .map_err(storage_error)?;
    let image = require_found(image, ResourceKind::ReviewImage)?;
    authorize_mutation(&identity, &image)?;

    review_images::delete(&pool, image.id).await.map_err(storage_error)?;

    Ok(Json(json!({ "message": "Successfully deleted" })))
}
