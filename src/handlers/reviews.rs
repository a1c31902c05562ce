use std::collections::HashMap;

use axum::{
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::queries::{review_images, reviews, spot_images, spots};
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::Identity;
use crate::policy::{authorize_mutation, constraints, require_found, ResourceKind};

use super::spots::ReviewRequest;
use super::storage_error;

#[derive(Debug, Deserialize)]
pub struct ReviewImageRequest {
    pub url: String,
}

/// GET /api/reviews/current - Retrieve the caller's reviews (guarded)
///
/// Each review carries its parent spot (with the spot's preview image) and
/// the review's own images.
pub async fn current(identity: Identity) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let reviews = reviews::list_for_user(&pool, identity.id)
        .await
        .map_err(storage_error)?;

    let spot_ids: Vec<Uuid> = reviews.iter().map(|r| r.spot_id).collect();
    let spots = spots::find_by_ids(&pool, &spot_ids)
        .await
        .map_err(storage_error)?;
    let previews = spot_images::previews_for_spots(&pool, &spot_ids)
        .await
        .map_err(storage_error)?;
    let previews: HashMap<Uuid, String> =
        previews.into_iter().map(|p| (p.spot_id, p.url)).collect();
    let spots: HashMap<Uuid, Value> = spots
        .into_iter()
        .map(|spot| {
            let preview = previews.get(&spot.id).cloned();
            let mut value = json!(spot);
            value["previewImage"] = json!(preview);
            (spot.id, value)
        })
        .collect();

    let review_ids: Vec<Uuid> = reviews.iter().map(|r| r.id).collect();
    let images = review_images::list_for_reviews(&pool, &review_ids)
        .await
        .map_err(storage_error)?;
    let mut images_by_review: HashMap<Uuid, Vec<Value>> = HashMap::new();
    for image in images {
        images_by_review
            .entry(image.review_id)
            .or_default()
            .push(json!({ "id": image.id, "url": image.url }));
    }

    let reviews: Vec<Value> = reviews
        .into_iter()
        .map(|r| {
            let (review_id, spot_id) = (r.id, r.spot_id);
            let mut value = json!(r);
            value["User"] = json!({ "id": identity.id, "username": identity.username });
            value["Spot"] = spots.get(&spot_id).cloned().unwrap_or(Value::Null);
            value["ReviewImages"] = json!(images_by_review.remove(&review_id).unwrap_or_default());
            value
        })
        .collect();

    Ok(Json(json!({ "Reviews": reviews })))
}

/// PUT /api/reviews/:id - Edit a review (guarded, author only)
pub async fn update(
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (review, stars) = payload.validate()?;

    let pool = DatabaseManager::pool().await?;
    let existing = reviews::find_by_id(&pool, id).await.map_err(storage_error)?;
    let existing = require_found(existing, ResourceKind::Review)?;
    authorize_mutation(&identity, &existing)?;

    let updated = reviews::update(&pool, existing.id, &review, stars)
        .await
        .map_err(storage_error)?;

    Ok(Json(updated))
}

/// DELETE /api/reviews/:id - Delete a review (guarded, author only)
pub async fn destroy(
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let review = reviews::find_by_id(&pool, id).await.map_err(storage_error)?;
    let review = require_found(review, ResourceKind::Review)?;
    authorize_mutation(&identity, &review)?;

    reviews::delete(&pool, review.id).await.map_err(storage_error)?;

    Ok(Json(json!({ "message": "Successfully deleted" })))
}

/// POST /api/reviews/:id/images - Add an image to a review (guarded, author only)
///
/// Capped at ten images per review. The count is read just before the
/// decision, so the check is best-effort under concurrency.
pub async fn add_image(
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewImageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let review = reviews::find_by_id(&pool, id).await.map_err(storage_error)?;
    let review = require_found(review, ResourceKind::Review)?;
    authorize_mutation(&identity, &review)?;

    let count = review_images::count_for_review(&pool, review.id)
        .await
        .map_err(storage_error)?;
    constraints::enforce_image_cap(count)?;

    let image = review_images::insert(&pool, review.id, &payload.url)
        .await
        .map_err(storage_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": image.id, "url": image.url })),
    ))
}
