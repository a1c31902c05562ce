use std::collections::HashMap;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config;
use crate::database::queries::{is_unique_violation, review_images, reviews, spot_images, spots, users};
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::Identity;
use crate::policy::{authorize_mutation, constraints, require_found, ResourceKind};

use super::storage_error;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SpotRequest {
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
}

impl SpotRequest {
    fn validate(self) -> Result<spots::SpotAttrs, ApiError> {
        let mut errors = HashMap::new();

        let required = |errors: &mut HashMap<String, String>, value: &Option<String>, field: &str, msg: &str| {
            if value.as_deref().unwrap_or_default().is_empty() {
                errors.insert(field.to_string(), msg.to_string());
            }
        };

        required(&mut errors, &self.address, "address", "Address is required");
        required(&mut errors, &self.city, "city", "City is required");
        required(&mut errors, &self.state, "state", "State is required");
        required(&mut errors, &self.country, "country", "Country is required");
        required(&mut errors, &self.description, "description", "Description is required");

        match self.lat {
            Some(lat) if (-90.0..=90.0).contains(&lat) => {}
            _ => {
                errors.insert("lat".to_string(), "Latitude must be between -90 and 90".to_string());
            }
        }
        match self.lng {
            Some(lng) if (-180.0..=180.0).contains(&lng) => {}
            _ => {
                errors.insert("lng".to_string(), "Longitude must be between -180 and 180".to_string());
            }
        }
        match self.name.as_deref().map(|n| n.chars().count()) {
            Some(len) if (1..=50).contains(&len) => {}
            _ => {
                errors.insert("name".to_string(), "Name must be between 1 and 50 characters".to_string());
            }
        }
        match self.price {
            Some(price) if price > Decimal::ZERO => {}
            _ => {
                errors.insert("price".to_string(), "Price must be a positive number".to_string());
            }
        }

        if !errors.is_empty() {
            return Err(ApiError::validation_error("Bad Request", errors));
        }

        Ok(spots::SpotAttrs {
            address: self.address.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
            lat: self.lat.unwrap_or_default(),
            lng: self.lng.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            price: self.price.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SpotImageRequest {
    pub url: String,
    #[serde(default)]
    pub preview: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub review: Option<String>,
    pub stars: Option<i32>,
}

impl ReviewRequest {
    pub(crate) fn validate(self) -> Result<(String, i32), ApiError> {
        let mut errors = HashMap::new();

        let review = self.review.unwrap_or_default();
        if review.is_empty() {
            errors.insert("review".to_string(), "Review text is required".to_string());
        }
        let stars = self.stars.unwrap_or_default();
        if !(1..=5).contains(&stars) {
            errors.insert("stars".to_string(), "Stars must be an integer from 1 to 5".to_string());
        }

        if errors.is_empty() {
            Ok((review, stars))
        } else {
            Err(ApiError::validation_error("Bad Request", errors))
        }
    }
}

/// Row offset for a 1-based page. Saturates so an absurd page number yields
/// an empty page instead of overflowing.
fn list_offset(page: i64, size: i64) -> i64 {
    (page - 1).saturating_mul(size)
}

/// GET /api/spots - Retrieve all spots with pagination (public)
pub async fn list(Query(query): Query<ListQuery>) -> Result<impl IntoResponse, ApiError> {
    let api = &config::config().api;
    let page = query.page.filter(|p| *p >= 1).unwrap_or(1);
    let size = query
        .size
        .filter(|s| *s >= 1 && *s <= api.max_page_size)
        .unwrap_or(api.default_page_size);

    let pool = DatabaseManager::pool().await?;
    let spots = spots::list(&pool, size, list_offset(page, size))
        .await
        .map_err(storage_error)?;

    let spot_ids: Vec<Uuid> = spots.iter().map(|s| s.id).collect();
    let previews = spot_images::previews_for_spots(&pool, &spot_ids)
        .await
        .map_err(storage_error)?;
    let previews: HashMap<Uuid, String> =
        previews.into_iter().map(|p| (p.spot_id, p.url)).collect();

    let spots: Vec<Value> = spots
        .into_iter()
        .map(|spot| {
            let preview = previews.get(&spot.id).cloned();
            let mut value = json!(spot);
            value["previewImage"] = json!(preview);
            value
        })
        .collect();

    Ok(Json(json!({ "spots": spots, "page": page, "size": size })))
}

/// GET /api/spots/current - Retrieve the caller's spots (guarded)
pub async fn current(identity: Identity) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let spots = spots::list_by_owner(&pool, identity.id)
        .await
        .map_err(storage_error)?;

    Ok(Json(json!({ "spots": spots })))
}

/// GET /api/spots/:id - Retrieve one spot with its images and owner (public)
pub async fn get_one(Path(id): Path<Uuid>) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let spot = spots::find_by_id(&pool, id).await.map_err(storage_error)?;
    let spot = require_found(spot, ResourceKind::Spot)?;

    let images = spot_images::list_for_spot(&pool, spot.id)
        .await
        .map_err(storage_error)?;
    let owner = users::find_by_id(&pool, spot.owner_id)
        .await
        .map_err(storage_error)?;

    let mut value = json!(spot);
    value["SpotImages"] = json!(images);
    value["Owner"] = owner
        .map(|o| json!({ "id": o.id, "username": o.username }))
        .unwrap_or(Value::Null);

    Ok(Json(value))
}

/// POST /api/spots - Create a new spot (guarded)
pub async fn create(
    identity: Identity,
    Json(payload): Json<SpotRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let attrs = payload.validate()?;

    let pool = DatabaseManager::pool().await?;
    let spot = spots::insert(&pool, identity.id, &attrs)
        .await
        .map_err(storage_error)?;

    Ok((StatusCode::CREATED, Json(spot)))
}

/// PUT /api/spots/:id - Edit a spot (guarded, owner only)
pub async fn update(
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(payload): Json<SpotRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let attrs = payload.validate()?;

    let pool = DatabaseManager::pool().await?;
    // Existence is reported before ownership is even computed
    let spot = spots::find_by_id(&pool, id).await.map_err(storage_error)?;
    let spot = require_found(spot, ResourceKind::Spot)?;
    authorize_mutation(&identity, &spot)?;

    let updated = spots::update(&pool, spot.id, &attrs)
        .await
        .map_err(storage_error)?;

    Ok(Json(updated))
}

/// DELETE /api/spots/:id - Delete a spot (guarded, owner only)
pub async fn destroy(
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let spot = spots::find_by_id(&pool, id).await.map_err(storage_error)?;
    let spot = require_found(spot, ResourceKind::Spot)?;
    authorize_mutation(&identity, &spot)?;

    spots::delete(&pool, spot.id).await.map_err(storage_error)?;

    Ok(Json(json!({ "message": "Spot deleted successfully" })))
}

/// POST /api/spots/:id/images - Add an image to a spot (guarded, owner only)
pub async fn add_image(
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(payload): Json<SpotImageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let spot = spots::find_by_id(&pool, id).await.map_err(storage_error)?;
    let spot = require_found(spot, ResourceKind::Spot)?;
    authorize_mutation(&identity, &spot)?;

    let image = spot_images::insert(&pool, spot.id, &payload.url, payload.preview)
        .await
        .map_err(storage_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": image.id, "url": image.url, "preview": image.preview })),
    ))
}

/// GET /api/spots/:id/reviews - Reviews for a spot (public)
pub async fn list_reviews(Path(id): Path<Uuid>) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let spot = spots::find_by_id(&pool, id).await.map_err(storage_error)?;
    let spot = require_found(spot, ResourceKind::Spot)?;

    let reviews = reviews::list_for_spot(&pool, spot.id)
        .await
        .map_err(storage_error)?;
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
            json!({
                "id": r.id,
                "spotId": r.spot_id,
                "userId": r.user_id,
                "review": r.review,
                "stars": r.stars,
                "createdAt": r.created_at,
                "updatedAt": r.updated_at,
                "User": { "id": r.user_id, "username": r.username },
                "ReviewImages": images_by_review.remove(&r.id).unwrap_or_default(),
            })
        })
        .collect();

    Ok(Json(json!({ "Reviews": reviews })))
}

/// POST /api/spots/:id/reviews - Create a review for a spot (guarded)
///
/// The one-review-per-spot check here is the friendly fast path; the unique
/// index on (spot_id, user_id) settles concurrent creations, and a storage
/// violation maps to the same conflict error.
pub async fn create_review(
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (review, stars) = payload.validate()?;

    let pool = DatabaseManager::pool().await?;
    let spot = spots::find_by_id(&pool, id).await.map_err(storage_error)?;
    let spot = require_found(spot, ResourceKind::Spot)?;

    let already_exists = reviews::exists_for_user_spot(&pool, identity.id, spot.id)
        .await
        .map_err(storage_error)?;
    constraints::enforce_unique_review(already_exists)?;

    let created = reviews::insert(&pool, spot.id, identity.id, &review, stars)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::conflict("User already has a review for this spot")
            } else {
                storage_error(e)
            }
        })?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spot_request_collects_all_field_errors() {
        let request = SpotRequest {
            address: None,
            city: Some(String::new()),
            state: Some("OR".to_string()),
            country: Some("USA".to_string()),
            lat: Some(123.0),
            lng: Some(-123.09),
            name: Some("x".repeat(51)),
            description: Some("A cabin".to_string()),
            price: Some(Decimal::new(-100, 2)),
        };

        match request.validate() {
            Err(ApiError::ValidationError { field_errors, .. }) => {
                assert!(field_errors.contains_key("address"));
                assert!(field_errors.contains_key("city"));
                assert!(field_errors.contains_key("lat"));
                assert!(field_errors.contains_key("name"));
                assert!(field_errors.contains_key("price"));
                assert!(!field_errors.contains_key("state"));
            }
            other => panic!("expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn list_offset_saturates_on_huge_page_numbers() {
        assert_eq!(list_offset(1, 20), 0);
        assert_eq!(list_offset(3, 20), 40);
        // A page number at the type's ceiling must not overflow; it just
        // lands past the end of the data
        assert_eq!(list_offset(i64::MAX, 20), i64::MAX);
    }

    #[test]
    fn name_length_counts_characters_not_bytes() {
        let request = SpotRequest {
            address: Some("123 Main St".to_string()),
            city: Some("Springfield".to_string()),
            state: Some("OR".to_string()),
            country: Some("USA".to_string()),
            lat: Some(44.05),
            lng: Some(-123.09),
            // 26 characters, well over 50 bytes
            name: Some("á".repeat(26)),
            description: Some("A cabin".to_string()),
            price: Some(Decimal::new(12000, 2)),
        };

        assert!(request.validate().is_ok());
    }

    #[test]
    fn review_request_bounds_stars() {
        let bad = ReviewRequest {
            review: Some("Nice".to_string()),
            stars: Some(6),
        };
        assert!(bad.validate().is_err());

        let good = ReviewRequest {
            review: Some("Nice".to_string()),
            stars: Some(5),
        };
        assert_eq!(good.validate().expect("valid"), ("Nice".to_string(), 5));
    }
}
