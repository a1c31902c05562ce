use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::models::ReviewImage;

/// Review image joined with the authoring user of the parent review.
#[derive(Debug, FromRow)]
pub struct ReviewImageWithOwner {
    pub id: Uuid,
    pub review_id: Uuid,
    pub owner_id: Uuid,
}

pub async fn insert(pool: &PgPool, review_id: Uuid, url: &str) -> Result<ReviewImage, sqlx::Error> {
    sqlx::query_as::<_, ReviewImage>(
        r#"
        INSERT INTO review_images (review_id, url)
        VALUES ($1, $2)
        RETURNING *
        "#,
    )
    .bind(review_id)
    .bind(url)
    .fetch_one(pool)
    .await
}

/// Image count for the parent review, read at the instant of the check.
pub async fn count_for_review(pool: &PgPool, review_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM review_images WHERE review_id = $1")
        .bind(review_id)
        .fetch_one(pool)
        .await
}

pub async fn list_for_reviews(
    pool: &PgPool,
    review_ids: &[Uuid],
) -> Result<Vec<ReviewImage>, sqlx::Error> {
    sqlx::query_as::<_, ReviewImage>(
        "SELECT * FROM review_images WHERE review_id = ANY($1) ORDER BY created_at",
    )
    .bind(review_ids)
    .fetch_all(pool)
    .await
}

pub async fn find_with_owner(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<ReviewImageWithOwner>, sqlx::Error> {
    sqlx::query_as::<_, ReviewImageWithOwner>(
        r#"
        SELECT ri.id, ri.review_id, r.user_id AS owner_id
        FROM review_images ri
        JOIN reviews r ON r.id = ri.review_id
        WHERE ri.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM review_images WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
