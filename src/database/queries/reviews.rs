use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::models::Review;

/// Review row joined with its author, for spot review listings.
#[derive(Debug, FromRow)]
pub struct ReviewWithAuthor {
    pub id: Uuid,
    pub spot_id: Uuid,
    pub user_id: Uuid,
    pub review: String,
    pub stars: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub username: String,
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Review>, sqlx::Error> {
    sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_for_spot(pool: &PgPool, spot_id: Uuid) -> Result<Vec<ReviewWithAuthor>, sqlx::Error> {
    sqlx::query_as::<_, ReviewWithAuthor>(
        r#"
        SELECT r.*, u.username
        FROM reviews r
        JOIN users u ON u.id = r.user_id
        WHERE r.spot_id = $1
        ORDER BY r.created_at DESC
        "#,
    )
    .bind(spot_id)
    .fetch_all(pool)
    .await
}

pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Review>, sqlx::Error> {
    sqlx::query_as::<_, Review>(
        "SELECT * FROM reviews WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Fast-path probe for the one-review-per-spot rule. The unique index on
/// (spot_id, user_id) remains the authoritative guard at insert time.
pub async fn exists_for_user_spot(
    pool: &PgPool,
    user_id: Uuid,
    spot_id: Uuid,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM reviews WHERE user_id = $1 AND spot_id = $2)",
    )
    .bind(user_id)
    .bind(spot_id)
    .fetch_one(pool)
    .await
}

pub async fn insert(
    pool: &PgPool,
    spot_id: Uuid,
    user_id: Uuid,
    review: &str,
    stars: i32,
) -> Result<Review, sqlx::Error> {
    sqlx::query_as::<_, Review>(
        r#"
        INSERT INTO reviews (spot_id, user_id, review, stars)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(spot_id)
    .bind(user_id)
    .bind(review)
    .bind(stars)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    review: &str,
    stars: i32,
) -> Result<Review, sqlx::Error> {
    sqlx::query_as::<_, Review>(
        r#"
        UPDATE reviews
        SET review = $2, stars = $3, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(review)
    .bind(stars)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM reviews WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
