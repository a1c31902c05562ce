use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::models::SpotImage;

/// Spot image joined with the owning spot's owner, so authorization can run
/// against the parent without a second lookup.
#[derive(Debug, FromRow)]
pub struct SpotImageWithOwner {
    pub id: Uuid,
    pub spot_id: Uuid,
    pub owner_id: Uuid,
}

pub async fn insert(
    pool: &PgPool,
    spot_id: Uuid,
    url: &str,
    preview: bool,
) -> Result<SpotImage, sqlx::Error> {
    sqlx::query_as::<_, SpotImage>(
        r#"
        INSERT INTO spot_images (spot_id, url, preview)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(spot_id)
    .bind(url)
    .bind(preview)
    .fetch_one(pool)
    .await
}

pub async fn list_for_spot(pool: &PgPool, spot_id: Uuid) -> Result<Vec<SpotImage>, sqlx::Error> {
    sqlx::query_as::<_, SpotImage>(
        "SELECT * FROM spot_images WHERE spot_id = $1 ORDER BY created_at",
    )
    .bind(spot_id)
    .fetch_all(pool)
    .await
}

/// Preview image URL per spot, for listing responses.
#[derive(Debug, FromRow)]
pub struct PreviewImage {
    pub spot_id: Uuid,
    pub url: String,
}

pub async fn previews_for_spots(
    pool: &PgPool,
    spot_ids: &[Uuid],
) -> Result<Vec<PreviewImage>, sqlx::Error> {
    sqlx::query_as::<_, PreviewImage>(
        r#"
        SELECT DISTINCT ON (spot_id) spot_id, url
        FROM spot_images
        WHERE spot_id = ANY($1) AND preview
        ORDER BY spot_id, created_at
        "#,
    )
    .bind(spot_ids)
    .fetch_all(pool)
    .await
}

pub async fn find_with_owner(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<SpotImageWithOwner>, sqlx::Error> {
    sqlx::query_as::<_, SpotImageWithOwner>(
        r#"
        SELECT si.id, si.spot_id, s.owner_id
        FROM spot_images si
        JOIN spots s ON s.id = si.spot_id
        WHERE si.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM spot_images WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
