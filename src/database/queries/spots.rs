use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::Spot;

/// Column values for creating or replacing a spot. Ownership is not part of
/// this set: `owner_id` is written once at insert and never updated.
#[derive(Debug)]
pub struct SpotAttrs {
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub lat: f64,
    pub lng: f64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
}

pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Spot>, sqlx::Error> {
    sqlx::query_as::<_, Spot>(
        "SELECT * FROM spots ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Spot>, sqlx::Error> {
    sqlx::query_as::<_, Spot>(
        "SELECT * FROM spots WHERE owner_id = $1 ORDER BY created_at DESC",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await
}

pub async fn find_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Spot>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    sqlx::query_as::<_, Spot>("SELECT * FROM spots WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Spot>, sqlx::Error> {
    sqlx::query_as::<_, Spot>("SELECT * FROM spots WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn insert(pool: &PgPool, owner_id: Uuid, attrs: &SpotAttrs) -> Result<Spot, sqlx::Error> {
    sqlx::query_as::<_, Spot>(
        r#"
        INSERT INTO spots (owner_id, address, city, state, country, lat, lng, name, description, price)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(owner_id)
    .bind(&attrs.address)
    .bind(&attrs.city)
    .bind(&attrs.state)
    .bind(&attrs.country)
    .bind(attrs.lat)
    .bind(attrs.lng)
    .bind(&attrs.name)
    .bind(&attrs.description)
    .bind(attrs.price)
    .fetch_one(pool)
    .await
}

pub async fn update(pool: &PgPool, id: Uuid, attrs: &SpotAttrs) -> Result<Spot, sqlx::Error> {
    sqlx::query_as::<_, Spot>(
        r#"
        UPDATE spots
        SET address = $2, city = $3, state = $4, country = $5, lat = $6, lng = $7,
            name = $8, description = $9, price = $10, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&attrs.address)
    .bind(&attrs.city)
    .bind(&attrs.state)
    .bind(&attrs.country)
    .bind(attrs.lat)
    .bind(attrs.lng)
    .bind(&attrs.name)
    .bind(&attrs.description)
    .bind(attrs.price)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM spots WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
