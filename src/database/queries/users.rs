use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::User;

pub struct NewUser {
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Look up the full user record (including the hash) by username or email.
///
/// The credential matches either column exactly; the caller never learns
/// which one missed.
pub async fn find_by_credential(pool: &PgPool, credential: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE username = $1 OR email = $1",
    )
    .bind(credential)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn insert(pool: &PgPool, user: &NewUser) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, hashed_password, first_name, last_name)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.hashed_password)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .fetch_one(pool)
    .await
}
