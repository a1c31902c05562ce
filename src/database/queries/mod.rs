pub mod review_images;
pub mod reviews;
pub mod spot_images;
pub mod spots;
pub mod users;

/// Postgres unique-constraint violation (SQLSTATE 23505).
///
/// The reviews table's unique index is the authoritative duplicate-review
/// guard; callers translate this into the same conflict error the
/// application-level check produces.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}
