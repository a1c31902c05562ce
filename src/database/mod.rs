pub mod manager;
pub mod models;
pub mod queries;

pub use manager::{DatabaseError, DatabaseManager};
