pub mod auth;
pub mod session;

pub use auth::Identity;
pub use session::{clear_session_cookie, restore_session, session_cookie, SESSION_COOKIE};
