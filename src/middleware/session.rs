use std::sync::Arc;

use axum::{
    extract::{Extension, Request},
    http::{header::InvalidHeaderValue, HeaderValue},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::TokenService;
use crate::config;

/// Name of the httpOnly cookie carrying the signed identity token.
pub const SESSION_COOKIE: &str = "token";

/// Session restoration middleware, run once per incoming API request.
///
/// Reads the session cookie and, when it verifies, attaches the resolved
/// [`Identity`](crate::middleware::Identity) to the request extensions.
/// A missing, expired, or tampered token leaves the request anonymous and
/// the request continues either way; rejection is the guard's job, not ours.
pub async fn restore_session(
    Extension(tokens): Extension<Arc<TokenService>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        match tokens.verify(cookie.value()) {
            Ok(identity) => {
                request.extensions_mut().insert(identity);
            }
            Err(e) => {
                // Treated the same as no cookie at all
                tracing::debug!("session cookie rejected: {}", e);
            }
        }
    }

    next.run(request).await
}

/// Build the Set-Cookie header for a freshly issued token.
///
/// httpOnly always; Secure and SameSite=Lax only in production, so
/// cross-origin development flows keep working while deployed traffic is
/// hardened.
pub fn session_cookie(token: &str, max_age_secs: u64) -> Result<HeaderValue, InvalidHeaderValue> {
    build_session_cookie(token, max_age_secs, config::config().is_production())
}

/// Build the Set-Cookie header that clears the session cookie (logout).
pub fn clear_session_cookie() -> Result<HeaderValue, InvalidHeaderValue> {
    build_session_cookie("", 0, config::config().is_production())
}

fn build_session_cookie(
    token: &str,
    max_age_secs: u64,
    production: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; Max-Age={max_age_secs}"
    );
    if production {
        cookie.push_str("; Secure; SameSite=Lax");
    }
    HeaderValue::from_str(&cookie)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_cookie_is_http_only_but_not_secure() {
        let value = build_session_cookie("abc123", 3600, false).expect("header value");
        let value = value.to_str().expect("ascii");

        assert!(value.starts_with("token=abc123;"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Max-Age=3600"));
        assert!(!value.contains("Secure"));
        assert!(!value.contains("SameSite"));
    }

    #[test]
    fn production_cookie_is_secure_and_lax() {
        let value = build_session_cookie("abc123", 3600, true).expect("header value");
        let value = value.to_str().expect("ascii");

        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Secure"));
        assert!(value.contains("SameSite=Lax"));
    }

    #[test]
    fn clearing_cookie_zeroes_max_age() {
        let value = build_session_cookie("", 0, false).expect("header value");
        let value = value.to_str().expect("ascii");

        assert!(value.starts_with("token=;"));
        assert!(value.contains("Max-Age=0"));
    }
}
