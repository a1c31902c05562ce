use std::sync::Arc;

use axum::{extract::Extension, middleware::from_fn, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod auth;
mod config;
mod database;
mod error;
mod handlers;
mod middleware;
mod policy;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = crate::config::config();
    tracing::info!("Starting SpotStay API in {:?} mode", config.environment);

    let tokens = match auth::TokenService::from_config() {
        Ok(tokens) => Arc::new(tokens),
        Err(e) => {
            eprintln!("cannot start: {}", e);
            std::process::exit(1);
        }
    };

    let app = app(tokens);

    // Allow tests or deployments to override port via env
    let port = std::env::var("SPOTSTAY_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("SpotStay API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app(tokens: Arc<auth::TokenService>) -> Router {
    let config = crate::config::config();

    let mut app = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // API
        .merge(session_routes())
        .merge(user_routes())
        .merge(spot_routes())
        .merge(review_routes())
        .merge(image_routes())
        // Session restoration runs before any handler; the token service
        // Extension is layered after it so it is available to the middleware.
        .layer(from_fn(middleware::restore_session))
        .layer(Extension(tokens));

    if config.security.enable_cors {
        app = app.layer(CorsLayer::permissive());
    }
    if config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    app
}

fn session_routes() -> Router {
    use axum::routing::post;
    use handlers::session;

    Router::new().route(
        "/api/session",
        post(session::login)
            .get(session::restore)
            .delete(session::logout),
    )
}

fn user_routes() -> Router {
    use axum::routing::post;
    use handlers::users;

    Router::new().route("/api/users", post(users::signup))
}

fn spot_routes() -> Router {
    use axum::routing::post;
    use handlers::spots;

    Router::new()
        .route("/api/spots", get(spots::list).post(spots::create))
        .route("/api/spots/current", get(spots::current))
        .route(
            "/api/spots/:id",
            get(spots::get_one).put(spots::update).delete(spots::destroy),
        )
        .route("/api/spots/:id/images", post(spots::add_image))
        .route(
            "/api/spots/:id/reviews",
            get(spots::list_reviews).post(spots::create_review),
        )
}

fn review_routes() -> Router {
    use axum::routing::{post, put};
    use handlers::reviews;

    Router::new()
        .route("/api/reviews/current", get(reviews::current))
        .route(
            "/api/reviews/:id",
            put(reviews::update).delete(reviews::destroy),
        )
        .route("/api/reviews/:id/images", post(reviews::add_image))
}

fn image_routes() -> Router {
    use axum::routing::delete;
    use handlers::images;

    Router::new()
        .route("/api/spot-images/:id", delete(images::delete_spot_image))
        .route("/api/review-images/:id", delete(images::delete_review_image))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "SpotStay API",
        "version": version,
        "endpoints": {
            "session": "/api/session (POST login, GET restore, DELETE logout)",
            "users": "/api/users (POST signup)",
            "spots": "/api/spots[/current|/:id] and /api/spots/:id/{images,reviews}",
            "reviews": "/api/reviews[/current|/:id] and /api/reviews/:id/images",
            "images": "/api/spot-images/:id, /api/review-images/:id (DELETE)",
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
