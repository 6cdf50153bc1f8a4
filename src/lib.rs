use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod services;
pub mod storage;

use config::Config;
use db::Store;
use services::analyzer::FoodAnalyzer;
use storage::{UploadKind, UploadStore, PUBLIC_PREFIX};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<Config>,
    pub uploads: Arc<UploadStore>,
    pub analyzer: Arc<dyn FoodAnalyzer>,
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = std::iter::once(&config.frontend_url)
        .chain(config.extra_origins.iter())
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(hv) => Some(hv),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

pub fn build_router(state: AppState) -> Router {
    use handlers::{analytics, auth as auth_h, diet, foods, habits, health, users, water};

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/readyz", get(health::readyz))
        .route("/api/auth/register", post(auth_h::register))
        .route("/api/auth/login", post(auth_h::login))
        .route("/api/auth/google", post(auth_h::google));

    let protected_routes = Router::new()
        .route("/api/auth/me", get(auth_h::me))
        // Users
        .route(
            "/api/users/profile",
            get(users::get_profile).put(users::update_profile),
        )
        .route("/api/users/profile/photo", post(users::upload_photo))
        .route(
            "/api/users/profile/preview-targets",
            post(users::preview_profile_targets),
        )
        .route("/api/users/settings", put(users::update_settings))
        // Foods
        .route("/api/foods", get(foods::list_foods).post(foods::create_food))
        .route("/api/foods/search", get(foods::search_foods))
        .route("/api/foods/analyze-image", post(foods::analyze_image))
        // Diet entries
        .route(
            "/api/diet/entries",
            get(diet::list_entries).post(diet::create_entry),
        )
        .route(
            "/api/diet/entries/:id",
            put(diet::update_entry).delete(diet::delete_entry),
        )
        .route("/api/diet/entries/:id/toggle", patch(diet::toggle_entry))
        // Habits
        .route(
            "/api/habits",
            get(habits::list_habits).post(habits::create_habit),
        )
        .route(
            "/api/habits/:id",
            put(habits::update_habit).delete(habits::delete_habit),
        )
        .route("/api/habits/:id/entries", get(habits::list_entries))
        .route(
            "/api/habits/:id/entries/:date/toggle",
            patch(habits::toggle_entry),
        )
        .route("/api/habits/:id/streak", get(habits::get_streak))
        // Analytics
        .route("/api/analytics/daily", get(analytics::daily))
        .route("/api/analytics/weekly", get(analytics::weekly))
        .route("/api/analytics/monthly", get(analytics::monthly))
        .route("/api/analytics/macros", get(analytics::macros))
        .route("/api/analytics/export-pdf", get(analytics::export_pdf))
        // Water
        .route("/api/water", post(water::log_water))
        .route("/api/water/today", get(water::get_today))
        .route("/api/water/history", get(water::get_history))
        .route("/api/water/:id", put(water::update_water))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    // Multipart framing on top of the largest accepted image.
    let body_limit = UploadKind::FoodImage.max_bytes() + 1024 * 1024;

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service(PUBLIC_PREFIX, ServeDir::new(state.uploads.dir()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
