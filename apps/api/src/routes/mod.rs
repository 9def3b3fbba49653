pub mod health;
pub mod rate_limit;
pub mod site;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::advisor::handlers as advisor;
use crate::plan::handlers as plan;
use crate::state::AppState;

/// Ceiling for JSON request bodies.
pub const BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let root = state.config.site_root.clone();

    Router::new()
        .route("/api/health", get(health::health_handler))
        .route("/api/plan", get(plan::handle_get_plan))
        .route("/api/plan/pdf", post(plan::handle_plan_pdf))
        .route("/api/ai-finance", post(advisor::handle_ask))
        .route("/", get(site::root_page))
        // Static site
        .nest_service("/public", ServeDir::new(root.join("public")))
        .nest_service("/data", ServeDir::new(root.join("data")))
        .fallback_service(ServeDir::new(root))
        .layer(middleware::from_fn(site::hide_dotfiles))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::enforce,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
