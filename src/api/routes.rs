//! API Route Configuration

use super::handlers::{self, AppState};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the router with every route nested under /api
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        // Close management
        .route(
            "/close/tasks",
            get(handlers::list_close_tasks).patch(handlers::bulk_update_close_tasks),
        )
        .route(
            "/close/tasks/:id",
            get(handlers::get_close_task).patch(handlers::patch_close_task),
        )
        // Reconciliation
        .route("/recons", get(handlers::list_recons))
        .route(
            "/recons/:id",
            get(handlers::get_recon).patch(handlers::patch_recon),
        )
        .route(
            "/data-templates/bindings",
            get(handlers::list_bindings).post(handlers::create_binding),
        )
        // Revenue assurance
        .route("/revenue-cases", get(handlers::list_revenue_cases))
        .route(
            "/revenue-cases/:id",
            get(handlers::get_revenue_case).patch(handlers::patch_revenue_case),
        )
        // Streaming queries
        .route("/sse", post(handlers::stream_query))
        .route("/query/:id/result", get(handlers::get_query_result))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
