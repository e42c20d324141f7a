use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Simple test
        .route("/evaluation/simpletest", post(handlers::submit_simple_test))
        .route("/evaluation/simpletest/progress", post(handlers::save_simple_progress))
        .route("/evaluation/simpletest/{id}/complete", post(handlers::complete_test))
        .route(
            "/evaluation/simpletest/{id}",
            get(handlers::get_test).delete(handlers::delete_test),
        )
        .route("/evaluation/simpletests", get(handlers::list_my_simple_tests))
        .route("/evaluation/simpletests/monthly", get(handlers::simple_monthly_counts))
        .route("/evaluation/allsimpletests", get(handlers::list_all_simple_tests))
        // Advanced test (same handlers, nested answer shape)
        .route("/evaluation/advancedtest", post(handlers::submit_advanced_test))
        .route("/evaluation/advancedtest/progress", post(handlers::save_advanced_progress))
        .route("/evaluation/advancedtest/{id}/complete", post(handlers::complete_test))
        .route(
            "/evaluation/advancedtest/{id}",
            get(handlers::get_test).delete(handlers::delete_test),
        )
        .route("/evaluation/advancedtests", get(handlers::list_my_advanced_tests))
        .route("/evaluation/advancedtests/monthly", get(handlers::advanced_monthly_counts))
        .route("/evaluation/alladvancedtests", get(handlers::list_all_advanced_tests))
        // Consultant chat
        .route("/chat", post(handlers::chat))
        .route("/chat/title", post(handlers::chat_title))
        // Assignments and templates
        .route(
            "/assignments",
            post(handlers::create_assignment).get(handlers::list_assignments),
        )
        .route(
            "/assignments/{id}",
            get(handlers::get_assignment)
                .put(handlers::update_assignment)
                .delete(handlers::delete_assignment),
        )
        .route("/assignments/{id}/assign", post(handlers::assign_template))
        // Add state
        .with_state(state)
        // Add middleware
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}
