//! Versioned API endpoints

pub mod decisions;
pub mod graph;

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::state::AppState;

/// Create the /api/v1 router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/decisions/run", post(decisions::run_decision))
        .route("/decisions/start", post(decisions::start_decision))
        .route("/decisions/status/{process_id}", get(decisions::get_status))
        .route("/decisions/processes", get(decisions::list_processes))
        .route("/decisions/processes/stats", get(decisions::process_stats))
        .route(
            "/decisions/processes/{process_id}",
            delete(decisions::delete_process),
        )
        .route("/decisions/cleanup", delete(decisions::cleanup_processes))
        .route("/graph/mermaid", get(graph::get_mermaid))
        .route("/graph/structure", get(graph::get_structure))
}
