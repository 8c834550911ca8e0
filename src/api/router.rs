use axum::{http::HeaderName, middleware, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::health;
use super::middleware::logging::REQUEST_ID_HEADER;
use super::middleware::{logging_middleware, metrics_middleware};
use super::state::AppState;
use super::v1;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Create the full router with application state
pub fn create_router(state: AppState, metrics: Option<PrometheusMetrics>) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let mut router = Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::live_check))
        .route("/health/ready", get(health::ready_check))
        .nest("/api/v1", v1::create_v1_router())
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(CorsLayer::permissive());

    // Add metrics endpoint if enabled
    if let Some(m) = metrics {
        router = router.merge(create_metrics_router(m));
    }

    router
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::domain::reasoning::{AgentRole, ScriptedReasoningService};
    use crate::infrastructure::process::InMemoryProcessRepository;
    use crate::infrastructure::services::{DecisionService, ProcessManager};
    use crate::infrastructure::workflow::DecisionEngine;

    const QUERY: &str = "Should we migrate our billing system to a new vendor?";

    fn app_with(reasoning: ScriptedReasoningService) -> Router {
        let engine = Arc::new(DecisionEngine::new(Arc::new(reasoning)));
        let manager = ProcessManager::new(Arc::new(InMemoryProcessRepository::new()), engine.clone());
        let state = AppState::new(Arc::new(manager), Arc::new(DecisionService::new(engine)));
        create_router(state, None)
    }

    fn app() -> Router {
        app_with(ScriptedReasoningService::new())
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn delete(uri: &str) -> Request<Body> {
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn wait_for_terminal(app: &Router, process_id: &str) -> Value {
        for _ in 0..100 {
            let (status, body) = send(app, get(&format!("/api/v1/decisions/status/{}", process_id))).await;
            assert_eq!(status, StatusCode::OK);
            if body["status"] == "completed" || body["status"] == "failed" {
                return body;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("process {} did not finish", process_id);
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = app();

        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, _) = send(&app, get("/health/live")).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, get("/health/ready")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"][0]["name"], "process_storage_memory");
        assert_eq!(body["checks"][0]["status"], "healthy");
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let response = app().oneshot(get("/health")).await.unwrap();
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn test_run_decision() {
        let (status, body) = send(
            &app(),
            post_json(
                "/api/v1/decisions/run?include_history=true",
                serde_json::json!({ "decision_query": QUERY }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["selected_decision"], "selected option 1");
        assert_eq!(body["alternative_decision"], "fallback option 1");
        assert_eq!(body["decision_requested"], QUERY);
        assert_eq!(body["history"][0], "capture_query");
    }

    #[tokio::test]
    async fn test_run_decision_validation_error() {
        let (status, body) = send(
            &app(),
            post_json(
                "/api/v1/decisions/run",
                serde_json::json!({ "decision_query": "short" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "invalid_request_error");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("at least 10 characters"));
    }

    #[tokio::test]
    async fn test_run_decision_provider_failure() {
        let app = app_with(
            ScriptedReasoningService::new().failing_on(AgentRole::ScopeDefinition, "quota exceeded"),
        );

        let (status, body) = send(
            &app,
            post_json(
                "/api/v1/decisions/run",
                serde_json::json!({ "decision_query": QUERY }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "step_execution_error");
    }

    #[tokio::test]
    async fn test_malformed_json_uses_error_envelope() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/decisions/start")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = send(&app(), request).await;
        assert!(status.is_client_error());
        assert_eq!(body["error"]["code"], "json_parse_error");
    }

    #[tokio::test]
    async fn test_start_and_poll_decision() {
        let app = app();

        let (status, body) = send(
            &app,
            post_json(
                "/api/v1/decisions/start",
                serde_json::json!({ "decision_query": QUERY }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["status"], "pending");
        let process_id = body["process_id"].as_str().unwrap().to_string();
        assert!(process_id.starts_with("process_"));

        let finished = wait_for_terminal(&app, &process_id).await;
        assert_eq!(finished["status"], "completed");
        assert_eq!(finished["result"]["selected_decision"], "selected option 1");
        assert!(finished["completed_at"].is_string());
        assert!(finished.get("error").is_none());

        let (status, body) = send(&app, get("/api/v1/decisions/processes/stats")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["completed"], 1);
    }

    #[tokio::test]
    async fn test_failed_process_is_visible() {
        let app = app_with(
            ScriptedReasoningService::new().failing_on(AgentRole::Result, "model overloaded"),
        );

        let (_, body) = send(
            &app,
            post_json(
                "/api/v1/decisions/start",
                serde_json::json!({ "decision_query": QUERY }),
            ),
        )
        .await;
        let process_id = body["process_id"].as_str().unwrap().to_string();

        let finished = wait_for_terminal(&app, &process_id).await;
        assert_eq!(finished["status"], "failed");
        assert!(finished["error"].as_str().unwrap().contains("model overloaded"));
        assert!(finished.get("result").is_none());

        let (status, body) = send(&app, get("/api/v1/decisions/processes?status=failed")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["processes"].as_array().unwrap().len(), 1);
        assert_eq!(body["stats"]["failed"], 1);
    }

    #[tokio::test]
    async fn test_start_rejects_invalid_query() {
        let app = app();
        let (status, _) = send(
            &app,
            post_json(
                "/api/v1/decisions/start",
                serde_json::json!({ "decision_query": "   " }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = send(&app, get("/api/v1/decisions/processes")).await;
        assert!(body["processes"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_not_found_and_invalid_id() {
        let app = app();

        let (status, body) = send(&app, get("/api/v1/decisions/status/process_0123456789ab")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["type"], "not_found_error");

        let (status, _) = send(&app, get("/api/v1/decisions/status/not-an-id")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_status() {
        let (status, body) = send(&app(), get("/api/v1/decisions/processes?status=archived")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["param"], "status");
    }

    #[tokio::test]
    async fn test_delete_and_cleanup() {
        let app = app();

        let (_, body) = send(
            &app,
            post_json(
                "/api/v1/decisions/start",
                serde_json::json!({ "decision_query": QUERY }),
            ),
        )
        .await;
        let process_id = body["process_id"].as_str().unwrap().to_string();
        wait_for_terminal(&app, &process_id).await;

        let (status, body) = send(&app, delete("/api/v1/decisions/cleanup?older_than_hours=24")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["removed"], 0);

        let uri = format!("/api/v1/decisions/processes/{}", process_id);
        let (status, _) = send(&app, delete(&uri)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, delete(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cleanup_with_out_of_range_hours_removes_nothing() {
        let app = app();

        let (_, body) = send(
            &app,
            post_json(
                "/api/v1/decisions/start",
                serde_json::json!({ "decision_query": QUERY }),
            ),
        )
        .await;
        let process_id = body["process_id"].as_str().unwrap().to_string();
        wait_for_terminal(&app, &process_id).await;

        for hours in ["10000000000", "18446744073709551615"] {
            let uri = format!("/api/v1/decisions/cleanup?older_than_hours={}", hours);
            let (status, body) = send(&app, delete(&uri)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["removed"], 0);
        }

        let (status, _) = send(&app, get(&format!("/api/v1/decisions/status/{}", process_id))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_non_ascii_path_is_not_found() {
        let uri = format!("/{}", "%C3%A9".repeat(40));
        let (status, _) = send(&app(), get(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let uri = format!("/{}", "é".repeat(40));
        let (status, _) = send(&app(), get(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_graph_endpoints() {
        let app = app();

        let (status, body) = send(&app, get("/api/v1/graph/mermaid")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["mermaid"].as_str().unwrap().contains("stateDiagram-v2"));

        let (status, body) = send(&app, get("/api/v1/graph/structure")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_nodes"], 20);
        assert_eq!(body["state_type"], "DecisionState");
    }
}
