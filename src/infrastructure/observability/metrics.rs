//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use regex::Regex;

use super::config::MetricsConfig;
use crate::domain::{AgentRole, ProcessStatus, Stage};

static PROCESS_ID_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"process_[0-9a-f]{12}").unwrap());

static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
    path: String,
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the /metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("decision_flow_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);

            tracing::info!(path = %config.path, "Prometheus metrics initialized");

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
                path: config.path.clone(),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Create the metrics router
pub fn create_metrics_router(metrics: PrometheusMetrics) -> Router {
    let path = metrics.path.clone();
    Router::new()
        .route(&path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

/// Record one reasoning service call
pub fn record_reasoning_call(role: AgentRole, call: &'static str, success: bool, duration: Duration) {
    let labels = [
        ("role", role.name().to_string()),
        ("call", call.to_string()),
        ("status", if success { "success" } else { "error" }.to_string()),
    ];

    counter!("reasoning_calls_total", &labels).increment(1);
    histogram!("reasoning_call_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Record an evaluator verdict for a stage
pub fn record_verdict(stage: Stage, approved: bool) {
    counter!(
        "workflow_verdicts_total",
        "stage" => stage.name(),
        "verdict" => if approved { "approved" } else { "rejected" }
    )
    .increment(1);
}

/// Record one complementary information retrieval
pub fn record_information_augmentation() {
    counter!("workflow_information_augmentations_total").increment(1);
}

/// Record a process reaching a terminal status
pub fn record_process_outcome(status: ProcessStatus, duration: Duration) {
    let labels = [("status", status.as_str().to_string())];

    counter!("processes_finished_total", &labels).increment(1);
    histogram!("process_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Record a newly created process
pub fn record_process_created() {
    counter!("processes_created_total").increment(1);
}

const MAX_PATH_LABEL_CHARS: usize = 50;

/// Replace process IDs and numeric segments so labels stay low-cardinality
fn sanitize_path(path: &str) -> String {
    let path = PROCESS_ID_SEGMENT.replace_all(path, "{id}");
    let path = NUMERIC_SEGMENT.replace_all(&path, "/{id}$1");

    path.chars().take(MAX_PATH_LABEL_CHARS).collect()
}
