//! Observability infrastructure - Prometheus metrics

mod config;
mod metrics;

pub use config::{MetricsConfig, ObservabilityConfig};
pub use metrics::{
    create_metrics_router, init_metrics, record_http_request, record_information_augmentation,
    record_process_created, record_process_outcome, record_reasoning_call, record_verdict,
    PrometheusMetrics,
};
