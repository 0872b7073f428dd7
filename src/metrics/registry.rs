// Prometheus metrics registry and collectors

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry, CounterVec,
    Encoder, HistogramVec, Opts, Registry, TextEncoder,
};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // REQUEST METRICS
    // ============================================================================

    /// Total number of API requests
    pub static ref REQUESTS_TOTAL: CounterVec = register_counter_vec_with_registry!(
        Opts::new("requests_total", "Total number of API requests"),
        &["route", "status_code"],
        REGISTRY
    ).unwrap();

    /// Request duration histogram
    pub static ref REQUEST_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("request_duration_seconds", "Request duration in seconds")
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["route"],
        REGISTRY
    ).unwrap();

    // ============================================================================
    // ADMISSION CONTROL METRICS
    // ============================================================================

    pub static ref RATE_LIMIT_DECISIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("rate_limit_decisions_total", "Admission control decisions"),
        &["decision"], // decision: admitted, rejected, fail_open
        REGISTRY
    ).unwrap();

    // ============================================================================
    // OGP CACHE METRICS
    // ============================================================================

    pub static ref OGP_CACHE_OPERATIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("ogp_cache_operations_total", "Link preview cache operations"),
        &["result"], // result: hit, miss, write_error
        REGISTRY
    ).unwrap();

    // ============================================================================
    // AI METRICS
    // ============================================================================

    /// Gemini API calls by upstream status (0 = timed out)
    pub static ref GEMINI_API_CALLS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("gemini_api_calls_total", "Total Gemini API calls"),
        &["model", "status_code"],
        REGISTRY
    ).unwrap();

    /// Gemini API call duration
    pub static ref GEMINI_API_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("gemini_api_duration_seconds", "Gemini API call duration")
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["model"],
        REGISTRY
    ).unwrap();

    /// AI gateway outcomes
    pub static ref AI_CALLS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("ai_calls_total", "AI gateway operations by outcome"),
        &["operation", "outcome"], // outcome: ok, fallback, offline
        REGISTRY
    ).unwrap();
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
