// Metrics module for Prometheus observability

mod registry;

pub use registry::{
    gather_metrics,
    AI_CALLS,
    GEMINI_API_CALLS,
    GEMINI_API_DURATION,
    OGP_CACHE_OPERATIONS,
    RATE_LIMIT_DECISIONS,
    REQUESTS_TOTAL,
    REQUEST_DURATION,
};

/// Helper to record request metrics
pub fn record_request(route: &str, status_code: u16, duration_secs: f64) {
    REQUESTS_TOTAL
        .with_label_values(&[route, &status_code.to_string()])
        .inc();

    REQUEST_DURATION
        .with_label_values(&[route])
        .observe(duration_secs);
}

/// Helper to record Gemini API call metrics
pub fn record_gemini_call(model: &str, status_code: u16, duration_secs: f64) {
    GEMINI_API_CALLS
        .with_label_values(&[model, &status_code.to_string()])
        .inc();

    GEMINI_API_DURATION
        .with_label_values(&[model])
        .observe(duration_secs);
}

pub fn record_rate_limit(decision: &str) {
    RATE_LIMIT_DECISIONS.with_label_values(&[decision]).inc();
}

pub fn record_ogp_cache(result: &str) {
    OGP_CACHE_OPERATIONS.with_label_values(&[result]).inc();
}

pub fn record_ai_call(operation: &str, outcome: &str) {
    AI_CALLS.with_label_values(&[operation, outcome]).inc();
}
