use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};
use service::ErrorKind;

// Prometheus metrics (default registry)
pub static REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "student_registry_requests_total",
        "Requests handled per record operation",
        &["operation"]
    )
    .expect("register requests_total")
});

pub static ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "student_registry_errors_total",
        "Failed requests per error kind",
        &["kind"]
    )
    .expect("register errors_total")
});

pub fn record_request(operation: &str) {
    REQUESTS_TOTAL.with_label_values(&[operation]).inc();
}

pub fn record_error(kind: ErrorKind) {
    ERRORS_TOTAL.with_label_values(&[kind.as_str()]).inc();
}

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    // Touch the statics so both families show up before the first request.
    Lazy::force(&REQUESTS_TOTAL);
    Lazy::force(&ERRORS_TOTAL);
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}
