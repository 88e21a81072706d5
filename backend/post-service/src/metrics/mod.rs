//! Prometheus metrics for post-service.
//!
//! Exposes post, like and login collectors and an HTTP handler for the `/metrics` endpoint.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

lazy_static! {
    /// Like/dislike attempts segmented by operation and outcome.
    pub static ref LIKE_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "post_like_operations_total",
        "Like and dislike operations segmented by outcome",
        &["operation", "outcome"]
    )
    .expect("failed to register post_like_operations_total");

    /// Post lifecycle events (created/deleted).
    pub static ref POST_EVENTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "post_events_total",
        "Post lifecycle events segmented by kind",
        &["event"]
    )
    .expect("failed to register post_events_total");

    /// OAuth logins segmented by result (new_user/returning/failed).
    pub static ref LOGINS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "auth_logins_total",
        "OAuth login attempts segmented by result",
        &["result"]
    )
    .expect("failed to register auth_logins_total");
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
