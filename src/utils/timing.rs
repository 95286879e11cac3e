use std::time::Instant;

use chrono::Utc;
use tracing::info;

/// Wraps a remote call with request/response lines on the `studio.timing`
/// target, so call latency is greppable separately from the general log.
pub async fn log_request_timing<T, E, F, Fut>(operation: &str, model: &str, call: F) -> Result<T, E>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let started_at = Utc::now();
    let started_perf = Instant::now();
    info!(
        target: "studio.timing",
        "event=request operation={} model={} started_at={}",
        operation,
        model,
        started_at.to_rfc3339()
    );

    let result = call().await;

    let status = if result.is_ok() { "success" } else { "error" };
    let completed_at = Utc::now();
    let duration = started_perf.elapsed().as_secs_f64();
    info!(
        target: "studio.timing",
        "event=response operation={} model={} completed_at={} duration_s={:.3} status={}",
        operation,
        model,
        completed_at.to_rfc3339(),
        duration,
        status
    );

    result
}
