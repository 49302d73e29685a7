//! Prometheus metrics exposition
//!
//! - `charge_monitor_requests_total` (counter): labels `status`, `method`
//! - `charge_monitor_request_duration_seconds` (histogram): label `status`
//! - `charge_monitor_tesla_errors_total` (counter): label `error_type`
//! - `charge_monitor_authenticated` (gauge): 1 while credentials are stored
//! - `charge_monitor_token_expired_total` (counter): stored token rejected by
//!   the owner API, session needs re-authentication

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

const DURATION_METRIC: &str = "charge_monitor_request_duration_seconds";

/// Bucket boundaries from 5ms up to 30s. Owner API calls are bounded by the
/// client timeout, so nothing legitimate lands far above that.
const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

fn builder() -> Result<PrometheusBuilder, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(DURATION_METRIC.to_string()), DURATION_BUCKETS)
}

/// Install the global Prometheus recorder and return a handle for `/metrics`.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    builder()?.install_recorder()
}

/// Record a completed API request with status code and HTTP method labels.
pub fn record_request(status: u16, method: &str, duration_secs: f64) {
    let status_str = status.to_string();
    metrics::counter!("charge_monitor_requests_total", "status" => status_str.clone(), "method" => method.to_string())
        .increment(1);
    metrics::histogram!(DURATION_METRIC, "status" => status_str).record(duration_secs);
}

/// Record a failed call to Tesla (token exchange or owner API).
pub fn record_tesla_error(error_type: &str) {
    metrics::counter!("charge_monitor_tesla_errors_total", "error_type" => error_type.to_string())
        .increment(1);
}

pub fn set_authenticated(authenticated: bool) {
    metrics::gauge!("charge_monitor_authenticated").set(if authenticated { 1.0 } else { 0.0 });
}

/// Record the owner API rejecting the stored access token.
pub fn record_token_expired() {
    metrics::counter!("charge_monitor_token_expired_total").increment(1);
}

/// Middleware recording `record_request` for every response.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    record_request(
        response.status().as_u16(),
        &method,
        started.elapsed().as_secs_f64(),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusRecorder;

    /// Isolated recorder/handle pair. `install_recorder()` can only succeed
    /// once per process, so tests never call it.
    fn isolated_recorder() -> (PrometheusRecorder, PrometheusHandle) {
        let recorder = builder().unwrap().build_recorder();
        let handle = recorder.handle();
        (recorder, handle)
    }

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        record_request(200, "GET", 0.05);
        record_tesla_error("token_expired");
        record_token_expired();
        set_authenticated(true);
    }

    #[test]
    fn record_request_renders_counter_and_histogram() {
        let (recorder, handle) = isolated_recorder();
        let _guard = metrics::set_default_local_recorder(&recorder);

        record_request(200, "GET", 0.042);
        record_request(404, "DELETE", 0.001);

        let output = handle.render();
        assert!(output.contains("charge_monitor_requests_total"));
        assert!(output.contains("status=\"200\""));
        assert!(output.contains("method=\"GET\""));
        assert!(output.contains("status=\"404\""));
        assert!(output.contains("method=\"DELETE\""));
        assert!(
            output.contains("charge_monitor_request_duration_seconds_bucket"),
            "histogram must render _bucket lines"
        );
        assert!(output.contains("le=\"30\""));
        assert!(output.contains("le=\"+Inf\""));
    }

    #[test]
    fn tesla_errors_are_labelled_by_type() {
        let (recorder, handle) = isolated_recorder();
        let _guard = metrics::set_default_local_recorder(&recorder);

        record_tesla_error("token_expired");
        record_tesla_error("no_vehicles_found");

        let output = handle.render();
        assert!(output.contains("charge_monitor_tesla_errors_total"));
        assert!(output.contains("error_type=\"token_expired\""));
        assert!(output.contains("error_type=\"no_vehicles_found\""));
    }

    #[test]
    fn authenticated_gauge_tracks_state() {
        let (recorder, handle) = isolated_recorder();
        let _guard = metrics::set_default_local_recorder(&recorder);

        set_authenticated(true);
        assert!(handle.render().contains("charge_monitor_authenticated 1"));

        set_authenticated(false);
        assert!(handle.render().contains("charge_monitor_authenticated 0"));
    }

    #[test]
    fn token_expired_counter_increments() {
        let (recorder, handle) = isolated_recorder();
        let _guard = metrics::set_default_local_recorder(&recorder);

        record_token_expired();
        record_token_expired();

        assert!(
            handle
                .render()
                .contains("charge_monitor_token_expired_total 2")
        );
    }
}
