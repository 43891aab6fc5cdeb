use std::time::Instant;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

const REQUEST_DURATION: &str = "haven_http_request_duration_seconds";

/// Latency buckets sized for API calls; AI replies land in the upper ones.
const DURATION_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Records a request counter and latency histogram labelled by method, route template and status.
pub async fn metrics_middleware(
    matched_path: Option<MatchedPath>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let route = route_label(matched_path.as_ref().map(MatchedPath::as_str));

    let response = next.run(req).await;

    let labels = [
        ("method", method),
        ("route", route),
        ("status", response.status().as_u16().to_string()),
    ];
    counter!("haven_http_requests_total", &labels).increment(1);
    histogram!(REQUEST_DURATION, &labels).record(start.elapsed().as_secs_f64());

    response
}

/// Unmatched requests share one label so arbitrary URLs cannot grow the series count.
fn route_label(matched: Option<&str>) -> String {
    matched.unwrap_or("unmatched").to_owned()
}

/// Installs the Prometheus recorder with a `service` label on every series.
pub fn init_metrics(service: &str) -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .add_global_label("service", service)
        .set_buckets_for_metric(Matcher::Full(REQUEST_DURATION.to_owned()), DURATION_BUCKETS)?
        .install_recorder()?;
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_use_the_template_or_a_shared_fallback() {
        assert_eq!(route_label(Some("/conversations/:id")), "/conversations/:id");
        assert_eq!(route_label(None), "unmatched");
    }
}
