//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with SLO-aligned histograms
//! and standardized naming conventions.

use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit,
};
use std::time::Instant;

/// Metrics prefix for all Newsroom metrics
pub const METRICS_PREFIX: &str = "newsroom";

/// SLO-aligned histogram buckets for request latency (in seconds)
/// Targets: P50 < 50ms, P99 < 250ms
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms - P50 target
    0.100,  // 100ms
    0.250,  // 250ms - P99 target
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Listing metrics
    describe_counter!(
        format!("{}_listing_queries_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of listing queries"
    );

    describe_histogram!(
        format!("{}_listing_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Listing query latency in seconds"
    );

    describe_gauge!(
        format!("{}_listing_results_count", METRICS_PREFIX),
        Unit::Count,
        "Number of items returned on the last listing page"
    );

    // Write metrics
    describe_counter!(
        format!("{}_writes_total", METRICS_PREFIX),
        Unit::Count,
        "Total create, update and delete operations"
    );

    describe_counter!(
        format!("{}_publisher_changes_total", METRICS_PREFIX),
        Unit::Count,
        "Total publisher assignments and removals"
    );

    // Dashboard metrics
    describe_counter!(
        format!("{}_dashboard_snapshots_total", METRICS_PREFIX),
        Unit::Count,
        "Total dashboard snapshots taken"
    );

    describe_histogram!(
        format!("{}_dashboard_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Dashboard snapshot latency in seconds"
    );

    // Auth metrics
    describe_counter!(
        format!("{}_logins_total", METRICS_PREFIX),
        Unit::Count,
        "Total login attempts"
    );

    // Database metrics
    describe_gauge!(
        format!("{}_db_connections_active", METRICS_PREFIX),
        Unit::Count,
        "Active database connections"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Helper to record listing metrics
pub fn record_listing(entity: &str, duration_secs: f64, result_count: usize) {
    counter!(
        format!("{}_listing_queries_total", METRICS_PREFIX),
        "entity" => entity.to_string()
    )
    .increment(1);

    histogram!(
        format!("{}_listing_duration_seconds", METRICS_PREFIX),
        "entity" => entity.to_string()
    )
    .record(duration_secs);

    gauge!(
        format!("{}_listing_results_count", METRICS_PREFIX),
        "entity" => entity.to_string()
    )
    .set(result_count as f64);
}

/// Helper to record create/update/delete metrics
pub fn record_write(entity: &str, operation: &str) {
    counter!(
        format!("{}_writes_total", METRICS_PREFIX),
        "entity" => entity.to_string(),
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// Helper to record publisher assignment metrics
pub fn record_publisher_change(operation: &str) {
    counter!(
        format!("{}_publisher_changes_total", METRICS_PREFIX),
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// Helper to record dashboard metrics
pub fn record_dashboard(duration_secs: f64) {
    counter!(format!("{}_dashboard_snapshots_total", METRICS_PREFIX)).increment(1);

    histogram!(format!("{}_dashboard_duration_seconds", METRICS_PREFIX)).record(duration_secs);
}

/// Helper to record login attempts
pub fn record_login(success: bool) {
    let status = if success { "success" } else { "failure" };

    counter!(
        format!("{}_logins_total", METRICS_PREFIX),
        "status" => status.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets() {
        // Verify buckets are sorted and contain SLO targets
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }

        // P50 target (50ms) should be in buckets
        assert!(LATENCY_BUCKETS.contains(&0.050));
        // P99 target (250ms) should be in buckets
        assert!(LATENCY_BUCKETS.contains(&0.250));
    }

    #[test]
    fn test_request_metrics() {
        let metrics = RequestMetrics::start("GET", "/newspapers");
        std::thread::sleep(std::time::Duration::from_millis(10));
        metrics.finish(200);
        // Just verify it runs without panic
    }

    #[test]
    fn test_record_helpers_run() {
        record_listing("newspapers", 0.012, 5);
        record_write("topics", "create");
        record_publisher_change("assign");
        record_dashboard(0.030);
        record_login(true);
    }
}
