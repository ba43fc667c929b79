use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};
use std::time::Duration;

/// Request-level instruments for `/detect`. Without an installed meter
/// provider these are no-ops.
#[derive(Clone)]
pub struct DetectMetrics {
    duration: Histogram<f64>,
    requests: Counter<u64>,
    failures: Counter<u64>,
    detections: Counter<u64>,
}

impl DetectMetrics {
    pub fn new(meter_name: &'static str) -> Self {
        let meter = global::meter(meter_name);
        let latency_buckets = [
            0.01, 0.025, 0.05, 0.075, 0.1, 0.15, 0.2, 0.3, 0.5, 0.75, 1.0, 2.0, 5.0,
        ];

        Self {
            duration: meter
                .f64_histogram("detect_duration_seconds")
                .with_description("Time to serve a detect request (decode + infer + encode)")
                .with_unit("s")
                .with_boundaries(latency_buckets.to_vec())
                .build(),
            requests: meter
                .u64_counter("detect_requests_total")
                .with_description("Total detect requests received")
                .build(),
            failures: meter
                .u64_counter("detect_failures_total")
                .with_description("Total detect requests that returned an error")
                .build(),
            detections: meter
                .u64_counter("detections_total")
                .with_description("Total objects detected")
                .build(),
        }
    }

    pub fn record_request(&self) {
        self.requests.add(1, &[]);
    }

    pub fn record_success(&self, elapsed: Duration, detections: usize) {
        self.duration.record(elapsed.as_secs_f64(), &[]);
        self.detections.add(detections as u64, &[]);
    }

    pub fn record_failure(&self, kind: &'static str) {
        self.failures.add(1, &[KeyValue::new("reason", kind)]);
    }
}
