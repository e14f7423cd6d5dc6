//! Linkage-specific counters and histograms.

use opentelemetry::metrics::{Counter, Histogram, Meter};

pub struct LinkageMetrics {
    pub links_requested: Counter<u64>,
    pub persons_created: Counter<u64>,
    pub match_rms: Histogram<f64>,
    pub request_duration_ms: Histogram<f64>,
}

impl LinkageMetrics {
    pub fn new(meter: &Meter) -> Self {
        Self {
            links_requested: meter.u64_counter("mpi.links_requested").init(),
            persons_created: meter.u64_counter("mpi.persons_created").init(),
            match_rms: meter.f64_histogram("mpi.match_rms").init(),
            request_duration_ms: meter.f64_histogram("mpi.request_duration_ms").init(),
        }
    }
}
