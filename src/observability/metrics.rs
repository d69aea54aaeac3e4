use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub rides_total: IntCounterVec,
    pub dispatch_latency_seconds: HistogramVec,
    pub unicorn_assignments_total: IntCounterVec,
    pub store_write_seconds: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let rides_total = IntCounterVec::new(
            Opts::new("rides_total", "Ride requests by outcome"),
            &["outcome"],
        )
        .expect("valid rides_total metric");

        let dispatch_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "dispatch_latency_seconds",
                "End-to-end ride dispatch latency in seconds",
            ),
            &["outcome"],
        )
        .expect("valid dispatch_latency_seconds metric");

        let unicorn_assignments_total = IntCounterVec::new(
            Opts::new("unicorn_assignments_total", "Rides assigned per unicorn"),
            &["unicorn"],
        )
        .expect("valid unicorn_assignments_total metric");

        let store_write_seconds = Histogram::with_opts(HistogramOpts::new(
            "store_write_seconds",
            "Latency of ride store writes in seconds",
        ))
        .expect("valid store_write_seconds metric");

        registry
            .register(Box::new(rides_total.clone()))
            .expect("register rides_total");
        registry
            .register(Box::new(dispatch_latency_seconds.clone()))
            .expect("register dispatch_latency_seconds");
        registry
            .register(Box::new(unicorn_assignments_total.clone()))
            .expect("register unicorn_assignments_total");
        registry
            .register(Box::new(store_write_seconds.clone()))
            .expect("register store_write_seconds");

        Self {
            registry,
            rides_total,
            dispatch_latency_seconds,
            unicorn_assignments_total,
            store_write_seconds,
        }
    }

    pub fn record_outcome(&self, outcome: &str, elapsed_seconds: f64) {
        self.rides_total.with_label_values(&[outcome]).inc();
        self.dispatch_latency_seconds
            .with_label_values(&[outcome])
            .observe(elapsed_seconds);
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
