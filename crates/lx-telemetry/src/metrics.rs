//! Prometheus metrics for the ledger-sync engine.
//!
//! All metrics follow the naming convention: `lx_<subsystem>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramVec, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Metrics registry owned by this process
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // SIMULATOR
    // =========================================================================

    /// Blocks produced by the synthetic chain
    pub static ref BLOCKS_GENERATED: Counter = Counter::new(
        "lx_simulator_blocks_generated_total",
        "Total number of blocks generated by the simulator"
    ).expect("metric creation failed");

    // =========================================================================
    // STATE STORE
    // =========================================================================

    /// Blocks dropped by the retention bound
    pub static ref BLOCKS_EVICTED: Counter = Counter::new(
        "lx_store_blocks_evicted_total",
        "Total number of blocks evicted by the retention bound"
    ).expect("metric creation failed");

    /// Blocks currently retained
    pub static ref RETAINED_BLOCKS: Gauge = Gauge::new(
        "lx_store_retained_blocks",
        "Number of blocks currently held in memory"
    ).expect("metric creation failed");

    /// Chain tip height as last observed
    pub static ref CHAIN_HEIGHT: Gauge = Gauge::new(
        "lx_store_chain_height",
        "Current chain height"
    ).expect("metric creation failed");

    /// Highest finalized height as last observed
    pub static ref FINALIZED_HEIGHT: Gauge = Gauge::new(
        "lx_store_finalized_height",
        "Height of the last finalized block"
    ).expect("metric creation failed");

    // =========================================================================
    // LIVE SYNC
    // =========================================================================

    /// Poll attempts by outcome
    pub static ref POLLS: CounterVec = CounterVec::new(
        Opts::new("lx_live_polls_total", "Node polls by outcome"),
        &["outcome"]  // outcome: success/failure/skipped
    ).expect("metric creation failed");

    /// Older pages appended through pagination
    pub static ref PAGES_LOADED: Counter = Counter::new(
        "lx_live_pages_loaded_total",
        "Total number of older block pages appended"
    ).expect("metric creation failed");

    /// Wire records dropped during mapping
    pub static ref RECORDS_REJECTED: CounterVec = CounterVec::new(
        Opts::new("lx_live_records_rejected_total", "Wire records rejected by validation"),
        &["kind"]  // kind: block/transaction
    ).expect("metric creation failed");

    /// Duration of one cycle (generation or poll)
    pub static ref CYCLE_DURATION: HistogramVec = HistogramVec::new(
        prometheus::HistogramOpts::new(
            "lx_cycle_duration_seconds",
            "Time spent in one synchronization cycle"
        ).buckets(exponential_buckets(0.0001, 2.0, 16).unwrap_or_default()),
        &["backend"]  // backend: simulated/live
    ).expect("metric creation failed");
}

/// Handle keeping the registry alive.
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics. Safe to call more than once.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(BLOCKS_GENERATED.clone()),
        Box::new(BLOCKS_EVICTED.clone()),
        Box::new(RETAINED_BLOCKS.clone()),
        Box::new(CHAIN_HEIGHT.clone()),
        Box::new(FINALIZED_HEIGHT.clone()),
        Box::new(POLLS.clone()),
        Box::new(PAGES_LOADED.clone()),
        Box::new(RECORDS_REJECTED.clone()),
        Box::new(CYCLE_DURATION.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

/// Start timing a cycle for `backend`. Observation happens on drop.
pub fn time_cycle(backend: &str) -> HistogramTimer {
    HistogramTimer::new(&CYCLE_DURATION.with_label_values(&[backend]))
}
