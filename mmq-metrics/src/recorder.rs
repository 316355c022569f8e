//! A `metrics::Recorder` that keeps published values in memory.
//!
//! Runs publish through the `metrics` facade (see [`QueueMetrics::publish`]).
//! Embedding applications normally install their own exporter; this recorder
//! is for harnesses that want to read the values back, scoped to a closure so
//! no global state is touched:
//!
//! ```rust
//! # use std::sync::{Arc, Mutex};
//! # use mmq_metrics::{with_run_recorder, RecordedMetrics};
//! let recorded = Arc::new(Mutex::new(RecordedMetrics::default()));
//! with_run_recorder(&recorded, || {
//!     metrics::counter!("mmq_customers_total", "model" => "MM1").increment(3);
//! });
//! assert_eq!(recorded.lock().unwrap().counter("mmq_customers_total", &[("model", "MM1")]), Some(3));
//! ```
//!
//! [`QueueMetrics::publish`]: crate::aggregate::QueueMetrics::publish

use metrics::{Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Labels = Vec<(String, String)>;

/// Counter and gauge values, keyed by name and sorted labels
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedMetrics {
    counters: BTreeMap<(String, Labels), u64>,
    gauges: BTreeMap<(String, Labels), f64>,
}

impl RecordedMetrics {
    pub fn counter(&self, name: &str, labels: &[(&str, &str)]) -> Option<u64> {
        self.counters.get(&lookup_key(name, labels)).copied()
    }

    pub fn gauge(&self, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        self.gauges.get(&lookup_key(name, labels)).copied()
    }

    /// Names of every counter and gauge seen so far
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .counters
            .keys()
            .chain(self.gauges.keys())
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

fn lookup_key(name: &str, labels: &[(&str, &str)]) -> (String, Labels) {
    let mut labels: Labels = labels.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    labels.sort();
    (name.to_string(), labels)
}

fn owned_key(key: &Key) -> (String, Labels) {
    let mut labels: Labels = key
        .labels()
        .map(|l| (l.key().to_string(), l.value().to_string()))
        .collect();
    labels.sort();
    (key.name().to_string(), labels)
}

fn lock(recorded: &Mutex<RecordedMetrics>) -> MutexGuard<'_, RecordedMetrics> {
    recorded.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Recorder writing into a shared [`RecordedMetrics`]. Histograms are ignored.
#[derive(Debug, Clone)]
pub struct RunRecorder {
    recorded: Arc<Mutex<RecordedMetrics>>,
}

impl RunRecorder {
    pub fn new(recorded: Arc<Mutex<RecordedMetrics>>) -> Self {
        Self { recorded }
    }
}

/// Run `f` with a [`RunRecorder`] installed as the thread-local recorder
pub fn with_run_recorder<T>(recorded: &Arc<Mutex<RecordedMetrics>>, f: impl FnOnce() -> T) -> T {
    let recorder = RunRecorder::new(recorded.clone());
    metrics::with_local_recorder(&recorder, f)
}

struct CounterHandle {
    recorded: Arc<Mutex<RecordedMetrics>>,
    key: (String, Labels),
}

impl metrics::CounterFn for CounterHandle {
    fn increment(&self, value: u64) {
        *lock(&self.recorded).counters.entry(self.key.clone()).or_default() += value;
    }

    fn absolute(&self, value: u64) {
        lock(&self.recorded).counters.insert(self.key.clone(), value);
    }
}

struct GaugeHandle {
    recorded: Arc<Mutex<RecordedMetrics>>,
    key: (String, Labels),
}

impl metrics::GaugeFn for GaugeHandle {
    fn increment(&self, value: f64) {
        *lock(&self.recorded).gauges.entry(self.key.clone()).or_default() += value;
    }

    fn decrement(&self, value: f64) {
        *lock(&self.recorded).gauges.entry(self.key.clone()).or_default() -= value;
    }

    fn set(&self, value: f64) {
        lock(&self.recorded).gauges.insert(self.key.clone(), value);
    }
}

impl Recorder for RunRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        Counter::from_arc(Arc::new(CounterHandle {
            recorded: self.recorded.clone(),
            key: owned_key(key),
        }))
    }

    fn register_gauge(&self, key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::from_arc(Arc::new(GaugeHandle {
            recorded: self.recorded.clone(),
            key: owned_key(key),
        }))
    }

    fn register_histogram(&self, _key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::noop()
    }
}
