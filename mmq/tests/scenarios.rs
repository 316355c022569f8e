//! Hand-computed scenarios replayed end to end through the facade

use mmq::core::DrawSite;
use mmq::prelude::*;

const EPS: f64 = 1e-9;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < EPS
}

#[test]
fn single_server_worked_example() {
    let config = SimulationConfig::new(QueueModel::Mm1, 1.0, 1.0, 3);
    let report = replay_durations(&config, &[0.0, 0.5, 0.3], &[0.4, 0.6, 0.2]).unwrap();

    let arrivals: Vec<f64> = report.records.iter().map(|r| r.arrival_time).collect();
    assert!(close(arrivals[1], 0.5) && close(arrivals[2], 0.8));

    let third = report.records[2].service().unwrap();
    assert!(close(third.service_begin, 1.1));
    assert!(close(third.service_end, 1.3));
    assert!(close(third.waiting_time, 0.3));

    let m = &report.metrics;
    assert!(close(m.simulation_horizon, 1.3));
    assert!(close(m.w, 0.5));
    assert!(close(m.wq, 0.1));
    assert!(close(m.l, 1.5 / 1.3));
    assert_eq!(m.blocking_probability, None);
    assert_eq!(report.peak_queue_len, 1);
}

#[test]
fn first_interarrival_is_discarded() {
    let config = SimulationConfig::new(QueueModel::Mm1, 1.0, 1.0, 3);
    let report = replay_durations(&config, &[9.0, 0.5, 0.3], &[0.4, 0.6, 0.2]).unwrap();

    assert_eq!(report.records[0].interarrival_time, 0.0);
    assert_eq!(report.records[0].arrival_time, 0.0);
    assert!(close(report.metrics.simulation_horizon, 1.3));
}

#[test]
fn zero_capacity_blocks_while_busy() {
    let config = SimulationConfig::new(QueueModel::Mm1k { capacity: 0 }, 1.0, 1.0, 4);
    let report = replay_durations(&config, &[0.0, 1.0, 1.0, 1.0], &[1.5; 4]).unwrap();

    let statuses: Vec<CustomerStatus> = report.records.iter().map(CustomerRecord::status).collect();
    assert_eq!(
        statuses,
        vec![
            CustomerStatus::Served,
            CustomerStatus::Blocked,
            CustomerStatus::Served,
            CustomerStatus::Blocked,
        ]
    );
    assert_eq!(report.metrics.blocking_probability, Some(0.5));
    assert!(close(report.metrics.simulation_horizon, 3.5));
    assert_eq!(report.peak_queue_len, 0);

    let blocked = &report.records[1];
    assert_eq!(blocked.service_begin(), None);
    assert_eq!(blocked.waiting_time(), None);
}

#[test]
fn multi_server_serves_in_parallel() {
    let config = SimulationConfig::new(QueueModel::Mmc { servers: 2 }, 1.0, 1.0, 3);
    let report = replay_durations(&config, &[0.0, 0.0, 0.0], &[1.0, 2.0, 1.0]).unwrap();

    let servers: Vec<Option<usize>> = report.records.iter().map(CustomerRecord::server_index).collect();
    assert_eq!(servers, vec![Some(1), Some(2), Some(1)]);

    let third = report.records[2].service().unwrap();
    assert!(close(third.service_begin, 1.0));
    assert!(close(third.waiting_time, 1.0));
    assert!(close(report.metrics.simulation_horizon, 2.0));
    assert_eq!(report.metrics.queued_count, 1);
}

#[test]
fn duration_sequences_must_match_customer_count() {
    let config = SimulationConfig::new(QueueModel::Mm1, 1.0, 1.0, 3);

    let err = replay_durations(&config, &[0.0, 0.5], &[0.4, 0.6, 0.2]).unwrap_err();
    assert!(matches!(err, SimError::InvalidParameter { ref field, .. } if field == "interarrival"));

    let err = replay_durations(&config, &[0.0, 0.5, 0.3], &[0.4, -0.6, 0.2]).unwrap_err();
    assert!(matches!(err, SimError::InvalidParameter { ref field, .. } if field == "service"));
}

#[test]
fn invalid_configuration_reports_every_field() {
    let config = SimulationConfig::new(QueueModel::Mmc { servers: 0 }, -1.0, f64::NAN, 0);

    match simulate(&config) {
        Err(SimError::InvalidConfiguration(errors)) => {
            assert_eq!(
                errors.fields(),
                vec!["arrival_rate", "service_rate", "num_customers", "servers"]
            );
        }
        other => panic!("expected InvalidConfiguration, got {other:?}"),
    }
}

#[test]
fn non_positive_rates_and_counts_are_input_errors() {
    let cases = [
        (SimulationConfig::new(QueueModel::Mm1, 0.0, 1.0, 10), "arrival_rate"),
        (SimulationConfig::new(QueueModel::Mm1k { capacity: 2 }, 1.0, -2.0, 10), "service_rate"),
        (SimulationConfig::new(QueueModel::Mmc { servers: 2 }, 1.0, 1.0, 0), "num_customers"),
    ];

    for (config, field) in cases {
        let err = simulate(&config).unwrap_err();
        assert!(err.is_invalid_input(), "{field}: {err}");
        assert_eq!(err.invalid_fields(), vec![field]);
    }
}

/// Always returns the same uniform, so every duration is `ln 2 / rate`
struct ConstantProvider(f64);

impl RandomProvider for ConstantProvider {
    fn sample_uniform(&mut self, _site: DrawSite) -> f64 {
        self.0
    }
}

#[test]
fn injected_provider_drives_the_variates() {
    let config = SimulationConfig::new(QueueModel::Mm1, 1.0, 2.0, 10);
    let report = simulate_with_provider(&config, ConstantProvider(0.5)).unwrap();

    let gap = std::f64::consts::LN_2;
    let service = std::f64::consts::LN_2 / 2.0;

    for (i, record) in report.records.iter().enumerate() {
        assert!((record.arrival_time - gap * i as f64).abs() < 1e-9);
        assert!((record.service_time - service).abs() < 1e-12);
        assert_eq!(record.waiting_time(), Some(0.0));
    }
    assert!((report.metrics.w - service).abs() < 1e-12);
    assert_eq!(report.metrics.wq, 0.0);
    assert_eq!(report.seed, None);
}

#[test]
fn report_exports_to_json() {
    let config = SimulationConfig::new(QueueModel::Mm1k { capacity: 1 }, 1.0, 1.0, 4);
    let report = replay_durations(&config, &[0.0, 0.1, 0.1, 0.1], &[1.0; 4]).unwrap();

    let path = std::env::temp_dir().join(format!("mmq_report_{}.json", std::process::id()));
    report.export_json(&path, true).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(json["records"].as_array().unwrap().len(), 4);
    assert_eq!(json["metrics"]["blocked_count"], 2);
    assert_eq!(json["records"][2]["status"], "blocked");
    assert!(json["records"][2].get("service_begin").is_none());

    std::fs::remove_file(&path).ok();
}

#[test]
fn report_publishes_through_metrics_facade() {
    use mmq::metrics::{with_run_recorder, RecordedMetrics};
    use std::sync::{Arc, Mutex};

    let config = SimulationConfig::new(QueueModel::Mmck { servers: 1, capacity: 1 }, 1.0, 1.0, 4);
    let report = replay_durations(&config, &[0.0, 0.1, 0.1, 0.1], &[1.0; 4]).unwrap();

    let recorded = Arc::new(Mutex::new(RecordedMetrics::default()));
    with_run_recorder(&recorded, || report.publish_metrics());

    let recorded = recorded.lock().unwrap();
    let label = [("model", "MMCK")];
    assert_eq!(recorded.counter("mmq_customers_blocked_total", &label), Some(2));
    assert_eq!(recorded.gauge("mmq_blocking_probability", &label), Some(0.5));
}

/// Counts every uniform handed out, returning a fixed value
struct CountingProvider {
    calls: std::sync::Arc<std::sync::atomic::AtomicUsize>,
}

impl RandomProvider for CountingProvider {
    fn sample_uniform(&mut self, _site: DrawSite) -> f64 {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        0.5
    }
}

#[test]
fn invalid_configuration_draws_nothing() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let calls = Arc::new(AtomicUsize::new(0));
    let config = SimulationConfig::new(QueueModel::Mmck { servers: 2, capacity: 3 }, 1.0, 0.0, 100);

    let result = simulate_with_provider(&config, CountingProvider { calls: calls.clone() });
    match result {
        Err(SimError::InvalidConfiguration(errors)) => assert_eq!(errors.fields(), vec!["service_rate"]),
        other => panic!("expected InvalidConfiguration, got {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let valid = SimulationConfig::new(QueueModel::Mmck { servers: 2, capacity: 3 }, 1.0, 0.5, 100);
    simulate_with_provider(&valid, CountingProvider { calls: calls.clone() }).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 200);
}
