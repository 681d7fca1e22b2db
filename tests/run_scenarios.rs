//! End-to-end runs against temporary files

use iotest::config::workload::{AccessPattern, Durability, OperationKind};
use iotest::engine::mock::MockEngine;
use iotest::output::log::LogFileSink;
use iotest::output::text::format_report_line;
use iotest::output::MemorySink;
use iotest::{BenchConfig, BenchError, Benchmark, StopReason};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

fn target(dir: &TempDir, len: usize) -> PathBuf {
    let path = dir.path().join("target.dat");
    let data: Vec<u8> = (0..len).map(|i| (i % 253) as u8).collect();
    std::fs::write(&path, data).unwrap();
    path
}

#[test]
fn sequential_read_visits_every_block_in_order() {
    let dir = TempDir::new().unwrap();
    let engine = MockEngine::new();
    let sink = MemorySink::new();
    let config = BenchConfig {
        target: target(&dir, 40960),
        block_size: 4096,
        io_count: 10,
        ..Default::default()
    };

    let recorder = engine.clone();
    let summary = Benchmark::new(config)
        .with_engine_factory(move |_| Box::new(recorder.clone()))
        .with_sinks(vec![Box::new(sink.clone())])
        .run()
        .unwrap();

    let expected: Vec<u64> = (0..10).map(|i| i * 4096).collect();
    assert_eq!(engine.offsets(), expected);
    assert_eq!(summary.operations, 10);
    assert_eq!(summary.reason, StopReason::Exhausted);

    let reports = sink.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].operations, 10);
}

#[test]
fn real_reads_through_pread() {
    let dir = TempDir::new().unwrap();
    let sink = MemorySink::new();
    let config = BenchConfig {
        target: target(&dir, 40960),
        block_size: 4096,
        io_count: 5,
        ..Default::default()
    };

    let summary = Benchmark::new(config)
        .with_sinks(vec![Box::new(sink.clone())])
        .run()
        .unwrap();

    assert_eq!(summary.operations, 5);
    assert_eq!(summary.bytes, 5 * 4096);

    let report = sink.reports()[0];
    assert_eq!(report.operations, 5);
    assert!(report.avg_response_usec > 0.0);
    assert!(
        (report.avg_response_usec - report.elapsed_usec as f64 / 5.0).abs() < 1e-6,
        "average response is interval wall time over operation count"
    );
}

#[test]
fn real_writes_stay_inside_target() {
    let dir = TempDir::new().unwrap();
    let path = target(&dir, 16384);
    let config = BenchConfig {
        target: path.clone(),
        block_size: 4096,
        io_count: 50,
        operation: OperationKind::Write,
        access: AccessPattern::Random,
        durability: Durability::Synchronous,
        workers: 2,
        ..Default::default()
    };

    let summary = Benchmark::new(config)
        .with_sinks(vec![Box::new(MemorySink::new())])
        .run()
        .unwrap();

    assert!(summary.operations >= 50);
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 16384);
}

#[test]
fn single_block_target_always_hits_offset_zero() {
    let dir = TempDir::new().unwrap();
    let engine = MockEngine::new();
    let config = BenchConfig {
        target: target(&dir, 4096),
        block_size: 4096,
        io_count: 8,
        access: AccessPattern::Random,
        ..Default::default()
    };

    let recorder = engine.clone();
    Benchmark::new(config)
        .with_engine_factory(move |_| Box::new(recorder.clone()))
        .with_sinks(vec![Box::new(MemorySink::new())])
        .run()
        .unwrap();

    assert_eq!(engine.offsets(), vec![0; 8]);
}

#[test]
fn target_smaller_than_one_block_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = BenchConfig {
        target: target(&dir, 1000),
        block_size: 4096,
        io_count: 1,
        ..Default::default()
    };

    let err = Benchmark::new(config)
        .with_sinks(vec![Box::new(MemorySink::new())])
        .run()
        .unwrap_err();
    assert!(matches!(err, BenchError::TargetTooSmall { .. }));
}

#[test]
fn missing_target_is_a_setup_error() {
    let config = BenchConfig {
        target: "/nonexistent/iotest/target.dat".into(),
        ..Default::default()
    };

    let err = Benchmark::new(config).run().unwrap_err();
    assert!(matches!(err, BenchError::TargetOpen { .. }));
}

#[test]
fn report_interval_emits_lines_during_run() {
    let dir = TempDir::new().unwrap();
    let engine = MockEngine::new();
    engine.set_latency(Duration::from_millis(1));
    let sink = MemorySink::new();
    let config = BenchConfig {
        target: target(&dir, 40960),
        duration_secs: Some(3),
        report_interval_secs: 1,
        ..Default::default()
    };

    let summary = Benchmark::new(config)
        .with_engine_factory(move |_| Box::new(engine.clone()))
        .with_sinks(vec![Box::new(sink.clone())])
        .run()
        .unwrap();

    assert_eq!(summary.reason, StopReason::Duration);
    let reports = sink.reports();
    assert!(reports.len() >= 2, "got {} reports", reports.len());
    assert!(reports[0].operations > 0);

    let reported: u64 = reports.iter().map(|r| r.operations).sum();
    assert!(reported <= summary.operations);
}

#[test]
fn log_file_receives_report_lines() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("iotest.log");
    let sink = MemorySink::new();
    let config = BenchConfig {
        target: target(&dir, 40960),
        io_count: 3,
        ..Default::default()
    };

    Benchmark::new(config)
        .with_sinks(vec![
            Box::new(sink.clone()),
            Box::new(LogFileSink::open(&log_path).unwrap()),
        ])
        .run()
        .unwrap();

    let log = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<_> = log.lines().collect();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0], format_report_line(&sink.reports()[0]));
}
