//! # Pipeline Integration Tests / 流水线集成测试
//!
//! Runs the full pipeline against a fake MPI launcher and fake benchmark
//! programs written as shell scripts, and checks the result directory, the
//! JSON report and the metrics feed it leaves behind.
//!
//! 使用以 shell 脚本编写的假 MPI 启动器和假基准测试程序运行完整流水线，
//! 并检查生成的结果目录、JSON 报告和指标文件。

#![cfg(unix)]

mod common;

use common::{
    BIBW_OUTPUT, BW_OUTPUT, LATENCY_OUTPUT, failing_benchmark, fake_benchmark,
    install_fake_catalog, setup_test_environment,
};
use osu_runner::core::error::RunError;
use osu_runner::core::report::REPORT_FILE_NAME;
use osu_runner::infra::Logger;
use osu_runner::infra::command::{CapabilityProbe, ShellProbe};
use osu_runner::models::{BenchmarkCommand, BenchmarkOutcome};
use osu_runner::run_pipeline;
use std::fs;

/// Reports every program as present, whether it is or not.
struct AlwaysPresent;

impl CapabilityProbe for AlwaysPresent {
    async fn exists(&self, _name: &str) -> bool {
        true
    }
}

#[tokio::test]
async fn test_full_run_produces_results_report_and_metrics() {
    let mut env = setup_test_environment();
    install_fake_catalog(&mut env);

    let outcome = run_pipeline(&env.config, ShellProbe, Logger::disabled())
        .await
        .expect("pipeline should succeed");

    assert_eq!(outcome.summary.completed(), 3);
    assert_eq!(outcome.writer.written, 3);
    assert_eq!(outcome.writer.failed, 0);

    // <output_base>/<timestamp>/<pid>/
    let pid_dir = outcome.result_dir.file_name().unwrap().to_str().unwrap();
    assert_eq!(pid_dir, std::process::id().to_string());
    assert!(outcome.result_dir.starts_with(&env.config.output_base));

    let bw = fs::read_to_string(outcome.result_dir.join("osu_bw.txt")).unwrap();
    assert_eq!(bw, BW_OUTPUT);
    let latency = fs::read_to_string(outcome.result_dir.join("osu_latency.txt")).unwrap();
    assert_eq!(latency, LATENCY_OUTPUT);
    let bibw = fs::read_to_string(outcome.result_dir.join("osu_bibw.txt")).unwrap();
    assert_eq!(bibw, BIBW_OUTPUT);

    assert_eq!(outcome.report.latency.len(), 3);
    assert_eq!(outcome.report.bandwidth.len(), 4);
    assert_eq!(outcome.report.bi_bandwidth.len(), 2);
    let age = chrono::Utc::now() - outcome.report.timestamp;
    assert!(age.num_seconds().abs() < 300, "timestamp should come from this run");

    assert_eq!(outcome.report_path, Some(outcome.result_dir.join(REPORT_FILE_NAME)));
    let json = fs::read_to_string(outcome.result_dir.join(REPORT_FILE_NAME)).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["OsuBW"].as_array().unwrap().len(), 4);

    let metrics_files: Vec<_> = fs::read_dir(&env.config.metrics.dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(metrics_files.len(), 1);
    let name = metrics_files[0].file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("osu-metrics."));
    let metrics = fs::read_to_string(&metrics_files[0]).unwrap();
    assert!(metrics.contains("Host=node-1\n"));
    assert!(metrics.contains("Marketplace=us-west-2\n"));
    assert!(metrics.contains("node-1|1|UniDirBWinMB=6.090000,"));
}

#[tokio::test]
async fn test_launcher_receives_mpi_arguments() {
    let mut env = setup_test_environment();
    install_fake_catalog(&mut env);

    run_pipeline(&env.config, ShellProbe, Logger::disabled())
        .await
        .unwrap();

    let log = env.launcher_log();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 3, "one launch per benchmark: {log}");
    for line in &lines {
        assert!(line.starts_with("--allow-run-as-root --np 2 --hostfile "));
        assert!(line.contains(env.config.hostfile.to_str().unwrap()));
    }
    // Catalog order is preserved.
    assert!(lines[0].ends_with("osu_latency"));
    assert!(lines[1].ends_with("osu_bw"));
    assert!(lines[2].ends_with("osu_bibw"));
}

#[tokio::test]
async fn test_missing_and_failing_benchmarks_do_not_stop_the_run() {
    let mut env = setup_test_environment();
    install_fake_catalog(&mut env);
    let bin = env.bin_dir();
    env.config.benchmarks = vec![
        BenchmarkCommand::new(fake_benchmark(&bin, "osu_latency", LATENCY_OUTPUT)),
        BenchmarkCommand::new(bin.join("osu_absent_bw")), // never written
        BenchmarkCommand::new(failing_benchmark(&bin, "osu_bibw")),
    ];

    let outcome = run_pipeline(&env.config, ShellProbe, Logger::disabled())
        .await
        .expect("individual failures are not fatal");

    assert_eq!(outcome.summary.completed(), 1);
    assert_eq!(outcome.summary.skipped(), 1);
    assert_eq!(outcome.summary.failed(), 1);
    assert!(matches!(outcome.summary.outcomes[1].1, BenchmarkOutcome::Skipped));
    assert!(matches!(
        &outcome.summary.outcomes[2].1,
        BenchmarkOutcome::Failed { reason, .. } if reason.contains('3')
    ));

    // The missing benchmark was never launched.
    assert_eq!(env.launcher_log().lines().count(), 2);

    assert!(!bin.join("osu_absent_bw").exists());
    assert!(!outcome.result_dir.join("osu_absent_bw.txt").exists());
    assert!(!outcome.result_dir.join("osu_bibw.txt").exists());
    assert_eq!(outcome.report.latency.len(), 3);
    assert!(outcome.report.bandwidth.is_empty());
    assert!(outcome.report.bi_bandwidth.is_empty());
    assert!(outcome.result_dir.join(REPORT_FILE_NAME).exists());
}

#[tokio::test]
async fn test_missing_launcher_is_fatal_and_creates_nothing() {
    let mut env = setup_test_environment();
    install_fake_catalog(&mut env);
    env.config.launcher = "mpirun-that-does-not-exist-12345".to_string();

    let result = run_pipeline(&env.config, ShellProbe, Logger::disabled()).await;

    match result {
        Err(RunError::CommandNotFound(name)) => {
            assert_eq!(name, "mpirun-that-does-not-exist-12345")
        }
        other => panic!("expected CommandNotFound, got {other:?}"),
    }
    assert_eq!(fs::read_dir(&env.config.output_base).unwrap().count(), 0);
    assert!(!env.config.metrics.dir.exists());
}

#[tokio::test]
async fn test_benchmark_that_cannot_start_is_failed_not_skipped() {
    let mut env = setup_test_environment();
    install_fake_catalog(&mut env);
    // The probe claims the program exists; the launcher then fails to exec it.
    env.config.benchmarks = vec![BenchmarkCommand::new(env.bin_dir().join("osu_ghost_bw"))];

    let outcome = run_pipeline(&env.config, AlwaysPresent, Logger::disabled())
        .await
        .unwrap();

    assert_eq!(outcome.summary.failed(), 1);
    assert_eq!(outcome.writer.written, 0);
    assert!(outcome.report.bandwidth.is_empty());
}

#[tokio::test]
async fn test_small_mailbox_still_delivers_everything() {
    let mut env = setup_test_environment();
    install_fake_catalog(&mut env);
    env.config.mailbox_capacity = 1;

    let outcome = run_pipeline(&env.config, ShellProbe, Logger::disabled())
        .await
        .unwrap();

    assert_eq!(outcome.writer.written, 3);
    assert_eq!(outcome.report.series_len(osu_runner::models::BenchmarkKind::BiBandwidth), 2);
}
