// Shared test helpers for integration tests
#![allow(dead_code)]

use osu_runner::config::AppConfig;
use osu_runner::infra::LogLevel;
use osu_runner::models::BenchmarkCommand;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

pub const BW_OUTPUT: &str = "# OSU MPI Bandwidth Test v5.6.2
# Size      Bandwidth (MB/s)
1                       6.09
2                      15.37
4                      35.10
8                      55.43
";

pub const BIBW_OUTPUT: &str = "# OSU MPI Bi-Directional Bandwidth Test v5.6.2
# Size      Bandwidth (MB/s)
1                       9.12
2                      18.40
";

pub const LATENCY_OUTPUT: &str = "# OSU MPI Latency Test v5.6.2
# Size          Latency (us)
0                       1.21
1                       1.25
2                       1.26
";

/// Writes an executable shell script.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}")).expect("Failed to write script");
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

/// A stand-in for `mpirun`: records its arguments next to itself and then
/// executes its last argument.
#[cfg(unix)]
pub fn fake_launcher(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "fake-mpirun",
        r#"echo "$@" >> "$(dirname "$0")/launcher.log"
for last in "$@"; do :; done
exec "$last"
"#,
    )
}

/// A benchmark that prints `output` and succeeds.
#[cfg(unix)]
pub fn fake_benchmark(dir: &Path, name: &str, output: &str) -> PathBuf {
    write_script(dir, name, &format!("cat <<'EOF'\n{output}EOF\n"))
}

/// A benchmark that writes to stderr and exits non-zero.
#[cfg(unix)]
pub fn failing_benchmark(dir: &Path, name: &str) -> PathBuf {
    write_script(dir, name, "echo 'MPI_Init failed' >&2\nexit 3\n")
}

pub struct TestEnv {
    pub temp_dir: TempDir,
    pub config: AppConfig,
}

impl TestEnv {
    pub fn bin_dir(&self) -> PathBuf {
        self.temp_dir.path().join("bin")
    }

    pub fn launcher_log(&self) -> String {
        fs::read_to_string(self.bin_dir().join("launcher.log")).unwrap_or_default()
    }
}

/// A config whose every path lives inside a fresh temporary directory.
pub fn setup_test_environment() -> TestEnv {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let root = temp_dir.path();
    fs::create_dir_all(root.join("bin")).unwrap();
    fs::create_dir_all(root.join("results")).unwrap();

    let hostfile = root.join("hostfile");
    fs::write(&hostfile, "node-1 slots=1\nnode-2 slots=1\n").unwrap();

    let config = AppConfig {
        mpi_count: 2,
        hostfile,
        log_level: LogLevel::Trace,
        log_file: root.join("osu-test.log"),
        output_base: root.join("results"),
        launcher: "mpirun-that-does-not-exist-12345".to_string(),
        benchmarks: Vec::new(),
        mailbox_capacity: 16,
        host_name: "node-1".to_string(),
        region: "us-west-2".to_string(),
        metrics: osu_runner::config::MetricsConfig {
            dir: root.join("metrics"),
            file_prefix: "osu-metrics.".to_string(),
        },
    };

    TestEnv { temp_dir, config }
}

/// Installs the fake launcher and the three benchmarks into `env`'s config.
#[cfg(unix)]
pub fn install_fake_catalog(env: &mut TestEnv) {
    let bin = env.bin_dir();
    env.config.launcher = fake_launcher(&bin).to_string_lossy().into_owned();
    env.config.benchmarks = vec![
        BenchmarkCommand::new(fake_benchmark(&bin, "osu_latency", LATENCY_OUTPUT)),
        BenchmarkCommand::new(fake_benchmark(&bin, "osu_bw", BW_OUTPUT)),
        BenchmarkCommand::new(fake_benchmark(&bin, "osu_bibw", BIBW_OUTPUT)),
    ];
}

/// Creates `<base>/<timestamp>/<pid>/` holding the given result files.
pub fn create_result_dir(base: &Path, timestamp: &str, files: &[(&str, &str)]) -> PathBuf {
    let dir = base.join(timestamp).join("4821");
    fs::create_dir_all(&dir).unwrap();
    for (name, content) in files {
        fs::write(dir.join(name), content).unwrap();
    }
    dir
}
