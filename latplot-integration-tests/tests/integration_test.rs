use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread::sleep;
use std::time::Duration;

use latplot::report::format_report;
use latplot::{run, AnalysisConfig};
use latplot_common::LatplotError;
use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn config_for(dir: &Path) -> AnalysisConfig {
    AnalysisConfig {
        data_dir: dir.to_path_buf(),
        output_path: dir.join("latency_analysis.png"),
        dpi: 40,
        ..AnalysisConfig::default()
    }
}

/// Write a recording in the layout the benchmark harness produces.
fn write_recording(dir: &Path, name: &str, samples: &[u64]) {
    let mut body = String::new();
    body.push_str("# Latency data (CPU cycles)\n");
    body.push_str("# Threads: 4, Logs per thread: 250\n");
    body.push_str(&format!("# Total samples: {}\n", samples.len()));
    body.push_str("# Format: each line contains one latency value\n\n");
    for s in samples {
        body.push_str(&format!("{s}\n"));
    }
    fs::write(dir.join(name), body).unwrap();
}

fn scratch() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

#[test]
fn test_default_config_uses_fixed_parameters() {
    let config = AnalysisConfig::default();
    assert_eq!(config.data_dir, Path::new("./data"));
    assert_eq!(config.file_pattern, "latency_*.txt");
    assert_eq!(config.output_path, Path::new("./data/latency_analysis.png"));
    assert_eq!(config.cpu_freq_ghz, 4.5);
    assert_eq!(config.dpi, 300);
}

#[test]
fn test_full_pipeline() {
    let dir = scratch();
    let samples: Vec<u64> = (1..=1_000).collect();
    write_recording(dir.path(), "latency_result.txt", &samples);

    let config = config_for(dir.path());
    let outcome = run(&config).expect("pipeline failed");

    assert_eq!(outcome.input_path, dir.path().join("latency_result.txt"));
    assert_eq!(outcome.output_path, config.output_path);
    assert_eq!(outcome.analysis.total(), 1_000);
    assert_eq!(outcome.analysis.summary.min, 1);
    assert_eq!(outcome.analysis.summary.max, 1_000);
    // P99 = 1 + 0.99 * 999 = 990.01, so 991..=1000 are dropped.
    assert_eq!(outcome.analysis.filtered.len(), 990);
    assert_eq!(outcome.analysis.filtered_summary.max, 990);

    let png = fs::read(&config.output_path).unwrap();
    assert_eq!(png[..8], PNG_MAGIC);
    // IHDR width and height: 16 x 6 inches at 40 DPI.
    assert_eq!(png[16..20], 640u32.to_be_bytes());
    assert_eq!(png[20..24], 240u32.to_be_bytes());

    let report = format_report(&outcome.input_path, &outcome.analysis, config.cpu_freq_ghz);
    assert!(report.contains("Total samples: 1,000"));
}

#[test]
fn test_newest_recording_wins() {
    let dir = scratch();
    write_recording(dir.path(), "latency_zzz.txt", &[1, 2, 3]);
    sleep(Duration::from_millis(50));
    write_recording(dir.path(), "latency_aaa.txt", &[100, 200, 300, 400]);

    let outcome = run(&config_for(dir.path())).unwrap();
    assert_eq!(outcome.input_path, dir.path().join("latency_aaa.txt"));
    assert_eq!(outcome.analysis.total(), 4);
}

#[test]
fn test_rerun_is_deterministic() {
    let dir = scratch();
    let samples: Vec<u64> = (0..2_000u64).map(|i| 300 + (i * 37) % 211).collect();
    write_recording(dir.path(), "latency_1.txt", &samples);

    let config = config_for(dir.path());
    let first = run(&config).unwrap();
    let second = run(&config).unwrap();
    assert_eq!(first.analysis, second.analysis);
}

#[test]
fn test_no_input_file() {
    let dir = scratch();
    let config = config_for(dir.path());

    let err = run(&config).unwrap_err();
    assert!(matches!(err, LatplotError::NoInputFile { .. }));
    assert!(!config.output_path.exists());
}

#[test]
fn test_comment_only_recording_is_empty() {
    let dir = scratch();
    write_recording(dir.path(), "latency_empty.txt", &[]);
    let config = config_for(dir.path());

    assert_eq!(run(&config).unwrap_err(), LatplotError::EmptySampleSet);
    assert!(!config.output_path.exists());
}

/// Collects formatted log lines in memory.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn test_saved_chart_is_not_logged() {
    let dir = scratch();
    write_recording(dir.path(), "latency_1.txt", &[10, 20, 30, 40]);
    let config = config_for(dir.path());

    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::with_default(subscriber, || run(&config).unwrap());

    let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(text.contains("loaded latency samples"));
    // The binary prints the saved-chart line on stdout; the library stays quiet about it.
    assert!(!text.to_lowercase().contains("saved chart"));
}
