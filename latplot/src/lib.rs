use std::path::PathBuf;

use latplot_common::Result;
use tracing::info;

pub mod config;
pub mod locator;
pub mod parser;
pub mod render;
pub mod report;
pub mod stats;

use stats::Analysis;

/// Every parameter of an analysis run. `Default` yields the fixed values in
/// [`config`]; tests build their own to point at scratch directories.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub data_dir: PathBuf,
    pub file_pattern: String,
    pub output_path: PathBuf,
    pub cpu_freq_ghz: f64,
    pub dpi: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(config::DATA_DIR),
            file_pattern: config::FILE_PATTERN.to_string(),
            output_path: PathBuf::from(config::OUTPUT_FILE),
            cpu_freq_ghz: config::CPU_FREQ_GHZ,
            dpi: config::DPI,
        }
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub input_path: PathBuf,
    pub analysis: Analysis,
    pub output_path: PathBuf,
}

/// Locate the newest latency file, load and analyse it, and write the chart.
///
/// Printing the report is left to the caller.
pub fn run(config: &AnalysisConfig) -> Result<RunOutcome> {
    let input_path = locator::find_latest(&config.data_dir, &config.file_pattern)?;
    info!(path = %input_path.display(), "reading latency samples");

    let samples = parser::load_samples(&input_path)?;
    info!(count = samples.len(), "loaded latency samples");

    let analysis = stats::analyze(&samples)?;
    info!(
        p99 = analysis.summary.percentiles.p99,
        kept = analysis.filtered.len(),
        "filtered samples above P99"
    );

    render::render(&config.output_path, &analysis, config.dpi)?;

    Ok(RunOutcome {
        input_path,
        analysis,
        output_path: config.output_path.clone(),
    })
}
