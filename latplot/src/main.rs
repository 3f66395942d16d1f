use clap::Parser;
use latplot::report::{format_filter_summary, format_report};
use latplot::{run, AnalysisConfig};
use std::process;
use tracing_subscriber::EnvFilter;

/// Every parameter is fixed in `latplot::config`; the only flags are
/// `--help` and `--version`.
#[derive(Parser)]
#[command(
    name = "latplot",
    version,
    about = "Summarise and plot the newest ./data/latency_*.txt recording"
)]
struct Args {}

fn main() {
    Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::new("latplot=info"))
        .init();

    let config = AnalysisConfig::default();
    let outcome = run(&config).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });

    println!("{}", format_filter_summary(&outcome.analysis));
    println!("Saved chart: {}", outcome.output_path.display());
    print!(
        "{}",
        format_report(&outcome.input_path, &outcome.analysis, config.cpu_freq_ghz)
    );
}
