use std::fmt::Write;
use std::path::Path;

use crate::stats::Analysis;

const RULE_WIDTH: usize = 70;

/// Convert a cycle count to nanoseconds at `freq_ghz` (cycles per ns).
pub fn cycles_to_ns(cycles: f64, freq_ghz: f64) -> f64 {
    cycles / freq_ghz
}

/// Format `n` with comma thousands separators, e.g. `1,234,567`.
pub fn format_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// How many samples the P99 cut removed.
pub fn format_filter_summary(analysis: &Analysis) -> String {
    let total = analysis.total();
    let discarded = analysis.discarded();
    let pct = discarded as f64 / total as f64 * 100.0;
    format!(
        "P99 cut-off: {:.0} cycles\nKept {} of {} samples\nDiscarded {} outliers ({:.2}%)",
        analysis.summary.percentiles.p99,
        format_thousands(analysis.filtered.len()),
        format_thousands(total),
        format_thousands(discarded),
        pct,
    )
}

fn stat_row(out: &mut String, label: &str, cycles: f64, precision: usize, freq_ghz: f64) {
    let _ = writeln!(
        out,
        "  {:<8}{:>10.*} cycles ({:>8.1} ns @ {}GHz)",
        format!("{label}:"),
        precision,
        cycles,
        cycles_to_ns(cycles, freq_ghz),
        freq_ghz,
    );
}

/// The statistics table printed at the end of a run.
///
/// Every value is computed over the unfiltered samples.
pub fn format_report(input: &Path, analysis: &Analysis, freq_ghz: f64) -> String {
    let s = &analysis.summary;
    let p = &s.percentiles;
    let rule = "=".repeat(RULE_WIDTH);

    let mut out = String::new();
    let _ = writeln!(out, "\n{rule}");
    let _ = writeln!(out, "LATENCY STATISTICS SUMMARY");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "\nData file: {}", input.display());
    let _ = writeln!(out, "Total samples: {}", format_thousands(s.count));
    let _ = writeln!(out, "\nLatency (CPU cycles):");

    stat_row(&mut out, "Min", s.min as f64, 0, freq_ghz);
    stat_row(&mut out, "Mean", s.mean, 1, freq_ghz);
    stat_row(&mut out, "Median", s.median, 0, freq_ghz);
    stat_row(&mut out, "P50", p.p50, 0, freq_ghz);
    stat_row(&mut out, "P90", p.p90, 0, freq_ghz);
    stat_row(&mut out, "P95", p.p95, 0, freq_ghz);
    stat_row(&mut out, "P99", p.p99, 0, freq_ghz);
    stat_row(&mut out, "P99.9", p.p999, 0, freq_ghz);
    stat_row(&mut out, "Max", s.max as f64, 0, freq_ghz);

    let _ = writeln!(out, "\n{rule}");
    out
}
