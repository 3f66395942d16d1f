//! Descriptive statistics over latency samples.
//!
//! Percentiles use linear interpolation between order statistics with
//! `rank = p / 100 * (n - 1)`.

use latplot_common::{LatplotError, Result, PERCENTILES};

/// Upper bound on histogram bins regardless of sample count.
pub const MAX_HISTOGRAM_BINS: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct Percentiles {
    pub p50: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
    pub p999: f64,
}

impl Percentiles {
    /// `sorted` must be ascending and non-empty.
    pub fn from_sorted(sorted: &[u64]) -> Self {
        let [p50, p90, p95, p99, p999] = PERCENTILES.map(|p| percentile(sorted, p));
        Self { p50, p90, p95, p99, p999 }
    }
}

/// Statistics over the complete sample set.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub median: f64,
    pub percentiles: Percentiles,
}

/// Statistics over the samples at or below the unfiltered P99.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredSummary {
    pub count: usize,
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub median: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub summary: Summary,
    /// Samples `<= summary.percentiles.p99`, in their original order.
    pub filtered: Vec<u64>,
    pub filtered_summary: FilteredSummary,
}

impl Analysis {
    pub fn total(&self) -> usize {
        self.summary.count
    }

    /// Number of samples dropped as outliers.
    pub fn discarded(&self) -> usize {
        self.summary.count - self.filtered.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
    /// `count / (n * width)`; the bins' areas sum to 1.
    pub density: f64,
}

/// Interpolated percentile of an ascending slice. Returns 0.0 for an empty slice.
pub fn percentile(sorted: &[u64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let n = sorted.len();
    let rank = (p / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(n - 1);
    let fraction = rank - lower as f64;

    let lo = sorted[lower] as f64;
    let hi = sorted[upper] as f64;
    lo + fraction * (hi - lo)
}

/// Arithmetic mean. Returns 0.0 for an empty slice.
pub fn mean(samples: &[u64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: u128 = samples.iter().map(|&v| v as u128).sum();
    sum as f64 / samples.len() as f64
}

fn sorted_copy(samples: &[u64]) -> Vec<u64> {
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    sorted
}

pub fn summarize(samples: &[u64]) -> Result<Summary> {
    if samples.is_empty() {
        return Err(LatplotError::EmptySampleSet);
    }
    let sorted = sorted_copy(samples);
    Ok(Summary {
        count: sorted.len(),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        mean: mean(&sorted),
        median: percentile(&sorted, 50.0),
        percentiles: Percentiles::from_sorted(&sorted),
    })
}

fn summarize_filtered(filtered: &[u64]) -> Result<FilteredSummary> {
    if filtered.is_empty() {
        return Err(LatplotError::EmptySampleSet);
    }
    let sorted = sorted_copy(filtered);
    Ok(FilteredSummary {
        count: sorted.len(),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        mean: mean(&sorted),
        median: percentile(&sorted, 50.0),
    })
}

/// Summarise `samples`, drop everything above P99 and summarise the rest.
///
/// Fails with [`LatplotError::EmptySampleSet`] when `samples` is empty. The
/// filtered set always holds at least the minimum, since min <= P99.
pub fn analyze(samples: &[u64]) -> Result<Analysis> {
    let summary = summarize(samples)?;
    let cutoff = summary.percentiles.p99;
    let filtered: Vec<u64> = samples.iter().copied().filter(|&v| v as f64 <= cutoff).collect();
    let filtered_summary = summarize_filtered(&filtered)?;
    Ok(Analysis { summary, filtered, filtered_summary })
}

/// `min(200, floor(sqrt(n)))`, never less than one bin.
pub fn bin_count(n: usize) -> usize {
    ((n as f64).sqrt().floor() as usize).clamp(1, MAX_HISTOGRAM_BINS)
}

/// Equal-width, density-normalised histogram over `[min, max]`.
///
/// The last bin is closed on the right. A zero-width range is widened to
/// `[v - 0.5, v + 0.5]`.
pub fn density_histogram(samples: &[u64], bins: usize) -> Vec<HistogramBin> {
    let (Some(&min), Some(&max)) = (samples.iter().min(), samples.iter().max()) else {
        return Vec::new();
    };
    let bins = bins.max(1);
    let (mut lo, mut hi) = (min as f64, max as f64);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &v in samples {
        let idx = ((v as f64 - lo) / width).floor() as usize;
        counts[idx.min(bins - 1)] += 1;
    }

    let norm = samples.len() as f64 * width;
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: lo + i as f64 * width,
            end: lo + (i + 1) as f64 * width,
            count,
            density: count as f64 / norm,
        })
        .collect()
}

/// Points of the empirical CDF: each sorted value against `rank / n * 100`.
pub fn cdf_points(samples: &[u64]) -> Vec<(f64, f64)> {
    let sorted = sorted_copy(samples);
    let n = sorted.len() as f64;
    sorted
        .iter()
        .enumerate()
        .map(|(i, &v)| (v as f64, (i + 1) as f64 / n * 100.0))
        .collect()
}
