use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use latplot_common::{LatplotError, Result};
use tracing::debug;

/// Read one latency sample per line from `reader`.
///
/// Blank lines and `#` comments are skipped. Lines that are not a base-10
/// unsigned integer are dropped without being reported.
pub fn parse_samples<R: BufRead>(reader: R) -> io::Result<Vec<u64>> {
    let mut samples = Vec::new();
    let mut malformed = 0usize;

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match trimmed.parse::<u64>() {
            Ok(value) => samples.push(value),
            Err(_) => malformed += 1,
        }
    }

    debug!(parsed = samples.len(), malformed, "parsed latency file");
    Ok(samples)
}

/// Load every sample from the file at `path` into memory.
pub fn load_samples(path: &Path) -> Result<Vec<u64>> {
    let file = File::open(path).map_err(|e| LatplotError::io(path, e))?;
    parse_samples(BufReader::new(file)).map_err(|e| LatplotError::io(path, e))
}
