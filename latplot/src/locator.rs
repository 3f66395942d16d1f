use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use glob::Pattern;
use latplot_common::{LatplotError, Result};
use tracing::debug;

/// Return the regular file in `dir` matching `pattern` with the latest
/// creation time.
///
/// Filesystems without birth times fall back to the modification time. On a
/// timestamp tie the lexically greatest path wins, so the result never depends
/// on directory iteration order.
pub fn find_latest(dir: &Path, pattern: &str) -> Result<PathBuf> {
    let escaped_dir = Pattern::escape(&dir.to_string_lossy());
    let full_pattern = Path::new(&escaped_dir).join(pattern);

    let entries = glob::glob(&full_pattern.to_string_lossy()).map_err(|e| {
        LatplotError::InvalidPattern { pattern: pattern.to_string(), reason: e.to_string() }
    })?;

    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                debug!(error = %e, "skipping unreadable match");
                continue;
            }
        };
        let meta = fs::metadata(&path).map_err(|e| LatplotError::io(&path, e))?;
        if !meta.is_file() {
            continue;
        }
        let created = creation_time(&meta).map_err(|e| LatplotError::io(&path, e))?;
        let newer = latest
            .as_ref()
            .map_or(true, |(ts, current)| (created, &path) > (*ts, current));
        if newer {
            latest = Some((created, path));
        }
    }

    latest.map(|(_, path)| path).ok_or_else(|| LatplotError::NoInputFile {
        dir: dir.to_path_buf(),
        pattern: pattern.to_string(),
    })
}

fn creation_time(meta: &Metadata) -> io::Result<SystemTime> {
    meta.created().or_else(|_| meta.modified())
}
