/// Directory scanned for recorded latency files.
pub const DATA_DIR: &str = "./data";

/// File name pattern of recorded latency files inside `DATA_DIR`.
pub const FILE_PATTERN: &str = "latency_*.txt";

/// Where the two-panel chart is written. Overwritten on every run.
pub const OUTPUT_FILE: &str = "./data/latency_analysis.png";

/// Assumed CPU clock used to turn cycle counts into nanoseconds (cycles per ns).
pub const CPU_FREQ_GHZ: f64 = 4.5;

/// Output image resolution.
pub const DPI: u32 = 300;
