//! Worker configuration, read once from the environment at startup.
//!
//! There is no persistent host-side config surface to round-trip (the
//! worker protocol carries positions, not settings), so configuration is
//! a handful of environment variables rather than a config file.

use std::time::Duration;

const DEFAULT_TT_MB: usize = 16;
const DEFAULT_MOVE_TIME_MS: u64 = 5_000;

/// Parsed worker startup configuration.
#[derive(Debug, Clone, Copy)]
pub struct WorkerConfig {
    pub tt_mb: usize,
    pub move_time: Duration,
}

impl WorkerConfig {
    /// Read `FARCHESS_TT_MB` (default 16) and `FARCHESS_MOVE_TIME_MS`
    /// (default 5000). `RUST_LOG` is not read here — it's left entirely to
    /// `tracing_subscriber::EnvFilter` at the binary's entry point.
    pub fn from_env() -> WorkerConfig {
        let tt_mb = std::env::var("FARCHESS_TT_MB")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&mb: &usize| mb > 0)
            .unwrap_or(DEFAULT_TT_MB);
        let move_time_ms = std::env::var("FARCHESS_MOVE_TIME_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&ms: &u64| ms > 0)
            .unwrap_or(DEFAULT_MOVE_TIME_MS);
        WorkerConfig { tt_mb, move_time: Duration::from_millis(move_time_ms) }
    }
}

impl Default for WorkerConfig {
    fn default() -> WorkerConfig {
        WorkerConfig { tt_mb: DEFAULT_TT_MB, move_time: Duration::from_millis(DEFAULT_MOVE_TIME_MS) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = WorkerConfig::default();
        assert_eq!(config.tt_mb, 16);
        assert_eq!(config.move_time, Duration::from_millis(5_000));
    }
}
