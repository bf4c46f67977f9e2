//! Device and scheduler configuration
//!
//! Loaded once at startup from environment variables and immutable for
//! the process lifetime. Defaults match a 20x2 VFD220-style display.

use std::env;
use std::time::Duration;

/// Default serial port when `VFD_PORT` is not set
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

/// Candidate baud rates tried in order when `VFD_BAUD_RATES` is not set
pub const DEFAULT_BAUD_RATES: &[u32] = &[9600, 2400, 4800, 19200];

/// Default display width in characters
pub const DEFAULT_WIDTH: usize = 20;

/// Default display height in lines
pub const DEFAULT_HEIGHT: usize = 2;

/// Configuration of the physical display link
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Serial port identifier (e.g., "/dev/ttyUSB0" or "COM4")
    pub port: String,
    /// Candidate baud rates, tried in order during connect
    pub baud_rates: Vec<u32>,
    /// Display width in characters
    pub width: usize,
    /// Display height in lines
    pub height: usize,
    /// Power-on grace period after a successful open
    pub settle_delay: Duration,
    /// Pause between consecutive line writes
    pub write_delay: Duration,
    /// Pause between failed open attempts during the baud sweep
    pub retry_delay: Duration,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rates: DEFAULT_BAUD_RATES.to_vec(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            settle_delay: Duration::from_millis(1000),
            write_delay: Duration::from_millis(100),
            retry_delay: Duration::from_millis(1000),
        }
    }
}

impl DeviceConfig {
    /// Load configuration from `VFD_*` environment variables, falling
    /// back to defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = env::var("VFD_PORT").unwrap_or(defaults.port);

        let baud_rates = env::var("VFD_BAUD_RATES")
            .ok()
            .map(|s| parse_baud_list(&s))
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.baud_rates);

        let width = env_usize("VFD_WIDTH").unwrap_or(defaults.width);
        let height = env_usize("VFD_HEIGHT").unwrap_or(defaults.height);

        Self {
            port,
            baud_rates,
            width,
            height,
            ..defaults
        }
    }
}

/// Configuration of the display job scheduler
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Maximum time a rendered order occupies the display before its
    /// job completes (the device is not cleared when it elapses)
    pub dwell: Duration,
    /// How long to wait for a superseded job to observe cancellation
    /// before proceeding anyway
    pub cancel_wait: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            dwell: Duration::from_secs(10),
            cancel_wait: Duration::from_secs(2),
        }
    }
}

impl SchedulerConfig {
    /// Load scheduler settings from `VFD_DWELL_SECS`, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let dwell = env::var("VFD_DWELL_SECS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.dwell);
        Self { dwell, ..defaults }
    }
}

fn parse_baud_list(s: &str) -> Vec<u32> {
    s.split(',')
        .filter_map(|part| part.trim().parse::<u32>().ok())
        .collect()
}

fn env_usize(key: &str) -> Option<usize> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DeviceConfig::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.baud_rates, vec![9600, 2400, 4800, 19200]);
        assert_eq!(config.width, 20);
        assert_eq!(config.height, 2);
    }

    #[test]
    fn test_parse_baud_list() {
        assert_eq!(parse_baud_list("9600,2400"), vec![9600, 2400]);
        assert_eq!(parse_baud_list(" 9600 , 19200 "), vec![9600, 19200]);
        assert_eq!(parse_baud_list("garbage,9600"), vec![9600]);
        assert!(parse_baud_list("").is_empty());
    }

    #[test]
    fn test_scheduler_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.dwell, Duration::from_secs(10));
        assert_eq!(config.cancel_wait, Duration::from_secs(2));
    }
}
