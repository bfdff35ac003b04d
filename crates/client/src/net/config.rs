use std::time::Duration;

use crate::net::interpolation::DEFAULT_INTERPOLATION_DELAY_MS;

pub const DEFAULT_MOVE_SPEED: i32 = 4;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub input_rate: u32,
    pub interpolation_delay_ms: f64,
    pub speed: i32,
    pub duration_secs: Option<u64>,
    pub stats_interval_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: format!("ws://127.0.0.1:{}", lookout::DEFAULT_PORT),
            input_rate: lookout::DEFAULT_INPUT_RATE,
            interpolation_delay_ms: DEFAULT_INTERPOLATION_DELAY_MS,
            speed: DEFAULT_MOVE_SPEED,
            duration_secs: None,
            stats_interval_secs: Some(5),
        }
    }
}

impl ClientConfig {
    pub fn input_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.input_rate.max(1) as f64)
    }

    /// Negative delays snap to zero; a delay too large to represent falls back
    /// to the default.
    pub fn interpolation_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.interpolation_delay_ms.max(0.0) / 1000.0)
            .unwrap_or_else(|_| Duration::from_secs_f64(DEFAULT_INTERPOLATION_DELAY_MS / 1000.0))
    }

    pub fn stats_interval(&self) -> Option<Duration> {
        self.stats_interval_secs
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration_secs.map(Duration::from_secs)
    }
}

/// Parses `--interpolation-delay-ms`, rejecting values that are not finite and
/// non-negative.
pub fn parse_delay_ms(value: &str) -> Result<f64, String> {
    let ms: f64 = value
        .parse()
        .map_err(|e| format!("`{value}` is not a number: {e}"))?;
    if ms.is_finite() && ms >= 0.0 {
        Ok(ms)
    } else {
        Err(format!("`{value}` must be a finite, non-negative number of milliseconds"))
    }
}
