use std::time::Duration;

use anyhow::{bail, Result};

/// Suffix to milliseconds multiplier (`ms` must be tried before `s` and `m`)
const UNITS: &[(&str, f64)] = &[("ms", 1.0), ("s", 1_000.0), ("m", 60_000.0), ("h", 3_600_000.0)];

/// Shortest interval accepted; anything faster just burns CPU on `stat`.
pub const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Parse interval strings like "1s", "250ms", "1.5s", "2m".
pub fn parse_interval(s: &str) -> Result<Duration> {
    let s = s.trim();

    for (suffix, multiplier) in UNITS {
        if let Some(val_str) = s.strip_suffix(suffix) {
            let val: f64 = val_str.trim().parse()?;
            if !val.is_finite() || val < 0.0 {
                bail!("Interval must be a positive number: {}", s);
            }
            let interval = Duration::from_micros((val * multiplier * 1_000.0) as u64);
            if interval < MIN_INTERVAL {
                bail!("Interval {} is shorter than the {}ms minimum", s, MIN_INTERVAL.as_millis());
            }
            return Ok(interval);
        }
    }

    bail!("Unknown interval format: {} (expected e.g. \"1s\" or \"500ms\")", s)
}

/// Format an interval for display
pub fn format_interval(d: Duration) -> String {
    let millis = d.as_millis();
    if millis < 1_000 {
        format!("{}ms", millis)
    } else if millis % 1_000 == 0 {
        format!("{}s", d.as_secs())
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}
