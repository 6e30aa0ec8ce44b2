//! Forecast cycle enumeration for the lookback window.
//!
//! Global models publish runs at fixed UTC hours ("cycles", typically
//! 00/06/12/18z). Discovering the latest available data means probing
//! candidate (date, cycle) pairs newest-first until one has objects.

use chrono::{DateTime, Duration, Timelike, Utc};

/// A single model run: a UTC date plus a cycle hour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastCycle {
    /// Date in YYYYMMDD form.
    pub date: String,
    /// Cycle hour (UTC), e.g. 0, 6, 12, 18.
    pub hour: u32,
}

impl ForecastCycle {
    pub fn new(date: impl Into<String>, hour: u32) -> Self {
        Self {
            date: date.into(),
            hour,
        }
    }
}

/// Enumerate candidate cycles most-recent first.
///
/// Walks backward `lookback_days` days from `now`. On the current day only
/// cycles that have already started are included; earlier days include every
/// configured cycle. Within a day, later cycles come first.
pub fn lookback_cycles(
    now: DateTime<Utc>,
    cycles: &[u32],
    lookback_days: u32,
) -> Vec<ForecastCycle> {
    let mut sorted: Vec<u32> = cycles.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));

    let mut result = Vec::new();
    for days_back in 0..lookback_days {
        let day = now - Duration::days(days_back as i64);
        let date = day.format("%Y%m%d").to_string();

        for &hour in &sorted {
            if days_back == 0 && hour > now.hour() {
                continue;
            }
            result.push(ForecastCycle::new(date.clone(), hour));
        }
    }

    result
}
