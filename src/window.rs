//! # Trend Windows
//! Splits a timestamped series into two adjacent, equal-length windows for the
//! trend percentage (default: trailing 7 days vs. the 7 days before).
//!
//! Recent window is `(now - w, now]`, prior window is `(now - 2w, now - w]`.
//! Samples after `now` or older than `2w` are ignored.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ensure_magnitude, Result, ScoreError};
use crate::normalize::{pct_change, trend_score};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindowSums {
    pub recent: f64,
    pub prior: f64,
}

impl WindowSums {
    pub fn new(recent: f64, prior: f64) -> Self {
        Self { recent, prior }
    }

    /// Sum `(timestamp, value)` samples into the two windows ending at `now`.
    pub fn from_samples(
        samples: &[(DateTime<Utc>, f64)],
        now: DateTime<Utc>,
        window: Duration,
    ) -> Result<Self> {
        let bounds = now
            .checked_sub_signed(window)
            .and_then(|r| r.checked_sub_signed(window).map(|p| (r, p)));
        let Some((recent_start, prior_start)) = bounds else {
            return Err(ScoreError::calibration(format!(
                "trend window of {} days reaches before the earliest timestamp",
                window.num_days()
            )));
        };

        let mut sums = Self::default();
        for &(ts, value) in samples {
            let v = ensure_magnitude("window_sample", value)?;
            if ts > now || ts <= prior_start {
                continue;
            }
            if ts > recent_start {
                sums.recent += v;
            } else {
                sums.prior += v;
            }
        }
        Ok(sums)
    }

    pub fn pct_change(&self) -> Result<f64> {
        pct_change(self.recent, self.prior)
    }

    pub fn trend_score(&self) -> Result<u8> {
        Ok(trend_score(self.pct_change()?))
    }
}
