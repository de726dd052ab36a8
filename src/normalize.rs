//! Bounded 0–100 scores from raw magnitudes, trends and reach counts.
//!
//! - `normalize_log`: log-scale compression against a calibration ceiling
//!   (`ln(m + 1) / ln(ceiling)`), so assets spanning several orders of magnitude
//!   stay distinguishable.
//! - `trend_score`: percentage change centered at 50.
//! - `reach_score`: linear share of a saturation count of distinct sources.

use crate::error::{ensure_magnitude, Result, ScoreError};

/// Upper bound of every score.
pub const SCORE_MAX: u8 = 100;

/// Score for a flat trend.
pub const TREND_NEUTRAL: u8 = 50;

/// Log-scale score of `magnitude` where `ceiling_base` maps to ~100.
pub fn normalize_log(magnitude: f64, ceiling_base: f64) -> Result<u8> {
    let m = ensure_magnitude("magnitude", magnitude)?;
    if !ceiling_base.is_finite() || ceiling_base <= 1.0 {
        return Err(ScoreError::calibration(format!(
            "log ceiling must be finite and > 1, got {ceiling_base}"
        )));
    }
    if m == 0.0 {
        return Ok(0);
    }
    let raw = 100.0 * m.ln_1p() / ceiling_base.ln();
    Ok(to_score(raw))
}

/// Score a percentage change: 0% → 50, +50% → 100, -50% or worse → 0.
///
/// NaN is treated as "no comparison" and scores neutral.
pub fn trend_score(pct_change: f64) -> u8 {
    if pct_change.is_nan() {
        return TREND_NEUTRAL;
    }
    to_score(50.0 + pct_change)
}

/// Percentage change between two adjacent, equal-length windows.
/// An empty prior window yields 0 (neutral) instead of infinite growth.
pub fn pct_change(recent_sum: f64, prior_sum: f64) -> Result<f64> {
    let recent = ensure_magnitude("recent_window_sum", recent_sum)?;
    let prior = ensure_magnitude("prior_window_sum", prior_sum)?;
    if prior == 0.0 {
        return Ok(0.0);
    }
    Ok((recent - prior) / prior * 100.0)
}

/// Linear share of `saturation_count` distinct sources, capped at 100.
pub fn reach_score(distinct_source_count: u32, saturation_count: u32) -> Result<u8> {
    if saturation_count == 0 {
        return Err(ScoreError::calibration("reach saturation must be > 0"));
    }
    let raw = f64::from(distinct_source_count) / f64::from(saturation_count) * 100.0;
    Ok(to_score(raw))
}

/// Round and clamp into `[0, 100]`.
pub(crate) fn to_score(raw: f64) -> u8 {
    raw.clamp(0.0, f64::from(SCORE_MAX)).round() as u8
}
