// src/error.rs
//! Contract violations raised by the scoring core.
//!
//! Sparse data is never an error here: missing categories and undefined ratios are
//! `None`. These variants mean the caller (or the data-fetch layer) handed the core
//! something it must not, and scoring stops instead of coercing.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    #[error("invalid magnitude for {field}: {value}")]
    InvalidMagnitude { field: &'static str, value: f64 },

    #[error("invalid calibration: {0}")]
    InvalidCalibration(String),

    #[error("unknown lifecycle stage: {0:?}")]
    UnknownLifecycleStage(String),

    #[error("unknown influence tier: {0:?}")]
    UnknownTier(String),

    #[error("unknown signal category: {0:?}")]
    UnknownCategory(String),
}

impl ScoreError {
    pub(crate) fn calibration(msg: impl Into<String>) -> Self {
        ScoreError::InvalidCalibration(msg.into())
    }

    /// True for errors caused by the calibration rather than the scored data.
    pub fn is_calibration(&self) -> bool {
        matches!(self, ScoreError::InvalidCalibration(_))
    }
}

/// Reject negative, NaN and infinite magnitudes.
pub(crate) fn ensure_magnitude(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ScoreError::InvalidMagnitude { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magnitude_guard() {
        assert_eq!(ensure_magnitude("m", 0.0), Ok(0.0));
        assert!(ensure_magnitude("m", -0.5).is_err());
        assert!(ensure_magnitude("m", f64::NAN).is_err());
        assert!(ensure_magnitude("m", f64::INFINITY).is_err());
    }

    #[test]
    fn display_mentions_field() {
        let e = ensure_magnitude("liquidity_usd", -1.0).unwrap_err();
        assert_eq!(e.to_string(), "invalid magnitude for liquidity_usd: -1");
        assert!(!e.is_calibration());
    }
}
