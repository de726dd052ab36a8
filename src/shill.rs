//! Shill Index: social chatter relative to real exchange liquidity.
//!
//! `ratio = mentions * ratio_scale / liquidity_usd`, i.e. mentions per million USD
//! of 24h liquidity with the default scale. Without liquidity there is nothing to
//! compare against and the ratio is `None`, which is a different state from a very
//! high ratio.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ensure_magnitude, Result, ScoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShillTier {
    Healthy,
    Caution,
    Hype,
}

impl ShillTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShillTier::Healthy => "healthy",
            ShillTier::Caution => "caution",
            ShillTier::Hype => "hype",
        }
    }
}

impl fmt::Display for ShillTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tier bounds. Both bounds are exclusive: a ratio equal to a bound stays in the
/// lower tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShillThresholds {
    pub caution_above: f64,
    pub hype_above: f64,
    /// Liquidity unit the ratio is expressed per (1e6 = per million USD).
    pub ratio_scale: f64,
}

impl Default for ShillThresholds {
    fn default() -> Self {
        Self {
            caution_above: 10.0,
            hype_above: 100.0,
            ratio_scale: 1_000_000.0,
        }
    }
}

impl ShillThresholds {
    pub fn validate(&self) -> Result<()> {
        let ok = self.caution_above.is_finite()
            && self.hype_above.is_finite()
            && self.caution_above >= 0.0
            && self.caution_above <= self.hype_above;
        if !ok {
            return Err(ScoreError::calibration(format!(
                "shill thresholds need 0 <= caution_above <= hype_above, got {} / {}",
                self.caution_above, self.hype_above
            )));
        }
        if !self.ratio_scale.is_finite() || self.ratio_scale <= 0.0 {
            return Err(ScoreError::calibration(format!(
                "shill ratio_scale must be > 0, got {}",
                self.ratio_scale
            )));
        }
        Ok(())
    }

    pub fn classify(&self, ratio: f64) -> ShillTier {
        if ratio > self.hype_above {
            ShillTier::Hype
        } else if ratio > self.caution_above {
            ShillTier::Caution
        } else {
            ShillTier::Healthy
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShillIndexRecord {
    pub mentions: u64,
    pub liquidity_usd: f64,
    pub ratio: Option<f64>,
    pub tier: Option<ShillTier>,
}

impl ShillIndexRecord {
    /// A measured ratio exists (liquidity was positive).
    pub fn is_measured(&self) -> bool {
        self.ratio.is_some()
    }
}

pub fn shill_index(
    mentions: u64,
    liquidity_usd: f64,
    thresholds: &ShillThresholds,
) -> Result<ShillIndexRecord> {
    let liquidity = ensure_magnitude("liquidity_usd", liquidity_usd)?;

    // Multiply before dividing so round inputs land exactly on the bounds.
    let ratio = (liquidity > 0.0).then(|| mentions as f64 * thresholds.ratio_scale / liquidity);

    Ok(ShillIndexRecord {
        mentions,
        liquidity_usd: liquidity,
        ratio,
        tier: ratio.map(|r| thresholds.classify(r)),
    })
}
