// src/calibration.rs
//! Calibration constants as named, overridable parameters.
//!
//! Every constant that shapes a score lives here: log ceilings, reach saturation,
//! sub-score weights, the lifecycle weight tables, Shill Index tier bounds, the
//! lag lookback and the trend window. The defaults reproduce the production
//! values; none of them has a documented derivation, so treat them as tunables
//! rather than ground truth.
//!
//! TOML shape (every section optional, tables inside a section are complete):
//! ```toml
//! [ceilings]
//! messaging = 10000.0
//! search = 100000.0
//! video = 1000000.0
//! exchange = 100000000.0
//!
//! [weights.post_launch]
//! messaging = 0.25
//! search = 0.20
//! video = 0.15
//! exchange = 0.40
//!
//! [shill]
//! hype_above = 100.0
//!
//! [trend]
//! window_days = 7
//! ```

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::asset::{Category, CategoryMap};
use crate::composite::WeightTables;
use crate::error::{Result, ScoreError};
use crate::shill::ShillThresholds;

pub const ENV_CALIBRATION_PATH: &str = "TRACTION_CALIBRATION_PATH";
pub const DEFAULT_CALIBRATION_TOML: &str = "config/calibration.toml";
pub const DEFAULT_CALIBRATION_JSON: &str = "config/calibration.json";

/// Tolerance for "weights sum to 1.0".
pub const WEIGHT_SUM_EPSILON: f64 = 1e-6;

/// How volume, trend and reach sub-scores combine into one category score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubScoreWeights {
    pub volume: f64,
    pub trend: f64,
    pub reach: f64,
}

impl Default for SubScoreWeights {
    fn default() -> Self {
        Self {
            volume: 0.50,
            trend: 0.25,
            reach: 0.25,
        }
    }
}

/// Upper bound for the lag lookback (one year).
pub const MAX_LOOKBACK_HOURS: u32 = 24 * 366;
/// Upper bound for one trend window (one year).
pub const MAX_TREND_WINDOW_DAYS: u32 = 366;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LagSettings {
    /// Only mention events this recent take part in lag detection.
    pub lookback_hours: u32,
}

impl Default for LagSettings {
    fn default() -> Self {
        Self { lookback_hours: 48 }
    }
}

impl LagSettings {
    pub fn lookback(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.lookback_hours))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendSettings {
    /// Length of each of the two adjacent trend windows.
    pub window_days: u32,
}

impl Default for TrendSettings {
    fn default() -> Self {
        Self { window_days: 7 }
    }
}

impl TrendSettings {
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.window_days))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    /// Magnitude mapping to a score of ~100, per category.
    pub ceilings: CategoryMap<f64>,
    /// Distinct-source count mapping to a reach score of 100, per category.
    pub reach_saturation: CategoryMap<u32>,
    pub subscores: SubScoreWeights,
    pub weights: WeightTables,
    pub shill: ShillThresholds,
    pub lag: LagSettings,
    pub trend: TrendSettings,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            // 30d mentions, 30d search volume, 30d video views, 24h USD volume
            ceilings: CategoryMap::new(10_000.0, 100_000.0, 1_000_000.0, 100_000_000.0),
            reach_saturation: CategoryMap::new(50, 50, 50, 20),
            subscores: SubScoreWeights::default(),
            weights: WeightTables::default(),
            shill: ShillThresholds::default(),
            lag: LagSettings::default(),
            trend: TrendSettings::default(),
        }
    }
}

impl Calibration {
    pub fn ceiling(&self, category: Category) -> f64 {
        self.ceilings[category]
    }

    pub fn saturation(&self, category: Category) -> u32 {
        self.reach_saturation[category]
    }

    /// Check every constant; scoring with an invalid calibration is refused.
    pub fn validate(&self) -> Result<()> {
        for (c, &ceiling) in self.ceilings.iter() {
            if !ceiling.is_finite() || ceiling <= 1.0 {
                return Err(ScoreError::calibration(format!(
                    "ceiling for {c} must be finite and > 1, got {ceiling}"
                )));
            }
        }
        for (c, &sat) in self.reach_saturation.iter() {
            if sat == 0 {
                return Err(ScoreError::calibration(format!(
                    "reach saturation for {c} must be > 0"
                )));
            }
        }

        let s = &self.subscores;
        for (name, w) in [("volume", s.volume), ("trend", s.trend), ("reach", s.reach)] {
            if !w.is_finite() || w < 0.0 {
                return Err(ScoreError::calibration(format!(
                    "sub-score weight {name} must be finite and >= 0, got {w}"
                )));
            }
        }
        if s.volume <= 0.0 {
            return Err(ScoreError::calibration("sub-score weight volume must be > 0"));
        }

        self.weights.validate()?;
        self.shill.validate()?;

        let lookback = self.lag.lookback_hours;
        if lookback == 0 || lookback > MAX_LOOKBACK_HOURS {
            return Err(ScoreError::calibration(format!(
                "lag lookback must be within 1..={MAX_LOOKBACK_HOURS} hours, got {lookback}"
            )));
        }
        let window = self.trend.window_days;
        if window == 0 || window > MAX_TREND_WINDOW_DAYS {
            return Err(ScoreError::calibration(format!(
                "trend window must be within 1..={MAX_TREND_WINDOW_DAYS} days, got {window}"
            )));
        }
        Ok(())
    }

    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading calibration from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cal = parse_calibration(&content, ext.as_str())
            .with_context(|| format!("parsing calibration {}", path.display()))?;
        cal.validate()
            .with_context(|| format!("validating calibration {}", path.display()))?;
        Ok(cal)
    }

    /// Load using env var + fallbacks:
    /// 1) $TRACTION_CALIBRATION_PATH
    /// 2) config/calibration.toml
    /// 3) config/calibration.json
    /// 4) built-in defaults
    pub fn load_default() -> anyhow::Result<Self> {
        if let Ok(p) = std::env::var(ENV_CALIBRATION_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!(
                "{ENV_CALIBRATION_PATH} points to non-existent path {}",
                pb.display()
            ));
        }
        for candidate in [DEFAULT_CALIBRATION_TOML, DEFAULT_CALIBRATION_JSON] {
            let p = PathBuf::from(candidate);
            if p.exists() {
                return Self::load_from(&p);
            }
        }
        tracing::debug!("no calibration file found, using built-in defaults");
        Ok(Self::default())
    }
}

fn parse_calibration(s: &str, hint_ext: &str) -> anyhow::Result<Calibration> {
    let looks_json = s.trim_start().starts_with('{');
    if hint_ext == "json" || (hint_ext != "toml" && looks_json) {
        return serde_json::from_str(s).map_err(Into::into);
    }
    match toml::from_str::<Calibration>(s) {
        Ok(c) => Ok(c),
        Err(toml_err) if hint_ext != "toml" => {
            serde_json::from_str(s).map_err(|_| anyhow!("unsupported calibration format: {toml_err}"))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Calibration::default().validate().unwrap();
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let toml = r#"
            [shill]
            hype_above = 250.0

            [lag]
            lookback_hours = 24
        "#;
        let cal = parse_calibration(toml, "toml").unwrap();
        assert_eq!(cal.shill.hype_above, 250.0);
        assert_eq!(cal.shill.caution_above, 10.0);
        assert_eq!(cal.lag.lookback_hours, 24);
        assert_eq!(cal.trend.window_days, 7);
        assert_eq!(cal.ceiling(Category::Video), 1_000_000.0);
        cal.validate().unwrap();
    }

    #[test]
    fn json_is_sniffed_without_extension() {
        let json = r#"{"reach_saturation":{"messaging":10,"search":10,"video":10,"exchange":5}}"#;
        let cal = parse_calibration(json, "").unwrap();
        assert_eq!(cal.saturation(Category::Exchange), 5);
    }

    #[test]
    fn invalid_ceiling_rejected() {
        let mut cal = Calibration::default();
        cal.ceilings.search = 0.5;
        assert!(cal.validate().unwrap_err().is_calibration());
    }

    #[test]
    fn oversized_windows_rejected() {
        let mut cal = Calibration::default();
        cal.lag.lookback_hours = u32::MAX;
        assert!(cal.validate().unwrap_err().is_calibration());

        let mut cal = Calibration::default();
        cal.trend.window_days = u32::MAX;
        assert!(cal.validate().unwrap_err().is_calibration());

        let mut cal = Calibration::default();
        cal.lag.lookback_hours = MAX_LOOKBACK_HOURS;
        cal.trend.window_days = MAX_TREND_WINDOW_DAYS;
        cal.validate().unwrap();
    }

    #[test]
    fn zero_volume_subscore_rejected() {
        let mut cal = Calibration::default();
        cal.subscores.volume = 0.0;
        assert!(cal.validate().is_err());
    }
}
