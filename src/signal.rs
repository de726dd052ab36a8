// src/signal.rs
//! Per-category signals: raw inputs in, bounded sub-scores and one category score out.
//!
//! The category score blends three sub-scores with `SubScoreWeights`:
//! volume (log-normalized magnitude), trend and reach. Magnitude is mandatory; a
//! category without it is absent (`score == None`) even when trend or reach exist.
//! Missing trend/reach are dropped and the remaining weights renormalized, the same
//! way the composite treats missing categories.

use serde::{Deserialize, Serialize};

use crate::asset::{Category, CategoryMap};
use crate::calibration::Calibration;
use crate::composite::renormalized_mean;
use crate::error::{Result, ScoreError};
use crate::normalize::{normalize_log, reach_score, to_score, trend_score};

/// Raw aggregates for one category over the reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryInput {
    /// Mentions, search volume, views or USD volume depending on the category.
    #[serde(default)]
    pub magnitude: Option<f64>,
    /// Percentage change between the two trend windows.
    #[serde(default)]
    pub trend_pct: Option<f64>,
    /// Distinct channels / venues contributing to the magnitude.
    #[serde(default)]
    pub distinct_sources: Option<u32>,
}

impl CategoryInput {
    pub fn magnitude(m: f64) -> Self {
        Self {
            magnitude: Some(m),
            ..Default::default()
        }
    }

    pub fn with_trend(mut self, pct: f64) -> Self {
        self.trend_pct = Some(pct);
        self
    }

    pub fn with_sources(mut self, n: u32) -> Self {
        self.distinct_sources = Some(n);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySignal {
    pub category: Category,
    #[serde(flatten)]
    pub input: CategoryInput,
    pub volume_score: Option<u8>,
    pub trend_score: Option<u8>,
    pub reach_score: Option<u8>,
    /// `None` means absent: excluded from the composite.
    pub score: Option<u8>,
}

impl CategorySignal {
    pub fn absent(category: Category) -> Self {
        Self {
            category,
            input: CategoryInput::default(),
            volume_score: None,
            trend_score: None,
            reach_score: None,
            score: None,
        }
    }

    pub fn is_absent(&self) -> bool {
        self.score.is_none()
    }
}

/// Score one category. Invalid raw values (negative, NaN) are errors.
pub fn score_category(
    category: Category,
    input: &CategoryInput,
    cal: &Calibration,
) -> Result<CategorySignal> {
    let Some(magnitude) = input.magnitude else {
        return Ok(CategorySignal {
            input: *input,
            ..CategorySignal::absent(category)
        });
    };

    let volume = normalize_log(magnitude, cal.ceiling(category))?;
    let trend = match input.trend_pct {
        Some(p) if p.is_nan() => {
            return Err(ScoreError::InvalidMagnitude {
                field: "trend_pct",
                value: p,
            })
        }
        Some(p) => Some(trend_score(p)),
        None => None,
    };
    let reach = input
        .distinct_sources
        .map(|n| reach_score(n, cal.saturation(category)))
        .transpose()?;

    let w = &cal.subscores;
    let parts = [
        Some((volume, w.volume)),
        trend.map(|t| (t, w.trend)),
        reach.map(|r| (r, w.reach)),
    ];
    let score = renormalized_mean(parts.into_iter().flatten().map(|(s, w)| (f64::from(s), w)))
        .map(to_score);

    Ok(CategorySignal {
        category,
        input: *input,
        volume_score: Some(volume),
        trend_score: trend,
        reach_score: reach,
        score,
    })
}

/// Score all four categories; a missing input row means the category is absent.
pub fn score_categories(
    inputs: &CategoryMap<Option<CategoryInput>>,
    cal: &Calibration,
) -> Result<CategoryMap<CategorySignal>> {
    let mut out = CategoryMap::from_fn(CategorySignal::absent);
    for (c, input) in inputs.iter() {
        if let Some(input) = input {
            out[c] = score_category(c, input, cal)?;
        }
    }
    Ok(out)
}

/// Project signals to the score map the blender consumes.
pub fn scores_of(signals: &CategoryMap<CategorySignal>) -> CategoryMap<Option<u8>> {
    signals.map(|_, s| s.score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magnitude_only_uses_volume_score() {
        let cal = Calibration::default();
        let s = score_category(Category::Messaging, &CategoryInput::magnitude(100.0), &cal).unwrap();
        assert_eq!(s.volume_score, Some(50));
        assert_eq!(s.score, Some(50));
        assert_eq!(s.trend_score, None);
    }

    #[test]
    fn sub_scores_blend_with_weights() {
        let cal = Calibration::default();
        // volume 50, trend 100 (+60%), reach 50 (25 of 50)
        let input = CategoryInput::magnitude(100.0).with_trend(60.0).with_sources(25);
        let s = score_category(Category::Messaging, &input, &cal).unwrap();
        assert_eq!(s.trend_score, Some(100));
        assert_eq!(s.reach_score, Some(50));
        // 0.5*50 + 0.25*100 + 0.25*50 = 62.5 → 63
        assert_eq!(s.score, Some(63));
    }

    #[test]
    fn missing_magnitude_is_absent_even_with_trend() {
        let cal = Calibration::default();
        let input = CategoryInput {
            magnitude: None,
            trend_pct: Some(20.0),
            distinct_sources: Some(10),
        };
        let s = score_category(Category::Video, &input, &cal).unwrap();
        assert!(s.is_absent());
        assert_eq!(s.input.trend_pct, Some(20.0));
    }

    #[test]
    fn nan_trend_is_rejected() {
        let cal = Calibration::default();
        let input = CategoryInput::magnitude(10.0).with_trend(f64::NAN);
        assert!(score_category(Category::Search, &input, &cal).is_err());
    }

    #[test]
    fn score_map_marks_missing_rows_absent() {
        let cal = Calibration::default();
        let inputs = CategoryMap::new(Some(CategoryInput::magnitude(10_000.0)), None, None, None);
        let signals = score_categories(&inputs, &cal).unwrap();
        let scores = scores_of(&signals);
        assert_eq!(scores.messaging, Some(100));
        assert_eq!(scores.search, None);
        assert!(signals.exchange.is_absent());
    }
}
