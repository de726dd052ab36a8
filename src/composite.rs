//! Composite traction score ("K-Score").
//!
//! Each lifecycle stage owns a weight table over the four categories. Blending
//! keeps only the categories that actually have a score and divides by the sum of
//! their weights, so an absent category is excluded and its share is spread
//! pro-rata over the rest instead of pulling the composite toward zero.

use serde::{Deserialize, Serialize};

use crate::asset::{Category, CategoryMap, LifecycleStage};
use crate::calibration::WEIGHT_SUM_EPSILON;
use crate::error::{Result, ScoreError};
use crate::normalize::to_score;

/// Category weights for one lifecycle stage. Sums to 1.0.
pub type WeightTable = CategoryMap<f64>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightTables {
    /// No market yet: messaging-heavy, no exchange weight.
    pub pre_launch: WeightTable,
    /// Judged primarily on realized liquidity.
    pub post_launch: WeightTable,
}

impl Default for WeightTables {
    fn default() -> Self {
        Self {
            pre_launch: CategoryMap::new(0.50, 0.30, 0.20, 0.00),
            post_launch: CategoryMap::new(0.25, 0.20, 0.15, 0.40),
        }
    }
}

impl WeightTables {
    pub fn for_stage(&self, stage: LifecycleStage) -> &WeightTable {
        match stage {
            LifecycleStage::PreLaunch => &self.pre_launch,
            LifecycleStage::PostLaunch => &self.post_launch,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for stage in [LifecycleStage::PreLaunch, LifecycleStage::PostLaunch] {
            let table = self.for_stage(stage);
            let mut sum = 0.0;
            for (c, &w) in table.iter() {
                if !w.is_finite() || w < 0.0 {
                    return Err(ScoreError::calibration(format!(
                        "{stage} weight for {c} must be finite and >= 0, got {w}"
                    )));
                }
                sum += w;
            }
            if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
                return Err(ScoreError::calibration(format!(
                    "{stage} weights must sum to 1.0, got {sum}"
                )));
            }
        }
        Ok(())
    }
}

/// Weight actually applied to a used category after renormalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectiveWeight {
    pub category: Category,
    pub score: u8,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub value: u8,
    pub stage: LifecycleStage,
    /// Used categories in `Category::ALL` order; weights sum to 1.0.
    pub weights: Vec<EffectiveWeight>,
}

impl CompositeScore {
    pub fn categories_used(&self) -> impl Iterator<Item = Category> + '_ {
        self.weights.iter().map(|w| w.category)
    }

    pub fn weight_of(&self, category: Category) -> Option<f64> {
        self.weights
            .iter()
            .find(|w| w.category == category)
            .map(|w| w.weight)
    }
}

/// Blend per-category scores with the stage's weight table.
///
/// Returns `None` when no category with a non-zero weight has a score: the asset
/// has no measurable composite, which is different from scoring zero.
pub fn blend(
    scores: &CategoryMap<Option<u8>>,
    stage: LifecycleStage,
    tables: &WeightTables,
) -> Option<CompositeScore> {
    let table = tables.for_stage(stage);

    let used: Vec<(Category, u8, f64)> = scores
        .iter()
        .filter_map(|(c, s)| s.map(|s| (c, s, table[c])))
        .filter(|&(_, _, w)| w > 0.0)
        .collect();

    let value = renormalized_mean(used.iter().map(|&(_, s, w)| (f64::from(s), w)))?;
    let total: f64 = used.iter().map(|&(_, _, w)| w).sum();

    Some(CompositeScore {
        value: to_score(value),
        stage,
        weights: used
            .into_iter()
            .map(|(category, score, w)| EffectiveWeight {
                category,
                score,
                weight: w / total,
            })
            .collect(),
    })
}

/// `Σ value·weight / Σ weight` over the given pairs; `None` if the weights sum to 0.
pub(crate) fn renormalized_mean(pairs: impl IntoIterator<Item = (f64, f64)>) -> Option<f64> {
    let (acc, total) = pairs
        .into_iter()
        .fold((0.0, 0.0), |(acc, total), (v, w)| (acc + v * w, total + w));
    if total > 0.0 {
        Some(acc / total)
    } else {
        None
    }
}
