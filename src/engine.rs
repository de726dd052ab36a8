//! # Traction Engine
//! Ties the pieces together for a run: fetch aggregates through a
//! `SignalRepository`, score every category, blend the composite for the asset's
//! lifecycle stage, compute the Shill Index and detect elite → retail lag.
//!
//! `score_asset` and `detect_lags` are pure; `run` is the only async entry point.
//! Each asset is fetched and scored in its own task; the report keeps input order.

use anyhow::Context;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

use crate::asset::{Asset, CategoryMap, LifecycleStage};
use crate::calibration::Calibration;
use crate::composite::{blend, CompositeScore};
use crate::error::Result;
use crate::lag::{rank_by_lag, LagRecord, PropagationLagDetector, TieredMentionEvent};
use crate::metrics::{self as m, ensure_metrics_described};
use crate::repository::{AssetAggregates, SignalRepository};
use crate::shill::{shill_index, ShillIndexRecord};
use crate::signal::{score_categories, scores_of, CategorySignal};
use crate::taxonomy::Taxonomy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetReport {
    pub ticker: String,
    pub stage: LifecycleStage,
    pub sector: Option<String>,
    pub signals: CategoryMap<CategorySignal>,
    /// `None` when no weighted category had a score.
    pub composite: Option<CompositeScore>,
    /// `None` when the repository had no mention count.
    pub shill: Option<ShillIndexRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub as_of: DateTime<Utc>,
    pub repository: String,
    pub assets: Vec<AssetReport>,
    /// Fastest propagation first.
    pub lags: Vec<LagRecord>,
}

#[derive(Debug, Clone)]
pub struct TractionEngine {
    calibration: Arc<Calibration>,
    taxonomy: Arc<Taxonomy>,
}

impl TractionEngine {
    /// Refuses an invalid calibration.
    pub fn new(calibration: Calibration, taxonomy: Taxonomy) -> Result<Self> {
        calibration.validate()?;
        ensure_metrics_described();
        Ok(Self {
            calibration: Arc::new(calibration),
            taxonomy: Arc::new(taxonomy),
        })
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn score_asset(&self, asset: &Asset, aggregates: &AssetAggregates) -> Result<AssetReport> {
        let cal = &*self.calibration;
        let signals = score_categories(&aggregates.categories, cal)?;
        let composite = blend(&scores_of(&signals), asset.stage, &cal.weights);

        let shill = match aggregates.mentions_24h {
            Some(mentions) => Some(shill_index(
                mentions,
                aggregates.liquidity_24h_usd.unwrap_or(0.0),
                &cal.shill,
            )?),
            None => None,
        };

        counter!(m::ASSETS_SCORED).increment(1);
        for (c, s) in signals.iter() {
            if s.is_absent() {
                counter!(m::CATEGORY_ABSENT, "category" => c.as_str()).increment(1);
            }
        }
        if composite.is_none() {
            counter!(m::COMPOSITE_ABSENT).increment(1);
        }
        if let Some(tier) = shill.as_ref().and_then(|s| s.tier) {
            counter!(m::SHILL_TIER, "tier" => tier.as_str()).increment(1);
        }

        tracing::debug!(
            ticker = %asset.ticker,
            stage = %asset.stage,
            composite = ?composite.as_ref().map(|c| c.value),
            shill_tier = ?shill.as_ref().and_then(|s| s.tier),
            "asset scored"
        );

        Ok(AssetReport {
            ticker: asset.ticker.clone(),
            stage: asset.stage,
            sector: self.taxonomy.sector_for(&asset.ticker).map(str::to_string),
            signals,
            composite,
            shill,
        })
    }

    fn lag_detector(&self) -> PropagationLagDetector {
        PropagationLagDetector::from_settings(&self.calibration.lag)
            .with_taxonomy(Arc::clone(&self.taxonomy))
    }

    /// Lag records for `events` inside the configured lookback, ranked.
    pub fn detect_lags(&self, events: &[TieredMentionEvent], now: DateTime<Utc>) -> Vec<LagRecord> {
        let mut records = self.lag_detector().detect(events, now);
        rank_by_lag(&mut records);
        records
    }

    /// Score `assets` and detect lag as of `now`.
    ///
    /// A failed fetch for one asset is logged and scored as all-absent; invalid
    /// data fails the run.
    pub async fn run(
        &self,
        repo: Arc<dyn SignalRepository>,
        assets: &[Asset],
        now: DateTime<Utc>,
    ) -> anyhow::Result<RunReport> {
        let started = Instant::now();

        let mut set = JoinSet::new();
        for (idx, asset) in assets.iter().cloned().enumerate() {
            let repo = Arc::clone(&repo);
            let engine = self.clone();
            set.spawn(async move {
                let aggregates = match repo.asset_aggregates(&asset).await {
                    Ok(a) => a,
                    Err(e) => {
                        counter!(m::REPOSITORY_ERRORS).increment(1);
                        tracing::warn!(
                            repository = repo.name(),
                            ticker = %asset.ticker,
                            error = ?e,
                            "aggregate fetch failed, scoring as absent"
                        );
                        AssetAggregates::default()
                    }
                };
                (idx, engine.score_asset(&asset, &aggregates).map_err(|e| (asset.ticker, e)))
            });
        }

        let mut scored = Vec::with_capacity(assets.len());
        while let Some(joined) = set.join_next().await {
            scored.push(joined.context("asset scoring task failed")?);
        }
        scored.sort_by_key(|(idx, _)| *idx);

        let mut reports = Vec::with_capacity(scored.len());
        for (_, result) in scored {
            let report = result
                .map_err(|(ticker, e)| anyhow::Error::new(e).context(format!("scoring {ticker}")))?;
            reports.push(report);
        }

        let since = self.lag_detector().since(now);
        let lags = match repo.tiered_mentions(since).await {
            Ok(events) => self.detect_lags(&events, now),
            Err(e) => {
                counter!(m::REPOSITORY_ERRORS).increment(1);
                tracing::warn!(repository = repo.name(), error = ?e, "mention fetch failed, no lag records");
                Vec::new()
            }
        };

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        histogram!(m::RUN_MS).record(elapsed_ms);
        tracing::info!(
            repository = repo.name(),
            assets = reports.len(),
            lags = lags.len(),
            elapsed_ms,
            "traction run complete"
        );

        Ok(RunReport {
            as_of: now,
            repository: repo.name().to_string(),
            assets: reports,
            lags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Category;
    use crate::shill::ShillTier;
    use crate::signal::CategoryInput;

    fn engine() -> TractionEngine {
        TractionEngine::new(Calibration::default(), Taxonomy::default_seed()).unwrap()
    }

    #[test]
    fn invalid_calibration_refused() {
        let mut cal = Calibration::default();
        cal.weights.pre_launch.messaging = 0.9;
        assert!(TractionEngine::new(cal, Taxonomy::default()).is_err());
    }

    #[test]
    fn post_launch_asset_report() {
        let e = engine();
        let asset = Asset::new("arb", LifecycleStage::PostLaunch);
        let agg = AssetAggregates {
            categories: CategoryMap::new(
                Some(CategoryInput::magnitude(100.0)),
                None,
                None,
                Some(CategoryInput::magnitude(10_000.0)),
            ),
            mentions_24h: Some(100),
            liquidity_24h_usd: Some(5_000_000.0),
        };
        let r = e.score_asset(&asset, &agg).unwrap();
        assert_eq!(r.sector.as_deref(), Some("Layer 2"));
        assert_eq!(r.signals.messaging.score, Some(50));
        assert_eq!(r.signals.exchange.score, Some(50));
        let c = r.composite.unwrap();
        assert_eq!(c.value, 50);
        assert_eq!(c.categories_used().collect::<Vec<_>>(), vec![Category::Messaging, Category::Exchange]);
        let s = r.shill.unwrap();
        assert_eq!(s.ratio, Some(20.0));
        assert_eq!(s.tier, Some(ShillTier::Caution));
    }

    #[test]
    fn pre_launch_exchange_only_has_no_composite() {
        let e = engine();
        let asset = Asset::new("NEWCO", LifecycleStage::PreLaunch);
        let agg = AssetAggregates {
            categories: CategoryMap::new(None, None, None, Some(CategoryInput::magnitude(1e6))),
            ..Default::default()
        };
        let r = e.score_asset(&asset, &agg).unwrap();
        assert!(r.composite.is_none());
        assert!(r.shill.is_none());
        assert_eq!(r.sector, None);
    }

    #[test]
    fn mentions_without_liquidity_have_null_ratio() {
        let e = engine();
        let asset = Asset::new("X", LifecycleStage::PreLaunch);
        let agg = AssetAggregates {
            mentions_24h: Some(500),
            ..Default::default()
        };
        let s = e.score_asset(&asset, &agg).unwrap().shill.unwrap();
        assert_eq!(s.ratio, None);
        assert_eq!(s.tier, None);
    }

    #[test]
    fn negative_magnitude_is_an_error() {
        let e = engine();
        let asset = Asset::new("X", LifecycleStage::PostLaunch);
        let agg = AssetAggregates {
            categories: CategoryMap::new(Some(CategoryInput::magnitude(-5.0)), None, None, None),
            ..Default::default()
        };
        assert!(e.score_asset(&asset, &agg).is_err());
    }
}
