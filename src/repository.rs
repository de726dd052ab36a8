// src/repository.rs
//! Data access seam. The engine never talks to storage directly: it asks a
//! `SignalRepository` for typed aggregate rows per asset and for tiered mention
//! events, so a warehouse-backed implementation and the JSON snapshot used by the
//! binary and tests are interchangeable.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::asset::{Asset, Category, CategoryMap, LifecycleStage};
use crate::lag::TieredMentionEvent;
use crate::signal::CategoryInput;
use crate::window::WindowSums;

/// Aggregates for one asset over the reporting window.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssetAggregates {
    /// `None` rows are absent categories.
    pub categories: CategoryMap<Option<CategoryInput>>,
    /// Social mentions over the last 24h, for the Shill Index.
    pub mentions_24h: Option<u64>,
    /// Exchange liquidity over the last 24h in USD.
    pub liquidity_24h_usd: Option<f64>,
}

#[async_trait]
pub trait SignalRepository: Send + Sync {
    fn name(&self) -> &'static str;

    async fn asset_aggregates(&self, asset: &Asset) -> Result<AssetAggregates>;

    /// Tiered mention events at or after `since`.
    async fn tiered_mentions(&self, since: DateTime<Utc>) -> Result<Vec<TieredMentionEvent>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub ts: DateTime<Utc>,
    pub value: f64,
}

/// Category row as written in a snapshot file. Either `trend_pct` or raw
/// `trend_samples` can carry the trend; an explicit percentage wins.
#[derive(Debug, Clone, Default, Deserialize)]
struct SnapshotCategory {
    #[serde(flatten)]
    input: CategoryInput,
    #[serde(default)]
    trend_samples: Vec<Sample>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SnapshotAggregates {
    #[serde(default)]
    categories: BTreeMap<Category, SnapshotCategory>,
    #[serde(default)]
    mentions_24h: Option<u64>,
    #[serde(default)]
    liquidity_24h_usd: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct SnapshotAsset {
    ticker: String,
    stage: LifecycleStage,
    #[serde(default)]
    aggregates: SnapshotAggregates,
}

#[derive(Debug, Clone, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    as_of: Option<DateTime<Utc>>,
    #[serde(default)]
    assets: Vec<SnapshotAsset>,
    #[serde(default)]
    mentions: Vec<TieredMentionEvent>,
}

/// In-memory repository backed by a JSON snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotRepository {
    as_of: Option<DateTime<Utc>>,
    assets: Vec<Asset>,
    aggregates: HashMap<String, AssetAggregates>,
    mentions: Vec<TieredMentionEvent>,
}

impl SnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a snapshot. Trend samples are folded into `trend_pct` using
    /// `trend_window` ending at `as_of` (or now).
    pub fn from_json(s: &str, trend_window: Duration) -> Result<Self> {
        let file: SnapshotFile = serde_json::from_str(s).context("parsing snapshot json")?;
        let now = file.as_of.unwrap_or_else(Utc::now);

        let mut repo = Self {
            as_of: file.as_of,
            mentions: file.mentions,
            ..Self::default()
        };
        for row in file.assets {
            let asset = Asset::new(row.ticker, row.stage);
            let aggregates = fold_aggregates(row.aggregates, now, trend_window)
                .with_context(|| format!("snapshot aggregates for {}", asset.ticker))?;
            repo.insert(asset, aggregates);
        }
        Ok(repo)
    }

    pub fn load_from(path: &Path, trend_window: Duration) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading snapshot from {}", path.display()))?;
        Self::from_json(&content, trend_window)
            .with_context(|| format!("loading snapshot {}", path.display()))
    }

    /// Add or replace an asset row.
    pub fn insert(&mut self, asset: Asset, aggregates: AssetAggregates) {
        if !self.assets.iter().any(|a| a.ticker == asset.ticker) {
            self.assets.push(asset.clone());
        }
        self.aggregates.insert(asset.ticker, aggregates);
    }

    pub fn push_mention(&mut self, event: TieredMentionEvent) {
        self.mentions.push(event);
    }

    /// Snapshot timestamp, if the file carried one.
    pub fn as_of(&self) -> Option<DateTime<Utc>> {
        self.as_of
    }

    /// Assets in snapshot order.
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }
}

fn fold_aggregates(
    raw: SnapshotAggregates,
    now: DateTime<Utc>,
    window: Duration,
) -> crate::error::Result<AssetAggregates> {
    let mut categories: CategoryMap<Option<CategoryInput>> = CategoryMap::default();
    for (c, row) in raw.categories {
        let mut input = row.input;
        if input.trend_pct.is_none() && !row.trend_samples.is_empty() {
            let samples: Vec<(DateTime<Utc>, f64)> =
                row.trend_samples.iter().map(|s| (s.ts, s.value)).collect();
            input.trend_pct = Some(WindowSums::from_samples(&samples, now, window)?.pct_change()?);
        }
        categories[c] = Some(input);
    }
    Ok(AssetAggregates {
        categories,
        mentions_24h: raw.mentions_24h,
        liquidity_24h_usd: raw.liquidity_24h_usd,
    })
}

#[async_trait]
impl SignalRepository for SnapshotRepository {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    async fn asset_aggregates(&self, asset: &Asset) -> Result<AssetAggregates> {
        // Unknown assets have no rows: every category absent.
        Ok(self
            .aggregates
            .get(&asset.ticker)
            .cloned()
            .unwrap_or_default())
    }

    async fn tiered_mentions(&self, since: DateTime<Utc>) -> Result<Vec<TieredMentionEvent>> {
        Ok(self
            .mentions
            .iter()
            .filter(|e| e.timestamp >= since)
            .cloned()
            .collect())
    }
}
