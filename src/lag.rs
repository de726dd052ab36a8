//! Propagation lag ("alpha leak") between elite and retail channels.
//!
//! Channels carry a fine influence tier (A+, A, B, C, D). For lag detection the
//! top two form the elite cohort and the bottom two the retail cohort; B is left
//! out. Per topic, the detector compares the first elite sighting with the first
//! retail sighting inside the lookback window and reports only forward
//! propagation: ties and retail-first topics produce nothing.

use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::calibration::LagSettings;
use crate::error::ScoreError;
use crate::metrics as m;
use crate::taxonomy::Taxonomy;

/// Channel influence tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InfluenceTier {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
}

/// Coarse grouping used by the lag detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cohort {
    Elite,
    Retail,
}

impl InfluenceTier {
    pub fn cohort(&self) -> Option<Cohort> {
        match self {
            InfluenceTier::APlus | InfluenceTier::A => Some(Cohort::Elite),
            InfluenceTier::B => None,
            InfluenceTier::C | InfluenceTier::D => Some(Cohort::Retail),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InfluenceTier::APlus => "A+",
            InfluenceTier::A => "A",
            InfluenceTier::B => "B",
            InfluenceTier::C => "C",
            InfluenceTier::D => "D",
        }
    }
}

impl fmt::Display for InfluenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InfluenceTier {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A+" | "APLUS" | "A_PLUS" => Ok(InfluenceTier::APlus),
            "A" => Ok(InfluenceTier::A),
            "B" => Ok(InfluenceTier::B),
            "C" => Ok(InfluenceTier::C),
            "D" => Ok(InfluenceTier::D),
            _ => Err(ScoreError::UnknownTier(s.to_string())),
        }
    }
}

/// One timestamp bucket of mentions of a topic by channels of one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieredMentionEvent {
    pub topic: String,
    pub tier: InfluenceTier,
    pub timestamp: DateTime<Utc>,
    pub mention_count: u64,
}

impl TieredMentionEvent {
    pub fn new(
        topic: impl Into<String>,
        tier: InfluenceTier,
        timestamp: DateTime<Utc>,
        mention_count: u64,
    ) -> Self {
        Self {
            topic: topic.into(),
            tier,
            timestamp,
            mention_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LagRecord {
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub elite_first_seen: DateTime<Utc>,
    pub retail_first_seen: DateTime<Utc>,
    /// Rounded to one decimal.
    pub lag_hours: f64,
    pub elite_mentions: u64,
    pub retail_mentions: u64,
}

#[derive(Debug, Default)]
struct CohortSeen {
    first: Option<DateTime<Utc>>,
    mentions: u64,
}

impl CohortSeen {
    fn add(&mut self, ts: DateTime<Utc>, count: u64) {
        self.first = Some(self.first.map_or(ts, |f| f.min(ts)));
        self.mentions = self.mentions.saturating_add(count);
    }
}

#[derive(Debug, Default)]
struct TopicCohorts {
    elite: CohortSeen,
    retail: CohortSeen,
}

#[derive(Debug, Clone)]
pub struct PropagationLagDetector {
    lookback: Duration,
    taxonomy: Option<Arc<Taxonomy>>,
}

impl PropagationLagDetector {
    pub fn new(lookback: Duration) -> Self {
        Self {
            lookback,
            taxonomy: None,
        }
    }

    pub fn from_settings(settings: &LagSettings) -> Self {
        Self::new(settings.lookback())
    }

    /// Attach a taxonomy so records carry the resolved asset and category.
    pub fn with_taxonomy(mut self, taxonomy: Arc<Taxonomy>) -> Self {
        self.taxonomy = Some(taxonomy);
        self
    }

    pub fn lookback(&self) -> Duration {
        self.lookback
    }

    /// Start of the lookback window ending at `now`, saturating at the earliest
    /// representable instant.
    pub fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.lookback)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Lag records for every topic with forward elite → retail propagation,
    /// in topic order. Events outside `[now - lookback, now]` are ignored.
    pub fn detect(&self, events: &[TieredMentionEvent], now: DateTime<Utc>) -> Vec<LagRecord> {
        let since = self.since(now);
        let mut topics: BTreeMap<&str, TopicCohorts> = BTreeMap::new();

        for ev in events {
            if ev.timestamp < since || ev.timestamp > now {
                continue;
            }
            let Some(cohort) = ev.tier.cohort() else {
                continue;
            };
            let entry = topics.entry(ev.topic.as_str()).or_default();
            match cohort {
                Cohort::Elite => entry.elite.add(ev.timestamp, ev.mention_count),
                Cohort::Retail => entry.retail.add(ev.timestamp, ev.mention_count),
            }
        }

        let seen = topics.len();
        let records: Vec<LagRecord> = topics
            .into_iter()
            .filter_map(|(topic, c)| self.record_for(topic, &c))
            .collect();

        let dropped = seen - records.len();
        counter!(m::LAG_RECORDS).increment(records.len() as u64);
        counter!(m::LAG_TOPICS_DROPPED).increment(dropped as u64);
        tracing::debug!(topics = seen, records = records.len(), dropped, "lag detection done");

        records
    }

    fn record_for(&self, topic: &str, c: &TopicCohorts) -> Option<LagRecord> {
        let elite = c.elite.first?;
        let retail = c.retail.first?;
        if retail <= elite {
            return None;
        }

        let (asset, category) = match &self.taxonomy {
            Some(t) => (
                t.asset_for_topic(topic),
                t.primary_category(topic).map(str::to_string),
            ),
            None => (None, None),
        };

        Some(LagRecord {
            topic: topic.to_string(),
            asset,
            category,
            elite_first_seen: elite,
            retail_first_seen: retail,
            lag_hours: lag_hours(retail - elite),
            elite_mentions: c.elite.mentions,
            retail_mentions: c.retail.mentions,
        })
    }
}

fn lag_hours(d: Duration) -> f64 {
    let hours = d.num_milliseconds() as f64 / 3_600_000.0;
    (hours * 10.0).round() / 10.0
}

/// Fastest propagation first; ties broken by topic.
pub fn rank_by_lag(records: &mut [LagRecord]) {
    records.sort_by(|a, b| {
        a.lag_hours
            .partial_cmp(&b.lag_hours)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.topic.cmp(&b.topic))
    });
}
