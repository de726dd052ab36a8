// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod asset;
pub mod calibration;
pub mod composite;
pub mod engine;
pub mod error;
pub mod lag;
pub mod metrics;
pub mod normalize;
pub mod repository;
pub mod shill;
pub mod signal;
pub mod taxonomy;
pub mod window;

// ---- Re-exports for stable public API ----
pub use crate::asset::{Asset, Category, CategoryMap, LifecycleStage};
pub use crate::calibration::Calibration;
pub use crate::composite::{blend, CompositeScore, WeightTables};
pub use crate::engine::{AssetReport, RunReport, TractionEngine};
pub use crate::error::ScoreError;
pub use crate::lag::{
    rank_by_lag, Cohort, InfluenceTier, LagRecord, PropagationLagDetector, TieredMentionEvent,
};
pub use crate::repository::{AssetAggregates, SignalRepository, SnapshotRepository};
pub use crate::shill::{shill_index, ShillIndexRecord, ShillThresholds, ShillTier};
pub use crate::signal::{CategoryInput, CategorySignal};
pub use crate::taxonomy::Taxonomy;
