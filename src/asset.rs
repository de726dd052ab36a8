// src/asset.rs
//! Assets, lifecycle stages and the four signal categories.
//!
//! `CategoryMap<T>` is the enum-indexed table used everywhere a value is kept per
//! category (weights, ceilings, raw inputs). Lookups go through an exhaustive
//! `match`, so adding a category is a compile-time change.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use crate::error::ScoreError;

/// Signal family feeding the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Messaging,
    Search,
    Video,
    Exchange,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Messaging,
        Category::Search,
        Category::Video,
        Category::Exchange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Messaging => "messaging",
            Category::Search => "search",
            Category::Video => "video",
            Category::Exchange => "exchange",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "messaging" | "telegram" | "social" => Ok(Category::Messaging),
            "search" => Ok(Category::Search),
            "video" | "youtube" => Ok(Category::Video),
            "exchange" | "cex" | "market" => Ok(Category::Exchange),
            _ => Err(ScoreError::UnknownCategory(s.to_string())),
        }
    }
}

/// Lifecycle boundary around the token generation event (TGE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleStage {
    #[serde(rename = "pre-launch", alias = "pre_launch")]
    PreLaunch,
    #[serde(rename = "post-launch", alias = "post_launch")]
    PostLaunch,
}

impl LifecycleStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStage::PreLaunch => "pre-launch",
            LifecycleStage::PostLaunch => "post-launch",
        }
    }
}

impl fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleStage {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "pre-launch" | "pre-tge" | "prelaunch" => Ok(LifecycleStage::PreLaunch),
            "post-launch" | "post-tge" | "postlaunch" => Ok(LifecycleStage::PostLaunch),
            _ => Err(ScoreError::UnknownLifecycleStage(s.to_string())),
        }
    }
}

/// Asset under scoring. Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub ticker: String,
    pub stage: LifecycleStage,
}

impl Asset {
    pub fn new(ticker: impl Into<String>, stage: LifecycleStage) -> Self {
        Self {
            ticker: ticker.into().trim().to_ascii_uppercase(),
            stage,
        }
    }

    /// Parse `stage` from its label; unknown labels are rejected.
    pub fn parse(ticker: impl Into<String>, stage: &str) -> Result<Self, ScoreError> {
        Ok(Self::new(ticker, stage.parse()?))
    }
}

/// One value per category.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryMap<T> {
    pub messaging: T,
    pub search: T,
    pub video: T,
    pub exchange: T,
}

impl<T> CategoryMap<T> {
    pub fn new(messaging: T, search: T, video: T, exchange: T) -> Self {
        Self {
            messaging,
            search,
            video,
            exchange,
        }
    }

    pub fn from_fn(mut f: impl FnMut(Category) -> T) -> Self {
        Self {
            messaging: f(Category::Messaging),
            search: f(Category::Search),
            video: f(Category::Video),
            exchange: f(Category::Exchange),
        }
    }

    pub fn get(&self, category: Category) -> &T {
        match category {
            Category::Messaging => &self.messaging,
            Category::Search => &self.search,
            Category::Video => &self.video,
            Category::Exchange => &self.exchange,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut T {
        match category {
            Category::Messaging => &mut self.messaging,
            Category::Search => &mut self.search,
            Category::Video => &mut self.video,
            Category::Exchange => &mut self.exchange,
        }
    }

    /// Iterate in the fixed `Category::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &T)> + '_ {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    pub fn map<U>(&self, mut f: impl FnMut(Category, &T) -> U) -> CategoryMap<U> {
        CategoryMap::from_fn(|c| f(c, self.get(c)))
    }
}

impl<T> Index<Category> for CategoryMap<T> {
    type Output = T;

    fn index(&self, category: Category) -> &T {
        self.get(category)
    }
}

impl<T> IndexMut<Category> for CategoryMap<T> {
    fn index_mut(&mut self, category: Category) -> &mut T {
        self.get_mut(category)
    }
}
