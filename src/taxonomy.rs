//! # Taxonomy
//!
//! Injected lookup data used around the scoring core:
//!
//! - narrative categories → keywords (e.g. "Restaking" → ["restaking", "lrt"]),
//! - tickers → sectors,
//! - aliases → tickers (e.g. "arbitrum" → "ARB").
//!
//! Loaded from JSON, with a built-in `default_seed()` used as fallback. Keyword and
//! alias matching is case-insensitive on whole words after normalizing punctuation
//! and dashes, so "Re-staking" does not match but "EigenLayer restaking" does.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::{collections::HashMap, fs, path::Path};

pub const ENV_TAXONOMY_PATH: &str = "TRACTION_TAXONOMY_PATH";
pub const DEFAULT_TAXONOMY_PATH: &str = "config/taxonomy.json";

static CASHTAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\$([a-z][a-z0-9]{1,9})\b").expect("cashtag regex"));

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Taxonomy {
    /// Narrative category → keywords.
    #[serde(default)]
    pub categories: HashMap<String, Vec<String>>,
    /// Ticker → sector.
    #[serde(default)]
    pub sectors: HashMap<String, String>,
    /// Alias (project name, spelling) → ticker.
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

impl Taxonomy {
    /// Load from a JSON file. Falls back to `default_seed()` on error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(s) => match serde_json::from_str::<Taxonomy>(&s) {
                Ok(t) => t.normalized(),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "taxonomy parse failed, using seed");
                    Self::default_seed()
                }
            },
            Err(_) => Self::default_seed(),
        }
    }

    /// `$TRACTION_TAXONOMY_PATH` or `config/taxonomy.json`.
    pub fn load_default() -> Self {
        let path = std::env::var(ENV_TAXONOMY_PATH)
            .unwrap_or_else(|_| DEFAULT_TAXONOMY_PATH.to_string());
        Self::load_from_file(path)
    }

    /// Canonicalize keys: keywords/aliases normalized, tickers uppercased.
    pub fn normalized(self) -> Self {
        let categories = self
            .categories
            .into_iter()
            .map(|(cat, kws)| {
                let mut kws: Vec<String> = kws
                    .iter()
                    .map(|k| normalize(k))
                    .filter(|k| !k.is_empty())
                    .collect();
                kws.sort();
                kws.dedup();
                (cat.trim().to_string(), kws)
            })
            .collect();
        let sectors = self
            .sectors
            .into_iter()
            .map(|(t, s)| (t.trim().to_ascii_uppercase(), s.trim().to_string()))
            .collect();
        let aliases = self
            .aliases
            .into_iter()
            .map(|(a, t)| (normalize(&a), t.trim().to_ascii_uppercase()))
            .collect();
        Self {
            categories,
            sectors,
            aliases,
        }
    }

    /// All categories with a keyword present in `text`, sorted by name.
    pub fn categories_for(&self, text: &str) -> Vec<&str> {
        let padded = padded(text);
        let mut out: Vec<&str> = self
            .categories
            .iter()
            .filter(|(_, kws)| kws.iter().any(|k| contains_word(&padded, k)))
            .map(|(c, _)| c.as_str())
            .collect();
        out.sort_unstable();
        out
    }

    /// Category of the longest matching keyword; ties go to the smaller name.
    pub fn primary_category(&self, text: &str) -> Option<&str> {
        let padded = padded(text);
        self.categories
            .iter()
            .filter_map(|(c, kws)| {
                kws.iter()
                    .filter(|k| contains_word(&padded, k))
                    .map(|k| k.len())
                    .max()
                    .map(|len| (c.as_str(), len))
            })
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(c, _)| c)
    }

    pub fn sector_for(&self, ticker: &str) -> Option<&str> {
        self.sectors
            .get(&ticker.trim().to_ascii_uppercase())
            .map(String::as_str)
    }

    /// Resolve the asset a topic is about.
    ///
    /// Order: `$CASHTAG` → alias phrase → bare ticker known to the sector map.
    pub fn asset_for_topic(&self, topic: &str) -> Option<String> {
        if let Some(caps) = CASHTAG.captures(topic) {
            return Some(caps[1].to_ascii_uppercase());
        }

        let padded = padded(topic);
        // Longest alias first so "arbitrum nova" beats "arbitrum".
        let mut aliases: Vec<(&String, &String)> = self.aliases.iter().collect();
        aliases.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));
        if let Some((_, ticker)) = aliases.into_iter().find(|(a, _)| contains_word(&padded, a)) {
            return Some(ticker.clone());
        }

        let mut known: Vec<&String> = self
            .sectors
            .keys()
            .filter(|t| contains_word(&padded, &t.to_ascii_lowercase()))
            .collect();
        known.sort();
        known.first().map(|t| (*t).clone())
    }

    /// Built-in seed with common crypto narratives, sectors and project aliases.
    pub fn default_seed() -> Self {
        let mut categories: HashMap<String, Vec<String>> = HashMap::new();
        for (cat, kws) in [
            ("AI", &["ai", "ai agent", "ai agents", "agentic", "llm"][..]),
            ("DeFi", &["defi", "dex", "lending", "yield", "perps", "liquidity pool"][..]),
            ("Layer 2", &["layer 2", "l2", "rollup", "zk rollup", "zkevm"][..]),
            ("Meme", &["meme", "memecoin", "memecoins"][..]),
            ("RWA", &["rwa", "real world assets", "tokenization", "tokenized treasuries"][..]),
            ("Gaming", &["gamefi", "gaming", "play to earn"][..]),
            ("Restaking", &["restaking", "lrt", "liquid restaking"][..]),
            ("Airdrop", &["airdrop", "points program", "tge", "claim"][..]),
        ] {
            categories.insert(cat.to_string(), kws.iter().map(|k| k.to_string()).collect());
        }

        let mut sectors = HashMap::new();
        for (t, s) in [
            ("BTC", "Store of Value"),
            ("ETH", "Smart Contract Platform"),
            ("SOL", "Smart Contract Platform"),
            ("ARB", "Layer 2"),
            ("OP", "Layer 2"),
            ("UNI", "DeFi"),
            ("AAVE", "DeFi"),
            ("FET", "AI"),
            ("TAO", "AI"),
            ("DOGE", "Meme"),
            ("PEPE", "Meme"),
            ("ONDO", "RWA"),
            ("EIGEN", "Restaking"),
        ] {
            sectors.insert(t.to_string(), s.to_string());
        }

        let mut aliases = HashMap::new();
        for (a, t) in [
            ("bitcoin", "BTC"),
            ("ethereum", "ETH"),
            ("ether", "ETH"),
            ("solana", "SOL"),
            ("arbitrum", "ARB"),
            ("optimism", "OP"),
            ("uniswap", "UNI"),
            ("bittensor", "TAO"),
            ("dogecoin", "DOGE"),
            ("ondo finance", "ONDO"),
            ("eigenlayer", "EIGEN"),
        ] {
            aliases.insert(a.to_string(), t.to_string());
        }

        Self {
            categories,
            sectors,
            aliases,
        }
        .normalized()
    }
}

/// Lowercase, replace punctuation/dashes with spaces, collapse whitespace.
fn normalize(s: &str) -> String {
    let lowered = s.trim().to_lowercase();
    let replaced: String = lowered
        .chars()
        .map(|ch| if ch.is_alphanumeric() { ch } else { ' ' })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn padded(text: &str) -> String {
    format!(" {} ", normalize(text))
}

/// Whole-word (or whole-phrase) containment in an already padded, normalized text.
fn contains_word(padded_text: &str, needle: &str) -> bool {
    !needle.is_empty() && padded_text.contains(&format!(" {needle} "))
}
