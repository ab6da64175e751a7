//! Thematic Momentum Tracker
//!
//! Classifies candidates into thematic categories ("metas") by keyword and
//! ranks the categories by recent activity.
//!
//! Each category keeps a rolling window of observations. A category's
//! momentum is a blend of the volume and the number of observations still
//! inside the window, scaled by the category's base weight:
//!
//! ```text
//! momentum = (recent_volume * volume_weight
//!             + recent_count * count_volume_unit * count_weight) * (weight / 100)
//! ```
//!
//! `count_volume_unit` turns an observation count into a volume-scale number
//! so the two terms are commensurable. The defaults (0.7 / 0.3 / 100000) are
//! heuristics and are exposed as configuration.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::filter::types::Candidate;

/// A thematic category definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryConfig {
    /// Display name, e.g. "AI/Tech"
    pub name: String,
    /// Importance multiplier, 0-100
    pub weight: f64,
    /// Case-insensitive substrings matched against token name and symbol
    pub keywords: Vec<String>,
}

impl CategoryConfig {
    pub fn new(name: &str, weight: f64, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            weight,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Configuration for momentum tracking
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MomentumConfig {
    /// Rolling window length (seconds)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// Weight of the recent volume term
    #[serde(default = "default_volume_weight")]
    pub volume_weight: f64,
    /// Weight of the observation count term
    #[serde(default = "default_count_weight")]
    pub count_weight: f64,
    /// Volume-equivalent of a single observation
    #[serde(default = "default_count_volume_unit")]
    pub count_volume_unit: f64,
    /// Ordered category registry; order is the ranking tie-break
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryConfig>,
}

fn default_window_secs() -> u64 {
    24 * 60 * 60
}

fn default_volume_weight() -> f64 {
    0.7
}

fn default_count_weight() -> f64 {
    0.3
}

fn default_count_volume_unit() -> f64 {
    100_000.0
}

pub fn default_categories() -> Vec<CategoryConfig> {
    vec![
        CategoryConfig::new(
            "AI/Tech",
            100.0,
            &["ai", "gpt", "bot", "agent", "neural", "brain", "intelligence", "machine", "compute"],
        ),
        CategoryConfig::new(
            "Animals",
            85.0,
            &["cat", "dog", "hippo", "monkey", "frog", "bird", "animal", "zoo", "pet"],
        ),
        CategoryConfig::new(
            "Viral/Memes",
            80.0,
            &["meme", "viral", "tiktok", "trend", "internet", "social"],
        ),
        CategoryConfig::new(
            "Gaming",
            75.0,
            &["game", "play", "minecraft", "quest", "gaming", "player", "console"],
        ),
    ]
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            volume_weight: default_volume_weight(),
            count_weight: default_count_weight(),
            count_volume_unit: default_count_volume_unit(),
            categories: default_categories(),
        }
    }
}

/// One candidate sighting attributed to a category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub volume: f64,
    pub captured_at: DateTime<Utc>,
}

/// Mutable per-category state, guarded by its own lock
#[derive(Debug, Default)]
struct CategoryWindow {
    observations: Vec<Observation>,
    /// Running total of all volume ever attributed; advisory, never pruned
    volume_24h: f64,
}

impl CategoryWindow {
    fn prune(&mut self, now: DateTime<Utc>, window: Duration) {
        self.observations.retain(|o| now - o.captured_at < window);
    }
}

#[derive(Debug)]
struct TrackedCategory {
    config: CategoryConfig,
    keywords: Vec<String>,
    window: Mutex<CategoryWindow>,
}

impl TrackedCategory {
    fn new(config: CategoryConfig) -> Self {
        let keywords = config
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self {
            config,
            keywords,
            window: Mutex::new(CategoryWindow::default()),
        }
    }

    fn matches(&self, name: &str, symbol: &str) -> bool {
        self.keywords
            .iter()
            .any(|kw| name.contains(kw.as_str()) || symbol.contains(kw.as_str()))
    }
}

/// Ranking entry for one category
#[derive(Debug, Clone, Serialize)]
pub struct MetaMomentum {
    pub name: String,
    pub weight: f64,
    pub momentum: f64,
    /// Volume of observations still inside the window
    pub recent_volume: f64,
    /// Observations still inside the window
    pub recent_count: usize,
    /// Monotonic accumulator of all volume ever attributed
    pub total_volume: f64,
}

/// Thematic momentum tracker
pub struct MetaTracker {
    config: MomentumConfig,
    window: Duration,
    categories: Vec<TrackedCategory>,
    clock: Arc<dyn Clock>,
}

impl MetaTracker {
    pub fn new(config: MomentumConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: MomentumConfig, clock: Arc<dyn Clock>) -> Self {
        let window = i64::try_from(config.window_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        let categories = config
            .categories
            .iter()
            .cloned()
            .map(TrackedCategory::new)
            .collect();
        Self {
            config,
            window,
            categories,
            clock,
        }
    }

    /// Attribute a candidate to every category whose keywords it matches.
    ///
    /// Returns the number of categories matched. Non-finite volume is
    /// recorded as zero.
    pub async fn ingest(&self, candidate: &Candidate) -> usize {
        let name = candidate.base_token.name.to_lowercase();
        let symbol = candidate.base_token.symbol.to_lowercase();
        let volume = if candidate.volume_24h.is_finite() {
            candidate.volume_24h
        } else {
            warn!(pair = %candidate.pair_address, "Non-finite volume, counting as 0");
            0.0
        };

        let mut matched = 0;
        for category in &self.categories {
            if !category.matches(&name, &symbol) {
                continue;
            }
            let now = self.clock.now();
            let mut window = category.window.lock().await;
            window.volume_24h += volume;
            window.observations.push(Observation {
                volume,
                captured_at: now,
            });
            window.prune(now, self.window);
            matched += 1;

            debug!(
                meta = %category.config.name,
                token = %candidate.base_token.symbol,
                volume,
                observations = window.observations.len(),
                "Meta observation recorded"
            );
        }
        matched
    }

    /// Rank categories by momentum, highest first; equal momentum keeps registration order
    pub async fn rank(&self) -> Vec<MetaMomentum> {
        let now = self.clock.now();
        let mut ranking = Vec::with_capacity(self.categories.len());

        for category in &self.categories {
            let mut window = category.window.lock().await;
            window.prune(now, self.window);

            let recent_volume: f64 = window.observations.iter().map(|o| o.volume).sum();
            let recent_count = window.observations.len();
            ranking.push(MetaMomentum {
                name: category.config.name.clone(),
                weight: category.config.weight,
                momentum: self.momentum(recent_volume, recent_count, category.config.weight),
                recent_volume,
                recent_count,
                total_volume: window.volume_24h,
            });
        }

        ranking.sort_by(|a, b| {
            b.momentum
                .partial_cmp(&a.momentum)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranking
    }

    fn momentum(&self, recent_volume: f64, recent_count: usize, weight: f64) -> f64 {
        let count_term = recent_count as f64 * self.config.count_volume_unit;
        (recent_volume * self.config.volume_weight + count_term * self.config.count_weight)
            * (weight / 100.0)
    }

    /// Observations currently held for a category (pruned as of now)
    #[cfg(test)]
    async fn observations(&self, name: &str) -> Vec<Observation> {
        let now = self.clock.now();
        for category in &self.categories {
            if category.config.name == name {
                let mut window = category.window.lock().await;
                window.prune(now, self.window);
                return window.observations.clone();
            }
        }
        Vec::new()
    }
}

impl Default for MetaTracker {
    fn default() -> Self {
        Self::new(MomentumConfig::default())
    }
}
