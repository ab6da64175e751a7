//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

// Re-export component configs
pub use crate::filter::momentum::{CategoryConfig, MomentumConfig};
pub use crate::filter::smart_money::{InterestWeights, RiskThresholds};
pub use crate::filter::token_filter::{StrategyConfig, StrategyProfile};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub momentum: MomentumConfig,
    #[serde(default)]
    pub strategies: StrategyConfig,
    #[serde(default)]
    pub wallets: WalletsConfig,
}

/// Market data retrieval settings
#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Only pairs on this chain are kept
    #[serde(default = "default_chain_id")]
    pub chain_id: String,
    #[serde(default = "default_search_terms")]
    pub search_terms: Vec<String>,
    /// Number of top-momentum categories that add a search term
    #[serde(default = "default_hot_meta_terms")]
    pub hot_meta_terms: usize,
    /// Candidates printed per profile
    #[serde(default = "default_results_per_profile")]
    pub results_per_profile: usize,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Pause between search requests
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    #[serde(default = "default_watch_interval_secs")]
    pub watch_interval_secs: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            chain_id: default_chain_id(),
            search_terms: default_search_terms(),
            hot_meta_terms: default_hot_meta_terms(),
            results_per_profile: default_results_per_profile(),
            request_timeout_ms: default_request_timeout_ms(),
            request_delay_ms: default_request_delay_ms(),
            watch_interval_secs: default_watch_interval_secs(),
        }
    }
}

/// Whale seeded from configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WhaleSeed {
    pub address: String,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub success_rate: f64,
}

/// Influencer seeded from configuration
#[derive(Debug, Clone, Deserialize)]
pub struct InfluencerSeed {
    pub address: String,
    pub name: String,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub success_rate: f64,
}

/// Smart money roster and scoring configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WalletsConfig {
    #[serde(default = "default_whales")]
    pub whales: Vec<WhaleSeed>,
    #[serde(default = "default_influencers")]
    pub influencers: Vec<InfluencerSeed>,
    /// Per activity-check timeout
    #[serde(default = "default_oracle_timeout_ms")]
    pub oracle_timeout_ms: u64,
    /// No activity checks are issued after this much time in one batch
    #[serde(default = "default_batch_deadline_ms")]
    pub batch_deadline_ms: u64,
    /// Whale trade history length
    #[serde(default = "default_max_trade_history")]
    pub max_trade_history: usize,
    #[serde(default)]
    pub weights: InterestWeights,
    #[serde(default)]
    pub risk: RiskThresholds,
}

impl Default for WalletsConfig {
    fn default() -> Self {
        Self {
            whales: default_whales(),
            influencers: default_influencers(),
            oracle_timeout_ms: default_oracle_timeout_ms(),
            batch_deadline_ms: default_batch_deadline_ms(),
            max_trade_history: default_max_trade_history(),
            weights: InterestWeights::default(),
            risk: RiskThresholds::default(),
        }
    }
}

// Default value functions
fn default_api_base_url() -> String {
    std::env::var("DEXSCREENER_API_URL").unwrap_or_else(|_| "https://api.dexscreener.com".into())
}

fn default_chain_id() -> String {
    "solana".to_string()
}

fn default_search_terms() -> Vec<String> {
    [
        "solana meme",
        "sol dog",
        "sol cat",
        "solana ai",
        "solana new",
        "raydium new",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_hot_meta_terms() -> usize {
    3
}

fn default_results_per_profile() -> usize {
    20
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_request_delay_ms() -> u64 {
    250
}

fn default_watch_interval_secs() -> u64 {
    300
}

fn default_whales() -> Vec<WhaleSeed> {
    vec![WhaleSeed {
        address: "HN4AkYD4N6f4KFYkxFemY6bz2B3qubGtK1r6H3ymYAFS".to_string(),
        name: "Known Whale 1".to_string(),
        tags: vec!["AI trader".to_string(), "Early adopter".to_string()],
        success_rate: 0.85,
    }]
}

fn default_influencers() -> Vec<InfluencerSeed> {
    vec![InfluencerSeed {
        address: "2MxyVwqWGbsB6RhQvfNQrfEKyDr9fLt2Z5FxQs5vRECF".to_string(),
        name: "KOL 1".to_string(),
        followers: 50_000,
        tags: vec!["Meme specialist".to_string(), "High influence".to_string()],
        success_rate: 0.92,
    }]
}

fn default_oracle_timeout_ms() -> u64 {
    2_000
}

fn default_batch_deadline_ms() -> u64 {
    30_000
}

fn default_max_trade_history() -> usize {
    100
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix MEMESCAN_)
            .add_source(
                config::Environment::with_prefix("MEMESCAN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.scanner.chain_id.trim().is_empty() {
            anyhow::bail!("scanner.chain_id must not be empty");
        }

        // Momentum
        if self.momentum.window_secs == 0 {
            anyhow::bail!("momentum.window_secs must be positive");
        }
        for (field, value) in [
            ("volume_weight", self.momentum.volume_weight),
            ("count_weight", self.momentum.count_weight),
            ("count_volume_unit", self.momentum.count_volume_unit),
        ] {
            if !value.is_finite() || value < 0.0 {
                anyhow::bail!("momentum.{} must be a non-negative number, got {}", field, value);
            }
        }

        let mut seen = HashSet::new();
        for category in &self.momentum.categories {
            if category.name.trim().is_empty() {
                anyhow::bail!("Category with empty name");
            }
            if !seen.insert(category.name.as_str()) {
                anyhow::bail!("Duplicate category: {}", category.name);
            }
            if !(0.0..=100.0).contains(&category.weight) {
                anyhow::bail!(
                    "Category {} weight must be between 0 and 100, got {}",
                    category.name,
                    category.weight
                );
            }
            if category.keywords.iter().all(|k| k.trim().is_empty()) {
                tracing::warn!("Category {} has no keywords and will never match", category.name);
            }
        }

        // Strategy profiles
        if self.strategies.scoring_concurrency == 0 {
            anyhow::bail!("strategies.scoring_concurrency must be positive");
        }
        let mut seen = HashSet::new();
        for profile in &self.strategies.profiles {
            if !seen.insert(profile.name.as_str()) {
                anyhow::bail!("Duplicate strategy profile: {}", profile.name);
            }
            if !profile.is_well_formed() {
                tracing::warn!(
                    "Strategy profile '{}' is malformed (check fdv range) and will match nothing",
                    profile.name
                );
            }
        }

        // Wallets
        if self.wallets.oracle_timeout_ms == 0 {
            anyhow::bail!("wallets.oracle_timeout_ms must be positive");
        }
        let seeds = self
            .wallets
            .whales
            .iter()
            .map(|w| (&w.address, w.success_rate))
            .chain(self.wallets.influencers.iter().map(|k| (&k.address, k.success_rate)));
        for (address, success_rate) in seeds {
            if address.trim().is_empty() {
                anyhow::bail!("Tracked wallet with empty address");
            }
            if !(0.0..=1.0).contains(&success_rate) {
                anyhow::bail!(
                    "Wallet {} success_rate must be between 0 and 1, got {}",
                    address,
                    success_rate
                );
            }
        }
        if self.wallets.whales.is_empty() && self.wallets.influencers.is_empty() {
            tracing::warn!("No tracked wallets configured - every candidate will score 0 / high risk");
        }

        Ok(())
    }

    /// Get masked configuration for display (hide secrets)
    pub fn masked_display(&self) -> String {
        let categories = self
            .momentum
            .categories
            .iter()
            .map(|c| format!("{} ({})", c.name, c.weight))
            .collect::<Vec<_>>()
            .join(", ");
        let profiles = self
            .strategies
            .profiles
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            r#"Configuration:
  Scanner:
    api: {}
    chain: {}
    search_terms: {:?}
    hot_meta_terms: {}
  Momentum:
    window: {}s
    weights: volume={} count={} count_unit={}
    categories: {}
  Strategies:
    profiles: {}
    scoring_concurrency: {}
  Wallets:
    whales: {}
    influencers: {}
    oracle_timeout: {}ms
    batch_deadline: {}ms
"#,
            mask_url(&self.scanner.api_base_url),
            self.scanner.chain_id,
            self.scanner.search_terms,
            self.scanner.hot_meta_terms,
            self.momentum.window_secs,
            self.momentum.volume_weight,
            self.momentum.count_weight,
            self.momentum.count_volume_unit,
            categories,
            profiles,
            self.strategies.scoring_concurrency,
            self.wallets.whales.len(),
            self.wallets.influencers.len(),
            self.wallets.oracle_timeout_ms,
            self.wallets.batch_deadline_ms,
        )
    }
}

/// Mask URL for display (hide API keys in query params)
fn mask_url(url: &str) -> String {
    if let Some(idx) = url.find('?') {
        format!("{}?***", &url[..idx])
    } else {
        url.to_string()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scanner: ScannerConfig::default(),
            momentum: MomentumConfig::default(),
            strategies: StrategyConfig::default(),
            wallets: WalletsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scanner.chain_id, "solana");
        assert_eq!(config.scanner.search_terms.len(), 6);
        assert_eq!(config.momentum.categories.len(), 4);
        assert_eq!(config.strategies.profiles.len(), 4);
        assert_eq!(config.wallets.whales.len(), 1);
        assert_eq!(config.wallets.influencers[0].followers, 50_000);
        assert_eq!(config.wallets.risk.low_min_score, 80.0);
        assert_eq!(config.wallets.weights.whale_points, 20.0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[scanner]
search_terms = ["sol frog"]

[momentum]
window_secs = 3600

[[momentum.categories]]
name = "Politics"
weight = 60
keywords = ["vote", "president"]

[[strategies.profiles]]
name = "tiny"
min_liquidity_usd = 1000
min_volume_24h = 1000
min_fdv = 1000
max_fdv = 50000

[[wallets.whales]]
address = "WhaleAddr111"
name = "Big Fish"
success_rate = 0.5
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.scanner.search_terms, vec!["sol frog".to_string()]);
        assert_eq!(config.momentum.window_secs, 3600);
        assert_eq!(config.momentum.volume_weight, 0.7);
        assert_eq!(config.momentum.categories.len(), 1);
        assert_eq!(config.momentum.categories[0].name, "Politics");
        assert_eq!(config.strategies.profiles.len(), 1);
        assert_eq!(config.strategies.profiles[0].max_price_change_24h, None);
        assert_eq!(config.strategies.scoring_concurrency, 8);
        assert_eq!(config.wallets.whales[0].name, "Big Fish");
        // Unspecified list keeps its default
        assert_eq!(config.wallets.influencers.len(), 1);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load("definitely-not-here.toml").unwrap();
        assert_eq!(config.strategies.profiles.len(), 4);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.momentum.categories[0].weight = 150.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.wallets.whales[0].success_rate = 1.2;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.momentum.window_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        let duplicate = config.strategies.profiles[0].clone();
        config.strategies.profiles.push(duplicate);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_profile_only_warns() {
        let mut config = Config::default();
        config.strategies.profiles[0].min_fdv = 10.0;
        config.strategies.profiles[0].max_fdv = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_mask_url() {
        assert_eq!(
            mask_url("https://api.example.com?key=secret"),
            "https://api.example.com?***"
        );
        assert_eq!(
            mask_url("https://api.example.com"),
            "https://api.example.com"
        );
    }
}
