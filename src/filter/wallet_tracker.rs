//! Wallet roster for smart-money scoring
//!
//! Holds the operator-curated whale and influencer wallets. Wallets are
//! keyed by address; re-adding an address replaces the previous entry in
//! place (last write wins, registration order kept).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::{InfluencerSeed, WhaleSeed, WalletsConfig};

/// Wallet role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletRole {
    Whale,
    Influencer,
}

/// A trade observed for a whale wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhaleTrade {
    pub token_address: String,
    pub is_buy: bool,
    pub volume_usd: f64,
    pub timestamp: DateTime<Utc>,
}

/// Role-specific wallet attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum WalletProfile {
    Whale {
        /// Rolling trade history, newest last
        recent_trades: Vec<WhaleTrade>,
        total_volume_usd: f64,
    },
    Influencer {
        followers: u64,
    },
}

/// A tracked wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedWallet {
    pub address: String,
    pub name: String,
    pub tags: Vec<String>,
    /// Historical success rate, 0.0 to 1.0
    pub success_rate: f64,
    pub added_at: DateTime<Utc>,
    pub profile: WalletProfile,
}

impl TrackedWallet {
    pub fn whale(address: &str, name: &str, tags: Vec<String>, success_rate: f64) -> Self {
        Self {
            address: address.to_string(),
            name: name.to_string(),
            tags,
            success_rate,
            added_at: Utc::now(),
            profile: WalletProfile::Whale {
                recent_trades: Vec::new(),
                total_volume_usd: 0.0,
            },
        }
    }

    pub fn influencer(
        address: &str,
        name: &str,
        followers: u64,
        tags: Vec<String>,
        success_rate: f64,
    ) -> Self {
        Self {
            address: address.to_string(),
            name: name.to_string(),
            tags,
            success_rate,
            added_at: Utc::now(),
            profile: WalletProfile::Influencer { followers },
        }
    }

    pub fn role(&self) -> WalletRole {
        match self.profile {
            WalletProfile::Whale { .. } => WalletRole::Whale,
            WalletProfile::Influencer { .. } => WalletRole::Influencer,
        }
    }

    /// Follower count (zero for whales)
    pub fn followers(&self) -> u64 {
        match self.profile {
            WalletProfile::Influencer { followers } => followers,
            WalletProfile::Whale { .. } => 0,
        }
    }
}

/// Aggregate roster statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RosterStats {
    pub whale_count: usize,
    pub whale_avg_success_rate: f64,
    pub influencer_count: usize,
    pub influencer_total_followers: u64,
    pub influencer_avg_success_rate: f64,
}

/// Explicitly owned store of tracked wallets
pub struct WalletTracker {
    wallets: RwLock<Vec<TrackedWallet>>,
    max_trade_history: usize,
}

impl WalletTracker {
    /// Create an empty tracker
    pub fn new(max_trade_history: usize) -> Self {
        Self {
            wallets: RwLock::new(Vec::new()),
            max_trade_history,
        }
    }

    /// Create a tracker seeded from config
    pub async fn from_config(config: &WalletsConfig) -> Self {
        let tracker = Self::new(config.max_trade_history);
        for seed in &config.whales {
            let WhaleSeed { address, name, tags, success_rate } = seed;
            tracker
                .add_wallet(TrackedWallet::whale(address, name, tags.clone(), *success_rate))
                .await;
        }
        for seed in &config.influencers {
            let InfluencerSeed { address, name, followers, tags, success_rate } = seed;
            tracker
                .add_wallet(TrackedWallet::influencer(
                    address,
                    name,
                    *followers,
                    tags.clone(),
                    *success_rate,
                ))
                .await;
        }

        info!("Wallet tracker initialized with {} wallets", tracker.wallet_count().await);
        tracker
    }

    /// Insert or replace a wallet. Returns false if the record is unusable.
    pub async fn add_wallet(&self, wallet: TrackedWallet) -> bool {
        if wallet.address.trim().is_empty() {
            warn!(name = %wallet.name, "Rejected wallet with empty address");
            return false;
        }
        if !(0.0..=1.0).contains(&wallet.success_rate) {
            warn!(
                address = %wallet.address,
                success_rate = wallet.success_rate,
                "Rejected wallet with success rate outside [0, 1]"
            );
            return false;
        }

        let mut wallets = self.wallets.write().await;
        match wallets.iter_mut().find(|w| w.address == wallet.address) {
            Some(existing) => {
                debug!(address = %wallet.address, "Replacing tracked wallet");
                *existing = wallet;
            }
            None => wallets.push(wallet),
        }
        true
    }

    /// Add a whale wallet to track
    pub async fn add_whale(&self, address: &str, name: &str, tags: Vec<String>) -> bool {
        let added = self
            .add_wallet(TrackedWallet::whale(address, name, tags, 0.0))
            .await;
        if added {
            info!("Added whale wallet: {} ({})", name, address);
        }
        added
    }

    /// Add an influencer wallet to track
    pub async fn add_influencer(
        &self,
        address: &str,
        name: &str,
        followers: u64,
        tags: Vec<String>,
    ) -> bool {
        let added = self
            .add_wallet(TrackedWallet::influencer(address, name, followers, tags, 0.0))
            .await;
        if added {
            info!("Added influencer wallet: {} ({}), {} followers", name, address, followers);
        }
        added
    }

    /// Append a trade to a whale's rolling history. Returns false if the
    /// address is not a tracked whale.
    pub async fn record_whale_trade(&self, address: &str, trade: WhaleTrade) -> bool {
        let mut wallets = self.wallets.write().await;
        let Some(wallet) = wallets.iter_mut().find(|w| w.address == address) else {
            return false;
        };
        match &mut wallet.profile {
            WalletProfile::Whale {
                recent_trades,
                total_volume_usd,
            } => {
                if trade.volume_usd.is_finite() {
                    *total_volume_usd += trade.volume_usd;
                }
                recent_trades.push(trade);
                if recent_trades.len() > self.max_trade_history {
                    let excess = recent_trades.len() - self.max_trade_history;
                    recent_trades.drain(..excess);
                }
                true
            }
            WalletProfile::Influencer { .. } => false,
        }
    }

    pub async fn get(&self, address: &str) -> Option<TrackedWallet> {
        let wallets = self.wallets.read().await;
        wallets.iter().find(|w| w.address == address).cloned()
    }

    /// Copy of all tracked wallets in registration order
    pub async fn snapshot(&self) -> Vec<TrackedWallet> {
        self.wallets.read().await.clone()
    }

    pub async fn wallet_count(&self) -> usize {
        self.wallets.read().await.len()
    }

    /// Roster statistics; averages over an empty group are 0
    pub async fn stats(&self) -> RosterStats {
        let wallets = self.wallets.read().await;
        let whales: Vec<_> = wallets.iter().filter(|w| w.role() == WalletRole::Whale).collect();
        let influencers: Vec<_> = wallets
            .iter()
            .filter(|w| w.role() == WalletRole::Influencer)
            .collect();

        RosterStats {
            whale_count: whales.len(),
            whale_avg_success_rate: average(whales.iter().map(|w| w.success_rate)),
            influencer_count: influencers.len(),
            influencer_total_followers: influencers.iter().map(|w| w.followers()).sum(),
            influencer_avg_success_rate: average(influencers.iter().map(|w| w.success_rate)),
        }
    }
}

fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(volume_usd: f64) -> WhaleTrade {
        WhaleTrade {
            token_address: "Mint111".to_string(),
            is_buy: true,
            volume_usd,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_add_is_last_write_wins() {
        let tracker = WalletTracker::new(10);
        assert!(tracker.add_whale("Addr1", "First Name", vec![]).await);
        assert!(tracker.add_influencer("Addr2", "Caller", 50_000, vec![]).await);
        assert!(tracker.add_whale("Addr1", "Second Name", vec!["AI trader".into()]).await);

        let wallets = tracker.snapshot().await;
        assert_eq!(wallets.len(), 2);
        assert_eq!(wallets[0].address, "Addr1");
        assert_eq!(wallets[0].name, "Second Name");
        assert_eq!(wallets[0].tags, vec!["AI trader".to_string()]);
        assert_eq!(wallets[0].success_rate, 0.0);
    }

    #[tokio::test]
    async fn test_readding_address_can_change_role() {
        let tracker = WalletTracker::new(10);
        tracker.add_whale("Addr1", "Whale", vec![]).await;
        tracker.add_influencer("Addr1", "Now Influencer", 1_000, vec![]).await;

        let wallet = tracker.get("Addr1").await.unwrap();
        assert_eq!(wallet.role(), WalletRole::Influencer);
        assert_eq!(tracker.wallet_count().await, 1);
    }

    #[tokio::test]
    async fn test_invalid_wallets_rejected() {
        let tracker = WalletTracker::new(10);
        assert!(!tracker.add_whale("  ", "Nobody", vec![]).await);
        assert!(
            !tracker
                .add_wallet(TrackedWallet::whale("Addr1", "Over", vec![], 1.5))
                .await
        );
        assert_eq!(tracker.wallet_count().await, 0);
    }

    #[tokio::test]
    async fn test_stats_empty_roster_is_zero() {
        let tracker = WalletTracker::new(10);
        assert_eq!(tracker.stats().await, RosterStats::default());
    }

    #[tokio::test]
    async fn test_stats() {
        let tracker = WalletTracker::new(10);
        tracker
            .add_wallet(TrackedWallet::whale("W1", "Whale 1", vec![], 0.8))
            .await;
        tracker
            .add_wallet(TrackedWallet::whale("W2", "Whale 2", vec![], 0.4))
            .await;
        tracker
            .add_wallet(TrackedWallet::influencer("K1", "KOL 1", 50_000, vec![], 0.9))
            .await;
        tracker.add_influencer("K2", "KOL 2", 25_000, vec![]).await;

        let stats = tracker.stats().await;
        assert_eq!(stats.whale_count, 2);
        assert!((stats.whale_avg_success_rate - 0.6).abs() < 1e-9);
        assert_eq!(stats.influencer_count, 2);
        assert_eq!(stats.influencer_total_followers, 75_000);
        assert!((stats.influencer_avg_success_rate - 0.45).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_whale_trade_history_is_bounded() {
        let tracker = WalletTracker::new(3);
        tracker.add_whale("W1", "Whale", vec![]).await;
        tracker.add_influencer("K1", "KOL", 10, vec![]).await;

        for i in 1..=5 {
            assert!(tracker.record_whale_trade("W1", trade(i as f64)).await);
        }
        assert!(!tracker.record_whale_trade("K1", trade(1.0)).await);
        assert!(!tracker.record_whale_trade("missing", trade(1.0)).await);

        match tracker.get("W1").await.unwrap().profile {
            WalletProfile::Whale {
                recent_trades,
                total_volume_usd,
            } => {
                let volumes: Vec<_> = recent_trades.iter().map(|t| t.volume_usd).collect();
                assert_eq!(volumes, vec![3.0, 4.0, 5.0]);
                assert_eq!(total_volume_usd, 15.0);
            }
            other => panic!("unexpected profile: {:?}", other),
        }
    }

    #[test]
    fn test_seeded_from_config() {
        let config = WalletsConfig::default();
        let tracker = tokio_test::block_on(WalletTracker::from_config(&config));
        let stats = tokio_test::block_on(tracker.stats());
        assert_eq!(stats.whale_count, config.whales.len());
        assert_eq!(stats.influencer_count, config.influencers.len());
    }
}
