//! Wallet interest scoring
//!
//! Blends whale and influencer participation in a token into a composite
//! score and a risk level.
//!
//! - Each active whale adds `success_rate * whale_points`.
//! - Each active influencer adds
//!   `success_rate * min(followers / follower_unit, max_influence_factor) * influencer_points`.
//! - `score = min(max_score, whale * whale_share + influencer * influencer_share)`.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::filter::smart_money::oracle::ActivityOracle;
use crate::filter::smart_money::risk::{RiskLevel, RiskThresholds};
use crate::filter::types::Candidate;
use crate::filter::wallet_tracker::{TrackedWallet, WalletProfile, WalletTracker};

/// Scoring constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestWeights {
    #[serde(default = "default_whale_points")]
    pub whale_points: f64,
    #[serde(default = "default_influencer_points")]
    pub influencer_points: f64,
    /// Followers per unit of influence
    #[serde(default = "default_follower_unit")]
    pub follower_unit: f64,
    #[serde(default = "default_max_influence_factor")]
    pub max_influence_factor: f64,
    #[serde(default = "default_whale_share")]
    pub whale_share: f64,
    #[serde(default = "default_influencer_share")]
    pub influencer_share: f64,
    #[serde(default = "default_max_score")]
    pub max_score: f64,
}

fn default_whale_points() -> f64 { 20.0 }
fn default_influencer_points() -> f64 { 10.0 }
fn default_follower_unit() -> f64 { 10_000.0 }
fn default_max_influence_factor() -> f64 { 10.0 }
fn default_whale_share() -> f64 { 0.6 }
fn default_influencer_share() -> f64 { 0.4 }
fn default_max_score() -> f64 { 100.0 }

impl Default for InterestWeights {
    fn default() -> Self {
        Self {
            whale_points: default_whale_points(),
            influencer_points: default_influencer_points(),
            follower_unit: default_follower_unit(),
            max_influence_factor: default_max_influence_factor(),
            whale_share: default_whale_share(),
            influencer_share: default_influencer_share(),
            max_score: default_max_score(),
        }
    }
}

impl InterestWeights {
    fn influence_factor(&self, followers: u64) -> f64 {
        if self.follower_unit <= 0.0 {
            return 0.0;
        }
        (followers as f64 / self.follower_unit).min(self.max_influence_factor)
    }
}

/// Wallet interest in one candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletInterest {
    /// Composite score, 0 to max_score
    pub score: f64,
    pub whale_score: f64,
    pub influencer_score: f64,
    pub active_whales: Vec<String>,
    pub active_influencers: Vec<String>,
    pub risk_level: RiskLevel,
}

impl WalletInterest {
    /// Result attached when scoring could not be performed
    pub fn degraded() -> Self {
        Self {
            score: 0.0,
            whale_score: 0.0,
            influencer_score: 0.0,
            active_whales: Vec::new(),
            active_influencers: Vec::new(),
            risk_level: RiskLevel::High,
        }
    }
}

/// Wallet interest scorer
pub struct WalletInterestScorer {
    tracker: Arc<WalletTracker>,
    oracle: Arc<dyn ActivityOracle>,
    weights: InterestWeights,
    risk: RiskThresholds,
    oracle_timeout: Duration,
}

impl WalletInterestScorer {
    pub fn new(
        tracker: Arc<WalletTracker>,
        oracle: Arc<dyn ActivityOracle>,
        weights: InterestWeights,
        risk: RiskThresholds,
        oracle_timeout: Duration,
    ) -> Self {
        Self {
            tracker,
            oracle,
            weights,
            risk,
            oracle_timeout,
        }
    }

    pub fn tracker(&self) -> &Arc<WalletTracker> {
        &self.tracker
    }

    /// Score a candidate. Never fails: any error yields [`WalletInterest::degraded`].
    ///
    /// Once `deadline` has passed no further oracle calls are made and the
    /// remaining wallets count as inactive.
    pub async fn score(&self, candidate: &Candidate, deadline: Option<Instant>) -> WalletInterest {
        match self.try_score(candidate, deadline).await {
            Ok(interest) => interest,
            Err(e) => {
                warn!(pair = %candidate.pair_address, error = %e, "Wallet analysis failed, using degraded result");
                WalletInterest::degraded()
            }
        }
    }

    async fn try_score(&self, candidate: &Candidate, deadline: Option<Instant>) -> Result<WalletInterest> {
        let token = candidate.base_token.address.trim();
        if token.is_empty() {
            return Err(Error::InvalidCandidate {
                pair: candidate.pair_address.clone(),
                reason: "missing base token address".to_string(),
            });
        }

        let wallets = self.tracker.snapshot().await;

        let mut whale_score = 0.0;
        let mut influencer_score = 0.0;
        let mut active_whales = Vec::new();
        let mut active_influencers = Vec::new();

        for wallet in &wallets {
            if !self.check_activity(wallet, token, deadline).await {
                continue;
            }
            match wallet.profile {
                WalletProfile::Whale { .. } => {
                    whale_score += wallet.success_rate * self.weights.whale_points;
                    active_whales.push(wallet.name.clone());
                }
                WalletProfile::Influencer { followers } => {
                    let factor = self.weights.influence_factor(followers);
                    influencer_score +=
                        wallet.success_rate * factor * self.weights.influencer_points;
                    active_influencers.push(wallet.name.clone());
                }
            }
        }

        let combined =
            whale_score * self.weights.whale_share + influencer_score * self.weights.influencer_share;
        let score = combined.min(self.weights.max_score);
        let risk_level = self
            .risk
            .assess(score, active_whales.len(), active_influencers.len());

        debug!(
            token = %token,
            score,
            whales = active_whales.len(),
            influencers = active_influencers.len(),
            risk = %risk_level,
            "Wallet analysis complete"
        );

        Ok(WalletInterest {
            score,
            whale_score,
            influencer_score,
            active_whales,
            active_influencers,
            risk_level,
        })
    }

    /// Ask the oracle, bounded by the per-call timeout and the batch deadline
    async fn check_activity(&self, wallet: &TrackedWallet, token: &str, deadline: Option<Instant>) -> bool {
        let mut budget = self.oracle_timeout;
        if let Some(deadline) = deadline {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                debug!(wallet = %wallet.address, "Batch deadline exceeded, skipping activity check");
                return false;
            }
            budget = budget.min(remaining);
        }

        match self.query_oracle(&wallet.address, token, budget).await {
            Ok(active) => active,
            Err(e) => {
                warn!(
                    oracle = self.oracle.name(),
                    wallet = %wallet.address,
                    error = %e,
                    "Activity check failed, treating as inactive"
                );
                false
            }
        }
    }

    async fn query_oracle(&self, wallet_address: &str, token: &str, budget: Duration) -> Result<bool> {
        tokio::time::timeout(budget, self.oracle.has_activity(wallet_address, token))
            .await
            .map_err(|_| Error::OracleTimeout(budget.as_millis() as u64))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::smart_money::oracle::{KnownActivityOracle, NoActivityOracle};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TOKEN: &str = "TokenMint111";

    struct FailingOracle;

    #[async_trait]
    impl ActivityOracle for FailingOracle {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn has_activity(&self, _wallet: &str, _token: &str) -> Result<bool> {
            Err(Error::Oracle("backend unavailable".into()))
        }
    }

    struct SlowOracle;

    #[async_trait]
    impl ActivityOracle for SlowOracle {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn has_activity(&self, _wallet: &str, _token: &str) -> Result<bool> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(true)
        }
    }

    #[derive(Default)]
    struct CountingOracle {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ActivityOracle for CountingOracle {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn has_activity(&self, _wallet: &str, _token: &str) -> Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }
    }

    fn candidate() -> Candidate {
        Candidate::new("Pair111", "Token", "TKN")
            .with_token_address(TOKEN)
            .with_metrics(50_000.0, 100_000.0, 1_000_000.0)
    }

    async fn roster(wallets: Vec<TrackedWallet>) -> Arc<WalletTracker> {
        let tracker = WalletTracker::new(10);
        for wallet in wallets {
            assert!(tracker.add_wallet(wallet).await);
        }
        Arc::new(tracker)
    }

    fn scorer(tracker: Arc<WalletTracker>, oracle: Arc<dyn ActivityOracle>) -> WalletInterestScorer {
        WalletInterestScorer::new(
            tracker,
            oracle,
            InterestWeights::default(),
            RiskThresholds::default(),
            Duration::from_millis(50),
        )
    }

    #[tokio::test]
    async fn test_empty_roster_scores_zero_high() {
        let scorer = scorer(roster(vec![]).await, Arc::new(KnownActivityOracle::new()));
        let result = scorer.score(&candidate(), None).await;
        assert_eq!(result, WalletInterest::degraded());
    }

    #[tokio::test]
    async fn test_no_activity_oracle_scores_zero_high() {
        let tracker = roster(vec![
            TrackedWallet::whale("W1", "Known Whale 1", vec![], 0.85),
            TrackedWallet::influencer("K1", "KOL 1", 50_000, vec![], 0.92),
        ])
        .await;
        let scorer = scorer(tracker, Arc::new(NoActivityOracle));

        let result = scorer.score(&candidate(), None).await;
        assert_eq!(result.score, 0.0);
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[tokio::test]
    async fn test_whale_and_influencer_contributions() {
        let tracker = roster(vec![
            TrackedWallet::whale("W1", "Known Whale 1", vec![], 0.85),
            TrackedWallet::whale("W2", "Quiet Whale", vec![], 0.9),
            TrackedWallet::influencer("K1", "KOL 1", 50_000, vec![], 0.92),
        ])
        .await;
        let oracle = Arc::new(KnownActivityOracle::new());
        oracle.record("W1", TOKEN);
        oracle.record("K1", TOKEN);
        oracle.record("W2", "SomeOtherToken");
        let scorer = scorer(tracker, oracle);

        let result = scorer.score(&candidate(), None).await;
        // 0.85 * 20
        assert!((result.whale_score - 17.0).abs() < 1e-9);
        // 0.92 * min(50000 / 10000, 10) * 10
        assert!((result.influencer_score - 46.0).abs() < 1e-9);
        // 17 * 0.6 + 46 * 0.4
        assert!((result.score - 28.6).abs() < 1e-9);
        assert_eq!(result.active_whales, vec!["Known Whale 1".to_string()]);
        assert_eq!(result.active_influencers, vec!["KOL 1".to_string()]);
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[tokio::test]
    async fn test_influence_factor_is_capped() {
        let tracker = roster(vec![TrackedWallet::influencer("K1", "Mega", 1_000_000, vec![], 0.5)]).await;
        let oracle = Arc::new(KnownActivityOracle::new());
        oracle.record("K1", TOKEN);
        let scorer = scorer(tracker, oracle);

        let result = scorer.score(&candidate(), None).await;
        // 0.5 * 10 * 10
        assert!((result.influencer_score - 50.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_score_is_capped_and_low_risk() {
        let wallets = (0..10)
            .map(|i| TrackedWallet::whale(&format!("W{}", i), &format!("Whale {}", i), vec![], 1.0))
            .collect();
        let tracker = roster(wallets).await;
        let oracle = Arc::new(KnownActivityOracle::new());
        for i in 0..10 {
            oracle.record(&format!("W{}", i), TOKEN);
        }
        let scorer = scorer(tracker, oracle);

        let result = scorer.score(&candidate(), None).await;
        assert!((result.whale_score - 200.0).abs() < 1e-9);
        assert_eq!(result.score, 100.0);
        assert_eq!(result.risk_level, RiskLevel::Low);
    }

    #[tokio::test]
    async fn test_failing_oracle_is_tolerated() {
        let tracker = roster(vec![
            TrackedWallet::whale("W1", "Whale", vec![], 1.0),
            TrackedWallet::influencer("K1", "KOL", 100_000, vec![], 1.0),
        ])
        .await;
        let scorer = scorer(tracker, Arc::new(FailingOracle));

        let result = scorer.score(&candidate(), None).await;
        assert_eq!(result.score, 0.0);
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[tokio::test]
    async fn test_slow_oracle_times_out() {
        let tracker = roster(vec![TrackedWallet::whale("W1", "Whale", vec![], 1.0)]).await;
        let scorer = scorer(tracker, Arc::new(SlowOracle));

        let started = std::time::Instant::now();
        let result = scorer.score(&candidate(), None).await;
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(result.score, 0.0);
        assert!(result.active_whales.is_empty());
    }

    #[tokio::test]
    async fn test_oracle_timeout_error() {
        let scorer = scorer(roster(vec![]).await, Arc::new(SlowOracle));

        let err = scorer
            .query_oracle("W1", TOKEN, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::OracleTimeout(20)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_expired_deadline_skips_oracle() {
        let tracker = roster(vec![
            TrackedWallet::whale("W1", "Whale", vec![], 1.0),
            TrackedWallet::whale("W2", "Whale 2", vec![], 1.0),
        ])
        .await;
        let oracle = Arc::new(CountingOracle::default());
        let scorer = scorer(tracker, oracle.clone());

        let result = scorer.score(&candidate(), Some(Instant::now())).await;
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
        assert_eq!(result.risk_level, RiskLevel::High);

        let deadline = Instant::now() + Duration::from_secs(10);
        let result = scorer.score(&candidate(), Some(deadline)).await;
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 2);
        assert_eq!(result.active_whales.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_token_address_degrades() {
        let tracker = roster(vec![TrackedWallet::whale("W1", "Whale", vec![], 1.0)]).await;
        let oracle = Arc::new(CountingOracle::default());
        let scorer = scorer(tracker, oracle.clone());

        let candidate = Candidate::new("Pair222", "Token", "TKN");
        let result = scorer.score(&candidate, None).await;
        assert_eq!(result, WalletInterest::degraded());
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
    }
}
