//! Scan pipeline
//!
//! Sequences one scan cycle over a batch of raw candidates:
//! dedupe -> momentum ingestion -> per-profile filtering -> wallet scoring.
//! Profiles are independent views over the same deduplicated set.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::filter::momentum::{MetaMomentum, MetaTracker};
use crate::filter::smart_money::{ActivityOracle, WalletInterestScorer};
use crate::filter::token_filter::{StrategyProfile, TokenFilter};
use crate::filter::types::{AnnotatedCandidate, Candidate};
use crate::filter::wallet_tracker::{RosterStats, WalletTracker};

/// Ordered results of one strategy profile
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResult {
    pub profile: String,
    pub candidates: Vec<AnnotatedCandidate>,
}

/// Output of a single scan cycle
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub unique_candidates: usize,
    pub profiles: Vec<ProfileResult>,
}

impl ScanReport {
    pub fn profile(&self, name: &str) -> Option<&ProfileResult> {
        self.profiles.iter().find(|p| p.profile == name)
    }
}

/// Deduplicate by pair address. The last record for a pair wins but keeps
/// the position where the pair was first seen. Records without a pair
/// address have no identity and are dropped.
pub fn dedupe(raw: Vec<Candidate>) -> Vec<Candidate> {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(raw.len());
    let mut unique: Vec<Candidate> = Vec::with_capacity(raw.len());

    for candidate in raw {
        if candidate.pair_address.is_empty() {
            warn!(candidate = %candidate.label(), "Dropping candidate without pair address");
            continue;
        }
        match index.get(&candidate.pair_address) {
            Some(&slot) => unique[slot] = candidate,
            None => {
                index.insert(candidate.pair_address.clone(), unique.len());
                unique.push(candidate);
            }
        }
    }

    unique
}

/// Pipeline coordinator owning the tracker, filter and wallet scorer
pub struct ScanPipeline {
    tracker: MetaTracker,
    filter: TokenFilter,
    scorer: WalletInterestScorer,
    batch_deadline: Option<Duration>,
}

impl ScanPipeline {
    pub fn new(
        tracker: MetaTracker,
        filter: TokenFilter,
        scorer: WalletInterestScorer,
        batch_deadline: Option<Duration>,
    ) -> Self {
        Self {
            tracker,
            filter,
            scorer,
            batch_deadline,
        }
    }

    /// Build from configuration using the system clock
    pub async fn from_config(config: &Config, oracle: Arc<dyn ActivityOracle>) -> Self {
        Self::with_clock(config, oracle, Arc::new(SystemClock)).await
    }

    pub async fn with_clock(
        config: &Config,
        oracle: Arc<dyn ActivityOracle>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let wallets = Arc::new(WalletTracker::from_config(&config.wallets).await);
        let scorer = WalletInterestScorer::new(
            wallets,
            oracle,
            config.wallets.weights.clone(),
            config.wallets.risk.clone(),
            Duration::from_millis(config.wallets.oracle_timeout_ms),
        );
        let batch_deadline = match config.wallets.batch_deadline_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };

        Self::new(
            MetaTracker::with_clock(config.momentum.clone(), clock),
            TokenFilter::new(config.strategies.clone()),
            scorer,
            batch_deadline,
        )
    }

    /// Run one scan cycle
    pub async fn run(&self, raw: Vec<Candidate>) -> ScanReport {
        let received = raw.len();
        let unique = dedupe(raw);
        debug!(received, unique = unique.len(), "Deduplicated batch");

        let mut matched = 0;
        for candidate in &unique {
            matched += self.tracker.ingest(candidate).await;
        }
        debug!(matched, "Momentum ingestion complete");

        let deadline = self.batch_deadline.map(|d| Instant::now() + d);

        let mut profiles = Vec::with_capacity(self.filter.profiles().len());
        for profile in self.filter.profiles() {
            let candidates = self
                .filter
                .evaluate(&unique, profile, &self.scorer, deadline)
                .await;
            profiles.push(ProfileResult {
                profile: profile.name.clone(),
                candidates,
            });
        }

        info!(
            unique = unique.len(),
            profiles = profiles.len(),
            passed = profiles.iter().map(|p| p.candidates.len()).sum::<usize>(),
            "Scan cycle complete"
        );

        ScanReport {
            unique_candidates: unique.len(),
            profiles,
        }
    }

    /// Category momentum ranking
    pub async fn hot_metas(&self) -> Vec<MetaMomentum> {
        self.tracker.rank().await
    }

    /// Search terms for the top `n` categories by momentum. On a cold
    /// tracker this is the first `n` categories in registration order.
    pub async fn hot_search_terms(&self, n: usize, chain_id: &str) -> Vec<String> {
        self.tracker
            .rank()
            .await
            .into_iter()
            .take(n)
            .map(|m| format!("{} {}", chain_id, m.name.to_lowercase()))
            .collect()
    }

    pub fn profiles(&self) -> &[StrategyProfile] {
        self.filter.profiles()
    }

    pub fn wallets(&self) -> &Arc<WalletTracker> {
        self.scorer.tracker()
    }

    pub async fn add_whale(&self, address: &str, name: &str, tags: Vec<String>) -> bool {
        self.wallets().add_whale(address, name, tags).await
    }

    pub async fn add_influencer(
        &self,
        address: &str,
        name: &str,
        followers: u64,
        tags: Vec<String>,
    ) -> bool {
        self.wallets()
            .add_influencer(address, name, followers, tags)
            .await
    }

    pub async fn roster_stats(&self) -> RosterStats {
        self.wallets().stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::{Error, Result};
    use crate::filter::smart_money::{KnownActivityOracle, NoActivityOracle, RiskLevel};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    struct FailingOracle;

    #[async_trait]
    impl ActivityOracle for FailingOracle {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn has_activity(&self, _wallet: &str, _token: &str) -> Result<bool> {
            Err(Error::Oracle("backend down".to_string()))
        }
    }

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()))
    }

    fn small_cap(pair: &str, name: &str, volume: f64) -> Candidate {
        Candidate::new(pair, name, name.to_uppercase())
            .with_metrics(50_000.0, volume, 500_000.0)
            .with_token_address(format!("mint-{}", pair))
    }

    #[test]
    fn test_dedupe_last_write_wins() {
        let first = small_cap("P1", "alpha", 40_000.0);
        let second = small_cap("P2", "beta", 50_000.0);
        let replacement = small_cap("P1", "alpha v2", 90_000.0);
        let anonymous = small_cap("", "ghost", 10_000.0);

        let unique = dedupe(vec![first, second, replacement.clone(), anonymous]);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0], replacement);
        assert_eq!(unique[1].pair_address, "P2");
    }

    #[tokio::test]
    async fn test_run_dedupes_before_filtering() {
        let pipeline = ScanPipeline::with_clock(
            &Config::default(),
            Arc::new(NoActivityOracle),
            clock(),
        )
        .await;

        let report = pipeline
            .run(vec![
                small_cap("P1", "alpha", 40_000.0),
                small_cap("P1", "alpha", 80_000.0),
            ])
            .await;

        assert_eq!(report.unique_candidates, 1);
        let micro = report.profile("micro-cap").unwrap();
        assert_eq!(micro.candidates.len(), 1);
        assert_eq!(micro.candidates[0].candidate.volume_24h, 80_000.0);
        assert_eq!(report.profiles.len(), 4);
    }

    #[tokio::test]
    async fn test_invalid_metrics_excluded_everywhere() {
        let pipeline = ScanPipeline::with_clock(
            &Config::default(),
            Arc::new(NoActivityOracle),
            clock(),
        )
        .await;

        let broken = Candidate::new("P9", "whale coin", "WC")
            .with_metrics(0.0, 30_000_000.0, 5_000_000.0)
            .with_price_change_24h(-50.0)
            .with_token_address("mint-p9");
        let report = pipeline.run(vec![broken]).await;

        assert!(report.profiles.iter().all(|p| p.candidates.is_empty()));
    }

    #[tokio::test]
    async fn test_failing_oracle_completes_batch() {
        let pipeline = ScanPipeline::with_clock(
            &Config::default(),
            Arc::new(FailingOracle),
            clock(),
        )
        .await;

        let batch: Vec<Candidate> = (0..10)
            .map(|i| small_cap(&format!("P{}", i), "token", 40_000.0 + i as f64))
            .collect();
        let report = pipeline.run(batch).await;

        let micro = report.profile("micro-cap").unwrap();
        assert_eq!(micro.candidates.len(), 10);
        for annotated in &micro.candidates {
            assert_eq!(annotated.wallet_analysis.score, 0.0);
            assert_eq!(annotated.wallet_analysis.risk_level, RiskLevel::High);
        }
        // Highest volume first
        assert_eq!(micro.candidates[0].candidate.pair_address, "P9");
    }

    #[tokio::test]
    async fn test_momentum_counts_each_pair_once() {
        let pipeline = ScanPipeline::with_clock(
            &Config::default(),
            Arc::new(NoActivityOracle),
            clock(),
        )
        .await;

        let cat = small_cap("P1", "sol cat", 100_000.0);
        pipeline.run(vec![cat.clone(), cat.clone(), cat]).await;

        let metas = pipeline.hot_metas().await;
        let animals = metas.iter().find(|m| m.name == "Animals").unwrap();
        assert_eq!(animals.recent_count, 1);
        assert_eq!(animals.recent_volume, 100_000.0);
        assert_eq!(metas[0].name, "Animals");

        let terms = pipeline.hot_search_terms(3, "solana").await;
        assert_eq!(
            terms,
            vec![
                "solana animals".to_string(),
                "solana ai/tech".to_string(),
                "solana viral/memes".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_roster_changes_affect_scoring() {
        let oracle = Arc::new(KnownActivityOracle::new());
        let mut config = Config::default();
        config.wallets.whales.clear();
        config.wallets.influencers.clear();
        let pipeline = ScanPipeline::with_clock(&config, oracle.clone(), clock()).await;

        assert_eq!(pipeline.roster_stats().await.whale_count, 0);
        assert!(pipeline.add_whale("W1", "Fresh Whale", vec![]).await);
        assert!(pipeline.add_influencer("K1", "Fresh KOL", 20_000, vec![]).await);
        assert!(!pipeline.add_whale("", "Nobody", vec![]).await);

        oracle.record("W1", "mint-P1");
        let report = pipeline.run(vec![small_cap("P1", "alpha", 40_000.0)]).await;
        let analysis = &report.profile("micro-cap").unwrap().candidates[0].wallet_analysis;

        // Operator-added wallets start with a zero success rate
        assert_eq!(analysis.active_whales, vec!["Fresh Whale".to_string()]);
        assert_eq!(analysis.score, 0.0);

        let stats = pipeline.roster_stats().await;
        assert_eq!(stats.whale_count, 1);
        assert_eq!(stats.influencer_total_followers, 20_000);
    }
}
