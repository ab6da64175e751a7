//! Strategy profile filtering
//!
//! Selects candidates against named threshold profiles (micro-cap,
//! small-cap, mid-cap, dip-hunting, ...). Every profile shares the same
//! data-quality gate: a candidate with zero liquidity, volume or FDV never
//! passes any profile.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::filter::smart_money::WalletInterestScorer;
use crate::filter::types::{AnnotatedCandidate, Candidate};

/// A named set of threshold conditions. Bounds are inclusive except the
/// price-change ceiling, which is strict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyProfile {
    pub name: String,
    pub min_liquidity_usd: f64,
    pub min_volume_24h: f64,
    pub min_fdv: f64,
    pub max_fdv: f64,
    /// Dip-style profiles: 24h price change must be strictly below this
    #[serde(default)]
    pub max_price_change_24h: Option<f64>,
}

impl StrategyProfile {
    /// Whether the thresholds can be satisfied at all
    pub fn is_well_formed(&self) -> bool {
        let bounds = [self.min_liquidity_usd, self.min_volume_24h, self.min_fdv, self.max_fdv];
        !self.name.trim().is_empty()
            && bounds.iter().all(|v| v.is_finite())
            && self.min_fdv <= self.max_fdv
            && self.max_price_change_24h.map_or(true, |c| !c.is_nan())
    }
}

pub fn default_profiles() -> Vec<StrategyProfile> {
    vec![
        StrategyProfile {
            name: "micro-cap".to_string(),
            min_liquidity_usd: 10_000.0,
            min_volume_24h: 30_000.0,
            min_fdv: 50_000.0,
            max_fdv: 20_000_000.0,
            max_price_change_24h: None,
        },
        StrategyProfile {
            name: "small-cap".to_string(),
            min_liquidity_usd: 10_000.0,
            min_volume_24h: 30_000.0,
            min_fdv: 100_000.0,
            max_fdv: 20_000_000.0,
            max_price_change_24h: None,
        },
        StrategyProfile {
            name: "mid-cap".to_string(),
            min_liquidity_usd: 10_000.0,
            min_volume_24h: 3_000_000.0,
            min_fdv: 1_000_000.0,
            max_fdv: 3_000_000.0,
            max_price_change_24h: None,
        },
        StrategyProfile {
            name: "dip-hunting".to_string(),
            min_liquidity_usd: 10_000.0,
            min_volume_24h: 300_000.0,
            min_fdv: 100_000.0,
            max_fdv: 10_000_000.0,
            max_price_change_24h: Some(-10.0),
        },
    ]
}

/// Strategy filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Ordered profile registry
    #[serde(default = "default_profiles")]
    pub profiles: Vec<StrategyProfile>,
    /// Candidates scored concurrently per profile
    #[serde(default = "default_scoring_concurrency")]
    pub scoring_concurrency: usize,
}

fn default_scoring_concurrency() -> usize {
    8
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            profiles: default_profiles(),
            scoring_concurrency: default_scoring_concurrency(),
        }
    }
}

/// Reason why a candidate was filtered
#[derive(Debug, Clone, PartialEq)]
pub enum FilterReason {
    /// Liquidity, volume or FDV missing or zero
    InvalidMetrics,
    /// Profile thresholds cannot be satisfied
    MalformedProfile,
    LiquidityBelowMinimum(f64),
    VolumeBelowMinimum(f64),
    FdvOutOfRange(f64),
    PriceChangeNotBelowCeiling(f64),
}

impl std::fmt::Display for FilterReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterReason::InvalidMetrics => write!(f, "missing or zero liquidity/volume/fdv"),
            FilterReason::MalformedProfile => write!(f, "malformed profile"),
            FilterReason::LiquidityBelowMinimum(usd) => {
                write!(f, "liquidity ${:.0} below minimum", usd)
            }
            FilterReason::VolumeBelowMinimum(usd) => write!(f, "24h volume ${:.0} below minimum", usd),
            FilterReason::FdvOutOfRange(usd) => write!(f, "fdv ${:.0} out of range", usd),
            FilterReason::PriceChangeNotBelowCeiling(pct) => {
                write!(f, "24h change {:.2}% not below ceiling", pct)
            }
        }
    }
}

/// Filter result
#[derive(Debug, Clone, PartialEq)]
pub enum FilterResult {
    /// Candidate passed the profile
    Pass,
    /// Candidate was filtered
    Filtered(FilterReason),
}

impl FilterResult {
    pub fn is_pass(&self) -> bool {
        matches!(self, FilterResult::Pass)
    }

    pub fn is_filtered(&self) -> bool {
        matches!(self, FilterResult::Filtered(_))
    }
}

/// Candidate filter over the configured strategy profiles
pub struct TokenFilter {
    profiles: Vec<StrategyProfile>,
    scoring_concurrency: usize,
}

impl TokenFilter {
    pub fn new(config: StrategyConfig) -> Self {
        for profile in config.profiles.iter().filter(|p| !p.is_well_formed()) {
            warn!(profile = %profile.name, "Malformed strategy profile will match nothing");
        }
        Self {
            profiles: config.profiles,
            scoring_concurrency: config.scoring_concurrency.max(1),
        }
    }

    pub fn profiles(&self) -> &[StrategyProfile] {
        &self.profiles
    }

    /// Check a single candidate against a profile
    pub fn check(&self, profile: &StrategyProfile, candidate: &Candidate) -> FilterResult {
        if !candidate.has_valid_metrics() {
            return FilterResult::Filtered(FilterReason::InvalidMetrics);
        }
        if !profile.is_well_formed() {
            return FilterResult::Filtered(FilterReason::MalformedProfile);
        }

        if candidate.liquidity_usd < profile.min_liquidity_usd {
            return FilterResult::Filtered(FilterReason::LiquidityBelowMinimum(candidate.liquidity_usd));
        }
        if candidate.volume_24h < profile.min_volume_24h {
            return FilterResult::Filtered(FilterReason::VolumeBelowMinimum(candidate.volume_24h));
        }
        if candidate.fdv < profile.min_fdv || candidate.fdv > profile.max_fdv {
            return FilterResult::Filtered(FilterReason::FdvOutOfRange(candidate.fdv));
        }
        if let Some(ceiling) = profile.max_price_change_24h {
            let change = candidate.price_change.h24;
            if change.is_nan() || change >= ceiling {
                return FilterResult::Filtered(FilterReason::PriceChangeNotBelowCeiling(change));
            }
        }

        FilterResult::Pass
    }

    /// Select the candidates passing `profile`, annotate each with wallet
    /// interest, and order them by 24h volume (highest first).
    pub async fn evaluate(
        &self,
        candidates: &[Candidate],
        profile: &StrategyProfile,
        scorer: &WalletInterestScorer,
        deadline: Option<Instant>,
    ) -> Vec<AnnotatedCandidate> {
        let survivors: Vec<&Candidate> = candidates
            .iter()
            .filter(|candidate| match self.check(profile, candidate) {
                FilterResult::Pass => true,
                FilterResult::Filtered(reason) => {
                    debug!(
                        profile = %profile.name,
                        candidate = %candidate.label(),
                        %reason,
                        "Candidate filtered"
                    );
                    false
                }
            })
            .collect();

        let mut annotated: Vec<AnnotatedCandidate> = stream::iter(survivors)
            .map(|candidate| async move {
                AnnotatedCandidate {
                    candidate: candidate.clone(),
                    wallet_analysis: scorer.score(candidate, deadline).await,
                }
            })
            .buffered(self.scoring_concurrency)
            .collect()
            .await;

        annotated.sort_by(|a, b| {
            b.candidate
                .volume_24h
                .partial_cmp(&a.candidate.volume_24h)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!(
            profile = %profile.name,
            evaluated = candidates.len(),
            passed = annotated.len(),
            "Profile evaluated"
        );
        annotated
    }
}

impl Default for TokenFilter {
    fn default() -> Self {
        Self::new(StrategyConfig::default())
    }
}
