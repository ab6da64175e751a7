//! Risk level assessment
//!
//! Risk is a pure function of the composite wallet-interest score and the
//! number of active whales and influencers. Rules are checked in order and
//! the first match wins:
//!
//! 1. score >= low_min_score and whales >= low_min_whales -> Low
//! 2. score >= medium_min_score and (whales >= medium_min_whales or
//!    influencers >= medium_min_influencers) -> Medium
//! 3. score < high_below_score or no active wallets -> High
//! 4. otherwise -> Medium

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse risk rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// Risk thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskThresholds {
    #[serde(default = "default_low_min_score")]
    pub low_min_score: f64,
    #[serde(default = "default_low_min_whales")]
    pub low_min_whales: usize,
    #[serde(default = "default_medium_min_score")]
    pub medium_min_score: f64,
    #[serde(default = "default_medium_min_whales")]
    pub medium_min_whales: usize,
    #[serde(default = "default_medium_min_influencers")]
    pub medium_min_influencers: usize,
    #[serde(default = "default_high_below_score")]
    pub high_below_score: f64,
}

fn default_low_min_score() -> f64 { 80.0 }
fn default_low_min_whales() -> usize { 2 }
fn default_medium_min_score() -> f64 { 60.0 }
fn default_medium_min_whales() -> usize { 1 }
fn default_medium_min_influencers() -> usize { 2 }
fn default_high_below_score() -> f64 { 30.0 }

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low_min_score: default_low_min_score(),
            low_min_whales: default_low_min_whales(),
            medium_min_score: default_medium_min_score(),
            medium_min_whales: default_medium_min_whales(),
            medium_min_influencers: default_medium_min_influencers(),
            high_below_score: default_high_below_score(),
        }
    }
}

impl RiskThresholds {
    pub fn assess(&self, score: f64, whale_count: usize, influencer_count: usize) -> RiskLevel {
        if score >= self.low_min_score && whale_count >= self.low_min_whales {
            RiskLevel::Low
        } else if score >= self.medium_min_score
            && (whale_count >= self.medium_min_whales
                || influencer_count >= self.medium_min_influencers)
        {
            RiskLevel::Medium
        } else if score < self.high_below_score || (whale_count == 0 && influencer_count == 0) {
            RiskLevel::High
        } else {
            RiskLevel::Medium
        }
    }
}
