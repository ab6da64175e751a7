//! Smart Money Scoring Module
//!
//! Scores how much tracked "smart money" is participating in a token:
//! - Pluggable wallet activity oracles
//! - Whale/influencer interest score
//! - Discretized risk level

pub mod interest;
pub mod oracle;
pub mod risk;

pub use interest::{InterestWeights, WalletInterest, WalletInterestScorer};
pub use oracle::{ActivityOracle, KnownActivityOracle, NoActivityOracle};
pub use risk::{RiskLevel, RiskThresholds};
