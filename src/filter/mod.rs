//! Candidate filtering module
//!
//! Thematic momentum tracking, strategy profile filtering and
//! smart money wallet-interest scoring.

pub mod momentum;
pub mod smart_money;
pub mod token_filter;
pub mod types;
pub mod wallet_tracker;

pub use momentum::{CategoryConfig, MetaMomentum, MetaTracker, MomentumConfig};
pub use smart_money::{ActivityOracle, RiskLevel, WalletInterest, WalletInterestScorer};
pub use token_filter::{FilterReason, FilterResult, StrategyConfig, StrategyProfile, TokenFilter};
pub use types::{AnnotatedCandidate, Candidate};
pub use wallet_tracker::{RosterStats, TrackedWallet, WalletTracker};
