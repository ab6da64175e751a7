//! Shared data structures for candidate filtering and scoring

use serde::{Deserialize, Serialize};

use crate::filter::smart_money::WalletInterest;

/// Base token identity of a trading pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseToken {
    pub address: String,
    pub name: String,
    pub symbol: String,
}

/// Price change percentages over the standard windows
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceChangeWindows {
    pub m5: f64,
    pub h1: f64,
    pub h6: f64,
    pub h24: f64,
}

/// A token/market snapshot being evaluated in a scan cycle.
///
/// Metrics are already coerced: anything missing or non-numeric at ingestion
/// is stored as `0.0`, and non-finite values never make it in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub chain_id: String,
    /// Pair identity, the deduplication key
    pub pair_address: String,
    pub base_token: BaseToken,
    pub dex_id: String,
    pub url: String,
    pub price_usd: f64,
    pub liquidity_usd: f64,
    pub volume_24h: f64,
    pub fdv: f64,
    pub price_change: PriceChangeWindows,
}

/// Coerce a raw metric: missing or non-finite becomes zero
pub fn coerce_metric(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

impl Candidate {
    pub fn new(pair_address: impl Into<String>, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            pair_address: pair_address.into(),
            base_token: BaseToken {
                name: name.into(),
                symbol: symbol.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Set liquidity, 24h volume and FDV
    pub fn with_metrics(mut self, liquidity_usd: f64, volume_24h: f64, fdv: f64) -> Self {
        self.liquidity_usd = coerce_metric(Some(liquidity_usd));
        self.volume_24h = coerce_metric(Some(volume_24h));
        self.fdv = coerce_metric(Some(fdv));
        self
    }

    pub fn with_price_change_24h(mut self, pct: f64) -> Self {
        self.price_change.h24 = coerce_metric(Some(pct));
        self
    }

    pub fn with_token_address(mut self, address: impl Into<String>) -> Self {
        self.base_token.address = address.into();
        self
    }

    /// Data-quality gate shared by every strategy profile: liquidity, volume
    /// and FDV must all be present and non-zero.
    pub fn has_valid_metrics(&self) -> bool {
        [self.liquidity_usd, self.volume_24h, self.fdv]
            .iter()
            .all(|v| v.is_finite() && *v != 0.0)
    }

    /// Short label for logs
    pub fn label(&self) -> String {
        format!("{} ({})", self.base_token.symbol, self.pair_address)
    }
}

/// A candidate that survived a strategy profile, with its wallet-interest annotation
#[derive(Debug, Clone, Serialize)]
pub struct AnnotatedCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub wallet_analysis: WalletInterest,
}
