//! Wallet activity oracles
//!
//! The scorer asks an [`ActivityOracle`] whether a tracked wallet has
//! interacted with a token. Real backends (indexers, RPC history) plug in
//! behind this trait.

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};

use crate::error::Result;

/// Reports whether a wallet interacted with a token
#[async_trait]
pub trait ActivityOracle: Send + Sync {
    /// Oracle name for logging
    fn name(&self) -> &'static str;

    /// Whether `wallet_address` has recent activity on `token_address`
    async fn has_activity(&self, wallet_address: &str, token_address: &str) -> Result<bool>;
}

/// Oracle with no data source; never reports activity
#[derive(Debug, Clone, Copy, Default)]
pub struct NoActivityOracle;

#[async_trait]
impl ActivityOracle for NoActivityOracle {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn has_activity(&self, _wallet_address: &str, _token_address: &str) -> Result<bool> {
        Ok(false)
    }
}

/// In-memory oracle fed with known (wallet, token) interactions
#[derive(Debug, Default)]
pub struct KnownActivityOracle {
    activity: DashMap<String, DashSet<String>>,
}

impl KnownActivityOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a wallet touched a token
    pub fn record(&self, wallet_address: &str, token_address: &str) {
        self.activity
            .entry(wallet_address.to_string())
            .or_default()
            .insert(token_address.to_string());
    }
}

#[async_trait]
impl ActivityOracle for KnownActivityOracle {
    fn name(&self) -> &'static str {
        "known"
    }

    async fn has_activity(&self, wallet_address: &str, token_address: &str) -> Result<bool> {
        Ok(self
            .activity
            .get(wallet_address)
            .map(|tokens| tokens.contains(token_address))
            .unwrap_or(false))
    }
}
