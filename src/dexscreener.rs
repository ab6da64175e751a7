// DexScreener API client for candidate discovery
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::filter::types::{self, coerce_metric, Candidate, PriceChangeWindows};

/// Accept a number or a numeric string; anything else (or non-finite) is None
fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let parsed = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed.filter(|v| v.is_finite()))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceChange {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub m5: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub h1: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub h6: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub h24: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Liquidity {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub usd: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Volume {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub h24: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaseToken {
    #[serde(default)]
    pub address: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DexPair {
    #[serde(rename = "chainId", default)]
    pub chain_id: Option<String>,
    #[serde(rename = "dexId", default)]
    pub dex_id: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "pairAddress", default)]
    pub pair_address: Option<String>,
    #[serde(rename = "baseToken", default)]
    pub base_token: BaseToken,
    #[serde(rename = "priceUsd", default, deserialize_with = "lenient_f64")]
    pub price_usd: Option<f64>,
    #[serde(rename = "priceChange", default)]
    pub price_change: Option<PriceChange>,
    #[serde(default)]
    pub volume: Option<Volume>,
    #[serde(default)]
    pub liquidity: Option<Liquidity>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fdv: Option<f64>,
}

/// Search payload; pairs stay raw so each one decodes on its own
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub pairs: Option<Vec<serde_json::Value>>,
}

/// Decode raw pairs one by one, skipping (and logging) any that don't fit
pub fn decode_pairs(raw: Vec<serde_json::Value>) -> Vec<DexPair> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value::<DexPair>(value) {
            Ok(pair) => Some(pair),
            Err(e) => {
                let err = Error::from(e);
                warn!(index = i, error = %err, "Skipping malformed pair");
                None
            }
        })
        .collect()
}

impl From<DexPair> for Candidate {
    fn from(pair: DexPair) -> Self {
        let change = pair.price_change.unwrap_or_default();

        Candidate {
            chain_id: pair.chain_id.unwrap_or_default(),
            pair_address: pair.pair_address.unwrap_or_default(),
            base_token: types::BaseToken {
                address: pair.base_token.address.unwrap_or_default(),
                name: pair.base_token.name.unwrap_or_else(|| "Unknown".to_string()),
                symbol: pair.base_token.symbol.unwrap_or_else(|| "???".to_string()),
            },
            dex_id: pair.dex_id.unwrap_or_default(),
            url: pair.url.unwrap_or_default(),
            price_usd: coerce_metric(pair.price_usd),
            liquidity_usd: coerce_metric(pair.liquidity.and_then(|l| l.usd)),
            volume_24h: coerce_metric(pair.volume.and_then(|v| v.h24)),
            fdv: coerce_metric(pair.fdv),
            price_change: PriceChangeWindows {
                m5: coerce_metric(change.m5),
                h1: coerce_metric(change.h1),
                h6: coerce_metric(change.h6),
                h24: coerce_metric(change.h24),
            },
        }
    }
}

/// Keep pairs on `chain_id` and convert them to candidates
pub fn candidates_on_chain(pairs: Vec<DexPair>, chain_id: &str) -> Vec<Candidate> {
    pairs
        .into_iter()
        .filter(|p| {
            p.chain_id
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(chain_id))
        })
        .map(Candidate::from)
        .collect()
}

pub struct DexScreenerClient {
    client: reqwest::Client,
    base_url: String,
}

impl DexScreenerClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Search pairs matching a free-text query
    pub async fn search_pairs(&self, query: &str) -> Result<Vec<DexPair>> {
        let url = format!("{}/latest/dex/search", self.base_url);
        let resp = self.client.get(&url).query(&[("q", query)]).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::DataSourceStatus {
                status: status.as_u16(),
                body,
            });
        }

        let data: SearchResponse = resp.json().await?;
        Ok(decode_pairs(data.pairs.unwrap_or_default()))
    }

    /// Run every search term and gather candidates on `chain_id`.
    ///
    /// A failing term is logged and skipped so one bad request doesn't lose
    /// the whole cycle.
    pub async fn collect_candidates(
        &self,
        terms: &[String],
        chain_id: &str,
        delay: Duration,
    ) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        for (i, term) in terms.iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                // Rate limiting
                tokio::time::sleep(delay).await;
            }

            debug!("Searching DexScreener for '{}'", term);
            match self.search_pairs(term).await {
                Ok(pairs) => {
                    let found = candidates_on_chain(pairs, chain_id);
                    debug!("'{}' returned {} {} pairs", term, found.len(), chain_id);
                    candidates.extend(found);
                }
                Err(e) => warn!(retryable = e.is_retryable(), "Search '{}' failed: {}", term, e),
            }
        }

        info!(
            "Collected {} raw candidates from {} search terms",
            candidates.len(),
            terms.len()
        );
        candidates
    }
}
