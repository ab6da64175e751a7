//! CLI command implementations

use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::dexscreener::DexScreenerClient;
use crate::filter::momentum::MetaMomentum;
use crate::filter::smart_money::NoActivityOracle;
use crate::pipeline::{ScanPipeline, ScanReport};

/// Machine-readable scan output
#[derive(Debug, Serialize)]
struct ScanOutput<'a> {
    report: &'a ScanReport,
    hot_metas: &'a [MetaMomentum],
}

async fn build_pipeline(config: &Config) -> ScanPipeline {
    // No on-chain activity backend is wired in yet
    ScanPipeline::from_config(config, Arc::new(NoActivityOracle)).await
}

fn build_client(config: &Config) -> DexScreenerClient {
    DexScreenerClient::new(
        &config.scanner.api_base_url,
        Duration::from_millis(config.scanner.request_timeout_ms),
    )
}

/// Configured terms plus terms for the currently hottest categories
async fn search_terms(config: &Config, pipeline: &ScanPipeline, extra: &[String]) -> Vec<String> {
    let mut terms: Vec<String> = if extra.is_empty() {
        config.scanner.search_terms.clone()
    } else {
        extra.to_vec()
    };

    let hot = pipeline
        .hot_search_terms(config.scanner.hot_meta_terms, &config.scanner.chain_id)
        .await;
    for term in hot {
        if !terms.contains(&term) {
            debug!("Adding hot meta search term '{}'", term);
            terms.push(term);
        }
    }

    terms
}

/// Fetch, dedupe, ingest, filter and score one batch
async fn run_cycle(
    config: &Config,
    client: &DexScreenerClient,
    pipeline: &ScanPipeline,
    extra_terms: &[String],
) -> ScanReport {
    let terms = search_terms(config, pipeline, extra_terms).await;
    let raw = client
        .collect_candidates(
            &terms,
            &config.scanner.chain_id,
            Duration::from_millis(config.scanner.request_delay_ms),
        )
        .await;

    if raw.is_empty() {
        warn!("No candidates returned by any search term");
    }

    pipeline.run(raw).await
}

/// Run a single scan and print the results
pub async fn scan(config: &Config, terms: Vec<String>, top: Option<usize>, json: bool) -> Result<()> {
    let client = build_client(config);
    let pipeline = build_pipeline(config).await;

    let report = run_cycle(config, &client, &pipeline, &terms).await;
    let metas = pipeline.hot_metas().await;

    if json {
        let output = ScanOutput {
            report: &report,
            hot_metas: &metas,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_report(&report, top.unwrap_or(config.scanner.results_per_profile));
        print_hot_metas(&metas);
    }

    Ok(())
}

/// Scan repeatedly, keeping momentum state across cycles, until Ctrl-C
pub async fn watch(config: &Config, interval_secs: Option<u64>) -> Result<()> {
    let every = Duration::from_secs(interval_secs.unwrap_or(config.scanner.watch_interval_secs).max(1));
    let client = build_client(config);
    let pipeline = build_pipeline(config).await;

    info!("Watching every {}s (Ctrl-C to stop)", every.as_secs());

    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut cycle: u64 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                cycle += 1;
                info!("Starting scan cycle {}", cycle);
                let report = run_cycle(config, &client, &pipeline, &[]).await;
                print_report(&report, config.scanner.results_per_profile);
                print_hot_metas(&pipeline.hot_metas().await);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested after {} cycles", cycle);
                break;
            }
        }
    }

    Ok(())
}

/// Show wallet roster and registry statistics
pub async fn stats(config: &Config) -> Result<()> {
    let pipeline = build_pipeline(config).await;
    let stats = pipeline.roster_stats().await;

    println!("\n=== SMART MONEY ROSTER ===\n");
    println!("Whales: {}", stats.whale_count);
    println!(
        "  Avg success rate: {:.1}%",
        stats.whale_avg_success_rate * 100.0
    );
    println!("Influencers: {}", stats.influencer_count);
    println!("  Total followers: {}", stats.influencer_total_followers);
    println!(
        "  Avg success rate: {:.1}%",
        stats.influencer_avg_success_rate * 100.0
    );

    println!("\n=== TRACKED WALLETS ===\n");
    println!("{:<12} {:<20} {:<8} {}", "ROLE", "NAME", "SUCCESS", "ADDRESS");
    println!("{}", "-".repeat(80));
    for wallet in pipeline.wallets().snapshot().await {
        println!(
            "{:<12} {:<20} {:<8} {}",
            format!("{:?}", wallet.role()),
            wallet.name,
            format!("{:.0}%", wallet.success_rate * 100.0),
            wallet.address
        );
    }

    println!("\n=== CATEGORIES ===\n");
    for category in &config.momentum.categories {
        println!(
            "{:<14} weight {:>5.1}  keywords: {}",
            category.name,
            category.weight,
            category.keywords.join(", ")
        );
    }

    println!("\n=== STRATEGY PROFILES ===\n");
    for profile in pipeline.profiles() {
        let dip = profile
            .max_price_change_24h
            .map(|c| format!("  24h < {}%", c))
            .unwrap_or_default();
        println!(
            "{:<12} liq >= {}  vol >= {}  fdv {} - {}{}",
            profile.name,
            format_usd(profile.min_liquidity_usd),
            format_usd(profile.min_volume_24h),
            format_usd(profile.min_fdv),
            format_usd(profile.max_fdv),
            dip
        );
    }
    println!();

    Ok(())
}

/// Show current configuration (secrets masked)
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.masked_display());
    Ok(())
}

fn print_report(report: &ScanReport, top: usize) {
    println!(
        "\n=== SCAN RESULTS ({} unique candidates) ===",
        report.unique_candidates
    );

    for result in &report.profiles {
        println!(
            "\n--- {} ({} matches) ---\n",
            result.profile.to_uppercase(),
            result.candidates.len()
        );
        if result.candidates.is_empty() {
            println!("No candidates.");
            continue;
        }

        println!(
            "{:<10} {:<20} {:>10} {:>10} {:>10} {:>8} {:>6} {:<7} {}",
            "SYMBOL", "NAME", "LIQ", "VOL24H", "FDV", "24H%", "SCORE", "RISK", "URL"
        );
        for annotated in result.candidates.iter().take(top) {
            let c = &annotated.candidate;
            let w = &annotated.wallet_analysis;
            println!(
                "{:<10} {:<20} {:>10} {:>10} {:>10} {:>8.1} {:>6.1} {:<7} {}",
                truncate(&c.base_token.symbol, 10),
                truncate(&c.base_token.name, 20),
                format_usd(c.liquidity_usd),
                format_usd(c.volume_24h),
                format_usd(c.fdv),
                c.price_change.h24,
                w.score,
                w.risk_level.to_string(),
                c.url
            );
            if !w.active_whales.is_empty() || !w.active_influencers.is_empty() {
                println!(
                    "           whales: [{}] influencers: [{}]",
                    w.active_whales.join(", "),
                    w.active_influencers.join(", ")
                );
            }
        }
    }
}

fn print_hot_metas(metas: &[MetaMomentum]) {
    println!("\n=== HOT METAS ===\n");
    for (rank, meta) in metas.iter().enumerate() {
        println!(
            "{}. {:<14} momentum {:>12.0}  ({} obs, {} recent volume)",
            rank + 1,
            meta.name,
            meta.momentum,
            meta.recent_count,
            format_usd(meta.recent_volume)
        );
    }
    println!();
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}~", cut)
    } else {
        s.to_string()
    }
}

/// Format a USD amount for console output ($1.23M, $4.56K, $789.00)
pub fn format_usd(value: f64) -> String {
    let abs = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };
    if abs >= 1_000_000.0 {
        format!("{}${:.2}M", sign, abs / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{}${:.2}K", sign, abs / 1_000.0)
    } else {
        format!("{}${:.2}", sign, abs)
    }
}
