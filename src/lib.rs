//! Meme Scanner Library
//!
//! Memecoin signal pipeline: thematic momentum, strategy filters and
//! smart money interest scoring over DexScreener market data.

pub mod cli;
pub mod clock;
pub mod config;
pub mod dexscreener;
pub mod error;
pub mod filter;
pub mod pipeline;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::{ScanPipeline, ScanReport};
