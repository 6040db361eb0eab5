//! Live ticker in the terminal
//!
//! Subscribes to the market feed and prints one row per symbol for every
//! snapshot, whether it arrived over push or polling.
//!
//! Usage:
//!   cargo run --bin ticker_watch [config.yaml]

use anyhow::{Context, Result};
use chrono::Local;
use market_ticker::bin_common::{
    init_tracing, load_config_from_env, parse_args, print_banner, print_shutdown, ConfigType,
};
use market_ticker::ticker_feed::{FeedConfig, MarketFeed, Snapshot};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Color-code a change: green up, red down, plain when flat
fn format_change(change: f64, change_percent: f64) -> String {
    let text = format!("{:>+9.2} ({:>+6.2}%)", change, change_percent);
    if change > 0.0 {
        format!("\x1B[32m{}\x1B[0m", text)
    } else if change < 0.0 {
        format!("\x1B[31m{}\x1B[0m", text)
    } else {
        text
    }
}

fn print_snapshot(seq: u64, snapshot: &Snapshot) {
    println!("── #{} @ {} ──", seq, Local::now().format("%H:%M:%S%.3f"));
    for (symbol, quote) in snapshot.iter() {
        println!(
            "  {:<8} {:>12.2}  {}",
            symbol.key(),
            quote.price,
            format_change(quote.change, quote.change_percent)
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing("info");

    let config_type = match parse_args().into_iter().next() {
        Some(path) => ConfigType::Custom(path),
        None => ConfigType::Feed,
    };
    let path = load_config_from_env(config_type);
    let config = FeedConfig::load(&path)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    let feed = MarketFeed::new(config).context("Failed to build market feed")?;

    print_banner("ticker_watch");
    info!(
        "Symbols: {:?} (push: {})",
        feed.symbols().channel_names(),
        feed.push_capable()
    );

    let received = Arc::new(AtomicU64::new(0));
    let received_cb = Arc::clone(&received);
    let handle = feed.subscribe(move |snapshot| {
        let seq = received_cb.fetch_add(1, Ordering::Relaxed) + 1;
        print_snapshot(seq, &snapshot);
    });

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;
    handle.cancel();

    let stats = format!("Snapshots received: {}", received.load(Ordering::Relaxed));
    print_shutdown("ticker_watch", Some(&stats));
    Ok(())
}
