//! Pairscope - Statistical-Arbitrage Pair Analytics
//!
//! Demo binary: replays a synthetic correlated tick stream through the
//! ingestion ports, runs the full analytics pipeline and prints the
//! resulting signal table and backtest summary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::{fmt, EnvFilter};

use pairscope::application::PairAnalyzer;
use pairscope::config::{load_config, Config};
use pairscope::domain::Tick;
use pairscope::ports::{
    InMemoryTickStore, ReplayTickStream, TickCallback, TickStorePort, TickStreamPort,
};

#[derive(Parser)]
#[command(name = "pairscope", about = "Pair analytics over a synthetic tick stream")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Number of synthetic bars to generate per leg
    #[arg(long, default_value_t = 720)]
    bars: usize,

    /// Seed for the synthetic stream
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Rows of the analytics table to print
    #[arg(long, default_value_t = 10)]
    tail: usize,

    /// Info-level logging
    #[arg(short, long)]
    verbose: bool,

    /// Debug-level logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug);

    let config = if cli.config.exists() {
        load_config(&cli.config).context("Failed to load configuration")?
    } else {
        tracing::warn!(path = %cli.config.display(), "config file not found, using defaults");
        Config::default()
    };

    run(cli, config).await
}

fn init_logging(verbose: bool, debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };
    fmt().with_env_filter(filter).init();
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let start = Utc
        .timestamp_opt(1_700_000_000, 0)
        .single()
        .context("invalid demo start timestamp")?;
    let interval = config.resample.interval;
    let end = start + Duration::milliseconds(interval.millis() * cli.bars as i64);

    let symbols = vec![
        config.pair.symbol_y.clone(),
        config.pair.symbol_x.clone(),
    ];

    // Deliver the synthetic stream through the callback port into the store
    let store = Arc::new(InMemoryTickStore::new());
    let stream = ReplayTickStream::new(synthetic_ticks(&config, start, cli.bars, cli.seed));
    let sink = store.clone();
    let on_tick: TickCallback = Arc::new(move |tick: Tick| sink.insert(tick));
    stream
        .subscribe(&symbols, on_tick)
        .await
        .context("tick replay failed")?;

    tracing::info!(
        y_ticks = store.tick_count(&config.pair.symbol_y),
        x_ticks = store.tick_count(&config.pair.symbol_x),
        "synthetic stream ingested"
    );

    let bars_y = store
        .fetch_bars(&config.pair.symbol_y, interval, start, end)
        .await
        .context("fetching Y bars")?;
    let bars_x = store
        .fetch_bars(&config.pair.symbol_x, interval, start, end)
        .await
        .context("fetching X bars")?;

    let analyzer = PairAnalyzer::new(config);
    let report = analyzer
        .analyze(&bars_y, &bars_x)
        .context("pair analysis failed")?;

    println!("=== Pair Summary ===");
    println!("aligned bars:   {}", report.aligned_len);
    println!("window:         {}", report.effective_window);
    if let Some(beta) = report.latest_beta() {
        println!("hedge ratio:    {beta:.4}");
    }
    if let Some(r2) = report.r_squared {
        println!("r-squared:      {r2:.3}");
    }
    match report.stationarity.as_ref().and_then(|s| s.p_value) {
        Some(p) => println!(
            "adf p-value:    {p:.4} ({})",
            if p < 0.05 { "stationary" } else { "non-stationary" }
        ),
        None => println!("adf p-value:    n/a"),
    }
    match report.latest_z() {
        Some(z) => println!("latest z:       {z:.2}"),
        None => println!("latest z:       n/a"),
    }
    if let Some(lag) = report.correlation.best_lag {
        println!("best lead-lag:  {lag}");
    }
    println!(
        "alerts:         z={} spread={} corr={}",
        report.alert_state.z_alert, report.alert_state.spread_alert, report.alert_state.corr_alert
    );

    println!("\n=== Last {} rows ===", cli.tail);
    for row in report.rows.iter().rev().take(cli.tail).rev() {
        let line = serde_json::to_string(row).context("serializing row")?;
        println!("{line}");
    }

    let backtest = analyzer.backtest(&report);
    println!("\n=== Backtest ===");
    println!("total pnl (z):  {:.4}", backtest.total_pnl);
    println!("transitions:    {}", backtest.num_transitions);
    println!("bars simulated: {}", backtest.steps.len());

    Ok(())
}

/// Generate an interleaved tick stream for a cointegrated synthetic pair:
/// the hedge leg random-walks while the dependent leg tracks `1.5 * x`
/// plus a mean-reverting disturbance.
fn synthetic_ticks(config: &Config, start: DateTime<Utc>, bars: usize, seed: u64) -> Vec<Tick> {
    const TRUE_BETA: f64 = 1.5;
    const TICKS_PER_BAR: usize = 4;

    let mut rng = StdRng::seed_from_u64(seed);
    let interval_ms = config.resample.interval.millis();
    let mut ticks = Vec::with_capacity(bars * TICKS_PER_BAR * 2);

    let mut x_price: f64 = 2000.0;
    let mut disturbance: f64 = 0.0;

    for bar in 0..bars {
        let bar_start = start + Duration::milliseconds(interval_ms * bar as i64);
        for step in 0..TICKS_PER_BAR {
            let ts = bar_start
                + Duration::milliseconds(interval_ms * step as i64 / TICKS_PER_BAR as i64);

            x_price += rng.gen_range(-1.0..1.0);
            disturbance = 0.9 * disturbance + rng.gen_range(-1.0..1.0);
            let y_price = TRUE_BETA * x_price + disturbance;

            ticks.push(Tick::new(
                ts,
                config.pair.symbol_x.clone(),
                x_price,
                rng.gen_range(0.5..5.0),
            ));
            ticks.push(Tick::new(
                ts,
                config.pair.symbol_y.clone(),
                y_price,
                rng.gen_range(0.5..5.0),
            ));
        }
    }

    ticks
}
