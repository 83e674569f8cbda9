//! Reorder bench - drives an OrderedEmitter with jittered concurrent producers
//!
//! Usage:
//!   cargo run --release --bin reorder_bench                         # Use defaults
//!   cargo run --release --bin reorder_bench -- --config bench.toml  # Use config file
//!   cargo run --release --bin reorder_bench -- -n 1000000 -t 256 -p 8
//!
//! Producers push from blocking threads into a shared emitter whose sink is a
//! bounded tokio channel; an async consumer drains it and checks the order.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use event_reorder::common::{setup_shutdown, shutdown_requested, BenchArgs, EventData};
use event_reorder::config::Config;
use event_reorder::emitter::OrderedEmitter;
use event_reorder::source::{EventSource, OrderChecker};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Events pushed between shutdown checks
const SHUTDOWN_POLL_INTERVAL: u64 = 1024;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (logging)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("event_reorder=info".parse()?)
                .add_directive("reorder_bench=info".parse()?),
        )
        .init();

    let args = BenchArgs::parse();

    // Build configuration
    let config_path = &args.common.config_file;
    let mut config = if std::path::Path::new(config_path).exists() {
        let config = Config::load(config_path)
            .with_context(|| format!("loading config file {config_path}"))?;
        info!(config_file = %config_path, "Loaded configuration");
        config
    } else {
        Config::default()
    };

    // CLI overrides config file
    if let Some(n) = args.events {
        config.bench.events = n;
    }
    if let Some(t) = args.threshold {
        config.emitter.emit_threshold = t;
    }
    if let Some(p) = args.producers {
        config.bench.producers = p;
    }
    if let Some(c) = args.sink_capacity {
        config.emitter.sink_capacity = c;
    }
    if let Some(j) = args.jitter_ns {
        config.bench.jitter_ns = j;
    }
    if args.seed.is_some() {
        config.bench.seed = args.seed;
    }
    config.validate()?;

    let seed = config.bench.seed.unwrap_or_else(rand::random);
    info!(?config, seed, "Starting reorder bench");

    let (shutdown_tx, _shutdown_rx) = setup_shutdown();

    let (tx, mut rx) = mpsc::channel::<EventData>(config.emitter.sink_capacity);
    let emitter = Arc::new(OrderedEmitter::with_config(
        config.emitter.to_emitter_config(),
        tx,
        EventData::timestamp_order,
    )?);

    // Consumer: sink → order check
    let consumer = tokio::spawn(async move {
        let mut checker = OrderChecker::new();
        while let Some(event) = rx.recv().await {
            checker.observe(&event);
        }
        checker
    });

    let start = Instant::now();

    // Producers: blocking threads, since a full sink blocks the pusher
    let mut producers = Vec::with_capacity(config.bench.producers);
    for producer_id in 0..config.bench.producers {
        let source = EventSource::new(
            producer_id,
            config.bench.producers,
            config.bench.events,
            config.bench.event_spacing_ns,
            config.bench.jitter_ns,
            seed,
        )?;
        let emitter = Arc::clone(&emitter);
        let mut shutdown = shutdown_tx.subscribe();

        producers.push(tokio::task::spawn_blocking(move || -> Result<u64> {
            let mut pushed = 0u64;
            for event in source {
                if pushed % SHUTDOWN_POLL_INTERVAL == 0 && shutdown_requested(&mut shutdown) {
                    info!(producer_id, pushed, "Producer stopping early");
                    break;
                }
                emitter.push(event)?;
                pushed += 1;
            }
            Ok(pushed)
        }));
    }

    let mut pushed = 0u64;
    for handle in producers {
        pushed += handle.await??;
    }

    let flush_emitter = Arc::clone(&emitter);
    let flushed = tokio::task::spawn_blocking(move || flush_emitter.flush()).await??;

    let emitter = Arc::try_unwrap(emitter)
        .map_err(|_| anyhow::anyhow!("emitter still shared after producers finished"))?;
    let stats = emitter.stats();
    // Dropping the sink ends the consumer
    let (sink, leftover) = emitter.into_parts();
    drop(sink);

    let checker = consumer.await?;
    let elapsed = start.elapsed();

    let rate = pushed as f64 / elapsed.as_secs_f64();
    info!(
        pushed,
        emitted = stats.emitted,
        auto_emitted = stats.auto_emitted,
        flushed,
        dropped = stats.dropped,
        high_water = stats.high_water,
        leftover = leftover.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        events_per_sec = rate as u64,
        "Reorder bench finished"
    );

    if checker.is_sorted() {
        info!(received = checker.seen(), "Output fully ordered");
    } else {
        warn!(
            received = checker.seen(),
            inversions = checker.inversions(),
            max_lag_ns = checker.max_lag_ns(),
            "Output not fully ordered; threshold smaller than the reorder window"
        );
    }

    println!();
    println!("=== Reorder Bench ===");
    println!("  Events pushed:   {}", pushed);
    println!("  Events received: {}", checker.seen());
    println!("  Threshold:       {}", config.emitter.emit_threshold);
    println!("  Producers:       {}", config.bench.producers);
    println!("  Inversions:      {}", checker.inversions());
    println!("  Elapsed:         {:.3} s", elapsed.as_secs_f64());
    println!("  Rate:            {:.0} events/s", rate);

    Ok(())
}
