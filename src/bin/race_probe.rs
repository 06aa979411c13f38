//! Race probe
//!
//! Fires concurrent ratings at one in-memory record in each update mode and
//! reports how many observations survived.
//!
//! Run with: cargo run --bin race_probe --release -- --callers 200 --retries 50 [--json]

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use joke_stats::{
    AggregateStatUpdater, ApplyOptions, DocumentStore, InMemoryStore, StatDomain, UpdateMode,
};

const KEY: &str = "jokes/probe/rating";

fn arg_value(args: &[String], name: &str, default: u32) -> u32 {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Serialize)]
struct ProbeReport {
    mode: UpdateMode,
    callers: u32,
    succeeded: u32,
    failed: u32,
    stored_count: u64,
    lost: u64,
    stored_average: f64,
    reads: u64,
    writes: u64,
    conflicts: u64,
    duration_ms: u128,
}

impl ProbeReport {
    fn print(&self) {
        println!("Mode: {}", self.mode);
        println!("  Callers:            {}", self.callers);
        println!("  Reported success:   {}", self.succeeded);
        println!("  Reported failure:   {}", self.failed);
        println!("  Stored count:       {}", self.stored_count);
        println!("  Lost observations:  {}", self.lost);
        println!("  Stored average:     {:.4}", self.stored_average);
        println!(
            "  Store calls:        {} reads, {} writes, {} conflicts",
            self.reads, self.writes, self.conflicts
        );
        println!("  Duration:           {}ms", self.duration_ms);
    }
}

async fn probe(mode: UpdateMode, callers: u32, retries: u32) -> anyhow::Result<ProbeReport> {
    let store = Arc::new(InMemoryStore::new());
    let updater = AggregateStatUpdater::new(StatDomain::STAR_RATING)
        .with_options(ApplyOptions::new(retries, Duration::from_millis(1)));

    updater.initialize(&*store, KEY).await?;

    let start = Instant::now();
    let mut tasks = Vec::with_capacity(callers as usize);
    for i in 0..callers {
        let store = store.clone();
        let rating = f64::from(i % 5 + 1);
        tasks.push(tokio::spawn(async move {
            updater.apply(&*store, KEY, rating, mode).await
        }));
    }

    let mut succeeded = 0u32;
    let mut failed = 0u32;
    for task in tasks {
        match task.await? {
            Ok(_) => succeeded += 1,
            Err(e) => {
                failed += 1;
                tracing::debug!("apply failed: {}", e);
            }
        }
    }
    let elapsed = start.elapsed();

    let stored = store.read(KEY).await?;
    let counters = store.counters();

    Ok(ProbeReport {
        mode,
        callers,
        succeeded,
        failed,
        stored_count: stored.stat.count,
        // Successes the record does not account for
        lost: u64::from(succeeded).saturating_sub(stored.stat.count),
        stored_average: stored.stat.value,
        reads: counters.reads,
        writes: counters.writes,
        conflicts: counters.conflicts,
        duration_ms: elapsed.as_millis(),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let callers = arg_value(&args, "--callers", 100);
    let retries = arg_value(&args, "--retries", 50);

    let json = args.iter().any(|a| a == "--json");

    let reports = vec![
        probe(UpdateMode::LastWriterWins, callers, retries).await?,
        probe(UpdateMode::Strict, callers, retries).await?,
    ];

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        println!("Race probe - {} concurrent ratings per mode", callers);
        for report in &reports {
            report.print();
        }
    }

    Ok(())
}
