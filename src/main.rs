//! Wager Scan entrypoint.
//!
//! - `scan <gambler_id>`: run one scan and print the report as a JSON line
//! - `jobs`: recompute aggregate stats, then run trigger detection once
//! - `daemon`: repeat `jobs` every `jobs.interval_secs` until Ctrl+C
//! - `import <file>`: load newline-delimited JSON bets into the store

use std::io::BufRead;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};
use wager_scan::{
    config::ScanConfig,
    jobs::{AggregateStatsJob, TriggerDetector},
    logging::StructuredLogger,
    model::Models,
    scan::Scanner,
    storage::SqliteStore,
    Bet,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const USAGE: &str = "usage: wager-scan <scan GAMBLER_ID | jobs | daemon | import FILE>";

fn run_jobs(config: &ScanConfig, store: &SqliteStore) -> Result<(), BoxError> {
    let stats = AggregateStatsJob::new(config.aggregate.clone()).run(store)?;
    let triggers = TriggerDetector::new(config.triggers.clone()).run(store)?;
    info!(
        qualifying = stats.qualifying_gamblers,
        triggers_created = triggers.created,
        "batch jobs complete"
    );
    Ok(())
}

fn import(store: &SqliteStore, path: &Path) -> Result<usize, BoxError> {
    let reader = std::io::BufReader::new(std::fs::File::open(path)?);
    let mut count = 0;
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let bet: Bet = serde_json::from_str(&line)
            .map_err(|e| format!("{}:{}: {e}", path.display(), lineno + 1))?;
        store.insert_bet(&bet)?;
        count += 1;
    }
    Ok(count)
}

fn main() -> Result<(), BoxError> {
    let config_path = std::env::var("WAGER_SCAN_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::path::PathBuf::from("config.json"));
    let config = ScanConfig::load(&config_path);

    StructuredLogger::init(&config.log);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let store = SqliteStore::open(&config.database_path)?;
    info!(database = %config.database_path.display(), "store opened");

    match args.first().map(String::as_str) {
        Some("scan") => {
            let gambler_id: i64 = args.get(1).ok_or(USAGE)?.parse()?;
            let models = Models::load(&config.models)?;
            let report = Scanner::new(&config, models).scan(&store, gambler_id)?;
            StructuredLogger::emit_record("scan_report", &report, &mut std::io::stdout().lock())?;
        }
        Some("jobs") => run_jobs(&config, &store)?,
        Some("daemon") => {
            let interval_secs = config.jobs.interval_secs.max(1);
            info!(interval_secs, "daemon mode (Ctrl+C to stop)");
            static STOP: AtomicBool = AtomicBool::new(false);
            let _ = ctrlc::set_handler(|| {
                STOP.store(true, Ordering::Relaxed);
            });
            let mut cycle: u64 = 0;
            while !STOP.load(Ordering::Relaxed) {
                cycle += 1;
                if let Err(e) = run_jobs(&config, &store) {
                    warn!(cycle, error = %e, "batch cycle failed");
                }
                for _ in 0..interval_secs {
                    if STOP.load(Ordering::Relaxed) {
                        break;
                    }
                    std::thread::sleep(Duration::from_secs(1));
                }
            }
            info!("wager-scan stopping");
        }
        Some("import") => {
            let path = args.get(1).ok_or(USAGE)?;
            let count = import(&store, Path::new(path))?;
            info!(count, file = %path, "bets imported");
        }
        _ => return Err(USAGE.into()),
    }

    Ok(())
}
