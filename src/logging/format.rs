//! Log output for scans and batch jobs.
//!
//! Diagnostics go to stderr through `tracing`; each line carries the fields
//! of the enclosing `scan` span, so every event inside a scan is tagged with
//! its gambler id. Reports go to stdout as tagged ndjson records.

use crate::config::LogConfig;
use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use std::io::Write;
use tracing::Span;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub struct StructuredLogger;

impl StructuredLogger {
    /// Install the global subscriber. `RUST_LOG` overrides `config.level`.
    pub fn init(config: &LogConfig) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
        let registry = tracing_subscriber::registry().with(filter);
        let base = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false);
        if config.json {
            registry
                .with(base.json().with_current_span(true).with_span_list(false))
                .init();
        } else {
            registry.with(base).init();
        }
    }

    /// Span wrapping one gambler scan.
    pub fn scan_span(gambler_id: i64) -> Span {
        tracing::info_span!("scan", gambler_id)
    }

    /// Write `body` as one ndjson line, tagged with `kind` and the emit time.
    pub fn emit_record<T: Serialize>(
        kind: &str,
        body: &T,
        w: &mut impl Write,
    ) -> std::io::Result<()> {
        let record = Record {
            kind,
            emitted_at: Utc::now().trunc_subsecs(3),
            body,
        };
        let line = serde_json::to_string(&record)?;
        writeln!(w, "{line}")
    }
}

#[derive(Serialize)]
struct Record<'a, T> {
    kind: &'a str,
    emitted_at: DateTime<Utc>,
    #[serde(flatten)]
    body: &'a T,
}
