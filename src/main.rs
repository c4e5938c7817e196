//! Currency monitor: binary entrypoint.
//! Loads the config, then runs the rate pipeline once, or every `RUN_RATE`
//! seconds when that variable is set.

use std::time::Duration;

use anyhow::{Context, Result};
use currency_monitor::config::monitor::{config_path_from_args, resolve_path};
use currency_monitor::MonitorRuntime;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const ENV_RUN_RATE: &str = "RUN_RATE";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("currency_monitor=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

/// `RUN_RATE` in seconds; unset or `0` means a single run.
fn run_rate() -> Result<Option<Duration>> {
    match std::env::var(ENV_RUN_RATE) {
        Ok(v) => {
            let secs: u64 = v
                .trim()
                .parse()
                .with_context(|| format!("{ENV_RUN_RATE} must be whole seconds, got {v:?}"))?;
            Ok((secs > 0).then(|| Duration::from_secs(secs)))
        }
        Err(_) => Ok(None),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev (CURRENCY_API_KEY, SLACK_WEBHOOK_URL, ...).
    let _ = dotenvy::dotenv();
    init_tracing();
    info!("currency monitor has started");

    let path = resolve_path(config_path_from_args(std::env::args().skip(1)))?;
    let mut runtime = MonitorRuntime::from_path(&path)?;
    let period = run_rate()?;

    let Some(period) = period else {
        tokio::select! {
            res = runtime.run_once() => {
                let report = res.context("cannot continue processing")?;
                info!(summary = %report.summary(), "run complete");
            }
            _ = tokio::signal::ctrl_c() => warn!("interrupted"),
        }
        return Ok(());
    };

    info!(every_secs = period.as_secs(), "periodic mode");
    let mut ticker = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                warn!("interrupted");
                return Ok(());
            }
        }
        if let Err(e) = runtime.reload(&path) {
            error!(path = %path.display(), error = %format!("{e:#}"), "config reload failed; keeping previous");
        }
        tokio::select! {
            res = runtime.run_once() => match res {
                Ok(report) => info!(summary = %report.summary(), "run complete"),
                Err(e) => error!(error = %e, "run aborted; waiting for next tick"),
            },
            _ = tokio::signal::ctrl_c() => {
                warn!("interrupted");
                return Ok(());
            }
        }
    }
}
