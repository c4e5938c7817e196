// src/config/monitor.rs
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;

use crate::ingest::store::JsonlStore;
use crate::ingest::types::{CurrencySet, ResourceDescriptor};

pub const ENV_CONFIG_PATH: &str = "CURRENCY_MONITOR_CONFIG";
pub const DEFAULT_TOML_PATH: &str = "config/currency_monitor.toml";
pub const DEFAULT_JSON_PATH: &str = "config/currency_monitor.json";
pub const DEFAULT_NOTIFICATION_LIMIT: usize = 3;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MonitorConfig {
    /// Currency every map-oriented source is re-based into.
    pub base_currency: String,
    /// Whitespace-separated codes, e.g. "USD EUR PLN".
    pub main_currencies: String,
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Processed in file order.
    pub resources: Vec<ResourceDescriptor>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct NotificationsConfig {
    pub resource_limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    pub path: Option<PathBuf>,
}

impl MonitorConfig {
    pub fn currencies_of_interest(&self) -> CurrencySet {
        CurrencySet::parse(&self.main_currencies)
    }

    pub fn notification_limit(&self) -> usize {
        self.notifications
            .resource_limit
            .unwrap_or(DEFAULT_NOTIFICATION_LIMIT)
    }

    pub fn storage_path(&self) -> PathBuf {
        self.storage
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(JsonlStore::DEFAULT_PATH))
    }

    fn validate(mut self) -> Result<Self> {
        self.base_currency = self.base_currency.trim().to_ascii_uppercase();
        if self.base_currency.is_empty() {
            bail!("base_currency must not be empty");
        }

        let mut seen = HashSet::new();
        for r in &mut self.resources {
            r.name = r.name.trim().to_string();
            if r.name.is_empty() {
                bail!("resource with url {} has an empty name", r.url);
            }
            if !seen.insert(r.name.clone()) {
                bail!("resource {} is configured more than once", r.name);
            }
        }
        Ok(self)
    }
}

/// Load and validate a config file. `.toml` is parsed as TOML, anything else
/// is tried as JSON first and TOML second.
pub fn load_from(path: &Path) -> Result<MonitorConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let cfg = parse(&content, ext.as_str())
        .with_context(|| format!("parsing config {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        resources = cfg.resources.len(),
        base = %cfg.base_currency,
        "config loaded"
    );
    Ok(cfg)
}

pub fn parse(s: &str, hint_ext: &str) -> Result<MonitorConfig> {
    let cfg: MonitorConfig = match hint_ext {
        "toml" => toml::from_str(s)?,
        "json" => serde_json::from_str(s)?,
        _ => match serde_json::from_str(s) {
            Ok(v) => v,
            Err(json_err) => toml::from_str(s)
                .map_err(|toml_err| anyhow!("neither JSON ({json_err}) nor TOML ({toml_err})"))?,
        },
    };
    cfg.validate()
}

/// `--config_path <p>` or `--config_path=<p>` from the program arguments.
pub fn config_path_from_args<I, S>(args: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        let arg = arg.as_ref();
        if arg == "--config_path" {
            return it
                .next()
                .map(|v| PathBuf::from(v.as_ref()))
                .filter(|p| !p.as_os_str().is_empty());
        }
        if let Some(v) = arg.strip_prefix("--config_path=") {
            if !v.is_empty() {
                return Some(PathBuf::from(v));
            }
        }
    }
    None
}

/// Resolve the config file:
/// 1) explicit path (must exist)
/// 2) $CURRENCY_MONITOR_CONFIG (must exist)
/// 3) config/currency_monitor.toml
/// 4) config/currency_monitor.json
pub fn resolve_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(p) = explicit {
        if p.exists() {
            return Ok(p);
        }
        bail!("config file {} does not exist", p.display());
    }
    tracing::warn!("no --config_path given; trying defaults");

    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return Ok(pb);
        }
        bail!("{ENV_CONFIG_PATH} points to non-existent path {}", pb.display());
    }
    for candidate in [DEFAULT_TOML_PATH, DEFAULT_JSON_PATH] {
        let pb = PathBuf::from(candidate);
        if pb.exists() {
            return Ok(pb);
        }
    }
    tracing::error!("no configuration file found");
    Err(anyhow!("no configuration file found"))
}
