// src/runtime.rs
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::MonitorConfig;
use crate::ingest::error::ExtractError;
use crate::ingest::fetch::{Fetcher, RetryPolicy};
use crate::ingest::providers::currency_api::API_KEY_ENV;
use crate::ingest::registry::SourceRegistry;
use crate::ingest::store::{JsonlStore, RecordStore};
use crate::ingest::types::{CurrencySet, ResourceDescriptor};
use crate::ingest::{self, PipelineSettings, RunReport};
use crate::notify::{self, Notifier};

/// Everything one pipeline run needs, built once from the config.
pub struct MonitorRuntime {
    pub resources: Vec<ResourceDescriptor>,
    pub interest: CurrencySet,
    pub registry: SourceRegistry,
    pub store: Box<dyn RecordStore>,
    pub notifier: Box<dyn Notifier>,
    pub settings: PipelineSettings,
}

impl MonitorRuntime {
    pub fn from_path(path: &Path) -> Result<Self> {
        let cfg = crate::config::load_from(path)?;
        Self::from_config(&cfg)
    }

    /// Re-read `path` so config edits apply to the next run. On error the
    /// current wiring is left untouched.
    pub fn reload(&mut self, path: &Path) -> Result<()> {
        *self = Self::from_path(path)?;
        info!(path = %path.display(), resources = self.resources.len(), "config reloaded");
        Ok(())
    }

    /// Default wiring: built-in adapters, JSON-lines store, host notifier.
    pub fn from_config(cfg: &MonitorConfig) -> Result<Self> {
        let fetcher = Fetcher::new(RetryPolicy::default()).context("building HTTP client")?;
        let api_key = std::env::var(API_KEY_ENV).ok();
        // Safe diagnostics: only whether the key is present
        info!(
            base = %cfg.base_currency,
            currencies = %cfg.currencies_of_interest(),
            api_key_set = api_key.is_some(),
            "building runtime"
        );
        let registry = SourceRegistry::with_defaults(fetcher, &cfg.base_currency, api_key);
        tracing::debug!(sources = ?registry.names(), "adapters registered");
        let store = Box::new(JsonlStore::new(cfg.storage_path()));
        let notifier = notify::select_for_host();
        info!(sink = notifier.name(), limit = cfg.notification_limit(), "notifier selected");

        Ok(Self::with_parts(cfg, registry, store, notifier))
    }

    /// Wire explicit collaborators, e.g. stub sources or an in-memory store.
    pub fn with_parts(
        cfg: &MonitorConfig,
        registry: SourceRegistry,
        store: Box<dyn RecordStore>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            resources: cfg.resources.clone(),
            interest: cfg.currencies_of_interest(),
            registry,
            store,
            notifier,
            settings: PipelineSettings {
                notification_limit: cfg.notification_limit(),
            },
        }
    }

    pub async fn run_once(&self) -> Result<RunReport, ExtractError> {
        ingest::run_once(
            &self.resources,
            &self.interest,
            &self.registry,
            self.store.as_ref(),
            self.notifier.as_ref(),
            self.settings,
        )
        .await
    }
}
