// src/ingest/registry.rs
use std::collections::HashMap;

use crate::ingest::fetch::Fetcher;
use crate::ingest::providers::{
    currency_api::CurrencyApiSource, open_exchange::OpenExchangeSource,
    privatbank::PrivatBankSource,
};
use crate::ingest::types::RateSource;

/// Resource name -> adapter. A miss is the caller's business, not an error.
#[derive(Default)]
pub struct SourceRegistry {
    sources: HashMap<String, Box<dyn RateSource>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The three built-in adapters, re-basing into `base_currency`.
    pub fn with_defaults(
        fetcher: Fetcher,
        base_currency: &str,
        currency_api_key: Option<String>,
    ) -> Self {
        let mut reg = Self::new();
        reg.register(Box::new(PrivatBankSource::new(fetcher.clone())));
        reg.register(Box::new(CurrencyApiSource::new(
            fetcher.clone(),
            base_currency,
            currency_api_key,
        )));
        reg.register(Box::new(OpenExchangeSource::new(fetcher, base_currency)));
        reg
    }

    /// Adds `source` under its own name, replacing any previous adapter.
    pub fn register(&mut self, source: Box<dyn RateSource>) {
        let name = source.name().to_string();
        if self.sources.insert(name.clone(), source).is_some() {
            tracing::debug!(source = %name, "adapter replaced");
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn RateSource> {
        self.sources.get(name).map(|s| s.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        let mut v: Vec<&str> = self.sources.keys().map(String::as_str).collect();
        v.sort_unstable();
        v
    }
}
