// src/ingest/providers/currency_api.rs
use async_trait::async_trait;
use serde_json::Value;

use super::{numeric_rates, rebased_record};
use crate::ingest::error::ExtractError;
use crate::ingest::fetch::Fetcher;
use crate::ingest::types::{CurrencyRecord, CurrencySet, RateSource, ResourceDescriptor};

pub const API_KEY_ENV: &str = "CURRENCY_API_KEY";

/// currencyapi.net: `{valid, base, rates: {CODE: rate}}`, quoted against `base`.
pub struct CurrencyApiSource {
    fetcher: Fetcher,
    target_base: String,
    api_key: Option<String>,
}

impl CurrencyApiSource {
    pub const NAME: &'static str = "CurrencyAPI";

    pub fn new(fetcher: Fetcher, target_base: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            fetcher,
            target_base: target_base.into(),
            api_key,
        }
    }

    pub fn parse_payload(
        payload: &Value,
        target_base: &str,
        interest: &CurrencySet,
    ) -> Result<CurrencyRecord, ExtractError> {
        if payload.get("valid").and_then(Value::as_bool) != Some(true) {
            tracing::error!(
                source = Self::NAME,
                "response not marked valid; returning empty record"
            );
            return Ok(CurrencyRecord::new());
        }

        let base = payload.get("base").and_then(Value::as_str);
        let rates = payload.get("rates").and_then(Value::as_object);
        let (Some(base), Some(rates)) = (base, rates) else {
            tracing::error!(
                source = Self::NAME,
                "valid response without base or rates; returning empty record"
            );
            return Ok(CurrencyRecord::new());
        };

        let table = numeric_rates(Self::NAME, rates);
        rebased_record(Self::NAME, base, target_base, &table, interest)
    }
}

#[async_trait]
impl RateSource for CurrencyApiSource {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn extract(
        &self,
        resource: &ResourceDescriptor,
        interest: &CurrencySet,
    ) -> Result<CurrencyRecord, ExtractError> {
        let params = vec![("key", self.api_key.clone().unwrap_or_default())];
        tracing::info!(source = Self::NAME, url = %resource.url, "fetching rates");
        let rsp = self.fetcher.get(&resource.url, &params).await?;
        let payload = rsp.json()?;
        Self::parse_payload(&payload, &self.target_base, interest)
    }
}
