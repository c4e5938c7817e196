// src/ingest/providers/open_exchange.rs
use async_trait::async_trait;
use serde_json::Value;

use super::{numeric_rates, rebased_record};
use crate::ingest::error::ExtractError;
use crate::ingest::fetch::Fetcher;
use crate::ingest::types::{CurrencyRecord, CurrencySet, RateSource, ResourceDescriptor};

/// open.er-api.com: `{result: "success", base_code, rates}`; no key needed.
pub struct OpenExchangeSource {
    fetcher: Fetcher,
    target_base: String,
}

impl OpenExchangeSource {
    pub const NAME: &'static str = "OpenExchangeRateAPI";

    pub fn new(fetcher: Fetcher, target_base: impl Into<String>) -> Self {
        Self {
            fetcher,
            target_base: target_base.into(),
        }
    }

    pub fn parse_payload(
        payload: &Value,
        target_base: &str,
        interest: &CurrencySet,
    ) -> Result<CurrencyRecord, ExtractError> {
        if payload.get("result").and_then(Value::as_str) != Some("success") {
            tracing::error!(
                source = Self::NAME,
                result = ?payload.get("result"),
                "unsuccessful response; returning empty record"
            );
            return Ok(CurrencyRecord::new());
        }

        let base = payload.get("base_code").and_then(Value::as_str);
        let rates = payload.get("rates").and_then(Value::as_object);
        let (Some(base), Some(rates)) = (base, rates) else {
            tracing::error!(
                source = Self::NAME,
                "successful response without base_code or rates; returning empty record"
            );
            return Ok(CurrencyRecord::new());
        };

        let table = numeric_rates(Self::NAME, rates);
        rebased_record(Self::NAME, base, target_base, &table, interest)
    }
}

#[async_trait]
impl RateSource for OpenExchangeSource {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn extract(
        &self,
        resource: &ResourceDescriptor,
        interest: &CurrencySet,
    ) -> Result<CurrencyRecord, ExtractError> {
        tracing::info!(source = Self::NAME, url = %resource.url, "fetching rates");
        let rsp = self.fetcher.get(&resource.url, &[]).await?;
        let payload = rsp.json()?;
        Self::parse_payload(&payload, &self.target_base, interest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::RatePair;
    use serde_json::json;

    #[test]
    fn failed_result_is_empty() {
        let out = OpenExchangeSource::parse_payload(
            &json!({"result": "fail"}),
            "UAH",
            &CurrencySet::parse("A D B"),
        )
        .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn output_keys_stay_within_interest() {
        let p = json!({
            "result": "success",
            "base_code": "USD",
            "rates": {"USD": 1, "UAH": 41.25, "EUR": 0.92, "PLN": 3.96, "GBP": 0.79, "odd": "x"}
        });
        let interest = CurrencySet::parse("EUR PLN CHF");
        let out = OpenExchangeSource::parse_payload(&p, "UAH", &interest).unwrap();
        assert!(out.keys().all(|k| interest.contains(k)));
        assert_eq!(out.len(), 2);
        assert_eq!(out["EUR"], RatePair::single(44.837));
        assert_eq!(out["PLN"], RatePair::single(10.4167));
    }

    #[test]
    fn zero_rate_is_skipped_not_stored_as_infinity() {
        let p = json!({
            "result": "success",
            "base_code": "USD",
            "rates": {"USD": 1, "UAH": 41.0, "XYZ": 0}
        });
        let out =
            OpenExchangeSource::parse_payload(&p, "UAH", &CurrencySet::parse("XYZ")).unwrap();
        assert!(out.is_empty());
    }
}
