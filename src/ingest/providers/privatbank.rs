// src/ingest/providers/privatbank.rs
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use serde_json::Value;

use crate::ingest::error::ExtractError;
use crate::ingest::fetch::Fetcher;
use crate::ingest::types::{
    CurrencyRecord, CurrencySet, RatePair, RateSource, ResourceDescriptor,
};

/// PrivatBank archive API: one row per currency, national-bank sale/purchase
/// rates already quoted in UAH.
pub struct PrivatBankSource {
    fetcher: Fetcher,
}

impl PrivatBankSource {
    pub const NAME: &'static str = "PrivatBank";

    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    /// Query for the rates of `date`.
    pub fn request_params(date: NaiveDate) -> Vec<(&'static str, String)> {
        vec![
            ("date", date.format("%d.%m.%Y").to_string()),
            ("json", String::new()),
        ]
    }

    /// Map an `exchangeRate` payload to a record. The first row describes the
    /// base currency itself and is always skipped.
    pub fn parse_payload(payload: &Value, interest: &CurrencySet) -> CurrencyRecord {
        let Some(rows) = payload.get("exchangeRate").and_then(Value::as_array) else {
            tracing::error!(
                source = Self::NAME,
                "payload has no exchangeRate list; returning empty record"
            );
            return CurrencyRecord::new();
        };

        let mut out = CurrencyRecord::new();
        for row in rows.iter().skip(1) {
            let Some(code) = row.get("currency").and_then(Value::as_str) else {
                tracing::warn!(
                    source = Self::NAME,
                    row = %row,
                    "row without currency code skipped"
                );
                continue;
            };
            let code = code.trim().to_ascii_uppercase();
            if !interest.contains(&code) {
                continue;
            }
            let sale = row.get("saleRateNB").and_then(Value::as_f64);
            let purchase = row.get("purchaseRateNB").and_then(Value::as_f64);
            out.insert(code, RatePair(sale, purchase));
        }
        out
    }
}

#[async_trait]
impl RateSource for PrivatBankSource {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn extract(
        &self,
        resource: &ResourceDescriptor,
        interest: &CurrencySet,
    ) -> Result<CurrencyRecord, ExtractError> {
        let params = Self::request_params(Local::now().date_naive());
        tracing::info!(source = Self::NAME, url = %resource.url, "fetching rates");
        let rsp = self.fetcher.get(&resource.url, &params).await?;
        let payload = rsp.json()?;
        Ok(Self::parse_payload(&payload, interest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "exchangeRate": [
                {"currency": "Stub", "saleRateNB": 1, "purchaseRateNB": 1},
                {"currency": "A", "saleRateNB": 1, "purchaseRateNB": 11},
                {"currency": "B", "saleRateNB": 2, "purchaseRateNB": 22},
                {"currency": "C", "saleRateNB": 3, "purchaseRateNB": 33}
            ]
        })
    }

    #[test]
    fn full_interest_set_is_parsed() {
        let out = PrivatBankSource::parse_payload(&payload(), &CurrencySet::parse("A B C"));
        assert_eq!(out.len(), 3);
        assert_eq!(out["A"], RatePair(Some(1.0), Some(11.0)));
        assert_eq!(out["B"], RatePair(Some(2.0), Some(22.0)));
        assert_eq!(out["C"], RatePair(Some(3.0), Some(33.0)));
    }

    #[test]
    fn partial_interest_set_filters() {
        let out = PrivatBankSource::parse_payload(&payload(), &CurrencySet::parse("A D B"));
        assert_eq!(out.len(), 2);
        assert!(out.contains_key("A"));
        assert!(out.contains_key("B"));
    }

    #[test]
    fn first_row_is_skipped_even_when_of_interest() {
        let p = json!({
            "exchangeRate": [
                {"currency": "UAH", "saleRateNB": 1, "purchaseRateNB": 1},
                {"currency": "A", "saleRateNB": 1, "purchaseRateNB": 11}
            ]
        });
        let out = PrivatBankSource::parse_payload(&p, &CurrencySet::parse("UAH A"));
        assert_eq!(out.len(), 1);
        assert_eq!(out["A"], RatePair(Some(1.0), Some(11.0)));
    }

    #[test]
    fn malformed_rows_and_missing_rates() {
        let p = json!({
            "exchangeRate": [
                {"baseCurrency": "UAH"},
                {"saleRateNB": 5, "purchaseRateNB": 6},
                {"currency": "A"},
                "garbage",
                {"currency": "B", "saleRateNB": 2.5}
            ]
        });
        let out = PrivatBankSource::parse_payload(&p, &CurrencySet::parse("A B"));
        assert_eq!(out["A"], RatePair(None, None));
        assert_eq!(out["B"], RatePair(Some(2.5), None));
    }

    #[test]
    fn missing_list_yields_empty_record() {
        let out = PrivatBankSource::parse_payload(&json!({"error": "x"}), &CurrencySet::parse("A"));
        assert!(out.is_empty());
    }

    #[test]
    fn request_params_use_dotted_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let params = PrivatBankSource::request_params(date);
        assert_eq!(params[0], ("date", "07.03.2024".to_string()));
        assert_eq!(params[1], ("json", String::new()));
    }
}
