// src/ingest/providers/mod.rs
pub mod currency_api;
pub mod open_exchange;
pub mod privatbank;

use serde_json::Value;

use crate::ingest::error::ExtractError;
use crate::ingest::rebase::rebase;
use crate::ingest::types::{CurrencyRecord, CurrencySet, RatePair, RateTable};

/// Collect the usable entries of a `{CODE: rate}` object. Entries that are not
/// numbers, or not strictly positive and finite, are dropped with a warning.
pub(crate) fn numeric_rates(source: &str, rates: &serde_json::Map<String, Value>) -> RateTable {
    let mut out = RateTable::new();
    for (code, v) in rates {
        match v.as_f64() {
            Some(rate) if rate.is_finite() && rate > 0.0 => {
                out.insert(code.to_ascii_uppercase(), rate);
            }
            Some(rate) => {
                tracing::warn!(source, code = %code, rate, "non-positive rate skipped");
            }
            None => {
                tracing::warn!(source, code = %code, value = %v, "non-numeric rate skipped");
            }
        }
    }
    out
}

/// Shared tail of the map-oriented sources: re-base to `target_base`, keep the
/// currencies of interest, duplicate each rate into both slots.
pub(crate) fn rebased_record(
    source: &str,
    current_base: &str,
    target_base: &str,
    rates: &RateTable,
    interest: &CurrencySet,
) -> Result<CurrencyRecord, ExtractError> {
    let rebased = rebase(current_base, target_base, rates)?;
    let record: CurrencyRecord = rebased
        .into_iter()
        .filter(|(code, _)| interest.contains(code))
        .map(|(code, rate)| (code, RatePair::single(rate)))
        .collect();
    tracing::debug!(source, currencies = record.len(), "rates normalized");
    Ok(record)
}
