// src/ingest/types.rs
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ingest::error::ExtractError;

/// One configured upstream source, as read from the config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub do_notifications: bool,
}

/// Rates keyed by currency code, every value expressed against one base.
pub type RateTable = BTreeMap<String, f64>;

/// `(sale, purchase)`; serialized as a two-element array.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RatePair(pub Option<f64>, pub Option<f64>);

impl RatePair {
    /// Map-oriented sources report one rate; it fills both slots.
    pub fn single(rate: f64) -> Self {
        Self(Some(rate), Some(rate))
    }

    pub fn sale(&self) -> Option<f64> {
        self.0
    }

    pub fn purchase(&self) -> Option<f64> {
        self.1
    }
}

/// Normalized output of one adapter call. An empty record means "nothing to store".
pub type CurrencyRecord = BTreeMap<String, RatePair>;

/// Currencies of interest: upper-cased, deduplicated, order-independent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrencySet(BTreeSet<String>);

impl CurrencySet {
    /// Accepts the config form: codes separated by whitespace.
    pub fn parse(s: &str) -> Self {
        Self::from_codes(s.split_whitespace())
    }

    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = codes
            .into_iter()
            .map(|c| c.as_ref().trim().to_ascii_uppercase())
            .filter(|c| !c.is_empty())
            .collect();
        Self(set)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.contains(code)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for CurrencySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<&str> = self.iter().collect();
        write!(f, "{}", codes.join(" "))
    }
}

#[async_trait::async_trait]
pub trait RateSource: Send + Sync {
    /// Resource name this adapter answers to in the config.
    fn name(&self) -> &'static str;

    /// Fetch the resource and normalize it. `Ok` with an empty record when the
    /// source reports failure; `Err` only for conditions that abort the run.
    async fn extract(
        &self,
        resource: &ResourceDescriptor,
        interest: &CurrencySet,
    ) -> Result<CurrencyRecord, ExtractError>;
}
