// src/ingest/error.rs
use thiserror::Error;

/// Conditions that abort a pipeline run. Recoverable problems (source-side
/// failure flags, malformed rows) never surface here; adapters log them and
/// return an empty record instead.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("response from {url} is not valid JSON: {source}")]
    InvalidJson {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot find new base currency {new_base} in rates based on {current_base}")]
    MissingBase {
        current_base: String,
        new_base: String,
    },

    #[error("request to {url} failed after {attempts} attempt(s): {source}")]
    Transport {
        url: String,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },
}
