// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod config;
pub mod ingest;
pub mod notify;
pub mod runtime;

// ---- Re-exports for stable public API ----
pub use crate::ingest::error::ExtractError;
pub use crate::ingest::rebase::rebase;
pub use crate::ingest::types::{CurrencyRecord, CurrencySet, RatePair, RateSource, ResourceDescriptor};
pub use crate::ingest::{run_once, PipelineSettings, RunReport};
pub use crate::notify::{Delivery, Notification, Notifier};
pub use crate::runtime::MonitorRuntime;
