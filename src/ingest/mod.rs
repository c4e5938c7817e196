// src/ingest/mod.rs
pub mod error;
pub mod fetch;
pub mod providers;
pub mod rebase;
pub mod registry;
pub mod store;
pub mod types;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;

use crate::config::monitor::DEFAULT_NOTIFICATION_LIMIT;
use crate::ingest::error::ExtractError;
use crate::ingest::registry::SourceRegistry;
use crate::ingest::store::{RecordStore, StoredRecord};
use crate::ingest::types::{CurrencyRecord, CurrencySet, ResourceDescriptor};
use crate::notify::{Delivery, Notification, Notifier};

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("monitor_resources_total", "Resources visited by the pipeline.");
        describe_counter!(
            "monitor_resources_skipped_total",
            "Resources skipped: no adapter or no data."
        );
        describe_counter!(
            "monitor_store_failures_total",
            "Records the store refused to persist."
        );
        describe_counter!(
            "monitor_fetch_retries_total",
            "HTTP attempts repeated after a retryable outcome."
        );
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Only resources at 1-based positions up to this value may notify.
    pub notification_limit: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            notification_limit: DEFAULT_NOTIFICATION_LIMIT,
        }
    }
}

/// Outcome of one pass over the configured resources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Records the store accepted.
    pub successes: usize,
    /// Resources configured for this run.
    pub total: usize,
    /// 1-based position of the last resource that produced data (0 if none).
    pub last_index: usize,
}

impl RunReport {
    pub fn summary(&self) -> String {
        format!("{}/{} resources successfully parsed", self.successes, self.total)
    }
}

/// A resource notifies when its own flag is on and it sits within the limit.
pub fn should_notify(resource: &ResourceDescriptor, position: usize, limit: usize) -> bool {
    resource.do_notifications && position <= limit
}

/// `"CODE: [Sale: X.XX, Purchase: Y.YY]"`, one line per currency.
pub fn describe_record(record: &CurrencyRecord) -> String {
    fn fmt_rate(v: Option<f64>) -> String {
        v.map(|x| format!("{x:.2}")).unwrap_or_else(|| "n/a".to_string())
    }

    let mut out = String::new();
    for (code, pair) in record {
        out.push_str(&format!(
            "{code}: [Sale: {}, Purchase: {}]\n",
            fmt_rate(pair.sale()),
            fmt_rate(pair.purchase())
        ));
    }
    out
}

async fn send_notification(notifier: &dyn Notifier, n: &Notification) {
    match notifier.notify(n).await {
        Ok(Delivery::Sent) => {}
        Ok(Delivery::Unsupported) => {
            tracing::warn!(sink = notifier.name(), "notifications are not supported on this system");
        }
        Err(e) => {
            tracing::warn!(sink = notifier.name(), error = ?e, group = n.group_id, "notification failed");
        }
    }
}

/// Run the pipeline once over `resources`, in order:
/// extract -> store -> notify (when eligible), then one summary notification.
///
/// Returns early with the first fatal extraction error; every other problem
/// only skips the resource at hand.
pub async fn run_once(
    resources: &[ResourceDescriptor],
    interest: &CurrencySet,
    registry: &SourceRegistry,
    store: &dyn RecordStore,
    notifier: &dyn Notifier,
    settings: PipelineSettings,
) -> Result<RunReport, ExtractError> {
    ensure_metrics_described();

    let mut report = RunReport {
        total: resources.len(),
        ..RunReport::default()
    };
    tracing::info!(
        resources = report.total,
        limit = settings.notification_limit,
        "pipeline run started"
    );

    for (idx, resource) in resources.iter().enumerate() {
        let position = idx + 1;
        counter!("monitor_resources_total").increment(1);
        tracing::info!(resource = %resource.name, position, "updating currency data");

        let Some(source) = registry.get(&resource.name) else {
            tracing::error!(resource = %resource.name, "no adapter registered; resource skipped");
            counter!("monitor_resources_skipped_total").increment(1);
            continue;
        };

        let record = source.extract(resource, interest).await?;
        if record.is_empty() {
            tracing::error!(resource = %resource.name, "no currency data; resource skipped");
            counter!("monitor_resources_skipped_total").increment(1);
            continue;
        }

        let payload = StoredRecord::now(&resource.name, record);
        tracing::info!(resource = %resource.name, payload = ?payload, "storing record");
        if store.insert(&payload).await {
            report.successes += 1;
        } else {
            tracing::error!(resource = %resource.name, "store rejected record");
            counter!("monitor_store_failures_total").increment(1);
        }

        if should_notify(resource, position, settings.notification_limit) {
            tracing::info!(resource = %resource.name, "sending notification");
            let n = Notification::new(
                format!("Source: {}", resource.name),
                describe_record(&payload.currencies),
                position,
            );
            send_notification(notifier, &n).await;
        }

        report.last_index = position;
    }

    // One slot past the last resource banner.
    let summary = Notification::new("Service Report", report.summary(), report.last_index + 1);
    send_notification(notifier, &summary).await;

    tracing::info!(
        successes = report.successes,
        total = report.total,
        last_index = report.last_index,
        "pipeline run finished"
    );
    Ok(report)
}
