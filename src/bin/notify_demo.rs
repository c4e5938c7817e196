//! Demo that pushes a fake rate banner and a report through the host notifier
//! (logs "not supported" when the host has none).

use currency_monitor::ingest::describe_record;
use currency_monitor::notify::{self, Delivery, Notification};
use currency_monitor::{CurrencyRecord, RatePair};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();
    let sink = notify::select_for_host();

    let mut rec = CurrencyRecord::new();
    rec.insert("USD".into(), RatePair(Some(41.25), Some(40.8)));
    rec.insert("EUR".into(), RatePair(Some(44.9), Some(44.1)));

    let seq = [
        Notification::new("Source: Demo", describe_record(&rec), 1),
        Notification::new("Service Report", "1/1 resources successfully parsed", 2),
    ];

    for n in &seq {
        match sink.notify(n).await {
            Ok(Delivery::Sent) => tracing::info!(group = n.group_id, "sent"),
            Ok(Delivery::Unsupported) => tracing::warn!(sink = sink.name(), "not supported here"),
            Err(e) => tracing::warn!(error = ?e, "notify failed"),
        }
        tokio::time::sleep(std::time::Duration::from_millis(400)).await;
    }

    println!("notify-demo done");
}
