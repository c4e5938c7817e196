// src/notify/mod.rs
pub mod slack;
pub mod terminal;

use std::sync::Mutex;

use anyhow::Result;

pub use slack::SlackNotifier;
pub use terminal::TerminalNotifier;

pub const APP_TITLE: &str = "CurrencyMonitorApp";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    /// Sinks that support it replace the previous notification with the same id.
    pub group_id: usize,
}

impl Notification {
    pub fn new(subtitle: impl Into<String>, description: impl Into<String>, group_id: usize) -> Self {
        Self {
            title: APP_TITLE.to_string(),
            subtitle: subtitle.into(),
            description: description.into(),
            group_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// The host has no way to show notifications; nothing was sent.
    Unsupported,
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, n: &Notification) -> Result<Delivery>;
    fn name(&self) -> &'static str;
}

/// Stand-in for hosts without a notification channel.
pub struct UnsupportedNotifier {
    platform: &'static str,
}

impl UnsupportedNotifier {
    pub fn new(platform: &'static str) -> Self {
        Self { platform }
    }
}

#[async_trait::async_trait]
impl Notifier for UnsupportedNotifier {
    async fn notify(&self, n: &Notification) -> Result<Delivery> {
        tracing::debug!(platform = self.platform, group = n.group_id, "notification dropped");
        Ok(Delivery::Unsupported)
    }

    fn name(&self) -> &'static str {
        "unsupported"
    }
}

/// Pick a sink for this host:
/// 1) Slack when `SLACK_WEBHOOK_URL` is set
/// 2) `terminal-notifier` on macOS
/// 3) otherwise the unsupported sink
pub fn select_for_host() -> Box<dyn Notifier> {
    if let Ok(url) = std::env::var(slack::WEBHOOK_ENV) {
        if !url.trim().is_empty() {
            return Box::new(SlackNotifier::new(url));
        }
    }
    match std::env::consts::OS {
        "macos" => Box::new(TerminalNotifier::default()),
        other => Box::new(UnsupportedNotifier::new(other)),
    }
}

// --- Test helper ---
/// Records every notification it is handed.
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Notification>>,
    delivery: Delivery,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::answering(Delivery::Sent)
    }

    pub fn answering(delivery: Delivery) -> Self {
        Self {
            sent: Mutex::new(vec![]),
            delivery,
        }
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, n: &Notification) -> Result<Delivery> {
        if let Ok(mut v) = self.sent.lock() {
            v.push(n.clone());
        }
        Ok(self.delivery)
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
