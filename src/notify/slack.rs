use anyhow::{Context, Result};
use reqwest::Client;

use super::{Delivery, Notification, Notifier};

pub const WEBHOOK_ENV: &str = "SLACK_WEBHOOK_URL";

pub struct SlackNotifier {
    webhook_url: String,
    client: Client,
}

impl SlackNotifier {
    pub fn new(url: String) -> Self {
        Self {
            webhook_url: url,
            client: Client::new(),
        }
    }

    fn render(n: &Notification) -> String {
        format!("*{}* | {}\n{}", n.title, n.subtitle, n.description.trim_end())
    }
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    async fn notify(&self, n: &Notification) -> Result<Delivery> {
        // Slack has no replace-by-group; the id only goes to the log.
        let body = serde_json::json!({ "text": Self::render(n) });
        self.client
            .post(&self.webhook_url)
            .json(&body)
            .send()
            .await
            .context("slack post")?
            .error_for_status()
            .context("slack non-2xx")?;
        tracing::info!(group = n.group_id, subtitle = %n.subtitle, "slack notification sent");
        Ok(Delivery::Sent)
    }

    fn name(&self) -> &'static str {
        "slack"
    }
}
