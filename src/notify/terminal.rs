// src/notify/terminal.rs
use anyhow::{anyhow, Context, Result};
use tokio::process::Command;

use super::{Delivery, Notification, Notifier};

/// macOS banner via the `terminal-notifier` utility. `-group` makes a new
/// banner replace the previous one with the same id.
#[derive(Debug, Clone)]
pub struct TerminalNotifier {
    program: String,
    sound: String,
}

impl Default for TerminalNotifier {
    fn default() -> Self {
        Self {
            program: "terminal-notifier".to_string(),
            sound: "default".to_string(),
        }
    }
}

impl TerminalNotifier {
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_sound(mut self, sound: impl Into<String>) -> Self {
        self.sound = sound.into();
        self
    }

    pub fn args(&self, n: &Notification) -> Vec<String> {
        vec![
            "-title".into(),
            n.title.clone(),
            "-subtitle".into(),
            n.subtitle.clone(),
            "-message".into(),
            n.description.clone(),
            "-group".into(),
            n.group_id.to_string(),
            "-sound".into(),
            self.sound.clone(),
        ]
    }
}

#[async_trait::async_trait]
impl Notifier for TerminalNotifier {
    async fn notify(&self, n: &Notification) -> Result<Delivery> {
        let status = Command::new(&self.program)
            .args(self.args(n))
            .status()
            .await
            .with_context(|| format!("spawning {}", self.program))?;
        tracing::info!(
            program = %self.program,
            group = n.group_id,
            status = ?status.code(),
            "terminal notification sent"
        );
        if !status.success() {
            return Err(anyhow!("{} exited with {status}", self.program));
        }
        Ok(Delivery::Sent)
    }

    fn name(&self) -> &'static str {
        "terminal-notifier"
    }
}
