// src/ingest/fetch.rs
use std::time::Duration;

use metrics::counter;
use reqwest::Client;

use crate::ingest::error::ExtractError;

/// Exponential backoff with a floor and a cap, applied between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub multiplier: f64,
    pub min_wait: Duration,
    pub max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            multiplier: 1.0,
            min_wait: Duration::from_secs(4),
            max_wait: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Same attempt budget, no sleeping between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            multiplier: 0.0,
            min_wait: Duration::ZERO,
            max_wait: Duration::ZERO,
        }
    }

    /// Wait after the 1-based `attempt` failed: `multiplier * 2^(attempt-1)` seconds,
    /// clamped to `[min_wait, max_wait]`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(62) as i32;
        let secs = (self.multiplier * 2f64.powi(exp)).max(0.0);
        let raw = Duration::try_from_secs_f64(secs).unwrap_or(self.max_wait);
        raw.max(self.min_wait).min(self.max_wait)
    }
}

/// 3xx/4xx/5xx are worth another try, except 404: the resource is gone.
pub fn is_retryable_status(status: u16) -> bool {
    status >= 300 && status != 404
}

/// Status and body of the final attempt. Non-2xx responses are returned,
/// not raised; callers read the payload's own success flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl FetchedResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Result<serde_json::Value, ExtractError> {
        serde_json::from_str(&self.body).map_err(|source| {
            tracing::error!(
                url = %self.url,
                status = self.status,
                body = %self.body,
                error = %source,
                "response body is not JSON"
            );
            ExtractError::InvalidJson {
                url: self.url.clone(),
                source,
            }
        })
    }
}

#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(policy: RetryPolicy) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("currency-monitor/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(20))
            .build()?;
        Ok(Self::with_client(client, policy))
    }

    pub fn with_client(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// GET `url` with query `params`, retrying per the policy.
    pub async fn get(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<FetchedResponse, ExtractError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let outcome = self.send_once(url, params).await;

            let retry = match &outcome {
                Ok(rsp) => is_retryable_status(rsp.status),
                Err(_) => true,
            };
            if !retry || attempt >= max_attempts {
                return outcome.map_err(|source| ExtractError::Transport {
                    url: url.to_string(),
                    attempts: attempt,
                    source,
                });
            }

            let wait = self.policy.backoff(attempt);
            match &outcome {
                Ok(rsp) => tracing::warn!(
                    url,
                    status = rsp.status,
                    attempt,
                    wait_ms = wait.as_millis() as u64,
                    "retrying after unsuccessful status"
                ),
                Err(e) => tracing::warn!(
                    url,
                    error = %e,
                    attempt,
                    wait_ms = wait.as_millis() as u64,
                    "retrying after transport error"
                ),
            }
            counter!("monitor_fetch_retries_total").increment(1);
            tokio::time::sleep(wait).await;
        }
    }

    async fn send_once(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> reqwest::Result<FetchedResponse> {
        let mut req = self.client.get(url);
        if !params.is_empty() {
            req = req.query(params);
        }
        let rsp = req.send().await?;
        let status = rsp.status().as_u16();
        let body = rsp.text().await?;
        Ok(FetchedResponse {
            url: url.to_string(),
            status,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_predicate() {
        assert!(!is_retryable_status(200));
        assert!(!is_retryable_status(204));
        assert!(!is_retryable_status(404));
        assert!(is_retryable_status(300));
        assert!(is_retryable_status(403));
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(500));
    }

    #[test]
    fn default_backoff_is_floored_and_capped() {
        let p = RetryPolicy::default();
        assert_eq!(p.backoff(1), Duration::from_secs(4));
        assert_eq!(p.backoff(2), Duration::from_secs(4));
        assert_eq!(p.backoff(3), Duration::from_secs(4));
        assert_eq!(p.backoff(4), Duration::from_secs(8));
        assert_eq!(p.backoff(5), Duration::from_secs(10));
        assert_eq!(p.backoff(40), Duration::from_secs(10));
    }

    #[test]
    fn immediate_policy_never_waits() {
        let p = RetryPolicy::immediate(3);
        assert_eq!(p.max_attempts, 3);
        assert_eq!(p.backoff(1), Duration::ZERO);
        assert_eq!(p.backoff(7), Duration::ZERO);
    }

    #[test]
    fn invalid_body_is_invalid_json_error() {
        let rsp = FetchedResponse {
            url: "http://x.test".into(),
            status: 200,
            body: "<html>oops</html>".into(),
        };
        assert!(matches!(rsp.json(), Err(ExtractError::InvalidJson { .. })));
    }
}
