//! Delivery to a Slack incoming webhook. One POST per message, no retries.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::blocks::DigestMessage;
use crate::error::SlackError;

/// Client for a single incoming-webhook URL.
pub struct SlackWebhook {
    client: Client,
    url: Url,
}

/// What happened to one message of a multi-message publish.
#[derive(Debug)]
pub struct PublishOutcome {
    /// Position of the message in the rendered digest.
    pub index: usize,
    pub ad_ids: Vec<String>,
    pub result: Result<(), SlackError>,
}

impl PublishOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

impl SlackWebhook {
    /// # Errors
    ///
    /// Returns [`SlackError::InvalidWebhookUrl`] unless `url` is an absolute
    /// http(s) URL, or [`SlackError::Http`] if the `reqwest::Client` cannot be
    /// constructed.
    pub fn new(url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, SlackError> {
        let url = Url::parse(url.trim()).map_err(|e| SlackError::InvalidWebhookUrl {
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SlackError::InvalidWebhookUrl {
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client, url })
    }

    /// Posts one message.
    ///
    /// # Errors
    ///
    /// - [`SlackError::Http`] on network failure or timeout.
    /// - [`SlackError::UnexpectedStatus`] on a non-2xx response, carrying
    ///   Slack's reason text.
    pub async fn publish(&self, message: &DigestMessage) -> Result<(), SlackError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = match response.text().await {
            Ok(text) => text.trim().to_string(),
            Err(e) => format!("<unreadable body: {}>", e.without_url()),
        };
        Err(SlackError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        })
    }

    /// Posts every message in order, pausing `delay` between consecutive
    /// posts. A failed message is logged and does not stop the rest.
    pub async fn publish_all(
        &self,
        messages: &[DigestMessage],
        delay: Duration,
    ) -> Vec<PublishOutcome> {
        let mut outcomes = Vec::with_capacity(messages.len());
        for (index, message) in messages.iter().enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let result = self.publish(message).await;
            match &result {
                Ok(()) => tracing::info!(
                    message = index + 1,
                    total = messages.len(),
                    blocks = message.blocks.len(),
                    "digest message published"
                ),
                Err(e) => tracing::warn!(
                    message = index + 1,
                    total = messages.len(),
                    error = %e,
                    "digest message failed to publish"
                ),
            }
            outcomes.push(PublishOutcome {
                index,
                ad_ids: message.ad_ids.clone(),
                result,
            });
        }
        outcomes
    }
}
