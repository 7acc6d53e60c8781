use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::AppError;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivery of one transition announcement. The monitor supplies the
/// destination reference, the message text and the raw watcher ids; the
/// sink owns whatever mention syntax its platform wants.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(
        &self,
        destination: &str,
        text: &str,
        mention_targets: &[String],
    ) -> Result<(), AppError>;
}

/// Posts announcements to a Discord webhook; the configured destination
/// is the webhook URL.
pub struct DiscordWebhook {
    client: Client,
}

impl DiscordWebhook {
    pub fn new() -> Result<Self, AppError> {
        let client = Client::builder().timeout(WEBHOOK_TIMEOUT).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl NotificationSink for DiscordWebhook {
    async fn notify(
        &self,
        destination: &str,
        text: &str,
        mention_targets: &[String],
    ) -> Result<(), AppError> {
        let ping: String = mention_targets
            .iter()
            .map(|user| format!("<@{}>", user))
            .collect();
        let content = format!("{}\n{}", text, ping);

        self.client
            .post(destination)
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

/// Swallows announcements; stands in when no delivery platform is wired.
pub struct NoopSink;

#[async_trait]
impl NotificationSink for NoopSink {
    async fn notify(
        &self,
        _destination: &str,
        _text: &str,
        _mention_targets: &[String],
    ) -> Result<(), AppError> {
        Ok(())
    }
}
