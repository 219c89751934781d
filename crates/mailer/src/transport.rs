use reqwest::Client;
use serde::Deserialize;

use crate::{EmailMessage, MailerError};

/// How rendered messages leave the process.
#[derive(Clone, Debug)]
pub enum Transport {
    /// Write every message to the log. Nothing is sent.
    Log,
    /// POST every message as JSON to a mail relay.
    Webhook(WebhookClient),
}

impl Transport {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Webhook(_) => "webhook",
        }
    }

    pub(crate) async fn deliver(&self, message: &EmailMessage) -> Result<(), MailerError> {
        match self {
            Self::Log => {
                tracing::info!(
                    from = %message.from,
                    to = ?message.to,
                    subject = %message.subject,
                    "{}",
                    message.body
                );
                Ok(())
            }
            Self::Webhook(client) => client.post(message).await,
        }
    }
}

#[derive(Clone, Debug)]
pub struct WebhookClient {
    client: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl WebhookClient {
    pub fn new(client: Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }

    async fn post(&self, message: &EmailMessage) -> Result<(), MailerError> {
        let resp = self.client.post(&self.url).json(message).send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let message = match resp.json::<ErrorBody>().await {
            Ok(err) => err.error,
            Err(_) => "relay error".to_string(),
        };
        Err(MailerError::Relay { status, message })
    }
}
