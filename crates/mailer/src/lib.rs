//! Email delivery for engine notifications.
//!
//! [`Mailer`] implements [`engine::Notifier`]. `send` never blocks: the
//! notification is pushed onto an unbounded queue, and a worker task renders
//! it into an [`EmailMessage`] and hands it to the configured [`Transport`].
//! Delivery failures are logged by the worker and never reach the engine.

use std::sync::Arc;

use engine::{Notification, Notifier};
use tokio::{sync::mpsc, task::JoinHandle};

pub use error::MailerError;
pub use message::{EXPENSE_SUBJECT, EmailMessage, WEEKLY_SUBJECT, render};
pub use transport::{Transport, WebhookClient};

mod error;
mod message;
mod transport;

const DEFAULT_FROM: &str = "noreply@splitledger.local";
const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// Queue-backed [`Notifier`]. Cloning shares the same queue and worker.
#[derive(Clone, Debug)]
pub struct Mailer {
    queue: mpsc::UnboundedSender<Notification>,
}

impl Mailer {
    pub fn builder() -> MailerBuilder {
        MailerBuilder::default()
    }
}

impl Notifier for Mailer {
    fn send(&self, notification: Notification) {
        if let Err(err) = self.queue.send(notification) {
            tracing::warn!("mail worker is gone, dropping notification: {:?}", err.0);
        }
    }
}

/// The builder for `Mailer`
#[derive(Debug, Default)]
pub struct MailerBuilder {
    transport: Option<Transport>,
    from: Option<String>,
    currency_symbol: Option<String>,
}

impl MailerBuilder {
    /// Where rendered messages go. Defaults to [`Transport::Log`].
    pub fn transport(mut self, transport: Transport) -> MailerBuilder {
        self.transport = Some(transport);
        self
    }

    /// Sender address put on every message.
    pub fn from(mut self, from: &str) -> MailerBuilder {
        self.from = Some(from.to_string());
        self
    }

    pub fn currency_symbol(mut self, symbol: &str) -> MailerBuilder {
        self.currency_symbol = Some(symbol.to_string());
        self
    }

    /// Start the worker on the current tokio runtime.
    ///
    /// The worker stops once every clone of the returned `Mailer` is dropped
    /// and the queue is drained.
    pub fn spawn(self) -> (Mailer, JoinHandle<()>) {
        let (queue, receiver) = mpsc::unbounded_channel();
        let worker = Worker {
            transport: self.transport.unwrap_or(Transport::Log),
            from: self.from.unwrap_or_else(|| DEFAULT_FROM.to_string()),
            currency_symbol: self
                .currency_symbol
                .unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string()),
        };
        let handle = tokio::spawn(worker.run(receiver));
        (Mailer { queue }, handle)
    }

    /// Same as [`MailerBuilder::spawn`], erased to the engine trait.
    pub fn spawn_notifier(self) -> (Arc<dyn Notifier>, JoinHandle<()>) {
        let (mailer, handle) = self.spawn();
        (Arc::new(mailer), handle)
    }
}

struct Worker {
    transport: Transport,
    from: String,
    currency_symbol: String,
}

impl Worker {
    async fn run(self, mut receiver: mpsc::UnboundedReceiver<Notification>) {
        tracing::info!(transport = self.transport.name(), "mail worker started");
        while let Some(notification) = receiver.recv().await {
            let message = render(&notification, &self.from, &self.currency_symbol);
            match self.transport.deliver(&message).await {
                Ok(()) => tracing::debug!(to = ?message.to, subject = %message.subject, "mail delivered"),
                Err(err) => tracing::error!(to = ?message.to, "mail delivery failed: {err}"),
            }
        }
        tracing::info!("mail worker stopped");
    }
}
