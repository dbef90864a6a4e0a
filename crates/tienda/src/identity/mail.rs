//! Outbound mail as background jobs.
//!
//! Identity flows never send mail inline; they enqueue a job and move
//! on. A single worker task drains the queue, so a slow or failing mail
//! backend cannot stall request handling.

use async_trait::async_trait;
use tokio::sync::mpsc;

/// One outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailRequest {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mail delivery backend.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: MailRequest) -> anyhow::Result<()>;
}

/// Mailer that only logs. The default backend for local development.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: MailRequest) -> anyhow::Result<()> {
        tracing::info!(to = %mail.to, subject = %mail.subject, "mail (log backend)");
        tracing::debug!(body = %mail.body, "mail body");
        Ok(())
    }
}

/// Handle for enqueueing mail jobs.
#[derive(Clone)]
pub struct MailQueue {
    tx: mpsc::UnboundedSender<MailRequest>,
}

impl MailQueue {
    /// Spawns the worker task draining jobs into `mailer`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<M: Mailer + 'static>(mailer: M) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<MailRequest>();
        tokio::spawn(async move {
            while let Some(mail) = rx.recv().await {
                let to = mail.to.clone();
                if let Err(err) = mailer.send(mail).await {
                    tracing::error!(%to, error = %err, "mail delivery failed");
                }
            }
        });
        Self { tx }
    }

    /// Queues a message. Failures to enqueue are logged, not surfaced:
    /// mail is best-effort by design of the identity flows.
    pub fn enqueue(&self, mail: MailRequest) {
        if self.tx.send(mail).is_err() {
            tracing::error!("mail worker has stopped; dropping message");
        }
    }
}
