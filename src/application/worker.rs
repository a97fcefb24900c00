use crate::application::ledger::Ledger;
use crate::application::shutdown::ShutdownToken;
use crate::config::WorkerConfig;
use crate::domain::ports::{QueueMessage, QueueReceiver};
use crate::domain::transaction::Transaction;
use crate::error::Failure;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

const ERROR_RECOVERY_SLEEP: Duration = Duration::from_secs(1);

/// The consumer loop: peek, validate, apply, then acknowledge, retry, or
/// dead-letter.
///
/// One instance processes messages strictly one at a time; multiple instances
/// may compete on the same queue. Every delivery ends in exactly one of
/// complete, abandon, or dead-letter, or is left untouched for the transport
/// to redeliver when shutdown interrupts a wait.
pub struct MessageWorker {
    queue: Arc<dyn QueueReceiver>,
    ledger: Ledger,
    config: WorkerConfig,
}

impl MessageWorker {
    pub fn new(queue: Arc<dyn QueueReceiver>, ledger: Ledger, config: WorkerConfig) -> Self {
        Self {
            queue,
            ledger,
            config,
        }
    }

    /// Runs until shutdown is signalled. Transport errors never escape the
    /// loop; they are logged and followed by a short recovery wait.
    pub async fn run(&self, mut shutdown: ShutdownToken) {
        info!("worker started");
        loop {
            if shutdown.is_shutdown() {
                break;
            }
            if let Err(e) = self.process_one_by_one(&mut shutdown).await {
                error!(error = %e, "queue transport error");
                tokio::select! {
                    _ = sleep(ERROR_RECOVERY_SLEEP) => {}
                    _ = shutdown.wait() => break,
                }
            }
        }
        info!("worker stopped");
    }

    /// Processes at most one message, resolving it fully before returning.
    ///
    /// The idle path issues no collaborator call other than the single peek;
    /// it waits out the poll interval (or shutdown) and returns.
    pub async fn process_one_by_one(&self, shutdown: &mut ShutdownToken) -> io::Result<()> {
        let Some(mut message) = self.queue.peek().await? else {
            tokio::select! {
                _ = sleep(self.config.poll_interval) => {}
                _ = shutdown.wait() => {}
            }
            return Ok(());
        };

        info!(message_id = %message.id, "processing message");
        match self.attempt(&message).await {
            Ok(()) => {
                self.queue.complete(&message).await?;
                info!(message_id = %message.id, "message processed successfully");
            }
            Err(Failure::Permanent(reason)) => {
                warn!(message_id = %message.id, %reason, "permanent failure, dead-lettering");
                self.queue.move_to_dead_letter(&message).await?;
            }
            Err(Failure::Retryable(reason)) => {
                warn!(message_id = %message.id, %reason, "retryable failure");
                self.retry(&mut message, shutdown).await?;
            }
        }
        Ok(())
    }

    /// One validate-and-apply pass over the message payload.
    async fn attempt(&self, message: &QueueMessage) -> Result<(), Failure> {
        let tx = Transaction::parse(&message.payload)?;
        self.ledger.apply(&tx).await
    }

    /// Bounded retry: one backoff wait and re-attempt per remaining schedule
    /// slot, then exactly one resolution. The loop never re-enters after
    /// abandoning.
    async fn retry(&self, message: &mut QueueMessage, shutdown: &mut ShutdownToken) -> io::Result<()> {
        while let Some(delay) = self.config.retry_schedule.delay(message.attempts) {
            info!(
                message_id = %message.id,
                attempt = message.attempts + 1,
                delay_secs = delay.as_secs(),
                "scheduling retry"
            );
            tokio::select! {
                _ = sleep(delay) => {}
                _ = shutdown.wait() => {
                    // Leave the message with the queue; a cancelled wait must
                    // not acknowledge anything.
                    info!(message_id = %message.id, "shutdown during backoff, leaving message for redelivery");
                    return Ok(());
                }
            }
            message.attempts += 1;

            match self.attempt(message).await {
                Ok(()) => {
                    self.queue.complete(message).await?;
                    info!(message_id = %message.id, "message processed successfully after retry");
                    return Ok(());
                }
                Err(Failure::Permanent(reason)) => {
                    // Classification can change between attempts; honor the
                    // latest one.
                    warn!(message_id = %message.id, %reason, "permanent failure on retry, dead-lettering");
                    self.queue.move_to_dead_letter(message).await?;
                    return Ok(());
                }
                Err(Failure::Retryable(reason)) => {
                    warn!(
                        message_id = %message.id,
                        attempt = message.attempts,
                        %reason,
                        "retry attempt failed"
                    );
                }
            }
        }

        // Local retries exhausted; the transport's redelivery takes over.
        self.queue.abandon(message).await?;
        warn!(message_id = %message.id, "retries exhausted, message abandoned");
        Ok(())
    }
}
