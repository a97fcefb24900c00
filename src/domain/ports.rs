use super::account::BankAccount;
use crate::error::StoreError;
use async_trait::async_trait;
use std::io;
use uuid::Uuid;

/// A message as delivered by the queue transport.
///
/// The attempt counter is owned exclusively by the worker for the lifetime of
/// one delivery; a fresh delivery starts at zero. Whether a redelivery carries
/// the counter over or resets it is the transport's decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    pub id: Uuid,
    pub payload: String,
    pub attempts: u32,
}

impl QueueMessage {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload: payload.into(),
            attempts: 0,
        }
    }
}

/// The queue transport, as consumed by the worker.
///
/// The transport guarantees a message is not concurrently delivered to two
/// consumers while it is outstanding; competing worker instances rely on that.
#[async_trait]
pub trait QueueReceiver: Send + Sync {
    /// Non-destructive fetch of the next ready message.
    async fn peek(&self) -> io::Result<Option<QueueMessage>>;
    /// Permanently removes the message. Idempotent against repeats.
    async fn complete(&self, message: &QueueMessage) -> io::Result<()>;
    /// Returns the message for redelivery, incrementing the transport-visible
    /// delivery count.
    async fn abandon(&self, message: &QueueMessage) -> io::Result<()>;
    /// Permanently removes the message to a side channel for manual
    /// inspection.
    async fn move_to_dead_letter(&self, message: &QueueMessage) -> io::Result<()>;
}

/// The persistence collaborator, as consumed by the ledger.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn get(&self, account_id: Uuid) -> Result<Option<BankAccount>, StoreError>;
    /// Conditional update: commits only if the stored version still matches
    /// the incoming account's version, then bumps it. A lost race surfaces as
    /// [`StoreError::VersionConflict`].
    async fn update(&self, account: BankAccount) -> Result<(), StoreError>;
}
