use crate::domain::account::BankAccount;
use crate::domain::ports::{AccountStore, QueueMessage, QueueReceiver};
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A thread-safe in-memory account store with optimistic concurrency.
///
/// Uses `Arc<RwLock<HashMap<Uuid, BankAccount>>>` to allow shared concurrent
/// access. An update commits only if the stored version still matches the
/// incoming account's version, and bumps it on commit.
#[derive(Default, Clone)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<HashMap<Uuid, BankAccount>>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an account as-is, bypassing the version check.
    pub async fn seed(&self, account: BankAccount) {
        let mut accounts = self.accounts.write().await;
        accounts.insert(account.id, account);
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn get(&self, account_id: Uuid) -> Result<Option<BankAccount>, StoreError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&account_id).cloned())
    }

    async fn update(&self, mut account: BankAccount) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().await;
        let current = accounts
            .get(&account.id)
            .ok_or_else(|| StoreError::Other(format!("account vanished: {}", account.id)))?;
        if current.version != account.version {
            return Err(StoreError::VersionConflict);
        }
        account.version += 1;
        accounts.insert(account.id, account);
        Ok(())
    }
}

/// An in-memory queue transport for the demo host and tests.
///
/// `peek` is non-destructive: the message stays at the head until it is
/// completed, abandoned, or dead-lettered. Abandon re-enqueues at the tail as
/// a fresh delivery (attempt counter reset) and bumps the delivery count.
#[derive(Default)]
pub struct InMemoryQueue {
    inner: Arc<RwLock<QueueState>>,
}

#[derive(Default)]
struct QueueState {
    ready: VecDeque<QueueMessage>,
    dead_letter: Vec<QueueMessage>,
    delivery_counts: HashMap<Uuid, u32>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn enqueue(&self, message: QueueMessage) {
        let mut state = self.inner.write().await;
        state.delivery_counts.entry(message.id).or_insert(1);
        state.ready.push_back(message);
    }

    pub async fn dead_letter_ids(&self) -> Vec<Uuid> {
        let state = self.inner.read().await;
        state.dead_letter.iter().map(|m| m.id).collect()
    }

    pub async fn ready_len(&self) -> usize {
        let state = self.inner.read().await;
        state.ready.len()
    }

    pub async fn delivery_count(&self, id: Uuid) -> u32 {
        let state = self.inner.read().await;
        state.delivery_counts.get(&id).copied().unwrap_or(0)
    }
}

#[async_trait]
impl QueueReceiver for InMemoryQueue {
    async fn peek(&self) -> io::Result<Option<QueueMessage>> {
        let state = self.inner.read().await;
        Ok(state.ready.front().cloned())
    }

    async fn complete(&self, message: &QueueMessage) -> io::Result<()> {
        let mut state = self.inner.write().await;
        state.ready.retain(|m| m.id != message.id);
        Ok(())
    }

    async fn abandon(&self, message: &QueueMessage) -> io::Result<()> {
        let mut state = self.inner.write().await;
        if let Some(pos) = state.ready.iter().position(|m| m.id == message.id)
            && let Some(mut released) = state.ready.remove(pos)
        {
            released.attempts = 0;
            *state.delivery_counts.entry(released.id).or_insert(0) += 1;
            state.ready.push_back(released);
        }
        Ok(())
    }

    async fn move_to_dead_letter(&self, message: &QueueMessage) -> io::Result<()> {
        let mut state = self.inner.write().await;
        if let Some(pos) = state.ready.iter().position(|m| m.id == message.id)
            && let Some(removed) = state.ready.remove(pos)
        {
            state.dead_letter.push(removed);
        }
        Ok(())
    }
}
