#![allow(dead_code)]

use async_trait::async_trait;
use banking_event_receiver::application::ledger::Ledger;
use banking_event_receiver::application::worker::MessageWorker;
use banking_event_receiver::config::{RetrySchedule, WorkerConfig};
use banking_event_receiver::domain::account::BankAccount;
use banking_event_receiver::domain::ports::{AccountStore, QueueMessage, QueueReceiver};
use banking_event_receiver::error::StoreError;
use banking_event_receiver::infrastructure::in_memory::InMemoryAccountStore;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Queue double that records every collaborator call.
#[derive(Default)]
pub struct RecordingQueue {
    ready: Mutex<VecDeque<QueueMessage>>,
    pub peeks: AtomicUsize,
    completed: Mutex<Vec<Uuid>>,
    abandoned: Mutex<Vec<Uuid>>,
    dead_lettered: Mutex<Vec<Uuid>>,
}

impl RecordingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, message: QueueMessage) {
        self.ready.lock().await.push_back(message);
    }

    pub async fn ready_len(&self) -> usize {
        self.ready.lock().await.len()
    }

    pub async fn completed(&self) -> Vec<Uuid> {
        self.completed.lock().await.clone()
    }

    pub async fn abandoned(&self) -> Vec<Uuid> {
        self.abandoned.lock().await.clone()
    }

    pub async fn dead_lettered(&self) -> Vec<Uuid> {
        self.dead_lettered.lock().await.clone()
    }
}

#[async_trait]
impl QueueReceiver for RecordingQueue {
    async fn peek(&self) -> io::Result<Option<QueueMessage>> {
        self.peeks.fetch_add(1, Ordering::SeqCst);
        Ok(self.ready.lock().await.front().cloned())
    }

    async fn complete(&self, message: &QueueMessage) -> io::Result<()> {
        self.ready.lock().await.retain(|m| m.id != message.id);
        self.completed.lock().await.push(message.id);
        Ok(())
    }

    async fn abandon(&self, message: &QueueMessage) -> io::Result<()> {
        self.ready.lock().await.retain(|m| m.id != message.id);
        self.abandoned.lock().await.push(message.id);
        Ok(())
    }

    async fn move_to_dead_letter(&self, message: &QueueMessage) -> io::Result<()> {
        self.ready.lock().await.retain(|m| m.id != message.id);
        self.dead_lettered.lock().await.push(message.id);
        Ok(())
    }
}

/// Account store double: delegates to an in-memory store, counts lookups, and
/// can be primed to fail commits with a scripted error sequence.
#[derive(Default)]
pub struct ScriptedStore {
    pub inner: InMemoryAccountStore,
    pub get_calls: AtomicUsize,
    update_errors: Mutex<VecDeque<StoreError>>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, account: BankAccount) {
        self.inner.seed(account).await;
    }

    /// Queues errors returned by the next `update` calls, in order.
    pub async fn fail_updates_with(&self, errors: impl IntoIterator<Item = StoreError>) {
        self.update_errors.lock().await.extend(errors);
    }

    pub async fn conflict_next_updates(&self, n: usize) {
        self.fail_updates_with((0..n).map(|_| StoreError::VersionConflict))
            .await;
    }
}

#[async_trait]
impl AccountStore for ScriptedStore {
    async fn get(&self, account_id: Uuid) -> Result<Option<BankAccount>, StoreError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get(account_id).await
    }

    async fn update(&self, account: BankAccount) -> Result<(), StoreError> {
        if let Some(err) = self.update_errors.lock().await.pop_front() {
            return Err(err);
        }
        self.inner.update(account).await
    }
}

pub fn worker_with_schedule(
    queue: Arc<RecordingQueue>,
    store: Arc<ScriptedStore>,
    delays_secs: &[u64],
) -> MessageWorker {
    let config = WorkerConfig {
        retry_schedule: RetrySchedule::from_secs(delays_secs),
        poll_interval: Duration::from_secs(10),
    };
    MessageWorker::new(queue, Ledger::new(store), config)
}

pub fn credit_payload(account_id: Uuid, amount: &str) -> String {
    payload("Credit", account_id, amount)
}

pub fn debit_payload(account_id: Uuid, amount: &str) -> String {
    payload("Debit", account_id, amount)
}

fn payload(message_type: &str, account_id: Uuid, amount: &str) -> String {
    format!(
        r#"{{ "id": "{}", "messageType": "{message_type}", "bankAccountId": "{account_id}", "amount": "{amount}" }}"#,
        Uuid::new_v4()
    )
}
