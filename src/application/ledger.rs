use crate::domain::ports::AccountStore;
use crate::domain::transaction::{OperationKind, Transaction};
use crate::error::{Failure, StoreError};
use std::sync::Arc;
use tracing::{error, warn};

/// Applies validated transactions to bank accounts.
///
/// The ledger owns failure classification for the persistence side: a version
/// conflict or an I/O error may succeed on a later attempt, everything else is
/// permanent. Unknown failures default to permanent so a broken message cannot
/// retry forever.
pub struct Ledger {
    store: Arc<dyn AccountStore>,
}

impl Ledger {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Looks up the account, adjusts the balance, and commits atomically.
    ///
    /// On success the account's balance and version are durably changed
    /// exactly once for this call. Insufficient funds aborts before any
    /// mutation.
    pub async fn apply(&self, tx: &Transaction) -> Result<(), Failure> {
        let mut account = self
            .store
            .get(tx.account_id)
            .await
            .map_err(classify_store_error)?
            .ok_or_else(|| {
                // Retrying cannot create a missing account.
                error!(account_id = %tx.account_id, "bank account not found");
                Failure::permanent(format!("account not found: {}", tx.account_id))
            })?;

        match tx.kind {
            OperationKind::Credit => account.credit(tx.amount),
            OperationKind::Debit => account.debit(tx.amount).inspect_err(|_| {
                warn!(
                    account_id = %tx.account_id,
                    amount = %tx.amount.value(),
                    "insufficient funds for debit"
                );
            })?,
        }

        self.store
            .update(account)
            .await
            .map_err(classify_store_error)
    }
}

fn classify_store_error(err: StoreError) -> Failure {
    match err {
        StoreError::VersionConflict => {
            warn!("concurrency conflict while updating account balance");
            Failure::retryable("concurrency conflict")
        }
        StoreError::Io(e) => {
            warn!(error = %e, "persistence error while updating account balance");
            Failure::retryable(format!("persistence error: {e}"))
        }
        StoreError::Other(e) => {
            error!(error = %e, "unexpected error while applying transaction");
            Failure::permanent(format!("unexpected error: {e}"))
        }
    }
}
