use crate::domain::account::Amount;
use crate::error::Failure;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use uuid::Uuid;

/// The two recognized operation kinds. Matching is case-sensitive against the
/// wire literals `"Credit"` and `"Debit"`; near-misses are rejected.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum OperationKind {
    Credit,
    Debit,
}

/// A validated transaction event, parsed from a queue message payload.
///
/// Immutable value object; created per processing attempt and discarded after
/// the attempt.
#[derive(Debug, PartialEq, Clone)]
pub struct Transaction {
    pub id: String,
    pub kind: OperationKind,
    pub account_id: Uuid,
    pub amount: Amount,
}

/// Raw wire shape. Field names are lower-camel-case on the wire; the amount
/// stays a decimal string so it round-trips without precision loss.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    id: String,
    message_type: String,
    bank_account_id: Uuid,
    amount: String,
}

impl Transaction {
    /// Parses and validates a raw message payload.
    ///
    /// Pure function of its input. Every rejection is a permanent failure:
    /// a payload that does not parse today will not parse tomorrow.
    pub fn parse(payload: &str) -> Result<Self, Failure> {
        let raw: RawEvent = serde_json::from_str(payload)
            .map_err(|e| Failure::permanent(format!("malformed payload: {e}")))?;

        let kind = match raw.message_type.as_str() {
            "Credit" => OperationKind::Credit,
            "Debit" => OperationKind::Debit,
            other => {
                return Err(Failure::permanent(format!(
                    "unrecognized operation kind: {other:?}"
                )));
            }
        };

        let amount = Decimal::from_str(&raw.amount)
            .map_err(|e| Failure::permanent(format!("invalid amount: {e}")))?;
        let amount = Amount::new(amount)?;

        Ok(Self {
            id: raw.id,
            kind,
            account_id: raw.bank_account_id,
            amount,
        })
    }
}
