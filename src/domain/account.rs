use crate::error::Failure;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub, SubAssign};
use uuid::Uuid;

/// Represents a monetary balance with exact decimal precision.
///
/// This is a wrapper around `rust_decimal::Decimal` to enforce domain-specific
/// rules and provide type safety for financial calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

/// Represents a positive monetary amount for transactions.
///
/// Ensures that transaction amounts are always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, Failure> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(Failure::permanent("invalid amount: must be positive"))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = Failure;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Balance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Balance {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Balance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Balance {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

/// A bank account row as held by the persistence collaborator.
///
/// The `version` field is the optimistic-concurrency token: every committed
/// update bumps it, and a conditional update against a stale version is
/// rejected by the store. The balance is only ever mutated inside
/// [`Ledger::apply`](crate::application::ledger::Ledger::apply).
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct BankAccount {
    pub id: Uuid,
    pub balance: Balance,
    pub version: u64,
}

impl BankAccount {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            balance: Balance::ZERO,
            version: 0,
        }
    }

    pub fn with_balance(id: Uuid, balance: Balance) -> Self {
        Self {
            id,
            balance,
            version: 0,
        }
    }

    /// Credits the amount onto the balance.
    pub fn credit(&mut self, amount: Amount) {
        self.balance += amount.into();
    }

    /// Debits the amount if the balance covers it.
    ///
    /// Insufficient funds is permanent: the balance will not retroactively
    /// become sufficient for this transaction, so retrying cannot help.
    pub fn debit(&mut self, amount: Amount) -> Result<(), Failure> {
        let amount: Balance = amount.into();
        if self.balance >= amount {
            self.balance -= amount;
            Ok(())
        } else {
            Err(Failure::permanent("insufficient funds"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_balance_arithmetic() {
        let b1 = Balance::new(dec!(10.0));
        let b2 = Balance::new(dec!(5.0));
        assert_eq!(b1 + b2, Balance::new(dec!(15.0)));
        assert_eq!(b1 - b2, Balance::new(dec!(5.0)));
    }

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(dec!(1.0)).is_ok());
        assert!(matches!(
            Amount::new(dec!(0.0)),
            Err(Failure::Permanent(_))
        ));
        assert!(matches!(
            Amount::new(dec!(-1.0)),
            Err(Failure::Permanent(_))
        ));
    }

    #[test]
    fn test_account_credit() {
        let mut account = BankAccount::new(Uuid::new_v4());
        account.credit(Amount::new(dec!(10.5)).unwrap());
        assert_eq!(account.balance, Balance::new(dec!(10.5)));
    }

    #[test]
    fn test_account_debit_sufficient() {
        let mut account = BankAccount::with_balance(Uuid::new_v4(), Balance::new(dec!(10.0)));
        let result = account.debit(Amount::new(dec!(4.0)).unwrap());
        assert!(result.is_ok());
        assert_eq!(account.balance, Balance::new(dec!(6.0)));
    }

    #[test]
    fn test_account_debit_insufficient() {
        let mut account = BankAccount::with_balance(Uuid::new_v4(), Balance::new(dec!(10.0)));
        let result = account.debit(Amount::new(dec!(11.0)).unwrap());
        assert_eq!(
            result,
            Err(Failure::permanent("insufficient funds"))
        );
        // Aborted before any mutation
        assert_eq!(account.balance, Balance::new(dec!(10.0)));
    }

    #[test]
    fn test_debit_exact_balance() {
        let mut account = BankAccount::with_balance(Uuid::new_v4(), Balance::new(dec!(10.0)));
        assert!(account.debit(Amount::new(dec!(10.0)).unwrap()).is_ok());
        assert_eq!(account.balance, Balance::ZERO);
    }
}
