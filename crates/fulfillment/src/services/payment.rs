//! Payment gateway trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use common::TransactionId;
use domain::Money;

use crate::error::{PipelineError, Result};

/// Card payment processing.
pub trait PaymentGateway: Send + Sync {
    /// Opens a transaction for `amount` and returns its ID.
    fn initialize_transaction(&self, amount: Money) -> Result<TransactionId>;

    /// Returns true if the card number and verification code are acceptable.
    fn validate_card(&self, card_number: &str, cvv: &str) -> Result<bool>;

    /// Charges the card against an open transaction. Returns false if declined.
    fn process_payment(&self, transaction_id: &TransactionId, card_number: &str) -> Result<bool>;

    /// Voids or refunds the transaction.
    fn rollback_transaction(&self, transaction_id: &TransactionId) -> Result<()>;
}

/// Lifecycle of a gateway transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionStatus {
    Initialized,
    Charged,
    Declined,
    RolledBack,
}

#[derive(Debug, Clone)]
struct TransactionRecord {
    amount: Money,
    status: TransactionStatus,
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    transactions: HashMap<TransactionId, TransactionRecord>,
    next_id: u32,
    reject_cards: bool,
    decline_charges: bool,
    rollback_calls: usize,
}

/// In-memory payment gateway for tests and demos.
///
/// Cards are accepted when the number has 13 to 19 digits and the
/// verification code has 3 or 4 digits.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl InMemoryPaymentGateway {
    /// Creates a new in-memory payment gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to reject every card.
    pub fn set_reject_cards(&self, reject: bool) {
        self.state.write().unwrap().reject_cards = reject;
    }

    /// Configures the gateway to decline every charge.
    pub fn set_decline_charges(&self, decline: bool) {
        self.state.write().unwrap().decline_charges = decline;
    }

    /// Returns the number of transactions opened.
    pub fn transaction_count(&self) -> usize {
        self.state.read().unwrap().transactions.len()
    }

    /// Returns the number of transactions that were charged and not rolled back.
    pub fn charged_count(&self) -> usize {
        self.state
            .read()
            .unwrap()
            .transactions
            .values()
            .filter(|t| t.status == TransactionStatus::Charged)
            .count()
    }

    /// Returns the number of rollbacks performed.
    pub fn rollback_count(&self) -> usize {
        self.state.read().unwrap().rollback_calls
    }

    /// Returns the status of a transaction.
    pub fn status(&self, transaction_id: &TransactionId) -> Option<TransactionStatus> {
        self.state
            .read()
            .unwrap()
            .transactions
            .get(transaction_id)
            .map(|t| t.status)
    }

    /// Returns the amount a transaction was opened for.
    pub fn amount(&self, transaction_id: &TransactionId) -> Option<Money> {
        self.state
            .read()
            .unwrap()
            .transactions
            .get(transaction_id)
            .map(|t| t.amount)
    }
}

fn all_digits(value: &str, lengths: std::ops::RangeInclusive<usize>) -> bool {
    lengths.contains(&value.len()) && value.bytes().all(|b| b.is_ascii_digit())
}

impl PaymentGateway for InMemoryPaymentGateway {
    fn initialize_transaction(&self, amount: Money) -> Result<TransactionId> {
        if amount.is_negative() {
            return Err(PipelineError::Payment(format!(
                "Cannot open a transaction for {amount}"
            )));
        }

        let mut state = self.state.write().unwrap();
        state.next_id += 1;
        let transaction_id = TransactionId::new(format!("TXN-{:04}", state.next_id));
        state.transactions.insert(
            transaction_id.clone(),
            TransactionRecord {
                amount,
                status: TransactionStatus::Initialized,
            },
        );

        Ok(transaction_id)
    }

    fn validate_card(&self, card_number: &str, cvv: &str) -> Result<bool> {
        if self.state.read().unwrap().reject_cards {
            return Ok(false);
        }
        Ok(all_digits(card_number, 13..=19) && all_digits(cvv, 3..=4))
    }

    fn process_payment(&self, transaction_id: &TransactionId, _card_number: &str) -> Result<bool> {
        let mut state = self.state.write().unwrap();
        let decline = state.decline_charges;

        let record = state.transactions.get_mut(transaction_id).ok_or_else(|| {
            PipelineError::Payment(format!("Unknown transaction {transaction_id}"))
        })?;

        if record.status != TransactionStatus::Initialized {
            return Err(PipelineError::Payment(format!(
                "Transaction {transaction_id} is not open"
            )));
        }

        if decline {
            record.status = TransactionStatus::Declined;
            return Ok(false);
        }

        record.status = TransactionStatus::Charged;
        Ok(true)
    }

    fn rollback_transaction(&self, transaction_id: &TransactionId) -> Result<()> {
        let mut state = self.state.write().unwrap();

        let record = state.transactions.get_mut(transaction_id).ok_or_else(|| {
            PipelineError::Payment(format!("Unknown transaction {transaction_id}"))
        })?;

        if record.status == TransactionStatus::RolledBack {
            return Err(PipelineError::Payment(format!(
                "Transaction {transaction_id} already rolled back"
            )));
        }

        record.status = TransactionStatus::RolledBack;
        state.rollback_calls += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charge_and_rollback() {
        let gateway = InMemoryPaymentGateway::new();
        let txn = gateway
            .initialize_transaction(Money::from_cents(5000))
            .unwrap();
        assert_eq!(txn.as_str(), "TXN-0001");
        assert_eq!(gateway.status(&txn), Some(TransactionStatus::Initialized));

        assert!(gateway.process_payment(&txn, "1234567890123456").unwrap());
        assert_eq!(gateway.charged_count(), 1);

        gateway.rollback_transaction(&txn).unwrap();
        assert_eq!(gateway.status(&txn), Some(TransactionStatus::RolledBack));
        assert_eq!(gateway.charged_count(), 0);
        assert_eq!(gateway.rollback_count(), 1);
    }

    #[test]
    fn test_card_validation() {
        let gateway = InMemoryPaymentGateway::new();
        assert!(gateway.validate_card("1234567890123456", "123").unwrap());
        assert!(!gateway.validate_card("1234", "123").unwrap());
        assert!(!gateway.validate_card("1234567890123456", "12a").unwrap());

        gateway.set_reject_cards(true);
        assert!(!gateway.validate_card("1234567890123456", "123").unwrap());
    }

    #[test]
    fn test_declined_charge() {
        let gateway = InMemoryPaymentGateway::new();
        gateway.set_decline_charges(true);

        let txn = gateway.initialize_transaction(Money::from_cents(100)).unwrap();
        assert!(!gateway.process_payment(&txn, "1234567890123456").unwrap());
        assert_eq!(gateway.status(&txn), Some(TransactionStatus::Declined));
    }

    #[test]
    fn test_charge_unknown_transaction_fails() {
        let gateway = InMemoryPaymentGateway::new();
        let result = gateway.process_payment(&TransactionId::new("TXN-9999"), "4111");
        assert!(matches!(result, Err(PipelineError::Payment(_))));
    }

    #[test]
    fn test_double_rollback_fails() {
        let gateway = InMemoryPaymentGateway::new();
        let txn = gateway.initialize_transaction(Money::from_cents(100)).unwrap();
        gateway.rollback_transaction(&txn).unwrap();
        assert!(gateway.rollback_transaction(&txn).is_err());
        assert_eq!(gateway.rollback_count(), 1);
    }

    #[test]
    fn test_sequential_transaction_ids() {
        let gateway = InMemoryPaymentGateway::new();
        let t1 = gateway.initialize_transaction(Money::zero()).unwrap();
        let t2 = gateway.initialize_transaction(Money::zero()).unwrap();
        assert_eq!(t1.as_str(), "TXN-0001");
        assert_eq!(t2.as_str(), "TXN-0002");
        assert_eq!(gateway.amount(&t2), Some(Money::zero()));
    }
}
