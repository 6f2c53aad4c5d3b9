//! Notification service trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use common::{LabelId, OrderId, TransactionId};

use crate::error::{PipelineError, Result};

/// Customer-facing messages sent once an order completes.
pub trait NotificationService: Send + Sync {
    fn send_order_confirmation(&self, email: &str, order_id: &OrderId) -> Result<()>;

    fn send_payment_receipt(&self, email: &str, transaction_id: &TransactionId) -> Result<()>;

    fn send_shipping_notification(&self, email: &str, label_id: &LabelId) -> Result<()>;
}

/// A message recorded by [`InMemoryNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    OrderConfirmation { email: String, order_id: OrderId },
    PaymentReceipt {
        email: String,
        transaction_id: TransactionId,
    },
    ShippingNotification { email: String, label_id: LabelId },
}

#[derive(Debug, Default)]
struct InMemoryNotifierState {
    sent: Vec<Notification>,
    fail_on_send: bool,
}

/// In-memory notifier that records every message instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotifier {
    state: Arc<RwLock<InMemoryNotifierState>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to fail on every send.
    pub fn set_fail_on_send(&self, fail: bool) {
        self.state.write().unwrap().fail_on_send = fail;
    }

    /// Returns the messages sent so far, in order.
    pub fn sent(&self) -> Vec<Notification> {
        self.state.read().unwrap().sent.clone()
    }

    pub fn sent_count(&self) -> usize {
        self.state.read().unwrap().sent.len()
    }

    fn record(&self, notification: Notification) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_send {
            return Err(PipelineError::Notification("Mail relay unavailable".to_string()));
        }
        state.sent.push(notification);
        Ok(())
    }
}

impl NotificationService for InMemoryNotifier {
    fn send_order_confirmation(&self, email: &str, order_id: &OrderId) -> Result<()> {
        self.record(Notification::OrderConfirmation {
            email: email.to_string(),
            order_id: order_id.clone(),
        })
    }

    fn send_payment_receipt(&self, email: &str, transaction_id: &TransactionId) -> Result<()> {
        self.record(Notification::PaymentReceipt {
            email: email.to_string(),
            transaction_id: transaction_id.clone(),
        })
    }

    fn send_shipping_notification(&self, email: &str, label_id: &LabelId) -> Result<()> {
        self.record(Notification::ShippingNotification {
            email: email.to_string(),
            label_id: label_id.clone(),
        })
    }
}
