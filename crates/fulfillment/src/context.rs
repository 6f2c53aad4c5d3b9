//! Mutable state threaded through a single pipeline run.

use common::{LabelId, OrderId, TransactionId};
use domain::{Money, Order};
use serde::Serialize;

use crate::error::{PipelineError, Result};

/// Shared state for one pipeline run.
///
/// Created once per order, mutated by each stage on the way in and out, and
/// dropped when the run finishes. Identifiers are `None` until the stage that
/// produces them has executed; reading one early yields
/// [`PipelineError::ContextNotReady`].
#[derive(Debug, Clone)]
pub struct OrderContext {
    order: Order,
    discount: Money,
    shipping_cost: Money,
    transaction_id: Option<TransactionId>,
    order_id: Option<OrderId>,
    label_id: Option<LabelId>,
}

impl OrderContext {
    /// Creates a fresh context for `order`.
    pub fn new(order: Order) -> Self {
        Self {
            order,
            discount: Money::zero(),
            shipping_cost: Money::zero(),
            transaction_id: None,
            order_id: None,
            label_id: None,
        }
    }

    /// Returns the order being processed.
    pub fn order(&self) -> &Order {
        &self.order
    }

    /// Returns `quantity * unit_price`.
    pub fn subtotal(&self) -> Money {
        self.order.subtotal()
    }

    pub fn discount(&self) -> Money {
        self.discount
    }

    pub fn set_discount(&mut self, discount: Money) {
        self.discount = discount;
    }

    pub fn shipping_cost(&self) -> Money {
        self.shipping_cost
    }

    pub fn set_shipping_cost(&mut self, cost: Money) {
        self.shipping_cost = cost;
    }

    /// Returns `subtotal - discount + shipping_cost`.
    pub fn total(&self) -> Money {
        self.subtotal() - self.discount + self.shipping_cost
    }

    pub fn transaction_id(&self) -> Result<&TransactionId> {
        self.transaction_id
            .as_ref()
            .ok_or(PipelineError::ContextNotReady {
                field: "transaction_id",
            })
    }

    pub fn set_transaction_id(&mut self, id: TransactionId) {
        self.transaction_id = Some(id);
    }

    pub fn order_id(&self) -> Result<&OrderId> {
        self.order_id
            .as_ref()
            .ok_or(PipelineError::ContextNotReady { field: "order_id" })
    }

    pub fn set_order_id(&mut self, id: OrderId) {
        self.order_id = Some(id);
    }

    pub fn label_id(&self) -> Result<&LabelId> {
        self.label_id
            .as_ref()
            .ok_or(PipelineError::ContextNotReady { field: "label_id" })
    }

    pub fn set_label_id(&mut self, id: LabelId) {
        self.label_id = Some(id);
    }

    /// Snapshots a completed run.
    ///
    /// Fails if any of the identifiers has not been assigned yet.
    pub fn summary(&self) -> Result<OrderSummary> {
        Ok(OrderSummary {
            order_id: self.order_id()?.clone(),
            transaction_id: self.transaction_id()?.clone(),
            label_id: self.label_id()?.clone(),
            customer_email: self.order.customer_email().to_string(),
            subtotal: self.subtotal(),
            discount: self.discount,
            shipping_cost: self.shipping_cost,
            total: self.total(),
        })
    }
}

/// Outcome of a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub order_id: OrderId,
    pub transaction_id: TransactionId,
    pub label_id: LabelId,
    pub customer_email: String,
    pub subtotal: Money,
    pub discount: Money,
    pub shipping_cost: Money,
    pub total: Money,
}
