//! Shared types used across the fulfillment workspace.

mod types;

pub use types::{LabelId, OrderId, TransactionId};
