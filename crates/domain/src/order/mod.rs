//! Order input record and related types.

mod record;
mod value_objects;

pub use record::{Order, OrderBuilder};
pub use value_objects::{DiscountRate, Money, ProductId, WEIGHT_PER_UNIT, Weight};

use thiserror::Error;

/// Errors that can occur while building or validating an order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// A required field was not supplied or was blank.
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    /// Invalid quantity.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// Invalid price.
    #[error("Invalid price: {price} (must not be negative)")]
    InvalidPrice { price: i64 },

    /// `quantity * unit_price` does not fit in the money range.
    #[error("Order subtotal overflows: {quantity} x {unit_price} cents")]
    SubtotalOverflow { quantity: u32, unit_price: i64 },

    /// Discount rate outside of 0..=100%.
    #[error("Invalid discount rate: {basis_points} basis points (must be at most 10000)")]
    InvalidDiscountRate { basis_points: u32 },
}
