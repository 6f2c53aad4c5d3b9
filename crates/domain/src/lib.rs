//! Domain layer for the order fulfillment pipeline.
//!
//! This crate provides the validated [`Order`] input record together with
//! the value objects the pipeline computes with:
//! - [`Money`] amounts held in integer cents
//! - [`DiscountRate`] fractions held in basis points
//! - [`Weight`] held in grams

pub mod order;

pub use order::{
    DiscountRate, Money, Order, OrderBuilder, OrderError, ProductId, WEIGHT_PER_UNIT, Weight,
};
