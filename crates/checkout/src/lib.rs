//! Command-line driver for the order fulfillment pipeline.
//!
//! Loads one order (the built-in demo order or a JSON file), wires the
//! in-memory collaborators according to the configured scenario, runs the
//! order through the pipeline once, and renders the outcome.

pub mod config;
pub mod error;

use std::sync::Arc;

use domain::{DiscountRate, Money, Order};
use fulfillment::{
    InMemoryCoupons, InMemoryInventory, InMemoryServices, OrderSummary, Pipeline, SystemClock,
};

pub use config::{Config, LogFormat, OutputFormat, Scenario};
pub use error::AppError;

/// Product sold by the demo order.
pub const DEMO_PRODUCT: &str = "PROD001";

/// Coupon recognised by the demo coupon system.
pub const DEMO_COUPON: &str = "PROMO10";

/// Returns the fixed demo order: two units at $100.00 with a 10% coupon.
pub fn demo_order() -> Result<Order, AppError> {
    Ok(Order::builder()
        .product_id(DEMO_PRODUCT)
        .quantity(2)
        .unit_price(Money::from_dollars(100))
        .customer_email("customer@example.com")
        .card("1234567890123456", "123")
        .shipping_address("123 Example Street")
        .zip_code("12345-678")
        .coupon_code(DEMO_COUPON)
        .build()?)
}

/// Returns in-memory collaborators configured for `scenario`.
pub fn demo_services(scenario: Scenario) -> Result<InMemoryServices, AppError> {
    let stock = if scenario == Scenario::OutOfStock { 0 } else { 100 };
    let services = InMemoryServices {
        inventory: InMemoryInventory::new().with_stock(DEMO_PRODUCT, stock),
        coupons: InMemoryCoupons::new().with_coupon(DEMO_COUPON, DiscountRate::from_percent(10)?),
        ..InMemoryServices::default()
    };

    match scenario {
        Scenario::InvalidCard => services.payment.set_reject_cards(true),
        Scenario::Declined => services.payment.set_decline_charges(true),
        Scenario::Happy | Scenario::OutOfStock => {}
    }

    Ok(services)
}

/// Loads the order named by the configuration, or the demo order.
pub fn load_order(config: &Config) -> Result<Order, AppError> {
    match &config.order_file {
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(|source| AppError::OrderFile {
                path: path.clone(),
                source,
            })?;
            Ok(serde_json::from_str(&raw)?)
        }
        None => demo_order(),
    }
}

/// Runs a single order through the fulfillment pipeline.
#[tracing::instrument(skip_all, fields(scenario = ?config.scenario))]
pub fn run(config: &Config) -> Result<OrderSummary, AppError> {
    let order = load_order(config)?;
    let services = demo_services(config.scenario)?;
    let pipeline = Pipeline::order_fulfillment(&services.services(), Arc::new(SystemClock));

    tracing::info!(stages = ?pipeline.stage_names(), "pipeline assembled");
    Ok(pipeline.process(order)?)
}

/// Renders a successful outcome in the requested format.
pub fn render(summary: &OrderSummary, format: OutputFormat) -> Result<String, AppError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(summary)?),
        OutputFormat::Text => Ok(format!(
            "Order {} completed\n  Subtotal: {}\n  Discount: {}\n  Shipping: {}\n  Total:    {}\n  Transaction: {}\n  Label:       {}",
            summary.order_id,
            summary.subtotal,
            summary.discount,
            summary.shipping_cost,
            summary.total,
            summary.transaction_id,
            summary.label_id,
        )),
    }
}
