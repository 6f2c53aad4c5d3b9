//! Integration tests for the order fulfillment pipeline.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use domain::{DiscountRate, Money, Order, ProductId};
use fulfillment::{
    Clock, FixedClock, InMemoryCoupons, InMemoryInventory, InMemoryServices, Notification,
    OrderContext, Pipeline, PipelineError, TransactionStatus,
};

struct TestHarness {
    pipeline: Pipeline,
    services: InMemoryServices,
    clock: FixedClock,
}

impl TestHarness {
    fn new() -> Self {
        let services = InMemoryServices {
            inventory: InMemoryInventory::new().with_stock("PROD001", 10),
            coupons: InMemoryCoupons::new()
                .with_coupon("PROMO10", DiscountRate::from_percent(10).unwrap()),
            ..InMemoryServices::default()
        };
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap());
        let pipeline = Pipeline::order_fulfillment(&services.services(), Arc::new(clock));

        Self {
            pipeline,
            services,
            clock,
        }
    }

    fn reserved(&self) -> u32 {
        self.services
            .inventory
            .reserved_quantity(&ProductId::new("PROD001"))
    }
}

fn order(coupon: Option<&str>) -> Order {
    let mut builder = Order::builder()
        .product_id("PROD001")
        .quantity(2)
        .unit_price(Money::from_dollars(100))
        .customer_email("customer@example.com")
        .card("1234567890123456", "123")
        .shipping_address("1 Example Street")
        .zip_code("12345-678");
    if let Some(code) = coupon {
        builder = builder.coupon_code(code);
    }
    builder.build().unwrap()
}

#[test]
fn test_happy_path_full_order_fulfillment() {
    let h = TestHarness::new();
    let mut ctx = OrderContext::new(order(Some("PROMO10")));

    h.pipeline.execute(&mut ctx).unwrap();

    // Totals
    let shipping = Money::from_dollars(15);
    assert_eq!(ctx.subtotal(), Money::from_dollars(200));
    assert_eq!(ctx.discount(), Money::from_dollars(20));
    assert_eq!(ctx.shipping_cost(), shipping);
    assert_eq!(ctx.total(), Money::from_dollars(180) + shipping);

    // Shipping quoted once
    assert_eq!(h.services.shipping.quote_count(), 1);

    // Inventory stays reserved
    assert_eq!(h.reserved(), 2);
    assert_eq!(h.services.inventory.reserve_count(), 1);
    assert_eq!(h.services.inventory.release_count(), 0);

    // Charged once, for the discounted total including shipping
    let txn = ctx.transaction_id().unwrap();
    assert_eq!(h.services.payment.transaction_count(), 1);
    assert_eq!(h.services.payment.amount(txn), Some(ctx.total()));
    assert_eq!(
        h.services.payment.status(txn),
        Some(TransactionStatus::Charged)
    );

    // Label tied to the order, pickup one day out
    let label_id = ctx.label_id().unwrap().clone();
    let label = h.services.shipping.label(&label_id).unwrap();
    assert_eq!(&label.order_id, ctx.order_id().unwrap());
    assert_eq!(
        h.services.shipping.pickups(),
        vec![(label_id.clone(), h.clock.now() + Duration::days(1))]
    );

    // Coupon redeemed exactly once
    assert_eq!(h.services.coupons.redemption_count(), 1);

    // Exactly one set of notifications
    assert_eq!(
        h.services.notifications.sent(),
        vec![
            Notification::OrderConfirmation {
                email: "customer@example.com".to_string(),
                order_id: ctx.order_id().unwrap().clone(),
            },
            Notification::PaymentReceipt {
                email: "customer@example.com".to_string(),
                transaction_id: txn.clone(),
            },
            Notification::ShippingNotification {
                email: "customer@example.com".to_string(),
                label_id,
            },
        ]
    );
}

#[test]
fn test_process_returns_summary() {
    let h = TestHarness::new();

    let summary = h.pipeline.process(order(Some("PROMO10"))).unwrap();

    assert!(summary.order_id.as_str().starts_with("ORD"));
    assert_eq!(summary.transaction_id.as_str(), "TXN-0001");
    assert_eq!(summary.label_id.as_str(), "LBL-0001");
    assert_eq!(summary.discount, Money::from_dollars(20));
    assert_eq!(summary.total, Money::from_dollars(195));
}

#[test]
fn test_out_of_stock_has_no_side_effects() {
    let h = TestHarness::new();
    h.services.inventory.set_stock("PROD001", 0);

    let result = h.pipeline.process(order(Some("PROMO10")));

    assert_eq!(
        result,
        Err(PipelineError::OutOfStock {
            product_id: ProductId::new("PROD001")
        })
    );
    assert_eq!(h.services.inventory.reserve_count(), 0);
    assert_eq!(h.services.inventory.release_count(), 0);
    assert_eq!(h.services.shipping.quote_count(), 0);
    assert_eq!(h.services.payment.transaction_count(), 0);
    assert_eq!(h.services.coupons.redemption_count(), 0);
    assert_eq!(h.services.notifications.sent_count(), 0);
}

#[test]
fn test_invalid_card_releases_inventory_once() {
    let h = TestHarness::new();
    h.services.payment.set_reject_cards(true);

    let mut ctx = OrderContext::new(order(Some("PROMO10")));
    let result = h.pipeline.execute(&mut ctx);

    assert_eq!(result, Err(PipelineError::InvalidCard));

    // Reserved, then released exactly once
    assert_eq!(h.services.inventory.reserve_count(), 1);
    assert_eq!(h.services.inventory.release_count(), 1);
    assert_eq!(h.reserved(), 0);

    // Transaction opened but never charged or rolled back
    let txn = ctx.transaction_id().unwrap();
    assert_eq!(
        h.services.payment.status(txn),
        Some(TransactionStatus::Initialized)
    );
    assert_eq!(h.services.payment.charged_count(), 0);
    assert_eq!(h.services.payment.rollback_count(), 0);

    assert!(ctx.order_id().is_err());
    assert_eq!(h.services.shipping.label_count(), 0);
    assert_eq!(h.services.coupons.redemption_count(), 0);
    assert_eq!(h.services.notifications.sent_count(), 0);
}

#[test]
fn test_declined_payment_releases_inventory() {
    let h = TestHarness::new();
    h.services.payment.set_decline_charges(true);

    let result = h.pipeline.process(order(Some("PROMO10")));

    assert!(matches!(result, Err(PipelineError::PaymentDeclined { .. })));
    assert_eq!(h.services.inventory.release_count(), 1);
    assert_eq!(h.reserved(), 0);
    assert_eq!(h.services.payment.charged_count(), 0);
    assert_eq!(h.services.coupons.redemption_count(), 0);
    assert_eq!(h.services.notifications.sent_count(), 0);
}

#[test]
fn test_label_failure_releases_inventory_and_keeps_charge() {
    let h = TestHarness::new();
    h.services.shipping.set_fail_on_label(true);

    let mut ctx = OrderContext::new(order(Some("PROMO10")));
    let result = h.pipeline.execute(&mut ctx);

    assert!(matches!(result, Err(PipelineError::Shipping(_))));

    // Payment's delegated call had already returned successfully, so it has
    // nothing to roll back; inventory is still above the failure and releases.
    let txn = ctx.transaction_id().unwrap();
    assert_eq!(
        h.services.payment.status(txn),
        Some(TransactionStatus::Charged)
    );
    assert_eq!(h.services.payment.rollback_count(), 0);
    assert_eq!(h.services.inventory.release_count(), 1);
    assert_eq!(h.reserved(), 0);
    assert_eq!(h.services.coupons.redemption_count(), 0);
    assert_eq!(h.services.notifications.sent_count(), 0);
}

#[test]
fn test_notification_failure_leaves_inner_effects_committed() {
    let h = TestHarness::new();
    h.services.notifications.set_fail_on_send(true);

    let result = h.pipeline.process(order(Some("PROMO10")));

    assert!(matches!(result, Err(PipelineError::Notification(_))));
    assert_eq!(h.reserved(), 2);
    assert_eq!(h.services.inventory.release_count(), 0);
    assert_eq!(h.services.payment.charged_count(), 1);
    assert_eq!(h.services.shipping.label_count(), 1);
    assert_eq!(h.services.coupons.redemption_count(), 1);
}

#[test]
fn test_order_without_coupon_pays_full_price() {
    let h = TestHarness::new();

    let summary = h.pipeline.process(order(None)).unwrap();

    assert!(summary.discount.is_zero());
    assert_eq!(summary.total, Money::from_dollars(215));
    assert_eq!(h.services.coupons.redemption_count(), 0);
    assert_eq!(h.services.notifications.sent_count(), 3);
}

#[test]
fn test_invalid_coupon_is_never_redeemed() {
    let h = TestHarness::new();

    let summary = h.pipeline.process(order(Some("EXPIRED"))).unwrap();

    assert!(summary.discount.is_zero());
    assert_eq!(h.services.coupons.redemption_count(), 0);
}

#[test]
fn test_pipeline_is_reusable_across_orders() {
    let h = TestHarness::new();

    let first = h.pipeline.process(order(Some("PROMO10"))).unwrap();
    let second = h.pipeline.process(order(None)).unwrap();

    assert_ne!(first.order_id, second.order_id);
    assert_ne!(first.transaction_id, second.transaction_id);
    assert_ne!(first.label_id, second.label_id);
    assert_eq!(h.reserved(), 4);
    assert_eq!(h.services.notifications.sent_count(), 6);
}
