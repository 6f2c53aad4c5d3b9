//! Order fulfillment as a chain of composable stages.
//!
//! Every stage wraps the rest of the chain: it runs its pre-logic, delegates,
//! and runs its post-logic once the inner stages return. When anything below
//! a stage fails, that stage undoes whatever it committed for the run before
//! passing the same error outward, so a failed order unwinds its side effects
//! in reverse order.
//!
//! The standard pipeline executes:
//! 1. Check and reserve inventory
//! 2. Compute the coupon discount
//! 3. Quote shipping
//! 4. Charge the card
//! 5. Assign the order ID
//!
//! and then, on the way back out, books the shipment, redeems the coupon and
//! notifies the customer.

pub mod clock;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod services;
pub mod stage;
pub mod stages;

pub use clock::{Clock, FixedClock, SystemClock};
pub use context::{OrderContext, OrderSummary};
pub use error::PipelineError;
pub use pipeline::{Pipeline, PipelineBuilder};
pub use services::{
    CouponSystem, InMemoryCoupons, InMemoryInventory, InMemoryNotifier, InMemoryPaymentGateway,
    InMemoryServices, InMemoryShipping, InventorySystem, Notification, NotificationService,
    PaymentGateway, Services, ShippingRates, ShippingService, TransactionStatus,
};
pub use stage::{Next, Stage, compensate_on_failure};
pub use stages::{
    BaseStage, CouponStage, InventoryStage, NotificationStage, PaymentStage, ShippingStage,
};
