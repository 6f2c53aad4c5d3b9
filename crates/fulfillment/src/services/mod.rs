//! External collaborator traits and in-memory implementations for pipeline stages.

pub mod coupon;
pub mod inventory;
pub mod notification;
pub mod payment;
pub mod shipping;

use std::sync::Arc;

pub use coupon::{CouponSystem, InMemoryCoupons, Redemption};
pub use inventory::{InMemoryInventory, InventorySystem};
pub use notification::{InMemoryNotifier, Notification, NotificationService};
pub use payment::{InMemoryPaymentGateway, PaymentGateway, TransactionStatus};
pub use shipping::{InMemoryShipping, ShippingLabel, ShippingRates, ShippingService};

/// The collaborators a fulfillment pipeline talks to.
#[derive(Clone)]
pub struct Services {
    pub inventory: Arc<dyn InventorySystem>,
    pub coupons: Arc<dyn CouponSystem>,
    pub shipping: Arc<dyn ShippingService>,
    pub payment: Arc<dyn PaymentGateway>,
    pub notifications: Arc<dyn NotificationService>,
}

/// A full set of in-memory collaborators.
///
/// Each field is a cheap handle onto shared state, so a clone kept by a test
/// observes everything the pipeline does.
#[derive(Debug, Clone, Default)]
pub struct InMemoryServices {
    pub inventory: InMemoryInventory,
    pub coupons: InMemoryCoupons,
    pub shipping: InMemoryShipping,
    pub payment: InMemoryPaymentGateway,
    pub notifications: InMemoryNotifier,
}

impl InMemoryServices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns trait-object handles onto these collaborators.
    pub fn services(&self) -> Services {
        Services {
            inventory: Arc::new(self.inventory.clone()),
            coupons: Arc::new(self.coupons.clone()),
            shipping: Arc::new(self.shipping.clone()),
            payment: Arc::new(self.payment.clone()),
            notifications: Arc::new(self.notifications.clone()),
        }
    }
}
