//! The concrete stages of the order fulfillment pipeline.
//!
//! Listed from innermost to outermost as [`crate::Pipeline::order_fulfillment`]
//! nests them: base, payment, shipping, coupon, inventory, notification.

mod base;
mod coupon;
mod inventory;
mod notification;
mod payment;
mod shipping;

pub use base::BaseStage;
pub use coupon::CouponStage;
pub use inventory::InventoryStage;
pub use notification::NotificationStage;
pub use payment::PaymentStage;
pub use shipping::{PICKUP_DELAY_DAYS, ShippingStage};
