//! Stage that tells the customer about a completed order.

use std::sync::Arc;

use crate::context::OrderContext;
use crate::error::Result;
use crate::services::NotificationService;
use crate::stage::{Next, Stage};

/// Runs the rest of the chain first, then sends the order confirmation,
/// payment receipt and shipping notification. A failed run sends nothing.
pub struct NotificationStage {
    notifications: Arc<dyn NotificationService>,
}

impl NotificationStage {
    pub fn new(notifications: Arc<dyn NotificationService>) -> Self {
        Self { notifications }
    }
}

impl Stage for NotificationStage {
    fn name(&self) -> &'static str {
        "notification"
    }

    fn process(&self, ctx: &mut OrderContext, next: Next<'_>) -> Result<()> {
        next.run(ctx)?;

        let email = ctx.order().customer_email();
        let order_id = ctx.order_id()?;
        self.notifications.send_order_confirmation(email, order_id)?;
        self.notifications
            .send_payment_receipt(email, ctx.transaction_id()?)?;
        self.notifications
            .send_shipping_notification(email, ctx.label_id()?)?;

        tracing::info!(%order_id, total = %ctx.total(), "order completed");
        Ok(())
    }
}
