//! Stage that prices shipping and books the carrier.

use std::sync::Arc;

use chrono::Duration;
use domain::Weight;

use crate::clock::Clock;
use crate::context::OrderContext;
use crate::error::Result;
use crate::services::ShippingService;
use crate::stage::{Next, Stage};

/// Days between order completion and carrier pickup.
pub const PICKUP_DELAY_DAYS: i64 = 1;

/// Quotes shipping before delegating; creates the label and schedules pickup
/// after the rest of the chain succeeds.
///
/// No label exists until delegation has returned successfully, so a failed run
/// leaves nothing to cancel.
pub struct ShippingStage {
    shipping: Arc<dyn ShippingService>,
    clock: Arc<dyn Clock>,
}

impl ShippingStage {
    pub fn new(shipping: Arc<dyn ShippingService>, clock: Arc<dyn Clock>) -> Self {
        Self { shipping, clock }
    }
}

impl Stage for ShippingStage {
    fn name(&self) -> &'static str {
        "shipping"
    }

    fn process(&self, ctx: &mut OrderContext, next: Next<'_>) -> Result<()> {
        let weight = Weight::for_quantity(ctx.order().quantity());
        let cost = self
            .shipping
            .calculate_shipping(ctx.order().zip_code(), weight)?;
        tracing::info!(%weight, %cost, "shipping quoted");
        ctx.set_shipping_cost(cost);

        next.run(ctx)?;

        let order_id = ctx.order_id()?.clone();
        let label_id = self
            .shipping
            .create_shipping_label(&order_id, ctx.order().shipping_address())?;
        ctx.set_label_id(label_id.clone());

        let pickup_at = self.clock.now() + Duration::days(PICKUP_DELAY_DAYS);
        self.shipping.schedule_pickup(&label_id, pickup_at)?;
        tracing::info!(%order_id, %label_id, %pickup_at, "shipment booked");
        Ok(())
    }
}
