//! Composition of stages into a runnable pipeline.

use std::sync::Arc;
use std::time::Instant;

use domain::Order;

use crate::clock::Clock;
use crate::context::{OrderContext, OrderSummary};
use crate::error::Result;
use crate::services::Services;
use crate::stage::{Next, Stage};
use crate::stages::{
    BaseStage, CouponStage, InventoryStage, NotificationStage, PaymentStage, ShippingStage,
};

/// Builds a pipeline from the inside out.
///
/// Start with the terminal stage; each [`wrap`](Self::wrap) places a stage
/// outside everything added so far, so the last stage wrapped runs its
/// pre-logic first and its post-logic last.
pub struct PipelineBuilder {
    /// Innermost first.
    stages: Vec<Box<dyn Stage>>,
}

impl PipelineBuilder {
    /// Starts a pipeline whose innermost stage is `terminal`.
    pub fn new(terminal: impl Stage + 'static) -> Self {
        Self {
            stages: vec![Box::new(terminal)],
        }
    }

    /// Wraps everything added so far in `stage`.
    pub fn wrap(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn build(mut self) -> Pipeline {
        self.stages.reverse();
        Pipeline {
            stages: self.stages,
        }
    }
}

/// An ordered chain of stages, outermost first.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Builds the standard order fulfillment pipeline.
    ///
    /// Nesting, from the inside out: base, payment, shipping, coupon,
    /// inventory, notification. On the way in this checks and reserves stock,
    /// computes the discount, quotes shipping, charges the card and assigns
    /// the order ID; on the way out it books the shipment, redeems the coupon
    /// and notifies the customer. Changing the order changes what the
    /// customer is charged and which effects get compensated.
    pub fn order_fulfillment(services: &Services, clock: Arc<dyn Clock>) -> Self {
        PipelineBuilder::new(BaseStage::new(clock.clone()))
            .wrap(PaymentStage::new(services.payment.clone()))
            .wrap(ShippingStage::new(services.shipping.clone(), clock))
            .wrap(CouponStage::new(services.coupons.clone()))
            .wrap(InventoryStage::new(services.inventory.clone()))
            .wrap(NotificationStage::new(services.notifications.clone()))
            .build()
    }

    /// Returns stage names from outermost to innermost.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Runs every stage against `ctx`.
    ///
    /// On failure, each stage that committed an effect has already undone it
    /// by the time the error is returned.
    #[tracing::instrument(
        skip_all,
        fields(
            product_id = %ctx.order().product_id(),
            quantity = ctx.order().quantity(),
        )
    )]
    pub fn execute(&self, ctx: &mut OrderContext) -> Result<()> {
        metrics::counter!("fulfillment_orders_total").increment(1);
        let started = Instant::now();

        let outcome = Next::new(&self.stages).run(ctx);

        let duration = started.elapsed().as_secs_f64();
        metrics::histogram!("fulfillment_duration_seconds").record(duration);
        match &outcome {
            Ok(()) => tracing::info!(duration, "pipeline completed"),
            Err(err) => {
                metrics::counter!("fulfillment_orders_failed_total", "kind" => err.kind())
                    .increment(1);
                tracing::warn!(duration, error = %err, "pipeline failed");
            }
        }
        outcome
    }

    /// Processes a single order from a fresh context and summarizes the result.
    pub fn process(&self, order: Order) -> Result<OrderSummary> {
        let mut ctx = OrderContext::new(order);
        self.execute(&mut ctx)?;
        ctx.summary()
    }
}
