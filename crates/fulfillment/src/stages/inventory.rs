//! Stage that reserves stock for the order.

use std::sync::Arc;

use crate::context::OrderContext;
use crate::error::{PipelineError, Result};
use crate::services::InventorySystem;
use crate::stage::{Next, Stage, compensate_on_failure};

/// Checks availability and reserves the ordered quantity before delegating.
///
/// The reservation is released if anything below this stage fails, and kept
/// if the run succeeds.
pub struct InventoryStage {
    inventory: Arc<dyn InventorySystem>,
}

impl InventoryStage {
    pub fn new(inventory: Arc<dyn InventorySystem>) -> Self {
        Self { inventory }
    }
}

impl Stage for InventoryStage {
    fn name(&self) -> &'static str {
        "inventory"
    }

    fn process(&self, ctx: &mut OrderContext, next: Next<'_>) -> Result<()> {
        let product_id = ctx.order().product_id().clone();
        let quantity = ctx.order().quantity();

        if !self.inventory.check_availability(&product_id)? {
            tracing::warn!(%product_id, "product unavailable");
            return Err(PipelineError::OutOfStock { product_id });
        }

        self.inventory.reserve_product(&product_id, quantity)?;
        tracing::info!(%product_id, quantity, "inventory reserved");

        let outcome = next.run(ctx);
        compensate_on_failure(self.name(), outcome, || {
            self.inventory.release_reservation(&product_id, quantity)
        })
    }
}
