//! Terminal stage that finalizes order identity.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use common::OrderId;

use crate::clock::Clock;
use crate::context::OrderContext;
use crate::error::Result;
use crate::stage::{Next, Stage};

/// Assigns the order its identifier once every outer stage has run its
/// pre-logic. Reserves nothing, so it never needs compensation.
///
/// Identifiers are the clock's timestamp, bumped past the last one issued so
/// that orders sharing a tick still get distinct ids.
pub struct BaseStage {
    clock: Arc<dyn Clock>,
    last_issued: AtomicI64,
}

impl BaseStage {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last_issued: AtomicI64::new(i64::MIN),
        }
    }

    fn next_ticks(&self) -> i64 {
        let now = self.clock.now();
        let ticks = now
            .timestamp_nanos_opt()
            .unwrap_or_else(|| now.timestamp_micros());
        let next = |last: i64| ticks.max(last.saturating_add(1));

        // The closure never declines, so both arms carry the previous value.
        let previous = match self.last_issued.fetch_update(
            Ordering::SeqCst,
            Ordering::SeqCst,
            |last| Some(next(last)),
        ) {
            Ok(previous) | Err(previous) => previous,
        };
        next(previous)
    }
}

impl Stage for BaseStage {
    fn name(&self) -> &'static str {
        "base"
    }

    fn process(&self, ctx: &mut OrderContext, _next: Next<'_>) -> Result<()> {
        let order_id = OrderId::new(format!("ORD{}", self.next_ticks()));

        tracing::info!(
            %order_id,
            customer = ctx.order().customer_email(),
            "order intake complete"
        );
        ctx.set_order_id(order_id);
        Ok(())
    }
}
