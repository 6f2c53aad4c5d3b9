//! Stage that applies a coupon discount.

use std::sync::Arc;

use crate::context::OrderContext;
use crate::error::Result;
use crate::services::CouponSystem;
use crate::stage::{Next, Stage};

/// Computes the coupon discount before delegating and redeems the coupon only
/// after the rest of the chain succeeds.
///
/// Validation has no side effect, so there is nothing to undo on failure. The
/// discount written to the context is left in place; the context is dropped
/// with the failed run.
pub struct CouponStage {
    coupons: Arc<dyn CouponSystem>,
}

impl CouponStage {
    pub fn new(coupons: Arc<dyn CouponSystem>) -> Self {
        Self { coupons }
    }
}

impl Stage for CouponStage {
    fn name(&self) -> &'static str {
        "coupon"
    }

    fn process(&self, ctx: &mut OrderContext, next: Next<'_>) -> Result<()> {
        let mut redeemable = None;

        if let Some(code) = ctx.order().coupon_code().map(str::to_owned) {
            if self.coupons.validate_coupon(&code)? {
                let rate = self.coupons.get_discount(&code)?;
                let discount = ctx.subtotal().apply_rate(rate);
                tracing::info!(coupon = %code, %rate, %discount, "coupon applied");
                ctx.set_discount(discount);
                redeemable = Some(code);
            } else {
                tracing::warn!(coupon = %code, "coupon rejected, continuing without discount");
            }
        }

        next.run(ctx)?;

        if let Some(code) = redeemable {
            self.coupons
                .mark_coupon_as_used(&code, ctx.order().customer_email())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use domain::Money;

    use super::*;
    use crate::context::OrderContext;
    use crate::error::PipelineError;
    use crate::pipeline::PipelineBuilder;
    use crate::services::Redemption;
    use crate::stages::BaseStage;
    use crate::stages::test_support::{FailingStage, clock, in_memory, order_with_coupon};

    #[test]
    fn test_valid_coupon_discounts_and_redeems() {
        let services = in_memory();
        let pipeline = PipelineBuilder::new(BaseStage::new(Arc::new(clock())))
            .wrap(CouponStage::new(services.services().coupons))
            .build();

        let mut ctx = OrderContext::new(order_with_coupon(Some("PROMO10")));
        pipeline.execute(&mut ctx).unwrap();

        assert_eq!(ctx.discount(), Money::from_dollars(20));
        assert_eq!(
            services.coupons.redemptions(),
            vec![Redemption {
                code: "PROMO10".to_string(),
                customer_email: "customer@example.com".to_string(),
            }]
        );
    }

    #[test]
    fn test_unknown_coupon_is_ignored() {
        let services = in_memory();
        let pipeline = PipelineBuilder::new(BaseStage::new(Arc::new(clock())))
            .wrap(CouponStage::new(services.services().coupons))
            .build();

        let mut ctx = OrderContext::new(order_with_coupon(Some("BOGUS")));
        pipeline.execute(&mut ctx).unwrap();

        assert!(ctx.discount().is_zero());
        assert_eq!(services.coupons.redemption_count(), 0);
    }

    #[test]
    fn test_no_coupon_is_a_no_op() {
        let services = in_memory();
        let pipeline = PipelineBuilder::new(FailingStage(PipelineError::InvalidCard))
            .wrap(CouponStage::new(services.services().coupons))
            .build();

        let mut ctx = OrderContext::new(order_with_coupon(None));
        assert!(pipeline.execute(&mut ctx).is_err());
        assert!(ctx.discount().is_zero());
        assert_eq!(services.coupons.redemption_count(), 0);
    }

    #[test]
    fn test_downstream_failure_does_not_redeem() {
        let services = in_memory();
        let pipeline = PipelineBuilder::new(FailingStage(PipelineError::InvalidCard))
            .wrap(CouponStage::new(services.services().coupons))
            .build();

        let mut ctx = OrderContext::new(order_with_coupon(Some("PROMO10")));
        let result = pipeline.execute(&mut ctx);

        assert_eq!(result, Err(PipelineError::InvalidCard));
        assert_eq!(services.coupons.redemption_count(), 0);
        // The discount computed on the way in is not reverted.
        assert_eq!(ctx.discount(), Money::from_dollars(20));
    }
}
