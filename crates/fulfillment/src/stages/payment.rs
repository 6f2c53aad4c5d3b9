//! Stage that charges the customer.

use std::sync::Arc;

use crate::context::OrderContext;
use crate::error::{PipelineError, Result};
use crate::services::PaymentGateway;
use crate::stage::{Next, Stage, compensate_on_failure};

/// Opens a transaction for the context total, validates the card and charges
/// it before delegating. The transaction is rolled back if anything below
/// this stage fails.
///
/// Must sit inside the coupon and shipping stages so the total it charges
/// already includes the discount and shipping cost.
pub struct PaymentStage {
    payment: Arc<dyn PaymentGateway>,
}

impl PaymentStage {
    pub fn new(payment: Arc<dyn PaymentGateway>) -> Self {
        Self { payment }
    }
}

impl Stage for PaymentStage {
    fn name(&self) -> &'static str {
        "payment"
    }

    fn process(&self, ctx: &mut OrderContext, next: Next<'_>) -> Result<()> {
        let amount = ctx.total();
        let transaction_id = self.payment.initialize_transaction(amount)?;
        ctx.set_transaction_id(transaction_id.clone());

        let card_number = ctx.order().card_number();
        if !self.payment.validate_card(card_number, ctx.order().cvv())? {
            tracing::warn!(
                %transaction_id,
                card = %ctx.order().masked_card_number(),
                "card rejected"
            );
            return Err(PipelineError::InvalidCard);
        }

        if !self.payment.process_payment(&transaction_id, card_number)? {
            tracing::warn!(%transaction_id, %amount, "payment declined");
            return Err(PipelineError::PaymentDeclined { transaction_id });
        }
        tracing::info!(%transaction_id, %amount, "payment captured");

        let outcome = next.run(ctx);
        compensate_on_failure(self.name(), outcome, || {
            self.payment.rollback_transaction(&transaction_id)
        })
    }
}

#[cfg(test)]
mod tests {
    use domain::Money;

    use super::*;
    use crate::pipeline::PipelineBuilder;
    use crate::services::TransactionStatus;
    use crate::stages::BaseStage;
    use crate::stages::test_support::{FailingStage, clock, context, in_memory};

    #[test]
    fn test_charges_context_total() {
        let services = in_memory();
        let pipeline = PipelineBuilder::new(BaseStage::new(Arc::new(clock())))
            .wrap(PaymentStage::new(services.services().payment))
            .build();

        let mut ctx = context();
        ctx.set_shipping_cost(Money::from_dollars(15));
        pipeline.execute(&mut ctx).unwrap();

        let txn = ctx.transaction_id().unwrap();
        assert_eq!(services.payment.amount(txn), Some(Money::from_dollars(215)));
        assert_eq!(services.payment.status(txn), Some(TransactionStatus::Charged));
        assert_eq!(services.payment.rollback_count(), 0);
    }

    #[test]
    fn test_invalid_card_fails_before_charge() {
        let services = in_memory();
        services.payment.set_reject_cards(true);
        let pipeline = PipelineBuilder::new(BaseStage::new(Arc::new(clock())))
            .wrap(PaymentStage::new(services.services().payment))
            .build();

        let mut ctx = context();
        assert_eq!(pipeline.execute(&mut ctx), Err(PipelineError::InvalidCard));

        let txn = ctx.transaction_id().unwrap();
        assert_eq!(
            services.payment.status(txn),
            Some(TransactionStatus::Initialized)
        );
        assert_eq!(services.payment.rollback_count(), 0);
        assert!(ctx.order_id().is_err());
    }

    #[test]
    fn test_declined_charge() {
        let services = in_memory();
        services.payment.set_decline_charges(true);
        let pipeline = PipelineBuilder::new(BaseStage::new(Arc::new(clock())))
            .wrap(PaymentStage::new(services.services().payment))
            .build();

        let mut ctx = context();
        let result = pipeline.execute(&mut ctx);

        let txn = ctx.transaction_id().unwrap().clone();
        assert_eq!(
            result,
            Err(PipelineError::PaymentDeclined {
                transaction_id: txn.clone()
            })
        );
        assert_eq!(
            services.payment.status(&txn),
            Some(TransactionStatus::Declined)
        );
        assert_eq!(services.payment.rollback_count(), 0);
    }

    #[test]
    fn test_downstream_failure_rolls_back() {
        let services = in_memory();
        let pipeline =
            PipelineBuilder::new(FailingStage(PipelineError::Shipping("boom".into())))
                .wrap(PaymentStage::new(services.services().payment))
                .build();

        let mut ctx = context();
        let result = pipeline.execute(&mut ctx);

        assert_eq!(result, Err(PipelineError::Shipping("boom".into())));
        let txn = ctx.transaction_id().unwrap();
        assert_eq!(
            services.payment.status(txn),
            Some(TransactionStatus::RolledBack)
        );
        assert_eq!(services.payment.rollback_count(), 1);
    }
}
