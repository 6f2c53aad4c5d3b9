//! Pipeline error types.

use common::TransactionId;
use domain::ProductId;
use thiserror::Error;

/// Errors that can abort a pipeline run.
///
/// Stages never inspect which variant they receive from downstream; they only
/// compensate their own work and pass the error on unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// The product is not available for reservation.
    #[error("Product unavailable: {product_id}")]
    OutOfStock { product_id: ProductId },

    /// The card number or verification code was rejected.
    #[error("Invalid card")]
    InvalidCard,

    /// The gateway declined the charge.
    #[error("Payment declined for transaction {transaction_id}")]
    PaymentDeclined { transaction_id: TransactionId },

    /// A stage read a context field before the stage that writes it had run.
    #[error("Context field '{field}' read before it was set")]
    ContextNotReady { field: &'static str },

    /// Inventory system error.
    #[error("Inventory system error: {0}")]
    Inventory(String),

    /// Coupon system error.
    #[error("Coupon system error: {0}")]
    Coupon(String),

    /// Shipping service error.
    #[error("Shipping service error: {0}")]
    Shipping(String),

    /// Payment gateway error.
    #[error("Payment gateway error: {0}")]
    Payment(String),

    /// Notification service error.
    #[error("Notification service error: {0}")]
    Notification(String),
}

impl PipelineError {
    /// Returns a stable label for this error, suitable for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::OutOfStock { .. } => "out_of_stock",
            PipelineError::InvalidCard => "invalid_card",
            PipelineError::PaymentDeclined { .. } => "payment_declined",
            PipelineError::ContextNotReady { .. } => "context_not_ready",
            PipelineError::Inventory(_) => "inventory",
            PipelineError::Coupon(_) => "coupon",
            PipelineError::Shipping(_) => "shipping",
            PipelineError::Payment(_) => "payment",
            PipelineError::Notification(_) => "notification",
        }
    }
}

/// Convenience type alias for pipeline results.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = PipelineError::OutOfStock {
            product_id: ProductId::new("PROD001"),
        };
        assert_eq!(err.to_string(), "Product unavailable: PROD001");
        assert_eq!(PipelineError::InvalidCard.to_string(), "Invalid card");

        let err = PipelineError::PaymentDeclined {
            transaction_id: TransactionId::new("TXN-0001"),
        };
        assert_eq!(err.to_string(), "Payment declined for transaction TXN-0001");
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(PipelineError::InvalidCard.kind(), "invalid_card");
        assert_eq!(
            PipelineError::ContextNotReady { field: "order_id" }.kind(),
            "context_not_ready"
        );
        assert_eq!(PipelineError::Shipping("down".into()).kind(), "shipping");
    }
}
