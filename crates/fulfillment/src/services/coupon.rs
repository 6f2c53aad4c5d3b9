//! Coupon system trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use domain::DiscountRate;

use crate::error::{PipelineError, Result};

/// Coupon validation and redemption.
pub trait CouponSystem: Send + Sync {
    /// Returns true if the code names an active coupon.
    fn validate_coupon(&self, code: &str) -> Result<bool>;

    /// Returns the fraction of the subtotal the coupon takes off.
    fn get_discount(&self, code: &str) -> Result<DiscountRate>;

    /// Records that `customer_email` redeemed the coupon.
    fn mark_coupon_as_used(&self, code: &str, customer_email: &str) -> Result<()>;
}

/// A recorded coupon redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redemption {
    pub code: String,
    pub customer_email: String,
}

#[derive(Debug, Default)]
struct InMemoryCouponState {
    coupons: HashMap<String, DiscountRate>,
    redemptions: Vec<Redemption>,
    fail_on_mark_used: bool,
}

/// In-memory coupon system for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCoupons {
    state: Arc<RwLock<InMemoryCouponState>>,
}

impl InMemoryCoupons {
    /// Creates a coupon system with no active coupons.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this system with an active coupon added.
    pub fn with_coupon(self, code: impl Into<String>, rate: DiscountRate) -> Self {
        self.state
            .write()
            .unwrap()
            .coupons
            .insert(code.into(), rate);
        self
    }

    /// Configures the service to fail when a coupon is marked used.
    pub fn set_fail_on_mark_used(&self, fail: bool) {
        self.state.write().unwrap().fail_on_mark_used = fail;
    }

    /// Returns every redemption recorded so far.
    pub fn redemptions(&self) -> Vec<Redemption> {
        self.state.read().unwrap().redemptions.clone()
    }

    /// Returns the number of recorded redemptions.
    pub fn redemption_count(&self) -> usize {
        self.state.read().unwrap().redemptions.len()
    }
}

impl CouponSystem for InMemoryCoupons {
    fn validate_coupon(&self, code: &str) -> Result<bool> {
        Ok(self.state.read().unwrap().coupons.contains_key(code))
    }

    fn get_discount(&self, code: &str) -> Result<DiscountRate> {
        self.state
            .read()
            .unwrap()
            .coupons
            .get(code)
            .copied()
            .ok_or_else(|| PipelineError::Coupon(format!("Unknown coupon {code}")))
    }

    fn mark_coupon_as_used(&self, code: &str, customer_email: &str) -> Result<()> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_mark_used {
            return Err(PipelineError::Coupon("Redemption store unavailable".to_string()));
        }

        state.redemptions.push(Redemption {
            code: code.to_string(),
            customer_email: customer_email.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coupons() -> InMemoryCoupons {
        InMemoryCoupons::new().with_coupon("PROMO10", DiscountRate::from_percent(10).unwrap())
    }

    #[test]
    fn test_validate_known_and_unknown_codes() {
        let coupons = coupons();
        assert!(coupons.validate_coupon("PROMO10").unwrap());
        assert!(!coupons.validate_coupon("NOPE").unwrap());
    }

    #[test]
    fn test_get_discount() {
        let coupons = coupons();
        assert_eq!(coupons.get_discount("PROMO10").unwrap().basis_points(), 1000);
        assert!(matches!(
            coupons.get_discount("NOPE"),
            Err(PipelineError::Coupon(_))
        ));
    }

    #[test]
    fn test_mark_used_records_redemption() {
        let coupons = coupons();
        coupons
            .mark_coupon_as_used("PROMO10", "customer@example.com")
            .unwrap();

        assert_eq!(
            coupons.redemptions(),
            vec![Redemption {
                code: "PROMO10".to_string(),
                customer_email: "customer@example.com".to_string(),
            }]
        );
    }

    #[test]
    fn test_fail_on_mark_used() {
        let coupons = coupons();
        coupons.set_fail_on_mark_used(true);
        assert!(coupons.mark_coupon_as_used("PROMO10", "a@b.c").is_err());
        assert_eq!(coupons.redemption_count(), 0);
    }
}
