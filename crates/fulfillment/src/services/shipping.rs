//! Shipping service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use common::{LabelId, OrderId};
use domain::{Money, Weight};

use crate::error::{PipelineError, Result};

/// Carrier quoting, labelling, and pickup scheduling.
pub trait ShippingService: Send + Sync {
    /// Quotes the cost of shipping a parcel of `weight` to `zip_code`.
    fn calculate_shipping(&self, zip_code: &str, weight: Weight) -> Result<Money>;

    /// Creates a shipping label for the order.
    fn create_shipping_label(&self, order_id: &OrderId, address: &str) -> Result<LabelId>;

    /// Books a carrier pickup for the labelled parcel.
    fn schedule_pickup(&self, label_id: &LabelId, when: DateTime<Utc>) -> Result<()>;
}

/// Flat-rate pricing used by [`InMemoryShipping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingRates {
    pub base_fee: Money,
    pub per_kilogram: Money,
}

impl Default for ShippingRates {
    fn default() -> Self {
        Self {
            base_fee: Money::from_dollars(10),
            per_kilogram: Money::from_dollars(5),
        }
    }
}

impl ShippingRates {
    /// Returns `base_fee + per_kilogram * weight`, rounded to the nearest cent.
    pub fn quote(&self, weight: Weight) -> Money {
        let grams = i64::try_from(weight.grams()).unwrap_or(i64::MAX);
        let variable = (self.per_kilogram.cents().saturating_mul(grams) + 500) / 1000;
        self.base_fee + Money::from_cents(variable)
    }
}

/// A label created by the carrier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingLabel {
    pub order_id: OrderId,
    pub address: String,
}

#[derive(Debug, Default)]
struct InMemoryShippingState {
    rates: ShippingRates,
    labels: HashMap<LabelId, ShippingLabel>,
    pickups: Vec<(LabelId, DateTime<Utc>)>,
    quote_calls: usize,
    next_id: u32,
    fail_on_label: bool,
}

/// In-memory shipping carrier for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct InMemoryShipping {
    state: Arc<RwLock<InMemoryShippingState>>,
}

impl InMemoryShipping {
    /// Creates a carrier with the default rates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this carrier using the given rates.
    pub fn with_rates(self, rates: ShippingRates) -> Self {
        self.state.write().unwrap().rates = rates;
        self
    }

    /// Configures the service to fail on label creation.
    pub fn set_fail_on_label(&self, fail: bool) {
        self.state.write().unwrap().fail_on_label = fail;
    }

    /// Returns how many quotes were requested.
    pub fn quote_count(&self) -> usize {
        self.state.read().unwrap().quote_calls
    }

    /// Returns the number of labels created.
    pub fn label_count(&self) -> usize {
        self.state.read().unwrap().labels.len()
    }

    /// Returns the label with the given ID, if it exists.
    pub fn label(&self, label_id: &LabelId) -> Option<ShippingLabel> {
        self.state.read().unwrap().labels.get(label_id).cloned()
    }

    /// Returns every scheduled pickup.
    pub fn pickups(&self) -> Vec<(LabelId, DateTime<Utc>)> {
        self.state.read().unwrap().pickups.clone()
    }
}

impl ShippingService for InMemoryShipping {
    fn calculate_shipping(&self, _zip_code: &str, weight: Weight) -> Result<Money> {
        let mut state = self.state.write().unwrap();
        state.quote_calls += 1;
        Ok(state.rates.quote(weight))
    }

    fn create_shipping_label(&self, order_id: &OrderId, address: &str) -> Result<LabelId> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_label {
            return Err(PipelineError::Shipping("Label printer offline".to_string()));
        }

        state.next_id += 1;
        let label_id = LabelId::new(format!("LBL-{:04}", state.next_id));
        state.labels.insert(
            label_id.clone(),
            ShippingLabel {
                order_id: order_id.clone(),
                address: address.to_string(),
            },
        );

        Ok(label_id)
    }

    fn schedule_pickup(&self, label_id: &LabelId, when: DateTime<Utc>) -> Result<()> {
        let mut state = self.state.write().unwrap();

        if !state.labels.contains_key(label_id) {
            return Err(PipelineError::Shipping(format!("Unknown label {label_id}")));
        }

        state.pickups.push((label_id.clone(), when));
        Ok(())
    }
}
