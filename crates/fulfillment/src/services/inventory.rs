//! Inventory system trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use domain::ProductId;

use crate::error::{PipelineError, Result};

/// Stock availability and reservations.
pub trait InventorySystem: Send + Sync {
    /// Returns true if the product currently has unreserved stock.
    fn check_availability(&self, product_id: &ProductId) -> Result<bool>;

    /// Reserves `quantity` units of the product.
    fn reserve_product(&self, product_id: &ProductId, quantity: u32) -> Result<()>;

    /// Releases a previously made reservation.
    fn release_reservation(&self, product_id: &ProductId, quantity: u32) -> Result<()>;
}

#[derive(Debug, Default)]
struct InMemoryInventoryState {
    stock: HashMap<ProductId, u32>,
    reserved: HashMap<ProductId, u32>,
    reserve_calls: usize,
    release_calls: usize,
    fail_on_reserve: bool,
    fail_on_release: bool,
}

impl InMemoryInventoryState {
    fn available(&self, product_id: &ProductId) -> u32 {
        let stock = self.stock.get(product_id).copied().unwrap_or(0);
        let reserved = self.reserved.get(product_id).copied().unwrap_or(0);
        stock.saturating_sub(reserved)
    }
}

/// In-memory inventory for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventory {
    state: Arc<RwLock<InMemoryInventoryState>>,
}

impl InMemoryInventory {
    /// Creates an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this inventory with `quantity` units of the product in stock.
    pub fn with_stock(self, product_id: impl Into<ProductId>, quantity: u32) -> Self {
        self.set_stock(product_id, quantity);
        self
    }

    /// Sets the stock level of a product.
    pub fn set_stock(&self, product_id: impl Into<ProductId>, quantity: u32) {
        self.state
            .write()
            .unwrap()
            .stock
            .insert(product_id.into(), quantity);
    }

    /// Configures the service to fail on reserve calls.
    pub fn set_fail_on_reserve(&self, fail: bool) {
        self.state.write().unwrap().fail_on_reserve = fail;
    }

    /// Configures the service to fail on release calls.
    pub fn set_fail_on_release(&self, fail: bool) {
        self.state.write().unwrap().fail_on_release = fail;
    }

    /// Returns the number of units currently reserved for the product.
    pub fn reserved_quantity(&self, product_id: &ProductId) -> u32 {
        self.state
            .read()
            .unwrap()
            .reserved
            .get(product_id)
            .copied()
            .unwrap_or(0)
    }

    /// Returns how many successful reservations were made.
    pub fn reserve_count(&self) -> usize {
        self.state.read().unwrap().reserve_calls
    }

    /// Returns how many successful releases were made.
    pub fn release_count(&self) -> usize {
        self.state.read().unwrap().release_calls
    }
}

impl InventorySystem for InMemoryInventory {
    fn check_availability(&self, product_id: &ProductId) -> Result<bool> {
        Ok(self.state.read().unwrap().available(product_id) > 0)
    }

    fn reserve_product(&self, product_id: &ProductId, quantity: u32) -> Result<()> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_reserve {
            return Err(PipelineError::Inventory("Reservation rejected".to_string()));
        }

        if state.available(product_id) < quantity {
            return Err(PipelineError::Inventory(format!(
                "Insufficient stock for {product_id}"
            )));
        }

        *state.reserved.entry(product_id.clone()).or_insert(0) += quantity;
        state.reserve_calls += 1;
        Ok(())
    }

    fn release_reservation(&self, product_id: &ProductId, quantity: u32) -> Result<()> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_release {
            return Err(PipelineError::Inventory("Release rejected".to_string()));
        }

        let reserved = state.reserved.get(product_id).copied().unwrap_or(0);
        if reserved < quantity {
            return Err(PipelineError::Inventory(format!(
                "Cannot release {quantity} units of {product_id}: only {reserved} reserved"
            )));
        }

        state.reserved.insert(product_id.clone(), reserved - quantity);
        state.release_calls += 1;
        Ok(())
    }
}
