//! The validated order record handed to the fulfillment pipeline.

use serde::{Deserialize, Serialize};

use super::OrderError;
use super::value_objects::{Money, ProductId};

/// A customer order as received at intake.
///
/// Orders are immutable once built. Construction goes through
/// [`Order::builder`] (or deserialization, which runs the same checks), so
/// every `Order` has a positive quantity, a non-negative unit price and a
/// subtotal that fits in [`Money`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawOrder")]
pub struct Order {
    product_id: ProductId,
    quantity: u32,
    unit_price: Money,
    customer_email: String,
    card_number: String,
    cvv: String,
    shipping_address: String,
    zip_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    coupon_code: Option<String>,
}

impl Order {
    /// Starts building a new order.
    pub fn builder() -> OrderBuilder {
        OrderBuilder::default()
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn customer_email(&self) -> &str {
        &self.customer_email
    }

    pub fn card_number(&self) -> &str {
        &self.card_number
    }

    pub fn cvv(&self) -> &str {
        &self.cvv
    }

    pub fn shipping_address(&self) -> &str {
        &self.shipping_address
    }

    pub fn zip_code(&self) -> &str {
        &self.zip_code
    }

    /// Returns the coupon code, if the customer supplied a non-blank one.
    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon_code.as_deref()
    }

    /// Returns `quantity * unit_price`. Never overflows for a built order.
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }

    /// Returns the card number with all but the last four digits masked.
    pub fn masked_card_number(&self) -> String {
        let masked = self.card_number.chars().count().saturating_sub(4);
        self.card_number
            .chars()
            .enumerate()
            .map(|(i, c)| if i < masked { '*' } else { c })
            .collect()
    }
}

impl std::fmt::Debug for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Order")
            .field("product_id", &self.product_id)
            .field("quantity", &self.quantity)
            .field("unit_price", &self.unit_price)
            .field("customer_email", &self.customer_email)
            .field("card_number", &self.masked_card_number())
            .field("cvv", &"***")
            .field("shipping_address", &self.shipping_address)
            .field("zip_code", &self.zip_code)
            .field("coupon_code", &self.coupon_code)
            .finish()
    }
}

/// Builder for [`Order`].
#[derive(Debug, Default, Clone)]
pub struct OrderBuilder {
    product_id: Option<ProductId>,
    quantity: Option<u32>,
    unit_price: Option<Money>,
    customer_email: Option<String>,
    card_number: Option<String>,
    cvv: Option<String>,
    shipping_address: Option<String>,
    zip_code: Option<String>,
    coupon_code: Option<String>,
}

impl OrderBuilder {
    pub fn product_id(mut self, product_id: impl Into<ProductId>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn unit_price(mut self, unit_price: Money) -> Self {
        self.unit_price = Some(unit_price);
        self
    }

    pub fn customer_email(mut self, email: impl Into<String>) -> Self {
        self.customer_email = Some(email.into());
        self
    }

    /// Sets the payment card number and its verification code.
    pub fn card(mut self, card_number: impl Into<String>, cvv: impl Into<String>) -> Self {
        self.card_number = Some(card_number.into());
        self.cvv = Some(cvv.into());
        self
    }

    pub fn shipping_address(mut self, address: impl Into<String>) -> Self {
        self.shipping_address = Some(address.into());
        self
    }

    pub fn zip_code(mut self, zip_code: impl Into<String>) -> Self {
        self.zip_code = Some(zip_code.into());
        self
    }

    /// Sets the coupon code. A blank code is treated as no coupon.
    pub fn coupon_code(mut self, code: impl Into<String>) -> Self {
        self.coupon_code = Some(code.into());
        self
    }

    /// Validates the collected fields and builds the order.
    pub fn build(self) -> Result<Order, OrderError> {
        let product_id = self
            .product_id
            .filter(|id| !id.as_str().trim().is_empty())
            .ok_or(OrderError::MissingField {
                field: "product_id",
            })?;

        let quantity = self
            .quantity
            .ok_or(OrderError::MissingField { field: "quantity" })?;
        if quantity == 0 {
            return Err(OrderError::InvalidQuantity { quantity });
        }

        let unit_price = self
            .unit_price
            .ok_or(OrderError::MissingField {
                field: "unit_price",
            })?;
        if unit_price.is_negative() {
            return Err(OrderError::InvalidPrice {
                price: unit_price.cents(),
            });
        }
        if unit_price.checked_multiply(quantity).is_none() {
            return Err(OrderError::SubtotalOverflow {
                quantity,
                unit_price: unit_price.cents(),
            });
        }

        Ok(Order {
            product_id,
            quantity,
            unit_price,
            customer_email: required(self.customer_email, "customer_email")?,
            card_number: required(self.card_number, "card_number")?,
            cvv: required(self.cvv, "cvv")?,
            shipping_address: required(self.shipping_address, "shipping_address")?,
            zip_code: required(self.zip_code, "zip_code")?,
            coupon_code: self.coupon_code.filter(|code| !code.trim().is_empty()),
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, OrderError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(OrderError::MissingField { field })
}

/// Unvalidated wire shape of an order.
#[derive(Deserialize)]
struct RawOrder {
    product_id: ProductId,
    quantity: u32,
    unit_price: Money,
    customer_email: String,
    card_number: String,
    cvv: String,
    shipping_address: String,
    zip_code: String,
    #[serde(default)]
    coupon_code: Option<String>,
}

impl TryFrom<RawOrder> for Order {
    type Error = OrderError;

    fn try_from(raw: RawOrder) -> Result<Self, Self::Error> {
        let mut builder = Order::builder()
            .product_id(raw.product_id)
            .quantity(raw.quantity)
            .unit_price(raw.unit_price)
            .customer_email(raw.customer_email)
            .card(raw.card_number, raw.cvv)
            .shipping_address(raw.shipping_address)
            .zip_code(raw.zip_code);
        if let Some(code) = raw.coupon_code {
            builder = builder.coupon_code(code);
        }
        builder.build()
    }
}
