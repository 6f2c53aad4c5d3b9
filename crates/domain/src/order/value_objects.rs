//! Value objects for the order domain.

use serde::{Deserialize, Serialize};

use super::OrderError;

/// Product identifier (SKU).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new product ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the product ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Money amount represented in cents to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = $10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a new Money amount from a dollar value.
    pub const fn from_dollars(dollars: i64) -> Self {
        Self {
            cents: dollars * 100,
        }
    }

    /// Returns zero money.
    pub const fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the dollar portion (whole number).
    pub fn dollars(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after dollars).
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }

    /// Multiplies by a quantity, saturating at the bounds of the
    /// representable range.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents.saturating_mul(i64::from(quantity)),
        }
    }

    /// Multiplies by a quantity, returning `None` on overflow.
    pub fn checked_multiply(&self, quantity: u32) -> Option<Money> {
        self.cents
            .checked_mul(i64::from(quantity))
            .map(Money::from_cents)
    }

    /// Returns the given fraction of this amount, rounded half away from
    /// zero to the nearest cent.
    pub fn apply_rate(&self, rate: DiscountRate) -> Money {
        let scaled = i128::from(self.cents) * i128::from(rate.basis_points());
        let half = i128::from(DiscountRate::SCALE / 2);
        let rounded = if scaled < 0 {
            (scaled - half) / i128::from(DiscountRate::SCALE)
        } else {
            (scaled + half) / i128::from(DiscountRate::SCALE)
        };
        // |rate| <= 1, so the result never exceeds the original magnitude.
        Money {
            cents: rounded as i64,
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-${}.{:02}", self.dollars().abs(), self.cents_part())
        } else {
            write!(f, "${}.{:02}", self.dollars(), self.cents_part())
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents.saturating_add(rhs.cents),
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents.saturating_sub(rhs.cents),
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.cents = self.cents.saturating_add(rhs.cents);
    }
}

impl std::ops::SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.cents = self.cents.saturating_sub(rhs.cents);
    }
}

/// A fraction between 0% and 100%, stored in basis points (1/100 of a percent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Basis points in a whole (100%).
    pub const SCALE: u32 = 10_000;

    /// Creates a rate from basis points (1000 = 10%).
    pub fn from_basis_points(basis_points: u32) -> Result<Self, OrderError> {
        if basis_points > Self::SCALE {
            return Err(OrderError::InvalidDiscountRate { basis_points });
        }
        Ok(Self(basis_points))
    }

    /// Creates a rate from a whole percentage.
    pub fn from_percent(percent: u32) -> Result<Self, OrderError> {
        Self::from_basis_points(percent.saturating_mul(100))
    }

    /// Returns the rate in basis points.
    pub fn basis_points(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for DiscountRate {
    type Error = OrderError;

    fn try_from(basis_points: u32) -> Result<Self, Self::Error> {
        Self::from_basis_points(basis_points)
    }
}

impl From<DiscountRate> for u32 {
    fn from(rate: DiscountRate) -> Self {
        rate.0
    }
}

impl std::fmt::Display for DiscountRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

/// Parcel weight in grams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weight {
    grams: u64,
}

/// Shipping weight of a single unit of any product (0.5 kg).
pub const WEIGHT_PER_UNIT: Weight = Weight::from_grams(500);

impl Weight {
    /// Creates a weight from grams.
    pub const fn from_grams(grams: u64) -> Self {
        Self { grams }
    }

    /// Returns the parcel weight for `quantity` units.
    pub fn for_quantity(quantity: u32) -> Self {
        Self {
            grams: WEIGHT_PER_UNIT.grams * u64::from(quantity),
        }
    }

    /// Returns the weight in grams.
    pub fn grams(&self) -> u64 {
        self.grams
    }
}

impl std::fmt::Display for Weight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:03} kg", self.grams / 1000, self.grams % 1000)
    }
}
