//! Type-safe price representation using decimal arithmetic.
//!
//! All monetary values the backend returns (item prices, line totals, cart
//! subtotal, delivery fee, tax, order totals) are non-negative amounts in
//! the store's single currency. They are always displayed with exactly two
//! decimal digits.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
}

/// A non-negative monetary amount.
///
/// ## Examples
///
/// ```
/// use food_delivery_core::Price;
/// use rust_decimal::Decimal;
///
/// let price = Price::new(Decimal::new(51, 1)).unwrap();
/// assert_eq!(price.to_fixed(), "5.10");
/// assert_eq!(price.to_string(), "$5.10");
///
/// assert!(Price::new(Decimal::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format with exactly two decimal digits, without a currency symbol.
    ///
    /// Midpoints round away from zero (`1.005` becomes `"1.01"`). Rounding
    /// works on the exact decimal, so it can differ by a cent from
    /// formatting a binary float, where `1.005` is stored just below the
    /// midpoint and formats as `"1.00"`.
    #[must_use]
    pub fn to_fixed(&self) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!("{rounded:.2}")
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.to_fixed())
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}
