use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::common::MarketplaceError;

/// A non-negative amount of money with an ISO 4217-shaped currency code.
///
/// Amounts are rounded to 2 decimal places (half-up) and capped at
/// 999999.99; currency codes are normalized to upper case. The code shape
/// is checked (3 letters) but not validated against a currency registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    amount: Decimal,
    currency: String,
}

impl Price {
    /// Validating factory.
    pub fn of(amount: Decimal, currency: &str) -> Result<Self, MarketplaceError> {
        let max_price = Decimal::new(99_999_999, 2); // 999999.99

        if amount < Decimal::ZERO {
            return Err(MarketplaceError::validation(
                "priceAmount",
                "Price cannot be negative",
            ));
        }

        if amount > max_price {
            return Err(MarketplaceError::validation(
                "priceAmount",
                format!("Price cannot exceed {}", max_price),
            ));
        }

        let normalized = currency.trim();
        if normalized.len() != 3 || !normalized.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(MarketplaceError::validation(
                "priceCurrency",
                "Currency must be a 3-letter ISO code",
            ));
        }

        Ok(Self {
            amount: amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            currency: normalized.to_uppercase(),
        })
    }

    /// Validating factory from a raw float (transport-layer input).
    pub fn of_f64(amount: f64, currency: &str) -> Result<Self, MarketplaceError> {
        let decimal = Decimal::from_f64(amount).ok_or_else(|| {
            MarketplaceError::validation("priceAmount", "Price amount is not a valid number")
        })?;
        Self::of(decimal, currency)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2}", self.currency, self.amount)
    }
}
