//! Safe financial arithmetic using fixed-point decimal
//!
//! Charge amounts travel between the browser-facing API, the server and the
//! platform as decimal strings such as `"19.99"`. This module keeps them in a
//! `Decimal` end to end. **NEVER use f64 for charge amounts!**
//!
//! - All arithmetic is exact (no rounding errors)
//! - Scale is preserved (`"1.00"` renders as `"1.00"`, not `"1"`)
//! - Serializes as string (preserves precision)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decimal charge amount in the platform's settlement currency.
///
/// # Examples
///
/// ```rust
/// use chargekit_lib::Amount;
///
/// let allowance = Amount::from_str_checked("19.99").unwrap();
/// let charge = Amount::from_str_checked("1.00").unwrap();
/// let remaining = allowance.checked_sub(&charge).unwrap();
/// assert_eq!(remaining.to_string(), "18.99");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount {
    // Decimal serializes as a string with the serde feature
    value: Decimal,
}

impl Amount {
    /// Create from decimal string (e.g., "123.45")
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the string cannot be parsed as a valid decimal.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chargekit_lib::Amount;
    /// let amt = Amount::from_str_checked("100.50").unwrap();
    /// assert_eq!(amt.to_string(), "100.50");
    /// assert!(Amount::from_str_checked("ten dollars").is_err());
    /// ```
    pub fn from_str_checked(s: &str) -> Result<Self, String> {
        Decimal::from_str(s.trim())
            .map(|value| Self { value })
            .map_err(|e| format!("Invalid amount: {}", e))
    }

    /// Create from a mantissa and scale: `Amount::new(1999, 2)` is `19.99`.
    pub fn new(mantissa: i64, scale: u32) -> Self {
        Self {
            value: Decimal::new(mantissa, scale),
        }
    }

    /// The amount charged when a request leaves it out (`1.00`).
    pub fn default_charge() -> Self {
        Self {
            value: Decimal::new(100, 2),
        }
    }

    /// Get zero amount
    pub fn zero() -> Self {
        Self {
            value: Decimal::ZERO,
        }
    }

    /// Check if amount is zero
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Check if amount is strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.value > Decimal::ZERO
    }

    /// Checked addition (returns None on overflow)
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        self.value
            .checked_add(other.value)
            .map(|value| Self { value })
    }

    /// Checked subtraction (returns None on overflow)
    ///
    /// A negative result is still returned; use [`Self::is_within_limit`]
    /// first when the caller must not go below zero.
    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        self.value
            .checked_sub(other.value)
            .map(|value| Self { value })
    }

    /// Check if this amount is less than or equal to another
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chargekit_lib::Amount;
    /// let charge = Amount::from_str_checked("5.00").unwrap();
    /// let remaining = Amount::from_str_checked("4.99").unwrap();
    /// assert!(!charge.is_within_limit(&remaining));
    /// ```
    pub fn is_within_limit(&self, limit: &Self) -> bool {
        self.value <= limit.value
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::default_charge()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl FromStr for Amount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_checked(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_charge_keeps_two_decimals() {
        assert_eq!(Amount::default_charge().to_string(), crate::DEFAULT_CHARGE_AMOUNT);
        assert_eq!(Amount::default(), Amount::default_charge());
    }

    #[test]
    fn test_subtraction_preserves_scale() {
        let allowance = Amount::from_str_checked("19.99").unwrap();
        let remaining = allowance
            .checked_sub(&Amount::default_charge())
            .unwrap();
        assert_eq!(remaining.to_string(), "18.99");
    }

    #[test]
    fn test_limits() {
        let remaining = Amount::from_str_checked("0.50").unwrap();
        assert!(!Amount::default_charge().is_within_limit(&remaining));
        assert!(Amount::from_str_checked("0.5").unwrap().is_within_limit(&remaining));
        assert!(Amount::zero().is_zero());
        assert!(!Amount::zero().is_positive());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(Amount::from_str_checked("").is_err());
        assert!(Amount::from_str_checked("1.0.0").is_err());
        assert!("abc".parse::<Amount>().is_err());
        assert_eq!(" 2.50 ".parse::<Amount>().unwrap().to_string(), "2.50");
    }

    #[test]
    fn test_serializes_as_string() {
        let amt = Amount::from_str_checked("19.99").unwrap();
        let json = serde_json::to_string(&amt).unwrap();
        assert_eq!(json, "\"19.99\"");

        let back: Amount = serde_json::from_str("\"19.99\"").unwrap();
        assert_eq!(back, amt);
    }
}
