//! Fixed-point monetary and token quantities.

use alloy::primitives::U256;
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Largest supported number of fractional digits.
pub const MAX_DECIMALS: u8 = 36;

/// Errors from parsing or arithmetic. Invalid input never becomes zero.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("invalid character in amount '{0}'")]
    InvalidDigit(String),

    #[error("amount '{input}' has more than {decimals} fractional digits")]
    TooManyDecimals { input: String, decimals: u8 },

    #[error("amount '{0}' is negative")]
    Negative(String),

    #[error("amount is not a finite number")]
    NonFinite,

    #[error("amount overflows 256 bits")]
    Overflow,

    #[error("subtraction would go below zero")]
    Underflow,

    #[error("cannot combine amounts with {left} and {right} decimals")]
    ScaleMismatch { left: u8, right: u8 },

    #[error("{0} decimals exceeds the supported maximum of {MAX_DECIMALS}")]
    UnsupportedScale(u8),
}

/// A non-negative quantity stored as integer base units with a fixed scale.
///
/// `Amount::parse("1.5", 18)` holds `1_500_000_000_000_000_000` units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Amount {
    units: U256,
    decimals: u8,
}

impl Amount {
    pub fn zero(decimals: u8) -> Result<Self, AmountError> {
        Self::from_units(U256::ZERO, decimals)
    }

    pub fn from_units(units: U256, decimals: u8) -> Result<Self, AmountError> {
        if decimals > MAX_DECIMALS {
            return Err(AmountError::UnsupportedScale(decimals));
        }
        Ok(Self { units, decimals })
    }

    /// Parse a plain decimal string such as `"1250"`, `"0.05"` or `"  12.5 "`.
    pub fn parse(input: &str, decimals: u8) -> Result<Self, AmountError> {
        if decimals > MAX_DECIMALS {
            return Err(AmountError::UnsupportedScale(decimals));
        }

        let text = input.trim();
        if text.is_empty() {
            return Err(AmountError::Empty);
        }
        if text.starts_with('-') {
            return Err(AmountError::Negative(text.to_string()));
        }
        let text = text.strip_prefix('+').unwrap_or(text);

        let (whole, fraction) = match text.split_once('.') {
            Some((w, f)) => (w, f),
            None => (text, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(AmountError::InvalidDigit(input.to_string()));
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(AmountError::InvalidDigit(input.to_string()));
        }
        if fraction.len() > decimals as usize {
            return Err(AmountError::TooManyDecimals {
                input: input.to_string(),
                decimals,
            });
        }

        let digits = format!("{whole}{fraction:0<width$}", width = decimals as usize);
        let digits = digits.trim_start_matches('0');
        let units = if digits.is_empty() {
            U256::ZERO
        } else {
            U256::from_str_radix(digits, 10).map_err(|_| AmountError::Overflow)?
        };

        Ok(Self { units, decimals })
    }

    /// Convert a float, rounding to `decimals` places.
    pub fn from_f64(value: f64, decimals: u8) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::NonFinite);
        }
        if value < 0.0 {
            return Err(AmountError::Negative(value.to_string()));
        }
        Self::parse(&format!("{value:.prec$}", prec = decimals as usize), decimals)
    }

    pub fn units(&self) -> U256 {
        self.units
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn is_zero(&self) -> bool {
        self.units.is_zero()
    }

    /// Lossy conversion for display and charting only.
    pub fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(f64::INFINITY)
    }

    pub fn checked_add(&self, other: &Amount) -> Result<Amount, AmountError> {
        self.same_scale(other)?;
        let units = self
            .units
            .checked_add(other.units)
            .ok_or(AmountError::Overflow)?;
        Ok(Amount { units, ..*self })
    }

    pub fn checked_sub(&self, other: &Amount) -> Result<Amount, AmountError> {
        self.same_scale(other)?;
        let units = self
            .units
            .checked_sub(other.units)
            .ok_or(AmountError::Underflow)?;
        Ok(Amount { units, ..*self })
    }

    /// Re-express with a different number of decimals, failing if digits would be lost.
    pub fn rescale(&self, decimals: u8) -> Result<Amount, AmountError> {
        if decimals > MAX_DECIMALS {
            return Err(AmountError::UnsupportedScale(decimals));
        }
        let units = match decimals.cmp(&self.decimals) {
            Ordering::Equal => self.units,
            Ordering::Greater => self
                .units
                .checked_mul(pow10(decimals - self.decimals))
                .ok_or(AmountError::Overflow)?,
            Ordering::Less => {
                let divisor = pow10(self.decimals - decimals);
                if !(self.units % divisor).is_zero() {
                    return Err(AmountError::TooManyDecimals {
                        input: self.to_string(),
                        decimals,
                    });
                }
                self.units / divisor
            }
        };
        Ok(Amount { units, decimals })
    }

    fn same_scale(&self, other: &Amount) -> Result<(), AmountError> {
        if self.decimals != other.decimals {
            return Err(AmountError::ScaleMismatch {
                left: self.decimals,
                right: other.decimals,
            });
        }
        Ok(())
    }
}

fn pow10(exp: u8) -> U256 {
    U256::from(10u64).pow(U256::from(exp))
}

impl fmt::Display for Amount {
    /// Decimal notation with trailing fractional zeros removed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.decimals == 0 {
            return write!(f, "{}", self.units);
        }
        let scale = pow10(self.decimals);
        let whole = self.units / scale;
        let fraction = self.units % scale;
        if fraction.is_zero() {
            return write!(f, "{whole}");
        }
        let padded = format!("{:0>width$}", fraction.to_string(), width = self.decimals as usize);
        write!(f, "{whole}.{}", padded.trim_end_matches('0'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scales_to_units() {
        let eth = Amount::parse("1.5", 18).unwrap();
        assert_eq!(eth.units(), U256::from(1_500_000_000_000_000_000u128));

        let fiat = Amount::parse(" 1250.05 ", 2).unwrap();
        assert_eq!(fiat.units(), U256::from(125_005u64));
        assert_eq!(fiat.to_string(), "1250.05");

        assert!(Amount::parse("0", 6).unwrap().is_zero());
        assert_eq!(Amount::parse(".5", 2).unwrap().units(), U256::from(50u64));
    }

    #[test]
    fn test_invalid_input_fails_loudly() {
        assert_eq!(Amount::parse("", 2), Err(AmountError::Empty));
        assert_eq!(Amount::parse("   ", 2), Err(AmountError::Empty));
        assert!(matches!(Amount::parse("12a", 2), Err(AmountError::InvalidDigit(_))));
        assert!(matches!(Amount::parse("1e18", 18), Err(AmountError::InvalidDigit(_))));
        assert!(matches!(Amount::parse(".", 2), Err(AmountError::InvalidDigit(_))));
        assert!(matches!(Amount::parse("-3", 2), Err(AmountError::Negative(_))));
        assert!(matches!(
            Amount::parse("1.234", 2),
            Err(AmountError::TooManyDecimals { decimals: 2, .. })
        ));
        assert_eq!(Amount::parse("1", 40), Err(AmountError::UnsupportedScale(40)));
    }

    #[test]
    fn test_overflow_detected() {
        let huge = "9".repeat(80);
        assert_eq!(Amount::parse(&huge, 0), Err(AmountError::Overflow));

        let max = Amount::from_units(U256::MAX, 0).unwrap();
        let one = Amount::parse("1", 0).unwrap();
        assert_eq!(max.checked_add(&one), Err(AmountError::Overflow));
    }

    #[test]
    fn test_from_f64() {
        assert_eq!(Amount::from_f64(12.34, 2).unwrap().units(), U256::from(1234u64));
        assert_eq!(Amount::from_f64(f64::NAN, 2), Err(AmountError::NonFinite));
        assert_eq!(Amount::from_f64(f64::INFINITY, 2), Err(AmountError::NonFinite));
        assert!(matches!(Amount::from_f64(-1.0, 2), Err(AmountError::Negative(_))));
    }

    #[test]
    fn test_arithmetic() {
        let a = Amount::parse("10.50", 2).unwrap();
        let b = Amount::parse("0.75", 2).unwrap();
        assert_eq!(a.checked_add(&b).unwrap().to_string(), "11.25");
        assert_eq!(a.checked_sub(&b).unwrap().to_string(), "9.75");
        assert_eq!(b.checked_sub(&a), Err(AmountError::Underflow));

        let c = Amount::parse("1", 18).unwrap();
        assert_eq!(
            a.checked_add(&c),
            Err(AmountError::ScaleMismatch { left: 2, right: 18 })
        );
    }

    #[test]
    fn test_rescale_and_float_view() {
        let fiat = Amount::parse("42.10", 2).unwrap();
        let wide = fiat.rescale(6).unwrap();
        assert_eq!(wide.units(), U256::from(42_100_000u64));
        assert_eq!(wide.rescale(1).unwrap().to_string(), "42.1");
        assert!(Amount::parse("42.15", 2).unwrap().rescale(1).is_err());

        assert!((fiat.to_f64() - 42.1).abs() < 1e-9);
    }
}
