use std::{
    fmt,
    ops::{Add, AddAssign, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Money amount represented as **integer kobo** (1/100 of a naira).
///
/// Every balance, price, coupon and ledger amount in the engine is a `Money`
/// or its raw `i64` to avoid floating-point drift.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::new(5_000_000);
/// assert_eq!(amount.kobo(), 5_000_000);
/// assert_eq!(amount.to_string(), "₦50,000.00");
/// ```
///
/// Parsing from user input (`,` groups thousands, `.` separates kobo; rejects
/// more than 2 decimals):
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("50,000".parse::<Money>().unwrap().kobo(), 5_000_000);
/// assert_eq!("10.5".parse::<Money>().unwrap().kobo(), 1050);
/// assert!("12.345".parse::<Money>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from integer kobo.
    #[must_use]
    pub const fn new(kobo: i64) -> Self {
        Self(kobo)
    }

    /// Returns the raw value in kobo.
    #[must_use]
    pub const fn kobo(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Total of `amounts`, or `None` if it overflows.
    #[must_use]
    pub fn checked_sum(amounts: impl IntoIterator<Item = Money>) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |total, amount| total.checked_add(amount))
    }

    /// Subtracts `rhs`, flooring the result at zero.
    #[must_use]
    pub fn saturating_floor_sub(self, rhs: Money) -> Money {
        Money((self.0 - rhs.0).max(0))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let naira = (abs / 100).to_string();
        let kobo = abs % 100;

        let mut grouped = String::with_capacity(naira.len() + naira.len() / 3);
        for (i, ch) in naira.chars().enumerate() {
            if i > 0 && (naira.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        write!(f, "{sign}₦{grouped}.{kobo:02}")
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a non-negative decimal string into kobo.
    ///
    /// An optional leading `₦` is accepted and `,` is treated as a thousands
    /// separator.
    ///
    /// Validation rules:
    /// - max 2 fractional digits (rejects `12.345`)
    /// - rejects signs, empty and non-numeric strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidAmount(format!("invalid amount: {s:?}"));
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix('₦').unwrap_or(trimmed).trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidAmount("empty amount".to_string()));
        }

        let digits = trimmed.replace(',', "");
        let mut parts = digits.split('.');
        let naira_str = parts.next().ok_or_else(invalid)?;
        let kobo_str = parts.next();
        if parts.next().is_some() {
            return Err(invalid());
        }

        if naira_str.is_empty() || !naira_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let naira: i64 = naira_str.parse().map_err(|_| overflow())?;

        let kobo: i64 = match kobo_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                match frac.len() {
                    1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                    2 => frac.parse::<i64>().map_err(|_| invalid())?,
                    _ => return Err(EngineError::InvalidAmount("too many decimals".to_string())),
                }
            }
        };

        naira
            .checked_mul(100)
            .and_then(|v| v.checked_add(kobo))
            .map(Money)
            .ok_or_else(overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_sum_reports_overflow() {
        assert_eq!(
            Money::checked_sum([Money::new(1), Money::new(2)]),
            Some(Money::new(3))
        );
        assert_eq!(Money::checked_sum([]), Some(Money::ZERO));
        assert_eq!(Money::checked_sum([Money::new(i64::MAX), Money::new(1)]), None);
    }

    #[test]
    fn display_groups_thousands() {
        assert_eq!(Money::new(0).to_string(), "₦0.00");
        assert_eq!(Money::new(7).to_string(), "₦0.07");
        assert_eq!(Money::new(100_000).to_string(), "₦1,000.00");
        assert_eq!(Money::new(123_456_789).to_string(), "₦1,234,567.89");
        assert_eq!(Money::new(-1050).to_string(), "-₦10.50");
    }

    #[test]
    fn parse_accepts_grouping_and_symbol() {
        assert_eq!("10".parse::<Money>().unwrap().kobo(), 1000);
        assert_eq!("₦50,000".parse::<Money>().unwrap().kobo(), 5_000_000);
        assert_eq!(" 2.30 ".parse::<Money>().unwrap().kobo(), 230);
        assert_eq!("1,000.5".parse::<Money>().unwrap().kobo(), 100_050);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("12.345".parse::<Money>().is_err());
        assert!("-5".parse::<Money>().is_err());
        assert!("NaN".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
        assert!("1.2.3".parse::<Money>().is_err());
    }

    #[test]
    fn floor_sub_never_goes_negative() {
        assert_eq!(Money::new(100).saturating_floor_sub(Money::new(500)), Money::ZERO);
        assert_eq!(Money::new(500).saturating_floor_sub(Money::new(100)), Money::new(400));
    }
}
