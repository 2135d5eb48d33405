use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp(2))
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn amount(self) -> Decimal {
        self.0
    }

    /// Parses a monetary cell from a report export. The source mixes
    /// Brazilian (`1.234,56`) and US (`1,234.56`) digit grouping, often
    /// quoted, sometimes a dash placeholder. Anything unparseable is
    /// zero; this never fails.
    pub fn parse_lossy(raw: &str) -> Self {
        let clean: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, '"' | '\''))
            .collect();
        let clean = clean.trim();

        if clean.is_empty() || clean.chars().all(|c| c == '-') {
            return Money::zero();
        }

        let has_comma = clean.contains(',');
        let has_dot = clean.contains('.');

        let normalized = if has_comma && !has_dot {
            // Comma is the decimal separator: 1500,00
            clean.replace(',', ".")
        } else if has_comma && has_dot {
            // Whichever separator comes last is the decimal one.
            if clean.rfind(',') > clean.rfind('.') {
                clean.replace('.', "").replace(',', ".")
            } else {
                clean.replace(',', "")
            }
        } else {
            clean.to_string()
        };

        Decimal::from_str(&normalized)
            .map(Money::from_decimal)
            .unwrap_or_else(|_| Money::zero())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R$ {:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[test]
    fn parse_brazilian_grouping() {
        assert_eq!(Money::parse_lossy("1.234,56").amount(), dec(123456));
        assert_eq!(Money::parse_lossy("1.500,00").amount(), dec(150000));
    }

    #[test]
    fn parse_us_grouping() {
        assert_eq!(Money::parse_lossy("1,234.56").amount(), dec(123456));
    }

    #[test]
    fn parse_comma_as_decimal_separator() {
        assert_eq!(Money::parse_lossy("150,50").amount(), dec(15050));
    }

    #[test]
    fn parse_plain_number() {
        assert_eq!(Money::parse_lossy("200").amount(), Decimal::from(200));
        assert_eq!(Money::parse_lossy("99.90").amount(), dec(9990));
    }

    #[test]
    fn parse_quoted_value() {
        assert_eq!(Money::parse_lossy("\"1.500,00\"").amount(), dec(150000));
    }

    #[test]
    fn parse_placeholders_are_zero() {
        assert!(Money::parse_lossy("").is_zero());
        assert!(Money::parse_lossy("-").is_zero());
        assert!(Money::parse_lossy("-----").is_zero());
    }

    #[test]
    fn parse_garbage_is_zero() {
        assert!(Money::parse_lossy("abc").is_zero());
        assert!(Money::parse_lossy("R$ ???").is_zero());
    }

    #[test]
    fn arithmetic() {
        let a = Money::parse_lossy("100,50");
        let b = Money::parse_lossy("50,25");
        assert_eq!((a + b).amount(), dec(15075));
        assert_eq!((a - b).amount(), dec(5025));
    }

    #[test]
    fn display_two_decimals() {
        assert_eq!(Money::parse_lossy("1500,5").to_string(), "R$ 1500.50");
    }
}
