//! Inclusive price ranges

use crate::currency::CurrencyCode;
use crate::error::PriceError;
use crate::price::{Operand, Price};
use serde::{Deserialize, Serialize};

/// An inclusive range of prices in one currency
///
/// Both bounds share a currency and `start <= stop`; every constructor
/// enforces this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPriceRange")]
pub struct PriceRange {
    start: Price,
    stop: Price,
}

#[derive(Deserialize)]
struct RawPriceRange {
    start: Price,
    stop: Price,
}

impl TryFrom<RawPriceRange> for PriceRange {
    type Error = PriceError;

    fn try_from(raw: RawPriceRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.stop)
    }
}

/// Right-hand side of range arithmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOperand {
    /// Shift both bounds by a price
    Price(Price),
    /// Combine bound-wise with another range
    Range(PriceRange),
}

impl From<Price> for RangeOperand {
    fn from(value: Price) -> Self {
        RangeOperand::Price(value)
    }
}

impl From<PriceRange> for RangeOperand {
    fn from(value: PriceRange) -> Self {
        RangeOperand::Range(value)
    }
}

impl RangeOperand {
    fn currency(&self) -> CurrencyCode {
        match self {
            RangeOperand::Price(price) => price.currency(),
            RangeOperand::Range(range) => range.currency(),
        }
    }

    /// Bounds to combine with, in start/stop order
    fn bounds(&self) -> (Price, Price) {
        match self {
            RangeOperand::Price(price) => (*price, *price),
            RangeOperand::Range(range) => (range.start, range.stop),
        }
    }
}

impl PriceRange {
    /// Creates a range from two bounds
    ///
    /// # Errors
    /// Returns `PriceError::InvalidRange` if the bounds differ in currency or
    /// `start` is greater than `stop`.
    pub fn new(start: Price, stop: Price) -> Result<Self, PriceError> {
        if start.currency() != stop.currency() {
            return Err(PriceError::InvalidRange(format!(
                "{} and {} are not same currency",
                start, stop
            )));
        }
        if start.amount() > stop.amount() {
            return Err(PriceError::InvalidRange(format!(
                "Cannot create a range from {} to {}",
                start, stop
            )));
        }
        Ok(Self { start, stop })
    }

    pub fn start(&self) -> Price {
        self.start
    }

    pub fn stop(&self) -> Price {
        self.stop
    }

    pub fn currency(&self) -> CurrencyCode {
        self.start.currency()
    }

    /// Returns true if `item` lies within the range, bounds included
    ///
    /// # Errors
    /// `PriceError::InvalidOperand` for a bare number and
    /// `PriceError::CurrencyMismatch` for a price in another currency.
    pub fn contains(&self, item: impl Into<Operand>) -> Result<bool, PriceError> {
        let item = item.into();
        Ok(self.start.try_le(item)? && self.stop.try_ge(item)?)
    }

    fn combine(
        &self,
        other: RangeOperand,
        operation: &'static str,
        op: impl Fn(&Price, Price) -> Result<Price, PriceError>,
    ) -> Result<PriceRange, PriceError> {
        if other.currency() != self.currency() {
            return Err(PriceError::currency_mismatch(
                self.currency().as_str(),
                other.currency().as_str(),
                operation,
            ));
        }
        let (start, stop) = other.bounds();
        Self::new(op(&self.start, start)?, op(&self.stop, stop)?)
    }

    /// Shifts by a price or adds another range bound-wise
    pub fn checked_add(&self, other: impl Into<RangeOperand>) -> Result<PriceRange, PriceError> {
        self.combine(other.into(), "+", |bound, rhs| bound.checked_add(rhs))
    }

    /// Shifts down by a price or subtracts another range bound-wise
    ///
    /// Subtracting a wider range can invert the bounds, which fails with
    /// `PriceError::InvalidRange`.
    pub fn checked_sub(&self, other: impl Into<RangeOperand>) -> Result<PriceRange, PriceError> {
        self.combine(other.into(), "-", |bound, rhs| bound.checked_sub(rhs))
    }

    /// Returns a validated copy with the given bounds replaced
    pub fn evolve(&self, start: Option<Price>, stop: Option<Price>) -> Result<PriceRange, PriceError> {
        Self::new(start.unwrap_or(self.start), stop.unwrap_or(self.stop))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd(amount: &str) -> Price {
        Price::new(amount, "USD").unwrap()
    }

    fn range(start: &str, stop: &str) -> PriceRange {
        PriceRange::new(usd(start), usd(stop)).unwrap()
    }

    #[test]
    fn test_correct_price_range() {
        let r = range("32.44", "40.33");
        assert_eq!(r.currency(), CurrencyCode::USD);
        assert_eq!(r.start(), usd("32.44"));
        assert_eq!(r.stop(), usd("40.33"));
    }

    #[test]
    fn test_incorrect_price_range() {
        assert!(matches!(
            PriceRange::new(usd("43"), usd("23")),
            Err(PriceError::InvalidRange(_))
        ));
        let eur = Price::new("50", "EUR").unwrap();
        assert!(matches!(
            PriceRange::new(usd("43"), eur),
            Err(PriceError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_price_range_containment() {
        let r = range("32.44", "40.33");
        assert!(r.contains(usd("36.00")).unwrap());
        assert!(r.contains(usd("32.44")).unwrap());
        assert!(r.contains(usd("40.33")).unwrap());
        assert!(!r.contains(usd("50.00")).unwrap());

        assert!(matches!(
            r.contains(dec!(36)),
            Err(PriceError::InvalidOperand { .. })
        ));
        assert!(matches!(
            r.contains(Price::new("36", "EUR").unwrap()),
            Err(PriceError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_range_arithmetic() {
        let r = range("10", "20");
        assert_eq!(r.checked_add(usd("5")).unwrap(), range("15", "25"));
        assert_eq!(r.checked_sub(usd("5")).unwrap(), range("5", "15"));
        assert_eq!(r.checked_add(range("1", "2")).unwrap(), range("11", "22"));
        assert_eq!(r.checked_sub(range("1", "2")).unwrap(), range("9", "18"));

        assert!(matches!(
            r.checked_sub(range("5", "20")),
            Err(PriceError::InvalidRange(_))
        ));
        assert!(matches!(
            r.checked_add(Price::new("1", "EUR").unwrap()),
            Err(PriceError::CurrencyMismatch { operation: "+", .. })
        ));
    }

    #[test]
    fn test_evolve_price_range() {
        let r = range("32.44", "40.33");
        let evolved = r.evolve(None, Some(usd("60.00"))).unwrap();
        assert_eq!(evolved.start(), usd("32.44"));
        assert_eq!(evolved.stop(), usd("60.00"));
        assert!(r.evolve(Some(usd("50")), None).is_err());
    }

    #[test]
    fn test_serde_validates_bounds() {
        let r = range("1", "2");
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, r#"{"start":"USD 1","stop":"USD 2"}"#);
        assert_eq!(serde_json::from_str::<PriceRange>(&json).unwrap(), r);
        assert!(serde_json::from_str::<PriceRange>(r#"{"start":"USD 3","stop":"USD 2"}"#).is_err());
    }
}
