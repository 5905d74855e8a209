//! Monetary value type
//!
//! A [`Price`] is an exact decimal amount tied to a currency. Arithmetic and
//! comparison are only defined between prices of the same currency; prices
//! with [`ConversionPolicy::AutoConvert`] can instead convert the right-hand
//! operand through an [`Exchange`] before operating.

use crate::currency::{parse_decimal, CurrencyCode, IntoAmount};
use crate::error::{ExchangeError, PriceError};
use crate::exchange::Exchange;
use crate::formats::FormatRegistry;
use crate::numbers::format::{render_currency, FormatOptions};
use rust_decimal::prelude::{MathematicalOps, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

/// How a price treats right-hand operands in another currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConversionPolicy {
    /// Reject operands in another currency
    #[default]
    Strict,
    /// Convert operands into this price's currency first
    AutoConvert,
}

/// An exact amount of a currency
///
/// Equality and hashing consider the amount's value and the currency, so
/// `USD 2.99000` equals `USD 2.99`. The conversion policy does not take part.
///
/// # Example
/// ```
/// use pricing_sdk::Price;
///
/// let price = Price::new("2.99", "USD").unwrap();
/// let total = price.checked_add(Price::new(1, "USD").unwrap()).unwrap();
/// assert_eq!(total.to_string(), "USD 3.99");
/// ```
#[derive(Clone, Copy)]
pub struct Price {
    amount: Decimal,
    currency: CurrencyCode,
    policy: ConversionPolicy,
}

/// Right-hand side of a price operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Number(Decimal),
    Price(Price),
}

impl Operand {
    fn kind(&self) -> &'static str {
        match self {
            Operand::Number(_) => "Decimal",
            Operand::Price(_) => "Price",
        }
    }
}

impl From<Decimal> for Operand {
    fn from(value: Decimal) -> Self {
        Operand::Number(value)
    }
}

impl From<Price> for Operand {
    fn from(value: Price) -> Self {
        Operand::Price(value)
    }
}

impl From<&Price> for Operand {
    fn from(value: &Price) -> Self {
        Operand::Price(*value)
    }
}

macro_rules! impl_operand_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Operand {
                fn from(value: $t) -> Self {
                    Operand::Number(Decimal::from(value))
                }
            }
        )*
    };
}

impl_operand_int!(i32, i64, u32, u64);

impl Price {
    /// Creates a strict price
    ///
    /// # Arguments
    /// * `amount` - Decimal, integer, float or numeric string
    /// * `currency` - Three uppercase letters, e.g. `"USD"`
    ///
    /// # Errors
    /// Returns `PriceError::InvalidAmount` or `PriceError::InvalidCurrency`.
    pub fn new(amount: impl IntoAmount, currency: &str) -> Result<Self, PriceError> {
        let amount = amount.into_amount()?;
        let currency = CurrencyCode::new(currency)?;
        Ok(Self::from_parts(amount, currency))
    }

    /// Creates a price that converts other currencies automatically
    pub fn convertible(amount: impl IntoAmount, currency: &str) -> Result<Self, PriceError> {
        Ok(Self::new(amount, currency)?.with_policy(ConversionPolicy::AutoConvert))
    }

    pub fn from_parts(amount: Decimal, currency: CurrencyCode) -> Self {
        Self {
            amount,
            currency,
            policy: ConversionPolicy::Strict,
        }
    }

    pub fn zero(currency: CurrencyCode) -> Self {
        Self::from_parts(Decimal::ZERO, currency)
    }

    pub fn with_policy(self, policy: ConversionPolicy) -> Self {
        Self { policy, ..self }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> CurrencyCode {
        self.currency
    }

    pub fn policy(&self) -> ConversionPolicy {
        self.policy
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn to_f64(&self) -> Option<f64> {
        self.amount.to_f64()
    }

    /// Integer part of the amount, truncated toward zero
    pub fn trunc_i64(&self) -> Option<i64> {
        self.amount.trunc().to_i64()
    }

    fn with_amount(&self, amount: Decimal) -> Self {
        Self { amount, ..*self }
    }

    fn ensure_same_currency(&self, other: &Price, operation: &'static str) -> Result<(), PriceError> {
        if self.currency != other.currency {
            return Err(PriceError::currency_mismatch(
                self.currency.as_str(),
                other.currency.as_str(),
                operation,
            ));
        }
        Ok(())
    }

    /// Amount of a number or same-currency price operand
    fn additive_amount(&self, rhs: Operand, operation: &'static str) -> Result<Decimal, PriceError> {
        match rhs {
            Operand::Number(value) => Ok(value),
            Operand::Price(other) => {
                self.ensure_same_currency(&other, operation)?;
                Ok(other.amount)
            }
        }
    }

    /// Amount of an operand that must be a bare number
    fn scalar_amount(rhs: Operand, operation: &'static str) -> Result<Decimal, PriceError> {
        match rhs {
            Operand::Number(value) => Ok(value),
            Operand::Price(_) => Err(PriceError::InvalidOperand {
                operand: rhs.kind(),
                operation,
            }),
        }
    }

    fn nonzero(divisor: Decimal, operation: &'static str) -> Result<Decimal, PriceError> {
        if divisor.is_zero() {
            return Err(PriceError::DivisionByZero { operation });
        }
        Ok(divisor)
    }

    fn overflow(operation: &'static str) -> PriceError {
        PriceError::Overflow { operation }
    }

    // Comparison

    fn compare(&self, other: Operand, operation: &'static str) -> Result<Ordering, PriceError> {
        match other {
            Operand::Number(_) => Err(PriceError::InvalidOperand {
                operand: other.kind(),
                operation,
            }),
            Operand::Price(other) => {
                self.ensure_same_currency(&other, operation)?;
                Ok(self.amount.cmp(&other.amount))
            }
        }
    }

    /// Orders two prices of the same currency
    ///
    /// # Errors
    /// `PriceError::InvalidOperand` for a bare number and
    /// `PriceError::CurrencyMismatch` for a price in another currency.
    pub fn try_cmp(&self, other: impl Into<Operand>) -> Result<Ordering, PriceError> {
        self.compare(other.into(), "cmp")
    }

    pub fn try_lt(&self, other: impl Into<Operand>) -> Result<bool, PriceError> {
        Ok(self.compare(other.into(), "<")? == Ordering::Less)
    }

    pub fn try_le(&self, other: impl Into<Operand>) -> Result<bool, PriceError> {
        Ok(self.compare(other.into(), "<=")? != Ordering::Greater)
    }

    pub fn try_gt(&self, other: impl Into<Operand>) -> Result<bool, PriceError> {
        Ok(self.compare(other.into(), ">")? == Ordering::Greater)
    }

    pub fn try_ge(&self, other: impl Into<Operand>) -> Result<bool, PriceError> {
        Ok(self.compare(other.into(), ">=")? != Ordering::Less)
    }

    // Arithmetic

    /// Adds a number or a same-currency price
    pub fn checked_add(&self, rhs: impl Into<Operand>) -> Result<Price, PriceError> {
        let rhs = self.additive_amount(rhs.into(), "+")?;
        self.amount
            .checked_add(rhs)
            .map(|amount| self.with_amount(amount))
            .ok_or_else(|| Self::overflow("+"))
    }

    /// Subtracts a number or a same-currency price
    pub fn checked_sub(&self, rhs: impl Into<Operand>) -> Result<Price, PriceError> {
        let rhs = self.additive_amount(rhs.into(), "-")?;
        self.amount
            .checked_sub(rhs)
            .map(|amount| self.with_amount(amount))
            .ok_or_else(|| Self::overflow("-"))
    }

    /// Multiplies by a number
    pub fn checked_mul(&self, rhs: impl Into<Operand>) -> Result<Price, PriceError> {
        let rhs = Self::scalar_amount(rhs.into(), "*")?;
        self.amount
            .checked_mul(rhs)
            .map(|amount| self.with_amount(amount))
            .ok_or_else(|| Self::overflow("*"))
    }

    /// Divides by a number
    pub fn checked_div(&self, divisor: Decimal) -> Result<Price, PriceError> {
        let divisor = Self::nonzero(divisor, "/")?;
        self.amount
            .checked_div(divisor)
            .map(|amount| self.with_amount(amount))
            .ok_or_else(|| Self::overflow("/"))
    }

    /// Divides by a same-currency price, yielding a plain ratio
    pub fn ratio(&self, other: &Price) -> Result<Decimal, PriceError> {
        self.ensure_same_currency(other, "/")?;
        let divisor = Self::nonzero(other.amount, "/")?;
        self.amount
            .checked_div(divisor)
            .ok_or_else(|| Self::overflow("/"))
    }

    fn truncated_quotient(
        dividend: Decimal,
        divisor: Decimal,
        operation: &'static str,
    ) -> Result<Decimal, PriceError> {
        let divisor = Self::nonzero(divisor, operation)?;
        dividend
            .checked_div(divisor)
            .map(|quotient| quotient.trunc())
            .ok_or_else(|| Self::overflow(operation))
    }

    /// Divides by a number, truncating toward zero
    pub fn floor_div(&self, divisor: Decimal) -> Result<Price, PriceError> {
        Self::truncated_quotient(self.amount, divisor, "//").map(|q| self.with_amount(q))
    }

    /// Divides by a same-currency price, truncating toward zero
    pub fn floor_ratio(&self, other: &Price) -> Result<Decimal, PriceError> {
        self.ensure_same_currency(other, "//")?;
        Self::truncated_quotient(self.amount, other.amount, "//")
    }

    /// Remainder after division by a number; the sign follows the dividend
    pub fn checked_rem(&self, rhs: impl Into<Operand>) -> Result<Price, PriceError> {
        let divisor = Self::nonzero(Self::scalar_amount(rhs.into(), "%")?, "%")?;
        self.amount
            .checked_rem(divisor)
            .map(|amount| self.with_amount(amount))
            .ok_or_else(|| Self::overflow("%"))
    }

    fn quotient_and_remainder(
        dividend: Decimal,
        divisor: Decimal,
    ) -> Result<(Decimal, Decimal), PriceError> {
        let quotient = Self::truncated_quotient(dividend, divisor, "divmod")?;
        let remainder = dividend
            .checked_rem(divisor)
            .ok_or_else(|| Self::overflow("divmod"))?;
        Ok((quotient, remainder))
    }

    /// Truncated quotient and remainder of division by a number
    pub fn div_rem(&self, divisor: Decimal) -> Result<(Price, Price), PriceError> {
        let (quotient, remainder) = Self::quotient_and_remainder(self.amount, divisor)?;
        Ok((self.with_amount(quotient), self.with_amount(remainder)))
    }

    /// Truncated quotient and remainder of division by a same-currency price
    pub fn div_rem_ratio(&self, other: &Price) -> Result<(Decimal, Decimal), PriceError> {
        self.ensure_same_currency(other, "divmod")?;
        Self::quotient_and_remainder(self.amount, other.amount)
    }

    /// Raises the amount to a numeric power
    pub fn checked_pow(&self, rhs: impl Into<Operand>) -> Result<Price, PriceError> {
        let exponent = Self::scalar_amount(rhs.into(), "**")?;
        if self.amount.is_sign_negative() && !self.amount.is_zero() && !exponent.fract().is_zero() {
            return Err(PriceError::InvalidOperand {
                operand: "fractional exponent of a negative amount",
                operation: "**",
            });
        }
        let amount = match exponent.to_i64() {
            Some(exp) if exponent.fract().is_zero() => self.amount.checked_powi(exp),
            _ => self.amount.checked_powd(exponent),
        };
        amount
            .map(|amount| self.with_amount(amount))
            .ok_or_else(|| Self::overflow("**"))
    }

    // Unary

    pub fn pos(&self) -> Price {
        *self
    }

    pub fn abs(&self) -> Price {
        self.with_amount(self.amount.abs())
    }

    /// Rounds to a whole amount, ties to even
    pub fn round(&self) -> Price {
        self.round_dp(0)
    }

    /// Rounds to `dp` decimal places, ties to even
    pub fn round_dp(&self, dp: u32) -> Price {
        self.with_amount(
            self.amount
                .round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven),
        )
    }

    // Conversion

    /// Converts into another currency through an exchange
    ///
    /// # Arguments
    /// * `target` - Currency to convert into
    /// * `exchange` - Exchange quoting the pair
    ///
    /// # Returns
    /// * `Ok(Price)` - The converted price, or `self` if already in `target`
    /// * `Err(PriceError::Exchange)` - No backend installed, no quotation for
    ///   the pair, or the backend failed
    pub async fn to(&self, target: CurrencyCode, exchange: &Exchange) -> Result<Price, PriceError> {
        if self.currency == target {
            return Ok(*self);
        }

        let Some(quotation) = exchange.quotation(&self.currency, &target).await? else {
            let backend = exchange.backend_name().await.unwrap_or_default();
            return Err(ExchangeError::rate_not_found(
                backend,
                self.currency.as_str(),
                target.as_str(),
            )
            .into());
        };

        let amount = self
            .amount
            .checked_mul(quotation)
            .ok_or_else(|| Self::overflow("to"))?;
        Ok(Self {
            amount,
            currency: target,
            policy: self.policy,
        })
    }

    /// Brings `other` into this price's currency when auto-converting
    ///
    /// Strict prices return `other` untouched, so a later operation reports
    /// the currency mismatch.
    pub async fn align(&self, other: &Price, exchange: &Exchange) -> Result<Price, PriceError> {
        match self.policy {
            ConversionPolicy::AutoConvert if other.currency != self.currency => {
                other.to(self.currency, exchange).await
            }
            _ => Ok(*other),
        }
    }

    pub async fn add_converted(&self, other: &Price, exchange: &Exchange) -> Result<Price, PriceError> {
        let other = self.align(other, exchange).await?;
        self.checked_add(other)
    }

    pub async fn sub_converted(&self, other: &Price, exchange: &Exchange) -> Result<Price, PriceError> {
        let other = self.align(other, exchange).await?;
        self.checked_sub(other)
    }

    pub async fn ratio_converted(
        &self,
        other: &Price,
        exchange: &Exchange,
    ) -> Result<Decimal, PriceError> {
        let other = self.align(other, exchange).await?;
        self.ratio(&other)
    }

    pub async fn floor_ratio_converted(
        &self,
        other: &Price,
        exchange: &Exchange,
    ) -> Result<Decimal, PriceError> {
        let other = self.align(other, exchange).await?;
        self.floor_ratio(&other)
    }

    pub async fn div_rem_converted(
        &self,
        other: &Price,
        exchange: &Exchange,
    ) -> Result<(Decimal, Decimal), PriceError> {
        let other = self.align(other, exchange).await?;
        self.div_rem_ratio(&other)
    }

    pub async fn cmp_converted(
        &self,
        other: &Price,
        exchange: &Exchange,
    ) -> Result<Ordering, PriceError> {
        let other = self.align(other, exchange).await?;
        self.try_cmp(other)
    }

    // Text

    /// Renders the price for display
    ///
    /// # Arguments
    /// * `options` - Locale, pattern and precision options
    /// * `formats` - Custom currency formats, looked up by this price's code
    pub fn format(&self, options: &FormatOptions, formats: &FormatRegistry) -> Result<String, PriceError> {
        let registered = formats.format_for(&self.currency);
        Ok(render_currency(
            self.amount,
            self.currency.as_str(),
            options,
            registered,
        )?)
    }

    /// Renders `"<CODE> <amount>"` with comma-grouped integer digits
    pub fn display_grouped(&self) -> String {
        let text = self.amount.to_string();
        let (sign, digits) = match text.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", text.as_str()),
        };
        let (integer, fraction) = match digits.split_once('.') {
            Some((integer, fraction)) => (integer, Some(fraction)),
            None => (digits, None),
        };

        let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
        for (i, digit) in integer.chars().enumerate() {
            if i > 0 && (integer.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }

        match fraction {
            Some(fraction) => format!("{} {}{}.{}", self.currency, sign, grouped, fraction),
            None => format!("{} {}{}", self.currency, sign, grouped),
        }
    }

    /// Parses `"<CODE> <amount>"`, ignoring commas
    ///
    /// # Errors
    /// Returns `PriceError::Parse` wrapping the underlying cause.
    pub fn parse(input: &str) -> Result<Self, PriceError> {
        let cleaned = input.replace(',', "");
        let parts: Vec<&str> = cleaned.trim().split(' ').collect();
        let [currency, amount] = parts.as_slice() else {
            return Err(PriceError::parse(
                input,
                PriceError::InvalidAmount(format!(
                    "expected 2 space-separated parts, got {}",
                    parts.len()
                )),
            ));
        };

        parse_decimal(amount)
            .and_then(|amount| Ok(Self::from_parts(amount, CurrencyCode::new(currency)?)))
            .map_err(|e| PriceError::parse(input, e))
    }
}

impl PartialEq for Price {
    fn eq(&self, other: &Self) -> bool {
        self.currency == other.currency && self.amount == other.amount
    }
}

impl Eq for Price {}

impl Hash for Price {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.amount.normalize().hash(state);
        self.currency.hash(state);
    }
}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.currency != other.currency {
            return None;
        }
        self.amount.partial_cmp(&other.amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.currency, self.amount)
    }
}

impl fmt::Debug for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.policy {
            ConversionPolicy::Strict => write!(f, "Price({} {})", self.currency, self.amount),
            ConversionPolicy::AutoConvert => {
                write!(f, "Price({} {}, auto-convert)", self.currency, self.amount)
            }
        }
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

impl Neg for Price {
    type Output = Price;

    fn neg(self) -> Price {
        self.with_amount(-self.amount)
    }
}

/// # Panics
/// Panics when the result overflows `Decimal`; use [`Price::checked_add`]
/// to get an error instead.
impl Add<Decimal> for Price {
    type Output = Price;

    fn add(self, rhs: Decimal) -> Price {
        self.with_amount(self.amount + rhs)
    }
}

/// # Panics
/// Panics when the result overflows `Decimal`; use [`Price::checked_sub`]
/// to get an error instead.
impl Sub<Decimal> for Price {
    type Output = Price;

    fn sub(self, rhs: Decimal) -> Price {
        self.with_amount(self.amount - rhs)
    }
}

/// # Panics
/// Panics when the result overflows `Decimal`; use [`Price::checked_mul`]
/// to get an error instead.
impl Mul<Decimal> for Price {
    type Output = Price;

    fn mul(self, rhs: Decimal) -> Price {
        self.with_amount(self.amount * rhs)
    }
}

/// # Panics
/// Panics when the result overflows `Decimal`; use [`Price::checked_add`]
/// to get an error instead.
impl Add<Price> for Decimal {
    type Output = Price;

    fn add(self, rhs: Price) -> Price {
        rhs.with_amount(self + rhs.amount)
    }
}

/// # Panics
/// Panics when the result overflows `Decimal`; use [`Price::checked_sub`]
/// to get an error instead.
impl Sub<Price> for Decimal {
    type Output = Price;

    fn sub(self, rhs: Price) -> Price {
        rhs.with_amount(self - rhs.amount)
    }
}

/// # Panics
/// Panics when the result overflows `Decimal`; use [`Price::checked_mul`]
/// to get an error instead.
impl Mul<Price> for Decimal {
    type Output = Price;

    fn mul(self, rhs: Price) -> Price {
        rhs.with_amount(self * rhs.amount)
    }
}
