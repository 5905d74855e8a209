//! Rendering decimal values through parsed CLDR patterns

use super::locale::{currency_digits, Locale};
use super::pattern::NumberPattern;
use crate::constants::DEFAULT_LOCALE;
use crate::error::FormatError;
use crate::formats::CurrencyFormat;
use rust_decimal::{Decimal, RoundingStrategy};

/// Largest scale a `Decimal` can carry
const MAX_SCALE: i32 = 28;

/// Caller-facing formatting options
///
/// Unset fields fall back to a registered [`CurrencyFormat`] when one exists,
/// and then to the defaults: locale `en_US`, the `standard` style, currency
/// digits and decimal quantization both enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatOptions {
    pub locale: Option<String>,
    pub pattern: Option<String>,
    pub format_type: Option<String>,
    pub currency_digits: Option<bool>,
    pub decimal_quantization: Option<bool>,
}

impl FormatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_format_type(mut self, format_type: impl Into<String>) -> Self {
        self.format_type = Some(format_type.into());
        self
    }

    pub fn with_currency_digits(mut self, currency_digits: bool) -> Self {
        self.currency_digits = Some(currency_digits);
        self
    }

    pub fn with_decimal_quantization(mut self, decimal_quantization: bool) -> Self {
        self.decimal_quantization = Some(decimal_quantization);
        self
    }

    /// Resolves the configured locale, defaulting to `en_US`
    pub fn resolve_locale(&self) -> Result<Locale, FormatError> {
        Locale::parse(self.locale.as_deref().unwrap_or(DEFAULT_LOCALE))
    }

    /// Returns the named style, defaulting to `standard`
    pub fn format_type(&self) -> &str {
        self.format_type.as_deref().unwrap_or("standard")
    }
}

/// Resolved options for a single [`NumberPattern::apply`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Force the currency's natural decimal digits
    pub currency_digits: bool,
    /// Round to the pattern's precision
    pub decimal_quantization: bool,
    /// Natural digits overriding the CLDR table
    pub digits: Option<u32>,
    /// Replacement for the `¤` label
    pub symbol: Option<String>,
    /// Replacement for the `¤¤¤` label
    pub name: Option<String>,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            currency_digits: true,
            decimal_quantization: true,
            digits: None,
            symbol: None,
            name: None,
        }
    }
}

impl NumberPattern {
    /// Renders `value` as a currency amount
    ///
    /// # Arguments
    /// * `value` - Amount to render
    /// * `locale` - Locale supplying symbols and currency labels
    /// * `currency` - Currency code substituted into `¤` placeholders
    /// * `options` - Precision handling and label overrides
    ///
    /// # Returns
    /// * `Ok(String)` - The rendered amount
    /// * `Err(FormatError)` - Decimal scaling exceeded the supported range
    pub fn apply(
        &self,
        value: Decimal,
        locale: &Locale,
        currency: &str,
        options: &ApplyOptions,
    ) -> Result<String, FormatError> {
        let value = scaleb(value, self.scale)?;
        let is_negative = value.is_sign_negative();
        let magnitude = value.abs().normalize();

        let mut frac_prec = self.frac_prec;
        let mut fixed_digits = false;
        if options.currency_digits {
            let digits = options.digits.unwrap_or_else(|| currency_digits(currency)) as usize;
            frac_prec = (digits, digits);
            // A currency without a minor unit never shows fraction digits.
            fixed_digits = digits == 0;
        }

        let number = match self.exp_prec {
            Some((exp_min, _)) => {
                let (shifted, exponent, sign) = self.scientific_elements(magnitude, locale)?;
                if !fixed_digits && (!options.decimal_quantization || frac_prec == (0, 0)) {
                    frac_prec.1 = frac_prec.1.max(decimal_precision(shifted));
                }
                format!(
                    "{}{}{}{}",
                    self.quantize_value(shifted, locale, frac_prec),
                    locale.exponential_symbol(),
                    sign,
                    self.format_int(&exponent.to_string(), exp_min, locale)
                )
            }
            None if self.is_significant() => {
                let text = format_significant(magnitude, self.int_prec.0, self.int_prec.1)?;
                let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
                let mut number = self.format_int(integer, 0, locale);
                if !fraction.is_empty() {
                    number.push_str(locale.decimal_symbol());
                    number.push_str(fraction);
                }
                number
            }
            None => {
                if !fixed_digits && !options.decimal_quantization {
                    frac_prec.1 = frac_prec.1.max(decimal_precision(magnitude));
                }
                self.quantize_value(magnitude, locale, frac_prec)
            }
        };

        let (prefix, suffix) = if is_negative {
            (&self.prefix.1, &self.suffix.1)
        } else {
            (&self.prefix.0, &self.suffix.0)
        };
        let mut rendered = format!("{}{}{}", prefix, number, suffix);

        if rendered.contains('¤') {
            let name = options
                .name
                .clone()
                .unwrap_or_else(|| locale.currency_name(currency, magnitude));
            let symbol = options
                .symbol
                .clone()
                .unwrap_or_else(|| locale.currency_symbol(currency));
            rendered = rendered
                .replace("¤¤¤", &name)
                .replace("¤¤", &currency.to_uppercase())
                .replace('¤', &symbol);
        }

        Ok(rendered)
    }

    /// Shifts `value` to one leading digit group and returns the exponent
    fn scientific_elements(
        &self,
        value: Decimal,
        locale: &Locale,
    ) -> Result<(Decimal, u32, &'static str), FormatError> {
        let exponent = adjusted(value);
        let value = scaleb(value, -exponent)?;

        let lead_shift = self.int_prec.0.max(1) as i32 - 1;
        let exponent = exponent - lead_shift;
        let value = scaleb(value, lead_shift)?;

        let sign = if exponent < 0 {
            locale.minus_sign()
        } else if self.exp_plus {
            locale.plus_sign()
        } else {
            ""
        };
        Ok((value, exponent.unsigned_abs(), sign))
    }

    fn quantize_value(&self, value: Decimal, locale: &Locale, frac_prec: (usize, usize)) -> String {
        let dp = frac_prec.1.min(MAX_SCALE as usize) as u32;
        let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven);
        let text = rounded.to_string();
        let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
        let fraction = if fraction.is_empty() { "0" } else { fraction };
        format!(
            "{}{}",
            self.format_int(integer, self.int_prec.0, locale),
            format_frac(fraction, locale, frac_prec)
        )
    }

    /// Pads an integer digit run to `min` and inserts group separators
    fn format_int(&self, digits: &str, min: usize, locale: &Locale) -> String {
        let mut value = String::with_capacity(digits.len().max(min));
        if digits.len() < min {
            value.push_str(&"0".repeat(min - digits.len()));
        }
        value.push_str(digits);

        let mut groups: Vec<&str> = Vec::new();
        let mut rest = value.as_str();
        let mut size = self.grouping.0;
        while size > 0 && rest.len() > size {
            let split = rest.len() - size;
            groups.push(&rest[split..]);
            rest = &rest[..split];
            size = self.grouping.1;
        }

        let mut out = rest.to_string();
        for group in groups.iter().rev() {
            out.push_str(locale.group_symbol());
            out.push_str(group);
        }
        out
    }
}

fn format_frac(digits: &str, locale: &Locale, (min, max): (usize, usize)) -> String {
    let mut value = digits.to_string();
    if value.len() < min {
        value.push_str(&"0".repeat(min - value.len()));
    }
    if max == 0 || (min == 0 && value.bytes().all(|b| b == b'0')) {
        return String::new();
    }
    while value.len() > min && value.ends_with('0') {
        value.pop();
    }
    format!("{}{}", locale.decimal_symbol(), value)
}

/// Rounds to `max` significant digits and pads to `min`
fn format_significant(value: Decimal, min: usize, max: usize) -> Result<String, FormatError> {
    let exponent = adjusted(value);
    let scale = max as i32 - 1 - exponent;
    let digits = scaleb(value, scale)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
        .to_string();

    if scale <= 0 {
        return Ok(format!("{}{}", digits, "0".repeat((-scale) as usize)));
    }

    let scale = scale as usize;
    let len = digits.len();
    let intpart = if len > scale { &digits[..len - scale] } else { "" };
    let i = intpart.len();
    let j = i + min.saturating_sub(i);
    let fill = (-(exponent + 1).min(0)) as usize;
    let fracpart = &digits[i.min(len)..j.min(len)];
    let fracextra = digits[j.min(len)..].trim_end_matches('0');

    let result = format!(
        "{}.{}{}{}",
        if intpart.is_empty() { "0" } else { intpart },
        "0".repeat(fill),
        fracpart,
        fracextra
    );
    Ok(result.trim_end_matches('.').to_string())
}

/// Count of fractional digits once trailing zeros are dropped
fn decimal_precision(value: Decimal) -> usize {
    value.normalize().scale() as usize
}

/// Exponent of the most significant digit
fn adjusted(value: Decimal) -> i32 {
    let mantissa = value.mantissa().unsigned_abs();
    if mantissa == 0 {
        return 0;
    }
    let digits = mantissa.to_string().len() as i32;
    digits - 1 - value.scale() as i32
}

/// Multiplies `value` by `10^exp` without rounding
fn scaleb(value: Decimal, exp: i32) -> Result<Decimal, FormatError> {
    if exp == 0 {
        return Ok(value);
    }
    let overflow = || FormatError::Overflow(format!("{} scaled by 10^{}", value, exp));
    let value = if exp < 0 { value.normalize() } else { value };
    let scale = value.scale() as i32 - exp;

    if scale > MAX_SCALE {
        return Err(overflow());
    }
    if scale >= 0 {
        return Decimal::try_from_i128_with_scale(value.mantissa(), scale as u32)
            .map_err(|_| overflow());
    }

    let factor = 10i128.checked_pow((-scale) as u32).ok_or_else(overflow)?;
    let mantissa = value.mantissa().checked_mul(factor).ok_or_else(overflow)?;
    Decimal::try_from_i128_with_scale(mantissa, 0).map_err(|_| overflow())
}

/// Formats `value` through a pattern with fully resolved options
///
/// Pattern precedence is the explicit pattern, then the registered format's
/// pattern, then the locale's named style. Precision flags left unset by the
/// caller come from the registered format.
pub(crate) fn render_currency(
    value: Decimal,
    currency: &str,
    options: &FormatOptions,
    registered: Option<&CurrencyFormat>,
) -> Result<String, FormatError> {
    let locale = options.resolve_locale()?;

    let explicit = options
        .pattern
        .as_deref()
        .or_else(|| registered.and_then(|cf| cf.format.as_deref()));
    let pattern = match explicit {
        Some(pattern) => NumberPattern::parse(pattern)?,
        None => {
            let style = options.format_type();
            let pattern = locale
                .currency_format(style)
                .ok_or_else(|| FormatError::UnknownFormatType(style.to_string()))?;
            NumberPattern::parse(pattern)?
        }
    };

    let apply = ApplyOptions {
        currency_digits: options
            .currency_digits
            .or(registered.map(|cf| cf.currency_digits))
            .unwrap_or(true),
        decimal_quantization: options
            .decimal_quantization
            .or(registered.map(|cf| cf.decimal_quantization))
            .unwrap_or(true),
        digits: registered.and_then(|cf| cf.digits),
        symbol: registered.map(|cf| cf.symbol.clone()),
        name: registered.map(|cf| cf.name.clone()),
    };

    pattern.apply(value, &locale, currency, &apply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn render(value: Decimal, currency: &str, options: &FormatOptions) -> String {
        render_currency(value, currency, options, None).unwrap()
    }

    #[rstest]
    #[case("¤000000.00", "-$001234.57")]
    #[case("¤#,##0.00;<¤#,##0.00>", "<$1,234.57>")]
    #[case("¤#,##0.00", "-$1,234.57")]
    #[case("¤0.00", "-$1234.57")]
    #[case("¤¤ #,##0.00", "-USD 1,234.57")]
    fn test_explicit_patterns(#[case] pattern: &str, #[case] expected: &str) {
        let options = FormatOptions::new().with_pattern(pattern);
        assert_eq!(render(dec!(-1234.567), "USD", &options), expected);
    }

    #[rstest]
    #[case("en_US", "-$1,234.57")]
    #[case("de_DE", "-1.234,57\u{a0}$")]
    #[case("es_CO", "-US$\u{a0}1.234,57")]
    fn test_locale_defaults(#[case] locale: &str, #[case] expected: &str) {
        let options = FormatOptions::new().with_locale(locale);
        assert_eq!(render(dec!(-1234.567), "USD", &options), expected);
    }

    #[test]
    fn test_german_explicit_patterns() {
        let options = FormatOptions::new()
            .with_locale("de_DE")
            .with_pattern("#,##0.00 ¤");
        assert_eq!(render(dec!(-1234.567), "USD", &options), "-1.234,57 $");

        let options = FormatOptions::new()
            .with_locale("de_DE")
            .with_pattern("0.00 ¤");
        assert_eq!(render(dec!(-1234.567), "USD", &options), "-1234,57 $");
    }

    #[test]
    fn test_accounting_style() {
        let options = FormatOptions::new().with_format_type("accounting");
        assert_eq!(render(dec!(-1234.567), "USD", &options), "($1,234.57)");
        assert_eq!(render(dec!(1234.567), "USD", &options), "$1,234.57");
    }

    #[test]
    fn test_unknown_format_type() {
        let options = FormatOptions::new().with_format_type("unknown");
        assert_eq!(
            render_currency(dec!(1), "USD", &options, None),
            Err(FormatError::UnknownFormatType("unknown".to_string()))
        );
    }

    #[test]
    fn test_unknown_locale() {
        let options = FormatOptions::new().with_locale("xx_YY");
        assert!(matches!(
            render_currency(dec!(1), "USD", &options, None),
            Err(FormatError::UnknownLocale(_))
        ));
    }

    #[test]
    fn test_decimal_quantization() {
        let options = FormatOptions::new();
        assert_eq!(render(dec!(1099.9876), "USD", &options), "$1,099.99");

        let options = FormatOptions::new().with_decimal_quantization(false);
        assert_eq!(render(dec!(1099.9876), "USD", &options), "$1,099.9876");
    }

    #[rstest]
    #[case(dec!(1.125), "USD", "$1.12")]
    #[case(dec!(1.135), "USD", "$1.14")]
    #[case(dec!(-1.125), "USD", "-$1.12")]
    #[case(dec!(2.5), "JPY", "¥2")]
    #[case(dec!(3.5), "JPY", "¥4")]
    fn test_half_even_rounding(#[case] value: Decimal, #[case] currency: &str, #[case] expected: &str) {
        assert_eq!(render(value, currency, &FormatOptions::new()), expected);
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn test_zero_digit_currency(#[case] quantize: bool) {
        let options = FormatOptions::new().with_decimal_quantization(quantize);
        assert_eq!(render(dec!(1099.98), "JPY", &options), "¥1,100");
    }

    #[test]
    fn test_currency_digits_disabled() {
        let options = FormatOptions::new()
            .with_pattern("¤0.000")
            .with_currency_digits(false);
        assert_eq!(render(dec!(-1234.567), "USD", &options), "-$1234.567");

        let options = FormatOptions::new()
            .with_pattern("¤0")
            .with_currency_digits(false);
        assert_eq!(render(dec!(-1234.567), "USD", &options), "-$1235");
    }

    #[test]
    fn test_long_fraction_patterns() {
        let options = FormatOptions::new()
            .with_pattern("¤#,##0.########")
            .with_decimal_quantization(false);
        assert_eq!(render(dec!(42.23423432), "USD", &options), "$42.23423432");

        let options = FormatOptions::new()
            .with_pattern("₿#,##0.########")
            .with_currency_digits(false);
        assert_eq!(render(dec!(42.23), "BTC", &options), "₿42.23");

        assert_eq!(
            render(dec!(42.23423432), "USD", &FormatOptions::new()),
            "$42.23"
        );
    }

    #[test]
    fn test_plural_currency_name() {
        let options = FormatOptions::new().with_pattern("#,##0.00 ¤¤¤");
        assert_eq!(render(dec!(1234.567), "EUR", &options), "1,234.57 euros");
        assert_eq!(render(dec!(1), "EUR", &options), "1.00 euro");
    }

    #[test]
    fn test_registered_format_labels_and_precision() {
        let cf = CurrencyFormat::new("bitcoin", "BTC", "₿")
            .unwrap()
            .with_format("¤#,##0.########")
            .with_currency_digits(false);

        let out = render_currency(dec!(42.23423432), "BTC", &FormatOptions::new(), Some(&cf));
        assert_eq!(out.unwrap(), "₿42.23423432");

        let options = FormatOptions::new().with_pattern("#,##0.00 ¤¤¤");
        let out = render_currency(dec!(2), "BTC", &options, Some(&cf));
        assert_eq!(out.unwrap(), "2.00 bitcoin");
    }

    #[test]
    fn test_registered_digits_override() {
        let cf = CurrencyFormat::new("token", "TKN", "T").unwrap().with_digits(4);
        let out = render_currency(dec!(1.234567), "TKN", &FormatOptions::new(), Some(&cf));
        assert_eq!(out.unwrap(), "T1.2346");
    }

    #[test]
    fn test_scientific_patterns() {
        let locale = Locale::parse("en_US").unwrap();
        let options = ApplyOptions {
            currency_digits: false,
            ..ApplyOptions::default()
        };

        let p = NumberPattern::parse("0.###E+00").unwrap();
        assert_eq!(p.apply(dec!(12345), &locale, "USD", &options).unwrap(), "1.234E+04");
        assert_eq!(p.apply(dec!(0.00123), &locale, "USD", &options).unwrap(), "1.23E-03");

        let p = NumberPattern::parse("#E0").unwrap();
        assert_eq!(p.apply(dec!(1234), &locale, "USD", &options).unwrap(), "1.234E3");
    }

    #[rstest]
    #[case("@@@", dec!(1234.567), "1230")]
    #[case("@@", dec!(0.0123), "0.012")]
    #[case("@@", dec!(9.99), "10")]
    #[case("@@##", dec!(1.5), "1.5")]
    fn test_significant_patterns(
        #[case] pattern: &str,
        #[case] value: Decimal,
        #[case] expected: &str,
    ) {
        let locale = Locale::parse("en_US").unwrap();
        let p = NumberPattern::parse(pattern).unwrap();
        let rendered = p.apply(value, &locale, "USD", &ApplyOptions::default()).unwrap();
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_percent_scaling() {
        let locale = Locale::parse("en_US").unwrap();
        let options = ApplyOptions {
            currency_digits: false,
            ..ApplyOptions::default()
        };
        let p = NumberPattern::parse("#,##0.00%").unwrap();
        assert_eq!(p.apply(dec!(0.1234), &locale, "USD", &options).unwrap(), "12.34%");
    }

    #[test]
    fn test_scaleb() {
        assert_eq!(scaleb(dec!(1.5), 2).unwrap(), dec!(150));
        assert_eq!(scaleb(dec!(150), -2).unwrap(), dec!(1.5));
        assert_eq!(scaleb(dec!(1), 30), Err(FormatError::Overflow("1 scaled by 10^30".to_string())));
    }
}
