//! CLDR number pattern parsing
//!
//! Turns pattern strings such as `"¤#,##0.00;(¤#,##0.00)"` into a
//! [`NumberPattern`] describing affixes, grouping and digit precision.

use crate::error::FormatError;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Grouping width used when the pattern has no grouping separator
pub const NO_GROUPING: usize = 1000;

/// Splits a sub-pattern into prefix, numeric run and suffix.
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?s)(?P<prefix>(?:'[^']*'|[^0-9@#.,])*)(?P<number>[0-9@#.,E+]*)(?P<suffix>.*)$")
        .expect("Invalid regex")
});

/// A parsed CLDR number pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberPattern {
    /// Pattern text as given
    pub pattern: String,
    /// Positive and negative prefixes
    pub prefix: (String, String),
    /// Positive and negative suffixes
    pub suffix: (String, String),
    /// Primary and secondary grouping widths
    pub grouping: (usize, usize),
    /// Minimum and maximum integer digits
    pub int_prec: (usize, usize),
    /// Minimum and maximum fraction digits
    pub frac_prec: (usize, usize),
    /// Minimum and maximum exponent digits for scientific patterns
    pub exp_prec: Option<(usize, usize)>,
    /// Whether the exponent carries an explicit plus sign
    pub exp_plus: bool,
    /// Power of ten applied before rendering (percent and permille)
    pub scale: i32,
}

impl NumberPattern {
    /// Parses a CLDR number pattern
    ///
    /// # Errors
    /// Returns `FormatError::InvalidPattern` when no numeric run can be found or
    /// when a significant-digit pattern also uses `0` or `.`.
    pub fn parse(pattern: &str) -> Result<Self, FormatError> {
        let (pos_pattern, neg_pattern) = match pattern.split_once(';') {
            Some((pos, neg)) => (pos, Some(neg)),
            None => (pattern, None),
        };

        let (pos_prefix, number, pos_suffix) = match_number(pattern, pos_pattern)?;
        let (neg_prefix, neg_suffix) = match neg_pattern {
            Some(neg) => {
                let (prefix, _, suffix) = match_number(pattern, neg)?;
                (prefix, suffix)
            }
            None => (format!("-{}", pos_prefix), pos_suffix.clone()),
        };

        let (number, exp) = match number.split_once('E') {
            Some((number, exp)) => (number, Some(exp)),
            None => (number.as_str(), None),
        };

        if number.contains('@') && (number.contains('0') || number.contains('.')) {
            return Err(FormatError::invalid_pattern(
                pattern,
                "significant digit patterns can not contain \"0\" or \".\"",
            ));
        }

        let (integer, fraction) = match number.rsplit_once('.') {
            Some((integer, fraction)) => (integer, fraction),
            None => (number, ""),
        };

        let (exp_prec, exp_plus) = match exp {
            Some(exp) => {
                let plus = exp.starts_with('+');
                (Some(parse_precision(exp.trim_start_matches('+'))), plus)
            }
            None => (None, false),
        };

        let affixes = format!("{}{}{}{}", pos_prefix, neg_prefix, pos_suffix, neg_suffix);
        let scale = if affixes.contains('%') {
            2
        } else if affixes.contains('‰') {
            3
        } else {
            0
        };

        Ok(Self {
            pattern: pattern.to_string(),
            prefix: (pos_prefix, neg_prefix),
            suffix: (pos_suffix, neg_suffix),
            grouping: parse_grouping(integer),
            int_prec: parse_precision(integer),
            frac_prec: parse_precision(fraction),
            exp_prec,
            exp_plus,
            scale,
        })
    }

    /// Returns true if the pattern bounds significant digits with `@`
    pub fn is_significant(&self) -> bool {
        self.pattern.contains('@')
    }
}

impl std::str::FromStr for NumberPattern {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Anything that can be turned into a [`NumberPattern`]
pub trait AsNumberPattern {
    fn as_number_pattern(&self) -> Result<Cow<'_, NumberPattern>, FormatError>;
}

impl AsNumberPattern for str {
    fn as_number_pattern(&self) -> Result<Cow<'_, NumberPattern>, FormatError> {
        NumberPattern::parse(self).map(Cow::Owned)
    }
}

impl AsNumberPattern for String {
    fn as_number_pattern(&self) -> Result<Cow<'_, NumberPattern>, FormatError> {
        NumberPattern::parse(self).map(Cow::Owned)
    }
}

impl AsNumberPattern for NumberPattern {
    fn as_number_pattern(&self) -> Result<Cow<'_, NumberPattern>, FormatError> {
        Ok(Cow::Borrowed(self))
    }
}

/// Parses a pattern, passing already-parsed patterns through unchanged
pub fn parse_pattern<P: AsNumberPattern + ?Sized>(
    pattern: &P,
) -> Result<Cow<'_, NumberPattern>, FormatError> {
    pattern.as_number_pattern()
}

fn match_number(pattern: &str, sub: &str) -> Result<(String, String, String), FormatError> {
    let caps = NUMBER_RE
        .captures(sub)
        .ok_or_else(|| FormatError::invalid_pattern(pattern, "no numeric run"))?;
    let number = caps.name("number").map(|m| m.as_str()).unwrap_or_default();
    if number.is_empty() {
        return Err(FormatError::invalid_pattern(pattern, "no numeric run"));
    }
    let prefix = caps.name("prefix").map(|m| m.as_str()).unwrap_or_default();
    let suffix = caps.name("suffix").map(|m| m.as_str()).unwrap_or_default();
    Ok((prefix.to_string(), number.to_string(), suffix.to_string()))
}

/// Minimum and maximum digits of a pattern segment
fn parse_precision(segment: &str) -> (usize, usize) {
    let mut min = 0;
    let mut max = 0;
    for c in segment.chars() {
        match c {
            '@' | '0' => {
                min += 1;
                max += 1;
            }
            '#' => max += 1,
            ',' => continue,
            _ => break,
        }
    }
    (min, max)
}

/// Primary and secondary grouping widths of the integer segment
fn parse_grouping(integer: &str) -> (usize, usize) {
    let width = integer.len();
    let Some(last) = integer.rfind(',') else {
        return (NO_GROUPING, NO_GROUPING);
    };
    let primary = width - last - 1;
    match integer[..last].rfind(',') {
        Some(previous) => (primary, last - previous - 1),
        None => (primary, primary),
    }
}
