//! Bundled CLDR locale data for currency formatting
//!
//! Only the subset of CLDR needed to render currency amounts is carried:
//! number symbols, named currency patterns, currency symbols and display
//! names, and the plural rule used to pick a singular or plural name.

use crate::constants::{DEFAULT_CURRENCY_DIGITS, DEFAULT_LOCALE};
use crate::error::FormatError;
use rust_decimal::Decimal;
use std::fmt;

/// CLDR plural category selection for currency display names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralRule {
    /// `one` when the integer part is 1 and there are no visible fraction digits
    OneIntegerNoFraction,
    /// `one` when the absolute value is exactly 1
    OneExact,
    /// `one` when the integer part is 0 or 1
    OneZeroOrOne,
    /// Every value uses `other`
    OtherOnly,
}

impl PluralRule {
    /// Returns true if `value` falls into the `one` category
    pub fn is_one(&self, value: Decimal) -> bool {
        let n = value.abs().normalize();
        let integer = n.trunc();
        match self {
            PluralRule::OneIntegerNoFraction => integer == Decimal::ONE && n.scale() == 0,
            PluralRule::OneExact => n == Decimal::ONE,
            PluralRule::OneZeroOrOne => integer <= Decimal::ONE,
            PluralRule::OtherOnly => false,
        }
    }
}

/// Singular and plural display names of a currency
#[derive(Debug, Clone, Copy)]
pub struct CurrencyName {
    pub code: &'static str,
    pub one: &'static str,
    pub other: &'static str,
}

const fn name(code: &'static str, one: &'static str, other: &'static str) -> CurrencyName {
    CurrencyName { code, one, other }
}

/// Number formatting data for one locale
#[derive(Debug)]
pub struct LocaleData {
    pub id: &'static str,
    pub decimal: &'static str,
    pub group: &'static str,
    pub plus: &'static str,
    pub minus: &'static str,
    pub exponential: &'static str,
    pub currency_formats: &'static [(&'static str, &'static str)],
    pub symbols: &'static [(&'static str, &'static str)],
    pub names: &'static [CurrencyName],
    pub plural: PluralRule,
}

/// Natural decimal digits of currencies that differ from the default of 2
static CURRENCY_DIGITS: &[(&str, u32)] = &[
    ("BHD", 3),
    ("BIF", 0),
    ("CLP", 0),
    ("DJF", 0),
    ("GNF", 0),
    ("IQD", 0),
    ("ISK", 0),
    ("JOD", 3),
    ("JPY", 0),
    ("KMF", 0),
    ("KRW", 0),
    ("KWD", 3),
    ("LYD", 3),
    ("OMR", 3),
    ("PYG", 0),
    ("RWF", 0),
    ("TND", 3),
    ("UGX", 0),
    ("UYI", 0),
    ("VND", 0),
    ("VUV", 0),
    ("XAF", 0),
    ("XOF", 0),
    ("XPF", 0),
];

/// Returns the CLDR natural decimal digits for a currency
pub fn currency_digits(code: &str) -> u32 {
    CURRENCY_DIGITS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, digits)| *digits)
        .unwrap_or(DEFAULT_CURRENCY_DIGITS)
}

static ROOT_SYMBOLS: &[(&str, &str)] = &[
    ("EUR", "€"),
    ("GBP", "£"),
    ("JPY", "JP¥"),
    ("USD", "US$"),
];

static EN_SYMBOLS: &[(&str, &str)] = &[
    ("AUD", "A$"),
    ("BRL", "R$"),
    ("CAD", "CA$"),
    ("CNY", "CN¥"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("HKD", "HK$"),
    ("ILS", "₪"),
    ("INR", "₹"),
    ("JPY", "¥"),
    ("KRW", "₩"),
    ("MXN", "MX$"),
    ("NZD", "NZ$"),
    ("TWD", "NT$"),
    ("USD", "$"),
    ("VND", "₫"),
];

static EN_GB_SYMBOLS: &[(&str, &str)] = &[
    ("AUD", "A$"),
    ("CAD", "CA$"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("INR", "₹"),
    ("JPY", "JP¥"),
    ("USD", "US$"),
];

static DE_SYMBOLS: &[(&str, &str)] = &[
    ("AUD", "AU$"),
    ("CAD", "CA$"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("JPY", "¥"),
    ("USD", "$"),
];

static FR_SYMBOLS: &[(&str, &str)] = &[
    ("CAD", "$CA"),
    ("EUR", "€"),
    ("GBP", "£GB"),
    ("USD", "$US"),
];

static ES_SYMBOLS: &[(&str, &str)] = &[("EUR", "€"), ("USD", "US$")];

static ES_CO_SYMBOLS: &[(&str, &str)] = &[("COP", "$"), ("EUR", "€"), ("USD", "US$")];

static JA_SYMBOLS: &[(&str, &str)] = &[
    ("CNY", "元"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("JPY", "￥"),
    ("USD", "$"),
];

static EN_NAMES: &[CurrencyName] = &[
    name("CAD", "Canadian dollar", "Canadian dollars"),
    name("CHF", "Swiss franc", "Swiss francs"),
    name("COP", "Colombian peso", "Colombian pesos"),
    name("EUR", "euro", "euros"),
    name("GBP", "British pound", "British pounds"),
    name("JPY", "Japanese yen", "Japanese yen"),
    name("USD", "US dollar", "US dollars"),
];

static DE_NAMES: &[CurrencyName] = &[
    name("CHF", "Schweizer Franken", "Schweizer Franken"),
    name("EUR", "Euro", "Euro"),
    name("GBP", "Britisches Pfund", "Britische Pfund"),
    name("JPY", "Japanischer Yen", "Japanische Yen"),
    name("USD", "US-Dollar", "US-Dollar"),
];

static FR_NAMES: &[CurrencyName] = &[
    name("CHF", "franc suisse", "francs suisses"),
    name("EUR", "euro", "euros"),
    name("GBP", "livre sterling", "livres sterling"),
    name("JPY", "yen japonais", "yens japonais"),
    name("USD", "dollar des États-Unis", "dollars des États-Unis"),
];

static ES_NAMES: &[CurrencyName] = &[
    name("COP", "peso colombiano", "pesos colombianos"),
    name("EUR", "euro", "euros"),
    name("JPY", "yen", "yenes"),
    name("USD", "dólar estadounidense", "dólares estadounidenses"),
];

static JA_NAMES: &[CurrencyName] = &[
    name("EUR", "ユーロ", "ユーロ"),
    name("GBP", "英国ポンド", "英国ポンド"),
    name("JPY", "円", "円"),
    name("USD", "米ドル", "米ドル"),
];

static LOCALES: &[LocaleData] = &[
    LocaleData {
        id: "root",
        decimal: ".",
        group: ",",
        plus: "+",
        minus: "-",
        exponential: "E",
        currency_formats: &[
            ("standard", "¤\u{a0}#,##0.00"),
            ("accounting", "¤\u{a0}#,##0.00"),
        ],
        symbols: ROOT_SYMBOLS,
        names: &[],
        plural: PluralRule::OtherOnly,
    },
    LocaleData {
        id: "en_US",
        decimal: ".",
        group: ",",
        plus: "+",
        minus: "-",
        exponential: "E",
        currency_formats: &[
            ("standard", "¤#,##0.00"),
            ("accounting", "¤#,##0.00;(¤#,##0.00)"),
        ],
        symbols: EN_SYMBOLS,
        names: EN_NAMES,
        plural: PluralRule::OneIntegerNoFraction,
    },
    LocaleData {
        id: "en_GB",
        decimal: ".",
        group: ",",
        plus: "+",
        minus: "-",
        exponential: "E",
        currency_formats: &[
            ("standard", "¤#,##0.00"),
            ("accounting", "¤#,##0.00;(¤#,##0.00)"),
        ],
        symbols: EN_GB_SYMBOLS,
        names: EN_NAMES,
        plural: PluralRule::OneIntegerNoFraction,
    },
    LocaleData {
        id: "de_DE",
        decimal: ",",
        group: ".",
        plus: "+",
        minus: "-",
        exponential: "E",
        currency_formats: &[
            ("standard", "#,##0.00\u{a0}¤"),
            ("accounting", "#,##0.00\u{a0}¤"),
        ],
        symbols: DE_SYMBOLS,
        names: DE_NAMES,
        plural: PluralRule::OneIntegerNoFraction,
    },
    LocaleData {
        id: "fr_FR",
        decimal: ",",
        group: "\u{202f}",
        plus: "+",
        minus: "-",
        exponential: "E",
        currency_formats: &[
            ("standard", "#,##0.00\u{a0}¤"),
            ("accounting", "#,##0.00\u{a0}¤;(#,##0.00\u{a0}¤)"),
        ],
        symbols: FR_SYMBOLS,
        names: FR_NAMES,
        plural: PluralRule::OneZeroOrOne,
    },
    LocaleData {
        id: "es_ES",
        decimal: ",",
        group: ".",
        plus: "+",
        minus: "-",
        exponential: "E",
        currency_formats: &[
            ("standard", "#,##0.00\u{a0}¤"),
            ("accounting", "#,##0.00\u{a0}¤"),
        ],
        symbols: ES_SYMBOLS,
        names: ES_NAMES,
        plural: PluralRule::OneExact,
    },
    LocaleData {
        id: "es_CO",
        decimal: ",",
        group: ".",
        plus: "+",
        minus: "-",
        exponential: "E",
        currency_formats: &[
            ("standard", "¤\u{a0}#,##0.00"),
            ("accounting", "¤\u{a0}#,##0.00"),
        ],
        symbols: ES_CO_SYMBOLS,
        names: ES_NAMES,
        plural: PluralRule::OneExact,
    },
    LocaleData {
        id: "ja_JP",
        decimal: ".",
        group: ",",
        plus: "+",
        minus: "-",
        exponential: "E",
        currency_formats: &[
            ("standard", "¤#,##0.00"),
            ("accounting", "¤#,##0.00;(¤#,##0.00)"),
        ],
        symbols: JA_SYMBOLS,
        names: JA_NAMES,
        plural: PluralRule::OtherOnly,
    },
];

/// Default territory for bare language identifiers
static LANGUAGE_DEFAULTS: &[(&str, &str)] = &[
    ("de", "de_DE"),
    ("en", "en_US"),
    ("es", "es_ES"),
    ("fr", "fr_FR"),
    ("ja", "ja_JP"),
];

/// A resolved locale backed by bundled CLDR data
#[derive(Clone, Copy)]
pub struct Locale {
    data: &'static LocaleData,
}

impl Locale {
    /// Parses a locale identifier such as `en`, `en_US`, `de-de` or `en_US.UTF-8`
    ///
    /// Bare languages resolve to their default territory and the POSIX
    /// locales `C`/`POSIX` resolve to `en_US`.
    pub fn parse(identifier: &str) -> Result<Self, FormatError> {
        let raw = identifier
            .split(['.', '@'])
            .next()
            .unwrap_or_default()
            .trim();

        let canonical = match raw {
            "C" | "POSIX" => "en_US".to_string(),
            _ => canonicalize(raw),
        };

        let id = LANGUAGE_DEFAULTS
            .iter()
            .find(|(language, _)| *language == canonical)
            .map(|(_, territory)| territory.to_string())
            .unwrap_or(canonical);

        LOCALES
            .iter()
            .find(|data| data.id == id)
            .map(|data| Self { data })
            .ok_or_else(|| FormatError::UnknownLocale(identifier.to_string()))
    }

    /// Returns the canonical identifier, e.g. `en_US`
    pub fn id(&self) -> &'static str {
        self.data.id
    }

    /// Returns the raw locale data
    pub fn data(&self) -> &'static LocaleData {
        self.data
    }

    pub fn decimal_symbol(&self) -> &'static str {
        self.data.decimal
    }

    pub fn group_symbol(&self) -> &'static str {
        self.data.group
    }

    pub fn plus_sign(&self) -> &'static str {
        self.data.plus
    }

    pub fn minus_sign(&self) -> &'static str {
        self.data.minus
    }

    pub fn exponential_symbol(&self) -> &'static str {
        self.data.exponential
    }

    /// Returns the currency pattern registered for a named style
    pub fn currency_format(&self, format_type: &str) -> Option<&'static str> {
        self.data
            .currency_formats
            .iter()
            .find(|(style, _)| *style == format_type)
            .map(|(_, pattern)| *pattern)
    }

    /// Returns the localized currency symbol, falling back to the code
    pub fn currency_symbol(&self, code: &str) -> String {
        self.data
            .symbols
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, symbol)| symbol.to_string())
            .unwrap_or_else(|| code.to_string())
    }

    /// Returns the localized, plural-aware currency name for `count` units
    ///
    /// Currencies without a localized name render as their code.
    pub fn currency_name(&self, code: &str, count: Decimal) -> String {
        match self.data.names.iter().find(|n| n.code == code) {
            Some(entry) if self.data.plural.is_one(count) => entry.one.to_string(),
            Some(entry) => entry.other.to_string(),
            None => code.to_string(),
        }
    }
}

fn canonicalize(raw: &str) -> String {
    let mut parts = raw.split(['_', '-']);
    let language = parts.next().unwrap_or_default().to_lowercase();
    match parts.next() {
        Some(territory) if !territory.is_empty() => {
            format!("{}_{}", language, territory.to_uppercase())
        }
        _ => language,
    }
}

impl Default for Locale {
    /// The `en_US` locale
    fn default() -> Self {
        let data = LOCALES
            .iter()
            .find(|data| data.id == DEFAULT_LOCALE)
            .unwrap_or(&LOCALES[0]);
        Self { data }
    }
}

impl fmt::Debug for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Locale({})", self.data.id)
    }
}

impl PartialEq for Locale {
    fn eq(&self, other: &Self) -> bool {
        self.data.id == other.data.id
    }
}

impl Eq for Locale {}
