use std::{
    fmt,
    ops::{Add, AddAssign, Mul, Sub},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::EngineError;

/// Money amount represented as **integer minor units** (hundredths).
///
/// Use this type for **all** monetary values in the engine (expense totals,
/// allocations, ledger entries, balances) to avoid floating-point drift. Every
/// value carries exactly 2 fractional digits.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::new(12_34);
/// assert_eq!(amount.minor(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// Strict parsing accepts `.` or `,` as decimal separator and rejects more than
/// 2 decimals:
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("10".parse::<Money>().unwrap().minor(), 1000);
/// assert_eq!("10,5".parse::<Money>().unwrap().minor(), 1050);
/// assert!("12.345".parse::<Money>().is_err());
/// ```
///
/// [`Money::parse_rounded`] is the lenient variant used for split inputs: it
/// rounds half-up to 2 decimals.
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!(Money::parse_rounded("33.335").unwrap().minor(), 3334);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from minor units.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Creates an amount from whole major units (`Money::major(10)` is `10.00`).
    #[must_use]
    pub const fn major(units: i64) -> Self {
        Self(units * 100)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
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

    /// Parses a decimal string, rounding half-up to 2 fractional digits.
    ///
    /// Same grammar as [`FromStr`] but accepts any number of decimals.
    pub fn parse_rounded(s: &str) -> Result<Self, EngineError> {
        parse_decimal(s, true).map(Money)
    }
}

/// Parses `[+-]digits[(.|,)digits]` into hundredths.
///
/// With `round` set, digits past the second decimal are rounded half-up
/// (away from zero on the absolute value); otherwise they are rejected.
pub(crate) fn parse_decimal(s: &str, round: bool) -> Result<i64, EngineError> {
    let empty = || EngineError::InvalidAmount("empty amount".to_string());
    let invalid = || EngineError::InvalidAmount(format!("invalid amount: {}", s.trim()));
    let overflow = || EngineError::InvalidAmount("amount too large".to_string());

    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(empty());
    }

    let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
        (true, stripped)
    } else if let Some(stripped) = trimmed.strip_prefix('+') {
        (false, stripped)
    } else {
        (false, trimmed)
    };

    if rest.is_empty() {
        return Err(empty());
    }

    let rest = rest.replace(',', ".");
    let mut parts = rest.split('.');
    let units_str = parts.next().ok_or_else(invalid)?;
    let frac_str = parts.next().unwrap_or("");

    if parts.next().is_some() {
        return Err(invalid());
    }
    if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if !frac_str.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac_str.len() > 2 && !round {
        return Err(EngineError::InvalidAmount("too many decimals".to_string()));
    }

    let units: i64 = units_str.parse().map_err(|_| overflow())?;

    let mut digits = frac_str.bytes().map(|b| i64::from(b - b'0'));
    let tenths = digits.next().unwrap_or(0);
    let hundredths = digits.next().unwrap_or(0);
    let round_up = digits.next().is_some_and(|d| d >= 5);

    let total = units
        .checked_mul(100)
        .and_then(|v| v.checked_add(tenths * 10 + hundredths + i64::from(round_up)))
        .ok_or_else(overflow)?;

    Ok(if negative { -total } else { total })
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}{units}.{cents:02}")
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

impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, rhs: i64) -> Self::Output {
        Money(self.0 * rhs)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a decimal string into minor units.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    /// Rejects more than 2 fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_decimal(s, false).map(Money)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
