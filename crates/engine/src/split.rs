//! Split calculators.
//!
//! A split turns an expense total and an ordered participant list into one
//! [`Allocation`] per participant. Three strategies exist:
//!
//! - [`SplitType::Equal`]: everybody owes the same share; the first participant
//!   absorbs the rounding remainder so the allocations sum exactly to the
//!   total.
//! - [`SplitType::Exact`]: every participant states their amount; the amounts
//!   must add up to the total.
//! - [`SplitType::Percent`]: every participant states a percentage; the
//!   percentages must add up to 100. Each share is rounded independently and
//!   is *not* remainder-corrected.
//!
//! Calculations are pure: nothing here touches the database.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, SplitError, money::parse_decimal};

/// Hard ceiling on an expense amount, whatever the configured limit is.
pub const MODEL_AMOUNT_CEILING: Money = Money::major(100_000_000);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitType {
    Equal,
    Exact,
    Percent,
}

impl SplitType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Exact => "exact",
            Self::Percent => "percent",
        }
    }
}

impl fmt::Display for SplitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SplitType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "equal" => Ok(Self::Equal),
            "exact" => Ok(Self::Exact),
            "percent" => Ok(Self::Percent),
            other => Err(EngineError::InvalidSplitType(other.to_string())),
        }
    }
}

/// A percentage with 2 fractional digits, stored in hundredths of a percent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percent(i64);

impl Percent {
    pub const HUNDRED: Percent = Percent(100_00);

    #[must_use]
    pub const fn new(hundredths: i64) -> Self {
        Self(hundredths)
    }

    #[must_use]
    pub const fn hundredths(self) -> i64 {
        self.0
    }

    /// Parses a decimal percentage, rounding half-up to 2 fractional digits.
    pub fn parse_rounded(s: &str) -> Result<Self, EngineError> {
        parse_decimal(s, true).map(Percent)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Money::new(self.0))
    }
}

/// One participant as received from the caller.
///
/// `amount` and `percentage` hold the raw decimal text; which of them must be
/// present depends on the split type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParticipantSpec {
    pub user_id: String,
    pub amount: Option<String>,
    pub percentage: Option<String>,
}

impl ParticipantSpec {
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            amount: None,
            percentage: None,
        }
    }

    #[must_use]
    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    #[must_use]
    pub fn percentage(mut self, percentage: impl Into<String>) -> Self {
        self.percentage = Some(percentage.into());
        self
    }
}

/// The share of an expense one debtor owes to the payer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub debtor: String,
    pub amount: Money,
}

impl Allocation {
    fn new(debtor: &str, amount: Money) -> Self {
        Self {
            debtor: debtor.to_string(),
            amount,
        }
    }
}

/// Bounds enforced before any strategy runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitLimits {
    pub max_participants: usize,
    pub max_amount: Money,
}

impl SplitLimits {
    /// `max_amount` is clamped to [`MODEL_AMOUNT_CEILING`].
    #[must_use]
    pub fn new(max_participants: usize, max_amount: Money) -> Self {
        Self {
            max_participants,
            max_amount: max_amount.min(MODEL_AMOUNT_CEILING),
        }
    }
}

impl Default for SplitLimits {
    fn default() -> Self {
        Self {
            max_participants: 1000,
            max_amount: Money::major(10_000_000),
        }
    }
}

/// Validates participant lists and computes allocations.
#[derive(Clone, Copy, Debug, Default)]
pub struct SplitCalculator {
    limits: SplitLimits,
}

impl SplitCalculator {
    #[must_use]
    pub fn new(limits: SplitLimits) -> Self {
        Self { limits }
    }

    #[must_use]
    pub fn limits(&self) -> SplitLimits {
        self.limits
    }

    /// Computes the allocations of `total` across `participants`.
    ///
    /// Allocations come back in participant input order. Any validation
    /// failure rejects the whole batch.
    pub fn split(
        &self,
        total: Money,
        payer: &str,
        participants: &[ParticipantSpec],
        split_type: SplitType,
    ) -> Result<Vec<Allocation>, SplitError> {
        self.validate_common(total, payer, participants)?;

        match split_type {
            SplitType::Equal => split_equal(total, participants),
            SplitType::Exact => split_exact(total, participants),
            SplitType::Percent => split_percent(total, participants),
        }
    }

    fn validate_common(
        &self,
        total: Money,
        payer: &str,
        participants: &[ParticipantSpec],
    ) -> Result<(), SplitError> {
        if participants.is_empty() {
            return Err(SplitError::NoParticipants);
        }
        if participants.len() > self.limits.max_participants {
            return Err(SplitError::TooManyParticipants {
                count: participants.len(),
                max: self.limits.max_participants,
            });
        }
        if !total.is_positive() {
            return Err(SplitError::NonPositiveAmount);
        }
        if total > self.limits.max_amount {
            return Err(SplitError::AmountExceedsLimit {
                max: self.limits.max_amount,
            });
        }
        if participants.iter().any(|p| p.user_id == payer) {
            return Err(SplitError::PayerIsParticipant(payer.to_string()));
        }
        Ok(())
    }
}

fn split_equal(total: Money, participants: &[ParticipantSpec]) -> Result<Vec<Allocation>, SplitError> {
    if participants
        .iter()
        .any(|p| p.amount.is_some() || p.percentage.is_some())
    {
        return Err(SplitError::UnexpectedField);
    }

    let count = participants.len() as i64;
    let share = Money::new(round_div(i128::from(total.minor()), i128::from(count)));
    let remainder = total - share * count;

    Ok(participants
        .iter()
        .enumerate()
        .map(|(index, p)| {
            let amount = if index == 0 { share + remainder } else { share };
            Allocation::new(&p.user_id, amount)
        })
        .collect())
}

fn split_exact(total: Money, participants: &[ParticipantSpec]) -> Result<Vec<Allocation>, SplitError> {
    let amounts = participants
        .iter()
        .map(|p| {
            p.amount
                .as_deref()
                .and_then(|raw| Money::parse_rounded(raw).ok())
                .filter(|amount| !amount.is_negative())
                .ok_or(SplitError::MissingAmount)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let sum = amounts
        .iter()
        .try_fold(Money::ZERO, |acc, amount| acc.checked_add(*amount))
        .ok_or(SplitError::MissingAmount)?;
    if sum != total {
        return Err(SplitError::SumMismatch {
            expected: total,
            actual: sum,
        });
    }

    Ok(participants
        .iter()
        .zip(amounts)
        .map(|(p, amount)| Allocation::new(&p.user_id, amount))
        .collect())
}

fn split_percent(
    total: Money,
    participants: &[ParticipantSpec],
) -> Result<Vec<Allocation>, SplitError> {
    let percentages = participants
        .iter()
        .map(|p| {
            p.percentage
                .as_deref()
                .and_then(|raw| Percent::parse_rounded(raw).ok())
                .filter(|pct| pct.hundredths() >= 0)
                .ok_or(SplitError::MissingPercentage)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let sum = percentages
        .iter()
        .try_fold(0i64, |acc, pct| acc.checked_add(pct.hundredths()))
        .map(Percent::new)
        .ok_or(SplitError::MissingPercentage)?;
    if sum != Percent::HUNDRED {
        return Err(SplitError::PercentageSumMismatch { actual: sum });
    }

    // total / 100 * pct, with pct counted in hundredths of a percent.
    let scale = i128::from(Percent::HUNDRED.hundredths());
    Ok(participants
        .iter()
        .zip(percentages)
        .map(|(p, pct)| {
            let numerator = i128::from(total.minor()) * i128::from(pct.hundredths());
            Allocation::new(&p.user_id, Money::new(round_div(numerator, scale)))
        })
        .collect())
}

/// Integer division rounding half-up; both operands must be non-negative.
fn round_div(numerator: i128, denominator: i128) -> i64 {
    let rounded = (numerator * 2 + denominator) / (denominator * 2);
    // Bounded by the numerator, which fits in i64 for every caller.
    rounded as i64
}
