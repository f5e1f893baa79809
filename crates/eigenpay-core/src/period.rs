//! # Billing Periods and Amount Splits
//!
//! A billing period is an ordinal unit over which a service fee accrues.
//! Payment claims and disputes cover a contiguous half-open range of
//! periods, `[from, to)`.
//!
//! ## Halving
//!
//! A range of length `len >= 2` splits at `from + ceil(len / 2)`:
//!
//! ```text
//! [0, 16) ──▶ [0, 8)  | [8, 16)
//! [0, 3)  ──▶ [0, 2)  | [2, 3)
//! [4, 6)  ──▶ [4, 5)  | [5, 6)
//! ```
//!
//! The second half therefore starts at `from + ceil(len / 2)`, not at
//! `from + floor(len / 2)`; the two agree for even lengths, and for odd
//! lengths the floor point would make the halves overlap.
//!
//! For odd lengths the first half absorbs the remainder. Both halves are
//! strictly shorter than the parent, so repeated halving reaches a single
//! period in at most `ceil(log2(len))` steps.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Fee and stake amounts, in the smallest unit.
pub type Amount = u128;

/// An ordinal billing-period identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodId(pub u32);

impl PeriodId {
    /// Access the raw ordinal.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for PeriodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "period:{}", self.0)
    }
}

/// A non-empty half-open range of billing periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RangeRepr", into = "RangeRepr")]
pub struct PeriodRange {
    from: u32,
    to: u32,
}

#[derive(Serialize, Deserialize)]
struct RangeRepr {
    from: u32,
    to: u32,
}

impl TryFrom<RangeRepr> for PeriodRange {
    type Error = CoreError;

    fn try_from(raw: RangeRepr) -> Result<Self, Self::Error> {
        PeriodRange::new(raw.from, raw.to)
    }
}

impl From<PeriodRange> for RangeRepr {
    fn from(range: PeriodRange) -> Self {
        RangeRepr {
            from: range.from,
            to: range.to,
        }
    }
}

impl PeriodRange {
    /// Build the range `[from, to)`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRange`] unless `from < to`.
    pub fn new(from: u32, to: u32) -> Result<Self, CoreError> {
        if from >= to {
            return Err(CoreError::InvalidRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// First period in the range (inclusive).
    pub fn from(&self) -> u32 {
        self.from
    }

    /// End of the range (exclusive).
    pub fn to(&self) -> u32 {
        self.to
    }

    /// Number of periods covered. Always at least one.
    pub fn len(&self) -> u32 {
        self.to - self.from
    }

    /// Ranges are never empty; provided for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether the range covers exactly one period.
    pub fn is_single_period(&self) -> bool {
        self.len() == 1
    }

    /// The sole period when the range has length one.
    pub fn single_period(&self) -> Option<PeriodId> {
        self.is_single_period().then_some(PeriodId(self.from))
    }

    /// Whether `period` lies inside the range.
    pub fn contains(&self, period: PeriodId) -> bool {
        self.from <= period.0 && period.0 < self.to
    }

    /// The split point `from + ceil(len / 2)`.
    pub fn midpoint(&self) -> u32 {
        self.from + self.len().div_ceil(2)
    }

    /// The first half `[from, midpoint)`, or `None` for a single period.
    pub fn first_half(&self) -> Option<PeriodRange> {
        if self.is_single_period() {
            return None;
        }
        Some(Self {
            from: self.from,
            to: self.midpoint(),
        })
    }

    /// The second half `[midpoint, to)`, or `None` for a single period.
    pub fn second_half(&self) -> Option<PeriodRange> {
        if self.is_single_period() {
            return None;
        }
        Some(Self {
            from: self.midpoint(),
            to: self.to,
        })
    }

    /// Select a half by flag: `false` for the first, `true` for the second.
    pub fn half(&self, second: bool) -> Option<PeriodRange> {
        if second {
            self.second_half()
        } else {
            self.first_half()
        }
    }
}

impl std::fmt::Display for PeriodRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.from, self.to)
    }
}

/// A claimed division of an amount across the two halves of a range.
///
/// For a single-period range the whole amount is carried in `first` and
/// `second` is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AmountSplit {
    /// Amount attributed to the first half.
    pub first: Amount,
    /// Amount attributed to the second half.
    pub second: Amount,
}

impl AmountSplit {
    /// Create a split.
    pub fn new(first: Amount, second: Amount) -> Self {
        Self { first, second }
    }

    /// The split of a single period's amount.
    pub fn whole(amount: Amount) -> Self {
        Self {
            first: amount,
            second: 0,
        }
    }

    /// Sum of both components, `None` on overflow.
    pub fn total(&self) -> Option<Amount> {
        self.first.checked_add(self.second)
    }

    /// The component attributed to the chosen half.
    pub fn component(&self, second: bool) -> Amount {
        if second {
            self.second
        } else {
            self.first
        }
    }
}

impl std::fmt::Display for AmountSplit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.first, self.second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_and_inverted() {
        assert!(PeriodRange::new(3, 3).is_err());
        assert!(PeriodRange::new(4, 3).is_err());
        assert!(PeriodRange::new(3, 4).is_ok());
    }

    #[test]
    fn test_even_split() {
        let r = PeriodRange::new(0, 16).unwrap();
        assert_eq!(r.first_half().unwrap(), PeriodRange::new(0, 8).unwrap());
        assert_eq!(r.second_half().unwrap(), PeriodRange::new(8, 16).unwrap());
    }

    #[test]
    fn test_odd_split_first_half_absorbs_remainder() {
        let r = PeriodRange::new(0, 3).unwrap();
        assert_eq!(r.first_half().unwrap(), PeriodRange::new(0, 2).unwrap());
        assert_eq!(r.second_half().unwrap(), PeriodRange::new(2, 3).unwrap());
    }

    #[test]
    fn test_odd_halves_are_disjoint_and_cover_parent() {
        for len in (3..64u32).step_by(2) {
            let r = PeriodRange::new(10, 10 + len).unwrap();
            let (first, second) = (r.first_half().unwrap(), r.second_half().unwrap());
            assert_eq!(first.to(), second.from());
            assert_eq!(first.len(), second.len() + 1);
            assert_eq!(second.from(), 10 + len / 2 + 1);
        }
    }

    #[test]
    fn test_length_two_splits_into_single_periods() {
        let r = PeriodRange::new(4, 6).unwrap();
        assert_eq!(r.first_half().unwrap().single_period(), Some(PeriodId(4)));
        assert_eq!(r.second_half().unwrap().single_period(), Some(PeriodId(5)));
    }

    #[test]
    fn test_single_period_has_no_halves() {
        let r = PeriodRange::new(5, 6).unwrap();
        assert!(r.is_single_period());
        assert!(r.first_half().is_none());
        assert!(r.second_half().is_none());
    }

    #[test]
    fn test_contains() {
        let r = PeriodRange::new(2, 5).unwrap();
        assert!(!r.contains(PeriodId(1)));
        assert!(r.contains(PeriodId(2)));
        assert!(r.contains(PeriodId(4)));
        assert!(!r.contains(PeriodId(5)));
    }

    #[test]
    fn test_split_total_overflow() {
        assert_eq!(AmountSplit::new(60, 40).total(), Some(100));
        assert_eq!(AmountSplit::new(u128::MAX, 1).total(), None);
    }

    #[test]
    fn test_range_deserialize_validates() {
        let ok: PeriodRange = serde_json::from_str(r#"{"from":1,"to":4}"#).unwrap();
        assert_eq!(ok.len(), 3);
        assert!(serde_json::from_str::<PeriodRange>(r#"{"from":4,"to":4}"#).is_err());
    }
}
