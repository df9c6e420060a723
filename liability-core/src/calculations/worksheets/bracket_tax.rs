//! Progressive bracket tax calculations.
//!
//! This module walks a [`BracketSchedule`] slice by slice, accumulating
//! `(min(income, upper) - lower) * rate` per bracket at full precision and
//! rounding only the total. It also implements the "stacking" rule for
//! preferential-rate income: qualified dividends and net long-term capital
//! gain are taxed against their own schedule, but the schedule's boundaries
//! are evaluated against total taxable income, with ordinary income filling
//! the bottom of the combined stack.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use liability_core::calculations::BracketTaxWorksheet;
//! use liability_core::{BracketSchedule, TaxBracket};
//!
//! let schedule = BracketSchedule::new(vec![
//!     TaxBracket { lower: dec!(0), upper: Some(dec!(11925)), rate: dec!(0.10) },
//!     TaxBracket { lower: dec!(11925), upper: Some(dec!(48475)), rate: dec!(0.12) },
//!     TaxBracket { lower: dec!(48475), upper: None, rate: dec!(0.22) },
//! ]);
//!
//! let worksheet = BracketTaxWorksheet::new(&schedule);
//! let result = worksheet.tax_on(dec!(50000)).unwrap();
//!
//! // 11925 * 0.10 + 36550 * 0.12 + 1525 * 0.22
//! assert_eq!(result.tax, dec!(5914.00));
//! assert_eq!(result.contributions.len(), 3);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::{max, min, round_half_up};
use crate::models::{BracketContribution, BracketSchedule};

/// Errors that can occur during bracket tax calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketTaxError {
    /// Taxable income must be non-negative.
    #[error("taxable income must be non-negative, got {0}")]
    NegativeIncome(Decimal),

    /// The stacked amount must be non-negative.
    #[error("stacked amount must be non-negative, got {0}")]
    NegativeStackedAmount(Decimal),
}

/// Result of a bracket walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketTaxResult {
    /// Total tax, rounded to the cent from the full-precision sum.
    pub tax: Decimal,

    /// Per-bracket audit rows. Decision logic never reads these; summing the
    /// rounded rows can differ from `tax` by a cent.
    pub contributions: Vec<BracketContribution>,
}

impl BracketTaxResult {
    fn zero() -> Self {
        Self {
            tax: round_half_up(Decimal::ZERO),
            contributions: Vec::new(),
        }
    }
}

/// Calculator over one validated bracket schedule.
///
/// The schedule is borrowed from the [`crate::TaxYearConfig`]; the worksheet
/// holds no other state.
#[derive(Debug, Clone)]
pub struct BracketTaxWorksheet<'a> {
    schedule: &'a BracketSchedule,
}

impl<'a> BracketTaxWorksheet<'a> {
    /// Creates a calculator over a schedule that has already passed
    /// [`BracketSchedule::validate`].
    pub fn new(schedule: &'a BracketSchedule) -> Self {
        Self { schedule }
    }

    /// Tax on `taxable_income` starting from the bottom of the schedule.
    ///
    /// Income exactly at a bracket boundary is taxed in the bracket the
    /// boundary closes. Zero income yields zero tax and no contributions.
    ///
    /// # Errors
    ///
    /// Returns [`BracketTaxError::NegativeIncome`] for negative income.
    pub fn tax_on(
        &self,
        taxable_income: Decimal,
    ) -> Result<BracketTaxResult, BracketTaxError> {
        if taxable_income < Decimal::ZERO {
            return Err(BracketTaxError::NegativeIncome(taxable_income));
        }
        Ok(self.walk(Decimal::ZERO, taxable_income))
    }

    /// Tax on `amount` stacked on top of `floor` against this schedule.
    ///
    /// Each bracket taxes the overlap of `[floor, floor + amount]` with its
    /// span, so boundaries are evaluated against the combined stack rather
    /// than `amount` alone.
    ///
    /// # Errors
    ///
    /// Returns [`BracketTaxError`] if `floor` or `amount` is negative.
    pub fn stacked_tax_on(
        &self,
        floor: Decimal,
        amount: Decimal,
    ) -> Result<BracketTaxResult, BracketTaxError> {
        if floor < Decimal::ZERO {
            return Err(BracketTaxError::NegativeIncome(floor));
        }
        if amount < Decimal::ZERO {
            return Err(BracketTaxError::NegativeStackedAmount(amount));
        }
        Ok(self.walk(floor, floor + amount))
    }

    /// Accumulates tax on the income span `(floor, total]` bracket by
    /// bracket, at full precision.
    fn walk(
        &self,
        floor: Decimal,
        total: Decimal,
    ) -> BracketTaxResult {
        if total <= floor {
            return BracketTaxResult::zero();
        }

        let mut tax = Decimal::ZERO;
        let mut contributions = Vec::new();

        for bracket in &self.schedule.brackets {
            if total <= bracket.lower {
                break;
            }

            let slice_top = match bracket.upper {
                Some(upper) => min(total, upper),
                None => total,
            };
            let slice_bottom = max(floor, bracket.lower);
            let taxed_amount = slice_top - slice_bottom;

            if taxed_amount > Decimal::ZERO {
                let slice_tax = taxed_amount * bracket.rate;
                tax += slice_tax;
                contributions.push(BracketContribution {
                    lower: bracket.lower,
                    upper: bracket.upper,
                    rate: bracket.rate,
                    taxed_amount: round_half_up(taxed_amount),
                    tax: round_half_up(slice_tax),
                });
            }

            // Income at the boundary stays in the bracket that closes here.
            if bracket.upper.is_none_or(|upper| total <= upper) {
                break;
            }
        }

        BracketTaxResult {
            tax: round_half_up(tax),
            contributions,
        }
    }
}
