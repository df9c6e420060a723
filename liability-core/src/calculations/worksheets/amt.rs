//! Alternative Minimum Tax calculations.
//!
//! A linear pipeline with no branching back:
//! AMTI → exemption → AMT taxable income → tentative minimum tax → AMT.
//!
//! # Worksheet Structure
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | AMTI: regular taxable income plus preference add-backs, in fixed order |
//! | 2    | Exemption: max(0, base − 25% × max(0, AMTI − phase-out start)) |
//! | 3    | AMT taxable income: max(0, AMTI − exemption) |
//! | 4    | Tentative minimum tax: 26% up to the rate threshold, 28% on the excess |
//! | 5    | AMT: max(0, TMT − regular tax), less the prior-year credit, floored at zero |
//!
//! Rounding happens at step 2 (the exemption) and at the very end of step 5;
//! steps 1, 3, and 4 run at full precision. The two-tier tax in step 4 is a
//! fixed statutory computation implemented directly, not a
//! [`crate::BracketSchedule`] walk.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use liability_core::calculations::{AmtWorksheet, AmtWorksheetInput};
//! use liability_core::AmtPreferences;
//!
//! let worksheet = AmtWorksheet {
//!     exemption_base: dec!(88100.00),
//!     phaseout_start: dec!(626350.00),
//!     rate_threshold: dec!(239100.00),
//! };
//!
//! let input = AmtWorksheetInput {
//!     taxable_income: dec!(180000.00),
//!     salt_addback: dec!(10000.00),
//!     preferences: AmtPreferences {
//!         iso_exercise_spread: dec!(60000.00),
//!         ..Default::default()
//!     },
//!     regular_tax: dec!(36000.00),
//!     prior_year_minimum_tax_credit: dec!(0.00),
//! };
//!
//! let result = worksheet.calculate(&input).unwrap();
//!
//! assert_eq!(result.amti, dec!(250000.00));
//! assert_eq!(result.exemption, dec!(88100.00));
//! // AMT taxable income 161900, all in the 26% tier.
//! assert_eq!(result.tentative_minimum_tax, dec!(42094.00));
//! assert_eq!(result.amt, dec!(6094.00));
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::calculations::common::{max, round_half_up};
use crate::models::{AmtPreferences, TaxYearConfig};

/// Exemption phase-out rate: 25 cents per dollar of AMTI above the start.
const EXEMPTION_PHASEOUT_RATE: Decimal = dec!(0.25);
/// Rate on AMT taxable income up to the rate threshold.
const LOW_RATE: Decimal = dec!(0.26);
/// Rate on AMT taxable income above the rate threshold.
const HIGH_RATE: Decimal = dec!(0.28);

/// Errors that can occur during AMT calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmtError {
    /// Regular taxable income must be non-negative.
    #[error("taxable income must be non-negative, got {0}")]
    NegativeTaxableIncome(Decimal),

    /// The SALT add-back must be non-negative.
    #[error("SALT add-back must be non-negative, got {0}")]
    NegativeSaltAddback(Decimal),

    /// A preference item must be non-negative.
    #[error("preference item {field} must be non-negative, got {value}")]
    NegativePreference { field: &'static str, value: Decimal },

    /// Regular tax must be non-negative.
    #[error("regular tax must be non-negative, got {0}")]
    NegativeRegularTax(Decimal),

    /// The prior-year minimum-tax credit must be non-negative.
    #[error("prior-year minimum tax credit must be non-negative, got {0}")]
    NegativeCredit(Decimal),
}

/// Input values for the AMT worksheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmtWorksheetInput {
    /// Regular taxable income, after all deductions including QBI.
    pub taxable_income: Decimal,

    /// State-and-local-tax deduction actually taken, added back first. Zero
    /// when the standard deduction was used.
    pub salt_addback: Decimal,

    pub preferences: AmtPreferences,

    /// Regular tax, the floor the tentative minimum tax is compared against.
    pub regular_tax: Decimal,

    pub prior_year_minimum_tax_credit: Decimal,
}

/// Result of the AMT worksheet, with intermediate values for transparency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmtWorksheetResult {
    /// Alternative minimum taxable income (step 1).
    pub amti: Decimal,

    /// Exemption after the phase-out, never negative (step 2).
    pub exemption: Decimal,

    /// AMTI less the exemption, floored at zero (step 3).
    pub amt_taxable_income: Decimal,

    /// Two-tier tentative minimum tax (step 4).
    pub tentative_minimum_tax: Decimal,

    /// Excess over regular tax after the credit, floored at zero (step 5).
    pub amt: Decimal,
}

/// Calculator for the Alternative Minimum Tax.
#[derive(Debug, Clone)]
pub struct AmtWorksheet {
    /// Exemption before any phase-out.
    pub exemption_base: Decimal,

    /// AMTI level where the exemption starts phasing out.
    pub phaseout_start: Decimal,

    /// Breakpoint between the 26% and 28% tiers.
    pub rate_threshold: Decimal,
}

impl AmtWorksheet {
    pub fn from_tax_year_config(config: &TaxYearConfig) -> Self {
        Self {
            exemption_base: config.amt_exemption_base,
            phaseout_start: config.amt_phaseout_start,
            rate_threshold: config.amt_rate_threshold,
        }
    }

    /// Runs the five-step pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`AmtError`] for any negative input.
    pub fn calculate(
        &self,
        input: &AmtWorksheetInput,
    ) -> Result<AmtWorksheetResult, AmtError> {
        validate(input)?;

        // Step 1: full precision, no rounding.
        let amti = self.alternative_minimum_taxable_income(input);

        // Step 2: the one permitted intermediate rounding.
        let exemption = self.exemption(amti);

        // Step 3.
        let amt_taxable_income = max(amti - exemption, Decimal::ZERO);

        // Step 4: full precision.
        let tentative_minimum_tax = self.tentative_minimum_tax(amt_taxable_income);

        // Step 5: rounded at the very end.
        let amt = self.amt(
            tentative_minimum_tax,
            input.regular_tax,
            input.prior_year_minimum_tax_credit,
        );

        Ok(AmtWorksheetResult {
            amti: round_half_up(amti),
            exemption,
            amt_taxable_income: round_half_up(amt_taxable_income),
            tentative_minimum_tax: round_half_up(tentative_minimum_tax),
            amt,
        })
    }

    /// Step 1: add back preference items in fixed order. The order matters
    /// only for audit-trail readability; all items are additions.
    fn alternative_minimum_taxable_income(
        &self,
        input: &AmtWorksheetInput,
    ) -> Decimal {
        let preferences = &input.preferences;
        input.taxable_income
            + input.salt_addback
            + preferences.iso_exercise_spread
            + preferences.private_activity_bond_interest
            + preferences.depreciation_adjustment
            + preferences.passive_activity_adjustment
            + preferences.loss_limitation_adjustment
            + preferences.other_preferences
    }

    /// Step 2: straight-line phase-out, in exact decimal arithmetic.
    fn exemption(
        &self,
        amti: Decimal,
    ) -> Decimal {
        let excess = max(amti - self.phaseout_start, Decimal::ZERO);
        let reduction = EXEMPTION_PHASEOUT_RATE * excess;
        round_half_up(max(self.exemption_base - reduction, Decimal::ZERO))
    }

    /// Step 4: fixed two-tier computation.
    fn tentative_minimum_tax(
        &self,
        amt_taxable_income: Decimal,
    ) -> Decimal {
        if amt_taxable_income <= self.rate_threshold {
            amt_taxable_income * LOW_RATE
        } else {
            self.rate_threshold * LOW_RATE
                + (amt_taxable_income - self.rate_threshold) * HIGH_RATE
        }
    }

    /// Step 5: excess over regular tax, less the prior-year credit, floored
    /// at zero.
    fn amt(
        &self,
        tentative_minimum_tax: Decimal,
        regular_tax: Decimal,
        credit: Decimal,
    ) -> Decimal {
        let excess = max(tentative_minimum_tax - regular_tax, Decimal::ZERO);
        if credit > excess && credit > Decimal::ZERO {
            warn!(
                credit = %credit,
                excess = %excess,
                "prior-year minimum tax credit exceeds AMT; flooring at zero"
            );
        }
        round_half_up(max(excess - credit, Decimal::ZERO))
    }
}

fn validate(input: &AmtWorksheetInput) -> Result<(), AmtError> {
    if input.taxable_income < Decimal::ZERO {
        return Err(AmtError::NegativeTaxableIncome(input.taxable_income));
    }
    if input.salt_addback < Decimal::ZERO {
        return Err(AmtError::NegativeSaltAddback(input.salt_addback));
    }
    if input.regular_tax < Decimal::ZERO {
        return Err(AmtError::NegativeRegularTax(input.regular_tax));
    }
    if input.prior_year_minimum_tax_credit < Decimal::ZERO {
        return Err(AmtError::NegativeCredit(input.prior_year_minimum_tax_credit));
    }

    let preferences = &input.preferences;
    let fields: [(&'static str, Decimal); 6] = [
        ("iso_exercise_spread", preferences.iso_exercise_spread),
        (
            "private_activity_bond_interest",
            preferences.private_activity_bond_interest,
        ),
        (
            "depreciation_adjustment",
            preferences.depreciation_adjustment,
        ),
        (
            "passive_activity_adjustment",
            preferences.passive_activity_adjustment,
        ),
        (
            "loss_limitation_adjustment",
            preferences.loss_limitation_adjustment,
        ),
        ("other_preferences", preferences.other_preferences),
    ];
    for (field, value) in fields {
        if value < Decimal::ZERO {
            return Err(AmtError::NegativePreference { field, value });
        }
    }
    Ok(())
}
