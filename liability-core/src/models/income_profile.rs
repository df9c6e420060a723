use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::filing_status::FilingStatus;

/// Input validation failures.
///
/// Surfaced to the caller with the offending field named; the web layer
/// translates these into field-level validation messages.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: Decimal },

    #[error("qualified dividends ({qualified}) exceed ordinary dividends ({ordinary})")]
    QualifiedDividendsExceedOrdinary {
        qualified: Decimal,
        ordinary: Decimal,
    },
}

/// One pass-through business for the QBI deduction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessIncome {
    /// Net qualified business income. Loss netting happens upstream; the
    /// engine consumes an already-normalized, non-negative figure.
    pub qualified_business_income: Decimal,

    /// W-2 wages the business paid its employees.
    pub w2_wages: Decimal,

    /// Unadjusted basis immediately after acquisition of qualified property.
    pub ubia: Decimal,

    /// Specified service trade or business flag. SSTB income phases out of
    /// the QBI deduction entirely above the phase-in range.
    pub sstb: bool,
}

/// Itemized deduction components, pre-cap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemizedDeductions {
    /// State and local taxes paid, before the SALT cap.
    pub state_local_taxes: Decimal,
    pub mortgage_interest: Decimal,
    pub charitable_contributions: Decimal,
    pub medical_expenses: Decimal,
    pub other: Decimal,
}

/// AMT preference items, all modeled as non-negative additions to regular
/// taxable income. The SALT add-back is not here: the aggregator derives it
/// from the deduction resolution so it always equals the amount actually
/// deducted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmtPreferences {
    /// Incentive-stock-option exercise spread.
    pub iso_exercise_spread: Decimal,
    pub private_activity_bond_interest: Decimal,
    pub depreciation_adjustment: Decimal,
    pub passive_activity_adjustment: Decimal,
    pub loss_limitation_adjustment: Decimal,
    pub other_preferences: Decimal,
}

/// A taxpayer's normalized financial profile for one calculation request.
///
/// Created once per request and immutable during a computation pass. Money
/// fields arrive as exact decimals; the JSON boundary parses them from
/// strings, never from floating-point numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeProfile {
    pub filing_status: FilingStatus,

    pub wages: Decimal,
    pub interest: Decimal,

    /// Total ordinary dividends, inclusive of the qualified portion.
    pub ordinary_dividends: Decimal,

    /// Qualified portion of `ordinary_dividends`, taxed at preferential
    /// rates.
    pub qualified_dividends: Decimal,

    pub net_long_term_capital_gain: Decimal,

    pub businesses: Vec<BusinessIncome>,

    pub itemized: ItemizedDeductions,

    /// Itemize even when the standard deduction is larger (e.g. a spouse
    /// itemizes in a separate-filing scenario).
    pub force_itemized: bool,

    pub amt_preferences: AmtPreferences,

    /// Prior-year minimum-tax credit applied against AMT, floored at zero.
    pub prior_year_minimum_tax_credit: Decimal,
}

impl IncomeProfile {
    /// Rejects the first offending field, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError`] for any negative money field or when
    /// qualified dividends exceed ordinary dividends.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let scalar_fields: [(&'static str, Decimal); 6] = [
            ("wages", self.wages),
            ("interest", self.interest),
            ("ordinary_dividends", self.ordinary_dividends),
            ("qualified_dividends", self.qualified_dividends),
            (
                "net_long_term_capital_gain",
                self.net_long_term_capital_gain,
            ),
            (
                "prior_year_minimum_tax_credit",
                self.prior_year_minimum_tax_credit,
            ),
        ];
        for (field, value) in scalar_fields {
            non_negative(field, value)?;
        }

        if self.qualified_dividends > self.ordinary_dividends {
            return Err(ProfileError::QualifiedDividendsExceedOrdinary {
                qualified: self.qualified_dividends,
                ordinary: self.ordinary_dividends,
            });
        }

        for business in &self.businesses {
            non_negative(
                "qualified_business_income",
                business.qualified_business_income,
            )?;
            non_negative("w2_wages", business.w2_wages)?;
            non_negative("ubia", business.ubia)?;
        }

        let itemized = &self.itemized;
        non_negative("state_local_taxes", itemized.state_local_taxes)?;
        non_negative("mortgage_interest", itemized.mortgage_interest)?;
        non_negative(
            "charitable_contributions",
            itemized.charitable_contributions,
        )?;
        non_negative("medical_expenses", itemized.medical_expenses)?;
        non_negative("other", itemized.other)?;

        let amt = &self.amt_preferences;
        non_negative("iso_exercise_spread", amt.iso_exercise_spread)?;
        non_negative(
            "private_activity_bond_interest",
            amt.private_activity_bond_interest,
        )?;
        non_negative("depreciation_adjustment", amt.depreciation_adjustment)?;
        non_negative(
            "passive_activity_adjustment",
            amt.passive_activity_adjustment,
        )?;
        non_negative(
            "loss_limitation_adjustment",
            amt.loss_limitation_adjustment,
        )?;
        non_negative("other_preferences", amt.other_preferences)?;

        Ok(())
    }
}

fn non_negative(
    field: &'static str,
    value: Decimal,
) -> Result<(), ProfileError> {
    if value < Decimal::ZERO {
        return Err(ProfileError::Negative { field, value });
    }
    Ok(())
}
