//! Standard-versus-itemized deduction resolution.
//!
//! The resolver caps the state-and-local-tax component first, totals the
//! itemized components *after* the cap, and only then compares against the
//! standard deduction — the cap can flip the decision, so the comparison is
//! never made against the pre-cap total. An exact tie selects the standard
//! deduction by default (documented policy, configurable per year).
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use liability_core::calculations::DeductionWorksheet;
//! use liability_core::ItemizedDeductions;
//!
//! let worksheet = DeductionWorksheet {
//!     standard_deduction: dec!(15000.00),
//!     salt_cap: dec!(10000.00),
//!     standard_wins_ties: true,
//! };
//!
//! let itemized = ItemizedDeductions {
//!     state_local_taxes: dec!(18000.00),
//!     mortgage_interest: dec!(4000.00),
//!     ..Default::default()
//! };
//!
//! let result = worksheet.calculate(dec!(100000.00), &itemized, false).unwrap();
//!
//! // SALT capped to 10000; 14000 itemized loses to the 15000 standard.
//! assert_eq!(result.itemized_total, dec!(14000.00));
//! assert!(!result.used_itemized);
//! assert_eq!(result.taxable_income, dec!(85000.00));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::calculations::common::{max, min, round_half_up};
use crate::models::{ItemizedDeductions, TaxYearConfig};

/// Errors that can occur during deduction resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeductionError {
    /// Adjusted gross income must be non-negative.
    #[error("adjusted gross income must be non-negative, got {0}")]
    NegativeAgi(Decimal),

    /// An itemized component must be non-negative.
    #[error("itemized component {field} must be non-negative, got {value}")]
    NegativeComponent { field: &'static str, value: Decimal },
}

/// Result of deduction resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionResult {
    /// State and local taxes allowed after the cap.
    pub salt_allowed: Decimal,

    /// Itemized total, post-cap.
    pub itemized_total: Decimal,

    /// The deduction actually taken.
    pub deduction: Decimal,

    pub used_itemized: bool,

    /// `max(0, agi - deduction)`, before the QBI deduction.
    pub taxable_income: Decimal,
}

/// Calculator for the deduction decision.
#[derive(Debug, Clone)]
pub struct DeductionWorksheet {
    pub standard_deduction: Decimal,
    pub salt_cap: Decimal,
    pub standard_wins_ties: bool,
}

impl DeductionWorksheet {
    pub fn from_tax_year_config(config: &TaxYearConfig) -> Self {
        Self {
            standard_deduction: config.standard_deduction,
            salt_cap: config.salt_cap,
            standard_wins_ties: config.standard_wins_ties,
        }
    }

    /// Resolves the deduction and computes taxable income before QBI.
    ///
    /// # Errors
    ///
    /// Returns [`DeductionError`] for negative AGI or a negative itemized
    /// component.
    pub fn calculate(
        &self,
        adjusted_gross_income: Decimal,
        itemized: &ItemizedDeductions,
        force_itemized: bool,
    ) -> Result<DeductionResult, DeductionError> {
        if adjusted_gross_income < Decimal::ZERO {
            return Err(DeductionError::NegativeAgi(adjusted_gross_income));
        }
        validate_components(itemized)?;

        let salt_allowed = self.salt_allowed(itemized.state_local_taxes);
        let itemized_total = self.itemized_total(itemized, salt_allowed);
        let (deduction, used_itemized) = self.resolve(itemized_total, force_itemized);
        let taxable_income = round_half_up(max(
            adjusted_gross_income - deduction,
            Decimal::ZERO,
        ));

        Ok(DeductionResult {
            salt_allowed,
            itemized_total,
            deduction,
            used_itemized,
            taxable_income,
        })
    }

    /// Caps the state-and-local-tax component before any summation.
    fn salt_allowed(
        &self,
        salt_paid: Decimal,
    ) -> Decimal {
        if salt_paid > self.salt_cap {
            warn!(
                salt_paid = %salt_paid,
                salt_cap = %self.salt_cap,
                "SALT deduction capped"
            );
        }
        min(salt_paid, self.salt_cap)
    }

    /// Totals the itemized components, using the capped SALT amount.
    fn itemized_total(
        &self,
        itemized: &ItemizedDeductions,
        salt_allowed: Decimal,
    ) -> Decimal {
        round_half_up(
            salt_allowed
                + itemized.mortgage_interest
                + itemized.charitable_contributions
                + itemized.medical_expenses
                + itemized.other,
        )
    }

    /// Picks standard or itemized. The comparison uses the post-cap itemized
    /// total; a tie goes to standard unless the policy flag says otherwise.
    fn resolve(
        &self,
        itemized_total: Decimal,
        force_itemized: bool,
    ) -> (Decimal, bool) {
        if force_itemized {
            if itemized_total < self.standard_deduction {
                warn!(
                    itemized_total = %itemized_total,
                    standard_deduction = %self.standard_deduction,
                    "itemizing forced below the standard deduction"
                );
            }
            return (itemized_total, true);
        }

        if itemized_total > self.standard_deduction {
            (itemized_total, true)
        } else if itemized_total == self.standard_deduction && !self.standard_wins_ties {
            (itemized_total, true)
        } else {
            (round_half_up(self.standard_deduction), false)
        }
    }
}

fn validate_components(itemized: &ItemizedDeductions) -> Result<(), DeductionError> {
    let components: [(&'static str, Decimal); 5] = [
        ("state_local_taxes", itemized.state_local_taxes),
        ("mortgage_interest", itemized.mortgage_interest),
        (
            "charitable_contributions",
            itemized.charitable_contributions,
        ),
        ("medical_expenses", itemized.medical_expenses),
        ("other", itemized.other),
    ];
    for (field, value) in components {
        if value < Decimal::ZERO {
            return Err(DeductionError::NegativeComponent { field, value });
        }
    }
    Ok(())
}
