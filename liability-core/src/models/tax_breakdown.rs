use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::filing_status::FilingStatus;
use crate::models::tax_bracket::BracketContribution;

/// Structured result of one liability calculation.
///
/// Produced fresh on every call and never mutated after return. Every money
/// field is rounded to the cent (scale 2) at the finalize step, so the JSON
/// form carries exactly two decimal places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub tax_year: i32,
    pub filing_status: FilingStatus,

    pub adjusted_gross_income: Decimal,

    /// The deduction actually taken (standard or itemized, post-SALT-cap).
    pub deduction: Decimal,
    pub used_itemized_deduction: bool,

    pub qbi_deduction: Decimal,

    /// Taxable income after all deductions, including QBI.
    pub taxable_income: Decimal,

    /// Tax on the ordinary-income portion of taxable income.
    pub ordinary_tax: Decimal,

    /// Tax on qualified dividends and net long-term capital gain, stacked on
    /// top of ordinary income.
    pub preferential_tax: Decimal,

    /// Ordinary plus preferential tax.
    pub regular_tax: Decimal,

    /// Per-bracket decomposition of the ordinary tax, for audit display only.
    pub ordinary_bracket_detail: Vec<BracketContribution>,

    /// Per-bracket decomposition of the preferential tax, for audit display
    /// only.
    pub preferential_bracket_detail: Vec<BracketContribution>,

    /// Alternative minimum taxable income.
    pub amti: Decimal,

    /// AMT exemption after the phase-out, never negative.
    pub amt_exemption: Decimal,

    pub tentative_minimum_tax: Decimal,

    /// Excess of tentative minimum tax over regular tax, after the
    /// prior-year credit; zero when regular tax is higher.
    pub alternative_minimum_tax: Decimal,

    /// Regular tax plus alternative minimum tax. Credits are applied by the
    /// calling layer.
    pub total_tax_before_credits: Decimal,
}
