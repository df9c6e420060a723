//! Liability aggregation: the full calculation pipeline.
//!
//! Orchestrates AGI → deduction resolution → QBI → bracket tax → AMT and
//! assembles the [`TaxBreakdown`]. Each component runs exactly once per
//! calculation; any component rejecting its input aborts the pipeline with
//! that component's error and no partial result. The worksheet holds only a
//! borrowed, read-only configuration, so concurrent calls with different
//! profiles never interfere.
//!
//! # Pipeline
//!
//! | Stage | Description |
//! |-------|-------------|
//! | 1     | Validate configuration and profile; filing statuses must match |
//! | 2     | AGI: wages + business income + interest + ordinary dividends + net LTCG |
//! | 3     | Deduction resolution → taxable income before QBI |
//! | 4     | QBI deduction, computed against pre-QBI taxable income |
//! | 5     | Taxable income: max(0, pre-QBI income − QBI deduction) |
//! | 6     | Regular tax: ordinary walk plus preferential income stacked on top |
//! | 7     | AMT, with the SALT add-back taken from the deduction resolution |
//! | 8     | Total tax before credits: regular tax + AMT |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use liability_core::compute_tax;
//! use liability_core::{
//!     AmtPreferences, BracketSchedule, FilingStatus, IncomeProfile, ItemizedDeductions,
//!     TaxBracket, TaxYearConfig,
//! };
//!
//! let config = TaxYearConfig {
//!     tax_year: 2025,
//!     filing_status: FilingStatus::Single,
//!     ordinary_brackets: BracketSchedule::new(vec![
//!         TaxBracket { lower: dec!(0), upper: Some(dec!(11925)), rate: dec!(0.10) },
//!         TaxBracket { lower: dec!(11925), upper: Some(dec!(48475)), rate: dec!(0.12) },
//!         TaxBracket { lower: dec!(48475), upper: None, rate: dec!(0.22) },
//!     ]),
//!     capital_gains_brackets: BracketSchedule::new(vec![
//!         TaxBracket { lower: dec!(0), upper: Some(dec!(48350)), rate: dec!(0) },
//!         TaxBracket { lower: dec!(48350), upper: None, rate: dec!(0.15) },
//!     ]),
//!     standard_deduction: dec!(15000),
//!     salt_cap: dec!(10000),
//!     amt_exemption_base: dec!(88100),
//!     amt_phaseout_start: dec!(626350),
//!     amt_rate_threshold: dec!(239100),
//!     qbi_threshold: dec!(197300),
//!     qbi_phase_in_range: dec!(50000),
//!     standard_wins_ties: true,
//! };
//!
//! let profile = IncomeProfile {
//!     filing_status: FilingStatus::Single,
//!     wages: dec!(65000),
//!     interest: dec!(0),
//!     ordinary_dividends: dec!(0),
//!     qualified_dividends: dec!(0),
//!     net_long_term_capital_gain: dec!(0),
//!     businesses: vec![],
//!     itemized: ItemizedDeductions::default(),
//!     force_itemized: false,
//!     amt_preferences: AmtPreferences::default(),
//!     prior_year_minimum_tax_credit: dec!(0),
//! };
//!
//! let breakdown = compute_tax(&profile, &config).unwrap();
//!
//! // Taxable income 50000: 1192.50 + 4386.00 + 335.50.
//! assert_eq!(breakdown.taxable_income, dec!(50000.00));
//! assert_eq!(breakdown.regular_tax, dec!(5914.00));
//! assert_eq!(breakdown.total_tax_before_credits, dec!(5914.00));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

use crate::calculations::common::{max, min, round_half_up};
use crate::calculations::worksheets::amt::{AmtError, AmtWorksheet, AmtWorksheetInput};
use crate::calculations::worksheets::bracket_tax::{BracketTaxError, BracketTaxWorksheet};
use crate::calculations::worksheets::deduction::{DeductionError, DeductionWorksheet};
use crate::calculations::worksheets::qbi::{QbiError, QbiWorksheet};
use crate::models::{
    ConfigError, FilingStatus, IncomeProfile, ProfileError, TaxBreakdown, TaxYearConfig,
};

/// Errors surfaced by a liability calculation.
///
/// Input errors are surfaced immediately and never retried; there are no
/// transient failure modes in pure computation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LiabilityError {
    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The profile's filing status must match the configuration's.
    #[error("filing status mismatch: profile is {profile}, config is {config}")]
    FilingStatusMismatch {
        profile: FilingStatus,
        config: FilingStatus,
    },

    #[error(transparent)]
    Deduction(#[from] DeductionError),

    #[error(transparent)]
    Qbi(#[from] QbiError),

    #[error(transparent)]
    BracketTax(#[from] BracketTaxError),

    #[error(transparent)]
    Amt(#[from] AmtError),
}

/// Calculator that runs the whole pipeline against one year configuration.
#[derive(Debug, Clone)]
pub struct LiabilityWorksheet<'a> {
    config: &'a TaxYearConfig,
}

impl<'a> LiabilityWorksheet<'a> {
    pub fn new(config: &'a TaxYearConfig) -> Self {
        Self { config }
    }

    /// Computes the full liability breakdown for one profile.
    ///
    /// # Errors
    ///
    /// Returns [`LiabilityError`] if the configuration is malformed, the
    /// profile fails validation, the filing statuses disagree, or any
    /// component rejects its input.
    pub fn calculate(
        &self,
        profile: &IncomeProfile,
    ) -> Result<TaxBreakdown, LiabilityError> {
        self.config.validate()?;
        profile.validate()?;
        if profile.filing_status != self.config.filing_status {
            return Err(LiabilityError::FilingStatusMismatch {
                profile: profile.filing_status,
                config: self.config.filing_status,
            });
        }

        let adjusted_gross_income = self.adjusted_gross_income(profile);

        let deduction = DeductionWorksheet::from_tax_year_config(self.config).calculate(
            adjusted_gross_income,
            &profile.itemized,
            profile.force_itemized,
        )?;

        // Preferential income for stacking and for the QBI income cap.
        let net_capital_gain = profile.qualified_dividends + profile.net_long_term_capital_gain;

        // QBI is computed against taxable income before the QBI deduction.
        let qbi = QbiWorksheet::from_tax_year_config(self.config).calculate(
            &profile.businesses,
            deduction.taxable_income,
            net_capital_gain,
        )?;

        let taxable_income = round_half_up(max(
            deduction.taxable_income - qbi.deduction,
            Decimal::ZERO,
        ));

        // Ordinary income fills the bottom of the stack; preferential income
        // fills the remainder.
        let preferential_income = min(net_capital_gain, taxable_income);
        let ordinary_income = taxable_income - preferential_income;

        let ordinary = BracketTaxWorksheet::new(&self.config.ordinary_brackets)
            .tax_on(ordinary_income)?;
        let preferential = BracketTaxWorksheet::new(&self.config.capital_gains_brackets)
            .stacked_tax_on(ordinary_income, preferential_income)?;
        let regular_tax = round_half_up(ordinary.tax + preferential.tax);

        // The add-back is the SALT actually deducted, not the amount paid.
        let salt_addback = if deduction.used_itemized {
            deduction.salt_allowed
        } else {
            Decimal::ZERO
        };

        let amt = AmtWorksheet::from_tax_year_config(self.config).calculate(&AmtWorksheetInput {
            taxable_income,
            salt_addback,
            preferences: profile.amt_preferences.clone(),
            regular_tax,
            prior_year_minimum_tax_credit: profile.prior_year_minimum_tax_credit,
        })?;

        Ok(TaxBreakdown {
            tax_year: self.config.tax_year,
            filing_status: self.config.filing_status,
            adjusted_gross_income: round_half_up(adjusted_gross_income),
            deduction: deduction.deduction,
            used_itemized_deduction: deduction.used_itemized,
            qbi_deduction: qbi.deduction,
            taxable_income,
            ordinary_tax: ordinary.tax,
            preferential_tax: preferential.tax,
            regular_tax,
            ordinary_bracket_detail: ordinary.contributions,
            preferential_bracket_detail: preferential.contributions,
            amti: amt.amti,
            amt_exemption: amt.exemption,
            tentative_minimum_tax: amt.tentative_minimum_tax,
            alternative_minimum_tax: amt.amt,
            total_tax_before_credits: round_half_up(regular_tax + amt.amt),
        })
    }

    /// Stage 2: AGI from the profile's income components. Qualified
    /// dividends are a subset of ordinary dividends, so they are not added
    /// separately.
    fn adjusted_gross_income(
        &self,
        profile: &IncomeProfile,
    ) -> Decimal {
        let business_income: Decimal = profile
            .businesses
            .iter()
            .map(|business| business.qualified_business_income)
            .sum();

        profile.wages
            + business_income
            + profile.interest
            + profile.ordinary_dividends
            + profile.net_long_term_capital_gain
    }
}

/// The engine's single logical boundary: one profile plus one year
/// configuration in, one breakdown out. Pure and stateless; safe to call
/// concurrently.
pub fn compute_tax(
    profile: &IncomeProfile,
    config: &TaxYearConfig,
) -> Result<TaxBreakdown, LiabilityError> {
    LiabilityWorksheet::new(config).calculate(profile)
}
