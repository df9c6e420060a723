//! Qualified Business Income deduction calculations.
//!
//! Implements the Section-199A-style deduction: 20% of qualified business
//! income per business, limited by W-2 wages and UBIA once taxable income
//! crosses a threshold, with the limitation phasing in linearly across a
//! configured range. Specified service trades lose the deduction entirely
//! beyond the range. The summed amount is finally capped at 20% of taxable
//! income less net capital gain.
//!
//! # Worksheet Structure
//!
//! Per qualifying business:
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Tentative deduction: QBI × 20% |
//! | 2    | Wage/capital limit: max(50% × W-2 wages, 25% × W-2 wages + 2.5% × UBIA) |
//! | 3    | Below threshold: tentative allowed in full (SSTB included) |
//! | 4    | Inside the phase-in band: blend tentative toward the limited amount by `(income − threshold) / range` |
//! | 5    | Beyond the band: SSTB → 0, others → min(tentative, limit) |
//!
//! Then: deduction = min(Σ step 1–5, 20% × (taxable income − net capital gain)).
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use liability_core::calculations::QbiWorksheet;
//! use liability_core::BusinessIncome;
//!
//! let worksheet = QbiWorksheet {
//!     threshold: dec!(197300.00),
//!     phase_in_range: dec!(50000.00),
//! };
//!
//! let businesses = vec![BusinessIncome {
//!     qualified_business_income: dec!(100000.00),
//!     w2_wages: dec!(30000.00),
//!     ubia: dec!(0.00),
//!     sstb: false,
//! }];
//!
//! // Taxable income below the threshold: the full 20% is allowed.
//! let result = worksheet.calculate(&businesses, dec!(150000.00), dec!(0.00)).unwrap();
//!
//! assert_eq!(result.deduction, dec!(20000.00));
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::calculations::common::{clamp_unit_interval, max, min, ratio, round_half_up};
use crate::models::{BusinessIncome, TaxYearConfig};

/// Statutory QBI deduction rate.
const QBI_RATE: Decimal = dec!(0.20);
/// Wage-only limitation rate.
const WAGE_LIMIT_RATE: Decimal = dec!(0.50);
/// Wage component of the wage-plus-capital limitation.
const WAGE_UBIA_LIMIT_RATE: Decimal = dec!(0.25);
/// Capital component of the wage-plus-capital limitation.
const UBIA_LIMIT_RATE: Decimal = dec!(0.025);

/// Errors that can occur during QBI calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QbiError {
    /// Taxable income before the QBI deduction must be non-negative.
    #[error("taxable income must be non-negative, got {0}")]
    NegativeTaxableIncome(Decimal),

    /// Net capital gain must be non-negative.
    #[error("net capital gain must be non-negative, got {0}")]
    NegativeNetCapitalGain(Decimal),

    /// Business QBI must be non-negative (loss netting happens upstream).
    #[error("business {index}: qualified business income must be non-negative, got {value}")]
    NegativeQbi { index: usize, value: Decimal },

    /// W-2 wages must be non-negative.
    #[error("business {index}: W-2 wages must be non-negative, got {value}")]
    NegativeWages { index: usize, value: Decimal },

    /// UBIA must be non-negative.
    #[error("business {index}: UBIA must be non-negative, got {value}")]
    NegativeUbia { index: usize, value: Decimal },
}

/// Per-business detail, kept for audit display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessQbiDetail {
    /// 20% of QBI, before any limitation.
    pub tentative: Decimal,

    /// The wage/capital limitation amount.
    pub wage_capital_limit: Decimal,

    /// Phase-in weight applied, in [0, 1]. Zero below the threshold, one at
    /// or beyond the end of the range.
    pub phase_in_weight: Decimal,

    /// Amount allowed after the phase-in and SSTB rules.
    pub allowed: Decimal,
}

/// Result of the QBI worksheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QbiResult {
    /// The final deduction, after the taxable-income cap.
    pub deduction: Decimal,

    /// 20% of (taxable income − net capital gain), the overall cap.
    pub income_limit: Decimal,

    pub businesses: Vec<BusinessQbiDetail>,
}

/// Calculator for the QBI deduction.
///
/// Holds the taxable-income threshold and phase-in range from the year
/// configuration. The statutory percentages are fixed constants.
#[derive(Debug, Clone)]
pub struct QbiWorksheet {
    pub threshold: Decimal,
    pub phase_in_range: Decimal,
}

impl QbiWorksheet {
    pub fn from_tax_year_config(config: &TaxYearConfig) -> Self {
        Self {
            threshold: config.qbi_threshold,
            phase_in_range: config.qbi_phase_in_range,
        }
    }

    /// Computes the QBI deduction against taxable income *before* this
    /// deduction.
    ///
    /// # Errors
    ///
    /// Returns [`QbiError`] for negative taxable income, net capital gain,
    /// QBI, wages, or UBIA.
    pub fn calculate(
        &self,
        businesses: &[BusinessIncome],
        taxable_income: Decimal,
        net_capital_gain: Decimal,
    ) -> Result<QbiResult, QbiError> {
        if taxable_income < Decimal::ZERO {
            return Err(QbiError::NegativeTaxableIncome(taxable_income));
        }
        if net_capital_gain < Decimal::ZERO {
            return Err(QbiError::NegativeNetCapitalGain(net_capital_gain));
        }

        let weight = self.phase_in_weight(taxable_income);

        let mut combined = Decimal::ZERO;
        let mut details = Vec::with_capacity(businesses.len());
        for (index, business) in businesses.iter().enumerate() {
            let detail = self.business_amount(index, business, weight)?;
            combined += detail.allowed;
            details.push(BusinessQbiDetail {
                tentative: round_half_up(detail.tentative),
                wage_capital_limit: round_half_up(detail.wage_capital_limit),
                phase_in_weight: detail.phase_in_weight,
                allowed: round_half_up(detail.allowed),
            });
        }

        let income_limit = max(
            (taxable_income - net_capital_gain) * QBI_RATE,
            Decimal::ZERO,
        );
        let deduction = round_half_up(min(combined, income_limit));

        Ok(QbiResult {
            deduction,
            income_limit: round_half_up(income_limit),
            businesses: details,
        })
    }

    /// How far taxable income has travelled through the phase-in band.
    ///
    /// Division before multiplication, then clamped to [0, 1]: zero at or
    /// below the threshold, one at or beyond threshold + range.
    fn phase_in_weight(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        clamp_unit_interval(ratio(taxable_income - self.threshold, self.phase_in_range))
    }

    /// Steps 1–5 for one business, at full precision.
    fn business_amount(
        &self,
        index: usize,
        business: &BusinessIncome,
        weight: Decimal,
    ) -> Result<BusinessQbiDetail, QbiError> {
        if business.qualified_business_income < Decimal::ZERO {
            return Err(QbiError::NegativeQbi {
                index,
                value: business.qualified_business_income,
            });
        }
        if business.w2_wages < Decimal::ZERO {
            return Err(QbiError::NegativeWages {
                index,
                value: business.w2_wages,
            });
        }
        if business.ubia < Decimal::ZERO {
            return Err(QbiError::NegativeUbia {
                index,
                value: business.ubia,
            });
        }

        let tentative = business.qualified_business_income * QBI_RATE;
        let wage_capital_limit = max(
            business.w2_wages * WAGE_LIMIT_RATE,
            business.w2_wages * WAGE_UBIA_LIMIT_RATE + business.ubia * UBIA_LIMIT_RATE,
        );

        // The fully-limited amount: zero for an SSTB, the wage/capital limit
        // for everything else.
        let limited = if business.sstb {
            Decimal::ZERO
        } else {
            min(tentative, wage_capital_limit)
        };

        let allowed = tentative - weight * (tentative - limited);

        if business.sstb && weight == Decimal::ONE && tentative > Decimal::ZERO {
            warn!(
                business = index,
                tentative = %tentative,
                "SSTB income fully phased out of the QBI deduction"
            );
        }

        Ok(BusinessQbiDetail {
            tentative,
            wage_capital_limit,
            phase_in_weight: weight,
            allowed,
        })
    }
}
