//! Built-in tax year parameters.
//!
//! The 2025 figures below come from the IRS rate schedules (Rev. Proc.
//! 2024-40): ordinary schedules X / Y-1 / Y-2 / Z, the 0%/15%/20% capital
//! gains breakpoints, standard deductions, the SALT cap, AMT exemptions and
//! phase-out starts, the 26%/28% breakpoint, and the QBI thresholds.
//!
//! External deployments can override any of this by loading CSV files via
//! [`crate::ConfigLoader`]; the built-in table covers the common case of a
//! process that only needs the current year.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use liability_core::{BracketSchedule, ConfigError, ConfigTable, FilingStatus, TaxBracket, TaxYearConfig};

fn bracket(
    lower: Decimal,
    upper: Option<Decimal>,
    rate: Decimal,
) -> TaxBracket {
    TaxBracket { lower, upper, rate }
}

fn ordinary_2025(filing_status: FilingStatus) -> BracketSchedule {
    use FilingStatus::*;
    let brackets = match filing_status {
        Single => vec![
            bracket(dec!(0), Some(dec!(11925)), dec!(0.10)),
            bracket(dec!(11925), Some(dec!(48475)), dec!(0.12)),
            bracket(dec!(48475), Some(dec!(103350)), dec!(0.22)),
            bracket(dec!(103350), Some(dec!(197300)), dec!(0.24)),
            bracket(dec!(197300), Some(dec!(250525)), dec!(0.32)),
            bracket(dec!(250525), Some(dec!(626350)), dec!(0.35)),
            bracket(dec!(626350), None, dec!(0.37)),
        ],
        MarriedFilingJointly | QualifyingSurvivingSpouse => vec![
            bracket(dec!(0), Some(dec!(23850)), dec!(0.10)),
            bracket(dec!(23850), Some(dec!(96950)), dec!(0.12)),
            bracket(dec!(96950), Some(dec!(206700)), dec!(0.22)),
            bracket(dec!(206700), Some(dec!(394600)), dec!(0.24)),
            bracket(dec!(394600), Some(dec!(501050)), dec!(0.32)),
            bracket(dec!(501050), Some(dec!(751600)), dec!(0.35)),
            bracket(dec!(751600), None, dec!(0.37)),
        ],
        MarriedFilingSeparately => vec![
            bracket(dec!(0), Some(dec!(11925)), dec!(0.10)),
            bracket(dec!(11925), Some(dec!(48475)), dec!(0.12)),
            bracket(dec!(48475), Some(dec!(103350)), dec!(0.22)),
            bracket(dec!(103350), Some(dec!(197300)), dec!(0.24)),
            bracket(dec!(197300), Some(dec!(250525)), dec!(0.32)),
            bracket(dec!(250525), Some(dec!(375800)), dec!(0.35)),
            bracket(dec!(375800), None, dec!(0.37)),
        ],
        HeadOfHousehold => vec![
            bracket(dec!(0), Some(dec!(17000)), dec!(0.10)),
            bracket(dec!(17000), Some(dec!(64850)), dec!(0.12)),
            bracket(dec!(64850), Some(dec!(103350)), dec!(0.22)),
            bracket(dec!(103350), Some(dec!(197300)), dec!(0.24)),
            bracket(dec!(197300), Some(dec!(250500)), dec!(0.32)),
            bracket(dec!(250500), Some(dec!(626350)), dec!(0.35)),
            bracket(dec!(626350), None, dec!(0.37)),
        ],
    };
    BracketSchedule::new(brackets)
}

fn capital_gains_2025(filing_status: FilingStatus) -> BracketSchedule {
    use FilingStatus::*;
    let brackets = match filing_status {
        Single => vec![
            bracket(dec!(0), Some(dec!(48350)), dec!(0)),
            bracket(dec!(48350), Some(dec!(533400)), dec!(0.15)),
            bracket(dec!(533400), None, dec!(0.20)),
        ],
        MarriedFilingJointly | QualifyingSurvivingSpouse => vec![
            bracket(dec!(0), Some(dec!(96700)), dec!(0)),
            bracket(dec!(96700), Some(dec!(600050)), dec!(0.15)),
            bracket(dec!(600050), None, dec!(0.20)),
        ],
        MarriedFilingSeparately => vec![
            bracket(dec!(0), Some(dec!(48350)), dec!(0)),
            bracket(dec!(48350), Some(dec!(300000)), dec!(0.15)),
            bracket(dec!(300000), None, dec!(0.20)),
        ],
        HeadOfHousehold => vec![
            bracket(dec!(0), Some(dec!(64750)), dec!(0)),
            bracket(dec!(64750), Some(dec!(566700)), dec!(0.15)),
            bracket(dec!(566700), None, dec!(0.20)),
        ],
    };
    BracketSchedule::new(brackets)
}

fn standard_deduction_2025(filing_status: FilingStatus) -> Decimal {
    use FilingStatus::*;
    match filing_status {
        Single | MarriedFilingSeparately => dec!(15000),
        MarriedFilingJointly | QualifyingSurvivingSpouse => dec!(30000),
        HeadOfHousehold => dec!(22500),
    }
}

/// Builds the 2025 configuration for one filing status.
pub fn year_2025(filing_status: FilingStatus) -> TaxYearConfig {
    use FilingStatus::*;

    let salt_cap = match filing_status {
        MarriedFilingSeparately => dec!(5000),
        _ => dec!(10000),
    };
    let amt_exemption_base = match filing_status {
        MarriedFilingJointly | QualifyingSurvivingSpouse => dec!(137000),
        MarriedFilingSeparately => dec!(68500),
        Single | HeadOfHousehold => dec!(88100),
    };
    let amt_phaseout_start = match filing_status {
        MarriedFilingJointly | QualifyingSurvivingSpouse => dec!(1252700),
        _ => dec!(626350),
    };
    let amt_rate_threshold = match filing_status {
        MarriedFilingSeparately => dec!(119550),
        _ => dec!(239100),
    };
    let (qbi_threshold, qbi_phase_in_range) = match filing_status {
        MarriedFilingJointly | QualifyingSurvivingSpouse => (dec!(394600), dec!(100000)),
        _ => (dec!(197300), dec!(50000)),
    };

    TaxYearConfig {
        tax_year: 2025,
        filing_status,
        ordinary_brackets: ordinary_2025(filing_status),
        capital_gains_brackets: capital_gains_2025(filing_status),
        standard_deduction: standard_deduction_2025(filing_status),
        salt_cap,
        amt_exemption_base,
        amt_phaseout_start,
        amt_rate_threshold,
        qbi_threshold,
        qbi_phase_in_range,
        standard_wins_ties: true,
    }
}

/// Builds the full built-in table: every filing status for 2025.
///
/// # Errors
///
/// Returns [`ConfigError`] if a built-in configuration fails validation.
pub fn builtin_table() -> Result<ConfigTable, ConfigError> {
    let mut table = ConfigTable::new();
    for filing_status in FilingStatus::ALL {
        table.insert(year_2025(filing_status))?;
    }
    Ok(table)
}
