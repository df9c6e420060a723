use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::filing_status::FilingStatus;
use crate::models::tax_bracket::{BracketSchedule, ScheduleError};

/// Errors raised by configuration validation and lookup.
///
/// Configuration problems are fatal at startup. A missing or malformed year
/// is never recoverable per-request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No configuration loaded for the requested year and filing status.
    #[error("no tax year configuration for {tax_year} {filing_status}")]
    NotFound {
        tax_year: i32,
        filing_status: FilingStatus,
    },

    /// The ordinary-income schedule failed validation.
    #[error("ordinary income schedule: {0}")]
    OrdinarySchedule(ScheduleError),

    /// The preferential-rate schedule failed validation.
    #[error("capital gains schedule: {0}")]
    CapitalGainsSchedule(ScheduleError),

    /// The standard deduction must be positive.
    #[error("standard deduction must be positive, got {0}")]
    InvalidStandardDeduction(Decimal),

    /// The SALT cap must be non-negative.
    #[error("SALT cap must be non-negative, got {0}")]
    InvalidSaltCap(Decimal),

    /// The AMT exemption base must be non-negative.
    #[error("AMT exemption base must be non-negative, got {0}")]
    InvalidAmtExemptionBase(Decimal),

    /// The AMT exemption phase-out start must be non-negative.
    #[error("AMT exemption phase-out start must be non-negative, got {0}")]
    InvalidAmtPhaseoutStart(Decimal),

    /// The AMT 26%/28% rate threshold must be positive.
    #[error("AMT rate threshold must be positive, got {0}")]
    InvalidAmtRateThreshold(Decimal),

    /// The QBI phase-in threshold must be non-negative.
    #[error("QBI threshold must be non-negative, got {0}")]
    InvalidQbiThreshold(Decimal),

    /// The QBI phase-in range must be positive (it is a divisor).
    #[error("QBI phase-in range must be positive, got {0}")]
    InvalidQbiPhaseInRange(Decimal),
}

/// All year- and filing-status-dependent constants the engine needs.
///
/// Constructed once per tax year at startup and treated as read-only for the
/// life of the process. Statutory percentages that do not vary by year or
/// status (the 20% QBI rate, the 26%/28% AMT tiers, the 25% exemption
/// phase-out) live as exact constants in the worksheets, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYearConfig {
    pub tax_year: i32,
    pub filing_status: FilingStatus,

    /// Ordinary-income rate schedule.
    pub ordinary_brackets: BracketSchedule,

    /// Preferential-rate schedule for qualified dividends and net long-term
    /// capital gain. Its boundaries are evaluated against total taxable
    /// income when stacking.
    pub capital_gains_brackets: BracketSchedule,

    pub standard_deduction: Decimal,

    /// Ceiling on deductible state-and-local-tax itemized deductions.
    pub salt_cap: Decimal,

    /// AMT exemption before any phase-out.
    pub amt_exemption_base: Decimal,

    /// AMTI level at which the exemption starts phasing out.
    pub amt_phaseout_start: Decimal,

    /// AMT taxable income breakpoint between the 26% and 28% tiers.
    pub amt_rate_threshold: Decimal,

    /// Taxable income at which the QBI wage/capital limitation starts
    /// phasing in.
    pub qbi_threshold: Decimal,

    /// Width of the QBI phase-in band above the threshold.
    pub qbi_phase_in_range: Decimal,

    /// When itemized deductions exactly equal the standard deduction, pick
    /// standard. Policy, not an IRS requirement.
    pub standard_wins_ties: bool,
}

impl TaxYearConfig {
    /// Validates every constant and both schedules.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ordinary_brackets
            .validate()
            .map_err(ConfigError::OrdinarySchedule)?;
        self.capital_gains_brackets
            .validate()
            .map_err(ConfigError::CapitalGainsSchedule)?;

        if self.standard_deduction <= Decimal::ZERO {
            return Err(ConfigError::InvalidStandardDeduction(
                self.standard_deduction,
            ));
        }
        if self.salt_cap < Decimal::ZERO {
            return Err(ConfigError::InvalidSaltCap(self.salt_cap));
        }
        if self.amt_exemption_base < Decimal::ZERO {
            return Err(ConfigError::InvalidAmtExemptionBase(self.amt_exemption_base));
        }
        if self.amt_phaseout_start < Decimal::ZERO {
            return Err(ConfigError::InvalidAmtPhaseoutStart(self.amt_phaseout_start));
        }
        if self.amt_rate_threshold <= Decimal::ZERO {
            return Err(ConfigError::InvalidAmtRateThreshold(self.amt_rate_threshold));
        }
        if self.qbi_threshold < Decimal::ZERO {
            return Err(ConfigError::InvalidQbiThreshold(self.qbi_threshold));
        }
        if self.qbi_phase_in_range <= Decimal::ZERO {
            return Err(ConfigError::InvalidQbiPhaseInRange(self.qbi_phase_in_range));
        }

        Ok(())
    }
}

/// Read-only table of [`TaxYearConfig`]s keyed by `(tax_year, filing_status)`.
///
/// Loaded once at process start; concurrent readers need no synchronization.
#[derive(Debug, Clone, Default)]
pub struct ConfigTable {
    configs: HashMap<(i32, FilingStatus), TaxYearConfig>,
}

impl ConfigTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and inserts a configuration, replacing any previous entry
    /// for the same year and filing status.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is malformed.
    pub fn insert(
        &mut self,
        config: TaxYearConfig,
    ) -> Result<(), ConfigError> {
        config.validate()?;
        self.configs
            .insert((config.tax_year, config.filing_status), config);
        Ok(())
    }

    /// Looks up the configuration for a year and filing status.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if no entry exists.
    pub fn get(
        &self,
        tax_year: i32,
        filing_status: FilingStatus,
    ) -> Result<&TaxYearConfig, ConfigError> {
        self.configs
            .get(&(tax_year, filing_status))
            .ok_or(ConfigError::NotFound {
                tax_year,
                filing_status,
            })
    }

    /// Distinct tax years present in the table, sorted ascending.
    pub fn tax_years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.configs.keys().map(|(year, _)| *year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}
