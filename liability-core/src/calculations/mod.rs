//! Tax calculation modules for the liability engine.
//!
//! `common` holds the exact-arithmetic primitives; `worksheets` holds the
//! per-stage calculators and the aggregator.

pub mod common;
pub mod worksheets;

pub use worksheets::{
    AmtError, AmtWorksheet, AmtWorksheetInput, AmtWorksheetResult, BracketTaxError,
    BracketTaxResult, BracketTaxWorksheet, BusinessQbiDetail, DeductionError, DeductionResult,
    DeductionWorksheet, LiabilityError, LiabilityWorksheet, QbiError, QbiResult, QbiWorksheet,
    compute_tax,
};
