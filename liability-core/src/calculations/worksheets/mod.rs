//! Worksheet implementations for the liability pipeline.
//!
//! Each worksheet mirrors one stage of the computation: bracket tax,
//! deduction resolution, the QBI deduction, the alternative minimum tax, and
//! the aggregator that runs them in order.

pub mod amt;
pub mod bracket_tax;
pub mod deduction;
pub mod liability;
pub mod qbi;

pub use amt::{AmtError, AmtWorksheet, AmtWorksheetInput, AmtWorksheetResult};
pub use bracket_tax::{BracketTaxError, BracketTaxResult, BracketTaxWorksheet};
pub use deduction::{DeductionError, DeductionResult, DeductionWorksheet};
pub use liability::{LiabilityError, LiabilityWorksheet, compute_tax};
pub use qbi::{BusinessQbiDetail, QbiError, QbiResult, QbiWorksheet};
