pub mod calculations;
pub mod models;

pub use calculations::worksheets::{LiabilityError, compute_tax};
pub use models::*;
