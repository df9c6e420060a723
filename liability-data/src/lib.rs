pub mod loader;
pub mod params;

pub use loader::{BracketRecord, ConfigLoader, ConfigLoaderError, YearParamRecord};
pub use params::{builtin_table, year_2025};
