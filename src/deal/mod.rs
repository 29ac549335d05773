//! Deal data structures and JSON loading

mod data;
pub mod loader;

pub use data::{years_between, Deal, LeaseInput, PropertyInput, PropertyType, DAYS_PER_YEAR};
pub use loader::{load_deal, load_deal_from_reader, LoadedDeal};
