// Pure computations over records already loaded from storage.

pub mod inventory;
pub mod revenue;
pub mod store_age;

pub use revenue::{AnalyticsSummary, aggregate};
