pub mod breakdown;
mod insights;
mod summary;
pub mod views;

pub use insights::{generate_insights, HIGH_VALUE_THRESHOLD};
pub use summary::LeadAnalysis;
