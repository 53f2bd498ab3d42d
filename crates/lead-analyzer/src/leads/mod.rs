pub mod domain;
pub mod format;
pub mod ingest;
pub mod outreach;
pub mod report;
pub mod scoring;
mod store;

pub use domain::{ContactWindow, Lead, LeadId, LeadScoring, LeadView};
pub use ingest::{LeadFormat, LeadImportError, LeadImporter};
pub use report::LeadAnalysis;
pub use store::LeadStore;
