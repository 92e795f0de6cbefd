pub mod mirror;
pub mod reconciliation;

pub use reconciliation::{ReconciliationService, MAX_RESET_ATTEMPTS};
