pub mod client;
pub mod rows;

pub use client::{LedgerClient, LedgerError};
pub use rows::{LedgerCustomer, LedgerTransaction, OtpRecord};
