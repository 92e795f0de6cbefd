pub mod customer;
pub mod settings;
pub mod transaction;

pub use customer::Customer;
pub use settings::{Settings, SettingsPatch};
pub use transaction::{
    AUTH_CODE_PENDING, NewTransaction, Otp, PaymentMethod, Transaction, TransactionStatus,
};
