//! Common types used across the application.

pub mod account_code;
pub mod side;

pub use account_code::AccountCode;
pub use side::Side;
